//! quickgist-core
//!
//! Pure domain types, form validation, and link conventions.
//! No HTTP dependency. This is the shared vocabulary of the QuickGist client.

pub mod error;
pub mod language;
pub mod links;
pub mod models;
pub mod validation;
