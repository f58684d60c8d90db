//! quickgist-client
//!
//! HTTP access to the QuickGist backend. Thin wrapper around reqwest.

pub mod client;
pub mod error;
pub mod gists;

pub use client::{ApiClient, MultipartBody, RequestBody};
pub use error::{ApiError, ClientError};
pub use gists::{GistApi, GistClient};
