//! quickgist-testing
//!
//! Test doubles for the QuickGist backend: an in-process HTTP server that
//! speaks the real REST surface, and an in-memory [`GistApi`] with call
//! counters.
//!
//! [`GistApi`]: quickgist_client::GistApi

pub mod backend;
pub mod fake_api;
pub mod fixtures;

pub use backend::{FakeBackend, RecordedRequest};
pub use fake_api::FakeGistApi;
