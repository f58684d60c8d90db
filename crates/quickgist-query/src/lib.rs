//! quickgist-query
//!
//! Read-through cache for gist queries and the create mutation.
//!
//! Reads are keyed by snippet id or owner id and reused for a freshness
//! window. A successful create marks the owner's list stale so the next
//! read refetches it.

pub mod cache;
pub mod queries;

pub use cache::{QueryCache, DEFAULT_FRESHNESS};
pub use queries::{Queries, QueryKey, QueryState};
