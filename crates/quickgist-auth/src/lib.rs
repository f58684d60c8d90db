//! quickgist-auth
//!
//! The identity collaborator. Sign-in itself happens in the identity
//! provider's hosted pages; this crate only turns a session token into an
//! [`Identity`].

pub mod error;
pub mod identity;
pub mod session;

pub use error::AuthError;
pub use identity::Identity;
