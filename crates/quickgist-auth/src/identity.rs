use crate::error::AuthError;
use crate::session::{read_session_unverified, verify_session};

/// Who is using the client: signed in with a user id, or anonymous.
///
/// Signed-in state is derived from the user id, so the two can never
/// disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    user_id: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            user_id: (!user_id.is_empty()).then_some(user_id),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Resolve the identity for a stored session.
    ///
    /// No token means anonymous. With a public key the token is verified;
    /// without one its subject is trusted as-is and a warning is logged.
    pub fn from_session(
        session_token: Option<&str>,
        public_key_pem: Option<&str>,
    ) -> Result<Self, AuthError> {
        let Some(token) = session_token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(Self::anonymous());
        };

        let claims = match public_key_pem.filter(|k| !k.trim().is_empty()) {
            Some(key) => verify_session(token, key)?,
            None => {
                tracing::warn!("no identity provider public key configured; session not verified");
                read_session_unverified(token)?
            }
        };

        tracing::debug!(user_id = %claims.sub, "session resolved");
        Ok(Self::signed_in(claims.sub))
    }
}
