//! Errors surfaced to the UI state.
//!
//! Every variant returns the coordinator to the nearest stable phase and
//! overwrites the single error field. Nothing here is retried.

/// Session coordinator error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Login failed: {0}")]
    LoginInitiation(String),

    #[error("Login callback failed: {0}")]
    CallbackParse(String),

    #[error("Failed to load profile: {0}")]
    ProfileFetch(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

impl SessionError {
    /// Short machine-friendly kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::LoginInitiation(_) => "login_initiation",
            SessionError::CallbackParse(_) => "callback_parse",
            SessionError::ProfileFetch(_) => "profile_fetch",
            SessionError::Signing(_) => "signing",
        }
    }
}
