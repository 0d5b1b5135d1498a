use serde::{Deserialize, Serialize};

/// Client-side session: an opaque token plus the authenticated account.
///
/// Restored from the key-value store at startup, created by a successful
/// callback, destroyed on logout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>, account_id: impl Into<String>) -> Self {
        Self {
            token,
            account_id: Some(account_id.into()),
        }
    }

    /// Both a token and an account are known.
    pub fn is_established(&self) -> bool {
        self.has_token() && self.account_id.is_some()
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
}

/// Masks a token for display. Never returns more than the first 8 chars.
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_established_requires_token_and_account() {
        assert!(!Session::default().is_established());
        assert!(!Session::new(None, "alice").is_established());
        assert!(!Session::new(Some(String::new()), "alice").is_established());
        assert!(Session::new(Some("tok".to_string()), "alice").is_established());
    }

    #[test]
    fn test_mask_token_hides_short_tokens() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("abcdefgh12345678xyz"), "abcdefgh...");
    }
}
