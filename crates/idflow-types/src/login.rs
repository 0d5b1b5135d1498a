use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Login providers accepted by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginProvider {
    Facebook,
    Google,
    #[serde(rename = "oreid")]
    OreId,
    Email,
}

impl LoginProvider {
    /// Wire name sent to the identity service.
    pub fn as_str(self) -> &'static str {
        match self {
            LoginProvider::Facebook => "facebook",
            LoginProvider::Google => "google",
            LoginProvider::OreId => "oreid",
            LoginProvider::Email => "email",
        }
    }

    /// Human-readable name for prompts and status output.
    pub fn display_name(self) -> &'static str {
        match self {
            LoginProvider::Facebook => "Facebook",
            LoginProvider::Google => "Google",
            LoginProvider::OreId => "ORE ID",
            LoginProvider::Email => "Email",
        }
    }

    pub fn all() -> &'static [LoginProvider] {
        &[
            LoginProvider::Facebook,
            LoginProvider::Google,
            LoginProvider::OreId,
            LoginProvider::Email,
        ]
    }
}

impl fmt::Display for LoginProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        LoginProvider::all()
            .iter()
            .copied()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let known: Vec<&str> = LoginProvider::all().iter().map(|p| p.as_str()).collect();
                format!(
                    "Unknown login provider '{value}'. Expected one of: {}",
                    known.join(", ")
                )
            })
    }
}
