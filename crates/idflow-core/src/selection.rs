//! Chain account selection for signing.
//!
//! Which account to sign with when a profile has several permissions on the
//! same network is a product decision, so it is a policy value rather than
//! a fixed rule.

use idflow_types::{ChainAccount, Profile};

/// Policy for picking a chain account on a network.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// First permission on the network, in profile order.
    #[default]
    FirstMatch,
    /// First permission on the network with this name, else first match.
    PreferPermission(String),
}

impl SelectionPolicy {
    /// Picks an account on `chain_network`, or `None` if the profile has none.
    pub fn select(&self, profile: &Profile, chain_network: &str) -> Option<ChainAccount> {
        let mut candidates = profile.permissions_for(chain_network).peekable();
        let first = candidates.peek().copied()?;

        let chosen = match self {
            SelectionPolicy::FirstMatch => first,
            SelectionPolicy::PreferPermission(name) => candidates
                .find(|p| &p.permission_name == name)
                .unwrap_or(first),
        };
        Some(ChainAccount::from(chosen))
    }
}
