use serde::{Deserialize, Serialize};

/// A chain permission attached to a user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainPermission {
    pub chain_network: String,
    pub chain_account: String,
    #[serde(rename = "permission")]
    pub permission_name: String,
}

/// Profile record returned by the identity service, keyed by account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "accountName")]
    pub account_id: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "picture", default)]
    pub avatar_url: String,
    #[serde(default)]
    pub username: String,
    /// Ordered as returned by the service.
    #[serde(default)]
    pub permissions: Vec<ChainPermission>,
}

impl Profile {
    /// Permissions on `chain_network`, in insertion order.
    pub fn permissions_for<'a>(
        &'a self,
        chain_network: &'a str,
    ) -> impl Iterator<Item = &'a ChainPermission> + 'a {
        self.permissions
            .iter()
            .filter(move |p| p.chain_network == chain_network)
    }
}

/// The chain account/permission pair chosen for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAccount {
    pub chain_network: String,
    pub chain_account: String,
    pub permission_name: String,
}

impl From<&ChainPermission> for ChainAccount {
    fn from(p: &ChainPermission) -> Self {
        Self {
            chain_network: p.chain_network.clone(),
            chain_account: p.chain_account.clone(),
            permission_name: p.permission_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_service_field_names() {
        let json = r#"{
            "accountName": "ore1abc",
            "name": "Alice",
            "email": "alice@example.com",
            "picture": "https://example.com/a.png",
            "username": "alice",
            "permissions": [
                {"chainNetwork": "eos_kylin", "chainAccount": "acct1", "permission": "active"},
                {"chainNetwork": "eos_main", "chainAccount": "acct2", "permission": "owner"}
            ]
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.account_id, "ore1abc");
        assert_eq!(profile.display_name, "Alice");
        assert_eq!(profile.permissions.len(), 2);
        assert_eq!(profile.permissions[0].permission_name, "active");
    }

    #[test]
    fn test_profile_missing_optional_fields() {
        let profile: Profile = serde_json::from_str(r#"{"accountName": "bob"}"#).unwrap();
        assert!(profile.email.is_empty());
        assert!(profile.permissions.is_empty());
    }
}
