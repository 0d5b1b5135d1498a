//! Transaction payload builders.
//!
//! The coordinator treats payloads as opaque; builders turn the selected
//! chain account into whatever the signing service expects.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use idflow_types::{ChainAccount, TransactionPayload};
use serde::Serialize;

/// Builds the payload to sign for a selected account.
pub trait PayloadBuilder: Send + Sync {
    /// # Errors
    /// Returns an error if the payload cannot be serialized.
    fn build(&self, account: &ChainAccount) -> Result<TransactionPayload>;
}

#[derive(Debug, Serialize)]
struct Authorization<'a> {
    actor: &'a str,
    permission: &'a str,
}

#[derive(Debug, Serialize)]
struct ActionData<'a> {
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct Action<'a> {
    account: &'a str,
    name: &'a str,
    authorization: [Authorization<'a>; 1],
    data: ActionData<'a>,
}

/// Single EOS-style action authorized by the selected account, JSON then
/// standard base64.
#[derive(Debug, Clone)]
pub struct SampleActionBuilder {
    pub contract: String,
    pub action: String,
}

impl SampleActionBuilder {
    pub fn new(contract: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            action: action.into(),
        }
    }
}

impl Default for SampleActionBuilder {
    fn default() -> Self {
        Self::new("demoapphello", "hi")
    }
}

impl PayloadBuilder for SampleActionBuilder {
    fn build(&self, account: &ChainAccount) -> Result<TransactionPayload> {
        let permission = if account.permission_name.is_empty() {
            "active"
        } else {
            account.permission_name.as_str()
        };
        let action = Action {
            account: &self.contract,
            name: &self.action,
            authorization: [Authorization {
                actor: &account.chain_account,
                permission,
            }],
            data: ActionData {
                user: &account.chain_account,
            },
        };
        let json = serde_json::to_vec(&action).context("Failed to serialize transaction")?;
        Ok(TransactionPayload(STANDARD.encode(json)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(payload: &TransactionPayload) -> serde_json::Value {
        let bytes = STANDARD.decode(payload.as_str()).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_sample_action_shape() {
        let account = ChainAccount {
            chain_network: "eos_kylin".to_string(),
            chain_account: "acct1".to_string(),
            permission_name: "owner".to_string(),
        };
        let value = decode(&SampleActionBuilder::default().build(&account).unwrap());
        assert_eq!(value["account"], "demoapphello");
        assert_eq!(value["name"], "hi");
        assert_eq!(value["authorization"][0]["actor"], "acct1");
        assert_eq!(value["authorization"][0]["permission"], "owner");
        assert_eq!(value["data"]["user"], "acct1");
    }

    #[test]
    fn test_missing_permission_defaults_to_active() {
        let account = ChainAccount {
            chain_network: "eos_kylin".to_string(),
            chain_account: "acct1".to_string(),
            permission_name: String::new(),
        };
        let value = decode(&SampleActionBuilder::new("c", "a").build(&account).unwrap());
        assert_eq!(value["authorization"][0]["permission"], "active");
    }
}
