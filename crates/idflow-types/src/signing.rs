use serde::{Deserialize, Serialize};

/// Encoded transaction payload. Opaque to everything but the payload builder
/// that produced it and the signing service that consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionPayload(pub String);

impl TransactionPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Flags passed through to the signing service unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOptions {
    /// Let the service broadcast the signed transaction to the chain.
    pub broadcast: bool,
    pub return_signed_transaction: bool,
    /// Require user approval even for auto-signable transactions.
    pub prevent_auto_sign: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            broadcast: true,
            return_signed_transaction: false,
            prevent_auto_sign: true,
        }
    }
}

/// Request sent to the signing widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(rename = "account")]
    pub account_id: String,
    pub chain_network: String,
    pub chain_account: String,
    #[serde(rename = "permission")]
    pub permission_name: String,
    #[serde(rename = "transaction")]
    pub transaction_payload: TransactionPayload,
    #[serde(flatten)]
    pub options: SignOptions,
    /// Caller state echoed back by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Successful signing result (opaque JSON from the service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignOutcome(pub serde_json::Value);

impl SignOutcome {
    /// Pretty-printed form stored in the UI state.
    pub fn to_display_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}
