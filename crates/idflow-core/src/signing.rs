//! Signing widget capability.
//!
//! The widget asks the user to approve a transaction and optionally
//! broadcasts it. Results come back as awaited values, not callbacks.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use idflow_types::{SignOutcome, SignRequest};
use url::Url;

use crate::identity::check_status;
use crate::store::{ACCESS_TOKEN_KEY, KeyValueStore};

/// Requests a signature (and broadcast) for a caller-supplied payload.
pub trait SigningWidget: Send + Sync {
    fn sign(&self, request: SignRequest) -> impl Future<Output = Result<SignOutcome>> + Send;
}

/// Signs through the identity service's transaction endpoint.
pub struct HttpSigningWidget {
    http: reqwest::Client,
    service_url: Url,
    api_key: Option<String>,
    store: Arc<dyn KeyValueStore>,
}

impl HttpSigningWidget {
    pub fn new(service_url: Url, api_key: Option<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            service_url,
            api_key,
            store,
        }
    }
}

impl SigningWidget for HttpSigningWidget {
    async fn sign(&self, request: SignRequest) -> Result<SignOutcome> {
        let url = self
            .service_url
            .join("api/transaction/sign")
            .context("Invalid signing endpoint")?;

        let Some(token) = self.store.get(ACCESS_TOKEN_KEY)? else {
            bail!("No session token; log in first");
        };

        let mut builder = self.http.post(url).bearer_auth(token).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("api-key", api_key);
        }

        tracing::debug!(
            account = %request.account_id,
            chain_network = %request.chain_network,
            chain_account = %request.chain_account,
            broadcast = request.options.broadcast,
            "sending sign request"
        );
        let response = builder
            .send()
            .await
            .context("Failed to send sign request")?;
        let response = check_status(response, "Sign request").await?;
        let value: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse sign response")?;

        // Some services answer 200 with an `errors` field.
        if let Some(errors) = value.get("errors").filter(|e| !e.is_null()) {
            let message = errors
                .as_str()
                .map_or_else(|| errors.to_string(), ToString::to_string);
            if !message.is_empty() {
                bail!("{message}");
            }
        }

        Ok(SignOutcome(value))
    }
}

#[cfg(test)]
mod tests {
    use idflow_types::{SignOptions, TransactionPayload};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::MemoryStore;

    fn request() -> SignRequest {
        SignRequest {
            account_id: "ore1alice".to_string(),
            chain_network: "eos_kylin".to_string(),
            chain_account: "acct1".to_string(),
            permission_name: "active".to_string(),
            transaction_payload: TransactionPayload("e30=".to_string()),
            options: SignOptions::default(),
            state: Some("yourstate".to_string()),
        }
    }

    fn widget(server: &MockServer, token: Option<&str>) -> HttpSigningWidget {
        let store = Arc::new(MemoryStore::new());
        if let Some(token) = token {
            store.set(ACCESS_TOKEN_KEY, token).unwrap();
        }
        HttpSigningWidget::new(
            Url::parse(&server.uri()).unwrap(),
            Some("test-api-key".to_string()),
            store,
        )
    }

    #[tokio::test]
    async fn test_sign_posts_request_and_returns_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transaction/sign"))
            .and(header("authorization", "Bearer tok-123"))
            .and(body_partial_json(serde_json::json!({
                "account": "ore1alice",
                "chainAccount": "acct1",
                "broadcast": true,
                "preventAutoSign": true,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"transactionId": "abc123"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = widget(&server, Some("tok-123")).sign(request()).await.unwrap();
        assert_eq!(outcome.0["transactionId"], "abc123");
    }

    #[tokio::test]
    async fn test_sign_without_token_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = widget(&server, None).sign(request()).await.unwrap_err();
        assert!(err.to_string().contains("log in first"));
    }

    #[tokio::test]
    async fn test_sign_errors_field_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transaction/sign"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"errors": "user_cancelled"})),
            )
            .mount(&server)
            .await;

        let err = widget(&server, Some("tok")).sign(request()).await.unwrap_err();
        assert_eq!(err.to_string(), "user_cancelled");
    }

    #[tokio::test]
    async fn test_sign_http_error_uses_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transaction/sign"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "errorCode": "chainAccountNotFound",
                "message": "Chain account not found"
            })))
            .mount(&server)
            .await;

        let err = widget(&server, Some("tok")).sign(request()).await.unwrap_err();
        assert!(
            err.to_string()
                .contains("Chain account not found (chainAccountNotFound)")
        );
    }
}
