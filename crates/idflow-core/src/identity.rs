//! Identity service client.
//!
//! [`IdentityClient`] is the capability the session coordinator depends on.
//! [`HttpIdentityClient`] talks to an ORE ID style service over HTTP and
//! owns every write to the session store: the coordinator only reads.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use idflow_types::{LoginProvider, Profile, Session};
use serde::Deserialize;
use url::Url;

use crate::config::ServiceSettings;
use crate::store::{ACCESS_TOKEN_KEY, ACCOUNT_KEY, KeyValueStore, LOGIN_STATE_KEY, PROFILE_KEY};

/// Parsed login callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub account_id: String,
    /// Session token after the callback, if the service issued one.
    pub token: Option<String>,
}

/// Capability provided by the identity service SDK.
pub trait IdentityClient: Send + Sync {
    /// Starts a login and returns the URL to redirect to.
    fn begin_login(&self, provider: LoginProvider) -> impl Future<Output = Result<Url>> + Send;

    /// Parses the callback address the service redirected back to.
    ///
    /// # Errors
    /// Returns an error if the callback carries errors or no account.
    fn parse_callback(&self, url: &Url) -> Result<CallbackOutcome>;

    /// Fetches the profile for `account_id`.
    fn fetch_profile(&self, account_id: &str) -> impl Future<Output = Result<Profile>> + Send;

    /// Session cached from an earlier login, if any.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    fn current_session(&self) -> Result<Option<Session>>;

    /// Forgets the cached session.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn clear_session(&self) -> Result<()>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppTokenResponse {
    app_access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP implementation of [`IdentityClient`].
pub struct HttpIdentityClient {
    http: reqwest::Client,
    settings: ServiceSettings,
    store: Arc<dyn KeyValueStore>,
}

impl HttpIdentityClient {
    pub fn new(settings: ServiceSettings, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            store,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.settings
            .service_url
            .join(path)
            .with_context(|| format!("Invalid service endpoint {path}"))
    }

    fn with_credentials(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        let mut request = request;
        if let Some(api_key) = &self.settings.api_key {
            request = request.header("api-key", api_key);
        }
        if let Some(token) = self.store.get(ACCESS_TOKEN_KEY)? {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn fetch_app_token(&self, provider: LoginProvider) -> Result<String> {
        let url = self.endpoint("api/app-token")?;
        let body = serde_json::json!({
            "appId": self.settings.app_id,
            "appName": self.settings.app_name,
            "provider": provider.as_str(),
        });
        let response = self
            .with_credentials(self.http.post(url).json(&body))?
            .send()
            .await
            .context("Failed to send app token request")?;

        let response = check_status(response, "App token request").await?;
        let token: AppTokenResponse = response
            .json()
            .await
            .context("Failed to parse app token response")?;
        Ok(token.app_access_token)
    }
}

impl IdentityClient for HttpIdentityClient {
    async fn begin_login(&self, provider: LoginProvider) -> Result<Url> {
        let app_token = self.fetch_app_token(provider).await?;
        let state = uuid::Uuid::new_v4().to_string();
        self.store.set(LOGIN_STATE_KEY, &state)?;

        let fragment: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("app_access_token", &app_token)
            .append_pair("provider", provider.as_str())
            .append_pair("callback_url", self.settings.callback.url().as_str())
            .append_pair("state", &state)
            .finish();

        let mut url = self.endpoint("auth")?;
        url.set_fragment(Some(&fragment));
        tracing::info!(provider = %provider, "login url issued");
        Ok(url)
    }

    fn parse_callback(&self, url: &Url) -> Result<CallbackOutcome> {
        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };

        if let Some(errors) = param("errors") {
            bail!("{errors}");
        }

        // Once a login has been started, only its own state is accepted.
        if let Some(expected) = self.store.get(LOGIN_STATE_KEY)?
            && param("state").as_deref() != Some(expected.as_str())
        {
            bail!("State mismatch");
        }

        let account_id =
            param("account").ok_or_else(|| anyhow!("Callback is missing the account parameter"))?;

        // Only the token carried by this callback counts.
        let token = param("access_token");
        match &token {
            Some(token) => self.store.set(ACCESS_TOKEN_KEY, token)?,
            None => self.store.remove(ACCESS_TOKEN_KEY)?,
        }
        self.store.set(ACCOUNT_KEY, &account_id)?;
        self.store.remove(LOGIN_STATE_KEY)?;

        tracing::info!(account = %account_id, has_token = token.is_some(), "callback resolved");
        Ok(CallbackOutcome { account_id, token })
    }

    async fn fetch_profile(&self, account_id: &str) -> Result<Profile> {
        let mut url = self.endpoint("api/account/user")?;
        url.query_pairs_mut().append_pair("account", account_id);

        let response = self
            .with_credentials(self.http.get(url))?
            .send()
            .await
            .context("Failed to send profile request")?;
        let response = check_status(response, "Profile request").await?;
        let profile: Profile = response
            .json()
            .await
            .context("Failed to parse profile response")?;

        if profile.account_id != account_id {
            bail!(
                "Profile account mismatch: requested {account_id}, got {}",
                profile.account_id
            );
        }

        let cached = serde_json::to_string(&profile).context("Failed to serialize profile")?;
        self.store.set(PROFILE_KEY, &cached)?;
        Ok(profile)
    }

    fn current_session(&self) -> Result<Option<Session>> {
        let token = self.store.get(ACCESS_TOKEN_KEY)?;
        let account = self.store.get(ACCOUNT_KEY)?;
        Ok(match (token, account) {
            (Some(token), Some(account)) if !token.is_empty() => {
                Some(Session::new(Some(token), account))
            }
            _ => None,
        })
    }

    fn clear_session(&self) -> Result<()> {
        for key in [ACCESS_TOKEN_KEY, ACCOUNT_KEY, PROFILE_KEY, LOGIN_STATE_KEY] {
            self.store.remove(key)?;
        }
        Ok(())
    }
}

/// Turns non-2xx responses into errors, preferring the service's message.
pub(crate) async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ServiceErrorBody>(&body) {
        Ok(ServiceErrorBody {
            error_code,
            message: Some(message),
        }) => match error_code {
            Some(code) => bail!("{what} failed (HTTP {status}): {message} ({code})"),
            None => bail!("{what} failed (HTTP {status}): {message}"),
        },
        _ => bail!("{what} failed (HTTP {status}): {body}"),
    }
}
