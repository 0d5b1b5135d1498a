//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod sign;
pub mod status;

use std::sync::Arc;

use anyhow::Result;
use idflow_core::address::{AddressProvider, CallbackAddress, FixedAddress, RecordingNavigator};
use idflow_core::config::Config;
use idflow_core::identity::HttpIdentityClient;
use idflow_core::payload::SampleActionBuilder;
use idflow_core::signing::HttpSigningWidget;
use idflow_core::store::{FileStore, KeyValueStore};
use idflow_session::{SessionConfig, SessionRuntime};

/// Session runtime wired to the HTTP clients and the on-disk store.
///
/// Navigation is recorded, not performed: only the login command opens a
/// browser, and only for the login URL.
pub type CliRuntime =
    SessionRuntime<HttpIdentityClient, HttpSigningWidget, SampleActionBuilder, RecordingNavigator>;

pub struct CliSession {
    pub runtime: CliRuntime,
    pub callback: CallbackAddress,
}

impl CliSession {
    pub fn new(config: &Config) -> Result<Self> {
        let settings = config.service_settings()?;
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::default_location());
        let callback = settings.callback.clone();

        let widget = HttpSigningWidget::new(
            settings.service_url.clone(),
            settings.api_key.clone(),
            Arc::clone(&store),
        );
        let identity = HttpIdentityClient::new(settings, store);
        let payloads = SampleActionBuilder::new(
            config.signing.contract.clone(),
            config.signing.action.clone(),
        );

        let runtime = SessionRuntime::new(
            SessionConfig::from_config(config)?,
            identity,
            widget,
            payloads,
            RecordingNavigator::default(),
        );
        Ok(Self { runtime, callback })
    }

    /// Page load at the application origin: restores the cached session.
    pub async fn restore(&mut self) {
        let address = FixedAddress(self.callback.app_origin());
        self.runtime.startup(address.current()).await;
    }

    /// Account id of the logged-in user.
    pub fn logged_in_account(&self) -> Option<&str> {
        if self.runtime.ui().is_logged_in {
            self.runtime.state.account_id()
        } else {
            None
        }
    }
}
