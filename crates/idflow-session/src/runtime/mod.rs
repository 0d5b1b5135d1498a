//! Session runtime - owns state and capabilities, executes effects.
//!
//! This is the I/O boundary: the reducer stays pure and produces effects,
//! and this module runs them and feeds the resulting events back in.
//!
//! Events are processed from a local inbox in arrival order. Each effect is
//! awaited before the next one starts, so at most one capability call is in
//! flight at a time.

use std::collections::VecDeque;

use idflow_core::address::Navigator;
use idflow_core::identity::IdentityClient;
use idflow_core::payload::PayloadBuilder;
use idflow_core::signing::SigningWidget;
use idflow_types::{ChainAccount, LoginProvider, SignOptions, SignRequest, UiState};
use tracing::{debug, info, warn};
use url::Url;

use crate::effects::SessionEffect;
use crate::events::{RequestId, SessionEvent};
use crate::state::{SessionConfig, SessionState};
use crate::update;

/// Drives the session coordinator against injected capabilities.
pub struct SessionRuntime<I, W, P, N> {
    pub state: SessionState,
    identity: I,
    widget: W,
    payloads: P,
    navigator: N,
}

impl<I, W, P, N> SessionRuntime<I, W, P, N>
where
    I: IdentityClient,
    W: SigningWidget,
    P: PayloadBuilder,
    N: Navigator,
{
    pub fn new(config: SessionConfig, identity: I, widget: W, payloads: P, navigator: N) -> Self {
        Self {
            state: SessionState::new(config),
            identity,
            widget,
            payloads,
            navigator,
        }
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Derived UI view of the current state.
    pub fn ui(&self) -> UiState {
        self.state.ui()
    }

    /// Page load at `address`: restores the cached session, or resolves the
    /// callback when `address` is the registered callback address.
    pub async fn startup(&mut self, address: Url) {
        let cached = match self.identity.current_session() {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Failed to read cached session: {e:#}");
                None
            }
        };
        self.dispatch(SessionEvent::Started { cached, address }).await;
    }

    pub async fn login(&mut self, provider: LoginProvider) {
        self.dispatch(SessionEvent::LoginRequested { provider }).await;
    }

    /// Redirect back from the identity service without a page reload.
    pub async fn callback(&mut self, address: Url) {
        self.dispatch(SessionEvent::CallbackReceived { address }).await;
    }

    pub async fn logout(&mut self) {
        self.dispatch(SessionEvent::LogoutRequested).await;
    }

    /// Opens the signing widget for `network`, or the configured network.
    pub async fn open_signing_widget(&mut self, network: Option<&str>) {
        let network = network.map_or_else(
            || self.state.config.sign_network.clone(),
            ToString::to_string,
        );
        self.dispatch(SessionEvent::SigningWidgetOpened { network }).await;
    }

    pub async fn close_signing_widget(&mut self) {
        self.dispatch(SessionEvent::SigningWidgetClosed).await;
    }

    /// Runs `event` through the reducer and executes effects until no
    /// follow-up events remain.
    pub async fn dispatch(&mut self, event: SessionEvent) {
        let mut inbox = VecDeque::from([event]);
        while let Some(event) = inbox.pop_front() {
            let before = self.state.phase;
            let previous_error = self.state.error.clone();
            let effects = update(&mut self.state, event);
            if self.state.phase != before {
                info!(
                    from = before.name(),
                    to = self.state.phase.name(),
                    "session phase changed"
                );
            }
            if self.state.error != previous_error
                && let Some(error) = &self.state.error
            {
                warn!(kind = error.kind(), "{error}");
            }

            for effect in effects {
                if let Some(next) = self.execute_effect(effect).await {
                    inbox.push_back(next);
                }
            }
        }
    }

    async fn execute_effect(&self, effect: SessionEffect) -> Option<SessionEvent> {
        match effect {
            SessionEffect::BeginLogin { provider } => {
                debug!(%provider, "requesting login url");
                let result = self
                    .identity
                    .begin_login(provider)
                    .await
                    .map_err(|e| format!("{e:#}"));
                Some(SessionEvent::LoginUrlReady { result })
            }
            SessionEffect::Navigate { url } => {
                debug!(%url, "navigating");
                if let Err(e) = self.navigator.navigate(&url) {
                    warn!("Navigation to {url} failed: {e:#}");
                }
                None
            }
            SessionEffect::ParseCallback { url } => {
                debug!(path = url.path(), "parsing callback");
                let result = self
                    .identity
                    .parse_callback(&url)
                    .map_err(|e| format!("{e:#}"));
                Some(SessionEvent::CallbackParsed { result })
            }
            SessionEffect::FetchProfile { account_id, origin } => {
                debug!(account = %account_id, ?origin, "fetching profile");
                let result = self
                    .identity
                    .fetch_profile(&account_id)
                    .await
                    .map_err(|e| format!("{e:#}"));
                Some(SessionEvent::ProfileLoaded { origin, result })
            }
            SessionEffect::ClearSession => {
                if let Err(e) = self.identity.clear_session() {
                    warn!("Failed to clear cached session: {e:#}");
                }
                None
            }
            SessionEffect::RequestSignature {
                request,
                account_id,
                account,
                options,
            } => Some(self.request_signature(request, account_id, account, options).await),
        }
    }

    async fn request_signature(
        &self,
        request: RequestId,
        account_id: String,
        account: ChainAccount,
        options: SignOptions,
    ) -> SessionEvent {
        let payload = match self.payloads.build(&account) {
            Ok(payload) => payload,
            Err(e) => {
                return SessionEvent::SigningCompleted {
                    request,
                    result: Err(format!("{e:#}")),
                };
            }
        };

        debug!(
            request = request.0,
            chain_network = %account.chain_network,
            chain_account = %account.chain_account,
            "requesting signature"
        );
        let sign_request = SignRequest {
            account_id,
            chain_network: account.chain_network,
            chain_account: account.chain_account,
            permission_name: account.permission_name,
            transaction_payload: payload,
            options,
            state: self.state.config.sign_state.clone(),
        };
        let result = self
            .widget
            .sign(sign_request)
            .await
            .map_err(|e| format!("{e:#}"));
        SessionEvent::SigningCompleted { request, result }
    }
}
