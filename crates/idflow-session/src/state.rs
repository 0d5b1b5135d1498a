//! Coordinator state.
//!
//! `SessionState` is owned by the runtime and mutated only by the reducer.
//! The UI view is derived on demand, so `is_logged_in` and
//! `show_signing_widget` can never drift from the session and profile.

use idflow_core::address::CallbackAddress;
use idflow_core::config::Config;
use idflow_core::error::SessionError;
use idflow_core::selection::SelectionPolicy;
use idflow_types::{Profile, Session, SignOptions, UiState};
use url::Url;

use crate::events::{RequestId, RequestSeq};

/// Coordinator phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Unauthenticated,
    /// Fetching the profile for a session cached by an earlier login.
    RestoringSession,
    /// Login URL requested or the user agent has been sent to it.
    AuthenticatingRedirect,
    ResolvingCallback,
    Authenticated,
    SigningInProgress,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Unauthenticated => "unauthenticated",
            Phase::RestoringSession => "restoring_session",
            Phase::AuthenticatingRedirect => "authenticating_redirect",
            Phase::ResolvingCallback => "resolving_callback",
            Phase::Authenticated => "authenticated",
            Phase::SigningInProgress => "signing_in_progress",
        }
    }
}

/// Static inputs to the reducer.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub callback: CallbackAddress,
    /// Network used to pick the signing account.
    pub sign_network: String,
    pub selection: SelectionPolicy,
    pub sign_options: SignOptions,
    /// Caller state attached to sign requests.
    pub sign_state: Option<String>,
}

impl SessionConfig {
    pub fn new(callback: CallbackAddress) -> Self {
        Self {
            callback,
            sign_network: "eos_kylin".to_string(),
            selection: SelectionPolicy::FirstMatch,
            sign_options: SignOptions::default(),
            sign_state: None,
        }
    }

    /// # Errors
    /// Returns an error if the configured callback URL is invalid.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            callback: CallbackAddress::parse(&config.callback_url)?,
            sign_network: config.signing.network.clone(),
            selection: config.signing.selection_policy(),
            sign_options: config.signing.sign_options(),
            sign_state: config.signing.sign_state(),
        })
    }
}

#[derive(Debug)]
pub struct SessionState {
    pub config: SessionConfig,
    pub phase: Phase,
    /// Cached or freshly resolved session. Present before the profile while
    /// restoring or resolving.
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    /// Last error; each new error overwrites it.
    pub error: Option<SessionError>,
    pub last_sign_result: Option<String>,
    pub show_signing_widget: bool,
    /// Callback address seen while a restore was in flight.
    pub pending_callback: Option<Url>,
    /// Signing request whose result is still expected.
    pub active_sign: Option<RequestId>,
    pub sign_seq: RequestSeq,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            phase: Phase::Unauthenticated,
            session: None,
            profile: None,
            error: None,
            last_sign_result: None,
            show_signing_widget: false,
            pending_callback: None,
            active_sign: None,
            sign_seq: RequestSeq::default(),
        }
    }

    /// Drops everything a page reload would lose. Config and the request
    /// sequence survive so stale ids never collide.
    pub fn reset(&mut self) {
        self.phase = Phase::Unauthenticated;
        self.session = None;
        self.profile = None;
        self.error = None;
        self.last_sign_result = None;
        self.show_signing_widget = false;
        self.pending_callback = None;
        self.active_sign = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.as_ref().is_some_and(Session::has_token) && self.profile.is_some()
    }

    pub fn account_id(&self) -> Option<&str> {
        self.session.as_ref().and_then(Session::account_id)
    }

    /// Derived UI view.
    pub fn ui(&self) -> UiState {
        let is_logged_in = self.is_logged_in();
        UiState {
            is_logged_in,
            errors: self.error.as_ref().map(ToString::to_string),
            show_signing_widget: is_logged_in && self.show_signing_widget,
            last_sign_result: self.last_sign_result.clone(),
        }
    }
}
