//! Session reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(state, event)`
//! and executes the returned effects. Events that are not valid in the
//! current phase leave the state untouched and return no effects; that is
//! the only re-entry guard (there are no locks).

use idflow_core::error::SessionError;
use idflow_types::{LoginProvider, Profile, Session};
use url::Url;

use crate::effects::SessionEffect;
use crate::events::{ProfileOrigin, RequestId, SessionEvent};
use crate::state::{Phase, SessionState};

/// The main reducer function.
pub fn update(state: &mut SessionState, event: SessionEvent) -> Vec<SessionEffect> {
    match event {
        SessionEvent::Started { cached, address } => handle_started(state, cached, address),
        SessionEvent::LoginRequested { provider } => handle_login_requested(state, provider),
        SessionEvent::LoginUrlReady { result } => handle_login_url(state, result),
        SessionEvent::CallbackReceived { address } => handle_callback_received(state, address),
        SessionEvent::CallbackParsed { result } => handle_callback_parsed(state, result),
        SessionEvent::ProfileLoaded { origin, result } => {
            handle_profile_loaded(state, origin, result)
        }
        SessionEvent::LogoutRequested => handle_logout(state),
        SessionEvent::SigningWidgetOpened { network } => handle_open_widget(state, &network),
        SessionEvent::SigningCompleted { request, result } => {
            handle_signing_completed(state, request, result)
        }
        SessionEvent::SigningWidgetClosed => {
            close_widget(state);
            vec![]
        }
    }
}

fn handle_started(
    state: &mut SessionState,
    cached: Option<Session>,
    address: Url,
) -> Vec<SessionEffect> {
    state.reset();
    let at_callback = state.config.callback.matches(&address);

    let restorable = cached.filter(Session::is_established);
    if let Some(session) = restorable
        && let Some(account_id) = session.account_id.clone()
    {
        state.session = Some(session);
        state.phase = Phase::RestoringSession;
        if at_callback {
            state.pending_callback = Some(address);
        }
        return vec![SessionEffect::FetchProfile {
            account_id,
            origin: ProfileOrigin::Restore,
        }];
    }

    if at_callback {
        return begin_callback_resolution(state, address);
    }
    vec![]
}

fn handle_login_requested(state: &mut SessionState, provider: LoginProvider) -> Vec<SessionEffect> {
    if state.phase != Phase::Unauthenticated {
        return vec![];
    }
    state.error = None;
    state.phase = Phase::AuthenticatingRedirect;
    vec![SessionEffect::BeginLogin { provider }]
}

fn handle_login_url(state: &mut SessionState, result: Result<Url, String>) -> Vec<SessionEffect> {
    if state.phase != Phase::AuthenticatingRedirect {
        return vec![];
    }
    match result {
        Ok(url) => vec![SessionEffect::Navigate { url }],
        Err(msg) => {
            fail_unauthenticated(state, SessionError::LoginInitiation(msg));
            vec![]
        }
    }
}

fn handle_callback_received(state: &mut SessionState, address: Url) -> Vec<SessionEffect> {
    if !state.config.callback.matches(&address) {
        return vec![];
    }
    match state.phase {
        Phase::RestoringSession => {
            state.pending_callback = Some(address);
            vec![]
        }
        Phase::ResolvingCallback | Phase::SigningInProgress => vec![],
        Phase::Unauthenticated | Phase::AuthenticatingRedirect | Phase::Authenticated => {
            begin_callback_resolution(state, address)
        }
    }
}

fn begin_callback_resolution(state: &mut SessionState, address: Url) -> Vec<SessionEffect> {
    state.session = None;
    state.profile = None;
    state.show_signing_widget = false;
    state.active_sign = None;
    state.phase = Phase::ResolvingCallback;
    vec![SessionEffect::ParseCallback { url: address }]
}

fn handle_callback_parsed(
    state: &mut SessionState,
    result: Result<idflow_core::identity::CallbackOutcome, String>,
) -> Vec<SessionEffect> {
    if state.phase != Phase::ResolvingCallback {
        return vec![];
    }
    match result {
        Ok(outcome) => {
            state.session = Some(Session::new(outcome.token, outcome.account_id.clone()));
            vec![SessionEffect::FetchProfile {
                account_id: outcome.account_id,
                origin: ProfileOrigin::Callback,
            }]
        }
        Err(msg) => {
            fail_unauthenticated(state, SessionError::CallbackParse(msg));
            vec![]
        }
    }
}

fn handle_profile_loaded(
    state: &mut SessionState,
    origin: ProfileOrigin,
    result: Result<Profile, String>,
) -> Vec<SessionEffect> {
    let expected = match origin {
        ProfileOrigin::Restore => Phase::RestoringSession,
        ProfileOrigin::Callback => Phase::ResolvingCallback,
    };
    if state.phase != expected {
        return vec![];
    }

    match result {
        Ok(_) if !state.session.as_ref().is_some_and(Session::has_token) => {
            fail_unauthenticated(
                state,
                SessionError::ProfileFetch("identity service issued no session token".to_string()),
            );
        }
        Ok(profile) => {
            state.profile = Some(profile);
            state.phase = Phase::Authenticated;
        }
        Err(msg) => fail_unauthenticated(state, SessionError::ProfileFetch(msg)),
    }

    // A callback that arrived during the restore is resolved now.
    if origin == ProfileOrigin::Restore
        && let Some(address) = state.pending_callback.take()
    {
        return begin_callback_resolution(state, address);
    }
    vec![]
}

fn handle_logout(state: &mut SessionState) -> Vec<SessionEffect> {
    if state.phase == Phase::Unauthenticated {
        return vec![];
    }
    state.reset();
    vec![
        SessionEffect::ClearSession,
        SessionEffect::Navigate {
            url: state.config.callback.app_origin(),
        },
    ]
}

fn handle_open_widget(state: &mut SessionState, network: &str) -> Vec<SessionEffect> {
    if state.phase != Phase::Authenticated || !state.is_logged_in() || state.active_sign.is_some()
    {
        return vec![];
    }
    state.error = None;

    let Some(profile) = state.profile.as_ref() else {
        return vec![];
    };
    let Some(account) = state.config.selection.select(profile, network) else {
        state.error = Some(SessionError::Signing(format!(
            "no chain account for network {network} in profile"
        )));
        return vec![];
    };
    let account_id = profile.account_id.clone();

    let request = state.sign_seq.next_id();
    state.active_sign = Some(request);
    state.show_signing_widget = true;
    state.phase = Phase::SigningInProgress;
    vec![SessionEffect::RequestSignature {
        request,
        account_id,
        account,
        options: state.config.sign_options,
    }]
}

fn handle_signing_completed(
    state: &mut SessionState,
    request: RequestId,
    result: Result<idflow_types::SignOutcome, String>,
) -> Vec<SessionEffect> {
    if state.active_sign != Some(request) {
        return vec![];
    }
    state.active_sign = None;
    match result {
        Ok(outcome) => state.last_sign_result = Some(outcome.to_display_string()),
        Err(msg) => state.error = Some(SessionError::Signing(msg)),
    }
    close_widget(state);
    vec![]
}

fn close_widget(state: &mut SessionState) {
    state.show_signing_widget = false;
    if state.phase == Phase::SigningInProgress {
        state.phase = Phase::Authenticated;
    }
}

/// Falls back to `Unauthenticated`, dropping session and profile.
fn fail_unauthenticated(state: &mut SessionState, error: SessionError) {
    state.phase = Phase::Unauthenticated;
    state.session = None;
    state.profile = None;
    state.show_signing_widget = false;
    state.active_sign = None;
    state.last_sign_result = None;
    state.error = Some(error);
}
