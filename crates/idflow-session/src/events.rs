//! Events fed to the reducer.
//!
//! User actions and the results of executed effects both arrive here.
//! Failures are carried as strings; the reducer classifies them.

use idflow_core::identity::CallbackOutcome;
use idflow_types::{LoginProvider, Profile, Session, SignOutcome};
use url::Url;

/// Identifies a signing request so late results can be matched or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// Monotonic request id generator.
#[derive(Debug, Default)]
pub struct RequestSeq {
    next: u64,
}

impl RequestSeq {
    pub fn next_id(&mut self) -> RequestId {
        let id = RequestId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Why a profile was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOrigin {
    /// Startup with a cached session.
    Restore,
    /// After a resolved login callback.
    Callback,
}

#[derive(Debug)]
pub enum SessionEvent {
    /// Page load: the cached session (if any) and the current address.
    Started {
        cached: Option<Session>,
        address: Url,
    },
    LoginRequested {
        provider: LoginProvider,
    },
    LoginUrlReady {
        result: Result<Url, String>,
    },
    /// The identity service redirected back without a page reload.
    CallbackReceived {
        address: Url,
    },
    CallbackParsed {
        result: Result<CallbackOutcome, String>,
    },
    ProfileLoaded {
        origin: ProfileOrigin,
        result: Result<Profile, String>,
    },
    LogoutRequested,
    SigningWidgetOpened {
        network: String,
    },
    SigningCompleted {
        request: RequestId,
        result: Result<SignOutcome, String>,
    },
    /// User dismissed the widget. An in-flight request still completes.
    SigningWidgetClosed,
}
