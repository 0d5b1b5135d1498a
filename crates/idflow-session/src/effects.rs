//! Effects returned by the reducer for the runtime to execute.
//!
//! Effects are I/O only. The reducer never calls a capability directly.

use idflow_types::{ChainAccount, LoginProvider, SignOptions};
use url::Url;

use crate::events::{ProfileOrigin, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Ask the identity service for a login redirect URL.
    BeginLogin { provider: LoginProvider },

    /// Send the user agent to `url`.
    Navigate { url: Url },

    /// Parse the callback address.
    ParseCallback { url: Url },

    /// Fetch the profile for an account.
    FetchProfile {
        account_id: String,
        origin: ProfileOrigin,
    },

    /// Drop the cached session from storage.
    ClearSession,

    /// Build the payload for `account` and hand it to the signing widget.
    RequestSignature {
        request: RequestId,
        account_id: String,
        account: ChainAccount,
        options: SignOptions,
    },
}
