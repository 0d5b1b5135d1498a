//! Shared data types for idflow.
//!
//! Plain data only: no I/O, no async. Everything here is passed between the
//! identity client, the session coordinator and the CLI.

mod login;
mod profile;
mod session;
mod signing;
mod ui;

pub use login::LoginProvider;
pub use profile::{ChainAccount, ChainPermission, Profile};
pub use session::{Session, mask_token};
pub use signing::{SignOptions, SignOutcome, SignRequest, TransactionPayload};
pub use ui::UiState;
