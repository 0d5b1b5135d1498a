//! Session coordinator for idflow.
//!
//! Elm-style split: [`update`] is a pure `(state, event) -> effects` reducer,
//! and [`SessionRuntime`] executes the effects against the injected
//! identity, signing, payload and navigation capabilities.

pub mod effects;
pub mod events;
pub mod runtime;
pub mod state;
pub mod update;

pub use effects::SessionEffect;
pub use events::{ProfileOrigin, RequestId, SessionEvent};
pub use runtime::SessionRuntime;
pub use state::{Phase, SessionConfig, SessionState};
pub use update::update;
