//! Core idflow library (config, capabilities, identity and signing clients).

pub mod address;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod payload;
pub mod selection;
pub mod signing;
pub mod store;
