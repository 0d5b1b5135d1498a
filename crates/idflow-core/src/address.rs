//! Page address and navigation capabilities.
//!
//! The coordinator never touches a real browser location. It reads the
//! current address through [`AddressProvider`] and asks a [`Navigator`] to
//! move elsewhere.

use std::sync::Mutex;

use anyhow::{Context, Result};
use url::Url;

/// Env var that suppresses opening a browser (tests, headless runs).
pub const NO_BROWSER_ENV: &str = "IDFLOW_NO_BROWSER";

/// The registered callback address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAddress(Url);

impl CallbackAddress {
    /// # Errors
    /// Returns an error if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).with_context(|| format!("Invalid callback URL: {raw}"))?;
        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Exact origin + path equality. Query and fragment are ignored.
    pub fn matches(&self, address: &Url) -> bool {
        self.0.origin() == address.origin() && self.0.path() == address.path()
    }

    /// The application origin, used to discard callback parameters.
    pub fn app_origin(&self) -> Url {
        let mut origin = self.0.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin
    }

    /// Port the callback is served on (explicit or scheme default).
    pub fn port(&self) -> Option<u16> {
        self.0.port_or_known_default()
    }
}

/// Source of the current page address.
pub trait AddressProvider {
    fn current(&self) -> Url;
}

/// Moves the user agent to another address.
pub trait Navigator {
    /// # Errors
    /// Returns an error if navigation could not be started.
    fn navigate(&self, url: &Url) -> Result<()>;
}

/// An address fixed at construction time.
#[derive(Debug, Clone)]
pub struct FixedAddress(pub Url);

impl AddressProvider for FixedAddress {
    fn current(&self) -> Url {
        self.0.clone()
    }
}

/// Opens URLs in the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        if std::env::var_os(NO_BROWSER_ENV).is_some() {
            tracing::debug!(%url, "browser disabled, skipping navigation");
            return Ok(());
        }
        open::that(url.as_str()).with_context(|| format!("Failed to open browser at {url}"))
    }
}

/// Records navigations instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<Url> {
        self.visited
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Url> {
        self.visited().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        self.visited
            .lock()
            .map_err(|e| anyhow::anyhow!("navigator lock poisoned: {e}"))?
            .push(url.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback() -> CallbackAddress {
        CallbackAddress::parse("http://localhost:3000/authcallback").unwrap()
    }

    #[test]
    fn test_matches_ignores_query_and_fragment() {
        let url = Url::parse("http://localhost:3000/authcallback?account=alice#x").unwrap();
        assert!(callback().matches(&url));
    }

    #[test]
    fn test_matches_requires_same_origin_and_path() {
        for other in [
            "http://localhost:3001/authcallback",
            "https://localhost:3000/authcallback",
            "http://127.0.0.1:3000/authcallback",
            "http://localhost:3000/authcallback/",
            "http://localhost:3000/",
        ] {
            let url = Url::parse(other).unwrap();
            assert!(!callback().matches(&url), "{other} should not match");
        }
    }

    #[test]
    fn test_app_origin_drops_path_and_params() {
        assert_eq!(callback().app_origin().as_str(), "http://localhost:3000/");
        assert_eq!(callback().port(), Some(3000));
    }

    #[test]
    fn test_recording_navigator_keeps_order() {
        let nav = RecordingNavigator::default();
        nav.navigate(&Url::parse("https://a.example/").unwrap()).unwrap();
        nav.navigate(&Url::parse("https://b.example/").unwrap()).unwrap();
        assert_eq!(nav.visited().len(), 2);
        assert_eq!(nav.last().unwrap().as_str(), "https://b.example/");
    }
}
