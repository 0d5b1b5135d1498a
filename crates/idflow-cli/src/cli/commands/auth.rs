//! Login, callback and logout handlers.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use idflow_core::address::{BrowserNavigator, Navigator};
use idflow_core::config::Config;
use idflow_core::identity::IdentityClient;
use idflow_session::Phase;
use idflow_types::LoginProvider;
use url::Url;

use super::CliSession;
use crate::cli::callback_listener;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

pub async fn login(config: &Config, provider: LoginProvider, listen: bool) -> Result<()> {
    let mut session = CliSession::new(config)?;
    session.restore().await;
    if let Some(account) = session.logged_in_account() {
        println!("Already logged in as {account}. Run `idflow logout` first to switch accounts.");
        return Ok(());
    }

    // Bind before redirecting so a fast redirect is not missed.
    let listener = if listen {
        Some(callback_listener::bind(&session.callback).await?)
    } else {
        None
    };

    session.runtime.login(provider).await;
    if let Some(error) = session.runtime.ui().errors {
        bail!("{error}");
    }
    let Some(login_url) = session.runtime.navigator().last() else {
        bail!("Identity service returned no login URL");
    };

    println!("Log in with {} at:", provider.display_name());
    println!("{login_url}");
    if let Err(e) = BrowserNavigator.navigate(&login_url) {
        tracing::warn!("{e:#}");
    }

    let Some(listener) = listener else {
        println!();
        println!("After approving, pass the address you were redirected to:");
        println!("  idflow callback '<redirect url>'");
        return Ok(());
    };

    println!("Waiting for the redirect on {} ...", session.callback.url());
    let address =
        callback_listener::wait_for_callback(&listener, &session.callback, CALLBACK_TIMEOUT)
            .await?;
    session.runtime.callback(address).await;
    finish_login(&session)
}

pub async fn callback(config: &Config, raw: &str) -> Result<()> {
    let address = Url::parse(raw.trim()).with_context(|| format!("Invalid URL: {raw}"))?;
    let mut session = CliSession::new(config)?;
    if !session.callback.matches(&address) {
        bail!(
            "{address} does not match the registered callback address {}",
            session.callback.url()
        );
    }

    session.runtime.startup(address).await;
    finish_login(&session)
}

fn finish_login(session: &CliSession) -> Result<()> {
    let ui = session.runtime.ui();
    if let Some(error) = ui.errors {
        bail!("{error}");
    }
    match (session.logged_in_account(), &session.runtime.state.profile) {
        (Some(account), Some(profile)) => {
            let name = if profile.display_name.is_empty() {
                account
            } else {
                profile.display_name.as_str()
            };
            println!("Logged in as {name} ({account})");
            Ok(())
        }
        _ => bail!(
            "Login did not complete (state: {})",
            session.runtime.state.phase.name()
        ),
    }
}

pub async fn logout(config: &Config) -> Result<()> {
    let mut session = CliSession::new(config)?;
    session.restore().await;

    if session.runtime.state.phase == Phase::Unauthenticated {
        // A session that failed to restore may still be cached.
        session.runtime.identity().clear_session()?;
        println!("Not logged in.");
        return Ok(());
    }

    session.runtime.logout().await;
    println!("Logged out.");
    Ok(())
}
