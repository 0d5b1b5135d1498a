//! `idflow sign`.

use anyhow::{Result, bail};
use idflow_core::config::Config;

use super::CliSession;

pub async fn run(config: &Config, network: Option<&str>) -> Result<()> {
    let mut session = CliSession::new(config)?;
    session.restore().await;
    if session.logged_in_account().is_none() {
        match session.runtime.ui().errors {
            Some(error) => bail!("{error}"),
            None => bail!("Not logged in; run `idflow login` first"),
        }
    }

    let network = network.unwrap_or(config.signing.network.as_str());
    tracing::info!(network, "opening signing widget");
    session.runtime.open_signing_widget(Some(network)).await;

    let ui = session.runtime.ui();
    if let Some(error) = ui.errors {
        bail!("{error}");
    }
    match ui.last_sign_result {
        Some(result) => {
            println!("{result}");
            Ok(())
        }
        None => bail!("Signing did not produce a result"),
    }
}
