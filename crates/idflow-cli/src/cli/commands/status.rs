//! `idflow status`.

use anyhow::{Result, bail};
use idflow_core::config::Config;
use idflow_types::{ChainAccount, mask_token};

use super::CliSession;

pub async fn run(config: &Config) -> Result<()> {
    let mut session = CliSession::new(config)?;
    session.restore().await;

    let ui = session.runtime.ui();
    if let Some(error) = ui.errors {
        bail!("{error}");
    }
    let (Some(account), Some(profile)) = (
        session.logged_in_account(),
        session.runtime.state.profile.as_ref(),
    ) else {
        println!("Not logged in.");
        return Ok(());
    };

    println!("Logged in as {account}");
    if !profile.display_name.is_empty() {
        println!("  Name:     {}", profile.display_name);
    }
    if !profile.email.is_empty() {
        println!("  Email:    {}", profile.email);
    }
    if !profile.username.is_empty() {
        println!("  Username: {}", profile.username);
    }
    if let Some(token) = session
        .runtime
        .state
        .session
        .as_ref()
        .and_then(|s| s.token.as_deref())
    {
        println!("  Token:    {}", mask_token(token));
    }

    if profile.permissions.is_empty() {
        println!("  No chain accounts.");
        return Ok(());
    }
    println!("  Chain accounts:");
    for account in profile.permissions.iter().map(ChainAccount::from) {
        println!(
            "    {:<16} {}@{}",
            account.chain_network, account.chain_account, account.permission_name
        );
    }
    Ok(())
}
