//! Auth command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use histpaste_core::auth::{GITHUB_KEY, SavedToken, TokenStore, mask_token};
use histpaste_core::config::Config;
use histpaste_core::sinks::{GistClient, GistConfig};

pub async fn login(token: Option<String>, config: &Config) -> Result<()> {
    let mut store = TokenStore::load().context("load token store")?;

    let token = match token {
        Some(token) => token,
        None => {
            if let Some(existing) = store.get(GITHUB_KEY) {
                println!(
                    "Already logged in to GitHub{} (token: {})",
                    existing
                        .login
                        .as_deref()
                        .map(|login| format!(" as {login}"))
                        .unwrap_or_default(),
                    mask_token(&existing.token)
                );
                if !confirm("Do you want to replace the existing token? [y/N] ")? {
                    println!("Login cancelled.");
                    return Ok(());
                }
            }
            prompt("Paste a GitHub personal access token with the gist scope: ")?
        }
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("No token provided");
    }

    let client = GistClient::new(GistConfig::from_config(config)?);
    let login = client
        .authenticated_login(&token)
        .await
        .context("validate GitHub token")?;

    store.set(GITHUB_KEY, SavedToken::new(token.clone(), Some(login.clone())));
    store.save().context("save token")?;

    println!("✓ Logged in to GitHub as {login} (token: {})", mask_token(&token));
    println!("  Token saved to: {}", TokenStore::path().display());
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut store = TokenStore::load().context("load token store")?;

    if store.remove(GITHUB_KEY).is_some() {
        store.save().context("save token store")?;
        println!("✓ Logged out from GitHub");
        println!("  Token removed from: {}", TokenStore::path().display());
    } else {
        println!("Not logged in to GitHub (no saved token found).");
    }

    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(message: &str) -> Result<bool> {
    Ok(prompt(message)?.eq_ignore_ascii_case("y"))
}
