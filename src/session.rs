//! Authenticated site session.

use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, ScrapeError};

/// Log into the site and return a client carrying the session cookie. Stat
/// pages silently serve an empty shell to anonymous visitors, so everything
/// downstream assumes this client.
pub async fn log_in(cfg: &Config) -> Result<Client> {
    let client = Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()?;

    let url = format!("{}/authenticate?signin=1", cfg.base_url);
    let resp = client
        .post(&url)
        .form(&[
            ("email", cfg.email.as_str()),
            ("pword", cfg.password.as_str()),
            ("authenticate", "signin"),
        ])
        .send()
        .await?;

    // A rejected login bounces back to the authenticate page.
    if !resp.status().is_success() || resp.url().path().contains("authenticate") {
        return Err(ScrapeError::AuthFailed {
            email: cfg.email.clone(),
        });
    }

    info!(email = %cfg.email, "logged in");
    Ok(client)
}
