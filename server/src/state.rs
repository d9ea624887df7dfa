use std::env;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use color_eyre::eyre::{eyre, WrapErr};
use tower_cookies::Key;

use crate::{config::OidcConfig, oauth::OidcClient};

#[derive(Clone)]
pub struct AppState {
    pub oidc: OidcClient,
    pub cookie_key: Key,
    pub domain: String,
    pub protocol: String,
}

impl AppState {
    pub fn from_env() -> crate::Result<Self> {
        let config = OidcConfig::from_env()?;
        let oidc = OidcClient::new(config)?;

        let domain = env::var("DOMAIN").unwrap_or_else(|_| "localhost:3000".to_string());
        let protocol = env::var("PROTO").unwrap_or_else(|_| "http".to_string());
        tracing::info!(%domain, %protocol, "Serving pages");

        Ok(Self {
            oidc,
            cookie_key: cookie_key_from_env()?,
            domain,
            protocol,
        })
    }

    /// State for tests and fixtures: fixed domain, random cookie key
    pub fn new(oidc: OidcClient, domain: &str) -> Self {
        Self {
            oidc,
            cookie_key: Key::generate(),
            domain: domain.to_string(),
            protocol: "http".to_string(),
        }
    }

    /// Absolute URL of a page as the browser sees it
    pub fn page_url(&self, path_and_query: &str) -> String {
        format!("{}://{}{}", self.protocol, self.domain, path_and_query)
    }
}

/// Read `COOKIE_KEY` (base64, at least 64 bytes) or generate a key for this
/// process. A generated key invalidates stored state on restart.
fn cookie_key_from_env() -> crate::Result<Key> {
    match env::var("COOKIE_KEY") {
        Ok(encoded) => {
            let bytes = STANDARD
                .decode(encoded.trim())
                .wrap_err("COOKIE_KEY is not valid base64")?;
            Key::try_from(bytes.as_slice())
                .map_err(|e| eyre!("COOKIE_KEY is not a usable key: {}", e))
        }
        Err(_) => {
            tracing::warn!("COOKIE_KEY not set, generating a key for this process");
            Ok(Key::generate())
        }
    }
}
