use std::env;

use color_eyre::eyre::eyre;

/// Prefix the identity method is appended to when building `acr_values`
pub const ACR_METHOD_PREFIX: &str = "urn:signicat:oidc:method:";

pub const DEFAULT_AUTHORIZE_URI: &str = "https://dev01.signicat.com/oidc/authorize";
pub const DEFAULT_TOKEN_URI: &str = "https://dev01.signicat.com/oidc/token";
pub const DEFAULT_USERINFO_URI: &str = "https://dev01.signicat.com/oidc/userinfo";

/// Public demo client registered for the dev01 environment.
///
/// They are compiled into the binary and sent to the provider on behalf of
/// every visitor, so treat them as public. Override them with
/// `OIDC_CLIENT_ID` / `OIDC_CLIENT_SECRET` for anything beyond a demo.
pub const DEMO_CLIENT_ID: &str = "184a9125-951b-4160-a81d-cfba7390ae5c";
pub const DEMO_CLIENT_SECRET: &str = "ad7b77f9-1d7a-4687-9cb8-0b514f0d3671";

pub const DEFAULT_SCOPE: &str = "openid profile";

/// Static client configuration for the identity provider
#[derive(Clone, Debug)]
pub struct OidcConfig {
    pub authorize_uri: String,
    pub token_uri: String,
    pub userinfo_uri: String,
    pub client_id: String,
    pub client_secret: String,
    /// Scope used when a page does not ask for one
    pub default_scope: String,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            authorize_uri: DEFAULT_AUTHORIZE_URI.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            userinfo_uri: DEFAULT_USERINFO_URI.to_string(),
            client_id: DEMO_CLIENT_ID.to_string(),
            client_secret: DEMO_CLIENT_SECRET.to_string(),
            default_scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

impl OidcConfig {
    pub fn from_env() -> crate::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            authorize_uri: env_or("OIDC_AUTHORIZE_URI", defaults.authorize_uri),
            token_uri: env_or("OIDC_TOKEN_URI", defaults.token_uri),
            userinfo_uri: env_or("OIDC_USERINFO_URI", defaults.userinfo_uri),
            client_id: env_or("OIDC_CLIENT_ID", defaults.client_id),
            client_secret: env_or("OIDC_CLIENT_SECRET", defaults.client_secret),
            default_scope: env_or("OIDC_SCOPE", defaults.default_scope),
        };

        config.verify()?;

        if config.uses_demo_credentials() {
            tracing::warn!(
                client_id = %config.client_id,
                "Using the public demo client credentials"
            );
        }

        Ok(config)
    }

    /// Point every endpoint at a provider rooted at `base`, e.g. a fixture
    pub fn with_provider_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.authorize_uri = format!("{base}/oidc/authorize");
        self.token_uri = format!("{base}/oidc/token");
        self.userinfo_uri = format!("{base}/oidc/userinfo");
        self
    }

    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.client_id = client_id.to_string();
        self.client_secret = client_secret.to_string();
        self
    }

    pub fn uses_demo_credentials(&self) -> bool {
        self.client_id == DEMO_CLIENT_ID && self.client_secret == DEMO_CLIENT_SECRET
    }

    fn verify(&self) -> crate::Result<()> {
        for (name, value) in [
            ("OIDC_AUTHORIZE_URI", &self.authorize_uri),
            ("OIDC_TOKEN_URI", &self.token_uri),
            ("OIDC_USERINFO_URI", &self.userinfo_uri),
        ] {
            if !(value.starts_with("https://") || value.starts_with("http://")) {
                return Err(eyre!("{} must be an http(s) URL, got {:?}", name, value));
            }
        }

        if self.client_id.is_empty() {
            return Err(eyre!("OIDC_CLIENT_ID must not be empty"));
        }

        Ok(())
    }
}

/// Build the `acr_values` entry for an identity method such as `bankid`
pub fn acr_for_method(method: &str) -> String {
    format!("{ACR_METHOD_PREFIX}{method}")
}

fn env_or(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}
