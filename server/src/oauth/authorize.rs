use color_eyre::eyre::WrapErr;
use serde_json::{json, Map, Value};

use crate::config::{acr_for_method, OidcConfig};

/// Userinfo claim hints sent in the `claims` request parameter.
///
/// Each hint becomes `{"<claim>": {"value": <v>}}` under `userinfo`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClaimHints {
    hints: Vec<(String, String)>,
}

impl ClaimHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `t` / `mt` pair a page passes along to the provider
    pub fn t_mt(t: &str, mt: &str) -> Self {
        Self::new().with("t", t).with("mt", mt)
    }

    pub fn with(mut self, claim: &str, value: &str) -> Self {
        self.hints.retain(|(c, _)| c != claim);
        self.hints.push((claim.to_string(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn to_claims_json(&self) -> Value {
        let userinfo: Map<String, Value> = self
            .hints
            .iter()
            .map(|(claim, value)| (claim.clone(), json!({ "value": value })))
            .collect();

        json!({ "userinfo": userinfo })
    }
}

/// How the browser should be sent to the authorize endpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavigationMode {
    /// GET redirect, or an auto-submitted POST form once claims are attached
    #[default]
    Auto,
    Redirect,
    FormPost,
}

/// Where to send the browser next
#[derive(Clone, Debug, PartialEq)]
pub enum Navigation {
    /// GET redirect to a fully built authorize URL
    Redirect(String),
    /// POST of `fields` to `action`, submitted by the page without user input
    FormPost {
        action: String,
        fields: Vec<(String, String)>,
    },
}

impl Navigation {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }
}

/// The parameters of one authorization request, built fresh per call
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
    pub scope: String,
    pub method: String,
    pub claims: ClaimHints,
    pub mode: NavigationMode,
}

impl AuthorizationRequest {
    pub fn new(scope: &str, method: &str) -> Self {
        Self {
            scope: scope.to_string(),
            method: method.to_string(),
            claims: ClaimHints::default(),
            mode: NavigationMode::Auto,
        }
    }

    pub fn with_claims(mut self, claims: ClaimHints) -> Self {
        self.claims = claims;
        self
    }

    pub fn with_mode(mut self, mode: NavigationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Ordered request parameters
    pub fn params(
        &self,
        config: &OidcConfig,
        redirect_uri: &str,
        state: &str,
    ) -> crate::Result<Vec<(String, String)>> {
        let mut params = vec![
            ("response_type".to_string(), "code".to_string()),
            ("redirect_uri".to_string(), redirect_uri.to_string()),
            ("client_id".to_string(), config.client_id.clone()),
            ("scope".to_string(), self.scope.clone()),
            ("state".to_string(), state.to_string()),
            ("acr_values".to_string(), acr_for_method(&self.method)),
        ];

        if !self.claims.is_empty() {
            let claims = serde_json::to_string(&self.claims.to_claims_json())
                .wrap_err("Failed to serialize claims request")?;
            params.push(("claims".to_string(), claims));
        }

        Ok(params)
    }

    pub fn navigation(
        &self,
        config: &OidcConfig,
        redirect_uri: &str,
        state: &str,
    ) -> crate::Result<Navigation> {
        let params = self.params(config, redirect_uri, state)?;

        let use_form = match self.mode {
            NavigationMode::Auto => !self.claims.is_empty(),
            NavigationMode::Redirect => false,
            NavigationMode::FormPost => true,
        };

        if use_form {
            return Ok(Navigation::FormPost {
                action: config.authorize_uri.clone(),
                fields: params,
            });
        }

        let query =
            serde_urlencoded::to_string(&params).wrap_err("Failed to encode authorize query")?;
        let separator = if config.authorize_uri.contains('?') {
            '&'
        } else {
            '?'
        };

        Ok(Navigation::Redirect(format!(
            "{}{}{}",
            config.authorize_uri, separator, query
        )))
    }
}
