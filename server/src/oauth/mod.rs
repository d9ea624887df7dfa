//! OIDC client helper: build the authorization request, send the browser to
//! the identity provider, then exchange the returned code and fetch userinfo.
//!
//! Failed back-channel requests are never returned to the caller. They go to
//! the page's [`Notifier`] as a single alert and the success callback is
//! simply not called.

use std::sync::Arc;

use color_eyre::eyre::WrapErr;

use crate::config::OidcConfig;

pub mod authorize;
pub mod notify;
pub mod query;
pub mod session;
pub mod token;
pub mod userinfo;

pub use authorize::{AuthorizationRequest, ClaimHints, Navigation, NavigationMode};
pub use notify::{Alerts, Notifier, RequestError, TracingNotifier};
pub use query::extract_query_param;
pub use session::{generate_state, MemorySessionStore, SessionStore, STATE_KEY};
pub use token::TokenResponse;

/// Client configuration plus the HTTP client used for back-channel calls
#[derive(Clone, Debug)]
pub struct OidcClient {
    config: Arc<OidcConfig>,
    http: reqwest::Client,
}

impl OidcClient {
    pub fn new(config: OidcConfig) -> crate::Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .use_rustls_tls()
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: OidcConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }

    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// The helper as seen from one page load.
///
/// A fresh `state` is generated when the helper is created and stays the same
/// for its lifetime.
pub struct OidcHelper<S, N> {
    client: OidcClient,
    page_url: String,
    state: String,
    session: S,
    notifier: N,
}

impl<S: SessionStore, N: Notifier> OidcHelper<S, N> {
    pub fn new(client: OidcClient, page_url: impl Into<String>, session: S, notifier: N) -> Self {
        Self {
            client,
            page_url: page_url.into(),
            state: generate_state(),
            session,
            notifier,
        }
    }

    pub fn client(&self) -> &OidcClient {
        &self.client
    }

    /// The state generated for this page load
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Current page URL without its query string
    pub fn redirect_uri(&self) -> &str {
        query::strip_query(&self.page_url)
    }

    /// Read a query parameter from the current page URL
    pub fn query_param(&self, name: &str) -> Option<String> {
        extract_query_param(name, &self.page_url)
    }

    /// Value saved before the last redirect to the provider, if any
    pub fn stored_state(&self) -> Option<String> {
        self.session.get_item(STATE_KEY)
    }

    /// Whether the `state` on the current URL equals the stored one
    pub fn returned_state_matches(&self) -> bool {
        session::state_matches(
            self.stored_state().as_deref(),
            self.query_param("state").as_deref(),
        )
    }

    /// Store this page's `state` and work out where to send the browser
    pub fn initiate_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> crate::Result<Navigation> {
        let navigation =
            request.navigation(self.client.config(), self.redirect_uri(), &self.state)?;

        self.session.set_item(STATE_KEY, &self.state);

        tracing::info!(
            method = %request.method,
            scope = %request.scope,
            redirect = navigation.is_redirect(),
            "Starting authorization"
        );

        Ok(navigation)
    }

    /// Exchange `code` for tokens and hand the response to `on_success`.
    ///
    /// On failure one alert goes to the notifier and `on_success` is dropped
    /// uncalled.
    pub async fn exchange_code_for_token<F>(
        &self,
        code: &str,
        on_success: F,
        extra_params: &[(String, String)],
    ) where
        F: FnOnce(TokenResponse),
    {
        match self
            .client
            .request_token(code, self.redirect_uri(), extra_params)
            .await
        {
            Ok(token) => on_success(token),
            Err(err) => self.notifier.alert(&err.alert_text()),
        }
    }

    /// Fetch userinfo with `access_token` and hand the raw body to
    /// `on_success`. Failures are reported like the token exchange.
    pub async fn fetch_user_info<F>(&self, access_token: &str, on_success: F)
    where
        F: FnOnce(String),
    {
        match self.client.request_user_info(access_token).await {
            Ok(body) => on_success(body),
            Err(err) => self.notifier.alert(&err.alert_text()),
        }
    }
}
