use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse as _, Response},
};
use axum::http::StatusCode;
use tower_cookies::{cookie::SameSite, Cookie, Cookies, Key};
use tracing::error;

use crate::{oauth::SessionStore, state::AppState};

/// Session storage backed by private (encrypted) session cookies.
///
/// Cookies are written without an expiry so they last as long as the
/// browser session, and `SameSite=Lax` so they come back on the provider's
/// top-level redirect.
#[derive(Clone)]
pub struct CookieSessionStore {
    cookies: Cookies,
    key: Key,
}

impl CookieSessionStore {
    pub fn new(cookies: Cookies, key: Key) -> Self {
        Self { cookies, key }
    }
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for CookieSessionStore {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = match Cookies::from_request_parts(parts, state).await {
            Ok(cookies) => cookies,
            Err(_) => {
                error!("Failed to extract cookies from request");
                return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            }
        };

        Ok(CookieSessionStore::new(cookies, state.cookie_key.clone()))
    }
}

impl SessionStore for CookieSessionStore {
    fn set_item(&self, key: &str, value: &str) {
        let cookie = Cookie::build((key.to_string(), value.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();

        self.cookies.private(&self.key).add(cookie);
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.cookies
            .private(&self.key)
            .get(key)
            .map(|cookie| cookie.value().to_string())
    }
}
