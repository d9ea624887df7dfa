use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION};

use super::{notify::RequestError, OidcClient};

/// Token endpoint response, passed on without interpretation
pub type TokenResponse = serde_json::Value;

/// `Authorization` header value for HTTP Basic client authentication
pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Form body for the token request. Entries in `extra_params` override the
/// standard ones.
pub fn token_request_params(
    code: &str,
    redirect_uri: &str,
    extra_params: &[(String, String)],
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::from([
        (
            "grant_type".to_string(),
            "authorization_code".to_string(),
        ),
        ("code".to_string(), code.to_string()),
        ("redirect_uri".to_string(), redirect_uri.to_string()),
    ]);

    for (key, value) in extra_params {
        params.insert(key.clone(), value.clone());
    }

    params
}

/// Pull the access token out of a token response
pub fn access_token(token: &TokenResponse) -> Option<&str> {
    token.get("access_token").and_then(|v| v.as_str())
}

impl OidcClient {
    /// Exchange an authorization code at the token endpoint
    #[tracing::instrument(skip_all, fields(token_uri = %self.config().token_uri))]
    pub async fn request_token(
        &self,
        code: &str,
        redirect_uri: &str,
        extra_params: &[(String, String)],
    ) -> Result<TokenResponse, RequestError> {
        let config = self.config();
        let url = config.token_uri.clone();
        let params = token_request_params(code, redirect_uri, extra_params);

        let response = self
            .http()
            .post(&url)
            .header(
                AUTHORIZATION,
                basic_authorization(&config.client_id, &config.client_secret),
            )
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            tracing::error!(%status, "Token request failed");
            return Err(RequestError::Status { url, status, body });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|source| RequestError::Decode {
                url: url.clone(),
                source,
            })?;

        tracing::info!(
            token_type = token.get("token_type").and_then(|v| v.as_str()),
            "Token request succeeded"
        );

        Ok(token)
    }
}
