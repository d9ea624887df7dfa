use super::{notify::RequestError, OidcClient};

impl OidcClient {
    /// Fetch the userinfo document for `access_token`, returned as raw text
    #[tracing::instrument(skip_all, fields(userinfo_uri = %self.config().userinfo_uri))]
    pub async fn request_user_info(&self, access_token: &str) -> Result<String, RequestError> {
        let url = self.config().userinfo_uri.clone();

        let response = self
            .http()
            .get(&url)
            .bearer_auth(access_token)
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
            tracing::error!(%status, "Userinfo request failed");
            return Err(RequestError::Status { url, status, body });
        }

        Ok(body)
    }
}
