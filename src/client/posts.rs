use super::PlatformClient;
use crate::error::{AppError, Result};
use crate::wire::PostsPageResponse;
use tracing::instrument;

impl PlatformClient {
    /// `GET blog/<author>/post/?offset=<offset>&limit=<limit>` (§4.5/§6).
    /// maps HTTP status to the error taxonomy: 404 -> `NoUsername`, 401 ->
    /// `Unauthorized`, other non-2xx -> `UnknownApiError`, unparsable body ->
    /// `ValidationError`.
    #[instrument(skip(self), fields(author = %author))]
    pub async fn get_author_posts(
        &self,
        author: &str,
        limit: u32,
        offset: &str,
    ) -> Result<PostsPageResponse> {
        let url = format!("{}/blog/{author}/post/", self.base_url());

        let response = self
            .api_client()
            .get(&url)
            .query(&[("offset", offset), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();

        if status.as_u16() == 404 {
            return Err(AppError::NoUsername(author.to_string()));
        }
        if status.as_u16() == 401 {
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AppError::UnknownApiError {
                status: status.as_u16(),
                details,
            });
        }

        let body = response.bytes().await.map_err(classify_reqwest_error)?;
        serde_json::from_slice::<PostsPageResponse>(&body)
            .map_err(|e| AppError::ValidationError(format!("unexpected response shape: {e}")))
    }

    /// `GET blog/<author>/post/<post_id>/`, used by single-post mode (§6
    /// `--post-url`); same status mapping as [`PlatformClient::get_author_posts`]
    #[instrument(skip(self), fields(author = %author, %post_id))]
    pub async fn get_post(&self, author: &str, post_id: &str) -> Result<crate::wire::RawPost> {
        let url = format!("{}/blog/{author}/post/{post_id}/", self.base_url());

        let response = self
            .api_client()
            .get(&url)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(AppError::NoUsername(author.to_string()));
        }
        if status.as_u16() == 401 {
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AppError::UnknownApiError {
                status: status.as_u16(),
                details,
            });
        }

        let body = response.bytes().await.map_err(classify_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("unexpected response shape: {e}")))
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() || err.is_connect() {
        AppError::TransientNetworkError(err.to_string())
    } else {
        AppError::Reqwest(err)
    }
}
