use async_trait::async_trait;
use pf_http::{HttpClient, HttpError};
use pf_utils::SecretString;
use session_sdk::{ProfileClientV1, SessionError, UserProfile};

use super::dto::ProfileDto;

/// [`ProfileClientV1`] over the backend's current-user endpoint.
///
/// Any non-2xx answer is a rejection of the token. Transport failures and
/// timeouts are [`SessionError::Unavailable`].
pub struct RestProfileClient {
    http: HttpClient,
    path: String,
}

impl RestProfileClient {
    pub fn new(http: HttpClient, path: impl Into<String>) -> Self {
        Self {
            http,
            path: path.into(),
        }
    }
}

impl std::fmt::Debug for RestProfileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestProfileClient")
            .field("base_url", &self.http.base_url())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ProfileClientV1 for RestProfileClient {
    async fn current_user(&self, token: &SecretString) -> Result<UserProfile, SessionError> {
        let dto: ProfileDto = self
            .http
            .get_json(&self.path, Some(token.expose()))
            .await
            .map_err(map_http_error)?;
        Ok(dto.into())
    }
}

fn map_http_error(e: HttpError) -> SessionError {
    match e {
        HttpError::Status { status, .. } => SessionError::rejected(status.as_u16()),
        HttpError::Json(e) => SessionError::internal(format!("invalid profile payload: {e}")),
        HttpError::InvalidUrl { .. } | HttpError::Request(_) => {
            SessionError::internal(e.to_string())
        }
        other => SessionError::unavailable(other.to_string()),
    }
}
