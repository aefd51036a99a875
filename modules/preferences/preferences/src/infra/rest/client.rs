use std::sync::Arc;

use async_trait::async_trait;
use pf_http::{BearerSource, HttpClient, HttpError};
use preferences_sdk::{Preferences, PreferencesClientV1, PreferencesError, PreferencesPatch};

use super::dto::{PreferencesDto, PreferencesPatchDto, PreferencesRecordDto};

/// [`PreferencesClientV1`] over the backend's JSON REST API.
///
/// The bearer token is read from `auth` on every call, so the client keeps
/// working across login and logout.
pub struct RestPreferencesClient {
    http: HttpClient,
    auth: Arc<dyn BearerSource>,
    path: String,
}

impl RestPreferencesClient {
    pub fn new(http: HttpClient, auth: Arc<dyn BearerSource>, path: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            path: path.into(),
        }
    }
}

impl std::fmt::Debug for RestPreferencesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestPreferencesClient")
            .field("base_url", &self.http.base_url())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PreferencesClientV1 for RestPreferencesClient {
    async fn get_preferences(&self) -> Result<Preferences, PreferencesError> {
        let token = self.auth.bearer_token();
        let dto: PreferencesRecordDto = self
            .http
            .get_json(&self.path, token.as_ref().map(|t| t.expose()))
            .await
            .map_err(map_http_error)?;
        Ok(dto.into())
    }

    async fn patch_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> Result<Preferences, PreferencesError> {
        let token = self.auth.bearer_token();
        let body = PreferencesPatchDto::from(patch);
        let dto: PreferencesRecordDto = self
            .http
            .patch_json(&self.path, &body, token.as_ref().map(|t| t.expose()))
            .await
            .map_err(map_http_error)?;
        Ok(dto.into())
    }

    async fn replace_preferences(
        &self,
        preferences: Preferences,
    ) -> Result<Preferences, PreferencesError> {
        let token = self.auth.bearer_token();
        let body = PreferencesDto::from(preferences);
        let dto: PreferencesRecordDto = self
            .http
            .put_json(&self.path, &body, token.as_ref().map(|t| t.expose()))
            .await
            .map_err(map_http_error)?;
        Ok(dto.into())
    }
}

fn map_http_error(e: HttpError) -> PreferencesError {
    match e {
        HttpError::Status {
            status,
            body_preview,
        } => PreferencesError::rejected(status.as_u16(), body_preview),
        HttpError::Json(e) => PreferencesError::internal(format!("invalid payload: {e}")),
        HttpError::InvalidUrl { .. } | HttpError::Request(_) => {
            PreferencesError::internal(e.to_string())
        }
        other => PreferencesError::unavailable(other.to_string()),
    }
}
