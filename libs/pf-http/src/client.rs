use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue, USER_AGENT};
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::HttpClientConfig;
use crate::error::HttpError;
use crate::tls;

/// Maximum number of body bytes echoed into [`HttpError::Status`].
const BODY_PREVIEW_LIMIT: usize = 256;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// JSON REST client bound to one base URL.
///
/// `HttpClient` is `Clone + Send + Sync`; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: HyperClient,
    base_url: String,
    timeout: Duration,
    user_agent: HeaderValue,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a client for `config.base_url`.
    ///
    /// # Errors
    /// Returns [`HttpError::InvalidUrl`] if the base URL is not an absolute
    /// `http`/`https` URL with a host, [`HttpError::Tls`] if the TLS config
    /// cannot be built, or [`HttpError::Request`] for an invalid User-Agent.
    pub fn new(config: HttpClientConfig) -> Result<Self, HttpError> {
        let base_url = validate_base_url(&config.base_url)?;
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| HttpError::Request(http::Error::from(e)))?;

        let tls_config = tls::client_config().map_err(HttpError::Tls)?;
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let mut builder = Client::builder(TokioExecutor::new());
        // pool_timer is required for pool_idle_timeout to take effect
        builder
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(POOL_IDLE_TIMEOUT);
        let inner = builder.build::<_, Full<Bytes>>(https);

        Ok(Self {
            inner,
            base_url,
            timeout: config.request_timeout,
            user_agent,
        })
    }

    /// Base URL requests are resolved against (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}{path}` and decode the JSON response.
    ///
    /// # Errors
    /// Returns [`HttpError`] on transport failure, timeout, non-2xx status or
    /// an undecodable body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, HttpError> {
        let body = self.send(Method::GET, path, None, bearer).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `PATCH {base}{path}` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    /// See [`HttpClient::get_json`].
    pub async fn patch_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let body = self
            .send(Method::PATCH, path, Some(payload), bearer)
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `PUT {base}{path}` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    /// See [`HttpClient::get_json`].
    pub async fn put_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let body = self.send(Method::PUT, path, Some(payload), bearer).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        bearer: Option<&str>,
    ) -> Result<Bytes, HttpError> {
        let url = join_url(&self.base_url, path);
        let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| HttpError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(USER_AGENT, self.user_agent.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if payload.is_some() {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = bearer {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| HttpError::Request(http::Error::from(e)))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        let request = builder.body(Full::new(Bytes::from(payload.unwrap_or_default())))?;

        tracing::debug!(%method, %url, "sending request");

        let exchange = async {
            let response = self.inner.request(request).await?;
            let status = response.status();
            let body = response.into_body().collect().await?.to_bytes();
            Ok::<_, HttpError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| HttpError::Timeout(self.timeout))??;

        if !status.is_success() {
            tracing::debug!(%method, %url, %status, "request failed with status");
            return Err(HttpError::Status {
                status,
                body_preview: body_preview(&body),
            });
        }

        Ok(body)
    }
}

fn validate_base_url(raw: &str) -> Result<String, HttpError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| HttpError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(HttpError::InvalidUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(HttpError::InvalidUrl {
            url: raw.to_owned(),
            reason: "missing host".to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{base}/{}", path.trim_start_matches('/'))
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut preview: String = text.chars().take(BODY_PREVIEW_LIMIT).collect();
    if text.chars().count() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview
}
