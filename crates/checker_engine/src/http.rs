use std::time::Duration;

use checker_logging::{checker_debug, checker_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::response_error::error_from_response;
use crate::stream::DEFAULT_MAX_LINE_BYTES;
use crate::types::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub analysis_timeout: Duration,
    pub health_timeout: Duration,
    /// Additional attempts after the first one for transient failures.
    pub max_retries: u32,
    /// Attempt `n + 1` waits `retry_base_delay * n`.
    pub retry_base_delay: Duration,
    /// Longest analysis stream line accepted before the read fails.
    pub max_line_bytes: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            analysis_timeout: Duration::from_secs(120),
            health_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_base_delay: Duration::from_secs(1),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

/// Thin wrapper over `reqwest` that speaks JSON to the backend and applies
/// the retry policy.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    settings: ClientSettings,
}

impl HttpClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| ApiError::InvalidUrl(format!("{base_url}: {err}")))?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::NoResponse {
                message: err.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Resolves `path` (which may carry a query string) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|err| ApiError::InvalidUrl(format!("{joined}: {err}")))
    }

    /// Sends a JSON request, retrying transient failures, and decodes the
    /// JSON response.
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_with_retries(method, path, body, timeout, self.settings.max_retries)
            .await
    }

    /// Same as [`HttpClient::request`] with a single attempt.
    pub async fn request_once<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_with_retries(method, path, body, timeout, 0).await
    }

    async fn request_with_retries<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let payload = encode_body(body)?;

        let mut attempt: u32 = 0;
        loop {
            let outcome = match self
                .send(method.clone(), url.clone(), payload.clone(), timeout)
                .await
            {
                Ok(response) => decode_json(response).await,
                Err(err) => Err(err),
            };
            match outcome {
                Err(err) if err.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    let delay = self.settings.retry_base_delay * attempt;
                    checker_warn!(
                        "{} {} failed ({}); retry {}/{} in {:?}",
                        method,
                        url.path(),
                        err,
                        attempt,
                        max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Single attempt. Returns the response only for 2xx statuses; anything
    /// else is converted into an [`ApiError`] from its body.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        payload: Option<Vec<u8>>,
        timeout: Duration,
    ) -> Result<Response, ApiError> {
        checker_debug!("{} {}", method, url);
        let mut builder = self
            .client
            .request(method, url)
            .timeout(timeout)
            .header(ACCEPT, "application/json");
        if let Some(bytes) = payload {
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(error_from_response(status.as_u16(), &body))
    }
}

pub(crate) fn encode_body<B: Serialize + ?Sized>(
    body: Option<&B>,
) -> Result<Option<Vec<u8>>, ApiError> {
    body.map(serde_json::to_vec)
        .transpose()
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::NoResponse {
        message: err.to_string(),
    }
}
