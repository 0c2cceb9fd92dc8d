use std::future::Future;

use checker_core::{AnalysisRequest, AnalysisResult, JobSource};
use checker_logging::{checker_debug, checker_info};
use futures_util::StreamExt;
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded;

use crate::http::{encode_body, map_reqwest_error, ClientSettings, HttpClient};
use crate::stream::{read_analysis_stream, ProgressSink};
use crate::types::{ApiError, HealthStatus, HistoryPage, JobSubmission};

/// Everything the client asks of the backend.
#[async_trait::async_trait]
pub trait CheckerApi: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    async fn analyze(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ApiError>;

    /// Like [`CheckerApi::analyze`], reporting each pipeline step to `sink`.
    async fn analyze_stream(
        &self,
        request: &AnalysisRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ApiError>;

    async fn history(&self, user_id: &str, limit: usize) -> Result<HistoryPage, ApiError>;

    /// Asks the backend to fetch a job description from a LinkedIn URL.
    async fn fetch_job(&self, url: &str) -> Result<JobSubmission, ApiError>;
}

#[derive(Debug, Serialize)]
struct JobUrlRequest<'a> {
    source_type: JobSource,
    url: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    http: HttpClient,
}

impl ReqwestApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(settings)?,
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[async_trait::async_trait]
impl CheckerApi for ReqwestApi {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let timeout = self.http.settings().health_timeout;
        self.http
            .request_once::<(), _>(Method::GET, "/health", None, timeout)
            .await
    }

    async fn analyze(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ApiError> {
        let timeout = self.http.settings().analysis_timeout;
        let result: AnalysisResult = cancellable(
            cancel,
            self.http
                .request(Method::POST, "/analyze", Some(request), timeout),
        )
        .await?;
        checker_info!(
            "analysis {} finished with score {}",
            result.analysis_id,
            result.overall_score
        );
        Ok(result)
    }

    async fn analyze_stream(
        &self,
        request: &AnalysisRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ApiError> {
        let url = self.http.endpoint("/analyze/stream")?;
        let payload = encode_body(Some(request))?;
        let timeout = self.http.settings().analysis_timeout;
        let max_line_bytes = self.http.settings().max_line_bytes;

        let response = cancellable(
            cancel,
            self.http.send(Method::POST, url, payload, timeout),
        )
        .await?;
        checker_debug!("analysis stream opened ({})", response.status());

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error));
        let result = read_analysis_stream(chunks, sink, cancel, max_line_bytes).await?;
        checker_info!(
            "streamed analysis {} finished with score {}",
            result.analysis_id,
            result.overall_score
        );
        Ok(result)
    }

    async fn history(&self, user_id: &str, limit: usize) -> Result<HistoryPage, ApiError> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("user_id", user_id)
            .append_pair("limit", &limit.to_string())
            .finish();
        let timeout = self.http.settings().request_timeout;
        self.http
            .request::<(), _>(Method::GET, &format!("/history?{query}"), None, timeout)
            .await
    }

    async fn fetch_job(&self, url: &str) -> Result<JobSubmission, ApiError> {
        let body = JobUrlRequest {
            source_type: JobSource::LinkedinUrl,
            url,
        };
        let timeout = self.http.settings().request_timeout;
        self.http
            .request(Method::POST, "/jobs", Some(&body), timeout)
            .await
    }
}

/// Runs `fut` unless `cancel` fires first.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        outcome = fut => outcome,
    }
}
