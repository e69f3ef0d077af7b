use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, JobId, JobProgress,
    PuzzleRequest, Stage,
};

pub const DEFAULT_BASE_URL: &str = "https://www.smh.com.au/puzzles/crosswords";

/// Media types a crossword page may be served as.
const PAGE_MEDIA_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("smh-crossword/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Page URL for one request: `{base_url}/{type}/{YYYY-MM-DD}`.
pub fn crossword_url(base_url: &str, request: &PuzzleRequest) -> Result<String, FetchError> {
    let mut base = Url::parse(base_url)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&request.relative_path())
        .map(|url| url.to_string())
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Reports progress through the log facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::Progress(JobProgress { job_id, stage, bytes }) => {
                engine_debug!("job {} stage={:?} bytes={:?}", job_id, stage, bytes);
            }
            EngineEvent::JobCompleted {
                job_id,
                request,
                result: Ok(path),
            } => {
                engine_info!("job {} saved {} to {}", job_id, request, path.display());
            }
            EngineEvent::JobCompleted {
                job_id,
                request,
                result: Err(message),
            } => {
                engine_warn!("job {} failed for {}: {}", job_id, request, message);
            }
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        job_id: JobId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError>;
}

/// Fetches crossword pages with one shared client, so concurrent jobs reuse
/// connections to the same host.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            max_bytes: settings.max_bytes,
        })
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        job_id: JobId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        engine_debug!("job {} GET {}", job_id, parsed);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;

        if let Some(declared) = response.content_length().filter(|len| *len > self.max_bytes) {
            return Err(self.too_large(declared));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = content_type.as_deref().filter(|ct| !is_page_media_type(ct)) {
            return Err(FetchError::new(
                FailureKind::UnsupportedContentType {
                    content_type: ct.to_string(),
                },
                "not an html page",
            ));
        }
        let final_url = response.url().to_string();

        sink.emit(EngineEvent::Progress(JobProgress {
            job_id,
            stage: Stage::Downloading,
            bytes: Some(0),
        }));
        let mut bytes = Vec::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(classify)?;
            let total = (bytes.len() + chunk.len()) as u64;
            if total > self.max_bytes {
                return Err(self.too_large(total));
            }
            bytes.extend_from_slice(&chunk);
            sink.emit(EngineEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Downloading,
                bytes: Some(total),
            }));
        }
        engine_debug!("job {} received {} bytes from {}", job_id, bytes.len(), final_url);

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            content_type,
            byte_len: bytes.len() as u64,
        };
        Ok(FetchOutput { bytes, metadata })
    }
}

fn is_page_media_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    PAGE_MEDIA_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(media_type))
}

fn classify(err: reqwest::Error) -> FetchError {
    let kind = if let Some(status) = err.status() {
        FailureKind::HttpStatus(status.as_u16())
    } else if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::RedirectLimitExceeded
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
