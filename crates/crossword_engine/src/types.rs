use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::builder::ValidationError;
use crate::extract::ExtractError;
use crate::persist::PersistError;
use crate::puz::PuzError;

pub type JobId = u64;

/// Puzzle variants published daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrosswordType {
    Cryptic,
    Mini,
    Quick,
}

impl CrosswordType {
    pub const ALL: [CrosswordType; 3] = [Self::Cryptic, Self::Mini, Self::Quick];

    /// Lowercase name used in URLs and file names.
    pub fn as_str(self) -> &'static str {
        match self {
            CrosswordType::Cryptic => "cryptic",
            CrosswordType::Mini => "mini",
            CrosswordType::Quick => "quick",
        }
    }
}

impl fmt::Display for CrosswordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown crossword type {0:?} (expected cryptic, mini or quick)")]
pub struct UnknownCrosswordType(pub String);

impl FromStr for CrosswordType {
    type Err = UnknownCrosswordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCrosswordType(s.to_string()))
    }
}

/// One fetch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PuzzleRequest {
    pub kind: CrosswordType,
    pub date: NaiveDate,
}

impl PuzzleRequest {
    pub fn new(kind: CrosswordType, date: NaiveDate) -> Self {
        Self { kind, date }
    }

    /// ISO-8601 calendar date, as used in URLs and in the embedded record.
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Path relative to the crossword base URL: `{type}/{date}`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.kind, self.iso_date())
    }

    /// Default file name inside the per-type directory.
    pub fn file_name(&self) -> String {
        format!("{}-{}.puz", self.iso_date(), self.kind)
    }
}

impl fmt::Display for PuzzleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.kind, self.date)
    }
}

/// Every (type, date) combination, type-major.
pub fn combinations(kinds: &[CrosswordType], dates: &[NaiveDate]) -> Vec<PuzzleRequest> {
    kinds
        .iter()
        .flat_map(|kind| dates.iter().map(move |date| PuzzleRequest::new(*kind, *date)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Queued,
    Downloading,
    Extracting,
    Building,
    Writing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub job_id: JobId,
    pub stage: Stage,
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(JobProgress),
    JobCompleted {
        job_id: JobId,
        request: PuzzleRequest,
        result: Result<PathBuf, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Problems with user-supplied parameters. Raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("date range must include both start and end values")]
    EmptyRangeBound,
    #[error("could not parse date {input:?}: {message}")]
    UnparseableDate { input: String, message: String },
    #[error("end date {end} must be on or after start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("when downloading multiple crosswords, the output must be a directory: {0}")]
    OutputNotDirectory(PathBuf),
}

/// Everything that can go wrong for a single (type, date) item.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encode(#[from] PuzError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
