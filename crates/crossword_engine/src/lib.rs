//! Crossword engine: fetch, extract, build and write daily crosswords.
mod audit;
mod builder;
mod convert;
mod dates;
mod decode;
mod engine;
mod extract;
mod fetch;
mod layout;
mod persist;
mod puz;
mod sanitize;
mod types;

pub use audit::{ConversionAudit, ConversionRecord, CONVERSION_LOG_FILENAME};
pub use builder::{
    ClueRecord, PuzzleBuilder, PuzzleModel, RawClues, RawCrosswordRecord, ValidationError,
    COPYRIGHT,
};
pub use convert::{Converter, Html2MdConverter};
pub use dates::{
    now_in_reference_tz, parse_range, parse_single_date, resolve_dates, resolve_dates_at,
    resolve_range, today, DateOrder, REFERENCE_TZ,
};
pub use decode::{decode_page, CharsetError, DecodedPage};
pub use engine::{flush_conversion_log, BatchReport, Harvester, JobFailure};
pub use extract::{
    crossword_record, extract_embedded_json, unescape_js_string, ExtractError, Extractor,
    InitialStateExtractor,
};
pub use fetch::{
    crossword_url, FetchSettings, Fetcher, LogProgressSink, ProgressSink, ReqwestFetcher,
    DEFAULT_BASE_URL,
};
pub use layout::OutputPlan;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use puz::{checksum, encode_puz, PuzError};
pub use sanitize::{demojize, TextSanitizer};
pub use types::{
    combinations, CrosswordType, EngineEvent, FailureKind, FetchError, FetchMetadata,
    FetchOutput, ItemError, JobId, JobProgress, ParameterError, PuzzleRequest, Stage,
    UnknownCrosswordType,
};
