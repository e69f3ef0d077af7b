use std::path::PathBuf;

use engine_logging::{engine_error, engine_info, engine_warn};
use futures_util::future::join_all;

use crate::audit::{ConversionAudit, CONVERSION_LOG_FILENAME};
use crate::builder::PuzzleBuilder;
use crate::extract::{Extractor, InitialStateExtractor};
use crate::fetch::{crossword_url, FetchSettings, Fetcher, ProgressSink, ReqwestFetcher};
use crate::layout::OutputPlan;
use crate::persist::AtomicFileWriter;
use crate::puz::encode_puz;
use crate::{
    EngineEvent, FetchError, FetchOutput, ItemError, JobId, JobProgress, PuzzleRequest, Stage,
};

/// One item that could not be turned into a file.
#[derive(Debug)]
pub struct JobFailure {
    pub request: PuzzleRequest,
    pub error: ItemError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub saved: Vec<PathBuf>,
    pub failures: Vec<JobFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetches every requested puzzle up front, then converts and writes them
/// one at a time.
pub struct Harvester {
    base_url: String,
    fetcher: Box<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    builder: PuzzleBuilder,
}

impl Harvester {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let base_url = settings.base_url.clone();
        Ok(Self::with_parts(
            base_url,
            Box::new(ReqwestFetcher::new(settings)?),
            Box::new(InitialStateExtractor),
            PuzzleBuilder::default(),
        ))
    }

    pub fn with_parts(
        base_url: String,
        fetcher: Box<dyn Fetcher>,
        extractor: Box<dyn Extractor>,
        builder: PuzzleBuilder,
    ) -> Self {
        Self {
            base_url,
            fetcher,
            extractor,
            builder,
        }
    }

    /// Run the whole batch. Item failures are logged and collected; they never
    /// stop the remaining items.
    pub async fn run(
        &self,
        requests: &[PuzzleRequest],
        plan: &OutputPlan,
        audit: &mut ConversionAudit,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        let jobs: Vec<(JobId, PuzzleRequest)> = requests
            .iter()
            .enumerate()
            .map(|(idx, request)| (idx as JobId, *request))
            .collect();
        for (job_id, _) in &jobs {
            progress(sink, *job_id, Stage::Queued, None);
        }

        engine_info!("Fetching {} crossword(s)", jobs.len());
        let fetched = join_all(
            jobs.iter()
                .map(|(job_id, request)| self.fetch_one(*job_id, request, sink)),
        )
        .await;

        let mut report = BatchReport::default();
        for ((job_id, request), page) in jobs.into_iter().zip(fetched) {
            let destination = plan.destination(&request);
            let outcome = page
                .map_err(ItemError::from)
                .and_then(|page| self.process(job_id, &request, page, destination, audit, sink));

            match outcome {
                Ok(path) => {
                    progress(sink, job_id, Stage::Done, None);
                    sink.emit(EngineEvent::JobCompleted {
                        job_id,
                        request,
                        result: Ok(path.clone()),
                    });
                    report.saved.push(path);
                }
                Err(error) => {
                    engine_error!(
                        "Failed to process crossword for {} on {}: {}",
                        request.kind,
                        request.date,
                        error
                    );
                    sink.emit(EngineEvent::JobCompleted {
                        job_id,
                        request,
                        result: Err(error.to_string()),
                    });
                    report.failures.push(JobFailure { request, error });
                }
            }
        }

        engine_info!(
            "Processed {} crossword(s): {} saved, {} failed",
            requests.len(),
            report.saved.len(),
            report.failures.len()
        );
        report
    }

    async fn fetch_one(
        &self,
        job_id: JobId,
        request: &PuzzleRequest,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        let url = crossword_url(&self.base_url, request)?;
        self.fetcher.fetch(job_id, &url, sink).await
    }

    fn process(
        &self,
        job_id: JobId,
        request: &PuzzleRequest,
        page: FetchOutput,
        destination: PathBuf,
        audit: &mut ConversionAudit,
        sink: &dyn ProgressSink,
    ) -> Result<PathBuf, ItemError> {
        progress(sink, job_id, Stage::Extracting, Some(page.metadata.byte_len));
        let record = self.extractor.extract(page)?;

        progress(sink, job_id, Stage::Building, None);
        let puzzle = self.builder.build(record, request, audit)?;
        let bytes = encode_puz(&puzzle)?;

        progress(sink, job_id, Stage::Writing, Some(bytes.len() as u64));
        let file_name = destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.file_name());
        let path = AtomicFileWriter::for_target(&destination).write(&file_name, &bytes)?;
        Ok(path)
    }
}

/// Append pending conversions to the plan's log file. Failures are logged and
/// swallowed so they cannot undo a run whose puzzles are already on disk.
pub fn flush_conversion_log(audit: &mut ConversionAudit, plan: &OutputPlan) -> Option<PathBuf> {
    let log_path = plan.root().join(CONVERSION_LOG_FILENAME);
    match audit.flush(&log_path) {
        Ok(true) => Some(log_path),
        Ok(false) => None,
        Err(err) => {
            engine_warn!(
                "Could not write conversion log {}: {}",
                log_path.display(),
                err
            );
            None
        }
    }
}

fn progress(sink: &dyn ProgressSink, job_id: JobId, stage: Stage, bytes: Option<u64>) {
    sink.emit(EngineEvent::Progress(JobProgress {
        job_id,
        stage,
        bytes,
    }));
}
