mod cli;
mod config;

use std::process::ExitCode;

use clap::Parser;
use crossword_engine::{
    combinations, flush_conversion_log, resolve_dates, BatchReport, ConversionAudit, Harvester,
    LogProgressSink, OutputPlan, ParameterError, PuzzleRequest,
};
use engine_logging::{engine_error, engine_info, LogDestination};
use log::LevelFilter;

use crate::cli::Cli;

/// Everything decided before the first request goes out.
struct RunPlan {
    harvester: Harvester,
    requests: Vec<PuzzleRequest>,
    output: OutputPlan,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let plan = match prepare(&cli) {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("error: {err:#}");
            let is_parameter = err.chain().any(|cause| cause.is::<ParameterError>());
            return if is_parameter {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            };
        }
    };

    match execute(plan) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            engine_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, level);
}

fn prepare(cli: &Cli) -> anyhow::Result<RunPlan> {
    let settings = config::fetch_settings(cli)?;
    let dates = resolve_dates(cli.date.as_deref())?;
    let requests = combinations(&cli.unique_types(), &dates);
    let output = OutputPlan::resolve(&cli.output, requests.len())?;
    output.prepare()?;

    Ok(RunPlan {
        harvester: Harvester::new(settings)?,
        requests,
        output,
    })
}

fn execute(plan: RunPlan) -> anyhow::Result<BatchReport> {
    let runtime = tokio::runtime::Runtime::new()?;
    let mut audit = ConversionAudit::new();
    let report = runtime.block_on(plan.harvester.run(
        &plan.requests,
        &plan.output,
        &mut audit,
        &LogProgressSink,
    ));

    if let Some(log_path) = flush_conversion_log(&mut audit, &plan.output) {
        println!("Conversions logged to: {}", log_path.display());
    }
    engine_info!(
        "{} of {} crossword(s) saved under {}",
        report.saved.len(),
        plan.requests.len(),
        plan.output.root().display()
    );
    Ok(report)
}
