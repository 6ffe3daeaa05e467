use clap::Parser;
use stindex::config::Cli;
use stindex::{init_tracing, IndexError, IndexKind, Job, JobConfig, OrderedTermMap, TermIndex, TermTree};
use std::path::Path;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing("stindex");

    let config = match cli.job_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.index {
        IndexKind::Tree => run::<TermTree>(config, cli.stats_json.as_deref()),
        IndexKind::Map => run::<OrderedTermMap>(config, cli.stats_json.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run<I: TermIndex>(config: JobConfig, stats_json: Option<&Path>) -> Result<(), IndexError> {
    // process input into the interim index
    let mut job: Job<I> = Job::new(config);
    job.run()?;

    // unzip interim results into the final file
    job.persist_results()?;

    if let Some(path) = stats_json {
        job.stats().write_json(path)?;
    }
    Ok(())
}
