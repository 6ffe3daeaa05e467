use crate::job::JobConfig;
use crate::multi_stream::OpenPolicy;
use crate::term_index::IndexKind;
use crate::IndexError;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_RAM_SIZE: usize = 1_000_000;

const LONG_ABOUT: &str = "\
stindex processes a series of input files containing search terms (one term
per line) and creates a single output file where every term appears in
alphabetical (byte-wise) order, repeated once per occurrence.

Blank lines are ignored and surrounding whitespace is stripped. Input files
that do not exist are skipped with a warning. The output file must not exist
yet.

Example: process every file under resources/ with a logical RAM of 100 terms
and save the result to out.log:

    stindex --ramsize 100 --outfile out.log resources/*

Exits 0 on success and 1 if an error occurs.";

/// Command-line arguments of the `stindex` binary.
#[derive(Parser, Debug)]
#[command(name = "stindex")]
#[command(version)]
#[command(about = "Search terms index utility", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Number of search terms that fit in the program's logical RAM
    #[arg(long, default_value_t = DEFAULT_RAM_SIZE)]
    pub ramsize: usize,

    /// File where the sorted output is written. Must not exist.
    #[arg(long)]
    pub outfile: PathBuf,

    /// Open each input only when its turn comes instead of all up front
    #[arg(long)]
    pub lazy_open: bool,

    /// Aggregation structure
    #[arg(long, value_enum, default_value_t = IndexKind::Tree)]
    pub index: IndexKind,

    /// Write run statistics as JSON to this path after the output is persisted
    #[arg(long)]
    pub stats_json: Option<PathBuf>,

    /// Input files containing search terms
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Check the arguments and turn them into a [`JobConfig`].
    ///
    /// Missing input files are dropped with a warning; everything else that
    /// is wrong is an error.
    pub fn job_config(&self) -> Result<JobConfig, IndexError> {
        let capacity = NonZeroUsize::new(self.ramsize).ok_or_else(|| {
            IndexError::Config(format!(
                "RAM size must be a positive number. It was set to: {}",
                self.ramsize
            ))
        })?;

        if self.outfile.as_os_str().is_empty() {
            return Err(IndexError::Config(
                "You must provide an output destination file via --outfile (e.g. --outfile out.log)".to_string(),
            ));
        }
        if self.outfile.exists() {
            return Err(IndexError::Config(format!(
                "Output file ({}) exists. Either delete it or provide a new file name.",
                self.outfile.display()
            )));
        }

        let mut inputs = Vec::with_capacity(self.files.len());
        for file in &self.files {
            if file.exists() {
                inputs.push(file.clone());
            } else {
                warn!(file = %file.display(), "File does not exist. Will skip it.");
            }
        }
        if inputs.is_empty() {
            return Err(IndexError::Config("No input files were given.".to_string()));
        }

        let policy = if self.lazy_open { OpenPolicy::Lazy } else { OpenPolicy::Eager };
        Ok(JobConfig::new(capacity, inputs, self.outfile.clone()).with_open_policy(policy))
    }
}
