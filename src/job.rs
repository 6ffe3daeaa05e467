use crate::ingest::ingest;
use crate::multi_stream::{MultiFileStream, OpenPolicy};
use crate::term_index::TermIndex;
use crate::term_tree::TermTree;
use crate::unzip::unzip_to_file;
use crate::IndexError;
use serde::Serialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::info;

/// Validated description of one indexing run. The aggregation structure is
/// chosen by the `Job` type parameter, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    /// Raw terms held in memory before they are merged into the index.
    pub ingestion_capacity: NonZeroUsize,
    pub input_paths: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub open_policy: OpenPolicy,
}

impl JobConfig {
    pub fn new(ingestion_capacity: NonZeroUsize, input_paths: Vec<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            ingestion_capacity,
            input_paths,
            output_path: output_path.into(),
            open_policy: OpenPolicy::default(),
        }
    }

    pub fn with_open_policy(mut self, open_policy: OpenPolicy) -> Self {
        self.open_policy = open_policy;
        self
    }
}

/// Wall-clock bounds and duration of one job phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTiming {
    /// Milliseconds since the Unix epoch.
    pub started_at: u64,
    pub ended_at: u64,
    pub elapsed: Duration,
}

struct PhaseTimer {
    started_at: u64,
    clock: Instant,
}

impl PhaseTimer {
    fn start() -> Self {
        Self {
            started_at: unix_millis(SystemTime::now()),
            clock: Instant::now(),
        }
    }

    fn finish(self) -> PhaseTiming {
        PhaseTiming {
            started_at: self.started_at,
            ended_at: unix_millis(SystemTime::now()),
            elapsed: self.clock.elapsed(),
        }
    }
}

fn unix_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Counts and timings gathered while a job runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    /// Lines pulled from the inputs, duplicates included.
    pub terms_processed: u64,
    pub distinct_terms: usize,
    pub batches: u64,
    pub lines_written: u64,
    pub ingest: Option<PhaseTiming>,
    pub persist: Option<PhaseTiming>,
}

impl JobStats {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// One indexing run. Owns the aggregation index from creation until the
/// job is dropped.
pub struct Job<I: TermIndex = TermTree> {
    config: JobConfig,
    index: I,
    stats: JobStats,
}

impl<I: TermIndex> Job<I> {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            index: I::default(),
            stats: JobStats::default(),
        }
    }

    /// Stream every input into the index, `ingestion_capacity` terms at a time.
    ///
    /// Fails if the input producers cannot be started.
    pub fn run(&mut self) -> Result<&JobStats, IndexError> {
        info!(ram_size = self.config.ingestion_capacity.get(), "RAM size");
        info!(files = ?self.config.input_paths, "Input files");
        info!("Starting processing");

        let timer = PhaseTimer::start();
        let stream = MultiFileStream::new(self.config.input_paths.clone(), self.config.open_policy)?;
        let report = ingest(stream, self.config.ingestion_capacity, &mut self.index);
        let timing = timer.finish();

        self.stats.terms_processed += report.terms;
        self.stats.batches += report.batches;
        self.stats.distinct_terms = self.index.len();
        self.stats.ingest = Some(timing);

        info!(
            terms = self.stats.terms_processed,
            distinct = self.stats.distinct_terms,
            elapsed = ?timing.elapsed,
            "Processed {} search terms",
            self.stats.terms_processed
        );
        Ok(&self.stats)
    }

    /// Unzip the index into the configured output file.
    pub fn persist_results(&mut self) -> Result<&JobStats, IndexError> {
        let timer = PhaseTimer::start();
        let written = unzip_to_file(&self.index, &self.config.output_path)?;
        let timing = timer.finish();

        self.stats.lines_written = written;
        self.stats.persist = Some(timing);

        info!(
            outfile = %self.config.output_path.display(),
            lines = written,
            elapsed = ?timing.elapsed,
            "Unzipped to destination file"
        );
        Ok(&self.stats)
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn stats(&self) -> &JobStats {
        &self.stats
    }
}
