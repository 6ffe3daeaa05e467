pub mod config;
pub mod error;
pub mod ingest;
pub mod job;
pub mod line_stream;
pub mod logging;
pub mod multi_stream;
pub mod term_index;
pub mod term_tree;
pub mod unzip;

pub use error::IndexError;
pub use job::{Job, JobConfig, JobStats};
pub use logging::init_tracing;
pub use term_index::{IndexKind, OrderedTermMap, TermIndex};
pub use term_tree::{SearchTerm, TermTree};
