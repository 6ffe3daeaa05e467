use crate::line_stream::{read_file, LineStream};
use crate::IndexError;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::thread;
use tracing::trace;

/// When the per-file producers are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenPolicy {
    /// Start every producer up front. Files not yet being drained keep their
    /// handle open while they wait for their turn.
    #[default]
    Eager,
    /// Read each file on the composition thread once the previous one is
    /// exhausted, so at most one input handle is open at a time.
    Lazy,
}

/// Concatenation of several [`LineStream`]s, in path order.
///
/// A composition thread forwards lines from the active file to a
/// zero-capacity output channel; file boundaries are invisible to the
/// consumer. Paths that cannot be read contribute nothing.
pub struct MultiFileStream {
    receiver: Receiver<Vec<u8>>,
}

impl MultiFileStream {
    /// Start the stream. Fails if a producer or the composition thread
    /// cannot be started.
    pub fn new(paths: Vec<PathBuf>, policy: OpenPolicy) -> Result<Self, IndexError> {
        let (sender, receiver) = bounded(0);

        let sources = match policy {
            OpenPolicy::Eager => Sources::Started(
                paths
                    .iter()
                    .map(|path| LineStream::open(path))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            OpenPolicy::Lazy => Sources::Pending(paths),
        };

        thread::Builder::new()
            .name("lines-compose".to_string())
            .spawn(move || compose(sources, &sender))
            .map_err(|e| IndexError::Other(format!("failed to start stream composer: {}", e)))?;

        Ok(Self { receiver })
    }

    /// Eager stream over `paths`.
    pub fn serial(paths: Vec<PathBuf>) -> Result<Self, IndexError> {
        Self::new(paths, OpenPolicy::Eager)
    }
}

impl Iterator for MultiFileStream {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        self.receiver.recv().ok()
    }
}

enum Sources {
    Started(Vec<LineStream>),
    Pending(Vec<PathBuf>),
}

fn compose(sources: Sources, sink: &Sender<Vec<u8>>) {
    match sources {
        Sources::Started(streams) => {
            for (index, stream) in streams.into_iter().enumerate() {
                if !forward(stream, sink, index) {
                    return;
                }
            }
        }
        Sources::Pending(paths) => {
            for (index, path) in paths.iter().enumerate() {
                if !read_file(path, sink) {
                    return;
                }
                trace!(file_index = index, "input exhausted");
            }
        }
    }
}

/// Drain one file into the sink. Returns false if the consumer is gone.
fn forward(stream: LineStream, sink: &Sender<Vec<u8>>, index: usize) -> bool {
    let mut forwarded = 0usize;
    for line in stream {
        if sink.send(line).is_err() {
            return false;
        }
        forwarded += 1;
    }
    trace!(file_index = index, lines = forwarded, "input exhausted");
    true
}
