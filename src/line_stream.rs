use crate::IndexError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use tracing::debug;

/// Lazy sequence of trimmed, non-empty lines read from a single source.
///
/// Lines are raw bytes: nothing is decoded, so terms that are not valid
/// UTF-8 pass through untouched. They are produced by a dedicated thread
/// and handed over through a zero-capacity channel, so the producer never
/// reads more than one line ahead of the consumer. A source that cannot be
/// opened yields an empty sequence. Once exhausted the stream stays
/// exhausted.
///
/// Dropping the stream disconnects the channel; the producer thread notices
/// on its next send and exits.
pub struct LineStream {
    receiver: Receiver<Vec<u8>>,
}

impl LineStream {
    /// Start a producer for the file at `path`. The file is opened on the
    /// producer thread, immediately.
    ///
    /// Fails only if the producer thread cannot be started.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref().to_path_buf();
        let builder = thread::Builder::new().name(thread_name(&path));
        Self::spawn(builder, move |sender| {
            read_file(&path, &sender);
        })
    }

    /// Start a producer over any buffered reader.
    pub fn from_reader<R>(reader: R) -> Result<Self, IndexError>
    where
        R: BufRead + Send + 'static,
    {
        let builder = thread::Builder::new().name("lines-reader".to_string());
        Self::spawn(builder, move |sender| {
            produce_lines(reader, &sender, Path::new("<reader>"));
        })
    }

    fn spawn<F>(builder: thread::Builder, body: F) -> Result<Self, IndexError>
    where
        F: FnOnce(Sender<Vec<u8>>) + Send + 'static,
    {
        let (sender, receiver) = bounded(0);
        builder.spawn(move || body(sender)).map_err(|e| {
            IndexError::Other(format!("failed to start line producer: {}", e))
        })?;
        Ok(Self { receiver })
    }
}

impl Iterator for LineStream {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        self.receiver.recv().ok()
    }
}

/// Send every term of the file at `path` to `sink`. An unreadable file
/// sends nothing. Returns false if the consumer is gone.
pub(crate) fn read_file(path: &Path, sink: &Sender<Vec<u8>>) -> bool {
    match File::open(path) {
        Ok(file) => produce_lines(BufReader::new(file), sink, path),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "input unreadable, contributing no lines");
            true
        }
    }
}

fn produce_lines<R: BufRead>(mut reader: R, sink: &Sender<Vec<u8>>, origin: &Path) -> bool {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return true,
            Ok(_) => {}
            Err(e) => {
                debug!(path = %origin.display(), error = %e, "read failed, ending input early");
                return true;
            }
        }

        let term = trim_whitespace(&buf);
        if term.is_empty() {
            continue;
        }

        if sink.send(term.to_vec()).is_err() {
            // consumer went away
            return false;
        }
    }
}

/// Strip leading and trailing Unicode whitespace from `line`. Bytes that are
/// not valid UTF-8 are never whitespace and stop the trim.
pub(crate) fn trim_whitespace(line: &[u8]) -> &[u8] {
    let mut start = 0;
    for chunk in line.utf8_chunks() {
        let valid = chunk.valid();
        let rest = valid.trim_start();
        start += valid.len() - rest.len();
        if !rest.is_empty() || !chunk.invalid().is_empty() {
            break;
        }
    }

    let line = &line[start..];
    let chunks: Vec<_> = line.utf8_chunks().collect();
    let mut end = line.len();
    for chunk in chunks.iter().rev() {
        if !chunk.invalid().is_empty() {
            break;
        }
        let valid = chunk.valid();
        let rest = valid.trim_end();
        end -= valid.len() - rest.len();
        if !rest.is_empty() {
            break;
        }
    }
    &line[..end]
}

fn thread_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    format!("lines-{}", file_name)
}
