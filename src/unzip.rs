use crate::term_index::TermIndex;
use crate::IndexError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::trace;

/// Expand every `(term, count)` of `index` into `count` lines of `term`, in
/// ascending order, appended to the file at `path` (created if absent).
///
/// Each line is its own `write_all` on an unbuffered handle. The first
/// failed write aborts with whatever was already written left in place.
/// Returns the number of lines written.
pub fn unzip_to_file<I: TermIndex>(index: &I, path: impl AsRef<Path>) -> Result<u64, IndexError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;

    let written = unzip_into(index, &mut file)?;
    file.flush()?;
    trace!(path = %path.display(), lines = written, "unzip complete");
    Ok(written)
}

/// [`unzip_to_file`] over any writer. Terms are written as their raw bytes.
pub fn unzip_into<I, W>(index: &I, out: &mut W) -> Result<u64, IndexError>
where
    I: TermIndex,
    W: Write,
{
    let mut written = 0u64;
    let mut line = Vec::new();
    for (term, times) in index.entries() {
        line.clear();
        line.extend_from_slice(term);
        line.push(b'\n');
        for _ in 0..times {
            out.write_all(&line)?;
            written += 1;
        }
    }
    Ok(written)
}
