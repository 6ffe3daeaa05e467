use crate::term_index::TermIndex;
use serde::Serialize;
use std::num::NonZeroUsize;
use tracing::trace;

/// What one ingestion pass pulled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Every line pulled from the stream, before merging.
    pub terms: u64,
    /// Non-empty batches merged into the index.
    pub batches: u64,
}

/// Drain `stream` into `index`, holding at most `capacity` raw terms at a
/// time.
///
/// Each batch is filled completely (or until the stream ends) and merged in
/// pull order before the next batch is pulled. Only the batch is bounded;
/// the index keeps every distinct term.
pub fn ingest<S, I>(stream: S, capacity: NonZeroUsize, index: &mut I) -> IngestReport
where
    S: IntoIterator<Item = Vec<u8>>,
    I: TermIndex,
{
    let capacity = capacity.get();
    let mut stream = stream.into_iter();
    let mut report = IngestReport::default();
    let mut ram: Vec<Vec<u8>> = Vec::with_capacity(capacity);
    let mut more_to_read = true;

    while more_to_read {
        while ram.len() < capacity {
            match stream.next() {
                Some(term) => {
                    ram.push(term);
                    report.terms += 1;
                }
                None => {
                    more_to_read = false;
                    break;
                }
            }
        }

        if ram.is_empty() {
            continue;
        }

        let batch_len = ram.len();
        for term in ram.drain(..) {
            index.insert_or_increment(term);
        }
        report.batches += 1;
        trace!(batch = report.batches, size = batch_len, distinct = index.len(), "batch merged");
    }

    report
}
