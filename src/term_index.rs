use crate::term_tree::{InOrder, TermTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered term → count structure that the ingestion loop writes and the
/// persist step reads. Terms are raw bytes.
pub trait TermIndex: Default {
    type Entries<'a>: Iterator<Item = (&'a [u8], u64)>
    where
        Self: 'a;

    /// Add one occurrence of `term`. Returns the count after the insert.
    fn insert_or_increment(&mut self, term: Vec<u8>) -> u64;

    /// Distinct terms held.
    fn len(&self) -> usize;

    /// Occurrences recorded across all terms.
    fn total(&self) -> u64;

    /// `(term, count)` pairs in ascending byte order.
    fn entries(&self) -> Self::Entries<'_>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which [`TermIndex`] a job aggregates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Unbalanced binary search tree.
    #[default]
    Tree,
    /// Balanced ordered map.
    Map,
}

impl TermIndex for TermTree {
    type Entries<'a> = TreeEntries<'a>;

    fn insert_or_increment(&mut self, term: Vec<u8>) -> u64 {
        TermTree::insert_or_increment(self, term)
    }

    fn len(&self) -> usize {
        TermTree::len(self)
    }

    fn total(&self) -> u64 {
        TermTree::total(self)
    }

    fn entries(&self) -> TreeEntries<'_> {
        TreeEntries {
            inner: self.traverse_in_order(),
        }
    }
}

pub struct TreeEntries<'a> {
    inner: InOrder<'a>,
}

impl<'a> Iterator for TreeEntries<'a> {
    type Item = (&'a [u8], u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|t| (t.term.as_slice(), t.times))
    }
}

/// [`TermIndex`] over a `BTreeMap`, for inputs where the unbalanced tree's
/// worst case matters (for example already-sorted logs).
#[derive(Debug, Default)]
pub struct OrderedTermMap {
    counts: BTreeMap<Vec<u8>, u64>,
    total: u64,
}

impl OrderedTermMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, term: impl AsRef<[u8]>) -> Option<u64> {
        self.counts.get(term.as_ref()).copied()
    }
}

impl TermIndex for OrderedTermMap {
    type Entries<'a> = MapEntries<'a>;

    fn insert_or_increment(&mut self, term: Vec<u8>) -> u64 {
        self.total += 1;
        let count = self.counts.entry(term).or_insert(0);
        *count += 1;
        *count
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn entries(&self) -> MapEntries<'_> {
        MapEntries {
            inner: self.counts.iter(),
        }
    }
}

pub struct MapEntries<'a> {
    inner: std::collections::btree_map::Iter<'a, Vec<u8>, u64>,
}

impl<'a> Iterator for MapEntries<'a> {
    type Item = (&'a [u8], u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(term, times)| (term.as_slice(), *times))
    }
}
