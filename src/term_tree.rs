use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// A search term and how many times it has been seen.
///
/// The term is kept as the raw bytes it was read as; it need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub term: Vec<u8>,
    pub times: u64,
}

impl SearchTerm {
    pub fn new(term: impl Into<Vec<u8>>, times: u64) -> Self {
        Self { term: term.into(), times }
    }

    /// Byte-wise order on the term only. `times` never takes part.
    pub fn compare(&self, other: &SearchTerm) -> Ordering {
        self.term.cmp(&other.term)
    }

    /// The term as text, with invalid UTF-8 replaced.
    pub fn term_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.term)
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.term_lossy(), self.times)
    }
}

struct Node {
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
    data: SearchTerm,
}

impl Node {
    fn leaf(term: Vec<u8>) -> Box<Self> {
        Box::new(Self {
            left: None,
            right: None,
            data: SearchTerm { term, times: 1 },
        })
    }
}

/// Unbalanced binary search tree of [`SearchTerm`]s.
///
/// Every node's left subtree holds smaller terms and its right subtree
/// larger ones. A term is stored once; repeated inserts bump its count.
/// Sorted input degenerates the tree into a list, so insertion, traversal
/// and drop are all iterative.
#[derive(Default)]
pub struct TermTree {
    root: Option<Box<Node>>,
    len: usize,
    total: u64,
}

impl TermTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `term`, creating its record if needed.
    /// Returns the term's count after the insert.
    pub fn insert_or_increment<S>(&mut self, term: S) -> u64
    where
        S: AsRef<[u8]> + Into<Vec<u8>>,
    {
        self.total += 1;

        let mut link = &mut self.root;
        while let Some(node) = link {
            match term.as_ref().cmp(node.data.term.as_slice()) {
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
                Ordering::Equal => {
                    node.data.times += 1;
                    return node.data.times;
                }
            }
        }

        *link = Some(Node::leaf(term.into()));
        self.len += 1;
        1
    }

    /// Chaining form of [`insert_or_increment`](Self::insert_or_increment).
    pub fn insert(&mut self, term: impl AsRef<[u8]>) -> &mut Self {
        self.insert_or_increment(term.as_ref());
        self
    }

    pub fn get(&self, term: impl AsRef<[u8]>) -> Option<&SearchTerm> {
        let term = term.as_ref();
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match term.cmp(node.data.term.as_slice()) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(&node.data),
            }
        }
        None
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Longest root-to-leaf path, in nodes.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Node, usize)> = self.root.as_deref().map(|n| (n, 1)).into_iter().collect();
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                pending.push((child, depth + 1));
            }
        }
        deepest
    }

    /// Records in ascending term order. Each call starts a fresh traversal.
    pub fn traverse_in_order(&self) -> InOrder<'_> {
        InOrder::new(self.root.as_deref())
    }
}

impl Drop for TermTree {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl<'a> IntoIterator for &'a TermTree {
    type Item = &'a SearchTerm;
    type IntoIter = InOrder<'a>;

    fn into_iter(self) -> InOrder<'a> {
        self.traverse_in_order()
    }
}

/// In-order traversal over a [`TermTree`], driven by an explicit stack.
pub struct InOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> InOrder<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut current: Option<&'a Node>) {
        while let Some(node) = current {
            self.stack.push(node);
            current = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a SearchTerm;

    fn next(&mut self) -> Option<&'a SearchTerm> {
        let node = self.stack.pop()?;
        self.descend_left(node.right.as_deref());
        Some(&node.data)
    }
}
