//! Stub trees: the compact, index-worthy summary of a syntax tree.
//!
//! A stub keeps a declaration's kind, name, flags and a navigation anchor.
//! It never stores subtree text. Stubs are addressed by [`StubPath`], the
//! sequence of child indices from the root, so an index entry can find its
//! stub (and through it the syntax node) without walking by name.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::base::{Name, TextRange};
use crate::parser::SyntaxKind;

// ============================================================================
// FLAGS
// ============================================================================

/// Grammar-specific boolean facts about a stub, stored as a fixed-width bitset.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StubFlags(u32);

impl StubFlags {
    pub const EMPTY: StubFlags = StubFlags(0);
    /// `const` rather than `let`
    pub const CONSTANT: StubFlags = StubFlags(1 << 0);
    /// Carries a value or body, not just a name
    pub const DEFINITION: StubFlags = StubFlags(1 << 1);
    /// Marked `export`
    pub const EXPORTED: StubFlags = StubFlags(1 << 2);
    pub const PARAMETER: StubFlags = StubFlags(1 << 3);
    pub const LOOP_BINDING: StubFlags = StubFlags(1 << 4);
    pub const IMPORT: StubFlags = StubFlags(1 << 5);

    const ALL: u32 = (1 << 6) - 1;

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Flags from raw bits, rejecting unknown bits.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::ALL == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    pub const fn contains(self, other: StubFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: StubFlags) {
        self.0 |= other.0;
    }

    /// Insert `other` when `condition` holds.
    pub fn set(&mut self, other: StubFlags, condition: bool) {
        if condition {
            self.insert(other);
        }
    }
}

impl BitOr for StubFlags {
    type Output = StubFlags;

    fn bitor(self, rhs: StubFlags) -> StubFlags {
        StubFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StubFlags {
    fn bitor_assign(&mut self, rhs: StubFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for StubFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(StubFlags, &str); 6] = [
            (StubFlags::CONSTANT, "CONSTANT"),
            (StubFlags::DEFINITION, "DEFINITION"),
            (StubFlags::EXPORTED, "EXPORTED"),
            (StubFlags::PARAMETER, "PARAMETER"),
            (StubFlags::LOOP_BINDING, "LOOP_BINDING"),
            (StubFlags::IMPORT, "IMPORT"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("StubFlags(EMPTY)")
        } else {
            write!(f, "StubFlags({})", set.join(" | "))
        }
    }
}

// ============================================================================
// NODES
// ============================================================================

/// One index-worthy declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StubNode {
    pub kind: SyntaxKind,
    pub name: Option<Name>,
    pub flags: StubFlags,
    /// Range of the originating syntax node, the navigation anchor
    pub range: Option<TextRange>,
    pub children: Vec<StubNode>,
}

impl StubNode {
    pub fn new(kind: SyntaxKind, name: Option<Name>, flags: StubFlags) -> Self {
        Self {
            kind,
            name,
            flags,
            range: None,
            children: Vec::new(),
        }
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_children(mut self, children: Vec<StubNode>) -> Self {
        self.children = children;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of stubs in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(StubNode::subtree_len).sum::<usize>()
    }

    fn depth(&self) -> usize {
        1 + self.children.iter().map(StubNode::depth).max().unwrap_or(0)
    }
}

/// Child-index path from the root of a [`StubTree`].
///
/// The empty path names the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StubPath(Vec<u32>);

impl StubPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: impl IntoIterator<Item = u32>) -> Self {
        Self(indices.into_iter().collect())
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// True if `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &StubPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for StubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// The stub tree of one file. The root has kind `SOURCE_FILE` and no name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StubTree {
    root: StubNode,
}

impl StubTree {
    pub fn new(root: StubNode) -> Self {
        Self { root }
    }

    /// An empty file's stub tree
    pub fn empty() -> Self {
        Self::new(StubNode::new(SyntaxKind::SOURCE_FILE, None, StubFlags::EMPTY))
    }

    pub fn root(&self) -> &StubNode {
        &self.root
    }

    pub fn into_root(self) -> StubNode {
        self.root
    }

    /// Number of stubs below the root.
    pub fn len(&self) -> usize {
        self.root.subtree_len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Longest root-to-leaf chain, counting the root.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn get(&self, path: &StubPath) -> Option<&StubNode> {
        path.indices()
            .iter()
            .try_fold(&self.root, |node, &i| node.children.get(i as usize))
    }

    /// Pre-order walk over every stub below the root, with its path.
    pub fn iter(&self) -> StubIter<'_> {
        let mut stack = Vec::new();
        for (i, child) in self.root.children.iter().enumerate().rev() {
            stack.push((StubPath::root().child(i as u32), child));
        }
        StubIter { stack }
    }

    /// Stubs named `name`, in pre-order.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (StubPath, &'a StubNode)> + 'a {
        self.iter().filter(move |(_, stub)| stub.name() == Some(name))
    }
}

impl Default for StubTree {
    fn default() -> Self {
        Self::empty()
    }
}

/// Pre-order iterator returned by [`StubTree::iter`].
pub struct StubIter<'a> {
    stack: Vec<(StubPath, &'a StubNode)>,
}

impl<'a> Iterator for StubIter<'a> {
    type Item = (StubPath, &'a StubNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        for (i, child) in node.children.iter().enumerate().rev() {
            self.stack.push((path.child(i as u32), child));
        }
        Some((path, node))
    }
}
