//! The position-aware view of a parsed tree.
//!
//! Green nodes only know their lengths. A [`SyntaxNode`] overlays one green
//! element with everything positions need: a parent link, the child index,
//! and the offset within the parent. Wrappers are materialized lazily, one
//! child slot at a time, and cached; a green tree can be shared by any
//! number of overlays.

use std::fmt;
use std::ptr;
use std::sync::OnceLock;

use triomphe::Arc;

use crate::error::Error;
use crate::green::{GreenElement, GreenLen, GreenToken, MultiValue};

/// The kind of a syntax element, for dispatch and highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Whitespace,
    Comment,
    UnterminatedComment,
    CurlyOpen,
    CurlyClose,
    SquareOpen,
    SquareClose,
    Colon,
    Comma,
    String,
    ErrorString,
    Integer,
    UnknownValue,
    UnknownSymbol,
    True,
    False,
    Missing,
    Background,
    ValueWithBackground,
    MultiValue,
    KeyValue,
    List,
    Map,
}

/// One materialized red node.
///
/// `parent` is a non-owning pointer: children are owned by their parent's
/// lazy slots, and every public handle retains the root, so the whole tree
/// outlives any pointer into it. Keeping the uplink raw is what makes the
/// parent/child cycle ownership-safe.
struct RedData {
    green: GreenElement,
    /// Null only at the root.
    parent: *const RedData,
    /// Child index within the parent.
    index: usize,
    /// Offset within the parent.
    start: usize,
    children: Box<[OnceLock<Arc<RedData>>]>,
}

// SAFETY: all green payloads are Send + Sync, the lazy slots synchronize
// through OnceLock, and `parent` is only dereferenced through handles that
// keep the owning tree alive.
unsafe impl Send for RedData {}
unsafe impl Sync for RedData {}

impl RedData {
    fn new(green: GreenElement, parent: *const RedData, index: usize, start: usize) -> Self {
        let children = (0..green.child_count())
            .map(|_| OnceLock::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            green,
            parent,
            index,
            start,
            children,
        }
    }
}

/// A red node: a cheaply cloneable handle to one position in the tree.
///
/// The handle keeps the entire tree alive; navigation in any direction is
/// allocation-free once the wrappers along the way exist. Lazy wrappers are
/// created on first access under a first-publisher-wins discipline, so
/// concurrent readers of a shared tree are fine.
pub struct SyntaxNode {
    root: Arc<RedData>,
    node: *const RedData,
}

// SAFETY: see RedData. The handle's `node` pointer always targets a node
// owned by `root`.
unsafe impl Send for SyntaxNode {}
unsafe impl Sync for SyntaxNode {}

impl Clone for SyntaxNode {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            node: self.node,
        }
    }
}

impl SyntaxNode {
    pub(crate) fn new_root(green: GreenElement) -> Self {
        let root = Arc::new(RedData::new(green, ptr::null(), 0, 0));
        let node: *const RedData = &*root;
        Self { root, node }
    }

    fn data(&self) -> &RedData {
        // SAFETY: `node` points into the tree retained by `root`; nodes are
        // never dropped while the root is alive.
        unsafe { &*self.node }
    }

    /// The green element this node overlays.
    pub fn green(&self) -> &GreenElement {
        &self.data().green
    }

    pub fn kind(&self) -> SyntaxKind {
        match &self.data().green {
            GreenElement::Token(token) => match token {
                GreenToken::Whitespace(_) => SyntaxKind::Whitespace,
                GreenToken::Comment(_) => SyntaxKind::Comment,
                GreenToken::UnterminatedComment(_) => SyntaxKind::UnterminatedComment,
                GreenToken::CurlyOpen => SyntaxKind::CurlyOpen,
                GreenToken::CurlyClose => SyntaxKind::CurlyClose,
                GreenToken::SquareOpen => SyntaxKind::SquareOpen,
                GreenToken::SquareClose => SyntaxKind::SquareClose,
                GreenToken::Colon => SyntaxKind::Colon,
                GreenToken::Comma => SyntaxKind::Comma,
                GreenToken::String(_) => SyntaxKind::String,
                GreenToken::ErrorString(_) => SyntaxKind::ErrorString,
                GreenToken::Integer(_) => SyntaxKind::Integer,
                GreenToken::UnknownValue(_) => SyntaxKind::UnknownValue,
                GreenToken::UnknownSymbol(_) => SyntaxKind::UnknownSymbol,
                GreenToken::True => SyntaxKind::True,
                GreenToken::False => SyntaxKind::False,
            },
            GreenElement::Background(_) => SyntaxKind::Background,
            GreenElement::ValueWithBackground(_) => SyntaxKind::ValueWithBackground,
            GreenElement::MultiValue(_) => SyntaxKind::MultiValue,
            GreenElement::KeyValue(_) => SyntaxKind::KeyValue,
            GreenElement::List(_) => SyntaxKind::List,
            GreenElement::Map(_) => SyntaxKind::Map,
            GreenElement::Missing => SyntaxKind::Missing,
        }
    }

    /// Length in bytes, delegated to the green element.
    pub fn len(&self) -> usize {
        self.data().green.green_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Is this node a terminal symbol emitted by the lexer?
    pub fn is_token(&self) -> bool {
        self.data().green.is_token()
    }

    /// Offset within the parent; 0 at the root.
    pub fn start(&self) -> usize {
        self.data().start
    }

    /// Offset from the start of the source: the sum of `start` up to the
    /// root.
    pub fn absolute_start(&self) -> usize {
        let mut data = self.data();
        let mut offset = data.start;
        while !data.parent.is_null() {
            // SAFETY: parents are owned by the same tree as `self`.
            data = unsafe { &*data.parent };
            offset += data.start;
        }
        offset
    }

    /// The parent node; `None` only at the root.
    pub fn parent(&self) -> Option<SyntaxNode> {
        let parent = self.data().parent;
        (!parent.is_null()).then(|| SyntaxNode {
            root: self.root.clone(),
            node: parent,
        })
    }

    /// Child index within the parent; 0 at the root.
    pub fn index(&self) -> usize {
        self.data().index
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// The child at `index`, materializing and caching its wrapper on first
    /// access. Concurrent first accesses agree: the construction is
    /// side-effect-free and the first published wrapper wins.
    pub fn child(&self, index: usize) -> Option<SyntaxNode> {
        let data = self.data();
        let slot = data.children.get(index)?;
        let child = slot.get_or_init(|| {
            Arc::new(RedData::new(
                data.green.child(index),
                self.node,
                index,
                data.green.child_offset(index),
            ))
        });
        let node: *const RedData = &**child;
        Some(SyntaxNode {
            root: self.root.clone(),
            node,
        })
    }

    /// Start of the child at `index` within this node. A pure function of
    /// green offsets: no wrapper is materialized.
    pub fn child_start(&self, index: usize) -> Option<usize> {
        let data = self.data();
        (index < data.children.len()).then(|| data.green.child_offset(index))
    }

    /// Iterate over all children in order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        (0..self.child_count()).filter_map(move |index| self.child(index))
    }

    /// Every terminal-symbol descendant whose closed span `[start, start +
    /// len]` touches the closed query window `[start, start + length]`, in
    /// source order. `start` is relative to this node.
    pub fn terminals_in_range(&self, start: usize, length: usize) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        let start = start as i64;
        self.collect_terminals(start, start + length as i64, &mut out);
        out
    }

    fn collect_terminals(&self, window_start: i64, window_end: i64, out: &mut Vec<SyntaxNode>) {
        if window_start > self.len() as i64 || window_end < 0 {
            return;
        }
        if self.is_token() {
            out.push(self.clone());
            return;
        }
        let green = &self.data().green;
        for index in 0..self.child_count() {
            let child_start = green.child_offset(index) as i64;
            let child_end = child_start + green.child(index).green_len() as i64;
            if child_start <= window_end && child_end >= window_start {
                if let Some(child) = self.child(index) {
                    child.collect_terminals(
                        window_start - child_start,
                        window_end - child_start,
                        out,
                    );
                }
            }
        }
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_node(f, self, 0)
    }
}

fn print_node(f: &mut fmt::Formatter<'_>, node: &SyntaxNode, indent: usize) -> fmt::Result {
    let start = node.absolute_start();
    let end = start + node.len();
    write!(f, "{:indent$}{:?}@{}..{}", "", node.kind(), start, end)?;
    if let GreenElement::Token(token) = node.green() {
        match token {
            GreenToken::String(token) => write!(f, " {:?}", token.value())?,
            GreenToken::ErrorString(token) => write!(f, " {:?}", token.value())?,
            GreenToken::Integer(token) => write!(f, " {}", token.value())?,
            GreenToken::UnknownValue(token) => write!(f, " {:?}", token.text())?,
            GreenToken::UnknownSymbol(token) => write!(f, " {}", token.display())?,
            _ => {}
        }
    }
    writeln!(f)?;
    for child in node.children() {
        print_node(f, &child, indent + 4)?;
    }
    Ok(())
}

/// A parsed tree: the root syntax node plus every error encountered while
/// producing it.
///
/// Check the errors before trusting the shape of the tree:
///
/// ## Example
/// ```rust
/// use json_lossless::Parser;
///
/// let tree = Parser::new("[1, 2]").parse();
/// assert!(tree.errors().is_empty());
/// let root = tree.syntax();
/// assert_eq!(root.len(), 6);
/// ```
pub struct SyntaxTree {
    root: SyntaxNode,
    errors: Vec<Error>,
}

impl SyntaxTree {
    pub(crate) fn new(green: Arc<MultiValue>, errors: Vec<Error>) -> Self {
        Self {
            root: SyntaxNode::new_root(GreenElement::MultiValue(green)),
            errors,
        }
    }

    /// The root node; always a [`SyntaxKind::MultiValue`].
    pub fn syntax(&self) -> SyntaxNode {
        self.root.clone()
    }

    /// Get a reference to the tree's errors, in detection order.
    pub fn errors(&self) -> &[Error] {
        self.errors.as_slice()
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_node(f, &self.root, 0)?;
        for error in &self.errors {
            writeln!(f, "- {error:?}")?;
        }
        Ok(())
    }
}
