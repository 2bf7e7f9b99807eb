//! Owned element tree for rendered pages.
//!
//! Text is stored the ElementTree way: an element's `text` is the text before
//! its first child and its `tail` is the text after its end tag, inside the
//! parent. There are no separate text nodes.
//!
//! Comments and end tags that matched no open element are kept as childless
//! nodes with a `#` tag so that pages serialize back as they were read.

/// Index path from the document root to an element.
///
/// `[2, 0]` is the first child of the root's third child.
pub type NodePath = Vec<usize>;

/// Tag of comment nodes. The node's `text` is the comment body.
pub const COMMENT_TAG: &str = "#comment";

/// Tag of end tags that closed nothing. The node's `text` is the tag name.
pub const UNMATCHED_END_TAG: &str = "#unmatched-end";

/// HTML elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Check whether a (lowercase) tag name is an HTML void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// How the end of an element is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Closing {
    /// Explicit end tag. Void elements have none.
    #[default]
    EndTag,
    /// End implied by the following markup, so no end tag is written.
    Implied,
    /// Self-closing start tag such as `<br/>`.
    SelfClosing,
}

/// An element with its attributes, leading text, children and trailing text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: String,
    /// Text after the end tag (belongs to the parent).
    pub tail: String,
    /// Child elements.
    pub children: Vec<TreeNode>,
    /// How the element ends.
    pub closing: Closing,
}

/// A node following an element among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sibling<'a> {
    /// A run of text (some element's tail).
    Text(&'a str),
    /// The child element at this index of the parent.
    Element(usize),
}

impl TreeNode {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Create a comment node.
    #[must_use]
    pub fn comment(body: impl Into<String>) -> Self {
        Self::new(COMMENT_TAG).with_text(body)
    }

    /// Whether this is a comment node.
    pub fn is_comment(&self) -> bool {
        self.tag == COMMENT_TAG
    }

    /// Whether this node is markup only (comment or unmatched end tag).
    pub fn is_markup_only(&self) -> bool {
        self.tag == COMMENT_TAG || self.tag == UNMATCHED_END_TAG
    }

    /// Set the leading text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the trailing text.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Check whether the `class` attribute contains a token.
    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().any(|c| c == class)
    }

    /// Concatenated text of this element and its descendants, excluding its own tail.
    pub fn text_content(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if !self.is_markup_only() {
            out.push_str(&self.text);
        }
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// First descendant (pre-order, excluding `self`) matching the predicate.
    pub fn find_first(&self, pred: &impl Fn(&TreeNode) -> bool) -> Option<&TreeNode> {
        for child in &self.children {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_first(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Paths of all descendants matching the predicate, in document order.
    ///
    /// Matching elements are not searched further, so nested matches are
    /// not reported.
    pub fn find_paths(&self, pred: &impl Fn(&TreeNode) -> bool) -> Vec<NodePath> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        self.collect_paths(pred, &mut current, &mut paths);
        paths
    }

    fn collect_paths(
        &self,
        pred: &impl Fn(&TreeNode) -> bool,
        current: &mut NodePath,
        paths: &mut Vec<NodePath>,
    ) {
        for (index, child) in self.children.iter().enumerate() {
            current.push(index);
            if pred(child) {
                paths.push(current.clone());
            } else {
                child.collect_paths(pred, current, paths);
            }
            current.pop();
        }
    }

    /// Element at a path relative to this node.
    pub fn node_at(&self, path: &[usize]) -> Option<&TreeNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Mutable element at a path relative to this node.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Nodes that follow the child at `index`, in order.
    ///
    /// Yields the child's tail (if non-empty), then each later child followed
    /// by its tail. Empty tails are not nodes.
    pub fn following_siblings(&self, index: usize) -> impl Iterator<Item = Sibling<'_>> {
        self.children
            .iter()
            .enumerate()
            .skip(index)
            .flat_map(move |(i, child)| {
                let element = (i != index).then_some(Sibling::Element(i));
                let tail = (!child.tail.is_empty()).then_some(Sibling::Text(child.tail.as_str()));
                element.into_iter().chain(tail)
            })
    }

    /// Visit this element and every descendant, pre-order.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut TreeNode)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }
}
