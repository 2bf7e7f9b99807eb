//! Lenient HTML tree for post-processing rendered documentation pages.
//!
//! Static site generators emit HTML that is not valid XML: void elements
//! without a closing slash, omitted end tags, named entities, unquoted
//! attributes and raw `<script>` bodies. This crate reads such pages into an
//! owned [`TreeNode`] tree, lets callers query and mutate it, and writes it
//! back. Markup nobody touched is written the way it was read: comments,
//! self-closing tags, omitted and stray end tags are all kept.
//!
//! # Example
//!
//! ```
//! use cedoc_html::Document;
//!
//! let mut doc = Document::parse(r#"<pre><code class="language-c">int x;</code></pre>"#).unwrap();
//! let pre = &mut doc.root.children[0];
//! pre.set_attr("data-seen", "1");
//! assert_eq!(
//!     doc.to_html(),
//!     r#"<pre data-seen="1"><code class="language-c">int x;</code></pre>"#
//! );
//! ```

mod document;
mod entities;
mod error;
mod parser;
mod tree;

pub use document::Document;
pub use error::HtmlError;
pub use tree::{
    COMMENT_TAG, Closing, NodePath, Sibling, TreeNode, UNMATCHED_END_TAG, is_void_element,
};
