//! Links for `#include "path/to/header.h"` directives.
//!
//! highlight.js renders an include directive as
//!
//! ```html
//! <span class="hljs-meta">#<span class="hljs-meta-keyword">include</span> <span class="hljs-meta-string">"sub/dir/file.h"</span></span>
//! ```
//!
//! The two nodes after the keyword are the separating text and the string
//! token. When the string is a quoted site-relative path, the token is wrapped
//! in an anchor to the header's page and shows the absolute URL in angle
//! brackets instead.

use cedoc_html::{Sibling, TreeNode};

/// Keyword text that starts an include directive.
const INCLUDE_KEYWORD: &str = "include";

/// A quoted local path found after an `include` keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeReference {
    /// Path between the quotes, relative to the site root.
    pub path: String,
}

impl IncludeReference {
    /// Parse the displayed text of an include string token.
    ///
    /// Accepts only `"..."` with a `/` inside; `<vector>` and `"local.h"`
    /// are not local documentation paths.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let path = text.strip_prefix('"')?.strip_suffix('"')?;
        if !path.contains('/') {
            return None;
        }
        Some(Self {
            path: path.to_owned(),
        })
    }

    /// Absolute URL of the referenced file on a site served from `origin`.
    #[must_use]
    pub fn absolute_url(&self, origin: &str) -> String {
        format!(
            "{}/{}",
            origin.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Rewrites include references inside code blocks.
#[derive(Debug, Clone)]
pub struct IncludeRewriter {
    origin: String,
    keyword_class: String,
}

impl IncludeRewriter {
    /// Create a rewriter for a site origin and a keyword token class.
    #[must_use]
    pub fn new(origin: impl Into<String>, keyword_class: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            keyword_class: keyword_class.into(),
        }
    }

    /// Rewrite every applicable include below `node`. Returns the number rewritten.
    pub fn rewrite(&self, node: &mut TreeNode) -> usize {
        let mut rewritten = 0;

        for index in 0..node.children.len() {
            let child = &node.children[index];
            if child.has_class(&self.keyword_class)
                && child.text_content() == INCLUDE_KEYWORD
                && let Some((target, reference)) = self.include_target(node, index)
            {
                let url = reference.absolute_url(&self.origin);
                tracing::debug!(path = %reference.path, %url, "Linking include");
                link_element(&mut node.children, target, &url);
                rewritten += 1;
            }
        }

        for child in &mut node.children {
            rewritten += self.rewrite(child);
        }
        rewritten
    }

    /// Index of the string token after the keyword at `index`, with its reference.
    fn include_target(&self, parent: &TreeNode, index: usize) -> Option<(usize, IncludeReference)> {
        let Sibling::Element(target) = parent.following_siblings(index).nth(1)? else {
            return None;
        };
        let reference = IncludeReference::parse(&parent.children[target].text_content())?;
        Some((target, reference))
    }
}

/// Replace `children[index]` with `<a href=url>` wrapping it, showing `<url>`.
fn link_element(children: &mut [TreeNode], index: usize, url: &str) {
    let token = &mut children[index];
    let tail = std::mem::take(&mut token.tail);
    token.children.clear();
    token.text = format!("<{url}>");

    let token = std::mem::take(token);
    children[index] = TreeNode::new("a")
        .with_attr("href", url)
        .with_children(vec![token])
        .with_tail(tail);
}
