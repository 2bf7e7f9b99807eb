//! Discovery of code blocks that can be opened in Compiler Explorer.
//!
//! A code block is a `<pre>` container with a nested `<code>` element whose
//! class list declares the language (`language-cpp`). The scan only reads the
//! tree and returns index paths; callers mutate afterwards. Mutations made by
//! the pipeline append to or replace in place inside a block, so the paths of
//! the remaining blocks stay valid.

use cedoc_html::{NodePath, TreeNode};

use crate::profile::LanguageProfile;

/// Class prefix carrying the declared language.
const LANGUAGE_CLASS_PREFIX: &str = "language-";

/// A code block accepted for annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedBlock {
    /// Path of the `<pre>` container from the document root.
    pub path: NodePath,
    /// Profile of the declared language.
    pub profile: &'static LanguageProfile,
}

/// Result of scanning a page.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Accepted blocks in document order.
    pub accepted: Vec<ScannedBlock>,
    /// Containers skipped (no language, unsupported language, or already marked).
    pub skipped: usize,
    /// Declared tags that have no profile, in order of first appearance.
    pub unsupported: Vec<String>,
}

/// Finds code blocks with a supported declared language.
#[derive(Debug, Default)]
pub struct BlockScanner {
    /// Attribute marking containers annotated by an earlier run.
    marker: Option<String>,
}

impl BlockScanner {
    /// Create a scanner that visits every container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip containers carrying this attribute.
    #[must_use]
    pub fn skip_marked(mut self, attr: impl Into<String>) -> Self {
        self.marker = Some(attr.into());
        self
    }

    /// Snapshot the accepted blocks below `root`.
    pub fn scan(&self, root: &TreeNode) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for path in root.find_paths(&|node| node.tag == "pre") {
            let Some(pre) = root.node_at(&path) else {
                continue;
            };

            if let Some(marker) = &self.marker
                && pre.attr(marker).is_some()
            {
                tracing::debug!(?path, "Skipping block annotated by an earlier run");
                outcome.skipped += 1;
                continue;
            }

            let Some(tag) = declared_language(pre) else {
                outcome.skipped += 1;
                continue;
            };

            match LanguageProfile::lookup(tag) {
                Some(profile) => outcome.accepted.push(ScannedBlock { path, profile }),
                None => {
                    tracing::debug!(tag, "Skipping block with unsupported language");
                    outcome.skipped += 1;
                    if !outcome.unsupported.iter().any(|t| t == tag) {
                        outcome.unsupported.push(tag.to_owned());
                    }
                }
            }
        }

        outcome
    }
}

/// Declared language of a `<pre>` container.
///
/// Uses the first `<code>` descendant and the first `language-*` token of
/// its class list. Returns `None` if either is missing.
pub fn declared_language(pre: &TreeNode) -> Option<&str> {
    pre.find_first(&|node| node.tag == "code")?
        .class_list()
        .find_map(|class| class.strip_prefix(LANGUAGE_CLASS_PREFIX))
}

#[cfg(test)]
mod tests {
    use cedoc_html::Document;

    use super::*;

    fn scan(html: &str) -> ScanOutcome {
        let doc = Document::parse(html).unwrap();
        BlockScanner::new().scan(&doc.root)
    }

    #[test]
    fn test_accepts_cpp_and_c() {
        let outcome = scan(concat!(
            r#"<pre><code class="hljs language-cpp">int a;</code></pre>"#,
            r#"<div><pre><code class="language-c">int b;</code></pre></div>"#,
        ));

        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.accepted[0].path, vec![0]);
        assert_eq!(outcome.accepted[0].profile.tag, "cpp");
        assert_eq!(outcome.accepted[1].path, vec![1, 0]);
        assert_eq!(outcome.accepted[1].profile.tag, "c");
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_skips_unsupported_languages() {
        let outcome = scan(concat!(
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#,
            r#"<pre><code class="language-python">pass</code></pre>"#,
            r#"<pre><code class="language-rust">let x = 1;</code></pre>"#,
        ));

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.skipped, 3);
        assert_eq!(outcome.unsupported, vec!["rust".to_owned(), "python".to_owned()]);
    }

    #[test]
    fn test_skips_blocks_without_language() {
        let outcome = scan(concat!(
            "<pre>plain text</pre>",
            r#"<pre><code class="hljs">x</code></pre>"#,
            "<pre><code>y</code></pre>",
        ));

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.skipped, 3);
        assert!(outcome.unsupported.is_empty());
    }

    #[test]
    fn test_first_language_class_wins() {
        let doc = Document::parse(
            r#"<pre><code class="language-c language-cpp">x</code></pre>"#,
        )
        .unwrap();
        assert_eq!(declared_language(&doc.root.children[0]), Some("c"));
    }

    #[test]
    fn test_first_code_element_wins() {
        let doc = Document::parse(concat!(
            r#"<pre><span><code class="language-rust">a</code></span>"#,
            r#"<code class="language-cpp">b</code></pre>"#,
        ))
        .unwrap();
        assert_eq!(declared_language(&doc.root.children[0]), Some("rust"));
    }

    #[test]
    fn test_empty_language_suffix_is_unsupported() {
        let outcome = scan(r#"<pre><code class="language-">x</code></pre>"#);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.unsupported, vec![String::new()]);
    }

    #[test]
    fn test_skip_marked_containers() {
        let doc = Document::parse(concat!(
            r#"<pre data-done=""><code class="language-cpp">a</code></pre>"#,
            r#"<pre><code class="language-cpp">b</code></pre>"#,
        ))
        .unwrap();

        let outcome = BlockScanner::new().skip_marked("data-done").scan(&doc.root);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].path, vec![1]);
        assert_eq!(outcome.skipped, 1);

        let unmarked = BlockScanner::new().scan(&doc.root);
        assert_eq!(unmarked.accepted.len(), 2);
    }
}
