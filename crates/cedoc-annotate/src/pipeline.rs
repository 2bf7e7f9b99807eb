//! Page annotation pipeline: scan, link, rewrite includes, center tooltips.

use cedoc_config::{Config, DEFAULT_META_KEYWORD_CLASS, TriggerMode};
use cedoc_html::Document;

use crate::error::AnnotateError;
use crate::include::IncludeRewriter;
use crate::scanner::BlockScanner;
use crate::synthesizer::LinkSynthesizer;
use crate::tooltip::{TextWidthEstimate, WidthMeasure, center_tooltips};

/// Attribute set on annotated `<pre>` containers when marking is enabled.
pub const PROCESSED_MARKER: &str = "data-cedoc-annotated";

/// Counters for one page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotateStats {
    /// Blocks that received a link.
    pub blocks_annotated: usize,
    /// Blocks skipped (no or unsupported language, already marked, encoding failure).
    pub blocks_skipped: usize,
    /// Include references turned into links.
    pub includes_rewritten: usize,
    /// Tooltips whose margin was set.
    pub tooltips_centered: usize,
    /// Declared language tags without a profile.
    pub unsupported_languages: Vec<String>,
}

impl AnnotateStats {
    /// Whether the page was changed.
    pub fn changed(&self) -> bool {
        self.blocks_annotated > 0 || self.includes_rewritten > 0
    }
}

/// Adds Compiler Explorer links to the code blocks of a page.
///
/// # Example
///
/// ```
/// use cedoc_annotate::Annotator;
///
/// let html = r#"<pre><code class="language-cpp">int main() {}</code></pre>"#;
/// let (out, stats) = Annotator::new().annotate_html(html).unwrap();
///
/// assert_eq!(stats.blocks_annotated, 1);
/// assert!(out.contains("https://godbolt.org/clientstate/"));
/// ```
pub struct Annotator {
    synthesizer: LinkSynthesizer,
    includes: Option<IncludeRewriter>,
    trigger: TriggerMode,
    mark_processed: bool,
    measure: Box<dyn WidthMeasure>,
}

impl Annotator {
    /// Create an annotator with default settings: immediate trigger, marking on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            synthesizer: LinkSynthesizer::default(),
            includes: None,
            trigger: TriggerMode::Immediate,
            mark_processed: true,
            measure: Box::new(TextWidthEstimate::default()),
        }
    }

    /// Create an annotator from loaded configuration.
    ///
    /// Include rewriting is enabled when the trigger is page-ready and a site
    /// origin is configured.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let includes = config.site_resolved.origin.as_deref().map(|origin| {
            IncludeRewriter::new(origin, config.annotate.meta_keyword_class.as_str())
        });
        Self {
            synthesizer: LinkSynthesizer::new(&config.explorer),
            includes,
            trigger: config.annotate.trigger,
            mark_processed: config.annotate.mark_processed,
            measure: Box::new(TextWidthEstimate::new(&config.tooltip)),
        }
    }

    /// Set the trigger mode.
    #[must_use]
    pub fn trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    /// Rewrite includes against this site origin (page-ready trigger only).
    #[must_use]
    pub fn include_origin(mut self, origin: impl Into<String>) -> Self {
        self.includes = Some(IncludeRewriter::new(origin, DEFAULT_META_KEYWORD_CLASS));
        self
    }

    /// Enable or disable the processed marker.
    ///
    /// Without the marker, every run appends another link to every block.
    #[must_use]
    pub fn mark_processed(mut self, enabled: bool) -> Self {
        self.mark_processed = enabled;
        self
    }

    /// Use a different tooltip width measure.
    #[must_use]
    pub fn width_measure(mut self, measure: impl WidthMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Annotate a parsed page in place.
    pub fn annotate_document(&self, doc: &mut Document) -> AnnotateStats {
        let mut scanner = BlockScanner::new();
        if self.mark_processed {
            scanner = scanner.skip_marked(PROCESSED_MARKER);
        }
        let outcome = scanner.scan(&doc.root);

        let mut stats = AnnotateStats {
            blocks_skipped: outcome.skipped,
            unsupported_languages: outcome.unsupported,
            ..Default::default()
        };

        let includes = self
            .includes
            .as_ref()
            .filter(|_| self.trigger.rewrites_includes());

        for block in outcome.accepted {
            let Some(pre) = doc.root.node_at_mut(&block.path) else {
                stats.blocks_skipped += 1;
                continue;
            };

            if let Err(err) = self.synthesizer.annotate(pre, block.profile) {
                tracing::debug!(error = %err, path = ?block.path, "Skipping block");
                stats.blocks_skipped += 1;
                continue;
            }
            stats.blocks_annotated += 1;

            if let Some(rewriter) = includes {
                stats.includes_rewritten += rewriter.rewrite(pre);
            }
            if self.mark_processed {
                pre.set_attr(PROCESSED_MARKER, "");
            }
        }

        stats.tooltips_centered = center_tooltips(&mut doc.root, self.measure.as_ref());
        stats
    }

    /// Parse, annotate and serialize a page.
    ///
    /// When no block was annotated and no include rewritten, the input is
    /// returned as is.
    pub fn annotate_html(&self, html: &str) -> Result<(String, AnnotateStats), AnnotateError> {
        let mut doc = Document::parse(html)?;
        let stats = self.annotate_document(&mut doc);
        if !stats.changed() {
            return Ok((html.to_owned(), stats));
        }
        Ok((doc.to_html(), stats))
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}
