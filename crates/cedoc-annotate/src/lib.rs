//! Compiler Explorer links for C and C++ code blocks in rendered documentation.
//!
//! Every `<pre>` block whose `<code>` element declares `language-cpp` or
//! `language-c` gets a link fragment appended: an icon opening the block's
//! source in Compiler Explorer, plus a tooltip. The link encodes a session
//! descriptor (language, compiler, options, source) as base64 JSON in a
//! `/clientstate/` URL.
//!
//! In [`TriggerMode::PageReady`] mode, `#include "dir/file.h"` directives in
//! annotated blocks also become links to the header on the documentation site.
//!
//! # Example
//!
//! ```
//! use cedoc_annotate::{Annotator, SessionDescriptor};
//!
//! let html = r#"<pre><code class="language-c">int x;</code></pre>"#;
//! let (out, _) = Annotator::new().annotate_html(html).unwrap();
//!
//! let start = out.find("https://godbolt.org/clientstate/").unwrap();
//! let end = start + out[start..].find('"').unwrap();
//! let descriptor = SessionDescriptor::from_url(&out[start..end]).unwrap();
//! assert_eq!(descriptor.source(), Some("int x;"));
//! ```

mod error;
mod include;
mod pipeline;
mod profile;
mod scanner;
mod session;
mod site;
mod synthesizer;
mod tooltip;

pub use cedoc_config::TriggerMode;
pub use error::{AnnotateError, SessionError, SiteError};
pub use include::{IncludeReference, IncludeRewriter};
pub use pipeline::{AnnotateStats, Annotator, PROCESSED_MARKER};
pub use profile::{LANGUAGE_PROFILES, LanguageProfile};
pub use scanner::{BlockScanner, ScanOutcome, ScannedBlock, declared_language};
pub use session::{CompilerConfig, Executor, Library, Session, SessionDescriptor};
pub use site::{SiteProcessor, SiteStats};
pub use synthesizer::{LinkSynthesizer, TOOLTIP_TEXT_CLASS};
pub use tooltip::{TOOLTIP_OFFSET, TextWidthEstimate, WidthMeasure, center_tooltips, margin_left};
