//! Error types for HTML parsing.

/// Error while parsing a rendered page.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HtmlError {
    /// Markup the reader cannot tokenize.
    #[error("HTML syntax error at byte {position}")]
    Syntax {
        /// Byte offset in the (preprocessed) input.
        position: u64,
        /// Underlying reader error.
        #[source]
        source: quick_xml::Error,
    },

    /// Encoding error while decoding text or names.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
