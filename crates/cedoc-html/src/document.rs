//! Parsed page and its serialization back to HTML.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::HtmlError;
use crate::parser::parse_document;
use crate::tree::{Closing, TreeNode, UNMATCHED_END_TAG, is_void_element};

/// Tag of the synthetic element holding the page's top-level nodes.
pub(crate) const ROOT_TAG: &str = "#document";

static RAW_TEXT_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{CEDOC_RAW_(\d+)\}\}").expect("invalid placeholder regex"));

/// Placeholder standing in for a comment body or a `<script>` or `<style>` body.
pub(crate) fn raw_text_placeholder(index: usize) -> String {
    format!("{{{{CEDOC_RAW_{index}}}}}")
}

/// Replace placeholders with the raw text they stand for.
///
/// Entries of `raw_text` never contain placeholders themselves, so one pass
/// is enough.
pub(crate) fn resolve_placeholders(text: &str, raw_text: &[String]) -> String {
    if raw_text.is_empty() || !text.contains("{{CEDOC_RAW_") {
        return text.to_owned();
    }
    RAW_TEXT_PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| raw_text.get(index))
                .map_or_else(|| caps[0].to_owned(), Clone::clone)
        })
        .into_owned()
}

/// A rendered HTML page.
///
/// Top-level nodes are children of [`root`](Self::root), whose tag is
/// `#document` and which is never serialized itself.
#[derive(Debug, Clone)]
pub struct Document {
    /// Doctype declaration content (e.g. `html`).
    pub doctype: Option<String>,
    /// Synthetic root element.
    pub root: TreeNode,
    /// Verbatim bodies of masked raw-text elements.
    pub(crate) raw_text: Vec<String>,
}

impl Document {
    /// Parse a rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be tokenized even leniently.
    pub fn parse(html: &str) -> Result<Self, HtmlError> {
        parse_document(html)
    }

    /// Serialize the page back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096);
        if let Some(doctype) = &self.doctype {
            write!(out, "<!DOCTYPE {doctype}>").unwrap();
        }
        out.push_str(&escape_text(&self.root.text));
        for child in &self.root.children {
            serialize_node(child, &mut out);
        }
        resolve_placeholders(&out, &self.raw_text)
    }
}

/// Serialize an element and its tail.
pub(crate) fn serialize_node(node: &TreeNode, out: &mut String) {
    if node.is_comment() {
        write!(out, "<!--{}-->", node.text).unwrap();
    } else if node.tag == UNMATCHED_END_TAG {
        write!(out, "</{}>", node.text).unwrap();
    } else {
        serialize_element(node, out);
    }
    out.push_str(&escape_text(&node.tail));
}

fn serialize_element(node: &TreeNode, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for (key, value) in &node.attrs {
        write!(out, r#" {key}="{}""#, escape_attr(value)).unwrap();
    }

    // A self-closing element that gained content needs a real end tag
    let self_closing = node.closing == Closing::SelfClosing
        && node.text.is_empty()
        && node.children.is_empty();
    if self_closing {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if is_void_element(&node.tag) {
        return;
    }

    out.push_str(&escape_text(&node.text));
    for child in &node.children {
        serialize_node(child, out);
    }
    if node.closing != Closing::Implied {
        write!(out, "</{}>", node.tag).unwrap();
    }
}

fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\u{00a0}' => result.push_str("&nbsp;"),
            _ => result.push(ch),
        }
    }
    result
}

fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\u{00a0}' => result.push_str("&nbsp;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn roundtrip(html: &str) -> String {
        Document::parse(html).unwrap().to_html()
    }

    #[test]
    fn test_serialize_page_unchanged() {
        let html = concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="en"><head><meta charset="utf-8"><title>Docs</title></head>"#,
            r#"<body><pre><code class="language-cpp">int main() {}</code></pre></body></html>"#,
        );
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_serialize_escapes_code_text() {
        let html = "<pre><code>#include &lt;vector&gt;\nif (a &amp;&amp; b)</code></pre>";
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_serialize_void_and_empty_elements() {
        let html = r#"<p>a<br/>b<br>c<img src="x.png"></img><span></span><i/></p>"#;
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_serialize_keeps_comments() {
        let html = concat!(
            "<!DOCTYPE html>\n<!-- generated -->\n",
            "<html><head><!-- analytics --></head>",
            "<body><p>a<!-- <b>not markup</b> & -->b</p></body></html>",
        );
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_serialize_keeps_omitted_end_tags() {
        for html in [
            "<ul><li>one<li>two</ul>",
            "<p>para<p>next<pre><code>x</code></pre>",
            "<dl><dt>term<dd>definition<dt>other<dd>more</dl>",
            "<table><tr><td>a<td>b<tr><td>c</table>",
            "<select><option>a<option>b</select>",
            "<html><body><p>unclosed",
        ] {
            assert_eq!(roundtrip(html), html);
        }
    }

    #[test]
    fn test_serialize_keeps_unmatched_end_tags() {
        let html = "<p>a<div>b</div></p>";
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_serialize_self_closing_with_content_gets_end_tag() {
        let mut doc = Document::parse("<div/>").unwrap();
        doc.root.children[0].text = "x".to_owned();
        assert_eq!(doc.to_html(), "<div>x</div>");
    }

    #[test]
    fn test_serialize_restores_script_and_style() {
        let html = "<style>a > b { color: red; }</style><script>if (a < b) {}</script>";
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_serialize_escapes_attribute_quotes() {
        let node = TreeNode::new("a").with_attr("title", r#"say "hi" & go"#);
        let mut out = String::new();
        serialize_node(&node, &mut out);
        assert_eq!(out, r#"<a title="say &quot;hi&quot; &amp; go"></a>"#);
    }

    #[test]
    fn test_serialize_named_entities() {
        assert_eq!(roundtrip("<p>a&nbsp;b</p>"), "<p>a&nbsp;b</p>");
        assert_eq!(roundtrip("<p>a&mdash;b</p>"), "<p>a\u{2014}b</p>");
    }

    #[test]
    fn test_resolve_placeholders() {
        let raw = vec!["a < b".to_owned(), " note ".to_owned()];
        assert_eq!(
            resolve_placeholders("x{{CEDOC_RAW_1}}y{{CEDOC_RAW_0}}{{CEDOC_RAW_9}}", &raw),
            "x note ya < b{{CEDOC_RAW_9}}"
        );
    }

    #[test]
    fn test_placeholder_format() {
        assert_eq!(raw_text_placeholder(3), "{{CEDOC_RAW_3}}");
    }
}
