//! Lenient HTML reader built on `quick-xml`.
//!
//! Rendered documentation pages are HTML, not XML. Before tokenizing, the
//! bodies of `<script>`, `<style>` and comments are masked out, named
//! entities are converted to Unicode and stray ampersands are escaped. The
//! reader then runs with HTML attribute syntax and without end-tag checking.
//!
//! The tree builder closes elements by matching end tags against the
//! open-element stack and applies the HTML rules for omitted end tags
//! (`<li>` closes an open `<li>`, `<pre>` closes an open `<p>`, ...).
//! Elements closed that way are marked [`Closing::Implied`] and get no end tag
//! when serialized.

use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

use crate::document::{Document, ROOT_TAG, raw_text_placeholder, resolve_placeholders};
use crate::entities::convert_html_entities;
use crate::error::HtmlError;
use crate::tree::{Closing, TreeNode, UNMATCHED_END_TAG, is_void_element};

static SCRIPT_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<script\b[^>]*>)(.+?)(</script\s*>)").expect("invalid script regex")
});

static STYLE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<style\b[^>]*>)(.+?)(</style\s*>)").expect("invalid style regex")
});

static COMMENT_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<!--)(.*?)(-->)").expect("invalid comment regex"));

/// Ampersand with an optional well-formed reference after it.
static AMPERSAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[a-zA-Z][a-zA-Z0-9]*;)?")
        .expect("invalid ampersand regex")
});

/// Start tags that end an open element whose end tag was omitted.
struct ImpliedEnd {
    /// Open elements that get closed.
    closes: &'static [&'static str],
    /// Start tags that close them.
    opened_by: &'static [&'static str],
    /// Open elements that stop the search.
    boundary: &'static [&'static str],
}

const IMPLIED_ENDS: &[ImpliedEnd] = &[
    ImpliedEnd {
        closes: &["p"],
        opened_by: &[
            "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl",
            "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
            "h6", "header", "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section",
            "table", "ul",
        ],
        boundary: &["button", "caption", "html", "object", "table", "td", "template", "th"],
    },
    ImpliedEnd {
        closes: &["li"],
        opened_by: &["li"],
        boundary: &["menu", "ol", "table", "td", "th", "ul"],
    },
    ImpliedEnd {
        closes: &["dt", "dd"],
        opened_by: &["dt", "dd"],
        boundary: &["dl", "table", "td", "th"],
    },
    ImpliedEnd {
        closes: &["td", "th"],
        opened_by: &["td", "th", "tr", "tbody", "thead", "tfoot"],
        boundary: &["table"],
    },
    ImpliedEnd {
        closes: &["tr"],
        opened_by: &["tr", "tbody", "thead", "tfoot"],
        boundary: &["table"],
    },
    ImpliedEnd {
        closes: &["tbody", "thead", "tfoot"],
        opened_by: &["tbody", "thead", "tfoot"],
        boundary: &["table"],
    },
    ImpliedEnd {
        closes: &["option"],
        opened_by: &["option", "optgroup"],
        boundary: &["datalist", "optgroup", "select"],
    },
    ImpliedEnd {
        closes: &["optgroup"],
        opened_by: &["optgroup"],
        boundary: &["select"],
    },
];

/// Parse a rendered page into a [`Document`].
pub(crate) fn parse_document(html: &str) -> Result<Document, HtmlError> {
    let mut raw_text = Vec::new();
    let masked = mask_raw_text(html, &SCRIPT_BODY, &mut raw_text);
    let masked = mask_raw_text(&masked, &STYLE_BODY, &mut raw_text);
    let masked = mask_raw_text(&masked, &COMMENT_BODY, &mut raw_text);
    let prepared = escape_stray_ampersands(&convert_html_entities(&masked));

    let mut reader = Reader::from_str(&prepared);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut doctype = None;
    let mut stack = vec![TreeNode::new(ROOT_TAG)];

    loop {
        let event = reader.read_event().map_err(|source| HtmlError::Syntax {
            position: reader.error_position() as u64,
            source,
        })?;
        match event {
            Event::Start(e) => {
                let node = element(&reader, &e);
                close_implied(&mut stack, &node.tag);
                if is_void_element(&node.tag) {
                    push_child(&mut stack, node);
                } else {
                    stack.push(node);
                }
            }
            Event::Empty(e) => {
                let mut node = element(&reader, &e);
                node.closing = Closing::SelfClosing;
                close_implied(&mut stack, &node.tag);
                push_child(&mut stack, node);
            }
            Event::End(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                close_element(&mut stack, &tag);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                append_text(&mut stack, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                append_text(&mut stack, &decode_reference(&entity));
            }
            Event::CData(e) => {
                append_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Event::DocType(e) => {
                doctype = Some(reader.decoder().decode(&e)?.trim().to_owned());
            }
            Event::Comment(e) => {
                let body = reader.decoder().decode(&e)?;
                push_child(&mut stack, TreeNode::comment(body));
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) => {}
        }
    }

    // Anything left open at end of input had its end tag omitted
    close_from(&mut stack, 1, Closing::Implied);
    let root = stack.pop().unwrap_or_else(|| TreeNode::new(ROOT_TAG));

    Ok(Document {
        doctype,
        root,
        raw_text,
    })
}

/// Replace raw-text element bodies with placeholders, collecting the bodies.
fn mask_raw_text(html: &str, pattern: &Regex, raw_text: &mut Vec<String>) -> String {
    pattern
        .replace_all(html, |caps: &regex::Captures| {
            let index = raw_text.len();
            let body = resolve_placeholders(&caps[2], raw_text);
            raw_text.push(body);
            format!("{}{}{}", &caps[1], raw_text_placeholder(index), &caps[3])
        })
        .into_owned()
}

/// Escape `&` that does not start a complete character reference.
fn escape_stray_ampersands(html: &str) -> String {
    if !html.contains('&') {
        return html.to_owned();
    }
    AMPERSAND
        .replace_all(html, |caps: &regex::Captures| match caps.get(1) {
            Some(reference) => format!("&{}", reference.as_str()),
            None => "&amp;".to_owned(),
        })
        .into_owned()
}

fn element(reader: &Reader<&[u8]>, e: &BytesStart) -> TreeNode {
    let mut node = TreeNode::new(decode_name(reader, e.name().as_ref()));
    for attr in e.html_attributes().flatten() {
        let key = decode_name(reader, attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        node.attrs.push((key, value));
    }
    node
}

fn decode_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader
        .decoder()
        .decode(name)
        .map_or_else(
            |_| String::from_utf8_lossy(name).into_owned(),
            std::borrow::Cow::into_owned,
        )
        .to_ascii_lowercase()
}

/// Attach a finished element to the innermost open element.
fn push_child(stack: &mut [TreeNode], node: TreeNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Close the innermost open element named `tag` and everything opened inside it.
///
/// End tags with no matching open element are kept as unmatched end nodes.
fn close_element(stack: &mut Vec<TreeNode>, tag: &str) {
    match stack.iter().rposition(|n| n.tag == tag) {
        Some(position) if position > 0 => close_from(stack, position, Closing::EndTag),
        _ => push_child(stack, TreeNode::new(UNMATCHED_END_TAG).with_text(tag)),
    }
}

/// Close open elements whose end tag is implied by a start tag.
fn close_implied(stack: &mut Vec<TreeNode>, tag: &str) {
    for rule in IMPLIED_ENDS.iter().filter(|rule| rule.opened_by.contains(&tag)) {
        let found = stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .take_while(|(_, node)| !rule.boundary.contains(&node.tag.as_str()))
            .find(|(_, node)| rule.closes.contains(&node.tag.as_str()))
            .map(|(position, _)| position);
        if let Some(position) = found {
            close_from(stack, position, Closing::Implied);
        }
    }
}

/// Pop the open elements from `position` up, attaching each to its parent.
///
/// The element at `position` ends with `closing`; the ones opened inside it
/// had their end tags omitted.
fn close_from(stack: &mut Vec<TreeNode>, position: usize, closing: Closing) {
    while stack.len() > position {
        if let Some(mut node) = stack.pop() {
            node.closing = if stack.len() == position {
                closing
            } else {
                Closing::Implied
            };
            push_child(stack, node);
        }
    }
}

/// Append text to the open element's text or its last child's tail.
fn append_text(stack: &mut [TreeNode], text: &str) {
    let Some(node) = stack.last_mut() else {
        return;
    };
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Decode a character or XML entity reference (without `&` and `;`).
fn decode_reference(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse_document("<p><strong>Bold</strong> text</p>").unwrap();

        let p = &doc.root.children[0];
        assert_eq!(p.tag, "p");
        assert_eq!(p.children[0].tag, "strong");
        assert_eq!(p.children[0].text, "Bold");
        assert_eq!(p.children[0].tail, " text");
    }

    #[test]
    fn test_parse_void_elements_without_close() {
        let doc =
            parse_document(r#"<head><meta charset="utf-8"><title>T</title></head>"#).unwrap();

        let head = &doc.root.children[0];
        assert_eq!(head.children.len(), 2);
        assert_eq!(head.children[0].tag, "meta");
        assert_eq!(head.children[0].attr("charset"), Some("utf-8"));
        assert_eq!(head.children[1].tag, "title");
    }

    #[test]
    fn test_parse_html_attribute_syntax() {
        let doc = parse_document("<input disabled value=plain>").unwrap();

        let input = &doc.root.children[0];
        assert_eq!(input.attr("disabled"), Some(""));
        assert_eq!(input.attr("value"), Some("plain"));
    }

    #[test]
    fn test_parse_uppercase_tags_lowercased() {
        let doc = parse_document("<PRE><CODE>x</CODE></PRE>").unwrap();
        assert_eq!(doc.root.children[0].tag, "pre");
        assert_eq!(doc.root.children[0].children[0].tag, "code");
    }

    #[test]
    fn test_parse_character_references() {
        let doc = parse_document("<code>&lt;vector&gt; &#39;a&#x27; &nbsp;</code>").unwrap();
        assert_eq!(doc.root.children[0].text, "<vector> 'a' \u{00a0}");
    }

    #[test]
    fn test_parse_stray_ampersand() {
        let doc = parse_document("<p>a && b</p>").unwrap();
        assert_eq!(doc.root.children[0].text, "a && b");
    }

    #[test]
    fn test_parse_unclosed_elements_closed_at_eof() {
        let doc = parse_document("<div><p>one").unwrap();
        let div = &doc.root.children[0];
        assert_eq!(div.children[0].tag, "p");
        assert_eq!(div.children[0].text, "one");
        assert_eq!(div.closing, Closing::Implied);
        assert_eq!(div.children[0].closing, Closing::Implied);
    }

    #[test]
    fn test_parse_mismatched_end_closes_inner() {
        let doc = parse_document("<div><span>x</div>after").unwrap();
        let div = &doc.root.children[0];
        assert_eq!(div.children[0].tag, "span");
        assert_eq!(div.tail, "after");
    }

    #[test]
    fn test_parse_stray_end_tag_kept() {
        let doc = parse_document("<p>x</em>y</p>").unwrap();
        assert_eq!(doc.root.children.len(), 1);
        let p = &doc.root.children[0];
        assert_eq!(p.text, "x");
        assert_eq!(p.children[0].tag, UNMATCHED_END_TAG);
        assert_eq!(p.children[0].text, "em");
        assert_eq!(p.children[0].tail, "y");
        assert_eq!(p.text_content(), "xy");
    }

    #[test]
    fn test_parse_implied_paragraph_end() {
        let doc = parse_document("<p>para<p>next<pre><code>x</code></pre>").unwrap();

        let tags: Vec<_> = doc.root.children.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, ["p", "p", "pre"]);
        assert_eq!(doc.root.children[0].closing, Closing::Implied);
        assert_eq!(doc.root.children[1].closing, Closing::Implied);
        assert_eq!(doc.root.children[2].closing, Closing::EndTag);
    }

    #[test]
    fn test_parse_paragraph_end_stops_at_boundary() {
        let doc = parse_document("<p><button>a<div>b</div></button></p>").unwrap();
        let p = &doc.root.children[0];
        assert_eq!(p.children[0].tag, "button");
        assert_eq!(p.children[0].children[0].tag, "div");
        assert_eq!(p.closing, Closing::EndTag);
    }

    #[test]
    fn test_parse_implied_list_item_end() {
        let doc = parse_document("<ul><li>one<li>two<ul><li>inner</ul></ul>").unwrap();
        let ul = &doc.root.children[0];
        assert_eq!(ul.children.len(), 2);
        assert_eq!(ul.children[0].text, "one");
        assert_eq!(ul.children[0].closing, Closing::Implied);
        assert_eq!(ul.children[1].text, "two");
        assert_eq!(ul.children[1].children[0].tag, "ul");
        assert_eq!(ul.children[1].children[0].children[0].text, "inner");
    }

    #[test]
    fn test_parse_implied_definition_ends() {
        let doc = parse_document("<dl><dt>a<dd>b<dt>c</dl>").unwrap();
        let tags: Vec<_> = doc.root.children[0]
            .children
            .iter()
            .map(|n| n.tag.as_str())
            .collect();
        assert_eq!(tags, ["dt", "dd", "dt"]);
    }

    #[test]
    fn test_parse_implied_table_ends() {
        let doc = parse_document("<table><tr><td>a<td>b<tr><th>c</table>").unwrap();
        let table = &doc.root.children[0];
        assert_eq!(table.children.len(), 2);
        assert_eq!(table.children[0].children.len(), 2);
        assert_eq!(table.children[1].children[0].tag, "th");
        assert_eq!(table.children[1].children[0].text, "c");
    }

    #[test]
    fn test_parse_implied_option_end() {
        let doc = parse_document("<select><option>a<option>b</select>").unwrap();
        let select = &doc.root.children[0];
        assert_eq!(select.children.len(), 2);
        assert_eq!(select.children[1].text, "b");
        assert_eq!(select.closing, Closing::EndTag);
    }

    #[test]
    fn test_parse_self_closing() {
        let doc = parse_document("<p>a<br/>b</p>").unwrap();
        assert_eq!(doc.root.children[0].children[0].closing, Closing::SelfClosing);
    }

    #[test]
    fn test_parse_masks_script_body() {
        let doc = parse_document("<script>if (a < b && c) {}</script><p>x</p>").unwrap();
        assert_eq!(doc.raw_text, vec!["if (a < b && c) {}".to_owned()]);
        assert_eq!(doc.root.children[0].text, raw_text_placeholder(0));
        assert_eq!(doc.root.children[1].tag, "p");
    }

    #[test]
    fn test_parse_keeps_empty_script() {
        let doc = parse_document(r#"<script src="app.js"></script>"#).unwrap();
        assert!(doc.raw_text.is_empty());
        assert_eq!(doc.root.children[0].attr("src"), Some("app.js"));
    }

    #[test]
    fn test_parse_doctype() {
        let doc = parse_document("<!DOCTYPE html>\n<html></html>").unwrap();
        assert_eq!(doc.doctype.as_deref(), Some("html"));
        assert_eq!(doc.root.text, "\n");
    }

    #[test]
    fn test_parse_keeps_comments() {
        let doc = parse_document("<p>a<!-- x < y & z -->b</p>").unwrap();

        let p = &doc.root.children[0];
        assert_eq!(p.text, "a");
        assert!(p.children[0].is_comment());
        assert_eq!(p.children[0].text, raw_text_placeholder(0));
        assert_eq!(p.children[0].tail, "b");
        assert_eq!(doc.raw_text, vec![" x < y & z ".to_owned()]);
        assert_eq!(p.text_content(), "ab");
    }

    #[test]
    fn test_parse_script_inside_comment() {
        let doc = parse_document("<!-- <script>a < b</script> -->").unwrap();
        assert_eq!(doc.root.children.len(), 1);
        assert!(doc.root.children[0].is_comment());
        assert_eq!(
            doc.raw_text.last().map(String::as_str),
            Some(" <script>a < b</script> ")
        );
    }

    #[test]
    fn test_escape_stray_ampersands() {
        assert_eq!(escape_stray_ampersands("a & b"), "a &amp; b");
        assert_eq!(escape_stray_ampersands("&amp;&#39;&#x41;"), "&amp;&#39;&#x41;");
        assert_eq!(escape_stray_ampersands("&#;&x"), "&amp;#;&amp;x");
    }

    #[test]
    fn test_decode_reference() {
        assert_eq!(decode_reference("lt"), "<");
        assert_eq!(decode_reference("#65"), "A");
        assert_eq!(decode_reference("#x41"), "A");
        assert_eq!(decode_reference("bogus"), "&bogus;");
    }
}
