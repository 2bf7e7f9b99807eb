//! Named HTML entity conversion.
//!
//! Rendered pages use HTML named entities (`&nbsp;`, `&rarr;`, ...) that an XML
//! reader does not know. They are turned into Unicode before parsing. The five
//! XML entities are left for the reader to decode.

use std::sync::LazyLock;

use regex::Regex;

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex"));

/// Replace named HTML entities with the characters they stand for.
///
/// Unknown names and the XML entities (`amp`, `lt`, `gt`, `quot`, `apos`) are
/// kept verbatim.
pub(crate) fn convert_html_entities(html: &str) -> String {
    if !html.contains('&') {
        return html.to_owned();
    }
    ENTITY_PATTERN
        .replace_all(html, |caps: &regex::Captures| {
            named_entity(&caps[1]).map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        // Spacing
        "nbsp" => "\u{00a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwnj" => "\u{200c}",
        "zwj" => "\u{200d}",
        "shy" => "\u{00ad}",

        // Punctuation
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "lsaquo" => "\u{2039}",
        "rsaquo" => "\u{203a}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "middot" => "\u{00b7}",
        "para" => "\u{00b6}",
        "sect" => "\u{00a7}",
        "dagger" => "\u{2020}",
        "Dagger" => "\u{2021}",
        "iexcl" => "\u{00a1}",
        "iquest" => "\u{00bf}",

        // Arrows
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "harr" => "\u{2194}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",
        "crarr" => "\u{21b5}",

        // Math
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "plusmn" => "\u{00b1}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "minus" => "\u{2212}",
        "infin" => "\u{221e}",
        "deg" => "\u{00b0}",
        "micro" => "\u{00b5}",
        "frac14" => "\u{00bc}",
        "frac12" => "\u{00bd}",
        "frac34" => "\u{00be}",
        "sup1" => "\u{00b9}",
        "sup2" => "\u{00b2}",
        "sup3" => "\u{00b3}",

        // Symbols
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",
        "check" => "\u{2713}",

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_spacing_entities() {
        assert_eq!(
            convert_html_entities("int&nbsp;x;&thinsp;"),
            "int\u{00a0}x;\u{2009}"
        );
    }

    #[test]
    fn test_converts_permalink_symbol() {
        // MkDocs headings end with a pilcrow permalink
        assert_eq!(
            convert_html_entities(r#"<a class="headerlink">&para;</a>"#),
            "<a class=\"headerlink\">\u{00b6}</a>"
        );
    }

    #[test]
    fn test_keeps_xml_entities_for_reader() {
        assert_eq!(
            convert_html_entities("#include &lt;vector&gt; &amp;&quot;"),
            "#include &lt;vector&gt; &amp;&quot;"
        );
    }

    #[test]
    fn test_keeps_unknown_entities() {
        assert_eq!(convert_html_entities("&notanentity;"), "&notanentity;");
    }

    #[test]
    fn test_ignores_numeric_references() {
        assert_eq!(convert_html_entities("&#39;&#x27;"), "&#39;&#x27;");
    }
}
