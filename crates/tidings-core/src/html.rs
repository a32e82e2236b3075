//! HTML-to-plain-text conversion for article content matching.
//!
//! Pure and stateless: strips tags, decodes the common entities, and
//! collapses whitespace. Good enough for a search target; rendering fidelity
//! is not a goal.

use std::sync::OnceLock;

use regex::Regex;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>|<[^>]*>").unwrap())
}

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strip markup from an HTML fragment, returning plain text.
pub fn html_to_text(html: &str) -> String {
    let stripped = tag_re().replace_all(html, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");
    space_re().replace_all(decoded.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        assert_eq!(
            html_to_text("<p>Hello <b>world</b></p>"),
            "Hello world"
        );
    }

    #[test]
    fn drops_script_and_style_bodies() {
        assert_eq!(
            html_to_text("<p>before</p><script>var x = 1;</script><p>after</p>"),
            "before after"
        );
        assert_eq!(html_to_text("<style>p { color: red }</style>text"), "text");
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(html_to_text("fish &amp; chips &lt;3"), "fish & chips <3");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(html_to_text("<div>\n  a\n\n  b  </div>"), "a b");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(html_to_text("no markup here"), "no markup here");
        assert_eq!(html_to_text(""), "");
    }
}
