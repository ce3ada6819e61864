//! A small tokenizer for the HTML that appears inside markdown.
//!
//! HTML blocks arrive from pulldown-cmark as a sequence of raw lines and
//! inline HTML as one event per tag. Both are split into tags, comments and
//! text here; the renderer places the results on its element stack.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)<!--(?P<comment>.*?)-->",
        r#"|<(?P<close>/)?(?P<tag>[A-Za-z][A-Za-z0-9-]*)(?P<attrs>(?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(?P<selfclose>/)?>"#,
    ))
    .expect("valid html token regex")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid html attribute regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
        range: Range<usize>,
    },
    Close {
        tag: String,
        range: Range<usize>,
    },
    Comment {
        body: String,
        range: Range<usize>,
    },
    Text {
        text: String,
        range: Range<usize>,
    },
}

/// How an HTML tag maps onto markup kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// An element with children, and whether it is block level.
    Element(&'static str, bool),
    /// An element that never has children (`<br>`, `<img>`).
    Void(&'static str),
    /// Dropped along with everything up to its closing tag.
    Raw,
    /// Dropped; its children stay in place.
    Transparent,
}

pub fn tag_kind(tag: &str) -> TagKind {
    use TagKind::*;
    match tag.to_ascii_lowercase().as_str() {
        "strong" | "b" => Element("strong", false),
        "em" | "i" => Element("em", false),
        "del" | "s" | "strike" => Element("del", false),
        "code" => Element("code", false),
        "mark" => Element("mark", false),
        "a" => Element("a", false),
        "img" => Void("img"),
        "br" => Void("br"),
        "hr" => Void("hr"),
        "input" => Void("input"),
        "p" => Element("p", true),
        "h1" => Element("h1", true),
        "h2" => Element("h2", true),
        "h3" => Element("h3", true),
        "h4" => Element("h4", true),
        "h5" => Element("h5", true),
        "h6" => Element("h6", true),
        "blockquote" => Element("blockquote", true),
        "ul" => Element("ul", true),
        "ol" => Element("ol", true),
        "li" => Element("li", true),
        "pre" => Element("pre", true),
        "div" => Element("div", true),
        "details" => Element("details", true),
        "summary" => Element("summary", true),
        "dl" => Element("dl", true),
        "dt" => Element("dt", true),
        "dd" => Element("dd", true),
        "figure" => Element("figure", true),
        "figcaption" => Element("figcaption", true),
        "table" => Element("table", true),
        "thead" => Element("thead", true),
        "tbody" => Element("tbody", true),
        "tr" => Element("tr", true),
        "th" => Element("th", true),
        "td" => Element("td", true),
        "script" | "style" | "textarea" | "iframe" => Raw,
        _ => Transparent,
    }
}

/// Split `html` into tokens. Ranges are byte ranges into `html`.
pub fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in TOKEN.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text {
                text: html[last..whole.start()].to_string(),
                range: last..whole.start(),
            });
        }
        let range = whole.range();
        if let Some(body) = caps.name("comment") {
            tokens.push(Token::Comment {
                body: body.as_str().to_string(),
                range,
            });
        } else if let Some(tag) = caps.name("tag") {
            let tag = tag.as_str().to_ascii_lowercase();
            if caps.name("close").is_some() {
                tokens.push(Token::Close { tag, range });
            } else {
                let attrs = caps
                    .name("attrs")
                    .map(|a| parse_attrs(a.as_str()))
                    .unwrap_or_default();
                tokens.push(Token::Open {
                    tag,
                    attrs,
                    self_closing: caps.name("selfclose").is_some(),
                    range,
                });
            }
        }
        last = whole.end();
    }
    if last < html.len() {
        tokens.push(Token::Text {
            text: html[last..].to_string(),
            range: last..html.len(),
        });
    }
    tokens
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR.captures_iter(raw)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_ascii_lowercase();
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

/// Raw HTML collected from several events, with the mapping back to source
/// offsets. Lines of an HTML block nested in a container are not contiguous
/// in the source (the container's `> ` sits between them).
#[derive(Debug, Default)]
pub struct HtmlChunk {
    text: String,
    // (offset in `text`, offset in source)
    segments: Vec<(usize, usize)>,
}

impl HtmlChunk {
    pub fn push(&mut self, text: &str, source_offset: usize) {
        self.segments.push((self.text.len(), source_offset));
        self.text.push_str(text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn source_offset(&self, idx: usize) -> usize {
        let seg = match self.segments.binary_search_by_key(&idx, |s| s.0) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        };
        match self.segments.get(seg) {
            Some(&(local, source)) => source + idx.saturating_sub(local),
            None => idx,
        }
    }

    /// Map a range in `text` to a source range. The end maps from its last
    /// byte so a range ending at a segment boundary stays in its segment.
    pub fn source_range(&self, range: &Range<usize>) -> Range<usize> {
        let start = self.source_offset(range.start);
        let end = if range.end > range.start {
            self.source_offset(range.end - 1) + 1
        } else {
            start
        };
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_tags_comments_and_text() {
        let tokens = tokenize("<dt>Owl</dt><!-- x -->");
        assert_eq!(
            tokens,
            vec![
                Token::Open {
                    tag: "dt".into(),
                    attrs: vec![],
                    self_closing: false,
                    range: 0..4
                },
                Token::Text {
                    text: "Owl".into(),
                    range: 4..7
                },
                Token::Close {
                    tag: "dt".into(),
                    range: 7..12
                },
                Token::Comment {
                    body: " x ".into(),
                    range: 12..22
                },
            ]
        );
    }

    #[test]
    fn attributes_accept_all_quoting_styles() {
        let tokens = tokenize(r#"<td colspan="2" rowspan='3' align=left hidden>"#);
        let Token::Open { attrs, .. } = &tokens[0] else {
            panic!("expected an open tag, got {tokens:?}");
        };
        assert_eq!(
            attrs,
            &vec![
                ("colspan".to_string(), "2".to_string()),
                ("rowspan".to_string(), "3".to_string()),
                ("align".to_string(), "left".to_string()),
                ("hidden".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn comments_may_span_lines() {
        let tokens = tokenize("<!-- a\nb -->");
        assert!(matches!(&tokens[..], [Token::Comment { body, .. }] if body == " a\nb "));
    }

    #[test]
    fn tag_aliases_share_a_kind() {
        assert_eq!(tag_kind("B"), TagKind::Element("strong", false));
        assert_eq!(tag_kind("strike"), TagKind::Element("del", false));
        assert_eq!(tag_kind("script"), TagKind::Raw);
        assert_eq!(tag_kind("span"), TagKind::Transparent);
    }

    #[test]
    fn chunk_offsets_follow_segments() {
        let mut chunk = HtmlChunk::default();
        chunk.push("<div>\n", 2);
        chunk.push("</div>\n", 10);
        assert_eq!(chunk.source_offset(0), 2);
        assert_eq!(chunk.source_offset(6), 10);
        assert_eq!(chunk.source_range(&(0..5)), 2..7);
        assert_eq!(chunk.source_range(&(6..12)), 10..16);
    }
}
