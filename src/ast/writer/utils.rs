use regex::Regex;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([-+*])\s").expect("valid bullet regex"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+([.)])").expect("valid ordered regex"));
static HTML_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("valid tag regex"));
static ORDERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([.)])(\s|$)").expect("valid ordered line regex"));
static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}(\s|$)").expect("valid heading regex"));

/// Bullet character a list was written with.
pub fn sniff_bullet(source: &str) -> Option<char> {
    BULLET
        .captures(source)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
}

/// Delimiter (`.` or `)`) an ordered list was written with.
pub fn sniff_ordered_delimiter(source: &str) -> Option<char> {
    ORDERED
        .captures(source)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
}

/// Opening and closing tag when `source` is a complete inline HTML element,
/// e.g. `<a href="x">` and `</a>` for `<a href="x">text</a>`.
pub fn sniff_html(source: &str) -> Option<(String, String)> {
    let caps = HTML_OPEN.captures(source)?;
    let open = caps.get(0)?.as_str();
    let tag = caps.get(1)?.as_str();
    let close = format!("</{tag}>");
    let tail = source.get(source.len().checked_sub(close.len())?..)?;
    tail.eq_ignore_ascii_case(&close)
        .then(|| (open.to_string(), tail.to_string()))
}

/// Length of the run of `ch` that `source` starts with.
pub fn leading_run(source: &str, ch: char) -> usize {
    source.chars().take_while(|c| *c == ch).count()
}

/// Longest run of `ch` anywhere in `text`.
pub fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Escape markdown syntax in plain text. `line_start` says whether the text
/// begins a line; pipe table cells additionally escape `|` and cannot hold
/// line breaks.
pub fn escape_text(text: &str, line_start: bool, pipe: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let text = if pipe {
        std::borrow::Cow::Owned(text.replace('\n', " "))
    } else {
        std::borrow::Cow::Borrowed(text)
    };
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let at_start = i > 0 || line_start;
        let mut rest = line;
        if at_start {
            if HEADING_LINE.is_match(line) || line.starts_with('>') {
                out.push('\\');
            } else if line.starts_with("+ ") || line.starts_with("- ") || line == "+" || line == "-" {
                out.push('\\');
            } else if let Some(caps) = ORDERED_LINE.captures(line) {
                if let (Some(digits), Some(delim)) = (caps.get(1), caps.get(2)) {
                    out.push_str(digits.as_str());
                    out.push('\\');
                    out.push_str(delim.as_str());
                    rest = &line[delim.end()..];
                }
            }
        }
        escape_chars(rest, pipe, &mut out);
    }
    out
}

fn escape_chars(text: &str, pipe: bool, out: &mut String) {
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '`' | '*' | '\\' | '~' | '[' | ']' => out.push('\\'),
            '|' if pipe => out.push('\\'),
            '_' => {
                let before = i.checked_sub(1).and_then(|j| chars.get(j));
                let after = chars.get(i + 1);
                let intraword = before.is_some_and(|b| b.is_alphanumeric())
                    && after.is_some_and(|a| a.is_alphanumeric());
                if !intraword {
                    out.push('\\');
                }
            }
            _ => {}
        }
        out.push(c);
    }
}

/// Quote a link or image title.
pub fn quote_title(title: &str) -> String {
    format!("\"{}\"", title.replace('"', "\\\""))
}
