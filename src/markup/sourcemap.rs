use super::Position;

/// Return the source text a span was produced from.
///
/// Lines are taken from `source` by the span's line numbers and cut at its
/// byte columns, so a span reported against a different text simply fails to
/// map. Trailing whitespace is trimmed; leading indentation is kept.
pub fn extract(position: Option<&Position>, source: &str) -> Option<String> {
    let position = position?;
    let (start, end) = (position.start, position.end);
    if start.line == 0 || start.column == 0 || end.column == 0 || end.line < start.line {
        tracing::trace!(?position, "span is not 1-based");
        return None;
    }

    let lines: Vec<&str> = source.split('\n').collect();
    let first = lines.get(start.line - 1)?;

    let text = if start.line == end.line {
        if end.column < start.column {
            return None;
        }
        first.get(start.column - 1..end.column - 1)?.to_string()
    } else {
        let mut parts: Vec<&str> = Vec::with_capacity(end.line - start.line + 1);
        parts.push(first.get(start.column - 1..)?);
        for line in start.line..end.line - 1 {
            parts.push(lines.get(line)?);
        }
        let last = lines.get(end.line - 1)?;
        parts.push(last.get(..end.column - 1)?);
        parts.join("\n")
    };

    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::LineIndex;

    fn span(source: &str, start: usize, end: usize) -> Option<String> {
        let idx = LineIndex::new(source);
        extract(Some(&idx.position(start..end)), source)
    }

    #[test]
    fn single_line_span_is_a_column_slice() {
        assert_eq!(span("say **hi** now", 4, 10).as_deref(), Some("**hi**"));
    }

    #[test]
    fn multi_line_span_joins_tail_interior_and_head() {
        let src = "> one\n> two\n> three\nafter";
        assert_eq!(span(src, 2, 19).as_deref(), Some("one\n> two\n> three"));
    }

    #[test]
    fn trailing_newline_is_trimmed() {
        assert_eq!(span("para\n\nnext", 0, 5).as_deref(), Some("para"));
    }

    #[test]
    fn leading_indentation_is_kept() {
        assert_eq!(span("    code\n", 0, 9).as_deref(), Some("    code"));
    }

    #[test]
    fn absent_or_foreign_spans_have_no_source() {
        assert_eq!(extract(None, "text"), None);
        let idx = LineIndex::new("a\nb\nc\nd");
        assert_eq!(extract(Some(&idx.position(0..7)), "short"), None);
    }

    #[test]
    fn spans_inside_a_multibyte_char_do_not_panic() {
        let idx = LineIndex::new("héllo");
        let broken = idx.position(2..4);
        assert_eq!(extract(Some(&broken), "héllo"), None);
    }
}
