use super::{Fragment, Line};
use std::fmt::{self, Display, Formatter};

/// A Region is the rendered form of one block: a stack of lines that parent
/// containers decorate in place (quote markers, list markers, indentation)
/// before the final `apply()`.
#[derive(Clone, Debug, Default)]
pub struct Region {
    lines: Vec<Line>,
}

impl Region {
    pub fn new() -> Self {
        Region { lines: Vec::new() }
    }

    /// Split a multiline &str on "\n". An empty string yields an empty region.
    pub fn from_str(s: &str) -> Self {
        let lines = if s.is_empty() {
            Vec::new()
        } else {
            s.split('\n').map(Line::from_str).collect()
        };
        Region { lines }
    }

    /// Region for text replayed from the source document. Only the first line
    /// takes decoration from enclosing containers; the rest are pinned.
    pub fn from_source(s: &str) -> Self {
        let lines = s
            .split('\n')
            .enumerate()
            .map(|(i, l)| if i == 0 { Line::from_str(l) } else { Line::pinned(l) })
            .collect();
        Region { lines }
    }

    pub fn push_front_line(&mut self, line: Line) -> &mut Self {
        self.lines.insert(0, line);
        self
    }

    pub fn push_back_line(&mut self, line: Line) -> &mut Self {
        self.lines.push(line);
        self
    }

    pub fn push_blank_line(&mut self) -> &mut Self {
        self.lines.push(Line::new());
        self
    }

    /// Move every line of `other` to the end of this region.
    pub fn append(&mut self, other: Region) -> &mut Self {
        self.lines.extend(other.lines);
        self
    }

    /// Append `other` separated by `blank` empty lines, skipping the separator
    /// when either side is empty.
    pub fn append_separated(&mut self, other: Region, blank: usize) -> &mut Self {
        if other.is_empty() {
            return self;
        }
        if !self.is_empty() {
            for _ in 0..blank {
                self.push_blank_line();
            }
        }
        self.append(other)
    }

    /// Append `other` joined by `gap`, literal text taken from a source. The
    /// gap's own lines are pinned; without a newline the two regions share a
    /// line.
    pub fn append_gap(&mut self, mut other: Region, gap: &str) -> &mut Self {
        if other.is_empty() {
            return self;
        }
        let Some(last) = self.lines.last_mut() else {
            return self.append(other);
        };
        let mut parts = gap.split('\n');
        if let Some(head) = parts.next().filter(|h| !h.is_empty()) {
            last.push(head);
        }
        let rest: Vec<&str> = parts.collect();
        match rest.split_last() {
            None => {
                let first = other.lines.remove(0);
                last.push(first.apply());
            }
            Some((tail, middle)) => {
                self.lines.extend(middle.iter().map(|l| Line::pinned(l)));
                if let Some(first) = other.lines.first_mut().filter(|_| !tail.is_empty()) {
                    first.prepend(*tail);
                }
            }
        }
        self.append(other)
    }

    /// Prefix every unpinned line. Blank lines get the prefix without its
    /// trailing whitespace.
    pub fn prefix_each_line<F: Into<Fragment>>(&mut self, prefix: F) -> &mut Self {
        let p = prefix.into();
        let bare = p.trimmed();
        for line in self.lines.iter_mut().filter(|l| !l.is_pinned()) {
            if line.is_blank() {
                line.prepend(bare.clone());
            } else {
                line.prepend(p.clone());
            }
        }
        self
    }

    /// Prefix the first line with `prefix` and indent the remaining lines by
    /// its width, so `"- "` on ["a","b"] gives ["- a","  b"].
    pub fn prefix_first_then_indent_rest<F: Into<Fragment>>(&mut self, prefix: F) -> &mut Self {
        let p = prefix.into();
        let pad = p.width();
        self.prefix_first_then_indent(p, pad)
    }

    /// Prefix the first line with `prefix` and indent the remaining unpinned
    /// lines by `pad` spaces.
    pub fn prefix_first_then_indent<F: Into<Fragment>>(&mut self, prefix: F, pad: usize) -> &mut Self {
        let p = prefix.into();
        match self.lines.first_mut() {
            Some(first) if first.is_blank() => {
                first.prepend(p.trimmed());
            }
            Some(first) => {
                first.prepend(p);
            }
            None => {
                self.lines.push(Line::from_str(p.trimmed().as_str()));
                return self;
            }
        }
        if pad > 0 {
            let sp = Fragment::spaces(pad);
            for line in self
                .lines
                .iter_mut()
                .skip(1)
                .filter(|l| !l.is_pinned() && !l.is_blank())
            {
                line.prepend(sp.clone());
            }
        }
        self
    }

    /// Join lines with '\n'. This is the only place the final string is built.
    pub fn apply(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.apply());
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.apply())
    }
}
