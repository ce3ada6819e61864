//! The annotated markup tree handed from a [`MarkupRenderer`] to the tree
//! builder, plus the position bookkeeping shared by both sides.

pub mod html;
pub mod render;
pub mod sourcemap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Range;

pub use render::{CmarkRenderer, MarkupRenderer};
pub use sourcemap::extract;

/// Kind used for text leaves.
pub const TEXT: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// 1-based line.
    pub line: usize,
    /// 1-based byte column.
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
}

/// Half-open source span: `end` points one past the last byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

impl Position {
    /// The `start:end` identity used as `sourceMapKey`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.start.offset, self.end.offset)
    }

    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn contains(&self, other: &Position) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    /// Smallest span covering both.
    pub fn union(&self, other: &Position) -> Position {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        Position { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkupNode {
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MarkupNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl MarkupNode {
    pub fn element(kind: &str) -> Self {
        MarkupNode {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    pub fn text(value: &str) -> Self {
        MarkupNode {
            kind: TEXT.to_string(),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = MarkupNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn bool_property(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Concatenated text of every descendant text leaf.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &MarkupNode, out: &mut String) {
    if let Some(v) = &node.value {
        out.push_str(v);
        return;
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

/// Maps byte offsets to line/column points.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex {
            line_starts,
            len: source.len(),
        }
    }

    pub fn point(&self, offset: usize) -> Point {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Point {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
            offset,
        }
    }

    pub fn position(&self, range: Range<usize>) -> Position {
        Position {
            start: self.point(range.start),
            end: self.point(range.end),
        }
    }
}
