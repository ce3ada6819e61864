use serde::{Deserialize, Serialize};

use super::{Attrs, MarkType, NodeType};

/// A node of the structured document.
///
/// Text nodes carry `text` and a mark set; element nodes carry `content`.
/// Equality is structural, which is what change tracking compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    pub fn new(node_type: NodeType) -> Self {
        Node {
            node_type,
            attrs: Attrs::new(),
            content: Vec::new(),
            marks: Vec::new(),
            text: None,
        }
    }

    pub fn text(text: &str) -> Self {
        Node {
            text: Some(text.to_string()),
            ..Node::new(NodeType::Text)
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.set(key, value);
        self
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    /// Add `mark` to this node's mark set.
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks = mark.add_to(&self.marks);
        self
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    pub fn is_inline(&self) -> bool {
        self.node_type.is_inline()
    }

    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(t) = &self.text {
            out.push_str(t);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }
}

/// A text attribute applied to inline nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(mark_type: MarkType) -> Self {
        Mark {
            mark_type,
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Return `set` with this mark added. A set holds one mark per type, so
    /// an existing mark of the same type is replaced; the result stays in
    /// rank order.
    pub fn add_to(&self, set: &[Mark]) -> Vec<Mark> {
        let mut out: Vec<Mark> = set
            .iter()
            .filter(|m| m.mark_type != self.mark_type)
            .cloned()
            .collect();
        let at = out
            .iter()
            .position(|m| m.mark_type > self.mark_type)
            .unwrap_or(out.len());
        out.insert(at, self.clone());
        out
    }
}

/// A structured document: a `doc` node and everything below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub root: Node,
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Document {
            root: Node::new(NodeType::Doc).with_content(content),
        }
    }

    pub fn blocks(&self) -> &[Node] {
        &self.root.content
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.root)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Document {
            root: serde_json::from_str(json)?,
        })
    }
}
