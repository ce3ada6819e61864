//! The document schema: which node and mark types exist and what each node
//! may contain.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

use super::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    BulletList,
    OrderedList,
    TaskList,
    ListItem,
    TaskItem,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    Image,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    FootnoteReference,
    FootnoteDefinition,
    Div,
    Details,
    DetailsContent,
    Figure,
    FigureCaption,
    DescriptionList,
    DescriptionItem,
    ReferenceDefinition,
    Comment,
    Text,
}

/// Marks, declared outermost first. The declaration order is the rank used
/// to order a mark set and to nest delimiters when marks tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkType {
    Link,
    Bold,
    Italic,
    Strike,
    Highlight,
    Code,
}

/// What a node may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Blocks,
    Inline,
    /// Only the listed node types.
    Items(&'static [NodeType]),
    /// Plain text only (code blocks, reference definitions).
    Text,
    Empty,
}

/// Either kind of schema type; the identity half of a tracker key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Node(NodeType),
    Mark(MarkType),
}

impl NodeType {
    pub fn name(self) -> &'static str {
        use NodeType::*;
        match self {
            Doc => "doc",
            Paragraph => "paragraph",
            Heading => "heading",
            Blockquote => "blockquote",
            BulletList => "bulletList",
            OrderedList => "orderedList",
            TaskList => "taskList",
            ListItem => "listItem",
            TaskItem => "taskItem",
            CodeBlock => "codeBlock",
            HorizontalRule => "horizontalRule",
            HardBreak => "hardBreak",
            Image => "image",
            Table => "table",
            TableRow => "tableRow",
            TableHeader => "tableHeader",
            TableCell => "tableCell",
            FootnoteReference => "footnoteReference",
            FootnoteDefinition => "footnoteDefinition",
            Div => "div",
            Details => "details",
            DetailsContent => "detailsContent",
            Figure => "figure",
            FigureCaption => "figureCaption",
            DescriptionList => "descriptionList",
            DescriptionItem => "descriptionItem",
            ReferenceDefinition => "referenceDefinition",
            Comment => "comment",
            Text => "text",
        }
    }

    pub fn content(self) -> Content {
        use NodeType::*;
        match self {
            Doc | Blockquote | ListItem | TaskItem | TableHeader | TableCell
            | FootnoteDefinition | Div | DetailsContent | Figure | DescriptionItem => {
                Content::Blocks
            }
            Paragraph | Heading | FigureCaption => Content::Inline,
            BulletList | OrderedList => Content::Items(&[ListItem]),
            TaskList => Content::Items(&[TaskItem]),
            Table => Content::Items(&[TableRow]),
            TableRow => Content::Items(&[TableHeader, TableCell]),
            Details => Content::Items(&[DetailsContent]),
            DescriptionList => Content::Items(&[DescriptionItem]),
            CodeBlock | ReferenceDefinition => Content::Text,
            HorizontalRule | HardBreak | Image | FootnoteReference | Comment | Text => {
                Content::Empty
            }
        }
    }

    /// Inline nodes live in paragraph-like content; everything else is a block.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            NodeType::Text | NodeType::HardBreak | NodeType::Image | NodeType::FootnoteReference
        )
    }

    /// List-like containers. An empty one is dropped rather than filled.
    pub fn is_item_container(self) -> bool {
        matches!(self.content(), Content::Items(_))
    }

    fn accepts(self, child: &Node) -> bool {
        match self.content() {
            Content::Blocks => !child.node_type.is_inline(),
            Content::Inline => child.node_type.is_inline(),
            Content::Items(allowed) => allowed.contains(&child.node_type),
            Content::Text => child.node_type == NodeType::Text,
            Content::Empty => false,
        }
    }

    /// Validate and repair `children` for this type.
    ///
    /// Stray inline runs in block content are wrapped in a paragraph; other
    /// invalid children are dropped. `None` means the node cannot exist with
    /// this content (an item container with no items).
    pub fn fill(self, children: Vec<Node>) -> Option<Vec<Node>> {
        let content = self.content();
        let mut out: Vec<Node> = Vec::with_capacity(children.len());
        // wrapper currently collecting strays, and every wrapper made
        let mut open: Option<usize> = None;
        let mut wrappers: Vec<usize> = Vec::new();

        for child in children {
            if self.accepts(&child) {
                out.push(child);
                open = None;
                continue;
            }
            let wrapper_type = match content {
                Content::Blocks if child.node_type.is_inline() => Some(NodeType::Paragraph),
                Content::Items(&[NodeType::DetailsContent]) => Some(NodeType::DetailsContent),
                _ => None,
            };
            match (wrapper_type, open) {
                (Some(_), Some(i)) => out[i].content.push(child),
                (Some(t), None) => {
                    open = Some(out.len());
                    wrappers.push(out.len());
                    out.push(Node::new(t).with_content(vec![child]));
                }
                (None, _) => {
                    tracing::debug!(
                        parent = self.name(),
                        child = child.node_type.name(),
                        "dropping child the schema does not allow"
                    );
                }
            }
        }

        for i in wrappers {
            let node = &mut out[i];
            if node.node_type == NodeType::DetailsContent {
                let loose = std::mem::take(&mut node.content);
                node.content = NodeType::DetailsContent.fill(loose).unwrap_or_default();
            }
        }

        if out.is_empty() {
            match content {
                Content::Blocks => out.push(Node::new(NodeType::Paragraph)),
                Content::Items(_) => return None,
                _ => {}
            }
        }
        Some(out)
    }
}

impl MarkType {
    pub fn name(self) -> &'static str {
        match self {
            MarkType::Link => "link",
            MarkType::Bold => "bold",
            MarkType::Italic => "italic",
            MarkType::Strike => "strike",
            MarkType::Highlight => "highlight",
            MarkType::Code => "code",
        }
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for MarkType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Node(t) => f.write_str(t.name()),
            TypeName::Mark(t) => f.write_str(t.name()),
        }
    }
}

impl From<NodeType> for TypeName {
    fn from(t: NodeType) -> Self {
        TypeName::Node(t)
    }
}

impl From<MarkType> for TypeName {
    fn from(t: MarkType) -> Self {
        TypeName::Mark(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_containers_get_a_paragraph() {
        let filled = NodeType::Blockquote.fill(vec![]).unwrap();
        assert_eq!(filled, vec![Node::new(NodeType::Paragraph)]);
    }

    #[test]
    fn empty_item_containers_are_rejected() {
        assert_eq!(NodeType::BulletList.fill(vec![]), None);
        assert_eq!(NodeType::Table.fill(vec![Node::text("x")]), None);
    }

    #[test]
    fn stray_inlines_are_wrapped_in_one_paragraph() {
        let filled = NodeType::ListItem
            .fill(vec![Node::text("a"), Node::new(NodeType::HardBreak), Node::text("b")])
            .unwrap();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].node_type, NodeType::Paragraph);
        assert_eq!(filled[0].content.len(), 3);
        assert!(filled[0].attrs.is_empty());
    }

    #[test]
    fn details_group_loose_blocks_into_content() {
        let filled = NodeType::Details
            .fill(vec![
                Node::new(NodeType::DetailsContent)
                    .with_content(vec![Node::new(NodeType::Paragraph)]),
                Node::new(NodeType::Paragraph).with_content(vec![Node::text("body")]),
                Node::new(NodeType::HorizontalRule),
            ])
            .unwrap();
        assert_eq!(filled.len(), 2);
        assert_eq!(filled[1].node_type, NodeType::DetailsContent);
        assert_eq!(filled[1].content.len(), 2);
        assert!(filled[1].attrs.is_empty());
    }

    #[test]
    fn inline_content_drops_blocks() {
        let filled = NodeType::Paragraph
            .fill(vec![Node::text("a"), Node::new(NodeType::Comment)])
            .unwrap();
        assert_eq!(filled, vec![Node::text("a")]);
    }

    #[test]
    fn marks_rank_outermost_first() {
        assert!(MarkType::Link < MarkType::Bold);
        assert!(MarkType::Strike < MarkType::Code);
    }
}
