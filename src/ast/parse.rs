//! Tree builder: annotated markup tree → structured [`Document`].

use super::attrs::{SOURCE_MAP_KEY, SOURCE_MARKDOWN};
use super::factory::{FactorySpec, FactorySpecs, Role};
use super::{Attrs, Content, Document, Mark, Node, NodeType};
use crate::error::Result;
use crate::markup::{self, MarkupNode};

/// Build a [`Document`] from a markup tree rendered from `source`.
///
/// Every element kind in the tree needs an entry in `specs`; the first kind
/// without one aborts the build with
/// [`ConvertError::NoSpecification`](crate::ConvertError::NoSpecification).
pub fn build(tree: &MarkupNode, specs: &FactorySpecs, source: &str) -> Result<Document> {
    let mut builder = Builder {
        specs,
        source,
        frames: Vec::new(),
        ancestors: Vec::new(),
        marks: Vec::new(),
        next_index: 0,
        root: None,
    };
    let spec = specs.get(&tree.kind)?;
    let index = builder.next();
    // the whole source, so whitespace between replayed blocks can be replayed too
    let mut root_attrs = Attrs::new();
    if !source.is_empty() {
        root_attrs.set(SOURCE_MARKDOWN, source);
    }
    builder.frames.push(Frame {
        node_type: NodeType::Doc,
        attrs: root_attrs,
        content: Vec::new(),
        owner: index,
        synthetic: false,
        wrap: true,
    });
    let mut path = Vec::new();
    if spec.role == Role::Root {
        builder.ancestors.push(index);
        path.push(tree);
        for child in &tree.children {
            builder.visit(child, &mut path)?;
        }
    } else {
        builder.visit(tree, &mut path)?;
    }
    while !builder.frames.is_empty() {
        builder.close_top();
    }
    let root = builder
        .root
        .unwrap_or_else(|| Node::new(NodeType::Doc).with_content(vec![Node::new(NodeType::Paragraph)]));
    Ok(Document { root })
}

/// An open node under construction.
struct Frame {
    node_type: NodeType,
    attrs: Attrs,
    content: Vec<Node>,
    /// Preorder index of the originating element, or of the host element for
    /// a synthetic paragraph.
    owner: usize,
    synthetic: bool,
    wrap: bool,
}

struct Builder<'a> {
    specs: &'a FactorySpecs,
    source: &'a str,
    frames: Vec<Frame>,
    /// Preorder indices of the elements currently being visited.
    ancestors: Vec<usize>,
    marks: Vec<Mark>,
    next_index: usize,
    root: Option<Node>,
}

impl<'a> Builder<'a> {
    fn next(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    fn visit<'t>(&mut self, node: &'t MarkupNode, path: &mut Vec<&'t MarkupNode>) -> Result<()> {
        let index = self.next();
        let spec = *self.specs.get(&node.kind)?;
        match spec.role {
            Role::Root | Role::Block(_) => self.block(node, &spec, index, path),
            Role::Inline(_) => {
                self.close_foreign(false);
                let node_type = spec.node_type(node, path).unwrap_or(NodeType::Text);
                let attrs = self.attrs_for(node, &spec, path);
                let mut inline = Node::new(node_type).with_attrs(attrs);
                inline.marks = self.marks.clone();
                self.emit(inline);
                Ok(())
            }
            Role::Mark(mark_type) => {
                let mark = Mark::new(mark_type).with_attrs(self.attrs_for(node, &spec, path));
                let active = mark.add_to(&self.marks);
                let saved = std::mem::replace(&mut self.marks, active);
                let result = match (&node.value, spec.inline_content) {
                    (Some(value), true) => {
                        self.text(value);
                        Ok(())
                    }
                    _ if spec.skip_children => Ok(()),
                    _ => self.children(node, index, path),
                };
                self.marks = saved;
                result
            }
            Role::Text => {
                if let Some(value) = &node.value {
                    self.text(value);
                }
                Ok(())
            }
            Role::Ignore if spec.skip_children => Ok(()),
            Role::Ignore => self.children(node, index, path),
        }
    }

    fn children<'t>(
        &mut self,
        node: &'t MarkupNode,
        index: usize,
        path: &mut Vec<&'t MarkupNode>,
    ) -> Result<()> {
        self.ancestors.push(index);
        path.push(node);
        let mut result = Ok(());
        for child in &node.children {
            result = self.visit(child, path);
            if result.is_err() {
                break;
            }
        }
        path.pop();
        self.ancestors.pop();
        result
    }

    fn block<'t>(
        &mut self,
        node: &'t MarkupNode,
        spec: &FactorySpec,
        index: usize,
        path: &mut Vec<&'t MarkupNode>,
    ) -> Result<()> {
        self.close_foreign(true);
        let node_type = spec.node_type(node, path).unwrap_or(NodeType::Paragraph);
        let attrs = self.attrs_for(node, spec, path);
        let mut frame = Frame {
            node_type,
            attrs,
            content: Vec::new(),
            owner: index,
            synthetic: false,
            wrap: spec.wrap_in_paragraph,
        };
        if let Some(get_content) = spec.get_content {
            let literal = get_content(node);
            if !literal.is_empty() {
                frame.content.push(Node::text(&literal));
            }
        }
        self.frames.push(frame);
        if !spec.skip_children {
            self.children(node, index, path)?;
        }
        self.close_until(index);
        Ok(())
    }

    /// Source attributes plus whatever the spec derives.
    fn attrs_for(&self, node: &MarkupNode, spec: &FactorySpec, path: &[&MarkupNode]) -> Attrs {
        let mut attrs = spec
            .get_attrs
            .map(|f| f(node, path, self.source))
            .unwrap_or_default();
        if let Some(position) = &node.position {
            attrs.set(SOURCE_MAP_KEY, position.key());
            match markup::extract(Some(position), self.source) {
                Some(raw) => {
                    attrs.set(SOURCE_MARKDOWN, raw);
                }
                None => tracing::trace!(kind = node.kind, "span does not map onto the source"),
            }
        }
        attrs
    }

    fn text(&mut self, value: &str) {
        let inline_frame = self
            .frames
            .last()
            .is_some_and(|f| matches!(f.node_type.content(), Content::Inline | Content::Text));
        if !inline_frame && value.trim().is_empty() {
            return;
        }
        self.close_foreign(false);
        let mut text = Node::text(value);
        text.marks = self.marks.clone();
        self.emit(text);
    }

    /// Append an inline node to the current frame, opening a synthetic
    /// paragraph when the frame holds blocks.
    fn emit(&mut self, node: Node) {
        let needs_paragraph = self.frames.last().is_some_and(|f| f.wrap);
        if needs_paragraph {
            let owner = self.frames.last().map_or(0, |f| f.owner);
            self.frames.push(Frame {
                node_type: NodeType::Paragraph,
                attrs: Attrs::new(),
                content: Vec::new(),
                owner,
                synthetic: true,
                wrap: false,
            });
        }
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if let Some(prev) = frame.content.last_mut() {
            if prev.is_text() && node.is_text() && prev.marks == node.marks {
                if let (Some(text), Some(more)) = (prev.text.as_mut(), node.text.as_deref()) {
                    text.push_str(more);
                }
                return;
            }
        }
        frame.content.push(node);
    }

    /// Close frames that do not belong under the element being entered. A
    /// synthetic paragraph stays open across inline content but not blocks.
    fn close_foreign(&mut self, entering_block: bool) {
        while let Some(top) = self.frames.last() {
            let foreign = !self.ancestors.contains(&top.owner);
            if foreign || (top.synthetic && entering_block) {
                if self.frames.len() == 1 {
                    return;
                }
                self.close_top();
            } else {
                return;
            }
        }
    }

    /// Close frames down to and including the one opened for `index`.
    fn close_until(&mut self, index: usize) {
        while let Some(top) = self.frames.last() {
            let done = !top.synthetic && top.owner == index;
            self.close_top();
            if done {
                return;
            }
        }
    }

    fn close_top(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let Some(content) = frame.node_type.fill(frame.content) else {
            tracing::debug!(node_type = %frame.node_type, "dropping node with no valid content");
            return;
        };
        let node = Node::new(frame.node_type)
            .with_attrs(frame.attrs)
            .with_content(content);
        match self.frames.last_mut() {
            Some(parent) => parent.content.push(node),
            None => self.root = Some(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::MarkType;

    fn build_default(tree: &MarkupNode) -> Document {
        build(tree, &FactorySpecs::default(), "").expect("build")
    }

    #[test]
    fn stray_text_is_wrapped_in_one_synthetic_paragraph() {
        let tree = MarkupNode::element("root").with_children([
            MarkupNode::text("a "),
            MarkupNode::element("strong").with_child(MarkupNode::text("b")),
            MarkupNode::text(" c"),
        ]);
        let doc = build_default(&tree);
        assert_eq!(doc.blocks().len(), 1);
        let p = &doc.blocks()[0];
        assert_eq!(p.node_type, NodeType::Paragraph);
        assert!(p.attrs.is_empty());
        assert_eq!(p.content.len(), 3);
        assert_eq!(p.content[1].marks, vec![Mark::new(MarkType::Bold)]);
    }

    #[test]
    fn blocks_close_synthetic_paragraphs() {
        let tree = MarkupNode::element("root").with_children([
            MarkupNode::text("before"),
            MarkupNode::element("hr"),
            MarkupNode::text("after"),
        ]);
        let doc = build_default(&tree);
        let types: Vec<NodeType> = doc.blocks().iter().map(|n| n.node_type).collect();
        assert_eq!(
            types,
            vec![NodeType::Paragraph, NodeType::HorizontalRule, NodeType::Paragraph]
        );
    }

    #[test]
    fn whitespace_between_blocks_is_skipped() {
        let tree = MarkupNode::element("root").with_children([
            MarkupNode::element("p").with_child(MarkupNode::text("x")),
            MarkupNode::text("\n  "),
        ]);
        let doc = build_default(&tree);
        assert_eq!(doc.blocks().len(), 1);
    }

    #[test]
    fn code_marks_carry_their_own_text() {
        let tree = MarkupNode::element("root").with_child(
            MarkupNode::element("p").with_children([
                MarkupNode::element("em")
                    .with_child(MarkupNode::element("code").with_value("x")),
            ]),
        );
        let doc = build_default(&tree);
        let text = &doc.blocks()[0].content[0];
        assert_eq!(text.text.as_deref(), Some("x"));
        let types: Vec<MarkType> = text.marks.iter().map(|m| m.mark_type).collect();
        assert_eq!(types, vec![MarkType::Italic, MarkType::Code]);
    }

    #[test]
    fn ignored_wrappers_are_transparent() {
        let tree = MarkupNode::element("root").with_child(
            MarkupNode::element("table").with_child(
                MarkupNode::element("tbody").with_child(
                    MarkupNode::element("tr")
                        .with_child(MarkupNode::element("td").with_child(MarkupNode::text("x"))),
                ),
            ),
        );
        let doc = build_default(&tree);
        let table = &doc.blocks()[0];
        assert_eq!(table.content[0].node_type, NodeType::TableRow);
        let cell = &table.content[0].content[0];
        assert_eq!(cell.node_type, NodeType::TableCell);
        assert_eq!(cell.content[0].node_type, NodeType::Paragraph);
    }
}
