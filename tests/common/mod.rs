#![allow(dead_code)]

use pulldown_cmark_roundtrip::ast::{Attrs, Document, Mark, MarkType, Node, NodeType};
use pulldown_cmark_roundtrip::config::SerializerOptions;
use pulldown_cmark_roundtrip::{CmarkRenderer, FactorySpecs, Renderers, parse_document};

pub fn doc(blocks: Vec<Node>) -> Document {
    Document::new(blocks)
}

pub fn node(node_type: NodeType, content: Vec<Node>) -> Node {
    Node::new(node_type).with_content(content)
}

pub fn with_attrs(node: Node, attrs: &[(&str, serde_json::Value)]) -> Node {
    let attrs: Attrs = attrs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    node.with_attrs(attrs)
}

pub fn text(s: &str) -> Node {
    Node::text(s)
}

pub fn p(content: Vec<Node>) -> Node {
    node(NodeType::Paragraph, content)
}

pub fn ptext(s: &str) -> Node {
    p(vec![text(s)])
}

pub fn marked(s: &str, marks: &[Mark]) -> Node {
    marks.iter().fold(text(s), |n, m| n.with_mark(m.clone()))
}

pub fn mark(mark_type: MarkType) -> Mark {
    Mark::new(mark_type)
}

pub fn link(href: &str) -> Mark {
    Mark::new(MarkType::Link).with_attr("href", href)
}

pub fn hard_break() -> Node {
    Node::new(NodeType::HardBreak)
}

pub fn heading(level: i64, s: &str) -> Node {
    node(NodeType::Heading, vec![text(s)]).with_attr("level", level)
}

pub fn item(blocks: Vec<Node>) -> Node {
    node(NodeType::ListItem, blocks)
}

pub fn task(checked: bool, blocks: Vec<Node>) -> Node {
    node(NodeType::TaskItem, blocks).with_attr("checked", checked)
}

pub fn code_block(code: &str) -> Node {
    node(NodeType::CodeBlock, vec![text(code)])
}

pub fn header(blocks: Vec<Node>) -> Node {
    node(NodeType::TableHeader, blocks)
}

pub fn cell(blocks: Vec<Node>) -> Node {
    node(NodeType::TableCell, blocks)
}

pub fn row(cells: Vec<Node>) -> Node {
    node(NodeType::TableRow, cells)
}

pub fn table(rows: Vec<Node>) -> Node {
    node(NodeType::Table, rows)
}

/// Serialize without a pristine document: everything is rendered fresh.
pub fn render(doc: &Document) -> String {
    pulldown_cmark_roundtrip::serialize(
        doc,
        None,
        &Renderers::default(),
        &SerializerOptions::default(),
    )
    .expect("serialize")
}

pub fn parse(source: &str) -> Document {
    parse_document(source, &CmarkRenderer::new(), &FactorySpecs::default()).expect("parse")
}

/// Serialize `doc` against `pristine`.
pub fn render_against(doc: &Document, pristine: &Document) -> String {
    pulldown_cmark_roundtrip::serialize(
        doc,
        Some(pristine),
        &Renderers::default(),
        &SerializerOptions::default(),
    )
    .expect("serialize")
}

fn is_textblock(node: &Node) -> bool {
    matches!(node.node_type, NodeType::Paragraph | NodeType::Heading)
}

fn first_textblock(node: &mut Node) -> Option<&mut Node> {
    if is_textblock(node) {
        return Some(node);
    }
    node.content.iter_mut().find_map(first_textblock)
}

fn last_textblock(node: &mut Node) -> Option<&mut Node> {
    if is_textblock(node) {
        return Some(node);
    }
    node.content.iter_mut().rev().find_map(last_textblock)
}

/// Type `suffix` at the end of the last paragraph or heading. Text typed
/// after a text node extends it (and its marks).
pub fn append_text(doc: &mut Document, suffix: &str) {
    let block = last_textblock(&mut doc.root).expect("a textblock");
    match block.content.last_mut() {
        Some(Node {
            text: Some(text), ..
        }) => text.push_str(suffix),
        _ => block.content.push(Node::text(suffix)),
    }
}

/// Type `prefix` at the start of the first paragraph or heading.
pub fn prepend_text(doc: &mut Document, prefix: &str) {
    let block = first_textblock(&mut doc.root).expect("a textblock");
    match block.content.first_mut() {
        Some(Node {
            text: Some(text), ..
        }) => text.insert_str(0, prefix),
        _ => block.content.insert(0, Node::text(prefix)),
    }
}

/// Parse `source`, apply `edit` to a copy and serialize it against the
/// original.
pub fn edit_and_render(source: &str, edit: impl FnOnce(&mut Document)) -> String {
    let pristine = parse(source);
    let mut doc = pristine.clone();
    edit(&mut doc);
    render_against(&doc, &pristine)
}
