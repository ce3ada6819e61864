//! How each markup kind becomes part of the structured document.

use serde_json::Value;
use std::collections::HashMap;

use super::writer::utils::{sniff_bullet, sniff_ordered_delimiter};
use super::{Attrs, MarkType, NodeType};
use crate::error::{ConvertError, Result};
use crate::markup::{self, MarkupNode};

/// Refines the node type from the element and its ancestors (innermost last).
pub type SelectType = fn(&MarkupNode, &[&MarkupNode]) -> NodeType;
/// Attributes for the produced node or mark. Receives the full source.
pub type GetAttrs = fn(&MarkupNode, &[&MarkupNode], &str) -> Attrs;
/// Literal content used instead of traversing children.
pub type GetContent = fn(&MarkupNode) -> String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The document root.
    Root,
    Block(NodeType),
    Inline(NodeType),
    Mark(MarkType),
    Text,
    /// Produces nothing; children are visited unless `skip_children` is set.
    Ignore,
}

#[derive(Debug, Clone, Copy)]
pub struct FactorySpec {
    pub role: Role,
    pub select_type: Option<SelectType>,
    pub get_attrs: Option<GetAttrs>,
    pub get_content: Option<GetContent>,
    pub wrap_in_paragraph: bool,
    pub skip_children: bool,
    pub inline_content: bool,
}

impl FactorySpec {
    pub const fn new(role: Role) -> Self {
        FactorySpec {
            role,
            select_type: None,
            get_attrs: None,
            get_content: None,
            wrap_in_paragraph: false,
            skip_children: false,
            inline_content: false,
        }
    }

    pub const fn block(node_type: NodeType) -> Self {
        Self::new(Role::Block(node_type))
    }

    pub const fn inline(node_type: NodeType) -> Self {
        Self::new(Role::Inline(node_type))
    }

    pub const fn mark(mark_type: MarkType) -> Self {
        Self::new(Role::Mark(mark_type))
    }

    pub fn select_type(mut self, f: SelectType) -> Self {
        self.select_type = Some(f);
        self
    }

    pub fn attrs(mut self, f: GetAttrs) -> Self {
        self.get_attrs = Some(f);
        self
    }

    pub fn content(mut self, f: GetContent) -> Self {
        self.get_content = Some(f);
        self.skip_children = true;
        self
    }

    pub fn wrap(mut self) -> Self {
        self.wrap_in_paragraph = true;
        self
    }

    pub fn skip_children(mut self) -> Self {
        self.skip_children = true;
        self
    }

    pub fn inline_content(mut self) -> Self {
        self.inline_content = true;
        self
    }

    /// The node type this spec produces for `node`, if it produces one.
    pub fn node_type(&self, node: &MarkupNode, ancestors: &[&MarkupNode]) -> Option<NodeType> {
        let base = match self.role {
            Role::Block(t) | Role::Inline(t) => t,
            Role::Root => return Some(NodeType::Doc),
            _ => return None,
        };
        Some(self.select_type.map_or(base, |f| f(node, ancestors)))
    }
}

/// Markup kind → [`FactorySpec`]. `Default` holds the specification for
/// every kind [`CmarkRenderer`](crate::markup::CmarkRenderer) emits.
#[derive(Debug, Clone)]
pub struct FactorySpecs {
    specs: HashMap<String, FactorySpec>,
}

impl FactorySpecs {
    pub fn empty() -> Self {
        FactorySpecs {
            specs: HashMap::new(),
        }
    }

    /// Add or replace the spec for `kind`.
    pub fn with(mut self, kind: &str, spec: FactorySpec) -> Self {
        self.specs.insert(kind.to_string(), spec);
        self
    }

    pub fn without(mut self, kind: &str) -> Self {
        self.specs.remove(kind);
        self
    }

    pub fn get(&self, kind: &str) -> Result<&FactorySpec> {
        self.specs
            .get(kind)
            .ok_or_else(|| ConvertError::no_specification(kind))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.specs.contains_key(kind)
    }
}

impl Default for FactorySpecs {
    fn default() -> Self {
        use NodeType::*;
        let mut specs = FactorySpecs::empty()
            .with("root", FactorySpec::new(Role::Root).wrap())
            .with(markup::TEXT, FactorySpec::new(Role::Text))
            .with("p", FactorySpec::block(Paragraph))
            .with("blockquote", FactorySpec::block(Blockquote).wrap())
            .with(
                "ul",
                FactorySpec::block(BulletList)
                    .select_type(list_type)
                    .attrs(list_attrs),
            )
            .with(
                "ol",
                FactorySpec::block(OrderedList)
                    .select_type(list_type)
                    .attrs(list_attrs),
            )
            .with(
                "li",
                FactorySpec::block(ListItem)
                    .select_type(item_type)
                    .attrs(item_attrs)
                    .wrap(),
            )
            .with(
                "pre",
                FactorySpec::block(CodeBlock)
                    .attrs(code_attrs)
                    .content(|node| node.text_content()),
            )
            .with("hr", FactorySpec::block(HorizontalRule))
            .with("table", FactorySpec::block(Table))
            .with("thead", FactorySpec::new(Role::Ignore))
            .with("tbody", FactorySpec::new(Role::Ignore))
            .with("tr", FactorySpec::block(TableRow))
            .with("th", FactorySpec::block(TableHeader).attrs(cell_attrs).wrap())
            .with("td", FactorySpec::block(TableCell).attrs(cell_attrs).wrap())
            .with("div", FactorySpec::block(Div).wrap())
            .with("details", FactorySpec::block(Details).wrap())
            .with("summary", FactorySpec::block(DetailsContent).wrap())
            .with("figure", FactorySpec::block(Figure).wrap())
            .with("figcaption", FactorySpec::block(FigureCaption))
            .with("dl", FactorySpec::block(DescriptionList))
            .with(
                "dt",
                FactorySpec::block(DescriptionItem)
                    .attrs(|_, _, _| Attrs::new().with("isTerm", true))
                    .wrap(),
            )
            .with(
                "dd",
                FactorySpec::block(DescriptionItem)
                    .attrs(|_, _, _| Attrs::new().with("isTerm", false))
                    .wrap(),
            )
            .with(
                "footnoteDefinition",
                FactorySpec::block(FootnoteDefinition)
                    .attrs(footnote_attrs)
                    .wrap(),
            )
            .with(
                "referenceDefinition",
                FactorySpec::block(ReferenceDefinition)
                    .content(|node| node.value.clone().unwrap_or_default()),
            )
            .with(
                "comment",
                FactorySpec::block(Comment)
                    .attrs(|node, _, _| {
                        Attrs::new().with("description", node.value.clone().unwrap_or_default())
                    })
                    .skip_children(),
            )
            .with("br", FactorySpec::inline(HardBreak))
            .with("img", FactorySpec::inline(Image).attrs(image_attrs))
            .with(
                "footnoteReference",
                FactorySpec::inline(FootnoteReference).attrs(footnote_attrs),
            )
            .with("input", FactorySpec::new(Role::Ignore).skip_children())
            .with("a", FactorySpec::mark(MarkType::Link).attrs(link_attrs))
            .with("strong", FactorySpec::mark(MarkType::Bold))
            .with("em", FactorySpec::mark(MarkType::Italic))
            .with("del", FactorySpec::mark(MarkType::Strike))
            .with("mark", FactorySpec::mark(MarkType::Highlight))
            .with("code", FactorySpec::mark(MarkType::Code).inline_content());
        for kind in ["h1", "h2", "h3", "h4", "h5", "h6"] {
            specs = specs.with(kind, FactorySpec::block(Heading).attrs(heading_attrs));
        }
        specs
    }
}

fn copy(attrs: &mut Attrs, node: &MarkupNode, keys: &[&str]) {
    for key in keys {
        if let Some(value) = node.property(key) {
            attrs.set(key, value.clone());
        }
    }
}

fn heading_attrs(node: &MarkupNode, _: &[&MarkupNode], _: &str) -> Attrs {
    let level = node.kind[1..].parse::<u8>().unwrap_or(1);
    Attrs::new().with("level", level)
}

fn list_type(node: &MarkupNode, _: &[&MarkupNode]) -> NodeType {
    if node.bool_property("taskList") {
        NodeType::TaskList
    } else if node.kind == "ol" {
        NodeType::OrderedList
    } else {
        NodeType::BulletList
    }
}

fn list_attrs(node: &MarkupNode, _: &[&MarkupNode], source: &str) -> Attrs {
    let mut attrs = Attrs::new().with("tight", !node.bool_property("spread"));
    let raw = markup::extract(node.position.as_ref(), source).unwrap_or_default();
    if node.kind == "ol" {
        let start = match node.property("start") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        attrs.set("start", start.unwrap_or(1));
        attrs.set("parens", sniff_ordered_delimiter(&raw) == Some(')'));
    } else if let Some(bullet) = sniff_bullet(&raw) {
        attrs.set("bullet", bullet.to_string());
    }
    if node.bool_property("taskList") {
        attrs.set("numeric", node.kind == "ol");
    }
    attrs
}

fn item_type(_: &MarkupNode, ancestors: &[&MarkupNode]) -> NodeType {
    match ancestors.last() {
        Some(list) if list.bool_property("taskList") => NodeType::TaskItem,
        _ => NodeType::ListItem,
    }
}

fn item_attrs(node: &MarkupNode, ancestors: &[&MarkupNode], _: &str) -> Attrs {
    match ancestors.last() {
        Some(list) if list.bool_property("taskList") => {
            Attrs::new().with("checked", node.bool_property("checked"))
        }
        _ => Attrs::new(),
    }
}

fn code_attrs(node: &MarkupNode, _: &[&MarkupNode], _: &str) -> Attrs {
    let mut attrs = Attrs::new();
    copy(&mut attrs, node, &["language", "langParams"]);
    attrs
}

fn cell_attrs(node: &MarkupNode, _: &[&MarkupNode], _: &str) -> Attrs {
    let mut attrs = Attrs::new();
    copy(&mut attrs, node, &["colspan", "rowspan", "align"]);
    attrs
}

fn footnote_attrs(node: &MarkupNode, _: &[&MarkupNode], _: &str) -> Attrs {
    let mut attrs = Attrs::new();
    copy(&mut attrs, node, &["label", "identifier"]);
    attrs
}

fn image_attrs(node: &MarkupNode, _: &[&MarkupNode], _: &str) -> Attrs {
    let mut attrs = Attrs::new();
    copy(
        &mut attrs,
        node,
        &["src", "alt", "title", "canonicalSrc", "isReference", "width", "height"],
    );
    attrs
}

fn link_attrs(node: &MarkupNode, _: &[&MarkupNode], _: &str) -> Attrs {
    let mut attrs = Attrs::new();
    copy(
        &mut attrs,
        node,
        &["href", "title", "canonicalSrc", "isReference", "autolink"],
    );
    attrs
}
