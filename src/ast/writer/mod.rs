//! Serializer: structured [`Document`] → markdown.
//!
//! Every node renders into a [`Region`] that enclosing containers decorate
//! (quote markers, list markers, indentation). Nodes and marks proven
//! unchanged since the pristine document replay their `sourceMarkdown`
//! instead; lines after the first of a replay are pinned so containers do
//! not prefix them twice.

pub mod blocks;
pub mod inline;
pub mod table;
pub mod utils;

use std::collections::HashMap;
use std::ops::Range;

use super::{ChangeTracker, Document, Mark, MarkType, Node, NodeType};
use crate::config::SerializerOptions;
use crate::error::{ConvertError, Result};
use crate::text::{Line, Region};

pub use inline::Delimiters;
pub use table::should_render_as_markdown_table;

/// Rendering state threaded from containers to their content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Inside a tight list: item blocks are not separated by blank lines.
    pub tight: bool,
    /// Inside a table cell: hard breaks render as `<br>`.
    pub in_table: bool,
    /// Inside a pipe table cell: `|` is escaped and line breaks flattened.
    pub pipe: bool,
}

impl RenderContext {
    pub fn block(self) -> Self {
        RenderContext {
            tight: false,
            ..self
        }
    }

    pub fn tight(self, tight: bool) -> Self {
        RenderContext { tight, ..self }
    }

    /// Context for content that leaves table-cell rules behind (a quote
    /// inside a cell writes markdown hard breaks again).
    pub fn outside_table(self) -> Self {
        RenderContext {
            in_table: false,
            pipe: false,
            ..self
        }
    }
}

pub type NodeRender = fn(&Serializer<'_>, &Node, RenderContext) -> Result<Region>;
pub type MarkRender = fn(&Serializer<'_>, &Mark, &[Node]) -> Delimiters;

#[derive(Debug, Clone, Copy)]
pub struct NodeRenderer {
    pub render: NodeRender,
    /// Replay `sourceMarkdown` when unchanged. Off for containers whose span
    /// includes syntax owned by their parent.
    pub preserve: bool,
    /// Consecutive siblings of this type are joined without a blank line.
    pub compact: bool,
}

impl NodeRenderer {
    pub const fn new(render: NodeRender) -> Self {
        NodeRenderer {
            render,
            preserve: true,
            compact: false,
        }
    }

    pub const fn not_preserved(mut self) -> Self {
        self.preserve = false;
        self
    }

    pub const fn compact(mut self) -> Self {
        self.compact = true;
        self
    }
}

/// Render functions per node and mark type: the defaults plus overrides.
#[derive(Debug, Clone)]
pub struct Renderers {
    nodes: HashMap<NodeType, NodeRenderer>,
    marks: HashMap<MarkType, MarkRender>,
}

impl Renderers {
    pub fn empty() -> Self {
        Renderers {
            nodes: HashMap::new(),
            marks: HashMap::new(),
        }
    }

    pub fn with_node(mut self, node_type: NodeType, renderer: NodeRenderer) -> Self {
        self.nodes.insert(node_type, renderer);
        self
    }

    pub fn with_mark(mut self, mark_type: MarkType, render: MarkRender) -> Self {
        self.marks.insert(mark_type, render);
        self
    }

    pub fn without_node(mut self, node_type: NodeType) -> Self {
        self.nodes.remove(&node_type);
        self
    }

    pub fn without_mark(mut self, mark_type: MarkType) -> Self {
        self.marks.remove(&mark_type);
        self
    }

    pub fn node(&self, node_type: NodeType) -> Option<&NodeRenderer> {
        self.nodes.get(&node_type)
    }

    pub fn mark(&self, mark_type: MarkType) -> Option<MarkRender> {
        self.marks.get(&mark_type).copied()
    }
}

impl Default for Renderers {
    fn default() -> Self {
        use NodeType::*;
        let r = NodeRenderer::new;
        Renderers::empty()
            .with_node(Doc, r(blocks::doc).not_preserved())
            .with_node(Paragraph, r(blocks::paragraph))
            .with_node(Heading, r(blocks::heading))
            .with_node(Blockquote, r(blocks::blockquote))
            .with_node(CodeBlock, r(blocks::code_block))
            .with_node(HorizontalRule, r(blocks::horizontal_rule))
            .with_node(BulletList, r(blocks::list))
            .with_node(OrderedList, r(blocks::list))
            .with_node(TaskList, r(blocks::list))
            .with_node(ListItem, r(blocks::item).not_preserved())
            .with_node(TaskItem, r(blocks::item).not_preserved())
            .with_node(Table, r(table::table))
            .with_node(TableRow, r(table::row).not_preserved())
            .with_node(TableHeader, r(table::cell).not_preserved())
            .with_node(TableCell, r(table::cell).not_preserved())
            .with_node(FootnoteDefinition, r(blocks::footnote_definition))
            .with_node(Div, r(blocks::div).compact())
            .with_node(Details, r(blocks::details))
            .with_node(DetailsContent, r(blocks::details_content).not_preserved())
            .with_node(Figure, r(blocks::figure))
            .with_node(FigureCaption, r(blocks::figure_caption))
            .with_node(DescriptionList, r(blocks::description_list))
            .with_node(DescriptionItem, r(blocks::description_item).not_preserved())
            .with_node(ReferenceDefinition, r(blocks::reference_definition).compact())
            .with_node(Comment, r(blocks::comment))
            .with_node(HardBreak, r(inline::hard_break).not_preserved())
            .with_node(Image, r(inline::image))
            .with_node(FootnoteReference, r(inline::footnote_reference))
            .with_mark(MarkType::Link, inline::link)
            .with_mark(MarkType::Bold, inline::bold)
            .with_mark(MarkType::Italic, inline::italic)
            .with_mark(MarkType::Strike, inline::strike)
            .with_mark(MarkType::Highlight, inline::highlight)
            .with_mark(MarkType::Code, inline::code)
    }
}

/// One serialization: the registry, the options and the change verdicts.
pub struct Serializer<'a> {
    renderers: &'a Renderers,
    options: &'a SerializerOptions,
    tracker: ChangeTracker,
}

impl<'a> Serializer<'a> {
    pub fn new(renderers: &'a Renderers, options: &'a SerializerOptions, tracker: ChangeTracker) -> Self {
        Serializer {
            renderers,
            options,
            tracker,
        }
    }

    pub fn options(&self) -> &SerializerOptions {
        self.options
    }

    /// Render a whole document. Rendered output has no trailing newline;
    /// whitespace before a replayed first block or after a replayed last
    /// block is kept from the source.
    pub fn render_document(&self, doc: &Document) -> Result<String> {
        let region = self.render_node(&doc.root, RenderContext::default())?;
        let mut out = region.apply().trim_end_matches('\n').to_string();
        let Some(source) = doc.root.attrs.source_markdown() else {
            return Ok(out);
        };
        let lead = doc
            .blocks()
            .first()
            .and_then(|b| self.replayed_span(b))
            .and_then(|span| source_gap(source, 0..span.start));
        if let Some(lead) = lead {
            out.insert_str(0, lead);
        }
        let trail = doc
            .blocks()
            .last()
            .and_then(|b| self.replayed_span(b))
            .and_then(|span| source_gap(source, span.end..source.len()));
        if let Some(trail) = trail {
            out.push_str(trail);
        }
        Ok(out)
    }

    /// Byte range of the source a node replays, if it replays.
    fn replayed_span(&self, node: &Node) -> Option<Range<usize>> {
        let source = self.preserved_node(node)?;
        let (start, _) = node.attrs.source_map_key()?.split_once(':')?;
        let start: usize = start.parse().ok()?;
        Some(start..start + source.len())
    }

    pub(crate) fn preserved_node<'n>(&self, node: &'n Node) -> Option<&'n str> {
        let preserve = self
            .renderers
            .node(node.node_type)
            .is_some_and(|r| r.preserve);
        if !preserve || !self.options.preserve_unchanged {
            return None;
        }
        let source = node.attrs.source_markdown()?;
        let key = node.attrs.source_map_key()?;
        self.tracker
            .is_unchanged(key, node.node_type.into())
            .then_some(source)
    }

    pub(crate) fn preserved_mark<'m>(&self, mark: &'m Mark) -> Option<&'m str> {
        if !self.options.preserve_unchanged {
            return None;
        }
        let source = mark.attrs.source_markdown()?;
        let key = mark.attrs.source_map_key()?;
        self.tracker
            .is_unchanged(key, mark.mark_type.into())
            .then_some(source)
    }

    /// Render one node, replaying its source when it is unchanged.
    pub fn render_node(&self, node: &Node, ctx: RenderContext) -> Result<Region> {
        if let Some(source) = self.preserved_node(node) {
            tracing::trace!(node_type = %node.node_type, "replaying unchanged source");
            return Ok(Region::from_source(source));
        }
        match self.renderers.node(node.node_type) {
            Some(renderer) => (renderer.render)(self, node, ctx),
            None => match node.attrs.source_markdown() {
                Some(source) => {
                    tracing::warn!(node_type = %node.node_type, "no renderer, falling back to source");
                    Ok(Region::from_source(source))
                }
                None => Err(ConvertError::no_renderer(node.node_type.into())),
            },
        }
    }

    /// Render sibling blocks: one blank line between them, none in tight
    /// context or between compact siblings of the same type.
    pub fn render_blocks(&self, nodes: &[Node], ctx: RenderContext) -> Result<Region> {
        self.render_blocks_from(nodes, ctx, None)
    }

    /// Like [`render_blocks`](Self::render_blocks), but two neighbours that
    /// both replay from `source` keep the whitespace between them there.
    pub fn render_blocks_from(
        &self,
        nodes: &[Node],
        ctx: RenderContext,
        source: Option<&str>,
    ) -> Result<Region> {
        let mut out = Region::new();
        let mut prev: Option<(NodeType, Option<Range<usize>>)> = None;
        for node in nodes {
            let region = self.render_node(node, ctx)?;
            if region.is_empty() {
                continue;
            }
            let span = source.and_then(|_| self.replayed_span(node));
            let before = prev.as_ref().and_then(|(_, before)| before.as_ref());
            let gap = match (source, before, &span) {
                (Some(source), Some(before), Some(after)) => {
                    source_gap(source, before.end..after.start)
                }
                _ => None,
            };
            match gap {
                Some(gap) => {
                    out.append_gap(region, gap);
                }
                None => {
                    let compact = prev.as_ref().is_some_and(|(t, _)| *t == node.node_type)
                        && self
                            .renderers
                            .node(node.node_type)
                            .is_some_and(|r| r.compact);
                    let blank = if ctx.tight || compact { 0 } else { 1 };
                    out.append_separated(region, blank);
                }
            }
            prev = Some((node.node_type, span));
        }
        Ok(out)
    }

    /// Render inline content into a single string (lines joined by `\n`).
    pub fn render_inline(&self, nodes: &[Node], ctx: RenderContext) -> Result<String> {
        inline::render(self, nodes, ctx)
    }

    /// Inline content as a region of unpinned lines.
    pub fn inline_region(&self, nodes: &[Node], ctx: RenderContext) -> Result<Region> {
        let text = self.render_inline(nodes, ctx)?;
        let mut region = Region::new();
        if text.is_empty() {
            return Ok(region);
        }
        for line in text.split('\n') {
            region.push_back_line(Line::from_str(line));
        }
        Ok(region)
    }
}

/// The source between two replayed spans, when it is only whitespace.
fn source_gap(source: &str, range: Range<usize>) -> Option<&str> {
    source
        .get(range)
        .filter(|gap| gap.chars().all(char::is_whitespace))
}

/// Serialize `doc` to markdown. With a `pristine` baseline, unchanged nodes
/// and marks replay their original source.
pub fn serialize(
    doc: &Document,
    pristine: Option<&Document>,
    renderers: &Renderers,
    options: &SerializerOptions,
) -> Result<String> {
    let tracker = match pristine {
        Some(pristine) if options.preserve_unchanged => ChangeTracker::track(doc, pristine),
        _ => ChangeTracker::empty(),
    };
    Serializer::new(renderers, options, tracker).render_document(doc)
}
