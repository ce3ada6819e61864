use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Parser, Tag, TagEnd};
use std::ops::Range;

use super::html::{self, HtmlChunk, TagKind, Token};
use super::{LineIndex, MarkupNode};
use crate::config::RenderOptions;
use crate::error::{ConvertError, Result};

/// Produces the annotated markup tree for a source text.
///
/// Implementations may be backed by anything (a local parser, a remote
/// rendering service); the tree builder only consumes the returned tree.
/// Empty input or an empty tree is reported as [`ConvertError::NoContent`].
pub trait MarkupRenderer {
    fn render(&self, source: &str) -> Result<MarkupNode>;
}

/// The bundled renderer, driven by pulldown-cmark's offset iterator.
#[derive(Debug, Clone, Default)]
pub struct CmarkRenderer {
    options: RenderOptions,
}

impl CmarkRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        CmarkRenderer { options }
    }
}

impl MarkupRenderer for CmarkRenderer {
    fn render(&self, source: &str) -> Result<MarkupNode> {
        if source.trim().is_empty() {
            tracing::debug!("empty source, nothing to render");
            return Err(ConvertError::NoContent);
        }
        let parser = Parser::new_ext(source, self.options.parser_options());
        let definitions: Vec<Range<usize>> = parser
            .reference_definitions()
            .iter()
            .map(|(_, def)| def.span.clone())
            .collect();

        let mut sink = Sink::new(source, self.options.html);
        for (event, range) in parser.into_offset_iter() {
            sink.event(event, range);
        }
        let mut root = sink.finish();
        insert_definitions(&mut root, definitions, source, &LineIndex::new(source));

        if root.children.is_empty() {
            return Err(ConvertError::NoContent);
        }
        Ok(root)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Opened by a pulldown-cmark `Start` and closed by its `End`.
    Markdown,
    /// Opened by an HTML tag; closed by its tag or by the enclosing container.
    Html,
    /// Paragraph around the inline run of a tight list item or table cell.
    Implicit,
    /// A markdown construct without an element of its own; children are
    /// handed to the parent.
    Passthrough,
}

struct Open {
    node: MarkupNode,
    start: usize,
    end: usize,
    origin: Origin,
}

struct Sink<'s> {
    source: &'s str,
    index: LineIndex,
    html: bool,
    stack: Vec<Open>,
    root: Option<MarkupNode>,
    html_block: Option<HtmlChunk>,
    // closing tag that ends a dropped `<script>`-like element
    raw_skip: Option<String>,
    aligns: Vec<Alignment>,
    column: usize,
    in_head: bool,
}

impl<'s> Sink<'s> {
    fn new(source: &'s str, html: bool) -> Self {
        let root = Open {
            node: MarkupNode::element("root"),
            start: 0,
            end: source.len(),
            origin: Origin::Markdown,
        };
        Sink {
            source,
            index: LineIndex::new(source),
            html,
            stack: vec![root],
            root: None,
            html_block: None,
            raw_skip: None,
            aligns: Vec::new(),
            column: 0,
            in_head: false,
        }
    }

    fn event(&mut self, event: Event<'s>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(chunk) = self.html_block.as_mut() {
                    chunk.push(&text, range.start);
                } else if self.raw_skip.is_none() {
                    self.inline_leaf(MarkupNode::text(&text), range);
                }
            }
            Event::Code(code) => {
                self.inline_leaf(MarkupNode::element("code").with_value(&code), range)
            }
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                let raw = self.source.get(range.clone()).unwrap_or_default();
                self.inline_leaf(MarkupNode::text(raw), range)
            }
            Event::Html(raw) => match self.html_block.as_mut() {
                Some(chunk) => chunk.push(&raw, range.start),
                None => self.inline_html(&raw, range.start),
            },
            Event::InlineHtml(raw) => self.inline_html(&raw, range.start),
            Event::FootnoteReference(label) => {
                let node = MarkupNode::element("footnoteReference")
                    .with_property("label", label.to_string())
                    .with_property("identifier", label.to_lowercase());
                self.inline_leaf(node, range)
            }
            Event::SoftBreak => self.inline_leaf(MarkupNode::text("\n"), range),
            Event::HardBreak => self.inline_leaf(MarkupNode::element("br"), range),
            Event::Rule => {
                self.close_implicit();
                self.leaf(MarkupNode::element("hr"), range);
            }
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
    }

    fn start(&mut self, tag: Tag<'s>, range: Range<usize>) {
        match tag {
            Tag::Paragraph => {
                self.close_implicit();
                self.mark_loose();
                self.push("p", range, Origin::Markdown);
            }
            Tag::Heading { level, .. } => {
                self.close_implicit();
                self.push(heading_kind(level), range, Origin::Markdown);
            }
            Tag::BlockQuote(_) => {
                self.close_implicit();
                self.push("blockquote", range, Origin::Markdown);
            }
            Tag::CodeBlock(kind) => {
                self.close_implicit();
                let (range, info) = match kind {
                    CodeBlockKind::Fenced(info) => (range, info),
                    CodeBlockKind::Indented => (self.with_indent(range), CowStr::Borrowed("")),
                };
                let node = self.push("pre", range, Origin::Markdown);
                let lang = info.split_whitespace().next().unwrap_or_default();
                if !lang.is_empty() {
                    let (language, params) = lang.split_once(':').unwrap_or((lang, ""));
                    node.properties.insert("language".into(), language.into());
                    if !params.is_empty() {
                        node.properties.insert("langParams".into(), params.into());
                    }
                }
            }
            Tag::HtmlBlock => {
                self.close_implicit();
                self.html_block = Some(HtmlChunk::default());
            }
            Tag::List(start) => {
                self.close_implicit();
                let kind = if start.is_some() { "ol" } else { "ul" };
                let node = self.push(kind, range, Origin::Markdown);
                if let Some(n) = start {
                    node.properties.insert("start".into(), n.into());
                }
            }
            Tag::Item => {
                self.push("li", range, Origin::Markdown);
            }
            Tag::FootnoteDefinition(label) => {
                self.close_implicit();
                let node = self.push("footnoteDefinition", range, Origin::Markdown);
                node.properties.insert("label".into(), label.to_string().into());
                node.properties
                    .insert("identifier".into(), label.to_lowercase().into());
            }
            Tag::Table(aligns) => {
                self.close_implicit();
                self.aligns = aligns;
                self.push("table", range, Origin::Markdown);
            }
            Tag::TableHead => {
                self.in_head = true;
                self.column = 0;
                self.push("thead", range.clone(), Origin::Markdown);
                self.push("tr", range, Origin::Markdown);
            }
            Tag::TableRow => {
                self.column = 0;
                self.push("tr", range, Origin::Markdown);
            }
            Tag::TableCell => {
                let kind = if self.in_head { "th" } else { "td" };
                let align = self.aligns.get(self.column).and_then(|a| match a {
                    Alignment::None => None,
                    Alignment::Left => Some("left"),
                    Alignment::Center => Some("center"),
                    Alignment::Right => Some("right"),
                });
                self.column += 1;
                let node = self.push(kind, range, Origin::Markdown);
                if let Some(align) = align {
                    node.properties.insert("align".into(), align.into());
                }
            }
            Tag::Emphasis => self.push_inline("em", range),
            Tag::Strong => self.push_inline("strong", range),
            Tag::Strikethrough => self.push_inline("del", range),
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => {
                self.before_inline(range.start);
                let node = self.push("a", range, Origin::Markdown);
                node.properties
                    .insert("href".into(), dest_url.to_string().into());
                link_properties(node, link_type, &title, &id);
            }
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => {
                self.before_inline(range.start);
                let node = self.push("img", range, Origin::Markdown);
                node.properties
                    .insert("src".into(), dest_url.to_string().into());
                link_properties(node, link_type, &title, &id);
            }
            _ => {
                self.push("", range, Origin::Passthrough);
            }
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock => {
                if let Some(chunk) = self.html_block.take() {
                    self.feed_html(&chunk, true);
                }
            }
            TagEnd::CodeBlock => {
                if let Some(top) = self.stack.last_mut() {
                    let mut code = top.node.text_content();
                    if code.ends_with('\n') {
                        code.pop();
                    }
                    top.node.children = vec![MarkupNode::text(&code)];
                }
                self.end_markdown();
            }
            TagEnd::Image => {
                if let Some(top) = self.stack.last_mut() {
                    let alt = top.node.text_content();
                    top.node.children.clear();
                    top.node.properties.insert("alt".into(), alt.into());
                }
                self.end_markdown();
            }
            TagEnd::TableHead => {
                self.end_markdown();
                self.end_markdown();
                self.in_head = false;
            }
            TagEnd::Table => {
                self.end_markdown();
                self.aligns.clear();
            }
            _ => self.end_markdown(),
        }
    }

    fn push(&mut self, kind: &str, range: Range<usize>, origin: Origin) -> &mut MarkupNode {
        self.stack.push(Open {
            node: MarkupNode::element(kind),
            start: range.start,
            end: range.end,
            origin,
        });
        let last = self.stack.len() - 1;
        &mut self.stack[last].node
    }

    fn push_inline(&mut self, kind: &str, range: Range<usize>) {
        self.before_inline(range.start);
        self.push(kind, range, Origin::Markdown);
    }

    /// Close the top frame and attach it to its parent.
    fn pop(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        if open.origin == Origin::Passthrough {
            if let Some(parent) = self.stack.last_mut() {
                parent.node.children.extend(open.node.children);
                parent.end = parent.end.max(open.end);
            }
            return;
        }
        let mut node = open.node;
        node.position = Some(self.index.position(open.start..open.end));
        self.attach(node, open.end);
    }

    fn attach(&mut self, node: MarkupNode, end: usize) {
        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(node);
            return;
        };
        if matches!(parent.origin, Origin::Html | Origin::Implicit) {
            parent.end = parent.end.max(end);
        }
        // soft breaks and entity-split text arrive as separate events
        if let Some(prev) = parent.node.children.last_mut() {
            if prev.is_text() && node.is_text() {
                if let (Some(text), Some(more)) = (prev.value.as_mut(), node.value.as_deref()) {
                    text.push_str(more);
                }
                if let (Some(pos), Some(more)) = (prev.position.as_mut(), node.position) {
                    *pos = pos.union(&more);
                }
                return;
            }
        }
        parent.node.children.push(node);
    }

    fn leaf(&mut self, node: MarkupNode, range: Range<usize>) {
        let node = node.with_position(self.index.position(range.clone()));
        self.attach(node, range.end);
    }

    fn inline_leaf(&mut self, node: MarkupNode, range: Range<usize>) {
        self.before_inline(range.start);
        self.leaf(node, range);
    }

    /// Close everything opened since the innermost markdown container, then
    /// the container itself.
    fn end_markdown(&mut self) {
        while let Some(top) = self.stack.last() {
            let origin = top.origin;
            if self.stack.len() == 1 {
                return;
            }
            self.pop();
            if matches!(origin, Origin::Markdown | Origin::Passthrough) {
                break;
            }
        }
        self.raw_skip = None;
    }

    /// Inline content directly inside a tight list item or a table cell gets
    /// a positioned paragraph of its own.
    fn before_inline(&mut self, start: usize) {
        let needs_paragraph = self.stack.last().is_some_and(|top| {
            top.origin == Origin::Markdown && matches!(top.node.kind.as_str(), "li" | "td" | "th")
        });
        if needs_paragraph {
            self.stack.push(Open {
                node: MarkupNode::element("p"),
                start,
                end: start,
                origin: Origin::Implicit,
            });
        }
    }

    fn close_implicit(&mut self) {
        let Some(pos) = self.stack.iter().rposition(|o| o.origin != Origin::Html) else {
            return;
        };
        if self.stack[pos].origin == Origin::Implicit {
            while self.stack.len() > pos {
                self.pop();
            }
        }
    }

    /// Loose list items hold real paragraphs; tight ones hold bare inlines.
    fn mark_loose(&mut self) {
        let len = self.stack.len();
        if len >= 2 && self.stack[len - 1].node.kind == "li" {
            self.stack[len - 2]
                .node
                .properties
                .insert("spread".into(), true.into());
        }
    }

    fn mark_task(&mut self, checked: bool) {
        let Some(item) = self.stack.iter().rposition(|o| o.node.kind == "li") else {
            return;
        };
        self.stack[item]
            .node
            .properties
            .insert("checked".into(), checked.into());
        if item > 0 {
            self.stack[item - 1]
                .node
                .properties
                .insert("taskList".into(), true.into());
        }
    }

    /// Indented code spans may start after their indentation; pull the
    /// start back over up to four columns of it so replayed source keeps
    /// it. A tab is a full indent on its own.
    fn with_indent(&self, range: Range<usize>) -> Range<usize> {
        let line_start = self.source[..range.start]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let lead = &self.source[line_start..range.start];
        let mut start = lead.len();
        let mut columns = 0;
        for (i, c) in lead.char_indices().rev() {
            columns += match c {
                ' ' => 1,
                '\t' => 4,
                _ => break,
            };
            if columns > 4 {
                break;
            }
            start = i;
            if columns == 4 {
                break;
            }
        }
        line_start + start..range.end
    }

    fn inline_html(&mut self, raw: &str, offset: usize) {
        let mut chunk = HtmlChunk::default();
        chunk.push(raw, offset);
        self.feed_html(&chunk, false);
    }

    fn feed_html(&mut self, chunk: &HtmlChunk, block: bool) {
        if !self.html {
            tracing::trace!(html = chunk.text(), "raw html disabled, dropping");
            return;
        }
        for token in html::tokenize(chunk.text()) {
            if let Some(raw) = &self.raw_skip {
                if matches!(&token, Token::Close { tag, .. } if tag == raw) {
                    self.raw_skip = None;
                }
                continue;
            }
            match token {
                Token::Comment { body, range } => {
                    let range = chunk.source_range(&range);
                    let node = MarkupNode::element("comment").with_value(&body);
                    if block {
                        self.close_implicit();
                        self.leaf(node, range);
                    } else {
                        self.inline_leaf(node, range);
                    }
                }
                Token::Text { text, range } => {
                    let Some(local) = strip_line_breaks(&text) else {
                        continue;
                    };
                    let kept = &text[local.clone()];
                    let local = range.start + local.start..range.start + local.end;
                    self.inline_leaf(MarkupNode::text(kept), chunk.source_range(&local));
                }
                Token::Open {
                    tag,
                    attrs,
                    self_closing,
                    range,
                } => {
                    let range = chunk.source_range(&range);
                    match html::tag_kind(&tag) {
                        TagKind::Raw => {
                            if !self_closing {
                                self.raw_skip = Some(tag);
                            }
                        }
                        TagKind::Transparent => {
                            tracing::trace!(tag, "unknown html tag, keeping its content only");
                        }
                        TagKind::Void(kind) => {
                            let mut node = MarkupNode::element(kind);
                            node.properties = html_properties(attrs);
                            if kind == "hr" {
                                self.close_implicit();
                                self.leaf(node, range);
                            } else {
                                self.inline_leaf(node, range);
                            }
                        }
                        TagKind::Element(kind, is_block) => {
                            if is_block {
                                self.close_implicit();
                            } else {
                                self.before_inline(range.start);
                            }
                            let node = self.push(kind, range, Origin::Html);
                            node.properties = html_properties(attrs);
                            if self_closing {
                                self.pop();
                            }
                        }
                    }
                }
                Token::Close { tag, range } => {
                    if let TagKind::Element(kind, _) = html::tag_kind(&tag) {
                        self.close_html(kind, chunk.source_range(&range).end);
                    }
                }
            }
        }
    }

    fn close_html(&mut self, kind: &str, end: usize) {
        let Some(pos) = self
            .stack
            .iter()
            .rposition(|o| o.origin != Origin::Html || o.node.kind == kind)
        else {
            return;
        };
        if self.stack[pos].origin != Origin::Html {
            tracing::trace!(kind, "closing tag without an open element");
            return;
        }
        self.stack[pos].end = end;
        while self.stack.len() > pos {
            self.pop();
        }
    }

    fn finish(mut self) -> MarkupNode {
        if let Some(chunk) = self.html_block.take() {
            self.feed_html(&chunk, true);
        }
        while !self.stack.is_empty() {
            self.pop();
        }
        self.root.take().unwrap_or_else(|| MarkupNode::element("root"))
    }
}

/// Drop whitespace that contains a line break at either end of an HTML text
/// run (the layout between tags); spaces next to inline tags are content.
fn strip_line_breaks(text: &str) -> Option<Range<usize>> {
    let lead = text.len() - text.trim_start().len();
    let start = if text[..lead].contains('\n') { lead } else { 0 };
    let trail = text.trim_end().len();
    let end = if text[trail..].contains('\n') { trail } else { text.len() };
    if start >= end {
        return None;
    }
    Some(start..end)
}

fn heading_kind(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn link_properties(node: &mut MarkupNode, link_type: LinkType, title: &str, id: &str) {
    if !title.is_empty() {
        node.properties.insert("title".into(), title.into());
    }
    match link_type {
        LinkType::Autolink | LinkType::Email => {
            node.properties.insert("autolink".into(), true.into());
        }
        LinkType::Reference
        | LinkType::ReferenceUnknown
        | LinkType::Collapsed
        | LinkType::CollapsedUnknown
        | LinkType::Shortcut
        | LinkType::ShortcutUnknown => {
            node.properties.insert("isReference".into(), true.into());
            node.properties.insert("canonicalSrc".into(), id.into());
        }
        _ => {}
    }
}

fn html_properties(attrs: Vec<(String, String)>) -> std::collections::BTreeMap<String, serde_json::Value> {
    attrs
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect()
}

/// Link reference definitions produce no events; splice top-level ones into
/// the root in source order. Definitions inside containers are left to the
/// container's own source text.
fn insert_definitions(root: &mut MarkupNode, mut spans: Vec<Range<usize>>, source: &str, index: &LineIndex) {
    spans.sort_by_key(|r| r.start);
    for span in spans {
        let Some(raw) = source.get(span.clone()) else {
            continue;
        };
        let nested = root.children.iter().any(|c| {
            c.position
                .is_some_and(|p| p.start.offset <= span.start && span.start < p.end.offset)
        });
        if nested {
            continue;
        }
        let at = root
            .children
            .iter()
            .position(|c| c.position.is_some_and(|p| p.start.offset >= span.end))
            .unwrap_or(root.children.len());
        let node = MarkupNode::element("referenceDefinition")
            .with_value(raw.trim_end())
            .with_position(index.position(span));
        root.children.insert(at, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(src: &str) -> MarkupNode {
        CmarkRenderer::new().render(src).expect("content")
    }

    fn kinds(node: &MarkupNode) -> Vec<&str> {
        node.children.iter().map(|c| c.kind.as_str()).collect()
    }

    #[test]
    fn empty_source_has_no_content() {
        assert!(matches!(
            CmarkRenderer::new().render("  \n"),
            Err(ConvertError::NoContent)
        ));
    }

    #[test]
    fn tight_items_wrap_inlines_in_positioned_paragraphs() {
        let src = "- one *two*\n- three";
        let root = render(src);
        let list = &root.children[0];
        assert_eq!(list.kind, "ul");
        assert!(!list.bool_property("spread"));
        let p = &list.children[0].children[0];
        assert_eq!(p.kind, "p");
        assert_eq!(super::super::extract(p.position.as_ref(), src).as_deref(), Some("one *two*"));
    }

    #[test]
    fn loose_lists_are_spread() {
        let root = render("1. one\n\n2. two");
        assert!(root.children[0].bool_property("spread"));
        assert_eq!(root.children[0].property("start"), Some(&1.into()));
    }

    #[test]
    fn task_markers_mark_item_and_list() {
        let root = render("* [x] done\n* [ ] open");
        let list = &root.children[0];
        assert!(list.bool_property("taskList"));
        assert!(list.children[0].bool_property("checked"));
        assert!(!list.children[1].bool_property("checked"));
    }

    #[test]
    fn fenced_code_keeps_language_and_params() {
        let root = render("```json:table\n{}\n```");
        let pre = &root.children[0];
        assert_eq!(pre.str_property("language"), Some("json"));
        assert_eq!(pre.str_property("langParams"), Some("table"));
        assert_eq!(pre.text_content(), "{}");
    }

    #[test]
    fn indented_code_spans_include_their_indent() {
        for src in ["    spaces", "\ttab", "para\n\n\ttab after para"] {
            let root = render(src);
            let pre = root.children.last().expect("code block");
            assert_eq!(pre.kind, "pre");
            let raw = super::super::extract(pre.position.as_ref(), src).expect("source");
            assert!(src.ends_with(&raw), "{raw:?} is not a suffix of {src:?}");
            assert!(raw.starts_with(['\t', ' ']), "{raw:?} lost its indent");
        }
    }

    #[test]
    fn table_cells_are_headers_then_data() {
        let root = render("| a | b |\n|:--|---|\n| c | d |");
        let table = &root.children[0];
        assert_eq!(kinds(table), vec!["thead", "tr"]);
        let head_row = &table.children[0].children[0];
        assert_eq!(kinds(head_row), vec!["th", "th"]);
        assert_eq!(head_row.children[0].str_property("align"), Some("left"));
        assert_eq!(kinds(&table.children[1]), vec!["td", "td"]);
    }

    #[test]
    fn html_blocks_nest_around_markdown() {
        let root = render("<div>\n\n*styled*\n\n</div>");
        assert_eq!(kinds(&root), vec!["div"]);
        let div = &root.children[0];
        assert_eq!(kinds(div), vec!["p"]);
        let pos = div.position.expect("div position");
        assert_eq!(pos.range(), 0..23);
    }

    #[test]
    fn inline_html_marks_wrap_their_text() {
        let root = render("<strong>bold</strong>");
        let p = &root.children[0];
        assert_eq!(kinds(p), vec!["strong"]);
        assert_eq!(p.children[0].text_content(), "bold");
    }

    #[test]
    fn raw_html_elements_are_dropped_with_content() {
        let root = render("<div>keep<script>gone()</script></div>");
        assert_eq!(root.children[0].text_content(), "keep");
    }

    #[test]
    fn html_text_keeps_spaces_next_to_inline_tags() {
        let root = render("<dl>\n<dd>A giant <em>owl-like</em> creature.</dd>\n</dl>");
        let dd = &root.children[0].children[0];
        assert_eq!(kinds(dd), vec!["text", "em", "text"]);
        assert_eq!(dd.children[0].value.as_deref(), Some("A giant "));
        assert_eq!(dd.children[2].value.as_deref(), Some(" creature."));
    }

    #[test]
    fn soft_breaks_merge_into_text() {
        let root = render("one\ntwo");
        let p = &root.children[0];
        assert_eq!(kinds(p), vec!["text"]);
        assert_eq!(p.children[0].value.as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn comments_become_comment_elements() {
        let root = render("<!-- note\nmore -->");
        assert_eq!(root.children[0].kind, "comment");
        assert_eq!(root.children[0].value.as_deref(), Some(" note\nmore "));
    }

    #[test]
    fn reference_definitions_are_spliced_in_order() {
        let root = render("see [a]\n\n[a]: https://a.example\n\n# end");
        assert_eq!(kinds(&root), vec!["p", "referenceDefinition", "h1"]);
        assert_eq!(
            root.children[1].value.as_deref(),
            Some("[a]: https://a.example")
        );
    }

    #[test]
    fn reference_links_keep_their_label() {
        let root = render("[GitLab][gitlab-url]\n\n[gitlab-url]: https://gitlab.com");
        let a = &root.children[0].children[0];
        assert!(a.bool_property("isReference"));
        assert_eq!(a.str_property("canonicalSrc"), Some("gitlab-url"));
        assert_eq!(a.str_property("href"), Some("https://gitlab.com"));
    }
}
