use serde_json::Value;

use super::utils::{escape_text, leading_run, longest_run, quote_title, sniff_html};
use super::{RenderContext, Serializer};
use crate::ast::{Mark, Node, NodeType};
use crate::error::{ConvertError, Result};
use crate::text::{Line, Region};

/// How a mark wraps the content it spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
    /// Content is written verbatim instead of escaped.
    pub raw: bool,
    /// Whitespace at either end of the content is moved outside.
    pub flanking: bool,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Delimiters {
            open: open.into(),
            close: close.into(),
            raw: false,
            flanking: false,
        }
    }

    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    pub fn flanking(mut self) -> Self {
        self.flanking = true;
        self
    }
}

pub(super) fn render(ser: &Serializer<'_>, nodes: &[Node], ctx: RenderContext) -> Result<String> {
    let mut out = String::new();
    write_run(ser, nodes, &[], ctx, true, &mut out)?;
    Ok(out)
}

/// Write `nodes`, opening marks not already in `open`. The mark spanning the
/// most nodes opens first; on a tie the outer-ranked mark wins.
fn write_run(
    ser: &Serializer<'_>,
    nodes: &[Node],
    open: &[Mark],
    ctx: RenderContext,
    line_start: bool,
    out: &mut String,
) -> Result<()> {
    let mut i = 0;
    while i < nodes.len() {
        let node = &nodes[i];
        let at_start = (out.is_empty() && line_start) || out.ends_with('\n');
        let mut best: Option<(&Mark, usize)> = None;
        for mark in node.marks.iter().filter(|m| !open.contains(m)) {
            let extent = nodes[i..]
                .iter()
                .take_while(|n| n.marks.contains(mark))
                .count();
            if best.is_none_or(|(_, len)| extent > len) {
                best = Some((mark, extent));
            }
        }
        match best {
            Some((mark, extent)) => {
                write_mark(ser, mark, &nodes[i..i + extent], open, ctx, at_start, out)?;
                i += extent;
            }
            None => {
                write_leaf(ser, node, ctx, at_start, out)?;
                i += 1;
            }
        }
    }
    Ok(())
}

fn write_mark(
    ser: &Serializer<'_>,
    mark: &Mark,
    run: &[Node],
    open: &[Mark],
    ctx: RenderContext,
    at_start: bool,
    out: &mut String,
) -> Result<()> {
    // multi-line replays would carry container prefixes from the source
    if let Some(source) = ser.preserved_mark(mark).filter(|s| !s.contains('\n')) {
        out.push_str(source);
        return Ok(());
    }
    let Some(render) = ser.renderers.mark(mark.mark_type) else {
        return match mark.attrs.source_markdown() {
            Some(source) => {
                tracing::warn!(mark_type = %mark.mark_type, "no renderer, falling back to source");
                out.push_str(source);
                Ok(())
            }
            None => Err(ConvertError::no_renderer(mark.mark_type.into())),
        };
    };
    let delimiters = render(ser, mark, run);

    let mut inner = String::new();
    if delimiters.raw {
        inner = run.iter().map(Node::text_content).collect();
    } else {
        let mut opened = open.to_vec();
        opened.push(mark.clone());
        let start = at_start && delimiters.open.is_empty();
        write_run(ser, run, &opened, ctx, start, &mut inner)?;
    }

    if delimiters.flanking {
        let body = inner.trim_start();
        let lead = &inner[..inner.len() - body.len()];
        let core = body.trim_end();
        let trail = &body[core.len()..];
        if core.is_empty() {
            out.push_str(&inner);
            return Ok(());
        }
        out.push_str(lead);
        out.push_str(&delimiters.open);
        out.push_str(core);
        out.push_str(&delimiters.close);
        out.push_str(trail);
    } else {
        out.push_str(&delimiters.open);
        out.push_str(&inner);
        out.push_str(&delimiters.close);
    }
    Ok(())
}

fn write_leaf(
    ser: &Serializer<'_>,
    node: &Node,
    ctx: RenderContext,
    at_start: bool,
    out: &mut String,
) -> Result<()> {
    match (&node.node_type, &node.text) {
        (NodeType::Text, Some(text)) => out.push_str(&escape_text(text, at_start, ctx.pipe)),
        (NodeType::Text, None) => {}
        _ => out.push_str(&ser.render_node(node, ctx)?.apply()),
    }
    Ok(())
}

fn source(mark: &Mark) -> &str {
    mark.attrs.source_markdown().unwrap_or_default()
}

/// The HTML form a mark was written in, if any.
fn html_form(mark: &Mark) -> Option<Delimiters> {
    let (open, close) = sniff_html(source(mark))?;
    Some(Delimiters::new(open, close))
}

fn plain_text(run: &[Node]) -> String {
    run.iter().map(Node::text_content).collect()
}

pub fn bold(_: &Serializer<'_>, mark: &Mark, _: &[Node]) -> Delimiters {
    if let Some(html) = html_form(mark) {
        return html;
    }
    let delim = if source(mark).starts_with("__") { "__" } else { "**" };
    Delimiters::new(delim, delim).flanking()
}

pub fn italic(_: &Serializer<'_>, mark: &Mark, _: &[Node]) -> Delimiters {
    if let Some(html) = html_form(mark) {
        return html;
    }
    let delim = if source(mark).starts_with('*') { "*" } else { "_" };
    Delimiters::new(delim, delim).flanking()
}

pub fn strike(_: &Serializer<'_>, mark: &Mark, _: &[Node]) -> Delimiters {
    if let Some(html) = html_form(mark) {
        return html;
    }
    let delim = if leading_run(source(mark), '~') == 1 { "~" } else { "~~" };
    Delimiters::new(delim, delim).flanking()
}

pub fn highlight(_: &Serializer<'_>, mark: &Mark, _: &[Node]) -> Delimiters {
    html_form(mark).unwrap_or_else(|| Delimiters::new("<mark>", "</mark>"))
}

pub fn code(_: &Serializer<'_>, mark: &Mark, run: &[Node]) -> Delimiters {
    if let Some(html) = html_form(mark) {
        return html;
    }
    let content = plain_text(run);
    let ticks = (longest_run(&content, '`') + 1).max(leading_run(source(mark), '`'));
    let fence = "`".repeat(ticks);
    let pad = content.starts_with('`')
        || content.ends_with('`')
        || (content.len() > 1
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.trim().is_empty());
    if pad {
        Delimiters::new(format!("{fence} "), format!(" {fence}")).raw()
    } else {
        Delimiters::new(fence.clone(), fence).raw()
    }
}

pub fn link(_: &Serializer<'_>, mark: &Mark, run: &[Node]) -> Delimiters {
    if let Some(html) = html_form(mark) {
        return html;
    }
    let attrs = &mark.attrs;
    let href = attrs
        .non_empty("canonicalSrc")
        .or_else(|| attrs.str("href"))
        .unwrap_or_default();
    let text = plain_text(run);
    if attrs.bool("isReference") {
        if text == href {
            return Delimiters::new("[", "]");
        }
        return Delimiters::new("[", format!("][{href}]"));
    }
    let title = attrs.non_empty("title");
    let plain = run.iter().all(|n| n.is_text() && n.marks.len() == 1);
    if title.is_none() && plain && text == href {
        if attrs.bool("autolink") {
            return Delimiters::new("<", ">").raw();
        }
        return Delimiters::new("", "").raw();
    }
    let href = if href.contains(' ') {
        format!("<{href}>")
    } else {
        href.to_string()
    };
    let close = match title {
        Some(title) => format!("]({href} {})", quote_title(title)),
        None => format!("]({href})"),
    };
    Delimiters::new("[", close)
}

pub fn hard_break(_: &Serializer<'_>, _: &Node, ctx: RenderContext) -> Result<Region> {
    if ctx.in_table {
        return Ok(Region::from_str("<br>"));
    }
    let mut region = Region::from_str("\\");
    region.push_back_line(Line::new());
    Ok(region)
}

pub fn image(_: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let attrs = &node.attrs;
    let src = attrs
        .non_empty("canonicalSrc")
        .or_else(|| attrs.non_empty("src"))
        .unwrap_or_default();
    if src.is_empty() || src.starts_with("data:") || src.starts_with("blob:") {
        return Ok(Region::new());
    }
    let alt = escape_text(attrs.str("alt").unwrap_or_default(), false, ctx.pipe);
    if attrs.bool("isReference") {
        return Ok(Region::from_str(&format!("![{alt}][{src}]")));
    }
    let mut out = format!("![{alt}]({src}");
    if let Some(title) = attrs.non_empty("title") {
        out.push(' ');
        out.push_str(&quote_title(title));
    }
    out.push(')');

    let sizes: Vec<String> = ["width", "height"]
        .into_iter()
        .filter_map(|key| {
            let value = match attrs.get(key)? {
                Value::Number(n) => n.to_string(),
                Value::String(s) if s.trim().parse::<f64>().is_ok() => s.trim().to_string(),
                Value::String(s) if !s.is_empty() => format!("\"{s}\""),
                _ => return None,
            };
            Some(format!("{key}={value}"))
        })
        .collect();
    if !sizes.is_empty() {
        out.push_str(&format!("{{{}}}", sizes.join(" ")));
    }
    Ok(Region::from_str(&out))
}

pub fn footnote_reference(_: &Serializer<'_>, node: &Node, _: RenderContext) -> Result<Region> {
    let label = node
        .attrs
        .non_empty("label")
        .or_else(|| node.attrs.non_empty("identifier"))
        .unwrap_or_default();
    Ok(Region::from_str(&format!("[^{label}]")))
}
