use serde_json::Value;

use super::utils::{longest_run, sniff_bullet, sniff_ordered_delimiter};
use super::{RenderContext, Serializer};
use crate::ast::{Node, NodeType};
use crate::error::Result;
use crate::text::{Line, Region};

/// Text of a container holding exactly one non-empty paragraph of unmarked
/// text. Such containers render inline (`<td>text</td>`); anything else
/// renders as blocks between blank lines.
pub(crate) fn inline_form(
    ser: &Serializer<'_>,
    node: &Node,
    ctx: RenderContext,
) -> Result<Option<String>> {
    match node.content.as_slice() {
        [p] if p.node_type == NodeType::Paragraph && is_plain(&p.content) => {
            Ok(Some(ser.render_node(p, ctx)?.apply()))
        }
        _ => Ok(None),
    }
}

fn is_plain(inlines: &[Node]) -> bool {
    !inlines.is_empty() && inlines.iter().all(|n| n.is_text() && n.marks.is_empty())
}

/// `open`, a blank line, `body`, a blank line, `close`.
fn padded(open: &str, body: Region, close: &str) -> Region {
    let mut region = Region::from_str(open);
    region.push_blank_line();
    if !body.is_empty() {
        region.append(body);
        region.push_blank_line();
    }
    region.push_back_line(Line::from_str(close));
    region
}

pub fn doc(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    ser.render_blocks_from(&node.content, ctx.block(), node.attrs.source_markdown())
}

pub fn paragraph(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    ser.inline_region(&node.content, ctx)
}

pub fn heading(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let level = node.attrs.int("level").unwrap_or(1).clamp(1, 6) as usize;
    let text = ser.render_inline(&node.content, ctx)?.replace('\n', " ");
    Ok(Region::from_str(&format!("{} {}", "#".repeat(level), text)))
}

pub fn blockquote(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let mut inner = ser.render_blocks(&node.content, ctx.block().outside_table())?;
    if node.attrs.bool("multiline") {
        let mut region = Region::from_str(">>>");
        region.append(inner);
        region.push_blank_line();
        region.push_back_line(Line::from_str(">>>"));
        return Ok(region);
    }
    if inner.is_empty() {
        inner.push_blank_line();
    }
    inner.prefix_each_line("> ");
    Ok(inner)
}

pub fn code_block(_: &Serializer<'_>, node: &Node, _: RenderContext) -> Result<Region> {
    let code = node.text_content();
    let fence = "`".repeat((longest_run(&code, '`') + 1).max(3));
    let mut info = node.attrs.str("language").unwrap_or_default().to_string();
    if let Some(params) = node.attrs.non_empty("langParams") {
        info.push(':');
        info.push_str(params);
    }
    let mut region = Region::from_str(&format!("{fence}{info}"));
    region.append(Region::from_str(&code));
    region.push_back_line(Line::from_str(&fence));
    Ok(region)
}

pub fn horizontal_rule(_: &Serializer<'_>, _: &Node, _: RenderContext) -> Result<Region> {
    Ok(Region::from_str("---"))
}

/// Bullet, ordered and task lists. Markers come from the list's source
/// when it has one, then from its attributes, then from the options.
pub fn list(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let attrs = &node.attrs;
    let options = ser.options();
    let source = attrs.source_markdown();
    let tight = attrs
        .get("tight")
        .and_then(Value::as_bool)
        .unwrap_or(options.tight_lists);
    let numeric = match node.node_type {
        NodeType::OrderedList => true,
        NodeType::TaskList => attrs.bool("numeric"),
        _ => false,
    };
    let bullet = source
        .and_then(sniff_bullet)
        .or_else(|| attrs.str("bullet").and_then(|b| b.chars().next()))
        .unwrap_or(options.bullet);
    let delimiter = source
        .and_then(sniff_ordered_delimiter)
        .or_else(|| {
            attrs
                .get("parens")
                .and_then(Value::as_bool)
                .map(|parens| if parens { ')' } else { '.' })
        })
        .unwrap_or(options.ordered_delimiter);
    let start = attrs.int("start").filter(|n| *n >= 0).unwrap_or(1);

    let item_ctx = ctx.tight(tight);
    let mut out = Region::new();
    for (i, item) in node.content.iter().enumerate() {
        let marker = if numeric {
            format!("{}{delimiter} ", start.saturating_add(i as i64))
        } else {
            format!("{bullet} ")
        };
        let mut region = ser.render_node(item, item_ctx)?;
        region.prefix_first_then_indent_rest(marker);
        out.append_separated(region, if tight { 0 } else { 1 });
    }
    Ok(out)
}

pub fn item(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let mut region = ser.render_blocks(&node.content, ctx)?;
    if node.node_type == NodeType::TaskItem {
        if region.is_empty() {
            region = Region::from_str("&nbsp;");
        }
        let check = if node.attrs.bool("checked") { "[x] " } else { "[ ] " };
        region.prefix_first_then_indent(check, 0);
    }
    Ok(region)
}

pub fn footnote_definition(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let label = node
        .attrs
        .non_empty("label")
        .or_else(|| node.attrs.non_empty("identifier"))
        .unwrap_or_default();
    let mut region = ser.render_blocks(&node.content, ctx.block())?;
    region.prefix_first_then_indent(format!("[^{label}]: "), 4);
    Ok(region)
}

pub fn div(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    if let Some(text) = inline_form(ser, node, ctx)? {
        return Ok(Region::from_str(&format!("<div>{text}</div>")));
    }
    let body = ser.render_blocks(&node.content, ctx.block())?;
    Ok(padded("<div>", body, "</div>"))
}

/// The first content is the summary. When it and every other content are
/// inline the element stays compact; otherwise blocks get blank lines.
pub fn details(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let Some((summary, rest)) = node.content.split_first() else {
        return Ok(Region::new());
    };
    let summary_text = inline_form(ser, summary, ctx)?;
    let rest_text = rest
        .iter()
        .map(|content| inline_form(ser, content, ctx))
        .collect::<Result<Vec<_>>>()?;

    let mut region = Region::from_str("<details>");
    if let (Some(summary), true) = (&summary_text, rest_text.iter().all(Option::is_some)) {
        region.push_back_line(Line::from_str(&format!("<summary>{summary}</summary>")));
        for text in rest_text.into_iter().flatten() {
            region.append(Region::from_str(&text));
        }
        region.push_back_line(Line::from_str("</details>"));
        return Ok(region);
    }

    match summary_text {
        Some(summary) => {
            region.push_back_line(Line::from_str(&format!("<summary>{summary}</summary>")));
        }
        None => {
            let body = ser.render_blocks(&summary.content, ctx.block())?;
            region.append(padded("<summary>", body, "</summary>"));
        }
    }
    for content in rest {
        let body = ser.render_node(content, ctx.block())?;
        region.append_separated(body, 1);
    }
    region.push_blank_line();
    region.push_back_line(Line::from_str("</details>"));
    Ok(region)
}

pub fn details_content(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    ser.render_blocks(&node.content, ctx.block())
}

pub fn figure(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let mut region = Region::from_str("<figure>");
    region.push_blank_line();
    for child in &node.content {
        let rendered = ser.render_node(child, ctx.block())?;
        if rendered.is_empty() {
            continue;
        }
        region.append(rendered);
        if child.node_type != NodeType::FigureCaption {
            region.push_blank_line();
        }
    }
    region.push_back_line(Line::from_str("</figure>"));
    Ok(region)
}

pub fn figure_caption(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    if is_plain(&node.content) {
        let text = ser.render_inline(&node.content, ctx)?;
        return Ok(Region::from_str(&format!("<figcaption>{text}</figcaption>")));
    }
    let body = ser.inline_region(&node.content, ctx)?;
    Ok(padded("<figcaption>", body, "</figcaption>"))
}

pub fn description_list(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let mut region = Region::from_str("<dl>");
    for item in &node.content {
        region.append(ser.render_node(item, ctx.block())?);
    }
    region.push_back_line(Line::from_str("</dl>"));
    Ok(region)
}

pub fn description_item(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let is_term = node
        .attrs
        .get("isTerm")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let tag = if is_term { "dt" } else { "dd" };
    if let Some(text) = inline_form(ser, node, ctx)? {
        return Ok(Region::from_str(&format!("<{tag}>{text}</{tag}>")));
    }
    let body = ser.render_blocks(&node.content, ctx.block())?;
    Ok(padded(&format!("<{tag}>"), body, &format!("</{tag}>")))
}

pub fn reference_definition(_: &Serializer<'_>, node: &Node, _: RenderContext) -> Result<Region> {
    Ok(Region::from_str(&node.text_content()))
}

pub fn comment(_: &Serializer<'_>, node: &Node, _: RenderContext) -> Result<Region> {
    let description = node.attrs.str("description").unwrap_or_default();
    Ok(Region::from_str(&format!("<!--{description}-->")))
}
