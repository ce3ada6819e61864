use super::blocks::inline_form;
use super::utils::display_width;
use super::{RenderContext, Serializer};
use crate::ast::{Node, NodeType};
use crate::error::Result;
use crate::text::{Line, Region};

/// A table can be written as a pipe table when its first row is all header
/// cells, no other row has one, and every cell is a single paragraph without
/// spans. Anything else needs HTML.
pub fn should_render_as_markdown_table(table: &Node) -> bool {
    let Some((head, body)) = table.content.split_first() else {
        return false;
    };
    let header_row = !head.content.is_empty()
        && head
            .content
            .iter()
            .all(|cell| cell.node_type == NodeType::TableHeader);
    let body_rows = body.iter().all(|row| {
        row.content
            .iter()
            .all(|cell| cell.node_type == NodeType::TableCell)
    });
    let simple_cells = table.content.iter().flat_map(|row| &row.content).all(|cell| {
        matches!(cell.content.as_slice(), [p] if p.node_type == NodeType::Paragraph)
            && cell.attrs.int("colspan").unwrap_or(1) <= 1
            && cell.attrs.int("rowspan").unwrap_or(1) <= 1
    });
    header_row && body_rows && simple_cells
}

pub fn table(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    if should_render_as_markdown_table(node) {
        pipe_table(ser, node, ctx)
    } else {
        html_table(ser, node, ctx)
    }
}

fn cell_texts(ser: &Serializer<'_>, row: &Node, ctx: RenderContext) -> Result<Vec<String>> {
    row.content
        .iter()
        .map(|cell| {
            let mut text = String::new();
            for block in &cell.content {
                text.push_str(&ser.render_node(block, ctx)?.apply());
            }
            Ok(text.replace('\n', " "))
        })
        .collect()
}

fn pipe_row(texts: &[String]) -> Line {
    let mut line = Line::from_str("|");
    for text in texts {
        line.push(" ");
        line.push(text.as_str());
        line.push(" |");
    }
    line
}

/// `| a | b |` rows under a separator sized to the header cells.
fn pipe_table(ser: &Serializer<'_>, node: &Node, _: RenderContext) -> Result<Region> {
    let ctx = RenderContext {
        tight: false,
        in_table: true,
        pipe: true,
    };
    let mut region = Region::new();
    let Some((head, body)) = node.content.split_first() else {
        return Ok(region);
    };
    let headers = cell_texts(ser, head, ctx)?;
    region.push_back_line(pipe_row(&headers));

    let mut separator = Line::from_str("|");
    for (cell, text) in head.content.iter().zip(&headers) {
        let width = display_width(text);
        let dashes = match cell.attrs.str("align") {
            Some("left") => format!(":{}", "-".repeat(width + 1)),
            Some("right") => format!("{}:", "-".repeat(width + 1)),
            Some("center") => format!(":{}:", "-".repeat(width)),
            _ => "-".repeat(width + 2),
        };
        separator.push(dashes);
        separator.push("|");
    }
    region.push_back_line(separator);

    for row in body {
        region.push_back_line(pipe_row(&cell_texts(ser, row, ctx)?));
    }
    Ok(region)
}

fn html_table(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let mut region = Region::from_str("<table>");
    for row in &node.content {
        region.append(ser.render_node(row, ctx)?);
    }
    region.push_back_line(Line::from_str("</table>"));
    Ok(region)
}

pub fn row(ser: &Serializer<'_>, node: &Node, ctx: RenderContext) -> Result<Region> {
    let mut region = Region::from_str("<tr>");
    for cell in &node.content {
        region.append(ser.render_node(cell, ctx)?);
    }
    region.push_back_line(Line::from_str("</tr>"));
    Ok(region)
}

/// An HTML cell: inline text between the tags, or blocks after a blank line.
pub fn cell(ser: &Serializer<'_>, node: &Node, _: RenderContext) -> Result<Region> {
    let ctx = RenderContext {
        tight: false,
        in_table: true,
        pipe: false,
    };
    let tag = if node.node_type == NodeType::TableHeader {
        "th"
    } else {
        "td"
    };
    let mut open = format!("<{tag}");
    for key in ["colspan", "rowspan"] {
        if let Some(n) = node.attrs.int(key).filter(|n| *n > 1) {
            open.push_str(&format!(" {key}=\"{n}\""));
        }
    }
    open.push('>');

    if let Some(text) = inline_form(ser, node, ctx)? {
        return Ok(Region::from_str(&format!("{open}{text}</{tag}>")));
    }
    let mut region = Region::from_str(&open);
    region.push_blank_line();
    region.append(ser.render_blocks(&node.content, ctx)?);
    let ends_in_pipe_table = node
        .content
        .last()
        .is_some_and(|last| last.node_type == NodeType::Table && should_render_as_markdown_table(last));
    if ends_in_pipe_table {
        region.push_blank_line();
    }
    region.push_back_line(Line::from_str(&format!("</{tag}>")));
    Ok(region)
}
