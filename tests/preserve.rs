mod common;

use pretty_assertions::assert_eq;
use pulldown_cmark_roundtrip::ChangeTracker;
use pulldown_cmark_roundtrip::ast::NodeType;
use rstest::rstest;

use common::{append_text, edit_and_render, parse, prepend_text, render_against};

#[rstest]
#[case("**bold**", "**bold modified**")]
#[case("__bold__", "__bold modified__")]
#[case("<strong>bold</strong>", "<strong>bold modified</strong>")]
#[case("<b>bold</b>", "<b>bold modified</b>")]
#[case("_italic_", "_italic modified_")]
#[case("*italic*", "*italic modified*")]
#[case("<em>italic</em>", "<em>italic modified</em>")]
#[case("<i>italic</i>", "<i>italic modified</i>")]
#[case("[gitlab](https://gitlab.com)", "[gitlab modified](https://gitlab.com)")]
#[case(
    "<a href=\"https://gitlab.com\">link</a>",
    "<a href=\"https://gitlab.com\">link modified</a>"
)]
#[case("`code`", "`code modified`")]
#[case("<code>code</code>", "<code>code modified</code>")]
#[case("~~striked~~", "~~striked modified~~")]
#[case("<del>striked</del>", "<del>striked modified</del>")]
#[case("<strike>striked</strike>", "<strike>striked modified</strike>")]
#[case("<s>striked</s>", "<s>striked modified</s>")]
#[case("- list item", "- list item modified")]
#[case("* list item", "* list item modified")]
#[case("+ list item", "+ list item modified")]
#[case("- list item 1\n- list item 2", "- list item 1\n- list item 2 modified")]
#[case("2) list item", "2) list item modified")]
#[case("1. list item", "1. list item modified")]
#[case("2) [ ] task list item", "2) [ ] task list item modified")]
#[case("2) [x] task list item", "2) [x] task list item modified")]
#[case("![image](image.png)", "![image](image.png) modified")]
fn appending_keeps_original_syntax(#[case] markdown: &str, #[case] expected: &str) {
    let out = edit_and_render(markdown, |doc| append_text(doc, " modified"));
    assert_eq!(out, expected);
}

#[rstest]
#[case("link www.gitlab.com", "modified link www.gitlab.com")]
#[case("link https://www.gitlab.com", "modified link https://www.gitlab.com")]
#[case("link(https://www.gitlab.com)", "modified link(https://www.gitlab.com)")]
#[case("link(engineering@gitlab.com)", "modified link(engineering@gitlab.com)")]
#[case("link <https://www.gitlab.com>", "modified link <https://www.gitlab.com>")]
#[case("link [https://www.gitlab.com>", "modified link \\[https://www.gitlab.com>")]
#[case("link <https://www.gitlab.com", "modified link <https://www.gitlab.com")]
#[case("link https://www.gitlab.com>", "modified link https://www.gitlab.com>")]
#[case("link https://www.gitlab.com/path", "modified link https://www.gitlab.com/path")]
#[case(
    "link https://www.gitlab.com?query=search",
    "modified link https://www.gitlab.com?query=search"
)]
#[case(
    "link https://www.gitlab.com/#fragment",
    "modified link https://www.gitlab.com/#fragment"
)]
#[case(
    "link https://www.gitlab.com/?query=search",
    "modified link https://www.gitlab.com/?query=search"
)]
#[case(
    "link https://www.gitlab.com#fragment",
    "modified link https://www.gitlab.com#fragment"
)]
#[case(
    "link **https://www.gitlab.com]**",
    "modified link **https://www.gitlab.com]**"
)]
#[case(
    "[^1] footnote\n\n[^1]: footnote definition",
    "modified [^1] footnote\n\n[^1]: footnote definition"
)]
fn prepending_keeps_original_syntax(#[case] markdown: &str, #[case] expected: &str) {
    let out = edit_and_render(markdown, |doc| prepend_text(doc, "modified "));
    assert_eq!(out, expected);
}

#[test]
fn untouched_blocks_replay_even_when_irregular() {
    let source = "Title\n=====\n\n*   loose   spacing\n*   kept\n\n1)  one\n\nlast paragraph";
    let out = edit_and_render(source, |doc| append_text(doc, "!"));
    assert_eq!(
        out,
        "Title\n=====\n\n*   loose   spacing\n*   kept\n\n1)  one\n\nlast paragraph!"
    );
}

#[test]
fn edited_item_keeps_sibling_items_verbatim() {
    let source = "* first   item\n* second";
    let out = edit_and_render(source, |doc| append_text(doc, " edited"));
    assert_eq!(out, "* first   item\n* second edited");
}

#[test]
fn nested_replay_is_not_indented_twice() {
    let source = "- parent\n  -   child one\n  -   child two\n- last";
    let out = edit_and_render(source, |doc| append_text(doc, " edited"));
    assert_eq!(out, "- parent\n  -   child one\n  -   child two\n- last edited");
}

#[test]
fn multi_line_blocks_moved_out_of_their_container_are_rerendered() {
    let out = edit_and_render("> line a\n> line b\n\nafter", |doc| {
        let lifted = doc.root.content[0].content[0].clone();
        doc.root.content[0] = lifted;
    });
    assert_eq!(out, "line a\nline b\n\nafter");
    let blocks: Vec<NodeType> = parse(&out).blocks().iter().map(|b| b.node_type).collect();
    assert_eq!(blocks, vec![NodeType::Paragraph, NodeType::Paragraph]);
}

#[test]
fn removed_blocks_disappear_and_the_rest_replays() {
    let pristine = parse("one  **x**\n\ntwo\n\nthree  _y_");
    let mut doc = pristine.clone();
    doc.root.content.remove(1);
    assert_eq!(render_against(&doc, &pristine), "one  **x**\n\nthree  _y_");
}

#[test]
fn tracker_compares_by_source_position() {
    let pristine = parse("# Title\n\nbody text");
    let mut doc = pristine.clone();
    append_text(&mut doc, " more");
    let tracker = ChangeTracker::track(&doc, &pristine);

    let heading = &doc.blocks()[0];
    let key = heading.attrs.source_map_key().unwrap();
    assert!(tracker.is_unchanged(key, NodeType::Heading.into()));

    let body = &doc.blocks()[1];
    let key = body.attrs.source_map_key().unwrap();
    assert!(!tracker.is_unchanged(key, NodeType::Paragraph.into()));
}

#[test]
fn preserve_unchanged_can_be_switched_off() {
    use pulldown_cmark_roundtrip::Renderers;
    use pulldown_cmark_roundtrip::config::SerializerOptions;

    let doc = parse("__bold__ and *italic*");
    let options = SerializerOptions {
        preserve_unchanged: false,
        ..SerializerOptions::default()
    };
    let out =
        pulldown_cmark_roundtrip::serialize(&doc, Some(&doc), &Renderers::default(), &options)
            .unwrap();
    assert_eq!(out, "__bold__ and *italic*");

    let mut edited = doc.clone();
    prepend_text(&mut edited, "x ");
    let out =
        pulldown_cmark_roundtrip::serialize(&edited, Some(&doc), &Renderers::default(), &options)
            .unwrap();
    assert_eq!(out, "__x bold__ and *italic*");
}
