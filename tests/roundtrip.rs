mod common;

use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use pulldown_cmark_roundtrip::roundtrip;
use similar::{ChangeTag, TextDiff};

use common::{append_text, edit_and_render, parse, render};

fn collect_md_files(dir: &Path, out: &mut Vec<PathBuf>) {
    if dir.is_dir() {
        for entry in fs::read_dir(dir).unwrap() {
            let p = entry.unwrap().path();
            if p.is_dir() {
                collect_md_files(&p, out);
            } else if p.extension().is_some_and(|ext| ext == "md") {
                out.push(p);
            }
        }
    }
}

fn fixtures() -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    collect_md_files(Path::new("tests/fixtures"), &mut files);
    files.sort();
    assert!(!files.is_empty(), "no fixture files found");
    files
        .into_iter()
        .map(|f| {
            let s = fs::read_to_string(&f).unwrap();
            (f, s)
        })
        .collect()
}

fn assert_same_text(label: &str, expected: &str, actual: &str) {
    if expected != actual {
        eprintln!("--- {label}");
        for change in TextDiff::from_lines(expected, actual).iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "- ",
                ChangeTag::Insert => "+ ",
                ChangeTag::Equal => "  ",
            };
            eprint!("{sign}{change}");
        }
    }
    assert_eq!(expected, actual, "{label}");
}

fn describe_tag(tag: &Tag<'_>) -> String {
    match tag {
        Tag::Heading { level, .. } => format!("Heading({level:?})"),
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => format!("CodeBlock({info})"),
        Tag::CodeBlock(CodeBlockKind::Indented) => "CodeBlock".to_string(),
        Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }
        | Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        } => format!("Link({link_type:?}, {dest_url}, {title:?}, {id})", title = title.to_string()),
        Tag::FootnoteDefinition(label) => format!("FootnoteDefinition({label})"),
        other => format!("{other:?}"),
    }
}

// Consecutive text (and HTML) events collapse into one token so differences
// in how text was chunked or where trailing newlines fell do not matter.
fn canonical_events(markdown: &str) -> Vec<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut out = Vec::new();
    let mut text: Option<String> = None;
    let mut html: Option<String> = None;
    let flush = |out: &mut Vec<String>, text: &mut Option<String>, html: &mut Option<String>| {
        if let Some(s) = text.take() {
            out.push(format!("Text({s:?})"));
        }
        if let Some(s) = html.take() {
            out.push(format!("Html({:?})", s.trim_end()));
        }
    };
    for ev in Parser::new_ext(markdown, options) {
        match ev {
            Event::Text(t) => text.get_or_insert_with(String::new).push_str(&t),
            Event::Html(t) | Event::InlineHtml(t) => {
                html.get_or_insert_with(String::new).push_str(&t)
            }
            other => {
                flush(&mut out, &mut text, &mut html);
                out.push(match other {
                    Event::Start(tag) => format!("Start({})", describe_tag(&tag)),
                    Event::End(end) => format!("End({end:?})"),
                    Event::Code(t) => format!("Code({t})"),
                    Event::FootnoteReference(l) => format!("FootnoteReference({l})"),
                    other => format!("{other:?}"),
                });
            }
        }
    }
    flush(&mut out, &mut text, &mut html);
    out
}

#[test]
fn fixtures_replay_verbatim() {
    for (f, source) in fixtures() {
        let out = roundtrip(&source).unwrap();
        assert_same_text(&f.display().to_string(), &source, &out);
    }
}

#[test]
fn fixtures_rerender_to_the_same_events() {
    for (f, source) in fixtures() {
        let md = render(&parse(&source));
        let expected = canonical_events(&source).join("\n");
        let actual = canonical_events(&md).join("\n");
        assert_same_text(&f.display().to_string(), &expected, &actual);
    }
}

#[test]
fn nested_list_markers_are_kept_without_a_pristine_document() {
    let source = "+ list item 1\n+ list item 2\n  - embedded list item 3";
    assert_eq!(render(&parse(source)), source);
    assert_eq!(roundtrip(source).unwrap(), source);
}

#[test]
fn whitespace_between_unchanged_blocks_is_kept() {
    for source in [
        "one\n\n\n\ntwo\n",
        "para\n",
        "\n\nleading blank lines",
        "[a]: <x y> \"t\"\n[a]",
        "a\r\nb\r\n\r\n- x\r\n- y",
        "a\r\nb\r\n\r\n- x\r\n- y\r\n",
    ] {
        assert_eq!(roundtrip(source).unwrap(), source);
    }
}

#[test]
fn blank_runs_next_to_an_edited_block_collapse_to_one() {
    let out = edit_and_render("one\n\n\n\ntwo\n", |doc| append_text(doc, " more"));
    assert_eq!(out, "one\n\ntwo more");
    assert_eq!(render(&parse("one\n\n\n\ntwo\n")), "one\n\ntwo");
}

#[test]
fn unusual_but_valid_syntax_survives() {
    for source in [
        "Setext heading\n==============",
        "    indented code\n    block",
        "\tcode after a tab\n\tsecond line",
        "para\n\n\tcode with tab",
        "* [link](<a b> 'title')",
        "~~~\nfenced with tildes\n~~~",
        "1. one\n\n   two paragraphs\n\n2. two",
        "***bold italic***",
        "<!-- a comment -->",
    ] {
        assert_eq!(roundtrip(source).unwrap(), source);
    }
}
