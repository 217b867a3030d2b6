//! Markup stripping.
//!
//! EPUB content documents are nominally XHTML, so the fast path parses
//! them as XML and walks the tree. Books in the wild ship unbalanced
//! markup and bare entities, so a lenient tag scanner backs it up.
//! Either way the result is plain text with paragraphs joined by `\n\n`.

use regex::Regex;
use roxmltree::{Document, ParsingOptions};
use std::sync::LazyLock;

/// XHTML documents carry a doctype, which roxmltree rejects by default.
fn parse_xml(html: &str) -> std::result::Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(html, options)
}

/// Elements that delimit paragraphs.
fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "blockquote"
            | "tr"
            | "br"
    )
}

/// Convert a content document to plain text, preserving paragraph breaks.
pub fn html_to_text(html: &str) -> String {
    match parse_xml(html) {
        Ok(doc) => {
            let mut paragraphs = Vec::new();
            let mut current = String::new();
            walk(doc.root(), &mut paragraphs, &mut current);
            flush(&mut current, &mut paragraphs);
            paragraphs.join("\n\n")
        }
        Err(_) => scan_to_text(html),
    }
}

/// First h1/h2/h3/title text in the document, as the chapter title.
pub fn first_heading(html: &str) -> Option<String> {
    if let Ok(doc) = parse_xml(html) {
        for tag in ["h1", "h2", "h3", "title"] {
            if let Some(node) = doc.descendants().find(|n| tag_eq(n.tag_name().name(), tag)) {
                let mut paragraphs = Vec::new();
                let mut current = String::new();
                walk(node, &mut paragraphs, &mut current);
                flush(&mut current, &mut paragraphs);
                if let Some(first) = paragraphs.into_iter().next() {
                    return Some(first);
                }
            }
        }
        return None;
    }

    // Lenient path for documents that are not well-formed XML.
    for re in HEADING_PATTERNS.iter() {
        if let Some(caps) = re.captures(html) {
            let inner = strip_tags(&caps[1]);
            let text = normalize_ws(&html_escape::decode_html_entities(&inner));
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["h1", "h2", "h3", "title"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}[^>]*>(.*?)</{tag}\s*>"))
                .expect("heading pattern compiles")
        })
        .collect()
});

fn tag_eq(name: &str, expected: &str) -> bool {
    name.eq_ignore_ascii_case(expected)
}

fn walk(node: roxmltree::Node, paragraphs: &mut Vec<String>, current: &mut String) {
    for child in node.children() {
        if child.is_text() {
            current.push_str(child.text().unwrap_or(""));
        } else if child.is_element() {
            let name = child.tag_name().name().to_ascii_lowercase();
            if name == "script" || name == "style" || name == "head" {
                continue;
            }
            let block = is_block(&name);
            if block {
                flush(current, paragraphs);
            }
            walk(child, paragraphs, current);
            if block {
                flush(current, paragraphs);
            }
        }
    }
}

/// Close the paragraph under construction, dropping whitespace noise and
/// stray single characters (page numbers, drop caps split by the markup).
fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    let text = normalize_ws(current);
    current.clear();
    if text.chars().count() > 1 {
        paragraphs.push(text);
    }
}

/// Collapse whitespace runs to single spaces.
fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fallback: strip tags with a scanner, treating closing block tags and
/// `<br>` as paragraph breaks.
fn scan_to_text(html: &str) -> String {
    static SKIP_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)\s*>")
            .expect("skip pattern compiles")
    });
    static TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)</?([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("tag pattern"));

    let html = SKIP_BLOCKS.replace_all(html, "");

    let mut text = String::with_capacity(html.len());
    let mut last = 0;
    for caps in TAG.captures_iter(&html) {
        let m = caps.get(0).expect("whole match");
        text.push_str(&html[last..m.start()]);
        let name = caps[1].to_ascii_lowercase();
        if is_block(&name) {
            text.push('\n');
        }
        last = m.end();
    }
    text.push_str(&html[last..]);

    let decoded = html_escape::decode_html_entities(&text);
    let mut paragraphs = Vec::new();
    for line in decoded.lines() {
        let mut line = line.to_string();
        flush(&mut line, &mut paragraphs);
    }
    paragraphs.join("\n\n")
}

fn strip_tags(html: &str) -> String {
    static TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));
    TAG.replace_all(html, " ").into_owned()
}
