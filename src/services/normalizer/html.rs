//! HTML reformatter built on `scraper` (html5ever).
//!
//! The document is parsed into a tree and written back one node per line.
//! Attributes are sorted by name so the output, and therefore its digest,
//! does not depend on attribute order in the source.

use scraper::{ElementRef, Html, Node};

use crate::error::Result;

const INDENT: &str = "  ";

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is copied verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements whose text keeps its line layout but is escaped on output.
const ESCAPED_TEXT_ELEMENTS: &[&str] = &["textarea"];

/// Inline an element's text on its tag line when it is at most this long.
const INLINE_TEXT_MAX: usize = 80;

/// Reformat an HTML document.
pub fn beautify(input: &str) -> Result<String> {
    let document = Html::parse_document(input);
    let mut lines = Vec::new();

    for child in document.tree.root().children() {
        match ElementRef::wrap(child) {
            Some(element) => write_element(&mut lines, element, 0),
            None => write_leaf(&mut lines, child.value(), 0),
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn write_element(lines: &mut Vec<String>, element: ElementRef<'_>, depth: usize) {
    let name = element.value().name();
    let pad = INDENT.repeat(depth);
    let open = open_tag(element);

    if VOID_ELEMENTS.contains(&name) {
        lines.push(format!("{pad}{open}"));
        return;
    }

    let raw = RAW_TEXT_ELEMENTS.contains(&name);
    if raw || ESCAPED_TEXT_ELEMENTS.contains(&name) {
        let inner: String = element.text().collect();
        let content = inner.trim_start_matches(['\r', '\n']).trim_end();
        if content.is_empty() {
            lines.push(format!("{pad}{open}</{name}>"));
        } else {
            lines.push(format!("{pad}{open}"));
            lines.extend(content.lines().map(|line| {
                if raw {
                    line.to_string()
                } else {
                    escape_text(line)
                }
            }));
            lines.push(format!("{pad}</{name}>"));
        }
        return;
    }

    if let Some(text) = inline_text(element) {
        lines.push(format!("{pad}{open}{text}</{name}>"));
        return;
    }

    lines.push(format!("{pad}{open}"));
    for child in element.children() {
        match ElementRef::wrap(child) {
            Some(child_element) => write_element(lines, child_element, depth + 1),
            None => write_leaf(lines, child.value(), depth + 1),
        }
    }
    lines.push(format!("{pad}</{name}>"));
}

fn write_leaf(lines: &mut Vec<String>, node: &Node, depth: usize) {
    let pad = INDENT.repeat(depth);
    match node {
        Node::Doctype(doctype) => lines.push(format!("{pad}<!DOCTYPE {}>", doctype.name())),
        Node::Comment(comment) => lines.push(format!("{pad}<!--{}-->", &**comment)),
        Node::Text(text) => {
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                lines.push(format!("{pad}{}", escape_text(&collapsed)));
            }
        }
        _ => {}
    }
}

/// Text to place between the tags when the element holds nothing else.
///
/// Returns an empty string for empty elements and `None` when the element
/// needs its own block.
fn inline_text(element: ElementRef<'_>) -> Option<String> {
    let mut text = None;
    for child in element.children() {
        match child.value() {
            Node::Text(t) => {
                let collapsed = collapse_whitespace(t);
                if collapsed.is_empty() {
                    continue;
                }
                if text.is_some() {
                    return None;
                }
                text = Some(collapsed);
            }
            _ => return None,
        }
    }

    match text {
        None => Some(String::new()),
        Some(t) if t.len() <= INLINE_TEXT_MAX => Some(escape_text(&t)),
        Some(_) => None,
    }
}

fn open_tag(element: ElementRef<'_>) -> String {
    let value = element.value();
    let mut attrs: Vec<(&str, &str)> = value.attrs().collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));

    let mut tag = format!("<{}", value.name());
    for (name, val) in attrs {
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        tag.push_str(&escape_attr(val));
        tag.push('"');
    }
    tag.push('>');
    tag
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
