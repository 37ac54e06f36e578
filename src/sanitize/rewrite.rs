// src/sanitize/rewrite.rs

use scraper::Html;
use ego_tree::NodeRef;
use scraper::node::Node;

use super::escape::escape_html;
use super::policy;

/// Nesting deeper than this degrades to escaped text instead of risking
/// call-stack exhaustion on adversarially nested input.
const MAX_DEPTH: usize = 128;

/// Walks the parsed fragment depth-first in document order and
/// re-serializes the policy-filtered markup.
///
/// Fragment parsing wraps content in a synthetic `<html>` element; the
/// walk starts below it so the wrapper is never treated as user markup.
pub(super) fn rewrite_fragment(fragment: &Html) -> String {
    let mut out = String::new();
    for node in fragment.tree.root().children() {
        match node.value() {
            Node::Element(element) if element.name() == "html" => {
                for child in node.children() {
                    write_node(child, &mut out, 0);
                }
            }
            _ => write_node(node, &mut out, 0),
        }
    }
    out
}

fn write_node(node: NodeRef<'_, Node>, out: &mut String, depth: usize) {
    match node.value() {
        Node::Text(text) => out.push_str(&escape_html(&text)),
        Node::Element(element) => {
            let tag = element.name();
            if !policy::tag_allowed(tag) || depth >= MAX_DEPTH {
                // The subtree's markup is discarded; only its text
                // survives, escaped.
                flatten_text(node, out);
                return;
            }

            out.push('<');
            out.push_str(tag);
            for (name, value) in element.attrs() {
                if !attribute_kept(tag, name, value) {
                    continue;
                }
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_html(value));
                out.push('"');
            }

            if policy::tag_is_void(tag) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            for child in node.children() {
                write_node(child, out, depth + 1);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        // Comments, doctypes, and processing instructions match neither
        // case and are dropped.
        _ => {}
    }
}

/// Attribute filter, applied in source order per attribute.
fn attribute_kept(tag: &str, name: &str, value: &str) -> bool {
    if !policy::attribute_allowed(tag, name) {
        return false;
    }
    if policy::value_dangerous(value) {
        return false;
    }
    if name == "href" && !policy::href_allowed(value) {
        return false;
    }
    if name == "src" && !policy::src_allowed(value) {
        return false;
    }
    true
}

fn flatten_text(node: NodeRef<'_, Node>, out: &mut String) {
    for descendant in node.descendants() {
        if let Node::Text(text) = descendant.value() {
            out.push_str(&escape_html(&text));
        }
    }
}
