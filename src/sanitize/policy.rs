// src/sanitize/policy.rs

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Tags the rewriter will emit. Anything else is flattened to escaped text.
///
/// Closed list: block/inline text formatting, lists, tables, and `img`.
static ALLOWED_TAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "p", "div", "span", "br", "hr", "blockquote", "pre", "code",
        "b", "strong", "i", "em", "u", "s", "sub", "sup", "small",
        "h1", "h2", "h3", "h4", "h5", "h6",
        "ul", "ol", "li",
        "table", "thead", "tbody", "tr", "th", "td", "caption",
        "a", "img",
    ]
    .into_iter()
    .collect()
});

/// Per-tag attribute allow-list. Tags without an entry accept only the
/// wildcard attributes.
static TAG_ATTRIBUTES: LazyLock<HashMap<&'static str, HashSet<&'static str>>> =
    LazyLock::new(|| {
        let mut map: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        map.insert("a", ["href", "title", "target", "rel"].into_iter().collect());
        map.insert(
            "img",
            ["src", "alt", "title", "width", "height"].into_iter().collect(),
        );
        map.insert("th", ["colspan", "rowspan"].into_iter().collect());
        map.insert("td", ["colspan", "rowspan"].into_iter().collect());
        map
    });

/// Attributes permitted on every allowed tag.
static WILDCARD_ATTRIBUTES: &[&str] = &["class"];

/// Attribute values carrying script-executing schemes or inline
/// event-handler-like strings are rejected regardless of attribute name.
static DANGEROUS_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s\x00-\x1f]*(?:javascript|vbscript|data)\s*:|\bon\w+\s*=|expression\s*\(")
        .expect("dangerous-value pattern is valid")
});

/// Tags serialized in self-closed form with no children.
static VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Schemes an absolute `href` may carry.
static ALLOWED_HREF_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Prefixes an emitted `src` must start with, after trim + ASCII lowercase.
static ALLOWED_SRC_PREFIXES: &[&str] = &["http://", "https://", "/", "./", "../"];

pub fn tag_allowed(tag: &str) -> bool {
    ALLOWED_TAGS.contains(tag)
}

pub fn tag_is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Whether `name` may appear on `tag`.
///
/// Any name matching case-insensitive "starts with on" is rejected before
/// the allow-list lookup, so case-variant or future handler names cannot
/// slip past a plain set membership test.
pub fn attribute_allowed(tag: &str, name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[..2].eq_ignore_ascii_case(b"on") {
        return false;
    }
    if WILDCARD_ATTRIBUTES.contains(&name) {
        return true;
    }
    TAG_ATTRIBUTES
        .get(tag)
        .is_some_and(|attrs| attrs.contains(name))
}

pub fn value_dangerous(value: &str) -> bool {
    DANGEROUS_VALUE.is_match(value)
}

/// Scheme check for `href`.
///
/// The value is parsed as a URL rather than prefix-matched: the parser
/// strips embedded tab/CR/LF the way browsers do, so `jav\tascript:` still
/// resolves to the `javascript` scheme and is rejected. Relative
/// references (no scheme) are allowed.
pub fn href_allowed(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => ALLOWED_HREF_SCHEMES.contains(&url.scheme()),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Prefix allow-list for `src`: http(s) or a relative path. Fails closed —
/// anything unrecognized (including `data:`) is dropped.
pub fn src_allowed(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    ALLOWED_SRC_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}
