// src/sanitize/mod.rs

//! HTML sanitization engine.
//!
//! Converts untrusted rich-text from the content editor into markup safe
//! to insert into a live page: tags and attributes are filtered against
//! static allow-lists, URL-carrying attributes get scheme checks, and
//! everything that does not survive is either dropped or kept as escaped
//! plain text.
//!
//! The engine is stateless and total: every input string yields a string,
//! no call shares state with any other, and failures degrade to escaped
//! text rather than propagating.

mod escape;
mod policy;
mod rewrite;

pub use escape::{escape_html, escape_html_with_breaks};

use std::panic::{AssertUnwindSafe, catch_unwind};

use scraper::Html;

/// Sanitizes rich CMS content for DOM insertion or persisted storage.
///
/// The input is run through a forgiving HTML parser (so malformed markup
/// is error-recovered, never rejected) and the resulting tree is filtered
/// and re-serialized. Guarantees over the output:
///
/// * no attribute whose name starts with `on` (any case);
/// * no `href` resolving to a `javascript:`, `data:` or `vbscript:` scheme;
/// * every `src` is http(s) or a relative path;
/// * tags outside the allow-list survive only as escaped text.
///
/// Never panics: if the tree walk fails for any reason the whole input is
/// returned entity-escaped, trading formatting for safety.
pub fn sanitize_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let rewritten = catch_unwind(AssertUnwindSafe(|| {
        let fragment = Html::parse_fragment(html);
        rewrite::rewrite_fragment(&fragment)
    }));

    match rewritten {
        Ok(out) => out,
        Err(_) => {
            tracing::warn!("sanitizer tree walk failed; emitting escaped text");
            escape_html(html)
        }
    }
}
