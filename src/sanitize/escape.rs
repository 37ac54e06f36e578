// src/sanitize/escape.rs

/// Escapes the five HTML metacharacters: `&`, `<`, `>`, `"`, `'`.
///
/// The ampersand must be replaced first, otherwise the entities produced
/// for the other characters would themselves be re-escaped.
///
/// Applied to text-node content, surviving attribute values, and the
/// flattened text of stripped tags. Applying it twice double-escapes;
/// callers escape exactly once.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes like [`escape_html`], then maps literal newlines to `<br>`.
///
/// Escaping runs first: inserting `<br>` before escaping would corrupt the
/// tag, and escaping first guarantees newlines embedded in attacker input
/// cannot smuggle markup in next to the generated `<br>`.
pub fn escape_html_with_breaks(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}
