//! String and template-literal emission (spec.md §4.4 "String literals").

/// Standard JSON-style escaping used for plain `str` literals.
pub fn escape_str_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escapes text destined for inside a template literal (`` ` ``): backticks
/// and `${` sequences need escaping, but raw newlines are preserved
/// verbatim (spec.md: "Heredoc-like multi-line strings ... preserve raw
/// newlines").
pub fn escape_template_chunk(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_control_chars() {
        assert_eq!(escape_str_literal("a\"b\nc"), "\"a\\\"b\\nc\"");
    }

    #[test]
    fn template_chunk_preserves_newlines_but_escapes_interpolation_markers() {
        assert_eq!(escape_template_chunk("a\n${b}`c"), "a\n\\${b}\\`c");
    }
}
