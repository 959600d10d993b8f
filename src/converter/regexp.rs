//! Regular expression lowering: Ruby anchor/flag idioms are rewritten to
//! their JS equivalents, and the literal-vs-`new RegExp` choice is made by
//! scanning the source text.

/// Rewrites Ruby-only regex syntax to the JS equivalent:
/// - `\A`/`\z` anchors become `^`/`$`.
/// - the `x` (extended) flag strips unescaped whitespace and `#...` comments
///   from the pattern before emission, since JS has no extended-mode flag.
pub fn rewrite_pattern(source: &str, flags: &str) -> (String, String) {
    let mut out = source.replace(r"\A", "^").replace(r"\z", "$");
    let mut js_flags: String = flags.chars().filter(|c| matches!(c, 'g' | 'i' | 'm' | 's' | 'u' | 'y')).collect();

    if flags.contains('x') {
        out = strip_extended_whitespace(&out);
    }

    // `^`-prefixed pattern with `.` forces dotall (the `s` flag).
    if out.starts_with('^') && out.contains('.') && !js_flags.contains('s') {
        js_flags.push('s');
    }

    (out, js_flags)
}

fn strip_extended_whitespace(pattern: &str) -> String {
    let mut out = String::new();
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' => {
                in_class = true;
                out.push(c);
            }
            ']' => {
                in_class = false;
                out.push(c);
            }
            '#' if !in_class => {
                for c2 in chars.by_ref() {
                    if c2 == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() && !in_class => {}
            c => out.push(c),
        }
    }
    out
}

/// Emits a literal `/.../flags` when the content has at most 3 unescaped
/// slashes and no interpolation; otherwise `new RegExp(string, flags)`.
pub fn prefer_literal(pattern: &str, has_interpolation: bool) -> bool {
    if has_interpolation {
        return false;
    }
    let unescaped_slashes = count_unescaped(pattern, '/');
    unescaped_slashes <= 3
}

fn count_unescaped(s: &str, target: char) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == target {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_translate_to_js_equivalents() {
        let (pattern, _) = rewrite_pattern(r"\Afoo\z", "");
        assert_eq!(pattern, "^foo$");
    }

    #[test]
    fn extended_flag_strips_comments_and_whitespace() {
        let (pattern, flags) = rewrite_pattern("foo  # a comment\nbar", "x");
        assert_eq!(pattern, "foobar");
        assert!(!flags.contains('x'));
    }

    #[test]
    fn dotall_forced_when_anchored_and_dotted() {
        let (_, flags) = rewrite_pattern(r"^a.b$", "");
        assert_eq!(flags, "s");
    }

    #[test]
    fn literal_preferred_under_slash_threshold() {
        assert!(prefer_literal("a/b/c", false));
        assert!(!prefer_literal("a/b/c/d", false));
        assert!(!prefer_literal("a/b", true));
    }
}
