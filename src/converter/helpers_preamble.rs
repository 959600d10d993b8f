//! Fixed preamble helpers: small string constants the public entry point
//! prepends when the chosen options need them, rather than something the
//! converter assembles per node.

/// Ruby truthiness: only `nil`/`false` are falsy, everything else (0, "",
/// `[]`, ...) is truthy. Emitted once when `truthy = "ruby"`.
pub const TRUTHY_HELPER: &str = "function $T(x) { return x !== false && x !== null && x !== undefined }";

/// Ruby `||`: returns `a` if truthy, else evaluates and returns `b`.
pub const ROR_HELPER: &str = "function $ror(a, b) { return $T(a) ? a : b() }";

/// Ruby `&&`: returns `b`'s value if `a` is truthy, else returns `a`.
pub const RAND_HELPER: &str = "function $rand(a, b) { return $T(a) ? b() : a }";

pub const USE_STRICT: &str = "\"use strict\";";

/// Sequence/host shims the emitter assumes exist in a full target host;
/// prepended only when the generated code actually calls one of them and
/// the options opt into shimming rather than assuming a runtime that
/// already provides them.
pub const SEQUENCE_HELPERS: &str = "\
function $first(a) { return a[0] }
function $last(a) { return a[a.length - 1] }
function $compact(a) { return a.filter(function (x) { return x !== null && x !== undefined }) }
function $rindex(a, v) { return a.lastIndexOf(v) }
function $delete_at(a, i) { return a.splice(i, 1)[0] }
function $chomp(s) { return s.replace(/\\r?\\n$/, \"\") }";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreambleNeeds {
    pub truthy: bool,
    pub ror: bool,
    pub rand: bool,
    pub strict: bool,
    pub sequence_helpers: bool,
}

impl PreambleNeeds {
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if self.strict {
            lines.push(USE_STRICT.to_string());
        }
        if self.truthy || self.ror || self.rand {
            lines.push(TRUTHY_HELPER.to_string());
        }
        if self.ror {
            lines.push(ROR_HELPER.to_string());
        }
        if self.rand {
            lines.push(RAND_HELPER.to_string());
        }
        if self.sequence_helpers {
            lines.push(SEQUENCE_HELPERS.to_string());
        }
        lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        !(self.truthy || self.ror || self.rand || self.strict || self.sequence_helpers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_needs_render_nothing() {
        assert!(PreambleNeeds::default().is_empty());
        assert_eq!(PreambleNeeds::default().render(), "");
    }

    #[test]
    fn strict_only() {
        let needs = PreambleNeeds { strict: true, ..Default::default() };
        assert_eq!(needs.render(), USE_STRICT);
    }
}
