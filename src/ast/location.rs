//! Location metadata attached to AST nodes (spec.md §4.1).
//!
//! Most nodes carry a [`Location::Simple`] range. A few carry extra
//! sub-ranges the converter and the method-vs-accessor predicate need:
//! `send`-family nodes record where the selector ends (for precedence and
//! for rewriting `foo=` setters), `def`-family nodes record the name's end
//! and whether the body is an endless (`= expr`, no `end`) method, and
//! x-string nodes record the opening/closing delimiter ranges.

use crate::span::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Simple(SimpleLocation),
    Send(SendLocation),
    Def(DefLocation),
    XStr(XStrLocation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleLocation {
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendLocation {
    pub range: TextRange,
    /// End offset of the method-name token, e.g. for disambiguating
    /// `foo.bar` (selector ends right after `bar`) from `foo.bar()`.
    pub selector_end: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefLocation {
    pub range: TextRange,
    pub name_end: TextRange,
    /// `def sq(x) = x * x` — no `end` keyword, body is a single expression.
    pub endless: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XStrLocation {
    pub range: TextRange,
    pub opening: TextRange,
    pub closing: TextRange,
}

impl Location {
    pub fn range(&self) -> TextRange {
        match self {
            Location::Simple(l) => l.range,
            Location::Send(l) => l.range,
            Location::Def(l) => l.range,
            Location::XStr(l) => l.range,
        }
    }

    pub fn simple(range: TextRange) -> Self {
        Location::Simple(SimpleLocation { range })
    }

    pub fn send(range: TextRange, selector_end: TextRange) -> Self {
        Location::Send(SendLocation {
            range,
            selector_end,
        })
    }

    pub fn def(range: TextRange, name_end: TextRange, endless: bool) -> Self {
        Location::Def(DefLocation {
            range,
            name_end,
            endless,
        })
    }

    pub fn xstr(range: TextRange, opening: TextRange, closing: TextRange) -> Self {
        Location::XStr(XStrLocation {
            range,
            opening,
            closing,
        })
    }

    /// The "callable-style if parentheses or arguments present, else
    /// accessor-style" predicate from spec.md §3 (`def.is_method()`).
    pub fn is_method_style(&self, has_args: bool, source: &str) -> bool {
        match self {
            Location::Def(d) => {
                if has_args {
                    return true;
                }
                let name_end: usize = d.name_end.end().into();
                source.as_bytes().get(name_end) == Some(&b'(')
            }
            _ => has_args,
        }
    }
}
