//! Tracks the nesting of `class`/`module` bodies during conversion so that
//! constant references can be resolved to their fully qualified path
//! (spec.md §4's namespace tracker).

use crate::interner::IStr;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
struct Frame {
    /// The constant path segments leading to this frame, e.g. `["Foo", "Bar"]`.
    path: Vec<IStr>,
    /// Names declared directly in this frame (methods, constants, nested
    /// classes/modules) so a bare reference can be resolved without walking
    /// all the way out to the top.
    symbols: FxHashMap<IStr, Symbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Class,
    Module,
    Constant,
    Method,
}

/// A stack of open `class`/`module` frames plus their local symbol tables.
#[derive(Debug, Default)]
pub struct NamespaceTracker {
    stack: Vec<Frame>,
}

impl NamespaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, name: IStr) {
        let mut path = self.current_path().to_vec();
        path.push(name);
        self.stack.push(Frame {
            path,
            symbols: FxHashMap::default(),
        });
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    pub fn declare(&mut self, name: IStr, kind: Symbol) {
        if let Some(frame) = self.stack.last_mut() {
            frame.symbols.insert(name, kind);
        }
    }

    pub fn current_path(&self) -> &[IStr] {
        self.stack.last().map(|f| f.path.as_slice()).unwrap_or(&[])
    }

    /// The slash/dot-joined constant path a `const` node referring to `name`
    /// should resolve to, searching from the innermost frame outward.
    pub fn find(&self, name: &str) -> Option<Vec<IStr>> {
        for frame in self.stack.iter().rev() {
            if frame.symbols.contains_key(name) {
                let mut path = frame.path.clone();
                path.push(IStr::from(name));
                return Some(path);
            }
        }
        None
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_frames_build_a_dotted_path() {
        let mut ns = NamespaceTracker::new();
        ns.enter(IStr::from("Foo"));
        ns.enter(IStr::from("Bar"));
        assert_eq!(
            ns.current_path().iter().map(|s| s.as_ref()).collect::<Vec<_>>(),
            vec!["Foo", "Bar"]
        );
        ns.leave();
        assert_eq!(ns.current_path(), [IStr::from("Foo")]);
    }

    #[test]
    fn declared_symbols_resolve_from_the_innermost_frame() {
        let mut ns = NamespaceTracker::new();
        ns.enter(IStr::from("Foo"));
        ns.declare(IStr::from("BAR"), Symbol::Constant);
        let resolved = ns.find("BAR").unwrap();
        assert_eq!(resolved.iter().map(|s| s.as_ref()).collect::<Vec<_>>(), vec!["Foo", "BAR"]);
    }
}
