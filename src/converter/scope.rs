//! Variable declaration discipline (spec.md §4.4): tracks locals per JS
//! function boundary so the first write to a name emits `let`, and so a
//! write whose first occurrence is nested inside an `if`/`while`/`case`
//! block gets hoisted to a single `let a, b;` at the top of the enclosing
//! function instead of being trapped in a block-scoped `let`.

use crate::interner::IStr;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarState {
    /// Declared at the top level of the current function scope; subsequent
    /// writes need no prefix.
    Declared,
    /// First write happened inside a nested JS block; needs a hoisted
    /// `let name;` inserted at the function's `output_location`, and the
    /// in-place write itself carries no `let`.
    Pending,
    /// Bound by a destructuring multi-assignment target.
    Masgn,
    /// Implicit block parameter / synthesized name, never re-declared.
    Implicit,
}

/// One JS function-level variable scope (method body, arrow body, IIFE body).
#[derive(Debug)]
pub struct FuncScope {
    vars: IndexMap<IStr, VarState>,
    /// Depth of nested JS blocks (`if`/`while`/`case`/`try`) within this
    /// function scope; `0` means statements are at the function's own
    /// top level.
    block_depth: u32,
    /// Serializer line index right after the function's opening brace,
    /// where a hoist line is spliced in if any var ends up `Pending`.
    pub output_location: usize,
    /// True once `this` has been captured into `let self = this` for a
    /// block nested inside this scope (spec.md's block-`this` flag).
    pub self_captured: bool,
}

impl FuncScope {
    pub fn new(output_location: usize) -> Self {
        Self {
            vars: IndexMap::new(),
            block_depth: 0,
            output_location,
            self_captured: false,
        }
    }

    pub fn enter_block(&mut self) {
        self.block_depth += 1;
    }

    pub fn leave_block(&mut self) {
        self.block_depth = self.block_depth.saturating_sub(1);
    }

    pub fn at_top_level(&self) -> bool {
        self.block_depth == 0
    }

    pub fn state_of(&self, name: &str) -> Option<VarState> {
        self.vars.get(name).copied()
    }

    pub fn declare(&mut self, name: IStr, state: VarState) {
        self.vars.insert(name, state);
    }

    /// Names needing a hoisted `let name1, name2;` line, in declaration order.
    pub fn pending_hoists(&self) -> Vec<IStr> {
        self.vars
            .iter()
            .filter(|(_, s)| **s == VarState::Pending)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Decide how a write to `name` in statement context should be emitted.
    /// Returns `true` when the write needs a `let` prefix right here.
    pub fn record_write(&mut self, name: &IStr) -> bool {
        match self.state_of(name) {
            Some(VarState::Declared) | Some(VarState::Pending) | Some(VarState::Implicit) => false,
            Some(VarState::Masgn) => false,
            None => {
                if self.at_top_level() {
                    self.declare(name.clone(), VarState::Declared);
                    true
                } else {
                    self.declare(name.clone(), VarState::Pending);
                    false
                }
            }
        }
    }

    /// Marks `name` as referenced; if it was declared in an outer scope but
    /// not this one, callers should use [`ScopeStack::mark_pending_outer`]
    /// instead — this only applies within a single scope.
    pub fn mark_known(&mut self, name: IStr) {
        self.vars.entry(name).or_insert(VarState::Declared);
    }
}

/// Stack of active function scopes, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<FuncScope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self, output_location: usize) {
        self.scopes.push(FuncScope::new(output_location));
    }

    pub fn pop(&mut self) -> Option<FuncScope> {
        self.scopes.pop()
    }

    pub fn current(&mut self) -> &mut FuncScope {
        self.scopes.last_mut().expect("scope stack is never empty during conversion")
    }

    pub fn current_ref(&self) -> &FuncScope {
        self.scopes.last().expect("scope stack is never empty during conversion")
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// A read of `name` that isn't declared in the current scope but is
    /// declared somewhere in an enclosing scope marks the *enclosing*
    /// declaration as needing no further action (it's a closure capture,
    /// not a hoist) — only the scope that *declares* it needs hoisting
    /// logic, which `record_write` already handles locally.
    pub fn is_known_anywhere(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.state_of(name).is_some())
    }

    /// True once any enclosing function scope has captured `this` into
    /// `let self = this` for a nested `function`-expression block.
    pub fn any_self_captured(&self) -> bool {
        self.scopes.iter().any(|s| s.self_captured)
    }
}
