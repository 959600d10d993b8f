//! Method lowering (spec.md §4.4 "Method lowering (`def`)"): turns `def`
//! family nodes into a `function` declaration, an arrow function, or (via
//! [`classes`](super::classes)) a class method — plus the keyword-argument
//! prolog and implicit-block-parameter rules shared by all three shapes.
//!
//! spec.md §9 treats `def`/`defs`/`defm`/`deff`/`defp` and `async`/`asyncs`
//! as aliases of one routine; `dispatch_def` here is that routine.

use super::scope::VarState;
use super::{Converter, Ctx};
use crate::ast::{self, Location, Node, Tag, Value};
use crate::error::ConvertResult;
use crate::interner::IStr;

/// A method/function's parameter list, grouped by JS-relevant shape rather
/// than source order, since the rest/keyword combination needs a synthesized
/// prolog (spec.md §4.4 "Keyword-argument handling") that plain positional
/// and optional params don't.
#[derive(Debug, Default, Clone)]
pub(crate) struct ParsedParams {
    /// `arg`/`optarg`, in declaration order.
    pub leading: Vec<Node>,
    pub rest: Option<Node>,
    /// `kwarg`/`kwoptarg`, in declaration order.
    pub kwargs: Vec<Node>,
    pub kwrest: Option<Node>,
    pub block: Option<Node>,
    pub forward: bool,
}

impl ParsedParams {
    pub fn has_rest_and_kw(&self) -> bool {
        self.rest.is_some() && (!self.kwargs.is_empty() || self.kwrest.is_some())
    }
}

pub(crate) fn parse_params(params: &[Node]) -> ParsedParams {
    let mut p = ParsedParams::default();
    for param in params {
        match param.kind() {
            Tag::Arg | Tag::Optarg => p.leading.push(param.clone()),
            Tag::Restarg => p.rest = Some(param.clone()),
            Tag::Kwarg | Tag::Kwoptarg => p.kwargs.push(param.clone()),
            Tag::Kwrestarg => p.kwrest = Some(param.clone()),
            Tag::Blockarg => p.block = Some(param.clone()),
            Tag::ForwardArgs => p.forward = true,
            Tag::Shadowarg => {} // block-local shadow name, no JS parameter
            _ => {}
        }
    }
    p
}

/// spec.md "Implicit block parameter": if a body contains `yield` (not
/// crossing into a nested method's own body — `yield` there refers to that
/// method's block, not the enclosing one), append a trailing
/// `optarg("_implicitBlockYield", nil)`.
pub(crate) fn maybe_add_implicit_block_param(parsed: &mut ParsedParams, body: &Node) {
    if body_contains_yield(body) {
        parsed.leading.push(ast::s(
            Tag::Optarg,
            vec![Value::Str(IStr::from("_implicitBlockYield")), Value::Node(ast::nil())],
        ));
    }
}

fn body_contains_yield(node: &Node) -> bool {
    match node.kind() {
        Tag::Yield => true,
        Tag::Def | Tag::Defs | Tag::Defm | Tag::Deff | Tag::Defp | Tag::Async | Tag::Asyncs => false,
        _ => node.children().iter().any(|c| match c {
            Value::Node(n) => body_contains_yield(n),
            Value::List(l) => l.iter().any(body_contains_yield),
            _ => false,
        }),
    }
}

/// spec.md's `autoreturn`: threads a `return` through the tail position of
/// `begin`/`if`/`case`, used for endless defs and accessor-style methods.
/// A node that already jumps (`return`/`break`/`next`/`redo`/`retry`) is
/// left alone.
pub(crate) fn autoreturn_thread(node: &Node) -> Node {
    match node.kind() {
        Tag::Begin => {
            let items = node.child(0).and_then(Value::as_list).map(<[Node]>::to_vec).unwrap_or_default();
            if items.is_empty() {
                return node.clone();
            }
            let mut items = items;
            let last = items.pop().unwrap();
            items.push(autoreturn_thread(&last));
            ast::begin(items)
        }
        Tag::If => {
            let pred = node.child_node(0).cloned();
            let then_ = node.child(1).and_then(Value::as_node).map(autoreturn_thread);
            let else_ = node.child(2).and_then(Value::as_node).map(autoreturn_thread);
            ast::s(Tag::If, vec![Value::from(pred), Value::from(then_), Value::from(else_)])
        }
        Tag::Case => {
            let children = node.children();
            let pred = children[0].as_node().cloned();
            let mut out = vec![Value::from(pred)];
            for w in &children[1..children.len() - 1] {
                if let Some(w) = w.as_node() {
                    let conds = w.child(0).and_then(Value::as_list).map(<[Node]>::to_vec).unwrap_or_default();
                    let body = w.child(1).and_then(Value::as_node).map(autoreturn_thread);
                    out.push(Value::Node(ast::s(Tag::When, vec![Value::List(conds), Value::from(body)])));
                }
            }
            let else_ = children.last().and_then(Value::as_node).map(autoreturn_thread);
            out.push(Value::from(else_));
            ast::s(Tag::Case, out)
        }
        Tag::Return | Tag::Break | Tag::Next | Tag::Redo | Tag::Retry => node.clone(),
        _ => ast::s(Tag::Return, vec![Value::List(vec![node.clone()])]),
    }
}

impl<'a> Converter<'a> {
    /// Top-level `def`-family dispatch (spec.md §9 alias resolution):
    /// `Defm`/`Deff`/`Defp` behave exactly like `Def`/`Defs`; `Async`/`Asyncs`
    /// add the `async` keyword. Reached only for defs outside a class body —
    /// `classes.rs` emits class methods through its own routine built on the
    /// same [`ParsedParams`]/prolog helpers.
    pub(crate) fn emit_def(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        let is_async = matches!(node.kind(), Tag::Async | Tag::Asyncs);
        let has_recv = matches!(node.kind(), Tag::Defs | Tag::Asyncs);
        let offset = if has_recv { 1 } else { 0 };

        let name = self.name_of(node, offset);
        let params = node.child(offset + 1).and_then(Value::as_list).unwrap_or(&[]).to_vec();
        let body = node.child_node(offset + 2).cloned().unwrap_or_else(ast::nil);
        let endless = matches!(node.loc(), Some(Location::Def(d)) if d.endless);

        let mut parsed = parse_params(&params);
        maybe_add_implicit_block_param(&mut parsed, &body);
        let body = if endless { autoreturn_thread(&body) } else { body };

        if ctx.is_statement() {
            self.ser.text(if is_async { "async function " } else { "function " });
            self.ser.text(name.to_string());
            self.emit_function(&parsed, &body)
        } else {
            // Bare `def` in expression position emits an arrow function
            // (spec.md §4.4 "Method lowering").
            if is_async {
                self.ser.text("async ");
            }
            self.emit_arrow(&parsed, &body)
        }
    }

    /// Writes `(params) { ...body... }` for a named function declaration,
    /// including the kwarg prolog when the rest+keyword combination applies.
    pub(crate) fn emit_function(&mut self, parsed: &ParsedParams, body: &Node) -> ConvertResult<()> {
        self.emit_param_list(parsed)?;
        self.ser.text(" {");
        self.ser.indent();
        self.scopes.push(self.ser.mark());
        self.declare_params(parsed);
        self.ser.newline();
        self.emit_kwarg_prolog(parsed)?;
        self.emit_statements_block(body)?;
        self.ser.text(";");
        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    /// Writes `(params) => { ...body... }` for an arrow function.
    pub(crate) fn emit_arrow(&mut self, parsed: &ParsedParams, body: &Node) -> ConvertResult<()> {
        self.emit_param_list(parsed)?;
        self.ser.text(" => {");
        self.ser.indent();
        self.scopes.push(self.ser.mark());
        self.declare_params(parsed);
        self.ser.newline();
        self.emit_kwarg_prolog(parsed)?;
        self.emit_statements_block(body)?;
        self.ser.text(";");
        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    /// Declares every parameter name as [`VarState::Implicit`] in the
    /// current scope. Shared with `send.rs`'s block/lambda-literal emission,
    /// which pushes its own function scope the same way `emit_function`/
    /// `emit_arrow` do.
    pub(crate) fn declare_params(&mut self, parsed: &ParsedParams) {
        let mut names: Vec<IStr> = parsed.leading.iter().map(|p| self.name_of(p, 0)).collect();
        names.extend(parsed.rest.as_ref().and_then(|r| r.child(0).and_then(Value::as_str)).map(IStr::from));
        names.extend(parsed.kwargs.iter().map(|k| self.name_of(k, 0)));
        names.extend(parsed.kwrest.as_ref().and_then(|r| r.child(0).and_then(Value::as_str)).map(IStr::from));
        names.extend(parsed.block.as_ref().and_then(|b| b.child(0).and_then(Value::as_str)).map(IStr::from));
        names.push(IStr::from("$kwargs"));
        let scope = self.scopes.current();
        for name in names {
            scope.declare(name, VarState::Implicit);
        }
    }

    /// Writes the `(...)` parameter signature only — no body, no braces.
    /// Plain `arg`/`optarg` first, then either `...rest` (when a rest
    /// param exists, regardless of keyword args — the rest+kw combination's
    /// object-popping happens in the prolog instead of the signature) or a
    /// destructured `{kw, kw2 = d} = {}` trailer when there is no rest.
    pub(crate) fn emit_param_list(&mut self, p: &ParsedParams) -> ConvertResult<()> {
        self.ser.text("(");
        let mut first = true;
        for param in &p.leading {
            if !first {
                self.ser.text(", ");
            }
            first = false;
            match param.kind() {
                Tag::Arg => {
                    let name = self.name_of(param, 0);
                    self.ser.text(name.to_string());
                }
                Tag::Optarg => {
                    let name = self.name_of(param, 0);
                    self.ser.text(format!("{name} = "));
                    if let Some(def) = param.child_node(1) {
                        self.emit(def, Ctx::Expression)?;
                    }
                }
                _ => {}
            }
        }

        if let Some(rest) = &p.rest {
            if !first {
                self.ser.text(", ");
            }
            first = false;
            let name = rest.child(0).and_then(Value::as_str).unwrap_or("args");
            self.ser.text(format!("...{name}"));
        } else if !p.kwargs.is_empty() || p.kwrest.is_some() {
            if !first {
                self.ser.text(", ");
            }
            first = false;
            self.ser.text("{");
            let mut kfirst = true;
            for kw in &p.kwargs {
                if !kfirst {
                    self.ser.text(", ");
                }
                kfirst = false;
                let name = self.name_of(kw, 0);
                if kw.kind() == Tag::Kwoptarg {
                    self.ser.text(format!("{name} = "));
                    if let Some(def) = kw.child_node(1) {
                        self.emit(def, Ctx::Expression)?;
                    }
                } else {
                    self.ser.text(name.to_string());
                }
            }
            if let Some(kr) = &p.kwrest {
                if !kfirst {
                    self.ser.text(", ");
                }
                let name = kr.child(0).and_then(Value::as_str).unwrap_or("kwrest");
                self.ser.text(format!("...{name}"));
            }
            self.ser.text("} = {}");
        }

        if !p.has_rest_and_kw() {
            if let Some(block) = &p.block {
                if !first {
                    self.ser.text(", ");
                }
                let name = block.child(0).and_then(Value::as_str).unwrap_or("block");
                self.ser.text(name.to_string());
            }
        }
        self.ser.text(")");
        Ok(())
    }

    /// spec.md §4.4 "Keyword-argument handling", implemented literally per
    /// the worked example (spec.md §8 scenario 6): pop the trailing plain
    /// object off the rest array if present, then bind each keyword param
    /// from it (`??` supplies `kwoptarg` defaults). A trailing `blockarg`
    /// pops next.
    pub(crate) fn emit_kwarg_prolog(&mut self, p: &ParsedParams) -> ConvertResult<()> {
        if !p.has_rest_and_kw() {
            return Ok(());
        }
        let rest_name = p.rest.as_ref().unwrap().child(0).and_then(Value::as_str).unwrap_or("args").to_string();
        self.ser.text(format!(
            "let $kwargs = ({rest_name}.length && typeof {rest_name}[{rest_name}.length - 1] === \"object\" && \
             {rest_name}[{rest_name}.length - 1] !== null && {rest_name}[{rest_name}.length - 1].constructor === Object) \
             ? {rest_name}.pop() : {{}};"
        ));
        for kw in &p.kwargs {
            self.ser.newline();
            let name = self.name_of(kw, 0);
            self.ser.text(format!("let {name} = $kwargs.{name}"));
            if kw.kind() == Tag::Kwoptarg {
                self.ser.text(" ?? ");
                if let Some(def) = kw.child_node(1) {
                    self.emit(def, Ctx::Expression)?;
                }
            }
            self.ser.text(";");
        }
        if let Some(kr) = &p.kwrest {
            self.ser.newline();
            let name = kr.child(0).and_then(Value::as_str).unwrap_or("kwrest");
            self.ser.text(format!("let {name} = {{...$kwargs}};"));
        }
        if let Some(block) = &p.block {
            self.ser.newline();
            let name = block.child(0).and_then(Value::as_str).unwrap_or("block");
            self.ser.text(format!("let {name} = {rest_name}.pop();"));
        }
        self.ser.newline();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{self, Value};
    use crate::comments::CommentMap;
    use crate::options::ConvertOptions;

    fn run(node: &Node) -> String {
        let opts = ConvertOptions::default();
        let comments = CommentMap::new();
        let conv = Converter::new(&opts, &comments, "");
        conv.run(node).unwrap().0
    }

    #[test]
    fn autoreturn_threads_through_if_tail() {
        let body = ast::s(
            Tag::If,
            vec![
                Value::Node(ast::lvar("x")),
                Value::Node(ast::int_lit(1)),
                Value::Node(ast::int_lit(2)),
            ],
        );
        let threaded = autoreturn_thread(&body);
        assert_eq!(threaded.kind(), Tag::If);
        let then_ = threaded.child_node(1).unwrap();
        assert_eq!(then_.kind(), Tag::Return);
    }

    #[test]
    fn endless_def_emits_function_with_return() {
        let params = vec![ast::s(Tag::Arg, vec![Value::Str(IStr::from("x"))])];
        let body = ast::s(
            Tag::Send,
            vec![Value::Node(ast::lvar("x")), Value::Str(IStr::from("*")), Value::Node(ast::lvar("x"))],
        );
        let def = ast::s_loc(
            Tag::Def,
            vec![Value::Str(IStr::from("sq")), Value::List(params), Value::Node(body)],
            Location::def(crate::span::TextRange::new(0.into(), 1.into()), crate::span::TextRange::new(0.into(), 1.into()), true),
        );
        let node = ast::begin(vec![def]);
        let out = run(&node);
        assert!(out.contains("function sq(x)"), "{out}");
        assert!(out.contains("return"), "{out}");
    }

    #[test]
    fn kwarg_prolog_uses_nullish_default() {
        let params = vec![
            ast::s(Tag::Restarg, vec![Value::Str(IStr::from("args"))]),
            ast::s(Tag::Kwarg, vec![Value::Str(IStr::from("x"))]),
            ast::s(
                Tag::Kwoptarg,
                vec![Value::Str(IStr::from("y")), Value::Node(ast::int_lit(2))],
            ),
        ];
        let def = ast::s(Tag::Def, vec![Value::Str(IStr::from("f")), Value::List(params), Value::Node(ast::nil())]);
        let node = ast::begin(vec![def]);
        let out = run(&node);
        assert!(out.contains("let x = $kwargs.x;"), "{out}");
        assert!(out.contains("let y = $kwargs.y ?? 2;"), "{out}");
    }
}
