//! Control-flow lowering (spec.md §4.4 "Control flow"): `if`/`case`,
//! `while`/`until`, `for`, and `begin/rescue/ensure` → `try/catch/finally`,
//! including the `redo$` sentinel and the `retry`-as-enclosing-loop
//! rewrite.

use super::methods::autoreturn_thread;
use super::precedence::Prec;
use super::scope::VarState;
use super::{Converter, Ctx};
use crate::ast::{Node, Tag, Value};
use crate::error::ConvertResult;
use crate::interner::IStr;

/// Per-loop bookkeeping pushed while converting a `while`/`until` body.
/// `uses_redo_sentinel` records whether this loop's body needed the
/// `redo$` wrapper, purely for the child `redo` node to confirm against.
pub(crate) struct LoopCtx {
    pub(crate) uses_redo_sentinel: bool,
}

impl<'a> Converter<'a> {
    pub(crate) fn emit_if(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        let pred = node.child_node(0).unwrap().clone();
        let then = node.child(1).and_then(Value::as_node).cloned();
        let else_ = node.child(2).and_then(Value::as_node).cloned();

        if ctx.is_statement() {
            self.ser.text("if (");
            self.emit(&pred, Ctx::Expression)?;
            self.ser.text(") {");
            self.ser.indent();
            self.ser.newline();
            self.scopes.current().enter_block();
            if let Some(t) = &then {
                self.emit_statements_block(t)?;
                self.ser.text(";");
            }
            self.scopes.current().leave_block();
            self.ser.dedent();
            self.ser.newline();
            self.ser.text("}");
            if let Some(e) = &else_ {
                self.ser.text(" else {");
                self.ser.indent();
                self.ser.newline();
                self.scopes.current().enter_block();
                self.emit_statements_block(e)?;
                self.ser.text(";");
                self.scopes.current().leave_block();
                self.ser.dedent();
                self.ser.newline();
                self.ser.text("}");
            }
            Ok(())
        } else {
            match (&then, &else_) {
                (Some(t), None) => {
                    self.emit_grouped(&pred, Prec::LogicalAnd)?;
                    self.ser.text(" && ");
                    self.emit_grouped(t, Prec::LogicalAnd)
                }
                (None, Some(e)) => {
                    self.ser.text("!");
                    self.emit_grouped(&pred, Prec::Unary)?;
                    self.ser.text(" && ");
                    self.emit_grouped(e, Prec::LogicalAnd)
                }
                (None, None) => {
                    self.ser.text("null");
                    Ok(())
                }
                (Some(t), Some(e)) => {
                    self.emit_grouped(&pred, Prec::Conditional)?;
                    self.ser.text(" ? ");
                    self.emit(t, Ctx::Expression)?;
                    self.ser.text(" : ");
                    self.emit(e, Ctx::Expression)
                }
            }
        }
    }

    pub(crate) fn emit_case(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        if ctx.is_statement() {
            self.emit_case_switch(node, false)
        } else {
            self.ser.text("(function () {");
            self.ser.indent();
            self.ser.newline();
            self.emit_case_switch(node, true)?;
            self.ser.dedent();
            self.ser.newline();
            self.ser.text("})()");
            Ok(())
        }
    }

    fn emit_case_switch(&mut self, node: &Node, autoreturn: bool) -> ConvertResult<()> {
        let children = node.children();
        let pred = children[0].as_node().cloned();
        let whens: Vec<Node> = children[1..children.len() - 1].iter().filter_map(Value::as_node).cloned().collect();
        let else_ = children.last().unwrap().as_node().cloned();

        let has_range_arm = whens.iter().any(|w| {
            let conds = w.child(0).and_then(Value::as_list).unwrap_or(&[]);
            conds.iter().any(|c| matches!(c.kind(), Tag::Irange | Tag::Erange))
        });
        let switch_on_true = has_range_arm || pred.is_none();

        if switch_on_true {
            self.ser.text("switch (true) {");
        } else {
            self.ser.text("switch (");
            self.emit(pred.as_ref().unwrap(), Ctx::Expression)?;
            self.ser.text(") {");
        }
        self.ser.indent();

        for w in &whens {
            let conds = w.child(0).and_then(Value::as_list).unwrap_or(&[]).to_vec();
            let body = w.child(1).and_then(Value::as_node).cloned();
            for c in &conds {
                self.ser.newline();
                self.ser.text("case ");
                if switch_on_true {
                    self.emit_case_range_predicate(pred.as_ref(), c)?;
                } else {
                    self.emit(c, Ctx::Expression)?;
                }
                self.ser.text(":");
            }
            self.ser.indent();
            let body = if autoreturn { body.as_ref().map(autoreturn_thread) } else { body };
            let ends_in_return = body.as_ref().map(statement_list_last_is_return).unwrap_or(false);
            if let Some(b) = &body {
                self.ser.newline();
                self.emit_statements_block(b)?;
                self.ser.text(";");
            }
            if !ends_in_return {
                self.ser.newline();
                self.ser.text("break;");
            }
            self.ser.dedent();
        }

        self.ser.newline();
        self.ser.text("default:");
        self.ser.indent();
        let else_ = if autoreturn { else_.as_ref().map(autoreturn_thread) } else { else_ };
        if let Some(e) = &else_ {
            self.ser.newline();
            self.emit(e, Ctx::Statement)?;
            self.ser.text(";");
        }
        self.ser.dedent();
        self.ser.newline();

        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    /// Renders one `when` arm's condition as a `switch (true)` predicate:
    /// `n >= lo && n <= hi` for a range arm, plain equality otherwise.
    fn emit_case_range_predicate(&mut self, pred: Option<&Node>, cond: &Node) -> ConvertResult<()> {
        let Some(pred) = pred else {
            self.emit(cond, Ctx::Expression)?;
            return Ok(());
        };
        match cond.kind() {
            Tag::Irange | Tag::Erange => {
                let inclusive = cond.kind() == Tag::Irange;
                let lo = cond.child(0).and_then(Value::as_node);
                let hi = cond.child(1).and_then(Value::as_node);
                if let Some(lo) = lo {
                    self.emit(pred, Ctx::Expression)?;
                    self.ser.text(" >= ");
                    self.emit(lo, Ctx::Expression)?;
                    if hi.is_some() {
                        self.ser.text(" && ");
                    }
                }
                if let Some(hi) = hi {
                    self.emit(pred, Ctx::Expression)?;
                    self.ser.text(format!(" {} ", if inclusive { "<=" } else { "<" }));
                    self.emit(hi, Ctx::Expression)?;
                }
                Ok(())
            }
            _ => {
                self.emit(pred, Ctx::Expression)?;
                self.ser.text(" === ");
                self.emit(cond, Ctx::Expression)
            }
        }
    }

    pub(crate) fn emit_while_loop(&mut self, node: &Node, is_until: bool, post: bool) -> ConvertResult<()> {
        let pred = node.child_node(0).unwrap().clone();
        let body = node.child_node(1).unwrap().clone();

        if post {
            self.ser.text("do {");
        } else {
            self.ser.text("while (");
            self.emit_loop_condition(&pred, is_until)?;
            self.ser.text(") {");
        }

        self.emit_loop_body(&body)?;

        if post {
            self.ser.text("} while (");
            self.emit_loop_condition(&pred, is_until)?;
            self.ser.text(");");
        } else {
            self.ser.text("}");
        }
        Ok(())
    }

    /// Emits the `{ ... }` interior shared by every loop kind, wrapping the
    /// body in the `redo$` sentinel's inner `do { ... } while (redo$)` when
    /// it contains a `redo`. `continue` inside that inner loop restarts it
    /// without touching whatever the *outer* loop does on a normal
    /// iteration (decrementing a counter, advancing an iterator, rechecking
    /// a `while` predicate) — so this is correct for `while`/`until` and for
    /// `for`/`for_of` alike, not just the post-test forms `emit_while_loop`
    /// was originally written for.
    fn emit_loop_body(&mut self, body: &Node) -> ConvertResult<()> {
        let has_redo = contains_redo_shallow(body);
        self.loop_stack.push(LoopCtx { uses_redo_sentinel: has_redo });
        self.ser.indent();
        self.scopes.current().enter_block();

        if has_redo {
            self.ser.newline();
            self.ser.text("let redo$;");
            self.ser.newline();
            self.ser.text("do {");
            self.ser.indent();
            self.ser.newline();
            self.ser.text("redo$ = false;");
            self.ser.newline();
            self.emit_statements_block(body)?;
            self.ser.text(";");
            self.ser.dedent();
            self.ser.newline();
            self.ser.text("} while (redo$);");
        } else {
            self.ser.newline();
            self.emit_statements_block(body)?;
            self.ser.text(";");
        }

        self.scopes.current().leave_block();
        self.ser.dedent();
        self.ser.newline();
        self.loop_stack.pop();
        Ok(())
    }

    fn emit_loop_condition(&mut self, pred: &Node, is_until: bool) -> ConvertResult<()> {
        if is_until {
            self.ser.text("!(");
            self.emit(pred, Ctx::Expression)?;
            self.ser.text(")");
            Ok(())
        } else {
            self.emit(pred, Ctx::Expression)
        }
    }

    pub(crate) fn emit_for(&mut self, node: &Node) -> ConvertResult<()> {
        let index = node.child_node(0).unwrap().clone();
        let collection = node.child_node(1).unwrap().clone();
        let body = node.child_node(2).unwrap().clone();
        let idx_name: IStr = index.child(0).and_then(Value::as_str).map(IStr::from).unwrap_or_else(|| IStr::from("$i"));

        self.scopes.current().declare(idx_name.clone(), VarState::Declared);

        match step_send(&collection) {
            Some((range, step)) => self.emit_for_counted(&idx_name, range, step)?,
            None if matches!(collection.kind(), Tag::Irange | Tag::Erange) => {
                self.emit_for_counted(&idx_name, &collection, None)?
            }
            None => {
                self.ser.text(format!("for (const {idx_name} of "));
                self.emit(&collection, Ctx::Expression)?;
                self.ser.text(") {");
            }
        }

        self.emit_loop_body(&body)?;
        self.ser.text("}");
        Ok(())
    }

    fn emit_for_counted(&mut self, idx_name: &str, range: &Node, step: Option<&Node>) -> ConvertResult<()> {
        let inclusive = range.kind() == Tag::Irange;
        let lo = range.child(0).and_then(Value::as_node);
        let hi = range.child(1).and_then(Value::as_node);
        let step_literal = step.and_then(|s| if s.kind() == Tag::Int { s.child(0).and_then(Value::as_int) } else { None });
        let descending = step_literal.map(|v| v < 0).unwrap_or(false);

        self.ser.text(format!("for (let {idx_name} = "));
        match lo {
            Some(n) => self.emit(n, Ctx::Expression)?,
            None => self.ser.text("0"),
        }
        let cmp = if descending {
            if inclusive { ">=" } else { ">" }
        } else if inclusive {
            "<="
        } else {
            "<"
        };
        self.ser.text(format!("; {idx_name} {cmp} "));
        match hi {
            Some(n) => self.emit(n, Ctx::Expression)?,
            None => self.ser.text("Infinity"),
        }
        match step {
            Some(s) if step_literal == Some(1) => {
                let _ = s;
                self.ser.text(format!("; {idx_name}++) {{"));
            }
            Some(s) => {
                self.ser.text(format!("; {idx_name} += "));
                self.emit(s, Ctx::Expression)?;
                self.ser.text(") {");
            }
            None => self.ser.text(format!("; {idx_name}++) {{")),
        }
        Ok(())
    }

    pub(crate) fn emit_kwbegin(&mut self, node: &Node) -> ConvertResult<()> {
        let inner = node.child_node(0).unwrap().clone();
        self.emit_try_construct(&inner)
    }

    fn emit_try_construct(&mut self, inner: &Node) -> ConvertResult<()> {
        match inner.kind() {
            Tag::Ensure => {
                let body = inner.child_node(0).unwrap().clone();
                let ensure_body = inner.child_node(1).unwrap().clone();
                if body.kind() == Tag::Rescue {
                    self.emit_try_catch_finally(&body, Some(&ensure_body))
                } else {
                    self.ser.text("try {");
                    self.ser.indent();
                    self.ser.newline();
                    self.emit_statements_block(&body)?;
                    self.ser.text(";");
                    self.ser.dedent();
                    self.ser.newline();
                    self.ser.text("} finally {");
                    self.ser.indent();
                    self.ser.newline();
                    self.emit_statements_block(&ensure_body)?;
                    self.ser.text(";");
                    self.ser.dedent();
                    self.ser.newline();
                    self.ser.text("}");
                    Ok(())
                }
            }
            Tag::Rescue => self.emit_try_catch_finally(inner, None),
            _ => self.emit_statements_block(inner),
        }
    }

    fn emit_try_catch_finally(&mut self, rescue: &Node, ensure_body: Option<&Node>) -> ConvertResult<()> {
        let children = rescue.children();
        let body = children[0].as_node().unwrap().clone();
        let else_ = children.last().unwrap().as_node().cloned();
        let resbodies: Vec<Node> = children[1..children.len() - 1].iter().filter_map(Value::as_node).cloned().collect();
        let has_retry = resbodies.iter().any(contains_retry_shallow);

        if has_retry {
            self.ser.text("for (;;) {");
            self.ser.indent();
            self.ser.newline();
        }

        self.ser.text("try {");
        self.ser.indent();
        self.ser.newline();
        self.emit_statements_block(&body)?;
        self.ser.text(";");
        if let Some(e) = &else_ {
            self.ser.newline();
            self.emit_statements_block(e)?;
            self.ser.text(";");
        }
        if has_retry {
            self.ser.newline();
            self.ser.text("break;");
        }
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("} catch ($e) {");
        self.ser.indent();
        self.ser.newline();
        self.emit_resbody_chain(&resbodies, 0)?;
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");

        if let Some(eb) = ensure_body {
            self.ser.text(" finally {");
            self.ser.indent();
            self.ser.newline();
            self.emit_statements_block(eb)?;
            self.ser.text(";");
            self.ser.dedent();
            self.ser.newline();
            self.ser.text("}");
        }

        if has_retry {
            self.ser.dedent();
            self.ser.newline();
            self.ser.text("}");
        }
        Ok(())
    }

    fn emit_resbody_chain(&mut self, resbodies: &[Node], idx: usize) -> ConvertResult<()> {
        if idx >= resbodies.len() {
            self.ser.text("throw $e;");
            return Ok(());
        }
        let r = &resbodies[idx];
        let exceptions = r.child(0).and_then(Value::as_list).unwrap_or(&[]).to_vec();
        let reference = r.child(1).and_then(Value::as_node).cloned();
        let body = r.child_node(2).unwrap().clone();

        // A single catch-all rescue with no exception classes compiles to
        // a bare `catch {}` — the terminal branch, no `if` guard needed.
        if exceptions.is_empty() {
            if let Some(reference_node) = &reference {
                let name = reference_node.child(0).and_then(Value::as_str).unwrap_or("e");
                self.ser.text(format!("const {name} = $e;"));
                self.ser.newline();
            }
            self.emit_statements_block(&body)?;
            self.ser.text(";");
            return Ok(());
        }

        self.ser.text("if (");
        for (i, exc) in exceptions.iter().enumerate() {
            if i > 0 {
                self.ser.text(" || ");
            }
            self.emit_exception_test(exc)?;
        }
        self.ser.text(") {");
        self.ser.indent();
        self.ser.newline();
        if let Some(reference_node) = &reference {
            let name = reference_node.child(0).and_then(Value::as_str).unwrap_or("e");
            self.ser.text(format!("const {name} = $e;"));
            self.ser.newline();
        }
        self.emit_statements_block(&body)?;
        self.ser.text(";");
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("} else {");
        self.ser.indent();
        self.ser.newline();
        self.emit_resbody_chain(resbodies, idx + 1)?;
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    fn emit_exception_test(&mut self, exc: &Node) -> ConvertResult<()> {
        let is_bare_string = exc.kind() == Tag::Const
            && matches!(exc.child(0), Some(Value::Absent))
            && exc.child(1).and_then(Value::as_str) == Some("String");
        if is_bare_string {
            self.ser.text("typeof $e === \"string\"");
            Ok(())
        } else {
            self.ser.text("$e instanceof ");
            self.emit(exc, Ctx::Expression)
        }
    }
}

/// Detects the `send(<range>, "step", n)` shape spec.md §4.4 calls out for
/// counted `for` loops.
fn step_send(node: &Node) -> Option<(&Node, Option<&Node>)> {
    if node.kind() != Tag::Send {
        return None;
    }
    let recv = node.child(0).and_then(Value::as_node)?;
    if !matches!(recv.kind(), Tag::Irange | Tag::Erange) {
        return None;
    }
    if node.child(1).and_then(Value::as_str) != Some("step") {
        return None;
    }
    let step_arg = node.children().get(2).and_then(Value::as_node);
    Some((recv, step_arg))
}

fn contains_redo_shallow(node: &Node) -> bool {
    match node.kind() {
        Tag::Redo => true,
        Tag::While | Tag::Until | Tag::WhilePost | Tag::UntilPost | Tag::For | Tag::ForOf | Tag::Def | Tag::Defs
        | Tag::Defm | Tag::Deff | Tag::Defp | Tag::Async | Tag::Asyncs | Tag::Block | Tag::Numblock => false,
        _ => node.children().iter().any(|c| match c {
            Value::Node(n) => contains_redo_shallow(n),
            Value::List(l) => l.iter().any(contains_redo_shallow),
            _ => false,
        }),
    }
}

fn contains_retry_shallow(node: &Node) -> bool {
    match node.kind() {
        Tag::Retry => true,
        Tag::Def | Tag::Defs | Tag::Defm | Tag::Deff | Tag::Defp | Tag::Async | Tag::Asyncs | Tag::Block | Tag::Numblock => false,
        _ => node.children().iter().any(|c| match c {
            Value::Node(n) => contains_retry_shallow(n),
            Value::List(l) => l.iter().any(contains_retry_shallow),
            _ => false,
        }),
    }
}

fn statement_list_last_is_return(node: &Node) -> bool {
    let last = if node.kind() == Tag::Begin {
        node.child(0).and_then(Value::as_list).and_then(|l| l.last()).cloned()
    } else {
        Some(node.clone())
    };
    last.map(|n| n.kind() == Tag::Return).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast;
    use crate::comments::CommentMap;
    use crate::options::ConvertOptions;

    fn run(node: &Node) -> String {
        let opts = ConvertOptions::default();
        let comments = CommentMap::new();
        let conv = Converter::new(&opts, &comments, "");
        conv.run(node).unwrap().0
    }

    /// `y = if cond then 5 else 10 end`. The lowering visitor wraps every
    /// `Statements` body in `begin` even for a single statement, so this
    /// reproduces the shape `emit_if` actually receives, not an idealized
    /// bare-expression one.
    #[test]
    fn if_expression_single_statement_branches_emit_bare_ternary() {
        let cond = ast::lvar("cond");
        let then = ast::begin(vec![ast::int_lit(5)]);
        let else_ = ast::begin(vec![ast::int_lit(10)]);
        let if_node = ast::s(Tag::If, vec![Value::Node(cond), Value::Node(then), Value::Node(else_)]);
        let out = run(&ast::begin(vec![ast::lvasgn("y", Some(if_node))]));
        assert!(out.contains("cond ? 5 : 10"), "{out}");
        assert!(!out.contains(';'), "no statement-shaped semicolons inside an expression: {out}");
    }

    /// Same shape, but the `then` branch has more than one statement — not
    /// representable as a single ternary operand, so it must be lifted into
    /// an IIFE the way `emit_case` already does for `case` in expression
    /// position.
    #[test]
    fn if_expression_multi_statement_branch_uses_iife() {
        let cond = ast::lvar("cond");
        let log_call = ast::send(None, "log", vec![ast::str_lit("hi")]);
        let then = ast::begin(vec![log_call, ast::int_lit(5)]);
        let else_ = ast::int_lit(10);
        let if_node = ast::s(Tag::If, vec![Value::Node(cond), Value::Node(then), Value::Node(else_)]);
        let out = run(&ast::begin(vec![ast::lvasgn("y", Some(if_node))]));
        assert!(out.contains("(function () {"), "{out}");
        assert!(out.contains("return 5;"), "{out}");
        assert!(out.contains("})() : 10"), "{out}");
    }

    #[test]
    fn if_statement_emits_if_else_blocks() {
        let cond = ast::lvar("cond");
        let then = ast::begin(vec![ast::send(None, "a", vec![])]);
        let else_ = ast::begin(vec![ast::send(None, "b", vec![])]);
        let if_node = ast::s(Tag::If, vec![Value::Node(cond), Value::Node(then), Value::Node(else_)]);
        let out = run(&ast::begin(vec![if_node]));
        assert!(out.contains("if (cond) {"), "{out}");
        assert!(out.contains("} else {"), "{out}");
    }

    #[test]
    fn case_in_expression_position_wraps_in_iife_with_autoreturn() {
        let pred = ast::lvar("n");
        let when = ast::s(
            Tag::When,
            vec![Value::List(vec![ast::int_lit(1)]), Value::from(Some(ast::str_lit("one")))],
        );
        let case_node = ast::s(Tag::Case, vec![Value::from(Some(pred)), Value::Node(when), Value::Absent]);
        let out = run(&ast::begin(vec![ast::lvasgn("label", Some(case_node))]));
        assert!(out.contains("(function () {"), "{out}");
        assert!(out.contains("switch (n) {"), "{out}");
        assert!(out.contains("return \"one\";"), "{out}");
    }

    #[test]
    fn while_loop_with_redo_declares_sentinel() {
        let cond = ast::lvar("cond");
        let body = ast::begin(vec![ast::s(Tag::Redo, vec![])]);
        let while_node = ast::s(Tag::While, vec![Value::Node(cond), Value::Node(body)]);
        let out = run(&ast::begin(vec![while_node]));
        assert!(out.contains("let redo$;"), "{out}");
        assert!(out.contains("{ redo$ = true; continue; }"), "{out}");
        assert!(out.contains("} while (redo$);"), "{out}");
    }

    /// Same `redo` sentinel, but inside a `for`/`for_of` loop rather than a
    /// `while` — `emit_for` must wrap its body the same way `emit_while_loop`
    /// does, since a bare `continue` here would drive the `for`'s own
    /// increment/iterator instead of only restarting the current iteration.
    #[test]
    fn for_loop_with_redo_declares_sentinel_not_bare_continue() {
        let index = ast::lvasgn("i", None);
        let collection = ast::array(vec![ast::int_lit(1), ast::int_lit(2)]);
        let body = ast::begin(vec![ast::s(Tag::Redo, vec![])]);
        let for_node = ast::s(Tag::For, vec![Value::Node(index), Value::Node(collection), Value::Node(body)]);
        let out = run(&ast::begin(vec![for_node]));
        assert!(out.contains("for (const i of"), "{out}");
        assert!(out.contains("let redo$;"), "{out}");
        assert!(out.contains("} while (redo$);"), "{out}");
        assert!(out.contains("{ redo$ = true; continue; }"), "{out}");
    }

    #[test]
    fn exclusive_range_for_counts_up() {
        let index = ast::lvasgn("i", None);
        let range = ast::s(Tag::Erange, vec![Value::from(Some(ast::int_lit(0))), Value::from(Some(ast::int_lit(3)))]);
        let body = ast::begin(vec![ast::send(None, "p", vec![ast::lvar("i")])]);
        let for_node = ast::s(Tag::For, vec![Value::Node(index), Value::Node(range), Value::Node(body)]);
        let out = run(&ast::begin(vec![for_node]));
        assert!(out.contains("for (let i = 0; i < 3; i++) {"), "{out}");
    }

    #[test]
    fn retry_wraps_rescue_in_for_loop_with_break() {
        let body = ast::begin(vec![ast::send(None, "risky", vec![])]);
        let resbody = ast::s(
            Tag::Resbody,
            vec![Value::List(vec![]), Value::Absent, Value::Node(ast::begin(vec![ast::s(Tag::Retry, vec![])]))],
        );
        let rescue = ast::s(Tag::Rescue, vec![Value::Node(body), Value::Node(resbody), Value::Absent]);
        let kwbegin = ast::s(Tag::Kwbegin, vec![Value::Node(rescue)]);
        let out = run(&ast::begin(vec![kwbegin]));
        assert!(out.contains("for (;;) {"), "{out}");
        assert!(out.contains("break;"), "{out}");
        assert!(out.contains("} catch ($e) {"), "{out}");
    }
}
