//! Message-send and block lowering (spec.md §4.4 "on_send", "Method
//! lowering"). `send`/`csend`/`attr`/`call`/`await`/`sendw` all alias to
//! [`Converter::emit_send`] (spec.md §9's alias resolution); `block`/
//! `numblock` alias to [`Converter::emit_block`].

use super::methods::ParsedParams;
use super::precedence::Prec;
use super::scope::VarState;
use super::{is_plain_identifier, Converter, Ctx};
use crate::ast::{self, Node, Tag, Value};
use crate::error::ConvertResult;
use crate::interner::IStr;
use crate::options::ComparisonStyle;

/// Ruby operator methods with a direct one-to-one JS token. `<=>`, `=~`/
/// `!~`, `[]`/`[]=`, `===`, and the `<<`-chain/`new`/`raise` families get
/// their own dedicated emission in [`Converter::emit_send`] instead.
const BINARY_OPERATORS: &[&str] =
    &["+", "-", "*", "/", "%", "**", "==", "!=", "<", "<=", ">", ">=", "<<", ">>", "&", "|", "^"];
const UNARY_OPERATORS: &[(&str, &str)] = &[("-@", "unary-"), ("+@", "unary+"), ("!", "!"), ("~", "~")];

pub(crate) fn is_operator_name(name: &str) -> bool {
    BINARY_OPERATORS.contains(&name) || UNARY_OPERATORS.iter().any(|(rb, _)| *rb == name)
}

pub(crate) fn js_operator_for(name: &str) -> String {
    UNARY_OPERATORS
        .iter()
        .find(|(rb, _)| *rb == name)
        .map(|(_, js)| (*js).to_string())
        .unwrap_or_else(|| name.to_string())
}

fn is_unary_operator_name(name: &str) -> bool {
    UNARY_OPERATORS.iter().any(|(rb, _)| *rb == name)
}

/// `foo=` setter methods, excluding the comparison operators that happen to
/// end in `=`.
fn is_setter_name(name: &str) -> bool {
    name.len() > 1 && name.ends_with('=') && !matches!(name, "==" | "!=" | "<=" | ">=" | "===")
}

fn symbol_or_plain_str(node: &Node) -> Option<String> {
    match node.kind() {
        Tag::Sym | Tag::Str => node.child(0).and_then(Value::as_str).map(|s| s.to_string()),
        _ => None,
    }
}

impl<'a> Converter<'a> {
    pub(crate) fn emit_send(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        let recv = node.child(0).and_then(Value::as_node).cloned();
        let name = self.name_of(node, 1);
        let raw_args: Vec<Node> = node.children()[2..].iter().filter_map(Value::as_node).cloned().collect();
        let block_pass = raw_args.iter().find(|a| a.kind() == Tag::BlockPass).cloned();
        let positional: Vec<Node> = raw_args.into_iter().filter(|a| a.kind() != Tag::BlockPass).collect();

        match name.as_ref() {
            "[]" if recv.is_some() => return self.emit_index_get(recv.as_ref().unwrap(), &positional),
            "[]=" if recv.is_some() && positional.len() >= 2 => {
                return self.emit_index_set(recv.as_ref().unwrap(), &positional[0], &positional[1]);
            }
            "new" => return self.emit_new(recv.as_ref(), &positional),
            "raise" | "fail" if recv.is_none() => return self.emit_raise(&positional),
            "is_a?" | "kind_of?" if recv.is_some() && positional.len() == 1 => {
                return self.emit_is_a(recv.as_ref().unwrap(), &positional[0]);
            }
            "instance_of?" if recv.is_some() && positional.len() == 1 => {
                return self.emit_instance_of(recv.as_ref().unwrap(), &positional[0]);
            }
            "=~" if recv.is_some() && positional.len() == 1 => {
                return self.emit_regex_test(recv.as_ref().unwrap(), &positional[0], false);
            }
            "!~" if recv.is_some() && positional.len() == 1 => {
                return self.emit_regex_test(recv.as_ref().unwrap(), &positional[0], true);
            }
            "<=>" if recv.is_some() && positional.len() == 1 => {
                return self.emit_spaceship(recv.as_ref().unwrap(), &positional[0]);
            }
            "<<" if recv.is_some() && positional.len() == 1 && ctx.is_statement() => {
                if self.try_collapse_push_chain(node)? {
                    return Ok(());
                }
            }
            _ => {}
        }

        if is_setter_name(&name) && recv.is_some() && positional.len() == 1 {
            return self.emit_setter_call(recv.as_ref().unwrap(), &name, &positional[0]);
        }

        if let Some(r) = &recv {
            if is_operator_name(&name) {
                if positional.len() == 1 && !is_unary_operator_name(&name) {
                    return self.emit_binary_operator(r, &name, &positional[0]);
                }
                if positional.is_empty() && is_unary_operator_name(&name) {
                    return self.emit_unary_operator(r, &name);
                }
            }
        }

        self.emit_generic_call(recv.as_ref(), &name, &positional, block_pass.as_ref())
    }

    fn emit_index_get(&mut self, recv: &Node, args: &[Node]) -> ConvertResult<()> {
        if args.len() == 1 {
            let key = &args[0];
            if let Some(name) = symbol_or_plain_str(key) {
                if is_plain_identifier(&name) {
                    self.emit_grouped(recv, Prec::Postfix)?;
                    self.ser.text(format!(".{name}"));
                    return Ok(());
                }
            }
            if matches!(key.kind(), Tag::Irange | Tag::Erange) {
                self.emit_grouped(recv, Prec::Postfix)?;
                self.ser.text(".slice(");
                match key.child_node(0) {
                    Some(lo) => self.emit(lo, Ctx::Expression)?,
                    None => self.ser.text("0"),
                }
                if let Some(hi) = key.child_node(1) {
                    self.ser.text(", ");
                    if key.kind() == Tag::Irange {
                        self.ser.text("(");
                        self.emit(hi, Ctx::Expression)?;
                        self.ser.text(") + 1");
                    } else {
                        self.emit(hi, Ctx::Expression)?;
                    }
                }
                self.ser.text(")");
                return Ok(());
            }
        }
        self.emit_grouped(recv, Prec::Postfix)?;
        self.ser.text("[");
        if let Some(key) = args.first() {
            self.emit(key, Ctx::Expression)?;
        }
        self.ser.text("]");
        Ok(())
    }

    fn emit_index_set(&mut self, recv: &Node, key: &Node, value: &Node) -> ConvertResult<()> {
        if let Some(name) = symbol_or_plain_str(key) {
            if is_plain_identifier(&name) {
                self.emit_grouped(recv, Prec::Postfix)?;
                self.ser.text(format!(".{name} = "));
                return self.emit(value, Ctx::Expression);
            }
        }
        self.emit_grouped(recv, Prec::Postfix)?;
        self.ser.text("[");
        self.emit(key, Ctx::Expression)?;
        self.ser.text("] = ");
        self.emit(value, Ctx::Expression)
    }

    /// `Foo.new(...)`, `Regexp.new(...)`, a bare `new(...)` inside a class
    /// body (`this.constructor`) — uniformly `new <recv>(...)`.
    fn emit_new(&mut self, recv: Option<&Node>, args: &[Node]) -> ConvertResult<()> {
        self.ser.text("new ");
        match recv {
            Some(r) => self.emit_grouped(r, Prec::Postfix)?,
            None => self.ser.text("this.constructor"),
        }
        self.ser.text("(");
        for (i, a) in args.iter().enumerate() {
            if i > 0 {
                self.ser.text(", ");
            }
            self.emit(a, Ctx::Expression)?;
        }
        self.ser.text(")");
        Ok(())
    }

    fn emit_raise(&mut self, args: &[Node]) -> ConvertResult<()> {
        self.ser.text("throw ");
        match args.first() {
            None => self.ser.text("new Error()"),
            Some(first) if first.kind() == Tag::Const => {
                self.ser.text("new ");
                self.emit(first, Ctx::Expression)?;
                self.ser.text("(");
                if let Some(msg) = args.get(1) {
                    self.emit(msg, Ctx::Expression)?;
                }
                self.ser.text(")");
            }
            Some(first) if matches!(first.kind(), Tag::Str | Tag::Dstr) => {
                self.ser.text("new Error(");
                self.emit(first, Ctx::Expression)?;
                self.ser.text(")");
            }
            // Anything else (a bare exception-value lvar, a re-raise of the
            // rescued `$e`) is passed through as-is.
            Some(first) => self.emit(first, Ctx::Expression)?,
        }
        Ok(())
    }

    fn emit_is_a(&mut self, recv: &Node, cls: &Node) -> ConvertResult<()> {
        self.emit_grouped(recv, Prec::Relational)?;
        self.ser.text(" instanceof ");
        self.emit_grouped(cls, Prec::Relational)
    }

    fn emit_instance_of(&mut self, recv: &Node, cls: &Node) -> ConvertResult<()> {
        self.emit_grouped(recv, Prec::Postfix)?;
        self.ser.text(".constructor === ");
        self.emit(cls, Ctx::Expression)
    }

    fn emit_regex_test(&mut self, recv: &Node, other: &Node, negate: bool) -> ConvertResult<()> {
        let (re, s) = if recv.kind() == Tag::Regexp { (recv, other) } else { (other, recv) };
        if negate {
            self.ser.text("!");
        }
        self.emit_grouped(re, Prec::Postfix)?;
        self.ser.text(".test(");
        self.emit(s, Ctx::Expression)?;
        self.ser.text(")");
        Ok(())
    }

    /// `a <=> b` has no single JS operator; expanded to the ternary chain,
    /// which re-evaluates `a`/`b` for non-trivial operands — acceptable
    /// since the original's operands are almost always plain locals.
    fn emit_spaceship(&mut self, recv: &Node, other: &Node) -> ConvertResult<()> {
        self.ser.text("(");
        self.emit_grouped(recv, Prec::Relational)?;
        self.ser.text(" < ");
        self.emit_grouped(other, Prec::Relational)?;
        self.ser.text(" ? -1 : ");
        self.emit_grouped(recv, Prec::Relational)?;
        self.ser.text(" > ");
        self.emit_grouped(other, Prec::Relational)?;
        self.ser.text(" ? 1 : 0)");
        Ok(())
    }

    fn emit_setter_call(&mut self, recv: &Node, name: &str, value: &Node) -> ConvertResult<()> {
        let prop = &name[..name.len() - 1];
        self.emit_grouped(recv, Prec::Postfix)?;
        if is_plain_identifier(prop) {
            self.ser.text(format!(".{prop} = "));
        } else {
            self.ser.text(format!("[{prop:?}] = "));
        }
        self.emit(value, Ctx::Expression)
    }

    /// Collapses `a << b << c` (statement context, 2+ nested `<<` sends)
    /// into `a.push(b, c)` — the common Array#push idiom. A lone `a << b`
    /// is left as a bit-shift: it's ambiguous between push and integer
    /// shift, and a chain of two or more is confidently array usage.
    fn try_collapse_push_chain(&mut self, node: &Node) -> ConvertResult<bool> {
        let mut operands = Vec::new();
        let mut cur = node.clone();
        loop {
            if cur.kind() != Tag::Send || self.name_of(&cur, 1).as_ref() != "<<" {
                break;
            }
            let Some(r) = cur.child_node(0).cloned() else { break };
            let Some(v) = cur.children().get(2).and_then(Value::as_node).cloned() else { break };
            operands.push(v);
            cur = r;
        }
        if operands.len() < 2 {
            return Ok(false);
        }
        operands.reverse();
        self.emit_grouped(&cur, Prec::Postfix)?;
        self.ser.text(".push(");
        for (i, o) in operands.iter().enumerate() {
            if i > 0 {
                self.ser.text(", ");
            }
            self.emit(o, Ctx::Expression)?;
        }
        self.ser.text(")");
        Ok(true)
    }

    fn emit_binary_operator(&mut self, recv: &Node, name: &str, other: &Node) -> ConvertResult<()> {
        let op = self.resolve_comparison_operator(name);
        let prec = Prec::of_operator(&op);
        self.emit_grouped(recv, prec)?;
        self.ser.text(format!(" {op} "));
        if op == "**" && self.expr_precedence(other) == Prec::Exponent {
            // `**` is right-associative; an equal-precedence right operand
            // still needs grouping so `a ** b ** c` doesn't reassociate.
            self.ser.text("(");
            self.emit(other, Ctx::Expression)?;
            self.ser.text(")");
            Ok(())
        } else {
            self.emit_grouped(other, prec)
        }
    }

    fn resolve_comparison_operator(&self, name: &str) -> String {
        match name {
            "==" if self.opts.comparison == ComparisonStyle::Identity => "===".to_string(),
            "!=" if self.opts.comparison == ComparisonStyle::Identity => "!==".to_string(),
            other => other.to_string(),
        }
    }

    fn emit_unary_operator(&mut self, recv: &Node, name: &str) -> ConvertResult<()> {
        self.ser.text(js_operator_for(name));
        self.emit_grouped(recv, Prec::Unary)
    }

    /// The generic fallback: `recv.name(args)`, `this.name(args)`/
    /// `self.name(args)` for an implicit-self call inside a class body
    /// (resolving to the private-method prefix if `name` was declared
    /// `private`), or a bare `name(args)` at the top level.
    fn emit_generic_call(&mut self, recv: Option<&Node>, name: &str, args: &[Node], block_pass: Option<&Node>) -> ConvertResult<()> {
        match recv {
            Some(r) => {
                self.emit_grouped(r, Prec::Postfix)?;
                self.ser.text(".");
                self.emit_method_name(name);
            }
            None if !self.rbstack.is_empty() => {
                let base = self.self_ref();
                let resolved = self.resolve_private_name(name);
                self.ser.text(format!("{base}."));
                self.emit_method_name(&resolved);
            }
            None => self.emit_method_name(name),
        }
        self.ser.text("(");
        let mut first = true;
        for a in args {
            if !first {
                self.ser.text(", ");
            }
            first = false;
            self.emit(a, Ctx::Expression)?;
        }
        if let Some(bp) = block_pass {
            if !first {
                self.ser.text(", ");
            }
            self.emit(bp, Ctx::Expression)?;
        }
        self.ser.text(")");
        Ok(())
    }

    /// Writes a method/property name, using computed-key syntax for names
    /// that aren't valid bare identifiers (operator overloads like `+` or
    /// `[]`), but leaving a leading `#` (private field/method) as a literal
    /// token since that's the only place JS allows it.
    pub(crate) fn emit_method_name(&mut self, name: &str) {
        if let Some(rest) = name.strip_prefix('#') {
            if is_plain_identifier(rest) {
                self.ser.text(format!("#{rest}"));
                return;
            }
        }
        if is_plain_identifier(name) {
            self.ser.text(name);
        } else {
            self.ser.text(format!("[{name:?}]"));
        }
    }

    /// Looks up whether `name` was declared `private`/`protected` on the
    /// class currently being emitted, returning the prefixed name if so.
    pub(crate) fn resolve_private_name(&self, name: &str) -> String {
        if let Some(frame) = self.rbstack.last() {
            if let Some(super::classes::MethodCap::Private(prefix)) = frame.methods.get(name) {
                return format!("{prefix}{name}");
            }
        }
        name.to_string()
    }

    /// `&method_name`/`&recv.method_name` used as a block argument: the one
    /// syntactically distinguishable case of "pass this method, don't call
    /// it" (a bare zero-arg send with an explicit receiver), so it's the
    /// only shape auto-bound to its receiver here; `&:sym` becomes the
    /// usual symbol-to-proc arrow. Anything else (an existing proc/lambda
    /// value, a local variable) is passed through unchanged — this
    /// deliberately does not attempt the general "any bare method reference
    /// auto-binds" rule, since the normalized AST doesn't distinguish a
    /// bare reference from a zero-arg call closely enough to do that safely.
    pub(crate) fn emit_block_pass(&mut self, node: &Node) -> ConvertResult<()> {
        let Some(inner) = node.child_node(0) else { return Ok(()) };
        match inner.kind() {
            Tag::Sym => {
                let name = inner.child(0).and_then(Value::as_str).unwrap_or("");
                self.ser.text("($x) => $x.");
                self.emit_method_name(name);
                self.ser.text("()");
                Ok(())
            }
            Tag::Send
                if self.autobind_enabled
                    && inner.children().len() == 2
                    && inner.child(0).and_then(Value::as_node).is_some() =>
            {
                let recv = inner.child_node(0).unwrap().clone();
                let name = self.name_of(inner, 1);
                self.emit_grouped(&recv, Prec::Postfix)?;
                self.ser.text(".");
                self.emit_method_name(&name);
                self.ser.text(".bind(");
                self.emit(&recv, Ctx::Expression)?;
                self.ser.text(")");
                Ok(())
            }
            _ => self.emit(inner, Ctx::Expression),
        }
    }

    pub(crate) fn emit_block(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        let call = node.child_node(0).unwrap().clone();
        let (params, body) = match node.kind() {
            Tag::Block => {
                let params = node.child(1).and_then(Value::as_list).unwrap_or(&[]).to_vec();
                let body = node.child_node(2).cloned().unwrap_or_else(ast::nil);
                (super::methods::parse_params(&params), body)
            }
            Tag::Numblock => {
                let max = node.child(1).and_then(Value::as_int).unwrap_or(1);
                let body = node.child_node(2).cloned().unwrap_or_else(ast::nil);
                let mut p = ParsedParams::default();
                for i in 1..=max {
                    p.leading.push(ast::s(Tag::Arg, vec![Value::Str(IStr::from(format!("_{i}")))]));
                }
                (p, body)
            }
            _ => unreachable!("emit_block only handles block/numblock tags"),
        };

        let call_name = self.name_of(&call, 1);
        let recv = call.child_node(0).cloned();
        let call_args: Vec<Node> = call.children().get(2..).map(|s| s.iter().filter_map(Value::as_node).cloned().collect()).unwrap_or_default();

        if recv.is_none() && matches!(call_name.as_ref(), "lambda" | "proc") {
            return self.emit_function_literal(&params, &body);
        }

        if ctx.is_statement() && call_name.as_ref() == "each" && call_args.is_empty() {
            if let Some(r) = &recv {
                if params.leading.len() == 1 && params.kwargs.is_empty() && params.rest.is_none() {
                    let idx_name = self.name_of(&params.leading[0], 0);
                    self.scopes.current().declare(idx_name.clone(), VarState::Declared);
                    self.ser.text(format!("for (const {idx_name} of "));
                    self.emit(r, Ctx::Expression)?;
                    self.ser.text(") {");
                    self.ser.indent();
                    self.ser.newline();
                    self.scopes.current().enter_block();
                    self.emit_statements_block(&body)?;
                    self.ser.text(";");
                    self.scopes.current().leave_block();
                    self.ser.dedent();
                    self.ser.newline();
                    self.ser.text("}");
                    return Ok(());
                }
            }
        }

        match &recv {
            Some(r) => {
                self.emit_grouped(r, Prec::Postfix)?;
                self.ser.text(".");
                self.emit_method_name(&call_name);
            }
            None if !self.rbstack.is_empty() => {
                let base = self.self_ref();
                let resolved = self.resolve_private_name(&call_name);
                self.ser.text(format!("{base}."));
                self.emit_method_name(&resolved);
            }
            None => self.emit_method_name(&call_name),
        }
        self.ser.text("(");
        for a in &call_args {
            self.emit(a, Ctx::Expression)?;
            self.ser.text(", ");
        }
        self.emit_function_literal(&params, &body)?;
        self.ser.text(")");
        Ok(())
    }

    /// `function (params) { ...body... }` — blocks render as plain function
    /// expressions rather than arrows so a block that refers to `self`/an
    /// ivar can capture the enclosing `this` explicitly (`let self = this;`)
    /// instead of relying on arrow lexical `this`, matching the `self`/
    /// `this` split `self_ref()` reads from `FuncScope::self_captured`.
    fn emit_function_literal(&mut self, params: &ParsedParams, body: &Node) -> ConvertResult<()> {
        let needs_self = !self.rbstack.is_empty() && body_references_self(body);
        self.ser.text("function ");
        self.emit_param_list(params)?;
        self.ser.text(" {");
        self.ser.indent();
        self.scopes.push(self.ser.mark());
        self.declare_params(params);
        if needs_self {
            self.scopes.current().self_captured = true;
            self.ser.newline();
            self.ser.text("let self = this;");
        }
        self.ser.newline();
        self.emit_kwarg_prolog(params)?;
        self.emit_statements_block(body)?;
        self.ser.text(";");
        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }
}

/// Shallow scan for anything that needs `this`/`self` inside a block body,
/// stopping at a nested method/block boundary (which captures its own).
fn body_references_self(node: &Node) -> bool {
    match node.kind() {
        Tag::SelfExpr | Tag::Ivar | Tag::Ivasgn | Tag::Cvar | Tag::Cvasgn | Tag::Super | Tag::Zsuper => true,
        Tag::Def | Tag::Defs | Tag::Defm | Tag::Deff | Tag::Defp | Tag::Async | Tag::Asyncs | Tag::Block | Tag::Numblock => false,
        _ => node.children().iter().any(|c| match c {
            Value::Node(n) => body_references_self(n),
            Value::List(l) => l.iter().any(body_references_self),
            _ => false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::CommentMap;
    use crate::options::ConvertOptions;

    fn run(node: &Node) -> String {
        let opts = ConvertOptions::default();
        let comments = CommentMap::new();
        let conv = Converter::new(&opts, &comments, "");
        conv.run(node).unwrap().0
    }

    #[test]
    fn is_a_becomes_instanceof() {
        let send = ast::send(Some(ast::lvar("x")), "is_a?", vec![ast::const_(None, "String")]);
        let out = run(&ast::begin(vec![send]));
        assert!(out.contains("x instanceof String"), "{out}");
    }

    #[test]
    fn spaceship_expands_to_ternary_chain() {
        let send = ast::send(Some(ast::lvar("a")), "<=>", vec![ast::lvar("b")]);
        let out = run(&ast::begin(vec![ast::lvasgn("cmp", Some(send))]));
        assert!(out.contains("(a < b ? -1 : a > b ? 1 : 0)"), "{out}");
    }

    #[test]
    fn regex_match_becomes_test_call() {
        let opts = ast::s(Tag::Regopt, vec![Value::Str(IStr::from(""))]);
        let re = ast::s(Tag::Regexp, vec![Value::Node(ast::str_lit("foo")), Value::Node(opts)]);
        let send = ast::send(Some(re), "=~", vec![ast::lvar("s")]);
        let out = run(&ast::begin(vec![send]));
        assert!(out.contains(".test(s)"), "{out}");
        assert!(!out.contains("!/"), "{out}");
    }

    #[test]
    fn raise_with_const_and_message_becomes_throw_new() {
        let send = ast::send(None, "raise", vec![ast::const_(None, "ArgumentError"), ast::str_lit("bad")]);
        let out = run(&ast::begin(vec![send]));
        assert!(out.contains("throw new ArgumentError(\"bad\")"), "{out}");
    }

    #[test]
    fn raise_with_no_args_throws_plain_error() {
        let send = ast::send(None, "raise", vec![]);
        let out = run(&ast::begin(vec![send]));
        assert!(out.contains("throw new Error()"), "{out}");
    }

    #[test]
    fn setter_method_call_emits_property_assignment() {
        let send = ast::send(Some(ast::lvar("obj")), "name=", vec![ast::str_lit("x")]);
        let out = run(&ast::begin(vec![send]));
        assert!(out.contains("obj.name = \"x\""), "{out}");
    }

    #[test]
    fn chained_shovel_collapses_to_push_with_multiple_args() {
        let first = ast::send(Some(ast::lvar("arr")), "<<", vec![ast::int_lit(1)]);
        let second = ast::send(Some(first), "<<", vec![ast::int_lit(2)]);
        let out = run(&ast::begin(vec![second]));
        assert!(out.contains("arr.push(1, 2)"), "{out}");
    }

    #[test]
    fn single_shovel_stays_bit_shift() {
        let send = ast::send(Some(ast::lvar("arr")), "<<", vec![ast::int_lit(1)]);
        let out = run(&ast::begin(vec![send]));
        assert!(out.contains("arr << 1"), "{out}");
    }

    #[test]
    fn index_get_with_symbol_key_becomes_dot_access() {
        let send = ast::send(Some(ast::lvar("h")), "[]", vec![ast::sym_lit("name")]);
        let out = run(&ast::begin(vec![ast::lvasgn("v", Some(send))]));
        assert!(out.contains("h.name"), "{out}");
    }

    #[test]
    fn new_call_on_const_emits_new_expression() {
        let send = ast::send(Some(ast::const_(None, "Point")), "new", vec![ast::int_lit(1), ast::int_lit(2)]);
        let out = run(&ast::begin(vec![ast::lvasgn("p", Some(send))]));
        assert!(out.contains("new Point(1, 2)"), "{out}");
    }
}
