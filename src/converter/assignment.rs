//! Assignment normalization: plain variable writes go through the scope's
//! first-write/hoist tracking; `casgn`/class-body property merges route
//! through `Object.assign`/`Object.defineProperty` for hash-shaped class
//! targets.

use super::scope::VarState;
use super::{Converter, Ctx};
use crate::ast::{Node, Tag, Value};
use crate::error::ConvertResult;

impl<'a> Converter<'a> {
    pub(crate) fn emit_simple_assign(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        match node.kind() {
            Tag::Lvasgn => self.emit_lvasgn(node, ctx),
            Tag::Ivasgn => self.emit_ivasgn(node),
            Tag::Cvasgn => self.emit_cvasgn(node),
            Tag::Gvasgn => self.emit_gvasgn(node),
            Tag::Casgn => self.emit_casgn(node),
            _ => unreachable!("emit_simple_assign only handles variable-assignment tags"),
        }
    }

    fn emit_lvasgn(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        let name = self.name_of(node, 0);
        let value = node.child_node(1);

        let needs_let = if ctx.is_statement() {
            self.scopes.current().record_write(&name)
        } else {
            // An assignment nested inside a larger expression cannot carry
            // its own `let`; if this is the first sight of the name, it
            // must be hoisted to the enclosing function top regardless of
            // block depth.
            match self.scopes.current().state_of(&name) {
                Some(_) => false,
                None => {
                    self.scopes.current().declare(name.clone(), VarState::Pending);
                    false
                }
            }
        };

        if needs_let {
            self.ser.text("let ");
        }
        self.text_named(node, &name, &name);
        if let Some(v) = value {
            self.ser.text(" = ");
            self.emit(v, Ctx::Expression)?;
        }
        Ok(())
    }

    fn emit_ivasgn(&mut self, node: &Node) -> ConvertResult<()> {
        let name = self.name_of(node, 0);
        let value = node.child_node(1);
        let base = self.self_ref();
        match self.opts.ivars {
            crate::options::IvarStyle::Private => self.ser.text(format!("{base}.#{name}")),
            crate::options::IvarStyle::Property => self.ser.text(format!("{base}._{name}")),
        }
        if let Some(v) = value {
            self.ser.text(" = ");
            self.emit(v, Ctx::Expression)?;
        }
        Ok(())
    }

    fn emit_cvasgn(&mut self, node: &Node) -> ConvertResult<()> {
        let name = self.name_of(node, 0);
        let value = node.child_node(1);
        self.ser.text(format!("{}.$cv_{}", self.current_class_name(), name));
        if let Some(v) = value {
            self.ser.text(" = ");
            self.emit(v, Ctx::Expression)?;
        }
        Ok(())
    }

    fn emit_gvasgn(&mut self, node: &Node) -> ConvertResult<()> {
        let name = self.name_of(node, 0);
        let value = node.child_node(1);
        self.ser.text(format!("globalThis.{name}"));
        if let Some(v) = value {
            self.ser.text(" = ");
            self.emit(v, Ctx::Expression)?;
        }
        Ok(())
    }

    fn emit_casgn(&mut self, node: &Node) -> ConvertResult<()> {
        let name = self.name_of(node, 1);
        let value = node.child_node(2);
        self.namespace.declare(name.clone(), crate::namespace::Symbol::Constant);
        self.ser.text(format!("const {name}"));
        if let Some(v) = value {
            self.ser.text(" = ");
            self.emit(v, Ctx::Expression)?;
        }
        Ok(())
    }

    pub(crate) fn emit_compound_assign(&mut self, node: &Node, _ctx: Ctx) -> ConvertResult<()> {
        let target = node.child_node(0).unwrap();
        match node.kind() {
            Tag::OpAsgn => {
                let op = node.child(1).and_then(Value::as_str).unwrap_or("+");
                let value = node.child_node(2).unwrap();
                self.emit(target, Ctx::Expression)?;
                self.ser.text(format!(" {op}= "));
                self.emit(value, Ctx::Expression)?;
            }
            Tag::AndAsgn | Tag::LogicalAsgn => {
                let value = node.child_node(1).unwrap();
                self.emit(target, Ctx::Expression)?;
                self.ser.text(" &&= ");
                self.emit(value, Ctx::Expression)?;
            }
            Tag::OrAsgn => {
                let value = node.child_node(1).unwrap();
                self.emit(target, Ctx::Expression)?;
                let op = if self.opts.supports_nullish() { "??=" } else { "||=" };
                self.ser.text(format!(" {op} "));
                self.emit(value, Ctx::Expression)?;
            }
            Tag::NullishAsgn => {
                let value = node.child_node(1).unwrap();
                self.emit(target, Ctx::Expression)?;
                self.ser.text(" ??= ");
                self.emit(value, Ctx::Expression)?;
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    /// Multiple assignment: `a, b = 1, 2` → destructuring. Every target
    /// that is a fresh local gets its first-write treatment via the same
    /// `record_write` discipline, all surfaced through one `let [..]`
    /// when every target is a brand-new local, else plain `[..] =`.
    pub(crate) fn emit_masgn(&mut self, node: &Node, ctx: Ctx) -> ConvertResult<()> {
        let mlhs = node.child_node(0).unwrap();
        let value = node.child_node(1).unwrap();
        let targets = mlhs.child(0).and_then(Value::as_list).unwrap_or(&[]);

        let all_fresh_lvars = ctx.is_statement()
            && targets.iter().all(|t| {
                t.kind() == Tag::Lvasgn
                    && self.scopes.current_ref().state_of(&self.name_of(t, 0)).is_none()
            });

        if all_fresh_lvars {
            self.ser.text("let [");
        } else {
            self.ser.text("[");
        }
        for (i, t) in targets.iter().enumerate() {
            if i > 0 {
                self.ser.text(", ");
            }
            match t.kind() {
                Tag::Lvasgn => {
                    let name = self.name_of(t, 0);
                    self.scopes.current().declare(name.clone(), VarState::Masgn);
                    self.ser.text(name.to_string());
                }
                Tag::Splat => {
                    self.ser.text("...");
                    if let Some(inner) = t.child_node(0) {
                        self.emit(inner, Ctx::Expression)?;
                    }
                }
                _ => self.emit(t, Ctx::Expression)?,
            }
        }
        self.ser.text("] = ");
        self.emit(&value, Ctx::Expression)?;
        Ok(())
    }

    /// spec.md's `on_assign`: normalizes several property-definition shapes
    /// into `Object.assign`/`Object.defineProperty(ies)` calls. Used by
    /// `classes.rs` when a class body's declarations merge into an
    /// existing target object (`class_extend`) rather than a native class.
    pub(crate) fn emit_object_merge(&mut self, target: &str, plain: &[(String, Node)], descriptors: &[(String, Node)]) -> ConvertResult<()> {
        if descriptors.is_empty() {
            if plain.is_empty() {
                return Ok(());
            }
            self.ser.text(format!("Object.assign({target}, {{"));
            for (i, (k, v)) in plain.iter().enumerate() {
                if i > 0 {
                    self.ser.text(", ");
                }
                self.ser.text(format!("{k}: "));
                self.emit(v, Ctx::Expression)?;
            }
            self.ser.text("})");
            return Ok(());
        }

        if descriptors.len() == 1 && plain.is_empty() {
            let (k, v) = &descriptors[0];
            self.ser.text(format!("Object.defineProperty({target}, {:?}, ", k));
            self.emit(v, Ctx::Expression)?;
            self.ser.text(")");
            return Ok(());
        }

        self.ser.text(format!("Object.defineProperties({target}, {{"));
        for (i, (k, v)) in descriptors.iter().enumerate() {
            if i > 0 {
                self.ser.text(", ");
            }
            self.ser.text(format!("{:?}: ", k));
            self.emit(v, Ctx::Expression)?;
        }
        if !plain.is_empty() {
            self.ser.text(", ");
            for (i, (k, v)) in plain.iter().enumerate() {
                if i > 0 {
                    self.ser.text(", ");
                }
                self.ser.text(format!("{k}: {{ value: "));
                self.emit(v, Ctx::Expression)?;
                self.ser.text(", enumerable: true, writable: true, configurable: true }");
            }
        }
        self.ser.text("})");
        Ok(())
    }
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

    #[test]
    fn first_write_to_local_gets_let() {
        let out = run(&ast::begin(vec![ast::lvasgn("x", Some(ast::int_lit(1)))]));
        assert!(out.contains("let x = 1;"), "{out}");
    }

    #[test]
    fn second_write_to_same_local_has_no_let() {
        let first = ast::lvasgn("x", Some(ast::int_lit(1)));
        let second = ast::lvasgn("x", Some(ast::int_lit(2)));
        let out = run(&ast::begin(vec![first, second]));
        assert_eq!(out.matches("let x").count(), 1, "{out}");
        assert!(out.contains("x = 2;"), "{out}");
    }

    #[test]
    fn or_asgn_emits_nullish_when_target_supports_it() {
        let target = ast::lvasgn("x", None);
        let value = ast::int_lit(1);
        let node = ast::s(Tag::OrAsgn, vec![Value::Node(target), Value::Node(value)]);
        let out = run(&ast::begin(vec![ast::lvasgn("x", Some(ast::int_lit(0))), node]));
        assert!(out.contains("x ??= 1") || out.contains("x ||= 1"), "{out}");
    }

    #[test]
    fn op_asgn_keeps_the_original_operator() {
        let target = ast::lvasgn("x", None);
        let value = ast::int_lit(2);
        let node = ast::s(Tag::OpAsgn, vec![Value::Node(target), Value::Str(crate::interner::IStr::from("+")), Value::Node(value)]);
        let out = run(&ast::begin(vec![ast::lvasgn("x", Some(ast::int_lit(0))), node]));
        assert!(out.contains("x += 2;"), "{out}");
    }

    #[test]
    fn masgn_with_all_fresh_locals_emits_let_destructure() {
        let targets = vec![ast::lvasgn("a", None), ast::lvasgn("b", None)];
        let mlhs = ast::s(Tag::Mlhs, vec![Value::List(targets)]);
        let value = ast::array(vec![ast::int_lit(1), ast::int_lit(2)]);
        let masgn = ast::s(Tag::Masgn, vec![Value::Node(mlhs), Value::Node(value)]);
        let out = run(&ast::begin(vec![masgn]));
        assert!(out.contains("let [a, b] ="), "{out}");
    }

    #[test]
    fn masgn_with_already_declared_local_has_no_let() {
        let targets = vec![ast::lvasgn("a", None), ast::lvasgn("b", None)];
        let mlhs = ast::s(Tag::Mlhs, vec![Value::List(targets)]);
        let value = ast::array(vec![ast::int_lit(1), ast::int_lit(2)]);
        let masgn = ast::s(Tag::Masgn, vec![Value::Node(mlhs), Value::Node(value)]);
        let out = run(&ast::begin(vec![ast::lvasgn("a", Some(ast::int_lit(0))), masgn]));
        assert!(out.contains("[a, b] ="), "{out}");
        assert!(!out.contains("let [a, b]"), "{out}");
    }

    #[test]
    fn object_merge_with_only_plain_entries_uses_assign() {
        let opts = ConvertOptions::default();
        let comments = CommentMap::new();
        let mut conv = Converter::new(&opts, &comments, "");
        let plain = vec![("a".to_string(), ast::int_lit(1))];
        conv.emit_object_merge("Target", &plain, &[]).unwrap();
        let out = conv.ser.finish().0;
        assert!(out.contains("Object.assign(Target, {a: 1})"), "{out}");
    }

    #[test]
    fn object_merge_with_single_descriptor_uses_define_property() {
        let opts = ConvertOptions::default();
        let comments = CommentMap::new();
        let mut conv = Converter::new(&opts, &comments, "");
        let descriptor = ast::send(None, "Object.create", vec![]);
        conv.emit_object_merge("Target", &[], &[("x".to_string(), descriptor)]).unwrap();
        let out = conv.ser.finish().0;
        assert!(out.contains("Object.defineProperty(Target, \"x\", "), "{out}");
    }
}
