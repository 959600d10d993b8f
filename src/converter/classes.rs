//! Class and module shape selection. A `class`/`module` body is partitioned
//! into its structural pieces — constructor, instance/static methods,
//! accessors, visibility markers, includes/extends, constants, nested
//! declarations — and from that shape one of four renderings is chosen:
//! a native `class` declaration, an object literal standing in for a
//! class, a `defineProperties`/`assign` merge into an existing target, or
//! (for modules) a nested object vs an exporting IIFE.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use super::methods::{autoreturn_thread, maybe_add_implicit_block_param, parse_params};
use super::{Converter, Ctx};
use crate::ast::{self, Location, Node, Tag, Value};
use crate::error::{ConvertError, ConvertResult};
use crate::interner::IStr;
use crate::namespace::Symbol;
use crate::options::IvarStyle;

/// How a member is dispatched to from inside its own class/module body.
/// Looked up by [`Converter::resolve_private_name`] when a bare (no
/// receiver) call resolves against the innermost open frame.
#[derive(Debug, Clone)]
pub enum MethodCap {
    Public,
    /// Declared `private`/`protected`; calls from inside the body prefix
    /// the name with the stored marker (`"_"` pre-2022, `"#"` 2022+).
    Private(String),
}

/// One entry on [`Converter::rbstack`]: the class/module currently being
/// emitted, plus the capability of every member declared on it so far.
#[derive(Debug)]
pub struct ClassFrame {
    pub name: IStr,
    pub methods: FxHashMap<IStr, MethodCap>,
}

impl ClassFrame {
    fn new(name: IStr) -> Self {
        Self {
            name,
            methods: FxHashMap::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Public,
    Guarded,
}

#[derive(Debug, Clone)]
struct MethodDef {
    name: IStr,
    params: Vec<Node>,
    body: Node,
    is_async: bool,
    endless: bool,
    visibility: Visibility,
    node: Node,
}

#[derive(Debug, Clone)]
struct Accessor {
    name: IStr,
    reader: bool,
    writer: bool,
}

#[derive(Debug, Default)]
struct ClassBody {
    constructor: Option<MethodDef>,
    instance_methods: Vec<MethodDef>,
    static_methods: Vec<MethodDef>,
    accessors: Vec<Accessor>,
    includes: Vec<Node>,
    extends: Vec<Node>,
    constants: Vec<(IStr, Node)>,
    nested: Vec<Node>,
    other: Vec<Node>,
    has_method_missing: bool,
}

/// Pulls `(name, params, body, is_static, is_async, endless)` out of any
/// `def`-family node, mirroring `emit_def`'s own offset logic so a member
/// lowers identically whether it ends up a class method or a top-level one.
fn parse_member_def(stmt: &Node) -> (IStr, Vec<Node>, Node, bool, bool, bool) {
    let is_async = matches!(stmt.kind(), Tag::Async | Tag::Asyncs);
    let is_static = matches!(stmt.kind(), Tag::Defs | Tag::Asyncs);
    let offset = if is_static { 1 } else { 0 };
    let name = stmt.child(offset).and_then(Value::as_str).map(IStr::from).unwrap_or_else(|| IStr::from(""));
    let params = stmt.child(offset + 1).and_then(Value::as_list).map(<[Node]>::to_vec).unwrap_or_default();
    let body = stmt.child_node(offset + 2).cloned().unwrap_or_else(ast::nil);
    let endless = matches!(stmt.loc(), Some(Location::Def(d)) if d.endless);
    (name, params, body, is_static, is_async, endless)
}

fn collect_ivar_names(node: &Node, out: &mut BTreeSet<IStr>) {
    match node.kind() {
        Tag::Ivar | Tag::Ivasgn => {
            if let Some(n) = node.child(0).and_then(Value::as_str) {
                out.insert(IStr::from(n));
            }
        }
        Tag::Class | Tag::ClassHash | Tag::ClassModule | Tag::ClassExtend | Tag::Class2 | Tag::Module | Tag::ModuleHash => {
            return;
        }
        _ => {}
    }
    for child in node.children() {
        match child {
            Value::Node(n) => collect_ivar_names(n, out),
            Value::List(l) => l.iter().for_each(|n| collect_ivar_names(n, out)),
            _ => {}
        }
    }
}

impl<'a> Converter<'a> {
    pub(crate) fn emit_class(&mut self, node: &Node) -> ConvertResult<()> {
        match node.kind() {
            Tag::ClassExtend => self.emit_class_extend(node),
            Tag::ClassHash | Tag::ClassModule => self.emit_class_hash(node),
            Tag::Class | Tag::Class2 => self.emit_class_native(node),
            other => unreachable!("emit_class only dispatches class-family tags, got {other:?}"),
        }
    }

    pub(crate) fn emit_module(&mut self, node: &Node) -> ConvertResult<()> {
        let name_node = node.child_node(0).unwrap();
        let name = self.name_of(name_node, 1);
        let body = node.child_node(1).cloned().unwrap_or_else(|| ast::begin(vec![]));
        let stmts = self.statement_list(&body);
        let only_defs_and_nested = !stmts.is_empty()
            && stmts.iter().all(|s| {
                matches!(
                    s.kind(),
                    Tag::Def
                        | Tag::Defs
                        | Tag::Defm
                        | Tag::Deff
                        | Tag::Defp
                        | Tag::Async
                        | Tag::Asyncs
                        | Tag::Class
                        | Tag::Module
                        | Tag::ClassHash
                        | Tag::ClassModule
                        | Tag::ClassExtend
                        | Tag::ModuleHash
                        | Tag::Class2
                )
            });

        if node.kind() == Tag::Module && only_defs_and_nested {
            self.emit_module_as_object(&name, &body)
        } else {
            self.emit_module_as_iife(&name, &body)
        }
    }

    fn private_method_prefix(&self) -> &'static str {
        if self.opts.supports_private_fields() && !self.opts.underscored_private {
            "#"
        } else {
            "_"
        }
    }

    fn ivar_backing(&self, name: &str) -> String {
        match self.opts.ivars {
            IvarStyle::Private => format!("#{name}"),
            IvarStyle::Property => format!("_{name}"),
        }
    }

    fn partition_class_body(&self, body: &Node) -> ClassBody {
        let mut out = ClassBody::default();
        let mut vis = Visibility::Public;

        for stmt in self.statement_list(body) {
            if stmt.is_empty_begin() {
                continue;
            }
            match stmt.kind() {
                Tag::Def | Tag::Defs | Tag::Defm | Tag::Deff | Tag::Defp | Tag::Async | Tag::Asyncs => {
                    let (name, params, mbody, is_static, is_async, endless) = parse_member_def(&stmt);
                    let def = MethodDef {
                        name: name.clone(),
                        params,
                        body: mbody,
                        is_async,
                        endless,
                        visibility: vis,
                        node: stmt.clone(),
                    };
                    if is_static {
                        out.static_methods.push(def);
                    } else if name.as_ref() == "initialize" {
                        out.constructor = Some(def);
                    } else {
                        if name.as_ref() == "method_missing" {
                            out.has_method_missing = true;
                        }
                        out.instance_methods.push(def);
                    }
                }
                Tag::Send | Tag::Attr if stmt.child(0).and_then(Value::as_node).is_none() => {
                    let name = stmt.child(1).and_then(Value::as_str).unwrap_or("");
                    let args: Vec<Node> = stmt.children()[2..].iter().filter_map(Value::as_node).cloned().collect();
                    match name {
                        "attr_accessor" | "attr_reader" | "attr_writer" => {
                            for a in &args {
                                if let Some(sym) = a.child(0).and_then(Value::as_str) {
                                    out.accessors.push(Accessor {
                                        name: IStr::from(sym),
                                        reader: name != "attr_writer",
                                        writer: name != "attr_reader",
                                    });
                                }
                            }
                        }
                        "private" | "protected" => {
                            if args.is_empty() {
                                vis = Visibility::Guarded;
                            } else {
                                for a in &args {
                                    if let Some(sym) = a.child(0).and_then(Value::as_str) {
                                        if let Some(m) = out.instance_methods.iter_mut().find(|m| m.name.as_ref() == sym) {
                                            m.visibility = Visibility::Guarded;
                                        }
                                    }
                                }
                            }
                        }
                        "public" => vis = Visibility::Public,
                        "include" => out.includes.extend(args),
                        "extend" => out.extends.extend(args),
                        _ => out.other.push(stmt.clone()),
                    }
                }
                Tag::Casgn => {
                    let name = self.name_of(&stmt, 1);
                    let value = stmt.child_node(2).cloned().unwrap_or_else(ast::nil);
                    out.constants.push((name, value));
                }
                Tag::Class | Tag::Module | Tag::ClassHash | Tag::ClassModule | Tag::ClassExtend | Tag::ModuleHash | Tag::Class2 => {
                    out.nested.push(stmt.clone());
                }
                _ => out.other.push(stmt.clone()),
            }
        }
        out
    }

    fn resolve_member_name(&self, name: &str, visibility: Visibility) -> String {
        match visibility {
            Visibility::Guarded => format!("{}{name}", self.private_method_prefix()),
            Visibility::Public => name.to_string(),
        }
    }

    fn emit_class_native(&mut self, node: &Node) -> ConvertResult<()> {
        let name_node = node.child_node(0).unwrap();
        let name = self.name_of(name_node, 1);
        let superclass = node.child(1).and_then(Value::as_node).cloned();
        let body = node.child_node(2).cloned().unwrap_or_else(|| ast::begin(vec![]));

        self.namespace.declare(name.clone(), Symbol::Class);
        self.namespace.enter(name.clone());

        let parts = self.partition_class_body(&body);
        let prefix = self.private_method_prefix().to_string();
        let mut frame = ClassFrame::new(name.clone());
        for m in parts.instance_methods.iter().chain(parts.constructor.iter()) {
            let cap = match m.visibility {
                Visibility::Guarded => MethodCap::Private(prefix.clone()),
                Visibility::Public => MethodCap::Public,
            };
            frame.methods.insert(m.name.clone(), cap);
        }
        for acc in &parts.accessors {
            frame.methods.insert(acc.name.clone(), MethodCap::Public);
        }
        self.rbstack.push(frame);

        self.ser.text(format!("class {name}"));
        if let Some(sup) = &superclass {
            self.ser.text(" extends ");
            self.emit(sup, Ctx::Expression)?;
        }
        self.ser.text(" {");
        self.ser.indent();

        let mut ivar_names = BTreeSet::new();
        collect_ivar_names(&body, &mut ivar_names);

        if self.opts.ivars == IvarStyle::Private && self.opts.supports_private_fields() {
            for iv in &ivar_names {
                self.ser.newline();
                self.ser.text(format!("#{iv};"));
            }
        }
        for (cname, cval) in &parts.constants {
            self.ser.newline();
            self.ser.text(format!("static {cname} = "));
            self.emit(cval, Ctx::Expression)?;
            self.ser.text(";");
        }

        if let Some(ctor) = &parts.constructor {
            self.ser.newline();
            self.emit_leading_comments(&ctor.node);
            self.emit_class_constructor(ctor)?;
        }

        for acc in &parts.accessors {
            if acc.reader {
                self.ser.newline();
                self.emit_accessor_getter(&acc.name)?;
            }
            if acc.writer {
                self.ser.newline();
                self.emit_accessor_setter(&acc.name)?;
            }
        }

        for m in &parts.instance_methods {
            self.ser.newline();
            self.emit_leading_comments(&m.node);
            self.emit_class_instance_method(m)?;
        }
        for m in &parts.static_methods {
            self.ser.newline();
            self.emit_leading_comments(&m.node);
            self.emit_class_static_method(m)?;
        }

        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");

        for incl in &parts.includes {
            self.ser.newline();
            self.ser.text(format!("Object.assign({name}.prototype, "));
            self.emit(incl, Ctx::Expression)?;
            self.ser.text(");");
        }
        for ext in &parts.extends {
            self.ser.newline();
            self.ser.text(format!("Object.assign({name}, "));
            self.emit(ext, Ctx::Expression)?;
            self.ser.text(");");
        }
        if parts.has_method_missing {
            self.ser.newline();
            self.emit_method_missing_proxy(&name);
        }
        for nested in &parts.nested {
            self.ser.newline();
            self.emit(nested, Ctx::Statement)?;
            self.terminate_statement(nested);
        }
        for other in &parts.other {
            self.ser.newline();
            self.emit(other, Ctx::Statement)?;
            self.terminate_statement(other);
        }

        self.rbstack.pop();
        self.namespace.leave();
        Ok(())
    }

    fn emit_class_constructor(&mut self, ctor: &MethodDef) -> ConvertResult<()> {
        let mut parsed = parse_params(&ctor.params);
        maybe_add_implicit_block_param(&mut parsed, &ctor.body);
        self.ser.text("constructor");
        self.emit_param_list(&parsed)?;
        self.ser.text(" {");
        self.ser.indent();
        self.scopes.push(self.ser.mark());
        self.declare_params(&parsed);
        self.ser.newline();
        self.emit_kwarg_prolog(&parsed)?;
        self.emit_statements_block(&ctor.body)?;
        self.ser.text(";");
        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    fn emit_class_instance_method(&mut self, m: &MethodDef) -> ConvertResult<()> {
        let mut parsed = parse_params(&m.params);
        maybe_add_implicit_block_param(&mut parsed, &m.body);
        let body = if m.endless { autoreturn_thread(&m.body) } else { m.body.clone() };
        let emitted_name = self.resolve_member_name(&m.name, m.visibility);
        if m.is_async {
            self.ser.text("async ");
        }
        self.emit_method_name(&emitted_name);
        self.emit_param_list(&parsed)?;
        self.ser.text(" {");
        self.ser.indent();
        self.scopes.push(self.ser.mark());
        self.declare_params(&parsed);
        self.ser.newline();
        self.emit_kwarg_prolog(&parsed)?;
        self.emit_statements_block(&body)?;
        self.ser.text(";");
        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    fn emit_class_static_method(&mut self, m: &MethodDef) -> ConvertResult<()> {
        let mut parsed = parse_params(&m.params);
        maybe_add_implicit_block_param(&mut parsed, &m.body);
        let body = if m.endless { autoreturn_thread(&m.body) } else { m.body.clone() };
        self.ser.text("static ");
        if m.is_async {
            self.ser.text("async ");
        }
        self.emit_method_name(&m.name);
        self.emit_param_list(&parsed)?;
        self.ser.text(" {");
        self.ser.indent();
        self.scopes.push(self.ser.mark());
        self.declare_params(&parsed);
        self.ser.newline();
        self.emit_kwarg_prolog(&parsed)?;
        self.emit_statements_block(&body)?;
        self.ser.text(";");
        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    /// Shared by `class_hash`/`class_extend`/module-as-object emission:
    /// the object-literal-method shorthand is identical to a class method
    /// except there is no `static` keyword and no private-name rewriting
    /// (visibility markers inside a hash-shaped body are rejected earlier).
    fn emit_object_method(&mut self, m: &MethodDef) -> ConvertResult<()> {
        let mut parsed = parse_params(&m.params);
        maybe_add_implicit_block_param(&mut parsed, &m.body);
        let body = if m.endless { autoreturn_thread(&m.body) } else { m.body.clone() };
        if m.is_async {
            self.ser.text("async ");
        }
        self.emit_method_name(&m.name);
        self.emit_param_list(&parsed)?;
        self.ser.text(" {");
        self.ser.indent();
        self.scopes.push(self.ser.mark());
        self.declare_params(&parsed);
        self.ser.newline();
        self.emit_kwarg_prolog(&parsed)?;
        self.emit_statements_block(&body)?;
        self.ser.text(";");
        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("}");
        Ok(())
    }

    fn emit_accessor_getter(&mut self, name: &str) -> ConvertResult<()> {
        let backing = self.ivar_backing(name);
        self.ser.text(format!("get {name}() {{ return this.{backing}; }}"));
        Ok(())
    }

    fn emit_accessor_setter(&mut self, name: &str) -> ConvertResult<()> {
        let backing = self.ivar_backing(name);
        self.ser.text(format!("set {name}({name}) {{ this.{backing} = {name}; }}"));
        Ok(())
    }

    /// `method_missing` support: a sibling factory function that wraps a
    /// freshly constructed instance in a `Proxy` forwarding unknown
    /// property reads to the instance's `method_missing`.
    fn emit_method_missing_proxy(&mut self, name: &str) {
        self.ser.text(format!(
            "function {name}$(...args) {{ return new Proxy(new {name}(...args), {{ get(target, prop) {{ return prop in target ? target[prop] : target.method_missing(prop); }} }}); }}"
        ));
    }

    fn emit_class_extend(&mut self, node: &Node) -> ConvertResult<()> {
        let target_node = node.child_node(0).unwrap();
        let target = self.name_of(target_node, 1);
        let body = node.child_node(2).cloned().unwrap_or_else(|| ast::begin(vec![]));
        let parts = self.partition_class_body(&body);

        if let Some(m) = parts.instance_methods.iter().find(|m| m.visibility == Visibility::Guarded) {
            return Err(ConvertError::unsupported(
                "visibility markers are not supported inside a class_extend body",
                self.span_of(&m.node),
            ));
        }

        self.ser.text(format!("Object.assign({target}, {{"));
        self.ser.indent();
        let mut first = true;
        for m in parts.instance_methods.iter().chain(parts.static_methods.iter()) {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            self.emit_object_method(m)?;
        }
        for (cname, cval) in &parts.constants {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            self.ser.text(format!("{cname}: "));
            self.emit(cval, Ctx::Expression)?;
        }
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("});");
        Ok(())
    }

    fn emit_class_hash(&mut self, node: &Node) -> ConvertResult<()> {
        let name_node = node.child_node(0).unwrap();
        let name = self.name_of(name_node, 1);
        let superclass = node.child(1).and_then(Value::as_node).cloned();
        let body = node.child_node(2).cloned().unwrap_or_else(|| ast::begin(vec![]));
        let parts = self.partition_class_body(&body);

        if let Some(m) = parts.instance_methods.iter().find(|m| m.visibility == Visibility::Guarded) {
            return Err(ConvertError::unsupported(
                "visibility markers are not supported inside a hash-style class",
                self.span_of(&m.node),
            ));
        }

        self.namespace.declare(name.clone(), Symbol::Class);
        let mut frame = ClassFrame::new(name.clone());
        for m in parts.instance_methods.iter().chain(parts.constructor.iter()).chain(parts.static_methods.iter()) {
            frame.methods.insert(m.name.clone(), MethodCap::Public);
        }
        self.rbstack.push(frame);

        self.ser.text(format!("const {name} = "));
        let wrapped_create = superclass.is_some();
        if let Some(sup) = &superclass {
            self.ser.text("Object.assign(Object.create(");
            self.emit(sup, Ctx::Expression)?;
            self.ser.text("), {");
        } else {
            self.ser.text("{");
        }
        self.ser.indent();

        let mut members: Vec<&MethodDef> = Vec::new();
        members.extend(parts.constructor.iter());
        members.extend(parts.instance_methods.iter());
        members.extend(parts.static_methods.iter());

        let mut first = true;
        for m in &members {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            self.emit_object_method(m)?;
        }
        for acc in &parts.accessors {
            if acc.reader {
                if !first {
                    self.ser.text(",");
                }
                first = false;
                self.ser.newline();
                let backing = self.ivar_backing(&acc.name);
                self.ser.text(format!("get {0}() {{ return this.{backing}; }}", acc.name));
            }
            if acc.writer {
                if !first {
                    self.ser.text(",");
                }
                first = false;
                self.ser.newline();
                let backing = self.ivar_backing(&acc.name);
                self.ser.text(format!("set {0}({0}) {{ this.{backing} = {0}; }}", acc.name));
            }
        }
        for (cname, cval) in &parts.constants {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            self.ser.text(format!("{cname}: "));
            self.emit(cval, Ctx::Expression)?;
        }
        self.ser.dedent();
        self.ser.newline();
        self.ser.text(if wrapped_create { "})" } else { "}" });
        self.ser.text(";");

        for incl in &parts.includes {
            self.ser.newline();
            self.ser.text(format!("Object.assign({name}, "));
            self.emit(incl, Ctx::Expression)?;
            self.ser.text(");");
        }
        for nested in &parts.nested {
            self.ser.newline();
            self.emit(nested, Ctx::Statement)?;
            self.terminate_statement(nested);
        }

        self.rbstack.pop();
        Ok(())
    }

    fn nested_decl_name(&self, nested: &Node) -> String {
        match nested.child_node(0) {
            Some(n) => self.name_of(n, 1).to_string(),
            None => "Anonymous".to_string(),
        }
    }

    /// A module whose body is only `def`/nested `class`/`module` compiles
    /// to a plain object carrying those as properties — no IIFE needed
    /// since there are no locals to enclose.
    fn emit_module_as_object(&mut self, name: &str, body: &Node) -> ConvertResult<()> {
        let parts = self.partition_class_body(body);
        if let Some(m) = parts.instance_methods.iter().find(|m| m.visibility == Visibility::Guarded) {
            return Err(ConvertError::unsupported(
                "visibility markers are not supported inside a hash-style module",
                self.span_of(&m.node),
            ));
        }

        self.namespace.declare(IStr::from(name), Symbol::Module);
        let mut frame = ClassFrame::new(IStr::from(name));
        for m in parts.instance_methods.iter().chain(parts.static_methods.iter()) {
            frame.methods.insert(m.name.clone(), MethodCap::Public);
        }
        self.rbstack.push(frame);

        for nested in &parts.nested {
            self.emit(nested, Ctx::Statement)?;
            self.terminate_statement(nested);
            self.ser.newline();
        }

        self.ser.text(format!("const {name} = {{"));
        self.ser.indent();
        let mut first = true;
        for m in parts.instance_methods.iter().chain(parts.static_methods.iter()) {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            self.emit_object_method(m)?;
        }
        for nested in &parts.nested {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            let decl_name = self.nested_decl_name(nested);
            self.ser.text(decl_name);
        }
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("};");

        self.rbstack.pop();
        Ok(())
    }

    /// A module with top-level expressions, constants or visibility
    /// markers compiles to an IIFE that declares its own locals and
    /// returns a hash of the public names (visibility markers gate
    /// inclusion in the returned hash).
    fn emit_module_as_iife(&mut self, name: &str, body: &Node) -> ConvertResult<()> {
        let parts = self.partition_class_body(body);
        self.namespace.declare(IStr::from(name), Symbol::Module);
        let mut frame = ClassFrame::new(IStr::from(name));
        for m in &parts.instance_methods {
            frame.methods.insert(m.name.clone(), MethodCap::Public);
        }
        self.rbstack.push(frame);

        self.ser.text(format!("const {name} = (function () {{"));
        self.ser.indent();
        self.scopes.push(self.ser.mark());

        for nested in &parts.nested {
            self.emit(nested, Ctx::Statement)?;
            self.terminate_statement(nested);
            self.ser.newline();
        }
        for (cname, cval) in &parts.constants {
            self.ser.text(format!("const {cname} = "));
            self.emit(cval, Ctx::Expression)?;
            self.ser.text(";");
            self.ser.newline();
        }
        for m in &parts.instance_methods {
            self.emit_leading_comments(&m.node);
            self.ser.text(format!("function {}", m.name));
            let mut parsed = parse_params(&m.params);
            maybe_add_implicit_block_param(&mut parsed, &m.body);
            let mbody = if m.endless { autoreturn_thread(&m.body) } else { m.body.clone() };
            self.emit_function(&parsed, &mbody)?;
            self.ser.newline();
        }
        for other in &parts.other {
            self.emit(other, Ctx::Statement)?;
            self.terminate_statement(other);
            self.ser.newline();
        }

        self.ser.text("return {");
        self.ser.indent();
        let mut first = true;
        for m in parts.instance_methods.iter().filter(|m| m.visibility == Visibility::Public) {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            self.ser.text(m.name.to_string());
        }
        for (cname, _) in &parts.constants {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            self.ser.text(cname.to_string());
        }
        for nested in &parts.nested {
            if !first {
                self.ser.text(",");
            }
            first = false;
            self.ser.newline();
            let decl_name = self.nested_decl_name(nested);
            self.ser.text(decl_name);
        }
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("};");

        self.close_scope();
        self.ser.dedent();
        self.ser.newline();
        self.ser.text("})();");

        self.rbstack.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::CommentMap;
    use crate::options::ConvertOptions;
    use rstest::rstest;

    fn run(node: &Node) -> String {
        let opts = ConvertOptions::default();
        let comments = CommentMap::new();
        let conv = Converter::new(&opts, &comments, "");
        conv.run(node).unwrap().0
    }

    fn run_with_opts(node: &Node, opts: ConvertOptions) -> String {
        let comments = CommentMap::new();
        let conv = Converter::new(&opts, &comments, "");
        conv.run(node).unwrap().0
    }

    fn class_with(members: Vec<Node>) -> Node {
        let name = ast::const_(None, "C");
        ast::s(Tag::Class, vec![Value::Node(name), Value::Absent, Value::Node(ast::begin(members))])
    }

    #[test]
    fn attr_accessor_emits_getter_and_setter() {
        let attr = ast::send(None, "attr_accessor", vec![ast::sym_lit("x")]);
        let node = ast::begin(vec![class_with(vec![attr])]);
        let out = run(&node);
        assert!(out.contains("get x() { return this._x; }"), "{out}");
        assert!(out.contains("set x(x) { this._x = x; }"), "{out}");
    }

    #[test]
    fn initialize_becomes_sole_constructor() {
        let init = ast::s(
            Tag::Def,
            vec![Value::Str(IStr::from("initialize")), Value::List(vec![]), Value::Node(ast::nil())],
        );
        let node = ast::begin(vec![class_with(vec![init])]);
        let out = run(&node);
        assert_eq!(out.matches("constructor(").count(), 1, "{out}");
    }

    #[test]
    fn method_missing_emits_proxy_factory() {
        let mm = ast::s(
            Tag::Def,
            vec![
                Value::Str(IStr::from("method_missing")),
                Value::List(vec![ast::s(Tag::Arg, vec![Value::Str(IStr::from("name"))])]),
                Value::Node(ast::nil()),
            ],
        );
        let node = ast::begin(vec![class_with(vec![mm])]);
        let out = run(&node);
        assert!(out.contains("function C$(...args)"), "{out}");
        assert!(out.contains("target.method_missing(prop)"), "{out}");
    }

    #[rstest]
    #[case(2022, false, "#helper(")]
    #[case(2022, true, "_helper(")]
    #[case(2021, false, "_helper(")]
    #[case(2015, false, "_helper(")]
    fn private_method_prefix_matrix(
        #[case] eslevel: u32,
        #[case] underscored_private: bool,
        #[case] expected: &str,
    ) {
        let private_call = ast::send(None, "private", vec![]);
        let helper = ast::s(
            Tag::Def,
            vec![Value::Str(IStr::from("helper")), Value::List(vec![]), Value::Node(ast::nil())],
        );
        let node = ast::begin(vec![class_with(vec![private_call, helper])]);
        let opts = ConvertOptions {
            eslevel,
            underscored_private,
            ..ConvertOptions::default()
        };
        let out = run_with_opts(&node, opts);
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn module_of_only_defs_becomes_plain_object() {
        let name = ast::const_(None, "M");
        let def = ast::s(
            Tag::Def,
            vec![Value::Str(IStr::from("go")), Value::List(vec![]), Value::Node(ast::nil())],
        );
        let module = ast::s(Tag::Module, vec![Value::Node(name), Value::Node(ast::begin(vec![def]))]);
        let node = ast::begin(vec![module]);
        let out = run(&node);
        assert!(out.contains("const M = {"), "{out}");
        assert!(!out.contains("function ()"), "{out}");
    }

    #[test]
    fn module_with_constant_becomes_iife() {
        let name = ast::const_(None, "M");
        let casgn = ast::s(Tag::Casgn, vec![Value::Absent, Value::Str(IStr::from("X")), Value::Node(ast::int_lit(1))]);
        let module = ast::s(Tag::Module, vec![Value::Node(name), Value::Node(ast::begin(vec![casgn]))]);
        let node = ast::begin(vec![module]);
        let out = run(&node);
        assert!(out.contains("(function ()"), "{out}");
        assert!(out.contains("return {"), "{out}");
    }
}
