//! Crate-level scenarios exercising the converter end to end: a hand-built
//! normalized AST goes in, emitted TGT text comes out. These build trees
//! directly with the `ast` constructors rather than through a parser, since
//! this crate does not ship one (`ParserTree` is supplied by the caller).

use ruby2js::ast::{self, Location, Tag, Value};
use ruby2js::comments::CommentMap;
use ruby2js::interner::IStr;
use ruby2js::options::IvarStyle;
use ruby2js::{Converter, ConvertOptions};

fn emit(root: &ast::Node, opts: &ConvertOptions) -> String {
    let comments = CommentMap::new();
    let converter = Converter::new(opts, &comments, "");
    converter.run(root).unwrap().0
}

fn def(name: &str, params: Vec<ast::Node>, body: ast::Node) -> ast::Node {
    ast::s(Tag::Def, vec![Value::Str(IStr::from(name)), Value::List(params), Value::Node(body)])
}

fn class_with(name: &str, members: Vec<ast::Node>) -> ast::Node {
    let name = ast::const_(None, name);
    ast::s(Tag::Class, vec![Value::Node(name), Value::Absent, Value::Node(ast::begin(members))])
}

#[test]
fn getter_setter_accessor_pre_2022() {
    let attr = ast::send(None, "attr_accessor", vec![ast::sym_lit("x")]);
    let root = ast::begin(vec![class_with("C", vec![attr])]);
    let opts = ConvertOptions { eslevel: 2017, ..Default::default() };
    let out = emit(&root, &opts);
    assert!(out.contains("get x() { return this._x; }"), "{out}");
    assert!(out.contains("set x(x) { this._x = x; }"), "{out}");
}

#[test]
fn getter_setter_accessor_2022_private_fields() {
    let attr = ast::send(None, "attr_accessor", vec![ast::sym_lit("x")]);
    let root = ast::begin(vec![class_with("C", vec![attr])]);
    let opts = ConvertOptions { eslevel: 2022, ivars: IvarStyle::Private, ..Default::default() };
    let out = emit(&root, &opts);
    assert!(out.contains("#x"), "{out}");
}

#[test]
fn endless_method_returns() {
    let body = ast::send(Some(ast::lvar("x")), "*", vec![ast::lvar("x")]);
    let params = vec![ast::s(Tag::Arg, vec![Value::Str(IStr::from("x"))])];
    let loc = Location::def(
        text_size::TextRange::new(0.into(), 0.into()),
        text_size::TextRange::new(0.into(), 0.into()),
        true,
    );
    let sq = ast::s_loc(
        Tag::Def,
        vec![Value::Str(IStr::from("sq")), Value::List(params), Value::Node(body)],
        loc,
    );
    let root = ast::begin(vec![sq]);
    let opts = ConvertOptions::default();
    let out = emit(&root, &opts);
    assert!(out.contains("function sq(x) {"), "{out}");
    assert!(out.contains("return"), "{out}");
}

#[test]
fn exclusive_range_for_loop() {
    let index = ast::lvasgn("i", None);
    let collection = ast::s(Tag::Erange, vec![Value::Node(ast::int_lit(0)), Value::Node(ast::int_lit(3))]);
    let body = ast::begin(vec![ast::send(None, "p", vec![ast::lvar("i")])]);
    let for_node = ast::s(Tag::For, vec![Value::Node(index), Value::Node(collection), Value::Node(body)]);
    let root = ast::begin(vec![for_node]);
    let out = emit(&root, &ConvertOptions::default());
    assert!(out.contains("for (let i = 0; i < 3; i++) {"), "{out}");
    assert!(out.contains("p(i)"), "{out}");
}

#[test]
fn case_with_range_switches_on_true() {
    let pred = ast::lvar("n");
    let range = ast::s(Tag::Irange, vec![Value::Node(ast::int_lit(0)), Value::Node(ast::int_lit(3))]);
    let when = ast::s(Tag::When, vec![Value::List(vec![range]), Value::Node(ast::str_lit("low"))]);
    let case_node = ast::s(
        Tag::Case,
        vec![Value::Node(pred), Value::Node(when), Value::Node(ast::str_lit("other"))],
    );
    let root = ast::begin(vec![case_node]);
    let out = emit(&root, &ConvertOptions::default());
    assert!(out.contains("switch (true) {"), "{out}");
    assert!(out.contains("case n >= 0 && n <= 3:"), "{out}");
    assert!(out.contains("\"other\""), "{out}");
}

#[test]
fn method_missing_emits_proxy_factory() {
    let mm = def(
        "method_missing",
        vec![ast::s(Tag::Arg, vec![Value::Str(IStr::from("name"))])],
        ast::nil(),
    );
    let root = ast::begin(vec![class_with("Ghost", vec![mm])]);
    let out = emit(&root, &ConvertOptions::default());
    assert!(out.contains("function Ghost$(...args)"), "{out}");
    assert!(out.contains("target.method_missing(prop)"), "{out}");
}

#[test]
fn keyword_args_with_rest_pack_trailing_kwargs() {
    let params = vec![
        ast::s(Tag::Restarg, vec![Value::Str(IStr::from("a"))]),
        ast::s(Tag::Kwarg, vec![Value::Str(IStr::from("x"))]),
        ast::s(Tag::Kwoptarg, vec![Value::Str(IStr::from("y")), Value::Node(ast::int_lit(2))]),
    ];
    let f = def("f", params, ast::nil());
    let root = ast::begin(vec![f]);
    let out = emit(&root, &ConvertOptions::default());
    assert!(out.contains("x = $kwargs.x"), "{out}");
    assert!(out.contains("y = $kwargs.y ?? 2"), "{out}");
}

#[test]
fn empty_begin_in_expression_position_emits_null() {
    let assign = ast::lvasgn("y", Some(ast::begin(vec![])));
    let root = ast::begin(vec![assign]);
    let out = emit(&root, &ConvertOptions::default());
    assert!(out.contains("let y = null"), "{out}");
}

#[test]
fn empty_dstr_in_expression_position_emits_empty_string() {
    let assign = ast::lvasgn("y", Some(ast::s(Tag::Dstr, vec![])));
    let root = ast::begin(vec![assign]);
    let out = emit(&root, &ConvertOptions::default());
    assert!(out.contains("let y = \"\""), "{out}");
}
