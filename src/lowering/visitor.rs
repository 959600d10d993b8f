//! Lowers a parser concrete tree ([`ParseNode`]) into the normalized AST.

use super::parse_tree::ParseNode;
use crate::ast::{self, Location, Node, Tag, Value};
use crate::error::{ConvertError, ConvertResult};
use crate::interner::{IStr, Interner};
use crate::span::{Position, Span};
use std::cell::RefCell;

/// Options that influence lowering decisions: `forward_args`/shadowarg
/// degradation on older ES targets.
#[derive(Debug, Clone, Copy)]
pub struct LoweringOptions {
    pub eslevel: u32,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self { eslevel: 2022 }
    }
}

pub struct Lowering {
    interner: RefCell<Interner>,
    opts: LoweringOptions,
}

impl Lowering {
    pub fn new(opts: LoweringOptions) -> Self {
        Self {
            interner: RefCell::new(Interner::new()),
            opts,
        }
    }

    fn intern(&self, s: &str) -> IStr {
        self.interner.borrow_mut().intern(s)
    }

    /// `restarg`/`kwrestarg`/`blockarg` may be anonymous (`def foo(*)`) —
    /// an absent name child rather than an empty string.
    fn opt_name_value(&self, name: Option<&str>) -> Value {
        match name {
            Some(n) => Value::Str(self.intern(n)),
            None => Value::Absent,
        }
    }

    pub fn lower_program(&self, tree: &ParseNode) -> ConvertResult<Node> {
        match tree {
            ParseNode::Program(inner) => self.lower(inner),
            other => self.lower(other),
        }
    }

    /// Central dispatch. A concrete node class with no matching arm below
    /// is a fatal error rather than a silent skip.
    pub fn lower(&self, node: &ParseNode) -> ConvertResult<Node> {
        use ParseNode::*;
        let range = node.range();
        let pos_err = |msg: &str| {
            ConvertError::unsupported(
                msg.to_string(),
                Span::new(Position::new(0, range.start().into()), Position::new(0, range.end().into())),
            )
        };

        Ok(match node {
            Program(inner) => return self.lower(inner),

            Statements(stmts) => {
                let lowered = stmts
                    .iter()
                    .map(|s| self.lower(s))
                    .collect::<ConvertResult<Vec<_>>>()?;
                ast::begin(lowered)
            }

            IntegerNode { value, .. } => ast::s_loc(Tag::Int, vec![Value::Int(*value)], Location::simple(range)),
            FloatNode { value, .. } => ast::s_loc(Tag::Float, vec![Value::Float(*value)], Location::simple(range)),
            StringNode { value, .. } => {
                ast::s_loc(Tag::Str, vec![Value::Str(self.intern(value))], Location::simple(range))
            }
            SymbolNode { value, .. } => {
                ast::s_loc(Tag::Sym, vec![Value::Str(self.intern(value))], Location::simple(range))
            }

            InterpolatedStringNode { parts, .. } => {
                let lowered = self.lower_dstr_parts(parts)?;
                ast::s_loc(Tag::Dstr, lowered, Location::simple(range))
            }

            InterpolatedSymbolNode { parts, .. } => {
                // A single string part collapses to `sym`.
                if parts.len() == 1 {
                    if let ParseNode::StringNode { value, .. } = &parts[0] {
                        return Ok(ast::s_loc(
                            Tag::Sym,
                            vec![Value::Str(self.intern(value))],
                            Location::simple(range),
                        ));
                    }
                }
                let lowered = self.lower_dstr_parts(parts)?;
                ast::s_loc(Tag::Dstr, lowered, Location::simple(range))
            }

            NilNode { .. } => ast::s_loc(Tag::Nil, vec![], Location::simple(range)),
            TrueNode { .. } => ast::s_loc(Tag::True, vec![], Location::simple(range)),
            FalseNode { .. } => ast::s_loc(Tag::False, vec![], Location::simple(range)),
            SelfNode { .. } => ast::s_loc(Tag::SelfExpr, vec![], Location::simple(range)),
            SourceFileNode { .. } => ast::s_loc(Tag::FileConst, vec![], Location::simple(range)),

            ArrayNode { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|e| self.lower(e))
                    .collect::<ConvertResult<Vec<_>>>()?;
                ast::s_loc(Tag::Array, vec![Value::List(items)], Location::simple(range))
            }

            HashNode { elements, .. } => {
                let pairs = elements
                    .iter()
                    .map(|e| self.lower(e))
                    .collect::<ConvertResult<Vec<_>>>()?;
                ast::s_loc(Tag::Hash, vec![Value::List(pairs)], Location::simple(range))
            }

            AssocNode { key, value, .. } => {
                let k = self.lower(key)?;
                let v = self.lower(value)?;
                ast::s_loc(Tag::Pair, vec![Value::Node(k), Value::Node(v)], Location::simple(range))
            }

            RangeNode {
                left,
                right,
                exclusive,
                ..
            } => {
                let l = left.as_deref().map(|n| self.lower(n)).transpose()?;
                let r = right.as_deref().map(|n| self.lower(n)).transpose()?;
                let tag = if *exclusive { Tag::Erange } else { Tag::Irange };
                ast::s_loc(tag, vec![Value::from(l), Value::from(r)], Location::simple(range))
            }

            RegularExpressionNode { source, flags, .. } => {
                let part = ast::str_lit(self.intern(source));
                let opts = ast::s(Tag::Regopt, vec![Value::Str(self.intern(flags))]);
                ast::s_loc(Tag::Regexp, vec![Value::Node(part), Value::Node(opts)], Location::simple(range))
            }
            InterpolatedRegularExpressionNode { parts, flags, .. } => {
                let mut lowered = self.lower_dstr_parts(parts)?;
                lowered.push(Value::Node(ast::s(
                    Tag::Regopt,
                    vec![Value::Str(self.intern(flags))],
                )));
                ast::s_loc(Tag::Regexp, lowered, Location::simple(range))
            }

            XStringNode {
                opening,
                value,
                closing,
                ..
            } => ast::s_loc(
                Tag::Xstr,
                vec![Value::Str(self.intern(value))],
                Location::xstr(range, *opening, *closing),
            ),

            LocalVariableReadNode { name, .. } => {
                ast::s_loc(Tag::Lvar, vec![Value::Str(self.intern(name))], Location::simple(range))
            }
            LocalVariableWriteNode { name, value, .. } => {
                let v = self.lower(value)?;
                ast::s_loc(
                    Tag::Lvasgn,
                    vec![Value::Str(self.intern(name)), Value::Node(v)],
                    Location::simple(range),
                )
            }
            InstanceVariableReadNode { name, .. } => {
                ast::s_loc(Tag::Ivar, vec![Value::Str(self.intern(name))], Location::simple(range))
            }
            InstanceVariableWriteNode { name, value, .. } => {
                let v = self.lower(value)?;
                ast::s_loc(
                    Tag::Ivasgn,
                    vec![Value::Str(self.intern(name)), Value::Node(v)],
                    Location::simple(range),
                )
            }
            ClassVariableReadNode { name, .. } => {
                ast::s_loc(Tag::Cvar, vec![Value::Str(self.intern(name))], Location::simple(range))
            }
            ClassVariableWriteNode { name, value, .. } => {
                let v = self.lower(value)?;
                ast::s_loc(
                    Tag::Cvasgn,
                    vec![Value::Str(self.intern(name)), Value::Node(v)],
                    Location::simple(range),
                )
            }
            GlobalVariableReadNode { name, .. } => {
                ast::s_loc(Tag::Gvar, vec![Value::Str(self.intern(name))], Location::simple(range))
            }
            GlobalVariableWriteNode { name, value, .. } => {
                let v = self.lower(value)?;
                ast::s_loc(
                    Tag::Gvasgn,
                    vec![Value::Str(self.intern(name)), Value::Node(v)],
                    Location::simple(range),
                )
            }
            ConstantReadNode { name, .. } => {
                ast::s_loc(Tag::Const, vec![Value::Absent, Value::Str(self.intern(name))], Location::simple(range))
            }
            ConstantPathNode { parent, name, .. } => {
                let p = parent.as_deref().map(|n| self.lower(n)).transpose()?;
                ast::s_loc(
                    Tag::Const,
                    vec![Value::from(p), Value::Str(self.intern(name))],
                    Location::simple(range),
                )
            }
            ConstantWriteNode { name, value, .. } => {
                let v = self.lower(value)?;
                ast::s_loc(
                    Tag::Casgn,
                    vec![Value::Absent, Value::Str(self.intern(name)), Value::Node(v)],
                    Location::simple(range),
                )
            }

            CallNode {
                selector_end,
                receiver,
                name,
                args,
                block,
                safe_navigation,
                ..
            } => {
                let recv = receiver.as_deref().map(|n| self.lower(n)).transpose()?;
                let mut children = vec![Value::from(recv), Value::Str(self.intern(name))];
                for a in args {
                    children.push(Value::Node(self.lower(a)?));
                }
                let tag = if *safe_navigation { Tag::Csend } else { Tag::Send };
                let send_node = ast::s_loc(tag, children, Location::send(range, *selector_end));

                if let Some(block) = block {
                    return self.lower_block(block, send_node);
                }
                send_node
            }

            // A standalone BlockNode (reached when the visitor recurses into
            // one directly rather than via CallNode's `block` field) wraps
            // its own call subject; the call is data here, not something to
            // invoke.
            BlockNode { call, params, body, .. } => {
                let call_node = self.lower(call)?;
                self.lower_block_body(call_node, params, body, range)
            }

            NumberedParametersNode { .. } => {
                return Err(pos_err("numbered parameters must be lowered via BlockNode"));
            }

            BlockArgumentNode { expr, .. } => {
                let inner = expr.as_deref().map(|n| self.lower(n)).transpose()?;
                ast::s_loc(Tag::BlockPass, vec![Value::from(inner)], Location::simple(range))
            }
            SplatNode { expr, .. } => {
                let inner = expr.as_deref().map(|n| self.lower(n)).transpose()?;
                ast::s_loc(Tag::Splat, vec![Value::from(inner)], Location::simple(range))
            }
            SuperNode { args, block, .. } => {
                let lowered_args = args.iter().map(|a| self.lower(a)).collect::<ConvertResult<Vec<_>>>()?;
                let super_node = ast::s_loc(Tag::Super, vec![Value::List(lowered_args)], Location::simple(range));
                match block {
                    Some(b) => return self.lower_block(b, super_node),
                    None => super_node,
                }
            }
            ForwardingSuperNode { block, .. } => {
                let zsuper = ast::s_loc(Tag::Zsuper, vec![], Location::simple(range));
                match block {
                    Some(b) => return self.lower_block(b, zsuper),
                    None => zsuper,
                }
            }
            YieldNode { args, .. } => {
                let lowered_args = args.iter().map(|a| self.lower(a)).collect::<ConvertResult<Vec<_>>>()?;
                ast::s_loc(Tag::Yield, vec![Value::List(lowered_args)], Location::simple(range))
            }

            RequiredParameterNode { name, .. } => {
                ast::s_loc(Tag::Arg, vec![Value::Str(self.intern(name))], Location::simple(range))
            }
            OptionalParameterNode { name, default, .. } => {
                let d = self.lower(default)?;
                ast::s_loc(
                    Tag::Optarg,
                    vec![Value::Str(self.intern(name)), Value::Node(d)],
                    Location::simple(range),
                )
            }
            RestParameterNode { name, .. } => ast::s_loc(
                Tag::Restarg,
                vec![self.opt_name_value(name.as_deref())],
                Location::simple(range),
            ),
            RequiredKeywordParameterNode { name, .. } => {
                ast::s_loc(Tag::Kwarg, vec![Value::Str(self.intern(name))], Location::simple(range))
            }
            OptionalKeywordParameterNode { name, default, .. } => {
                let d = self.lower(default)?;
                ast::s_loc(
                    Tag::Kwoptarg,
                    vec![Value::Str(self.intern(name)), Value::Node(d)],
                    Location::simple(range),
                )
            }
            KeywordRestParameterNode { name, .. } => ast::s_loc(
                Tag::Kwrestarg,
                vec![self.opt_name_value(name.as_deref())],
                Location::simple(range),
            ),
            BlockParameterNode { name, .. } => ast::s_loc(
                Tag::Blockarg,
                vec![self.opt_name_value(name.as_deref())],
                Location::simple(range),
            ),
            BlockLocalVariableNode { name, .. } => {
                ast::s_loc(Tag::Shadowarg, vec![Value::Str(self.intern(name))], Location::simple(range))
            }
            ForwardingParameterNode { .. } => ast::s_loc(Tag::ForwardArgs, vec![], Location::simple(range)),
            ImplicitRestNode { .. } => return Ok(ast::s_loc(Tag::Restarg, vec![Value::Absent], Location::simple(range))),
            ParametersNode { params } => {
                let lowered = params.iter().map(|p| self.lower(p)).collect::<ConvertResult<Vec<_>>>()?;
                ast::begin(lowered)
            }

            DefNode {
                name_end,
                name,
                receiver,
                params,
                body,
                endless,
                ..
            } => {
                let recv = receiver.as_deref().map(|n| self.lower(n)).transpose()?;
                let lowered_params = params.iter().map(|p| self.lower(p)).collect::<ConvertResult<Vec<_>>>()?;
                let lowered_body = body
                    .as_deref()
                    .map(|n| self.lower(n))
                    .transpose()?
                    .unwrap_or_else(ast::nil);
                let loc = Location::def(range, *name_end, *endless);
                let tag = if recv.is_some() { Tag::Defs } else { Tag::Def };
                let mut children = vec![];
                if tag == Tag::Defs {
                    children.push(Value::from(recv));
                }
                children.push(Value::Str(self.intern(name)));
                children.push(Value::List(lowered_params));
                children.push(Value::Node(lowered_body));
                ast::s_loc(tag, children, loc)
            }

            ClassNode {
                name,
                superclass,
                body,
                ..
            } => {
                let name_node = ast::const_(None, self.intern(name));
                let super_node = superclass.as_deref().map(|n| self.lower(n)).transpose()?;
                let body_node = body
                    .as_deref()
                    .map(|n| self.lower(n))
                    .transpose()?
                    .unwrap_or_else(|| ast::begin(vec![]));
                ast::s_loc(
                    Tag::Class,
                    vec![Value::Node(name_node), Value::from(super_node), Value::Node(body_node)],
                    Location::simple(range),
                )
            }
            ModuleNode { name, body, .. } => {
                let name_node = ast::const_(None, self.intern(name));
                let body_node = body
                    .as_deref()
                    .map(|n| self.lower(n))
                    .transpose()?
                    .unwrap_or_else(|| ast::begin(vec![]));
                ast::s_loc(
                    Tag::Module,
                    vec![Value::Node(name_node), Value::Node(body_node)],
                    Location::simple(range),
                )
            }

            MultiWriteNode { targets, value, .. } => {
                let lowered_targets = targets.iter().map(|t| self.lower(t)).collect::<ConvertResult<Vec<_>>>()?;
                let mlhs = ast::s(Tag::Mlhs, vec![Value::List(lowered_targets)]);
                let v = self.lower(value)?;
                ast::s_loc(Tag::Masgn, vec![Value::Node(mlhs), Value::Node(v)], Location::simple(range))
            }
            MultiTargetNode { targets, .. } => {
                let lowered_targets = targets.iter().map(|t| self.lower(t)).collect::<ConvertResult<Vec<_>>>()?;
                ast::s_loc(Tag::Mlhs, vec![Value::List(lowered_targets)], Location::simple(range))
            }
            OperatorWriteNode {
                target,
                operator,
                value,
                ..
            } => {
                let t = self.lower(target)?;
                let v = self.lower(value)?;
                ast::s_loc(
                    Tag::OpAsgn,
                    vec![Value::Node(t), Value::Str(self.intern(operator)), Value::Node(v)],
                    Location::simple(range),
                )
            }
            OperatorAndWriteNode { target, value, .. } => {
                let t = self.lower(target)?;
                let v = self.lower(value)?;
                ast::s_loc(Tag::AndAsgn, vec![Value::Node(t), Value::Node(v)], Location::simple(range))
            }
            OperatorOrWriteNode { target, value, .. } => {
                let t = self.lower(target)?;
                let v = self.lower(value)?;
                ast::s_loc(Tag::OrAsgn, vec![Value::Node(t), Value::Node(v)], Location::simple(range))
            }

            IfNode {
                predicate,
                then,
                else_,
                ..
            }
            | UnlessNode {
                predicate,
                then,
                else_,
                ..
            } => {
                let is_unless = matches!(node, UnlessNode { .. });
                let (then, else_) = if is_unless { (else_, then) } else { (then, else_) };
                let p = self.lower(predicate)?;
                let t = then.as_deref().map(|n| self.lower(n)).transpose()?;
                let e = else_.as_deref().map(|n| self.lower(n)).transpose()?;
                ast::s_loc(
                    Tag::If,
                    vec![Value::Node(p), Value::from(t), Value::from(e)],
                    Location::simple(range),
                )
            }

            CaseNode {
                predicate,
                conditions,
                else_,
                ..
            } => {
                let p = predicate.as_deref().map(|n| self.lower(n)).transpose()?;
                let mut children = vec![Value::from(p)];
                for c in conditions {
                    children.push(Value::Node(self.lower(c)?));
                }
                let e = else_.as_deref().map(|n| self.lower(n)).transpose()?;
                children.push(Value::from(e));
                ast::s_loc(Tag::Case, children, Location::simple(range))
            }
            WhenNode { conditions, body, .. } => {
                let lowered_conditions = conditions.iter().map(|c| self.lower(c)).collect::<ConvertResult<Vec<_>>>()?;
                let b = body.as_deref().map(|n| self.lower(n)).transpose()?;
                ast::s_loc(
                    Tag::When,
                    vec![Value::List(lowered_conditions), Value::from(b)],
                    Location::simple(range),
                )
            }

            WhileNode {
                predicate,
                body,
                post,
                ..
            } => {
                let p = self.lower(predicate)?;
                let b = body.as_deref().map(|n| self.lower(n)).transpose()?.unwrap_or_else(|| ast::begin(vec![]));
                let tag = if *post { Tag::WhilePost } else { Tag::While };
                ast::s_loc(tag, vec![Value::Node(p), Value::Node(b)], Location::simple(range))
            }
            UntilNode {
                predicate,
                body,
                post,
                ..
            } => {
                let p = self.lower(predicate)?;
                let b = body.as_deref().map(|n| self.lower(n)).transpose()?.unwrap_or_else(|| ast::begin(vec![]));
                let tag = if *post { Tag::UntilPost } else { Tag::Until };
                ast::s_loc(tag, vec![Value::Node(p), Value::Node(b)], Location::simple(range))
            }
            ForNode {
                index,
                collection,
                body,
                ..
            } => {
                let i = self.lower(index)?;
                let c = self.lower(collection)?;
                let b = body.as_deref().map(|n| self.lower(n)).transpose()?.unwrap_or_else(|| ast::begin(vec![]));
                ast::s_loc(Tag::For, vec![Value::Node(i), Value::Node(c), Value::Node(b)], Location::simple(range))
            }

            BreakNode { args, .. } => {
                let lowered = args.iter().map(|a| self.lower(a)).collect::<ConvertResult<Vec<_>>>()?;
                ast::s_loc(Tag::Break, vec![Value::List(lowered)], Location::simple(range))
            }
            NextNode { args, .. } => {
                let lowered = args.iter().map(|a| self.lower(a)).collect::<ConvertResult<Vec<_>>>()?;
                ast::s_loc(Tag::Next, vec![Value::List(lowered)], Location::simple(range))
            }
            ReturnNode { args, .. } => {
                let lowered = args.iter().map(|a| self.lower(a)).collect::<ConvertResult<Vec<_>>>()?;
                ast::s_loc(Tag::Return, vec![Value::List(lowered)], Location::simple(range))
            }
            RedoNode { .. } => ast::s_loc(Tag::Redo, vec![], Location::simple(range)),
            RetryNode { .. } => ast::s_loc(Tag::Retry, vec![], Location::simple(range)),

            AndNode { left, right, .. } => {
                let l = self.lower(left)?;
                let r = self.lower(right)?;
                ast::s_loc(Tag::And, vec![Value::Node(l), Value::Node(r)], Location::simple(range))
            }
            OrNode { left, right, .. } => {
                let l = self.lower(left)?;
                let r = self.lower(right)?;
                ast::s_loc(Tag::Or, vec![Value::Node(l), Value::Node(r)], Location::simple(range))
            }

            BeginNode {
                body,
                rescues,
                else_,
                ensure,
                ..
            } => {
                let b = body
                    .as_deref()
                    .map(|n| self.lower(n))
                    .transpose()?
                    .unwrap_or_else(|| ast::begin(vec![]));
                if rescues.is_empty() && ensure.is_none() {
                    return Ok(ast::s_loc(Tag::Kwbegin, vec![Value::Node(b)], Location::simple(range)));
                }
                let mut inner = b;
                if !rescues.is_empty() {
                    let lowered_rescues = rescues.iter().map(|r| self.lower(r)).collect::<ConvertResult<Vec<_>>>()?;
                    let e = else_.as_deref().map(|n| self.lower(n)).transpose()?;
                    let mut children = vec![Value::Node(inner)];
                    children.extend(lowered_rescues.into_iter().map(Value::Node));
                    children.push(Value::from(e));
                    inner = ast::s(Tag::Rescue, children);
                }
                if let Some(ens) = ensure {
                    let e = self.lower(ens)?;
                    inner = ast::s(Tag::Ensure, vec![Value::Node(inner), Value::Node(e)]);
                }
                ast::s_loc(Tag::Kwbegin, vec![Value::Node(inner)], Location::simple(range))
            }
            RescueNode {
                exceptions,
                reference,
                body,
                ..
            } => {
                let lowered_exc = exceptions.iter().map(|e| self.lower(e)).collect::<ConvertResult<Vec<_>>>()?;
                let r = reference.as_deref().map(|n| self.lower(n)).transpose()?;
                let b = body.as_deref().map(|n| self.lower(n)).transpose()?.unwrap_or_else(|| ast::begin(vec![]));
                ast::s_loc(
                    Tag::Resbody,
                    vec![Value::List(lowered_exc), Value::from(r), Value::Node(b)],
                    Location::simple(range),
                )
            }
        })
    }

    fn lower_dstr_parts(&self, parts: &[ParseNode]) -> ConvertResult<Vec<Value>> {
        let mut out = Vec::with_capacity(parts.len());
        for p in parts {
            if let ParseNode::StringNode { value, .. } = p {
                // Heredoc-with-multiline split: keep the newline on the
                // preceding part so joining the pieces reproduces the text.
                for piece in split_keep_newlines(value) {
                    out.push(Value::Node(ast::str_lit(self.intern(&piece))));
                }
            } else {
                out.push(Value::Node(self.lower(p)?));
            }
        }
        Ok(out)
    }

    fn lower_block(&self, block: &ParseNode, call: Node) -> ConvertResult<Node> {
        match block {
            ParseNode::BlockNode { range, params, body, .. } => {
                Ok(self.lower_block_body(call, params, body, *range))
            }
            other => self.lower(other),
        }
    }

    fn lower_block_body(
        &self,
        call: Node,
        params: &[ParseNode],
        body: &ParseNode,
        range: crate::span::TextRange,
    ) -> Node {
        let numbered = params
            .iter()
            .find_map(|p| match p {
                ParseNode::NumberedParametersNode { max } => Some(*max),
                _ => None,
            });

        let body_node = self.lower(body).unwrap_or_else(|_| ast::begin(vec![]));

        if let Some(max) = numbered {
            return ast::s_loc(
                Tag::Numblock,
                vec![Value::Node(call), Value::Int(max as i64), Value::Node(body_node)],
                Location::simple(range),
            );
        }

        let lowered_params = params
            .iter()
            .filter(|p| !matches!(p, ParseNode::NumberedParametersNode { .. }))
            .map(|p| self.lower(p).unwrap_or_else(|_| ast::begin(vec![])))
            .collect::<Vec<_>>();
        ast::s_loc(
            Tag::Block,
            vec![
                Value::Node(call),
                Value::List(lowered_params),
                Value::Node(body_node),
            ],
            Location::simple(range),
        )
    }

    pub fn eslevel(&self) -> u32 {
        self.opts.eslevel
    }
}

/// Splits a heredoc-ish string value on embedded newlines, keeping the
/// newline character attached to the piece that precedes it — so joining
/// the pieces back together reproduces the original text exactly.
fn split_keep_newlines(value: &str) -> Vec<String> {
    if !value.contains('\n') {
        return vec![value.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in value.chars() {
        current.push(ch);
        if ch == '\n' {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
