//! The closed set of normalized AST node kinds (spec.md §3).
//!
//! The original implementation tags nodes with a string and dispatches via
//! `on_<tag>` methods found by name. A statically typed target loses nothing
//! by making the tag set a real `enum`: dispatch becomes a `match`, and the
//! compiler checks exhaustiveness whenever a new tag is added (spec.md §9).

/// A normalized AST node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    // Literals
    Int,
    Float,
    Str,
    Sym,
    Dstr,
    Array,
    Hash,
    Pair,
    Nil,
    True,
    False,
    SelfExpr,
    FileConst,
    Irange,
    Erange,

    // Variables
    Lvar,
    Lvasgn,
    Ivar,
    Ivasgn,
    Cvar,
    Cvasgn,
    Gvar,
    Gvasgn,
    Const,
    Casgn,

    // Calls
    Send,
    Csend,
    Attr,
    Call,
    Await,
    Sendw,
    Super,
    Zsuper,
    Yield,

    // Blocks
    Block,
    Numblock,
    BlockPass,

    // Parameters
    Arg,
    Optarg,
    Restarg,
    Kwarg,
    Kwoptarg,
    Kwrestarg,
    Blockarg,
    ForwardArgs,
    Shadowarg,

    // Methods
    Def,
    Defs,
    Defm,
    Deff,
    Defp,
    Async,
    Asyncs,
    Constructor,
    Method,
    Prop,
    Autoreturn,
    Autobind,
    Setter,
    PrivateMethod,
    Hide,

    // Classes & modules
    Class,
    ClassHash,
    ClassExtend,
    ClassModule,
    Class2,
    Module,
    ModuleHash,
    DefineProps,
    Prototype,

    // Control flow
    If,
    Case,
    When,
    CaseMatch,
    InPattern,
    While,
    Until,
    For,
    ForOf,
    WhilePost,
    UntilPost,
    Break,
    Next,
    Return,
    Redo,
    Retry,

    // Boolean / assignment operators
    And,
    Or,
    Not,
    Nullish,
    NullishOr,
    LogicalOr,
    OpAsgn,
    OrAsgn,
    AndAsgn,
    NullishAsgn,
    LogicalAsgn,

    // Exception handling
    Begin,
    Kwbegin,
    Rescue,
    Resbody,
    Ensure,

    // Regexp
    Regexp,
    Regopt,

    // Host interop
    Xstr,
    Xnode,
    Taglit,

    // Splat / multiple assignment
    Splat,
    Kwsplat,
    Masgn,
    Mlhs,

    // Pattern matching
    MatchPattern,
    MatchVar,
    ArrayPattern,
    HashPattern,
    FindPattern,
    Pin,

    // Prepend-list / module-system
    Import,
}

impl Tag {
    /// True for tags the lowering visitor never produces directly but the
    /// filter pipeline or converter synthesizes (e.g. wrapping a body in
    /// `autoreturn`, or rewriting a method into `class2`-style `method`).
    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            Tag::Autoreturn
                | Tag::Autobind
                | Tag::Setter
                | Tag::PrivateMethod
                | Tag::Hide
                | Tag::DefineProps
                | Tag::Prototype
                | Tag::Class2
                | Tag::ClassHash
                | Tag::ClassModule
                | Tag::ClassExtend
                | Tag::ModuleHash
                | Tag::Constructor
                | Tag::Method
                | Tag::Prop
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Int => "int",
            Tag::Float => "float",
            Tag::Str => "str",
            Tag::Sym => "sym",
            Tag::Dstr => "dstr",
            Tag::Array => "array",
            Tag::Hash => "hash",
            Tag::Pair => "pair",
            Tag::Nil => "nil",
            Tag::True => "true",
            Tag::False => "false",
            Tag::SelfExpr => "self",
            Tag::FileConst => "__FILE__",
            Tag::Irange => "irange",
            Tag::Erange => "erange",
            Tag::Lvar => "lvar",
            Tag::Lvasgn => "lvasgn",
            Tag::Ivar => "ivar",
            Tag::Ivasgn => "ivasgn",
            Tag::Cvar => "cvar",
            Tag::Cvasgn => "cvasgn",
            Tag::Gvar => "gvar",
            Tag::Gvasgn => "gvasgn",
            Tag::Const => "const",
            Tag::Casgn => "casgn",
            Tag::Send => "send",
            Tag::Csend => "csend",
            Tag::Attr => "attr",
            Tag::Call => "call",
            Tag::Await => "await",
            Tag::Sendw => "sendw",
            Tag::Super => "super",
            Tag::Zsuper => "zsuper",
            Tag::Yield => "yield",
            Tag::Block => "block",
            Tag::Numblock => "numblock",
            Tag::BlockPass => "block_pass",
            Tag::Arg => "arg",
            Tag::Optarg => "optarg",
            Tag::Restarg => "restarg",
            Tag::Kwarg => "kwarg",
            Tag::Kwoptarg => "kwoptarg",
            Tag::Kwrestarg => "kwrestarg",
            Tag::Blockarg => "blockarg",
            Tag::ForwardArgs => "forward_args",
            Tag::Shadowarg => "shadowarg",
            Tag::Def => "def",
            Tag::Defs => "defs",
            Tag::Defm => "defm",
            Tag::Deff => "deff",
            Tag::Defp => "defp",
            Tag::Async => "async",
            Tag::Asyncs => "asyncs",
            Tag::Constructor => "constructor",
            Tag::Method => "method",
            Tag::Prop => "prop",
            Tag::Autoreturn => "autoreturn",
            Tag::Autobind => "autobind",
            Tag::Setter => "setter",
            Tag::PrivateMethod => "private_method",
            Tag::Hide => "hide",
            Tag::Class => "class",
            Tag::ClassHash => "class_hash",
            Tag::ClassExtend => "class_extend",
            Tag::ClassModule => "class_module",
            Tag::Class2 => "class2",
            Tag::Module => "module",
            Tag::ModuleHash => "module_hash",
            Tag::DefineProps => "defineProps",
            Tag::Prototype => "prototype",
            Tag::If => "if",
            Tag::Case => "case",
            Tag::When => "when",
            Tag::CaseMatch => "case_match",
            Tag::InPattern => "in_pattern",
            Tag::While => "while",
            Tag::Until => "until",
            Tag::For => "for",
            Tag::ForOf => "for_of",
            Tag::WhilePost => "while_post",
            Tag::UntilPost => "until_post",
            Tag::Break => "break",
            Tag::Next => "next",
            Tag::Return => "return",
            Tag::Redo => "redo",
            Tag::Retry => "retry",
            Tag::And => "and",
            Tag::Or => "or",
            Tag::Not => "not",
            Tag::Nullish => "nullish",
            Tag::NullishOr => "nullish_or",
            Tag::LogicalOr => "logical_or",
            Tag::OpAsgn => "op_asgn",
            Tag::OrAsgn => "or_asgn",
            Tag::AndAsgn => "and_asgn",
            Tag::NullishAsgn => "nullish_asgn",
            Tag::LogicalAsgn => "logical_asgn",
            Tag::Begin => "begin",
            Tag::Kwbegin => "kwbegin",
            Tag::Rescue => "rescue",
            Tag::Resbody => "resbody",
            Tag::Ensure => "ensure",
            Tag::Regexp => "regexp",
            Tag::Regopt => "regopt",
            Tag::Xstr => "xstr",
            Tag::Xnode => "xnode",
            Tag::Taglit => "taglit",
            Tag::Splat => "splat",
            Tag::Kwsplat => "kwsplat",
            Tag::Masgn => "masgn",
            Tag::Mlhs => "mlhs",
            Tag::MatchPattern => "match_pattern",
            Tag::MatchVar => "match_var",
            Tag::ArrayPattern => "array_pattern",
            Tag::HashPattern => "hash_pattern",
            Tag::FindPattern => "find_pattern",
            Tag::Pin => "pin",
            Tag::Import => "import",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
