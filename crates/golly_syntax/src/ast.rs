//! Typed syntax tree handed over by the front end.
//!
//! Every name in this tree is already resolved: references to package-level declarations are [`Ref`]s, locals are
//! plain names, and every call knows exactly what it calls ([`Callee`]). Expressions carry their static [`Type`].
//! The compiler core never mutates this tree.

use std::fmt;

use golly_core::lang::conventions;
use serde::{Deserialize, Serialize};

use crate::types::{Signature, Type};

/// Source position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Reference to a package-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ref {
    pub package: String,
    pub name: String,
}

impl Ref {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> String {
        conventions::definition_id(&self.package, &self.name)
    }
}

/// Reference to a method declared on a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub package: String,
    pub recv: String,
    pub name: String,
}

impl MethodRef {
    pub fn new(package: impl Into<String>, recv: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            recv: recv.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> String {
        conventions::method_id(&self.package, &self.recv, &self.name)
    }
}

// ============================================================================
// Packages and declarations
// ============================================================================

/// One compiled package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Import path, e.g. `github.com/acme/shapes`.
    pub path: String,
    /// Declared package name, e.g. `shapes` or `main`.
    pub name: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

/// Top-level declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeDecl),
    Var(VarDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    /// Receiver binding name; `None` for `func (*T) M()`.
    #[serde(default)]
    pub name: Option<String>,
    /// Name of the receiver's base type, declared in the same package.
    pub type_name: String,
    #[serde(default)]
    pub pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub recv: Option<Receiver>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub results: Vec<Type>,
    /// The last parameter is `...T`.
    #[serde(default)]
    pub variadic: bool,
    /// `None` for declarations without a body (assembly stubs, externally linked functions).
    #[serde(default)]
    pub body: Option<Block>,
    #[serde(default)]
    pub pos: Pos,
}

impl FuncDecl {
    pub fn signature(&self) -> Signature {
        Signature {
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            results: self.results.clone(),
            variadic: self.variadic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSpec {
    Struct {
        #[serde(default)]
        fields: Vec<Field>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<crate::types::MethodSig>,
    },
    /// `type Celsius float64` and friends.
    Named(Type),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    pub spec: TypeSpec,
    #[serde(default)]
    pub pos: Pos,
}

/// A package-level `var` or `const`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub constant: bool,
    pub ty: Type,
    #[serde(default)]
    pub value: Option<Expr>,
    #[serde(default)]
    pub pos: Pos,
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Func(f) => &f.name,
            Decl::Type(t) => &t.name,
            Decl::Var(v) => &v.name,
        }
    }

    pub fn pos(&self) -> &Pos {
        match self {
            Decl::Func(f) => &f.pos,
            Decl::Type(t) => &t.pos,
            Decl::Var(v) => &v.pos,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Decl::Func(f) => f.doc.as_deref(),
            Decl::Type(t) => t.doc.as_deref(),
            Decl::Var(v) => v.doc.as_deref(),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Expr(Expr),
    /// `a, b := x, y` (or `a, b := f()` with a single multi-valued call).
    Define { names: Vec<String>, values: Vec<Expr> },
    /// `var x T = value`
    Var {
        name: String,
        ty: Type,
        #[serde(default)]
        value: Option<Expr>,
    },
    Assign {
        targets: Vec<Expr>,
        op: AssignOp,
        values: Vec<Expr>,
    },
    IncDec { target: Expr, inc: bool },
    Return(Vec<Expr>),
    If {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        /// Either another `If` or a `Block`.
        #[serde(default)]
        otherwise: Option<Box<Stmt>>,
    },
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        value: Option<String>,
        expr: Expr,
        body: Block,
    },
    Block(Block),
    Break,
    Continue,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub ty: Type,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    pub fn local(name: impl Into<String>, ty: Type) -> Self {
        Self::new(ExprKind::Local(name.into()), ty)
    }

    pub fn global(package: impl Into<String>, name: impl Into<String>, ty: Type) -> Self {
        Self::new(ExprKind::Global(Ref::new(package, name)), ty)
    }

    pub fn lit(lit: Lit, ty: Type) -> Self {
        Self::new(ExprKind::Lit(lit), ty)
    }

    pub fn call(callee: Callee, args: Vec<Expr>, ty: Type) -> Self {
        Self::new(
            ExprKind::Call(Call {
                callee,
                args,
                pos: Pos::default(),
            }),
            ty,
        )
    }

    pub fn field(base: Expr, name: impl Into<String>, ty: Type) -> Self {
        Self::new(
            ExprKind::Field {
                base: Box::new(base),
                name: name.into(),
            },
            ty,
        )
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lit {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    AndNot,
    Shl,
    Shr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

impl FieldInit {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// What a call invokes, as resolved by the type checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// Package-level function.
    Func(Ref),
    /// Method on a concrete receiver.
    Method { recv: Box<Expr>, method: MethodRef },
    /// Method on an interface-typed receiver; dispatch target unknown statically.
    Interface {
        recv: Box<Expr>,
        interface: Ref,
        name: String,
    },
    /// `len`, `append`, `println`, ...
    Builtin(String),
    /// Call through a function value.
    Value(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub callee: Callee,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Lit(Lit),
    /// Parameter, receiver or local variable.
    Local(String),
    /// Package-level function, variable or constant.
    Global(Ref),
    Field { base: Box<Expr>, name: String },
    Index { base: Box<Expr>, index: Box<Expr> },
    Call(Call),
    Unary { op: UnaryOp, expr: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    /// `T{A: x}` for a named struct `T`.
    Composite {
        ty: Ref,
        #[serde(default)]
        fields: Vec<FieldInit>,
    },
    SliceLit(Vec<Expr>),
    FuncLit {
        #[serde(default)]
        params: Vec<Param>,
        #[serde(default)]
        results: Vec<Type>,
        #[serde(default)]
        variadic: bool,
        body: Block,
    },
    AddrOf(Box<Expr>),
    Deref(Box<Expr>),
}
