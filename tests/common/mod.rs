//! Forest builders shared by the integration tests.
//!
//! The front end is external, so tests describe Go programs directly as typed syntax trees. Each builder mirrors one
//! Go construct; the doc comment on a program builder shows the Go source it stands for.

#![allow(dead_code)]

use golly::{CompileOptions, CompileOutput, Compiler, OutputMode};
use golly_syntax::TypedForest;
use golly_syntax::ast::{
    Block, Call, Callee, Decl, Expr, ExprKind, Field, FieldInit, FuncDecl, Lit, MethodRef, Package, Param, Pos,
    Receiver, Ref, Stmt, TypeDecl, TypeSpec,
};
use golly_syntax::types::{Basic, MethodSig, Signature, Type};

pub const APP: &str = "app";
pub const DOM: &str = "dom";
pub const JS: &str = "golly/js";

pub fn int() -> Type {
    Type::Basic(Basic::Int)
}

pub fn float() -> Type {
    Type::Basic(Basic::Float64)
}

pub fn string() -> Type {
    Type::Basic(Basic::String)
}

pub fn package(path: &str, name: &str, imports: &[&str], decls: Vec<Decl>) -> Package {
    Package {
        path: path.into(),
        name: name.into(),
        imports: imports.iter().map(|s| s.to_string()).collect(),
        decls,
    }
}

pub fn func(name: &str, params: Vec<Param>, results: Vec<Type>, stmts: Vec<Stmt>) -> FuncDecl {
    FuncDecl {
        name: name.into(),
        doc: None,
        recv: None,
        params,
        results,
        variadic: false,
        body: Some(Block::new(stmts)),
        pos: Pos::default(),
    }
}

pub fn method(recv: &str, recv_name: &str, pointer: bool, decl: FuncDecl) -> FuncDecl {
    FuncDecl {
        recv: Some(Receiver {
            name: Some(recv_name.into()),
            type_name: recv.into(),
            pointer,
        }),
        ..decl
    }
}

pub fn documented(doc: &str, decl: Decl) -> Decl {
    match decl {
        Decl::Func(f) => Decl::Func(FuncDecl {
            doc: Some(doc.into()),
            ..f
        }),
        Decl::Type(t) => Decl::Type(TypeDecl {
            doc: Some(doc.into()),
            ..t
        }),
        Decl::Var(mut v) => {
            v.doc = Some(doc.into());
            Decl::Var(v)
        }
    }
}

pub fn struct_type(name: &str, fields: &[(&str, Type)]) -> Decl {
    Decl::Type(TypeDecl {
        name: name.into(),
        doc: None,
        spec: TypeSpec::Struct {
            fields: fields.iter().map(|(n, t)| Field::new(*n, t.clone())).collect(),
        },
        pos: Pos::default(),
    })
}

/// `type <name> <underlying>`
pub fn named_type(name: &str, underlying: Type) -> Decl {
    Decl::Type(TypeDecl {
        name: name.into(),
        doc: None,
        spec: TypeSpec::Named(underlying),
        pos: Pos::default(),
    })
}

pub fn interface(name: &str, methods: &[(&str, Signature)]) -> Decl {
    Decl::Type(TypeDecl {
        name: name.into(),
        doc: None,
        spec: TypeSpec::Interface {
            methods: methods.iter().map(|(n, s)| MethodSig::new(*n, s.clone())).collect(),
        },
        pos: Pos::default(),
    })
}

pub fn local(name: &str, ty: Type) -> Expr {
    Expr::local(name, ty)
}

pub fn int_lit(v: i64) -> Expr {
    Expr::lit(Lit::Int(v), int())
}

pub fn str_lit(s: &str) -> Expr {
    Expr::lit(Lit::Str(s.into()), string())
}

pub fn call_at(callee: Callee, args: Vec<Expr>, ty: Type, pos: Pos) -> Expr {
    Expr::new(ExprKind::Call(Call { callee, args, pos }), ty)
}

pub fn call(package: &str, name: &str, args: Vec<Expr>, ty: Type) -> Expr {
    Expr::call(Callee::Func(Ref::new(package, name)), args, ty)
}

pub fn method_call(recv: Expr, package: &str, recv_type: &str, name: &str, args: Vec<Expr>, ty: Type) -> Expr {
    Expr::call(
        Callee::Method {
            recv: Box::new(recv),
            method: MethodRef::new(package, recv_type, name),
        },
        args,
        ty,
    )
}

pub fn interface_call(recv: Expr, package: &str, iface: &str, name: &str, ty: Type) -> Expr {
    call_at(
        Callee::Interface {
            recv: Box::new(recv),
            interface: Ref::new(package, iface),
            name: name.into(),
        },
        vec![],
        ty,
        Pos::new("main.go", 20, 9),
    )
}

pub fn println(args: Vec<Expr>) -> Stmt {
    Stmt::Expr(Expr::call(Callee::Builtin("println".into()), args, Type::default()))
}

pub fn composite(package: &str, name: &str, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::new(
        ExprKind::Composite {
            ty: Ref::new(package, name),
            fields: fields.into_iter().map(|(n, v)| FieldInit::new(n, v)).collect(),
        },
        Type::named(package, name),
    )
}

pub fn define(name: &str, value: Expr) -> Stmt {
    Stmt::Define {
        names: vec![name.into()],
        values: vec![value],
    }
}

/// `js.Rewrite(template, args...)` as the first statement of an intrinsic.
pub fn rewrite(template: &str, args: Vec<Expr>) -> Stmt {
    let mut all = vec![str_lit(template)];
    all.extend(args);
    Stmt::Expr(call(JS, "Rewrite", all, Type::default()))
}

/// `js.Raw(template, args...)`
pub fn raw(template: &str, args: Vec<Expr>) -> Stmt {
    let mut all = vec![str_lit(template)];
    all.extend(args);
    Stmt::Expr(call(JS, "Raw", all, Type::default()))
}

fn area_sig() -> Signature {
    Signature::new(vec![], vec![float()])
}

/// ```go
/// package main
///
/// type Shape interface{ Area() float64 }
///
/// type Circle struct{ R float64 }
/// func (c Circle) Area() float64 { return c.R * c.R * 3.14 }
///
/// type Square struct{ S float64 }
/// func (s *Square) Area() float64 { return s.S * s.S }
///
/// func describe(s Shape) float64 { return s.Area() }
///
/// func main() {
///     c := Circle{R: 2}
///     println(describe(c))
///     sq := &Square{S: 3}
///     println(describe(sq))
/// }
/// ```
pub fn shapes_program() -> TypedForest {
    let circle = Type::named(APP, "Circle");
    let square = Type::pointer(Type::named(APP, "Square"));
    let field = |recv: &str, ty: &Type, name: &str| Expr::field(local(recv, ty.clone()), name, float());
    let mul = |l: Expr, r: Expr| Expr::binary(golly_syntax::ast::BinaryOp::Mul, l, r, float());

    TypedForest::new(vec![package(
        APP,
        "main",
        &[],
        vec![
            interface("Shape", &[("Area", area_sig())]),
            struct_type("Circle", &[("R", float())]),
            Decl::Func(method(
                "Circle",
                "c",
                false,
                func(
                    "Area",
                    vec![],
                    vec![float()],
                    vec![Stmt::Return(vec![mul(
                        mul(field("c", &circle, "R"), field("c", &circle, "R")),
                        Expr::lit(Lit::Float(3.14), float()),
                    )])],
                ),
            )),
            struct_type("Square", &[("S", float())]),
            Decl::Func(method(
                "Square",
                "s",
                true,
                func(
                    "Area",
                    vec![],
                    vec![float()],
                    vec![Stmt::Return(vec![mul(field("s", &square, "S"), field("s", &square, "S"))])],
                ),
            )),
            Decl::Func(func(
                "describe",
                vec![Param::new("s", Type::named(APP, "Shape"))],
                vec![float()],
                vec![Stmt::Return(vec![interface_call(
                    local("s", Type::named(APP, "Shape")),
                    APP,
                    "Shape",
                    "Area",
                    float(),
                )])],
            )),
            Decl::Func(func(
                "main",
                vec![],
                vec![],
                vec![
                    define("c", composite(APP, "Circle", vec![("R", int_lit(2))])),
                    println(vec![call(APP, "describe", vec![local("c", circle.clone())], float())]),
                    define(
                        "sq",
                        Expr::new(
                            ExprKind::AddrOf(Box::new(composite(APP, "Square", vec![("S", int_lit(3))]))),
                            square.clone(),
                        ),
                    ),
                    println(vec![call(APP, "describe", vec![local("sq", square.clone())], float())]),
                ],
            )),
        ],
    )])
}

/// ```go
/// package dom
///
/// // js:"WebKitPoint,omit"
/// type WebKitPoint struct{ X float64 }
///
/// func NewPoint() *WebKitPoint { js.Rewrite("new WebKitPoint()") }
/// func (p *WebKitPoint) SetX(x float64) { js.Rewrite("$_.x = $1", x) }
///
/// package main
///
/// func main() {
///     pt := dom.NewPoint()
///     pt.SetX(5)
/// }
/// ```
pub fn dom_program() -> TypedForest {
    let point = Type::pointer(Type::named(DOM, "WebKitPoint"));
    TypedForest::new(vec![
        package(
            DOM,
            "dom",
            &[JS],
            vec![
                documented(
                    "WebKitPoint binds the browser type.\njs:\"WebKitPoint,omit\"",
                    struct_type("WebKitPoint", &[("X", float())]),
                ),
                Decl::Func(func("NewPoint", vec![], vec![point.clone()], vec![rewrite("new WebKitPoint()", vec![])])),
                Decl::Func(method(
                    "WebKitPoint",
                    "p",
                    true,
                    func(
                        "SetX",
                        vec![Param::new("x", float())],
                        vec![],
                        vec![rewrite("$_.x = $1", vec![local("x", float())])],
                    ),
                )),
            ],
        ),
        package(
            APP,
            "main",
            &[DOM],
            vec![Decl::Func(func(
                "main",
                vec![],
                vec![],
                vec![
                    define("pt", call(DOM, "NewPoint", vec![], point.clone())),
                    Stmt::Expr(method_call(
                        local("pt", point),
                        DOM,
                        "WebKitPoint",
                        "SetX",
                        vec![int_lit(5)],
                        Type::default(),
                    )),
                ],
            ))],
        ),
    ])
}

/// Compile `packages` of `forest` with default options.
pub fn compile(forest: TypedForest, packages: &[&str]) -> Result<CompileOutput, golly::CompileError> {
    compile_with(forest, packages, CompileOptions::default())
}

pub fn compile_with(
    forest: TypedForest,
    packages: &[&str],
    options: CompileOptions,
) -> Result<CompileOutput, golly::CompileError> {
    let packages: Vec<String> = packages.iter().map(|s| s.to_string()).collect();
    Compiler::new(forest).with_options(options).compile(&packages)
}

pub fn per_package() -> CompileOptions {
    CompileOptions::default().with_mode(OutputMode::PerPackage)
}
