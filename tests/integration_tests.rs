//! End-to-end compiles: typed forest in, JavaScript artifacts out.

mod common;

use common::*;
use golly::driver::StageError;
use golly::{
    AnalyzeError, CancellationToken, CompileError, CompileOptions, Compiler, EmitError, EntryPoints, FrontEnd,
    FrontEndError, IndexError, LoadedPackages, Stage,
};
use golly_syntax::TypedForest;
use golly_syntax::ast::{AssignOp, BinaryOp, Block, Decl, Expr, ExprKind, Lit, Param, Stmt};
use golly_syntax::types::{Basic, Signature, Type};

fn bool_ty() -> Type {
    Type::Basic(Basic::Bool)
}

/// ```go
/// package util
/// func Double(x int) int { return x * 2 }
///
/// package main
/// func main() { println(util.Double(21)) }
/// ```
fn util_program() -> TypedForest {
    TypedForest::new(vec![
        package(
            "util",
            "util",
            &[],
            vec![Decl::Func(func(
                "Double",
                vec![Param::new("x", int())],
                vec![int()],
                vec![Stmt::Return(vec![Expr::binary(
                    BinaryOp::Mul,
                    local("x", int()),
                    int_lit(2),
                    int(),
                )])],
            ))],
        ),
        package(
            APP,
            "main",
            &["util"],
            vec![Decl::Func(func(
                "main",
                vec![],
                vec![],
                vec![println(vec![call("util", "Double", vec![int_lit(21)], int())])],
            ))],
        ),
    ])
}

#[test]
fn shapes_resolve_both_implementations_and_dispatch_on_the_prototype() {
    let output = compile(shapes_program(), &[APP]).unwrap();
    assert_eq!(output.artifacts.len(), 1);
    let artifact = &output.artifacts[0];
    assert_eq!(artifact.name, APP);
    insta::assert_snapshot!(artifact.source, @r#"
    // Code generated by golly. DO NOT EDIT.
    (function() {
      class app$Circle {
        constructor(o = {}) {
          this.R = o.R || 0;
        }
      }

      class app$Square {
        constructor(o = {}) {
          this.S = o.S || 0;
        }
      }

      app$Circle.prototype.Area = function() {
        const c = this;
        return c.R * c.R * 3.14;
      };

      app$Square.prototype.Area = function() {
        const s = this;
        return s.S * s.S;
      };

      function app$describe(s) {
        return s.Area();
      }

      function app$main() {
        let c = new app$Circle({ R: 2 });
        console.log(app$describe(c));
        let sq = new app$Square({ S: 3 });
        console.log(app$describe(sq));
      }

      app$main();
    })();
    "#);
}

#[test]
fn call_templates_substitute_receiver_and_arguments() {
    let output = compile(dom_program(), &[APP]).unwrap();
    insta::assert_snapshot!(output.artifacts[0].source, @r#"
    // Code generated by golly. DO NOT EDIT.
    (function() {
      function app$main() {
        let pt = new WebKitPoint();
        pt.x = 5;
      }

      app$main();
    })();
    "#);
}

#[test]
fn omitted_definitions_never_appear_even_when_reachable() {
    let output = compile(dom_program(), &[APP]).unwrap();
    let source = &output.artifacts[0].source;
    assert!(!source.contains("class"));
    assert!(!source.contains("dom$WebKitPoint"));
    assert!(!source.contains("prototype"));
}

#[test]
fn statements_translate_to_javascript_control_flow() {
    let pair = Type::Tuple(vec![int(), int()]);
    let divmod = func(
        "divmod",
        vec![Param::new("a", int()), Param::new("b", int())],
        vec![int(), int()],
        vec![Stmt::Return(vec![
            Expr::binary(BinaryOp::Div, local("a", int()), local("b", int()), int()),
            Expr::binary(BinaryOp::Rem, local("a", int()), local("b", int()), int()),
        ])],
    );
    let slice = Type::slice(int());
    let main = func(
        "main",
        vec![],
        vec![],
        vec![
            Stmt::Define {
                names: vec!["q".into(), "r".into()],
                values: vec![call(APP, "divmod", vec![int_lit(7), int_lit(2)], pair)],
            },
            define("total", int_lit(0)),
            Stmt::For {
                init: Some(Box::new(define("i", int_lit(0)))),
                cond: Some(Expr::binary(BinaryOp::Lt, local("i", int()), local("q", int()), bool_ty())),
                post: Some(Box::new(Stmt::IncDec {
                    target: local("i", int()),
                    inc: true,
                })),
                body: Block::new(vec![Stmt::Assign {
                    targets: vec![local("total", int())],
                    op: AssignOp::Add,
                    values: vec![local("i", int())],
                }]),
            },
            Stmt::If {
                init: None,
                cond: Expr::binary(BinaryOp::Eq, local("r", int()), int_lit(1), bool_ty()),
                then: Block::new(vec![println(vec![str_lit("odd")])]),
                otherwise: Some(Box::new(Stmt::If {
                    init: None,
                    cond: Expr::binary(BinaryOp::Eq, local("r", int()), int_lit(0), bool_ty()),
                    then: Block::new(vec![println(vec![str_lit("even")])]),
                    otherwise: Some(Box::new(Stmt::Block(Block::new(vec![println(vec![local("r", int())])])))),
                })),
            },
            define("xs", Expr::new(ExprKind::SliceLit(vec![int_lit(1), int_lit(2)]), slice.clone())),
            Stmt::Range {
                key: Some("_".into()),
                value: Some("x".into()),
                expr: local("xs", slice),
                body: Block::new(vec![Stmt::Assign {
                    targets: vec![local("total", int())],
                    op: AssignOp::Sub,
                    values: vec![local("x", int())],
                }]),
            },
            println(vec![local("total", int())]),
        ],
    );
    let forest = TypedForest::new(vec![package(APP, "main", &[], vec![Decl::Func(divmod), Decl::Func(main)])]);

    let output = compile(forest, &[APP]).unwrap();
    insta::assert_snapshot!(output.artifacts[0].source, @r#"
    // Code generated by golly. DO NOT EDIT.
    (function() {
      function app$divmod(a, b) {
        return [Math.trunc(a / b), a % b];
      }

      function app$main() {
        let [q, r] = app$divmod(7, 2);
        let total = 0;
        for (let i = 0; i < q; i++) {
          total += i;
        }
        if (r === 1) {
          console.log("odd");
        } else if (r === 0) {
          console.log("even");
        } else {
          console.log(r);
        }
        let xs = [1, 2];
        for (const x of xs) {
          total -= x;
        }
        console.log(total);
      }

      app$main();
    })();
    "#);
}

#[test]
fn template_arity_errors_name_the_declaration() {
    let forest = TypedForest::new(vec![package(
        APP,
        "main",
        &[JS],
        vec![
            Decl::Func(func(
                "Add",
                vec![Param::new("a", int())],
                vec![int()],
                vec![rewrite("$1 + $2", vec![local("a", int())])],
            )),
            Decl::Func(func(
                "main",
                vec![],
                vec![],
                vec![println(vec![call(APP, "Add", vec![int_lit(1)], int())])],
            )),
        ],
    )]);

    let err = compile(forest, &[APP]).unwrap_err();
    assert_eq!(err.stage(), Stage::Emit);
    match err {
        CompileError::Stage {
            source: StageError::Emit(EmitError::TemplateArity { id, index, supplied, .. }),
            ..
        } => assert_eq!((id.as_str(), index, supplied), ("app Add", 2, 1)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn interface_calls_without_implementations_are_reported() {
    let shape = Type::named(APP, "Shape");
    let forest = TypedForest::new(vec![package(
        APP,
        "main",
        &[],
        vec![
            interface("Shape", &[("Area", golly_syntax::types::Signature::new(vec![], vec![float()]))]),
            Decl::Func(func(
                "main",
                vec![],
                vec![],
                vec![
                    Stmt::Var {
                        name: "s".into(),
                        ty: shape.clone(),
                        value: None,
                    },
                    println(vec![interface_call(local("s", shape), APP, "Shape", "Area", float())]),
                ],
            )),
        ],
    )]);

    let err = compile(forest, &[APP]).unwrap_err();
    match err {
        CompileError::Stage {
            stage: Stage::Emit,
            source: StageError::Emit(EmitError::UnresolvedInterfaceCall { interface, method, caller, pos }),
        } => {
            assert_eq!(interface, "app Shape");
            assert_eq!(method, "Area");
            assert_eq!(caller, "app main");
            assert_eq!(pos.line, 20);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn main_packages_need_a_main_function() {
    let forest = TypedForest::new(vec![package(
        APP,
        "main",
        &[],
        vec![Decl::Func(func("helper", vec![], vec![], vec![]))],
    )]);
    let err = compile(forest, &[APP]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Stage {
            stage: Stage::Analyze,
            source: StageError::Analyze(AnalyzeError::NoMain { .. }),
        }
    ));
}

#[test]
fn duplicate_declarations_fail_indexing() {
    let forest = TypedForest::new(vec![package(
        APP,
        "main",
        &[],
        vec![
            Decl::Func(func("main", vec![], vec![], vec![])),
            Decl::Func(func("main", vec![], vec![], vec![])),
        ],
    )]);
    let err = compile(forest, &[APP]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Stage {
            stage: Stage::Index,
            source: StageError::Index(IndexError::DuplicateId { .. }),
        }
    ));
}

#[test]
fn compiling_twice_is_byte_identical() {
    let first = compile(shapes_program(), &[APP]).unwrap();
    let second = compile(shapes_program(), &[APP]).unwrap();
    assert_eq!(first.artifacts, second.artifacts);

    let first = compile_with(util_program(), &[APP], per_package()).unwrap();
    let second = compile_with(util_program(), &[APP], per_package()).unwrap();
    assert_eq!(first.artifacts, second.artifacts);
}

#[test]
fn per_package_mode_emits_packages_in_first_appearance_order() {
    let output = compile_with(util_program(), &[APP], per_package()).unwrap();
    let names: Vec<_> = output.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["util", APP]);

    insta::assert_snapshot!(output.artifacts[0].source, @r"
    // Code generated by golly. DO NOT EDIT.

    function util$Double(x) {
      return x * 2;
    }
    ");
    insta::assert_snapshot!(output.artifacts[1].source, @r"
    // Code generated by golly. DO NOT EDIT.

    function app$main() {
      console.log(util$Double(21));
    }

    app$main();
    ");
}

#[test]
fn library_bundles_publish_their_exports() {
    let output = compile(util_program(), &["util"]).unwrap();
    assert_eq!(output.artifacts.len(), 1);
    let source = &output.artifacts[0].source;
    assert!(source.contains("function util$Double(x)"));
    assert!(source.contains("globalThis[\"util\"] = {"));
    assert!(source.contains("Double: util$Double,"));
    assert!(!source.contains("app$main"));
}

#[test]
fn explicit_entry_points_replace_main() {
    let options = CompileOptions::default().with_entries(EntryPoints::Symbols(vec!["util Double".into()]));
    let output = compile_with(util_program(), &[APP], options).unwrap();
    assert_eq!(output.artifacts.len(), 1);
    assert_eq!(output.artifacts[0].name, "util");
    assert!(!output.artifacts[0].source.contains("app$main"));
}

#[test]
fn unknown_entry_points_are_rejected() {
    let options = CompileOptions::default().with_entries(EntryPoints::Symbols(vec!["util Triple".into()]));
    let err = compile_with(util_program(), &[APP], options).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Stage {
            source: StageError::Analyze(AnalyzeError::UnknownEntryPoint { .. }),
            ..
        }
    ));
}

#[test]
fn cancelled_compiles_produce_no_output() {
    let token = CancellationToken::new();
    let handle = token.clone();
    std::thread::spawn(move || handle.cancel()).join().unwrap();

    let result = Compiler::new(shapes_program()).compile_with_cancel(&[APP.to_string()], &token);
    assert!(matches!(result, Err(CompileError::Cancelled { stage: Stage::Load })));
}

#[test]
fn raw_bodies_replace_the_declaration_body() {
    let forest = TypedForest::new(vec![package(
        APP,
        "main",
        &[JS],
        vec![
            Decl::Func(func(
                "log",
                vec![Param::new("msg", string())],
                vec![],
                vec![raw("console.log($1)", vec![local("msg", string())])],
            )),
            Decl::Func(func(
                "main",
                vec![],
                vec![],
                vec![Stmt::Expr(call(APP, "log", vec![str_lit("hi")], Type::default()))],
            )),
        ],
    )]);
    let output = compile(forest, &[APP]).unwrap();
    let source = &output.artifacts[0].source;
    assert!(source.contains("  function app$log(msg) {\n    console.log(msg)\n  }\n"));
    assert!(source.contains("app$log(\"hi\");"));
}

#[test]
fn unreachable_declarations_may_be_untranslatable() {
    // `broken` calls a builtin with no JavaScript translation, but nothing reaches it.
    let forest = TypedForest::new(vec![package(
        APP,
        "main",
        &[],
        vec![
            Decl::Func(func(
                "broken",
                vec![],
                vec![],
                vec![Stmt::Expr(Expr::call(
                    golly_syntax::ast::Callee::Builtin("recover".into()),
                    vec![],
                    Type::default(),
                ))],
            )),
            Decl::Func(func("main", vec![], vec![], vec![println(vec![Expr::lit(Lit::Bool(true), bool_ty())])])),
        ],
    )]);
    let output = compile(forest, &[APP]).unwrap();
    assert!(!output.artifacts[0].source.contains("broken"));
    assert!(output.artifacts[0].source.contains("console.log(true);"));
}

#[test]
fn nested_call_templates_expand_inside_out() {
    // pt.SetX(pt.X()), where both methods are `js.Rewrite` templates.
    let point = Type::pointer(Type::named(DOM, "WebKitPoint"));
    let mut forest = dom_program();
    forest.packages[0].decls.push(Decl::Func(method(
        "WebKitPoint",
        "p",
        true,
        func("X", vec![], vec![float()], vec![rewrite("$_.x", vec![])]),
    )));
    let get_x = method_call(local("pt", point.clone()), DOM, "WebKitPoint", "X", vec![], float());
    forest.packages[1].decls = vec![Decl::Func(func(
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
                vec![get_x],
                Type::default(),
            )),
        ],
    ))];

    let output = compile(forest, &[APP]).unwrap();
    insta::assert_snapshot!(output.artifacts[0].source, @r#"
    // Code generated by golly. DO NOT EDIT.
    (function() {
      function app$main() {
        let pt = new WebKitPoint();
        pt.x = pt.x;
      }

      app$main();
    })();
    "#);
}

/// ```go
/// type Inner struct{ X int }
/// type Alias Inner
/// type Outer struct{ F Alias }
///
/// func main() { o := Outer{} }
/// ```
#[test]
fn zero_values_through_named_types_keep_the_struct_reachable() {
    let forest = TypedForest::new(vec![package(
        APP,
        "main",
        &[],
        vec![
            struct_type("Inner", &[("X", int())]),
            named_type("Alias", Type::named(APP, "Inner")),
            struct_type("Outer", &[("F", Type::named(APP, "Alias"))]),
            Decl::Func(func("main", vec![], vec![], vec![define("o", composite(APP, "Outer", vec![]))])),
        ],
    )]);
    let output = compile(forest, &[APP]).unwrap();
    let source = &output.artifacts[0].source;
    assert!(source.contains("this.F = o.F || new app$Inner();"));
    let inner = source.find("class app$Inner").expect("Inner is declared");
    let outer = source.find("class app$Outer").expect("Outer is declared");
    assert!(inner < outer);
}

/// Answers every load with the same forest, whatever was requested.
struct FixedFrontEnd(TypedForest);

impl FrontEnd for FixedFrontEnd {
    fn load_packages(&self, _paths: &[String]) -> Result<LoadedPackages, FrontEndError> {
        Ok(LoadedPackages {
            forest: self.0.clone(),
            diagnostics: vec![],
        })
    }
}

#[test]
fn packages_the_front_end_did_not_load_fail_the_compile() {
    let requested = vec![APP.to_string(), "app/cmd/tool".to_string()];
    let err = Compiler::new(FixedFrontEnd(util_program())).compile(&requested).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Stage {
            stage: Stage::Analyze,
            source: StageError::Analyze(AnalyzeError::MissingPackage { ref path }),
        } if path == "app/cmd/tool"
    ));
}

/// ```go
/// type Celsius float64
/// func (c Celsius) Label(unit string) string { return unit }
///
/// func main() {
///     t := Celsius(20.5)
///     println(t.Label("C"))
/// }
/// ```
fn celsius_program(extra: Vec<Decl>, main_body: Vec<Stmt>) -> TypedForest {
    let mut decls = vec![
        named_type("Celsius", float()),
        Decl::Func(method(
            "Celsius",
            "c",
            false,
            func(
                "Label",
                vec![Param::new("unit", string())],
                vec![string()],
                vec![Stmt::Return(vec![local("unit", string())])],
            ),
        )),
    ];
    decls.extend(extra);
    let mut body = vec![define("t", Expr::lit(Lit::Float(20.5), Type::named(APP, "Celsius")))];
    body.extend(main_body);
    decls.push(Decl::Func(func("main", vec![], vec![], body)));
    TypedForest::new(vec![package(APP, "main", &[], decls)])
}

#[test]
fn methods_on_non_struct_types_become_free_functions() {
    let celsius = Type::named(APP, "Celsius");
    let label = method_call(local("t", celsius), APP, "Celsius", "Label", vec![str_lit("C")], string());
    let output = compile(celsius_program(vec![], vec![println(vec![label])]), &[APP]).unwrap();
    let source = &output.artifacts[0].source;
    assert!(source.contains("function app$Celsius$Label(c, unit) {\n    return unit;\n  }"));
    assert!(source.contains("console.log(app$Celsius$Label(t, \"C\"));"));
    assert!(!source.contains("prototype"));
    assert!(!source.contains("class"));
}

#[test]
fn interface_dispatch_to_a_non_struct_type_is_rejected() {
    let celsius = Type::named(APP, "Celsius");
    let labeler = Type::named(APP, "Labeler");
    let label_sig = Signature::new(vec![string()], vec![string()]);
    let describe = func(
        "describe",
        vec![Param::new("l", labeler.clone())],
        vec![string()],
        vec![Stmt::Return(vec![call_at(
            golly_syntax::ast::Callee::Interface {
                recv: Box::new(local("l", labeler)),
                interface: golly_syntax::ast::Ref::new(APP, "Labeler"),
                name: "Label".into(),
            },
            vec![str_lit("C")],
            string(),
            golly_syntax::ast::Pos::new("main.go", 9, 9),
        )])],
    );
    let forest = celsius_program(
        vec![interface("Labeler", &[("Label", label_sig)]), Decl::Func(describe)],
        vec![println(vec![call(APP, "describe", vec![local("t", celsius)], string())])],
    );
    let err = compile(forest, &[APP]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Stage {
            stage: Stage::Emit,
            source: StageError::Emit(EmitError::Unsupported { ref id, .. }),
        } if id == "app describe"
    ));
}

#[test]
fn package_paths_that_mangle_alike_are_rejected() {
    let run = || vec![Decl::Func(func("Run", vec![], vec![], vec![]))];
    let forest = TypedForest::new(vec![
        package("lib/util", "util", &[], run()),
        package("lib_util", "util", &[], run()),
        package(
            APP,
            "main",
            &["lib/util", "lib_util"],
            vec![Decl::Func(func(
                "main",
                vec![],
                vec![],
                vec![
                    Stmt::Expr(call("lib/util", "Run", vec![], Type::default())),
                    Stmt::Expr(call("lib_util", "Run", vec![], Type::default())),
                ],
            ))],
        ),
    ]);
    let err = compile(forest, &[APP]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Stage {
            stage: Stage::Emit,
            source: StageError::Emit(EmitError::NameCollision { ref name, .. }),
        } if name == "lib_util$Run"
    ));
}
