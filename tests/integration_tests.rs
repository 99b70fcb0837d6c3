//! Integration tests for the whole semantic pipeline.
//!
//! These tests build multi-statement, multi-file programs through the AST
//! builder and run symbol table generation, inference and type checking
//! end to end through `analyze`.

use pretty_assertions::assert_eq;
use ryu_sema::{
    analyze,
    ast::{
        ast::{Program, Stmt},
        builder::*,
        expressions::BinaryOperator,
        types::{Primitive, TypeAst},
    },
    config::AnalysisOptions,
    errors::errors::{Error, ErrorImpl},
    symbol_table::{manager::SymbolTableManager, symbol_table::ROOT_SCOPE},
    type_checker::promotion::promote,
};

const SIDE: i64 = 4;

fn run(files: Vec<FileBuilder>) -> Result<SymbolTableManager, Error> {
    let mut program = Program::new();
    for file in files {
        file.add_to(&mut program);
    }
    analyze(program, &AnalysisOptions::sequential())
}

fn run_main(stmts: Vec<Stmt>) -> Result<SymbolTableManager, Error> {
    run(vec![FileBuilder::new("main.ryu").stmts(stmts)])
}

fn global_type(manager: &SymbolTableManager, file: &str, name: &str) -> String {
    manager
        .lookup_identifier_info(file, name, ROOT_SCOPE, 0, false)
        .and_then(|identifier| identifier.type_ast())
        .map(TypeAst::to_string)
        .unwrap_or_default()
}

fn s32() -> TypeAst {
    ty("s32")
}

#[test]
fn test_duplicate_global_symbol_across_files() {
    let error = run(vec![
        FileBuilder::new("main.ryu")
            .load("util.ryu")
            .stmt(infer_decl("counter", num(0))),
        FileBuilder::new("util.ryu").stmt(var_decl("counter", ty("u64"))),
    ])
    .unwrap_err();

    assert_eq!(
        error.kind(),
        &ErrorImpl::DuplicateGlobalSymbol {
            symbol: "counter".to_string(),
            file: "util.ryu".to_string(),
        }
    );
}

#[test]
fn test_inference_in_one_scope() {
    let manager = run_main(vec![
        infer_decl("x", num(5)),
        infer_decl("y", binary(var("x"), BinaryOperator::Add, num(1))),
    ])
    .unwrap();

    assert_eq!(global_type(&manager, "main.ryu", "x"), "s32");
    assert_eq!(global_type(&manager, "main.ryu", "y"), "s32");
}

#[test]
fn test_forward_reference_inference() {
    let manager = run_main(vec![infer_decl("a", var("b")), infer_decl("b", num(5))]).unwrap();

    assert_eq!(global_type(&manager, "main.ryu", "a"), "s32");
    assert_eq!(global_type(&manager, "main.ryu", "b"), "s32");
    assert!(manager.is_fully_typed());
}

#[test]
fn test_cyclic_inference_terminates() {
    let error = run_main(vec![infer_decl("a", var("b")), infer_decl("b", var("a"))]).unwrap_err();

    assert_eq!(error.get_error_name(), "InferenceError");
    assert!(error.to_string().contains("depends on itself"));
}

#[test]
fn test_null_assignment() {
    assert!(run_main(vec![
        struct_decl("Foo", vec![("value", s32())]),
        typed_decl("x", TypeAst::pointer(ty("Foo")), null()),
    ])
    .is_ok());

    let error = run_main(vec![typed_decl("x", s32(), null())]).unwrap_err();
    assert_eq!(
        error.kind(),
        &ErrorImpl::TypeMismatch {
            expected: "s32".to_string(),
            received: "null".to_string(),
        }
    );
}

#[test]
fn test_array_element_assignment() {
    let array = || var_decl("arr", TypeAst::array(s32()));

    assert!(run_main(vec![array(), array_assign(var("arr"), vec![num(0)], num(5))]).is_ok());

    let error = run_main(vec![
        array(),
        array_assign(var("arr"), vec![num(0)], string("s")),
    ])
    .unwrap_err();
    assert_eq!(error.get_error_name(), "TypeMismatch");
}

#[test]
fn test_call_with_wrong_arity() {
    let error = run_main(vec![
        function("f", vec![("x", s32())], s32(), vec![return_stmt(Some(var("x")))]),
        expr_stmt(call("f", vec![num(1), num(2)])),
    ])
    .unwrap_err();

    assert_eq!(
        error.kind(),
        &ErrorImpl::UndefinedFunction {
            function: "f".to_string(),
            arguments: "s32, s32".to_string(),
        }
    );
}

#[test]
fn test_void_returns() {
    assert!(run_main(vec![function("f", vec![], ty("void"), vec![return_stmt(None)])]).is_ok());

    let error = run_main(vec![function(
        "f",
        vec![],
        ty("void"),
        vec![return_stmt(Some(num(5)))],
    )])
    .unwrap_err();
    assert_eq!(error.get_error_name(), "TypeMismatch");
}

#[test]
fn test_use_before_declaration() {
    let error = run_main(vec![function("main", vec![], ty("void"), vec![
        infer_decl("y", binary(var("x"), BinaryOperator::Add, num(1))),
        infer_decl("x", num(1)),
    ])])
    .unwrap_err();

    assert_eq!(
        error.kind(),
        &ErrorImpl::UndeclaredIdentifier {
            identifier: "x".to_string(),
        }
    );
}

#[test]
fn test_promotion_order() {
    let forward = promote(Primitive::S32, Primitive::U32);
    let backward = promote(Primitive::U32, Primitive::S32);

    assert!(matches!(forward, Err(ErrorImpl::InvalidOperandTypes { .. })));
    assert!(matches!(backward, Err(ErrorImpl::InvalidOperandTypes { .. })));
    assert_eq!(promote(Primitive::S32, Primitive::U64), Ok(Primitive::U64));
    assert_eq!(promote(Primitive::U64, Primitive::S32), Ok(Primitive::U64));
}

#[test]
fn test_multi_file_program() {
    let manager = run(vec![
        FileBuilder::new("main.ryu").load("geometry.ryu").stmts(vec![
            function("main", vec![], s32(), vec![
                infer_decl("origin", new(ty("Point"))),
                infer_decl("size", call("area", vec![num(SIDE), num(SIDE)])),
                infer_decl("limit", var("LIMIT")),
                if_stmt(
                    binary(var("size"), BinaryOperator::Greater, var("limit")),
                    vec![return_stmt(Some(num(1)))],
                    None,
                ),
                return_stmt(Some(num(0))),
            ]),
        ]),
        FileBuilder::new("geometry.ryu").load("constants.ryu").stmts(vec![
            struct_decl("Point", vec![("x", s32()), ("y", s32())]),
            function("area", vec![("w", s32()), ("h", s32())], s32(), vec![return_stmt(Some(
                binary(var("w"), BinaryOperator::Mul, var("h")),
            ))]),
        ]),
        FileBuilder::new("constants.ryu").stmt(const_decl("LIMIT", num(100))),
    ])
    .unwrap();

    assert!(manager.is_fully_typed());
    let origin = manager
        .lookup_identifier_info("main.ryu", "origin", 1, 0, false)
        .and_then(|identifier| identifier.type_ast())
        .map(TypeAst::to_string);
    assert_eq!(origin, Some("^Point".to_string()));
    assert_eq!(global_type(&manager, "constants.ryu", "LIMIT"), "s32");
}

#[test]
fn test_loaded_file_locals_are_hidden() {
    let error = run(vec![
        FileBuilder::new("main.ryu")
            .load("lib.ryu")
            .stmt(infer_decl("x", var("local"))),
        FileBuilder::new("lib.ryu").stmt(function("helper", vec![], ty("void"), vec![
            infer_decl("local", num(1)),
        ])),
    ])
    .unwrap_err();

    assert_eq!(error.get_error_name(), "UndeclaredIdentifier");
    assert_eq!(error.get_position().file(), "main.ryu");
}

#[test]
fn test_parallel_and_sequential_agree() {
    let build = || {
        let mut program = Program::new();
        FileBuilder::new("main.ryu")
            .load("a.ryu")
            .load("b.ryu")
            .stmt(infer_decl("total", binary(var("a"), BinaryOperator::Add, var("b"))))
            .add_to(&mut program);
        FileBuilder::new("a.ryu")
            .stmt(infer_decl("a", num_typed(1, Primitive::S64)))
            .add_to(&mut program);
        FileBuilder::new("b.ryu")
            .stmt(infer_decl("b", num(2)))
            .add_to(&mut program);
        program
    };

    let sequential = analyze(build(), &AnalysisOptions::sequential()).unwrap();
    let parallel = analyze(build(), &AnalysisOptions::default()).unwrap();

    assert_eq!(global_type(&sequential, "main.ryu", "total"), "s64");
    assert_eq!(
        global_type(&sequential, "main.ryu", "total"),
        global_type(&parallel, "main.ryu", "total")
    );

    let duplicate = || {
        let mut program = build();
        FileBuilder::new("c.ryu")
            .stmt(infer_decl("a", num(3)))
            .add_to(&mut program);
        program
    };
    let sequential_error = analyze(duplicate(), &AnalysisOptions::sequential()).unwrap_err();
    let parallel_error = analyze(duplicate(), &AnalysisOptions::default()).unwrap_err();
    assert_eq!(sequential_error.to_string(), parallel_error.to_string());
}

#[test]
fn test_error_display_points_at_statement() {
    let error = run_main(vec![
        var_decl("flag", ty("bool")),
        if_stmt(var("flag"), vec![], None),
        while_stmt(num(1), vec![]),
    ])
    .unwrap_err();

    assert_eq!(
        error.to_string(),
        "TypeMismatch: types do not match: expected bool, received s32 (main.ryu:3)"
    );
}
