//! Unit tests for the symbol table pass.
//!
//! This module contains tests for:
//! - Scope chains and the position rule
//! - Declarations, duplicates and custom types
//! - Loop variables and the inference worklist
//! - Cross-file lookups through `#load` dependencies

use pretty_assertions::assert_eq;

use crate::{
    ast::{
        ast::Program,
        builder::*,
        types::{Primitive, TypeAst},
    },
    config::AnalysisOptions,
    errors::errors::{Error, ErrorImpl},
};

use super::{
    manager::SymbolTableManager,
    symbol_table::{IdentifierLocation, TypeKind, ROOT_SCOPE},
    walker::ScopeWalker,
};

fn generate(files: Vec<FileBuilder>) -> Result<SymbolTableManager, Error> {
    let mut program = Program::new();
    for file in files {
        file.add_to(&mut program);
    }

    let mut manager = SymbolTableManager::new(program);
    manager.generate_symbol_tables(&AnalysisOptions::sequential())?;
    Ok(manager)
}

fn s32() -> TypeAst {
    TypeAst::Primitive(Primitive::S32)
}

#[test]
fn test_walker_scopes_and_positions() {
    let mut walker = ScopeWalker::new();
    assert_eq!(walker.current_scope(), ROOT_SCOPE);
    assert_eq!(walker.advance(), 1);

    let scope = walker.enter_scope();
    assert_eq!(scope.id, 1);
    assert_eq!(scope.parent, Some(ROOT_SCOPE));

    let nested = walker.enter_scope();
    assert_eq!(nested.parent, Some(1));
    walker.exit_scope();
    walker.exit_scope();
    walker.exit_scope();

    assert_eq!(walker.current_scope(), ROOT_SCOPE);
    assert_eq!(walker.enter_scope().id, 3);
}

#[test]
fn test_parameters_live_in_body_scope() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        var_decl("x", s32()),
        function("f", vec![("a", s32())], ty("void"), vec![infer_decl("y", var("a"))]),
    ])])
    .unwrap();

    let parameter = manager
        .lookup_identifier_info("main.ryu", "a", 1, 4, false)
        .unwrap();
    assert_eq!(parameter.scope_id, 1);
    assert_eq!(parameter.position, 3);
    assert_eq!(parameter.parameter_index, Some(0));
    assert!(manager
        .lookup_identifier_info("main.ryu", "a", ROOT_SCOPE, 0, false)
        .is_none());

    let global = manager
        .lookup_identifier_info("main.ryu", "x", 1, 4, false)
        .unwrap();
    assert_eq!(global.scope_id, ROOT_SCOPE);
    assert_eq!(global.type_ast(), Some(&s32()));

    let function = manager
        .lookup_identifier_info("main.ryu", "f", 1, 4, false)
        .unwrap();
    assert!(function.is_function_type());
}

#[test]
fn test_prototype_without_body_has_no_parameters() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmt(extern_function(
        "printf",
        vec![("format", ty("str"))],
        ty("s32"),
        true,
    ))])
    .unwrap();

    let table = manager.symbol_table("main.ryu").unwrap();
    assert_eq!(table.identifiers().count(), 1);
    assert!(table.get_scope(1).is_none());
}

#[test]
fn test_block_does_not_see_later_declarations() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmt(function(
        "f",
        vec![],
        ty("void"),
        vec![expr_stmt(var("later")), var_decl("later", s32())],
    ))])
    .unwrap();

    // `f` is 1, the expression statement 2, the declaration 3.
    assert!(manager
        .lookup_identifier_info("main.ryu", "later", 1, 2, false)
        .is_none());
    assert!(manager
        .lookup_identifier_info("main.ryu", "later", 1, 3, false)
        .is_some());
    assert!(manager
        .lookup_identifier_info("main.ryu", "later", 1, 0, false)
        .is_some());
}

#[test]
fn test_root_declarations_are_visible_from_earlier_functions() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        function("f", vec![], ty("void"), vec![expr_stmt(var("counter"))]),
        var_decl("counter", s32()),
    ])])
    .unwrap();

    assert!(manager
        .lookup_identifier_info("main.ryu", "counter", 1, 2, false)
        .is_some());
}

#[test]
fn test_constant_lookup_skips_variables() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        const_decl("LIMIT", num(10)),
        infer_decl("count", num(0)),
    ])])
    .unwrap();

    let limit = manager
        .lookup_identifier_info("main.ryu", "LIMIT", ROOT_SCOPE, 0, true)
        .unwrap();
    assert!(limit.is_constant);
    assert!(manager
        .lookup_identifier_info("main.ryu", "count", ROOT_SCOPE, 0, true)
        .is_none());
    assert!(manager
        .lookup_identifier_info("main.ryu", "count", ROOT_SCOPE, 0, false)
        .is_some());
}

#[test]
fn test_duplicate_declaration_in_same_scope() {
    let result = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        var_decl("x", s32()),
        infer_decl("x", num(1)),
    ])]);

    let error = result.unwrap_err();
    assert!(matches!(
        error.kind(),
        ErrorImpl::DuplicateDeclaration { identifier, .. } if identifier == "x"
    ));
}

#[test]
fn test_shadowing_in_nested_scope() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        var_decl("x", s32()),
        block(vec![var_decl("x", ty("bool"))]),
    ])])
    .unwrap();

    let inner = manager
        .lookup_identifier_info("main.ryu", "x", 1, 0, false)
        .unwrap();
    assert_eq!(inner.type_ast(), Some(&ty("bool")));
}

#[test]
fn test_struct_and_enum_types() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        struct_decl("Point", vec![("x", s32()), ("y", s32())]),
        enum_decl("Color", vec![("Red", None), ("Green", Some(num(4)))]),
    ])])
    .unwrap();

    let point = manager.lookup_type_info("main.ryu", "Point").unwrap();
    assert_eq!(point.kind, TypeKind::Struct);
    assert_eq!(point.member_type("y"), Some(&s32()));
    assert_eq!(point.member_type("z"), None);

    let color = manager.lookup_type_info("main.ryu", "Color").unwrap();
    assert_eq!(color.kind, TypeKind::Enum);
    assert_eq!(color.member_type("Green"), Some(&ty("Color")));
}

#[test]
fn test_duplicate_struct_member() {
    let result = generate(vec![FileBuilder::new("main.ryu").stmt(struct_decl(
        "Point",
        vec![("x", s32()), ("x", s32())],
    ))]);

    assert!(matches!(
        result.unwrap_err().kind(),
        ErrorImpl::DuplicateDeclaration { .. }
    ));
}

#[test]
fn test_nested_type_declaration() {
    let result = generate(vec![FileBuilder::new("main.ryu").stmt(function(
        "f",
        vec![],
        ty("void"),
        vec![struct_decl("Inner", vec![("x", s32())])],
    ))]);

    assert!(matches!(
        result.unwrap_err().kind(),
        ErrorImpl::NestedTypeDeclaration { type_ } if type_ == "Inner"
    ));
}

#[test]
fn test_loop_variables_are_queued() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        var_decl("values", TypeAst::array(s32())),
        for_range(Some("n"), num(0), num(10), vec![]),
        foreach(None, var("values"), vec![]),
    ])])
    .unwrap();

    let pending = manager
        .identifiers_to_be_inferred()
        .iter()
        .map(|ident| ident.location.clone())
        .collect::<Vec<IdentifierLocation>>();
    assert_eq!(
        pending,
        vec![IdentifierLocation::new("n", 1), IdentifierLocation::new("it", 2)]
    );

    let loop_variable = manager
        .get_identifier_info("main.ryu", &IdentifierLocation::new("n", 1))
        .unwrap();
    assert_eq!(loop_variable.position, 2);
    assert!(loop_variable.type_ast().is_none());
}

#[test]
fn test_worklist_keeps_file_order() {
    let manager = generate(vec![
        FileBuilder::new("main.ryu")
            .load("lib.ryu")
            .stmts(vec![infer_decl("a", num(1)), infer_decl("b", num(2))]),
        FileBuilder::new("lib.ryu").stmt(const_decl("C", num(3))),
    ])
    .unwrap();

    let pending = manager
        .identifiers_to_be_inferred()
        .iter()
        .map(|ident| (ident.file.to_string(), ident.location.name.clone()))
        .collect::<Vec<(String, String)>>();
    assert_eq!(
        pending,
        vec![
            ("main.ryu".to_string(), "a".to_string()),
            ("main.ryu".to_string(), "b".to_string()),
            ("lib.ryu".to_string(), "C".to_string()),
        ]
    );
}

#[test]
fn test_lookup_through_dependencies() {
    let manager = generate(vec![
        FileBuilder::new("main.ryu").load("a.ryu"),
        FileBuilder::new("a.ryu")
            .load("b.ryu")
            .stmt(block(vec![var_decl("hidden", s32())])),
        FileBuilder::new("b.ryu").stmts(vec![
            var_decl("shared", s32()),
            struct_decl("Node", vec![("value", s32())]),
        ]),
    ])
    .unwrap();

    assert!(manager
        .lookup_identifier_info("main.ryu", "shared", ROOT_SCOPE, 1, false)
        .is_some());
    assert!(manager.lookup_type_info("main.ryu", "Node").is_some());
    // Only the root scope of a loaded file is visible.
    assert!(manager
        .lookup_identifier_info("main.ryu", "hidden", ROOT_SCOPE, 1, false)
        .is_none());
    // Dependencies do not flow backwards.
    assert!(manager.lookup_type_info("b.ryu", "Node").is_some());
    assert!(manager
        .lookup_identifier_info("b.ryu", "hidden", ROOT_SCOPE, 0, false)
        .is_none());
}

#[test]
fn test_lookup_terminates_on_dependency_cycle() {
    let manager = generate(vec![
        FileBuilder::new("main.ryu").load("a.ryu"),
        FileBuilder::new("a.ryu").load("b.ryu"),
        FileBuilder::new("b.ryu").load("a.ryu").load("main.ryu"),
    ])
    .unwrap();

    assert!(manager
        .lookup_identifier_info("main.ryu", "missing", ROOT_SCOPE, 0, false)
        .is_none());
    assert!(manager.lookup_type_info("b.ryu", "Missing").is_none());
}

#[test]
fn test_lookup_function_by_arguments() {
    let manager = generate(vec![FileBuilder::new("main.ryu").stmts(vec![
        function("add", vec![("a", s32()), ("b", s32())], s32(), vec![]),
        extern_function("printf", vec![("format", ty("str"))], s32(), true),
    ])])
    .unwrap();

    assert!(manager
        .lookup_function_info("main.ryu", "add", ROOT_SCOPE, &[s32(), s32()])
        .is_some());
    assert!(manager
        .lookup_function_info("main.ryu", "add", ROOT_SCOPE, &[s32()])
        .is_none());
    assert!(manager
        .lookup_function_info("main.ryu", "add", ROOT_SCOPE, &[s32(), ty("u32")])
        .is_none());
    assert!(manager
        .lookup_function_info("main.ryu", "printf", ROOT_SCOPE, &[ty("str"), s32(), ty("f64")])
        .is_some());
    assert!(manager
        .lookup_function_info("main.ryu", "printf", ROOT_SCOPE, &[])
        .is_none());
}

#[test]
fn test_duplicate_global_symbol_across_files() {
    let result = generate(vec![
        FileBuilder::new("a.ryu").stmt(function("main", vec![], ty("void"), vec![])),
        FileBuilder::new("b.ryu").stmt(function("main", vec![], ty("void"), vec![])),
    ]);

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "DuplicateGlobalSymbol");
    assert_eq!(error.get_position().file(), "b.ryu");
    assert!(matches!(
        error.kind(),
        ErrorImpl::DuplicateGlobalSymbol { symbol, file } if symbol == "main" && file == "b.ryu"
    ));
}

#[test]
fn test_duplicate_global_type_across_files() {
    let result = generate(vec![
        FileBuilder::new("a.ryu").stmt(struct_decl("Point", vec![("x", s32())])),
        FileBuilder::new("b.ryu").stmt(enum_decl("Point", vec![("A", None)])),
    ]);

    assert!(matches!(
        result.unwrap_err().kind(),
        ErrorImpl::DuplicateGlobalSymbol { symbol, .. } if symbol == "Point"
    ));
}

#[test]
fn test_parallel_generation_matches_sequential() {
    let build = || {
        let mut program = Program::new();
        for index in 0..8 {
            FileBuilder::new(&format!("file{}.ryu", index))
                .stmts(vec![
                    infer_decl(&format!("value{}", index), num(index)),
                    function(
                        &format!("function{}", index),
                        vec![("a", s32())],
                        s32(),
                        vec![infer_decl("local", var("a"))],
                    ),
                ])
                .add_to(&mut program);
        }
        program
    };

    let mut sequential = SymbolTableManager::new(build());
    sequential
        .generate_symbol_tables(&AnalysisOptions::sequential())
        .unwrap();
    let mut parallel = SymbolTableManager::new(build());
    parallel
        .generate_symbol_tables(&AnalysisOptions::default())
        .unwrap();

    let pending = |manager: &SymbolTableManager| {
        manager
            .identifiers_to_be_inferred()
            .iter()
            .map(|ident| format!("{}:{}:{}", ident.file, ident.location.name, ident.location.scope_id))
            .collect::<Vec<String>>()
    };
    assert_eq!(pending(&sequential), pending(&parallel));
}
