/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure handed over by the parser
///
/// Submodules:
/// - ast: Core AST definitions (statements, expressions, files, program)
/// - builder: Helper constructors for assembling trees
/// - expressions: Definitions for various expression types
/// - statements: Definitions for various statement types
/// - types: Definitions for type representations in the AST
pub mod ast;
pub mod builder;
pub mod expressions;
pub mod statements;
pub mod types;
