use std::{cell::OnceCell, collections::HashMap, sync::Arc};

use crate::{
    ast::types::TypeAst,
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// Index of a lexical scope inside one file. `0` is the file root.
pub type ScopeId = u32;

/// Pre-order counter of the elements visited in one file.
///
/// Lookups compare a candidate's position against the use site's; a use
/// position of `0` or less disables the comparison.
pub type NodePosition = i32;

pub const ROOT_SCOPE: ScopeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeInfo {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
}

/// Key of an identifier inside one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierLocation {
    pub name: String,
    pub scope_id: ScopeId,
}

impl IdentifierLocation {
    pub fn new(name: &str, scope_id: ScopeId) -> Self {
        IdentifierLocation {
            name: name.to_string(),
            scope_id,
        }
    }
}

/// A declared variable, constant, parameter or function.
///
/// The type is written once: either at declaration, or by the inferer for
/// declarations without an annotation.
#[derive(Debug)]
pub struct IdentifierInfo {
    pub name: String,
    type_ast: OnceCell<TypeAst>,
    pub position: NodePosition,
    pub scope_id: ScopeId,
    pub is_constant: bool,
    /// Index in the parameter list, for function parameters.
    pub parameter_index: Option<usize>,
    file: Arc<String>,
    pub declared_at: Position,
}

impl IdentifierInfo {
    pub fn new(
        name: &str,
        type_ast: Option<TypeAst>,
        position: NodePosition,
        scope_id: ScopeId,
        file: Arc<String>,
        declared_at: Position,
    ) -> Self {
        let cell = OnceCell::new();
        if let Some(type_ast) = type_ast {
            let _ = cell.set(type_ast);
        }

        IdentifierInfo {
            name: name.to_string(),
            type_ast: cell,
            position,
            scope_id,
            is_constant: false,
            parameter_index: None,
            file,
            declared_at,
        }
    }

    pub fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    pub fn parameter(mut self, index: usize) -> Self {
        self.parameter_index = Some(index);
        self
    }

    pub fn type_ast(&self) -> Option<&TypeAst> {
        self.type_ast.get()
    }

    /// Backfills the inferred type. Returns `false` if a type was already set,
    /// in which case the existing one is kept.
    pub fn set_type(&self, type_ast: TypeAst) -> bool {
        self.type_ast.set(type_ast).is_ok()
    }

    pub fn is_function_type(&self) -> bool {
        self.type_ast().is_some_and(TypeAst::is_function)
    }

    pub fn is_function_parameter(&self) -> bool {
        self.parameter_index.is_some()
    }

    /// Path of the file declaring this identifier.
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn location(&self) -> IdentifierLocation {
        IdentifierLocation::new(&self.name, self.scope_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Struct,
    Enum,
}

/// A declared struct or enum.
#[derive(Debug, Clone)]
pub struct CustomTypeInfo {
    pub name: String,
    pub kind: TypeKind,
    pub scope_id: ScopeId,
    pub position: NodePosition,
    /// Members in declaration order. Enum values are typed as the enum itself.
    pub members: Vec<(String, TypeAst)>,
    pub declared_at: Position,
}

impl CustomTypeInfo {
    pub fn type_ast(&self) -> TypeAst {
        TypeAst::Named(self.name.clone())
    }

    pub fn member_type(&self, member: &str) -> Option<&TypeAst> {
        self.members
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, member_type)| member_type)
    }
}

/// The identifiers, types and scopes of a single file.
#[derive(Debug)]
pub struct SymbolTable {
    pub file_path: Arc<String>,
    /// Loaded files, in load order.
    pub file_dependencies: Vec<String>,
    identifiers: HashMap<IdentifierLocation, IdentifierInfo>,
    types: HashMap<String, CustomTypeInfo>,
    scopes: HashMap<ScopeId, ScopeInfo>,
}

impl SymbolTable {
    pub fn new(file_path: Arc<String>, file_dependencies: Vec<String>) -> Self {
        SymbolTable {
            file_path,
            file_dependencies,
            identifiers: HashMap::new(),
            types: HashMap::new(),
            scopes: HashMap::new(),
        }
    }

    pub fn add_scope(&mut self, scope: ScopeInfo) {
        self.scopes.insert(scope.id, scope);
    }

    pub fn get_scope(&self, id: ScopeId) -> Option<&ScopeInfo> {
        self.scopes.get(&id)
    }

    pub fn add_identifier(&mut self, identifier: IdentifierInfo) -> Result<(), Error> {
        let location = identifier.location();

        if self.identifiers.contains_key(&location) {
            return Err(Error::new(
                ErrorImpl::DuplicateDeclaration {
                    identifier: identifier.name.clone(),
                    file: self.file_path.to_string(),
                },
                identifier.declared_at,
            ));
        }

        self.identifiers.insert(location, identifier);
        Ok(())
    }

    pub fn add_type(&mut self, type_info: CustomTypeInfo) -> Result<(), Error> {
        if self.types.contains_key(&type_info.name) {
            return Err(Error::new(
                ErrorImpl::DuplicateDeclaration {
                    identifier: type_info.name.clone(),
                    file: self.file_path.to_string(),
                },
                type_info.declared_at,
            ));
        }

        self.types.insert(type_info.name.clone(), type_info);
        Ok(())
    }

    pub fn get_identifier(&self, location: &IdentifierLocation) -> Option<&IdentifierInfo> {
        self.identifiers.get(location)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &IdentifierInfo> {
        self.identifiers.values()
    }

    pub fn types(&self) -> impl Iterator<Item = &CustomTypeInfo> {
        self.types.values()
    }

    /// `scope_id` followed by each of its ancestors up to the root.
    fn scope_chain(&self, scope_id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope_id), move |id| {
            self.scopes.get(id).and_then(|scope| scope.parent)
        })
    }

    /// Walks the scope chain for a visible identifier.
    ///
    /// A candidate in a nested scope declared after `position` is skipped, so
    /// a block cannot see a name declared further down in the same block.
    /// Functions, root-scope declarations and `position <= 0` are exempt.
    pub fn lookup_identifier_info(
        &self,
        identifier: &str,
        scope_id: ScopeId,
        position: NodePosition,
        is_constant: bool,
    ) -> Option<&IdentifierInfo> {
        self.scope_chain(scope_id).find_map(|current_scope| {
            self.identifiers
                .get(&IdentifierLocation::new(identifier, current_scope))
                .filter(|candidate| !is_constant || candidate.is_constant)
                .filter(|candidate| {
                    position <= 0
                        || candidate.is_function_type()
                        || candidate.scope_id == ROOT_SCOPE
                        || candidate.position <= position
                })
        })
    }

    /// Walks the scope chain for a function whose signature accepts `arguments`.
    pub fn lookup_function_info(
        &self,
        identifier: &str,
        scope_id: ScopeId,
        arguments: &[TypeAst],
    ) -> Option<&IdentifierInfo> {
        self.scope_chain(scope_id).find_map(|current_scope| {
            self.identifiers
                .get(&IdentifierLocation::new(identifier, current_scope))
                .filter(|candidate| {
                    candidate
                        .type_ast()
                        .and_then(TypeAst::as_function)
                        .is_some_and(|function| function.accepts(arguments))
                })
        })
    }

    pub fn lookup_type_info(&self, type_name: &str) -> Option<&CustomTypeInfo> {
        self.types.get(type_name)
    }
}
