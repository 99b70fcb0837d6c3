use super::symbol_table::{NodePosition, ScopeId, ScopeInfo, ROOT_SCOPE};

/// Scope and position bookkeeping shared by every pass that walks a file.
///
/// The symbol table generator and the type checker both drive one of these
/// over the same tree, so they must make the same calls in the same order:
///
/// - [`ScopeWalker::advance`] once for every element of a block or of the
///   root scope, and once for every function parameter
/// - [`ScopeWalker::enter_scope`] for a block statement, a function body and
///   the body of `while`, `do`, `for` and `foreach`
///
/// Following this protocol, a declaration recorded by the generator is found
/// again by the checker under the same scope id and position.
#[derive(Debug)]
pub struct ScopeWalker {
    scope_stack: Vec<ScopeId>,
    next_scope_id: ScopeId,
    position: NodePosition,
}

impl ScopeWalker {
    pub fn new() -> Self {
        ScopeWalker {
            scope_stack: vec![ROOT_SCOPE],
            next_scope_id: ROOT_SCOPE + 1,
            position: 0,
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().copied().unwrap_or(ROOT_SCOPE)
    }

    pub fn position(&self) -> NodePosition {
        self.position
    }

    pub fn advance(&mut self) -> NodePosition {
        self.position += 1;
        self.position
    }

    /// Opens a child of the current scope and makes it current.
    pub fn enter_scope(&mut self) -> ScopeInfo {
        let scope = ScopeInfo {
            id: self.next_scope_id,
            parent: Some(self.current_scope()),
        };

        self.next_scope_id += 1;
        self.scope_stack.push(scope.id);
        scope
    }

    pub fn exit_scope(&mut self) {
        if self.scope_stack.len() > 1 {
            self.scope_stack.pop();
        }
    }
}

impl Default for ScopeWalker {
    fn default() -> Self {
        ScopeWalker::new()
    }
}
