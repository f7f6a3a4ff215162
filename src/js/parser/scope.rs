use std::collections::HashMap;

use super::parse_error::{EarlyError, ParseError};

struct Scope {
    kind: ScopeKind,
    var_declared_names: HashMap<String, NameKind>,
    lex_declared_names: HashMap<String, NameKind>,
    /// Labels in effect, only tracked on scopes that start a new function.
    labels: Vec<LabelEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ScopeKind {
    Toplevel,
    Function,
    // Block-like scope, also includes switch and catch scopes
    Block,
}

impl Scope {
    fn new(kind: ScopeKind) -> Scope {
        Scope {
            kind,
            var_declared_names: HashMap::new(),
            lex_declared_names: HashMap::new(),
            labels: vec![],
        }
    }

    fn is_hoist_target(&self) -> bool {
        matches!(self.kind, ScopeKind::Toplevel | ScopeKind::Function)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NameKind {
    Var,
    Const,
    Let,
    Class,
    Function,
    /// A plain function declared in a block of sloppy mode code. These may be redeclared by each
    /// other in the same block.
    SloppyBlockFunction,
    FunctionParameter,
    /// A catch parameter that is a single identifier. These may be redeclared by `var`.
    CatchParameter,
}

struct LabelEntry {
    name: String,
    is_loop: bool,
}

/// Tracks the names declared in each open scope, rejecting conflicting redeclarations as they
/// are encountered.
pub struct ScopeBuilder {
    scope_stack: Vec<Scope>,
}

impl ScopeBuilder {
    pub fn new() -> ScopeBuilder {
        ScopeBuilder { scope_stack: vec![] }
    }

    pub fn exit_scope(&mut self) {
        self.scope_stack.pop();
    }

    pub fn enter_toplevel_scope(&mut self) {
        self.scope_stack.push(Scope::new(ScopeKind::Toplevel))
    }

    pub fn enter_function_scope(&mut self) {
        self.scope_stack.push(Scope::new(ScopeKind::Function))
    }

    pub fn enter_block_scope(&mut self) {
        self.scope_stack.push(Scope::new(ScopeKind::Block))
    }

    fn current_scope_mut(&mut self) -> Option<&mut Scope> {
        self.scope_stack.last_mut()
    }

    fn function_scope(&self) -> Option<&Scope> {
        self.scope_stack.iter().rev().find(|scope| scope.is_hoist_target())
    }

    fn function_scope_mut(&mut self) -> Option<&mut Scope> {
        self.scope_stack
            .iter_mut()
            .rev()
            .find(|scope| scope.is_hoist_target())
    }

    // Add a lexically declared name in the current scope. Return an error if this name conflicts
    // with a lexically or var declared name in the current scope.
    pub fn add_lex_declared_name(&mut self, name: &str, kind: NameKind) -> Result<(), EarlyError> {
        let scope = match self.current_scope_mut() {
            Some(scope) => scope,
            None => return Ok(()),
        };

        if let Some(existing_kind) = scope.lex_declared_names.get(name) {
            let is_sloppy_redeclaration = *existing_kind == NameKind::SloppyBlockFunction
                && kind == NameKind::SloppyBlockFunction;
            if !is_sloppy_redeclaration {
                return Err(EarlyError::DuplicateBinding(name.to_owned()));
            }
        }

        if scope.var_declared_names.contains_key(name) {
            return Err(EarlyError::DuplicateBinding(name.to_owned()));
        }

        scope.lex_declared_names.insert(name.to_owned(), kind);

        Ok(())
    }

    // Add a var declared name hoisted in the current scope. Return an error if this name conflicts
    // with a lexically declared name in any scope up to the scope the variable is hoisted to.
    pub fn add_var_declared_name(&mut self, name: &str, kind: NameKind) -> Result<(), EarlyError> {
        // Variables are hoisted to closest function or toplevel scope, so add name to all scopes
        // up to the scope variable is hoisted into.
        for scope in self.scope_stack.iter_mut().rev() {
            match scope.lex_declared_names.get(name) {
                // Vars may redeclare a simple catch parameter
                Some(NameKind::CatchParameter) => {}
                Some(_) => return Err(EarlyError::DuplicateBinding(name.to_owned())),
                None => {}
            }

            scope.var_declared_names.insert(name.to_owned(), kind);

            if scope.is_hoist_target() {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Push a label for the statement that is about to be parsed.
    pub fn push_label(&mut self, name: &str, is_loop: bool) -> Result<(), ParseError> {
        let scope = match self.function_scope_mut() {
            Some(scope) => scope,
            None => return Ok(()),
        };

        if scope.labels.iter().any(|label| label.name == name) {
            return Err(ParseError::DuplicateLabel);
        }

        scope
            .labels
            .push(LabelEntry { name: name.to_owned(), is_loop });

        Ok(())
    }

    pub fn pop_label(&mut self) {
        if let Some(scope) = self.function_scope_mut() {
            scope.labels.pop();
        }
    }

    /// Check that a `break` or `continue` can target the named label. Only labels of loops can be
    /// targeted by `continue`.
    pub fn check_label_target(&self, name: &str, is_continue: bool) -> Result<(), ParseError> {
        let label = self
            .function_scope()
            .and_then(|scope| scope.labels.iter().rev().find(|label| label.name == name));

        match label {
            Some(label) if is_continue && !label.is_loop => Err(ParseError::LabelNotFound),
            Some(_) => Ok(()),
            None => Err(ParseError::LabelNotFound),
        }
    }
}

impl Default for ScopeBuilder {
    fn default() -> ScopeBuilder {
        ScopeBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ScopeBuilder {
        let mut builder = ScopeBuilder::new();
        builder.enter_toplevel_scope();
        builder
    }

    #[test]
    fn lexical_redeclaration() {
        let mut builder = builder();
        assert!(builder.add_lex_declared_name("a", NameKind::Let).is_ok());
        assert_eq!(
            builder.add_lex_declared_name("a", NameKind::Const),
            Err(EarlyError::DuplicateBinding("a".to_owned()))
        );
    }

    #[test]
    fn var_conflicts_with_enclosing_lexical_names() {
        let mut builder = builder();
        builder.add_lex_declared_name("a", NameKind::Let).unwrap();
        builder.enter_block_scope();
        assert!(builder.add_var_declared_name("a", NameKind::Var).is_err());
    }

    #[test]
    fn var_hoists_through_blocks() {
        let mut builder = builder();
        builder.enter_block_scope();
        builder.add_var_declared_name("a", NameKind::Var).unwrap();
        builder.exit_scope();

        assert!(builder.add_lex_declared_name("a", NameKind::Let).is_err());
    }

    #[test]
    fn shadowing_in_nested_block() {
        let mut builder = builder();
        builder.add_lex_declared_name("a", NameKind::Let).unwrap();
        builder.enter_block_scope();
        assert!(builder.add_lex_declared_name("a", NameKind::Let).is_ok());
    }

    #[test]
    fn var_may_redeclare_catch_parameter() {
        let mut builder = builder();
        builder.enter_block_scope();
        builder
            .add_lex_declared_name("e", NameKind::CatchParameter)
            .unwrap();
        assert!(builder.add_var_declared_name("e", NameKind::Var).is_ok());
        assert!(builder.add_lex_declared_name("e", NameKind::Let).is_err());
    }

    #[test]
    fn sloppy_block_functions_may_be_redeclared() {
        let mut builder = builder();
        builder.enter_block_scope();
        builder
            .add_lex_declared_name("f", NameKind::SloppyBlockFunction)
            .unwrap();
        assert!(builder
            .add_lex_declared_name("f", NameKind::SloppyBlockFunction)
            .is_ok());
        assert!(builder.add_lex_declared_name("f", NameKind::Function).is_err());
    }

    #[test]
    fn labels() {
        let mut builder = builder();
        builder.push_label("outer", true).unwrap();
        assert!(builder.push_label("outer", false).is_err());
        builder.push_label("inner", false).unwrap();

        assert!(builder.check_label_target("outer", true).is_ok());
        assert!(builder.check_label_target("inner", false).is_ok());
        assert!(builder.check_label_target("inner", true).is_err());
        assert!(builder.check_label_target("missing", false).is_err());

        // Labels are not visible inside nested functions
        builder.enter_function_scope();
        assert!(builder.check_label_target("outer", false).is_err());
        builder.exit_scope();

        builder.pop_label();
        assert!(builder.check_label_target("inner", false).is_err());
    }
}
