//! Scope and binding analysis.
//!
//! A separate pass over a parsed program that builds a [`ScopeTree`]:
//! which scopes exist, what names each declares, and how lookups resolve
//! through the parent chain. `var` and function declarations hoist to the
//! nearest function (or global) scope; `let`/`const` bind in the immediately
//! enclosing block scope, and re-declaring one there is reported as a
//! diagnostic.
//!
//! The pass runs on the [`crate::parser::visitor::Visit`] traversal and
//! never mutates the tree. Identifier renaming is a consumer of this
//! information, not part of it.

use std::collections::HashMap;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::parser::ast::{Block, DeclKind, Expr, Function, Stmt};
use crate::parser::scanner::Span;
use crate::parser::visitor::{self, Visit};

// ─────────────────────────────────────────────────────────────────────────────
// Scope model
// ─────────────────────────────────────────────────────────────────────────────

/// Index of a scope within a [`ScopeTree`].
pub type ScopeId = usize;

/// What kind of construct introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The top-level program scope.
    Global,
    /// A function body (parameters and `var`s land here).
    Function,
    /// A brace block or `for` head holding lexical declarations.
    Block,
    /// A `catch (e)` clause scoping its parameter.
    Catch,
    /// A `with` body. Lookups inside cannot be resolved statically.
    With,
}

/// How a name was introduced into its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    /// A function declaration's name.
    FunctionDecl,
    /// A function parameter.
    Param,
    /// A catch clause parameter.
    CatchParam,
    /// A named function expression's own name, visible only inside it.
    FunctionExprName,
}

impl BindingKind {
    /// Lexical bindings may not be redeclared in the same scope.
    pub fn is_lexical(self) -> bool {
        matches!(self, BindingKind::Let | BindingKind::Const)
    }
}

/// A single declared name.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Where the name was declared.
    pub span: Span,
    /// Number of identifier references that resolved to this binding.
    pub references: usize,
}

/// One scope: its kind, parent, and declared names.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    bindings: HashMap<String, Binding>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            bindings: HashMap::new(),
        }
    }

    /// The binding for `name` declared directly in this scope.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// All names declared directly in this scope.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// `true` when `var` declarations hoist no further than this scope.
    fn is_var_boundary(&self) -> bool {
        matches!(self.kind, ScopeKind::Global | ScopeKind::Function)
    }
}

/// The complete scope structure of one program.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    /// Names referenced but never declared anywhere on their parent chain.
    pub unresolved: Vec<(String, Span)>,
}

impl ScopeTree {
    fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, None)],
            unresolved: Vec::new(),
        }
    }

    /// The global scope's id. Always `0`.
    pub fn global(&self) -> ScopeId {
        0
    }

    /// Borrow a scope by id.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Total number of scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // the global scope always exists
    }

    fn push(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope::new(kind, Some(parent)));
        self.scopes.len() - 1
    }

    /// The nearest scope at or above `from` where `var` declarations land.
    fn var_scope(&self, from: ScopeId) -> ScopeId {
        let mut id = from;
        loop {
            if self.scopes[id].is_var_boundary() {
                return id;
            }
            match self.scopes[id].parent {
                Some(p) => id = p,
                None => return id,
            }
        }
    }

    /// Resolve `name` starting at `scope`, walking the parent chain.
    /// Returns the scope that declares it.
    pub fn lookup(&self, mut scope: ScopeId, name: &str) -> Option<ScopeId> {
        loop {
            if self.scopes[scope].bindings.contains_key(name) {
                return Some(scope);
            }
            scope = self.scopes[scope].parent?;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis pass
// ─────────────────────────────────────────────────────────────────────────────

/// Result of [`analyze`].
pub struct ScopeAnalysis {
    pub tree: ScopeTree,
    /// Duplicate lexical declarations and similar binding problems.
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the scope tree for a parsed program.
pub fn analyze(program: &Block) -> ScopeAnalysis {
    let mut builder = ScopeBuilder {
        tree: ScopeTree::new(),
        current: 0,
        diagnostics: Vec::new(),
    };
    // Two passes over each scope body would be needed for perfect forward
    // `var` hoisting visibility; declarations and references are instead
    // collected in one walk and unresolved names re-checked at the end,
    // which yields the same tree.
    builder.visit_block(program);
    builder.resolve_pending();
    ScopeAnalysis {
        tree: builder.tree,
        diagnostics: builder.diagnostics,
    }
}

struct ScopeBuilder {
    tree: ScopeTree,
    current: ScopeId,
    diagnostics: Vec<Diagnostic>,
}

impl ScopeBuilder {
    fn declare(&mut self, name: &str, kind: BindingKind, span: Span) {
        let target = if matches!(kind, BindingKind::Var | BindingKind::FunctionDecl) {
            self.tree.var_scope(self.current)
        } else {
            self.current
        };
        let scope = &mut self.tree.scopes[target];
        if let Some(existing) = scope.bindings.get(name) {
            if kind.is_lexical() || existing.kind.is_lexical() {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::DuplicateLexicalDeclaration,
                    span,
                    format!("'{name}' has already been declared"),
                ));
                return;
            }
            // var-on-var redeclaration is legal and merges.
            return;
        }
        scope.bindings.insert(
            name.to_string(),
            Binding {
                name: name.to_string(),
                kind,
                span,
                references: 0,
            },
        );
    }

    fn reference(&mut self, name: &str, span: Span) {
        match self.tree.lookup(self.current, name) {
            Some(scope) => {
                if let Some(b) = self.tree.scopes[scope].bindings.get_mut(name) {
                    b.references += 1;
                }
            }
            None => self.tree.unresolved.push((name.to_string(), span)),
        }
    }

    /// Drop unresolved entries that a later (hoisted) declaration satisfied.
    fn resolve_pending(&mut self) {
        let tree = &self.tree;
        let still_unresolved: Vec<_> = tree
            .unresolved
            .iter()
            .filter(|(name, _)| tree.lookup(tree.global(), name).is_none())
            .cloned()
            .collect();
        self.tree.unresolved = still_unresolved;
    }

    fn in_scope(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self)) {
        let parent = self.current;
        self.current = self.tree.push(kind, parent);
        f(self);
        self.current = parent;
    }

    /// Whether a block introduces lexical declarations needing its own scope.
    fn has_lexical_decls(block: &Block) -> bool {
        block.stmts.iter().any(|s| {
            matches!(s, Stmt::Var(v) if matches!(v.kind, DeclKind::Let | DeclKind::Const))
        })
    }
}

impl Visit for ScopeBuilder {
    fn visit_function(&mut self, function: &Function) {
        self.in_scope(ScopeKind::Function, |b| {
            for param in &function.params {
                b.declare(&param.name, BindingKind::Param, param.span);
            }
            visitor::walk_function(b, function);
        });
    }

    fn visit_block(&mut self, block: &Block) {
        // Only blocks carrying let/const need a scope of their own;
        // var-only blocks are transparent.
        if Self::has_lexical_decls(block) {
            self.in_scope(ScopeKind::Block, |b| visitor::walk_block(b, block));
        } else {
            visitor::walk_block(self, block);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(var) => {
                let kind = match var.kind {
                    DeclKind::Var => BindingKind::Var,
                    DeclKind::Let => BindingKind::Let,
                    DeclKind::Const => BindingKind::Const,
                };
                for decl in &var.decls {
                    self.declare(&decl.name.name, kind, decl.name.span);
                    if let Some(init) = &decl.init {
                        self.visit_expr(init);
                    }
                }
            }
            Stmt::FunctionDecl(f) => {
                if let Some(name) = &f.name {
                    self.declare(&name.name, BindingKind::FunctionDecl, name.span);
                }
                self.visit_function(f);
            }
            Stmt::Try(t) => {
                self.visit_block(&t.block);
                if let Some(catch) = &t.catch {
                    self.in_scope(ScopeKind::Catch, |b| {
                        b.declare(&catch.param.name, BindingKind::CatchParam, catch.param.span);
                        b.visit_block(&catch.body);
                    });
                }
                if let Some(finally) = &t.finally {
                    self.visit_block(finally);
                }
            }
            Stmt::With(w) => {
                self.visit_expr(&w.object);
                self.in_scope(ScopeKind::With, |b| b.visit_block(&w.body));
            }
            Stmt::For(f) => {
                // A lexical for-head (`for (let i…`) scopes the whole loop.
                let lexical = matches!(
                    f.init.as_deref(),
                    Some(Stmt::Var(v)) if matches!(v.kind, DeclKind::Let | DeclKind::Const)
                );
                if lexical {
                    self.in_scope(ScopeKind::Block, |b| visitor::walk_stmt(b, stmt));
                } else {
                    visitor::walk_stmt(self, stmt);
                }
            }
            Stmt::ForIn(f) => {
                let lexical = matches!(
                    &*f.left,
                    Stmt::Var(v) if matches!(v.kind, DeclKind::Let | DeclKind::Const)
                );
                if lexical {
                    self.in_scope(ScopeKind::Block, |b| visitor::walk_stmt(b, stmt));
                } else {
                    visitor::walk_stmt(self, stmt);
                }
            }
            _ => visitor::walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(i) => self.reference(&i.name, i.span),
            Expr::Function(f) => {
                // A named function expression sees its own name.
                self.in_scope(ScopeKind::Function, |b| {
                    if let Some(name) = &f.name {
                        b.declare(&name.name, BindingKind::FunctionExprName, name.span);
                    }
                    for param in &f.params {
                        b.declare(&param.name, BindingKind::Param, param.span);
                    }
                    visitor::walk_function(b, f);
                });
            }
            // Member property names are not identifier references.
            Expr::Member(m) => self.visit_expr(&m.object),
            _ => visitor::walk_expr(self, expr),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::settings::CodeSettings;

    fn analyze_src(src: &str) -> ScopeAnalysis {
        let settings = CodeSettings::default();
        let result = Parser::new(src, &settings).parse();
        analyze(&result.program)
    }

    // ── Declarations ──────────────────────────────────────────────────────────

    #[test]
    fn test_global_var() {
        let a = analyze_src("var x = 1;");
        let global = a.tree.scope(a.tree.global());
        assert_eq!(global.kind, ScopeKind::Global);
        assert_eq!(global.binding("x").unwrap().kind, BindingKind::Var);
    }

    #[test]
    fn test_var_hoists_out_of_block() {
        let a = analyze_src("{ var x = 1; let y = 2; }");
        // x lands in the global scope even though declared inside braces.
        assert!(a.tree.scope(a.tree.global()).binding("x").is_some());
        assert!(a.tree.scope(a.tree.global()).binding("y").is_none());
    }

    #[test]
    fn test_function_scope_holds_params_and_vars() {
        let a = analyze_src("function f(a, b) { var c; }");
        let global = a.tree.scope(a.tree.global());
        assert_eq!(global.binding("f").unwrap().kind, BindingKind::FunctionDecl);
        // The function scope is a child of global.
        let fscope = (1..a.tree.len())
            .find(|&id| a.tree.scope(id).kind == ScopeKind::Function)
            .expect("function scope exists");
        assert_eq!(
            a.tree.scope(fscope).binding("a").unwrap().kind,
            BindingKind::Param
        );
        assert!(a.tree.scope(fscope).binding("c").is_some());
    }

    #[test]
    fn test_catch_param_scope() {
        let a = analyze_src("try { x(); } catch (e) { e; }");
        let catch = (1..a.tree.len())
            .find(|&id| a.tree.scope(id).kind == ScopeKind::Catch)
            .expect("catch scope exists");
        let binding = a.tree.scope(catch).binding("e").unwrap();
        assert_eq!(binding.kind, BindingKind::CatchParam);
        assert_eq!(binding.references, 1);
    }

    // ── Duplicates ────────────────────────────────────────────────────────────

    #[test]
    fn test_duplicate_let_reported() {
        let a = analyze_src("let x = 1; let x = 2;");
        assert!(a
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DuplicateLexicalDeclaration));
    }

    #[test]
    fn test_var_redeclaration_allowed() {
        let a = analyze_src("var x = 1; var x = 2;");
        assert!(a.diagnostics.is_empty());
    }

    #[test]
    fn test_let_shadowing_in_inner_block_allowed() {
        let a = analyze_src("let x = 1; { let x = 2; }");
        assert!(a.diagnostics.is_empty());
    }

    // ── Lookup & references ───────────────────────────────────────────────────

    #[test]
    fn test_lookup_walks_parent_chain() {
        let a = analyze_src("var x; function f() { x = 1; }");
        let fscope = (1..a.tree.len())
            .find(|&id| a.tree.scope(id).kind == ScopeKind::Function)
            .unwrap();
        assert_eq!(a.tree.lookup(fscope, "x"), Some(a.tree.global()));
        assert_eq!(a.tree.lookup(fscope, "nope"), None);
    }

    #[test]
    fn test_unresolved_reference_recorded() {
        let a = analyze_src("undeclared();");
        assert!(a.tree.unresolved.iter().any(|(n, _)| n == "undeclared"));
    }

    #[test]
    fn test_hoisted_use_before_declaration_resolves() {
        let a = analyze_src("f(); function f() {}");
        assert!(a.tree.unresolved.is_empty());
    }

    #[test]
    fn test_reference_counting() {
        let a = analyze_src("var x; x; x; x;");
        let b = a.tree.scope(a.tree.global()).binding("x").unwrap();
        assert_eq!(b.references, 3);
    }

    #[test]
    fn test_lexical_for_head_scopes_loop() {
        let a = analyze_src("for (let i = 0; i < 3; i++) { i; }");
        // `i` is not visible at global scope.
        assert!(a.tree.scope(a.tree.global()).binding("i").is_none());
        assert!(a.tree.unresolved.is_empty());
    }
}
