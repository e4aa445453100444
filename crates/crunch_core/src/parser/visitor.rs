//! Read-only AST traversal.
//!
//! [`Visit`] offers one hook per node category; each default implementation
//! delegates to the matching `walk_*` free function, which recurses into the
//! node's children in the same fixed order [`crate::parser::ast::AstNode`]
//! enumerates them. Override a hook to observe (or prune) a subtree; call
//! the `walk_*` function yourself to continue the default descent. Absent
//! optional children are simply skipped. The traversal never mutates.

use crate::parser::ast::{Block, Expr, Function, Stmt, SwitchCase};

/// A read-only, pre-order AST visitor.
pub trait Visit {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function);
    }

    fn visit_switch_case(&mut self, case: &SwitchCase) {
        walk_switch_case(self, case);
    }
}

/// Visit every statement of `block` in order.
pub fn walk_block<V: Visit + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

/// Visit a function's body. Parameter names are plain identifiers, not
/// expressions, so the body is the only child.
pub fn walk_function<V: Visit + ?Sized>(v: &mut V, function: &Function) {
    v.visit_block(&function.body);
}

/// Visit a switch case's test (when present) and body statements.
pub fn walk_switch_case<V: Visit + ?Sized>(v: &mut V, case: &SwitchCase) {
    if let Some(test) = &case.test {
        v.visit_expr(test);
    }
    for stmt in &case.body {
        v.visit_stmt(stmt);
    }
}

/// Visit the children of `stmt` in grammar order.
pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Block(b) => v.visit_block(b),
        Stmt::Empty(_)
        | Stmt::Continue(_)
        | Stmt::Break(_)
        | Stmt::Debugger(_)
        | Stmt::Directive(_)
        | Stmt::ImportantComment(..) => {}
        Stmt::Var(var) => {
            for decl in &var.decls {
                if let Some(init) = &decl.init {
                    v.visit_expr(init);
                }
            }
        }
        Stmt::Expr(e) => v.visit_expr(&e.expr),
        Stmt::If(i) => {
            v.visit_expr(&i.condition);
            v.visit_block(&i.true_branch);
            if let Some(b) = &i.false_branch {
                v.visit_block(b);
            }
        }
        Stmt::For(f) => {
            if let Some(init) = &f.init {
                v.visit_stmt(init);
            }
            if let Some(c) = &f.condition {
                v.visit_expr(c);
            }
            if let Some(u) = &f.update {
                v.visit_expr(u);
            }
            v.visit_block(&f.body);
        }
        Stmt::ForIn(f) => {
            v.visit_stmt(&f.left);
            v.visit_expr(&f.right);
            v.visit_block(&f.body);
        }
        Stmt::While(w) => {
            v.visit_expr(&w.condition);
            v.visit_block(&w.body);
        }
        Stmt::DoWhile(d) => {
            v.visit_block(&d.body);
            v.visit_expr(&d.condition);
        }
        Stmt::Return(r) => {
            if let Some(value) = &r.value {
                v.visit_expr(value);
            }
        }
        Stmt::With(w) => {
            v.visit_expr(&w.object);
            v.visit_block(&w.body);
        }
        Stmt::Switch(s) => {
            v.visit_expr(&s.discriminant);
            for case in &s.cases {
                v.visit_switch_case(case);
            }
        }
        Stmt::Labeled(l) => v.visit_stmt(&l.body),
        Stmt::Throw(t) => v.visit_expr(&t.value),
        Stmt::Try(t) => {
            v.visit_block(&t.block);
            if let Some(c) = &t.catch {
                v.visit_block(&c.body);
            }
            if let Some(f) = &t.finally {
                v.visit_block(f);
            }
        }
        Stmt::FunctionDecl(f) => v.visit_function(f),
    }
}

/// Visit the children of `expr` in grammar order.
pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Null(_)
        | Expr::True(_)
        | Expr::False(_)
        | Expr::This(_)
        | Expr::Num(_)
        | Expr::Str(_)
        | Expr::Regex(_)
        | Expr::Ident(_)
        | Expr::EmbeddedBlock(..) => {}
        Expr::Array(a) => {
            for element in a.elements.iter().flatten() {
                v.visit_expr(element);
            }
        }
        Expr::Object(o) => {
            for prop in &o.properties {
                v.visit_expr(&prop.value);
            }
        }
        Expr::Function(f) => v.visit_function(f),
        Expr::Unary(u) => v.visit_expr(&u.operand),
        Expr::Postfix(p) => v.visit_expr(&p.operand),
        Expr::Binary(b) => {
            v.visit_expr(&b.left);
            v.visit_expr(&b.right);
        }
        Expr::Assign(a) => {
            v.visit_expr(&a.left);
            v.visit_expr(&a.right);
        }
        Expr::Conditional(c) => {
            v.visit_expr(&c.condition);
            v.visit_expr(&c.if_true);
            v.visit_expr(&c.if_false);
        }
        Expr::Sequence(s) => {
            for e in &s.exprs {
                v.visit_expr(e);
            }
        }
        Expr::Member(m) => v.visit_expr(&m.object),
        Expr::Index(i) => {
            v.visit_expr(&i.object);
            v.visit_expr(&i.index);
        }
        Expr::Call(c) => {
            v.visit_expr(&c.callee);
            for arg in &c.args {
                v.visit_expr(arg);
            }
        }
        Expr::New(n) => {
            v.visit_expr(&n.callee);
            for arg in &n.args {
                v.visit_expr(arg);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{
        BinaryExpr, BinaryOp, Block, ExprStmt, Ident, IfStmt, NumLit,
    };
    use crate::parser::scanner::Span;

    fn sp() -> Span {
        Span::default()
    }

    fn ident(name: &str) -> Expr {
        Expr::Ident(Ident {
            span: sp(),
            name: name.to_string(),
        })
    }

    /// Records identifier names in visit order.
    struct NameCollector {
        names: Vec<String>,
    }

    impl Visit for NameCollector {
        fn visit_expr(&mut self, expr: &Expr) {
            if let Expr::Ident(i) = expr {
                self.names.push(i.name.clone());
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn test_preorder_matches_grammar_order() {
        // if (a) b; else c;  — visit order a, b, c.
        let stmt = Stmt::If(Box::new(IfStmt {
            span: sp(),
            condition: ident("a"),
            true_branch: Block {
                span: sp(),
                stmts: vec![Stmt::Expr(ExprStmt {
                    span: sp(),
                    expr: ident("b"),
                    terminator: None,
                })],
            },
            false_branch: Some(Block {
                span: sp(),
                stmts: vec![Stmt::Expr(ExprStmt {
                    span: sp(),
                    expr: ident("c"),
                    terminator: None,
                })],
            }),
        }));
        let mut collector = NameCollector { names: vec![] };
        collector.visit_stmt(&stmt);
        assert_eq!(collector.names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_binary_left_before_right() {
        let e = Expr::Binary(Box::new(BinaryExpr {
            span: sp(),
            op: BinaryOp::Add,
            left: ident("x"),
            right: ident("y"),
        }));
        let mut collector = NameCollector { names: vec![] };
        collector.visit_expr(&e);
        assert_eq!(collector.names, vec!["x", "y"]);
    }

    #[test]
    fn test_absent_children_are_noops() {
        // return; — no value, nothing visited, no panic.
        struct CountExprs(usize);
        impl Visit for CountExprs {
            fn visit_expr(&mut self, expr: &Expr) {
                self.0 += 1;
                walk_expr(self, expr);
            }
        }
        let stmt = Stmt::Return(crate::parser::ast::ReturnStmt {
            span: sp(),
            value: None,
            terminator: None,
        });
        let mut counter = CountExprs(0);
        counter.visit_stmt(&stmt);
        assert_eq!(counter.0, 0);
    }

    #[test]
    fn test_pruning_by_not_walking() {
        // Override without calling walk: children are skipped.
        struct ShallowCount(usize);
        impl Visit for ShallowCount {
            fn visit_expr(&mut self, _expr: &Expr) {
                self.0 += 1;
                // no walk_expr: stop here
            }
        }
        let e = Expr::Binary(Box::new(BinaryExpr {
            span: sp(),
            op: BinaryOp::Mul,
            left: ident("a"),
            right: Expr::Num(NumLit {
                span: sp(),
                value: 2.0,
                raw: "2".to_string(),
            }),
        }));
        let mut counter = ShallowCount(0);
        counter.visit_expr(&e);
        assert_eq!(counter.0, 1);
    }
}
