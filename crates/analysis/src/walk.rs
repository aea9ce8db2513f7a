//! AST Folding Helpers
//!
//! Every analysis pass is a pure fold over the immutable AST: a pre-order
//! traversal feeding each expression node to a closure. No pass keeps
//! traversal state of its own.

use cspmd_frontend::ast::{Expr, ForLoop, Spanned, Stmt};

/// Pre-order walk over every expression in a statement subtree,
/// including expressions nested in control-flow constructs.
pub fn walk_stmt_exprs<'ast, F: FnMut(&'ast Expr)>(stmt: &'ast Spanned<Stmt>, f: &mut F) {
    match stmt.value() {
        Stmt::Declaration { init, .. } => {
            if let Some(init) = init {
                walk_expr(init.value(), f);
            }
        }
        Stmt::For(for_loop) => {
            for expr in [&for_loop.init, &for_loop.cond, &for_loop.step]
                .into_iter()
                .flatten()
            {
                walk_expr(expr.value(), f);
            }
            walk_stmt_exprs(&for_loop.body, f);
        }
        Stmt::While { cond, body } => {
            walk_expr(cond.value(), f);
            walk_stmt_exprs(body, f);
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            walk_expr(cond.value(), f);
            walk_stmt_exprs(then_branch, f);
            if let Some(else_branch) = else_branch {
                walk_stmt_exprs(else_branch, f);
            }
        }
        Stmt::Return(value) => {
            if let Some(value) = value {
                walk_expr(value.value(), f);
            }
        }
        Stmt::Expr(expr) => walk_expr(expr.value(), f),
        Stmt::Block(stmts) => {
            for inner in stmts {
                walk_stmt_exprs(inner, f);
            }
        }
    }
}

/// Pre-order walk over an expression and all of its subexpressions
pub fn walk_expr<'ast, F: FnMut(&'ast Expr)>(expr: &'ast Expr, f: &mut F) {
    f(expr);
    match expr {
        Expr::IntLit(_) | Expr::FloatLit(_) | Expr::Ident(_) => {}
        Expr::Unary { operand, .. } => walk_expr(operand.value(), f),
        Expr::Binary { left, right, .. } => {
            walk_expr(left.value(), f);
            walk_expr(right.value(), f);
        }
        Expr::Assign { target, value } | Expr::CompoundAssign { target, value, .. } => {
            walk_expr(target.value(), f);
            walk_expr(value.value(), f);
        }
        Expr::Index { base, index } => {
            walk_expr(base.value(), f);
            walk_expr(index.value(), f);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                walk_expr(arg.value(), f);
            }
        }
        Expr::Cast { operand, .. } => walk_expr(operand.value(), f),
    }
}

/// Strips explicit casts off an expression, the way the pattern checks
/// look through implicit conversions.
pub fn strip_casts(expr: &Expr) -> &Expr {
    let mut current = expr;
    while let Expr::Cast { operand, .. } = current {
        current = operand.value();
    }
    current
}

/// Collects every `for` loop in a statement subtree, outermost first,
/// including loops nested inside other loops and branches.
pub fn collect_for_loops<'ast>(
    stmt: &'ast Spanned<Stmt>,
    out: &mut Vec<(&'ast ForLoop, (usize, usize))>,
) {
    match stmt.value() {
        Stmt::For(for_loop) => {
            out.push((for_loop, stmt.span()));
            collect_for_loops(&for_loop.body, out);
        }
        Stmt::While { body, .. } => collect_for_loops(body, out),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_for_loops(then_branch, out);
            if let Some(else_branch) = else_branch {
                collect_for_loops(else_branch, out);
            }
        }
        Stmt::Block(stmts) => {
            for inner in stmts {
                collect_for_loops(inner, out);
            }
        }
        Stmt::Declaration { .. } | Stmt::Return(_) | Stmt::Expr(_) => {}
    }
}
