//! Simple Pattern Matcher
//!
//! Recognizes the elementwise shape `subscript = subscript op literal`
//! with an arithmetic `op`, which is vectorizable even without a constant
//! trip count. A body that also contains the `a[i-1]` dependency shape is
//! never a simple pattern, whatever else it contains.

use cspmd_frontend::ast::{Expr, Spanned, Stmt};

use crate::access_pattern;
use crate::walk::{strip_casts, walk_stmt_exprs};

/// True when the body is a simple vectorizable elementwise pattern.
pub fn detect(body: &Spanned<Stmt>) -> bool {
    let mut is_simple = false;
    walk_stmt_exprs(body, &mut |expr| {
        if let Expr::Assign { target, value } = expr {
            if matches!(strip_casts(target.value()), Expr::Index { .. })
                && is_simple_operation(strip_casts(value.value()))
            {
                is_simple = true;
            }
        }
    });
    is_simple && !access_pattern::scan(body).has_dependency
}

/// `subscript op literal` with an additive or multiplicative operator
fn is_simple_operation(value: &Expr) -> bool {
    let Expr::Binary { op, left, right } = value else {
        return false;
    };
    if !op.is_computation() {
        return false;
    }
    let has_array_access = matches!(strip_casts(left.value()), Expr::Index { .. });
    let has_constant = matches!(
        strip_casts(right.value()),
        Expr::IntLit(_) | Expr::FloatLit(_)
    );
    has_array_access && has_constant
}
