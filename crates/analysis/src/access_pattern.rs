//! Access Pattern Scanner
//!
//! Finds loop-carried dependencies in array subscripts. The test is a
//! narrow syntactic pattern, not a dependence analysis: only a subscript
//! that subtracts the integer literal `1` from some base expression (the
//! canonical `a[i-1]` shape) counts. Additive offsets other than `-1`,
//! multiplicative index expressions, and aliasing through distinct arrays
//! are not detected; generalizing this is an open question, not an
//! oversight to fix in place.

use cspmd_frontend::ast::{BinaryOp, Expr, Spanned, Stmt};

use crate::walk::{strip_casts, walk_stmt_exprs};

/// Result of the dependency scan over one loop body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyScan {
    pub has_dependency: bool,
}

/// Scans every array subscript in the body for the `index - 1` shape.
pub fn scan(body: &Spanned<Stmt>) -> DependencyScan {
    let mut has_dependency = false;
    walk_stmt_exprs(body, &mut |expr| {
        if let Expr::Index { index, .. } = expr {
            if is_minus_one_offset(index.value()) {
                has_dependency = true;
            }
        }
    });
    DependencyScan { has_dependency }
}

fn is_minus_one_offset(index: &Expr) -> bool {
    if let Expr::Binary {
        op: BinaryOp::Sub,
        right,
        ..
    } = strip_casts(index)
    {
        return matches!(strip_casts(right.value()), Expr::IntLit(1));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::loop_body;

    #[test]
    fn detects_minus_one_subscript() {
        let body = loop_body("arr[i] = arr[i-1] + 1.0f;");
        assert!(scan(&body).has_dependency);
    }

    #[test]
    fn plain_subscript_has_no_dependency() {
        let body = loop_body("arr[i] = arr[i] * 2.0f;");
        assert!(!scan(&body).has_dependency);
    }

    #[test]
    fn other_offsets_are_not_detected() {
        // Deliberate narrowness: only the literal -1 shape flags
        let body = loop_body("arr[i] = arr[i-2] + arr[i+1];");
        assert!(!scan(&body).has_dependency);
    }

    #[test]
    fn dependency_found_inside_nested_branch() {
        let body = loop_body("if (i > 0) { arr[i] = arr[i-1]; }");
        assert!(scan(&body).has_dependency);
    }
}
