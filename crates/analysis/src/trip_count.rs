//! Trip Count Analyzer
//!
//! Recognizes the one condition shape with a statically known iteration
//! count: `variable < integer-literal`. The original analyzer carried a
//! fallback that claimed "the compared variable is used only for loop
//! control" without ever checking it; that stub is removed here and no
//! secondary heuristic exists.

use cspmd_frontend::ast::{BinaryOp, Expr, Spanned};

use crate::walk::strip_casts;

/// Extracts the trip count from a loop condition of the shape
/// `variable < integer-literal`.
pub fn analyze(cond: Option<&Spanned<Expr>>) -> Option<u64> {
    let cond = cond?;
    let Expr::Binary {
        op: BinaryOp::Lt,
        left,
        right,
    } = strip_casts(cond.value())
    else {
        return None;
    };
    if !matches!(strip_casts(left.value()), Expr::Ident(_)) {
        return None;
    }
    match strip_casts(right.value()) {
        Expr::IntLit(n) => Some(*n),
        _ => None,
    }
}
