//! Type Uniformity Checker
//!
//! Kernels are emitted for a single uniform element type; implicit
//! narrowing or widening inside the loop body is a correctness risk for a
//! fixed-width vector kernel. This pass collects the element type of every
//! array subscript and the result type of every arithmetic computation,
//! excluding types that appear only as index expressions, and flags the
//! loop when more than one distinct numeric type remains.

use cspmd_frontend::ast::{CType, Expr, Spanned, Stmt};
use cspmd_frontend::types::TypeResolver;
use smallvec::SmallVec;

use crate::walk::walk_stmt_exprs;

/// Result of the uniformity scan over one loop body
#[derive(Debug, Clone, PartialEq)]
pub struct UniformityScan {
    pub uniform: bool,
    /// The distinct computation types found, in first-seen order
    pub computation_types: SmallVec<[CType; 4]>,
}

/// Checks that all computation in the body happens in one numeric type.
pub fn check(body: &Spanned<Stmt>, resolver: &TypeResolver<'_>) -> UniformityScan {
    // Index expression types never count as computation types
    let mut index_types: SmallVec<[CType; 4]> = SmallVec::new();
    walk_stmt_exprs(body, &mut |expr| {
        if let Expr::Index { index, .. } = expr {
            if let Some(ty) = resolver.type_of(index.value()) {
                insert_unique(&mut index_types, ty);
            }
        }
    });

    let mut computation_types: SmallVec<[CType; 4]> = SmallVec::new();
    walk_stmt_exprs(body, &mut |expr| match expr {
        Expr::Index { .. } => {
            // The element type a subscript reads or writes
            if let Some(ty) = resolver.type_of(expr) {
                if ty.is_numeric() {
                    insert_unique(&mut computation_types, ty);
                }
            }
        }
        Expr::Binary { op, .. } if op.is_computation() => {
            if let Some(ty) = resolver.type_of(expr) {
                if ty.is_numeric() && !index_types.contains(&ty) {
                    insert_unique(&mut computation_types, ty);
                }
            }
        }
        Expr::CompoundAssign { .. } => {
            if let Some(ty) = resolver.type_of(expr) {
                if ty.is_numeric() && !index_types.contains(&ty) {
                    insert_unique(&mut computation_types, ty);
                }
            }
        }
        _ => {}
    });

    UniformityScan {
        uniform: computation_types.len() <= 1,
        computation_types,
    }
}

fn insert_unique(types: &mut SmallVec<[CType; 4]>, ty: CType) {
    if !types.contains(&ty) {
        types.push(ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::body_and_symbols;

    fn scan(body_src: &str) -> UniformityScan {
        let (body, symbols) = body_and_symbols(body_src);
        let resolver = TypeResolver::new(&symbols);
        check(&body, &resolver)
    }

    #[test]
    fn single_float_type_is_uniform() {
        let result = scan("arr[i] = arr[i] * 2.0f;");
        assert!(result.uniform);
        assert_eq!(result.computation_types.as_slice(), &[CType::Float]);
    }

    #[test]
    fn float_and_int_subscripts_are_mixed() {
        // Scenario D: arr[i] = (float)iarr[i]
        let result = scan("arr[i] = (float)iarr[i];");
        assert!(!result.uniform);
        assert_eq!(result.computation_types.len(), 2);
    }

    #[test]
    fn index_arithmetic_does_not_poison_uniformity() {
        // i + 1 is int computation, but int appears only as an index type
        let result = scan("arr[i] = arr[i + 1] * 2.0f;");
        assert!(result.uniform);
    }

    #[test]
    fn reduction_body_is_uniform() {
        let result = scan("sum += arr[i];");
        assert!(result.uniform);
    }

    #[test]
    fn float_and_double_mix_is_detected() {
        let result = scan("arr[i] = darr[i] * 2.0f;");
        assert!(!result.uniform);
    }
}
