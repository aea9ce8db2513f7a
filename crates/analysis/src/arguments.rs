//! Argument Collector
//!
//! Gathers the ordered list of external variables a kernel must receive:
//! every referenced variable with global storage or pointer type, in
//! first-occurrence order, each name recorded once. The resulting sequence
//! becomes the kernel's pointer parameter list in the same order.

use cspmd_frontend::ast::{Expr, Spanned, Stmt};
use cspmd_frontend::types::SymbolTable;

use crate::walk::walk_stmt_exprs;

/// Collects kernel arguments from one loop body.
pub fn collect(body: &Spanned<Stmt>, symbols: &SymbolTable) -> Vec<String> {
    let mut arguments: Vec<String> = Vec::new();
    walk_stmt_exprs(body, &mut |expr| {
        if let Expr::Ident(name) = expr {
            if symbols.is_kernel_argument(name) && !arguments.iter().any(|a| a == name) {
                arguments.push(name.clone());
            }
        }
    });
    arguments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::body_and_symbols;

    fn collected(body_src: &str) -> Vec<String> {
        let (body, symbols) = body_and_symbols(body_src);
        collect(&body, &symbols)
    }

    #[test]
    fn pointer_parameters_are_collected_once() {
        assert_eq!(collected("arr[i] = arr[i] * 2.0f;"), vec!["arr"]);
    }

    #[test]
    fn first_occurrence_order_is_kept() {
        assert_eq!(
            collected("arr[i] = brr[i] + arr[i];"),
            vec!["arr", "brr"]
        );
    }

    #[test]
    fn scalars_and_loop_counters_are_not_arguments() {
        // i and sum are plain locals, n is a scalar parameter
        assert_eq!(collected("sum += arr[i];"), vec!["arr"]);
    }

    #[test]
    fn globals_are_collected() {
        // Pre-order: the assignment target is referenced before the value
        assert_eq!(
            collected("total += arr[i];").as_slice(),
            &["total", "arr"][..]
        );
    }
}
