//! # Kernel Emitters
//!
//! Turns one analyzed loop into a kernel program. Two variants exist:
//! an elementwise vector/scalar-tail kernel and a reduction kernel with a
//! group-local tree reduction plus an atomic global combine. Both are
//! explicit finite state machines over declarative block definitions; the
//! builder carries the only insertion point and lives for one emission.
//!
//! An emission failure is local to its loop: the caller reports it and
//! moves on to the next loop.

pub mod elementwise;
pub mod reduction;

use cspmd_analysis::walk::{strip_casts, walk_stmt_exprs};
use cspmd_frontend::ast::{self, Expr, Spanned, Stmt};
use tracing::debug;

use crate::{verify, BinOp, KernelDescriptor, KernelProgram, VerifyError};

/// Bytes per kernel element (`f32`)
pub const ELEMENT_SIZE_BYTES: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("kernel '{0}' references no buffer arguments")]
    NoArguments(String),
    #[error("kernel '{0}' was built from a non-vectorizable report")]
    ZeroWidth(String),
    #[error("{0} lowering is not implemented")]
    Unimplemented(&'static str),
    #[error("emitted kernel failed verification: {0}")]
    Verification(#[from] VerifyError),
}

/// Emits and verifies the kernel program for one loop.
///
/// The loop body is consulted for the elementwise operation shape and the
/// reduction combine operator; everything else comes from the descriptor.
pub fn emit_kernel(
    descriptor: &KernelDescriptor,
    body: &Spanned<Stmt>,
) -> Result<KernelProgram, EmitError> {
    if descriptor.vector_width == 0 {
        return Err(EmitError::ZeroWidth(descriptor.name.clone()));
    }
    let program = if descriptor.is_reduction {
        match detect_reduction_op(body) {
            Some(ast::BinaryOp::Add) | None => reduction::emit(descriptor)?,
            Some(_) => return Err(EmitError::Unimplemented("non-additive reduction")),
        }
    } else {
        let operation = detect_operation(body);
        elementwise::emit(descriptor, operation)?
    };
    verify(&program)?;
    debug!(
        kernel = %program.name,
        blocks = program.blocks.len(),
        barriers = program.barrier_count(),
        "emitted kernel"
    );
    Ok(program)
}

/// Finds the single arithmetic operation an elementwise body applies:
/// the first assignment whose value is `something op literal`. Returns the
/// operator and the constant operand; `None` selects the identity kernel.
pub fn detect_operation(body: &Spanned<Stmt>) -> Option<(BinOp, f32)> {
    let mut found = None;
    walk_stmt_exprs(body, &mut |expr| {
        if found.is_some() {
            return;
        }
        if let Expr::Assign { value, .. } = expr {
            if let Expr::Binary { op, right, .. } = strip_casts(value.value()) {
                if let Some(kernel_op) = lower_op(*op) {
                    match strip_casts(right.value()) {
                        Expr::FloatLit(constant) => found = Some((kernel_op, *constant as f32)),
                        Expr::IntLit(constant) => found = Some((kernel_op, *constant as f32)),
                        _ => {}
                    }
                }
            }
        }
    });
    found
}

/// The combine operator of the first compound assignment to a plain
/// variable, mirroring what the reduction detector matched.
fn detect_reduction_op(body: &Spanned<Stmt>) -> Option<ast::BinaryOp> {
    let mut found = None;
    walk_stmt_exprs(body, &mut |expr| {
        if found.is_some() {
            return;
        }
        if let Expr::CompoundAssign { op, target, .. } = expr {
            if matches!(strip_casts(target.value()), Expr::Ident(_)) {
                found = Some(*op);
            }
        }
    });
    found
}

const fn lower_op(op: ast::BinaryOp) -> Option<BinOp> {
    match op {
        ast::BinaryOp::Add => Some(BinOp::Add),
        ast::BinaryOp::Sub => Some(BinOp::Sub),
        ast::BinaryOp::Mul => Some(BinOp::Mul),
        ast::BinaryOp::Div => Some(BinOp::Div),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cspmd_frontend::parse_translation_unit;

    /// Body of the first loop in a snippet wrapped into a harness function.
    fn harness_body(body_src: &str) -> Spanned<Stmt> {
        let source = format!(
            "float total;\n\
             void harness(float* arr, float* out, int n) {{\n\
             \x20   int i;\n\
             \x20   float sum;\n\
             \x20   for (i = 0; i < n; i++) {{ {body_src} }}\n\
             }}\n"
        );
        let unit = parse_translation_unit(&source).expect("harness failed to parse");
        let func = unit.functions().next().expect("harness function missing");
        let loops = cspmd_analysis::find_loops(&func.body);
        let (for_loop, _) = loops.first().expect("harness loop missing");
        for_loop.body.as_ref().clone()
    }

    #[test]
    fn detects_multiply_by_float_constant() {
        let body = harness_body("arr[i] = arr[i] * 2.0f;");
        assert_eq!(detect_operation(&body), Some((BinOp::Mul, 2.0)));
    }

    #[test]
    fn detects_add_with_integer_constant() {
        let body = harness_body("arr[i] = arr[i] + 3;");
        assert_eq!(detect_operation(&body), Some((BinOp::Add, 3.0)));
    }

    #[test]
    fn copy_body_has_no_operation() {
        let body = harness_body("out[i] = arr[i];");
        assert_eq!(detect_operation(&body), None);
    }

    #[test]
    fn array_operand_is_not_a_constant_operation() {
        let body = harness_body("out[i] = arr[i] + out[i];");
        assert_eq!(detect_operation(&body), None);
    }

    #[test]
    fn additive_reduction_is_lowered() {
        let body = harness_body("sum += arr[i];");
        assert_eq!(detect_reduction_op(&body), Some(ast::BinaryOp::Add));
    }

    #[test]
    fn zero_width_descriptor_is_rejected() {
        use cspmd_analysis::VectorizationReport;

        let body = harness_body("arr[i] = arr[i] * 2.0f;");
        let descriptor = KernelDescriptor::from_report(
            "kernel_line_3".to_string(),
            &VectorizationReport::default(),
            vec!["arr".to_string()],
        );
        let err = emit_kernel(&descriptor, &body).unwrap_err();
        assert!(matches!(err, EmitError::ZeroWidth(_)));
    }

    #[test]
    fn multiplicative_reduction_is_a_capability_gap() {
        use cspmd_analysis::VectorizationReport;

        let body = harness_body("sum *= arr[i];");
        let report = VectorizationReport {
            is_vectorizable: true,
            recommended_width: 4,
            is_reduction: true,
            reduction_variable: Some("sum".to_string()),
            ..VectorizationReport::default()
        };
        let descriptor = KernelDescriptor::from_report(
            "kernel_line_5".to_string(),
            &report,
            vec!["arr".to_string()],
        );
        let err = emit_kernel(&descriptor, &body).unwrap_err();
        assert!(matches!(err, EmitError::Unimplemented(_)));
    }
}
