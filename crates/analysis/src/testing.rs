//! Test Helpers
//!
//! Wraps loop-body snippets in a canonical harness function so each pass
//! can be exercised in isolation against realistic symbols.

use cspmd_frontend::ast::{Expr, Spanned, Stmt, TranslationUnit};
use cspmd_frontend::types::SymbolTable;
use cspmd_frontend::parse_translation_unit;

use crate::walk::collect_for_loops;

/// Source template every snippet is dropped into.
fn harness_source(body_src: &str) -> String {
    format!(
        "float total;\n\
         void harness(float* arr, float* brr, int* iarr, double* darr, int n) {{\n\
         \x20   int i;\n\
         \x20   float sum;\n\
         \x20   for (i = 0; i < n; i++) {{ {body_src} }}\n\
         }}\n"
    )
}

/// Parses a loop-body snippet into a translation unit.
pub fn harness_unit(body_src: &str) -> TranslationUnit {
    parse_translation_unit(&harness_source(body_src)).expect("harness snippet failed to parse")
}

/// The body of the harness loop wrapping `body_src`.
pub fn loop_body(body_src: &str) -> Spanned<Stmt> {
    let unit = harness_unit(body_src);
    let func = unit.functions().next().expect("harness function missing");
    let mut loops = Vec::new();
    collect_for_loops(&func.body, &mut loops);
    let (for_loop, _) = loops.first().expect("harness loop missing");
    for_loop.body.as_ref().clone()
}

/// The body of the harness loop plus the harness symbol table.
pub fn body_and_symbols(body_src: &str) -> (Spanned<Stmt>, SymbolTable) {
    let unit = harness_unit(body_src);
    let func = unit.functions().next().expect("harness function missing");
    let symbols = SymbolTable::for_function(&unit, func);
    let mut loops = Vec::new();
    collect_for_loops(&func.body, &mut loops);
    let (for_loop, _) = loops.first().expect("harness loop missing");
    (for_loop.body.as_ref().clone(), symbols)
}

/// Parses a bare loop condition like `i < 128`.
pub fn parse_condition(cond_src: &str) -> Spanned<Expr> {
    let source = format!(
        "void cond_harness(float* arr, int n) {{ int i; for (i = 0; {cond_src}; i++) {{ }} }}"
    );
    let unit = parse_translation_unit(&source).expect("condition snippet failed to parse");
    let func = unit.functions().next().expect("harness function missing");
    let mut loops = Vec::new();
    collect_for_loops(&func.body, &mut loops);
    let (for_loop, _) = loops.first().expect("harness loop missing");
    for_loop.cond.clone().expect("condition missing")
}
