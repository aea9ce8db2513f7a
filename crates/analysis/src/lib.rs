//! # Loop Vectorization Analysis
//!
//! Multi-pass static analysis over one counted loop's syntax tree. Four
//! independent passes (access pattern, type uniformity, reduction shape,
//! trip count) plus the simple-pattern matcher each contribute ordered
//! rationale strings to a shared report; the decision engine reduces their
//! signals to a verdict and a vector width.
//!
//! Every pass is a pure fold over the immutable AST. The analyzer holds no
//! state across loops: each call to [`LoopAnalyzer::analyze`] produces a
//! fresh report, so analyzing the same loop twice yields identical results.

pub mod access_pattern;
pub mod arguments;
pub mod decision;
pub mod reduction;
pub mod simple_pattern;
pub mod trip_count;
pub mod type_uniformity;
pub mod walk;

#[cfg(test)]
pub mod testing;

pub use decision::{decide, Signals, Verdict, NARROW_WIDTH, WIDE_WIDTH};

use cspmd_diagnostics::RationaleSink;
use cspmd_frontend::ast::{Expr, ForLoop, Span, Spanned, Stmt};
use cspmd_frontend::types::{SymbolTable, TypeResolver};
use tracing::debug;

/// Read-only view of one counted loop, borrowed from the front-end's AST
/// for the duration of one analysis+emission cycle.
#[derive(Debug, Clone, Copy)]
pub struct LoopDescriptor<'ast> {
    pub init: Option<&'ast Spanned<Expr>>,
    pub cond: Option<&'ast Spanned<Expr>>,
    pub step: Option<&'ast Spanned<Expr>>,
    pub body: &'ast Spanned<Stmt>,
    /// 1-based source line of the `for` keyword, used for kernel naming
    pub line: u32,
}

impl<'ast> LoopDescriptor<'ast> {
    pub fn new(for_loop: &'ast ForLoop, line: u32) -> Self {
        Self {
            init: for_loop.init.as_ref(),
            cond: for_loop.cond.as_ref(),
            step: for_loop.step.as_ref(),
            body: &for_loop.body,
            line,
        }
    }
}

/// The combined result of analyzing one loop.
///
/// Invariant: `recommended_width > 0` exactly when `is_vectorizable`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorizationReport {
    pub is_vectorizable: bool,
    /// Ordered rationale trail, human readable
    pub reasons: Vec<String>,
    pub recommended_width: u32,
    pub is_reduction: bool,
    pub is_simple_pattern: bool,
    pub has_constant_trip_count: bool,
    pub trip_count: u64,
    /// Accumulator variable when `is_reduction`; drives the reduction
    /// kernel's result parameter
    pub reduction_variable: Option<String>,
}

impl VectorizationReport {
    /// Classification used in human-readable output
    pub const fn pattern_name(&self) -> &'static str {
        if self.is_reduction {
            "Reduction"
        } else if self.is_simple_pattern {
            "Simple arithmetic"
        } else {
            "General parallel"
        }
    }
}

/// Analyzes loops one at a time against a function's symbol table.
///
/// The symbol table is the only context; it is threaded in explicitly so
/// nothing leaks between loops or between files.
pub struct LoopAnalyzer<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> LoopAnalyzer<'a> {
    pub const fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// Runs all passes over one loop and combines their signals.
    pub fn analyze(&self, loop_desc: &LoopDescriptor<'_>) -> VectorizationReport {
        let mut report = VectorizationReport::default();

        let dependency = access_pattern::scan(loop_desc.body);
        if dependency.has_dependency {
            report.reasons.note(
                "Loop-carried dependency detected: array[i-1] access pattern".to_string(),
            );
        }

        if let Some(trip_count) = trip_count::analyze(loop_desc.cond) {
            report.has_constant_trip_count = true;
            report.trip_count = trip_count;
            report
                .reasons
                .note(format!("Loop trip count: {trip_count}"));
        }

        report.is_simple_pattern = simple_pattern::detect(loop_desc.body);
        if report.is_simple_pattern {
            report
                .reasons
                .note("Simple vectorizable pattern detected".to_string());
        }

        let reduction = reduction::detect(loop_desc.body);
        if let Some(variable) = &reduction.variable {
            report
                .reasons
                .note(format!("Reduction operation detected on variable: {variable}"));
        }
        report.is_reduction = reduction.is_reduction();
        report.reduction_variable = reduction.variable;

        let resolver = TypeResolver::new(self.symbols);
        let uniformity = type_uniformity::check(loop_desc.body, &resolver);
        if !uniformity.uniform {
            report
                .reasons
                .note("Mixed computation types detected in loop".to_string());
        }

        let verdict = decide(&Signals {
            has_dependency: dependency.has_dependency,
            uniform: uniformity.uniform,
            is_reduction: report.is_reduction,
            has_constant_trip_count: report.has_constant_trip_count,
            trip_count: report.trip_count,
            is_simple_pattern: report.is_simple_pattern,
        });
        report.is_vectorizable = verdict.is_vectorizable;
        report.recommended_width = verdict.recommended_width;

        if !report.is_vectorizable && dependency.has_dependency {
            report
                .reasons
                .note("Loop cannot be vectorized due to dependencies".to_string());
        }

        debug!(
            line = loop_desc.line,
            vectorizable = report.is_vectorizable,
            width = report.recommended_width,
            pattern = report.pattern_name(),
            "analyzed loop"
        );
        report
    }

    /// Collects the kernel argument list for one loop body.
    pub fn collect_arguments(&self, loop_desc: &LoopDescriptor<'_>) -> Vec<String> {
        arguments::collect(loop_desc.body, self.symbols)
    }
}

/// Finds every `for` loop in a function body (outermost first, nested
/// loops included), paired with its source span.
pub fn find_loops(body: &Spanned<Stmt>) -> Vec<(&ForLoop, Span)> {
    let mut loops = Vec::new();
    walk::collect_for_loops(body, &mut loops);
    loops
}
