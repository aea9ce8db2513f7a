//! # Analysis Driver
//!
//! Per-file pipeline: parse the source, walk every function, analyze each
//! counted loop, and emit + verify a kernel program for every loop judged
//! vectorizable. A failed emission is reported for its loop and the run
//! continues; only a file that cannot be read or parsed fails the whole
//! invocation.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use cspmd_analysis::{find_loops, LoopAnalyzer, LoopDescriptor, VectorizationReport};
use cspmd_diagnostics::{line_number, Diagnostic};
use cspmd_frontend::parse_translation_unit;
use cspmd_frontend::types::SymbolTable;
use cspmd_kernel_ir::{emit_kernel, KernelDescriptor, KernelProgram, PrettyPrint};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' failed to parse", path.display())]
    Parse {
        path: PathBuf,
        source_text: String,
        diagnostics: Vec<Diagnostic>,
    },
}

/// Everything produced for one loop
#[derive(Debug)]
pub struct LoopOutcome {
    /// Enclosing function name
    pub function: String,
    /// 1-based source line of the `for` keyword
    pub line: u32,
    pub report: VectorizationReport,
    /// The verified kernel, when emission succeeded
    pub kernel: Option<KernelProgram>,
    /// Why emission failed, when it did
    pub emit_error: Option<String>,
}

/// Results for a whole source file
#[derive(Debug, Default)]
pub struct FileAnalysis {
    pub outcomes: Vec<LoopOutcome>,
}

impl FileAnalysis {
    pub fn loops_analyzed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn kernels_emitted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.kernel.is_some()).count()
    }

    pub fn emissions_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.emit_error.is_some())
            .count()
    }
}

/// Parses and analyzes one source string.
pub fn analyze_source(source: &str) -> Result<FileAnalysis, Vec<Diagnostic>> {
    let unit = parse_translation_unit(source)?;
    let mut analysis = FileAnalysis::default();
    for func in unit.functions() {
        let symbols = SymbolTable::for_function(&unit, func);
        let analyzer = LoopAnalyzer::new(&symbols);
        for (for_loop, span) in find_loops(&func.body) {
            let line = line_number(source, span.0);
            let loop_desc = LoopDescriptor::new(for_loop, line);
            let report = analyzer.analyze(&loop_desc);

            let mut outcome = LoopOutcome {
                function: func.name.clone(),
                line,
                report,
                kernel: None,
                emit_error: None,
            };
            if outcome.report.is_vectorizable {
                let arguments = analyzer.collect_arguments(&loop_desc);
                let descriptor = KernelDescriptor::from_report(
                    format!("kernel_line_{line}"),
                    &outcome.report,
                    arguments,
                );
                match emit_kernel(&descriptor, loop_desc.body) {
                    Ok(program) => outcome.kernel = Some(program),
                    Err(error) => {
                        warn!(line, %error, "kernel emission failed");
                        outcome.emit_error = Some(error.to_string());
                    }
                }
            }
            analysis.outcomes.push(outcome);
        }
    }
    debug!(
        loops = analysis.loops_analyzed(),
        kernels = analysis.kernels_emitted(),
        "file analysis complete"
    );
    Ok(analysis)
}

/// Reads and analyzes one file.
pub fn analyze_path(path: &Path) -> Result<FileAnalysis, DriverError> {
    let source = std::fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    analyze_source(&source).map_err(|diagnostics| DriverError::Parse {
        path: path.to_path_buf(),
        source_text: source,
        diagnostics,
    })
}

/// Renders one loop's analysis the way the CLI prints it.
pub fn render_outcome(outcome: &LoopOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nFor loop in '{}' (line {}):",
        outcome.function, outcome.line
    );
    let _ = writeln!(out, "\nVectorization Analysis:");
    let _ = writeln!(out, "-------------------------");
    for reason in &outcome.report.reasons {
        let _ = writeln!(out, "- {reason}");
    }
    if outcome.report.is_vectorizable {
        let _ = writeln!(out, "\nVectorization Analysis Details:");
        let _ = writeln!(out, "- Pattern: {}", outcome.report.pattern_name());
        let _ = writeln!(out, "- Vector width: {}", outcome.report.recommended_width);
        let trip = if outcome.report.has_constant_trip_count {
            outcome.report.trip_count.to_string()
        } else {
            "Variable".to_string()
        };
        let _ = writeln!(out, "- Trip count: {trip}");
        match (&outcome.kernel, &outcome.emit_error) {
            (Some(kernel), _) => {
                let _ = writeln!(out, "\nGenerated kernel:");
                let _ = writeln!(out, "-------------------------");
                out.push_str(&kernel.pretty_print(0));
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "\nFailed to generate kernel: {error}");
            }
            (None, None) => {}
        }
    } else {
        let _ = writeln!(out, "\nLoop is not vectorizable");
    }
    out
}
