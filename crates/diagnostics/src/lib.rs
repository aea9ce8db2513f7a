//! # Diagnostic System
//!
//! This crate provides the diagnostic infrastructure shared by the front-end
//! and the loop analysis pipeline: a severity/code/span diagnostic type, a
//! rendering helper built on `ariadne`, and the ordered rationale sink the
//! analysis passes write their reasoning into.

use std::fmt;

pub mod reporting;

pub use reporting::build_diagnostic_message;

/// A half-open byte range into the analyzed source file.
pub type Span = (usize, usize);

/// A diagnostic message produced while processing a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Source span where this diagnostic applies
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl From<DiagnosticSeverity> for ariadne::ReportKind<'static> {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Error => Self::Error,
            DiagnosticSeverity::Warning => Self::Warning,
            DiagnosticSeverity::Info => Self::Advice,
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    // Front-end errors
    LexicalError,
    SyntaxError,
    UnexpectedToken,
    UnexpectedEndOfFile,

    // Per-loop, non-fatal emission problems
    EmissionFailed,
}

impl From<DiagnosticCode> for u32 {
    fn from(code: DiagnosticCode) -> Self {
        match code {
            DiagnosticCode::LexicalError => 1,
            DiagnosticCode::SyntaxError => 2,
            DiagnosticCode::UnexpectedToken => 3,
            DiagnosticCode::UnexpectedEndOfFile => 4,
            DiagnosticCode::EmissionFailed => 2001,
        }
    }
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message,
            span: (0, 0),
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code,
            message,
            span: (0, 0),
        }
    }

    /// Add location information to this diagnostic
    pub const fn with_location(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Convenience method for an unexpected-token parse error
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::error(
            DiagnosticCode::UnexpectedToken,
            format!("Expected {expected}, found '{found}'"),
        )
        .with_location(span)
    }

    /// Convenience method for a per-loop emission failure
    pub fn emission_failed(kernel: &str, reason: &str, span: Span) -> Self {
        Self::warning(
            DiagnosticCode::EmissionFailed,
            format!("Failed to emit kernel '{kernel}': {reason}"),
        )
        .with_location(span)
    }
}

/// Ordered sink for analysis rationale strings.
///
/// Every analysis pass explains itself through this interface; the order of
/// `note` calls is the order the rationale trail is reported in.
pub trait RationaleSink {
    fn note(&mut self, reason: String);
}

impl RationaleSink for Vec<String> {
    fn note(&mut self, reason: String) {
        self.push(reason);
    }
}

/// Maps a byte offset to a 1-based source line number.
///
/// Used for kernel naming and loop locations; offsets past the end of the
/// source land on the last line.
pub fn line_number(source: &str, offset: usize) -> u32 {
    let upto = offset.min(source.len());
    source[..upto].bytes().filter(|&b| b == b'\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_one_based() {
        let src = "int a;\nint b;\nint c;\n";
        assert_eq!(line_number(src, 0), 1);
        assert_eq!(line_number(src, 7), 2);
        assert_eq!(line_number(src, 14), 3);
    }

    #[test]
    fn line_number_clamps_past_end() {
        let src = "x\ny";
        assert_eq!(line_number(src, 1000), 2);
    }

    #[test]
    fn rationale_sink_preserves_order() {
        let mut reasons: Vec<String> = Vec::new();
        reasons.note("first".to_string());
        reasons.note("second".to_string());
        assert_eq!(reasons, vec!["first", "second"]);
    }

    #[test]
    fn diagnostic_codes_are_stable() {
        assert_eq!(u32::from(DiagnosticCode::LexicalError), 1);
        assert_eq!(u32::from(DiagnosticCode::EmissionFailed), 2001);
    }
}
