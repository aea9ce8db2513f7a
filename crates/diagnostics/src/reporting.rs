//! # Error Reporting Utilities
//!
//! Formats diagnostics against their source text for terminal display.

use crate::Diagnostic;
use ariadne::{Config, Label, Report, Source};

/// Build a formatted message for a diagnostic
pub fn build_diagnostic_message(source: &str, diagnostic: &Diagnostic, with_color: bool) -> String {
    let mut write_buffer = Vec::new();
    let code_u32: u32 = diagnostic.code.into();
    let range = diagnostic.span.0..diagnostic.span.1;
    Report::build(diagnostic.severity.into(), ((), range.clone()))
        .with_config(
            Config::new()
                .with_index_type(ariadne::IndexType::Byte)
                .with_color(with_color),
        )
        .with_code(code_u32)
        .with_message(&diagnostic.message)
        .with_label(Label::new(((), range)).with_message(&diagnostic.message))
        .finish()
        .write(Source::from(source), &mut write_buffer)
        .expect("writing a report into a Vec cannot fail");
    String::from_utf8_lossy(&write_buffer).to_string()
}
