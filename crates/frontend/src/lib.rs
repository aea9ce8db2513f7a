//! # C Front-End
//!
//! Lexer, parser, AST and typing layer for the analyzed C subset. The
//! analysis and emission crates only ever borrow the immutable AST this
//! crate produces; a file that fails to lex or parse is rejected whole.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod types;

pub use ast::{
    BinaryOp, CType, Expr, ForLoop, FunctionDef, Item, ParamDecl, Span, Spanned, Stmt,
    TranslationUnit, UnaryOp,
};
pub use types::{Storage, SymbolTable, TypeResolver, VarInfo};

use cspmd_diagnostics::Diagnostic;
use tracing::debug;

/// Parses a whole source file.
///
/// Returns every lexical error at once, or the first syntax error; a
/// translation unit is only produced from a clean token stream.
pub fn parse_translation_unit(source: &str) -> Result<TranslationUnit, Vec<Diagnostic>> {
    let (tokens, lex_diagnostics) = lexer::lex(source);
    if !lex_diagnostics.is_empty() {
        return Err(lex_diagnostics);
    }
    let unit = parser::Parser::new(tokens)
        .parse()
        .map_err(|diagnostic| vec![diagnostic])?;
    debug!(items = unit.items.len(), "parsed translation unit");
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_file() {
        let unit = parse_translation_unit(
            "void f(float* arr, int n) { int i; for (i = 0; i < n; i++) arr[i] = arr[i] + 1.0f; }",
        )
        .expect("should parse");
        assert_eq!(unit.functions().count(), 1);
    }

    #[test]
    fn rejects_lexical_garbage() {
        let err = parse_translation_unit("void f(void) { $ }").unwrap_err();
        assert!(!err.is_empty());
    }
}
