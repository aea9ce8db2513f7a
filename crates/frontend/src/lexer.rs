//! C Subset Lexer
//!
//! Converts C source text into a token sequence for the parser. The subset
//! covers what loop analysis needs: declarations, control flow, arithmetic,
//! subscripts, casts and calls. Both comment styles are skipped.

use cspmd_diagnostics::{Diagnostic, DiagnosticCode};
use logos::Logos;

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: (usize, usize),
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum TokenType {
    #[regex(r"[0-9]+\.[0-9]+[fF]?")]
    Float,
    #[regex(r"[0-9]+")]
    Int,

    // Type keywords
    #[token("void")]
    KwVoid,
    #[token("char")]
    KwChar,
    #[token("int")]
    KwInt,
    #[token("long")]
    KwLong,
    #[token("float")]
    KwFloat,
    #[token("double")]
    KwDouble,

    // Control flow keywords
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,

    #[regex(r"[a-zA-Z_][a-zA-Z_0-9]*")]
    Identifier,

    // Compound operators before their single-character prefixes
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("==")]
    DoubleEq,
    #[token("!=")]
    Neq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,

    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Equal,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,

    EOF,
}

impl TokenType {
    /// True for tokens that can start a type name
    pub const fn starts_type(self) -> bool {
        matches!(
            self,
            Self::KwVoid | Self::KwChar | Self::KwInt | Self::KwLong | Self::KwFloat | Self::KwDouble
        )
    }
}

/// Lexical analysis: converts source text into tokens plus any lexical
/// error diagnostics. Processing continues past unknown characters so a
/// single stray byte reports once rather than hiding later errors.
pub fn lex(input: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = TokenType::lexer(input);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    while let Some(result) = lexer.next() {
        let lexeme = lexer.slice().to_string();
        let span = (lexer.span().start, lexer.span().end);
        match result {
            Ok(token_type) => tokens.push(Token {
                token_type,
                lexeme,
                span,
            }),
            Err(()) => diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::LexicalError,
                    format!("Unknown token '{lexeme}'"),
                )
                .with_location(span),
            ),
        }
    }
    let end = input.len();
    tokens.push(Token {
        token_type: TokenType::EOF,
        lexeme: String::new(),
        span: (end, end),
    });
    (tokens, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenType> {
        let (tokens, diagnostics) = lex(input);
        assert!(diagnostics.is_empty(), "unexpected lex errors: {diagnostics:?}");
        tokens.into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn lexes_for_loop_header() {
        assert_eq!(
            kinds("for (i = 0; i < n; i++)"),
            vec![
                TokenType::For,
                TokenType::LParen,
                TokenType::Identifier,
                TokenType::Equal,
                TokenType::Int,
                TokenType::Semicolon,
                TokenType::Identifier,
                TokenType::Lt,
                TokenType::Identifier,
                TokenType::Semicolon,
                TokenType::Identifier,
                TokenType::PlusPlus,
                TokenType::RParen,
                TokenType::EOF,
            ]
        );
    }

    #[test]
    fn float_literal_with_suffix_is_one_token() {
        let (tokens, _) = lex("2.0f");
        assert_eq!(tokens[0].token_type, TokenType::Float);
        assert_eq!(tokens[0].lexeme, "2.0f");
    }

    #[test]
    fn compound_assign_beats_plus() {
        assert_eq!(
            kinds("sum += x"),
            vec![
                TokenType::Identifier,
                TokenType::PlusEq,
                TokenType::Identifier,
                TokenType::EOF
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("/* block */ int x; // line"),
            vec![
                TokenType::KwInt,
                TokenType::Identifier,
                TokenType::Semicolon,
                TokenType::EOF
            ]
        );
    }

    #[test]
    fn unknown_character_reports_and_continues() {
        let (tokens, diagnostics) = lex("int @ x");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(tokens.len(), 3); // int, x, EOF
    }
}
