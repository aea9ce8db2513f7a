//! C Subset Parser
//!
//! Hand-written recursive descent over the token stream. Parsing stops at
//! the first syntax error; the whole file is rejected, matching the
//! front-end failure contract (a file that does not parse is fatal for the
//! invocation, not per-loop).

use cspmd_diagnostics::{Diagnostic, DiagnosticCode};

use crate::ast::*;
use crate::lexer::{Token, TokenType};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

type ParseResult<T> = Result<T, Diagnostic>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        let idx = (self.current + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> ParseResult<Token> {
        if self.check(token_type) {
            return Ok(self.advance());
        }
        let found = self.peek();
        if found.token_type == TokenType::EOF {
            return Err(Diagnostic::error(
                DiagnosticCode::UnexpectedEndOfFile,
                format!("Expected {expected}, found end of file"),
            )
            .with_location(found.span));
        }
        Err(Diagnostic::unexpected_token(
            expected,
            &found.lexeme,
            found.span,
        ))
    }

    fn previous_end(&self) -> usize {
        self.tokens[self.current.saturating_sub(1)].span.1
    }

    /// Parses the whole token stream into a translation unit
    pub fn parse(&mut self) -> ParseResult<TranslationUnit> {
        let mut items = Vec::new();
        while !self.is_at_end() {
            items.push(self.item()?);
        }
        Ok(TranslationUnit { items })
    }

    // --- Items ---

    fn item(&mut self) -> ParseResult<Item> {
        let ty = self.type_name()?;
        let name = self.identifier()?;
        if self.check(TokenType::LParen) {
            self.function_def(ty, name).map(Item::Function)
        } else {
            let (ty, init) = self.declarator_tail(ty)?;
            self.consume(TokenType::Semicolon, "';'")?;
            Ok(Item::Global { ty, name, init })
        }
    }

    fn function_def(&mut self, return_type: CType, name: String) -> ParseResult<FunctionDef> {
        self.consume(TokenType::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenType::RParen) {
            // `void` alone means an empty parameter list
            if self.check(TokenType::KwVoid) && self.peek_ahead(1).token_type == TokenType::RParen {
                self.advance();
            } else {
                loop {
                    let ty = self.type_name()?;
                    let name = self.identifier()?;
                    params.push(ParamDecl { ty, name });
                    if !self.match_token(TokenType::Comma) {
                        break;
                    }
                }
            }
        }
        self.consume(TokenType::RParen, "')'")?;
        let body = self.block()?;
        Ok(FunctionDef {
            return_type,
            name,
            params,
            body,
        })
    }

    // --- Types ---

    fn type_name(&mut self) -> ParseResult<CType> {
        let token = self.peek().clone();
        let mut ty = match token.token_type {
            TokenType::KwVoid => CType::Void,
            TokenType::KwChar => CType::Char,
            TokenType::KwInt => CType::Int,
            TokenType::KwLong => CType::Long,
            TokenType::KwFloat => CType::Float,
            TokenType::KwDouble => CType::Double,
            _ => {
                return Err(Diagnostic::unexpected_token(
                    "a type name",
                    &token.lexeme,
                    token.span,
                ))
            }
        };
        self.advance();
        while self.match_token(TokenType::Star) {
            ty = CType::Pointer(Box::new(ty));
        }
        Ok(ty)
    }

    /// Optional array suffix and initializer after a declared name
    fn declarator_tail(&mut self, ty: CType) -> ParseResult<(CType, Option<Spanned<Expr>>)> {
        let ty = if self.match_token(TokenType::LBracket) {
            let len_token = self.consume(TokenType::Int, "an array length")?;
            let len = parse_int_literal(&len_token)?;
            self.consume(TokenType::RBracket, "']'")?;
            CType::Array(Box::new(ty), len)
        } else {
            ty
        };
        let init = if self.match_token(TokenType::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok((ty, init))
    }

    fn identifier(&mut self) -> ParseResult<String> {
        let token = self.consume(TokenType::Identifier, "an identifier")?;
        Ok(token.lexeme)
    }

    // --- Statements ---

    fn statement(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.peek().span.0;
        if self.peek().token_type.starts_type() {
            return self.declaration(start);
        }
        match self.peek().token_type {
            TokenType::For => self.for_statement(start),
            TokenType::While => self.while_statement(start),
            TokenType::If => self.if_statement(start),
            TokenType::Return => self.return_statement(start),
            TokenType::LBrace => self.block(),
            _ => {
                let expr = self.expression()?;
                self.consume(TokenType::Semicolon, "';'")?;
                Ok(Spanned::new(Stmt::Expr(expr), (start, self.previous_end())))
            }
        }
    }

    fn declaration(&mut self, start: usize) -> ParseResult<Spanned<Stmt>> {
        let ty = self.type_name()?;
        let name = self.identifier()?;
        let (ty, init) = self.declarator_tail(ty)?;
        self.consume(TokenType::Semicolon, "';'")?;
        Ok(Spanned::new(
            Stmt::Declaration { ty, name, init },
            (start, self.previous_end()),
        ))
    }

    fn block(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.consume(TokenType::LBrace, "'{'")?.span.0;
        let mut statements = Vec::new();
        while !self.check(TokenType::RBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }
        self.consume(TokenType::RBrace, "'}'")?;
        Ok(Spanned::new(
            Stmt::Block(statements),
            (start, self.previous_end()),
        ))
    }

    fn for_statement(&mut self, start: usize) -> ParseResult<Spanned<Stmt>> {
        self.consume(TokenType::For, "'for'")?;
        self.consume(TokenType::LParen, "'('")?;
        let init = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, "';'")?;
        let cond = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, "';'")?;
        let step = if self.check(TokenType::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::RParen, "')'")?;
        let body = Box::new(self.statement()?);
        Ok(Spanned::new(
            Stmt::For(ForLoop {
                init,
                cond,
                step,
                body,
            }),
            (start, self.previous_end()),
        ))
    }

    fn while_statement(&mut self, start: usize) -> ParseResult<Spanned<Stmt>> {
        self.consume(TokenType::While, "'while'")?;
        self.consume(TokenType::LParen, "'('")?;
        let cond = self.expression()?;
        self.consume(TokenType::RParen, "')'")?;
        let body = Box::new(self.statement()?);
        Ok(Spanned::new(
            Stmt::While { cond, body },
            (start, self.previous_end()),
        ))
    }

    fn if_statement(&mut self, start: usize) -> ParseResult<Spanned<Stmt>> {
        self.consume(TokenType::If, "'if'")?;
        self.consume(TokenType::LParen, "'('")?;
        let cond = self.expression()?;
        self.consume(TokenType::RParen, "')'")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(TokenType::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Spanned::new(
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            },
            (start, self.previous_end()),
        ))
    }

    fn return_statement(&mut self, start: usize) -> ParseResult<Spanned<Stmt>> {
        self.consume(TokenType::Return, "'return'")?;
        let value = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, "';'")?;
        Ok(Spanned::new(
            Stmt::Return(value),
            (start, self.previous_end()),
        ))
    }

    // --- Expressions, highest level first ---

    fn expression(&mut self) -> ParseResult<Spanned<Expr>> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Spanned<Expr>> {
        let target = self.equality()?;
        let op = match self.peek().token_type {
            TokenType::Equal => None,
            TokenType::PlusEq => Some(BinaryOp::Add),
            TokenType::MinusEq => Some(BinaryOp::Sub),
            TokenType::StarEq => Some(BinaryOp::Mul),
            TokenType::SlashEq => Some(BinaryOp::Div),
            _ => return Ok(target),
        };
        let op_token = self.advance();
        if !is_lvalue(target.value()) {
            return Err(Diagnostic::error(
                DiagnosticCode::SyntaxError,
                "Invalid assignment target".to_string(),
            )
            .with_location(op_token.span));
        }
        let value = self.assignment()?;
        let span = (target.span().0, value.span().1);
        let node = match op {
            None => Expr::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            Some(op) => Expr::CompoundAssign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
        };
        Ok(Spanned::new(node, span))
    }

    fn equality(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek().token_type {
                TokenType::DoubleEq => BinaryOp::Eq,
                TokenType::Neq => BinaryOp::Neq,
                _ => break,
            };
            self.advance();
            let right = self.relational()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn relational(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek().token_type {
                TokenType::Lt => BinaryOp::Lt,
                TokenType::Gt => BinaryOp::Gt,
                TokenType::Le => BinaryOp::Le,
                TokenType::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek().token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek().token_type {
                TokenType::Star => BinaryOp::Mul,
                TokenType::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek().span.0;
        if self.check(TokenType::Minus) {
            self.advance();
            let operand = self.unary()?;
            let span = (start, operand.span().1);
            return Ok(Spanned::new(
                Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        // A parenthesis followed by a type name is a cast, not grouping
        if self.check(TokenType::LParen) && self.peek_ahead(1).token_type.starts_type() {
            self.advance();
            let ty = self.type_name()?;
            self.consume(TokenType::RParen, "')'")?;
            let operand = self.unary()?;
            let span = (start, operand.span().1);
            return Ok(Spanned::new(
                Expr::Cast {
                    ty,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut expr = self.primary()?;
        loop {
            match self.peek().token_type {
                TokenType::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.consume(TokenType::RBracket, "']'")?;
                    let span = (expr.span().0, self.previous_end());
                    expr = Spanned::new(
                        Expr::Index {
                            base: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenType::PlusPlus => {
                    self.advance();
                    let span = (expr.span().0, self.previous_end());
                    expr = Spanned::new(
                        Expr::Unary {
                            op: UnaryOp::PostInc,
                            operand: Box::new(expr),
                        },
                        span,
                    );
                }
                TokenType::MinusMinus => {
                    self.advance();
                    let span = (expr.span().0, self.previous_end());
                    expr = Spanned::new(
                        Expr::Unary {
                            op: UnaryOp::PostDec,
                            operand: Box::new(expr),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Spanned<Expr>> {
        let token = self.peek().clone();
        match token.token_type {
            TokenType::Int => {
                self.advance();
                Ok(Spanned::new(
                    Expr::IntLit(parse_int_literal(&token)?),
                    token.span,
                ))
            }
            TokenType::Float => {
                self.advance();
                let text = token.lexeme.trim_end_matches(['f', 'F']);
                let value = text.parse::<f64>().map_err(|_| {
                    Diagnostic::error(
                        DiagnosticCode::SyntaxError,
                        format!("Malformed float literal '{}'", token.lexeme),
                    )
                    .with_location(token.span)
                })?;
                Ok(Spanned::new(Expr::FloatLit(value), token.span))
            }
            TokenType::Identifier => {
                self.advance();
                if self.check(TokenType::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenType::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if !self.match_token(TokenType::Comma) {
                                break;
                            }
                        }
                    }
                    self.consume(TokenType::RParen, "')'")?;
                    let span = (token.span.0, self.previous_end());
                    return Ok(Spanned::new(
                        Expr::Call {
                            callee: token.lexeme,
                            args,
                        },
                        span,
                    ));
                }
                Ok(Spanned::new(Expr::Ident(token.lexeme), token.span))
            }
            TokenType::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenType::RParen, "')'")?;
                Ok(inner)
            }
            TokenType::EOF => Err(Diagnostic::error(
                DiagnosticCode::UnexpectedEndOfFile,
                "Expected an expression, found end of file".to_string(),
            )
            .with_location(token.span)),
            _ => Err(Diagnostic::unexpected_token(
                "an expression",
                &token.lexeme,
                token.span,
            )),
        }
    }
}

fn binary(op: BinaryOp, left: Spanned<Expr>, right: Spanned<Expr>) -> Spanned<Expr> {
    let span = (left.span().0, right.span().1);
    Spanned::new(
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

const fn is_lvalue(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(_) | Expr::Index { .. })
}

fn parse_int_literal(token: &Token) -> ParseResult<u64> {
    token.lexeme.parse::<u64>().map_err(|_| {
        Diagnostic::error(
            DiagnosticCode::SyntaxError,
            format!("Integer literal '{}' is out of range", token.lexeme),
        )
        .with_location(token.span)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse(source: &str) -> TranslationUnit {
        let (tokens, diagnostics) = lex(source);
        assert!(diagnostics.is_empty(), "lex errors: {diagnostics:?}");
        Parser::new(tokens).parse().expect("parse failed")
    }

    fn first_function(unit: &TranslationUnit) -> &FunctionDef {
        unit.functions().next().expect("no function parsed")
    }

    #[test]
    fn parses_elementwise_loop() {
        let unit = parse(
            "void simple_loop(float* arr, int n) {\n\
             \x20   int i;\n\
             \x20   for (i = 0; i < n; i++) {\n\
             \x20       arr[i] = arr[i] * 2.0f;\n\
             \x20   }\n\
             }\n",
        );
        let func = first_function(&unit);
        assert_eq!(func.name, "simple_loop");
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[0].ty, CType::Pointer(Box::new(CType::Float)));

        let Stmt::Block(stmts) = func.body.value() else {
            panic!("body is not a block");
        };
        assert!(matches!(stmts[0].value(), Stmt::Declaration { name, .. } if name == "i"));
        let Stmt::For(for_loop) = stmts[1].value() else {
            panic!("expected a for loop");
        };
        assert!(matches!(
            for_loop.cond.as_ref().unwrap().value(),
            Expr::Binary { op: BinaryOp::Lt, .. }
        ));
        assert!(matches!(
            for_loop.step.as_ref().unwrap().value(),
            Expr::Unary { op: UnaryOp::PostInc, .. }
        ));
    }

    #[test]
    fn parses_compound_assignment() {
        let unit = parse("void f(float* a, float s) { s += a[0]; }");
        let func = first_function(&unit);
        let Stmt::Block(stmts) = func.body.value() else {
            panic!();
        };
        let Stmt::Expr(expr) = stmts[0].value() else {
            panic!();
        };
        assert!(matches!(
            expr.value(),
            Expr::CompoundAssign { op: BinaryOp::Add, .. }
        ));
    }

    #[test]
    fn parses_cast_expression() {
        let unit = parse("void f(float* a, int* b) { a[0] = (float)b[0]; }");
        let func = first_function(&unit);
        let Stmt::Block(stmts) = func.body.value() else {
            panic!();
        };
        let Stmt::Expr(assign) = stmts[0].value() else {
            panic!();
        };
        let Expr::Assign { value, .. } = assign.value() else {
            panic!();
        };
        assert!(matches!(value.value(), Expr::Cast { ty: CType::Float, .. }));
    }

    #[test]
    fn parses_array_declaration_and_globals() {
        let unit = parse("float total;\nvoid f(void) { float arr[128]; arr[0] = 1.0f; }");
        assert!(matches!(
            &unit.items[0],
            Item::Global { name, ty: CType::Float, .. } if name == "total"
        ));
        let func = first_function(&unit);
        let Stmt::Block(stmts) = func.body.value() else {
            panic!();
        };
        assert!(matches!(
            stmts[0].value(),
            Stmt::Declaration { ty: CType::Array(_, 128), .. }
        ));
    }

    #[test]
    fn parses_subscript_with_offset() {
        let unit = parse("void f(float* a, int n) { int i; for (i = 1; i < n; i++) a[i] = a[i-1] + 1.0f; }");
        let func = first_function(&unit);
        let Stmt::Block(stmts) = func.body.value() else {
            panic!();
        };
        assert!(matches!(stmts[1].value(), Stmt::For(_)));
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let (tokens, _) = lex("void f(void) { int i i; }");
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(
            err.code,
            cspmd_diagnostics::DiagnosticCode::UnexpectedToken
        );
    }

    #[test]
    fn void_parameter_list_is_empty() {
        let unit = parse("int main(void) { return 0; }");
        assert!(first_function(&unit).params.is_empty());
    }
}
