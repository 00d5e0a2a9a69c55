//! Parser for natpl
//!
//! Each source line is parsed into a [`LineItem`]. Expressions are parsed with
//! a Pratt parser (top-down operator precedence). Besides the explicit infix
//! operators, two operands written next to each other multiply (`2 m`), binding
//! tighter than `*` and `/` so that `10 m / 2 s` divides by `2 s`.
//!
//! # Example
//!
//! ```
//! use natpl_core::ast::LineItem;
//! use natpl_core::parser::Parser;
//!
//! let items = Parser::parse_program("unit m\nwidth = 3 m\nprint width * 2").unwrap();
//! assert_eq!(items.len(), 3);
//! assert!(matches!(items[0], LineItem::UnitDeclaration(..)));
//! ```

mod error;

pub use error::{ExpectedToken, ParseError, ParseErrorKind};

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::ast::{
    Declaration, Expr, ExprKind, Ident, InfixOp, LineItem, PrefixOp, JUXTAPOSITION_PRECEDENCE,
    PREFIX_PRECEDENCE,
};
use crate::lexer::{Lexer, Span, SpannedError, Token, TokenKind};
use crate::term;

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    errors: Vec<ParseError>,
    /// Lexer errors, reported when the parser reaches the offending token
    lex_errors: Vec<SpannedError>,
}

impl Parser {
    #[must_use]
    pub fn new(source: &str) -> Self {
        let (tokens, lex_errors) = Lexer::tokenize(source);
        let mut parser = Self {
            tokens,
            position: 0,
            errors: Vec::new(),
            lex_errors,
        };
        parser.skip_trivia();
        parser
    }

    /// Parse a whole program, one item per line. Errors are collected for every
    /// malformed line; nothing is returned unless all lines parse.
    pub fn parse_program(source: &str) -> Result<Vec<LineItem>, Vec<ParseError>> {
        let mut parser = Parser::new(source);
        let items = parser.program();
        if parser.errors.is_empty() {
            Ok(items)
        } else {
            Err(parser.errors)
        }
    }

    /// Parse a single line (as typed into the REPL). Trailing newlines are allowed.
    pub fn parse_line(source: &str) -> Result<LineItem, Vec<ParseError>> {
        let mut parser = Parser::new(source);
        let result = parser.line().and_then(|item| {
            while parser.eat(TokenKind::Newline).is_some() {}
            parser.expect(TokenKind::Eof)?;
            Ok(item)
        });
        match result {
            Ok(item) => Ok(item),
            Err(e) => {
                parser.errors.push(e);
                Err(parser.errors)
            }
        }
    }

    /// Parse a single expression
    pub fn parse_expression(source: &str) -> Result<Expr, Vec<ParseError>> {
        let mut parser = Parser::new(source);
        let result = parser.expression().and_then(|expr| {
            parser.expect(TokenKind::Eof)?;
            Ok(expr)
        });
        match result {
            Ok(expr) => Ok(expr),
            Err(e) => {
                parser.errors.push(e);
                Err(parser.errors)
            }
        }
    }

    // ==================== Token Management ====================

    fn current(&self) -> &Token {
        // The lexer always ends the stream with Eof and we never advance past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        self.skip_trivia();
        token
    }

    fn skip_trivia(&mut self) {
        while self.position < self.tokens.len() && self.current().kind.is_trivia() {
            self.position += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(ExpectedToken::Token(kind)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Ident> {
        let token = self.current().clone();
        if token.kind == TokenKind::Ident {
            self.advance();
            Ok(Ident::new(token.lexeme, token.span))
        } else {
            Err(ParseError::new(
                ParseErrorKind::ExpectedIdentifier(token.kind),
                token.span,
            ))
        }
    }

    fn unexpected(&self, expected: ExpectedToken) -> ParseError {
        let token = self.current();
        if token.kind == TokenKind::Error {
            return self.lex_error(token.span);
        }
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                found: token.kind,
                expected,
            },
            token.span,
        )
    }

    fn lex_error(&self, span: Span) -> ParseError {
        let kind = self
            .lex_errors
            .iter()
            .find(|e| e.span == span)
            .map_or(ParseErrorKind::ExpectedExpression(TokenKind::Error), |e| {
                ParseErrorKind::Lex(e.error.clone())
            });
        ParseError::new(kind, span)
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Newline | TokenKind::Eof)
    }

    // ==================== Lines ====================

    fn program(&mut self) -> Vec<LineItem> {
        let mut items = Vec::new();
        loop {
            match self.line() {
                Ok(item) => {
                    items.push(item);
                    if self.eat(TokenKind::Newline).is_none() {
                        if self.check(TokenKind::Eof) {
                            break;
                        }
                        let err = self.unexpected(ExpectedToken::Description("end of line"));
                        self.errors.push(err);
                        self.synchronize();
                    }
                }
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
            if self.check(TokenKind::Eof) {
                break;
            }
        }
        items
    }

    /// Skip to the start of the next line
    fn synchronize(&mut self) {
        while !self.check(TokenKind::Eof) {
            if self.advance().kind == TokenKind::Newline {
                return;
            }
        }
    }

    /// Parse one line, leaving the terminating newline unconsumed
    fn line(&mut self) -> ParseResult<LineItem> {
        if self.at_line_end() {
            return Ok(LineItem::Empty);
        }

        let item = match self.current_kind() {
            TokenKind::Unit => {
                let start = self.advance().span;
                let name = self.expect_ident()?;
                LineItem::UnitDeclaration(start.merge(name.span), name)
            }
            TokenKind::Print => {
                let start = self.advance().span;
                let expr = self.expression()?;
                LineItem::PrintedExpression(start.merge(expr.span), expr)
            }
            TokenKind::Ident if self.looks_like_declaration() => {
                LineItem::MaybeDeclarationOrEquality(self.declaration()?)
            }
            _ => LineItem::SilentExpression(self.expression()?),
        };

        if !self.at_line_end() {
            return Err(self.unexpected(ExpectedToken::Description("end of line")));
        }
        Ok(item)
    }

    /// `NAME =` or `NAME(a, b) =` at the current position
    fn looks_like_declaration(&self) -> bool {
        let kind_at = |i: usize| self.tokens.get(i).map(|t| t.kind);
        let name = &self.tokens[self.position];
        let mut pos = self.position + 1;

        match kind_at(pos) {
            Some(TokenKind::Eq) => return true,
            Some(TokenKind::LParen) if self.tokens[pos].span.start == name.span.end => {}
            _ => return false,
        }

        pos += 1;
        if kind_at(pos) == Some(TokenKind::RParen) {
            return kind_at(pos + 1) == Some(TokenKind::Eq);
        }
        loop {
            if kind_at(pos) != Some(TokenKind::Ident) {
                return false;
            }
            match kind_at(pos + 1) {
                Some(TokenKind::Comma) => pos += 2,
                Some(TokenKind::RParen) => return kind_at(pos + 2) == Some(TokenKind::Eq),
                _ => return false,
            }
        }
    }

    fn declaration(&mut self) -> ParseResult<Declaration> {
        let name = self.expect_ident()?;

        let params = if self.eat(TokenKind::LParen).is_some() {
            let mut params: Vec<Ident> = Vec::new();
            while !self.check(TokenKind::RParen) {
                let param = self.expect_ident()?;
                if params.iter().any(|p| p.name == param.name) {
                    return Err(ParseError::new(
                        ParseErrorKind::DuplicateParameter(param.name.to_string()),
                        param.span,
                    ));
                }
                params.push(param);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            Some(params)
        } else {
            None
        };

        self.expect(TokenKind::Eq)?;
        let rhs = self.expression()?;

        Ok(Declaration {
            span: name.span.merge(rhs.span),
            name,
            params,
            rhs,
        })
    }

    // ==================== Expressions ====================

    pub fn expression(&mut self) -> ParseResult<Expr> {
        self.parse_precedence(0)
    }

    /// Parse operators binding tighter than `min_prec`
    fn parse_precedence(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut lhs = self.prefix_expr()?;

        loop {
            if let Some((op, prec)) = self.infix_op() {
                if prec <= min_prec {
                    break;
                }
                self.advance();
                // `^` is right-associative
                let rhs_prec = if op == InfixOp::Pow { prec - 1 } else { prec };
                let rhs = self.parse_precedence(rhs_prec)?;
                lhs = Expr::infix(op, lhs, rhs);
            } else if self.current_kind().starts_operand() && JUXTAPOSITION_PRECEDENCE > min_prec {
                let rhs = self.parse_precedence(JUXTAPOSITION_PRECEDENCE)?;
                lhs = Expr::infix(InfixOp::Mul, lhs, rhs);
            } else {
                break;
            }
        }

        Ok(lhs)
    }

    fn infix_op(&self) -> Option<(InfixOp, u8)> {
        let op = match self.current_kind() {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Star => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::Percent => InfixOp::Mod,
            TokenKind::Caret => InfixOp::Pow,
            TokenKind::Eq | TokenKind::EqEq => InfixOp::Eq,
            TokenKind::NotEq => InfixOp::Neq,
            TokenKind::Lt => InfixOp::Lt,
            TokenKind::LtEq => InfixOp::Le,
            TokenKind::Gt => InfixOp::Gt,
            TokenKind::GtEq => InfixOp::Ge,
            _ => return None,
        };
        Some((op, op.precedence()))
    }

    fn prefix_expr(&mut self) -> ParseResult<Expr> {
        let op = match self.current_kind() {
            TokenKind::Minus => PrefixOp::Neg,
            TokenKind::Plus => PrefixOp::Pos,
            _ => return self.postfix_expr(),
        };
        let start = self.advance().span;
        let operand = self.parse_precedence(PREFIX_PRECEDENCE)?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Prefix {
                op,
                expr: Box::new(operand),
            },
            span,
        ))
    }

    /// A primary expression, followed by call arguments if it is a name
    /// directly followed by `(`
    fn postfix_expr(&mut self) -> ParseResult<Expr> {
        let expr = self.primary_expr()?;

        let is_call = expr.as_name().is_some()
            && self.check(TokenKind::LParen)
            && self.current().span.start == expr.span.end;
        if !is_call {
            return Ok(expr);
        }

        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            args.push(self.expression()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let end = self.expect(TokenKind::RParen)?.span;
        let span = expr.span.merge(end);

        Ok(Expr::new(
            ExprKind::Call {
                base: Box::new(expr),
                args,
            },
            span,
        ))
    }

    fn primary_expr(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Int | TokenKind::Float => {
                self.advance();
                let value = parse_number(&token.lexeme).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::InvalidNumber(token.lexeme.clone()), token.span)
                })?;
                if !term::within_digit_limit(&value) {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidNumber(token.lexeme),
                        token.span,
                    )
                    .with_hint(format!("numbers are limited to {} digits", term::MAX_DIGITS)));
                }
                Ok(Expr::new(ExprKind::Number(value), token.span))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::name(&Ident::new(token.lexeme, token.span)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                let end = self.expect(TokenKind::RParen)?.span;
                let span = token.span.merge(end);
                Ok(Expr::new(ExprKind::Parenthesised(Box::new(inner)), span))
            }
            TokenKind::LBracket => {
                self.advance();
                let inner = self.expression()?;
                let end = self.expect(TokenKind::RBracket)?.span;
                let span = token.span.merge(end);
                Ok(Expr::new(ExprKind::UnitOf(Box::new(inner)), span))
            }
            TokenKind::Error => Err(self.lex_error(token.span)),
            TokenKind::Unit | TokenKind::Print => Err(ParseError::new(
                ParseErrorKind::ExpectedExpression(token.kind),
                token.span,
            )
            .with_hint(format!("'{}' is only allowed at the start of a line", token.kind))),
            kind => Err(ParseError::new(
                ParseErrorKind::ExpectedExpression(kind),
                token.span,
            )),
        }
    }
}

/// Parse a numeric literal, ignoring digit separators
fn parse_number(lexeme: &str) -> Option<BigDecimal> {
    let cleaned: String = lexeme.chars().filter(|&c| c != '_').collect();
    BigDecimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Name;

    fn parse_expr(source: &str) -> Expr {
        Parser::parse_expression(source).unwrap()
    }

    fn infix_parts(expr: &Expr) -> (InfixOp, &Expr, &Expr) {
        match &expr.kind {
            ExprKind::Infix { op, lhs, rhs } => (*op, lhs, rhs),
            other => panic!("expected infix expression, got {other:?}"),
        }
    }

    #[test]
    fn parse_numbers() {
        assert_eq!(
            parse_expr("1_000").kind,
            ExprKind::Number(BigDecimal::from(1000))
        );
        assert_eq!(
            parse_expr("2.5e1").kind,
            ExprKind::Number(BigDecimal::from(25))
        );
    }

    #[test]
    fn oversized_literals_are_rejected() {
        let errors = Parser::parse_expression("1e200000000").unwrap_err();
        let err = &errors[0];
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidNumber("1e200000000".to_string())
        );
        assert!(err.hint.is_some());
        assert!(Parser::parse_expression("1e-200000000").is_err());
        assert!(Parser::parse_expression("1e999990").is_ok());
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_expr("1 + 2 * 3");
        let (op, _, rhs) = infix_parts(&expr);
        assert_eq!(op, InfixOp::Add);
        assert_eq!(infix_parts(rhs).0, InfixOp::Mul);
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse_expr("2 ^ 3 ^ 2");
        let (op, lhs, rhs) = infix_parts(&expr);
        assert_eq!(op, InfixOp::Pow);
        assert_eq!(lhs.kind, ExprKind::Number(BigDecimal::from(2)));
        assert_eq!(infix_parts(rhs).0, InfixOp::Pow);
    }

    #[test]
    fn negation_applies_after_power() {
        let expr = parse_expr("-2^2");
        match expr.kind {
            ExprKind::Prefix { op, expr } => {
                assert_eq!(op, PrefixOp::Neg);
                assert_eq!(infix_parts(&expr).0, InfixOp::Pow);
            }
            other => panic!("expected prefix, got {other:?}"),
        }
    }

    #[test]
    fn negative_exponent() {
        let expr = parse_expr("m^-1");
        let (op, _, rhs) = infix_parts(&expr);
        assert_eq!(op, InfixOp::Pow);
        assert!(matches!(rhs.kind, ExprKind::Prefix { op: PrefixOp::Neg, .. }));
    }

    #[test]
    fn juxtaposition_binds_tighter_than_division() {
        // (10 m) / (2 s)
        let expr = parse_expr("10 m / 2 s");
        let (op, lhs, rhs) = infix_parts(&expr);
        assert_eq!(op, InfixOp::Div);
        assert_eq!(infix_parts(lhs).0, InfixOp::Mul);
        assert_eq!(infix_parts(rhs).0, InfixOp::Mul);
    }

    #[test]
    fn call_requires_adjacent_paren() {
        let call = parse_expr("f(1, 2)");
        match call.kind {
            ExprKind::Call { base, args } => {
                assert_eq!(base.as_name(), Some(&Name::new("f")));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {other:?}"),
        }

        let product = parse_expr("m (3)");
        assert_eq!(infix_parts(&product).0, InfixOp::Mul);

        let number = parse_expr("2(3)");
        assert_eq!(infix_parts(&number).0, InfixOp::Mul);
    }

    #[test]
    fn unit_of_brackets() {
        assert!(matches!(parse_expr("[3 m]").kind, ExprKind::UnitOf(_)));
    }

    #[test]
    fn comparisons_have_lowest_precedence() {
        let expr = parse_expr("1 + 1 == 2");
        assert_eq!(infix_parts(&expr).0, InfixOp::Eq);
        let expr = parse_expr("2 m >= 1 m");
        assert_eq!(infix_parts(&expr).0, InfixOp::Ge);
    }

    #[test]
    fn parse_line_kinds() {
        assert_eq!(Parser::parse_line("").unwrap(), LineItem::Empty);
        assert_eq!(Parser::parse_line("# just a comment").unwrap(), LineItem::Empty);
        assert!(matches!(
            Parser::parse_line("unit m").unwrap(),
            LineItem::UnitDeclaration(_, ref name) if name.name.as_str() == "m"
        ));
        assert!(matches!(
            Parser::parse_line("print 1 + 1").unwrap(),
            LineItem::PrintedExpression(..)
        ));
        assert!(matches!(
            Parser::parse_line("1 + 1\n").unwrap(),
            LineItem::SilentExpression(_)
        ));
    }

    #[test]
    fn parse_declarations() {
        match Parser::parse_line("speed = 3 m / s").unwrap() {
            LineItem::MaybeDeclarationOrEquality(decl) => {
                assert_eq!(decl.declaration_name().as_str(), "speed");
                assert!(decl.params.is_none());
            }
            other => panic!("expected declaration, got {other:?}"),
        }

        match Parser::parse_line("area(w, h) = w h").unwrap() {
            LineItem::MaybeDeclarationOrEquality(decl) => {
                let params = decl.params.unwrap();
                assert_eq!(params.len(), 2);
                assert_eq!(params[1].name.as_str(), "h");
            }
            other => panic!("expected declaration, got {other:?}"),
        }

        match Parser::parse_line("one() = 1").unwrap() {
            LineItem::MaybeDeclarationOrEquality(decl) => {
                assert_eq!(decl.params, Some(vec![]));
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn equality_with_call_on_lhs_is_not_a_declaration() {
        // Arguments are not plain names, so this is an expression
        assert!(matches!(
            Parser::parse_line("f(2) = 4").unwrap(),
            LineItem::SilentExpression(_)
        ));
    }

    #[test]
    fn duplicate_parameters_rejected() {
        let errors = Parser::parse_line("f(x, x) = x").unwrap_err();
        assert_eq!(
            errors[0].kind,
            ParseErrorKind::DuplicateParameter("x".to_string())
        );
    }

    #[test]
    fn program_collects_errors_per_line() {
        let errors = Parser::parse_program("unit m\n1 +\nx = )\n2 m").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn program_keeps_blank_lines() {
        let items = Parser::parse_program("unit m\n\nx = 1 m\n").unwrap();
        // A trailing newline does not start another line
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], LineItem::Empty);
    }

    #[test]
    fn trailing_tokens_are_errors() {
        let errors = Parser::parse_line("unit m s").unwrap_err();
        assert!(matches!(
            errors[0].kind,
            ParseErrorKind::UnexpectedToken { found: TokenKind::Ident, .. }
        ));
    }

    #[test]
    fn lex_errors_are_reported() {
        let errors = Parser::parse_line("1 + $").unwrap_err();
        assert!(matches!(errors[0].kind, ParseErrorKind::Lex(_)));
    }

    #[test]
    fn keyword_inside_expression_has_hint() {
        let errors = Parser::parse_line("1 + print").unwrap_err();
        assert!(errors[0].hint.is_some());
    }
}
