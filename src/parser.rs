//! Recursive-descent parser for the scenario language.
//!
//! Single pass over the token stream into the flat arena [`Ast`]. Any
//! unexpected token or premature end of input aborts the parse; no partial
//! AST is returned.
//!
//! ```text
//! program    = { statement } ;
//! statement  = expression ;
//! expression = "for" range "{" { expression } "}" | primary ;
//! primary    = identifier "(" args ")"
//!            | identifier "::" primary
//!            | identifier
//!            | string | number
//!            | "[" items "]" | "(" items ")" ;
//! range      = number ".." number ;
//! ```

use thiserror::Error;

use crate::ast::{Ast, ExprKind, ExpressionId, Statement};
use crate::token::{Span, Token, TokenKind};

/// A parsing failure, carrying the offending span where one exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} but ran out of tokens")]
    UnexpectedEof { expected: String },

    #[error("expected {expected} but got {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        span: Span,
    },
}

/// Parse a token stream into an AST.
pub fn parse<'src>(tokens: &[Token<'src>]) -> Result<Ast<'src>, ParseError> {
    let mut parser = Parser {
        tokens,
        cursor: 0,
        ast: Ast::new(),
    };

    while parser.has_more() {
        let (expression, span) = parser.expression()?;
        parser.ast.statements.push(Statement { expression, span });
    }

    Ok(parser.ast)
}

struct Parser<'src, 'tok> {
    tokens: &'tok [Token<'src>],
    cursor: usize,
    ast: Ast<'src>,
}

impl<'src> Parser<'src, '_> {
    fn expression(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        match self.peek(0) {
            Some(token) if token.kind == TokenKind::Keyword && token.lexeme == "for" => {
                self.for_loop()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        let token = self.peek_or("primary expression")?;
        match token.kind {
            TokenKind::Identifier => match self.peek(1).map(|t| t.kind) {
                Some(TokenKind::LeftParen) => self.call(),
                Some(TokenKind::ColonColon) => self.constant(),
                _ => {
                    let name = self.expect(TokenKind::Identifier)?;
                    Ok(self.emplace(ExprKind::Variable { name }, name.span))
                }
            },
            TokenKind::StringLiteral => {
                let literal = self.expect(TokenKind::StringLiteral)?;
                Ok(self.emplace(ExprKind::StringLiteral { literal }, literal.span))
            }
            TokenKind::Number => {
                let number = self.expect(TokenKind::Number)?;
                Ok(self.emplace(ExprKind::Number { number }, number.span))
            }
            TokenKind::LeftBracket => self.list(),
            TokenKind::LeftParen => self.tuple(),
            found => Err(ParseError::UnexpectedToken {
                expected: "primary expression".to_string(),
                found,
                span: token.span,
            }),
        }
    }

    fn list(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        let open = self.expect(TokenKind::LeftBracket)?;
        let (elements, close) = self.elements_until(TokenKind::RightBracket)?;
        let span = Span::join(open.span, close);
        Ok(self.emplace(ExprKind::List { elements }, span))
    }

    fn tuple(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        let open = self.expect(TokenKind::LeftParen)?;
        let (elements, close) = self.elements_until(TokenKind::RightParen)?;
        let span = Span::join(open.span, close);
        Ok(self.emplace(ExprKind::Tuple { elements }, span))
    }

    fn call(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        let callee = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::LeftParen)?;
        let (arguments, close) = self.elements_until(TokenKind::RightParen)?;
        let span = Span::join(callee.span, close);
        Ok(self.emplace(ExprKind::Call { callee, arguments }, span))
    }

    /// Comma-separated expressions up to (and consuming) `close`. Trailing
    /// commas are accepted.
    fn elements_until(
        &mut self,
        close: TokenKind,
    ) -> Result<(Vec<ExpressionId>, Span), ParseError> {
        let mut elements = Vec::new();
        loop {
            let token = self.peek_or(&format!("{close} or expression"))?;
            if token.kind == close {
                let closing = self.expect(close)?;
                return Ok((elements, closing.span));
            }
            if token.kind == TokenKind::Comma {
                self.expect(TokenKind::Comma)?;
                continue;
            }
            let (expression, _) = self.expression()?;
            elements.push(expression);
        }
    }

    fn constant(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        let name = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::ColonColon)?;
        let (value, value_span) = self.primary()?;
        let span = Span::join(name.span, value_span);
        Ok(self.emplace(ExprKind::Constant { name, value }, span))
    }

    fn for_loop(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        let keyword = self.expect(TokenKind::Keyword)?;
        let (range, _) = self.range()?;
        self.expect(TokenKind::LeftCurly)?;

        let mut body = Vec::new();
        loop {
            let token = self.peek_or("`}` or expression")?;
            if token.kind == TokenKind::RightCurly {
                break;
            }
            let (expression, _) = self.expression()?;
            body.push(expression);
        }
        let closing = self.expect(TokenKind::RightCurly)?;

        let span = Span::join(keyword.span, closing.span);
        Ok(self.emplace(ExprKind::For { range, body }, span))
    }

    fn range(&mut self) -> Result<(ExpressionId, Span), ParseError> {
        let start = self.expect(TokenKind::Number)?;
        self.expect(TokenKind::DotDot)?;
        let end = self.expect(TokenKind::Number)?;
        let span = Span::join(start.span, end.span);
        Ok(self.emplace(ExprKind::Range { start, end }, span))
    }

    fn emplace(&mut self, kind: ExprKind<'src>, span: Span) -> (ExpressionId, Span) {
        (self.ast.push_expression(kind, span), span)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token<'src>, ParseError> {
        let Some(token) = self.next() else {
            return Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            });
        };
        if token.kind != expected {
            return Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind,
                span: token.span,
            });
        }
        Ok(token)
    }

    fn peek_or(&self, expected: &str) -> Result<Token<'src>, ParseError> {
        self.peek(0).ok_or_else(|| ParseError::UnexpectedEof {
            expected: expected.to_string(),
        })
    }

    fn peek(&self, offset: usize) -> Option<Token<'src>> {
        self.tokens.get(self.cursor + offset).copied()
    }

    fn next(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.cursor).copied();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn has_more(&self) -> bool {
        self.cursor < self.tokens.len()
    }
}
