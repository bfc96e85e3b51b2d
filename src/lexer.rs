//! Lexer for the scenario language.
//!
//! Turns a UTF-8 source buffer into a flat token sequence. Whitespace
//! separates tokens and is otherwise ignored; there are no comments and no
//! string escapes. Any lexing failure aborts the whole sequence with a
//! byte-offset diagnostic.

use thiserror::Error;

use crate::token::{Span, Token, TokenKind};

/// A lexing failure, located by byte offset into the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character {ch:?} at byte {at}")]
    UnexpectedCharacter { ch: char, at: usize },

    #[error("unterminated string literal starting at byte {at}")]
    UnterminatedString { at: usize },

    #[error("expected `::` at byte {at}: a solitary `:` is not a token")]
    LoneColon { at: usize },

    #[error("expected `..` at byte {at}: a solitary `.` is not a token")]
    LoneDot { at: usize },
}

/// Lex a whole source buffer.
pub fn lex(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = Lexer { source, cursor: 0 };
    let mut tokens = Vec::new();

    loop {
        lexer.skip_whitespace();
        if lexer.cursor >= lexer.source.len() {
            return Ok(tokens);
        }
        tokens.push(lexer.next_token()?);
    }
}

struct Lexer<'src> {
    source: &'src str,
    cursor: usize,
}

impl<'src> Lexer<'src> {
    fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        let ch = self.peek().unwrap_or('\0');

        if ch.is_ascii_digit() {
            return Ok(self.number());
        }

        match ch {
            '(' | ')' | '[' | ']' | '{' | '}' | ',' => Ok(self.single_character(ch)),
            ':' => self.colon_colon(),
            '.' => self.dot_dot(),
            '"' => self.string_literal(),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.keyword_or_identifier()),
            c => Err(LexError::UnexpectedCharacter {
                ch: c,
                at: self.cursor,
            }),
        }
    }

    fn single_character(&mut self, ch: char) -> Token<'src> {
        let kind = match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftCurly,
            '}' => TokenKind::RightCurly,
            _ => TokenKind::Comma,
        };

        let start = self.cursor;
        self.cursor += 1;
        self.token(kind, start, self.cursor)
    }

    fn keyword_or_identifier(&mut self) -> Token<'src> {
        let start = self.cursor;
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            self.cursor += 1;
        }

        let lexeme = &self.source[start..self.cursor];
        let kind = if Token::is_keyword(lexeme) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.token(kind, start, self.cursor)
    }

    fn number(&mut self) -> Token<'src> {
        let start = self.cursor;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.cursor += 1;
        }
        self.token(TokenKind::Number, start, self.cursor)
    }

    fn string_literal(&mut self) -> Result<Token<'src>, LexError> {
        let opening = self.cursor;
        self.cursor += 1;

        let start = self.cursor;
        loop {
            match self.peek() {
                Some('"') => {
                    let end = self.cursor;
                    self.cursor += 1;
                    // The lexeme is the content between the quotes.
                    return Ok(self.token(TokenKind::StringLiteral, start, end));
                }
                Some(c) => self.cursor += c.len_utf8(),
                None => return Err(LexError::UnterminatedString { at: opening }),
            }
        }
    }

    fn colon_colon(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.cursor;
        self.cursor += 1;
        if self.peek() == Some(':') {
            self.cursor += 1;
            Ok(self.token(TokenKind::ColonColon, start, self.cursor))
        } else {
            Err(LexError::LoneColon { at: start })
        }
    }

    fn dot_dot(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.cursor;
        self.cursor += 1;
        if self.peek() == Some('.') {
            self.cursor += 1;
            Ok(self.token(TokenKind::DotDot, start, self.cursor))
        } else {
            Err(LexError::LoneDot { at: start })
        }
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'src> {
        Token {
            lexeme: &self.source[start..end],
            kind,
            span: Span::new(start, end),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.cursor += c.len_utf8();
        }
    }
}
