//! Lexer for the box markup language.
//!
//! Converts source text into a flat stream of [`Token`]s. The lexer never
//! fails: whitespace and any character that cannot start a token are skipped.

use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            let ch = self.peek();

            let token = match ch {
                '(' => self.single_char(TokenKind::LParen),
                ')' => self.single_char(TokenKind::RParen),
                '{' => self.single_char(TokenKind::LBrace),
                '}' => self.single_char(TokenKind::RBrace),
                ',' => self.single_char(TokenKind::Comma),
                ';' => self.single_char(TokenKind::Semicolon),
                '>' => self.single_char(TokenKind::Gt),
                '"' => match self.lex_string() {
                    Some(token) => token,
                    None => {
                        // No closing quote anywhere after this one.
                        self.advance();
                        continue;
                    }
                },
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_ident(),
                _ => {
                    self.advance();
                    continue;
                }
            };

            tokens.push(token);
        }

        tokens
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance();
        Token { kind, line, col }
    }

    /// Lex a string literal up to the nearest following quote.
    /// Returns `None` without consuming anything when the quote is unmatched.
    fn lex_string(&mut self) -> Option<Token> {
        let close = self.chars[self.pos + 1..].iter().position(|&c| c == '"')?;
        let line = self.line;
        let col = self.col;
        self.advance(); // opening '"'
        let mut s = String::with_capacity(close);
        for _ in 0..close {
            s.push(self.advance());
        }
        self.advance(); // closing '"'
        Some(Token {
            kind: TokenKind::Str(s),
            line,
            col,
        })
    }

    fn lex_ident(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut s = String::new();
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_ascii_alphanumeric() || ch == '_' {
                s.push(self.advance());
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Ident(s),
            line,
            col,
        }
    }
}
