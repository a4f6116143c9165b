//! Parser for the box markup language.
//!
//! ```text
//! Document  := Element*
//! Element   := Ident DataList? PropsBlock?
//! DataList  := '{' (Str (',' Str)*)? '}'
//! PropsBlock:= '(' (PropOrChild ';'?)* ')'
//! ```
//!
//! The grammar is forgiving on purpose. Tokens that fit nowhere are dropped,
//! a name that is not followed by `(` is still parsed as a child, and a
//! missing `)` simply ends the block at end of input. The only hard failure
//! is nesting deeper than [`MAX_NESTING_DEPTH`].

use crate::registry::Registry;

use super::ast::Element;
use super::error::CompileError;
use super::token::{Token, TokenKind};

/// Deepest element nesting accepted before parsing aborts.
pub const MAX_NESTING_DEPTH: usize = 256;

pub struct Parser<'r> {
    tokens: Vec<Token>,
    pos: usize,
    registry: &'r Registry,
}

impl<'r> Parser<'r> {
    pub fn new(tokens: Vec<Token>, registry: &'r Registry) -> Self {
        Self {
            tokens,
            pos: 0,
            registry,
        }
    }

    pub fn parse(&mut self) -> Result<Vec<Element>, CompileError> {
        let mut elements = Vec::new();
        while !self.is_at_end() {
            if self.peek().ident().is_some() {
                elements.push(self.parse_element(0)?);
            } else {
                let t = self.advance();
                tracing::debug!(
                    token = ?t.kind,
                    line = t.line,
                    col = t.col,
                    "skipping stray token"
                );
            }
        }
        Ok(elements)
    }

    /// Parse an element whose name is the current identifier token.
    fn parse_element(&mut self, depth: usize) -> Result<Element, CompileError> {
        if depth >= MAX_NESTING_DEPTH {
            let t = self.peek();
            return Err(CompileError::parse(
                format!("elements nested deeper than {MAX_NESTING_DEPTH} levels"),
                t.line,
                t.col,
            ));
        }

        let name = self.advance().ident().unwrap_or_default().to_string();
        let mut element = Element::new(name);

        if self.check(&TokenKind::LBrace) {
            element.data = self.parse_data_list();
        }

        if self.check(&TokenKind::LParen) {
            self.advance();
            self.parse_props_block(&mut element, depth)?;
        }

        Ok(element)
    }

    /// `{ "a", "b" }`: strings are kept, anything else inside is ignored.
    fn parse_data_list(&mut self) -> Vec<String> {
        self.advance(); // '{'
        let mut data = Vec::new();
        while !self.is_at_end() {
            let t = self.advance();
            match &t.kind {
                TokenKind::RBrace => break,
                TokenKind::Str(s) => data.push(s.clone()),
                _ => {}
            }
        }
        data
    }

    /// Scan properties and children up to the first unmatched `)`.
    fn parse_props_block(
        &mut self,
        element: &mut Element,
        depth: usize,
    ) -> Result<(), CompileError> {
        while !self.is_at_end() && !self.check(&TokenKind::RParen) {
            let Some(key) = self.peek().ident().map(str::to_string) else {
                // `;` separators and stray tokens.
                let t = self.advance();
                if t.kind != TokenKind::Semicolon {
                    tracing::debug!(
                        token = ?t.kind,
                        line = t.line,
                        col = t.col,
                        "skipping stray token in properties"
                    );
                }
                continue;
            };

            let opens_call = self.check_at(1, &TokenKind::LParen);
            let string_arg = self.peek_at(2).and_then(Token::string).map(str::to_string);

            match (opens_call, string_arg) {
                (true, Some(value)) if self.registry.contains(&key) => {
                    // A registered component invoked with one string argument
                    // is a child, not a property.
                    self.pos += 3;
                    self.skip_if(&TokenKind::RParen);
                    element
                        .children
                        .push(Element::new(key).with_property("text", value));
                }
                (true, Some(value)) => {
                    self.pos += 3;
                    self.skip_if(&TokenKind::RParen);
                    element.properties.push((key, value));
                }
                _ => {
                    let child = self.parse_element(depth + 1)?;
                    element.children.push(child);
                }
            }

            self.skip_if(&TokenKind::Semicolon);
        }

        self.skip_if(&TokenKind::RParen);
        Ok(())
    }

    // --- Helpers ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        self.pos += 1;
        t
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.check_at(0, kind)
    }

    fn check_at(&self, offset: usize, kind: &TokenKind) -> bool {
        self.peek_at(offset).is_some_and(|t| &t.kind == kind)
    }

    fn skip_if(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}
