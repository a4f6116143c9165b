//! Markup compiler — source → tokens → element forest → HTML document.

pub mod ast;
pub mod compile;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod placeholder;
pub mod render;
pub mod token;

pub use ast::*;
pub use compile::{CompiledDocument, compile_document};
pub use error::CompileError;

use crate::registry::Registry;
use lexer::Lexer;
use parser::Parser;
use token::Token;

/// The markup compiler.
///
/// Every stage takes the registry as a read-only snapshot; the same registry
/// can serve any number of compilations.
pub struct Compiler;

impl Compiler {
    /// Split source text into tokens. Never fails.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize()
    }

    /// Parse source into a forest of root elements.
    pub fn parse(source: &str, registry: &Registry) -> Result<Vec<Element>, CompileError> {
        let tokens = Self::tokenize(source);
        let mut parser = Parser::new(tokens, registry);
        parser.parse()
    }

    /// Parse and render source into a complete document.
    pub fn compile(source: &str, registry: &Registry) -> Result<CompiledDocument, CompileError> {
        let elements = Self::parse(source, registry)?;
        compile_document(&elements, registry)
    }
}
