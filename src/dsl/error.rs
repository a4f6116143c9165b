//! Error types for the markup compiler.
//!
//! Only hard failures live here. Policy drops and unresolved placeholders are
//! soft and go through [`crate::diagnostics`] instead.

use thiserror::Error;

/// An error that aborts a compilation run.
#[derive(Debug, Clone, Error)]
#[error("[{line}:{col}] {kind:?}: {message}")]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    ParseError,
    RenderError,
}

impl CompileError {
    pub fn parse(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::ParseError,
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            col: 0,
            kind: ErrorKind::RenderError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_kind() {
        let err = CompileError::parse("nesting too deep", 3, 7);
        assert_eq!(err.to_string(), "[3:7] ParseError: nesting too deep");
    }
}
