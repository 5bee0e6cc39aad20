//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here.  Static
//! errors batch (each stage keeps going after reporting one); runtime errors
//! are fail‑fast and carry the offending token for line attribution.
//!
//! The module **does not** print diagnostics itself; see [`crate::reporter`].

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error, located at a token.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        /// ` at 'lexeme'` or ` at end`.
        location: String,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

/// ` at end` for the EOF token, ` at 'lexeme'` otherwise.
fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. } => Some(*line),
            LoxError::Runtime(e) => e.line(),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }
}

/// Fail‑fast errors raised while executing a program.
///
/// Every variant raised by user code carries the token it happened at.
/// `Unexpected` signals a broken interpreter invariant instead.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("{message}\n[line {}]", .token.line)]
    TypeMismatch { token: Token, message: String },

    #[error("{message}\n[line {}]", .token.line)]
    UndefinedVariable { token: Token, message: String },

    #[error("{message}\n[line {}]", .token.line)]
    UndefinedProperty { token: Token, message: String },

    #[error("{message}\n[line {}]", .token.line)]
    ArgumentMismatch { token: Token, message: String },

    #[error("{message}\n[line {}]", .token.line)]
    NotCallable { token: Token, message: String },

    #[error("{message}\n[line {}]", .token.line)]
    NotInstance { token: Token, message: String },

    #[error("{message}\n[line {}]", .token.line)]
    NotClass { token: Token, message: String },

    /// Call nesting went past the interpreter's depth limit.
    #[error("{message}\n[line {}]", .token.line)]
    StackOverflow { token: Token, message: String },

    #[error("Unexpected runtime error: {0}")]
    Unexpected(String),
}

impl RuntimeError {
    pub fn type_mismatch(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch {
            token: token.clone(),
            message: message.into(),
        }
    }

    pub fn undefined_variable(token: &Token) -> Self {
        RuntimeError::UndefinedVariable {
            token: token.clone(),
            message: format!("Undefined variable '{}'.", token.lexeme),
        }
    }

    pub fn undefined_property(token: &Token) -> Self {
        RuntimeError::UndefinedProperty {
            token: token.clone(),
            message: format!("Undefined property '{}'.", token.lexeme),
        }
    }

    pub fn argument_mismatch(token: &Token, expected: usize, got: usize) -> Self {
        RuntimeError::ArgumentMismatch {
            token: token.clone(),
            message: format!("Expected {} arguments but got {}.", expected, got),
        }
    }

    pub fn not_callable(token: &Token) -> Self {
        RuntimeError::NotCallable {
            token: token.clone(),
            message: "Can only call functions and classes.".to_string(),
        }
    }

    pub fn not_instance(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError::NotInstance {
            token: token.clone(),
            message: message.into(),
        }
    }

    pub fn not_class(token: &Token) -> Self {
        RuntimeError::NotClass {
            token: token.clone(),
            message: "Superclass must be a class.".to_string(),
        }
    }

    pub fn stack_overflow(token: &Token) -> Self {
        RuntimeError::StackOverflow {
            token: token.clone(),
            message: "Stack overflow.".to_string(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        RuntimeError::Unexpected(message.into())
    }

    /// Line of the offending token; `None` for internal errors.
    pub fn line(&self) -> Option<usize> {
        self.token().map(|t| t.line)
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            RuntimeError::TypeMismatch { token, .. }
            | RuntimeError::UndefinedVariable { token, .. }
            | RuntimeError::UndefinedProperty { token, .. }
            | RuntimeError::ArgumentMismatch { token, .. }
            | RuntimeError::NotCallable { token, .. }
            | RuntimeError::NotInstance { token, .. }
            | RuntimeError::NotClass { token, .. }
            | RuntimeError::StackOverflow { token, .. } => Some(token),
            RuntimeError::Unexpected(_) => None,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
