//! PDF Parser Module
//!
//! Recursive-descent parsing of the PDF object grammar on top of [`lexer`], plus
//! discovery of the cross-reference section and loading of indirect objects.

pub mod lexer;
pub mod objects;

pub(crate) mod document;
mod header;
pub(crate) mod object_stream;
mod xref;

use crate::filters::FilterError;
use crate::objects::ObjectId;

pub use self::lexer::{LexError, LexResult, Lexer, Token, TokenKind};
pub use self::objects::Parser;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// PDF Parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),

    #[error("Unexpected token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Object at position {position} is {found}, cross-reference expected {expected}")]
    ObjectMismatch {
        position: usize,
        expected: ObjectId,
        found: ObjectId,
    },

    #[error("Stream at position {position} has no /Length")]
    MissingLength { position: usize },

    #[error("Stream at position {position} has invalid /Length {length}")]
    InvalidLength { position: usize, length: i64 },

    #[error("Stream keyword at position {position} does not follow a dictionary")]
    StreamWithoutDictionary { position: usize },

    #[error("Unknown stream type: /{0}")]
    UnknownStreamType(String),

    #[error("No cross-reference table found")]
    NoCrossReference,

    #[error("Invalid cross-reference stream: {0}")]
    InvalidXRefStream(String),

    #[error("Missing required key: /{0}")]
    MissingKey(String),

    #[error("Object {0} is not in the cross-reference table")]
    MissingObject(ObjectId),

    #[error("Invalid object reference at position {position}")]
    InvalidReference { position: usize },

    #[error("Object number {0} exceeds the maximum of 8388607")]
    ObjectNumberOutOfRange(u64),

    #[error("Circular reference detected at {0}")]
    CircularReference(ObjectId),

    #[error("Stream decode error: {0}")]
    Filter(#[from] FilterError),
}

/// When indirect objects are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Every cross-reference entry is parsed while opening the document.
    #[default]
    Eager,
    /// Entries are parsed the first time they are resolved.
    Lazy,
}

/// Options for opening a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub load: LoadMode,
    /// Longest reference-to-reference chain `resolve` will follow.
    pub max_reference_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            load: LoadMode::Eager,
            max_reference_depth: 32,
        }
    }
}

impl ParseOptions {
    pub fn lazy() -> Self {
        Self {
            load: LoadMode::Lazy,
            ..Self::default()
        }
    }

    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }
}
