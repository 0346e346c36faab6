use crate::filters::FilterError;
use crate::parser::lexer::LexError;
use crate::parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl From<LexError> for PdfError {
    fn from(err: LexError) -> Self {
        PdfError::Parse(ParseError::Lex(err))
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Raised when a typed view cannot find one of its required fields.
///
/// Only the access that needed the field fails; the rest of the document stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Missing required field /{field}")]
    MissingField { field: String },

    #[error("Field /{field} is not {expected}")]
    WrongKind { field: String, expected: String },
}

impl StructureError {
    pub fn missing(field: impl Into<String>) -> Self {
        StructureError::MissingField {
            field: field.into(),
        }
    }

    pub fn wrong_kind(field: impl Into<String>, expected: impl Into<String>) -> Self {
        StructureError::WrongKind {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Name of the field that was absent or malformed.
    pub fn field(&self) -> &str {
        match self {
            StructureError::MissingField { field } | StructureError::WrongKind { field, .. } => {
                field
            }
        }
    }
}
