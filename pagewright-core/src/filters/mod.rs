//! Stream filters
//!
//! Byte codecs selected by a stream's `/Filter` entry. Decoding applies the
//! declared filters in order; encoding applies them in reverse.

mod flate;
mod run_length;

pub use flate::{FlateDecode, PngPredictor};
pub use run_length::RunLengthDecode;

use crate::objects::{Dictionary, Object};
use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Unknown filter: /{0}")]
    UnknownFilter(String),

    #[error("Unsupported predictor: {0}")]
    UnsupportedPredictor(i64),

    #[error("Unsupported PNG predictor tag {0} (only None and Up rows are decoded)")]
    UnsupportedPngTag(u8),

    #[error("Flate error: {0}")]
    Flate(#[source] std::io::Error),

    #[error("Truncated {filter} data")]
    Truncated { filter: &'static str },

    #[error("Invalid /{name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("FlateDecode requires the `compression` feature")]
    CompressionDisabled,
}

/// A symmetric byte codec.
pub trait StreamFilter {
    fn decode(&self, data: &[u8]) -> FilterResult<Vec<u8>>;
    fn encode(&self, data: &[u8]) -> FilterResult<Vec<u8>>;
}

/// One entry of a stream's filter chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Flate(FlateDecode),
    RunLength,
}

impl Filter {
    /// Resolves a filter by its `/Filter` name and optional `/DecodeParms`.
    pub fn from_name(name: &str, params: Option<&Dictionary>) -> FilterResult<Self> {
        match name {
            "FlateDecode" => Ok(Filter::Flate(FlateDecode::from_params(params)?)),
            "RunLengthDecode" => Ok(Filter::RunLength),
            other => Err(FilterError::UnknownFilter(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Flate(_) => "FlateDecode",
            Filter::RunLength => "RunLengthDecode",
        }
    }
}

impl StreamFilter for Filter {
    fn decode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        match self {
            Filter::Flate(flate) => flate.decode(data),
            Filter::RunLength => RunLengthDecode.decode(data),
        }
    }

    fn encode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        match self {
            Filter::Flate(flate) => flate.encode(data),
            Filter::RunLength => RunLengthDecode.encode(data),
        }
    }
}

/// Reads `/Filter` and `/DecodeParms` from a stream dictionary.
pub fn filter_chain(dict: &Dictionary) -> FilterResult<Vec<Filter>> {
    let names: Vec<&str> = match dict.get("Filter") {
        None | Some(Object::Null) => return Ok(Vec::new()),
        Some(Object::Name(name)) => vec![name.as_str()],
        Some(Object::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_name().ok_or_else(|| FilterError::InvalidParameter {
                    name: "Filter".to_string(),
                    reason: format!("expected a name, found {}", item.type_name()),
                })
            })
            .collect::<FilterResult<_>>()?,
        Some(other) => {
            return Err(FilterError::InvalidParameter {
                name: "Filter".to_string(),
                reason: format!("expected a name or array, found {}", other.type_name()),
            })
        }
    };

    let params: Vec<Option<&Dictionary>> = match dict.get("DecodeParms") {
        None | Some(Object::Null) => Vec::new(),
        Some(Object::Dictionary(params)) => vec![Some(params)],
        Some(Object::Array(items)) => items.iter().map(Object::as_dict).collect(),
        Some(other) => {
            return Err(FilterError::InvalidParameter {
                name: "DecodeParms".to_string(),
                reason: format!("expected a dictionary or array, found {}", other.type_name()),
            })
        }
    };

    names
        .iter()
        .enumerate()
        .map(|(i, name)| Filter::from_name(name, params.get(i).copied().flatten()))
        .collect()
}

/// Runs `data` through every filter's decoder in declared order.
pub fn decode_all(chain: &[Filter], data: &[u8]) -> FilterResult<Vec<u8>> {
    let mut current = data.to_vec();
    for filter in chain {
        current = filter.decode(&current)?;
    }
    Ok(current)
}

/// Runs `data` through every filter's encoder in reverse order.
pub fn encode_all(chain: &[Filter], data: &[u8]) -> FilterResult<Vec<u8>> {
    let mut current = data.to_vec();
    for filter in chain.iter().rev() {
        current = filter.encode(&current)?;
    }
    Ok(current)
}
