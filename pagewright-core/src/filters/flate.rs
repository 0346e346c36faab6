use super::{FilterError, FilterResult, StreamFilter};
use crate::objects::Dictionary;
use tracing::warn;

const PNG_NONE: u8 = 0;
const PNG_UP: u8 = 2;

/// Row layout of a PNG predictor (`/Predictor` 10..=15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngPredictor {
    pub columns: usize,
    /// Data bytes per row, excluding the leading tag byte.
    pub row_bytes: usize,
}

/// Zlib-framed deflate with an optional PNG row predictor on decode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlateDecode {
    predictor: Option<PngPredictor>,
}

impl FlateDecode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: Option<&Dictionary>) -> FilterResult<Self> {
        let Some(params) = params else {
            return Ok(Self::default());
        };

        let predictor = params.get_integer("Predictor").unwrap_or(1);
        if predictor <= 1 {
            return Ok(Self::default());
        }
        if predictor < 10 {
            return Err(FilterError::UnsupportedPredictor(predictor));
        }

        let columns = positive_param(params, "Columns", 1)?;
        let colors = positive_param(params, "Colors", 1)?;
        let bits = positive_param(params, "BitsPerComponent", 8)?;
        let row_bytes = columns
            .checked_mul(colors)
            .and_then(|n| n.checked_mul(bits))
            .map(|n| n.div_ceil(8))
            // each row also carries a tag byte
            .filter(|n| n.checked_add(1).is_some())
            .ok_or_else(|| FilterError::InvalidParameter {
                name: "Columns".to_string(),
                reason: format!("row of {columns} x {colors} x {bits} bits is too large"),
            })?;

        Ok(Self {
            predictor: Some(PngPredictor { columns, row_bytes }),
        })
    }

    pub fn predictor(&self) -> Option<PngPredictor> {
        self.predictor
    }
}

fn positive_param(params: &Dictionary, key: &str, default: i64) -> FilterResult<usize> {
    let value = params.get_integer(key).unwrap_or(default);
    if value <= 0 {
        return Err(FilterError::InvalidParameter {
            name: key.to_string(),
            reason: format!("must be positive, got {value}"),
        });
    }
    usize::try_from(value).map_err(|_| FilterError::InvalidParameter {
        name: key.to_string(),
        reason: format!("{value} is out of range"),
    })
}

impl StreamFilter for FlateDecode {
    fn decode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        let inflated = inflate(data)?;
        match self.predictor {
            Some(predictor) => unpredict_png(&inflated, predictor),
            None => Ok(inflated),
        }
    }

    /// Encodes at maximum compression; a predictor is never applied on output.
    fn encode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        deflate(data)
    }
}

/// Reverses PNG row filtering. Each input row is a tag byte followed by
/// `row_bytes` data bytes.
fn unpredict_png(data: &[u8], predictor: PngPredictor) -> FilterResult<Vec<u8>> {
    let stride = predictor.row_bytes + 1;
    let rows = data.len() / stride;
    if data.len() % stride != 0 {
        warn!(
            "Dropping {} trailing bytes of a truncated predictor row",
            data.len() % stride
        );
    }

    let mut output: Vec<u8> = Vec::with_capacity(rows * predictor.row_bytes);
    for row in 0..rows {
        let input = &data[row * stride..(row + 1) * stride];
        let start = output.len();
        match input[0] {
            PNG_NONE => output.extend_from_slice(&input[1..]),
            PNG_UP if row == 0 => output.extend_from_slice(&input[1..]),
            PNG_UP => {
                let above = start - predictor.row_bytes;
                for (i, &byte) in input[1..].iter().enumerate() {
                    let value = byte.wrapping_add(output[above + i]);
                    output.push(value);
                }
            }
            tag => return Err(FilterError::UnsupportedPngTag(tag)),
        }
    }
    Ok(output)
}

#[cfg(feature = "compression")]
fn inflate(data: &[u8]) -> FilterResult<Vec<u8>> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(FilterError::Flate)?;
    Ok(decompressed)
}

#[cfg(feature = "compression")]
fn deflate(data: &[u8]) -> FilterResult<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).map_err(FilterError::Flate)?;
    encoder.finish().map_err(FilterError::Flate)
}

#[cfg(not(feature = "compression"))]
fn inflate(_data: &[u8]) -> FilterResult<Vec<u8>> {
    Err(FilterError::CompressionDisabled)
}

#[cfg(not(feature = "compression"))]
fn deflate(_data: &[u8]) -> FilterResult<Vec<u8>> {
    Err(FilterError::CompressionDisabled)
}
