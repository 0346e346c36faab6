//! Text codecs for literal strings and the hex string value type.

use std::fmt;

const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Decodes the raw bytes of a literal string.
///
/// A leading `FE FF` byte-order mark selects UTF-16BE for the rest of the
/// bytes; anything else maps byte-for-byte onto U+0000..U+00FF.
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&UTF16_BOM) {
        Some(rest) => {
            let units = rest
                .chunks(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]));
            char::decode_utf16(units)
                .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Encodes text for a literal string body (without escaping).
///
/// Pure ASCII text is written as single bytes; any other character switches the
/// whole string to UTF-16BE behind a byte-order mark.
pub fn encode_text(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        return text.as_bytes().to_vec();
    }
    let mut bytes = UTF16_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

/// A hex string kept as its digit text, e.g. `<00A5>` is `"00A5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HexString(String);

impl HexString {
    pub fn new(digits: impl Into<String>) -> Self {
        HexString(digits.into())
    }

    /// Formats an integer with at least four upper-case hex digits.
    pub fn from_int(value: u64) -> Self {
        HexString(format!("{value:04X}"))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        HexString(bytes.iter().map(|b| format!("{b:02X}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the digits as one big-endian integer.
    pub fn to_int(&self) -> Option<u64> {
        if self.0.is_empty() {
            return None;
        }
        u64::from_str_radix(&self.0, 16).ok()
    }

    /// Decodes digit pairs to bytes; an odd trailing digit is padded with `0`.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0
            .as_bytes()
            .chunks(2)
            .filter_map(|pair| {
                let hi = (pair[0] as char).to_digit(16)?;
                let lo = match pair.get(1) {
                    Some(&c) => (c as char).to_digit(16)?,
                    None => 0,
                };
                Some((hi * 16 + lo) as u8)
            })
            .collect()
    }
}

impl fmt::Display for HexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}
