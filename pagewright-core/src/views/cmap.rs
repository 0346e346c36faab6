//! ToUnicode CMap tables
//!
//! Only the `bfchar` and `bfrange` sections are read; they map character
//! codes to the Unicode text they stand for.

use crate::objects::HexString;
use crate::parser::{Lexer, ParseError, ParseResult, TokenKind};
use std::collections::{BTreeMap, HashMap};

const MAX_RANGE_SPAN: u64 = 0x1_0000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnicodeCMap {
    to_unicode: BTreeMap<u32, String>,
    from_unicode: HashMap<String, u32>,
}

impl UnicodeCMap {
    pub fn parse(data: &[u8]) -> ParseResult<Self> {
        let mut lexer = Lexer::new(data);
        let mut cmap = Self::default();

        while let Some(token) = lexer.next_token()? {
            match token.kind {
                TokenKind::Keyword(word) if word == "beginbfchar" => {
                    cmap.read_bfchar(&mut lexer)?
                }
                TokenKind::Keyword(word) if word == "beginbfrange" => {
                    cmap.read_bfrange(&mut lexer)?
                }
                _ => {}
            }
        }

        // lowest code wins when several codes map to the same text
        for (code, text) in &cmap.to_unicode {
            cmap.from_unicode.entry(text.clone()).or_insert(*code);
        }
        Ok(cmap)
    }

    pub fn len(&self) -> usize {
        self.to_unicode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_unicode.is_empty()
    }

    /// Text for a character code.
    pub fn unicode(&self, code: u32) -> Option<&str> {
        self.to_unicode.get(&code).map(String::as_str)
    }

    /// Character code that maps to `text`.
    pub fn code_for(&self, text: &str) -> Option<u32> {
        self.from_unicode.get(text).copied()
    }

    /// Character code for `ch` as a four-digit hex string.
    pub fn hex_code_for(&self, ch: char) -> Option<HexString> {
        let mut buf = [0u8; 4];
        self.code_for(ch.encode_utf8(&mut buf))
            .map(|code| HexString::from_int(code as u64))
    }

    /// Encodes every character of `text`, or `None` if one has no code.
    pub fn encode(&self, text: &str) -> Option<HexString> {
        let mut digits = String::with_capacity(text.len() * 4);
        for ch in text.chars() {
            digits.push_str(self.hex_code_for(ch)?.as_str());
        }
        Some(HexString::new(digits))
    }

    fn read_bfchar(&mut self, lexer: &mut Lexer<'_>) -> ParseResult<()> {
        loop {
            match next_kind(lexer, "endbfchar")? {
                (TokenKind::Keyword(word), _) if word == "endbfchar" => return Ok(()),
                (TokenKind::HexString(source), _) => {
                    let code = code_of(&source);
                    let target = expect_hex(lexer)?;
                    self.to_unicode.insert(code, utf16_text(&target, 0));
                }
                (other, position) => return Err(unexpected(position, "bfchar entry", &other)),
            }
        }
    }

    fn read_bfrange(&mut self, lexer: &mut Lexer<'_>) -> ParseResult<()> {
        loop {
            let low = match next_kind(lexer, "endbfrange")? {
                (TokenKind::Keyword(word), _) if word == "endbfrange" => return Ok(()),
                (TokenKind::HexString(low), _) => code_of(&low),
                (other, position) => return Err(unexpected(position, "bfrange entry", &other)),
            };
            let high = code_of(&expect_hex(lexer)?);
            if high < low {
                continue;
            }
            let span = (high - low) as u64 + 1;

            match next_kind(lexer, "bfrange destination")? {
                (TokenKind::HexString(start), position) => {
                    if span > MAX_RANGE_SPAN {
                        return Err(unexpected(
                            position,
                            "a bfrange of at most 65536 codes",
                            &TokenKind::HexString(start),
                        ));
                    }
                    for code in low..=high {
                        self.to_unicode
                            .insert(code, utf16_text(&start, (code - low) as u16));
                    }
                }
                (TokenKind::ArrayStart, _) => {
                    let mut code = low;
                    loop {
                        match next_kind(lexer, "]")? {
                            (TokenKind::ArrayEnd, _) => break,
                            (TokenKind::HexString(target), _) => {
                                if code <= high {
                                    self.to_unicode.insert(code, utf16_text(&target, 0));
                                }
                                code = code.saturating_add(1);
                            }
                            (other, position) => {
                                return Err(unexpected(position, "hex string", &other))
                            }
                        }
                    }
                }
                (other, position) => {
                    return Err(unexpected(position, "bfrange destination", &other))
                }
            }
        }
    }
}

fn next_kind(lexer: &mut Lexer<'_>, expected: &str) -> ParseResult<(TokenKind, usize)> {
    lexer
        .next_token()?
        .map(|token| (token.kind, token.offset))
        .ok_or_else(|| ParseError::UnexpectedEof {
            expected: expected.to_string(),
        })
}

fn expect_hex(lexer: &mut Lexer<'_>) -> ParseResult<String> {
    match next_kind(lexer, "hex string")? {
        (TokenKind::HexString(digits), _) => Ok(digits),
        (other, position) => Err(unexpected(position, "hex string", &other)),
    }
}

fn unexpected(position: usize, expected: &str, found: &TokenKind) -> ParseError {
    ParseError::UnexpectedToken {
        position,
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn code_of(digits: &str) -> u32 {
    HexString::new(digits)
        .to_int()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Decodes UTF-16BE digits, adding `offset` to the final code unit.
fn utf16_text(digits: &str, offset: u16) -> String {
    let bytes = HexString::new(digits).to_bytes();
    let mut units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect();
    if let Some(last) = units.last_mut() {
        *last = last.wrapping_add(offset);
    }
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
