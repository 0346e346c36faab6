//! PDF Lexer
//!
//! Tokenizes PDF syntax from an in-memory buffer. Every token carries the byte
//! offset it started at so parse errors can point back into the file.

use crate::objects::{decode_text, unescape_name};
use std::fmt;
use thiserror::Error;

/// Result type for lexer operations
pub type LexResult<T> = Result<T, LexError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{}' at position {position}", *found as char)]
    UnexpectedCharacter { position: usize, found: u8 },

    #[error("Unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Unterminated hex string starting at position {position}")]
    UnterminatedHexString { position: usize },

    #[error("Invalid character '{}' in hex string at position {position}", *found as char)]
    InvalidHexCharacter { position: usize, found: u8 },

    #[error("Invalid number '{text}' at position {position}")]
    InvalidNumber { position: usize, text: String },

    #[error("Invalid version marker at position {position}")]
    InvalidVersion { position: usize },

    #[error("Invalid #XX escape in name at position {position}")]
    InvalidNameEscape { position: usize },

    #[error("Missing %%EOF marker at end of file")]
    MissingEofMarker,

    #[error("Missing cross-reference offset before %%EOF")]
    InvalidStartXref,

    #[error("Offset {offset} is outside the {len}-byte buffer")]
    SeekOutOfRange { offset: usize, len: usize },

    #[error("Requested {requested} bytes at position {position} past end of input")]
    UnexpectedEnd { position: usize, requested: usize },
}

/// Token payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `%PDF-M.N` header, holding `"M.N"`
    Version(String),

    /// Boolean: true or false
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Real number
    Real(f64),

    /// Name object without the solidus, `#XX` escapes resolved
    Name(String),

    /// Decoded literal string
    String(String),

    /// Hex string digits, whitespace removed
    HexString(String),

    /// Left square bracket [
    ArrayStart,

    /// Right square bracket ]
    ArrayEnd,

    /// Dictionary start <<
    DictStart,

    /// Dictionary end >>
    DictEnd,

    /// Stream keyword, its trailing end-of-line already consumed
    Stream,

    /// Endstream keyword
    EndStream,

    /// Obj keyword
    Obj,

    /// Endobj keyword
    EndObj,

    /// Xref keyword
    XRef,

    /// Trailer keyword
    Trailer,

    /// Null object
    Null,

    /// Any other bare word, such as `R`, `n`, `f` or `startxref`
    Keyword(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Version(v) => write!(f, "%PDF-{v}"),
            TokenKind::Boolean(b) => write!(f, "{b}"),
            TokenKind::Integer(i) => write!(f, "{i}"),
            TokenKind::Real(r) => write!(f, "{r}"),
            TokenKind::Name(n) => write!(f, "/{n}"),
            TokenKind::String(s) => write!(f, "({s})"),
            TokenKind::HexString(h) => write!(f, "<{h}>"),
            TokenKind::ArrayStart => f.write_str("["),
            TokenKind::ArrayEnd => f.write_str("]"),
            TokenKind::DictStart => f.write_str("<<"),
            TokenKind::DictEnd => f.write_str(">>"),
            TokenKind::Stream => f.write_str("stream"),
            TokenKind::EndStream => f.write_str("endstream"),
            TokenKind::Obj => f.write_str("obj"),
            TokenKind::EndObj => f.write_str("endobj"),
            TokenKind::XRef => f.write_str("xref"),
            TokenKind::Trailer => f.write_str("trailer"),
            TokenKind::Null => f.write_str("null"),
            TokenKind::Keyword(k) => f.write_str(k),
        }
    }
}

/// A token and the offset of its first byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

pub(crate) fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(byte: u8) -> bool {
    !is_whitespace(byte) && !is_delimiter(byte)
}

/// PDF Lexer over a byte buffer
pub struct Lexer<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> LexResult<Option<Token>> {
        if self.position == 0 && self.data.starts_with(b"%PDF-") {
            return self.read_version().map(Some);
        }

        self.skip_whitespace();

        let start = self.position;
        let Some(&ch) = self.data.get(start) else {
            return Ok(None);
        };

        let kind = match ch {
            b'/' => self.read_name()?,
            b'(' => self.read_literal_string()?,
            b'<' => {
                if self.peek_byte(1) == Some(b'<') {
                    self.position += 2;
                    TokenKind::DictStart
                } else {
                    self.read_hex_string()?
                }
            }
            b'>' => {
                if self.peek_byte(1) == Some(b'>') {
                    self.position += 2;
                    TokenKind::DictEnd
                } else {
                    return Err(LexError::UnexpectedCharacter {
                        position: start,
                        found: ch,
                    });
                }
            }
            b'[' => {
                self.position += 1;
                TokenKind::ArrayStart
            }
            b']' => {
                self.position += 1;
                TokenKind::ArrayEnd
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.read_number()?,
            _ if is_regular(ch) => self.read_keyword(),
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    position: start,
                    found: ch,
                })
            }
        };

        Ok(Some(Token {
            kind,
            offset: start,
        }))
    }

    /// Returns up to `n` upcoming tokens without moving the cursor.
    pub fn peek(&mut self, n: usize) -> LexResult<Vec<Token>> {
        let saved = self.position;
        let mut tokens = Vec::with_capacity(n);
        let mut result = Ok(());
        for _ in 0..n {
            match self.next_token() {
                Ok(Some(token)) => tokens.push(token),
                Ok(None) => break,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.position = saved;
        result.map(|_| tokens)
    }

    pub fn seek(&mut self, offset: usize) -> LexResult<()> {
        if offset > self.data.len() {
            return Err(LexError::SeekOutOfRange {
                offset,
                len: self.data.len(),
            });
        }
        self.position = offset;
        Ok(())
    }

    /// Positions the cursor at the offset named just before the trailing `%%EOF`.
    ///
    /// Returns the offset that was found.
    pub fn seek_to_xref_tail(&mut self) -> LexResult<usize> {
        let mut end = self.data.len();
        while end > 0 && is_whitespace(self.data[end - 1]) {
            end -= 1;
        }
        if !self.data[..end].ends_with(b"%%EOF") {
            return Err(LexError::MissingEofMarker);
        }
        end -= b"%%EOF".len();
        while end > 0 && is_whitespace(self.data[end - 1]) {
            end -= 1;
        }

        let digits_end = end;
        while end > 0 && self.data[end - 1].is_ascii_digit() {
            end -= 1;
        }
        if end == digits_end {
            return Err(LexError::InvalidStartXref);
        }

        let offset = std::str::from_utf8(&self.data[end..digits_end])
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or(LexError::InvalidStartXref)?;
        self.seek(offset)?;
        Ok(offset)
    }

    /// Consumes exactly `length` raw bytes.
    pub fn take(&mut self, length: usize) -> LexResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .filter(|&end| end <= self.data.len())
            .ok_or(LexError::UnexpectedEnd {
                position: self.position,
                requested: length,
            })?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.position + ahead).copied()
    }

    /// Skips whitespace and `%` comments.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.data.get(self.position) {
            if is_whitespace(ch) {
                self.position += 1;
            } else if ch == b'%' {
                while let Some(&c) = self.data.get(self.position) {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.position += 1;
                }
            } else {
                break;
            }
        }
    }

    fn read_version(&mut self) -> LexResult<Token> {
        let invalid = LexError::InvalidVersion { position: 0 };
        let rest = &self.data[5..];
        match rest {
            [major, b'.', minor, after, ..]
                if major.is_ascii_digit() && minor.is_ascii_digit() && is_whitespace(*after) =>
            {
                self.position = 8;
                Ok(Token {
                    kind: TokenKind::Version(format!("{}.{}", *major as char, *minor as char)),
                    offset: 0,
                })
            }
            _ => Err(invalid),
        }
    }

    fn read_run(&mut self, accept: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.position;
        while let Some(&ch) = self.data.get(self.position) {
            if !accept(ch) {
                break;
            }
            self.position += 1;
        }
        &self.data[start..self.position]
    }

    /// Read a name object (e.g., /Type)
    fn read_name(&mut self) -> LexResult<TokenKind> {
        let start = self.position;
        self.position += 1; // consume '/'
        let raw = self.read_run(is_regular);
        unescape_name(raw)
            .map(TokenKind::Name)
            .ok_or(LexError::InvalidNameEscape { position: start })
    }

    fn read_keyword(&mut self) -> TokenKind {
        let word = self.read_run(is_regular);
        match word {
            b"true" => TokenKind::Boolean(true),
            b"false" => TokenKind::Boolean(false),
            b"null" => TokenKind::Null,
            b"obj" => TokenKind::Obj,
            b"endobj" => TokenKind::EndObj,
            b"endstream" => TokenKind::EndStream,
            b"xref" => TokenKind::XRef,
            b"trailer" => TokenKind::Trailer,
            b"stream" => {
                self.skip_stream_eol();
                TokenKind::Stream
            }
            other => TokenKind::Keyword(other.iter().map(|&b| b as char).collect()),
        }
    }

    fn skip_stream_eol(&mut self) {
        match (self.peek_byte(0), self.peek_byte(1)) {
            (Some(b'\r'), Some(b'\n')) => self.position += 2,
            (Some(b'\n'), _) | (Some(b'\r'), _) => self.position += 1,
            _ => {}
        }
    }

    /// Read a number (integer or real)
    fn read_number(&mut self) -> LexResult<TokenKind> {
        let start = self.position;
        let raw = self.read_run(|c| matches!(c, b'0'..=b'9' | b'+' | b'-' | b'.'));
        let text = String::from_utf8_lossy(raw).into_owned();
        let invalid = || LexError::InvalidNumber {
            position: start,
            text: text.clone(),
        };

        if text.contains('.') {
            return text.parse::<f64>().map(TokenKind::Real).map_err(|_| invalid());
        }
        match text.parse::<i64>() {
            Ok(value) => Ok(TokenKind::Integer(value)),
            Err(_) => {
                let digits = text.trim_start_matches(&['+', '-'][..]);
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    text.parse::<f64>().map(TokenKind::Real).map_err(|_| invalid())
                } else {
                    Err(invalid())
                }
            }
        }
    }

    /// Read a literal string (parentheses)
    fn read_literal_string(&mut self) -> LexResult<TokenKind> {
        let start = self.position;
        self.position += 1; // consume '('
        let mut bytes = Vec::new();
        let mut depth = 1;

        loop {
            let ch = self
                .data
                .get(self.position)
                .copied()
                .ok_or(LexError::UnterminatedString { position: start })?;
            self.position += 1;

            match ch {
                b'\\' => {
                    let escaped = self
                        .data
                        .get(self.position)
                        .copied()
                        .ok_or(LexError::UnterminatedString { position: start })?;
                    self.position += 1;
                    match escaped {
                        b'n' => bytes.push(b'\n'),
                        b'r' => bytes.push(b'\r'),
                        b't' => bytes.push(b'\t'),
                        b'b' => bytes.push(b'\x08'),
                        b'f' => bytes.push(b'\x0C'),
                        b'0'..=b'7' => {
                            let mut value = (escaped - b'0') as u32;
                            for _ in 0..2 {
                                match self.peek_byte(0) {
                                    Some(d @ b'0'..=b'7') => {
                                        self.position += 1;
                                        value = value * 8 + (d - b'0') as u32;
                                    }
                                    _ => break,
                                }
                            }
                            bytes.push(value as u8);
                        }
                        // line continuation
                        b'\r' => {
                            if self.peek_byte(0) == Some(b'\n') {
                                self.position += 1;
                            }
                        }
                        b'\n' => {}
                        other => bytes.push(other),
                    }
                }
                b'(' => {
                    depth += 1;
                    bytes.push(ch);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    bytes.push(ch);
                }
                _ => bytes.push(ch),
            }
        }

        Ok(TokenKind::String(decode_text(&bytes)))
    }

    fn read_hex_string(&mut self) -> LexResult<TokenKind> {
        let start = self.position;
        self.position += 1; // consume '<'
        let mut digits = String::new();

        loop {
            let ch = self
                .data
                .get(self.position)
                .copied()
                .ok_or(LexError::UnterminatedHexString { position: start })?;
            match ch {
                b'>' => {
                    self.position += 1;
                    return Ok(TokenKind::HexString(digits));
                }
                _ if ch.is_ascii_hexdigit() => digits.push(ch as char),
                _ if is_whitespace(ch) => {}
                _ => {
                    return Err(LexError::InvalidHexCharacter {
                        position: self.position,
                        found: ch,
                    })
                }
            }
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            out.push(token.kind);
        }
        out
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds(b"true false null 42 -3 2.75 .5 /Type [ ] << >>"),
            vec![
                TokenKind::Boolean(true),
                TokenKind::Boolean(false),
                TokenKind::Null,
                TokenKind::Integer(42),
                TokenKind::Integer(-3),
                TokenKind::Real(2.75),
                TokenKind::Real(0.5),
                TokenKind::Name("Type".to_string()),
                TokenKind::ArrayStart,
                TokenKind::ArrayEnd,
                TokenKind::DictStart,
                TokenKind::DictEnd,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let mut lexer = Lexer::new(b"  12 0 R");
        assert_eq!(lexer.next_token().unwrap().unwrap().offset, 2);
        assert_eq!(lexer.next_token().unwrap().unwrap().offset, 5);
        let r = lexer.next_token().unwrap().unwrap();
        assert_eq!(r.kind, TokenKind::Keyword("R".to_string()));
        assert_eq!(r.offset, 7);
        assert_eq!(lexer.next_token().unwrap(), None);
    }

    #[test]
    fn test_keywords_need_boundary() {
        assert_eq!(
            kinds(b"trueish nullable objx endobj"),
            vec![
                TokenKind::Keyword("trueish".to_string()),
                TokenKind::Keyword("nullable".to_string()),
                TokenKind::Keyword("objx".to_string()),
                TokenKind::EndObj,
            ]
        );
        assert_eq!(
            kinds(b"null/Name"),
            vec![TokenKind::Null, TokenKind::Name("Name".to_string())]
        );
    }

    #[test]
    fn test_large_integer_does_not_overflow() {
        assert_eq!(kinds(b"4294967296"), vec![TokenKind::Integer(4_294_967_296)]);
        assert_eq!(
            kinds(b"99999999999999999999"),
            vec![TokenKind::Real(99999999999999999999.0)]
        );
    }

    #[test]
    fn test_trailing_dot_is_real() {
        assert_eq!(kinds(b"5."), vec![TokenKind::Real(5.0)]);
    }

    #[test]
    fn test_invalid_number() {
        let mut lexer = Lexer::new(b" +-");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::InvalidNumber {
                position: 1,
                text: "+-".to_string()
            })
        );
    }

    #[test]
    fn test_literal_strings() {
        assert_eq!(
            kinds(b"(Hello (nested) world) (a\\nb\\(c\\)\\\\) (\\101\\60)"),
            vec![
                TokenKind::String("Hello (nested) world".to_string()),
                TokenKind::String("a\nb(c)\\".to_string()),
                TokenKind::String("A0".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_line_continuation() {
        assert_eq!(
            kinds(b"(one\\\ntwo)"),
            vec![TokenKind::String("onetwo".to_string())]
        );
    }

    #[test]
    fn test_utf16_string() {
        let input = b"(\xFE\xFF\x00H\x00i)";
        assert_eq!(kinds(input), vec![TokenKind::String("Hi".to_string())]);
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new(b"  (never closed");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::UnterminatedString { position: 2 })
        );
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(
            kinds(b"<48 65\n6C> <>"),
            vec![
                TokenKind::HexString("48656C".to_string()),
                TokenKind::HexString(String::new()),
            ]
        );
    }

    #[test]
    fn test_hex_string_errors() {
        let mut lexer = Lexer::new(b"<12G4>");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::InvalidHexCharacter {
                position: 3,
                found: b'G'
            })
        );

        let mut lexer = Lexer::new(b"<1234");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::UnterminatedHexString { position: 0 })
        );
    }

    #[test]
    fn test_single_close_angle_is_error() {
        let mut lexer = Lexer::new(b"> ");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnexpectedCharacter { found: b'>', .. })
        ));
    }

    #[test]
    fn test_names_with_escapes() {
        assert_eq!(
            kinds(b"/A#20B/Empty /"),
            vec![
                TokenKind::Name("A B".to_string()),
                TokenKind::Name("Empty".to_string()),
                TokenKind::Name(String::new()),
            ]
        );
        let mut lexer = Lexer::new(b"/Bad#4");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::InvalidNameEscape { position: 0 })
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds(b"1 % a comment\n2"),
            vec![TokenKind::Integer(1), TokenKind::Integer(2)]
        );
    }

    #[test]
    fn test_version_header() {
        let mut lexer = Lexer::new(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj");
        assert_eq!(
            lexer.next_token().unwrap().unwrap().kind,
            TokenKind::Version("1.7".to_string())
        );
        assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::Integer(1));
    }

    #[test]
    fn test_version_requires_whitespace() {
        let mut lexer = Lexer::new(b"%PDF-1.7x\n");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::InvalidVersion { position: 0 })
        );
        let mut lexer = Lexer::new(b"%PDF-1.");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::InvalidVersion { position: 0 })
        );
    }

    #[test]
    fn test_stream_keyword_consumes_eol() {
        for input in [&b"stream\r\nDATA"[..], b"stream\nDATA"] {
            let mut lexer = Lexer::new(input);
            assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::Stream);
            assert_eq!(lexer.take(4).unwrap(), b"DATA");
        }
    }

    #[test]
    fn test_peek_has_no_side_effects() {
        let mut lexer = Lexer::new(b"1 0 R 7");
        let ahead = lexer.peek(3).unwrap();
        assert_eq!(ahead.len(), 3);
        assert_eq!(ahead[2].kind, TokenKind::Keyword("R".to_string()));
        assert_eq!(lexer.position(), 0);
        assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::Integer(1));

        let mut short = Lexer::new(b"9");
        assert_eq!(short.peek(2).unwrap().len(), 1);
    }

    #[test]
    fn test_take_past_end() {
        let mut lexer = Lexer::new(b"abc");
        assert_eq!(
            lexer.take(4),
            Err(LexError::UnexpectedEnd {
                position: 0,
                requested: 4
            })
        );
        assert_eq!(lexer.take(3).unwrap(), b"abc");
    }

    #[test]
    fn test_seek_out_of_range() {
        let mut lexer = Lexer::new(b"abc");
        assert!(lexer.seek(3).is_ok());
        assert_eq!(
            lexer.seek(10),
            Err(LexError::SeekOutOfRange { offset: 10, len: 3 })
        );
    }

    #[test]
    fn test_seek_to_xref_tail() {
        let data = b"%PDF-1.4\nxref\nstuff\nstartxref\n9\n%%EOF\n\n";
        let mut lexer = Lexer::new(data);
        assert_eq!(lexer.seek_to_xref_tail().unwrap(), 9);
        assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::XRef);
    }

    #[test]
    fn test_seek_to_xref_tail_errors() {
        let mut lexer = Lexer::new(b"startxref\n12\n");
        assert_eq!(lexer.seek_to_xref_tail(), Err(LexError::MissingEofMarker));

        let mut lexer = Lexer::new(b"startxref\n%%EOF");
        assert_eq!(lexer.seek_to_xref_tail(), Err(LexError::InvalidStartXref));

        let mut lexer = Lexer::new(b"startxref\n500\n%%EOF");
        assert!(matches!(
            lexer.seek_to_xref_tail(),
            Err(LexError::SeekOutOfRange { offset: 500, .. })
        ));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new(b"{");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::UnexpectedCharacter {
                position: 0,
                found: b'{'
            })
        );
    }
}
