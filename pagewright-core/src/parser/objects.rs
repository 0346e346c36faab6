//! PDF Object Parser
//!
//! Recursive-descent parsing of single values and of `n g obj ... endobj`
//! definitions, stream payloads included.

use super::lexer::{Lexer, Token, TokenKind};
use super::{ParseError, ParseResult};
use crate::document::Document;
use crate::objects::{Dictionary, HexString, Object, ObjectId, Stream};

/// Parser over one byte buffer.
///
/// When attached to a [`Document`], indirect stream lengths are resolved
/// through it.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    document: Option<&'a Document>,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            document: None,
        }
    }

    pub fn with_document(data: &'a [u8], document: &'a Document) -> Self {
        Self {
            lexer: Lexer::new(data),
            document: Some(document),
        }
    }

    pub fn position(&self) -> usize {
        self.lexer.position()
    }

    pub fn seek(&mut self, offset: usize) -> ParseResult<()> {
        self.lexer.seek(offset)?;
        Ok(())
    }

    pub(crate) fn lexer_mut(&mut self) -> &mut Lexer<'a> {
        &mut self.lexer
    }

    /// Next token, treating end of input as an error.
    pub(crate) fn next_token(&mut self, expected: &str) -> ParseResult<Token> {
        self.lexer
            .next_token()?
            .ok_or_else(|| ParseError::UnexpectedEof {
                expected: expected.to_string(),
            })
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        let token = self.next_token(&kind.to_string())?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(&token, &kind.to_string()))
        }
    }

    pub(crate) fn expect_integer(&mut self, expected: &str) -> ParseResult<(i64, usize)> {
        let token = self.next_token(expected)?;
        match token.kind {
            TokenKind::Integer(value) => Ok((value, token.offset)),
            _ => Err(unexpected(&token, expected)),
        }
    }

    /// Parse one value.
    pub fn parse_object(&mut self) -> ParseResult<Object> {
        let token = self.next_token("object")?;
        self.parse_from_token(token)
    }

    fn parse_from_token(&mut self, token: Token) -> ParseResult<Object> {
        let offset = token.offset;
        match token.kind {
            TokenKind::DictStart => self.parse_dictionary_body().map(Object::Dictionary),
            TokenKind::ArrayStart => self.parse_array_body(),
            TokenKind::Name(name) => Ok(Object::Name(name)),
            TokenKind::String(text) => Ok(Object::String(text)),
            TokenKind::HexString(digits) => Ok(Object::HexString(HexString::new(digits))),
            TokenKind::Real(value) => Ok(Object::Real(value)),
            TokenKind::Boolean(value) => Ok(Object::Boolean(value)),
            TokenKind::Null => Ok(Object::Null),
            TokenKind::Integer(value) => self.integer_or_reference(value, offset),
            other => Err(ParseError::UnexpectedToken {
                position: offset,
                expected: "object".to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// `<int> <int> R` is a reference; any other integer is a number.
    fn integer_or_reference(&mut self, value: i64, position: usize) -> ParseResult<Object> {
        // lookahead errors surface again when the tokens are really read
        let ahead = self.lexer.peek(2).unwrap_or_default();
        let generation = match ahead.as_slice() {
            [Token {
                kind: TokenKind::Integer(generation),
                ..
            }, Token {
                kind: TokenKind::Keyword(keyword),
                ..
            }] if keyword == "R" => *generation,
            _ => return Ok(Object::Integer(value)),
        };

        self.next_token("generation")?;
        self.next_token("R")?;
        let number = u32::try_from(value).map_err(|_| ParseError::InvalidReference { position })?;
        let generation =
            u16::try_from(generation).map_err(|_| ParseError::InvalidReference { position })?;
        Ok(Object::Reference(ObjectId::new(number, generation)))
    }

    fn parse_array_body(&mut self) -> ParseResult<Object> {
        let mut items = Vec::new();
        loop {
            let token = self.next_token("]")?;
            if token.kind == TokenKind::ArrayEnd {
                return Ok(Object::Array(items));
            }
            items.push(self.parse_from_token(token)?);
        }
    }

    fn parse_dictionary_body(&mut self) -> ParseResult<Dictionary> {
        let mut dict = Dictionary::new();
        loop {
            let token = self.next_token(">>")?;
            match token.kind {
                TokenKind::DictEnd => return Ok(dict),
                TokenKind::Name(key) => {
                    let value = self.parse_object()?;
                    dict.set(key, value);
                }
                _ => return Err(unexpected(&token, "name or >>")),
            }
        }
    }

    /// Parse `n g obj <value> [stream ... endstream] endobj` at the cursor.
    ///
    /// When `expected` is given, the definition must carry that identity.
    pub fn parse_indirect_object(
        &mut self,
        expected: Option<ObjectId>,
    ) -> ParseResult<(ObjectId, Object)> {
        let (number, position) = self.expect_integer("object number")?;
        let (generation, _) = self.expect_integer("generation number")?;
        self.expect(TokenKind::Obj)?;

        let id = ObjectId::new(
            u32::try_from(number).map_err(|_| ParseError::InvalidReference { position })?,
            u16::try_from(generation).map_err(|_| ParseError::InvalidReference { position })?,
        );
        if let Some(expected) = expected {
            if expected != id {
                return Err(ParseError::ObjectMismatch {
                    position,
                    expected,
                    found: id,
                });
            }
        }

        let value = self.parse_object()?;
        let token = self.next_token("endobj")?;
        let object = match token.kind {
            TokenKind::EndObj => return Ok((id, value)),
            TokenKind::Stream => {
                let Object::Dictionary(dict) = value else {
                    return Err(ParseError::StreamWithoutDictionary {
                        position: token.offset,
                    });
                };
                self.parse_stream_body(dict, token.offset)?
            }
            _ => return Err(unexpected(&token, "endobj")),
        };
        self.expect(TokenKind::EndObj)?;
        Ok((id, object))
    }

    fn parse_stream_body(&mut self, dict: Dictionary, position: usize) -> ParseResult<Object> {
        let length = self.stream_length(&dict, position)?;
        let raw = self.lexer.take(length)?;
        self.expect(TokenKind::EndStream)?;
        let stream = Stream::from_encoded(dict, raw)?;
        Ok(Object::Stream(stream))
    }

    fn stream_length(&self, dict: &Dictionary, position: usize) -> ParseResult<usize> {
        let length = match dict.get("Length") {
            None => return Err(ParseError::MissingLength { position }),
            Some(Object::Integer(length)) => *length,
            Some(Object::Reference(id)) => {
                let document = self.document.ok_or(ParseError::MissingObject(*id))?;
                let resolved = document.resolve_reference(*id)?;
                resolved.as_integer().ok_or_else(|| ParseError::UnexpectedToken {
                    position,
                    expected: "integer /Length".to_string(),
                    found: resolved.type_name().to_string(),
                })?
            }
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    position,
                    expected: "integer /Length".to_string(),
                    found: other.type_name().to_string(),
                })
            }
        };
        if length <= 0 {
            return Err(ParseError::InvalidLength { position, length });
        }
        usize::try_from(length).map_err(|_| ParseError::InvalidLength { position, length })
    }
}

fn unexpected(token: &Token, expected: &str) -> ParseError {
    ParseError::UnexpectedToken {
        position: token.offset,
        expected: expected.to_string(),
        found: token.kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> Object {
        Parser::new(input).parse_object().unwrap()
    }

    #[test]
    fn test_parse_simple_objects() {
        assert_eq!(parse(b"null"), Object::Null);
        assert_eq!(parse(b"true"), Object::Boolean(true));
        assert_eq!(parse(b"42"), Object::Integer(42));
        assert_eq!(parse(b"-1.5"), Object::Real(-1.5));
        assert_eq!(parse(b"/Type"), Object::name("Type"));
        assert_eq!(parse(b"(Hello)"), Object::String("Hello".to_string()));
        assert_eq!(parse(b"<00FF>"), Object::HexString(HexString::new("00FF")));
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(parse(b"12 0 R"), Object::Reference(ObjectId::new(12, 0)));
        assert_eq!(
            parse(b"[1 2 R 3 4]"),
            Object::Array(vec![
                Object::Reference(ObjectId::new(1, 2)),
                Object::Integer(3),
                Object::Integer(4),
            ])
        );
    }

    #[test]
    fn test_reference_out_of_range() {
        let err = Parser::new(b"1 70000 R").parse_object().unwrap_err();
        assert!(matches!(err, ParseError::InvalidReference { position: 0 }));
    }

    #[test]
    fn test_parse_dictionary_keeps_order() {
        let object = parse(b"<< /Zeta 1 /Alpha [true false] /Mid << /Inner 2 0 R >> >>");
        let dict = object.as_dict().unwrap();
        let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(
            dict.get_dict("Mid").unwrap().get_reference("Inner"),
            Some(ObjectId::new(2, 0))
        );
    }

    #[test]
    fn test_dictionary_key_must_be_name() {
        let err = Parser::new(b"<< 1 2 >>").parse_object().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { position: 3, .. }));
    }

    #[test]
    fn test_unterminated_array() {
        let err = Parser::new(b"[1 2").parse_object().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_parse_indirect_object() {
        let mut parser = Parser::new(b"7 0 obj\n<< /Type /Page >>\nendobj\n");
        let (id, object) = parser.parse_indirect_object(Some(ObjectId::new(7, 0))).unwrap();
        assert_eq!(id, ObjectId::new(7, 0));
        assert_eq!(object.as_dict().unwrap().get_type(), Some("Page"));
    }

    #[test]
    fn test_indirect_object_mismatch() {
        let mut parser = Parser::new(b"7 0 obj 1 endobj");
        let err = parser
            .parse_indirect_object(Some(ObjectId::new(8, 0)))
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::ObjectMismatch { expected, found, .. }
                if expected == ObjectId::new(8, 0) && found == ObjectId::new(7, 0)
        ));
    }

    #[test]
    fn test_parse_stream() {
        let input = b"3 0 obj\n<< /Length 5 >>\nstream\nHello\nendstream\nendobj\n";
        let (_, object) = Parser::new(input).parse_indirect_object(None).unwrap();
        let stream = object.as_stream().unwrap();
        assert_eq!(stream.data(), b"Hello");
        assert!(!stream.dictionary().contains_key("Length"));
    }

    #[test]
    fn test_stream_without_length() {
        let input = b"3 0 obj\n<< /Filter /FlateDecode >>\nstream\nxx\nendstream\nendobj\n";
        let err = Parser::new(input).parse_indirect_object(None).unwrap_err();
        assert!(matches!(err, ParseError::MissingLength { .. }));
    }

    #[test]
    fn test_stream_with_zero_length() {
        let input = b"3 0 obj\n<< /Length 0 >>\nstream\n\nendstream\nendobj\n";
        let err = Parser::new(input).parse_indirect_object(None).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLength { length: 0, .. }));
    }

    #[test]
    fn test_stream_requires_dictionary() {
        let input = b"3 0 obj\n[1 2]\nstream\nxx\nendstream\nendobj\n";
        let err = Parser::new(input).parse_indirect_object(None).unwrap_err();
        assert!(matches!(err, ParseError::StreamWithoutDictionary { .. }));
    }

    #[test]
    fn test_indirect_length_without_document() {
        let input = b"3 0 obj\n<< /Length 4 0 R >>\nstream\nxx\nendstream\nendobj\n";
        let err = Parser::new(input).parse_indirect_object(None).unwrap_err();
        assert!(matches!(err, ParseError::MissingObject(id) if id == ObjectId::new(4, 0)));
    }
}
