//! Cross-reference section discovery
//!
//! Follows `startxref` to either a classic `xref` table plus `trailer`, or a
//! cross-reference stream object.

use super::lexer::{Token, TokenKind};
use super::{ParseError, ParseResult, Parser};
use crate::objects::{Object, ObjectId};
use crate::views::{self, Trailer};
use crate::xref::{
    check_object_number, stream as xref_stream, Location, XRefEntry, XRefMode, XRefTable,
};
use tracing::{debug, warn};

pub(crate) fn parse_xref_section(parser: &mut Parser<'_>) -> ParseResult<(XRefTable, Trailer)> {
    let offset = parser.lexer_mut().seek_to_xref_tail()?;
    debug!("Cross-reference section at offset {}", offset);

    let ahead = parser.lexer_mut().peek(3).unwrap_or_default();
    match ahead.as_slice() {
        [Token {
            kind: TokenKind::XRef,
            ..
        }, ..] => parse_table(parser),
        [Token {
            kind: TokenKind::Integer(_),
            ..
        }, Token {
            kind: TokenKind::Integer(_),
            ..
        }, Token {
            kind: TokenKind::Obj,
            ..
        }] => parse_stream(parser, offset),
        _ => Err(ParseError::NoCrossReference),
    }
}

fn parse_table(parser: &mut Parser<'_>) -> ParseResult<(XRefTable, Trailer)> {
    parser.expect(TokenKind::XRef)?;
    let mut table = XRefTable::new(XRefMode::Table);

    loop {
        let token = parser.next_token("trailer")?;
        let start = match token.kind {
            TokenKind::Trailer => break,
            TokenKind::Integer(start) => field::<u32>(start, token.offset)?,
            other => {
                return Err(ParseError::UnexpectedToken {
                    position: token.offset,
                    expected: "subsection or trailer".to_string(),
                    found: other.to_string(),
                })
            }
        };
        let (count, position) = parser.expect_integer("subsection count")?;
        let count = field::<u32>(count, position)?;

        for i in 0..count {
            let (offset, position) = parser.expect_integer("entry offset")?;
            let (generation, _) = parser.expect_integer("entry generation")?;
            let marker = parser.next_token("n or f")?;
            let location = match &marker.kind {
                TokenKind::Keyword(k) if k == "n" => Location::Offset(field(offset, position)?),
                TokenKind::Keyword(k) if k == "f" => Location::NextFree(field(offset, position)?),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        position: marker.offset,
                        expected: "n or f".to_string(),
                        found: other.to_string(),
                    })
                }
            };
            let number = check_object_number(start as u64 + i as u64)?;
            let id = ObjectId::new(number, field(generation, position)?);
            table.push(XRefEntry::new(id, location));
        }
    }

    let position = parser.position();
    let dict = match parser.parse_object()? {
        Object::Dictionary(dict) => dict,
        other => {
            return Err(ParseError::UnexpectedToken {
                position,
                expected: "trailer dictionary".to_string(),
                found: other.type_name().to_string(),
            })
        }
    };
    if dict.contains_key("Prev") {
        warn!("Ignoring /Prev in trailer, only the last cross-reference section is read");
    }

    debug!("Read cross-reference table with {} entries", table.len());
    Ok((table, Trailer::from_dictionary(dict)?))
}

fn parse_stream(parser: &mut Parser<'_>, offset: usize) -> ParseResult<(XRefTable, Trailer)> {
    let (id, object) = parser.parse_indirect_object(None)?;
    check_object_number(id.number() as u64)?;
    let Object::Stream(mut stream) = object else {
        return Err(ParseError::InvalidXRefStream(format!("{id} is not a stream")));
    };
    if stream.dictionary().get_type() != Some("XRef") {
        return Err(ParseError::InvalidXRefStream(format!("{id} is not /Type /XRef")));
    }
    if stream.dictionary().contains_key("Prev") {
        warn!("Ignoring /Prev in cross-reference stream {}", id);
    }

    let entries = xref_stream::decode_entries(stream.dictionary(), stream.data())?;
    let mut table = XRefTable::from_entries(entries, XRefMode::Stream(id));
    let trailer = Trailer::from_dictionary(stream.dictionary().clone())?;
    views::classify_stream(&mut stream)?;

    // the stream is already parsed; its own entry must not be loaded again
    match table.get_mut(id.number(), id.generation()) {
        Some(entry) => {
            entry.store(Object::Stream(stream));
        }
        None => table.push(XRefEntry::loaded(
            id,
            Location::Offset(offset as u64),
            Object::Stream(stream),
        )),
    }

    debug!(
        "Read cross-reference stream {} with {} entries",
        id,
        table.len()
    );
    Ok((table, trailer))
}

/// Converts a numeric field that must be non-negative and in range.
fn field<T: TryFrom<i64>>(value: i64, position: usize) -> ParseResult<T> {
    T::try_from(value).map_err(|_| ParseError::UnexpectedToken {
        position,
        expected: "cross-reference field in range".to_string(),
        found: value.to_string(),
    })
}
