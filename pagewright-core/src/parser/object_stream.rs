//! Object stream slot extraction
//!
//! An object stream packs several object bodies behind a header of `/N`
//! `(object number, relative offset)` pairs. Offsets are relative to `/First`.

use super::{ParseError, ParseResult, Parser};
use crate::objects::{Object, ObjectId, Stream};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub number: u32,
    /// Absolute offset of the body in the decoded data.
    pub start: usize,
    /// Where the header pair was read, for error reporting.
    header_position: usize,
}

/// Reads the `/N` header pairs of an object stream.
pub(crate) fn read_header(stream: &Stream) -> ParseResult<Vec<Slot>> {
    let dict = stream.dictionary();
    let count = dict
        .get_integer("N")
        .ok_or_else(|| ParseError::MissingKey("N".to_string()))?;
    let first = dict
        .get_integer("First")
        .ok_or_else(|| ParseError::MissingKey("First".to_string()))?;

    let mut parser = Parser::new(stream.data());
    let mut slots = Vec::new();
    for _ in 0..count.max(0) {
        let (number, header_position) = parser.expect_integer("object number")?;
        let (offset, _) = parser.expect_integer("object offset")?;
        let invalid = || ParseError::InvalidReference {
            position: header_position,
        };
        let number = u32::try_from(number).map_err(|_| invalid())?;
        let start = first
            .checked_add(offset)
            .and_then(|start| usize::try_from(start).ok())
            .ok_or_else(invalid)?;
        slots.push(Slot {
            number,
            start,
            header_position,
        });
    }
    Ok(slots)
}

/// Parses the body in slot `index`, which must hold object `number`.
pub(crate) fn extract(stream: &Stream, index: u32, number: u32) -> ParseResult<Object> {
    let expected = ObjectId::new(number, 0);
    let slots = read_header(stream)?;
    let slot = slots
        .get(index as usize)
        .ok_or(ParseError::MissingObject(expected))?;
    if slot.number != number {
        return Err(ParseError::ObjectMismatch {
            position: slot.header_position,
            expected,
            found: ObjectId::new(slot.number, 0),
        });
    }

    trace!("Loading object {} from object stream slot {}", number, index);
    let mut parser = Parser::new(stream.data());
    parser.seek(slot.start)?;
    parser.parse_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Dictionary;

    fn object_stream() -> Stream {
        let body = b"10 0 11 18 << /Type /Font >> [1 2 R]";
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("ObjStm"));
        dict.set("N", 2);
        dict.set("First", 11);
        Stream::new(dict, body.to_vec())
    }

    #[test]
    fn test_read_header() {
        let slots = read_header(&object_stream()).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!((slots[0].number, slots[0].start), (10, 11));
        assert_eq!((slots[1].number, slots[1].start), (11, 29));
    }

    #[test]
    fn test_extract_slots() {
        let stream = object_stream();
        let font = extract(&stream, 0, 10).unwrap();
        assert_eq!(font.as_dict().unwrap().get_type(), Some("Font"));

        let array = extract(&stream, 1, 11).unwrap();
        assert_eq!(
            array,
            Object::Array(vec![Object::Reference(ObjectId::new(1, 2))])
        );
    }

    #[test]
    fn test_extract_number_mismatch() {
        let err = extract(&object_stream(), 1, 12).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ObjectMismatch { expected, found, .. }
                if expected == ObjectId::new(12, 0) && found == ObjectId::new(11, 0)
        ));
    }

    #[test]
    fn test_extract_missing_slot() {
        assert!(matches!(
            extract(&object_stream(), 5, 10),
            Err(ParseError::MissingObject(_))
        ));
    }

    #[test]
    fn test_missing_first() {
        let mut stream = object_stream();
        stream.dictionary_mut().remove("First");
        assert!(matches!(
            read_header(&stream),
            Err(ParseError::MissingKey(key)) if key == "First"
        ));
    }
}
