use crate::objects::{Object, Stream};
use crate::parser::{object_stream, ParseResult};

/// An object stream (`/Type /ObjStm`) holding packed object bodies.
#[derive(Debug, Clone, Copy)]
pub struct ObjectStream<'a> {
    stream: &'a Stream,
}

impl<'a> ObjectStream<'a> {
    pub fn new(stream: &'a Stream) -> Self {
        Self { stream }
    }

    pub fn stream(&self) -> &'a Stream {
        self.stream
    }

    /// Declared number of members (`/N`).
    pub fn len(&self) -> usize {
        self.stream
            .dictionary()
            .get_integer("N")
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Object numbers of the members, in slot order.
    pub fn object_numbers(&self) -> ParseResult<Vec<u32>> {
        Ok(object_stream::read_header(self.stream)?
            .into_iter()
            .map(|slot| slot.number)
            .collect())
    }

    /// Parses slot `index`, which must hold object `number`. The value is
    /// returned untagged.
    pub fn object_at(&self, index: u32, number: u32) -> ParseResult<Object> {
        object_stream::extract(self.stream, index, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Dictionary;
    use crate::views::StreamKind;

    #[test]
    fn test_object_stream_view() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("ObjStm"));
        dict.set("N", 2);
        dict.set("First", 8);
        let mut stream = Stream::new(dict, b"4 0 5 2 7 (x)".to_vec());
        stream.set_kind(StreamKind::ObjectStream);

        let object = Object::Stream(stream);
        let view = object.as_object_stream().unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.object_numbers().unwrap(), vec![4, 5]);
        assert_eq!(view.object_at(0, 4).unwrap(), Object::Integer(7));
        assert_eq!(view.object_at(1, 5).unwrap(), Object::String("x".to_string()));
        assert!(view.object_at(1, 6).is_err());
    }
}
