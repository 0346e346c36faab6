use crate::objects::{Dictionary, HexString, Stream};
use std::fmt;

/// Identity of an indirect object: object number plus generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    pub const fn number(&self) -> u32 {
        self.number
    }

    pub const fn generation(&self) -> u16 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// A PDF value.
///
/// Indirect references stay as [`ObjectId`]s and are looked up through the owning
/// [`Document`](crate::Document) on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// Decoded text of a literal string.
    String(String),
    HexString(HexString),
    /// Name without the leading solidus.
    Name(String),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Stream(Stream),
    Reference(ObjectId),
}

impl Object {
    pub fn name(name: impl Into<String>) -> Self {
        Object::Name(name.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(f) => Some(*f),
            Object::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_hex_string(&self) -> Option<&HexString> {
        match self {
            Object::HexString(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Object::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn as_stream_mut(&mut self) -> Option<&mut Stream> {
        match self {
            Object::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Short label of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Boolean(_) => "boolean",
            Object::Integer(_) => "integer",
            Object::Real(_) => "real",
            Object::String(_) => "string",
            Object::HexString(_) => "hex string",
            Object::Name(_) => "name",
            Object::Array(_) => "array",
            Object::Dictionary(_) => "dictionary",
            Object::Stream(_) => "stream",
            Object::Reference(_) => "reference",
        }
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Boolean(b)
    }
}

impl From<i32> for Object {
    fn from(i: i32) -> Self {
        Object::Integer(i as i64)
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Object::Integer(i)
    }
}

impl From<u32> for Object {
    fn from(i: u32) -> Self {
        Object::Integer(i as i64)
    }
}

impl From<f64> for Object {
    fn from(f: f64) -> Self {
        Object::Real(f)
    }
}

impl From<String> for Object {
    fn from(s: String) -> Self {
        Object::String(s)
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Object::String(s.to_string())
    }
}

impl From<HexString> for Object {
    fn from(h: HexString) -> Self {
        Object::HexString(h)
    }
}

impl From<Vec<Object>> for Object {
    fn from(v: Vec<Object>) -> Self {
        Object::Array(v)
    }
}

impl From<Dictionary> for Object {
    fn from(d: Dictionary) -> Self {
        Object::Dictionary(d)
    }
}

impl From<Stream> for Object {
    fn from(s: Stream) -> Self {
        Object::Stream(s)
    }
}

impl From<ObjectId> for Object {
    fn from(id: ObjectId) -> Self {
        Object::Reference(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_display() {
        let id = ObjectId::new(12, 3);
        assert_eq!(id.number(), 12);
        assert_eq!(id.generation(), 3);
        assert_eq!(id.to_string(), "12 3 R");
    }

    #[test]
    fn test_object_id_ordering() {
        let mut ids = vec![ObjectId::new(3, 0), ObjectId::new(1, 2), ObjectId::new(1, 0)];
        ids.sort();
        assert_eq!(
            ids,
            vec![ObjectId::new(1, 0), ObjectId::new(1, 2), ObjectId::new(3, 0)]
        );
    }

    #[test]
    fn test_accessors() {
        assert!(Object::Null.is_null());
        assert_eq!(Object::Boolean(true).as_bool(), Some(true));
        assert_eq!(Object::Integer(7).as_integer(), Some(7));
        assert_eq!(Object::Integer(7).as_real(), Some(7.0));
        assert_eq!(Object::Real(0.5).as_integer(), None);
        assert_eq!(Object::name("Page").as_name(), Some("Page"));
        assert_eq!(Object::from("text").as_string(), Some("text"));
        assert_eq!(
            Object::from(ObjectId::new(4, 0)).as_reference(),
            Some(ObjectId::new(4, 0))
        );
        assert!(Object::Name("x".into()).as_string().is_none());
    }

    #[test]
    fn test_mutable_accessors() {
        let mut obj = Object::Array(vec![Object::Integer(1)]);
        obj.as_array_mut().unwrap().push(Object::Integer(2));
        assert_eq!(obj.as_array().map(Vec::len), Some(2));

        let mut obj = Object::Dictionary(Dictionary::new());
        obj.as_dict_mut().unwrap().set("Key", Object::Null);
        assert!(obj.as_dict().unwrap().contains_key("Key"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Object::Null.type_name(), "null");
        assert_eq!(Object::HexString(HexString::new("AB")).type_name(), "hex string");
        assert_eq!(Object::Reference(ObjectId::new(1, 0)).type_name(), "reference");
    }
}
