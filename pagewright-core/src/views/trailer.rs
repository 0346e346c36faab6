use crate::objects::{Dictionary, Object, ObjectId};
use crate::parser::{ParseError, ParseResult};

/// The trailer dictionary: document root, information dictionary and table size.
///
/// For a cross-reference stream this is the stream's own dictionary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trailer {
    dict: Dictionary,
}

impl Trailer {
    /// Trailer of a new, empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a parsed trailer, which must name its `/Root`.
    pub fn from_dictionary(dict: Dictionary) -> ParseResult<Self> {
        if dict.get_reference("Root").is_none() {
            return Err(ParseError::MissingKey("Root".to_string()));
        }
        Ok(Self { dict })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn root(&self) -> Option<ObjectId> {
        self.dict.get_reference("Root")
    }

    pub fn info(&self) -> Option<ObjectId> {
        self.dict.get_reference("Info")
    }

    pub fn size(&self) -> Option<i64> {
        self.dict.get_integer("Size")
    }

    pub fn set_root(&mut self, id: ObjectId) {
        self.dict.set("Root", Object::Reference(id));
    }

    pub fn set_info(&mut self, id: ObjectId) {
        self.dict.set("Info", Object::Reference(id));
    }
}
