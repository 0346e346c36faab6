use super::DictKind;
use crate::error::StructureError;
use crate::objects::{Dictionary, Object, ObjectId};

/// A font dictionary (`/Type /Font`).
#[derive(Debug, Clone, Copy)]
pub struct Font<'a> {
    dict: &'a Dictionary,
}

impl<'a> Font<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        Self { dict }
    }

    /// Builds a new font dictionary, already tagged as a font.
    pub fn new_dictionary(subtype: &str, base_font: &str) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Font"));
        dict.set("Subtype", Object::name(subtype));
        dict.set("BaseFont", Object::name(base_font));
        dict.set_kind(DictKind::Font);
        dict
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dict
    }

    pub fn base_font(&self) -> Result<&'a str, StructureError> {
        name_field(self.dict, "BaseFont")
    }

    pub fn subtype(&self) -> Result<&'a str, StructureError> {
        name_field(self.dict, "Subtype")
    }

    /// The ToUnicode CMap stream, if the font has one.
    pub fn to_unicode(&self) -> Result<Option<ObjectId>, StructureError> {
        match self.dict.get("ToUnicode") {
            None => Ok(None),
            Some(Object::Reference(id)) => Ok(Some(*id)),
            Some(_) => Err(StructureError::wrong_kind("ToUnicode", "an indirect reference")),
        }
    }
}

fn name_field<'a>(dict: &'a Dictionary, field: &str) -> Result<&'a str, StructureError> {
    match dict.get(field) {
        Some(Object::Name(name)) => Ok(name),
        Some(_) => Err(StructureError::wrong_kind(field, "a name")),
        None => Err(StructureError::missing(field)),
    }
}
