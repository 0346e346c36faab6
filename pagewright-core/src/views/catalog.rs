use crate::error::StructureError;
use crate::objects::{Dictionary, Object, ObjectId};

/// The document catalog (`/Type /Catalog`).
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    dict: &'a Dictionary,
}

impl<'a> Catalog<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        Self { dict }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dict
    }

    /// Root of the page tree.
    pub fn pages(&self) -> Result<ObjectId, StructureError> {
        match self.dict.get("Pages") {
            Some(Object::Reference(id)) => Ok(*id),
            Some(_) => Err(StructureError::wrong_kind("Pages", "an indirect reference")),
            None => Err(StructureError::missing("Pages")),
        }
    }
}

/// The information dictionary named by the trailer's `/Info`.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInfo<'a> {
    dict: &'a Dictionary,
}

impl<'a> DocumentInfo<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        Self { dict }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dict
    }

    /// Text value of an entry; hex strings are not text and yield `None`.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.dict.get(key).and_then(Object::as_string)
    }

    pub fn title(&self) -> Option<&'a str> {
        self.get("Title")
    }

    pub fn author(&self) -> Option<&'a str> {
        self.get("Author")
    }

    pub fn producer(&self) -> Option<&'a str> {
        self.get("Producer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_pages() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Catalog"));
        assert_eq!(
            Catalog::new(&dict).pages(),
            Err(StructureError::missing("Pages"))
        );

        dict.set("Pages", ObjectId::new(2, 0));
        assert_eq!(Catalog::new(&dict).pages(), Ok(ObjectId::new(2, 0)));

        dict.set("Pages", Dictionary::new());
        assert!(matches!(
            Catalog::new(&dict).pages(),
            Err(StructureError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_info_fields() {
        let mut dict = Dictionary::new();
        dict.set("Title", "Quarterly report");
        dict.set("Producer", "pagewright");
        let info = DocumentInfo::new(&dict);
        assert_eq!(info.title(), Some("Quarterly report"));
        assert_eq!(info.producer(), Some("pagewright"));
        assert_eq!(info.author(), None);
    }
}
