use crate::document::Document;
use crate::error::{Result, StructureError};
use crate::objects::{Dictionary, Object, ObjectId};
use std::collections::HashSet;

/// Rectangle as origin plus size, built from a `[llx lly urx ury]` array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_array(items: &[Object]) -> Option<Self> {
        let [llx, lly, urx, ury] = items else {
            return None;
        };
        let (llx, lly) = (llx.as_real()?, lly.as_real()?);
        let (urx, ury) = (urx.as_real()?, ury.as_real()?);
        Some(Self::new(llx, lly, urx - llx, ury - lly))
    }

    pub fn to_array(&self) -> Vec<Object> {
        [self.x, self.y, self.x + self.width, self.y + self.height]
            .into_iter()
            .map(number)
            .collect()
    }
}

/// Whole numbers are written as integers.
fn number(value: f64) -> Object {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Object::Integer(value as i64)
    } else {
        Object::Real(value)
    }
}

/// A leaf of the page tree (`/Type /Page`).
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    dict: &'a Dictionary,
}

impl<'a> Page<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        Self { dict }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dict
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.dict.get_reference("Parent")
    }

    /// The single content stream reference in `/Contents`.
    pub fn contents(&self) -> std::result::Result<ObjectId, StructureError> {
        match self.dict.get("Contents") {
            Some(Object::Reference(id)) => Ok(*id),
            Some(_) => Err(StructureError::wrong_kind("Contents", "an indirect reference")),
            None => Err(StructureError::missing("Contents")),
        }
    }

    /// Every content stream reference, whether `/Contents` is one reference or
    /// an array of them.
    pub fn content_streams(&self) -> std::result::Result<Vec<ObjectId>, StructureError> {
        match self.dict.get("Contents") {
            Some(Object::Reference(id)) => Ok(vec![*id]),
            Some(Object::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_reference().ok_or_else(|| {
                        StructureError::wrong_kind("Contents", "an array of indirect references")
                    })
                })
                .collect(),
            Some(_) => Err(StructureError::wrong_kind("Contents", "an indirect reference")),
            None => Err(StructureError::missing("Contents")),
        }
    }

    pub fn resources(&self) -> Option<&'a Object> {
        self.dict.get("Resources")
    }

    /// The page's `/MediaBox`, inherited from ancestor page-tree nodes when
    /// the page does not set one.
    pub fn media_box(&self, doc: &Document) -> Result<Rectangle> {
        let mut current = self.dict;
        let mut visited = HashSet::new();
        loop {
            if let Some(value) = current.get("MediaBox") {
                let value = doc.resolve(value)?;
                return value
                    .as_array()
                    .and_then(|items| Rectangle::from_array(items))
                    .ok_or_else(|| {
                        StructureError::wrong_kind("MediaBox", "an array of 4 numbers").into()
                    });
            }

            let parent = match current.get_reference("Parent") {
                Some(parent) if visited.insert(parent) => parent,
                _ => return Err(StructureError::missing("MediaBox").into()),
            };
            current = doc
                .resolve_reference(parent)?
                .as_dict()
                .ok_or_else(|| StructureError::wrong_kind("Parent", "a dictionary"))?;
        }
    }
}

/// An intermediate page-tree node (`/Type /Pages`).
#[derive(Debug, Clone, Copy)]
pub struct PageTreeNode<'a> {
    dict: &'a Dictionary,
}

impl<'a> PageTreeNode<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        Self { dict }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dict
    }

    pub fn kids(&self) -> std::result::Result<Vec<ObjectId>, StructureError> {
        let kids = self
            .dict
            .get_array("Kids")
            .ok_or_else(|| StructureError::missing("Kids"))?;
        kids.iter()
            .map(|kid| {
                kid.as_reference()
                    .ok_or_else(|| StructureError::wrong_kind("Kids", "an array of references"))
            })
            .collect()
    }

    pub fn count(&self) -> Option<i64> {
        self.dict.get_integer("Count")
    }
}
