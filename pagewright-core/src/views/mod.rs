//! Typed views over dictionaries and streams
//!
//! A value's view is decided once, when its indirect object is loaded, from
//! its `/Type` name. Views borrow the same storage the parser produced; they
//! add interpretation, not data.

mod catalog;
mod cmap;
mod font;
mod object_stream;
mod page;
mod trailer;
mod xobject;

pub use catalog::{Catalog, DocumentInfo};
pub use cmap::UnicodeCMap;
pub use font::Font;
pub use object_stream::ObjectStream;
pub use page::{Page, PageTreeNode, Rectangle};
pub use trailer::Trailer;
pub use xobject::{ImageData, PixelFormat, XObject};

use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::parser::{ParseError, ParseResult};

/// View tag of a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DictKind {
    #[default]
    Plain,
    Catalog,
    Pages,
    Page,
    Font,
    /// The document information dictionary named by the trailer's `/Info`.
    Info,
}

/// View tag of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamKind {
    #[default]
    Plain,
    XRef,
    ObjectStream,
    XObject,
    Metadata,
}

/// Tags an indirect object's value with the view matching its `/Type`.
///
/// Unknown dictionary types stay plain; unknown stream types are an error.
pub(crate) fn classify(object: &mut Object, id: ObjectId, info: Option<ObjectId>) -> ParseResult<()> {
    match object {
        Object::Dictionary(dict) => {
            let kind = match dict.get_type() {
                Some("Catalog") => DictKind::Catalog,
                Some("Pages") => DictKind::Pages,
                Some("Page") => DictKind::Page,
                Some("Font") => DictKind::Font,
                _ if info == Some(id) => DictKind::Info,
                _ => DictKind::Plain,
            };
            dict.set_kind(kind);
        }
        Object::Stream(stream) => classify_stream(stream)?,
        _ => {}
    }
    Ok(())
}

pub(crate) fn classify_stream(stream: &mut Stream) -> ParseResult<()> {
    let kind = match stream.dictionary().get_type() {
        None => StreamKind::Plain,
        Some("XRef") => StreamKind::XRef,
        Some("ObjStm") => StreamKind::ObjectStream,
        Some("XObject") => StreamKind::XObject,
        Some("Metadata") => StreamKind::Metadata,
        Some(other) => return Err(ParseError::UnknownStreamType(other.to_string())),
    };
    stream.set_kind(kind);
    Ok(())
}

fn dict_of_kind(object: &Object, kind: DictKind) -> Option<&Dictionary> {
    object.as_dict().filter(|dict| dict.kind() == kind)
}

fn stream_of_kind(object: &Object, kind: StreamKind) -> Option<&Stream> {
    object.as_stream().filter(|stream| stream.kind() == kind)
}

impl Object {
    pub fn as_catalog(&self) -> Option<Catalog<'_>> {
        dict_of_kind(self, DictKind::Catalog).map(Catalog::new)
    }

    pub fn as_page_tree_node(&self) -> Option<PageTreeNode<'_>> {
        dict_of_kind(self, DictKind::Pages).map(PageTreeNode::new)
    }

    pub fn as_page(&self) -> Option<Page<'_>> {
        dict_of_kind(self, DictKind::Page).map(Page::new)
    }

    pub fn as_font(&self) -> Option<Font<'_>> {
        dict_of_kind(self, DictKind::Font).map(Font::new)
    }

    pub fn as_info(&self) -> Option<DocumentInfo<'_>> {
        dict_of_kind(self, DictKind::Info).map(DocumentInfo::new)
    }

    pub fn as_xobject(&self) -> Option<XObject<'_>> {
        stream_of_kind(self, StreamKind::XObject).map(XObject::new)
    }

    pub fn as_object_stream(&self) -> Option<ObjectStream<'_>> {
        stream_of_kind(self, StreamKind::ObjectStream).map(ObjectStream::new)
    }
}
