//! Document loading
//!
//! Opening a file reads the header and the cross-reference section. Indirect
//! objects are then parsed either all at once or on first use, depending on
//! [`LoadMode`].

use super::{header, object_stream, xref, LoadMode, ParseError, ParseOptions, ParseResult, Parser};
use crate::document::Document;
use crate::objects::{Object, ObjectId};
use crate::views;
use crate::xref::{EntryKind, Location, XRefEntry};
use tracing::{debug, trace};

pub(crate) fn parse_document(data: Vec<u8>, options: ParseOptions) -> ParseResult<Document> {
    let (version, table, trailer) = {
        let mut parser = Parser::new(&data);
        let version = header::parse_header(&mut parser)?;
        let (table, trailer) = xref::parse_xref_section(&mut parser)?;
        (version, table, trailer)
    };
    debug!(
        "Opened PDF {} with {} cross-reference entries ({:?})",
        version,
        table.len(),
        table.mode()
    );

    let eager = options.load == LoadMode::Eager;
    let document = Document::from_parts(data, version, table, trailer, options);
    if eager {
        document.load_all()?;
        debug!("Loaded {} objects", document.loaded_count());
    }
    Ok(document)
}

/// Parses the definition behind `entry` and tags it with its view.
pub(crate) fn load_entry(document: &Document, entry: &XRefEntry) -> ParseResult<Object> {
    let id = entry.id();
    let mut object = match entry.location() {
        Location::Offset(offset) => {
            trace!("Loading object {} at offset {}", id, offset);
            let offset = usize::try_from(offset).map_err(|_| ParseError::MissingObject(id))?;
            let mut parser = Parser::with_document(document.source(), document);
            parser.seek(offset)?;
            let (_, object) = parser.parse_indirect_object(Some(id))?;
            object
        }
        Location::Container { object, index } => load_from_container(document, id, object, index)?,
        Location::NextFree(_) => return Err(ParseError::MissingObject(id)),
    };
    views::classify(&mut object, id, document.trailer().info())?;
    Ok(object)
}

fn load_from_container(
    document: &Document,
    id: ObjectId,
    container: u32,
    index: u32,
) -> ParseResult<Object> {
    let container_id = ObjectId::new(container, 0);
    let top_level = document
        .xref()
        .get(container, 0)
        .is_some_and(|entry| entry.kind() == EntryKind::Used);
    if !top_level {
        return Err(ParseError::InvalidXRefStream(format!(
            "{id} is stored in {container_id}, which is not a top-level object"
        )));
    }

    let stream = document
        .get_object(container_id)?
        .as_object_stream()
        .ok_or_else(|| {
            ParseError::InvalidXRefStream(format!("{container_id} is not an object stream"))
        })?;
    object_stream::extract(stream.stream(), index, id.number())
}
