//! PDF documents
//!
//! A [`Document`] owns the file bytes, the cross-reference table with every
//! parsed object, and the trailer. References between objects stay
//! `(number, generation)` pairs and are looked up on demand.

use crate::error::{PdfError, Result, StructureError};
use crate::objects::{Dictionary, Object, ObjectId};
use crate::parser::{self, ParseError, ParseOptions, ParseResult};
use crate::views::{self, Catalog, DocumentInfo, ImageData, Page, Trailer, UnicodeCMap, XObject};
use crate::writer::PdfWriter;
use crate::xref::{XRefEntry, XRefMode, XRefTable, MAX_OBJECT_NUMBER};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

/// What a missing object resolves to.
static NULL: Object = Object::Null;

pub struct Document {
    source: Vec<u8>,
    version: String,
    xref: XRefTable,
    trailer: Trailer,
    options: ParseOptions,
    /// Objects whose definitions are being parsed right now.
    loading: RefCell<HashSet<ObjectId>>,
}

impl Document {
    /// An empty document written with a classic cross-reference table.
    pub fn new() -> Self {
        Self::from_parts(
            Vec::new(),
            "1.7".to_string(),
            XRefTable::new(XRefMode::Table),
            Trailer::new(),
            ParseOptions::default(),
        )
    }

    pub(crate) fn from_parts(
        source: Vec<u8>,
        version: String,
        xref: XRefTable,
        trailer: Trailer,
        options: ParseOptions,
    ) -> Self {
        Self {
            source,
            version,
            xref,
            trailer,
            options,
            loading: RefCell::new(HashSet::new()),
        }
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    pub fn from_bytes_with_options(data: impl Into<Vec<u8>>, options: ParseOptions) -> Result<Self> {
        Ok(parser::document::parse_document(data.into(), options)?)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.save_to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serializes the whole document, updating every entry's offset.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PdfWriter::new_with_writer(&mut buffer).write_document(self)?;
        debug!("Wrote {} bytes", buffer.len());
        Ok(buffer)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn trailer(&self) -> &Trailer {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut Trailer {
        &mut self.trailer
    }

    pub fn xref(&self) -> &XRefTable {
        &self.xref
    }

    pub(crate) fn xref_mut(&mut self) -> &mut XRefTable {
        &mut self.xref
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub(crate) fn source(&self) -> &[u8] {
        &self.source
    }

    /// Live cross-reference entries in table order.
    pub fn objects(&self) -> impl Iterator<Item = &XRefEntry> {
        self.xref.live_entries()
    }

    /// Number of live entries whose value has been parsed.
    pub fn loaded_count(&self) -> usize {
        self.xref.live_entries().filter(|e| e.is_loaded()).count()
    }

    /// Parses every live entry that is not loaded yet.
    pub fn load_all(&self) -> ParseResult<()> {
        let ids: Vec<ObjectId> = self.xref.live_entries().map(XRefEntry::id).collect();
        for id in ids {
            self.get_object(id)?;
        }
        Ok(())
    }

    /// The value of indirect object `id`, parsed on first access and cached.
    pub fn get_object(&self, id: ObjectId) -> ParseResult<&Object> {
        let entry = self
            .xref
            .get(id.number(), id.generation())
            .ok_or(ParseError::MissingObject(id))?;
        if let Some(value) = entry.value() {
            return Ok(value);
        }

        if !self.loading.borrow_mut().insert(id) {
            return Err(ParseError::CircularReference(id));
        }
        let result = parser::document::load_entry(self, entry);
        self.loading.borrow_mut().remove(&id);

        let value = result?;
        trace!("Parsed object {} ({})", id, value.type_name());
        Ok(entry.store(value))
    }

    /// Mutable access to indirect object `id`, loading it first if needed.
    pub fn object_mut(&mut self, id: ObjectId) -> ParseResult<&mut Object> {
        self.get_object(id)?;
        self.xref
            .get_mut(id.number(), id.generation())
            .and_then(XRefEntry::value_mut)
            .ok_or(ParseError::MissingObject(id))
    }

    /// Follows references until a direct value is reached.
    ///
    /// A reference to an object that does not exist resolves to null. A
    /// chain that revisits an object or grows past the configured depth is a
    /// [`ParseError::CircularReference`].
    pub fn resolve<'a>(&'a self, object: &'a Object) -> ParseResult<&'a Object> {
        let mut current = object;
        let mut visited = HashSet::new();
        while let Object::Reference(id) = current {
            if !visited.insert(*id) || visited.len() > self.options.max_reference_depth {
                return Err(ParseError::CircularReference(*id));
            }
            current = self.lookup(*id)?;
        }
        Ok(current)
    }

    pub fn resolve_reference(&self, id: ObjectId) -> ParseResult<&Object> {
        let target = self.lookup(id)?;
        match target {
            Object::Reference(next) if *next == id => Err(ParseError::CircularReference(id)),
            _ => self.resolve(target),
        }
    }

    fn lookup(&self, id: ObjectId) -> ParseResult<&Object> {
        match self.get_object(id) {
            Err(ParseError::MissingObject(missing)) if missing == id => Ok(&NULL),
            other => other,
        }
    }

    /// Stores a new object under the next free number.
    pub fn add_object(&mut self, object: impl Into<Object>) -> ParseResult<ObjectId> {
        let mut object = object.into();
        let id = ObjectId::new(self.xref.next_object_number()?, 0);
        views::classify(&mut object, id, self.trailer.info())?;
        let added = self.xref.add_entry(object)?;
        debug_assert_eq!(added, id);
        trace!("Added object {}", added);
        Ok(added)
    }

    pub fn catalog(&self) -> Result<Catalog<'_>> {
        let root = self
            .trailer
            .root()
            .ok_or_else(|| StructureError::missing("Root"))?;
        self.resolve_reference(root)?
            .as_catalog()
            .ok_or_else(|| StructureError::wrong_kind("Root", "a catalog").into())
    }

    /// The information dictionary, if the trailer names one.
    pub fn info(&self) -> Result<Option<DocumentInfo<'_>>> {
        let Some(id) = self.trailer.info() else {
            return Ok(None);
        };
        Ok(self.resolve_reference(id)?.as_info())
    }

    /// Names `id` as the information dictionary and tags it accordingly.
    pub fn set_info(&mut self, id: ObjectId) -> ParseResult<()> {
        self.trailer.set_info(id);
        views::classify(self.object_mut(id)?, id, Some(id))
    }

    /// Page ids in reading order, walking the page tree from the catalog.
    pub fn page_ids(&self) -> Result<Vec<ObjectId>> {
        let root = self.catalog()?.pages()?;
        let mut pages = Vec::new();
        // tree nodes from the root down to the node being visited
        let mut ancestors: Vec<ObjectId> = Vec::new();
        let mut pending = vec![(root, 0)];
        let mut visits = 0u32;

        while let Some((id, depth)) = pending.pop() {
            ancestors.truncate(depth);
            if ancestors.contains(&id) {
                return Err(ParseError::CircularReference(id).into());
            }
            visits += 1;
            if visits > MAX_OBJECT_NUMBER {
                return Err(StructureError::wrong_kind("Kids", "a page tree of bounded size").into());
            }

            let node = self.resolve_reference(id)?;
            if node.as_page().is_some() {
                pages.push(id);
            } else if let Some(tree) = node.as_page_tree_node() {
                ancestors.push(id);
                pending.extend(tree.kids()?.into_iter().rev().map(|kid| (kid, depth + 1)));
            } else {
                return Err(StructureError::wrong_kind("Kids", "pages or page tree nodes").into());
            }
        }
        Ok(pages)
    }

    /// Ids of all page objects, ordered by object number position in the
    /// cross-reference table rather than by the page tree.
    pub fn pages_in_object_order(&self) -> Result<Vec<ObjectId>> {
        let mut pages = Vec::new();
        for entry in self.xref.live_entries() {
            if self.get_object(entry.id())?.as_page().is_some() {
                pages.push(entry.id());
            }
        }
        Ok(pages)
    }

    pub fn page(&self, id: ObjectId) -> Result<Page<'_>> {
        self.resolve_reference(id)?
            .as_page()
            .ok_or_else(|| StructureError::wrong_kind("Type", "/Page").into())
    }

    /// Decoded content of a page. Several content streams are joined with a
    /// newline.
    pub fn page_content(&self, page: ObjectId) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for (i, id) in self.page(page)?.content_streams()?.into_iter().enumerate() {
            let stream = self
                .resolve_reference(id)?
                .as_stream()
                .ok_or_else(|| StructureError::wrong_kind("Contents", "a stream"))?;
            if i > 0 {
                content.push(b'\n');
            }
            content.extend_from_slice(stream.data());
        }
        Ok(content)
    }

    /// Replaces the data of the page's single content stream.
    pub fn set_page_content(&mut self, page: ObjectId, content: impl Into<Vec<u8>>) -> Result<()> {
        let id = self.page(page)?.contents()?;
        self.object_mut(id)?
            .as_stream_mut()
            .ok_or_else(|| StructureError::wrong_kind("Contents", "a stream"))?
            .set_data(content);
        Ok(())
    }

    /// Registers an XObject in the page resources and returns its key.
    pub fn add_xobject_to_page(&mut self, page: ObjectId, xobject: ObjectId) -> Result<String> {
        self.register_resource(page, "XObject", "Xo", xobject)
    }

    /// Registers a font in the page resources and returns its key.
    pub fn add_font_to_page(&mut self, page: ObjectId, font: ObjectId) -> Result<String> {
        self.register_resource(page, "Font", "F", font)
    }

    fn register_resource(
        &mut self,
        page: ObjectId,
        category: &str,
        prefix: &str,
        target: ObjectId,
    ) -> Result<String> {
        let indirect = self.resources_mut(page)?.get(category).and_then(Object::as_reference);
        let entries = match indirect {
            Some(id) => dictionary_of(self.object_mut(id)?, category)?,
            None => child_dictionary(self.resources_mut(page)?, category)?,
        };
        let key = format!("{prefix}{}", target.number());
        entries.set(key.clone(), target);
        Ok(key)
    }

    /// The page's resource dictionary where it is actually stored, created
    /// when missing.
    fn resources_mut(&mut self, page: ObjectId) -> Result<&mut Dictionary> {
        let indirect = self.page(page)?.resources().and_then(Object::as_reference);
        match indirect {
            Some(id) => dictionary_of(self.object_mut(id)?, "Resources"),
            None => {
                let page = dictionary_of(self.object_mut(page)?, "Type")?;
                child_dictionary(page, "Resources")
            }
        }
    }

    /// Parses the ToUnicode CMap of a font, if it has one.
    pub fn font_cmap(&self, font: ObjectId) -> Result<Option<UnicodeCMap>> {
        let font = self
            .resolve_reference(font)?
            .as_font()
            .ok_or_else(|| StructureError::wrong_kind("Type", "/Font"))?;
        let Some(id) = font.to_unicode()? else {
            return Ok(None);
        };
        let stream = self
            .resolve_reference(id)?
            .as_stream()
            .ok_or_else(|| StructureError::wrong_kind("ToUnicode", "a stream"))?;
        Ok(Some(UnicodeCMap::parse(stream.data())?))
    }

    /// Stores pixels as an image XObject. Translucent RGBA input also gets a
    /// grayscale soft mask object.
    pub fn add_image(&mut self, image: ImageData) -> Result<ObjectId> {
        let (width, height) = (image.width(), image.height());
        let color_space = image.format().color_space();
        let (samples, alpha) = image.split_alpha();

        let mut stream = XObject::image_stream(width, height, color_space, samples);
        if let Some(alpha) = alpha {
            let mask = self.add_object(XObject::image_stream(width, height, "DeviceGray", alpha))?;
            stream.dictionary_mut().set("SMask", mask);
        }
        Ok(self.add_object(stream)?)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.version)
            .field("mode", &self.xref.mode())
            .field("objects", &self.xref.len())
            .field("source_len", &self.source.len())
            .finish_non_exhaustive()
    }
}

fn dictionary_of<'a>(object: &'a mut Object, field: &str) -> Result<&'a mut Dictionary> {
    object
        .as_dict_mut()
        .ok_or_else(|| StructureError::wrong_kind(field, "a dictionary").into())
}

/// The dictionary stored under `key`, inserted empty when absent.
fn child_dictionary<'a>(parent: &'a mut Dictionary, key: &str) -> Result<&'a mut Dictionary> {
    if !parent.contains_key(key) {
        parent.set(key, Dictionary::new());
    }
    parent
        .get_mut(key)
        .and_then(Object::as_dict_mut)
        .ok_or_else(|| PdfError::from(StructureError::wrong_kind(key, "a dictionary")))
}
