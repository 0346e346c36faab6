//! # pagewright
//!
//! Read, inspect, edit and rewrite PDF documents.
//!
//! ## Features
//!
//! - **Parsing**: byte-level lexer and object parser over the whole file, with
//!   classic cross-reference tables and cross-reference streams
//! - **Object streams**: members of `/Type /ObjStm` containers load like any other object
//! - **Lazy loading**: objects can be parsed on first access instead of up front
//! - **Typed views**: catalog, page tree, pages, fonts, XObjects and document info
//! - **Filters**: `FlateDecode` (with the PNG Up predictor) and `RunLengthDecode`
//! - **Writing**: documents are written back in the cross-reference mode they were read in
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagewright::{Document, Result};
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::open("input.pdf")?;
//!
//! for page_id in doc.page_ids()? {
//!     let content = doc.page_content(page_id)?;
//!     println!("{page_id}: {} bytes of content", content.len());
//! }
//!
//! doc.save("output.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Building a document
//!
//! ```rust
//! use pagewright::{Dictionary, Document, Object, Result};
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::new();
//! let mut catalog = Dictionary::new();
//! catalog.set("Type", Object::name("Catalog"));
//! let root = doc.add_object(catalog)?;
//! doc.trailer_mut().set_root(root);
//!
//! let bytes = doc.save_to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod filters;
pub mod objects;
pub mod parser;
pub mod views;
pub mod writer;
pub mod xref;

pub use document::Document;
pub use error::{PdfError, Result, StructureError};
pub use filters::{Filter, FilterError};
pub use objects::{Dictionary, HexString, Object, ObjectId, Stream};
pub use parser::{LoadMode, ParseError, ParseOptions};
pub use views::{
    Catalog, DictKind, DocumentInfo, Font, ImageData, Page, PixelFormat, Rectangle, StreamKind,
    Trailer, UnicodeCMap, XObject,
};
pub use writer::PdfWriter;
pub use xref::{EntryKind, XRefEntry, XRefMode, XRefTable};

/// Current version of pagewright
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
