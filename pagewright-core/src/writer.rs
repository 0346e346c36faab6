use crate::document::Document;
use crate::error::{Result, StructureError};
use crate::objects::{encode_text, escape_name, Dictionary, Object, ObjectId};
use crate::parser::ParseError;
use crate::xref::{
    check_object_number, stream as xref_stream, EntryKind, XRefEntry, XRefMode, XRefTable,
};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

pub struct PdfWriter<W: Write> {
    writer: W,
    current_position: u64,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self {
            writer,
            current_position: 0,
        }
    }

    /// Writes every live object followed by the cross-reference section in
    /// the document's own mode, recording each object's new offset.
    pub fn write_document(&mut self, document: &mut Document) -> Result<()> {
        document.load_all()?;
        let root = document
            .trailer()
            .root()
            .ok_or_else(|| StructureError::missing("Root"))?;

        // keeps `Size` and the record count within range
        check_object_number(document.xref().max_object_number() as u64)?;
        self.write_header(document.version())?;

        let mode = document.xref().mode();
        let xref_id = match mode {
            XRefMode::Stream(id) => Some(id),
            XRefMode::Table => None,
        };
        // a classic table cannot point into object streams, so members are
        // written as top-level objects
        let flatten = xref_id.is_none();
        let ids: Vec<ObjectId> = document
            .objects()
            .filter(|entry| match entry.kind() {
                EntryKind::Used => true,
                EntryKind::InContainer => flatten,
                EntryKind::Free => false,
            })
            .map(XRefEntry::id)
            .filter(|id| Some(*id) != xref_id)
            .collect();
        debug!("Writing {} objects ({:?})", ids.len(), mode);

        for id in ids {
            self.write_entry(document, id)?;
        }

        let xref_position = self.current_position;
        match xref_id {
            None => {
                let size = self.write_xref(document.xref())?;
                self.write_trailer(size, root, document.trailer().info())?;
            }
            Some(id) => self.write_xref_stream(document, id, root)?,
        }

        self.write_bytes(b"startxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_header(&mut self, version: &str) -> Result<()> {
        self.write_bytes(format!("%PDF-{version}\n").as_bytes())?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_entry(&mut self, document: &mut Document, id: ObjectId) -> Result<()> {
        let offset = self.current_position;
        let entry = document
            .xref_mut()
            .get_mut(id.number(), id.generation())
            .ok_or(ParseError::MissingObject(id))?;
        entry.set_offset(offset);
        let value = entry.value().ok_or(ParseError::MissingObject(id))?;
        self.write_object(id, value)
    }

    fn write_object(&mut self, id: ObjectId, object: &Object) -> Result<()> {
        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;

        self.write_object_value(object)?;

        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { "true" } else { "false" }.as_bytes())?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format_real(*f).as_bytes())?,
            Object::String(s) => {
                self.write_bytes(b"(")?;
                self.write_bytes(&escape_string(&encode_text(s)))?;
                self.write_bytes(b")")?;
            }
            Object::HexString(h) => self.write_bytes(h.to_string().as_bytes())?,
            Object::Name(n) => {
                self.write_bytes(b"/")?;
                self.write_bytes(escape_name(n).as_bytes())?;
            }
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => self.write_dictionary(dict)?,
            Object::Stream(stream) => {
                let mut data = stream.encoded_data()?;
                // readers reject a zero /Length
                if data.is_empty() {
                    data.push(b' ');
                }
                let mut dict = stream.dictionary().clone();
                dict.set("Length", data.len() as i64);
                self.write_dictionary(&dict)?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(&data)?;
                self.write_bytes(b"\nendstream")?;
            }
            Object::Reference(id) => {
                let ref_str = format!("{} {} R", id.number(), id.generation());
                self.write_bytes(ref_str.as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_dictionary(&mut self, dict: &Dictionary) -> Result<()> {
        self.write_bytes(b"<<")?;
        for (key, value) in dict.entries() {
            self.write_bytes(b"\n/")?;
            self.write_bytes(escape_name(key).as_bytes())?;
            self.write_bytes(b" ")?;
            self.write_object_value(value)?;
        }
        self.write_bytes(b"\n>>")?;
        Ok(())
    }

    /// Writes one `0 Size` subsection and returns `Size`.
    fn write_xref(&mut self, table: &XRefTable) -> Result<u32> {
        let max_obj_num = table.max_object_number();
        let positions: HashMap<u32, (u64, u16)> = table
            .live_entries()
            .filter_map(|entry| {
                entry
                    .offset()
                    .map(|offset| (entry.number(), (offset, entry.generation())))
            })
            .collect();

        self.write_bytes(b"xref\n")?;
        self.write_bytes(format!("0 {}\n", max_obj_num + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        // Gaps become free entries
        for obj_num in 1..=max_obj_num {
            match positions.get(&obj_num) {
                Some((offset, generation)) => {
                    let entry = format!("{offset:010} {generation:05} n \n");
                    self.write_bytes(entry.as_bytes())?;
                }
                None => self.write_bytes(b"0000000000 00000 f \n")?,
            }
        }

        Ok(max_obj_num + 1)
    }

    fn write_trailer(&mut self, size: u32, root: ObjectId, info: Option<ObjectId>) -> Result<()> {
        let mut trailer = Dictionary::new();
        trailer.set("Size", size);
        if let Some(info) = info {
            trailer.set("Info", info);
        }
        trailer.set("Root", root);

        self.write_bytes(b"trailer\n")?;
        self.write_dictionary(&trailer)?;
        self.write_bytes(b"\n")?;
        Ok(())
    }

    /// Re-encodes the table into its own stream object and writes it.
    fn write_xref_stream(&mut self, document: &mut Document, id: ObjectId, root: ObjectId) -> Result<()> {
        let info = document.trailer().info();
        let missing = || ParseError::InvalidXRefStream(format!("{id} is not in the table"));

        document
            .xref_mut()
            .get_mut(id.number(), id.generation())
            .ok_or_else(missing)?
            .set_offset(self.current_position);
        let records = xref_stream::table_records(document.xref());
        let size = records.len() as i64;

        let entry = document
            .xref_mut()
            .get_mut(id.number(), id.generation())
            .ok_or_else(missing)?;
        let stream = entry
            .value_mut()
            .and_then(Object::as_stream_mut)
            .ok_or_else(|| ParseError::InvalidXRefStream(format!("{id} is not a stream")))?;

        let dict = stream.dictionary_mut();
        let declared = xref_stream::read_widths(dict).unwrap_or([0; 3]);
        let widths = xref_stream::required_widths(&records, declared);
        if widths != declared || !dict.contains_key("W") {
            let w: Vec<Object> = widths.iter().map(|&w| Object::Integer(w as i64)).collect();
            dict.set("W", w);
        }
        dict.set("Size", size);

        let full_run = vec![Object::Integer(0), Object::Integer(size)];
        if dict
            .get("Index")
            .is_some_and(|index| index.as_array() != Some(&full_run))
        {
            dict.set("Index", full_run);
        }
        if dict.remove("Prev").is_some() {
            warn!("Dropped /Prev from cross-reference stream {}", id);
        }
        dict.set("Root", root);
        if let Some(info) = info {
            dict.set("Info", info);
        }
        stream.set_data(xref_stream::encode_records(&records, widths));

        let value = entry.value().ok_or_else(missing)?;
        self.write_object(id, value)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

impl PdfWriter<BufWriter<std::fs::File>> {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);

        Ok(Self::new_with_writer(writer))
    }
}

/// Shortest decimal form, always with a fractional part so it reads back as a real.
fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

fn escape_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    for &byte in bytes {
        match byte {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(byte);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(byte),
        }
    }
    out
}
