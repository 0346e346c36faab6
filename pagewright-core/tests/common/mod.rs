//! Hand-assembled PDF files with correct byte offsets.

#![allow(dead_code)]

use pagewright::filters::{FlateDecode, StreamFilter};
use std::collections::BTreeMap;

pub const CONTENT: &[u8] = b"BT /F5 12 Tf 72 720 Td <0102> Tj ET";

pub const TO_UNICODE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange <00> <FF> endcodespacerange
2 beginbfchar
<01> <0048>
<02> <0069>
endbfchar
1 beginbfrange
<10> <12> <0061>
endbfrange
endcmap
end end";

/// Appends numbered objects and tracks where each one starts.
pub struct PdfBuilder {
    data: Vec<u8>,
    offsets: BTreeMap<u32, usize>,
}

impl PdfBuilder {
    pub fn new(version: &str) -> Self {
        Self {
            data: format!("%PDF-{version}\n").into_bytes(),
            offsets: BTreeMap::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.data.len()
    }

    pub fn object(&mut self, number: u32, body: &str) -> &mut Self {
        self.offsets.insert(number, self.data.len());
        self.data
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
        self
    }

    /// `entries` is the inside of the stream dictionary, without `/Length`.
    pub fn stream(&mut self, number: u32, entries: &str, payload: &[u8]) -> &mut Self {
        self.offsets.insert(number, self.data.len());
        self.data.extend_from_slice(
            format!(
                "{number} 0 obj\n<< {entries} /Length {} >>\nstream\n",
                payload.len()
            )
            .as_bytes(),
        );
        self.data.extend_from_slice(payload);
        self.data.extend_from_slice(b"\nendstream\nendobj\n");
        self
    }

    pub fn offset(&self, number: u32) -> usize {
        self.offsets[&number]
    }

    /// Closes the file with a classic table covering `0..=max`.
    pub fn finish_table(mut self, trailer: &str) -> Vec<u8> {
        let max = self.offsets.keys().max().copied().unwrap_or(0);
        let xref = self.data.len();
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", max + 1);
        for number in 1..=max {
            match self.offsets.get(&number) {
                Some(offset) => table.push_str(&format!("{offset:010} 00000 n \n")),
                None => table.push_str("0000000000 00000 f \n"),
            }
        }
        self.data.extend_from_slice(table.as_bytes());
        self.data.extend_from_slice(
            format!("trailer\n<< /Size {} {trailer} >>\nstartxref\n{xref}\n%%EOF\n", max + 1)
                .as_bytes(),
        );
        self.data
    }

    /// Closes the file with a Flate-compressed cross-reference stream using
    /// the PNG Up predictor. `packed` maps member numbers to
    /// `(container, index)`.
    pub fn finish_stream(mut self, number: u32, trailer: &str, packed: &[(u32, u32, u32)]) -> Vec<u8> {
        let xref = self.data.len();
        self.offsets.insert(number, xref);

        let max = self
            .offsets
            .keys()
            .copied()
            .chain(packed.iter().map(|p| p.0))
            .max()
            .unwrap_or(0);
        let mut rows = Vec::new();
        for n in 0..=max {
            let record: [u64; 3] = if let Some(&(_, container, index)) =
                packed.iter().find(|p| p.0 == n)
            {
                [2, container as u64, index as u64]
            } else if let Some(&offset) = self.offsets.get(&n) {
                [1, offset as u64, 0]
            } else if n == 0 {
                [0, 0, 65535]
            } else {
                [0, 0, 0]
            };
            rows.push(pack_row(record));
        }

        let predicted = png_up(&rows);
        let payload = FlateDecode::new().encode(&predicted).unwrap();
        let entries = format!(
            "/Type /XRef /Size {} /W [1 4 2] /Filter /FlateDecode \
             /DecodeParms << /Predictor 12 /Columns 7 >> {trailer}",
            max + 1
        );
        self.stream(number, &entries, &payload);
        self.data
            .extend_from_slice(format!("startxref\n{xref}\n%%EOF\n").as_bytes());
        self.data
    }
}

fn pack_row(record: [u64; 3]) -> Vec<u8> {
    let mut row = vec![record[0] as u8];
    row.extend_from_slice(&(record[1] as u32).to_be_bytes());
    row.extend_from_slice(&(record[2] as u16).to_be_bytes());
    row
}

/// Each row becomes tag 2 plus its byte-wise difference from the row above.
fn png_up(rows: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut previous = vec![0u8; rows.first().map_or(0, Vec::len)];
    for row in rows {
        out.push(2);
        out.extend(row.iter().zip(&previous).map(|(b, p)| b.wrapping_sub(*p)));
        previous = row.clone();
    }
    out
}

/// Object stream body with its `/First` value.
pub fn object_stream(members: &[(u32, &str)]) -> (Vec<u8>, usize) {
    let mut header = String::new();
    let mut bodies = String::new();
    for (number, body) in members {
        header.push_str(&format!("{number} {} ", bodies.len()));
        bodies.push_str(body);
        bodies.push(' ');
    }
    let first = header.len();
    (format!("{header}{bodies}").into_bytes(), first)
}

/// One page with a font carrying a ToUnicode CMap, plus an info dictionary.
pub fn legacy_sample() -> Vec<u8> {
    let mut pdf = PdfBuilder::new("1.4");
    pdf.object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F5 5 0 R >> >> >>",
        )
        .stream(4, "", CONTENT)
        .object(
            5,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /ToUnicode 6 0 R >>",
        )
        .stream(6, "", TO_UNICODE)
        .object(7, "<< /Title (Sample \\(one\\)) /Producer (pagewright tests) >>");
    pdf.finish_table("/Root 1 0 R /Info 7 0 R")
}

/// Two pages; the font and a plain dictionary live in object stream 7 and
/// the table is cross-reference stream 8.
pub fn stream_sample() -> Vec<u8> {
    let mut pdf = PdfBuilder::new("1.5");
    let content = FlateDecode::new().encode(CONTENT).unwrap();
    let (packed, first) = object_stream(&[
        (5, "<< /Type /Font /Subtype /Type1 /BaseFont /Courier >>"),
        (6, "<< /Note (packed) /Numbers [1 2.5 -3] >>"),
    ]);

    pdf.object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R 9 0 R] /Count 2 >>")
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Contents 4 0 R \
             /Resources << /Font << /F5 5 0 R >> >> >>",
        )
        .stream(4, "/Filter /FlateDecode", &content)
        .stream(7, &format!("/Type /ObjStm /N 2 /First {first}"), &packed)
        .object(9, "<< /Type /Page /Parent 2 0 R /Contents [] >>");
    pdf.finish_stream(8, "/Root 1 0 R", &[(5, 7, 0), (6, 7, 1)])
}
