//! Binary cross-reference stream records
//!
//! Each record is three big-endian fields whose byte widths come from `/W`.
//! Records are numbered consecutively through the `(start, count)` runs of
//! `/Index`.

use super::{check_object_number, EntryKind, Location, XRefEntry, XRefTable};
use crate::objects::{Dictionary, Object, ObjectId};
use crate::parser::{ParseError, ParseResult};

const MAX_FIELD_WIDTH: usize = 8;

fn invalid(message: impl Into<String>) -> ParseError {
    ParseError::InvalidXRefStream(message.into())
}

/// Reads `/W`, which must hold exactly three non-negative integers.
pub fn read_widths(dict: &Dictionary) -> ParseResult<[usize; 3]> {
    let w = dict
        .get_array("W")
        .ok_or_else(|| ParseError::MissingKey("W".to_string()))?;
    if w.len() != 3 {
        return Err(invalid(format!(
            "/W must hold exactly 3 integers, found {}",
            w.len()
        )));
    }

    let mut widths = [0usize; 3];
    for (slot, value) in widths.iter_mut().zip(w) {
        let width = value
            .as_integer()
            .filter(|&v| (0..=MAX_FIELD_WIDTH as i64).contains(&v))
            .ok_or_else(|| invalid(format!("bad /W field {value:?}")))?;
        *slot = width as usize;
    }
    Ok(widths)
}

/// Reads `/Index` as `(start, count)` runs.
///
/// Without `/Index`, a `/Size` yields the single run `(0, Size)`; with neither
/// there are no runs at all.
pub fn read_sections(dict: &Dictionary) -> ParseResult<Vec<(u32, u32)>> {
    match dict.get("Index") {
        Some(Object::Array(items)) => {
            if items.len() % 2 != 0 {
                return Err(invalid("/Index must hold (start, count) pairs"));
            }
            items
                .chunks(2)
                .map(|pair| {
                    let start = to_u32(&pair[0]).ok_or_else(|| invalid("bad /Index start"))?;
                    let count = to_u32(&pair[1]).ok_or_else(|| invalid("bad /Index count"))?;
                    Ok((start, count))
                })
                .collect()
        }
        Some(other) => Err(invalid(format!(
            "/Index must be an array, found {}",
            other.type_name()
        ))),
        None => match dict.get("Size") {
            Some(size) => {
                let size = to_u32(size).ok_or_else(|| invalid("bad /Size"))?;
                Ok(vec![(0, size)])
            }
            None => Ok(Vec::new()),
        },
    }
}

fn to_u32(value: &Object) -> Option<u32> {
    value.as_integer().and_then(|v| u32::try_from(v).ok())
}

fn read_field(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

fn write_field(data: &mut Vec<u8>, value: u64, width: usize) {
    for i in (0..width).rev() {
        data.push(((value >> (i * 8)) & 0xFF) as u8);
    }
}

/// Minimum number of bytes needed to store `value`.
pub fn bytes_needed(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        ((value.ilog2() / 8) + 1) as usize
    }
}

/// Decodes the records of a cross-reference stream payload.
pub fn decode_entries(dict: &Dictionary, data: &[u8]) -> ParseResult<Vec<XRefEntry>> {
    let widths = read_widths(dict)?;
    let record_len: usize = widths.iter().sum();
    if record_len == 0 {
        return Err(invalid("/W describes zero-width records"));
    }
    if data.len() % record_len != 0 {
        return Err(invalid(format!(
            "payload of {} bytes is not a multiple of the {record_len}-byte record",
            data.len()
        )));
    }

    let sections = read_sections(dict)?;
    let mut numbers = sections
        .iter()
        .flat_map(|&(start, count)| start..start.saturating_add(count));

    let mut entries = Vec::with_capacity(data.len() / record_len);
    for (i, record) in data.chunks_exact(record_len).enumerate() {
        let (kind_bytes, rest) = record.split_at(widths[0]);
        let (field2, field3) = rest.split_at(widths[1]);
        let kind = if widths[0] == 0 { 1 } else { read_field(kind_bytes) };
        let field2 = read_field(field2);
        let field3 = read_field(field3);

        let number = numbers
            .next()
            .ok_or_else(|| invalid(format!("record {i} lies outside every /Index section")))?;
        let number = check_object_number(number as u64)?;
        let narrow = |value: u64, what: &str| {
            u32::try_from(value).map_err(|_| invalid(format!("{what} {value} in record {i}")))
        };
        let generation = |value: u64| {
            u16::try_from(value).map_err(|_| invalid(format!("generation {value} in record {i}")))
        };

        let entry = match kind {
            0 => XRefEntry::new(
                ObjectId::new(number, generation(field3)?),
                Location::NextFree(narrow(field2, "next free object")?),
            ),
            1 => XRefEntry::new(
                ObjectId::new(number, generation(field3)?),
                Location::Offset(field2),
            ),
            2 => XRefEntry::new(
                ObjectId::new(number, 0),
                Location::Container {
                    object: narrow(field2, "container object")?,
                    index: narrow(field3, "container index")?,
                },
            ),
            other => return Err(invalid(format!("entry type {other} in record {i}"))),
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// The `[type, field2, field3]` values describing an entry.
pub fn entry_fields(entry: &XRefEntry) -> [u64; 3] {
    match entry.location() {
        Location::NextFree(next) => [0, next as u64, entry.generation() as u64],
        Location::Offset(offset) => [1, offset, entry.generation() as u64],
        Location::Container { object, index } => [2, object as u64, index as u64],
    }
}

/// One record per object number from 0 through the table's maximum.
/// Numbers the table does not mention become free records.
pub fn table_records(table: &XRefTable) -> Vec<[u64; 3]> {
    let max = table.max_object_number() as usize;
    let mut slots: Vec<Option<&XRefEntry>> = vec![None; max + 1];
    for entry in table.entries() {
        let slot = &mut slots[entry.number() as usize];
        let replace = match slot {
            None => true,
            Some(existing) => {
                existing.kind() == EntryKind::Free && entry.kind() != EntryKind::Free
            }
        };
        if replace {
            *slot = Some(entry);
        }
    }

    slots
        .iter()
        .enumerate()
        .map(|(number, slot)| match slot {
            Some(entry) => entry_fields(entry),
            None if number == 0 => [0, 0, 65535],
            None => [0, 0, 0],
        })
        .collect()
}

/// Declared widths, widened where a value would not fit.
pub fn required_widths(records: &[[u64; 3]], declared: [usize; 3]) -> [usize; 3] {
    let width_for = |max: u64| if max == 0 { 0 } else { bytes_needed(max) };
    let max_of = |field: usize| records.iter().map(|r| r[field]).max().unwrap_or(0);

    let all_used = records.iter().all(|r| r[0] == 1);
    let kind_width = if all_used {
        declared[0]
    } else {
        declared[0].max(1)
    };

    [
        kind_width,
        declared[1].max(width_for(max_of(1))),
        declared[2].max(width_for(max_of(2))),
    ]
}

/// Packs records big-endian into the given widths.
pub fn encode_records(records: &[[u64; 3]], widths: [usize; 3]) -> Vec<u8> {
    let mut data = Vec::with_capacity(records.len() * widths.iter().sum::<usize>());
    for record in records {
        for (value, width) in record.iter().zip(widths) {
            write_field(&mut data, *value, width);
        }
    }
    data
}
