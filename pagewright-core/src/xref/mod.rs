//! Cross-reference table
//!
//! Maps object identities to where their definitions live: a byte offset, a
//! slot inside an object stream, or a free-list link. Each entry also caches
//! the parsed value once it has been loaded.

pub mod stream;

use crate::objects::{Object, ObjectId};
use crate::parser::{ParseError, ParseResult};
use std::cell::OnceCell;
use std::collections::HashMap;
use tracing::warn;

/// Largest object number a cross-reference section may hold.
pub const MAX_OBJECT_NUMBER: u32 = 8_388_607;

/// Narrows `number` to an object number, rejecting anything above
/// [`MAX_OBJECT_NUMBER`].
pub fn check_object_number(number: u64) -> ParseResult<u32> {
    u32::try_from(number)
        .ok()
        .filter(|&n| n <= MAX_OBJECT_NUMBER)
        .ok_or(ParseError::ObjectNumberOutOfRange(number))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Free,
    Used,
    InContainer,
}

/// Where an entry's definition is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Byte offset of `n g obj` in the file.
    Offset(u64),
    /// Slot `index` of the object stream numbered `object`.
    Container { object: u32, index: u32 },
    /// Next object number in the free list.
    NextFree(u32),
}

/// How the cross-reference section is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefMode {
    /// Classic `xref` text table followed by a `trailer` dictionary.
    Table,
    /// Binary cross-reference stream stored in the given object.
    Stream(ObjectId),
}

#[derive(Debug)]
pub struct XRefEntry {
    id: ObjectId,
    location: Location,
    value: OnceCell<Object>,
}

impl XRefEntry {
    pub fn new(id: ObjectId, location: Location) -> Self {
        Self {
            id,
            location,
            value: OnceCell::new(),
        }
    }

    /// An entry whose value is already known.
    pub fn loaded(id: ObjectId, location: Location, value: Object) -> Self {
        Self {
            id,
            location,
            value: OnceCell::from(value),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn number(&self) -> u32 {
        self.id.number()
    }

    pub fn generation(&self) -> u16 {
        self.id.generation()
    }

    pub fn kind(&self) -> EntryKind {
        match self.location {
            Location::Offset(_) => EntryKind::Used,
            Location::Container { .. } => EntryKind::InContainer,
            Location::NextFree(_) => EntryKind::Free,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn offset(&self) -> Option<u64> {
        match self.location {
            Location::Offset(offset) => Some(offset),
            _ => None,
        }
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        self.location = Location::Offset(offset);
    }

    pub fn is_loaded(&self) -> bool {
        self.value.get().is_some()
    }

    /// Cached value, if the entry has been parsed.
    pub fn value(&self) -> Option<&Object> {
        self.value.get()
    }

    pub fn value_mut(&mut self) -> Option<&mut Object> {
        self.value.get_mut()
    }

    /// Caches a freshly parsed value. An already cached value wins.
    pub(crate) fn store(&self, value: Object) -> &Object {
        self.value.get_or_init(|| value)
    }
}

#[derive(Debug)]
pub struct XRefTable {
    entries: Vec<XRefEntry>,
    /// Object number to position in `entries`, non-free entries only.
    index: HashMap<u32, usize>,
    mode: XRefMode,
}

impl XRefTable {
    pub fn new(mode: XRefMode) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            mode,
        }
    }

    pub fn from_entries(entries: Vec<XRefEntry>, mode: XRefMode) -> Self {
        let mut table = Self::new(mode);
        for entry in entries {
            table.push(entry);
        }
        table
    }

    pub fn mode(&self) -> XRefMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, free ones included, in table order.
    pub fn entries(&self) -> impl Iterator<Item = &XRefEntry> {
        self.entries.iter()
    }

    /// Entries that are not free, in table order. Shadowed duplicates are
    /// skipped.
    pub fn live_entries(&self) -> impl Iterator<Item = &XRefEntry> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(position, entry)| {
                entry.kind() != EntryKind::Free
                    && self.index.get(&entry.number()) == Some(position)
            })
            .map(|(_, entry)| entry)
    }

    /// Position of the live entry with this object number.
    pub(crate) fn position_of(&self, number: u32) -> Option<usize> {
        self.index.get(&number).copied()
    }

    /// Position of the entry matching `id`: a used entry with the exact
    /// generation, or an in-container entry when `id` has generation 0.
    pub(crate) fn position(&self, id: ObjectId) -> Option<usize> {
        let position = self.position_of(id.number())?;
        let entry = &self.entries[position];
        let matches = match entry.kind() {
            EntryKind::Used => entry.generation() == id.generation(),
            EntryKind::InContainer => id.generation() == 0,
            EntryKind::Free => false,
        };
        matches.then_some(position)
    }

    pub fn get(&self, number: u32, generation: u16) -> Option<&XRefEntry> {
        self.position(ObjectId::new(number, generation))
            .map(|position| &self.entries[position])
    }

    pub fn get_mut(&mut self, number: u32, generation: u16) -> Option<&mut XRefEntry> {
        let position = self.position(ObjectId::new(number, generation))?;
        self.entries.get_mut(position)
    }

    pub fn max_object_number(&self) -> u32 {
        self.entries.iter().map(XRefEntry::number).max().unwrap_or(0)
    }

    /// Appends an entry. A second live entry for an already indexed number is
    /// kept in the table but not indexed.
    pub(crate) fn push(&mut self, entry: XRefEntry) {
        let position = self.entries.len();
        if entry.kind() != EntryKind::Free {
            if self.index.contains_key(&entry.number()) {
                warn!("Duplicate cross-reference entry for object {}", entry.id());
            } else {
                self.index.insert(entry.number(), position);
            }
        }
        self.entries.push(entry);
    }

    /// Number the next added object receives.
    pub fn next_object_number(&self) -> ParseResult<u32> {
        check_object_number(self.max_object_number() as u64 + 1)
    }

    /// Adds a new used object numbered one past the current maximum.
    pub fn add_entry(&mut self, value: Object) -> ParseResult<ObjectId> {
        let id = ObjectId::new(self.next_object_number()?, 0);
        self.push(XRefEntry::loaded(id, Location::Offset(0), value));
        Ok(id)
    }
}
