//! Shared integer cells.
//!
//! A variable is referenced by every data pin of one connected component.
//! It keeps back-references to its readers and writers so a merge can
//! re-point the whole component in one pass.

use crate::handle::{DataInId, DataOutId};
use smallvec::SmallVec;

/// A shared mutable integer cell
#[derive(Debug, Clone, Default)]
pub struct Variable {
    pub(crate) value: i64,
    pub(crate) readers: SmallVec<[DataInId; 4]>,
    pub(crate) writers: SmallVec<[DataOutId; 2]>,
}

impl Variable {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn readers(&self) -> &[DataInId] {
        &self.readers
    }

    pub fn writers(&self) -> &[DataOutId] {
        &self.writers
    }

    pub(crate) fn add_reader(&mut self, reader: DataInId) {
        if !self.readers.contains(&reader) {
            self.readers.push(reader);
        }
    }

    pub(crate) fn add_writer(&mut self, writer: DataOutId) {
        if !self.writers.contains(&writer) {
            self.writers.push(writer);
        }
    }

    pub(crate) fn remove_reader(&mut self, reader: DataInId) {
        self.readers.retain(|r| *r != reader);
    }

    pub(crate) fn remove_writer(&mut self, writer: DataOutId) {
        self.writers.retain(|w| *w != writer);
    }

    /// No pin references this cell any more.
    pub(crate) fn is_orphan(&self) -> bool {
        self.readers.is_empty() && self.writers.is_empty()
    }
}
