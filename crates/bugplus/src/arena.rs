//! Generational arena used for shared data cells.
//!
//! Freed slots are reused with a bumped generation, so a stale handle to a
//! merged or released variable is detected instead of aliasing a new one.

/// Generational index into an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SlotId {
    pub index: u32,
    pub generation: u32,
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena allocator with free-list reuse.
pub struct Arena<T> {
    entries: Vec<Entry<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Allocate a slot holding `value`.
    pub fn alloc(&mut self, value: T) -> SlotId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            // Reuse freed slot, generation was bumped on free
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            SlotId {
                index,
                generation: entry.generation,
            }
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                value: Some(value),
            });
            SlotId { index, generation: 0 }
        }
    }

    /// Free a slot, returning its value. Stale handles return `None`.
    pub fn free(&mut self, slot: SlotId) -> Option<T> {
        if !self.is_valid(slot) {
            return None;
        }
        let entry = &mut self.entries[slot.index as usize];
        entry.generation += 1;
        self.free_list.push(slot.index);
        self.live -= 1;
        entry.value.take()
    }

    /// Check if a SlotId is valid (live and correct generation).
    pub fn is_valid(&self, slot: SlotId) -> bool {
        self.entries
            .get(slot.index as usize)
            .is_some_and(|entry| entry.generation == slot.generation && entry.value.is_some())
    }

    pub fn get(&self, slot: SlotId) -> Option<&T> {
        let entry = self.entries.get(slot.index as usize)?;
        if entry.generation != slot.generation {
            return None;
        }
        entry.value.as_ref()
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut T> {
        let entry = self.entries.get_mut(slot.index as usize)?;
        if entry.generation != slot.generation {
            return None;
        }
        entry.value.as_mut()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_alloc_and_free() {
        let mut arena = Arena::new();

        let slot1 = arena.alloc(10);
        let slot2 = arena.alloc(20);

        assert!(arena.is_valid(slot1));
        assert!(arena.is_valid(slot2));
        assert_ne!(slot1, slot2);
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.free(slot1), Some(10));
        assert!(!arena.is_valid(slot1));
        assert_eq!(arena.len(), 1);

        // Reuse freed slot
        let slot3 = arena.alloc(30);
        assert_eq!(slot3.index, slot1.index);
        assert_ne!(slot3.generation, slot1.generation);
        assert_eq!(arena.get(slot3), Some(&30));
    }

    #[test]
    fn arena_get_mut() {
        let mut arena = Arena::new();
        let slot = arena.alloc(1);

        if let Some(value) = arena.get_mut(slot) {
            *value = 5;
        }

        assert_eq!(arena.get(slot), Some(&5));
    }

    #[test]
    fn arena_stale_handle_is_rejected() {
        let mut arena = Arena::new();

        let slot1 = arena.alloc("a");
        arena.free(slot1);
        let slot2 = arena.alloc("b"); // Reuses slot1's index

        assert!(arena.get(slot1).is_none());
        assert_eq!(arena.free(slot1), None);
        assert_eq!(arena.get(slot2), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }
}
