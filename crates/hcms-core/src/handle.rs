//! Slot-based handle tables.
//!
//! Open profiles and transforms are referred to by opaque 64-bit handles
//! rather than borrowed references, so callers can hold them across threads
//! and the engine controls object lifetime. A handle packs a slot index in
//! its low half and that slot's generation counter in its high half; closing
//! an object bumps the generation, so a handle kept past close stops
//! resolving even after the slot is reused.

/// Handle to an open profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileHandle(pub(crate) u64);

/// Handle to a color transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformHandle(pub(crate) u64);

const MIN_SLOTS: usize = 128;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Table of live objects addressed by generational handles.
///
/// Handle value 0 is reserved as invalid: the low half of a handle stores
/// `index + 1`.
#[derive(Debug)]
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Store `value` in the first free slot and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        let index = match self.slots.iter().position(|slot| slot.value.is_none()) {
            Some(index) => index,
            None => {
                let index = self.slots.len();
                let grown = (self.slots.len() * 2).max(MIN_SLOTS);
                self.slots.resize_with(grown, || Slot {
                    generation: 0,
                    value: None,
                });
                index
            }
        };
        self.slots[index].value = Some(value);
        encode(index, self.slots[index].generation)
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        let index = self.resolve(handle)?;
        self.slots[index].value.as_ref()
    }

    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let index = self.resolve(handle)?;
        self.slots[index].value.as_mut()
    }

    /// Free the slot behind `handle` and return its value.
    ///
    /// The slot's generation is bumped here, which is what invalidates any
    /// copies of the handle still held by callers.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let index = self.resolve(handle)?;
        let value = self.slots[index].value.take();
        if value.is_some() {
            self.slots[index].generation = self.slots[index].generation.wrapping_add(1);
        }
        value
    }

    fn resolve(&self, handle: u64) -> Option<usize> {
        let low = (handle & 0xffff_ffff) as usize;
        if low == 0 {
            return None;
        }
        let index = low - 1;
        let generation = (handle >> 32) as u32;
        let slot = self.slots.get(index)?;
        if slot.generation != generation || slot.value.is_none() {
            return None;
        }
        Some(index)
    }
}

fn encode(index: usize, generation: u32) -> u64 {
    ((generation as u64) << 32) | (index as u64 + 1)
}
