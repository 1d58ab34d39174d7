use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes.
///
/// A handle stays attached to its element until the element is taken; rotations, splits
/// and merges only rewrite links, so a node never moves to another slot while it is
/// part of the tree. Freed slots are recycled by later allocations; each slot counts how
/// often it has been freed so that a handle kept past its element's removal can be told
/// apart from the slot's next occupant.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
    // Never shrinks, so a recycled index never repeats a generation.
    generations: Vec<u32>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            generations: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            generations: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserves room for `additional` more elements beyond the recyclable slots.
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional.saturating_sub(self.free.len()));
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        // Trailing free slots can be dropped outright; interior ones keep their index.
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        let end = self.slots.len();
        self.free.retain(|h| h.to_index() < end);
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            if self.generations.len() < self.slots.len() {
                self.generations.push(0);
            }
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    /// Looks an element up without trusting the handle.
    #[inline]
    pub(crate) fn try_get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.to_index()).and_then(Option::as_ref)
    }

    /// Returns how many times the slot behind `handle` has been freed.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> u32 {
        self.generations.get(handle.to_index()).copied().unwrap_or(0)
    }

    /// Returns true if `handle` still names the element it named at `generation`.
    #[inline]
    pub(crate) fn is_live(&self, handle: Handle, generation: u32) -> bool {
        self.try_get(handle).is_some() && self.generation(handle) == generation
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        let generation = &mut self.generations[handle.to_index()];
        *generation = generation.wrapping_add(1);
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        let live = self.slots.iter().zip(self.generations.iter_mut()).filter(|(slot, _)| slot.is_some());
        for (_, generation) in live {
            *generation = generation.wrapping_add(1);
        }
        self.slots.clear();
        self.free.clear();
    }
}
