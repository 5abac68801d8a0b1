//! Generational handles
//!
//! A handle names a slot plus the generation of that slot. Freeing a slot
//! bumps its generation, so handles to removed models or instances stop
//! resolving instead of silently pointing at whatever reuses the slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed reference into a [`Registry`](super::registry::Registry).
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

// Manual impls so `T` itself needs none of these traits
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

/// Hands out handles, reusing freed slots with a new generation.
pub struct HandleAllocator<T> {
    /// Generation counter for each slot
    generations: Vec<u32>,
    /// Free slots available for reuse (LIFO)
    free_indices: Vec<u32>,
    alive_count: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HandleAllocator<T> {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_indices: Vec::new(),
            alive_count: 0,
            _marker: PhantomData,
        }
    }

    pub fn allocate(&mut self) -> Handle<T> {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already bumped when the slot was freed
            Handle::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            Handle::new(index, 0)
        }
    }

    /// Returns true if the handle was alive and is now freed.
    pub fn free(&mut self, handle: Handle<T>) -> bool {
        if !self.is_alive(handle) {
            return false;
        }
        self.generations[handle.index as usize] += 1;
        self.free_indices.push(handle.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, handle: Handle<T>) -> bool {
        self.generations
            .get(handle.index as usize)
            .is_some_and(|&generation| generation == handle.generation)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Current handle for a slot, if the slot exists.
    pub(crate) fn handle_at(&self, index: u32) -> Option<Handle<T>> {
        self.generations
            .get(index as usize)
            .map(|&generation| Handle::new(index, generation))
    }
}

impl<T> Default for HandleAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}
