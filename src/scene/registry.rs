//! Sparse handle-keyed storage
//!
//! Slot `i` of the data array belongs to whichever handle currently owns
//! index `i`. Lookups go through the allocator first, so a stale handle
//! never reaches the data.

use super::handle::{Handle, HandleAllocator};

pub struct Registry<T> {
    allocator: HandleAllocator<T>,
    /// Sparse array indexed by handle.index()
    data: Vec<Option<T>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            allocator: HandleAllocator::new(),
            data: Vec::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> Handle<T> {
        let handle = self.allocator.allocate();
        let idx = handle.index() as usize;
        if idx >= self.data.len() {
            self.data.resize_with(idx + 1, || None);
        }
        self.data[idx] = Some(value);
        handle
    }

    /// Remove and return the value, if the handle is still alive.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if !self.allocator.free(handle) {
            return None;
        }
        self.data.get_mut(handle.index() as usize).and_then(Option::take)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if !self.allocator.is_alive(handle) {
            return None;
        }
        self.data.get(handle.index() as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if !self.allocator.is_alive(handle) {
            return None;
        }
        self.data.get_mut(handle.index() as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Iterate live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.data.iter().enumerate().filter_map(|(idx, slot)| {
            let value = slot.as_ref()?;
            let handle = self.allocator.handle_at(idx as u32)?;
            Some((handle, value))
        })
    }

    /// Remove every entry for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let doomed: Vec<Handle<T>> = self
            .iter()
            .filter(|(_, value)| !keep(*value))
            .map(|(handle, _)| handle)
            .collect();
        for handle in doomed {
            self.remove(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.allocator.alive_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
