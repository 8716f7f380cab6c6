use core::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Stable handle to a live pool slot.
///
/// Handles are reused once their slot is freed, so holding one past `despawn` is a logic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool exhausted, all {capacity} slots are live")]
    Exhausted { capacity: usize },
}

/// Fixed capacity free-list of reusable value slots.
///
/// The most recently freed slot is handed out first.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            free: (0..capacity as u32).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn spawn(&mut self, value: T) -> Result<SlotId, PoolError> {
        let capacity = self.capacity();
        let index = self.free.pop().ok_or(PoolError::Exhausted { capacity })?;
        if let Some(slot) = self.slots.get_mut(index as usize) {
            *slot = Some(value);
        }
        Ok(SlotId(index))
    }

    /// Frees the slot and hands back its value, `None` if it was not live.
    pub fn despawn(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id.0);
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }
}
