//! Bounded reuse pool for placeable entities.
//!
//! Every entity is created up front and flagged active or inactive instead of
//! being allocated and dropped per placement. Handles carry the id of the pool
//! that issued them so a foreign handle can be rejected without touching state.

use std::sync::atomic::{AtomicU32, Ordering};

use bevy::prelude::*;

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

/// Contract for anything stored in an [`ObjectPool`].
///
/// `reset` runs whenever the entity goes back to the pool and must leave it
/// in the same state as a freshly created one.
pub trait Poolable {
    /// Clears per-use state (visual attachment, flags, placement data).
    fn reset(&mut self);
}

/// Reference to one entity of one specific pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub struct PoolHandle {
    pool: u32,
    index: u32,
}

impl PoolHandle {
    /// Position of the entity inside its pool.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

struct Slot<T> {
    item: T,
    active: bool,
}

/// Fixed-capacity (optionally growable) pool of `T`.
pub struct ObjectPool<T> {
    id: u32,
    slots: Vec<Slot<T>>,
    should_grow: bool,
}

impl<T: Poolable + Default> ObjectPool<T> {
    /// Creates `size` inactive entities.
    ///
    /// With `should_grow` set, [`ObjectPool::acquire`] appends a new entity
    /// instead of failing once every entity is in use.
    pub fn new(size: usize, should_grow: bool) -> Self {
        let slots = (0..size)
            .map(|_| Slot {
                item: T::default(),
                active: false,
            })
            .collect();
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            slots,
            should_grow,
        }
    }

    /// Like [`ObjectPool::new`], running `init` once on every initial entity.
    pub fn with_init(size: usize, should_grow: bool, mut init: impl FnMut(&mut T)) -> Self {
        let mut pool = Self::new(size, should_grow);
        for slot in &mut pool.slots {
            init(&mut slot.item);
        }
        pool
    }

    /// Returns the first inactive entity.
    ///
    /// When `activate` is false the entity stays inactive, so a second call
    /// hands out the same one until [`ObjectPool::activate`] is called.
    /// Returns `None` when everything is in use and growth is disabled.
    pub fn acquire(&mut self, activate: bool) -> Option<PoolHandle> {
        let index = match self.slots.iter().position(|s| !s.active) {
            Some(index) => index,
            None if self.should_grow => {
                self.slots.push(Slot {
                    item: T::default(),
                    active: false,
                });
                debug!("Pool {} grew to {} entities", self.id, self.slots.len());
                self.slots.len() - 1
            }
            None => return None,
        };

        if activate {
            self.slots[index].active = true;
        }
        Some(self.handle(index))
    }

    /// Marks an entity as in use. Returns false for foreign handles.
    pub fn activate(&mut self, handle: PoolHandle) -> bool {
        match self.slot_mut(handle) {
            Some(slot) => {
                slot.active = true;
                true
            }
            None => false,
        }
    }

    /// Resets the entity and returns it to the inactive set.
    ///
    /// Handles issued by another pool are rejected and logged; the pool is
    /// left untouched.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            error!(
                "Tried to return an object which doesn't belong to this pool ({handle:?}, pool {})",
                self.id
            );
            return false;
        };
        slot.item.reset();
        slot.active = false;
        true
    }

    /// Releases every active entity.
    pub fn release_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.item.reset();
            slot.active = false;
        }
    }
}

impl<T> ObjectPool<T> {
    fn handle(&self, index: usize) -> PoolHandle {
        PoolHandle {
            pool: self.id,
            index: index as u32,
        }
    }

    fn slot(&self, handle: PoolHandle) -> Option<&Slot<T>> {
        if handle.pool != self.id {
            return None;
        }
        self.slots.get(handle.index())
    }

    fn slot_mut(&mut self, handle: PoolHandle) -> Option<&mut Slot<T>> {
        if handle.pool != self.id {
            return None;
        }
        self.slots.get_mut(handle.index())
    }

    /// The entity behind `handle`, active or not.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slot(handle).map(|s| &s.item)
    }

    /// Mutable access to the entity behind `handle`.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slot_mut(handle).map(|s| &mut s.item)
    }

    /// Whether the entity is currently handed out.
    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.slot(handle).is_some_and(|s| s.active)
    }

    /// Total number of entities (active + inactive).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the pool holds no entities at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of entities in use.
    pub fn count_active(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Number of entities available.
    pub fn count_inactive(&self) -> usize {
        self.slots.len() - self.count_active()
    }

    /// Whether growth is enabled.
    pub fn should_grow(&self) -> bool {
        self.should_grow
    }

    /// Every entity with its handle and activity flag, in pool order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T, bool)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (self.handle(i), &s.item, s.active))
    }

    /// Active entities only.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.iter()
            .filter_map(|(handle, item, active)| active.then_some((handle, item)))
    }
}
