//! Fixed-capacity object pool doubling as entity storage.
//!
//! Slots live in one arena with a free list, indexed by generation-checked
//! [`Handle`]s. A slot is either issued (active) or on the free list (reset
//! and inert). Releasing or reclaiming a slot bumps its generation, so any
//! handle still pointing at the old occupant is rejected.

use log::warn;

use swarmfall_core::components::Entity;
use swarmfall_core::state::PoolStats;
use swarmfall_core::types::Handle;

struct Slot<T> {
    value: T,
    generation: u32,
    /// Acquisition sequence number while issued, `None` while free.
    issued: Option<u64>,
}

/// Generic pool of reusable entity records.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    max_size: usize,
    active: usize,
    next_seq: u64,
    reclaimed: u64,
    factory: fn() -> T,
    reset: fn(&mut T),
    label: &'static str,
}

impl<T: Entity + Default> Pool<T> {
    /// Pool using `Default` to construct and `Entity::reset` to recycle.
    pub fn new(label: &'static str, initial_size: usize, max_size: usize) -> Self {
        Self::with_fns(label, initial_size, max_size, T::default, <T as Entity>::reset)
    }
}

impl<T: Entity> Pool<T> {
    /// Pool with caller-supplied construction and reset functions.
    /// `reset` must leave the record zeroed with `active == false`.
    pub fn with_fns(
        label: &'static str,
        initial_size: usize,
        max_size: usize,
        factory: fn() -> T,
        reset: fn(&mut T),
    ) -> Self {
        let max_size = max_size.max(1);
        let initial_size = initial_size.min(max_size);
        let mut slots = Vec::with_capacity(max_size);
        for _ in 0..initial_size {
            let mut value = factory();
            reset(&mut value);
            slots.push(Slot {
                value,
                generation: 0,
                issued: None,
            });
        }
        // Reversed so the lowest index is handed out first.
        let free = (0..initial_size as u32).rev().collect();

        Self {
            slots,
            free,
            max_size,
            active: 0,
            next_seq: 0,
            reclaimed: 0,
            factory,
            reset,
            label,
        }
    }

    /// Take an instance, returning its handle.
    pub fn acquire(&mut self) -> Handle {
        self.acquire_mut().0
    }

    /// Take an instance and borrow it for initialisation.
    ///
    /// Order of preference: a free slot, a newly constructed slot while
    /// under `max_size`, then the oldest active instance, which is reset
    /// and reissued under a new generation.
    pub fn acquire_mut(&mut self) -> (Handle, &mut T) {
        let index = if let Some(index) = self.free.pop() {
            self.active += 1;
            index as usize
        } else if self.slots.len() < self.max_size {
            self.active += 1;
            self.push_slot()
        } else if let Some(index) = self.oldest_active() {
            let slot = &mut self.slots[index];
            (self.reset)(&mut slot.value);
            slot.generation = slot.generation.wrapping_add(1);
            self.reclaimed += 1;
            warn!(
                "{} pool exhausted at {} active; reclaimed slot {}",
                self.label, self.max_size, index
            );
            index
        } else {
            self.active += 1;
            self.push_slot()
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        let slot = &mut self.slots[index];
        slot.issued = Some(seq);
        slot.value.body_mut().active = true;
        (Handle::new(index as u32, slot.generation), &mut slot.value)
    }

    /// Return an instance to the free list. No-op for stale or free handles.
    pub fn release(&mut self, handle: Handle) -> bool {
        let reset = self.reset;
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        reset(&mut slot.value);
        slot.generation = slot.generation.wrapping_add(1);
        slot.issued = None;
        self.free.push(handle.index);
        self.active -= 1;
        true
    }

    /// Release every handle; returns how many were actually released.
    pub fn release_all(&mut self, handles: impl IntoIterator<Item = Handle>) -> usize {
        handles
            .into_iter()
            .filter(|&handle| self.release(handle))
            .count()
    }

    /// Release every issued instance.
    pub fn clear(&mut self) {
        let handles = self.issued_handles(|_| true);
        self.release_all(handles);
    }

    /// Release issued instances whose `active` flag was cleared by a system,
    /// appending their handles to `released`. Returns how many were freed.
    pub fn release_inactive(&mut self, released: &mut Vec<Handle>) -> usize {
        let start = released.len();
        released.extend(self.issued_handles(|value| !value.is_active()));
        for &handle in &released[start..] {
            self.release(handle);
        }
        released.len() - start
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        (slot.generation == handle.generation && slot.issued.is_some()).then_some(&slot.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slot_mut(handle).map(|slot| &mut slot.value)
    }

    /// Whether the handle names a currently issued instance.
    pub fn is_live(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Issued instances with their `active` flag set, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            (slot.issued.is_some() && slot.value.is_active())
                .then(|| (Handle::new(index as u32, slot.generation), &slot.value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            if slot.issued.is_some() && slot.value.is_active() {
                Some((Handle::new(index as u32, slot.generation), &mut slot.value))
            } else {
                None
            }
        })
    }

    /// Handles of issued, active instances in slot order.
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Number of issued instances.
    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total: self.slots.len(),
            active: self.active,
            free: self.free.len(),
            max_size: self.max_size,
            reclaimed: self.reclaimed,
        }
    }

    fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot<T>> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        (slot.generation == handle.generation && slot.issued.is_some()).then_some(slot)
    }

    fn push_slot(&mut self) -> usize {
        let mut value = (self.factory)();
        (self.reset)(&mut value);
        self.slots.push(Slot {
            value,
            generation: 0,
            issued: None,
        });
        self.slots.len() - 1
    }

    fn oldest_active(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.issued.map(|seq| (seq, index)))
            .min()
            .map(|(_, index)| index)
    }

    fn issued_handles(&self, mut keep: impl FnMut(&T) -> bool) -> Vec<Handle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.issued.is_some() && keep(&slot.value))
            .map(|(index, slot)| Handle::new(index as u32, slot.generation))
            .collect()
    }
}
