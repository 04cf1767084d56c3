//! Fixed-capacity slot pools shared by every layer.
//!
//! A pool is allocated once and never grows. Spawning reuses the first
//! inactive slot; when every slot is live the pool's [`FullPolicy`] decides
//! whether the spawn is dropped or an existing instance is evicted. Lookups
//! are linear scans, which is fine for the small capacities layers use.

use crate::constants::MAX_POOL_CAPACITY;
use crate::error::VizError;

/// Shape-agnostic view of a pooled effect instance.
///
/// `Default` must produce the inactive, all-zero instance: it is what a slot
/// is reset to when it expires or is evicted.
pub trait Instance: Default + Clone {
    fn is_active(&self) -> bool;
    /// Timestamp of the event that spawned this instance.
    fn birth_ms(&self) -> f64;
}

/// What to do when a spawn finds no free slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullPolicy {
    /// Discard the spawn.
    DropOnFull,
    /// Evict slot 0.
    OverwriteFirst,
    /// Evict the slot with the smallest birth timestamp (lowest index on ties).
    OverwriteOldest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub capacity: usize,
    pub full_policy: FullPolicy,
}

impl PoolConfig {
    pub const fn new(capacity: usize, full_policy: FullPolicy) -> Self {
        Self {
            capacity,
            full_policy,
        }
    }

    pub fn validate(&self, label: &'static str) -> Result<(), VizError> {
        if self.capacity == 0 {
            return Err(VizError::ZeroCapacity(label));
        }
        if self.capacity > MAX_POOL_CAPACITY {
            return Err(VizError::CapacityTooLarge {
                label,
                capacity: self.capacity,
                max: MAX_POOL_CAPACITY,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SlotPool<T> {
    label: &'static str,
    slots: Box<[T]>,
    policy: FullPolicy,
}

impl<T: Instance> SlotPool<T> {
    pub fn new(label: &'static str, config: PoolConfig) -> Result<Self, VizError> {
        config.validate(label)?;
        let slots = vec![T::default(); config.capacity].into_boxed_slice();
        Ok(Self {
            label,
            slots,
            policy: config.full_policy,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn full_policy(&self) -> FullPolicy {
        self.policy
    }

    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|s| s.is_active())
    }

    /// Index of the first inactive slot, scanning in index order.
    pub fn find_free_index(&self) -> Option<usize> {
        self.slots.iter().position(|s| !s.is_active())
    }

    /// First inactive slot, if any.
    pub fn find_free_slot(&mut self) -> Option<&mut T> {
        let index = self.find_free_index()?;
        Some(&mut self.slots[index])
    }

    fn oldest_index(&self) -> usize {
        let mut oldest = 0;
        for (i, slot) in self.slots.iter().enumerate().skip(1) {
            if slot.birth_ms() < self.slots[oldest].birth_ms() {
                oldest = i;
            }
        }
        oldest
    }

    /// Store `instance` in a free slot, applying the full policy when none is
    /// free. Returns the slot index, or `None` when the spawn was dropped.
    pub fn spawn(&mut self, instance: T) -> Option<usize> {
        let index = match self.find_free_index() {
            Some(i) => i,
            None => match self.policy {
                FullPolicy::DropOnFull => {
                    log::trace!("[pool:{}] full, spawn dropped", self.label);
                    return None;
                }
                FullPolicy::OverwriteFirst => {
                    log::trace!("[pool:{}] full, evicting slot 0", self.label);
                    0
                }
                FullPolicy::OverwriteOldest => {
                    let i = self.oldest_index();
                    log::trace!("[pool:{}] full, evicting oldest slot {i}", self.label);
                    i
                }
            },
        };
        self.slots[index] = instance;
        Some(index)
    }

    /// Run `step` on every active slot; slots for which it returns `false`
    /// are reset to the zeroed default instance.
    pub fn retain_active<F>(&mut self, mut step: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        for slot in self.slots.iter_mut() {
            if slot.is_active() && !step(slot) {
                *slot = T::default();
            }
        }
    }
}
