//! Projection of pools into the flat record arrays consumed by renderers.
//!
//! One 4-float record per slot, in slot order, always `capacity` long.
//! Inactive slots always project to [`ZERO_RECORD`], so a zero magnitude
//! channel means "slot is empty" for every layer.

use crate::pool::{Instance, SlotPool};

pub type Record = [f32; 4];

pub const ZERO_RECORD: Record = [0.0; 4];

pub fn marshal<T, F>(pool: &SlotPool<T>, project: F) -> Vec<Record>
where
    T: Instance,
    F: Fn(&T) -> Record,
{
    let mut out = Vec::with_capacity(pool.capacity());
    marshal_into(pool, project, &mut out);
    out
}

/// Refill a caller-owned buffer, reusing its allocation.
pub fn marshal_into<T, F>(pool: &SlotPool<T>, project: F, out: &mut Vec<Record>)
where
    T: Instance,
    F: Fn(&T) -> Record,
{
    out.clear();
    out.extend(pool.slots().iter().map(|slot| {
        if slot.is_active() {
            project(slot)
        } else {
            ZERO_RECORD
        }
    }));
}
