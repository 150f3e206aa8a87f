// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational storage for controls.

use alloc::vec::Vec;

use crate::control::Control;
use crate::types::ControlId;

#[derive(Debug)]
struct Slot {
    generation: u32,
    control: Option<Control>,
}

/// Owns controls and hands out [`ControlId`]s for them.
///
/// Freed slots are reused with a bumped generation, so ids of removed
/// controls never resolve again.
#[derive(Debug, Default)]
pub struct ControlArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ControlArena {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no control.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocates a slot and stores the control built by `make` for its id.
    pub fn insert_with(&mut self, make: impl FnOnce(ControlId) -> Control) -> ControlId {
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            ControlId::new(idx, slot.generation)
        } else {
            let idx =
                u32::try_from(self.slots.len()).expect("too many controls for ControlId (u32)");
            self.slots.push(Slot {
                generation: 1,
                control: None,
            });
            ControlId::new(idx, 1)
        };
        self.slots[id.idx()].control = Some(make(id));
        self.len += 1;
        id
    }

    /// Removes and returns the control, freeing its slot.
    pub fn remove(&mut self, id: ControlId) -> Option<Control> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        let control = slot.control.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(control)
    }

    /// Returns `true` if `id` refers to a live control.
    #[must_use]
    pub fn is_alive(&self, id: ControlId) -> bool {
        self.get(id).is_some()
    }

    /// Looks up a live control.
    #[must_use]
    pub fn get(&self, id: ControlId) -> Option<&Control> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.control.as_ref()
    }

    /// Looks up a live control mutably.
    pub fn get_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.control.as_mut()
    }

    /// Iterates live controls in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ControlId, &Control)> + '_ {
        self.slots.iter().filter_map(|slot| {
            let control = slot.control.as_ref()?;
            Some((control.id(), control))
        })
    }

    /// Iterates live controls mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ControlId, &mut Control)> + '_ {
        self.slots.iter_mut().filter_map(|slot| {
            let control = slot.control.as_mut()?;
            Some((control.id(), control))
        })
    }
}
