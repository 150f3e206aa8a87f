// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pointer memory shared between controls.
//!
//! [`PointerMemory`] remembers, for each pointer id, the last control the
//! pointer was over and the last control it pressed, plus the last picked
//! control overall. It is owned by the manager and only mutated by routing
//! code; controls never touch it directly.

use hashbrown::HashMap;

use crate::types::{ControlId, PointerId};

/// Per-pointer "last over" / "last down" bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct PointerMemory {
    last_over: HashMap<PointerId, ControlId>,
    last_down: HashMap<PointerId, ControlId>,
    last_picked: Option<ControlId>,
}

impl PointerMemory {
    /// Creates empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The control `pointer` was last over, if any.
    #[must_use]
    pub fn last_control_over(&self, pointer: PointerId) -> Option<ControlId> {
        self.last_over.get(&pointer).copied()
    }

    /// The control `pointer` last pressed and has not released yet, if any.
    #[must_use]
    pub fn last_control_down(&self, pointer: PointerId) -> Option<ControlId> {
        self.last_down.get(&pointer).copied()
    }

    /// The control most recently pressed by any pointer.
    #[must_use]
    pub fn last_picked_control(&self) -> Option<ControlId> {
        self.last_picked
    }

    /// Returns `true` if no pointer is over or pressing any control.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_over.is_empty() && self.last_down.is_empty()
    }

    pub(crate) fn set_over(&mut self, pointer: PointerId, control: ControlId) {
        self.last_over.insert(pointer, control);
    }

    pub(crate) fn take_over(&mut self, pointer: PointerId) -> Option<ControlId> {
        self.last_over.remove(&pointer)
    }

    pub(crate) fn set_down(&mut self, pointer: PointerId, control: ControlId) {
        self.last_down.insert(pointer, control);
    }

    pub(crate) fn take_down(&mut self, pointer: PointerId) -> Option<ControlId> {
        self.last_down.remove(&pointer)
    }

    pub(crate) fn set_picked(&mut self, control: ControlId) {
        self.last_picked = Some(control);
    }

    /// Drops every reference to `control`.
    pub(crate) fn forget(&mut self, control: ControlId) {
        self.last_over.retain(|_, c| *c != control);
        self.last_down.retain(|_, c| *c != control);
        if self.last_picked == Some(control) {
            self.last_picked = None;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.last_over.clear();
        self.last_down.clear();
        self.last_picked = None;
    }
}
