// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-level owner of controls and pointer memory.
//!
//! [`ControlManager`] is what a scene integration usually holds. Feed it one
//! [`PointerInput`] per picked pointer event through
//! [`ControlManager::handle_pointer`]; it routes hits through
//! [`process_raw_event`] and turns misses into pointer-out handling.

use glam::Vec3;

use crate::arena::ControlArena;
use crate::control::{Control, ControlBuilder};
use crate::observable::Observable;
use crate::pointer::PointerMemory;
use crate::router::process_raw_event;
use crate::types::{Button, ControlId, PointerEventKind, PointerId, PointerType, RawPointerEvent};

/// Result of picking the scene under a pointer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PickResult {
    /// Control owning the picked geometry, if the hit belongs to one.
    pub control: Option<ControlId>,
    /// Picked point in world space.
    pub point: Vec3,
}

/// One pointer event as seen by the host, after picking.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerInput {
    /// What happened.
    pub kind: PointerEventKind,
    /// Device that produced the event.
    pub pointer_id: PointerId,
    /// Button involved.
    pub button: Button,
    /// Kind of device.
    pub pointer_type: PointerType,
    /// What the pointer hit, `None` if it hit nothing.
    pub pick: Option<PickResult>,
}

impl PointerInput {
    /// A mouse-style input with the primary pointer and no pick.
    #[must_use]
    pub const fn new(kind: PointerEventKind) -> Self {
        Self {
            kind,
            pointer_id: PointerId::PRIMARY,
            button: Button::NONE,
            pointer_type: PointerType::Mouse,
            pick: None,
        }
    }

    /// Sets the pointer id.
    #[must_use]
    pub const fn with_pointer(mut self, pointer_id: PointerId, pointer_type: PointerType) -> Self {
        self.pointer_id = pointer_id;
        self.pointer_type = pointer_type;
        self
    }

    /// Sets the button.
    #[must_use]
    pub const fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    /// Records a hit at `point`, on `control` if the geometry belongs to one.
    #[must_use]
    pub const fn with_pick(mut self, control: Option<ControlId>, point: Vec3) -> Self {
        self.pick = Some(PickResult { control, point });
        self
    }
}

/// Owns controls, the shared pointer memory, and the picked-point channel.
#[derive(Debug, Default)]
pub struct ControlManager {
    controls: ControlArena,
    pointers: PointerMemory,
    /// Fires with the picked point on every handled input, `None` on a miss.
    pub on_picked_point_changed: Observable<Option<Vec3>>,
}

impl ControlManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a control from `builder` and returns its id.
    pub fn add(&mut self, builder: ControlBuilder) -> ControlId {
        let id = self.controls.insert_with(|id| builder.build(id));
        log::debug!("added {id:?}");
        id
    }

    /// Looks up a live control.
    #[must_use]
    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(id)
    }

    /// Looks up a live control mutably.
    pub fn control_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.controls.get_mut(id)
    }

    /// Returns `true` if `id` refers to a live control (disposed or not).
    #[must_use]
    pub fn contains(&self, id: ControlId) -> bool {
        self.controls.is_alive(id)
    }

    /// Number of live controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Returns `true` if the manager holds no control.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Iterates live controls.
    pub fn iter(&self) -> impl Iterator<Item = (ControlId, &Control)> + '_ {
        self.controls.iter()
    }

    /// Read access to the per-pointer memory.
    #[must_use]
    pub fn pointers(&self) -> &PointerMemory {
        &self.pointers
    }

    /// Routes an already resolved event. See [`process_raw_event`].
    pub fn process_raw_event(&mut self, target: ControlId, event: RawPointerEvent) -> bool {
        process_raw_event(&mut self.controls, &mut self.pointers, target, event)
    }

    /// Handles one picked pointer event.
    ///
    /// - A miss fires out on whatever the pointer was over and, on `Up`, also
    ///   releases whatever it pressed. The picked point is reported as `None`
    ///   and `false` is returned.
    /// - A hit reports the picked point and, when the hit belongs to a control,
    ///   routes the event through it. A move over background geometry, or one
    ///   refused by the router, is treated as leaving the previous control.
    /// - After an `Up`, any press still remembered for the pointer is released.
    ///   Touch contacts also leave their control, since a lifted finger hovers
    ///   nothing.
    pub fn handle_pointer(&mut self, input: &PointerInput) -> bool {
        let pointer = input.pointer_id;
        let Some(pick) = input.pick else {
            self.pointer_out(pointer);
            if input.kind == PointerEventKind::Up {
                self.release_pressed(pointer);
            }
            self.on_picked_point_changed.notify(&None);
            return false;
        };

        self.on_picked_point_changed.notify(&Some(pick.point));
        if let Some(target) = pick.control {
            let event = RawPointerEvent::new(input.kind, pick.point, pointer, input.button);
            let routed = self.process_raw_event(target, event);
            if !routed && input.kind == PointerEventKind::Move {
                self.pointer_out(pointer);
            }
        } else if input.kind == PointerEventKind::Move {
            self.pointer_out(pointer);
        }

        if input.kind == PointerEventKind::Up {
            self.release_pressed(pointer);
            if input.pointer_type == PointerType::Touch {
                self.pointer_out(pointer);
            }
        }
        true
    }

    /// Releases whatever `pointer` pressed and forgets the press.
    ///
    /// Returns `true` if a press was remembered for the pointer.
    pub fn force_pointer_up(&mut self, pointer: PointerId) -> bool {
        let Some(pressed) = self.pointers.take_down(pointer) else {
            return false;
        };
        if let Some(control) = self.live_mut(pressed) {
            control.force_pointer_up(Some(pointer));
        }
        true
    }

    /// Disposes the control and scrubs it from pointer memory.
    ///
    /// Returns `false` if `id` is stale or already disposed.
    pub fn dispose_control(&mut self, id: ControlId) -> bool {
        let Some(control) = self.live_mut(id) else {
            log::warn!("cannot dispose stale or disposed {id:?}");
            return false;
        };
        control.dispose();
        self.pointers.forget(id);
        true
    }

    /// Disposes the control if needed, then frees its slot.
    pub fn remove_control(&mut self, id: ControlId) -> Option<Control> {
        let mut control = self.controls.remove(id)?;
        control.dispose();
        self.pointers.forget(id);
        Some(control)
    }

    /// Disposes every control and clears pointer memory and observers.
    pub fn dispose(&mut self) {
        for (_, control) in self.controls.iter_mut() {
            control.dispose();
        }
        self.pointers.clear();
        self.on_picked_point_changed.clear();
        log::debug!("disposed manager with {} controls", self.controls.len());
    }

    fn live_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.controls.get_mut(id).filter(|c| !c.is_disposed())
    }

    fn pointer_out(&mut self, pointer: PointerId) {
        if let Some(over) = self.pointers.take_over(pointer)
            && let Some(control) = self.live_mut(over)
        {
            log::trace!("{pointer:?} left {over:?}");
            control.on_pointer_out(over);
        }
    }

    fn release_pressed(&mut self, pointer: PointerId) {
        if let Some(pressed) = self.pointers.take_down(pointer)
            && let Some(control) = self.live_mut(pressed)
        {
            log::debug!("releasing {pointer:?} left pressed on {pressed:?}");
            control.force_pointer_up(None);
        }
    }
}
