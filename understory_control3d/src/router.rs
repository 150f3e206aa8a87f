// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing entry point: turn one raw pointer event into control transitions.
//!
//! [`process_raw_event`] is the single function a host dispatch loop calls per
//! pointer event once picking has resolved a target control. It consults and
//! updates the shared [`PointerMemory`] so that:
//!
//! - moving from one control to another fires exactly one out on the old
//!   control and then one enter on the new one;
//! - a release is delivered to the control that was pressed, even when the
//!   pointer was dragged off it before releasing.
//!
//! | Kind | Effect |
//! |------|--------|
//! | `Move` | move on target; out on the previous control (if different); enter on target; target becomes last-over |
//! | `Down` | down on target; target becomes last-down and last-picked |
//! | `Up` | up (with click) on last-down, if any; last-down is forgotten |
//! | other | nothing, returns `false` |
//!
//! ## Minimal example
//!
//! ```
//! use glam::Vec3;
//! use understory_control3d::{ControlBuilder, ControlManager, PointerId, RawPointerEvent};
//!
//! let mut manager = ControlManager::new();
//! let a = manager.add(ControlBuilder::new().name("a"));
//! let b = manager.add(ControlBuilder::new().name("b"));
//! let p = PointerId::PRIMARY;
//!
//! manager.process_raw_event(a, RawPointerEvent::moved(Vec3::ZERO, p));
//! manager.process_raw_event(b, RawPointerEvent::moved(Vec3::X, p));
//!
//! assert!(!manager.control(a).unwrap().is_hovered());
//! assert!(manager.control(b).unwrap().is_hovered());
//! assert_eq!(manager.pointers().last_control_over(p), Some(b));
//! ```

use crate::arena::ControlArena;
use crate::control::Control;
use crate::pointer::PointerMemory;
use crate::types::{ControlId, PointerEventKind, RawPointerEvent};

/// Routes `event` through `target`, updating `pointers`.
///
/// Returns `true` if the event kind was handled. A move or press through a
/// stale or disposed `target` is refused: the function returns `false` and
/// leaves `pointers` untouched. A release only uses `target` as the source, so
/// it still reaches the pressed control. Stale or disposed controls remembered
/// in `pointers` receive nothing.
pub fn process_raw_event(
    controls: &mut ControlArena,
    pointers: &mut PointerMemory,
    target: ControlId,
    event: RawPointerEvent,
) -> bool {
    let pointer = event.pointer_id;

    match event.kind {
        PointerEventKind::Move | PointerEventKind::Down if !is_routable(controls, target) => {
            log::warn!("refusing to route {:?} to {target:?}", event.kind);
            false
        }
        PointerEventKind::Move => {
            if let Some(control) = controls.get_mut(target) {
                control.on_pointer_move(target, event.point);
            }
            let previous = pointers.last_control_over(pointer);
            if let Some(previous) = previous
                && previous != target
            {
                log::trace!("{pointer:?} moved from {previous:?} to {target:?}");
                if let Some(control) = live_mut(controls, previous) {
                    control.on_pointer_out(target);
                }
            }
            if previous != Some(target)
                && let Some(control) = controls.get_mut(target)
            {
                control.on_pointer_enter(target);
            }
            pointers.set_over(pointer, target);
            true
        }
        PointerEventKind::Down => {
            if let Some(control) = controls.get_mut(target) {
                control.on_pointer_down(target, event.point, pointer, event.button);
            }
            pointers.set_down(pointer, target);
            pointers.set_picked(target);
            true
        }
        PointerEventKind::Up => {
            if let Some(pressed) = pointers.take_down(pointer)
                && let Some(control) = live_mut(controls, pressed)
            {
                control.on_pointer_up(target, event.point, pointer, event.button, true);
            }
            true
        }
        PointerEventKind::Wheel
        | PointerEventKind::Pick
        | PointerEventKind::Tap
        | PointerEventKind::DoubleTap => false,
    }
}

fn is_routable(controls: &ControlArena, id: ControlId) -> bool {
    controls.get(id).is_some_and(|c| !c.is_disposed())
}

fn live_mut(controls: &mut ControlArena, id: ControlId) -> Option<&mut Control> {
    controls.get_mut(id).filter(|c| !c.is_disposed())
}
