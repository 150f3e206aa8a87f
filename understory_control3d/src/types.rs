// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: control and pointer identifiers, event kinds, and payloads.

use glam::Vec3;

/// Identifier for a control owned by a [`ControlArena`](crate::arena::ControlArena).
///
/// This is a small, copyable handle that stays stable for the lifetime of the
/// control but becomes invalid once the control is removed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `ControlId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ControlId`.
///
/// Stale ids never alias a different live control because the generation must match.
///
/// ### Notes
///
/// - The generation increments on slot reuse and never decreases.
/// - `u32` is ample for practical lifetimes; behavior on generation overflow is unspecified.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ControlId(pub(crate) u32, pub(crate) u32);

impl ControlId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// Identifier of a pointer device (mouse, a touch contact, a pen, a tracked controller).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PointerId(pub u32);

impl PointerId {
    /// The primary pointer (mouse, or the first touch contact).
    pub const PRIMARY: Self = Self(0);
}

/// Index of the button involved in a pointer event.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Button(pub i16);

impl Button {
    /// No button (for example a pure move).
    pub const NONE: Self = Self(-1);
    /// Main button, usually the left mouse button or a touch contact.
    pub const PRIMARY: Self = Self(0);
    /// Auxiliary button, usually the wheel.
    pub const AUXILIARY: Self = Self(1);
    /// Secondary button, usually the right mouse button.
    pub const SECONDARY: Self = Self(2);
}

/// Kind of a raw pointer event delivered by the host.
///
/// Only [`Move`](Self::Move), [`Down`](Self::Down) and [`Up`](Self::Up) are
/// routed to controls; everything else is reported as unhandled.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerEventKind {
    /// A button was pressed.
    Down,
    /// A button was released.
    Up,
    /// The pointer moved.
    Move,
    /// Wheel or scroll input.
    Wheel,
    /// A pick without press (host specific).
    Pick,
    /// A tap gesture.
    Tap,
    /// A double-tap gesture.
    DoubleTap,
}

/// Kind of device producing pointer events.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PointerType {
    /// A mouse.
    #[default]
    Mouse,
    /// A pen or stylus.
    Pen,
    /// A touch contact. Touch pointers leave their control when lifted.
    Touch,
}

/// Payload of down, up and click notifications: where, and with which button.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerPoint {
    /// Picked point in world space.
    pub position: Vec3,
    /// Button involved in the transition.
    pub button: Button,
}

impl PointerPoint {
    /// Bundles a position with a button index.
    #[must_use]
    pub const fn new(position: Vec3, button: Button) -> Self {
        Self { position, button }
    }
}

/// A raw pointer event already resolved against a target control.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawPointerEvent {
    /// What happened.
    pub kind: PointerEventKind,
    /// Picked point in world space.
    pub point: Vec3,
    /// Device that produced the event.
    pub pointer_id: PointerId,
    /// Button involved, [`Button::NONE`] for moves.
    pub button: Button,
}

impl RawPointerEvent {
    /// Creates a raw event.
    #[must_use]
    pub const fn new(
        kind: PointerEventKind,
        point: Vec3,
        pointer_id: PointerId,
        button: Button,
    ) -> Self {
        Self {
            kind,
            point,
            pointer_id,
            button,
        }
    }

    /// A move of `pointer_id` to `point`.
    #[must_use]
    pub const fn moved(point: Vec3, pointer_id: PointerId) -> Self {
        Self::new(PointerEventKind::Move, point, pointer_id, Button::NONE)
    }

    /// A press of `button` by `pointer_id` at `point`.
    #[must_use]
    pub const fn down(point: Vec3, pointer_id: PointerId, button: Button) -> Self {
        Self::new(PointerEventKind::Down, point, pointer_id, button)
    }

    /// A release of `button` by `pointer_id` at `point`.
    #[must_use]
    pub const fn up(point: Vec3, pointer_id: PointerId, button: Button) -> Self {
        Self::new(PointerEventKind::Up, point, pointer_id, button)
    }
}

bitflags::bitflags! {
    /// Control flags tracking visibility and lifecycle.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ControlFlags: u8 {
        /// Control is visible; forwarded to its representation.
        const VISIBLE  = 0b0000_0001;
        /// Control was disposed and no longer accepts routed events.
        const DISPOSED = 0b0000_0010;
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}
