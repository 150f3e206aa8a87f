// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_control3d --heading-base-level=0

//! Understory Control3D: pointer interaction state for controls in a 3D scene.
//!
//! This crate turns a stream of raw pointer events, already resolved against
//! a picked control, into hover, press, release and click transitions on
//! interactive scene nodes ("controls"). It does not pick, render or animate;
//! the host does that and feeds the results in.
//!
//! - [`control`]: the per-control state machine, its notification channels and
//!   animation hooks.
//! - [`router`]: [`process_raw_event`](router::process_raw_event), pairing
//!   out/enter across controls and sending releases to the pressed control.
//! - [`pointer`]: per-pointer "last over" / "last down" memory.
//! - [`manager`]: [`ControlManager`], the host-facing owner of all of the above.
//! - [`behavior`]: attachable behaviors whose attach waits for scene load.
//! - [`observable`]: the multicast channel type used for notifications.
//! - [`representation`]: the trait a control's visual node implements.
//!
//! ## Design
//!
//! A control collapses any number of concurrent pointer interactions into one
//! logical hover and one logical press. Repeated enters and downs are
//! swallowed; out and up reset the state outright. Controls live in a
//! generational [`arena`], so an id held by the host or by pointer memory can
//! go stale but never aliases another control.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use glam::Vec3;
//! use understory_control3d::{
//!     Button, ControlBuilder, ControlManager, PointerEventKind, PointerId, PointerInput,
//! };
//!
//! let mut manager = ControlManager::new();
//! let clicks = Rc::new(Cell::new(0));
//! let button = manager.add(ControlBuilder::new().name("button"));
//! let counter = clicks.clone();
//! manager
//!     .control_mut(button)
//!     .unwrap()
//!     .channels_mut()
//!     .pointer_click
//!     .add(move |_, _| counter.set(counter.get() + 1));
//!
//! let at = |kind| {
//!     PointerInput::new(kind)
//!         .with_button(Button::PRIMARY)
//!         .with_pick(Some(button), Vec3::ZERO)
//! };
//! manager.handle_pointer(&at(PointerEventKind::Move));
//! manager.handle_pointer(&at(PointerEventKind::Down));
//! manager.handle_pointer(&at(PointerEventKind::Up));
//!
//! assert_eq!(clicks.get(), 1);
//! assert_eq!(manager.pointers().last_picked_control(), Some(button));
//! assert_eq!(manager.pointers().last_control_down(PointerId::PRIMARY), None);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `glam/std`.
//! - `libm`: forwards to `glam/libm` for `no_std` targets.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod arena;
pub mod behavior;
pub mod control;
pub mod manager;
pub mod observable;
pub mod pointer;
pub mod representation;
pub mod router;
pub mod types;

pub use control::{AnimationHooks, Control, ControlBuilder, ControlChannels};
pub use manager::{ControlManager, PickResult, PointerInput};
pub use types::{
    Button, ControlFlags, ControlId, PointerEventKind, PointerId, PointerPoint, PointerType,
    RawPointerEvent,
};
