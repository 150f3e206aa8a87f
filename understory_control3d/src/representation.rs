// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The externally built visual representation of a control.

use glam::Vec3;

/// A control's visual node in the host scene (typically a mesh).
///
/// Controls create their representation lazily through
/// [`Control::prepare`](crate::control::Control::prepare) and own it until they
/// are disposed. Position and scaling have no storage on the control itself;
/// they live here.
pub trait Representation {
    /// Shows or hides the node.
    fn set_visible(&mut self, visible: bool);

    /// World-space position of the node.
    fn position(&self) -> Vec3;

    /// Moves the node.
    fn set_position(&mut self, position: Vec3);

    /// Scaling of the node.
    fn scaling(&self) -> Vec3;

    /// Rescales the node.
    fn set_scaling(&mut self, scaling: Vec3);

    /// Releases host resources. Called once, when the owning control is disposed.
    fn dispose(&mut self) {}
}
