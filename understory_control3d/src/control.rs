// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control: one interactive node and its pointer state machine.
//!
//! A [`Control`] collapses any number of pointer interactions into a single
//! logical hover and a single logical press:
//!
//! - `enter_count` guards hover: [`Control::on_pointer_enter`] only fires while it is zero,
//!   and [`Control::on_pointer_out`] resets it to zero.
//! - `down_count` guards press the same way through [`Control::on_pointer_down`] and
//!   [`Control::on_pointer_up`].
//!
//! Out and up reset the counters rather than decrementing them. Duplicate
//! transitions are not errors: the guarded calls return `false` and fire nothing.
//!
//! Every transition is broadcast on the control's [`ControlChannels`] and then
//! runs the matching optional [`AnimationHooks`] entry.
//!
//! These primitives are usually driven by
//! [`router::process_raw_event`](crate::router::process_raw_event), which pairs
//! enter/out across controls and sends releases to the control that was pressed.
//!
//! ## Minimal example
//!
//! ```
//! use understory_control3d::{ControlBuilder, ControlManager};
//!
//! let mut manager = ControlManager::new();
//! let id = manager.add(ControlBuilder::new().name("knob"));
//! let knob = manager.control_mut(id).unwrap();
//!
//! assert!(knob.on_pointer_enter(id));
//! assert!(!knob.on_pointer_enter(id)); // already hovered
//! knob.on_pointer_out(id);
//! assert!(!knob.is_hovered());
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use glam::Vec3;
use smallvec::SmallVec;

use crate::behavior::{BehaviorInitError, BehaviorRef, Behaviors, SceneLoad};
use crate::observable::{EventState, Observable};
use crate::representation::Representation;
use crate::types::{Button, ControlFlags, ControlId, PointerId, PointerPoint};

/// Hook run after a transition, typically to start an animation.
pub type AnimationHook = Box<dyn FnMut()>;

/// The six notification channels of a control.
#[derive(Debug, Default)]
pub struct ControlChannels {
    /// Pointer moved over the control. Payload: picked point.
    pub pointer_move: Observable<Vec3>,
    /// Pointer left the control. Payload: the control itself.
    pub pointer_out: Observable<ControlId>,
    /// Control was pressed.
    pub pointer_down: Observable<PointerPoint>,
    /// Control was released.
    pub pointer_up: Observable<PointerPoint>,
    /// Control was released while hovered. Fires before `pointer_up`.
    pub pointer_click: Observable<PointerPoint>,
    /// Pointer entered the control. Payload: the control itself.
    pub pointer_enter: Observable<ControlId>,
}

impl ControlChannels {
    /// Removes every observer from every channel.
    pub fn clear(&mut self) {
        self.pointer_move.clear();
        self.pointer_out.clear();
        self.pointer_down.clear();
        self.pointer_up.clear();
        self.pointer_click.clear();
        self.pointer_enter.clear();
    }

    /// Returns `true` if no channel has an observer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pointer_move.is_empty()
            && self.pointer_out.is_empty()
            && self.pointer_down.is_empty()
            && self.pointer_up.is_empty()
            && self.pointer_click.is_empty()
            && self.pointer_enter.is_empty()
    }
}

/// Optional hooks run on state transitions.
#[derive(Default)]
pub struct AnimationHooks {
    /// Runs after a successful enter.
    pub enter: Option<AnimationHook>,
    /// Runs after every out.
    pub out: Option<AnimationHook>,
    /// Runs after a successful down.
    pub down: Option<AnimationHook>,
    /// Runs after every up.
    pub up: Option<AnimationHook>,
}

// Manual Debug impl since callbacks aren't Debug
impl fmt::Debug for AnimationHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHooks")
            .field("has_enter", &self.enter.is_some())
            .field("has_out", &self.out.is_some())
            .field("has_down", &self.down.is_some())
            .field("has_up", &self.up.is_some())
            .finish()
    }
}

fn run_hook(hook: &mut Option<AnimationHook>) {
    if let Some(hook) = hook {
        hook();
    }
}

/// One interactive node in a 3D scene.
pub struct Control {
    id: ControlId,
    name: Option<String>,
    flags: ControlFlags,
    parent: Option<ControlId>,
    representation: Option<Box<dyn Representation>>,
    enter_count: u32,
    down_count: u32,
    down_pointer_ids: SmallVec<[PointerId; 4]>,
    behaviors: Behaviors,
    channels: ControlChannels,
    animations: AnimationHooks,
}

impl Control {
    pub(crate) fn new(id: ControlId) -> Self {
        Self {
            id,
            name: None,
            flags: ControlFlags::default(),
            parent: None,
            representation: None,
            enter_count: 0,
            down_count: 0,
            down_pointer_ids: SmallVec::new(),
            behaviors: Behaviors::new(),
            channels: ControlChannels::default(),
            animations: AnimationHooks::default(),
        }
    }

    /// This control's id.
    #[must_use]
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// Optional, non-unique name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Renames the control.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Current flags.
    #[must_use]
    pub fn flags(&self) -> ControlFlags {
        self.flags
    }

    /// Containing node, if any. The container owns layout; this is only a back-reference.
    #[must_use]
    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    /// Sets or clears the containing node.
    pub fn set_parent(&mut self, parent: Option<ControlId>) {
        self.parent = parent;
    }

    /// Returns `true` if the control is visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ControlFlags::VISIBLE)
    }

    /// Shows or hides the control, forwarding to its representation if there is one.
    pub fn set_visible(&mut self, visible: bool) {
        if self.is_visible() == visible {
            return;
        }
        self.flags.set(ControlFlags::VISIBLE, visible);
        if let Some(representation) = &mut self.representation {
            representation.set_visible(visible);
        }
    }

    /// Returns `true` once [`Control::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.flags.contains(ControlFlags::DISPOSED)
    }

    /// Position of the representation, or [`Vec3::ZERO`] without one.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.representation
            .as_ref()
            .map_or(Vec3::ZERO, |r| r.position())
    }

    /// Moves the representation. Does nothing without one.
    pub fn set_position(&mut self, position: Vec3) {
        if let Some(representation) = &mut self.representation {
            representation.set_position(position);
        }
    }

    /// Scaling of the representation, or [`Vec3::ONE`] without one.
    #[must_use]
    pub fn scaling(&self) -> Vec3 {
        self.representation
            .as_ref()
            .map_or(Vec3::ONE, |r| r.scaling())
    }

    /// Rescales the representation. Does nothing without one.
    pub fn set_scaling(&mut self, scaling: Vec3) {
        if let Some(representation) = &mut self.representation {
            representation.set_scaling(scaling);
        }
    }

    /// Creates the representation on first call.
    ///
    /// `create` runs only when no representation exists yet and the control
    /// has not been disposed; it may decline by returning `None`. The new
    /// representation receives the control's current visibility.
    ///
    /// Returns `true` if a representation was created.
    pub fn prepare<F>(&mut self, create: F) -> bool
    where
        F: FnOnce(&Self) -> Option<Box<dyn Representation>>,
    {
        if self.representation.is_some() || self.is_disposed() {
            return false;
        }
        let Some(mut representation) = create(self) else {
            return false;
        };
        representation.set_visible(self.is_visible());
        self.representation = Some(representation);
        log::debug!("prepared representation for {:?}", self.id);
        true
    }

    /// The representation, once prepared.
    #[must_use]
    pub fn representation(&self) -> Option<&(dyn Representation + 'static)> {
        self.representation.as_deref()
    }

    /// The representation, once prepared.
    pub fn representation_mut(&mut self) -> Option<&mut (dyn Representation + 'static)> {
        self.representation.as_deref_mut()
    }

    /// Notification channels.
    #[must_use]
    pub fn channels(&self) -> &ControlChannels {
        &self.channels
    }

    /// Notification channels, for adding and removing observers.
    pub fn channels_mut(&mut self) -> &mut ControlChannels {
        &mut self.channels
    }

    /// Transition hooks.
    #[must_use]
    pub fn animations(&self) -> &AnimationHooks {
        &self.animations
    }

    /// Transition hooks, for setting or clearing them.
    pub fn animations_mut(&mut self) -> &mut AnimationHooks {
        &mut self.animations
    }

    /// Hover guard. Non-zero while hovered by at least one pointer.
    #[must_use]
    pub fn enter_count(&self) -> u32 {
        self.enter_count
    }

    /// Press guard. Non-zero while pressed.
    #[must_use]
    pub fn down_count(&self) -> u32 {
        self.down_count
    }

    /// Returns `true` while hovered.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.enter_count > 0
    }

    /// Returns `true` while pressed.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.down_count > 0
    }

    /// Pointers whose press on this control has not been released.
    #[must_use]
    pub fn down_pointer_ids(&self) -> &[PointerId] {
        &self.down_pointer_ids
    }

    /// Returns `true` if `pointer` is holding this control down.
    #[must_use]
    pub fn is_pointer_down(&self, pointer: PointerId) -> bool {
        self.down_pointer_ids.contains(&pointer)
    }

    /// Fires `pointer_move` with `point`. Counters are unchanged.
    pub fn on_pointer_move(&mut self, source: ControlId, point: Vec3) {
        self.channels
            .pointer_move
            .notify_with(&point, EventState::new(source, self.id));
    }

    /// Enters the hover state.
    ///
    /// Returns `false` and fires nothing if already hovered.
    pub fn on_pointer_enter(&mut self, source: ControlId) -> bool {
        if self.enter_count != 0 {
            return false;
        }
        self.enter_count = self.enter_count.saturating_add(1);
        log::trace!("pointer enter on {:?} from {source:?}", self.id);

        let id = self.id;
        self.channels
            .pointer_enter
            .notify_with(&id, EventState::new(source, id));
        run_hook(&mut self.animations.enter);
        true
    }

    /// Leaves the hover state, however many enters preceded it.
    pub fn on_pointer_out(&mut self, source: ControlId) {
        self.enter_count = 0;
        log::trace!("pointer out on {:?} from {source:?}", self.id);

        let id = self.id;
        self.channels
            .pointer_out
            .notify_with(&id, EventState::new(source, id));
        run_hook(&mut self.animations.out);
    }

    /// Enters the pressed state for `pointer`.
    ///
    /// Returns `false` and fires nothing if already pressed; in that case
    /// `pointer` is not recorded.
    pub fn on_pointer_down(
        &mut self,
        source: ControlId,
        point: Vec3,
        pointer: PointerId,
        button: Button,
    ) -> bool {
        if self.down_count != 0 {
            return false;
        }
        self.down_count = self.down_count.saturating_add(1);
        if !self.down_pointer_ids.contains(&pointer) {
            self.down_pointer_ids.push(pointer);
        }
        log::trace!("pointer down on {:?} by {pointer:?}", self.id);

        self.channels.pointer_down.notify_with(
            &PointerPoint::new(point, button),
            EventState::new(source, self.id),
        );
        run_hook(&mut self.animations.down);
        true
    }

    /// Leaves the pressed state and releases `pointer`.
    ///
    /// The press guard is cleared for the whole control, not just `pointer`.
    /// When `notify_click` is set and the control is hovered, `pointer_click`
    /// fires before `pointer_up`.
    pub fn on_pointer_up(
        &mut self,
        source: ControlId,
        point: Vec3,
        pointer: PointerId,
        button: Button,
        notify_click: bool,
    ) {
        self.down_count = 0;
        self.down_pointer_ids.retain(|p| *p != pointer);
        log::trace!("pointer up on {:?} by {pointer:?}", self.id);

        let payload = PointerPoint::new(point, button);
        let state = EventState::new(source, self.id);
        if notify_click && self.enter_count > 0 {
            self.channels.pointer_click.notify_with(&payload, state);
        }
        self.channels.pointer_up.notify_with(&payload, state);
        run_hook(&mut self.animations.up);
    }

    /// Releases stuck presses, for example after a focus loss.
    ///
    /// With `Some(pointer)`, releases that pointer if it is holding the control
    /// down; otherwise nothing fires. With `None`, releases every pointer
    /// currently down. Releases happen at [`Vec3::ZERO`] with the primary
    /// button and may click.
    ///
    /// Returns how many pointers were released.
    pub fn force_pointer_up(&mut self, pointer: Option<PointerId>) -> usize {
        let released: SmallVec<[PointerId; 4]> = match pointer {
            Some(pointer) if self.is_pointer_down(pointer) => SmallVec::from_slice(&[pointer]),
            Some(_) => SmallVec::new(),
            None => self.down_pointer_ids.clone(),
        };
        if !released.is_empty() {
            log::debug!("forcing release of {released:?} on {:?}", self.id);
        }
        for &pointer in &released {
            self.on_pointer_up(self.id, Vec3::ZERO, pointer, Button::PRIMARY, true);
        }
        released.len()
    }

    /// Initializes and attaches `behavior`, deferring the attach while `scene` loads.
    ///
    /// Returns `Ok(false)` if the behavior is already attached or the control
    /// was disposed. See [`Behaviors::add`].
    pub fn add_behavior<S>(
        &mut self,
        behavior: BehaviorRef,
        scene: &mut S,
    ) -> Result<bool, BehaviorInitError>
    where
        S: SceneLoad + ?Sized,
    {
        if self.is_disposed() {
            log::warn!("refusing to add a behavior to disposed {:?}", self.id);
            return Ok(false);
        }
        self.behaviors.add(self.id, behavior, scene)
    }

    /// Detaches and removes `behavior`. Returns `false` if it was not present.
    pub fn remove_behavior(&mut self, behavior: &BehaviorRef) -> bool {
        self.behaviors.remove(behavior)
    }

    /// First behavior named `name`, in insertion order.
    #[must_use]
    pub fn behavior_by_name(&self, name: &str) -> Option<&BehaviorRef> {
        self.behaviors.by_name(name)
    }

    /// Attached behaviors, in insertion order.
    #[must_use]
    pub fn behaviors(&self) -> &Behaviors {
        &self.behaviors
    }

    /// Tears the control down.
    ///
    /// Clears every channel, drops the animation hooks, destroys the
    /// representation, and detaches every behavior. Behaviors stay in the
    /// list. Disposing twice does nothing.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.flags.insert(ControlFlags::DISPOSED);
        self.channels.clear();
        self.animations = AnimationHooks::default();
        if let Some(mut representation) = self.representation.take() {
            representation.dispose();
        }
        self.behaviors.detach_all();
        log::debug!("disposed {:?}", self.id);
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("parent", &self.parent)
            .field("has_representation", &self.representation.is_some())
            .field("enter_count", &self.enter_count)
            .field("down_count", &self.down_count)
            .field("down_pointer_ids", &self.down_pointer_ids)
            .field("behaviors", &self.behaviors)
            .field("channels", &self.channels)
            .field("animations", &self.animations)
            .finish()
    }
}

/// Builder for a [`Control`], consumed by
/// [`ControlManager::add`](crate::manager::ControlManager::add).
///
/// # Example
///
/// ```rust
/// use understory_control3d::{ControlBuilder, ControlManager};
///
/// let mut manager = ControlManager::new();
/// let id = manager.add(
///     ControlBuilder::new()
///         .name("slider")
///         .visible(false)
///         .on_enter(|| { /* start highlight */ }),
/// );
///
/// let slider = manager.control(id).unwrap();
/// assert_eq!(slider.name(), Some("slider"));
/// assert!(!slider.is_visible());
/// assert!(slider.animations().enter.is_some());
/// ```
#[derive(Debug)]
pub struct ControlBuilder {
    name: Option<String>,
    visible: bool,
    parent: Option<ControlId>,
    animations: AnimationHooks,
}

impl Default for ControlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlBuilder {
    /// A visible, unnamed control without parent or hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            visible: true,
            parent: None,
            animations: AnimationHooks::default(),
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the initial visibility.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the containing node.
    #[must_use]
    pub fn parent(mut self, parent: ControlId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the hook run after a successful enter.
    #[must_use]
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.animations.enter = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after every out.
    #[must_use]
    pub fn on_out<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.animations.out = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after a successful down.
    #[must_use]
    pub fn on_down<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.animations.down = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after every up.
    #[must_use]
    pub fn on_up<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.animations.up = Some(Box::new(hook));
        self
    }

    pub(crate) fn build(self, id: ControlId) -> Control {
        let mut control = Control::new(id);
        control.name = self.name;
        control.flags.set(ControlFlags::VISIBLE, self.visible);
        control.parent = self.parent;
        control.animations = self.animations;
        control
    }
}
