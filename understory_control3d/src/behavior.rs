// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attachable behaviors and their lifecycle on a control.
//!
//! A [`Behavior`] is an opaque capability with an `init → attach → detach`
//! lifecycle. Controls keep them in a [`Behaviors`] list: ordered, without
//! duplicates (by `Rc` identity), each one attachable and detachable on its own.
//!
//! Attachment waits for the owning scene to finish loading. The scene is a host
//! capability, [`SceneLoad`]; [`LoadGate`] is a ready-made one-shot
//! implementation.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_control3d::behavior::{Behavior, BehaviorRef, LoadGate};
//! use understory_control3d::{ControlBuilder, ControlId, ControlManager};
//!
//! #[derive(Default)]
//! struct Highlight { attached_to: Option<ControlId> }
//!
//! impl Behavior for Highlight {
//!     fn name(&self) -> &str { "highlight" }
//!     fn attach(&mut self, owner: ControlId) { self.attached_to = Some(owner); }
//!     fn detach(&mut self) { self.attached_to = None; }
//! }
//!
//! let mut manager = ControlManager::new();
//! let button = manager.add(ControlBuilder::new().name("button"));
//!
//! let mut scene = LoadGate::loading();
//! let highlight = Rc::new(RefCell::new(Highlight::default()));
//! let handle: BehaviorRef = highlight.clone();
//!
//! let control = manager.control_mut(button).unwrap();
//! assert_eq!(control.add_behavior(handle, &mut scene), Ok(true));
//! assert_eq!(highlight.borrow().attached_to, None);
//!
//! scene.complete();
//! assert_eq!(highlight.borrow().attached_to, Some(button));
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::types::ControlId;

/// An attachable capability with an independent lifecycle.
pub trait Behavior {
    /// Name used by [`Behaviors::by_name`]. Names need not be unique.
    fn name(&self) -> &str;

    /// Prepares the behavior before its first attachment.
    ///
    /// A behavior whose init fails is not added.
    fn init(&mut self) -> Result<(), BehaviorInitError> {
        Ok(())
    }

    /// Attaches the behavior to `owner`.
    fn attach(&mut self, owner: ControlId);

    /// Detaches the behavior from its owner.
    fn detach(&mut self);
}

/// Shared handle to a behavior. Identity is the allocation, see [`Rc::ptr_eq`].
pub type BehaviorRef = Rc<RefCell<dyn Behavior>>;

/// Error returned when [`Behavior::init`] refuses to initialize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BehaviorInitError {
    /// Name of the behavior that failed.
    pub behavior: String,
    /// Why initialization failed.
    pub reason: String,
}

impl BehaviorInitError {
    /// Creates an error for `behavior`.
    #[must_use]
    pub fn new(behavior: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            behavior: behavior.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for BehaviorInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "behavior `{}` failed to initialize: {}",
            self.behavior, self.reason
        )
    }
}

impl core::error::Error for BehaviorInitError {}

/// Host capability reporting whether the owning scene is still loading.
pub trait SceneLoad {
    /// Returns `true` while the scene is loading.
    fn is_loading(&self) -> bool;

    /// Registers `callback` to run once when loading completes.
    fn on_load_complete(&mut self, callback: Box<dyn FnOnce()>);
}

/// A one-shot load signal.
///
/// Callbacks registered through [`SceneLoad::on_load_complete`] are held until
/// [`LoadGate::complete`], which runs each exactly once. Completing again runs
/// nothing unless new callbacks were registered in between.
#[derive(Default)]
pub struct LoadGate {
    loading: bool,
    pending: Vec<Box<dyn FnOnce()>>,
}

impl LoadGate {
    /// A gate for a scene that has already loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate for a scene that is still loading.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            loading: true,
            pending: Vec::new(),
        }
    }

    /// Marks the scene as loading again.
    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Marks loading as complete and runs every pending callback once.
    ///
    /// Returns how many callbacks ran.
    pub fn complete(&mut self) -> usize {
        self.loading = false;
        let pending = core::mem::take(&mut self.pending);
        let count = pending.len();
        for callback in pending {
            callback();
        }
        count
    }

    /// Number of callbacks waiting for completion.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl SceneLoad for LoadGate {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn on_load_complete(&mut self, callback: Box<dyn FnOnce()>) {
        self.pending.push(callback);
    }
}

// Manual Debug impl since callbacks aren't Debug
impl fmt::Debug for LoadGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadGate")
            .field("loading", &self.loading)
            .field("pending", &self.pending.len())
            .finish()
    }
}

struct Entry {
    behavior: BehaviorRef,
    // Armed while a deferred attach is outstanding; disarming cancels it.
    pending: Option<Rc<Cell<bool>>>,
}

impl Entry {
    fn cancel_pending(&self) {
        if let Some(armed) = &self.pending {
            armed.set(false);
        }
    }
}

/// Ordered, duplicate-free list of behaviors attached to one owner.
#[derive(Default)]
pub struct Behaviors {
    entries: Vec<Entry>,
}

impl Behaviors {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of behaviors in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if this exact behavior is in the list.
    #[must_use]
    pub fn contains(&self, behavior: &BehaviorRef) -> bool {
        self.position_of(behavior).is_some()
    }

    /// Iterates the behaviors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BehaviorRef> + '_ {
        self.entries.iter().map(|e| &e.behavior)
    }

    /// Returns the first behavior named `name`, in insertion order.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&BehaviorRef> {
        self.iter()
            .find(|b| b.try_borrow().is_ok_and(|b| b.name() == name))
    }

    /// Initializes and attaches `behavior` to `owner`, unless it is already present.
    ///
    /// While `scene` is loading, attachment is deferred until load completes.
    /// The deferred attach runs at most once. It is cancelled if the behavior is
    /// removed or detached before then, or if the list itself is dropped.
    ///
    /// Returns `Ok(false)` for a behavior already in the list. On init failure
    /// the list is unchanged.
    pub fn add<S>(
        &mut self,
        owner: ControlId,
        behavior: BehaviorRef,
        scene: &mut S,
    ) -> Result<bool, BehaviorInitError>
    where
        S: SceneLoad + ?Sized,
    {
        if self.contains(&behavior) {
            return Ok(false);
        }

        behavior.borrow_mut().init()?;

        let pending = if scene.is_loading() {
            let armed = Rc::new(Cell::new(true));
            let token = armed.clone();
            let deferred = behavior.clone();
            log::debug!("deferring behavior attach to {owner:?} until scene load completes");
            scene.on_load_complete(Box::new(move || {
                if token.replace(false) {
                    deferred.borrow_mut().attach(owner);
                }
            }));
            Some(armed)
        } else {
            behavior.borrow_mut().attach(owner);
            None
        };

        self.entries.push(Entry { behavior, pending });
        Ok(true)
    }

    /// Detaches and removes `behavior`. Returns `false` if it was not present.
    pub fn remove(&mut self, behavior: &BehaviorRef) -> bool {
        let Some(idx) = self.position_of(behavior) else {
            return false;
        };
        let entry = self.entries.remove(idx);
        entry.cancel_pending();
        entry.behavior.borrow_mut().detach();
        true
    }

    /// Detaches every behavior, keeping them in the list.
    pub fn detach_all(&mut self) {
        for entry in &self.entries {
            entry.cancel_pending();
            entry.behavior.borrow_mut().detach();
        }
    }

    fn position_of(&self, behavior: &BehaviorRef) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| Rc::ptr_eq(&e.behavior, behavior))
    }
}

// A deferred attach must not outlive its owner.
impl Drop for Behaviors {
    fn drop(&mut self) {
        for entry in &self.entries {
            entry.cancel_pending();
        }
    }
}

impl fmt::Debug for Behaviors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for entry in &self.entries {
            match entry.behavior.try_borrow() {
                Ok(b) => list.entry(&b.name()),
                Err(_) => list.entry(&"<borrowed>"),
            };
        }
        list.finish()
    }
}
