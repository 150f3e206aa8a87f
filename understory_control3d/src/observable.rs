// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-subscriber notification channels.
//!
//! An [`Observable`] is a broadcast point: any number of observers can be added,
//! each one removed independently through its [`ObserverHandle`], and
//! [`Observable::clear`] drops them all without invoking any.
//!
//! Each notification carries a payload plus an [`EventState`] describing the
//! sender context. Observers run in registration order and may set
//! [`EventState::skip_next_observers`] to stop delivery to the remaining ones.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_control3d::observable::Observable;
//!
//! let seen = Rc::new(Cell::new(0));
//! let mut channel: Observable<u32> = Observable::new();
//!
//! let counter = seen.clone();
//! let handle = channel.add(move |value, _| counter.set(counter.get() + *value));
//!
//! channel.notify(&2);
//! channel.notify(&3);
//! assert_eq!(seen.get(), 5);
//!
//! assert!(channel.remove(handle));
//! channel.notify(&100);
//! assert_eq!(seen.get(), 5);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::types::ControlId;

/// Callback invoked for every notification of an [`Observable<T>`].
pub type ObserverCallback<T> = Box<dyn FnMut(&T, &mut EventState)>;

/// Handle returned by [`Observable::add`], used to remove that observer again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObserverHandle(u64);

/// Sender context delivered alongside every payload.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventState {
    /// The control the event was routed through, if any.
    pub target: Option<ControlId>,
    /// The control whose channel is notifying, if any.
    pub current_target: Option<ControlId>,
    /// Set by an observer to stop delivery to the observers after it.
    pub skip_next_observers: bool,
}

impl EventState {
    /// Context for a notification raised by `current_target` on behalf of `target`.
    #[must_use]
    pub const fn new(target: ControlId, current_target: ControlId) -> Self {
        Self {
            target: Some(target),
            current_target: Some(current_target),
            skip_next_observers: false,
        }
    }
}

struct Observer<T> {
    handle: ObserverHandle,
    callback: ObserverCallback<T>,
    once: bool,
}

/// A broadcast point with independently removable observers.
pub struct Observable<T> {
    observers: Vec<Observer<T>>,
    next_handle: u64,
}

impl<T> Observable<T> {
    /// Creates a channel with no observers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_handle: 0,
        }
    }

    /// Adds an observer that runs on every notification until removed.
    pub fn add<F>(&mut self, callback: F) -> ObserverHandle
    where
        F: FnMut(&T, &mut EventState) + 'static,
    {
        self.push(Box::new(callback), false)
    }

    /// Adds an observer that is removed right after its first notification.
    pub fn add_once<F>(&mut self, callback: F) -> ObserverHandle
    where
        F: FnMut(&T, &mut EventState) + 'static,
    {
        self.push(Box::new(callback), true)
    }

    fn push(&mut self, callback: ObserverCallback<T>, once: bool) -> ObserverHandle {
        let handle = ObserverHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.observers.push(Observer {
            handle,
            callback,
            once,
        });
        handle
    }

    /// Removes the observer registered under `handle`.
    ///
    /// Returns `false` if it was already removed (or fired as a once-observer).
    pub fn remove(&mut self, handle: ObserverHandle) -> bool {
        if let Some(idx) = self.observers.iter().position(|o| o.handle == handle) {
            self.observers.remove(idx);
            true
        } else {
            false
        }
    }

    /// Removes every observer without invoking any of them.
    pub fn clear(&mut self) {
        self.observers.clear();
    }

    /// Returns `true` if at least one observer is registered.
    #[must_use]
    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Notifies every observer with an empty sender context.
    ///
    /// See [`Observable::notify_with`].
    pub fn notify(&mut self, payload: &T) -> bool {
        self.notify_with(payload, EventState::default())
    }

    /// Notifies observers in registration order.
    ///
    /// Returns `false` if an observer stopped delivery through
    /// [`EventState::skip_next_observers`], otherwise `true`.
    pub fn notify_with(&mut self, payload: &T, mut state: EventState) -> bool {
        let mut i = 0;
        while i < self.observers.len() {
            let observer = &mut self.observers[i];
            (observer.callback)(payload, &mut state);
            if observer.once {
                self.observers.remove(i);
            } else {
                i += 1;
            }
            if state.skip_next_observers {
                return false;
            }
        }
        true
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Debug impl since callbacks aren't Debug
impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    fn tagged(
        log: &Rc<RefCell<Vec<u32>>>,
        tag: u32,
    ) -> impl FnMut(&u32, &mut EventState) + 'static {
        let log = log.clone();
        move |value: &u32, _: &mut EventState| log.borrow_mut().push(tag * 100 + *value)
    }

    #[test]
    fn observers_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel: Observable<u32> = Observable::new();
        channel.add(tagged(&log, 1));
        channel.add(tagged(&log, 2));

        assert!(channel.notify(&7));
        assert_eq!(*log.borrow(), vec![107, 207]);
    }

    #[test]
    fn remove_only_affects_that_observer() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel: Observable<u32> = Observable::new();
        let first = channel.add(tagged(&log, 1));
        channel.add(tagged(&log, 2));

        assert!(channel.remove(first));
        assert!(!channel.remove(first));
        channel.notify(&1);
        assert_eq!(*log.borrow(), vec![201]);
    }

    #[test]
    fn clear_drops_observers_without_firing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel: Observable<u32> = Observable::new();
        channel.add(tagged(&log, 1));
        channel.add(tagged(&log, 2));

        channel.clear();
        assert!(!channel.has_observers());
        channel.notify(&1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn once_observers_fire_a_single_time() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel: Observable<u32> = Observable::new();
        let once = channel.add_once(tagged(&log, 1));
        channel.add(tagged(&log, 2));

        channel.notify(&1);
        channel.notify(&2);
        assert_eq!(*log.borrow(), vec![101, 201, 202]);
        assert!(!channel.remove(once));
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn skip_next_observers_stops_delivery() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel: Observable<u32> = Observable::new();
        channel.add(|_, state| state.skip_next_observers = true);
        channel.add(tagged(&log, 2));

        assert!(!channel.notify(&1));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn sender_context_is_delivered() {
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let mut channel = Observable::new();
        channel.add(move |_: &(), state| *sink.borrow_mut() = Some(*state));

        let target = ControlId::new(0, 1);
        let current = ControlId::new(1, 1);
        channel.notify_with(&(), EventState::new(target, current));

        let state = seen.borrow().unwrap();
        assert_eq!(state.target, Some(target));
        assert_eq!(state.current_target, Some(current));
    }
}
