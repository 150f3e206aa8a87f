// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_control3d` crate.
//!
//! These drive a `ControlManager` end to end, the way a scene integration
//! would: picked pointer input in, notifications and hooks out.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use understory_control3d::behavior::{Behavior, BehaviorRef, LoadGate};
use understory_control3d::representation::Representation;
use understory_control3d::{
    Button, ControlBuilder, ControlId, ControlManager, PointerEventKind, PointerId, PointerInput,
    PointerType, RawPointerEvent,
};

type Journal = Rc<RefCell<Vec<String>>>;

const MOUSE: PointerId = PointerId::PRIMARY;
const FINGER: PointerId = PointerId(7);

fn hooked(name: &'static str, journal: &Journal) -> ControlBuilder {
    let note = |event: &'static str| {
        let journal = journal.clone();
        move || journal.borrow_mut().push(format!("{name}:{event}"))
    };
    ControlBuilder::new()
        .name(name)
        .on_enter(note("enter"))
        .on_out(note("out"))
        .on_down(note("down"))
        .on_up(note("up"))
}

fn input(kind: PointerEventKind, pick: Option<ControlId>) -> PointerInput {
    PointerInput::new(kind)
        .with_button(Button::PRIMARY)
        .with_pick(pick, Vec3::new(1.0, 2.0, 3.0))
}

#[test]
fn hover_press_release_runs_hooks_in_order() {
    let journal = Journal::default();
    let mut manager = ControlManager::new();
    let knob = manager.add(hooked("knob", &journal));

    manager.handle_pointer(&input(PointerEventKind::Move, Some(knob)));
    manager.handle_pointer(&input(PointerEventKind::Move, Some(knob)));
    manager.handle_pointer(&input(PointerEventKind::Down, Some(knob)));
    manager.handle_pointer(&input(PointerEventKind::Up, Some(knob)));
    manager.handle_pointer(&PointerInput::new(PointerEventKind::Move));

    assert_eq!(
        *journal.borrow(),
        ["knob:enter", "knob:down", "knob:up", "knob:out"]
    );
}

#[test]
fn sweeping_across_controls_hands_hover_over() {
    let journal = Journal::default();
    let mut manager = ControlManager::new();
    let a = manager.add(hooked("a", &journal));
    let b = manager.add(hooked("b", &journal));
    let c = manager.add(hooked("c", &journal));

    for target in [a, b, c, c, a] {
        manager.handle_pointer(&input(PointerEventKind::Move, Some(target)));
    }

    assert_eq!(
        *journal.borrow(),
        ["a:enter", "a:out", "b:enter", "b:out", "c:enter", "c:out", "a:enter"]
    );
    let hovered: Vec<_> = manager
        .iter()
        .filter(|(_, control)| control.is_hovered())
        .map(|(id, _)| id)
        .collect();
    assert_eq!(hovered, [a]);
}

#[test]
fn two_pointers_are_tracked_independently() {
    let mut manager = ControlManager::new();
    let a = manager.add(ControlBuilder::new());
    let b = manager.add(ControlBuilder::new());

    manager.process_raw_event(a, RawPointerEvent::moved(Vec3::ZERO, MOUSE));
    manager.process_raw_event(b, RawPointerEvent::moved(Vec3::ZERO, FINGER));
    manager.process_raw_event(b, RawPointerEvent::down(Vec3::ZERO, FINGER, Button::PRIMARY));

    assert_eq!(manager.pointers().last_control_over(MOUSE), Some(a));
    assert_eq!(manager.pointers().last_control_over(FINGER), Some(b));
    assert_eq!(manager.pointers().last_control_down(MOUSE), None);
    assert_eq!(manager.pointers().last_control_down(FINGER), Some(b));
    assert!(manager.control(a).unwrap().is_hovered());
    assert!(manager.control(b).unwrap().is_pressed());

    // The mouse releasing elsewhere does not release the finger's press.
    manager.process_raw_event(a, RawPointerEvent::up(Vec3::ZERO, MOUSE, Button::PRIMARY));
    assert!(manager.control(b).unwrap().is_pressed());
}

#[test]
fn concurrent_press_keeps_first_pointer_only() {
    let mut manager = ControlManager::new();
    let a = manager.add(ControlBuilder::new());

    manager.process_raw_event(a, RawPointerEvent::down(Vec3::ZERO, MOUSE, Button::PRIMARY));
    manager.process_raw_event(a, RawPointerEvent::down(Vec3::ZERO, FINGER, Button::PRIMARY));
    assert_eq!(manager.control(a).unwrap().down_pointer_ids(), [MOUSE]);
    // Both pointers are remembered as pressing the control, even though the
    // second press was swallowed by the control.
    assert_eq!(manager.pointers().last_control_down(FINGER), Some(a));

    // The first release clears the press for the whole control.
    manager.process_raw_event(a, RawPointerEvent::up(Vec3::ZERO, MOUSE, Button::PRIMARY));
    let control = manager.control(a).unwrap();
    assert_eq!(control.down_count(), 0);
    assert!(control.down_pointer_ids().is_empty());
}

#[test]
fn touch_lift_outside_any_control_releases_and_leaves() {
    let journal = Journal::default();
    let mut manager = ControlManager::new();
    let pad = manager.add(hooked("pad", &journal));
    let finger = |kind, pick| input(kind, pick).with_pointer(FINGER, PointerType::Touch);

    manager.handle_pointer(&finger(PointerEventKind::Move, Some(pad)));
    manager.handle_pointer(&finger(PointerEventKind::Down, Some(pad)));
    let lift = PointerInput::new(PointerEventKind::Up)
        .with_button(Button::PRIMARY)
        .with_pointer(FINGER, PointerType::Touch);
    assert!(!manager.handle_pointer(&lift));

    assert_eq!(
        *journal.borrow(),
        ["pad:enter", "pad:down", "pad:out", "pad:up"]
    );
    assert!(manager.pointers().is_empty());
}

#[test]
fn touch_lift_over_background_releases_then_leaves() {
    let journal = Journal::default();
    let mut manager = ControlManager::new();
    let pad = manager.add(hooked("pad", &journal));
    let finger = |kind, pick| input(kind, pick).with_pointer(FINGER, PointerType::Touch);

    manager.handle_pointer(&finger(PointerEventKind::Move, Some(pad)));
    manager.handle_pointer(&finger(PointerEventKind::Down, Some(pad)));
    assert!(manager.handle_pointer(&finger(PointerEventKind::Up, None)));

    assert_eq!(
        *journal.borrow(),
        ["pad:enter", "pad:down", "pad:up", "pad:out"]
    );
    assert!(manager.pointers().is_empty());
}

#[derive(Default)]
struct Mesh {
    visible: bool,
    position: Vec3,
    scaling: Vec3,
    disposed: bool,
}

struct SharedMesh(Rc<RefCell<Mesh>>);

impl Representation for SharedMesh {
    fn set_visible(&mut self, visible: bool) {
        self.0.borrow_mut().visible = visible;
    }

    fn position(&self) -> Vec3 {
        self.0.borrow().position
    }

    fn set_position(&mut self, position: Vec3) {
        self.0.borrow_mut().position = position;
    }

    fn scaling(&self) -> Vec3 {
        self.0.borrow().scaling
    }

    fn set_scaling(&mut self, scaling: Vec3) {
        self.0.borrow_mut().scaling = scaling;
    }

    fn dispose(&mut self) {
        self.0.borrow_mut().disposed = true;
    }
}

#[test]
fn representation_follows_control_until_removed() {
    let mesh = Rc::new(RefCell::new(Mesh::default()));
    let mut manager = ControlManager::new();
    let id = manager.add(ControlBuilder::new().visible(false));

    let control = manager.control_mut(id).unwrap();
    let shared = mesh.clone();
    assert!(control.prepare(move |_| Some(Box::new(SharedMesh(shared)))));
    assert!(!control.prepare(|_| unreachable!("already prepared")));
    assert!(!mesh.borrow().visible);

    control.set_visible(true);
    control.set_position(Vec3::new(0.0, 1.0, 0.0));
    control.set_scaling(Vec3::splat(2.0));
    assert!(mesh.borrow().visible);
    assert_eq!(control.position(), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(control.scaling(), Vec3::splat(2.0));

    let removed = manager.remove_control(id).unwrap();
    assert!(removed.is_disposed());
    assert!(removed.representation().is_none());
    assert!(mesh.borrow().disposed);
}

#[derive(Default)]
struct Tooltip {
    owner: Option<ControlId>,
    attaches: usize,
}

impl Behavior for Tooltip {
    fn name(&self) -> &str {
        "tooltip"
    }

    fn attach(&mut self, owner: ControlId) {
        self.owner = Some(owner);
        self.attaches += 1;
    }

    fn detach(&mut self) {
        self.owner = None;
    }
}

#[test]
fn behaviors_wait_for_scene_load_across_controls() {
    let mut scene = LoadGate::loading();
    let mut manager = ControlManager::new();
    let a = manager.add(ControlBuilder::new());
    let b = manager.add(ControlBuilder::new());

    let first = Rc::new(RefCell::new(Tooltip::default()));
    let second = Rc::new(RefCell::new(Tooltip::default()));
    let first_ref: BehaviorRef = first.clone();
    let second_ref: BehaviorRef = second.clone();

    let control = manager.control_mut(a).unwrap();
    assert_eq!(control.add_behavior(first_ref.clone(), &mut scene), Ok(true));
    assert_eq!(control.add_behavior(first_ref, &mut scene), Ok(false));
    let control = manager.control_mut(b).unwrap();
    assert_eq!(control.add_behavior(second_ref, &mut scene), Ok(true));
    assert_eq!(scene.pending(), 2);

    // `b` goes away before the scene finishes loading.
    assert!(manager.dispose_control(b));
    assert_eq!(scene.complete(), 2);
    assert_eq!(scene.complete(), 0);

    assert_eq!(first.borrow().owner, Some(a));
    assert_eq!(first.borrow().attaches, 1);
    assert_eq!(second.borrow().attaches, 0);
    assert_eq!(manager.control(b).unwrap().behaviors().len(), 1);
    assert!(manager.control(a).unwrap().behavior_by_name("tooltip").is_some());
}

#[test]
fn disposing_the_manager_silences_everything() {
    let journal = Journal::default();
    let mut manager = ControlManager::new();
    let a = manager.add(hooked("a", &journal));
    manager.handle_pointer(&input(PointerEventKind::Move, Some(a)));
    journal.borrow_mut().clear();

    manager.dispose();
    assert!(!manager.handle_pointer(&PointerInput::new(PointerEventKind::Move)));
    assert!(manager.handle_pointer(&input(PointerEventKind::Move, Some(a))));
    assert!(!manager.process_raw_event(a, RawPointerEvent::moved(Vec3::ZERO, MOUSE)));

    assert!(journal.borrow().is_empty());
    assert!(manager.pointers().is_empty());
}

#[test]
fn dropping_the_manager_cancels_pending_attaches() {
    let mut scene = LoadGate::loading();
    let tooltip = Rc::new(RefCell::new(Tooltip::default()));
    let handle: BehaviorRef = tooltip.clone();
    {
        let mut manager = ControlManager::new();
        let a = manager.add(ControlBuilder::new());
        let control = manager.control_mut(a).unwrap();
        assert_eq!(control.add_behavior(handle, &mut scene), Ok(true));
    }

    assert_eq!(scene.complete(), 1);
    assert_eq!(tooltip.borrow().attaches, 0);
    assert_eq!(tooltip.borrow().owner, None);
}
