//! Per-element drag handles.
//!
//! A lighter sibling of the canvas recognizer for individual handles such as
//! the scrollbar thumb, popup grip or a resize corner. Each handle owns its
//! own session and timers and can be suspended without touching the others.

use kurbo::{Point, Rect, Vec2};
use serde::Serialize;
use std::time::Duration;

use super::pointer::{PointerPhase, RawInput, TouchPhase};
use super::timers::PendingTimers;
use crate::config::HandleConfig;

/// Stable handle name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HandleId(pub &'static str);

/// Events emitted by a drag handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HandleEvent {
    Start {
        id: HandleId,
        origin: Point,
        position: Point,
    },
    Move {
        id: HandleId,
        position: Point,
        delta: Vec2,
    },
    End {
        id: HandleId,
        origin: Point,
        position: Point,
        moved: bool,
    },
    Click {
        id: HandleId,
        position: Point,
    },
    DoubleClick {
        id: HandleId,
        position: Point,
    },
}

impl HandleEvent {
    pub fn id(&self) -> HandleId {
        match *self {
            Self::Start { id, .. }
            | Self::Move { id, .. }
            | Self::End { id, .. }
            | Self::Click { id, .. }
            | Self::DoubleClick { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleTimer {
    DragIntent,
    ClickWindow,
}

#[derive(Debug, Clone, Copy)]
struct HandleSession {
    origin: Point,
    last: Point,
    started: bool,
}

/// A single draggable/clickable element.
#[derive(Debug, Clone)]
pub struct DragHandle {
    id: HandleId,
    bounds: Rect,
    config: HandleConfig,
    session: Option<HandleSession>,
    timers: PendingTimers<HandleTimer>,
    suspended: bool,
}

impl DragHandle {
    pub fn new(id: HandleId, bounds: Rect, config: HandleConfig) -> Self {
        Self {
            id,
            bounds,
            config,
            session: None,
            timers: PendingTimers::new(),
            suspended: false,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }

    /// Drop the session and timers and ignore input until resumed.
    pub fn suspend(&mut self) {
        self.session = None;
        self.timers.clear();
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// A press is in progress.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some_and(|s| s.started)
    }

    pub fn pointer_down(&mut self, position: Point, now: Duration) -> Vec<HandleEvent> {
        let mut out = Vec::new();
        if self.suspended {
            return out;
        }
        self.expire(now, &mut out);
        self.session = Some(HandleSession {
            origin: position,
            last: position,
            started: false,
        });
        let intent = (HandleTimer::DragIntent, now + self.config.drag_intent());
        match self.timers.deadline(HandleTimer::ClickWindow) {
            Some(window) => self
                .timers
                .replace(&[(HandleTimer::ClickWindow, window), intent]),
            None => self.timers.replace(&[intent]),
        }
        out
    }

    pub fn pointer_move(&mut self, position: Point, now: Duration) -> Vec<HandleEvent> {
        let mut out = Vec::new();
        if self.suspended {
            return out;
        }
        self.expire(now, &mut out);
        let Some(mut session) = self.session else {
            return out;
        };

        if !session.started && session.origin.distance(position) > self.config.drag_threshold {
            session.started = true;
            self.timers.replace(&[]);
            out.push(HandleEvent::Start {
                id: self.id,
                origin: session.origin,
                position,
            });
        }
        if session.started {
            out.push(HandleEvent::Move {
                id: self.id,
                position,
                delta: position - session.last,
            });
        }
        session.last = position;
        self.session = Some(session);
        out
    }

    pub fn pointer_up(&mut self, position: Point, now: Duration) -> Vec<HandleEvent> {
        let mut out = Vec::new();
        if self.suspended {
            return out;
        }
        self.expire(now, &mut out);
        let Some(session) = self.session.take() else {
            return out;
        };

        if session.started {
            out.push(HandleEvent::End {
                id: self.id,
                origin: session.origin,
                position,
                moved: session.origin != position,
            });
            self.timers.replace(&[]);
        } else if self.timers.is_armed(HandleTimer::ClickWindow) {
            out.push(HandleEvent::DoubleClick { id: self.id, position });
            self.timers.replace(&[]);
        } else {
            out.push(HandleEvent::Click { id: self.id, position });
            self.timers
                .replace(&[(HandleTimer::ClickWindow, now + self.config.click_window())]);
        }
        out
    }

    /// Abort the press. A started drag still reports its end.
    pub fn cancel(&mut self) -> Vec<HandleEvent> {
        let mut out = Vec::new();
        if let Some(session) = self.session.take() {
            if session.started {
                out.push(HandleEvent::End {
                    id: self.id,
                    origin: session.origin,
                    position: session.last,
                    moved: session.origin != session.last,
                });
            }
        }
        self.timers.clear();
        out
    }

    pub fn tick(&mut self, now: Duration) -> Vec<HandleEvent> {
        let mut out = Vec::new();
        if !self.suspended {
            self.expire(now, &mut out);
        }
        out
    }

    fn expire(&mut self, now: Duration, out: &mut Vec<HandleEvent>) {
        while let Some((timer, _)) = self.timers.pop_expired(now) {
            if timer != HandleTimer::DragIntent {
                continue;
            }
            if let Some(session) = self.session.as_mut() {
                if !session.started {
                    session.started = true;
                    out.push(HandleEvent::Start {
                        id: self.id,
                        origin: session.origin,
                        position: session.last,
                    });
                }
            }
        }
    }
}

/// Outcome of routing one raw input through a [`HandleSet`].
#[derive(Debug, Clone, Default)]
pub struct Routed {
    pub events: Vec<HandleEvent>,
    /// The input belonged to a handle and must not reach the canvas recognizer.
    pub consumed: bool,
}

/// All handles on one surface, with pointer capture.
#[derive(Debug, Clone, Default)]
pub struct HandleSet {
    config: HandleConfig,
    handles: Vec<DragHandle>,
    captured: Option<HandleId>,
}

impl HandleSet {
    pub fn new(config: HandleConfig) -> Self {
        Self {
            config,
            handles: Vec::new(),
            captured: None,
        }
    }

    /// Register a handle, or move an existing one. Later handles sit on top.
    pub fn register(&mut self, id: HandleId, bounds: Rect) {
        match self.get_mut(id) {
            Some(handle) => handle.set_bounds(bounds),
            None => self
                .handles
                .push(DragHandle::new(id, bounds, self.config.clone())),
        }
    }

    pub fn unregister(&mut self, id: HandleId) -> bool {
        if self.captured == Some(id) {
            self.captured = None;
        }
        let before = self.handles.len();
        self.handles.retain(|h| h.id() != id);
        before != self.handles.len()
    }

    pub fn set_bounds(&mut self, id: HandleId, bounds: Rect) -> bool {
        self.get_mut(id).map(|h| h.set_bounds(bounds)).is_some()
    }

    pub fn get(&self, id: HandleId) -> Option<&DragHandle> {
        self.handles.iter().find(|h| h.id() == id)
    }

    pub fn get_mut(&mut self, id: HandleId) -> Option<&mut DragHandle> {
        self.handles.iter_mut().find(|h| h.id() == id)
    }

    pub fn suspend(&mut self, id: HandleId) -> bool {
        if self.captured == Some(id) {
            self.captured = None;
        }
        self.get_mut(id).map(DragHandle::suspend).is_some()
    }

    pub fn resume(&mut self, id: HandleId) -> bool {
        self.get_mut(id).map(DragHandle::resume).is_some()
    }

    /// Handle currently holding the pointer.
    pub fn captured(&self) -> Option<HandleId> {
        self.captured
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Route a raw input to the handle under the pointer or holding the capture.
    pub fn route(&mut self, input: &RawInput, now: Duration) -> Routed {
        let Some(position) = input.position() else {
            return Routed::default();
        };

        if let Some(id) = self.captured {
            return self.route_captured(id, input, position, now);
        }

        let starts_single_chain = match input {
            RawInput::Pointer { phase, .. } => *phase == PointerPhase::Down,
            RawInput::Touch { phase, touches, .. } => {
                *phase == TouchPhase::Start && touches.len() == 1
            }
        };
        if !starts_single_chain {
            return Routed::default();
        }

        let hit = self
            .handles
            .iter_mut()
            .rev()
            .find(|h| !h.is_suspended() && h.contains(position));
        match hit {
            Some(handle) => {
                let id = handle.id();
                let events = handle.pointer_down(position, now);
                log::debug!("handle {:?} captured the pointer", id);
                self.captured = Some(id);
                Routed {
                    events,
                    consumed: true,
                }
            }
            None => Routed::default(),
        }
    }

    fn route_captured(
        &mut self,
        id: HandleId,
        input: &RawInput,
        position: Point,
        now: Duration,
    ) -> Routed {
        let Some(handle) = self.handles.iter_mut().find(|h| h.id() == id) else {
            self.captured = None;
            return Routed::default();
        };

        let (events, release) = match input {
            RawInput::Pointer { phase, .. } => match phase {
                PointerPhase::Down => (Vec::new(), false),
                PointerPhase::Move => (handle.pointer_move(position, now), false),
                PointerPhase::Up => (handle.pointer_up(position, now), true),
                PointerPhase::Cancel => (handle.cancel(), true),
            },
            RawInput::Touch { phase, touches, .. } => match phase {
                TouchPhase::Start => (Vec::new(), false),
                TouchPhase::Move if touches.len() == 1 => (handle.pointer_move(position, now), false),
                TouchPhase::Move => (Vec::new(), false),
                TouchPhase::End if touches.is_empty() => (handle.pointer_up(position, now), true),
                TouchPhase::End => (Vec::new(), false),
                TouchPhase::Cancel => (handle.cancel(), true),
            },
        };
        if release {
            log::debug!("handle {:?} released the pointer", id);
            self.captured = None;
        }
        Routed {
            events,
            consumed: true,
        }
    }

    /// Fire expired timers on every handle.
    pub fn tick(&mut self, now: Duration) -> Vec<HandleEvent> {
        self.handles.iter_mut().flat_map(|h| h.tick(now)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THUMB: HandleId = HandleId("thumb");
    const GRIP: HandleId = HandleId("grip");

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn handle() -> DragHandle {
        DragHandle::new(THUMB, Rect::new(0.0, 0.0, 20.0, 100.0), HandleConfig::default())
    }

    #[test]
    fn test_click_and_double_click() {
        let mut h = handle();
        h.pointer_down(Point::new(5.0, 5.0), ms(0));
        let first = h.pointer_up(Point::new(5.0, 5.0), ms(50));
        assert!(matches!(first.as_slice(), [HandleEvent::Click { .. }]));

        h.pointer_down(Point::new(5.0, 5.0), ms(120));
        let second = h.pointer_up(Point::new(5.0, 5.0), ms(160));
        assert!(matches!(second.as_slice(), [HandleEvent::DoubleClick { .. }]));
    }

    #[test]
    fn test_drag_past_threshold() {
        let mut h = handle();
        h.pointer_down(Point::new(5.0, 5.0), ms(0));
        assert!(h.pointer_move(Point::new(5.0, 8.0), ms(10)).is_empty());
        let events = h.pointer_move(Point::new(5.0, 20.0), ms(20));
        assert!(matches!(events[0], HandleEvent::Start { origin, .. } if origin == Point::new(5.0, 5.0)));
        assert!(matches!(events[1], HandleEvent::Move { delta, .. } if delta == Vec2::new(0.0, 12.0)));
        let end = h.pointer_up(Point::new(5.0, 20.0), ms(30));
        assert!(matches!(end.as_slice(), [HandleEvent::End { moved: true, .. }]));
    }

    #[test]
    fn test_hold_starts_drag() {
        let mut h = handle();
        h.pointer_down(Point::new(5.0, 5.0), ms(0));
        assert!(h.tick(ms(250)).is_empty());
        let events = h.tick(ms(310));
        assert!(matches!(events.as_slice(), [HandleEvent::Start { .. }]));
        assert!(h.is_dragging());
        let end = h.pointer_up(Point::new(5.0, 5.0), ms(400));
        assert!(matches!(end.as_slice(), [HandleEvent::End { moved: false, .. }]));
    }

    #[test]
    fn test_suspended_handle_is_independent() {
        let mut set = HandleSet::new(HandleConfig::default());
        set.register(THUMB, Rect::new(0.0, 0.0, 20.0, 100.0));
        set.register(GRIP, Rect::new(100.0, 0.0, 120.0, 20.0));
        assert!(set.suspend(THUMB));

        let routed = set.route(&RawInput::mouse(PointerPhase::Down, 5.0, 5.0), ms(0));
        assert!(!routed.consumed);

        let routed = set.route(&RawInput::mouse(PointerPhase::Down, 110.0, 10.0), ms(10));
        assert!(routed.consumed);
        assert_eq!(set.captured(), Some(GRIP));
        let routed = set.route(&RawInput::mouse(PointerPhase::Up, 110.0, 10.0), ms(40));
        assert!(matches!(routed.events.as_slice(), [HandleEvent::Click { id: GRIP, .. }]));
        assert_eq!(set.captured(), None);
    }

    #[test]
    fn test_capture_follows_pointer_outside_bounds() {
        let mut set = HandleSet::new(HandleConfig::default());
        set.register(THUMB, Rect::new(0.0, 0.0, 20.0, 100.0));
        set.route(&RawInput::mouse(PointerPhase::Down, 10.0, 10.0), ms(0));
        let routed = set.route(&RawInput::mouse(PointerPhase::Move, 300.0, 10.0), ms(10));
        assert!(routed.consumed);
        assert!(matches!(routed.events[0], HandleEvent::Start { .. }));
        let routed = set.route(&RawInput::mouse(PointerPhase::Up, 300.0, 10.0), ms(20));
        assert!(matches!(routed.events.as_slice(), [HandleEvent::End { .. }]));
    }

    #[test]
    fn test_spurious_release_ignored() {
        let mut h = handle();
        assert!(h.pointer_up(Point::new(1.0, 1.0), ms(0)).is_empty());
        let mut set = HandleSet::new(HandleConfig::default());
        set.register(THUMB, Rect::new(0.0, 0.0, 20.0, 100.0));
        assert!(!set.route(&RawInput::mouse(PointerPhase::Up, 5.0, 5.0), ms(0)).consumed);
    }
}
