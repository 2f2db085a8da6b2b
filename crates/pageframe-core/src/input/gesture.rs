//! Gesture recognition for the canvas surface.
//!
//! [`GestureRecognizer`] turns raw pointer/touch primitives into a normalized
//! event stream. Each pointer chain is a small state machine:
//!
//! ```text
//! idle -> pressed {click timer, long-press timer} -> click | dblclick | longpress | drag
//! ```
//!
//! Time is supplied by the host as a monotonic timestamp. Timers are deadlines
//! in a [`PendingTimers`] set that is replaced wholesale on every transition,
//! and expired timers are processed before any new input.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::pointer::{DeviceClass, NormalizedPointer, PointerPhase, RawInput, TouchPhase, TouchPoint};
use super::timers::PendingTimers;
use super::touch::{self, TwoFingerMotion};
use crate::config::GestureConfig;

/// Normalized gesture stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    Down(NormalizedPointer),
    Move(NormalizedPointer),
    Up(NormalizedPointer),
    Click(NormalizedPointer),
    DoubleClick(NormalizedPointer),
    LongPress(NormalizedPointer),
    /// Emitted once when a press turns into a drag. `origin` is the press position.
    DragStart {
        origin: NormalizedPointer,
        pointer: NormalizedPointer,
    },
    /// Raw movement while dragging (`pointer.movement()` is the delta).
    DragMove(NormalizedPointer),
    DragEnd {
        origin: NormalizedPointer,
        pointer: NormalizedPointer,
        /// Net displacement between press and release.
        moved: bool,
    },
    Pinch {
        center: Point,
        distance_delta: f64,
    },
    TwoFingerPan {
        center: Point,
        delta: Vec2,
    },
}

impl GestureEvent {
    /// The pointer this event reports, synthesizing one for two-finger gestures.
    pub fn pointer(&self) -> NormalizedPointer {
        match *self {
            Self::Down(p)
            | Self::Move(p)
            | Self::Up(p)
            | Self::Click(p)
            | Self::DoubleClick(p)
            | Self::LongPress(p)
            | Self::DragMove(p) => p,
            Self::DragStart { pointer, .. } | Self::DragEnd { pointer, .. } => pointer,
            Self::Pinch { center, .. } => NormalizedPointer::at(center, 0, DeviceClass::TwoFinger),
            Self::TwoFingerPan { center, delta } => {
                NormalizedPointer::at(center, 0, DeviceClass::TwoFinger).with_movement(delta)
            }
        }
    }

    /// Whether this is a drag lifecycle event.
    pub fn is_drag(&self) -> bool {
        matches!(self, Self::DragStart { .. } | Self::DragMove(_) | Self::DragEnd { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureTimer {
    Click,
    LongPress,
    DoubleClickWindow,
}

/// The active pointer chain.
#[derive(Debug, Clone, Copy)]
struct ChainSession {
    origin: NormalizedPointer,
    last: Point,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Pressed {
        session: ChainSession,
        /// Press that began inside an open double-click window.
        second_press: bool,
    },
    Dragging {
        session: ChainSession,
    },
    LongPressed {
        session: ChainSession,
    },
    TwoFinger {
        fingers: [TouchPoint; 2],
    },
    /// Two-finger gesture finished; waiting for every finger to lift.
    AwaitRelease,
}

/// Stateful recognizer for the main canvas surface.
pub struct GestureRecognizer {
    config: GestureConfig,
    phase: Phase,
    timers: PendingTimers<GestureTimer>,
    last_position: Option<Point>,
    attached: bool,
    suspended: bool,
}

impl std::fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("phase", &self.phase)
            .field("timers", &self.timers.len())
            .field("attached", &self.attached)
            .field("suspended", &self.suspended)
            .finish()
    }
}

impl GestureRecognizer {
    /// Create an attached recognizer.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            timers: PendingTimers::new(),
            last_position: None,
            attached: true,
            suspended: false,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Start accepting input.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop accepting input and forget the active chain.
    pub fn detach(&mut self) {
        self.reset();
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Hand input to someone else. Cancels the active chain and every timer.
    pub fn suspend(&mut self) {
        if !self.suspended {
            log::debug!("gesture recognizer suspended");
        }
        self.reset();
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        if self.suspended {
            log::debug!("gesture recognizer resumed");
        }
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Return to idle with no timers.
    pub fn reset(&mut self) {
        self.transition(Phase::Idle, &[]);
        self.last_position = None;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Whether a pointer chain or two-finger gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Earliest pending timer, for hosts that schedule a wake-up.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Process one raw input primitive.
    pub fn handle(&mut self, input: &RawInput, now: Duration) -> Vec<GestureEvent> {
        let mut out = Vec::with_capacity(2);
        if !self.attached || self.suspended {
            return out;
        }
        self.expire(now, &mut out);

        match input {
            RawInput::Pointer {
                phase,
                position,
                buttons,
                device,
            } => {
                let pointer = NormalizedPointer::at(*position, *buttons, *device);
                match phase {
                    PointerPhase::Down => self.on_down(pointer, now, &mut out),
                    PointerPhase::Move => self.on_move(pointer, &mut out),
                    PointerPhase::Up => self.on_up(pointer, now, &mut out),
                    PointerPhase::Cancel => self.on_cancel(&mut out),
                }
            }
            RawInput::Touch {
                phase,
                touches,
                changed,
            } => self.on_touch(*phase, touches, changed, now, &mut out),
        }
        out
    }

    /// Fire timers that expired by `now`.
    pub fn tick(&mut self, now: Duration) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        if self.attached && !self.suspended {
            self.expire(now, &mut out);
        }
        out
    }
}

impl GestureRecognizer {
    fn transition(&mut self, phase: Phase, timers: &[(GestureTimer, Duration)]) {
        log::trace!("gesture {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.timers.replace(timers);
    }

    fn expire(&mut self, now: Duration, out: &mut Vec<GestureEvent>) {
        while let Some((timer, _)) = self.timers.pop_expired(now) {
            match timer {
                GestureTimer::Click | GestureTimer::DoubleClickWindow => {}
                GestureTimer::LongPress => {
                    if let Phase::Pressed { session, .. } = self.phase {
                        let pointer = NormalizedPointer::at(
                            session.last,
                            session.origin.buttons,
                            session.origin.device_class,
                        );
                        out.push(GestureEvent::LongPress(pointer));
                        self.transition(Phase::LongPressed { session }, &[]);
                    }
                }
            }
        }
    }

    fn with_movement(&mut self, pointer: NormalizedPointer) -> NormalizedPointer {
        let position = pointer.position();
        let movement = self
            .last_position
            .map(|last| position - last)
            .unwrap_or(Vec2::ZERO);
        self.last_position = Some(position);
        pointer.with_movement(movement)
    }

    fn on_down(&mut self, pointer: NormalizedPointer, now: Duration, out: &mut Vec<GestureEvent>) {
        if !matches!(self.phase, Phase::Idle) {
            log::debug!("ignoring press during an active chain");
            return;
        }
        self.last_position = Some(pointer.position());
        out.push(GestureEvent::Down(pointer));

        let session = ChainSession {
            origin: pointer,
            last: pointer.position(),
        };
        match self.timers.deadline(GestureTimer::DoubleClickWindow) {
            Some(window) => self.transition(
                Phase::Pressed {
                    session,
                    second_press: true,
                },
                &[(GestureTimer::DoubleClickWindow, window)],
            ),
            None => self.transition(
                Phase::Pressed {
                    session,
                    second_press: false,
                },
                &[
                    (GestureTimer::Click, now + self.config.click_timeout()),
                    (GestureTimer::LongPress, now + self.config.long_press()),
                ],
            ),
        }
    }

    fn on_move(&mut self, pointer: NormalizedPointer, out: &mut Vec<GestureEvent>) {
        let pointer = self.with_movement(pointer);
        let position = pointer.position();
        out.push(GestureEvent::Move(pointer));

        match self.phase {
            Phase::Pressed {
                mut session,
                second_press,
            } => {
                session.last = position;
                let armed = self.timers.is_armed(GestureTimer::Click)
                    || self.timers.is_armed(GestureTimer::LongPress);
                let displacement = session.origin.position().distance(position);
                if armed && displacement > self.config.drag_threshold {
                    self.transition(Phase::Dragging { session }, &[]);
                    out.push(GestureEvent::DragStart {
                        origin: session.origin,
                        pointer,
                    });
                } else {
                    self.phase = Phase::Pressed {
                        session,
                        second_press,
                    };
                }
            }
            Phase::Dragging { mut session } => {
                session.last = position;
                self.phase = Phase::Dragging { session };
                out.push(GestureEvent::DragMove(pointer));
            }
            Phase::LongPressed { mut session } => {
                session.last = position;
                self.phase = Phase::LongPressed { session };
            }
            Phase::Idle | Phase::TwoFinger { .. } | Phase::AwaitRelease => {}
        }
    }

    fn on_up(&mut self, pointer: NormalizedPointer, now: Duration, out: &mut Vec<GestureEvent>) {
        if matches!(
            self.phase,
            Phase::Idle | Phase::TwoFinger { .. } | Phase::AwaitRelease
        ) {
            log::debug!("ignoring release without a matching press");
            return;
        }
        let pointer = self.with_movement(pointer);
        out.push(GestureEvent::Up(pointer));

        match self.phase {
            Phase::Dragging { session } => {
                out.push(GestureEvent::DragEnd {
                    origin: session.origin,
                    pointer,
                    moved: session.origin.position() != pointer.position(),
                });
                self.transition(Phase::Idle, &[]);
            }
            Phase::Pressed {
                second_press: false,
                ..
            } => {
                if self.timers.is_armed(GestureTimer::Click) {
                    out.push(GestureEvent::Click(pointer));
                    let window = now + self.config.double_click_window();
                    self.transition(Phase::Idle, &[(GestureTimer::DoubleClickWindow, window)]);
                } else {
                    self.transition(Phase::Idle, &[]);
                }
            }
            Phase::Pressed {
                second_press: true,
                ..
            } => {
                if self.timers.is_armed(GestureTimer::DoubleClickWindow) {
                    out.push(GestureEvent::DoubleClick(pointer));
                }
                self.transition(Phase::Idle, &[]);
            }
            Phase::LongPressed { .. } | Phase::Idle | Phase::TwoFinger { .. } | Phase::AwaitRelease => {
                self.transition(Phase::Idle, &[]);
            }
        }
    }

    fn on_cancel(&mut self, out: &mut Vec<GestureEvent>) {
        if let Phase::Dragging { session } = self.phase {
            let pointer = NormalizedPointer::at(
                session.last,
                0,
                session.origin.device_class,
            );
            out.push(GestureEvent::DragEnd {
                origin: session.origin,
                pointer,
                moved: session.origin.position() != session.last,
            });
        }
        self.transition(Phase::Idle, &[]);
        self.last_position = None;
    }

    fn on_touch(
        &mut self,
        phase: TouchPhase,
        touches: &[TouchPoint],
        changed: &[TouchPoint],
        now: Duration,
        out: &mut Vec<GestureEvent>,
    ) {
        match phase {
            TouchPhase::Start => match touches {
                [finger] => {
                    let pointer = NormalizedPointer::at(finger.position, 1, DeviceClass::Touch);
                    self.on_down(pointer, now, out);
                }
                [first, second, ..] => {
                    if matches!(self.phase, Phase::TwoFinger { .. }) {
                        return;
                    }
                    // A second finger supersedes the single-finger chain.
                    self.on_cancel(out);
                    self.transition(
                        Phase::TwoFinger {
                            fingers: [*first, *second],
                        },
                        &[],
                    );
                }
                [] => {}
            },
            TouchPhase::Move => match self.phase {
                Phase::TwoFinger { fingers } => {
                    let find = |id: i64| touches.iter().find(|t| t.id == id).copied();
                    if let (Some(a), Some(b)) = (find(fingers[0].id), find(fingers[1].id)) {
                        let motion = touch::classify(
                            [fingers[0].position, fingers[1].position],
                            [a.position, b.position],
                            self.config.touch_stationary_epsilon,
                        );
                        match motion {
                            TwoFingerMotion::Pan { center, delta } => {
                                out.push(GestureEvent::TwoFingerPan { center, delta });
                            }
                            TwoFingerMotion::Pinch {
                                center,
                                distance_delta,
                            } => {
                                out.push(GestureEvent::Pinch {
                                    center,
                                    distance_delta,
                                });
                            }
                            TwoFingerMotion::Still => {}
                        }
                        self.phase = Phase::TwoFinger { fingers: [a, b] };
                    }
                }
                Phase::AwaitRelease => {}
                _ => {
                    if let [finger] = touches {
                        let pointer = NormalizedPointer::at(finger.position, 1, DeviceClass::Touch);
                        self.on_move(pointer, out);
                    }
                }
            },
            TouchPhase::End | TouchPhase::Cancel => match self.phase {
                Phase::TwoFinger { .. } | Phase::AwaitRelease => {
                    if touches.is_empty() {
                        self.transition(Phase::Idle, &[]);
                        self.last_position = None;
                    } else {
                        self.transition(Phase::AwaitRelease, &[]);
                    }
                }
                Phase::Idle => {
                    log::debug!("ignoring touch end without a matching start");
                }
                _ => {
                    if !touches.is_empty() {
                        return;
                    }
                    if phase == TouchPhase::Cancel {
                        self.on_cancel(out);
                        return;
                    }
                    let position = changed
                        .first()
                        .map(|t| t.position)
                        .or(self.last_position)
                        .unwrap_or(Point::ZERO);
                    let pointer = NormalizedPointer::at(position, 0, DeviceClass::Touch);
                    self.on_up(pointer, now, out);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(GestureConfig::default())
    }

    fn feed(r: &mut GestureRecognizer, steps: &[(u64, RawInput)]) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        for (t, input) in steps {
            out.extend(r.handle(input, ms(*t)));
        }
        out
    }

    fn count(events: &[GestureEvent], pred: impl Fn(&GestureEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    fn is_click(e: &GestureEvent) -> bool {
        matches!(e, GestureEvent::Click(_))
    }

    fn is_dblclick(e: &GestureEvent) -> bool {
        matches!(e, GestureEvent::DoubleClick(_))
    }

    fn is_drag_start(e: &GestureEvent) -> bool {
        matches!(e, GestureEvent::DragStart { .. })
    }

    fn is_drag_end(e: &GestureEvent) -> bool {
        matches!(e, GestureEvent::DragEnd { .. })
    }

    fn touch(phase: TouchPhase, touches: &[TouchPoint], changed: &[TouchPoint]) -> RawInput {
        RawInput::Touch {
            phase,
            touches: touches.to_vec(),
            changed: changed.to_vec(),
        }
    }

    #[test]
    fn test_click_within_threshold() {
        let mut r = recognizer();
        let events = feed(
            &mut r,
            &[
                (0, RawInput::mouse(PointerPhase::Down, 100.0, 100.0)),
                (40, RawInput::mouse(PointerPhase::Move, 103.0, 100.0)),
                (80, RawInput::mouse(PointerPhase::Move, 103.0, 104.0)),
                (120, RawInput::mouse(PointerPhase::Up, 103.0, 104.0)),
            ],
        );
        assert_eq!(count(&events, is_click), 1);
        assert_eq!(count(&events, is_drag_start), 0);
        assert_eq!(count(&events, is_drag_end), 0);
        assert!(matches!(events[0], GestureEvent::Down(_)));
    }

    #[test]
    fn test_drag_anchored_at_press() {
        let mut r = recognizer();
        let events = feed(
            &mut r,
            &[
                (0, RawInput::mouse(PointerPhase::Down, 100.0, 100.0)),
                (30, RawInput::mouse(PointerPhase::Move, 104.0, 100.0)),
                (60, RawInput::mouse(PointerPhase::Move, 110.0, 100.0)),
                (90, RawInput::mouse(PointerPhase::Move, 120.0, 105.0)),
                (120, RawInput::mouse(PointerPhase::Up, 120.0, 105.0)),
            ],
        );
        assert_eq!(count(&events, is_drag_start), 1);
        assert_eq!(count(&events, is_click), 0);

        let start = events.iter().position(is_drag_start).unwrap();
        match events[start] {
            GestureEvent::DragStart { origin, pointer } => {
                assert_eq!(origin.position(), Point::new(100.0, 100.0));
                assert_eq!(pointer.position(), Point::new(110.0, 100.0));
            }
            _ => unreachable!(),
        }
        let moves: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GestureEvent::DragMove(p) => Some(p.movement()),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec![Vec2::new(10.0, 5.0)]);
        match events.last() {
            Some(GestureEvent::DragEnd { moved, .. }) => assert!(*moved),
            other => panic!("Expected DragEnd, got {:?}", other),
        }
    }

    #[test]
    fn test_double_click_replaces_second_click() {
        let mut r = recognizer();
        let events = feed(
            &mut r,
            &[
                (0, RawInput::mouse(PointerPhase::Down, 50.0, 50.0)),
                (60, RawInput::mouse(PointerPhase::Up, 50.0, 50.0)),
                (150, RawInput::mouse(PointerPhase::Down, 50.0, 50.0)),
                (200, RawInput::mouse(PointerPhase::Up, 50.0, 50.0)),
            ],
        );
        assert_eq!(count(&events, is_click), 1);
        assert_eq!(count(&events, is_dblclick), 1);
        assert!(is_dblclick(events.last().unwrap()));
    }

    #[test]
    fn test_slow_clicks_are_two_clicks() {
        let mut r = recognizer();
        let events = feed(
            &mut r,
            &[
                (0, RawInput::mouse(PointerPhase::Down, 50.0, 50.0)),
                (60, RawInput::mouse(PointerPhase::Up, 50.0, 50.0)),
                (400, RawInput::mouse(PointerPhase::Down, 50.0, 50.0)),
                (450, RawInput::mouse(PointerPhase::Up, 50.0, 50.0)),
            ],
        );
        assert_eq!(count(&events, is_click), 2);
        assert_eq!(count(&events, is_dblclick), 0);
    }

    #[test]
    fn test_long_press_suppresses_click() {
        let mut r = recognizer();
        let mut events = r.handle(&RawInput::mouse(PointerPhase::Down, 10.0, 10.0), ms(0));
        assert!(r.tick(ms(700)).is_empty());
        let fired = r.tick(ms(760));
        assert!(matches!(fired.as_slice(), [GestureEvent::LongPress(_)]));
        events.extend(fired);
        events.extend(r.handle(&RawInput::mouse(PointerPhase::Move, 30.0, 10.0), ms(800)));
        events.extend(r.handle(&RawInput::mouse(PointerPhase::Up, 30.0, 10.0), ms(820)));
        assert_eq!(count(&events, is_click), 0);
        assert_eq!(count(&events, is_drag_start), 0);
        assert!(!r.is_active());
    }

    #[test]
    fn test_late_release_is_not_a_click() {
        let mut r = recognizer();
        let events = feed(
            &mut r,
            &[
                (0, RawInput::mouse(PointerPhase::Down, 10.0, 10.0)),
                (400, RawInput::mouse(PointerPhase::Up, 10.0, 10.0)),
            ],
        );
        assert_eq!(count(&events, is_click), 0);
        assert!(r.next_deadline().is_none());
    }

    #[test]
    fn test_spurious_release_ignored() {
        let mut r = recognizer();
        assert!(r.handle(&RawInput::mouse(PointerPhase::Up, 1.0, 1.0), ms(0)).is_empty());
        assert!(r
            .handle(&touch(TouchPhase::End, &[], &[TouchPoint::new(1, 0.0, 0.0)]), ms(5))
            .is_empty());
        assert!(!r.is_active());
    }

    #[test]
    fn test_drag_back_to_start_is_not_moved() {
        let mut r = recognizer();
        let events = feed(
            &mut r,
            &[
                (0, RawInput::mouse(PointerPhase::Down, 0.0, 0.0)),
                (20, RawInput::mouse(PointerPhase::Move, 20.0, 0.0)),
                (40, RawInput::mouse(PointerPhase::Move, 0.0, 0.0)),
                (60, RawInput::mouse(PointerPhase::Up, 0.0, 0.0)),
            ],
        );
        match events.last() {
            Some(GestureEvent::DragEnd { moved, .. }) => assert!(!*moved),
            other => panic!("Expected DragEnd, got {:?}", other),
        }
    }

    #[test]
    fn test_suspend_silences_everything() {
        let mut r = recognizer();
        r.handle(&RawInput::mouse(PointerPhase::Down, 0.0, 0.0), ms(0));
        r.suspend();
        assert!(r.tick(ms(1000)).is_empty());
        assert!(r.handle(&RawInput::mouse(PointerPhase::Up, 0.0, 0.0), ms(1010)).is_empty());
        assert!(r.next_deadline().is_none());

        r.resume();
        let events = feed(
            &mut r,
            &[
                (2000, RawInput::mouse(PointerPhase::Down, 0.0, 0.0)),
                (2050, RawInput::mouse(PointerPhase::Up, 0.0, 0.0)),
            ],
        );
        assert_eq!(count(&events, is_click), 1);
    }

    #[test]
    fn test_detached_ignores_input() {
        let mut r = recognizer();
        r.detach();
        assert!(r.handle(&RawInput::mouse(PointerPhase::Down, 0.0, 0.0), ms(0)).is_empty());
        r.attach();
        assert_eq!(r.handle(&RawInput::mouse(PointerPhase::Down, 0.0, 0.0), ms(0)).len(), 1);
    }

    #[test]
    fn test_cancel_ends_drag() {
        let mut r = recognizer();
        let events = feed(
            &mut r,
            &[
                (0, RawInput::mouse(PointerPhase::Down, 0.0, 0.0)),
                (20, RawInput::mouse(PointerPhase::Move, 30.0, 0.0)),
                (40, RawInput::mouse(PointerPhase::Cancel, 30.0, 0.0)),
            ],
        );
        assert_eq!(count(&events, is_drag_end), 1);
        assert!(!r.is_active());
    }

    #[test]
    fn test_touch_tap_is_click() {
        let mut r = recognizer();
        let finger = TouchPoint::new(7, 20.0, 20.0);
        let events = feed(
            &mut r,
            &[
                (0, touch(TouchPhase::Start, &[finger], &[finger])),
                (50, touch(TouchPhase::End, &[], &[finger])),
            ],
        );
        assert_eq!(count(&events, is_click), 1);
        assert_eq!(events[0].pointer().device_class, DeviceClass::Touch);
    }

    #[test]
    fn test_touch_pinch() {
        let mut r = recognizer();
        let a = TouchPoint::new(1, 40.0, 50.0);
        let b = TouchPoint::new(2, 60.0, 50.0);
        let a2 = TouchPoint::new(1, 30.0, 50.0);
        let b2 = TouchPoint::new(2, 70.0, 50.0);
        let events = feed(
            &mut r,
            &[
                (0, touch(TouchPhase::Start, &[a], &[a])),
                (10, touch(TouchPhase::Start, &[a, b], &[b])),
                (20, touch(TouchPhase::Move, &[a2, b2], &[a2, b2])),
                (30, touch(TouchPhase::End, &[b2], &[a2])),
                (40, touch(TouchPhase::Move, &[TouchPoint::new(2, 90.0, 50.0)], &[])),
                (50, touch(TouchPhase::End, &[], &[b2])),
            ],
        );
        let pinches: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                GestureEvent::Pinch { distance_delta, .. } => Some(*distance_delta),
                _ => None,
            })
            .collect();
        assert_eq!(pinches.len(), 1);
        assert!((pinches[0] - 1.0).abs() < 1e-12);
        assert_eq!(count(&events, is_click), 0);
        assert_eq!(count(&events, is_drag_start), 0);
        assert!(!r.is_active());
    }

    #[test]
    fn test_touch_two_finger_pan() {
        let mut r = recognizer();
        let a = TouchPoint::new(1, 0.0, 0.0);
        let b = TouchPoint::new(2, 50.0, 0.0);
        let events = feed(
            &mut r,
            &[
                (0, touch(TouchPhase::Start, &[a, b], &[a, b])),
                (
                    10,
                    touch(
                        TouchPhase::Move,
                        &[TouchPoint::new(1, 0.0, 12.0), TouchPoint::new(2, 50.0, 8.0)],
                        &[],
                    ),
                ),
            ],
        );
        match events.last() {
            Some(GestureEvent::TwoFingerPan { delta, .. }) => {
                assert!((delta.y - 10.0).abs() < f64::EPSILON);
            }
            other => panic!("Expected pan, got {:?}", other),
        }
    }
}
