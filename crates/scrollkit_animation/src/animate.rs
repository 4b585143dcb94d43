//! Cancellable scroll tweening
//!
//! Each animated scroll is an ephemeral [`Session`]: a small state machine
//! created per invocation and advanced by host frame callbacks. The animator
//! itself is long-lived; it owns the host cancel subscription and tracks live
//! sessions weakly so a cancel input can flag all of them at once.
//!
//! Stepping is iterative: `step` re-requests a frame while progress is
//! below 1, so stack depth stays constant and cancellation has exactly one
//! poll point per frame.

use crate::easing::Easing;
use scrollkit_core::geometry::Axis;
use scrollkit_core::handles::{ContainerHandle, ElementId};
use scrollkit_core::host::Host;
use scrollkit_core::ScrollEvents;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Fallback when a duration function returns NaN
pub const DURATION_FALLBACK_MS: f64 = 1000.0;

/// Animation duration: fixed, or derived from the scroll distance in px
#[derive(Clone)]
pub enum ScrollDuration {
    Millis(f64),
    PerDistance(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Default for ScrollDuration {
    fn default() -> Self {
        ScrollDuration::Millis(0.0)
    }
}

impl ScrollDuration {
    /// Duration in ms for the given (rounded) scroll delta. NaN results are
    /// recovered locally with [`DURATION_FALLBACK_MS`]; this is a
    /// configuration slip, not a reason to abort a scroll.
    fn resolve(&self, delta: f64) -> f64 {
        let raw = match self {
            ScrollDuration::Millis(ms) => *ms,
            ScrollDuration::PerDistance(f) => f(delta),
        };
        if raw.is_nan() {
            tracing::warn!("duration function returned NaN, using fallback");
            DURATION_FALLBACK_MS
        } else {
            raw.round()
        }
    }
}

/// One animated scroll invocation
#[derive(Clone)]
pub struct AnimationRequest {
    pub container: ContainerHandle,
    pub axis: Axis,
    /// Target offset in px: absolute content offset, or a delta from the
    /// current position when `absolute` is false
    pub offset: f64,
    pub absolute: bool,
    pub easing: Easing,
    pub duration: ScrollDuration,
    /// Milliseconds to wait before the first frame; `begin` fires only once
    /// the delay elapses
    pub delay: f64,
    /// Keep animating through host cancel inputs
    pub ignore_cancel_events: bool,
    /// Target name for event payloads
    pub name: Option<String>,
    /// Target element for event payloads
    pub target: Option<ElementId>,
}

impl Default for AnimationRequest {
    fn default() -> Self {
        Self {
            container: ContainerHandle::Root,
            axis: Axis::Vertical,
            offset: 0.0,
            absolute: true,
            easing: Easing::Default,
            duration: ScrollDuration::default(),
            delay: 0.0,
            ignore_cancel_events: false,
            name: None,
            target: None,
        }
    }
}

/// Tween phase, per invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Done,
    Cancelled,
}

struct SessionState {
    phase: Phase,
    container: ContainerHandle,
    axis: Axis,
    easing: Easing,
    start_position: f64,
    target_position: f64,
    current_position: f64,
    start_time: Option<f64>,
    duration: f64,
    name: Option<String>,
    target: Option<ElementId>,
}

struct Session {
    cancel: AtomicBool,
    ignore_cancel: bool,
    state: Mutex<SessionState>,
}

impl Session {
    fn is_cancelled(&self) -> bool {
        !self.ignore_cancel && self.cancel.load(Ordering::SeqCst)
    }

    fn end_payload(&self) -> (Option<String>, Option<ElementId>, f64) {
        let state = self.state.lock().unwrap();
        (state.name.clone(), state.target, state.current_position)
    }
}

/// Drives animated scrolls over the host frame source
pub struct Animator {
    host: Arc<dyn Host>,
    events: Arc<ScrollEvents>,
    sessions: Mutex<Vec<Weak<Session>>>,
}

impl Animator {
    /// Create an animator and subscribe it to the host cancel-input set.
    /// The subscription lives for the host's lifetime and flags whatever
    /// sessions are live when an input arrives.
    pub fn new(host: Arc<dyn Host>, events: Arc<ScrollEvents>) -> Arc<Self> {
        let animator = Arc::new(Self {
            host,
            events,
            sessions: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&animator);
        animator.host.add_cancel_listener(Arc::new(move || {
            if let Some(animator) = weak.upgrade() {
                animator.cancel_all();
            }
        }));

        animator
    }

    /// Flag every live session for cancellation. Sessions that opted into
    /// `ignore_cancel_events` keep running.
    pub fn cancel_all(&self) {
        let sessions = self.sessions.lock().unwrap();
        for weak in sessions.iter() {
            if let Some(session) = weak.upgrade() {
                session.cancel.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Start an animated scroll. Fires `begin` when the tween actually
    /// starts (immediately, or after the requested delay) and exactly one
    /// `end` when it finishes or is cancelled.
    pub fn animate(self: &Arc<Self>, request: AnimationRequest) {
        let start = self.host.scroll_position(request.container, request.axis);
        let target = if request.absolute {
            request.offset
        } else {
            request.offset + start
        };

        if start == target {
            // Nothing to do: no begin, no frames.
            self.events
                .fire_end(request.name.as_deref(), request.target, Some(start));
            return;
        }

        let delta = (target - start).round();
        let duration = request.duration.resolve(delta);

        let session = Arc::new(Session {
            cancel: AtomicBool::new(false),
            ignore_cancel: request.ignore_cancel_events,
            state: Mutex::new(SessionState {
                phase: Phase::Pending,
                container: request.container,
                axis: request.axis,
                easing: request.easing,
                start_position: start,
                target_position: target,
                current_position: start,
                start_time: None,
                duration,
                name: request.name,
                target: request.target,
            }),
        });

        {
            let mut sessions = self.sessions.lock().unwrap();
            sessions.retain(|weak| weak.strong_count() > 0);
            sessions.push(Arc::downgrade(&session));
        }

        if request.delay > 0.0 {
            let animator = Arc::clone(self);
            let delayed = Arc::clone(&session);
            self.host.set_timeout(
                request.delay,
                Box::new(move || animator.start_running(delayed)),
            );
            return;
        }

        self.start_running(session);
    }

    /// Fire `begin` and schedule the first frame. A cancel flag set during
    /// the delay window is observed at first-frame entry.
    fn start_running(self: &Arc<Self>, session: Arc<Session>) {
        let (name, target) = {
            let state = session.state.lock().unwrap();
            (state.name.clone(), state.target)
        };
        tracing::debug!(name = name.as_deref(), "scroll animation begin");
        self.events.fire_begin(name.as_deref(), target);
        self.schedule_frame(session);
    }

    fn schedule_frame(self: &Arc<Self>, session: Arc<Session>) {
        let animator = Arc::clone(self);
        self.host
            .request_frame(Box::new(move |timestamp| animator.step(&session, timestamp)));
    }

    /// Advance one frame. Polls the cancel flag, computes eased progress
    /// from the elapsed time, applies the position, and either reschedules
    /// or terminates with a single `end` event.
    fn step(self: &Arc<Self>, session: &Arc<Session>, timestamp: f64) {
        if session.is_cancelled() {
            session.state.lock().unwrap().phase = Phase::Cancelled;
            let (name, target, position) = session.end_payload();
            tracing::debug!(name = name.as_deref(), position, "scroll animation cancelled");
            self.events.fire_end(name.as_deref(), target, Some(position));
            return;
        }

        let (container, axis, position, finished) = {
            let mut state = session.state.lock().unwrap();
            if matches!(state.phase, Phase::Done | Phase::Cancelled) {
                return;
            }
            state.phase = Phase::Running;
            let start_time = *state.start_time.get_or_insert(timestamp);
            let elapsed = timestamp - start_time;
            let percent = if elapsed >= state.duration {
                1.0
            } else {
                state.easing.eval(elapsed / state.duration)
            };
            let delta = (state.target_position - state.start_position).round();
            state.current_position = state.start_position + (delta * percent).ceil();
            if percent >= 1.0 {
                state.phase = Phase::Done;
            }
            (
                state.container,
                state.axis,
                state.current_position,
                percent >= 1.0,
            )
        };

        self.host.set_scroll(container, axis, position);

        if !finished {
            self.schedule_frame(Arc::clone(session));
            return;
        }

        let (name, target, position) = session.end_payload();
        tracing::debug!(name = name.as_deref(), position, "scroll animation end");
        self.events.fire_end(name.as_deref(), target, Some(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollkit_core::testing::{ContainerMetrics, MockHost};
    use std::sync::atomic::AtomicUsize;

    struct Fixture {
        host: Arc<MockHost>,
        animator: Arc<Animator>,
        ends: Arc<AtomicUsize>,
        begins: Arc<AtomicUsize>,
        last_end_position: Arc<Mutex<Option<f64>>>,
    }

    fn fixture() -> Fixture {
        let host = Arc::new(MockHost::new());
        let events = Arc::new(ScrollEvents::new());
        let ends = Arc::new(AtomicUsize::new(0));
        let begins = Arc::new(AtomicUsize::new(0));
        let last_end_position = Arc::new(Mutex::new(None));

        {
            let begins = Arc::clone(&begins);
            events.on_begin(move |_, _, _| {
                begins.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let ends = Arc::clone(&ends);
            let last = Arc::clone(&last_end_position);
            events.on_end(move |_, _, position| {
                ends.fetch_add(1, Ordering::SeqCst);
                *last.lock().unwrap() = position;
            });
        }

        let animator = Animator::new(
            Arc::clone(&host) as Arc<dyn Host>,
            Arc::clone(&events),
        );
        Fixture {
            host,
            animator,
            ends,
            begins,
            last_end_position,
        }
    }

    fn linear_request(offset: f64, duration_ms: f64) -> AnimationRequest {
        AnimationRequest {
            offset,
            easing: Easing::Linear,
            duration: ScrollDuration::Millis(duration_ms),
            ..Default::default()
        }
    }

    fn vertical_positions(host: &MockHost) -> Vec<f64> {
        host.scroll_log()
            .into_iter()
            .filter(|(c, axis, _)| c.is_root() && *axis == Axis::Vertical)
            .map(|(_, _, p)| p)
            .collect()
    }

    #[test]
    fn linear_tween_is_monotonic_and_exact() {
        let f = fixture();
        f.animator.animate(linear_request(1000.0, 1000.0));
        assert_eq!(f.begins.load(Ordering::SeqCst), 1);

        for timestamp in [0.0, 250.0, 500.0, 750.0, 1000.0] {
            assert_eq!(f.host.run_frame(timestamp), 1);
        }

        let positions = vertical_positions(&f.host);
        assert!(positions.windows(2).all(|w| w[0] <= w[1]), "{positions:?}");
        assert_eq!(*positions.last().unwrap(), 1000.0);
        assert_eq!(f.ends.load(Ordering::SeqCst), 1);
        assert_eq!(*f.last_end_position.lock().unwrap(), Some(1000.0));
        assert_eq!(f.host.pending_frames(), 0);
    }

    #[test]
    fn cancel_mid_animation_fires_single_end_at_partial_position() {
        let f = fixture();
        f.animator.animate(linear_request(1000.0, 1000.0));

        f.host.run_frame(0.0);
        f.host.run_frame(250.0);
        f.host.emit_cancel();
        f.host.run_frame(500.0);

        assert_eq!(f.ends.load(Ordering::SeqCst), 1);
        assert_eq!(*f.last_end_position.lock().unwrap(), Some(250.0));
        // No frame was rescheduled and no position written past the cancel.
        assert_eq!(f.host.pending_frames(), 0);
        assert_eq!(*vertical_positions(&f.host).last().unwrap(), 250.0);
    }

    #[test]
    fn ignore_cancel_events_runs_to_completion() {
        let f = fixture();
        f.animator.animate(AnimationRequest {
            ignore_cancel_events: true,
            ..linear_request(100.0, 400.0)
        });

        f.host.run_frame(0.0);
        f.host.emit_cancel();
        f.host.run_frame(200.0);
        f.host.run_frame(400.0);

        assert_eq!(f.ends.load(Ordering::SeqCst), 1);
        assert_eq!(*f.last_end_position.lock().unwrap(), Some(100.0));
    }

    #[test]
    fn zero_delta_fires_end_without_begin_or_frames() {
        let f = fixture();
        f.host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 300.0,
                ..Default::default()
            },
        );
        f.animator.animate(linear_request(300.0, 1000.0));

        assert_eq!(f.begins.load(Ordering::SeqCst), 0);
        assert_eq!(f.ends.load(Ordering::SeqCst), 1);
        assert_eq!(f.host.pending_frames(), 0);
    }

    #[test]
    fn delay_defers_begin_until_elapsed() {
        let f = fixture();
        f.animator.animate(AnimationRequest {
            delay: 100.0,
            ..linear_request(200.0, 100.0)
        });

        assert_eq!(f.begins.load(Ordering::SeqCst), 0);
        assert_eq!(f.host.pending_frames(), 0);

        f.host.advance(100.0);
        assert_eq!(f.begins.load(Ordering::SeqCst), 1);
        assert_eq!(f.host.pending_frames(), 1);

        f.host.run_frame(100.0);
        f.host.run_frame(200.0);
        assert_eq!(f.ends.load(Ordering::SeqCst), 1);
        assert_eq!(*f.last_end_position.lock().unwrap(), Some(200.0));
    }

    #[test]
    fn cancel_during_delay_skips_animating() {
        let f = fixture();
        f.animator.animate(AnimationRequest {
            delay: 50.0,
            ..linear_request(500.0, 1000.0)
        });

        f.host.emit_cancel();
        f.host.advance(50.0);
        // begin fired with the delay, but the first frame observes the flag.
        assert_eq!(f.begins.load(Ordering::SeqCst), 1);
        f.host.run_frame(60.0);

        assert_eq!(f.ends.load(Ordering::SeqCst), 1);
        assert_eq!(*f.last_end_position.lock().unwrap(), Some(0.0));
        assert!(vertical_positions(&f.host).is_empty());
    }

    #[test]
    fn nan_duration_uses_fallback() {
        let f = fixture();
        f.animator.animate(AnimationRequest {
            duration: ScrollDuration::PerDistance(Arc::new(|_| f64::NAN)),
            ..linear_request(1000.0, 0.0)
        });

        f.host.run_frame(0.0);
        f.host.run_frame(500.0);
        // Halfway through the 1000 ms fallback.
        assert_eq!(*vertical_positions(&f.host).last().unwrap(), 500.0);
    }

    #[test]
    fn relative_offset_targets_current_plus_delta() {
        let f = fixture();
        f.host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 100.0,
                ..Default::default()
            },
        );
        f.animator.animate(AnimationRequest {
            absolute: false,
            ..linear_request(50.0, 100.0)
        });

        f.host.run_frame(0.0);
        f.host.run_frame(100.0);
        assert_eq!(*vertical_positions(&f.host).last().unwrap(), 150.0);
    }

    #[test]
    fn duration_function_receives_rounded_delta() {
        let f = fixture();
        let seen = Arc::new(Mutex::new(None));
        let seen_in = Arc::clone(&seen);
        f.animator.animate(AnimationRequest {
            duration: ScrollDuration::PerDistance(Arc::new(move |delta| {
                *seen_in.lock().unwrap() = Some(delta);
                delta
            })),
            ..linear_request(400.4, 0.0)
        });
        assert_eq!(*seen.lock().unwrap(), Some(400.0));
        f.host.run_frame(0.0);
        f.host.run_frame(400.0);
        assert_eq!(f.ends.load(Ordering::SeqCst), 1);
    }
}
