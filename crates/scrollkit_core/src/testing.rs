//! Deterministic host double for engine and embedder tests
//!
//! [`MockHost`] implements [`Host`] over in-memory geometry tables with a
//! manually driven clock. Frames, timers, scroll events, cancel inputs, and
//! fragment navigation are all pumped explicitly by the test, so every
//! interleaving is reproducible.
//!
//! # Example
//!
//! ```rust
//! use scrollkit_core::testing::{ElementSpec, MockHost};
//! use scrollkit_core::{Axis, ContainerHandle, Host};
//!
//! let host = MockHost::new();
//! let el = host.add_element(ElementSpec { offset_top: 100.0, ..Default::default() });
//! assert_eq!(host.offset_start(el, Axis::Vertical), 100.0);
//! assert_eq!(host.scroll_position(ContainerHandle::Root, Axis::Vertical), 0.0);
//! ```

use crate::geometry::{Axis, ElementRect};
use crate::handles::{ContainerHandle, ElementId, HandleAllocator};
use crate::host::{
    CancelListener, FragmentListener, FrameCallback, Host, ListenerId, ScrollListener,
    TimerCallback, TimerId,
};
use rustc_hash::FxHashMap;
use std::sync::Mutex;

/// Geometry of a mock element, mirroring what a DOM host would read off a
/// real node
#[derive(Clone, Debug)]
pub struct ElementSpec {
    pub offset_left: f64,
    pub offset_top: f64,
    pub offset_parent: Option<ElementId>,
    pub positioned: bool,
    pub rect: ElementRect,
    pub client_width: f64,
    pub client_height: f64,
    pub offset_width: f64,
    pub offset_height: f64,
    pub visible: bool,
    pub dom_id: Option<String>,
    pub dom_name: Option<String>,
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self {
            offset_left: 0.0,
            offset_top: 0.0,
            offset_parent: None,
            positioned: false,
            rect: ElementRect::default(),
            client_width: 0.0,
            client_height: 0.0,
            offset_width: 0.0,
            offset_height: 0.0,
            visible: true,
            dom_id: None,
            dom_name: None,
        }
    }
}

/// Scroll metrics of a mock container
#[derive(Clone, Copy, Debug, Default)]
pub struct ContainerMetrics {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub content_width: f64,
    pub content_height: f64,
}

struct MockTimer {
    id: TimerId,
    fire_at: f64,
    callback: TimerCallback,
}

#[derive(Default)]
struct MockInner {
    allocator: HandleAllocator,
    elements: FxHashMap<ElementId, ElementSpec>,
    containers: FxHashMap<ContainerHandle, ContainerMetrics>,
    scroll_listeners: Vec<(ListenerId, ContainerHandle, ScrollListener)>,
    cancel_listeners: Vec<CancelListener>,
    fragment_listeners: Vec<(ListenerId, FragmentListener)>,
    frames: Vec<FrameCallback>,
    timers: Vec<MockTimer>,
    next_listener: u64,
    next_timer: u64,
    now: f64,
    fragment: String,
    history_pushes: usize,
    history_replaces: usize,
    scroll_log: Vec<(ContainerHandle, Axis, f64)>,
}

/// In-memory [`Host`] implementation with a manually pumped clock
#[derive(Default)]
pub struct MockHost {
    inner: Mutex<MockInner>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Fixture setup ───────────────────────────────────────────────────

    /// Add an element and return its handle
    pub fn add_element(&self, spec: ElementSpec) -> ElementId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.allocator.next();
        inner.elements.insert(id, spec);
        id
    }

    /// Mutate an element's geometry in place
    pub fn update_element(&self, id: ElementId, update: impl FnOnce(&mut ElementSpec)) {
        let mut inner = self.inner.lock().unwrap();
        let spec = inner.elements.get_mut(&id).expect("unknown mock element");
        update(spec);
    }

    /// Set a container's scroll metrics
    pub fn set_container(&self, container: ContainerHandle, metrics: ContainerMetrics) {
        self.inner.lock().unwrap().containers.insert(container, metrics);
    }

    // ─── Event pumping ───────────────────────────────────────────────────

    /// Deliver a scroll event to every listener of `container`
    pub fn emit_scroll(&self, container: ContainerHandle) {
        let listeners: Vec<ScrollListener> = {
            let inner = self.inner.lock().unwrap();
            inner
                .scroll_listeners
                .iter()
                .filter(|(_, c, _)| *c == container)
                .map(|(_, _, l)| l.clone())
                .collect()
        };
        for listener in listeners {
            listener();
        }
    }

    /// Deliver a cancel input (pointer-down, wheel, touch-move, key-down)
    pub fn emit_cancel(&self) {
        let listeners: Vec<CancelListener> =
            self.inner.lock().unwrap().cancel_listeners.clone();
        for listener in listeners {
            listener();
        }
    }

    /// Run every queued frame callback at the given timestamp, advancing the
    /// clock to it. Returns the number of callbacks run; callbacks scheduled
    /// during the run land in the next frame.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        let callbacks = {
            let mut inner = self.inner.lock().unwrap();
            inner.now = inner.now.max(timestamp);
            std::mem::take(&mut inner.frames)
        };
        let count = callbacks.len();
        for callback in callbacks {
            callback(timestamp);
        }
        count
    }

    /// Number of frame callbacks currently queued
    pub fn pending_frames(&self) -> usize {
        self.inner.lock().unwrap().frames.len()
    }

    /// Advance the clock, firing due timers in order
    pub fn advance(&self, ms: f64) {
        let deadline = {
            let mut inner = self.inner.lock().unwrap();
            inner.now += ms;
            inner.now
        };

        loop {
            let due = {
                let mut inner = self.inner.lock().unwrap();
                let next = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.fire_at <= deadline)
                    .min_by(|(_, a), (_, b)| a.fire_at.total_cmp(&b.fire_at))
                    .map(|(i, _)| i);
                next.map(|i| inner.timers.remove(i))
            };
            match due {
                Some(timer) => (timer.callback)(),
                None => break,
            }
        }
    }

    /// Simulate host-driven fragment navigation (fires fragment listeners)
    pub fn navigate_fragment(&self, fragment: &str) {
        let listeners: Vec<FragmentListener> = {
            let mut inner = self.inner.lock().unwrap();
            inner.fragment = fragment.to_string();
            inner.fragment_listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener();
        }
    }

    // ─── Inspection ──────────────────────────────────────────────────────

    pub fn history_pushes(&self) -> usize {
        self.inner.lock().unwrap().history_pushes
    }

    pub fn history_replaces(&self) -> usize {
        self.inner.lock().unwrap().history_replaces
    }

    /// Every `set_scroll` call in order
    pub fn scroll_log(&self) -> Vec<(ContainerHandle, Axis, f64)> {
        self.inner.lock().unwrap().scroll_log.clone()
    }

    pub fn scroll_listener_count(&self, container: ContainerHandle) -> usize {
        self.inner
            .lock()
            .unwrap()
            .scroll_listeners
            .iter()
            .filter(|(_, c, _)| *c == container)
            .count()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.lock().unwrap().timers.len()
    }

    fn with_element<R>(&self, id: ElementId, read: impl FnOnce(&ElementSpec) -> R) -> R {
        let inner = self.inner.lock().unwrap();
        read(inner.elements.get(&id).expect("unknown mock element"))
    }

    fn metrics(&self, container: ContainerHandle) -> ContainerMetrics {
        self.inner
            .lock()
            .unwrap()
            .containers
            .get(&container)
            .copied()
            .unwrap_or_default()
    }
}

impl Host for MockHost {
    fn scroll_position(&self, container: ContainerHandle, axis: Axis) -> f64 {
        let m = self.metrics(container);
        match axis {
            Axis::Vertical => m.scroll_y,
            Axis::Horizontal => m.scroll_x,
        }
    }

    fn viewport_extent(&self, container: ContainerHandle, axis: Axis) -> f64 {
        let m = self.metrics(container);
        match axis {
            Axis::Vertical => m.viewport_height,
            Axis::Horizontal => m.viewport_width,
        }
    }

    fn content_extent(&self, container: ContainerHandle, axis: Axis) -> f64 {
        let m = self.metrics(container);
        match axis {
            Axis::Vertical => m.content_height,
            Axis::Horizontal => m.content_width,
        }
    }

    fn set_scroll(&self, container: ContainerHandle, axis: Axis, position: f64) {
        let mut inner = self.inner.lock().unwrap();
        let metrics = inner.containers.entry(container).or_default();
        match axis {
            Axis::Vertical => metrics.scroll_y = position,
            Axis::Horizontal => metrics.scroll_x = position,
        }
        inner.scroll_log.push((container, axis, position));
    }

    fn bounding_rect(&self, element: ElementId) -> ElementRect {
        self.with_element(element, |e| e.rect)
    }

    fn offset_start(&self, element: ElementId, axis: Axis) -> f64 {
        self.with_element(element, |e| match axis {
            Axis::Vertical => e.offset_top,
            Axis::Horizontal => e.offset_left,
        })
    }

    fn offset_parent(&self, element: ElementId) -> Option<ElementId> {
        self.with_element(element, |e| e.offset_parent)
    }

    fn is_positioned(&self, element: ElementId) -> bool {
        self.with_element(element, |e| e.positioned)
    }

    fn client_extent(&self, element: ElementId, axis: Axis) -> f64 {
        self.with_element(element, |e| match axis {
            Axis::Vertical => e.client_height,
            Axis::Horizontal => e.client_width,
        })
    }

    fn offset_extent(&self, element: ElementId, axis: Axis) -> f64 {
        self.with_element(element, |e| match axis {
            Axis::Vertical => e.offset_height,
            Axis::Horizontal => e.offset_width,
        })
    }

    fn is_visible(&self, element: ElementId) -> bool {
        self.with_element(element, |e| e.visible)
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .iter()
            .find(|(_, e)| e.dom_id.as_deref() == Some(id))
            .map(|(handle, _)| *handle)
    }

    fn element_by_name(&self, name: &str) -> Option<ElementId> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .iter()
            .find(|(_, e)| e.dom_name.as_deref() == Some(name))
            .map(|(handle, _)| *handle)
    }

    fn now(&self) -> f64 {
        self.inner.lock().unwrap().now
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.inner.lock().unwrap().frames.push(callback);
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> TimerId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_timer += 1;
        let id = TimerId(inner.next_timer);
        let fire_at = inner.now + delay_ms;
        inner.timers.push(MockTimer {
            id,
            fire_at,
            callback,
        });
        id
    }

    fn clear_timeout(&self, timer: TimerId) {
        self.inner.lock().unwrap().timers.retain(|t| t.id != timer);
    }

    fn add_scroll_listener(
        &self,
        container: ContainerHandle,
        listener: ScrollListener,
    ) -> ListenerId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_listener += 1;
        let id = ListenerId(inner.next_listener);
        inner.scroll_listeners.push((id, container, listener));
        id
    }

    fn remove_scroll_listener(&self, listener: ListenerId) {
        self.inner
            .lock()
            .unwrap()
            .scroll_listeners
            .retain(|(id, _, _)| *id != listener);
    }

    fn add_cancel_listener(&self, listener: CancelListener) {
        self.inner.lock().unwrap().cancel_listeners.push(listener);
    }

    fn fragment(&self) -> String {
        self.inner.lock().unwrap().fragment.clone()
    }

    fn set_fragment(&self, fragment: &str, push_history: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.fragment = fragment.to_string();
        if push_history {
            inner.history_pushes += 1;
        } else {
            inner.history_replaces += 1;
        }
    }

    fn add_fragment_listener(&self, listener: FragmentListener) -> ListenerId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_listener += 1;
        let id = ListenerId(inner.next_listener);
        inner.fragment_listeners.push((id, listener));
        id
    }

    fn remove_fragment_listener(&self, listener: ListenerId) {
        self.inner
            .lock()
            .unwrap()
            .fragment_listeners
            .retain(|(id, _)| *id != listener);
    }
}
