//! Scroll-spy dispatcher
//!
//! Per-container throttled scroll observation. Each mounted container holds
//! one host scroll listener and a handler list; handlers receive the raw
//! `(x, y)` sample and are dispatched in registration order while the
//! position decreases, reversed while it increases, so nested anchors
//! activate innermost-first in the travel direction.

use scrollkit_core::geometry::Axis;
use scrollkit_core::host::{Host, ListenerId, TimerId};
use scrollkit_core::ContainerHandle;
use std::sync::{Arc, Mutex};

/// Scroll sample handler, called with the container's `(x, y)` positions
pub type SpyCallback = Arc<dyn Fn(f64, f64) + Send + Sync>;

/// Leading-edge throttle window for scroll sampling
pub const DEFAULT_THROTTLE_MS: f64 = 66.0;

struct SpyContainer {
    handle: ContainerHandle,
    listener: ListenerId,
    callbacks: Vec<SpyCallback>,
    /// Baseline used for direction classification, updated every tick
    last: (f64, f64),
    throttle_ms: f64,
    last_tick: Option<f64>,
    trailing: Option<TimerId>,
}

/// Mount/unmount bookkeeping for spied containers
pub struct ScrollSpy {
    host: Arc<dyn Host>,
    inner: Mutex<Vec<SpyContainer>>,
}

impl ScrollSpy {
    pub fn new(host: Arc<dyn Host>) -> Arc<Self> {
        Arc::new(Self {
            host,
            inner: Mutex::new(Vec::new()),
        })
    }

    /// Begin observing `container`. Not idempotent: a second mount of the
    /// same container duplicates the host listener, so callers check
    /// [`is_mounted`](Self::is_mounted) first.
    pub fn mount(self: &Arc<Self>, container: ContainerHandle, throttle: Option<f64>) {
        let baseline = (
            self.host.scroll_position(container, Axis::Horizontal),
            self.host.scroll_position(container, Axis::Vertical),
        );
        let weak = Arc::downgrade(self);
        let listener = self.host.add_scroll_listener(
            container,
            Arc::new(move || {
                if let Some(spy) = weak.upgrade() {
                    spy.on_scroll(container);
                }
            }),
        );
        self.inner.lock().unwrap().push(SpyContainer {
            handle: container,
            listener,
            callbacks: Vec::new(),
            last: baseline,
            throttle_ms: throttle.unwrap_or(DEFAULT_THROTTLE_MS),
            last_tick: None,
            trailing: None,
        });
    }

    pub fn is_mounted(&self, container: ContainerHandle) -> bool {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .any(|entry| entry.handle == container)
    }

    /// Attach a handler to a mounted container. Fires once immediately with
    /// the current baseline so late subscribers start classified.
    pub fn add_spy_handler(&self, container: ContainerHandle, callback: SpyCallback) {
        let baseline = {
            let mut inner = self.inner.lock().unwrap();
            let Some(entry) = inner.iter_mut().find(|entry| entry.handle == container) else {
                tracing::warn!(?container, "spy handler added to unmounted container");
                return;
            };
            entry.callbacks.push(callback.clone());
            entry.last
        };
        callback(baseline.0, baseline.1);
    }

    /// Detach a handler (by callback identity) from every container it was
    /// attached to. Containers left with no handlers are torn down: the host
    /// scroll listener is removed and any pending trailing tick cancelled.
    pub fn unmount(&self, callback: &SpyCallback) {
        let mut teardown = Vec::new();
        {
            let mut inner = self.inner.lock().unwrap();
            inner.retain_mut(|entry| {
                let before = entry.callbacks.len();
                entry
                    .callbacks
                    .retain(|existing| !Arc::ptr_eq(existing, callback));
                if entry.callbacks.len() < before && entry.callbacks.is_empty() {
                    teardown.push((entry.listener, entry.trailing.take()));
                    false
                } else {
                    true
                }
            });
        }
        for (listener, trailing) in teardown {
            self.host.remove_scroll_listener(listener);
            if let Some(timer) = trailing {
                self.host.clear_timeout(timer);
            }
        }
    }

    /// Force an immediate sample of every mounted container, bypassing the
    /// throttle. Used after layout changes that move anchors without
    /// scrolling.
    pub fn update(&self) {
        let containers: Vec<ContainerHandle> = {
            let inner = self.inner.lock().unwrap();
            inner.iter().map(|entry| entry.handle).collect()
        };
        for container in containers {
            self.tick(container);
        }
    }

    fn on_scroll(self: &Arc<Self>, container: ContainerHandle) {
        let now = self.host.now();
        let mut fire = false;
        let mut schedule = None;
        {
            let mut inner = self.inner.lock().unwrap();
            let Some(entry) = inner.iter_mut().find(|entry| entry.handle == container) else {
                return;
            };
            match entry.last_tick {
                Some(last) if now - last < entry.throttle_ms => {
                    if entry.trailing.is_none() {
                        schedule = Some(entry.throttle_ms - (now - last));
                    }
                }
                _ => {
                    entry.last_tick = Some(now);
                    fire = true;
                }
            }
        }
        if fire {
            self.tick(container);
        } else if let Some(remainder) = schedule {
            let weak = Arc::downgrade(self);
            let timer = self.host.set_timeout(
                remainder,
                Box::new(move || {
                    if let Some(spy) = weak.upgrade() {
                        spy.trailing_tick(container);
                    }
                }),
            );
            let mut inner = self.inner.lock().unwrap();
            if let Some(entry) = inner.iter_mut().find(|entry| entry.handle == container) {
                entry.trailing = Some(timer);
            }
        }
    }

    fn trailing_tick(&self, container: ContainerHandle) {
        let now = self.host.now();
        {
            let mut inner = self.inner.lock().unwrap();
            let Some(entry) = inner.iter_mut().find(|entry| entry.handle == container) else {
                return;
            };
            entry.trailing = None;
            entry.last_tick = Some(now);
        }
        self.tick(container);
    }

    /// Sample both axes, classify the travel direction against the stored
    /// baseline, and dispatch. The baseline is updated before handlers run
    /// so a handler that reads back sees the new state.
    fn tick(&self, container: ContainerHandle) {
        let x = self.host.scroll_position(container, Axis::Horizontal);
        let y = self.host.scroll_position(container, Axis::Vertical);
        let callbacks = {
            let mut inner = self.inner.lock().unwrap();
            let Some(entry) = inner.iter_mut().find(|entry| entry.handle == container) else {
                return;
            };
            let increasing = x > entry.last.0 || y > entry.last.1;
            entry.last = (x, y);
            let mut callbacks = entry.callbacks.clone();
            if increasing {
                callbacks.reverse();
            }
            callbacks
        };
        for callback in callbacks {
            callback(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollkit_core::testing::{ContainerMetrics, MockHost};

    fn spy() -> (Arc<MockHost>, Arc<ScrollSpy>) {
        let host = Arc::new(MockHost::new());
        host.set_container(ContainerHandle::Root, ContainerMetrics::default());
        let spy = ScrollSpy::new(Arc::clone(&host) as Arc<dyn Host>);
        (host, spy)
    }

    fn recording_callback(log: &Arc<Mutex<Vec<(&'static str, f64)>>>, tag: &'static str) -> SpyCallback {
        let log = Arc::clone(log);
        Arc::new(move |_, y| log.lock().unwrap().push((tag, y)))
    }

    #[test]
    fn handler_fires_immediately_with_baseline() {
        let (host, spy) = spy();
        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 40.0,
                ..Default::default()
            },
        );
        spy.mount(ContainerHandle::Root, None);

        let log = Arc::new(Mutex::new(Vec::new()));
        spy.add_spy_handler(ContainerHandle::Root, recording_callback(&log, "a"));
        assert_eq!(*log.lock().unwrap(), vec![("a", 40.0)]);
    }

    #[test]
    fn dispatch_order_reverses_while_scrolling_down() {
        let (host, spy) = spy();
        spy.mount(ContainerHandle::Root, None);

        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            spy.add_spy_handler(ContainerHandle::Root, recording_callback(&log, tag));
        }
        log.lock().unwrap().clear();

        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 120.0,
                ..Default::default()
            },
        );
        host.emit_scroll(ContainerHandle::Root);
        assert_eq!(*log.lock().unwrap(), vec![("c", 120.0), ("b", 120.0), ("a", 120.0)]);

        log.lock().unwrap().clear();
        host.advance(DEFAULT_THROTTLE_MS);
        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 30.0,
                ..Default::default()
            },
        );
        host.emit_scroll(ContainerHandle::Root);
        assert_eq!(*log.lock().unwrap(), vec![("a", 30.0), ("b", 30.0), ("c", 30.0)]);
    }

    #[test]
    fn throttle_coalesces_bursts_into_a_trailing_tick() {
        let (host, spy) = spy();
        spy.mount(ContainerHandle::Root, None);

        let log = Arc::new(Mutex::new(Vec::new()));
        spy.add_spy_handler(ContainerHandle::Root, recording_callback(&log, "a"));
        log.lock().unwrap().clear();

        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 10.0,
                ..Default::default()
            },
        );
        host.emit_scroll(ContainerHandle::Root);
        assert_eq!(log.lock().unwrap().len(), 1);

        // Inside the window: no leading tick, one trailing timer.
        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 20.0,
                ..Default::default()
            },
        );
        host.emit_scroll(ContainerHandle::Root);
        host.emit_scroll(ContainerHandle::Root);
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(host.pending_timers(), 1);

        host.advance(DEFAULT_THROTTLE_MS);
        assert_eq!(*log.lock().unwrap(), vec![("a", 10.0), ("a", 20.0)]);
    }

    #[test]
    fn unmount_tears_down_when_last_handler_leaves() {
        let (host, spy) = spy();
        spy.mount(ContainerHandle::Root, None);

        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recording_callback(&log, "a");
        let second = recording_callback(&log, "b");
        spy.add_spy_handler(ContainerHandle::Root, first.clone());
        spy.add_spy_handler(ContainerHandle::Root, second.clone());
        assert_eq!(host.scroll_listener_count(ContainerHandle::Root), 1);

        spy.unmount(&first);
        assert!(spy.is_mounted(ContainerHandle::Root));
        assert_eq!(host.scroll_listener_count(ContainerHandle::Root), 1);

        spy.unmount(&second);
        assert!(!spy.is_mounted(ContainerHandle::Root));
        assert_eq!(host.scroll_listener_count(ContainerHandle::Root), 0);
    }

    #[test]
    fn update_samples_without_a_scroll_event() {
        let (host, spy) = spy();
        spy.mount(ContainerHandle::Root, None);

        let log = Arc::new(Mutex::new(Vec::new()));
        spy.add_spy_handler(ContainerHandle::Root, recording_callback(&log, "a"));
        log.lock().unwrap().clear();

        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 75.0,
                ..Default::default()
            },
        );
        spy.update();
        assert_eq!(*log.lock().unwrap(), vec![("a", 75.0)]);
    }
}
