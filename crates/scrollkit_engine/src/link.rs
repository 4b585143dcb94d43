//! Trigger bindings
//!
//! A trigger ties a navigation affordance to a registered target name: it
//! scrolls there on activation and, when spying, tracks whether the target
//! currently straddles the container's reference line. Attachment and
//! detachment are explicit; the handle owns every callback it registered so
//! detach can remove them by identity.

use crate::hash::HashSpy;
use crate::options::ScrollOptions;
use crate::registry::{Registry, VisibilityCallback};
use crate::spy::{ScrollSpy, SpyCallback};
use scrollkit_core::geometry::Axis;
use scrollkit_core::host::Host;
use scrollkit_core::{ContainerHandle, ElementId, ScrollError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct TriggerShared {
    name: String,
    options: ScrollOptions,
    container: ContainerHandle,
    host: Arc<dyn Host>,
    registry: Arc<Registry>,
    hash: Arc<HashSpy>,
    active: AtomicBool,
    visible: AtomicBool,
}

/// Live trigger binding; obtained from
/// [`ScrollEngine::attach_trigger`](crate::engine::ScrollEngine::attach_trigger)
pub struct TriggerHandle {
    shared: Arc<TriggerShared>,
    spy: Arc<ScrollSpy>,
    spy_callback: Option<SpyCallback>,
    visibility_callback: Option<VisibilityCallback>,
}

impl TriggerHandle {
    pub(crate) fn attach(
        host: Arc<dyn Host>,
        registry: Arc<Registry>,
        spy: Arc<ScrollSpy>,
        hash: Arc<HashSpy>,
        name: &str,
        options: ScrollOptions,
    ) -> Self {
        let container = options.spy_container(&*host);
        let shared = Arc::new(TriggerShared {
            name: name.to_string(),
            options,
            container,
            host,
            registry: Arc::clone(&registry),
            hash: Arc::clone(&hash),
            active: AtomicBool::new(false),
            visible: AtomicBool::new(false),
        });

        let spy_callback = if shared.options.spy || shared.options.hash_spy {
            if !spy.is_mounted(container) {
                spy.mount(container, shared.options.spy_throttle);
            }
            if shared.options.hash_spy {
                hash.mount(Arc::clone(&registry));
                hash.map_container(name, container);
            }
            let weak = Arc::downgrade(&shared);
            let callback: SpyCallback = Arc::new(move |x, y| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_spy(x, y);
                }
            });
            spy.add_spy_handler(container, callback.clone());
            Some(callback)
        } else {
            None
        };

        let visibility_callback = if shared.options.auto_hide {
            let weak = Arc::downgrade(&shared);
            let callback: VisibilityCallback = Arc::new(move |visible| {
                if let Some(shared) = weak.upgrade() {
                    shared.visible.store(visible, Ordering::SeqCst);
                }
            });
            registry.subscribe(name, callback.clone());
            Some(callback)
        } else {
            None
        };

        Self {
            shared,
            spy,
            spy_callback,
            visibility_callback,
        }
    }

    /// The "click": scroll to this trigger's target
    pub fn activate(&self) -> Result<(), ScrollError> {
        self.shared
            .registry
            .scroll_to(&self.shared.name, &self.shared.options)
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Whether the target straddled the reference line at the last sample
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Whether the target is currently bound; always `false` unless
    /// `auto_hide` was requested
    pub fn is_visible(&self) -> bool {
        self.shared.visible.load(Ordering::SeqCst)
    }

    /// Remove every callback this trigger registered
    pub fn detach(&mut self) {
        if let Some(callback) = self.spy_callback.take() {
            self.spy.unmount(&callback);
        }
        if let Some(callback) = self.visibility_callback.take() {
            self.shared.registry.unsubscribe(&self.shared.name, &callback);
        }
    }
}

impl Drop for TriggerHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

impl TriggerShared {
    /// Classify the target as inside/outside the reference line and drive
    /// active-link, fragment, and callback transitions
    fn on_spy(&self, x: f64, y: f64) {
        // During hash init the deferred fragment scroll has not run yet;
        // classifying now would clobber the fragment.
        if self.hash.is_mounted() && !self.hash.is_initialized() {
            return;
        }
        let Some(element) = self.registry.get(&self.name) else {
            return;
        };

        let axis = self.options.axis();
        let container_start = match self.container {
            ContainerHandle::Root => 0.0,
            ContainerHandle::Element(id) => self.host.bounding_rect(id).start(axis),
        };
        let sample = match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        };
        let rect = self.host.bounding_rect(element);
        let elem_start = rect.start(axis) - container_start + sample;
        let elem_end = elem_start + rect.extent(axis);
        let point = sample - self.options.offset;
        let inside = point >= elem_start.floor() && point < elem_end.floor();

        let active_link = self.registry.get_active_link();
        let was_active = self.active.load(Ordering::SeqCst);

        if !inside {
            if self.options.sticky {
                // Stay lit until another trigger has taken the active link.
                if was_active
                    && active_link.is_some()
                    && active_link.as_deref() != Some(&self.name)
                    && self.options.spy
                {
                    self.active.store(false, Ordering::SeqCst);
                    self.fire_inactive(element);
                }
            } else {
                if active_link.as_deref() == Some(&self.name) {
                    self.registry.set_active_link(None);
                }
                if self.options.hash_spy && self.hash.get_hash() == self.name {
                    self.hash.change_hash(None, self.options.save_hash_history);
                }
                if self.options.spy && was_active {
                    self.active.store(false, Ordering::SeqCst);
                    self.fire_inactive(element);
                }
            }
            return;
        }

        if active_link.as_deref() != Some(&self.name) || !was_active {
            self.registry.set_active_link(Some(&self.name));
            if self.options.hash_spy {
                self.hash
                    .change_hash(Some(&self.name), self.options.save_hash_history);
            }
            if self.options.spy && !was_active {
                self.active.store(true, Ordering::SeqCst);
                if let Some(callback) = &self.options.on_set_active {
                    callback(&self.name, Some(element));
                }
            }
        }
    }

    fn fire_inactive(&self, element: ElementId) {
        if let Some(callback) = &self.options.on_set_inactive {
            callback(&self.name, Some(element));
        }
    }
}
