//! Hash synchronizer
//!
//! Keeps the host's location fragment and the registry's active link in
//! step, in both directions: fragment navigation scrolls to the matching
//! target, and spy activation rewrites the fragment.

use crate::options::ScrollOptions;
use crate::registry::Registry;
use rustc_hash::FxHashMap;
use scrollkit_core::host::{Host, ListenerId, TimerId};
use scrollkit_core::ContainerHandle;
use std::sync::{Arc, Mutex};

/// Deferral before the initial fragment scroll, so late-registering targets
/// have a chance to bind first
pub const INIT_SCROLL_DELAY_MS: f64 = 10.0;

#[derive(Default)]
struct HashInner {
    registry: Option<Arc<Registry>>,
    /// Name → container overrides for fragment-driven scrolls
    containers: FxHashMap<String, ContainerHandle>,
    mounted: bool,
    /// Fragment writes are suppressed until the initial scroll has run
    initialized: bool,
    listener: Option<ListenerId>,
    /// Pending deferred initial scroll, cancelled on unmount
    init_timer: Option<TimerId>,
}

pub struct HashSpy {
    host: Arc<dyn Host>,
    inner: Mutex<HashInner>,
}

impl HashSpy {
    pub fn new(host: Arc<dyn Host>) -> Arc<Self> {
        Arc::new(Self {
            host,
            inner: Mutex::new(HashInner::default()),
        })
    }

    /// Begin mirroring fragment state. When the location already carries a
    /// fragment, the matching scroll runs after a short deferral; until it
    /// does, [`change_hash`](Self::change_hash) stays silent.
    pub fn mount(self: &Arc<Self>, registry: Arc<Registry>) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.mounted {
                return;
            }
            inner.mounted = true;
            inner.registry = Some(registry);
            let weak = Arc::downgrade(self);
            inner.listener = Some(self.host.add_fragment_listener(Arc::new(move || {
                if let Some(spy) = weak.upgrade() {
                    spy.handle_hash_change();
                }
            })));
        }

        let fragment = self.host.fragment();
        if fragment.is_empty() {
            self.inner.lock().unwrap().initialized = true;
        } else {
            let weak = Arc::downgrade(self);
            let timer = self.host.set_timeout(
                INIT_SCROLL_DELAY_MS,
                Box::new(move || {
                    if let Some(spy) = weak.upgrade() {
                        spy.scroll_to_hash(&fragment, true);
                        let mut inner = spy.inner.lock().unwrap();
                        inner.initialized = true;
                        inner.init_timer = None;
                    }
                }),
            );
            self.inner.lock().unwrap().init_timer = Some(timer);
        }
    }

    pub fn unmount(&self) {
        let (listener, timer) = {
            let mut inner = self.inner.lock().unwrap();
            let listener = inner.listener.take();
            let timer = inner.init_timer.take();
            *inner = HashInner::default();
            (listener, timer)
        };
        if let Some(listener) = listener {
            self.host.remove_fragment_listener(listener);
        }
        if let Some(timer) = timer {
            self.host.clear_timeout(timer);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.lock().unwrap().mounted
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().unwrap().initialized
    }

    /// Route fragment-driven scrolls for `name` into `container` instead of
    /// the root
    pub fn map_container(&self, name: &str, container: ContainerHandle) {
        self.inner
            .lock()
            .unwrap()
            .containers
            .insert(name.to_string(), container);
    }

    /// Current fragment, without the leading `#`
    pub fn get_hash(&self) -> String {
        self.host.fragment()
    }

    /// Rewrite the fragment to `to` (or clear it), only once initialized and
    /// only when it actually changes. `save_history` picks push over
    /// replace.
    pub fn change_hash(&self, to: Option<&str>, save_history: bool) {
        if !self.is_initialized() {
            return;
        }
        let next = to.unwrap_or("");
        if self.host.fragment() != next {
            self.host.set_fragment(next, save_history);
        }
    }

    fn handle_hash_change(&self) {
        let fragment = self.host.fragment();
        if !fragment.is_empty() {
            self.scroll_to_hash(&fragment, false);
        }
    }

    /// Scroll to the target named by the fragment. Outside init, a fragment
    /// matching the already-active link is left alone so spy-driven rewrites
    /// do not echo back as scrolls.
    fn scroll_to_hash(&self, to: &str, is_init: bool) {
        let (registry, container) = {
            let inner = self.inner.lock().unwrap();
            let Some(registry) = inner.registry.clone() else {
                return;
            };
            (registry, inner.containers.get(to).copied())
        };

        if registry.get(to).is_none() {
            return;
        }
        if !is_init && registry.get_active_link().as_deref() == Some(to) {
            return;
        }

        let mut options = ScrollOptions::new();
        if let Some(container) = container {
            options = options.container(container);
        }
        if let Err(err) = registry.scroll_to(to, &options) {
            tracing::warn!(name = %to, %err, "fragment scroll failed");
        }
    }
}
