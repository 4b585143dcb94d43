//! Engine composition
//!
//! `ScrollEngine` wires the registry, spy, hash synchronizer, and animator
//! over a single host. Most applications hold exactly one, installed as the
//! global instance at startup.

use crate::hash::HashSpy;
use crate::link::TriggerHandle;
use crate::options::ScrollOptions;
use crate::registry::{Registry, VisibilityCallback};
use crate::spy::ScrollSpy;
use scrollkit_animation::{AnimationRequest, Animator, Easing, ScrollDuration};
use scrollkit_core::host::Host;
use scrollkit_core::{ContainerHandle, ElementId, ScrollError, ScrollEvents};
use std::sync::{Arc, OnceLock};

// ============================================================================
// Global Engine State
// ============================================================================

/// Global engine instance for access from anywhere in the application
static GLOBAL_ENGINE: OnceLock<Arc<ScrollEngine>> = OnceLock::new();

/// Set the global scroll engine
///
/// This should be called once at app startup after constructing the engine.
///
/// # Panics
///
/// Panics if called more than once.
pub fn set_global_engine(engine: Arc<ScrollEngine>) {
    if GLOBAL_ENGINE.set(engine).is_err() {
        panic!("set_global_engine() called more than once");
    }
}

/// Get the global scroll engine
///
/// # Panics
///
/// Panics if `set_global_engine()` has not been called.
pub fn get_engine() -> Arc<ScrollEngine> {
    GLOBAL_ENGINE
        .get()
        .expect("Scroll engine not initialized. Call set_global_engine() at app startup.")
        .clone()
}

/// Try to get the global engine (returns None if not initialized)
pub fn try_get_engine() -> Option<Arc<ScrollEngine>> {
    GLOBAL_ENGINE.get().cloned()
}

/// Check if the global engine has been initialized
pub fn is_engine_initialized() -> bool {
    GLOBAL_ENGINE.get().is_some()
}

pub struct ScrollEngine {
    host: Arc<dyn Host>,
    events: Arc<ScrollEvents>,
    animator: Arc<Animator>,
    registry: Arc<Registry>,
    spy: Arc<ScrollSpy>,
    hash: Arc<HashSpy>,
}

impl ScrollEngine {
    pub fn new(host: Arc<dyn Host>) -> Arc<Self> {
        let events = Arc::new(ScrollEvents::new());
        let animator = Animator::new(Arc::clone(&host), Arc::clone(&events));
        let registry = Arc::new(Registry::new(
            Arc::clone(&host),
            Arc::clone(&animator),
            Arc::clone(&events),
        ));
        let spy = ScrollSpy::new(Arc::clone(&host));
        let hash = HashSpy::new(Arc::clone(&host));
        Arc::new(Self {
            host,
            events,
            animator,
            registry,
            spy,
            hash,
        })
    }

    // ────────────────────────────────────────────────────────────────────
    // Component access
    // ────────────────────────────────────────────────────────────────────

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn spy(&self) -> &Arc<ScrollSpy> {
        &self.spy
    }

    pub fn hash(&self) -> &Arc<HashSpy> {
        &self.hash
    }

    pub fn animator(&self) -> &Arc<Animator> {
        &self.animator
    }

    pub fn events(&self) -> &Arc<ScrollEvents> {
        &self.events
    }

    // ────────────────────────────────────────────────────────────────────
    // Registry passthroughs
    // ────────────────────────────────────────────────────────────────────

    pub fn register(&self, name: &str, element: ElementId) {
        self.registry.register(name, element);
    }

    pub fn unregister(&self, name: &str) {
        self.registry.unregister(name);
    }

    pub fn get(&self, name: &str) -> Option<ElementId> {
        self.registry.get(name)
    }

    pub fn subscribe(&self, name: &str, callback: VisibilityCallback) {
        self.registry.subscribe(name, callback);
    }

    pub fn unsubscribe(&self, name: &str, callback: &VisibilityCallback) {
        self.registry.unsubscribe(name, callback);
    }

    pub fn set_active_link(&self, name: Option<&str>) {
        self.registry.set_active_link(name);
    }

    pub fn get_active_link(&self) -> Option<String> {
        self.registry.get_active_link()
    }

    pub fn get_closest(
        &self,
        container: ContainerHandle,
        options: &ScrollOptions,
    ) -> Result<Option<ElementId>, ScrollError> {
        self.registry.get_closest(container, options)
    }

    pub fn scroll_to(&self, name: &str, options: &ScrollOptions) -> Result<(), ScrollError> {
        self.registry.scroll_to(name, options)
    }

    // ────────────────────────────────────────────────────────────────────
    // Positional scrolls
    // ────────────────────────────────────────────────────────────────────

    /// Animate the resolved container to a position: an absolute content
    /// offset, or a delta when the options cleared `absolute`
    pub fn scroll_to_position(&self, position: f64, options: &ScrollOptions) {
        self.animate(position, options.absolute, options);
    }

    pub fn scroll_to_top(&self, options: &ScrollOptions) {
        self.scroll_to_position(0.0, options);
    }

    pub fn scroll_to_bottom(&self, options: &ScrollOptions) {
        let container = options.resolve_container(&*self.host);
        let axis = options.axis();
        let bottom = match container {
            ContainerHandle::Root => self.host.content_extent(container, axis),
            ContainerHandle::Element(_) => {
                self.host.content_extent(container, axis)
                    - self.host.viewport_extent(container, axis)
            }
        };
        self.scroll_to_position(bottom, options);
    }

    /// Animate by a delta from the current position
    pub fn scroll_more(&self, delta: f64, options: &ScrollOptions) {
        self.animate(delta, false, options);
    }

    fn animate(&self, offset: f64, absolute: bool, options: &ScrollOptions) {
        self.animator.animate(AnimationRequest {
            container: options.resolve_container(&*self.host),
            axis: options.axis(),
            offset,
            absolute,
            easing: options.smooth.unwrap_or(Easing::Default),
            duration: options
                .duration
                .clone()
                .unwrap_or(ScrollDuration::Millis(0.0)),
            delay: options.delay,
            ignore_cancel_events: options.ignore_cancel_events,
            name: None,
            target: None,
        });
    }

    // ────────────────────────────────────────────────────────────────────
    // Events and triggers
    // ────────────────────────────────────────────────────────────────────

    pub fn on_begin<F>(&self, handler: F)
    where
        F: Fn(Option<&str>, Option<ElementId>, Option<f64>) + Send + Sync + 'static,
    {
        self.events.on_begin(handler);
    }

    pub fn on_end<F>(&self, handler: F)
    where
        F: Fn(Option<&str>, Option<ElementId>, Option<f64>) + Send + Sync + 'static,
    {
        self.events.on_end(handler);
    }

    pub fn attach_trigger(&self, name: &str, options: ScrollOptions) -> TriggerHandle {
        TriggerHandle::attach(
            Arc::clone(&self.host),
            Arc::clone(&self.registry),
            Arc::clone(&self.spy),
            Arc::clone(&self.hash),
            name,
            options,
        )
    }

    pub fn detach_trigger(&self, mut trigger: TriggerHandle) {
        trigger.detach();
    }

    /// Re-sample every spied container, for layout changes that move
    /// anchors without scrolling
    pub fn update(&self) {
        self.spy.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollkit_core::geometry::Axis;
    use scrollkit_core::testing::{ContainerMetrics, MockHost};

    #[test]
    fn scroll_to_bottom_targets_scrollable_remainder() {
        let host = Arc::new(MockHost::new());
        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                viewport_height: 600.0,
                content_height: 2400.0,
                ..Default::default()
            },
        );
        let engine = ScrollEngine::new(Arc::clone(&host) as Arc<dyn Host>);

        let options = ScrollOptions::new().duration_ms(100.0);
        engine.scroll_to_bottom(&options);
        host.run_frame(0.0);
        host.run_frame(100.0);
        assert_eq!(
            host.scroll_log().last(),
            Some(&(ContainerHandle::Root, Axis::Vertical, 2400.0))
        );
    }

    #[test]
    fn scroll_more_is_relative() {
        let host = Arc::new(MockHost::new());
        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 100.0,
                content_height: 2000.0,
                ..Default::default()
            },
        );
        let engine = ScrollEngine::new(Arc::clone(&host) as Arc<dyn Host>);

        let options = ScrollOptions::new().duration_ms(50.0);
        engine.scroll_more(40.0, &options);
        host.run_frame(0.0);
        host.run_frame(50.0);
        assert_eq!(
            host.scroll_log().last(),
            Some(&(ContainerHandle::Root, Axis::Vertical, 140.0))
        );
    }
}
