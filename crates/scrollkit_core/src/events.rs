//! Scroll lifecycle events
//!
//! A single handler slot per event kind: `begin` fires when a scroll starts
//! (jump or animation) and `end` when it finishes or is cancelled. Re-
//! registering replaces the previous handler. This is deliberately not a
//! multi-listener bus; the composition layer owns the one consumer.

use crate::handles::ElementId;
use std::sync::{Arc, Mutex};

/// Handler for scroll lifecycle events. Receives the target name, the
/// resolved element, and (for `end`) the final scroll position when the
/// scroll was animated.
pub type ScrollEventHandler =
    Arc<dyn Fn(Option<&str>, Option<ElementId>, Option<f64>) + Send + Sync>;

#[derive(Default)]
struct EventSlots {
    begin: Option<ScrollEventHandler>,
    end: Option<ScrollEventHandler>,
}

/// Global begin/end event slots shared by the registry and the animator
#[derive(Default)]
pub struct ScrollEvents {
    slots: Mutex<EventSlots>,
}

impl ScrollEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `begin` handler, replacing any previous one
    pub fn on_begin<F>(&self, handler: F)
    where
        F: Fn(Option<&str>, Option<ElementId>, Option<f64>) + Send + Sync + 'static,
    {
        self.slots.lock().unwrap().begin = Some(Arc::new(handler));
    }

    /// Register the `end` handler, replacing any previous one
    pub fn on_end<F>(&self, handler: F)
    where
        F: Fn(Option<&str>, Option<ElementId>, Option<f64>) + Send + Sync + 'static,
    {
        self.slots.lock().unwrap().end = Some(Arc::new(handler));
    }

    pub fn clear_begin(&self) {
        self.slots.lock().unwrap().begin = None;
    }

    pub fn clear_end(&self) {
        self.slots.lock().unwrap().end = None;
    }

    /// Invoke the `begin` slot, if registered
    pub fn fire_begin(&self, name: Option<&str>, element: Option<ElementId>) {
        tracing::debug!(name, ?element, "scroll begin");
        let handler = self.slots.lock().unwrap().begin.clone();
        if let Some(handler) = handler {
            handler(name, element, None);
        }
    }

    /// Invoke the `end` slot, if registered
    pub fn fire_end(&self, name: Option<&str>, element: Option<ElementId>, position: Option<f64>) {
        tracing::debug!(name, ?element, position, "scroll end");
        let handler = self.slots.lock().unwrap().end.clone();
        if let Some(handler) = handler {
            handler(name, element, position);
        }
    }
}
