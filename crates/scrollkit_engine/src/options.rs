//! Per-call scroll configuration
//!
//! A single options bag recognized by `scroll_to`, the trigger bindings, and
//! the positional conveniences. Built fluently:
//!
//! ```rust
//! use scrollkit_engine::options::{ReferencePoint, ScrollOptions};
//! use scrollkit_animation::Easing;
//!
//! let options = ScrollOptions::new()
//!     .offset(-24.0)
//!     .smooth(Easing::InOutCubic)
//!     .duration_ms(400.0)
//!     .reference_point(ReferencePoint::Middle);
//! ```

use scrollkit_animation::{Easing, ScrollDuration};
use scrollkit_core::geometry::Axis;
use scrollkit_core::handles::{ContainerHandle, ElementId};
use scrollkit_core::host::Host;
use std::sync::Arc;

/// Callback fired when a trigger gains or loses active status
pub type ActiveCallback = Arc<dyn Fn(&str, Option<ElementId>) + Send + Sync>;

/// The point within a container's viewport used to judge which target is
/// active
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReferencePoint {
    /// Top/left edge
    #[default]
    Start,
    Middle,
    /// Bottom/right edge
    End,
    /// Proportional to the container's own scroll progress, so the line
    /// sweeps from Start to End as the container scrolls
    Sliding,
}

impl ReferencePoint {
    /// Resolve to a fraction of the viewport extent. `Sliding` needs the
    /// container's progress: scroll position over scrollable range, 0 when
    /// the container isn't scrollable (within 1 px).
    pub fn percent(self, start: f64, extent: f64, total: f64) -> f64 {
        match self {
            ReferencePoint::Start => 0.0,
            ReferencePoint::Middle => 0.5,
            ReferencePoint::End => 1.0,
            ReferencePoint::Sliding => {
                let scrollable = (total - extent).abs() > 1.0;
                if scrollable {
                    start / (total - extent)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Configuration for a scroll operation or trigger binding
#[derive(Clone)]
pub struct ScrollOptions {
    /// Resolve the container by host identifier; takes precedence over
    /// `container`
    pub container_id: Option<String>,
    pub container: Option<ContainerHandle>,
    /// Additional px applied to the computed offset (like padding)
    pub offset: f64,
    pub horizontal: bool,
    /// `Some` animates with the given easing; `None` jumps
    pub smooth: Option<Easing>,
    pub duration: Option<ScrollDuration>,
    /// Milliseconds to wait before scrolling
    pub delay: f64,
    /// Positional scroll values are absolute content offsets; clear to
    /// treat them as deltas from the current position
    pub absolute: bool,
    pub reference_point: ReferencePoint,
    /// Track active status from spy ticks
    pub spy: bool,
    /// Stay active until another trigger supersedes, instead of
    /// deactivating on exit
    pub sticky: bool,
    /// Maintain trigger visibility from registry register/unregister
    pub auto_hide: bool,
    /// Mirror active status into the URL fragment
    pub hash_spy: bool,
    /// Push history entries on fragment updates instead of replacing
    pub save_hash_history: bool,
    /// Keep animating through host cancel inputs
    pub ignore_cancel_events: bool,
    /// Spy throttle in ms; the dispatcher default applies when unset
    pub spy_throttle: Option<f64>,
    pub on_set_active: Option<ActiveCallback>,
    pub on_set_inactive: Option<ActiveCallback>,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            container_id: None,
            container: None,
            offset: 0.0,
            horizontal: false,
            smooth: None,
            duration: None,
            delay: 0.0,
            absolute: true,
            reference_point: ReferencePoint::default(),
            spy: false,
            sticky: false,
            auto_hide: false,
            hash_spy: false,
            save_hash_history: false,
            ignore_cancel_events: false,
            spy_throttle: None,
            on_set_active: None,
            on_set_inactive: None,
        }
    }
}

impl ScrollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = Some(id.into());
        self
    }

    pub fn container(mut self, container: ContainerHandle) -> Self {
        self.container = Some(container);
        self
    }

    pub fn offset(mut self, px: f64) -> Self {
        self.offset = px;
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.horizontal = true;
        self
    }

    /// Animate with the given easing
    pub fn smooth(mut self, easing: Easing) -> Self {
        self.smooth = Some(easing);
        self
    }

    /// Animate with the default easing
    pub fn smooth_default(mut self) -> Self {
        self.smooth = Some(Easing::Default);
        self
    }

    pub fn duration_ms(mut self, ms: f64) -> Self {
        self.duration = Some(ScrollDuration::Millis(ms));
        self
    }

    /// Duration as a function of the scroll distance in px
    pub fn duration_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.duration = Some(ScrollDuration::PerDistance(Arc::new(f)));
        self
    }

    pub fn delay(mut self, ms: f64) -> Self {
        self.delay = ms;
        self
    }

    /// Treat positional scroll values as deltas from the current position
    pub fn relative(mut self) -> Self {
        self.absolute = false;
        self
    }

    pub fn reference_point(mut self, point: ReferencePoint) -> Self {
        self.reference_point = point;
        self
    }

    pub fn spy(mut self) -> Self {
        self.spy = true;
        self
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    pub fn auto_hide(mut self) -> Self {
        self.auto_hide = true;
        self
    }

    pub fn hash_spy(mut self) -> Self {
        self.hash_spy = true;
        self
    }

    pub fn save_hash_history(mut self) -> Self {
        self.save_hash_history = true;
        self
    }

    pub fn ignore_cancel_events(mut self) -> Self {
        self.ignore_cancel_events = true;
        self
    }

    pub fn spy_throttle(mut self, ms: f64) -> Self {
        self.spy_throttle = Some(ms);
        self
    }

    pub fn on_set_active<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<ElementId>) + Send + Sync + 'static,
    {
        self.on_set_active = Some(Arc::new(f));
        self
    }

    pub fn on_set_inactive<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<ElementId>) + Send + Sync + 'static,
    {
        self.on_set_inactive = Some(Arc::new(f));
        self
    }

    /// The scroll axis this configuration addresses
    pub fn axis(&self) -> Axis {
        if self.horizontal {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Container for scroll operations: `container_id` lookup first, then
    /// the explicit handle, then the root. A dangling id falls back to the
    /// root with a warning rather than aborting the scroll.
    pub fn resolve_container(&self, host: &dyn Host) -> ContainerHandle {
        if let Some(id) = &self.container_id {
            return match host.element_by_id(id) {
                Some(element) => ContainerHandle::Element(element),
                None => {
                    tracing::warn!(container_id = %id, "container id not found, using root");
                    ContainerHandle::Root
                }
            };
        }
        self.container.unwrap_or(ContainerHandle::Root)
    }

    /// Container for spy listening: an explicit handle wins over
    /// `container_id`, since a binding that already holds a handle has
    /// resolved it once
    pub fn spy_container(&self, host: &dyn Host) -> ContainerHandle {
        if let Some(container) = self.container {
            return container;
        }
        if let Some(id) = &self.container_id {
            if let Some(element) = host.element_by_id(id) {
                return ContainerHandle::Element(element);
            }
        }
        ContainerHandle::Root
    }
}
