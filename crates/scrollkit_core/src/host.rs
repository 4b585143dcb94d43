//! Host capability contract
//!
//! The engine consumes its environment (element geometry, scroll events,
//! frame scheduling, timers, and the URL fragment) through this trait. A
//! browser embedding implements it over the DOM; tests use
//! [`crate::testing::MockHost`].
//!
//! All callbacks are `Send + Sync` so a host may deliver them from whatever
//! thread owns its event loop; the engine itself schedules nothing and only
//! re-enters synchronous code when the host invokes a callback.

use crate::geometry::{Axis, ElementRect};
use crate::handles::{ContainerHandle, ElementId};
use std::sync::Arc;

/// Listener for container scroll events
pub type ScrollListener = Arc<dyn Fn() + Send + Sync>;

/// Listener for animation-cancelling input events (pointer-down, wheel,
/// touch-move, key-down)
pub type CancelListener = Arc<dyn Fn() + Send + Sync>;

/// Listener for URL fragment changes driven by the host (back/forward
/// navigation, manual edits)
pub type FragmentListener = Arc<dyn Fn() + Send + Sync>;

/// One-shot frame callback; receives the host's timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64) + Send>;

/// One-shot timer callback
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// Handle to a pending timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Handle to a registered scroll or fragment listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Capabilities the embedding layer provides to the engine
pub trait Host: Send + Sync {
    // ─── Container metrics ───────────────────────────────────────────────

    /// Current scroll position of a container along an axis
    fn scroll_position(&self, container: ContainerHandle, axis: Axis) -> f64;

    /// Visible (client) extent of a container along an axis
    fn viewport_extent(&self, container: ContainerHandle, axis: Axis) -> f64;

    /// Total scrollable (content) extent of a container along an axis
    fn content_extent(&self, container: ContainerHandle, axis: Axis) -> f64;

    /// Assign a container's scroll position directly. For
    /// [`ContainerHandle::Root`] this is the host's root-level scroll call.
    fn set_scroll(&self, container: ContainerHandle, axis: Axis, position: f64);

    // ─── Element geometry ────────────────────────────────────────────────

    /// Bounding rectangle in host viewport coordinates
    fn bounding_rect(&self, element: ElementId) -> ElementRect;

    /// Offset of the element's leading edge relative to its offset parent
    fn offset_start(&self, element: ElementId, axis: Axis) -> f64;

    /// Nearest positioned ancestor; `None` once the chain reaches the root
    fn offset_parent(&self, element: ElementId) -> Option<ElementId>;

    /// Whether the element establishes a positioning context
    fn is_positioned(&self, element: ElementId) -> bool;

    /// Client extent (visible box, borders excluded) along an axis
    fn client_extent(&self, element: ElementId, axis: Axis) -> f64;

    /// Offset extent (layout box, borders included) along an axis
    fn offset_extent(&self, element: ElementId, axis: Axis) -> f64;

    /// Whether the element currently takes part in layout
    fn is_visible(&self, element: ElementId) -> bool;

    // ─── Document lookup ─────────────────────────────────────────────────

    /// Element carrying the given host identifier, if any
    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    /// First element carrying the given host name tag, if any
    fn element_by_name(&self, name: &str) -> Option<ElementId>;

    // ─── Scheduling ──────────────────────────────────────────────────────

    /// Monotonic timestamp in milliseconds
    fn now(&self) -> f64;

    /// Schedule a callback for the next frame (~60 Hz, or the host's timer
    /// fallback when no frame source exists)
    fn request_frame(&self, callback: FrameCallback);

    /// Schedule a one-shot timer
    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timer; unknown ids are ignored
    fn clear_timeout(&self, timer: TimerId);

    // ─── Event sources ───────────────────────────────────────────────────

    /// Subscribe to scroll events on a container (passive where the host
    /// supports it)
    fn add_scroll_listener(
        &self,
        container: ContainerHandle,
        listener: ScrollListener,
    ) -> ListenerId;

    /// Remove a scroll listener; unknown ids are ignored
    fn remove_scroll_listener(&self, listener: ListenerId);

    /// Subscribe to the fixed cancel-input set. Listeners live for the
    /// host's lifetime.
    fn add_cancel_listener(&self, listener: CancelListener);

    // ─── URL fragment ────────────────────────────────────────────────────

    /// Current fragment, without the leading `#`; empty when absent
    fn fragment(&self) -> String;

    /// Update the fragment, pushing a history entry when `push_history` is
    /// set and replacing the current one otherwise. Must not re-enter
    /// fragment listeners.
    fn set_fragment(&self, fragment: &str, push_history: bool);

    /// Subscribe to host-driven fragment changes
    fn add_fragment_listener(&self, listener: FragmentListener) -> ListenerId;

    /// Remove a fragment listener; unknown ids are ignored
    fn remove_fragment_listener(&self, listener: ListenerId);
}
