//! scrollkit core
//!
//! Foundational primitives for the scrollkit scroll synchronization engine:
//!
//! - **Handles**: stable, host-independent element and container identifiers
//! - **Host Contract**: the capability trait the embedding layer implements
//!   (geometry queries, scroll application, frame scheduling, event sources)
//! - **Geometry**: pure coordinate math over the host contract, including the
//!   exact offset-parent chain walk used for scroll targeting
//! - **Lifecycle Events**: single-slot `begin`/`end` scroll event handlers
//! - **Testing**: a deterministic [`testing::MockHost`] for embedder tests
//!
//! Everything above the host contract is platform-agnostic; the engine never
//! touches a real window or document.

pub mod error;
pub mod events;
pub mod geometry;
pub mod handles;
pub mod host;
pub mod testing;

pub use error::ScrollError;
pub use events::{ScrollEventHandler, ScrollEvents};
pub use geometry::{current_position, scroll_offset, Axis, ContainerPosition, ElementRect};
pub use handles::{ContainerHandle, ElementId, HandleAllocator};
pub use host::{
    CancelListener, FragmentListener, FrameCallback, Host, ListenerId, ScrollListener,
    TimerCallback, TimerId,
};
