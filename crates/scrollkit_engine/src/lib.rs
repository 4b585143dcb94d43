//! Scroll orchestration: target registry, scroll-spy dispatch, hash
//! synchronization, and trigger bindings over a pluggable host.
//!
//! Construct a [`ScrollEngine`] with a [`Host`](scrollkit_core::Host)
//! implementation and install it as the process-wide instance:
//!
//! ```ignore
//! let engine = ScrollEngine::new(host);
//! set_global_engine(engine.clone());
//! engine.register("intro", intro_element);
//! engine.scroll_to("intro", &ScrollOptions::new().smooth(Easing::Default))?;
//! ```

pub mod engine;
pub mod hash;
pub mod link;
pub mod options;
pub mod registry;
pub mod spy;

pub use engine::{
    get_engine, is_engine_initialized, set_global_engine, try_get_engine, ScrollEngine,
};
pub use hash::{HashSpy, INIT_SCROLL_DELAY_MS};
pub use link::TriggerHandle;
pub use options::{ActiveCallback, ReferencePoint, ScrollOptions};
pub use registry::{Registry, VisibilityCallback};
pub use spy::{ScrollSpy, SpyCallback, DEFAULT_THROTTLE_MS};

pub use scrollkit_animation::{Animator, Easing, ScrollDuration};
pub use scrollkit_core::{Axis, ContainerHandle, ElementId, ScrollError, ScrollEvents};
