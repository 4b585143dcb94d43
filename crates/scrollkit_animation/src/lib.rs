//! scrollkit animation
//!
//! Eased, cancellable scroll tweening over the host frame source.
//!
//! # Features
//!
//! - **Easing table**: the classic quad→quint in/out/in-out families plus a
//!   symmetric default curve, all pure `[0,1] → [0,1]` maps
//! - **Per-invocation sessions**: each animated scroll is its own state
//!   machine (`Pending → Running → Done | Cancelled`), advanced by host
//!   frame callbacks rather than recursion
//! - **Cooperative cancellation**: host cancel inputs (pointer-down, wheel,
//!   touch-move, key-down) flag live sessions; the next frame observes the
//!   flag, fires `end` at the partial position, and stops without rollback
//! - **Duration functions**: duration may be a constant or a function of the
//!   scroll distance, with a fixed fallback for malformed results

pub mod animate;
pub mod easing;

pub use animate::{AnimationRequest, Animator, ScrollDuration, DURATION_FALLBACK_MS};
pub use easing::Easing;
