//! Engine error types
//!
//! Resolution failures (unknown target or container names) are deliberately
//! not errors: scrolling should never abort the embedding page, so those
//! paths log a warning and no-op. Only programmer-facing configuration bugs
//! surface as `Err`.

use thiserror::Error;

/// Errors surfaced to callers of the scroll engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScrollError {
    /// The container passed for an offset computation is not an ancestor of
    /// the target element in the offset-parent sense. This signals a
    /// configuration bug in the embedding layer, not a runtime condition.
    #[error("container is not an offset ancestor of the target element")]
    NotAnAncestor,
}
