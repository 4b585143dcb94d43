//! Stable handles for host-owned elements and containers
//!
//! The engine never compares host objects by identity. The embedding layer
//! asks a [`HandleAllocator`] for an [`ElementId`] the first time it binds an
//! element and keeps the mapping on its side; every engine API speaks in
//! handles from then on.

// ─────────────────────────────────────────────────────────────────────────────
// Element Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a host element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

impl ElementId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Generator for unique element IDs, starting at 1
#[derive(Debug)]
pub struct HandleAllocator {
    next: u64,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next(&mut self) -> ElementId {
        let id = ElementId(self.next);
        self.next += 1;
        id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Containers
// ─────────────────────────────────────────────────────────────────────────────

/// A scrollable container: either the host's root scrolling context (the
/// document/window pair in a browser embedding) or a concrete element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContainerHandle {
    /// The root scrolling context
    #[default]
    Root,
    /// A scrollable element
    Element(ElementId),
}

impl ContainerHandle {
    /// Whether this is the root scrolling context
    pub fn is_root(&self) -> bool {
        matches!(self, ContainerHandle::Root)
    }

    /// The backing element, if any
    pub fn element(&self) -> Option<ElementId> {
        match self {
            ContainerHandle::Root => None,
            ContainerHandle::Element(id) => Some(*id),
        }
    }
}

impl From<ElementId> for ContainerHandle {
    fn from(id: ElementId) -> Self {
        ContainerHandle::Element(id)
    }
}
