//! Geometry utilities
//!
//! Pure coordinate math over the [`Host`] capability. No state lives here;
//! every function samples the host and returns a value.
//!
//! [`scroll_offset`] is the sole source of truth for "zero distance" between
//! a container and a target element, so its chain walk must be exact: any
//! approximation here shows up as scroll positions that are off by a border
//! or a margin.

use crate::error::ScrollError;
use crate::handles::{ContainerHandle, ElementId};
use crate::host::Host;

// ─────────────────────────────────────────────────────────────────────────────
// Axes and Rectangles
// ─────────────────────────────────────────────────────────────────────────────

/// Scroll axis selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// Bounding rectangle of an element, in host viewport coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    /// Leading edge along the given axis
    pub fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.top,
            Axis::Horizontal => self.left,
        }
    }

    /// Extent along the given axis
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Container Position
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of a container's scroll state: current scroll position, visible
/// (client) extent, and total scrollable (content) extent on both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerPosition {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub total_width: f64,
    pub total_height: f64,
}

impl ContainerPosition {
    /// Current scroll position along the given axis
    pub fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.top,
            Axis::Horizontal => self.left,
        }
    }

    /// Visible extent along the given axis
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }

    /// Total content extent along the given axis
    pub fn total(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.total_height,
            Axis::Horizontal => self.total_width,
        }
    }
}

/// Sample the current scroll state of a container
pub fn current_position(host: &dyn Host, container: ContainerHandle) -> ContainerPosition {
    ContainerPosition {
        left: host.scroll_position(container, Axis::Horizontal),
        top: host.scroll_position(container, Axis::Vertical),
        width: host.viewport_extent(container, Axis::Horizontal),
        height: host.viewport_extent(container, Axis::Vertical),
        total_width: host.content_extent(container, Axis::Horizontal),
        total_height: host.content_extent(container, Axis::Vertical),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scroll Offset
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulate offset starts up the offset-parent chain until `stop_at`
/// matches (or the chain ends at the root). Returns the accumulated offset
/// and the parent the walk stopped at.
fn offset_info_until(
    host: &dyn Host,
    element: ElementId,
    axis: Axis,
    stop_at: Option<ElementId>,
) -> (f64, Option<ElementId>) {
    let mut offset = host.offset_start(element, axis);
    let mut parent = host.offset_parent(element);

    while let Some(p) = parent {
        if Some(p) == stop_at {
            break;
        }
        offset += host.offset_start(p, axis);
        parent = host.offset_parent(p);
    }

    (offset, parent)
}

/// Position of `element` along `axis`, relative to the content origin of
/// `container`.
///
/// For the root container this is the element's absolute position: bounding
/// rect plus current root scroll. For an element container the offset-parent
/// chain is walked, branching on whether the container itself establishes a
/// positioning context:
///
/// - Positioned container: the container is an offset parent somewhere above
///   the target, so the distance is the accumulation of offset starts from
///   the target up to the container. A chain that ends elsewhere means the
///   container is not an ancestor, which is a configuration bug and fails
///   with [`ScrollError::NotAnAncestor`].
/// - Non-positioned container: the container can't be an offset parent, so
///   the distance is taken as a difference: directly when both share an
///   offset parent, otherwise between their root-accumulated offsets.
pub fn scroll_offset(
    host: &dyn Host,
    container: ContainerHandle,
    element: ElementId,
    axis: Axis,
) -> Result<f64, ScrollError> {
    let c = match container {
        ContainerHandle::Root => {
            let rect = host.bounding_rect(element);
            return Ok(rect.start(axis) + host.scroll_position(ContainerHandle::Root, axis));
        }
        ContainerHandle::Element(c) => c,
    };

    if host.is_positioned(c) {
        if host.offset_parent(element) == Some(c) {
            return Ok(host.offset_start(element, axis));
        }

        let (offset, stopped_at) = offset_info_until(host, element, axis, Some(c));
        if stopped_at != Some(c) {
            return Err(ScrollError::NotAnAncestor);
        }
        return Ok(offset);
    }

    if host.offset_parent(element) == host.offset_parent(c) {
        return Ok(host.offset_start(element, axis) - host.offset_start(c, axis));
    }

    // Accumulate both to the root and take the difference.
    let (element_offset, _) = offset_info_until(host, element, axis, None);
    let (container_offset, _) = offset_info_until(host, c, axis, None);
    Ok(element_offset - container_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ContainerMetrics, ElementSpec, MockHost};
    use std::sync::Arc;

    fn mock() -> Arc<MockHost> {
        Arc::new(MockHost::new())
    }

    #[test]
    fn root_offset_is_rect_plus_scroll() {
        let host = mock();
        host.set_container(
            ContainerHandle::Root,
            ContainerMetrics {
                scroll_y: 120.0,
                ..Default::default()
            },
        );
        let el = host.add_element(ElementSpec {
            rect: ElementRect {
                top: 80.0,
                ..Default::default()
            },
            ..Default::default()
        });

        let offset = scroll_offset(&*host, ContainerHandle::Root, el, Axis::Vertical).unwrap();
        assert_eq!(offset, 200.0);
    }

    #[test]
    fn positioned_container_direct_child() {
        let host = mock();
        let container = host.add_element(ElementSpec {
            positioned: true,
            ..Default::default()
        });
        let el = host.add_element(ElementSpec {
            offset_top: 250.0,
            offset_parent: Some(container),
            ..Default::default()
        });

        let offset = scroll_offset(&*host, container.into(), el, Axis::Vertical).unwrap();
        assert_eq!(offset, 250.0);
    }

    #[test]
    fn positioned_container_accumulates_intermediate_parents() {
        let host = mock();
        let container = host.add_element(ElementSpec {
            positioned: true,
            ..Default::default()
        });
        let wrapper = host.add_element(ElementSpec {
            offset_top: 40.0,
            offset_parent: Some(container),
            positioned: true,
            ..Default::default()
        });
        let el = host.add_element(ElementSpec {
            offset_top: 10.0,
            offset_parent: Some(wrapper),
            ..Default::default()
        });

        let offset = scroll_offset(&*host, container.into(), el, Axis::Vertical).unwrap();
        assert_eq!(offset, 50.0);
    }

    #[test]
    fn positioned_container_outside_chain_fails() {
        let host = mock();
        let container = host.add_element(ElementSpec {
            positioned: true,
            ..Default::default()
        });
        let unrelated = host.add_element(ElementSpec {
            positioned: true,
            ..Default::default()
        });
        let el = host.add_element(ElementSpec {
            offset_top: 10.0,
            offset_parent: Some(unrelated),
            ..Default::default()
        });

        let result = scroll_offset(&*host, container.into(), el, Axis::Vertical);
        assert_eq!(result, Err(ScrollError::NotAnAncestor));
    }

    #[test]
    fn unpositioned_container_shared_parent_takes_difference() {
        let host = mock();
        let parent = host.add_element(ElementSpec::default());
        let container = host.add_element(ElementSpec {
            offset_top: 100.0,
            offset_parent: Some(parent),
            ..Default::default()
        });
        let el = host.add_element(ElementSpec {
            offset_top: 340.0,
            offset_parent: Some(parent),
            ..Default::default()
        });

        let offset = scroll_offset(&*host, container.into(), el, Axis::Vertical).unwrap();
        assert_eq!(offset, 240.0);
    }

    #[test]
    fn unpositioned_container_distinct_parents_accumulate_to_root() {
        let host = mock();
        let branch_a = host.add_element(ElementSpec {
            offset_top: 500.0,
            ..Default::default()
        });
        let branch_b = host.add_element(ElementSpec {
            offset_top: 100.0,
            ..Default::default()
        });
        let container = host.add_element(ElementSpec {
            offset_top: 20.0,
            offset_parent: Some(branch_b),
            ..Default::default()
        });
        let el = host.add_element(ElementSpec {
            offset_top: 30.0,
            offset_parent: Some(branch_a),
            ..Default::default()
        });

        // (30 + 500) - (20 + 100)
        let offset = scroll_offset(&*host, container.into(), el, Axis::Vertical).unwrap();
        assert_eq!(offset, 410.0);
    }

    #[test]
    fn horizontal_axis_uses_same_chain_walk() {
        let host = mock();
        let container = host.add_element(ElementSpec {
            positioned: true,
            ..Default::default()
        });
        let el = host.add_element(ElementSpec {
            offset_left: 75.0,
            offset_parent: Some(container),
            ..Default::default()
        });

        let offset = scroll_offset(&*host, container.into(), el, Axis::Horizontal).unwrap();
        assert_eq!(offset, 75.0);
    }

    #[test]
    fn current_position_snapshots_both_axes() {
        let host = mock();
        let container = host.add_element(ElementSpec::default());
        host.set_container(
            container.into(),
            ContainerMetrics {
                scroll_x: 5.0,
                scroll_y: 50.0,
                viewport_width: 300.0,
                viewport_height: 400.0,
                content_width: 600.0,
                content_height: 2000.0,
            },
        );

        let pos = current_position(&*host, container.into());
        assert_eq!(pos.start(Axis::Vertical), 50.0);
        assert_eq!(pos.start(Axis::Horizontal), 5.0);
        assert_eq!(pos.extent(Axis::Vertical), 400.0);
        assert_eq!(pos.total(Axis::Vertical), 2000.0);
    }
}
