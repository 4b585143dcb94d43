//! Target registry
//!
//! The name → element map at the heart of the engine: anchors register under
//! a name, triggers navigate to names, and the single process-scoped active
//! link lives here. Visibility subscribers outlive bindings so a trigger can
//! follow its anchor across re-registration.

use crate::options::ScrollOptions;
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use scrollkit_animation::{AnimationRequest, Animator, ScrollDuration};
use scrollkit_core::geometry::{current_position, scroll_offset};
use scrollkit_core::handles::ElementId;
use scrollkit_core::host::Host;
use scrollkit_core::{ContainerHandle, ScrollError, ScrollEvents};
use smallvec::SmallVec;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, Mutex};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Observer of a target's bound/unbound state
pub type VisibilityCallback = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct TargetEntry {
    element: Option<ElementId>,
    subscribers: SmallVec<[VisibilityCallback; 2]>,
}

#[derive(Default)]
struct RegistryInner {
    /// Insertion order is semantic: closest-element ties resolve to the
    /// earliest registration.
    targets: FxIndexMap<String, TargetEntry>,
    active_link: Option<String>,
}

/// Name → element bindings, active-link state, closest-element search, and
/// scroll orchestration
pub struct Registry {
    host: Arc<dyn Host>,
    animator: Arc<Animator>,
    events: Arc<ScrollEvents>,
    inner: Mutex<RegistryInner>,
}

impl Registry {
    pub fn new(host: Arc<dyn Host>, animator: Arc<Animator>, events: Arc<ScrollEvents>) -> Self {
        Self {
            host,
            animator,
            events,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Bind `name` to `element`. Last register wins. Existing visibility
    /// subscribers are notified `true` strictly after the binding update.
    pub fn register(&self, name: &str, element: ElementId) {
        let subscribers = {
            let mut inner = self.inner.lock().unwrap();
            let entry = inner.targets.entry(name.to_string()).or_default();
            entry.element = Some(element);
            entry.subscribers.clone()
        };
        for subscriber in subscribers {
            subscriber(true);
        }
    }

    /// Clear the binding for `name`, notifying subscribers `false`. The
    /// subscriber list itself persists.
    pub fn unregister(&self, name: &str) {
        let subscribers = {
            let mut inner = self.inner.lock().unwrap();
            match inner.targets.get_mut(name) {
                Some(entry) => {
                    entry.element = None;
                    entry.subscribers.clone()
                }
                None => return,
            }
        };
        for subscriber in subscribers {
            subscriber(false);
        }
    }

    /// Bound element for `name`, falling back to host document lookup by
    /// identifier and then by name tag
    pub fn get(&self, name: &str) -> Option<ElementId> {
        let bound = self
            .inner
            .lock()
            .unwrap()
            .targets
            .get(name)
            .and_then(|entry| entry.element);
        bound
            .or_else(|| self.host.element_by_id(name))
            .or_else(|| self.host.element_by_name(name))
    }

    /// Observe register/unregister for `name`. Fires `cb(true)` immediately
    /// when the name is already bound.
    pub fn subscribe(&self, name: &str, callback: VisibilityCallback) {
        let already_bound = {
            let mut inner = self.inner.lock().unwrap();
            let entry = inner.targets.entry(name.to_string()).or_default();
            entry.subscribers.push(callback.clone());
            entry.element.is_some()
        };
        if already_bound {
            callback(true);
        }
    }

    /// Remove a visibility observer (by callback identity)
    pub fn unsubscribe(&self, name: &str, callback: &VisibilityCallback) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.targets.get_mut(name) {
            entry
                .subscribers
                .retain(|existing| !Arc::ptr_eq(existing, callback));
        }
    }

    /// Set or clear the single active link
    pub fn set_active_link(&self, name: Option<&str>) {
        self.inner.lock().unwrap().active_link = name.map(str::to_string);
    }

    pub fn get_active_link(&self) -> Option<String> {
        self.inner.lock().unwrap().active_link.clone()
    }

    /// Among currently visible bound elements, the one whose axis extent is
    /// nearest the container's reference offset. A reference point inside an
    /// element counts as distance zero; ties keep registration order.
    pub fn get_closest(
        &self,
        container: ContainerHandle,
        options: &ScrollOptions,
    ) -> Result<Option<ElementId>, ScrollError> {
        let axis = options.axis();
        let elements: Vec<ElementId> = {
            let inner = self.inner.lock().unwrap();
            inner
                .targets
                .values()
                .filter_map(|entry| entry.element)
                .collect()
        };

        let position = current_position(&*self.host, container);
        let percent = options.reference_point.percent(
            position.start(axis),
            position.extent(axis),
            position.total(axis),
        );
        let reference_offset = position.start(axis) + percent * position.extent(axis);

        let mut deltas = Vec::with_capacity(elements.len());
        for element in elements {
            if !self.host.is_visible(element) {
                continue;
            }
            let offset = scroll_offset(&*self.host, container, element, axis)?;
            let delta_start = reference_offset - offset;
            let delta_end = reference_offset - (offset + self.host.offset_extent(element, axis));
            let delta = if sign(delta_start) != sign(delta_end) {
                // The reference point lies inside the element.
                0.0
            } else {
                delta_start.abs().min(delta_end.abs())
            };
            deltas.push((element, delta));
        }

        deltas.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(deltas.first().map(|(element, _)| *element))
    }

    /// Scroll the resolved container so that `name`'s element sits at the
    /// configured reference point, jumping or animating per `options`.
    ///
    /// An unknown name warns and no-ops; a container that is not an offset
    /// ancestor of the target is a configuration bug and returns
    /// [`ScrollError::NotAnAncestor`].
    pub fn scroll_to(&self, name: &str, options: &ScrollOptions) -> Result<(), ScrollError> {
        let Some(target) = self.get(name) else {
            tracing::warn!(name = %name, "scroll target not found");
            return Ok(());
        };

        let container = options.resolve_container(&*self.host);
        let axis = options.axis();
        let mut offset = scroll_offset(&*self.host, container, target, axis)? + options.offset;
        let position = current_position(&*self.host, container);

        // The reference fraction is judged against the target's content
        // offset, not the live scroll position, so `Sliding` lands the
        // reference line where it will be once the scroll settles.
        let percent = options
            .reference_point
            .percent(offset, 0.0, position.total(axis));
        if percent > 0.0 {
            offset -= percent * position.extent(axis);
            offset += percent * self.host.client_extent(target, axis);
        }

        match options.smooth {
            None => {
                self.events.fire_begin(Some(name), Some(target));
                self.host.set_scroll(container, axis, offset);
                self.events.fire_end(Some(name), Some(target), None);
            }
            Some(easing) => self.animator.animate(AnimationRequest {
                container,
                axis,
                offset,
                absolute: true,
                easing,
                duration: options.duration.clone().unwrap_or(ScrollDuration::Millis(0.0)),
                delay: options.delay,
                ignore_cancel_events: options.ignore_cancel_events,
                name: Some(name.to_string()),
                target: Some(target),
            }),
        }

        Ok(())
    }
}

/// Three-way sign, with zero distinct from both (`f64::signum` maps 0 to 1,
/// which would misclassify a reference point sitting exactly on an edge)
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReferencePoint;
    use scrollkit_core::testing::{ContainerMetrics, ElementSpec, MockHost};
    use scrollkit_core::ContainerHandle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> (Arc<MockHost>, Registry) {
        let host = Arc::new(MockHost::new());
        let events = Arc::new(ScrollEvents::new());
        let animator = Animator::new(Arc::clone(&host) as Arc<dyn Host>, Arc::clone(&events));
        let registry = Registry::new(Arc::clone(&host) as Arc<dyn Host>, animator, events);
        (host, registry)
    }

    #[test]
    fn register_then_get_until_unregister() {
        let (host, registry) = registry();
        let el = host.add_element(ElementSpec::default());

        registry.register("intro", el);
        assert_eq!(registry.get("intro"), Some(el));

        registry.unregister("intro");
        assert_eq!(registry.get("intro"), None);
    }

    #[test]
    fn get_falls_back_to_document_lookup() {
        let (host, registry) = registry();
        let by_id = host.add_element(ElementSpec {
            dom_id: Some("chapter".into()),
            ..Default::default()
        });
        assert_eq!(registry.get("chapter"), Some(by_id));

        let by_name = host.add_element(ElementSpec {
            dom_name: Some("appendix".into()),
            ..Default::default()
        });
        assert_eq!(registry.get("appendix"), Some(by_name));
    }

    #[test]
    fn last_register_wins() {
        let (host, registry) = registry();
        let first = host.add_element(ElementSpec::default());
        let second = host.add_element(ElementSpec::default());

        registry.register("intro", first);
        registry.register("intro", second);
        assert_eq!(registry.get("intro"), Some(second));
    }

    #[test]
    fn subscribe_fires_immediately_when_bound() {
        let (host, registry) = registry();
        let el = host.add_element(ElementSpec::default());
        registry.register("intro", el);

        let seen = Arc::new(AtomicUsize::new(0));
        let callback: VisibilityCallback = {
            let seen = Arc::clone(&seen);
            Arc::new(move |visible| {
                if visible {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            })
        };
        registry.subscribe("intro", callback.clone());
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        // Subscribers survive unregister and fire again on re-register.
        registry.unregister("intro");
        registry.register("intro", el);
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        registry.unsubscribe("intro", &callback);
        registry.register("intro", el);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn active_link_round_trip() {
        let (_, registry) = registry();
        registry.set_active_link(Some("section2"));
        assert_eq!(registry.get_active_link().as_deref(), Some("section2"));
        registry.set_active_link(None);
        assert_eq!(registry.get_active_link(), None);
    }

    /// Three stacked anchors in a 300 px container: the middle reference
    /// line (150) falls inside the second, the start line (0) inside the
    /// first.
    fn stacked_fixture() -> (Arc<MockHost>, Registry, ContainerHandle, [ElementId; 3]) {
        let (host, registry) = registry();
        let container_el = host.add_element(ElementSpec {
            positioned: true,
            ..Default::default()
        });
        let container = ContainerHandle::Element(container_el);
        host.set_container(
            container,
            ContainerMetrics {
                viewport_height: 300.0,
                content_height: 400.0,
                ..Default::default()
            },
        );

        let spans = [(0.0, 100.0), (100.0, 150.0), (250.0, 150.0)];
        let mut ids = Vec::new();
        for (top, height) in spans {
            ids.push(host.add_element(ElementSpec {
                offset_top: top,
                offset_parent: Some(container_el),
                offset_height: height,
                ..Default::default()
            }));
        }
        for (i, id) in ids.iter().enumerate() {
            registry.register(&format!("s{i}"), *id);
        }
        (host, registry, container, [ids[0], ids[1], ids[2]])
    }

    #[test]
    fn closest_with_middle_reference_selects_straddling_element() {
        let (_, registry, container, [_, second, _]) = stacked_fixture();
        let options = ScrollOptions::new().reference_point(ReferencePoint::Middle);
        assert_eq!(registry.get_closest(container, &options).unwrap(), Some(second));
    }

    #[test]
    fn closest_with_start_reference_selects_first_element() {
        let (_, registry, container, [first, _, _]) = stacked_fixture();
        let options = ScrollOptions::new().reference_point(ReferencePoint::Start);
        assert_eq!(registry.get_closest(container, &options).unwrap(), Some(first));
    }

    #[test]
    fn closest_skips_hidden_elements() {
        let (host, registry, container, [first, second, _]) = stacked_fixture();
        host.update_element(second, |spec| spec.visible = false);
        let options = ScrollOptions::new().reference_point(ReferencePoint::Middle);
        // With the straddling element hidden, the first anchor ends 50 px
        // above the reference line and wins over the third at 100 px below.
        assert_eq!(registry.get_closest(container, &options).unwrap(), Some(first));
    }
}
