//! Host listener bookkeeping.
//!
//! Components never hold callbacks into the host.  They register interest
//! (`Scroll`, `Resize`, …) and the host asks the registry who to notify.
//! Every registration must be removed on unmount; [`ListenerRegistry::count`]
//! makes leaks observable.

use super::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Scroll,
    Resize,
    Intersection,
    MediaQuery,
}

/// Opaque token for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Which component a listener belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(pub u32);

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next: u64,
    entries: Vec<(ListenerId, ListenerKind, OwnerId)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ListenerKind, owner: OwnerId) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.entries.push((id, kind, owner));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(i, _, _)| *i != id);
        self.entries.len() != before
    }

    /// Owners to notify for `kind`, in registration order.
    pub fn listeners(&self, kind: ListenerKind) -> Vec<OwnerId> {
        self.entries
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, owner)| *owner)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn count_for(&self, owner: OwnerId) -> usize {
        self.entries.iter().filter(|(_, _, o)| *o == owner).count()
    }
}

/// Lookup of named layout anchors (e.g. the navbar logo slot).
pub trait AnchorLookup {
    /// Current bounding box in viewport coordinates, or `None` when the
    /// anchor is not laid out yet.
    fn anchor_rect(&self, name: &str) -> Option<Rect>;
}

/// Anchors that never resolve; useful before the host has laid anything out.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAnchors;

impl AnchorLookup for NoAnchors {
    fn anchor_rect(&self, _name: &str) -> Option<Rect> {
        None
    }
}

impl<const N: usize> AnchorLookup for [(&str, Rect); N] {
    fn anchor_rect(&self, name: &str) -> Option<Rect> {
        self.iter().find(|(n, _)| *n == name).map(|(_, r)| *r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_and_removes() {
        let mut registry = ListenerRegistry::new();
        let a = registry.add(ListenerKind::Resize, OwnerId(1));
        registry.add(ListenerKind::Scroll, OwnerId(2));
        let c = registry.add(ListenerKind::Resize, OwnerId(3));
        assert_eq!(
            registry.listeners(ListenerKind::Resize),
            vec![OwnerId(1), OwnerId(3)]
        );
        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        registry.remove(c);
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.count_for(OwnerId(2)), 1);
    }

    #[test]
    fn array_lookup_finds_named_anchor() {
        let anchors = [("logo", Rect::new(1.0, 2.0, 3.0, 4.0))];
        assert_eq!(anchors.anchor_rect("logo"), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(anchors.anchor_rect("menu"), None);
    }
}
