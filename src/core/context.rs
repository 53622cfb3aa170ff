//! Shared context objects.
//!
//! Cross-component signals (the docking handshake, theme and motion
//! preferences) live in an [`Observable`]: one producer, any number of
//! subscribers, and a readable current value so a subscriber that mounts
//! *after* an edge still sees the right state.
//!
//! Backed by `tokio::sync::watch`, which already has exactly these
//! semantics and works without a running runtime.

use std::fmt;

use tokio::sync::watch;

/// Single-producer value with change notification.
pub struct Observable<T> {
    tx: watch::Sender<T>,
    edges: u64,
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.tx.borrow())
            .field("edges", &self.edges)
            .finish()
    }
}

impl<T: Clone + PartialEq> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, edges: 0 }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Publish `value`.  Subscribers are only notified when it differs from
    /// the current value; returns whether an edge was published.
    pub fn set(&mut self, value: T) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if changed {
            self.edges += 1;
        }
        changed
    }

    /// Number of edges published so far.
    pub fn edges(&self) -> u64 {
        self.edges
    }

    pub fn subscribe(&self) -> Subscriber<T> {
        Subscriber {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Read side of an [`Observable`].
#[derive(Debug, Clone)]
pub struct Subscriber<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Subscriber<T> {
    /// Latest published value (also valid for late subscribers).
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// The new value if an edge was published since the last call.
    pub fn take_change(&mut self) -> Option<T> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Async wait for the next edge; `None` once the producer is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

// ───────────────────────────────────────── environment ───────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Dark,
    Light,
}

impl ColorScheme {
    pub fn toggled(self) -> Self {
        match self {
            ColorScheme::Dark => ColorScheme::Light,
            ColorScheme::Light => ColorScheme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorScheme::Dark => "dark",
            ColorScheme::Light => "light",
        }
    }
}

/// Host preferences every component may read or watch.
#[derive(Debug)]
pub struct Environment {
    pub theme: Observable<ColorScheme>,
    pub reduced_motion: Observable<bool>,
    pub coarse_pointer: Observable<bool>,
}

impl Environment {
    pub fn new(theme: ColorScheme, reduced_motion: bool, coarse_pointer: bool) -> Self {
        Self {
            theme: Observable::new(theme),
            reduced_motion: Observable::new(reduced_motion),
            coarse_pointer: Observable::new(coarse_pointer),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(ColorScheme::default(), false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_only_on_change() {
        let mut flag = Observable::new(false);
        let mut sub = flag.subscribe();
        assert!(!flag.set(false));
        assert_eq!(sub.take_change(), None);
        assert!(flag.set(true));
        assert!(!flag.set(true));
        assert_eq!(flag.edges(), 1);
        assert_eq!(sub.take_change(), Some(true));
        assert_eq!(sub.take_change(), None);
    }

    #[test]
    fn late_subscriber_reads_current_state() {
        let mut flag = Observable::new(false);
        flag.set(true);
        let late = flag.subscribe();
        assert!(late.current());
    }

    #[test]
    fn producer_survives_without_subscribers() {
        let mut scheme = Observable::new(ColorScheme::Dark);
        assert_eq!(scheme.subscriber_count(), 0);
        assert!(scheme.set(ColorScheme::Light));
        assert_eq!(scheme.get(), ColorScheme::Light);
    }

    #[tokio::test]
    async fn changed_resolves_on_next_edge() {
        let mut flag = Observable::new(0u8);
        let mut sub = flag.subscribe();
        flag.set(3);
        assert_eq!(sub.changed().await, Some(3));
    }
}
