//! Visibility-driven collapse.
//!
//! Mirrors an intersection observer: the target's visible fraction inside
//! the (margin-adjusted) viewport is compared against a threshold and turned
//! into one boolean.  The trigger only decides *what* the style should be;
//! how the width/opacity change is animated is left to the host's own
//! transition machinery.

use super::geometry::Rect;

/// Per-edge adjustment of the observation root, like CSS `rootMargin`.
/// Positive values grow the root, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub const fn vertical(top: f64, bottom: f64) -> Self {
        Self {
            top,
            right: 0.0,
            bottom,
            left: 0.0,
        }
    }
}

/// Style targets bound to the collapse state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseStyle {
    pub max_width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone)]
pub struct CollapseTrigger {
    threshold: f64,
    margin: RootMargin,
    expanded_width: f64,
    ratio: f64,
    collapsed: bool,
}

impl CollapseTrigger {
    /// `threshold` is the visible fraction (0–1) that counts as intersecting;
    /// `0.0` means any overlap at all.  `expanded_width` is the max-width the
    /// bound element gets while the target is visible.
    pub fn new(threshold: f64, margin: RootMargin, expanded_width: f64) -> Self {
        Self {
            threshold: if threshold.is_finite() {
                threshold.clamp(0.0, 1.0)
            } else {
                0.0
            },
            margin,
            expanded_width: expanded_width.max(0.0),
            ratio: 0.0,
            collapsed: false,
        }
    }

    /// Re-evaluate against fresh geometry.  Returns `true` when the state
    /// flipped.
    pub fn observe(&mut self, target: Rect, viewport: Rect) -> bool {
        let root = viewport.outset(
            self.margin.top,
            self.margin.right,
            self.margin.bottom,
            self.margin.left,
        );
        self.ratio = intersection_ratio(&target, &root);
        let visible = if self.threshold == 0.0 {
            self.ratio > 0.0
        } else {
            self.ratio >= self.threshold
        };
        let collapsed = !visible;
        let flipped = collapsed != self.collapsed;
        self.collapsed = collapsed;
        flipped
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn style(&self) -> CollapseStyle {
        if self.collapsed {
            CollapseStyle {
                max_width: 0.0,
                opacity: 0.0,
            }
        } else {
            CollapseStyle {
                max_width: self.expanded_width,
                opacity: 1.0,
            }
        }
    }
}

/// Visible fraction of `target` inside `root`.  Empty targets are never
/// visible.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> f64 {
    if target.is_empty() {
        return 0.0;
    }
    target
        .intersection(root)
        .map_or(0.0, |overlap| overlap.area() / target.area())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    #[test]
    fn collapses_when_target_scrolls_out() {
        let mut trigger = CollapseTrigger::new(0.5, RootMargin::default(), 240.0);
        let hero = Rect::new(0.0, 0.0, 1000.0, 400.0);
        assert!(!trigger.observe(hero, VIEWPORT));
        assert!(!trigger.is_collapsed());

        // 60% scrolled off the top: 40% visible, below the 50% threshold.
        assert!(trigger.observe(hero.translate_y(-240.0), VIEWPORT));
        assert!(trigger.is_collapsed());
        assert!((trigger.ratio() - 0.4).abs() < 1e-12);
        assert_eq!(
            trigger.style(),
            CollapseStyle {
                max_width: 0.0,
                opacity: 0.0
            }
        );
    }

    #[test]
    fn zero_threshold_means_any_overlap() {
        let mut trigger = CollapseTrigger::new(0.0, RootMargin::default(), 100.0);
        trigger.observe(Rect::new(0.0, 799.0, 10.0, 100.0), VIEWPORT);
        assert!(!trigger.is_collapsed());
        trigger.observe(Rect::new(0.0, 800.0, 10.0, 100.0), VIEWPORT);
        assert!(trigger.is_collapsed());
    }

    #[test]
    fn margin_extends_the_root() {
        let below = Rect::new(0.0, 850.0, 10.0, 100.0);
        let mut plain = CollapseTrigger::new(0.0, RootMargin::default(), 100.0);
        let mut generous = CollapseTrigger::new(0.0, RootMargin::vertical(0.0, 100.0), 100.0);
        plain.observe(below, VIEWPORT);
        generous.observe(below, VIEWPORT);
        assert!(plain.is_collapsed());
        assert!(!generous.is_collapsed());
        assert!((generous.ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_target_is_hidden() {
        let mut trigger = CollapseTrigger::new(0.0, RootMargin::default(), 100.0);
        trigger.observe(Rect::new(10.0, 10.0, 0.0, 0.0), VIEWPORT);
        assert!(trigger.is_collapsed());
    }

    #[test]
    fn expanded_style_uses_configured_width() {
        let mut trigger = CollapseTrigger::new(0.1, RootMargin::default(), 320.0);
        trigger.observe(VIEWPORT, VIEWPORT);
        assert_eq!(
            trigger.style(),
            CollapseStyle {
                max_width: 320.0,
                opacity: 1.0
            }
        );
    }
}
