//! Eased value for declarative style changes.
//!
//! The host sets a target (say the collapsed nav width) and the value
//! closes a fixed fraction of the remaining gap every frame.  That gives
//! the same ease-out a CSS `transition` would, without the caller having to
//! compute any timing.

#[derive(Debug, Clone)]
pub struct Transition {
    value: f64,
    target: f64,
    /// Fraction of the gap closed per tick.
    speed: f64,
    /// Below this distance the value snaps onto the target.
    epsilon: f64,
}

impl Transition {
    pub fn new(initial: f64, speed: f64) -> Self {
        Self {
            value: initial,
            target: initial,
            speed: speed.clamp(0.05, 1.0),
            epsilon: 1e-3,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Skip the animation (reduced motion).
    pub fn jump(&mut self, target: f64) {
        self.set_target(target);
        self.value = self.target;
    }

    /// Call once per frame.
    pub fn tick(&mut self) {
        self.value += (self.target - self.value) * self.speed;
        if (self.target - self.value).abs() < self.epsilon {
            self.value = self.target;
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.value != self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eases_out_and_settles() {
        let mut t = Transition::new(0.0, 0.5).with_epsilon(0.01);
        t.set_target(1.0);
        t.tick();
        assert_eq!(t.value(), 0.5);
        t.tick();
        assert_eq!(t.value(), 0.75);
        for _ in 0..20 {
            t.tick();
        }
        assert_eq!(t.value(), 1.0);
        assert!(!t.is_animating());
    }

    #[test]
    fn jump_is_immediate() {
        let mut t = Transition::new(120.0, 0.3);
        t.jump(0.0);
        assert_eq!(t.value(), 0.0);
        assert!(!t.is_animating());
    }

    #[test]
    fn non_finite_targets_are_ignored() {
        let mut t = Transition::new(1.0, 0.3);
        t.set_target(f64::NAN);
        assert_eq!(t.target(), 1.0);
    }
}
