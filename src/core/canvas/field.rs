//! Signals travelling along paths, plus the retained draw list they render to.
//!
//! [`SignalField::update`] is a pure data step and [`SignalField::draw`] only
//! describes a frame.  Neither touches a surface, so both run in tests.

use fastrand::Rng;
use tracing::trace;

use super::path::{Path, PathGenerator};
use crate::core::geometry::{Point, Size};
use crate::core::keyframe::Rgba;

/// What a signal does after reaching the end of its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapPolicy {
    /// Start over on the same path, keeping the overshoot.
    #[default]
    InPlace,
    /// Respawn at the start of a random path with fresh speed and opacity.
    Reassign,
}

/// Randomisation ranges for a signal pool.
#[derive(Debug, Clone)]
pub struct SignalSpec {
    pub per_path: f64,
    /// Path fractions per second.
    pub speed: (f64, f64),
    pub opacity: (f64, f64),
    pub size: (f64, f64),
    /// Trail length as a fraction of the path.
    pub trail: f64,
    pub trail_samples: usize,
}

impl Default for SignalSpec {
    fn default() -> Self {
        Self {
            per_path: 1.0,
            speed: (0.15, 0.45),
            opacity: (0.55, 1.0),
            size: (1.5, 3.0),
            trail: 0.12,
            trail_samples: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    /// Index into the field's path table (not owned).
    pub path_index: usize,
    /// Position along the path, `[0, 1)`.
    pub progress: f64,
    pub speed: f64,
    pub opacity: f64,
    pub size: f64,
    /// Completed laps.
    pub cycles: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPalette {
    pub path: Rgba,
    pub signal: Rgba,
    pub glow: Rgba,
}

impl Default for FieldPalette {
    fn default() -> Self {
        Self {
            path: Rgba::rgb(90, 110, 140).with_alpha(0.25),
            signal: Rgba::rgb(120, 220, 255),
            glow: Rgba::rgb(255, 200, 120).with_alpha(0.6),
        }
    }
}

// ───────────────────────────────────────── draw list ─────────

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgba),
    /// Radial gradient from the centre colour out to the edge colour.
    Radial { inner: Rgba, outer: Rgba },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    Stroke {
        points: Vec<Point>,
        color: Rgba,
        width: f64,
    },
    /// Comet tail; alpha ramps from 0 at the first point to `color.a` at
    /// the last.
    Trail {
        points: Vec<Point>,
        color: Rgba,
        width: f64,
    },
    Disc {
        center: Point,
        radius: f64,
        fill: Fill,
    },
}

/// One frame, described rather than painted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn discs(&self) -> impl Iterator<Item = (&Point, f64)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCmd::Disc { center, radius, .. } => Some((center, *radius)),
            _ => None,
        })
    }
}

// ───────────────────────────────────────── field ─────────────

#[derive(Debug)]
pub struct SignalField {
    size: Size,
    paths: Vec<Path>,
    signals: Vec<Signal>,
    focal: Option<Point>,
    spec: SignalSpec,
    policy: WrapPolicy,
    palette: FieldPalette,
    rng: Rng,
}

impl SignalField {
    pub fn new(spec: SignalSpec, policy: WrapPolicy, seed: u64) -> Self {
        Self {
            size: Size::default(),
            paths: Vec::new(),
            signals: Vec::new(),
            focal: None,
            spec,
            policy,
            palette: FieldPalette::default(),
            rng: Rng::with_seed(seed),
        }
    }

    /// Rebuild paths for `size` and respawn every signal.  Old signals are
    /// dropped wholesale: their path indices point into geometry that no
    /// longer exists.
    pub fn regenerate(&mut self, generator: &dyn PathGenerator, size: Size, density: f64) {
        self.size = size;
        self.paths = generator.generate(size, density, &mut self.rng);
        self.focal = generator.focal_point(size).filter(|_| !self.paths.is_empty());

        let count = if self.paths.is_empty() {
            0
        } else {
            ((self.paths.len() as f64 * self.spec.per_path).round() as usize).max(1)
        };
        let path_count = self.paths.len();
        self.signals = (0..count)
            .map(|i| {
                let mut signal = spawn(&mut self.rng, &self.spec, i % path_count);
                signal.progress = self.rng.f64();
                signal
            })
            .collect();
        trace!(paths = self.paths.len(), signals = self.signals.len(), "field regenerated");
    }

    /// Advance every signal by `speed * dt` (seconds).
    pub fn update(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let path_count = self.paths.len();
        for signal in &mut self.signals {
            signal.progress += signal.speed * dt;
            if signal.progress < 1.0 {
                continue;
            }
            let laps = signal.progress.floor();
            signal.cycles = signal.cycles.saturating_add(laps as u32);
            match self.policy {
                WrapPolicy::InPlace => signal.progress -= laps,
                WrapPolicy::Reassign => {
                    let index = if path_count > 0 {
                        self.rng.usize(0..path_count)
                    } else {
                        signal.path_index
                    };
                    let cycles = signal.cycles;
                    *signal = spawn(&mut self.rng, &self.spec, index);
                    signal.cycles = cycles;
                }
            }
        }
    }

    /// Describe the current frame.
    pub fn draw(&self) -> DrawList {
        let mut list = DrawList::default();
        list.push(DrawCmd::Clear);

        for path in &self.paths {
            list.push(DrawCmd::Stroke {
                points: path.flatten(24),
                color: self.palette.path,
                width: 1.0,
            });
        }

        if let Some(focal) = self.focal {
            let radius = self.size.width.min(self.size.height) * 0.08;
            list.push(DrawCmd::Disc {
                center: focal,
                radius,
                fill: Fill::Radial {
                    inner: self.palette.glow,
                    outer: self.palette.glow.with_alpha(0.0),
                },
            });
        }

        for signal in &self.signals {
            let Some(path) = self.paths.get(signal.path_index) else {
                trace!(index = signal.path_index, "skipping signal with stale path");
                continue;
            };
            let color = self.palette.signal.with_alpha(signal.opacity);

            let samples = self.spec.trail_samples.max(2);
            let tail = (signal.progress - self.spec.trail).max(0.0);
            let points: Vec<Point> = (0..samples)
                .map(|i| {
                    let f = i as f64 / (samples - 1) as f64;
                    path.point_at(tail + (signal.progress - tail) * f)
                })
                .collect();
            list.push(DrawCmd::Trail {
                points,
                color,
                width: signal.size * 0.6,
            });

            list.push(DrawCmd::Disc {
                center: path.point_at(signal.progress),
                radius: signal.size,
                fill: Fill::Radial {
                    inner: Rgba::rgb(255, 255, 255).with_alpha(signal.opacity),
                    outer: color.with_alpha(0.0),
                },
            });
        }
        list
    }

    pub fn set_palette(&mut self, palette: FieldPalette) {
        self.palette = palette;
    }

    pub fn set_policy(&mut self, policy: WrapPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> WrapPolicy {
        self.policy
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn signals_mut(&mut self) -> &mut [Signal] {
        &mut self.signals
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

fn spawn(rng: &mut Rng, spec: &SignalSpec, path_index: usize) -> Signal {
    let pick = |rng: &mut Rng, (lo, hi): (f64, f64)| lo + rng.f64() * (hi - lo).max(0.0);
    Signal {
        path_index,
        progress: 0.0,
        speed: pick(rng, spec.speed),
        opacity: pick(rng, spec.opacity),
        size: pick(rng, spec.size),
        cycles: 0,
    }
}
