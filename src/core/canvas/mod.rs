//! Ambient canvas animation: path generators, the signal field that travels
//! along them, and the frame-driven animator that owns a drawing surface.

pub mod animator;
pub mod field;
pub mod path;

pub use animator::{CanvasAnimator, Motion, RetainedSurface, Surface};
pub use field::{DrawCmd, DrawList, FieldPalette, SignalField, WrapPolicy};
pub use path::{CircuitTraces, NeuralPaths, Path, PathGenerator};
