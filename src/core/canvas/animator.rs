//! Frame-driven lifecycle around a [`SignalField`].
//!
//! An animator owns one drawing surface exclusively.  In animated mode it
//! keeps exactly one frame request outstanding; in static mode
//! (reduced motion) it paints once and never asks for another frame.
//! `unmount` hands back everything it registered.

use std::time::Duration;

use tracing::debug;

use super::field::{DrawList, FieldPalette, SignalField, SignalSpec, WrapPolicy};
use super::path::PathGenerator;
use crate::core::geometry::{Size, Viewport};
use crate::core::host::{ListenerId, ListenerKind, ListenerRegistry, OwnerId};
use crate::core::schedule::{FrameHandle, FrameScheduler, LoopId};

/// Longest step a single frame may advance the simulation.
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// Something that can show a [`DrawList`].
pub trait Surface {
    /// Resize the backing store to `size * pixel_ratio` and reset the
    /// scale transform.
    fn configure(&mut self, size: Size, pixel_ratio: f64);
    fn present(&mut self, list: &DrawList);
}

/// Surface that just keeps the last presented frame for a host to paint.
#[derive(Debug, Default, Clone)]
pub struct RetainedSurface {
    pub size: Size,
    pub pixel_ratio: f64,
    pub last: Option<DrawList>,
    pub presents: u64,
}

impl Surface for RetainedSurface {
    fn configure(&mut self, size: Size, pixel_ratio: f64) {
        self.size = size;
        self.pixel_ratio = pixel_ratio;
        self.last = None;
    }

    fn present(&mut self, list: &DrawList) {
        self.last = Some(list.clone());
        self.presents += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Animated,
    /// Reduced motion: one frame, no loop.
    Static,
}

#[derive(Debug, Clone)]
pub struct AnimatorConfig {
    pub density: f64,
    pub spec: SignalSpec,
    pub policy: WrapPolicy,
    pub palette: FieldPalette,
    pub seed: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            spec: SignalSpec::default(),
            policy: WrapPolicy::InPlace,
            palette: FieldPalette::default(),
            seed: 0x5eed,
        }
    }
}

/// Density after compact-viewport and touch reductions.
pub fn effective_density(density: f64, viewport: &Viewport, coarse_pointer: bool) -> f64 {
    if viewport.is_compact() || coarse_pointer {
        density * 0.5
    } else {
        density
    }
}

pub struct CanvasAnimator<S: Surface> {
    id: LoopId,
    owner: OwnerId,
    generator: Box<dyn PathGenerator>,
    config: AnimatorConfig,
    surface: Option<S>,
    field: Option<SignalField>,
    motion: Motion,
    coarse_pointer: bool,
    viewport: Option<Viewport>,
    frame: Option<FrameHandle>,
    resize_listener: Option<ListenerId>,
    last_tick: Option<Duration>,
    frames_drawn: u64,
}

impl<S: Surface> CanvasAnimator<S> {
    /// `surface` is `None` when the host could not create a drawing context;
    /// the animator then stays inert.
    pub fn new(
        id: LoopId,
        owner: OwnerId,
        generator: Box<dyn PathGenerator>,
        config: AnimatorConfig,
        surface: Option<S>,
    ) -> Self {
        Self {
            id,
            owner,
            generator,
            config,
            surface,
            field: None,
            motion: Motion::Animated,
            coarse_pointer: false,
            viewport: None,
            frame: None,
            resize_listener: None,
            last_tick: None,
            frames_drawn: 0,
        }
    }

    pub fn mount(
        &mut self,
        now: Duration,
        viewport: Viewport,
        motion: Motion,
        coarse_pointer: bool,
        frames: &mut FrameScheduler,
        listeners: &mut ListenerRegistry,
    ) {
        if self.surface.is_none() {
            debug!(id = self.id.0, "no drawing surface, animator disabled");
            return;
        }
        if self.field.is_some() {
            // Remount without unmount: drop the old loop first so two
            // never run side by side.
            self.unmount(frames, listeners);
        }
        self.motion = motion;
        self.coarse_pointer = coarse_pointer;
        self.resize_listener = Some(listeners.add(ListenerKind::Resize, self.owner));
        let mut field = SignalField::new(
            self.config.spec.clone(),
            self.config.policy,
            self.config.seed,
        );
        field.set_palette(self.config.palette);
        self.field = Some(field);
        self.rebuild(viewport);
        self.render();
        if self.motion == Motion::Animated {
            self.last_tick = Some(now);
            self.frame = Some(frames.request(self.id));
        }
    }

    /// Frame callback: step, paint, and re-request.
    pub fn on_frame(&mut self, now: Duration, frames: &mut FrameScheduler) {
        self.frame = None;
        if self.motion != Motion::Animated || self.field.is_none() {
            return;
        }
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_sub(last))
            .min(MAX_FRAME_STEP);
        self.last_tick = Some(now);
        if let Some(field) = self.field.as_mut() {
            field.update(dt.as_secs_f64());
        }
        self.render();
        self.frame = Some(frames.request(self.id));
    }

    /// Host resize: regenerate paths for the new size and repaint.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.field.is_none() {
            return;
        }
        self.rebuild(viewport);
        self.render();
    }

    /// Switch between looping and a single static frame.
    pub fn set_motion(&mut self, motion: Motion, now: Duration, frames: &mut FrameScheduler) {
        if self.field.is_none() || motion == self.motion {
            self.motion = motion;
            return;
        }
        self.motion = motion;
        match motion {
            Motion::Static => {
                if let Some(handle) = self.frame.take() {
                    frames.cancel(handle);
                }
                self.render();
            }
            Motion::Animated => {
                self.last_tick = Some(now);
                self.frame = Some(frames.request(self.id));
            }
        }
    }

    /// Pointer kind changed: regenerate at the new density.
    pub fn set_coarse_pointer(&mut self, coarse_pointer: bool) {
        if coarse_pointer == self.coarse_pointer {
            return;
        }
        self.coarse_pointer = coarse_pointer;
        if let Some(viewport) = self.viewport.filter(|_| self.field.is_some()) {
            self.rebuild(viewport);
            self.render();
        }
    }

    /// New colours apply from the next frame; a static canvas repaints now.
    pub fn set_palette(&mut self, palette: FieldPalette) {
        self.config.palette = palette;
        let Some(field) = self.field.as_mut() else {
            return;
        };
        field.set_palette(palette);
        if self.motion == Motion::Static {
            self.render();
        }
    }

    /// Cancel the frame loop and drop the resize listener.
    pub fn unmount(&mut self, frames: &mut FrameScheduler, listeners: &mut ListenerRegistry) {
        if let Some(handle) = self.frame.take() {
            frames.cancel(handle);
        }
        if let Some(id) = self.resize_listener.take() {
            listeners.remove(id);
        }
        self.field = None;
        self.last_tick = None;
    }

    fn rebuild(&mut self, viewport: Viewport) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let size = viewport.size;
        surface.configure(size, viewport.pixel_ratio);
        let density = effective_density(self.config.density, &viewport, self.coarse_pointer);
        if let Some(field) = self.field.as_mut() {
            field.regenerate(self.generator.as_ref(), size, density);
            debug!(
                id = self.id.0,
                width = size.width,
                height = size.height,
                paths = field.paths().len(),
                "canvas geometry regenerated"
            );
        }
        self.viewport = Some(viewport);
    }

    fn render(&mut self) {
        let (Some(field), Some(surface)) = (self.field.as_ref(), self.surface.as_mut()) else {
            return;
        };
        surface.present(&field.draw());
        self.frames_drawn += 1;
    }

    pub fn id(&self) -> LoopId {
        self.id
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn field(&self) -> Option<&SignalField> {
        self.field.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}
