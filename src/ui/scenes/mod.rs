//! Animated backdrop renderers.
//!
//! Every renderer draws onto layers it attaches to a [`Stage`]. Canvas-backed renderers share
//! [`CanvasScene`], which pairs a layer and an [`AnimationLoop`] with a [`Painter`] holding the
//! scene-specific particles and drawing code.

use rand::{SeedableRng, rngs::StdRng};
use tracing::warn;

use crate::{
    domain::scene::{SceneContext, SceneId},
    ui::{
        canvas::Canvas,
        stage::{LayerId, ProgramId, Stage, StageError},
    },
};

pub mod clear_day;
pub mod cloudy;
pub mod manager;
pub mod rain;
pub mod starry_night;
pub mod storm;
pub mod volumetric;

/// Longest frame step fed to a renderer, in seconds.
pub const MAX_FRAME_DELTA: f64 = 0.12;

pub trait Scene {
    fn scene_id(&self) -> SceneId;
    /// Rebuilds layouts after the stage changed size; redraws once when stopped.
    fn resize(&mut self, stage: &mut Stage);
    fn set_context(&mut self, stage: &mut Stage, context: &SceneContext);
    fn pause(&mut self, stage: &mut Stage);
    fn resume(&mut self, stage: &mut Stage);
    /// Advances one frame if a frame was requested and the renderer is running.
    fn tick(&mut self, stage: &mut Stage, now_secs: f64);
    /// Stops animating and detaches every layer and program. Safe to call twice.
    fn destroy(&mut self, stage: &mut Stage);
    fn is_running(&self) -> bool;
}

pub type SceneConstructor = fn(&mut Stage, &SceneContext) -> Result<Box<dyn Scene>, StageError>;

#[must_use]
pub fn constructor_for(id: SceneId) -> SceneConstructor {
    match id {
        SceneId::ClearDay => clear_day::build,
        SceneId::Cloudy => cloudy::build,
        SceneId::Rain => rain::build,
        SceneId::Storm => storm::build,
        SceneId::NightClear => starry_night::build,
    }
}

/// Frame pacing for one layer: pending request on the stage, running flag and last timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationLoop {
    layer: LayerId,
    running: bool,
    last_timestamp: Option<f64>,
}

impl AnimationLoop {
    #[must_use]
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            running: false,
            last_timestamp: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self, stage: &mut Stage) {
        self.running = true;
        self.last_timestamp = None;
        stage.request_frame(self.layer);
    }

    pub fn stop(&mut self, stage: &mut Stage) {
        self.running = false;
        stage.cancel_frame(self.layer);
    }

    /// Consumes the pending frame and queues the next one. Returns the clamped delta in
    /// seconds, or `None` when stopped or nothing was requested.
    pub fn step(&mut self, stage: &mut Stage, now_secs: f64) -> Option<f32> {
        if !self.running || !stage.take_frame(self.layer) {
            return None;
        }
        let delta = self
            .last_timestamp
            .map_or(0.0, |last| (now_secs - last).clamp(0.0, MAX_FRAME_DELTA));
        self.last_timestamp = Some(now_secs);
        stage.request_frame(self.layer);
        #[allow(clippy::cast_possible_truncation)]
        Some(delta as f32)
    }
}

/// Scene-specific state and drawing for a [`CanvasScene`].
pub trait Painter {
    fn scene_id(&self) -> SceneId;
    /// Takes the new context; returns true when the layout must be rebuilt.
    fn apply_context(&mut self, context: &SceneContext) -> bool;
    fn layout(&mut self, width: f32, height: f32);
    /// Draws one frame onto a cleared canvas, advancing animation by `delta` seconds.
    fn paint(&mut self, canvas: &mut Canvas, delta: f32);
    /// Painters evaluated as fragment programs need a program slot on the stage.
    fn needs_program(&self) -> bool {
        false
    }
    fn set_running(&mut self, _running: bool) {}
}

#[derive(Debug)]
pub struct CanvasScene<P> {
    layer: LayerId,
    program: Option<ProgramId>,
    animation: AnimationLoop,
    painter: P,
    destroyed: bool,
}

impl<P: Painter> CanvasScene<P> {
    /// Attaches a layer at `z`, applies the context, lays out at the stage size and draws a
    /// still frame. The loop starts stopped.
    pub fn attach(
        stage: &mut Stage,
        z: i32,
        mut painter: P,
        context: &SceneContext,
    ) -> Result<Self, StageError> {
        let layer = stage.attach_layer(z);
        let program = if painter.needs_program() {
            match stage.create_program(layer) {
                Ok(program) => Some(program),
                Err(err) => {
                    stage.detach_layer(layer);
                    return Err(err);
                }
            }
        } else {
            None
        };
        painter.apply_context(&context.clamped());
        let mut scene = Self {
            layer,
            program,
            animation: AnimationLoop::new(layer),
            painter,
            destroyed: false,
        };
        scene.relayout(stage);
        scene.draw(stage, 0.0);
        Ok(scene)
    }

    #[must_use]
    pub fn painter(&self) -> &P {
        &self.painter
    }

    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    fn relayout(&mut self, stage: &mut Stage) {
        if let Some(canvas) = stage.canvas(self.layer) {
            let (width, height) = (canvas.px_width(), canvas.px_height());
            self.painter.layout(width, height);
        }
    }

    fn draw(&mut self, stage: &mut Stage, delta: f32) {
        match stage.canvas_mut(self.layer) {
            Ok(canvas) => {
                canvas.clear();
                self.painter.paint(canvas, delta);
            }
            Err(err) => warn!(scene = self.painter.scene_id().as_str(), %err, "skipping frame"),
        }
    }
}

impl<P: Painter> Scene for CanvasScene<P> {
    fn scene_id(&self) -> SceneId {
        self.painter.scene_id()
    }

    fn resize(&mut self, stage: &mut Stage) {
        if self.destroyed {
            return;
        }
        self.relayout(stage);
        if !self.animation.is_running() {
            self.draw(stage, 0.0);
        }
    }

    fn set_context(&mut self, stage: &mut Stage, context: &SceneContext) {
        if self.destroyed {
            return;
        }
        if self.painter.apply_context(&context.clamped()) {
            self.relayout(stage);
        }
        if !self.animation.is_running() {
            self.draw(stage, 0.0);
        }
    }

    fn pause(&mut self, stage: &mut Stage) {
        self.animation.stop(stage);
        self.painter.set_running(false);
    }

    fn resume(&mut self, stage: &mut Stage) {
        if self.destroyed {
            return;
        }
        self.painter.set_running(true);
        self.animation.start(stage);
    }

    fn tick(&mut self, stage: &mut Stage, now_secs: f64) {
        if let Some(delta) = self.animation.step(stage, now_secs) {
            self.draw(stage, delta);
        }
    }

    fn destroy(&mut self, stage: &mut Stage) {
        self.pause(stage);
        if let Some(program) = self.program.take() {
            stage.delete_program(program);
        }
        stage.detach_layer(self.layer);
        self.destroyed = true;
    }

    fn is_running(&self) -> bool {
        self.animation.is_running()
    }
}

pub(crate) fn seeded_rng(stage: &mut Stage) -> StdRng {
    StdRng::seed_from_u64(stage.layout_seed())
}

/// Wraps a horizontal position into `-margin..=width + margin`.
pub(crate) fn wrap_x(x: f32, width: f32, margin: f32) -> f32 {
    if x < -margin {
        width + margin
    } else if x > width + margin {
        -margin
    } else {
        x
    }
}
