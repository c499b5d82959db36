use super::{
    CanvasScene, Painter, Scene,
    volumetric::{CloudPalette, CloudUniforms, FRAME_TIME_STEP, shade},
};
use crate::{
    domain::scene::{SceneContext, SceneId},
    ui::{
        canvas::{BlendMode, Canvas},
        stage::{Stage, StageError},
    },
};

/// Volumetric cloud deck evaluated per cell through a stage program.
#[derive(Debug)]
pub struct CloudPainter {
    uniforms: CloudUniforms,
    density_scale: f32,
    backdrop: bool,
}

pub fn build(stage: &mut Stage, context: &SceneContext) -> Result<Box<dyn Scene>, StageError> {
    Ok(Box::new(attach(stage, 0, 1.0, true, context)?))
}

/// `density_scale` multiplies intensity into cloud density; `backdrop` adds a faint sky wash.
pub(crate) fn attach(
    stage: &mut Stage,
    z: i32,
    density_scale: f32,
    backdrop: bool,
    context: &SceneContext,
) -> Result<CanvasScene<CloudPainter>, StageError> {
    CanvasScene::attach(stage, z, CloudPainter::new(density_scale, backdrop), context)
}

impl CloudPainter {
    #[must_use]
    pub fn new(density_scale: f32, backdrop: bool) -> Self {
        Self {
            uniforms: CloudUniforms::default(),
            density_scale,
            backdrop,
        }
    }

    #[must_use]
    pub fn uniforms(&self) -> &CloudUniforms {
        &self.uniforms
    }
}

impl Painter for CloudPainter {
    fn scene_id(&self) -> SceneId {
        SceneId::Cloudy
    }

    fn apply_context(&mut self, context: &SceneContext) -> bool {
        self.uniforms.density = context.intensity * self.density_scale;
        self.uniforms.coverage = context.cloud_cover.clamp(0.0, 100.0) / 100.0;
        self.uniforms.palette = CloudPalette::for_theme(context.theme);
        false
    }

    fn layout(&mut self, _width: f32, _height: f32) {}

    fn paint(&mut self, canvas: &mut Canvas, _delta: f32) {
        self.uniforms.time += FRAME_TIME_STEP * self.uniforms.speed;

        if self.backdrop {
            let sky = self.uniforms.palette.sky;
            canvas.fill_vertical_gradient(
                &[(0.0, sky.with_alpha(0.3)), (1.0, sky.with_alpha(0.1))],
                BlendMode::Normal,
            );
        }

        let (width, height) = (f32::from(canvas.width()), f32::from(canvas.height()));
        for cy in 0..canvas.height() {
            let v = 1.0 - (f32::from(cy) + 0.5) / height;
            for cx in 0..canvas.width() {
                let u = (f32::from(cx) + 0.5) / width;
                let fragment = shade(&self.uniforms, (u, v));
                if fragment.a > 0.0 {
                    canvas.blend_cell(cx, cy, fragment, BlendMode::Normal);
                }
            }
        }
    }

    fn needs_program(&self) -> bool {
        true
    }

    fn set_running(&mut self, running: bool) {
        self.uniforms.speed = if running { 1.0 } else { 0.0 };
    }
}
