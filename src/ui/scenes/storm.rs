use tracing::warn;

use super::{CanvasScene, Scene, cloudy, cloudy::CloudPainter, rain, rain::RainPainter};
use crate::{
    domain::scene::{SceneContext, SceneId},
    ui::stage::{Stage, StageError},
};

const CLOUD_DENSITY_SCALE: f32 = 0.9;

/// Dark cloud deck under heavy rain. Without shading the storm is rain alone.
#[derive(Debug)]
pub struct StormScene {
    clouds: Option<CanvasScene<CloudPainter>>,
    rain: CanvasScene<RainPainter>,
}

pub fn build(stage: &mut Stage, context: &SceneContext) -> Result<Box<dyn Scene>, StageError> {
    Ok(Box::new(StormScene::attach(stage, context)?))
}

impl StormScene {
    pub fn attach(stage: &mut Stage, context: &SceneContext) -> Result<Self, StageError> {
        let mut clouds = match cloudy::attach(stage, 1, CLOUD_DENSITY_SCALE, false, context) {
            Ok(clouds) => Some(clouds),
            Err(err) => {
                warn!(%err, "storm clouds unavailable; drawing rain only");
                None
            }
        };
        let rain = match rain::attach(stage, 2, context) {
            Ok(rain) => rain,
            Err(err) => {
                if let Some(clouds) = clouds.as_mut() {
                    clouds.destroy(stage);
                }
                return Err(err);
            }
        };
        Ok(Self { clouds, rain })
    }

    #[must_use]
    pub fn has_clouds(&self) -> bool {
        self.clouds.is_some()
    }

    #[must_use]
    pub fn rain(&self) -> &CanvasScene<RainPainter> {
        &self.rain
    }

    #[must_use]
    pub fn clouds(&self) -> Option<&CanvasScene<CloudPainter>> {
        self.clouds.as_ref()
    }

    fn each(&mut self, stage: &mut Stage, mut f: impl FnMut(&mut dyn Scene, &mut Stage)) {
        if let Some(clouds) = self.clouds.as_mut() {
            f(clouds, stage);
        }
        f(&mut self.rain, stage);
    }
}

impl Scene for StormScene {
    fn scene_id(&self) -> SceneId {
        SceneId::Storm
    }

    fn resize(&mut self, stage: &mut Stage) {
        self.each(stage, |layer, stage| layer.resize(stage));
    }

    fn set_context(&mut self, stage: &mut Stage, context: &SceneContext) {
        self.each(stage, |layer, stage| layer.set_context(stage, context));
    }

    fn pause(&mut self, stage: &mut Stage) {
        self.each(stage, |layer, stage| layer.pause(stage));
    }

    fn resume(&mut self, stage: &mut Stage) {
        self.each(stage, |layer, stage| layer.resume(stage));
    }

    fn tick(&mut self, stage: &mut Stage, now_secs: f64) {
        self.each(stage, |layer, stage| layer.tick(stage, now_secs));
    }

    fn destroy(&mut self, stage: &mut Stage) {
        self.each(stage, |layer, stage| layer.destroy(stage));
    }

    fn is_running(&self) -> bool {
        self.rain.is_running()
    }
}
