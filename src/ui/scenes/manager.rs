use tracing::{debug, warn};

use super::{Scene, SceneConstructor, constructor_for};
use crate::{
    domain::scene::{ContextPatch, SceneContext, SceneId},
    ui::{canvas::Canvas, stage::Stage},
};

/// Maps a scene id to the function that builds its renderer.
pub type SceneRegistry = fn(SceneId) -> SceneConstructor;

/// Owns the stage and at most one active renderer.
pub struct SceneManager {
    stage: Stage,
    registry: SceneRegistry,
    scene: Option<Box<dyn Scene>>,
    scene_id: Option<SceneId>,
    context: Option<SceneContext>,
    /// Last id whose constructor failed on this stage; not retried until the id changes.
    unavailable: Option<SceneId>,
    paused: bool,
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("stage", &self.stage)
            .field("scene_id", &self.scene_id)
            .field("context", &self.context)
            .field("unavailable", &self.unavailable)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl SceneManager {
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self::with_registry(stage, constructor_for)
    }

    #[must_use]
    pub fn with_registry(stage: Stage, registry: SceneRegistry) -> Self {
        Self {
            stage,
            registry,
            scene: None,
            scene_id: None,
            context: None,
            unavailable: None,
            paused: false,
        }
    }

    /// Switches renderers, or forwards the context when `scene_id` is already showing.
    pub fn set_scene(&mut self, scene_id: SceneId, context: SceneContext) {
        if self.scene_id == Some(scene_id) && self.scene.is_some() {
            self.update_context(context.into());
            return;
        }
        if self.unavailable == Some(scene_id) {
            return;
        }

        self.teardown();

        let context = context.clamped();
        let construct = (self.registry)(scene_id);
        match construct(&mut self.stage, &context) {
            Ok(mut scene) => {
                if self.paused {
                    scene.pause(&mut self.stage);
                } else {
                    scene.resume(&mut self.stage);
                }
                debug!(scene = scene_id.as_str(), paused = self.paused, "scene constructed");
                self.scene = Some(scene);
                self.scene_id = Some(scene_id);
                self.context = Some(context);
                self.unavailable = None;
            }
            Err(err) => {
                self.unavailable = Some(scene_id);
                warn!(scene = scene_id.as_str(), %err, "scene unavailable; backdrop left empty");
            }
        }
    }

    /// Merges `patch` into the retained context and hands the result to the active renderer.
    pub fn update_context(&mut self, patch: ContextPatch) {
        let (Some(scene), Some(retained)) = (self.scene.as_mut(), self.context.as_mut()) else {
            return;
        };
        *retained = retained.merge(patch);
        scene.set_context(&mut self.stage, retained);
    }

    pub fn pause(&mut self) {
        self.paused = true;
        if let Some(scene) = self.scene.as_mut() {
            scene.pause(&mut self.stage);
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
        if let Some(scene) = self.scene.as_mut() {
            scene.resume(&mut self.stage);
        }
    }

    /// Tears down the active renderer and forgets its id and context.
    pub fn destroy(&mut self) {
        self.teardown();
        self.unavailable = None;
    }

    fn teardown(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.destroy(&mut self.stage);
            debug!(scene = scene.scene_id().as_str(), "scene destroyed");
        }
        self.scene_id = None;
        self.context = None;
    }

    pub fn tick(&mut self, now_secs: f64) {
        if let Some(scene) = self.scene.as_mut() {
            scene.tick(&mut self.stage, now_secs);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.stage.width(), self.stage.height()) {
            return;
        }
        self.stage.resize(width, height);
        if let Some(scene) = self.scene.as_mut() {
            scene.resize(&mut self.stage);
        }
    }

    #[must_use]
    pub fn compose(&self) -> Canvas {
        self.stage.compose()
    }

    #[must_use]
    pub fn scene_id(&self) -> Option<SceneId> {
        self.scene_id
    }

    #[must_use]
    pub fn context(&self) -> Option<&SceneContext> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scene.as_ref().is_some_and(|scene| scene.is_running())
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }
}
