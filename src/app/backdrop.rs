//! Drives the scene manager from weather, sun times and the user's backdrop settings.

use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use crate::{
    cli::CloudState,
    domain::{
        scene::{ForcedScene, SceneContext, SceneId, Theme, apply_forced_scene, scene_context_at},
        solar::SolarContext,
        weather::WeatherSnapshot,
    },
    ui::{canvas::Canvas, scenes::manager::SceneManager, stage::Stage},
};

/// Resizes arriving closer together than this are coalesced into one.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackdropSettings {
    pub cloud_state: CloudState,
    pub forced_scene: ForcedScene,
    pub theme: Theme,
    pub reduced_motion: bool,
}

/// What the weather says right now.
#[derive(Debug, Clone, Copy)]
pub struct SceneInputs<'a> {
    pub now: DateTime<FixedOffset>,
    pub snapshot: WeatherSnapshot,
    pub solar: Option<&'a SolarContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingResize {
    width: u16,
    height: u16,
    requested_at: Instant,
}

#[derive(Debug)]
pub struct Backdrop {
    manager: Option<SceneManager>,
    width: u16,
    height: u16,
    shading: bool,
    seed: u64,
    pending_resize: Option<PendingResize>,
}

impl Backdrop {
    #[must_use]
    pub fn new(width: u16, height: u16, shading: bool) -> Self {
        Self {
            manager: None,
            width,
            height,
            shading,
            seed: rand::random(),
            pending_resize: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rebuilds the scene for current conditions, or tears the backdrop down when it is
    /// switched off or motion is reduced.
    pub fn refresh(&mut self, inputs: &SceneInputs<'_>, settings: &BackdropSettings) {
        if settings.cloud_state == CloudState::Off || settings.reduced_motion {
            if settings.reduced_motion && settings.cloud_state == CloudState::On {
                info!("reduced motion requested; disabling backdrop");
            }
            self.teardown();
            return;
        }

        let context = scene_context(inputs, settings);
        let (width, height, shading, seed) = (self.width, self.height, self.shading, self.seed);
        let created = self.manager.is_none();
        let manager = self
            .manager
            .get_or_insert_with(|| SceneManager::new(Stage::new(width, height, shading).with_seed(seed)));

        manager.set_scene(context.scene_id, context);
        manager.update_context(context.into());

        if settings.cloud_state == CloudState::Paused {
            manager.pause();
        } else {
            manager.resume();
        }

        if created {
            info!(
                scene = context.scene_id.as_str(),
                forced = settings.forced_scene.label(),
                intensity = context.intensity,
                cloud_cover = context.cloud_cover,
                night = context.is_night,
                "backdrop initialised"
            );
        } else {
            debug!(scene = context.scene_id.as_str(), "backdrop refreshed");
        }
    }

    /// Applies a new cloud animation state; `settings.cloud_state` is the new state.
    pub fn set_cloud_state(&mut self, inputs: &SceneInputs<'_>, settings: &BackdropSettings) {
        match settings.cloud_state {
            CloudState::On => {
                if settings.reduced_motion {
                    info!("reduced motion active; keeping backdrop still");
                } else if let Some(manager) = self.manager.as_mut() {
                    manager.resume();
                    debug!("backdrop resumed");
                }
                self.refresh(inputs, settings);
            }
            CloudState::Paused => match self.manager.as_mut() {
                Some(manager) => {
                    manager.pause();
                    debug!("backdrop paused");
                }
                None => self.refresh(inputs, settings),
            },
            CloudState::Off => self.refresh(inputs, settings),
        }
    }

    pub fn request_resize(&mut self, width: u16, height: u16, now: Instant) {
        self.pending_resize = Some(PendingResize {
            width,
            height,
            requested_at: now,
        });
    }

    /// Applies the last requested size once no new request arrived for [`RESIZE_DEBOUNCE`].
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending_resize else {
            return false;
        };
        if now.saturating_duration_since(pending.requested_at) < RESIZE_DEBOUNCE {
            return false;
        }
        self.pending_resize = None;
        self.width = pending.width;
        self.height = pending.height;
        if let Some(manager) = self.manager.as_mut() {
            manager.resize(pending.width, pending.height);
        }
        debug!(width = pending.width, height = pending.height, "backdrop resized");
        true
    }

    pub fn tick(&mut self, now_secs: f64) {
        if let Some(manager) = self.manager.as_mut() {
            manager.tick(now_secs);
        }
    }

    fn teardown(&mut self) {
        if let Some(mut manager) = self.manager.take() {
            manager.destroy();
            debug!("backdrop torn down");
        }
    }

    #[must_use]
    pub fn compose(&self) -> Option<Canvas> {
        self.manager.as_ref().map(SceneManager::compose)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.manager.is_some()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.manager.as_ref().is_some_and(SceneManager::is_running)
    }

    #[must_use]
    pub fn scene_id(&self) -> Option<SceneId> {
        self.manager.as_ref().and_then(SceneManager::scene_id)
    }

    #[must_use]
    pub fn context(&self) -> Option<SceneContext> {
        self.manager.as_ref().and_then(|manager| manager.context().copied())
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn manager(&self) -> Option<&SceneManager> {
        self.manager.as_ref()
    }
}

fn scene_context(inputs: &SceneInputs<'_>, settings: &BackdropSettings) -> SceneContext {
    let computed = scene_context_at(inputs.now, inputs.solar, inputs.snapshot);
    SceneContext {
        theme: settings.theme,
        ..apply_forced_scene(computed, settings.forced_scene)
    }
}
