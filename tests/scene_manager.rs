mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::context;
use weather_pane::{
    domain::scene::{ContextPatch, SceneContext, SceneId},
    ui::{
        scenes::{Scene, SceneConstructor, constructor_for, manager::SceneManager},
        stage::{Stage, StageError},
    },
};

static RAIN_BUILDS: AtomicUsize = AtomicUsize::new(0);

fn counting_rain(stage: &mut Stage, ctx: &SceneContext) -> Result<Box<dyn Scene>, StageError> {
    RAIN_BUILDS.fetch_add(1, Ordering::SeqCst);
    constructor_for(SceneId::Rain)(stage, ctx)
}

fn counting_registry(id: SceneId) -> SceneConstructor {
    match id {
        SceneId::Rain => counting_rain as SceneConstructor,
        other => constructor_for(other),
    }
}

fn manager() -> SceneManager {
    SceneManager::new(Stage::new(60, 20, true).with_seed(11))
}

#[test]
fn same_scene_is_never_rebuilt() {
    let mut manager = SceneManager::with_registry(Stage::new(60, 20, true), counting_registry);
    manager.set_scene(SceneId::Rain, context(SceneId::Rain));
    manager.set_scene(
        SceneId::Rain,
        SceneContext {
            intensity: 1.2,
            ..context(SceneId::Rain)
        },
    );
    assert_eq!(RAIN_BUILDS.load(Ordering::SeqCst), 1);
    assert!((manager.context().unwrap().intensity - 1.2).abs() < f32::EPSILON);
    assert_eq!(manager.stage().layer_count(), 1);
}

#[test]
fn destroy_leaves_a_clean_stage_for_every_scene() {
    for id in SceneId::ALL {
        let mut manager = manager();
        manager.set_scene(id, context(id));
        manager.resume();
        manager.tick(0.0);
        manager.tick(0.05);
        manager.destroy();

        let stage = manager.stage();
        assert_eq!(stage.layer_count(), 0, "{id:?}");
        assert_eq!(stage.pending_frames(), 0, "{id:?}");
        assert_eq!(stage.program_count(), 0, "{id:?}");
        assert!(!manager.has_scene());
    }
}

#[test]
fn calls_after_destroy_are_harmless() {
    let mut manager = manager();
    manager.set_scene(SceneId::Storm, context(SceneId::Storm));
    manager.destroy();
    manager.pause();
    manager.resume();
    manager.update_context(ContextPatch {
        intensity: Some(0.2),
        ..ContextPatch::default()
    });
    manager.tick(1.0);
    manager.destroy();
    assert!(!manager.has_scene());
    assert_eq!(manager.stage().pending_frames(), 0);
    assert!(manager.compose().is_empty());
}

#[test]
fn switching_scenes_replaces_the_renderer() {
    let mut manager = manager();
    manager.set_scene(SceneId::Storm, context(SceneId::Storm));
    assert_eq!(manager.stage().layer_count(), 2);
    manager.set_scene(SceneId::NightClear, context(SceneId::NightClear));
    assert_eq!(manager.scene_id(), Some(SceneId::NightClear));
    assert_eq!(manager.stage().layer_count(), 1);
    assert_eq!(manager.stage().program_count(), 0);
}

#[test]
fn pause_cancels_frames_for_both_storm_layers() {
    let mut manager = manager();
    manager.set_scene(SceneId::Storm, context(SceneId::Storm));
    manager.resume();
    assert_eq!(manager.stage().pending_frames(), 2);
    manager.pause();
    assert_eq!(manager.stage().pending_frames(), 0);
    let before = manager.compose();
    manager.tick(3.0);
    assert_eq!(manager.compose(), before);
    manager.resume();
    assert_eq!(manager.stage().pending_frames(), 2);
}

#[test]
fn monochrome_storm_keeps_its_rain() {
    let mut manager = SceneManager::new(Stage::new(60, 20, false));
    manager.set_scene(SceneId::Storm, context(SceneId::Storm));
    assert!(manager.has_scene());
    assert_eq!(manager.stage().layer_count(), 1);
    assert_eq!(manager.stage().program_count(), 0);

    manager.set_scene(SceneId::Cloudy, context(SceneId::Cloudy));
    assert!(!manager.has_scene());
    assert_eq!(manager.stage().layer_count(), 0);
}
