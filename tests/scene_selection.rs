use proptest::prelude::*;
use weather_pane::domain::{
    scene::{ForcedScene, SceneId, Variant, apply_forced_scene, compute_scene_context},
    weather::{ConditionFamily, condition_family},
};

const SNOW_CODES: [u8; 6] = [71, 73, 75, 77, 85, 86];
const HEAVY_CODES: [u8; 6] = [63, 65, 82, 95, 96, 99];

fn any_code() -> impl Strategy<Value = Option<u8>> {
    prop_oneof![Just(None), (0u8..=99).prop_map(Some)]
}

fn any_cover() -> impl Strategy<Value = Option<f32>> {
    prop_oneof![Just(None), (-50.0f32..200.0).prop_map(Some)]
}

proptest! {
    #[test]
    fn snow_codes_pick_the_snow_variant(night in any::<bool>(), cover in any_cover(), idx in 0usize..SNOW_CODES.len()) {
        let ctx = compute_scene_context(night, cover, Some(SNOW_CODES[idx]));
        prop_assert_eq!(ctx.variant, Variant::Snow);
        prop_assert!(ctx.scene_id.is_precipitation());
    }

    #[test]
    fn heavy_codes_pick_a_full_storm(night in any::<bool>(), cover in any_cover(), idx in 0usize..HEAVY_CODES.len()) {
        let ctx = compute_scene_context(night, cover, Some(HEAVY_CODES[idx]));
        prop_assert_eq!(ctx.scene_id, SceneId::Storm);
        prop_assert!((ctx.intensity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn selection_is_deterministic(night in any::<bool>(), cover in any_cover(), code in any_code()) {
        prop_assert_eq!(
            compute_scene_context(night, cover, code),
            compute_scene_context(night, cover, code)
        );
    }

    #[test]
    fn dry_nights_are_always_starry(cover in any_cover(), code in any_code()) {
        let ctx = compute_scene_context(true, cover, code);
        let wet = code.is_some_and(|code| matches!(
            condition_family(code),
            ConditionFamily::Snow | ConditionFamily::Rain | ConditionFamily::HeavyRain
        ));
        if !wet {
            prop_assert_eq!(ctx.scene_id, SceneId::NightClear);
        }
        prop_assert_ne!(ctx.scene_id, SceneId::ClearDay);
    }

    #[test]
    fn values_stay_within_range(night in any::<bool>(), cover in any_cover(), code in any_code()) {
        let ctx = compute_scene_context(night, cover, code);
        prop_assert!((0.0..=1.4).contains(&ctx.intensity));
        prop_assert!((0.0..=100.0).contains(&ctx.cloud_cover));
    }

    #[test]
    fn forced_scenes_ignore_the_weather(
        night in any::<bool>(),
        cover in any_cover(),
        code in any_code(),
        idx in 1usize..ForcedScene::ALL.len(),
    ) {
        let forced = ForcedScene::ALL[idx];
        let preset = forced.preset().unwrap();
        let ctx = apply_forced_scene(compute_scene_context(night, cover, code), forced);
        prop_assert_eq!(ctx.scene_id, preset.scene_id);
        prop_assert_eq!(ctx.variant, preset.variant);
        prop_assert!((ctx.intensity - preset.intensity).abs() < f32::EPSILON);
        prop_assert!((ctx.cloud_cover - preset.cloud_cover).abs() < f32::EPSILON);
        prop_assert_eq!(ctx.is_night, preset.is_night);
        prop_assert_eq!(ctx.forced_scene, forced);
    }
}

#[test]
fn overcast_day_is_cloudy() {
    let ctx = compute_scene_context(false, Some(70.0), Some(3));
    assert_eq!(ctx.scene_id, SceneId::Cloudy);
    assert!(ctx.intensity >= 0.75);
}

#[test]
fn heavy_rain_at_night_is_a_night_storm() {
    let ctx = compute_scene_context(true, None, Some(65));
    assert_eq!(ctx.scene_id, SceneId::Storm);
    assert_eq!(ctx.variant, Variant::NightRain);
    assert!((ctx.intensity - 1.0).abs() < f32::EPSILON);
}

#[test]
fn unknown_code_with_light_cover_is_a_dim_clear_day() {
    let ctx = compute_scene_context(false, Some(20.0), None);
    assert_eq!(ctx.scene_id, SceneId::ClearDay);
    assert!((ctx.intensity - 0.3).abs() < f32::EPSILON);
}

#[test]
fn clear_night_becomes_the_starry_sky() {
    let ctx = compute_scene_context(true, None, Some(0));
    assert_eq!(ctx.scene_id, SceneId::NightClear);
}

#[test]
fn forced_storm_matches_its_preset() {
    let ctx = apply_forced_scene(compute_scene_context(true, Some(3.0), Some(0)), ForcedScene::Storm);
    assert_eq!(ctx.scene_id, SceneId::Storm);
    assert_eq!(ctx.variant, Variant::Rain);
    assert!((ctx.intensity - 1.0).abs() < f32::EPSILON);
    assert!((ctx.cloud_cover - 95.0).abs() < f32::EPSILON);
    assert!(!ctx.is_night);
}
