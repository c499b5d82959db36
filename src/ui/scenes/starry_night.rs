#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::f32::consts::TAU;

use rand::{Rng, rngs::StdRng};

use super::{CanvasScene, Painter, Scene, seeded_rng};
use crate::{
    domain::scene::{SceneContext, SceneId, Theme},
    ui::{
        canvas::{BlendMode, Canvas, Rgb, Rgba},
        stage::{Stage, StageError},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub depth: f32,
    pub base_alpha: f32,
    pub twinkle_speed: f32,
    pub phase: f32,
    pub color: Rgb,
}

impl Star {
    /// Two out-of-step sine waves so neighbouring stars never pulse together.
    #[must_use]
    pub fn twinkle_alpha(&self, time: f32) -> f32 {
        let primary = (time * self.twinkle_speed * TAU + self.phase).sin();
        let secondary = (time * self.twinkle_speed * 1.7 * TAU + self.phase * 1.31).sin();
        (self.base_alpha * (0.6 + primary * 0.25 + secondary * 0.18)).clamp(0.0, 1.0)
    }

    fn glyph(&self) -> char {
        if self.size >= 2.0 { '•' } else { '·' }
    }
}

#[must_use]
pub fn star_count_for(width: f32, height: f32, cloud_cover: f32) -> usize {
    let base = (width * height / 3200.0).round().clamp(220.0, 650.0);
    let visibility = 1.0 - (cloud_cover / 100.0 * 0.9).min(0.9);
    ((base * visibility).round() as usize).max(60)
}

#[must_use]
pub fn cover_factor(cloud_cover: f32) -> f32 {
    (1.0 - cloud_cover / 105.0).max(0.25)
}

/// Clear night sky; cloud cover thins the field and dims what is left.
#[derive(Debug)]
pub struct StarryNightPainter {
    rng: StdRng,
    cloud_cover: f32,
    theme: Theme,
    elapsed: f32,
    stars: Vec<Star>,
}

pub fn build(stage: &mut Stage, context: &SceneContext) -> Result<Box<dyn Scene>, StageError> {
    let painter = StarryNightPainter::new(seeded_rng(stage));
    Ok(Box::new(CanvasScene::attach(stage, 0, painter, context)?))
}

impl StarryNightPainter {
    #[must_use]
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            cloud_cover: 0.0,
            theme: Theme::Dark,
            elapsed: 0.0,
            stars: Vec::new(),
        }
    }

    #[must_use]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    fn star_color(&self) -> Rgb {
        match self.theme {
            Theme::Light => Rgb::from_hex(0x00d8_e4f0),
            Theme::Dark => Rgb::from_hex(0x00dc_eeff),
        }
    }
}

impl Painter for StarryNightPainter {
    fn scene_id(&self) -> SceneId {
        SceneId::NightClear
    }

    fn apply_context(&mut self, context: &SceneContext) -> bool {
        self.cloud_cover = context.cloud_cover.clamp(0.0, 100.0);
        self.theme = context.theme;
        true
    }

    fn layout(&mut self, width: f32, height: f32) {
        let count = star_count_for(width, height, self.cloud_cover);
        let color = self.star_color();
        let rng = &mut self.rng;
        self.stars = (0..count)
            .map(|_| Star {
                x: rng.random::<f32>() * width,
                y: rng.random::<f32>() * height * 0.8,
                size: if rng.random::<f32>() < 0.5 { 1.0 } else { 2.0 },
                depth: 0.0,
                base_alpha: 0.66 + rng.random::<f32>() * 0.34,
                twinkle_speed: 0.35 + rng.random::<f32>() * 0.55,
                phase: rng.random::<f32>() * TAU,
                color,
            })
            .collect();
    }

    fn paint(&mut self, canvas: &mut Canvas, delta: f32) {
        let light = self.theme == Theme::Light;
        let (top, bottom) = if light {
            (Rgba::new(24, 32, 52, 0.75), Rgba::new(38, 52, 76, 0.42))
        } else {
            (Rgba::new(5, 12, 24, 0.85), Rgba::new(8, 18, 32, 0.4))
        };
        canvas.fill_vertical_gradient(&[(0.0, top), (1.0, bottom)], BlendMode::Normal);

        self.elapsed += delta;
        let factor = cover_factor(self.cloud_cover) * if light { 1.3 } else { 1.0 };
        let mode = if light {
            BlendMode::Normal
        } else {
            BlendMode::Lighter
        };
        for star in &self.stars {
            let alpha = (star.twinkle_alpha(self.elapsed) * factor).min(1.0);
            let color = star.color.with_alpha(alpha);
            if star.size >= 2.0 {
                canvas.fill_glow_px(star.x, star.y, 6.0, color.scale_alpha(0.2), mode);
            }
            canvas.plot_px(star.x, star.y, star.glyph(), color);
        }
    }
}

/// Twinkling stars above the horizon of the sun-path strip, faded in as the sun sets.
#[derive(Debug)]
pub struct Starfield {
    rng: StdRng,
    width: f32,
    height: f32,
    time: f32,
    stars: Vec<Star>,
}

impl Starfield {
    pub const HORIZON_RATIO: f32 = 0.75;

    #[must_use]
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            width: 0.0,
            height: 0.0,
            time: 0.0,
            stars: Vec::new(),
        }
    }

    #[must_use]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Regenerates stars when the size changes.
    pub fn resize(&mut self, width: f32, height: f32) {
        let (width, height) = (width.max(1.0), height.max(1.0));
        if (width - self.width).abs() < f32::EPSILON
            && (height - self.height).abs() < f32::EPSILON
            && !self.stars.is_empty()
        {
            return;
        }
        self.width = width;
        self.height = height;
        let count = (width * height / 2500.0).round().clamp(260.0, 600.0) as usize;
        let sky_height = (height * Self::HORIZON_RATIO * 0.9).max(1.0);
        self.stars = (0..count)
            .map(|_| {
                let depth = self.rng.random::<f32>();
                let color = self.pick_color();
                let rng = &mut self.rng;
                Star {
                    x: rng.random::<f32>() * width,
                    y: rng.random::<f32>() * sky_height,
                    size: 1.4 + depth * 2.6,
                    depth,
                    base_alpha: 0.35 + rng.random::<f32>() * 0.55,
                    twinkle_speed: 0.35 + rng.random::<f32>() * 0.6,
                    phase: rng.random::<f32>() * TAU,
                    color,
                }
            })
            .collect();
    }

    fn pick_color(&mut self) -> Rgb {
        let rng = &mut self.rng;
        let temp = rng.random::<f32>();
        let jitter = |rng: &mut StdRng, base: f32, span: f32| (base + rng.random::<f32>() * span).round() as u8;
        if temp > 0.9 {
            Rgb::new(jitter(rng, 200.0, 40.0), jitter(rng, 216.0, 30.0), 255)
        } else if temp > 0.7 {
            Rgb::new(255, jitter(rng, 240.0, 15.0), jitter(rng, 200.0, 40.0))
        } else if temp < 0.2 {
            Rgb::new(255, jitter(rng, 225.0, 20.0), jitter(rng, 180.0, 40.0))
        } else {
            Rgb::new(255, 255, 255)
        }
    }

    /// Advances the twinkle clock and draws at `opacity`; nothing happens when invisible.
    pub fn update(&mut self, canvas: &mut Canvas, delta: f32, opacity: f32) {
        if opacity <= 0.001 {
            return;
        }
        self.time += delta;
        for star in &self.stars {
            let alpha = star.twinkle_alpha(self.time) * opacity.min(1.0);
            let color = star.color.with_alpha(alpha);
            let glyph = if star.size * (0.8 + star.depth * 0.6) > 3.2 { '✦' } else { star.glyph() };
            canvas.plot_px(star.x, star.y, glyph, color);
        }
    }
}
