#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::f32::consts::PI;

use rand::{Rng, rngs::StdRng};

use super::{CanvasScene, Painter, Scene, seeded_rng, wrap_x};
use crate::{
    domain::scene::{SceneContext, SceneId, Theme},
    ui::{
        canvas::{BlendMode, CELL_PX_H, CELL_PX_W, Canvas, Rgba},
        stage::{Stage, StageError},
    },
};

const BEAM_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub offset: f32,
    pub width: f32,
    pub speed: f32,
    pub angle: f32,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mote {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed: f32,
    pub drift: f32,
    pub alpha: f32,
}

/// Warm haze with slow diagonal light beams and rising dust motes.
#[derive(Debug)]
pub struct ClearDayPainter {
    rng: StdRng,
    intensity: f32,
    theme: Theme,
    width: f32,
    height: f32,
    beams: Vec<Beam>,
    motes: Vec<Mote>,
}

pub fn build(stage: &mut Stage, context: &SceneContext) -> Result<Box<dyn Scene>, StageError> {
    let painter = ClearDayPainter::new(seeded_rng(stage));
    Ok(Box::new(CanvasScene::attach(stage, 0, painter, context)?))
}

impl ClearDayPainter {
    #[must_use]
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            intensity: 0.6,
            theme: Theme::Dark,
            width: 0.0,
            height: 0.0,
            beams: Vec::new(),
            motes: Vec::new(),
        }
    }

    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    #[must_use]
    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    #[must_use]
    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    #[must_use]
    pub fn mote_count_for(width: f32, height: f32, intensity: f32) -> usize {
        let density = width * height / 15_000.0;
        ((density * (0.7 + intensity)).round() as usize).max(16)
    }

    fn build_beams(&mut self) {
        let rng = &mut self.rng;
        self.beams = (0..BEAM_COUNT)
            .map(|idx| Beam {
                offset: idx as f32 / BEAM_COUNT as f32 * self.width,
                width: self.width * (0.16 + rng.random::<f32>() * 0.12),
                speed: 10.0 + rng.random::<f32>() * 16.0,
                angle: (10.0 + rng.random::<f32>() * 5.0) * PI / 180.0,
                intensity: 0.05 + self.intensity * 0.08,
            })
            .collect();
    }

    fn build_motes(&mut self) {
        let count = Self::mote_count_for(self.width, self.height, self.intensity);
        let rng = &mut self.rng;
        self.motes = (0..count)
            .map(|_| Mote {
                x: rng.random::<f32>() * self.width,
                y: rng.random::<f32>() * self.height,
                radius: 3.0 + rng.random::<f32>() * 4.0,
                speed: 14.0 + rng.random::<f32>() * 20.0,
                drift: (rng.random::<f32>() - 0.5) * 12.0,
                alpha: 0.04 + rng.random::<f32>() * 0.08,
            })
            .collect();
    }

    fn paint_haze(&self, canvas: &mut Canvas) {
        let (top, bottom) = match self.theme {
            Theme::Light => (Rgba::new(64, 102, 140, 0.28), Rgba::new(118, 162, 210, 0.12)),
            Theme::Dark => (Rgba::new(20, 36, 56, 0.42), Rgba::new(12, 24, 40, 0.18)),
        };
        canvas.fill_vertical_gradient(&[(0.0, top), (1.0, bottom)], BlendMode::Normal);
    }

    fn paint_beams(&mut self, canvas: &mut Canvas, delta: f32) {
        let light = self.theme == Theme::Light;
        let mid = if light { (255, 254, 250) } else { (255, 245, 210) };
        let (width, height) = (self.width, self.height);
        for beam in &mut self.beams {
            beam.offset += beam.speed * delta;
            if beam.offset - beam.width > width {
                beam.offset = -beam.width;
            }
            let alpha = (beam.intensity.clamp(0.0, 1.0) * if light { 4.5 } else { 1.0 }).min(1.0);
            let color = Rgba::new(mid.0, mid.1, mid.2, alpha);
            let (sin, cos) = beam.angle.sin_cos();
            for cy in 0..canvas.height() {
                for cx in 0..canvas.width() {
                    let dx = (f32::from(cx) + 0.5) * CELL_PX_W - beam.offset;
                    let dy = (f32::from(cy) + 0.5) * CELL_PX_H;
                    // Beam-local coordinates; the beam is rotated by -angle about its offset.
                    let lx = dx * cos - dy * sin;
                    let ly = dx * sin + dy * cos;
                    if lx.abs() > beam.width / 2.0 || ly < -height || ly > height * 1.6 {
                        continue;
                    }
                    let t = (ly + height) / (height * 2.8);
                    let ramp = if t < 0.4 { t / 0.4 } else { (1.0 - t) / 0.6 };
                    canvas.blend_cell(cx, cy, color.scale_alpha(ramp.max(0.0)), BlendMode::Lighter);
                }
            }
        }
    }

    fn paint_motes(&mut self, canvas: &mut Canvas, delta: f32) {
        let light = self.theme == Theme::Light;
        let tint = if light { (255, 254, 252) } else { (255, 245, 210) };
        let (width, height) = (self.width, self.height);
        for mote in &mut self.motes {
            mote.y -= mote.speed * delta * 0.6;
            mote.x += mote.drift * delta * 0.2;
            if mote.y + mote.radius < 0.0 {
                mote.y = height + mote.radius;
                mote.x = self.rng.random::<f32>() * width;
            }
            mote.x = wrap_x(mote.x, width, 20.0);

            let alpha = (mote.alpha.clamp(0.0, 1.0) * if light { 5.0 } else { 1.0 }).min(1.0);
            canvas.fill_glow_px(
                mote.x,
                mote.y,
                mote.radius * 2.4,
                Rgba::new(tint.0, tint.1, tint.2, alpha),
                BlendMode::Lighter,
            );
        }
    }
}

impl Painter for ClearDayPainter {
    fn scene_id(&self) -> SceneId {
        SceneId::ClearDay
    }

    fn apply_context(&mut self, context: &SceneContext) -> bool {
        self.intensity = context.intensity.clamp(0.25, 1.0);
        self.theme = context.theme;
        false
    }

    fn layout(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.build_beams();
        self.build_motes();
    }

    fn paint(&mut self, canvas: &mut Canvas, delta: f32) {
        self.paint_haze(canvas);
        self.paint_beams(canvas, delta);
        self.paint_motes(canvas, delta);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn painter(intensity: f32) -> ClearDayPainter {
        let mut painter = ClearDayPainter::new(StdRng::seed_from_u64(3));
        painter.apply_context(&SceneContext {
            intensity,
            ..SceneContext::default()
        });
        painter.layout(640.0, 384.0);
        painter
    }

    #[test]
    fn intensity_is_kept_within_quarter_and_one() {
        assert!((painter(0.05).intensity() - 0.25).abs() < f32::EPSILON);
        assert!((painter(1.4).intensity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn beams_start_spread_across_the_width() {
        let painter = painter(0.6);
        let offsets: Vec<f32> = painter.beams().iter().map(|b| b.offset).collect();
        assert_eq!(offsets.len(), 3);
        assert!(offsets[0].abs() < f32::EPSILON);
        assert!((offsets[1] - 640.0 / 3.0).abs() < 1e-3);
        for beam in painter.beams() {
            assert!(beam.width >= 640.0 * 0.16 && beam.width <= 640.0 * 0.28);
            assert!((beam.intensity - (0.05 + 0.6 * 0.08)).abs() < 1e-6);
        }
    }

    #[test]
    fn mote_count_has_a_floor() {
        assert_eq!(ClearDayPainter::mote_count_for(10.0, 10.0, 0.25), 16);
        assert_eq!(ClearDayPainter::mote_count_for(1500.0, 1000.0, 1.0), 170);
    }

    #[test]
    fn beams_wrap_back_to_the_left() {
        let mut painter = painter(0.6);
        let mut canvas = Canvas::new(80, 24);
        for _ in 0..400 {
            painter.paint(&mut canvas, 0.12);
        }
        for beam in painter.beams() {
            assert!(beam.offset >= -beam.width && beam.offset - beam.width <= 640.0);
        }
    }

    #[test]
    fn motes_rise_and_respawn_below() {
        let mut painter = painter(0.6);
        let mut canvas = Canvas::new(80, 24);
        let before: Vec<f32> = painter.motes().iter().map(|m| m.y).collect();
        painter.paint(&mut canvas, 0.1);
        for (mote, y0) in painter.motes().iter().zip(before) {
            assert!(mote.y < y0 || mote.y > 384.0);
        }
        for _ in 0..2000 {
            painter.paint(&mut canvas, 0.12);
        }
        for mote in painter.motes() {
            assert!(mote.y + mote.radius >= 0.0);
            assert!(mote.x >= -20.0 && mote.x <= 660.0);
        }
    }

    #[test]
    fn frame_draws_haze_everywhere() {
        let mut painter = painter(0.6);
        let mut canvas = Canvas::new(80, 24);
        painter.paint(&mut canvas, 0.0);
        assert!(canvas.cell(0, 0).unwrap().bg.a > 0.3);
        assert!(canvas.cell(79, 23).unwrap().bg.a > 0.1);
    }
}
