#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use rand::{Rng, rngs::StdRng};

use super::{CanvasScene, Painter, Scene, seeded_rng, wrap_x};
use crate::{
    domain::scene::{SceneContext, SceneId, Theme, Variant},
    ui::{
        canvas::{BlendMode, Canvas, Rgba},
        stage::{Stage, StageError},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    Rain {
        x: f32,
        y: f32,
        length: f32,
        speed: f32,
        thickness: f32,
        sway: f32,
    },
    Snow {
        x: f32,
        y: f32,
        radius: f32,
        speed: f32,
        sway: f32,
        drift: f32,
    },
}

/// Falling rain streaks or drifting snow flakes.
#[derive(Debug)]
pub struct RainPainter {
    rng: StdRng,
    variant: Variant,
    intensity: f32,
    theme: Theme,
    width: f32,
    height: f32,
    elapsed: f32,
    drops: Vec<Particle>,
}

pub fn build(stage: &mut Stage, context: &SceneContext) -> Result<Box<dyn Scene>, StageError> {
    Ok(Box::new(attach(stage, 0, context)?))
}

pub(crate) fn attach(
    stage: &mut Stage,
    z: i32,
    context: &SceneContext,
) -> Result<CanvasScene<RainPainter>, StageError> {
    let painter = RainPainter::new(seeded_rng(stage));
    CanvasScene::attach(stage, z, painter, context)
}

impl RainPainter {
    #[must_use]
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            variant: Variant::Rain,
            intensity: 0.7,
            theme: Theme::Dark,
            width: 0.0,
            height: 0.0,
            elapsed: 0.0,
            drops: Vec::new(),
        }
    }

    #[must_use]
    pub fn drops(&self) -> &[Particle] {
        &self.drops
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    #[must_use]
    pub fn drop_count_for(width: f32, height: f32, intensity: f32) -> usize {
        let base = (width * height / 2200.0).round();
        ((base * intensity).round() as usize).max(36)
    }

    fn heavy(&self) -> bool {
        self.intensity > 0.9 || self.variant == Variant::NightRain
    }

    fn spawn(&mut self) -> Particle {
        let heavy = self.heavy();
        let rng = &mut self.rng;
        let x = rng.random::<f32>() * self.width;
        let y = rng.random::<f32>() * self.height;
        if self.variant == Variant::Snow {
            return Particle::Snow {
                x,
                y,
                radius: 1.8 + rng.random::<f32>() * 2.4,
                speed: 18.0 + rng.random::<f32>() * 24.0,
                sway: (rng.random::<f32>() - 0.5) * 18.0,
                drift: (rng.random::<f32>() - 0.5) * 8.0,
            };
        }
        Particle::Rain {
            x,
            y,
            length: 14.0 + rng.random::<f32>() * 20.0,
            speed: if heavy { 320.0 } else { 240.0 } + rng.random::<f32>() * 160.0,
            thickness: if heavy {
                1.2 + rng.random::<f32>() * 1.4
            } else {
                0.8 + rng.random::<f32>() * 1.0
            },
            sway: (rng.random::<f32>() - 0.5) * 18.0,
        }
    }

    /// New drop entering from above the top edge.
    fn respawn_above(&mut self) -> Particle {
        let mut drop = self.spawn();
        match &mut drop {
            Particle::Rain { y, length, .. } => *y = -*length,
            Particle::Snow { y, radius, .. } => *y = -*radius,
        }
        drop
    }

    fn rain_color(&self) -> Rgba {
        let light = self.theme == Theme::Light;
        let (r, g, b, a) = match (self.variant == Variant::NightRain, light) {
            (true, true) => (58, 82, 118, 0.9),
            (true, false) => (180, 210, 255, 0.55),
            (false, true) => (66, 98, 138, 0.85),
            (false, false) => (200, 220, 255, 0.55),
        };
        let global = if light {
            0.78
        } else if self.variant == Variant::NightRain {
            0.55
        } else {
            0.45
        };
        Rgba::new(r, g, b, a * global)
    }
}

impl Painter for RainPainter {
    fn scene_id(&self) -> SceneId {
        SceneId::Rain
    }

    fn apply_context(&mut self, context: &SceneContext) -> bool {
        self.variant = context.variant;
        self.intensity = context.intensity.clamp(0.25, 1.4);
        self.theme = context.theme;
        true
    }

    fn layout(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let count = Self::drop_count_for(width, height, self.intensity);
        self.drops = (0..count).map(|_| self.spawn()).collect();
    }

    fn paint(&mut self, canvas: &mut Canvas, delta: f32) {
        let light = self.theme == Theme::Light;
        let (top, bottom) = if light {
            (Rgba::new(116, 144, 178, 0.35), Rgba::new(148, 174, 204, 0.18))
        } else {
            (Rgba::new(8, 16, 28, 0.6), Rgba::new(6, 14, 26, 0.3))
        };
        canvas.fill_vertical_gradient(&[(0.0, top), (1.0, bottom)], BlendMode::Normal);

        self.elapsed += delta;
        let mode = if light {
            BlendMode::Normal
        } else {
            BlendMode::Lighter
        };
        let streak = self.rain_color();
        let streak_glyph = if self.heavy() { '│' } else { '╎' };
        let (width, height) = (self.width, self.height);

        for idx in 0..self.drops.len() {
            let respawn = match &mut self.drops[idx] {
                Particle::Snow {
                    x,
                    y,
                    radius,
                    speed,
                    sway,
                    drift,
                } => {
                    *y += *speed * delta * 0.45;
                    *x += *drift * delta
                        + (self.elapsed * 0.6 + *y * 0.015).sin() * *sway * delta * 0.4;
                    *x = wrap_x(*x, width, 20.0);
                    *y - *radius > height
                }
                Particle::Rain {
                    x, y, length, speed, sway, ..
                } => {
                    *y += *speed * delta;
                    *x += *sway * delta * 0.05;
                    *x = wrap_x(*x, width, 20.0);
                    *y - *length > height
                }
            };
            if respawn {
                self.drops[idx] = self.respawn_above();
            }

            match self.drops[idx] {
                Particle::Snow { x, y, radius, .. } => {
                    let base = if light { 0.45 } else { 0.35 };
                    let alpha = base + self.rng.random::<f32>() * 0.25;
                    let tint = if light {
                        Rgba::new(135, 154, 178, 0.9 * alpha)
                    } else {
                        Rgba::new(235, 245, 255, 0.9 * alpha)
                    };
                    // Soft halo stands in for the blur filter.
                    canvas.fill_glow_px(x, y, radius * 2.5, tint.scale_alpha(0.5), mode);
                    canvas.plot_px(x, y, if radius > 3.0 { '*' } else { '·' }, tint);
                }
                Particle::Rain {
                    x,
                    y,
                    length,
                    thickness,
                    sway,
                    ..
                } => {
                    let color = streak.scale_alpha((thickness / 2.0).clamp(0.5, 1.0));
                    canvas.line_px((x, y), (x + sway * 0.08, y - length), streak_glyph, color);
                }
            }
        }
    }
}
