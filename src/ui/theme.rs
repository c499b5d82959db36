#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use ratatui::style::Color;

use crate::{
    cli::{ColorArg, ThemeColor, ThemeMode},
    domain::scene::Theme,
    ui::canvas::Rgb,
};

mod capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCapability {
    TrueColor,
    Xterm256,
    Basic16,
}

impl ColorCapability {
    /// Fragment programs need at least the 256-colour cube to be worth evaluating.
    #[must_use]
    pub fn supports_shading(self) -> bool {
        !matches!(self, Self::Basic16)
    }
}

/// Colours for the text layer drawn over the backdrop.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub theme: Theme,
    pub base: Rgb,
    pub surface: Color,
    pub text: Color,
    pub muted_text: Color,
    pub border: Color,
    pub accent: Color,
    pub warning: Color,
    pub danger: Color,
    pub sun: Color,
    pub moon: Color,
}

#[must_use]
pub fn detect_color_capability(mode: ColorArg) -> ColorCapability {
    let term = std::env::var("TERM").ok();
    let colorterm = std::env::var("COLORTERM").ok();
    let no_color = std::env::var("NO_COLOR").ok();
    capability::detect_color_capability_from(
        mode,
        term.as_deref(),
        colorterm.as_deref(),
        no_color.as_deref(),
    )
}

/// Resolves `Auto` from the terminal's `COLORFGBG` hint (`fg;bg`); dark when unknown.
#[must_use]
pub fn resolve_theme(mode: ThemeMode, colorfgbg: Option<&str>) -> Theme {
    match mode {
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Light => Theme::Light,
        ThemeMode::Auto => {
            let background = colorfgbg
                .and_then(|value| value.rsplit(';').next())
                .and_then(|bg| bg.trim().parse::<u8>().ok());
            match background {
                Some(7 | 9..=15) => Theme::Light,
                _ => Theme::Dark,
            }
        }
    }
}

#[must_use]
pub fn resolve_theme_from_env(mode: ThemeMode) -> Theme {
    let colorfgbg = std::env::var("COLORFGBG").ok();
    resolve_theme(mode, colorfgbg.as_deref())
}

#[must_use]
pub fn accent_rgb(color: ThemeColor, theme: Theme) -> Rgb {
    let (dark, light) = match color {
        ThemeColor::Blue => ((96, 165, 250), (37, 99, 235)),
        ThemeColor::Purple => ((167, 139, 250), (124, 58, 237)),
        ThemeColor::Pink => ((244, 114, 182), (219, 39, 119)),
        ThemeColor::Green => ((74, 222, 128), (22, 163, 74)),
        ThemeColor::Orange => ((251, 146, 60), (234, 88, 12)),
        ThemeColor::Teal => ((45, 212, 191), (13, 148, 136)),
        ThemeColor::Grey => ((156, 163, 175), (75, 85, 99)),
    };
    let (r, g, b) = match theme {
        Theme::Dark => dark,
        Theme::Light => light,
    };
    Rgb::new(r, g, b)
}

#[must_use]
pub fn palette_for(theme: Theme, color: ThemeColor, capability: ColorCapability) -> Palette {
    if capability == ColorCapability::Basic16 {
        return basic16_palette(theme, color);
    }

    let (base, surface, text, muted) = match theme {
        Theme::Dark => ((11, 19, 32), (20, 30, 46), (230, 237, 246), (148, 163, 184)),
        Theme::Light => ((226, 234, 244), (244, 247, 251), (15, 23, 42), (71, 85, 105)),
    };
    let accent = accent_rgb(color, theme);
    let accent = ensure_contrast((accent.r, accent.g, accent.b), base, 3.0);
    let border = mix_rgb(muted, base, 0.35);
    let rgb = |c: (u8, u8, u8)| quantize(Color::Rgb(c.0, c.1, c.2), capability);

    Palette {
        theme,
        base: Rgb::new(base.0, base.1, base.2),
        surface: rgb(surface),
        text: rgb(ensure_contrast(text, base, 7.0)),
        muted_text: rgb(ensure_contrast(muted, base, 4.5)),
        border: rgb(border),
        accent: rgb(accent),
        warning: rgb(ensure_contrast((245, 179, 66), base, 3.0)),
        danger: rgb(ensure_contrast((239, 83, 80), base, 3.0)),
        sun: rgb(ensure_contrast((255, 204, 92), base, 2.0)),
        moon: rgb(ensure_contrast((214, 226, 240), base, 2.0)),
    }
}

fn basic16_palette(theme: Theme, color: ThemeColor) -> Palette {
    let accent = match color {
        ThemeColor::Blue => Color::LightBlue,
        ThemeColor::Purple => Color::LightMagenta,
        ThemeColor::Pink => Color::Magenta,
        ThemeColor::Green => Color::LightGreen,
        ThemeColor::Orange => Color::Yellow,
        ThemeColor::Teal => Color::LightCyan,
        ThemeColor::Grey => Color::Gray,
    };
    match theme {
        Theme::Dark => Palette {
            theme,
            base: Rgb::new(0, 0, 0),
            surface: Color::Black,
            text: Color::White,
            muted_text: Color::Gray,
            border: Color::DarkGray,
            accent,
            warning: Color::Yellow,
            danger: Color::LightRed,
            sun: Color::LightYellow,
            moon: Color::White,
        },
        Theme::Light => Palette {
            theme,
            base: Rgb::new(255, 255, 255),
            surface: Color::White,
            text: Color::Black,
            muted_text: Color::DarkGray,
            border: Color::Gray,
            accent: match accent {
                Color::LightBlue => Color::Blue,
                Color::LightMagenta => Color::Magenta,
                Color::LightGreen => Color::Green,
                Color::LightCyan => Color::Cyan,
                Color::Gray => Color::DarkGray,
                other => other,
            },
            warning: Color::Yellow,
            danger: Color::Red,
            sun: Color::Yellow,
            moon: Color::DarkGray,
        },
    }
}

fn mix_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| -> u8 {
        (f32::from(x) + (f32::from(y) - f32::from(x)) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Moves `fg` toward black or white until it reaches `min_ratio` against `bg`.
fn ensure_contrast(fg: (u8, u8, u8), bg: (u8, u8, u8), min_ratio: f32) -> (u8, u8, u8) {
    if contrast_ratio(fg, bg) >= min_ratio {
        return fg;
    }
    let target = if contrast_ratio((255, 255, 255), bg) >= contrast_ratio((0, 0, 0), bg) {
        (255, 255, 255)
    } else {
        (0, 0, 0)
    };

    let mut best = fg;
    let mut best_ratio = contrast_ratio(fg, bg);
    for step in 1..=24 {
        let candidate = mix_rgb(fg, target, step as f32 / 24.0);
        let ratio = contrast_ratio(candidate, bg);
        if ratio > best_ratio {
            best = candidate;
            best_ratio = ratio;
        }
        if ratio >= min_ratio {
            return candidate;
        }
    }
    best
}

fn contrast_ratio(a: (u8, u8, u8), b: (u8, u8, u8)) -> f32 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (hi + 0.05) / (lo + 0.05)
}

fn relative_luminance(rgb: (u8, u8, u8)) -> f32 {
    let r = srgb_to_linear(rgb.0);
    let g = srgb_to_linear(rgb.1);
    let b = srgb_to_linear(rgb.2);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

fn srgb_to_linear(v: u8) -> f32 {
    let s = f32::from(v) / 255.0;
    if s <= 0.04045 {
        s / 12.92
    } else {
        ((s + 0.055) / 1.055).powf(2.4)
    }
}

#[must_use]
pub fn quantize(color: Color, capability: ColorCapability) -> Color {
    match (capability, color) {
        (ColorCapability::TrueColor, c) => c,
        (ColorCapability::Xterm256, Color::Rgb(r, g, b)) => xterm256_from_rgb(r, g, b),
        (ColorCapability::Basic16, Color::Rgb(r, g, b)) => basic16_from_rgb(r, g, b),
        (_, c) => c,
    }
}

/// Nearest of the 6x6x6 cube and the 24-step grey ramp.
fn xterm256_from_rgb(r: u8, g: u8, b: u8) -> Color {
    let to_cube = |v: u8| -> u8 { ((f32::from(v) / 255.0) * 5.0).round() as u8 };
    let cube_level = |i: u8| -> i32 { if i == 0 { 0 } else { 55 + i32::from(i) * 40 } };
    let (ri, gi, bi) = (to_cube(r), to_cube(g), to_cube(b));
    let cube_dist = (cube_level(ri) - i32::from(r)).pow(2)
        + (cube_level(gi) - i32::from(g)).pow(2)
        + (cube_level(bi) - i32::from(b)).pow(2);

    let avg = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
    let grey_idx = (avg.saturating_sub(8) / 10).min(23) as u8;
    let grey_level = 8 + i32::from(grey_idx) * 10;
    let grey_dist = (grey_level - i32::from(r)).pow(2)
        + (grey_level - i32::from(g)).pow(2)
        + (grey_level - i32::from(b)).pow(2);

    if grey_dist < cube_dist {
        Color::Indexed(232 + grey_idx)
    } else {
        Color::Indexed(16 + 36 * ri + 6 * gi + bi)
    }
}

fn basic16_from_rgb(r: u8, g: u8, b: u8) -> Color {
    let rf = f32::from(r) / 255.0;
    let gf = f32::from(g) / 255.0;
    let bf = f32::from(b) / 255.0;

    let max = rf.max(gf.max(bf));
    let min = rf.min(gf.min(bf));
    let delta = max - min;
    let light = (max + min) / 2.0;

    if delta < 0.08 {
        return match light {
            l if l < 0.20 => Color::Black,
            l if l < 0.40 => Color::DarkGray,
            l if l < 0.72 => Color::Gray,
            _ => Color::White,
        };
    }

    let hue = if (max - rf).abs() < f32::EPSILON {
        60.0 * ((gf - bf) / delta).rem_euclid(6.0)
    } else if (max - gf).abs() < f32::EPSILON {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };

    let bright = light >= 0.55;
    let pick = |dim: Color, lit: Color| if bright { lit } else { dim };
    match hue {
        h if !(30.0..330.0).contains(&h) => pick(Color::Red, Color::LightRed),
        h if h < 90.0 => pick(Color::Yellow, Color::LightYellow),
        h if h < 150.0 => pick(Color::Green, Color::LightGreen),
        h if h < 210.0 => pick(Color::Cyan, Color::LightCyan),
        h if h < 270.0 => pick(Color::Blue, Color::LightBlue),
        _ => pick(Color::Magenta, Color::LightMagenta),
    }
}
