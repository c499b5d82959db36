#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

//! Day strip: sky colours for the current hour, the sun's altitude curve over the local day,
//! the sun and moon markers, and the starfield fading in after sunset.

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders},
};

use crate::{
    domain::solar::{SkyPalette, SolarContext},
    ui::{
        canvas::{BlendMode, CELL_PX_H, CELL_PX_W, Canvas, CanvasView, Rgb},
        layout::inner,
        scenes::starry_night::Starfield,
        theme::{ColorCapability, Palette},
    },
};

const PATH_STEP_MINUTES: u32 = 10;
const SUN: Rgb = Rgb::new(255, 204, 92);
const MOON: Rgb = Rgb::new(214, 226, 240);

/// Vertical pixel position for an altitude; the horizon sits at [`Starfield::HORIZON_RATIO`].
fn altitude_to_y(altitude_deg: f64, height_px: f32) -> f32 {
    let horizon = height_px * Starfield::HORIZON_RATIO;
    let alt = altitude_deg.clamp(-90.0, 90.0) as f32;
    if alt >= 0.0 {
        horizon - alt / 90.0 * (horizon - CELL_PX_H * 0.5)
    } else {
        horizon + (-alt / 90.0) * (height_px - horizon)
    }
}

fn minute_to_x(minutes: f64, width_px: f32) -> f32 {
    (minutes / 1440.0) as f32 * width_px
}

/// Composes the strip at `width`×`height` cells. `stars` is the animated starfield layer.
#[must_use]
pub fn sun_path_canvas(
    solar: Option<&SolarContext>,
    now: DateTime<Utc>,
    stars: &Canvas,
    width: u16,
    height: u16,
) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    let sky = solar.map_or(SkyPalette::UNKNOWN, |solar| solar.sky_palette(now));
    canvas.fill_vertical_gradient(
        &[
            (0.0, Rgb::from(sky.top).with_alpha(1.0)),
            (0.55, Rgb::from(sky.middle).with_alpha(1.0)),
            (1.0, Rgb::from(sky.bottom).with_alpha(1.0)),
        ],
        BlendMode::Normal,
    );
    stars.composite_onto(&mut canvas);

    let (w_px, h_px) = (canvas.px_width(), canvas.px_height());
    let horizon = h_px * Starfield::HORIZON_RATIO;
    canvas.line_px((0.0, horizon), (w_px - 1.0, horizon), '─', Rgb::new(148, 163, 184).with_alpha(0.7));

    let Some(solar) = solar else {
        return canvas;
    };

    for sample in solar.sun_path(PATH_STEP_MINUTES) {
        let alpha = if sample.altitude_deg >= 0.0 { 0.85 } else { 0.3 };
        canvas.plot_px(
            minute_to_x(f64::from(sample.minutes), w_px),
            altitude_to_y(sample.altitude_deg, h_px),
            '·',
            SUN.with_alpha(alpha),
        );
    }

    let moon = solar.moon_position(now);
    if moon.altitude > 0.0 {
        let lit = solar.moon_illumination(now).fraction as f32;
        let glyph = if lit > 0.5 { '○' } else { '◌' };
        canvas.plot_px(
            w_px - CELL_PX_W * 1.5,
            CELL_PX_H * 0.5,
            glyph,
            MOON.with_alpha(0.5 + lit * 0.5),
        );
    }

    let sun_altitude = solar.sun_position(now).altitude.to_degrees();
    let x = minute_to_x(solar.minute_of_day(now), w_px);
    let y = altitude_to_y(sun_altitude, h_px);
    if sun_altitude > 0.0 {
        canvas.fill_glow_px(x, y, CELL_PX_W * 3.0, SUN.with_alpha(0.35), BlendMode::Lighter);
    }
    let alpha = if sun_altitude > 0.0 { 1.0 } else { 0.55 };
    canvas.plot_px(x, y, '●', SUN.with_alpha(alpha));
    canvas
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    solar: Option<&SolarContext>,
    now: DateTime<Utc>,
    stars: &Canvas,
    palette: &Palette,
    capability: ColorCapability,
) {
    let block = Block::default()
        .title(" Sun path ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    frame.render_widget(block, area);

    let strip = inner(area);
    if strip.width == 0 || strip.height == 0 {
        return;
    }
    let canvas = sun_path_canvas(solar, now, stars, strip.width, strip.height);
    frame.render_widget(
        CanvasView {
            canvas: &canvas,
            base: palette.base,
            capability,
        },
        strip,
    );
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::test_support::sample_report;

    fn solar_at(now: DateTime<Utc>) -> SolarContext {
        SolarContext::from_report(&sample_report(Some(0), Some(0.0)), now)
    }

    fn glyph_rows(canvas: &Canvas, ch: char) -> Vec<u16> {
        (0..canvas.height())
            .filter(|&y| {
                (0..canvas.width())
                    .any(|x| canvas.cell(x, y).and_then(|c| c.glyph).is_some_and(|g| g.ch == ch))
            })
            .collect()
    }

    #[test]
    fn altitude_maps_above_and_below_horizon() {
        let height = 112.0;
        let horizon = height * Starfield::HORIZON_RATIO;
        assert!((altitude_to_y(0.0, height) - horizon).abs() < f32::EPSILON);
        assert!(altitude_to_y(45.0, height) < horizon);
        assert!(altitude_to_y(-20.0, height) > horizon);
        assert!(altitude_to_y(90.0, height) >= 0.0);
        assert!(altitude_to_y(-90.0, height) <= height);
    }

    #[test]
    fn midday_sun_sits_above_the_horizon() {
        let noon = Utc.with_ymd_and_hms(2026, 6, 21, 11, 0, 0).unwrap();
        let solar = solar_at(noon);
        let canvas = sun_path_canvas(Some(&solar), noon, &Canvas::default(), 78, 7);
        let horizon_row = glyph_rows(&canvas, '─');
        let sun_row = glyph_rows(&canvas, '●');
        assert_eq!(sun_row.len(), 1);
        assert!(sun_row[0] < horizon_row[0]);
    }

    #[test]
    fn strip_without_solar_context_shows_only_sky_and_horizon() {
        let now = Utc::now();
        let canvas = sun_path_canvas(None, now, &Canvas::default(), 40, 6);
        assert!(glyph_rows(&canvas, '●').is_empty());
        assert_eq!(glyph_rows(&canvas, '─').len(), 1);
        assert!((canvas.cell(0, 0).unwrap().bg.a - 1.0).abs() < 1e-3);
    }
}
