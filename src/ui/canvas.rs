#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

//! Cell canvases. Each terminal cell stands for an 8x16 px box so scene code can keep
//! working in pixel units; drawing blends into per-cell background colour and glyphs.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::ui::theme::{ColorCapability, quantize};

pub const CELL_PX_W: f32 = 8.0;
pub const CELL_PX_H: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    #[must_use]
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }

    #[must_use]
    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

/// Straight (non-premultiplied) colour with alpha in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    #[must_use]
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: f32::from(r),
            g: f32::from(g),
            b: f32::from(b),
            a: if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    #[must_use]
    pub fn scale_alpha(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    #[must_use]
    pub fn rgb(self) -> Rgb {
        let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// `self` drawn over `dst` with the given blend mode.
    #[must_use]
    pub fn over(self, dst: Self, mode: BlendMode) -> Self {
        let sa = self.a;
        if sa <= 0.0 {
            return dst;
        }
        match mode {
            BlendMode::Normal => {
                let out_a = sa + dst.a * (1.0 - sa);
                if out_a <= f32::EPSILON {
                    return Self::TRANSPARENT;
                }
                let mix = |s: f32, d: f32| (s * sa + d * dst.a * (1.0 - sa)) / out_a;
                Self {
                    r: mix(self.r, dst.r),
                    g: mix(self.g, dst.g),
                    b: mix(self.b, dst.b),
                    a: out_a,
                }
            }
            BlendMode::Lighter => {
                let out_a = (sa + dst.a).min(1.0);
                let add = |s: f32, d: f32| ((s * sa + d * dst.a) / out_a).min(255.0);
                Self {
                    r: add(self.r, dst.r),
                    g: add(self.g, dst.g),
                    b: add(self.b, dst.b),
                    a: out_a,
                }
            }
        }
    }

    /// Flattens onto an opaque colour.
    #[must_use]
    pub fn over_opaque(self, dst: Rgb) -> Rgb {
        self.over(dst.with_alpha(1.0), BlendMode::Normal).rgb()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    /// Additive, like a 2D canvas `lighter` composite.
    Lighter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    pub bg: Rgba,
    pub glyph: Option<Glyph>,
}

/// A transparent layer of terminal cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); usize::from(width) * usize::from(height)];
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub fn px_width(&self) -> f32 {
        f32::from(self.width) * CELL_PX_W
    }

    #[must_use]
    pub fn px_height(&self) -> f32 {
        f32::from(self.height) * CELL_PX_H
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.bg.a <= 0.0 && cell.glyph.is_none())
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|idx| &mut self.cells[idx])
    }

    fn cell_at_px(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let cx = (x / CELL_PX_W) as u32;
        let cy = (y / CELL_PX_H) as u32;
        (cx < u32::from(self.width) && cy < u32::from(self.height))
            .then_some((cx as u16, cy as u16))
    }

    pub fn blend_cell(&mut self, x: u16, y: u16, color: Rgba, mode: BlendMode) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.bg = color.over(cell.bg, mode);
        }
    }

    /// Per-row vertical gradient through `stops` (`(offset 0..=1, colour)`, ascending).
    pub fn fill_vertical_gradient(&mut self, stops: &[(f32, Rgba)], mode: BlendMode) {
        if stops.is_empty() || self.height == 0 {
            return;
        }
        for y in 0..self.height {
            let t = (f32::from(y) + 0.5) / f32::from(self.height);
            let color = sample_gradient(stops, t);
            for x in 0..self.width {
                self.blend_cell(x, y, color, mode);
            }
        }
    }

    /// Fills a pixel-space rectangle, scaling alpha by how much of each cell it covers.
    pub fn fill_rect_px(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba, mode: BlendMode) {
        if w <= 0.0 || h <= 0.0 || !x.is_finite() || !y.is_finite() {
            return;
        }
        let x0 = (x / CELL_PX_W).floor().max(0.0) as u32;
        let y0 = (y / CELL_PX_H).floor().max(0.0) as u32;
        let x1 = ((x + w) / CELL_PX_W).ceil().min(f32::from(self.width)) as u32;
        let y1 = ((y + h) / CELL_PX_H).ceil().min(f32::from(self.height)) as u32;
        for cy in y0..y1 {
            for cx in x0..x1 {
                let left = cx as f32 * CELL_PX_W;
                let top = cy as f32 * CELL_PX_H;
                let overlap_w = (x + w).min(left + CELL_PX_W) - x.max(left);
                let overlap_h = (y + h).min(top + CELL_PX_H) - y.max(top);
                if overlap_w <= 0.0 || overlap_h <= 0.0 {
                    continue;
                }
                let coverage = (overlap_w * overlap_h) / (CELL_PX_W * CELL_PX_H);
                self.blend_cell(cx as u16, cy as u16, color.scale_alpha(coverage), mode);
            }
        }
    }

    /// Soft radial glow: alpha falls off linearly from the centre to `radius`.
    pub fn fill_glow_px(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba, mode: BlendMode) {
        if radius <= 0.0 {
            return;
        }
        let x0 = ((cx - radius) / CELL_PX_W).floor().max(0.0) as u32;
        let y0 = ((cy - radius) / CELL_PX_H).floor().max(0.0) as u32;
        let x1 = ((cx + radius) / CELL_PX_W).ceil().min(f32::from(self.width)) as u32;
        let y1 = ((cy + radius) / CELL_PX_H).ceil().min(f32::from(self.height)) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let px = (x as f32 + 0.5) * CELL_PX_W;
                let py = (y as f32 + 0.5) * CELL_PX_H;
                let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                let falloff = (1.0 - dist / radius).max(0.0);
                if falloff > 0.0 {
                    self.blend_cell(x as u16, y as u16, color.scale_alpha(falloff), mode);
                }
            }
        }
    }

    /// Places a glyph in the cell under a pixel position. A later glyph replaces an earlier
    /// one unless the earlier one is more opaque.
    pub fn plot_px(&mut self, x: f32, y: f32, ch: char, color: Rgba) {
        let Some((cx, cy)) = self.cell_at_px(x, y) else {
            return;
        };
        if let Some(cell) = self.cell_mut(cx, cy) {
            match cell.glyph {
                Some(existing) if existing.color.a >= color.a => {}
                _ => cell.glyph = Some(Glyph { ch, color }),
            }
        }
    }

    /// Plots `ch` along a pixel-space segment, one glyph per crossed cell.
    pub fn line_px(&mut self, from: (f32, f32), to: (f32, f32), ch: char, color: Rgba) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = (dx.abs() / CELL_PX_W).max(dy.abs() / CELL_PX_H).ceil().max(1.0) as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.plot_px(from.0 + dx * t, from.1 + dy * t, ch, color);
        }
    }

    /// Draws `self` on top of `below`, cell by cell.
    pub fn composite_onto(&self, below: &mut Canvas) {
        let width = self.width.min(below.width);
        let height = self.height.min(below.height);
        for y in 0..height {
            for x in 0..width {
                let Some(src) = self.cell(x, y).copied() else {
                    continue;
                };
                if let Some(dst) = below.cell_mut(x, y) {
                    dst.bg = src.bg.over(dst.bg, BlendMode::Normal);
                    if src.glyph.is_some() {
                        dst.glyph = src.glyph;
                    }
                }
            }
        }
    }
}

fn sample_gradient(stops: &[(f32, Rgba)], t: f32) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.0 {
        return first.1;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.0 {
            let span = (b.0 - a.0).max(f32::EPSILON);
            return a.1.lerp(b.1, (t - a.0) / span);
        }
    }
    stops.last().map_or(Rgba::TRANSPARENT, |stop| stop.1)
}

/// Paints a composed canvas over an opaque base colour into the frame buffer.
pub struct CanvasView<'a> {
    pub canvas: &'a Canvas,
    pub base: Rgb,
    pub capability: ColorCapability,
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in 0..area.height.min(self.canvas.height()) {
            for x in 0..area.width.min(self.canvas.width()) {
                let Some(src) = self.canvas.cell(x, y) else {
                    continue;
                };
                let bg = src.bg.over_opaque(self.base);
                if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                    cell.set_char(' ')
                        .set_bg(quantize(bg.to_color(), self.capability));
                    if let Some(glyph) = src.glyph {
                        let fg = glyph.color.over_opaque(bg);
                        cell.set_char(glyph.ch)
                            .set_fg(quantize(fg.to_color(), self.capability));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colours_split_into_channels() {
        assert_eq!(Rgb::from_hex(0x3c506e), Rgb::new(0x3c, 0x50, 0x6e));
    }

    #[test]
    fn normal_blend_over_transparent_keeps_source() {
        let src = Rgba::new(200, 100, 50, 0.5);
        let out = src.over(Rgba::TRANSPARENT, BlendMode::Normal);
        assert!((out.a - 0.5).abs() < f32::EPSILON);
        assert_eq!(out.rgb(), Rgb::new(200, 100, 50));
    }

    #[test]
    fn normal_blend_onto_opaque_mixes_by_alpha() {
        let out = Rgba::new(255, 255, 255, 0.5).over_opaque(Rgb::new(0, 0, 0));
        assert_eq!(out, Rgb::new(128, 128, 128));
    }

    #[test]
    fn lighter_blend_adds_and_saturates() {
        let dst = Rgba::new(200, 200, 200, 1.0);
        let out = Rgba::new(200, 10, 0, 1.0).over(dst, BlendMode::Lighter);
        assert_eq!(out.rgb(), Rgb::new(255, 210, 200));
    }

    #[test]
    fn partial_rect_scales_alpha_by_coverage() {
        let mut canvas = Canvas::new(2, 1);
        canvas.fill_rect_px(0.0, 0.0, 4.0, 16.0, Rgba::new(255, 0, 0, 1.0), BlendMode::Normal);
        let cell = canvas.cell(0, 0).unwrap();
        assert!((cell.bg.a - 0.5).abs() < 1e-6);
        assert!(canvas.cell(1, 0).unwrap().bg.a.abs() < f32::EPSILON);
    }

    #[test]
    fn plotting_outside_is_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.plot_px(-1.0, 5.0, '*', Rgba::new(255, 255, 255, 1.0));
        canvas.plot_px(4.0 * CELL_PX_W, 5.0, '*', Rgba::new(255, 255, 255, 1.0));
        canvas.plot_px(f32::NAN, 5.0, '*', Rgba::new(255, 255, 255, 1.0));
        assert!(canvas.is_empty());
    }

    #[test]
    fn line_marks_every_crossed_row() {
        let mut canvas = Canvas::new(1, 4);
        canvas.line_px((2.0, 1.0), (2.0, 63.0), '|', Rgba::new(255, 255, 255, 0.5));
        for y in 0..4 {
            assert_eq!(canvas.cell(0, y).unwrap().glyph.map(|g| g.ch), Some('|'));
        }
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [
            (0.0, Rgba::new(0, 0, 0, 1.0)),
            (1.0, Rgba::new(200, 200, 200, 1.0)),
        ];
        let mut canvas = Canvas::new(1, 2);
        canvas.fill_vertical_gradient(&stops, BlendMode::Normal);
        assert_eq!(canvas.cell(0, 0).unwrap().bg.rgb(), Rgb::new(50, 50, 50));
        assert_eq!(canvas.cell(0, 1).unwrap().bg.rgb(), Rgb::new(150, 150, 150));
    }

    #[test]
    fn composite_keeps_upper_glyph() {
        let mut lower = Canvas::new(1, 1);
        lower.plot_px(1.0, 1.0, '.', Rgba::new(255, 255, 255, 0.9));
        let mut upper = Canvas::new(1, 1);
        upper.plot_px(1.0, 1.0, '|', Rgba::new(200, 220, 255, 0.4));
        upper.composite_onto(&mut lower);
        assert_eq!(lower.cell(0, 0).unwrap().glyph.map(|g| g.ch), Some('|'));
    }

    #[test]
    fn resize_discards_old_content() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect_px(0.0, 0.0, 16.0, 32.0, Rgba::new(1, 2, 3, 1.0), BlendMode::Normal);
        canvas.resize(3, 1);
        assert_eq!((canvas.width(), canvas.height()), (3, 1));
        assert!(canvas.is_empty());
    }
}
