//! CPU fragment program for layered clouds: 3D simplex noise summed into fractal
//! Brownian motion, thresholded by cloud coverage and lit from a fixed direction.

use crate::{
    domain::scene::Theme,
    ui::canvas::{Rgb, Rgba},
};

/// Time added to the program clock per rendered frame.
pub const FRAME_TIME_STEP: f32 = 0.016;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudPalette {
    pub sky: Rgb,
    pub cloud: Rgb,
    pub shadow: Rgb,
    pub sun: Rgb,
}

impl CloudPalette {
    pub const DARK: Self = Self {
        sky: Rgb::from_hex(0x000a_1628),
        cloud: Rgb::from_hex(0x003c_506e),
        shadow: Rgb::from_hex(0x0019_2332),
        sun: Rgb::from_hex(0x0064_788c),
    };

    pub const LIGHT: Self = Self {
        sky: Rgb::from_hex(0x00ca_dcf3),
        cloud: Rgb::from_hex(0x00b8_b8b8),
        shadow: Rgb::from_hex(0x0078_8898),
        sun: Rgb::from_hex(0x00ff_e3a0),
    };

    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::DARK,
            Theme::Light => Self::LIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudUniforms {
    pub time: f32,
    pub density: f32,
    /// `0..=1`, from cloud cover percent.
    pub coverage: f32,
    /// 1 while animating, 0 when paused.
    pub speed: f32,
    pub palette: CloudPalette,
}

impl Default for CloudUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            density: 0.8,
            coverage: 0.5,
            speed: 0.0,
            palette: CloudPalette::DARK,
        }
    }
}

type Vec3 = [f32; 3];

/// `normalize(0.5, 0.8, 0.3)`
const LIGHT_DIR: Vec3 = [0.505_076_3, 0.808_122_1, 0.303_045_8];

fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_9 - 0.853_734_7 * r
}

fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Ashima-style 3D simplex noise, roughly in `-1..=1`.
#[must_use]
pub fn simplex3(v: Vec3) -> f32 {
    const C_X: f32 = 1.0 / 6.0;
    const C_Y: f32 = 1.0 / 3.0;

    let skew = (v[0] + v[1] + v[2]) * C_Y;
    let i = [
        (v[0] + skew).floor(),
        (v[1] + skew).floor(),
        (v[2] + skew).floor(),
    ];
    let unskew = (i[0] + i[1] + i[2]) * C_X;
    let x0 = [v[0] - i[0] + unskew, v[1] - i[1] + unskew, v[2] - i[2] + unskew];

    let g = [step(x0[1], x0[0]), step(x0[2], x0[1]), step(x0[0], x0[2])];
    let l = [1.0 - g[0], 1.0 - g[1], 1.0 - g[2]];
    let i1 = [g[0].min(l[2]), g[1].min(l[0]), g[2].min(l[1])];
    let i2 = [g[0].max(l[2]), g[1].max(l[0]), g[2].max(l[1])];

    let corners = [
        x0,
        [x0[0] - i1[0] + C_X, x0[1] - i1[1] + C_X, x0[2] - i1[2] + C_X],
        [x0[0] - i2[0] + C_Y, x0[1] - i2[1] + C_Y, x0[2] - i2[2] + C_Y],
        [x0[0] - 0.5, x0[1] - 0.5, x0[2] - 0.5],
    ];
    let offsets = [[0.0; 3], i1, i2, [1.0; 3]];

    let i = [mod289(i[0]), mod289(i[1]), mod289(i[2])];
    let ns = [2.0 / 7.0, 0.5 / 7.0 - 1.0, 1.0 / 7.0];

    let mut total = 0.0;
    for (corner, offset) in corners.iter().zip(offsets) {
        let p = permute(permute(permute(i[2] + offset[2]) + i[1] + offset[1]) + i[0] + offset[0]);
        let j = p - 49.0 * (p * ns[2] * ns[2]).floor();
        let gx_ = (j * ns[2]).floor();
        let gy_ = (j - 7.0 * gx_).floor();
        let mut gx = gx_ * ns[0] + ns[1];
        let mut gy = gy_ * ns[0] + ns[1];
        let gz = 1.0 - gx.abs() - gy.abs();
        if gz <= 0.0 {
            gx -= gx.floor() * 2.0 + 1.0;
            gy -= gy.floor() * 2.0 + 1.0;
        }
        let grad = [gx, gy, gz];
        let norm = taylor_inv_sqrt(dot(grad, grad));
        let grad = [gx * norm, gy * norm, gz * norm];

        let m = (0.6 - dot(*corner, *corner)).max(0.0);
        let m = m * m;
        total += m * m * dot(grad, *corner);
    }
    42.0 * total
}

/// Four octaves, amplitude halving and frequency doubling.
#[must_use]
pub fn fbm(p: Vec3) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..4 {
        value += amplitude * simplex3([p[0] * frequency, p[1] * frequency, p[2] * frequency]);
        frequency *= 2.0;
        amplitude *= 0.5;
    }
    value
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn mix(a: Rgb, b: Rgb, t: f32) -> [f32; 3] {
    let lerp = |x: u8, y: u8| f32::from(x) + (f32::from(y) - f32::from(x)) * t;
    [lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b)]
}

/// Coverage threshold on combined noise: sparse wisps at 0, full deck at 1.
#[must_use]
pub fn coverage_threshold(coverage: f32) -> f32 {
    0.45 - coverage * 0.35
}

/// Evaluates one fragment. `uv` is in `0..=1` with `v` pointing up.
#[must_use]
pub fn shade(uniforms: &CloudUniforms, uv: (f32, f32)) -> Rgba {
    let t = uniforms.time;
    let mut pos = [uv.0 * 2.0 - 1.0, uv.1 * 2.0 - 1.0, 0.0];
    pos[0] += t * uniforms.speed * 0.05;

    let n1 = fbm([pos[0] * 1.5 + t * 0.02, pos[1] * 1.5 + t * 0.01, pos[2] * 1.5]);
    let n2 = fbm([pos[0] * 3.0 - t * 0.03, pos[1] * 3.0, pos[2] * 3.0 - t * 0.02]);

    let density = (n1 * 0.7 + n2 * 0.3 + 0.5) * uniforms.density;
    let threshold = coverage_threshold(uniforms.coverage);
    let density = smoothstep(threshold, threshold + 0.35, density)
        * smoothstep(0.0, 0.4, uv.1)
        * smoothstep(1.0, 0.6, uv.1);
    if density <= 0.0 {
        return Rgba::TRANSPARENT;
    }

    let light = fbm([
        pos[0] * 2.0 + LIGHT_DIR[0],
        pos[1] * 2.0 + LIGHT_DIR[1],
        pos[2] * 2.0 + LIGHT_DIR[2],
    ]) * 0.5
        + 0.5;

    let palette = uniforms.palette;
    let base = mix(palette.shadow, palette.cloud, light);
    let sun_mix = light * 0.2;
    let color = [
        base[0] + (f32::from(palette.sun.r) - base[0]) * sun_mix,
        base[1] + (f32::from(palette.sun.g) - base[1]) * sun_mix,
        base[2] + (f32::from(palette.sun.b) - base[2]) * sun_mix,
    ];
    Rgba {
        r: color[0].clamp(0.0, 255.0),
        g: color[1].clamp(0.0, 255.0),
        b: color[2].clamp(0.0, 255.0),
        a: (density * 0.85).clamp(0.0, 1.0),
    }
}
