use crate::engine::palette::Rgb;
use crate::engine::surface::{Paint, Surface};
use crossterm::style::Color;

/// Logical pixels per terminal cell. A cell is roughly twice as tall as it is
/// wide, and half-block output gives two raster pixels per cell vertically,
/// so one raster pixel covers an 8×8 logical square.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;
const SCALE: f64 = 8.0;

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

/// Terminal raster that the engine draws on in logical pixels.
///
/// Every primitive is alpha-blended onto the background laid down by
/// `clear`; nothing carries over between frames.
pub struct Canvas {
    pub cols: usize,
    pub rows: usize,
    /// Raster width in pixels (one per column).
    pub width: usize,
    /// Raster height in pixels (two per row).
    pub height: usize,
    pub pixels: Vec<Rgb>,
    pub background: Rgb,
    pub color_mode: ColorMode,
    /// Color quantization step (0 = off, 4/8/16 = round RGB to nearest N).
    /// Higher values = fewer unique colors = less output.
    pub color_quant: u8,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize, color_mode: ColorMode) -> Self {
        let background = Rgb(0, 0, 0);
        Canvas {
            cols,
            rows,
            width: cols,
            height: rows * 2,
            pixels: vec![background; cols * rows * 2],
            background,
            color_mode,
            color_quant: 0,
        }
    }

    /// Adopt a new terminal size; contents are discarded.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.width = cols;
        self.height = rows * 2;
        self.pixels = vec![self.background; self.width * self.height];
    }

    /// Logical dimensions for a terminal of `cols × rows` cells.
    pub fn logical_size(cols: usize, rows: usize) -> (f64, f64) {
        (cols as f64 * CELL_WIDTH, rows as f64 * CELL_HEIGHT)
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    #[inline]
    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f64) {
        if x < 0 || y < 0 || alpha <= 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.pixels[idx] = self.pixels[idx].mix(color, alpha.min(1.0));
        }
    }

    /// Raster pixel rows/cols touched by the logical span `lo..hi`, clipped.
    fn span(lo: f64, hi: f64, limit: usize) -> std::ops::Range<i64> {
        let a = (lo / SCALE).floor().max(0.0) as i64;
        let b = ((hi / SCALE).ceil() as i64).min(limit as i64);
        a..b.max(a)
    }

    /// Logical center of raster pixel (x, y).
    #[inline]
    fn center(x: i64, y: i64) -> (f64, f64) {
        ((x as f64 + 0.5) * SCALE, (y as f64 + 0.5) * SCALE)
    }

    pub fn map_color(&self, Rgb(r, g, b): Rgb) -> Color {
        // Apply color quantization if enabled (reduces unique colors for better dedup)
        let (r, g, b) = if self.color_quant > 1 {
            let q = self.color_quant as u16;
            (
                ((r as u16 + q / 2) / q * q).min(255) as u8,
                ((g as u16 + q / 2) / q * q).min(255) as u8,
                ((b as u16 + q / 2) / q * q).min(255) as u8,
            )
        } else {
            (r, g, b)
        };
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                // Approximate RGB to 256-color
                let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => {
                let brightness = (r as u16 + g as u16 + b as u16) / 3;
                if brightness < 64 {
                    Color::Black
                } else if r > g && r > b {
                    if brightness > 180 { Color::Red } else { Color::DarkRed }
                } else if g > r && g > b {
                    if brightness > 180 { Color::Green } else { Color::DarkGreen }
                } else if b > r && b > g {
                    if brightness > 180 { Color::Blue } else { Color::DarkBlue }
                } else if brightness > 180 {
                    Color::White
                } else {
                    Color::Grey
                }
            }
        }
    }
}

/// Shortest distance from `p` to the segment `a..b`.
fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 { (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let (cx, cy) = (a.0 + dx * t, a.1 + dy * t);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

impl Surface for Canvas {
    fn size(&self) -> (f64, f64) {
        (self.width as f64 * SCALE, self.height as f64 * SCALE)
    }

    fn clear(&mut self, background: Rgb) {
        self.background = background;
        self.pixels.fill(background);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, paint: Paint) {
        if !paint.is_visible() || radius <= 0.0 {
            return;
        }
        // Sub-pixel circles blend into their pixel by covered area.
        if radius < SCALE * 0.5 {
            let coverage = (std::f64::consts::PI * radius * radius / (SCALE * SCALE)).min(1.0);
            let (x, y) = ((cx / SCALE).floor() as i64, (cy / SCALE).floor() as i64);
            self.blend(x, y, paint.color, paint.alpha * coverage);
            return;
        }
        for y in Self::span(cy - radius, cy + radius, self.height) {
            for x in Self::span(cx - radius, cx + radius, self.width) {
                let (px, py) = Self::center(x, y);
                let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                let coverage = ((radius - d) / SCALE + 0.5).clamp(0.0, 1.0);
                self.blend(x, y, paint.color, paint.alpha * coverage);
            }
        }
    }

    fn glow(&mut self, cx: f64, cy: f64, radius: f64, paint: Paint) {
        if !paint.is_visible() || radius <= 0.0 {
            return;
        }
        for y in Self::span(cy - radius, cy + radius, self.height) {
            for x in Self::span(cx - radius, cx + radius, self.width) {
                let (px, py) = Self::center(x, y);
                let t = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt() / radius;
                if t < 1.0 {
                    self.blend(x, y, paint.color, paint.alpha * (1.0 - t) * (1.0 - t));
                }
            }
        }
    }

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, paint: Paint) {
        if !paint.is_visible() || width <= 0.0 {
            return;
        }
        let half = (width * 0.5).max(SCALE * 0.5);
        // Hairlines are thinner than a pixel: fade instead of thinning.
        let weight = (width / SCALE).min(1.0);
        let (lo_x, hi_x) = (x0.min(x1) - half, x0.max(x1) + half);
        let (lo_y, hi_y) = (y0.min(y1) - half, y0.max(y1) + half);
        for y in Self::span(lo_y, hi_y, self.height) {
            for x in Self::span(lo_x, hi_x, self.width) {
                let d = segment_distance(Self::center(x, y), (x0, y0), (x1, y1));
                let coverage = ((half - d) / SCALE + 0.5).clamp(0.0, 1.0) * weight;
                self.blend(x, y, paint.color, paint.alpha * coverage);
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint) {
        if !paint.is_visible() || w <= 0.0 || h <= 0.0 {
            return;
        }
        for py in Self::span(y, y + h, self.height) {
            let top = py as f64 * SCALE;
            let cover_y = ((y + h).min(top + SCALE) - y.max(top)).max(0.0) / SCALE;
            for px in Self::span(x, x + w, self.width) {
                let left = px as f64 * SCALE;
                let cover_x = ((x + w).min(left + SCALE) - x.max(left)).max(0.0) / SCALE;
                self.blend(px, py, paint.color, paint.alpha * cover_x * cover_y);
            }
        }
    }

    fn fill_below(&mut self, tops: &[f64], step: f64, paint: Paint) {
        if !paint.is_visible() || tops.is_empty() || step <= 0.0 {
            return;
        }
        for x in 0..self.width as i64 {
            let lx = (x as f64 + 0.5) * SCALE;
            let pos = lx / step;
            let i = (pos.floor() as usize).min(tops.len() - 1);
            let j = (i + 1).min(tops.len() - 1);
            let top = tops[i] + (tops[j] - tops[i]) * (pos - i as f64).clamp(0.0, 1.0);
            for y in Self::span(top, self.height as f64 * SCALE, self.height) {
                let cell_top = y as f64 * SCALE;
                let coverage = ((cell_top + SCALE - top) / SCALE).clamp(0.0, 1.0);
                self.blend(x, y, paint.color, paint.alpha * coverage);
            }
        }
    }
}

pub fn color_to_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("38;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("38;5;{}", v),
        Color::Black => "30".into(),
        Color::DarkRed => "31".into(),
        Color::DarkGreen => "32".into(),
        Color::DarkBlue => "34".into(),
        Color::Grey => "37".into(),
        Color::Red => "91".into(),
        Color::Green => "92".into(),
        Color::Blue => "94".into(),
        Color::White => "97".into(),
        _ => "37".into(),
    }
}
