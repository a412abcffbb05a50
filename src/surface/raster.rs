//! Software surface over an RGBA byte buffer.
//!
//! Text is drawn with block glyphs on a fixed advance, which keeps layout and
//! sampling deterministic without a font rasterizer.

use crate::core::{EffectError, SurfaceError};
use crate::domain::color::{Paint, Rgb};
use crate::domain::particle::round_half_up;
use crate::domain::settings::TextStyle;

use super::Surface;

/// Horizontal advance of one glyph, as a fraction of the font size
pub const GLYPH_ADVANCE: f64 = 0.6;
/// Advance of a space, as a fraction of the font size
pub const SPACE_ADVANCE: f64 = 0.3;
/// Ink height of a glyph, as a fraction of the font size
const GLYPH_HEIGHT: f64 = 0.7;
/// Blank margin on each side of a glyph, as a fraction of the font size
const GLYPH_MARGIN: f64 = 0.1;

pub type Rgba = [u8; 4];

const TRANSPARENT: Rgba = [0, 0, 0, 0];
const BLACK: Rgba = [0, 0, 0, 255];

/// An RGBA image in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EffectError> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(EffectError::InvalidImage { width, height });
        }
        Ok(Self { width, height, data })
    }

    pub fn filled(width: u32, height: u32, rgba: Rgba) -> Self {
        let data = rgba.repeat((width as usize) * (height as usize));
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 { self.width }

    pub fn height(&self) -> u32 { self.height }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y * self.width + x) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: Rgba) {
        let i = ((y * self.width + x) * 4) as usize;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

#[derive(Clone, Debug)]
struct TextState {
    fill: Rgba,
    stroke: Rgba,
    stroke_width: f64,
    font_size: f64,
    letter_spacing: f64,
    word_spacing: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            fill: BLACK,
            stroke: BLACK,
            stroke_width: 1.0,
            font_size: 10.0,
            letter_spacing: 0.0,
            word_spacing: 0.0,
        }
    }
}

/// In-memory surface, usable without a browser.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    pixels: Bitmap,
    text: TextState,
    /// Disable spacing support to mimic hosts without it
    spacing_supported: bool,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Bitmap::filled(width, height, TRANSPARENT),
            text: TextState::default(),
            spacing_supported: true,
        }
    }

    pub fn without_spacing_support(mut self) -> Self {
        self.spacing_supported = false;
        self
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels.pixel(x, y)
    }

    /// Number of pixels with non-zero alpha
    pub fn painted_pixels(&self) -> usize {
        self.pixels.data.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    /// Fill the pixels whose centres fall inside the rectangle.
    fn fill_area(&mut self, x: f64, y: f64, w: f64, h: f64, rgba: Rgba) {
        if rgba[3] == 0 || !(x.is_finite() && y.is_finite() && w > 0.0 && h > 0.0) {
            return;
        }
        let x0 = (x - 0.5).ceil().max(0.0);
        let y0 = (y - 0.5).ceil().max(0.0);
        let x1 = (x + w - 0.5).ceil().min(self.pixels.width as f64);
        let y1 = (y + h - 0.5).ceil().min(self.pixels.height as f64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for py in y0 as u32..y1 as u32 {
            for px in x0 as u32..x1 as u32 {
                self.pixels.set_pixel(px, py, rgba);
            }
        }
    }

    fn advance(&self, c: char) -> f64 {
        let t = &self.text;
        if c == ' ' {
            t.font_size * SPACE_ADVANCE + t.word_spacing + t.letter_spacing
        } else {
            t.font_size * GLYPH_ADVANCE + t.letter_spacing
        }
    }

    /// Ink boxes `(x, y, w, h)` of each visible glyph of a centred line.
    fn glyph_boxes(&self, text: &str, x: f64, y: f64) -> Vec<(f64, f64, f64, f64)> {
        let size = self.text.font_size;
        let margin = size * GLYPH_MARGIN;
        let ink_w = size * GLYPH_ADVANCE - 2.0 * margin;
        let ink_h = size * GLYPH_HEIGHT;

        let mut pen = x - self.measure_text(text) / 2.0;
        let mut boxes = Vec::new();
        for c in text.chars() {
            if !c.is_whitespace() {
                boxes.push((pen + margin, y - ink_h / 2.0, ink_w, ink_h));
            }
            pen += self.advance(c);
        }
        boxes
    }
}

impl Surface for PixelBuffer {
    type Image = Bitmap;

    fn width(&self) -> u32 { self.pixels.width }

    fn height(&self) -> u32 { self.pixels.height }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixels = Bitmap::filled(width, height, TRANSPARENT);
        self.text = TextState::default();
    }

    fn clear(&mut self) {
        self.pixels.data.fill(0);
    }

    fn fill_rect(&mut self, x: f64, y: f64, size: f64, paint: Paint<'_>) {
        let rgba = match paint {
            Paint::Rgb(Rgb { r, g, b }) => [r, g, b, 255],
            Paint::Css(css) => parse_css(css),
        };
        self.fill_area(x, y, size, size, rgba);
    }

    fn draw_image(&mut self, image: &Bitmap, x: f64, y: f64) {
        let left = round_half_up(x) as i64;
        let top = round_half_up(y) as i64;
        for sy in 0..image.height {
            let dy = top + sy as i64;
            if dy < 0 || dy >= self.pixels.height as i64 {
                continue;
            }
            for sx in 0..image.width {
                let dx = left + sx as i64;
                if dx < 0 || dx >= self.pixels.width as i64 {
                    continue;
                }
                let rgba = image.pixel(sx, sy);
                if rgba[3] != 0 {
                    self.pixels.set_pixel(dx as u32, dy as u32, rgba);
                }
            }
        }
    }

    fn image_size(image: &Bitmap) -> (u32, u32) {
        (image.width, image.height)
    }

    fn read_pixels(&self) -> Result<Vec<u8>, SurfaceError> {
        Ok(self.pixels.data.clone())
    }

    fn set_text_style(&mut self, style: &TextStyle) {
        self.text.fill = parse_css(&style.color);
        self.text.stroke = parse_css(&style.stroke_color);
        self.text.stroke_width = if style.stroke_width > 0.0 { style.stroke_width } else { 1.0 };
        self.text.font_size = style.font_size;
    }

    fn set_letter_spacing(&mut self, px: f64) -> Result<(), SurfaceError> {
        if !self.spacing_supported {
            return Err(SurfaceError::UnsupportedCapability("letterSpacing"));
        }
        self.text.letter_spacing = px;
        Ok(())
    }

    fn set_word_spacing(&mut self, px: f64) -> Result<(), SurfaceError> {
        if !self.spacing_supported {
            return Err(SurfaceError::UnsupportedCapability("wordSpacing"));
        }
        self.text.word_spacing = px;
        Ok(())
    }

    fn measure_text(&self, text: &str) -> f64 {
        text.chars().map(|c| self.advance(c)).sum()
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let fill = self.text.fill;
        for (bx, by, bw, bh) in self.glyph_boxes(text, x, y) {
            self.fill_area(bx, by, bw, bh, fill);
        }
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        let stroke = self.text.stroke;
        let half = self.text.stroke_width / 2.0;
        let line = self.text.stroke_width;
        for (bx, by, bw, bh) in self.glyph_boxes(text, x, y) {
            self.fill_area(bx - half, by - half, bw + line, line, stroke);
            self.fill_area(bx - half, by + bh - half, bw + line, line, stroke);
            self.fill_area(bx - half, by - half, line, bh + line, stroke);
            self.fill_area(bx + bw - half, by - half, line, bh + line, stroke);
        }
    }
}

/// Parse the CSS colours hosts commonly pass. Unknown input paints black.
pub fn parse_css(css: &str) -> Rgba {
    let css = css.trim().to_ascii_lowercase();

    if let Some(hex) = css.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(BLACK);
    }
    if let Some(args) = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args).unwrap_or(BLACK);
    }
    match css.as_str() {
        "transparent" => TRANSPARENT,
        "white" => [255, 255, 255, 255],
        "red" => [255, 0, 0, 255],
        "green" => [0, 128, 0, 255],
        "lime" => [0, 255, 0, 255],
        "blue" => [0, 0, 255, 255],
        "yellow" => [255, 255, 0, 255],
        "gray" | "grey" => [128, 128, 128, 255],
        _ => BLACK,
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some([digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, 255]),
        6 => Some([pair(0)?, pair(2)?, pair(4)?, 255]),
        8 => Some([pair(0)?, pair(2)?, pair(4)?, pair(6)?]),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8);
    let alpha = match parts.get(3) {
        Some(a) => (a.parse::<f64>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha])
}
