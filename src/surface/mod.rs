//! Drawing surfaces.
//!
//! Effects only talk to a [`Surface`]: a 2D canvas in the browser, or the
//! software [`raster::PixelBuffer`] anywhere else.

pub mod canvas;
pub mod raster;

use crate::core::log;
use crate::core::SurfaceError;
use crate::domain::color::Paint;
use crate::domain::settings::TextStyle;

/// A 2D drawing target that can be read back as RGBA pixels.
pub trait Surface {
    /// Source image type this surface can draw
    type Image;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Change the surface size. Drawing state (fonts, styles) may be lost.
    fn resize(&mut self, width: u32, height: u32);

    fn clear(&mut self);

    /// Fill a `size` x `size` square with its top-left corner at `(x, y)`.
    fn fill_rect(&mut self, x: f64, y: f64, size: f64, paint: Paint<'_>);

    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64);

    /// Width and height of an image; zero when it failed to load.
    fn image_size(image: &Self::Image) -> (u32, u32);

    /// Row-major RGBA bytes for the whole surface.
    fn read_pixels(&self) -> Result<Vec<u8>, SurfaceError>;

    /// Set font, fill and stroke. Text is centred and middle-aligned.
    fn set_text_style(&mut self, style: &TextStyle);

    fn set_letter_spacing(&mut self, px: f64) -> Result<(), SurfaceError>;

    fn set_word_spacing(&mut self, px: f64) -> Result<(), SurfaceError>;

    fn measure_text(&self, text: &str) -> f64;

    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    fn stroke_text(&mut self, text: &str, x: f64, y: f64);
}

/// Apply a full text style. Spacing the surface can't do is logged and skipped.
pub fn apply_text_style<S: Surface>(surface: &mut S, style: &TextStyle) {
    surface.set_text_style(style);

    if let Some(px) = style.letter_spacing_px() {
        if let Err(e) = surface.set_letter_spacing(px) {
            log::warn(&format!("letter spacing disabled: {e}"));
        }
    }
    if let Some(px) = style.word_spacing_px() {
        if let Err(e) = surface.set_word_spacing(px) {
            log::warn(&format!("word spacing disabled: {e}"));
        }
    }
}
