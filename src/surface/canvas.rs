use std::fmt::Write;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::core::log;
use crate::core::SurfaceError;
use crate::domain::color::Paint;
use crate::domain::settings::TextStyle;

use super::Surface;

/// Surface backed by an HTML canvas 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Current fill style, to skip redundant style changes between particles
    fill: String,
    scratch: String,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        // Pixels are read back on every resample
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"willReadFrequently".into(), &JsValue::TRUE)
            .map_err(|e| SurfaceError::Context(format!("{e:?}")))?;

        let ctx = canvas
            .get_context_with_context_options("2d", &options)
            .map_err(|e| SurfaceError::Context(format!("{e:?}")))?
            .ok_or_else(|| SurfaceError::Context("no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Context("not a 2d context".to_string()))?;

        Ok(Self {
            canvas,
            ctx,
            fill: String::new(),
            scratch: String::with_capacity(24),
        })
    }

    /// Whether any part of the canvas is within the viewport vertically.
    pub fn is_in_viewport(&self) -> bool {
        let rect = self.canvas.get_bounding_client_rect();
        let viewport_height = web_sys::window()
            .and_then(|w| w.inner_height().ok())
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        !(rect.bottom() <= 0.0 || rect.top() > viewport_height)
    }

    /// Convert client coordinates to canvas coordinates.
    pub fn client_to_canvas(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (client_x - rect.left(), client_y - rect.top())
    }

    fn set_fill(&mut self, css: &str) {
        if self.fill != css {
            self.ctx.set_fill_style_str(css);
            self.fill.clear();
            self.fill.push_str(css);
        }
    }

    fn set_spacing(&mut self, property: &'static str, px: f64) -> Result<(), SurfaceError> {
        let key = JsValue::from_str(property);
        let supported = js_sys::Reflect::has(&self.ctx, &key).unwrap_or(false);
        if !supported {
            return Err(SurfaceError::UnsupportedCapability(property));
        }
        js_sys::Reflect::set(&self.ctx, &key, &JsValue::from_str(&format!("{px}px")))
            .map_err(|_| SurfaceError::UnsupportedCapability(property))?;
        Ok(())
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlImageElement;

    fn width(&self) -> u32 { self.canvas.width() }

    fn height(&self) -> u32 { self.canvas.height() }

    fn resize(&mut self, width: u32, height: u32) {
        // Either assignment resets the context state
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.fill.clear();
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width() as f64, self.height() as f64);
    }

    fn fill_rect(&mut self, x: f64, y: f64, size: f64, paint: Paint<'_>) {
        match paint {
            Paint::Rgb(rgb) => {
                let mut css = std::mem::take(&mut self.scratch);
                css.clear();
                let _ = write!(css, "{rgb}");
                self.set_fill(&css);
                self.scratch = css;
            }
            Paint::Css(css) => self.set_fill(css),
        }
        self.ctx.fill_rect(x, y, size, size);
    }

    fn draw_image(&mut self, image: &HtmlImageElement, x: f64, y: f64) {
        if let Err(e) = self.ctx.draw_image_with_html_image_element(image, x, y) {
            log::warn(&format!("drawImage failed: {e:?}"));
        }
    }

    fn image_size(image: &HtmlImageElement) -> (u32, u32) {
        (image.natural_width(), image.natural_height())
    }

    fn read_pixels(&self) -> Result<Vec<u8>, SurfaceError> {
        let data = self
            .ctx
            .get_image_data(0.0, 0.0, self.width() as f64, self.height() as f64)
            .map_err(|e| SurfaceError::ReadPixels(format!("{e:?}")))?;
        Ok(data.data().0)
    }

    fn set_text_style(&mut self, style: &TextStyle) {
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_font(&style.font());
        self.set_fill(&style.color);
        self.ctx.set_stroke_style_str(&style.stroke_color);
        self.ctx
            .set_line_width(if style.stroke_width > 0.0 { style.stroke_width } else { 1.0 });
    }

    fn set_letter_spacing(&mut self, px: f64) -> Result<(), SurfaceError> {
        self.set_spacing("letterSpacing", px)
    }

    fn set_word_spacing(&mut self, px: f64) -> Result<(), SurfaceError> {
        self.set_spacing("wordSpacing", px)
    }

    fn measure_text(&self, text: &str) -> f64 {
        self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        if let Err(e) = self.ctx.fill_text(text, x, y) {
            log::warn(&format!("fillText failed: {e:?}"));
        }
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        if let Err(e) = self.ctx.stroke_text(text, x, y) {
            log::warn(&format!("strokeText failed: {e:?}"));
        }
    }
}
