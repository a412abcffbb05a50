use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

use crate::core::{log, EffectError};
use crate::domain::settings::{ImageOptions, ImageSettings, TextOptions, TextSettings};
use crate::surface::canvas::CanvasSurface;
use crate::surface::Surface;
use crate::systems::scheduler::{Drain, Phase, Schedule};

use super::frame_stats::FrameStats;
use super::image::ImageEffect;
use super::text::{TextBox, TextEffect};

/// Parse host options; a malformed document is logged and treated as empty.
fn parse_options<T: Default>(json: Option<String>, parse: fn(&str) -> Result<T, EffectError>) -> T {
    match json.as_deref().map(parse) {
        Some(Ok(options)) => options,
        Some(Err(e)) => {
            log::warn(&format!("ignoring options: {e}"));
            T::default()
        }
        None => T::default(),
    }
}

fn surface_for(canvas: HtmlCanvasElement) -> Result<CanvasSurface, JsValue> {
    CanvasSurface::new(canvas).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Image particle effect bound to a canvas.
///
/// The host forwards pointer events, runs `frame()` from
/// `requestAnimationFrame` while it returns true, and polls `drain_check()`
/// every `drain_interval_ms()` after `StartDrainTimer`.
#[wasm_bindgen]
pub struct ParticleImage {
    effect: ImageEffect<CanvasSurface>,
}

#[wasm_bindgen]
impl ParticleImage {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        width: u32,
        height: u32,
        options: Option<String>,
    ) -> Result<ParticleImage, JsValue> {
        let mut surface = surface_for(canvas)?;
        surface.resize(width, height);
        let options = parse_options(options, ImageOptions::from_json);
        Ok(Self {
            effect: ImageEffect::new(surface, ImageSettings::from_options(&options)),
        })
    }

    /// Call from the image's `load` event.
    pub fn load_image(&mut self, image: HtmlImageElement) {
        if let Err(e) = self.effect.load(image) {
            log::warn(&format!("image not sampled: {e}"));
        }
    }

    /// Call from the image's `error` event.
    pub fn image_failed(&mut self) {
        self.effect.show_load_error();
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> usize {
        self.effect.scene().particle_count()
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> Phase {
        self.effect.scene().phase()
    }

    /// Pointer position in canvas pixels (e.g. `offsetX`/`offsetY`)
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Schedule {
        self.effect.pointer_move(x, y)
    }

    pub fn pointer_enter(&mut self) -> Schedule {
        self.effect.pointer_enter()
    }

    pub fn pointer_leave(&mut self) -> Schedule {
        self.effect.pointer_leave()
    }

    /// Touch position in client coordinates
    pub fn touch_move(&mut self, client_x: f64, client_y: f64) -> Schedule {
        let (x, y) = self.effect.surface().client_to_canvas(client_x, client_y);
        self.effect.pointer_move(x, y)
    }

    pub fn touch_end(&mut self) -> Schedule {
        self.effect.pointer_leave()
    }

    /// One animation tick. Returns whether to request another frame.
    pub fn frame(&mut self) -> bool {
        self.effect.frame()
    }

    /// Returns true when the host should stop polling.
    pub fn drain_check(&mut self) -> bool {
        let visible = self.effect.surface().is_in_viewport();
        self.effect.drain_check(visible) != Drain::Continue
    }

    pub fn set_gap(&mut self, gap: f64) -> Schedule {
        self.effect.set_gap(gap)
    }

    pub fn set_friction(&mut self, friction: f64) {
        self.effect.set_friction(friction);
    }

    pub fn set_ease(&mut self, ease: f64) {
        self.effect.set_ease(ease);
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.effect.set_radius(radius);
    }

    /// Apply a JSON subset of the image options
    pub fn set(&mut self, options: String) -> Schedule {
        let options = parse_options(Some(options), ImageOptions::from_json);
        self.effect.set(&options)
    }

    /// Enable or disable per-frame perf metrics
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.effect.scene_mut().enable_perf_metrics(enabled);
    }

    /// Last frame perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> FrameStats {
        self.effect.scene().stats()
    }
}

/// Text particle effect bound to a canvas.
///
/// Driven by the host the same way as `ParticleImage`; also forward window
/// resizes with the new viewport width.
#[wasm_bindgen]
pub struct ParticleText {
    effect: TextEffect<CanvasSurface>,
}

#[wasm_bindgen]
impl ParticleText {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        canvas_width: u32,
        text: String,
        options: Option<String>,
        canvas_max_height: Option<u32>,
        padding: Option<f64>,
    ) -> Result<ParticleText, JsValue> {
        let surface = surface_for(canvas)?;
        let options = parse_options(options, TextOptions::from_json);
        let text_box = TextBox { canvas_width, canvas_max_height, padding };
        Ok(Self {
            effect: TextEffect::new(surface, text_box, &text, TextSettings::from_options(&options)),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> usize {
        self.effect.scene().particle_count()
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> Phase {
        self.effect.scene().phase()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.effect.text().to_string()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Schedule {
        self.effect.pointer_move(x, y)
    }

    pub fn pointer_enter(&mut self) -> Schedule {
        self.effect.pointer_enter()
    }

    pub fn pointer_leave(&mut self) -> Schedule {
        self.effect.pointer_leave()
    }

    pub fn touch_move(&mut self, client_x: f64, client_y: f64) -> Schedule {
        let (x, y) = self.effect.surface().client_to_canvas(client_x, client_y);
        self.effect.pointer_move(x, y)
    }

    pub fn touch_end(&mut self) -> Schedule {
        self.effect.pointer_leave()
    }

    pub fn frame(&mut self) -> bool {
        self.effect.frame()
    }

    pub fn drain_check(&mut self) -> bool {
        let visible = self.effect.surface().is_in_viewport();
        self.effect.drain_check(visible) != Drain::Continue
    }

    pub fn set_text(&mut self, text: String) -> Schedule {
        self.effect.set_text(&text)
    }

    /// Call from the window `resize` event with `innerWidth`
    pub fn resize(&mut self, viewport_width: u32) -> Schedule {
        self.effect.resize(viewport_width)
    }

    pub fn set_gap(&mut self, size: f64) -> Schedule {
        self.effect.set_gap(size)
    }

    pub fn set_friction(&mut self, friction: f64) -> Schedule {
        self.effect.set_friction(friction)
    }

    pub fn set_ease(&mut self, ease: f64) -> Schedule {
        self.effect.set_ease(ease)
    }

    pub fn set_radius(&mut self, radius: f64) -> Schedule {
        self.effect.set_radius(radius)
    }

    /// Apply a JSON subset of the text options, optionally with new text
    pub fn set(&mut self, options: String, text: Option<String>) -> Schedule {
        let options = parse_options(Some(options), TextOptions::from_json);
        self.effect.set(&options, text.as_deref())
    }

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.effect.scene_mut().enable_perf_metrics(enabled);
    }

    pub fn get_perf_stats(&self) -> FrameStats {
        self.effect.scene().stats()
    }
}
