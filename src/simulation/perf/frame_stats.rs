use wasm_bindgen::prelude::*;

/// Timings of the most recent animation frame.
#[wasm_bindgen]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub(super) frame_ms: f64,
    pub(super) draw_ms: f64,
    pub(super) update_ms: f64,
    pub(super) frames: u32,
    pub(super) particle_count: u32,
}

impl FrameStats {
    pub(crate) fn record(&mut self, frame_ms: f64, draw_ms: f64, update_ms: f64, particles: usize) {
        self.frame_ms = frame_ms;
        self.draw_ms = draw_ms;
        self.update_ms = update_ms;
        self.frames = self.frames.wrapping_add(1);
        self.particle_count = particles as u32;
    }

    pub(crate) fn reset(&mut self) {
        *self = FrameStats::default();
    }
}

#[wasm_bindgen]
impl FrameStats {
    #[wasm_bindgen(getter)]
    pub fn frame_ms(&self) -> f64 { self.frame_ms }
    #[wasm_bindgen(getter)]
    pub fn draw_ms(&self) -> f64 { self.draw_ms }
    #[wasm_bindgen(getter)]
    pub fn update_ms(&self) -> f64 { self.update_ms }
    /// Frames timed since perf metrics were enabled
    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> u32 { self.frames }
    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.particle_count }
}
