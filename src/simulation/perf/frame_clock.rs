/// Millisecond wall clock: `Date.now()` in the browser, `Instant` natively.
#[derive(Clone, Copy)]
pub(crate) struct FrameClock {
    #[cfg(target_arch = "wasm32")]
    started_ms: f64,
    #[cfg(not(target_arch = "wasm32"))]
    started: std::time::Instant,
}

impl FrameClock {
    pub(crate) fn start() -> Self {
        FrameClock {
            #[cfg(target_arch = "wasm32")]
            started_ms: js_sys::Date::now(),
            #[cfg(not(target_arch = "wasm32"))]
            started: std::time::Instant::now(),
        }
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        #[cfg(target_arch = "wasm32")]
        let elapsed = js_sys::Date::now() - self.started_ms;
        #[cfg(not(target_arch = "wasm32"))]
        let elapsed = self.started.elapsed().as_secs_f64() * 1000.0;
        elapsed
    }
}
