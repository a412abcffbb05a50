//! Drift Engine - pointer-reactive particle effects in WASM
//!
//! An image or a block of text is sampled into a grid of square particles.
//! Particles are pushed away from the pointer and spring back to where they
//! were sampled once it leaves.
//!
//! Architecture:
//! - core/        - Errors and logging
//! - domain/      - Particle, pointer, colours, option sets
//! - systems/     - Sampling, physics, scheduling, text layout
//! - surface/     - Drawing surfaces (canvas, software raster)
//! - simulation/  - Effects (orchestration only) and the JS facade

pub mod core;
pub mod domain;
pub mod systems;
pub mod surface;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Re-export wasm-bindgen-rayon for thread pool initialization
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    crate::core::log::info("Drift WASM engine initialized");
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Interval at which the host should call `drain_check` after the pointer leaves
#[wasm_bindgen]
pub fn drain_interval_ms() -> u32 {
    systems::scheduler::DRAIN_INTERVAL_MS
}

// Re-export main types
pub use domain::color::Rgb;
pub use domain::particle::Particle;
pub use domain::pointer::Pointer;
pub use simulation::{ImageEffect, ParticleImage, ParticleText, Scene, TextEffect};
pub use surface::raster::{Bitmap, PixelBuffer};
pub use surface::Surface;
pub use systems::scheduler::{Phase, Schedule};
