//! Effects - orchestration only
//!
//! A [`Scene`] holds what both effects share: particles, pointer, animation
//! phase and frame stats. [`ImageEffect`] and [`TextEffect`] own a surface and
//! a source, and rebuild the scene's particles from it whenever geometry
//! changes. All physics lives in `systems/`.

use crate::domain::particle::Particle;
use crate::domain::pointer::Pointer;
use crate::domain::settings::Motion;
use crate::surface::Surface;
use crate::systems::physics;
use crate::systems::scheduler::{Drain, Phase, Schedule, Scheduler};

#[path = "perf/frame_clock.rs"]
mod frame_clock;
#[path = "perf/frame_stats.rs"]
mod frame_stats;
mod image;
mod text;
mod facade;

pub use facade::{ParticleImage, ParticleText};
pub use frame_stats::FrameStats;
pub use image::{ImageEffect, LOAD_ERROR_MESSAGE};
pub use text::{TextBox, TextEffect};

use frame_clock::FrameClock;

/// Particles plus the pointer and lifecycle state that drives them.
pub struct Scene {
    particles: Vec<Particle>,
    pointer: Pointer,
    scheduler: Scheduler,
    /// CSS colour shown while a particle is away from its origin
    trail: Option<String>,

    perf_enabled: bool,
    stats: FrameStats,
}

impl Scene {
    pub fn new(radius: f64) -> Self {
        Self {
            particles: Vec::new(),
            pointer: Pointer::new(radius),
            scheduler: Scheduler::new(),
            trail: None,
            perf_enabled: false,
            stats: FrameStats::default(),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn trail(&self) -> Option<&str> {
        self.trail.as_deref()
    }

    pub fn set_trail(&mut self, trail: Option<String>) {
        self.trail = trail;
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.pointer.radius = radius;
    }

    /// Discard all particles in favour of a fresh sampling.
    pub fn replace_particles(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }

    pub fn apply_motion(&mut self, motion: &Motion) {
        physics::apply_motion(&mut self.particles, motion);
    }

    pub fn is_at_rest(&self) -> bool {
        physics::all_at_rest(&self.particles)
    }

    // === Pointer events ===

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Schedule {
        self.pointer.set(x, y);
        self.scheduler.on_pointer_active()
    }

    pub fn pointer_enter(&mut self) -> Schedule {
        self.scheduler.on_pointer_active()
    }

    pub fn pointer_leave(&mut self) -> Schedule {
        self.pointer.clear();
        self.scheduler.on_pointer_leave()
    }

    // === Animation ===

    /// Run one animation tick: clear, draw, update.
    ///
    /// Returns whether the host should schedule another frame.
    pub fn frame<S: Surface>(&mut self, surface: &mut S) -> bool {
        if !self.scheduler.on_frame() {
            return false;
        }

        let clock = self.perf_enabled.then(FrameClock::start);

        surface.clear();
        self.draw(surface);
        let draw_ms = clock.map_or(0.0, |c| c.elapsed_ms());

        physics::update_particles(&mut self.particles, &self.pointer);

        if let Some(clock) = clock {
            let frame_ms = clock.elapsed_ms();
            self.stats.record(frame_ms, draw_ms, frame_ms - draw_ms, self.particles.len());
        }
        true
    }

    /// Paint particles where they are, without advancing them.
    pub fn draw<S: Surface>(&self, surface: &mut S) {
        physics::draw_particles(surface, &self.particles, self.trail.as_deref());
    }

    pub fn drain_check(&mut self, visible: bool) -> Drain {
        let at_rest = self.is_at_rest();
        self.scheduler.check_drain(at_rest, visible)
    }

    /// Stop animating, e.g. before a resample.
    pub fn cancel(&mut self) -> Schedule {
        self.scheduler.cancel()
    }

    // === Perf ===

    /// Enable or disable per-frame timing (adds clock reads when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.perf_enabled = enabled;
        if !enabled {
            self.stats.reset();
        }
    }

    /// Last frame snapshot (zeros when perf disabled)
    pub fn stats(&self) -> FrameStats {
        self.stats.clone()
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
