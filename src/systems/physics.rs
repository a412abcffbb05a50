#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::domain::particle::Particle;
use crate::domain::pointer::Pointer;
use crate::domain::settings::Motion;
use crate::surface::Surface;

/// Below this many particles the thread pool costs more than it saves
pub const PARALLEL_THRESHOLD: usize = 4096;

/// Advance every particle by one tick.
pub fn update_particles(particles: &mut [Particle], pointer: &Pointer) {
    #[cfg(feature = "parallel")]
    {
        if particles.len() >= PARALLEL_THRESHOLD {
            particles.par_iter_mut().for_each(|p| p.update(pointer));
            return;
        }
    }

    for p in particles.iter_mut() {
        p.update(pointer);
    }
}

/// Paint every particle at its current position, in order.
pub fn draw_particles<S: Surface>(surface: &mut S, particles: &[Particle], trail: Option<&str>) {
    for p in particles {
        surface.fill_rect(p.x, p.y, p.size, p.paint(trail));
    }
}

pub fn all_at_rest(particles: &[Particle]) -> bool {
    particles.iter().all(Particle::is_at_rest)
}

/// Push new ease/friction into live particles without resampling.
pub fn apply_motion(particles: &mut [Particle], motion: &Motion) {
    for p in particles.iter_mut() {
        p.ease = motion.ease;
        p.friction = motion.friction;
    }
}
