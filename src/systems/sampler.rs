use crate::domain::color::Rgb;
use crate::domain::particle::Particle;
use crate::domain::settings::Motion;

/// Turn an RGBA buffer into particles.
///
/// Reads every `gap`-th pixel on both axes, scanning rows top to bottom and
/// left to right. Each pixel with non-zero alpha becomes one particle of edge
/// `gap` at that grid point, coloured with the pixel's RGB.
pub fn sample(pixels: &[u8], width: u32, height: u32, gap: u32, motion: &Motion) -> Vec<Particle> {
    let step = gap.max(1) as usize;
    let size = step as f64;
    let mut particles = Vec::new();

    for y in (0..height as usize).step_by(step) {
        for x in (0..width as usize).step_by(step) {
            let i = (y * width as usize + x) * 4;
            let Some(px) = pixels.get(i..i + 4) else {
                continue;
            };
            if px[3] == 0 {
                continue;
            }
            particles.push(Particle::new(
                x as f64,
                y as f64,
                Rgb::new(px[0], px[1], px[2]),
                size,
                motion.ease,
                motion.friction,
            ));
        }
    }
    particles
}
