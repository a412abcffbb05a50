use crate::core::{log, EffectError};
use crate::domain::particle::Particle;
use crate::domain::settings::{valid_gap, ImageOptions, ImageSettings, TextStyle};
use crate::surface::{apply_text_style, Surface};
use crate::systems::sampler;
use crate::systems::scheduler::{Drain, Schedule};

use super::Scene;

/// Drawn in place of particles when the source image fails to load
pub const LOAD_ERROR_MESSAGE: &str = "Image src doesn't exist";

/// An image that scatters into particles around the pointer.
pub struct ImageEffect<S: Surface> {
    surface: S,
    image: Option<S::Image>,
    settings: ImageSettings,
    scene: Scene,
}

impl<S: Surface> ImageEffect<S> {
    /// The effect stays empty until an image is loaded.
    pub fn new(surface: S, settings: ImageSettings) -> Self {
        let scene = Scene::new(settings.motion.radius);
        Self { surface, image: None, settings, scene }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn particles(&self) -> &[Particle] {
        self.scene.particles()
    }

    /// Take a loaded image as the source and sample it.
    ///
    /// An image without pixels is treated as a failed load.
    pub fn load(&mut self, image: S::Image) -> Result<(), EffectError> {
        let (width, height) = S::image_size(&image);
        if width == 0 || height == 0 {
            self.show_load_error();
            return Err(EffectError::InvalidImage { width, height });
        }
        self.image = Some(image);
        self.resample()
    }

    /// Replace the effect with a centred error message.
    pub fn show_load_error(&mut self) {
        log::warn(LOAD_ERROR_MESSAGE);
        self.image = None;
        self.scene.cancel();
        self.scene.replace_particles(Vec::new());

        let style = TextStyle {
            color: "white".to_string(),
            font_size: 48.0,
            stroke_color: "transparent".to_string(),
            ..TextStyle::default()
        };
        let (x, y) = (self.surface.width() as f64 / 2.0, self.surface.height() as f64 / 2.0);
        self.surface.clear();
        apply_text_style(&mut self.surface, &style);
        self.surface.fill_text(LOAD_ERROR_MESSAGE, x, y);
    }

    /// Draw the image centred, sample it, and show the particles at rest.
    pub fn resample(&mut self) -> Result<(), EffectError> {
        self.surface.clear();
        let Some(image) = &self.image else {
            self.scene.replace_particles(Vec::new());
            return Ok(());
        };

        let (image_w, image_h) = S::image_size(image);
        let x = self.surface.width() as f64 * 0.5 - image_w as f64 * 0.5;
        let y = self.surface.height() as f64 * 0.5 - image_h as f64 * 0.5;
        self.surface.draw_image(image, x, y);

        let pixels = self.surface.read_pixels();
        self.surface.clear();
        let pixels = match pixels {
            Ok(pixels) => pixels,
            Err(e) => {
                // Old particles belong to the previous geometry
                self.scene.replace_particles(Vec::new());
                return Err(e.into());
            }
        };

        let particles = sampler::sample(
            &pixels,
            self.surface.width(),
            self.surface.height(),
            self.settings.gap,
            &self.settings.motion,
        );
        self.scene.replace_particles(particles);
        self.scene.draw(&mut self.surface);
        Ok(())
    }

    fn rebuild(&mut self) -> Schedule {
        let schedule = self.scene.cancel();
        if let Err(e) = self.resample() {
            log::warn(&format!("resample failed: {e}"));
        }
        schedule
    }

    // === Setters ===

    /// Change the sampling stride. Values below one pixel are ignored.
    pub fn set_gap(&mut self, gap: f64) -> Schedule {
        let Some(gap) = valid_gap(gap) else {
            return Schedule::Nothing;
        };
        self.settings.gap = gap;
        self.rebuild()
    }

    pub fn set_friction(&mut self, friction: f64) {
        if friction.is_finite() {
            self.settings.motion.friction = friction;
            self.scene.apply_motion(&self.settings.motion);
        }
    }

    pub fn set_ease(&mut self, ease: f64) {
        if ease.is_finite() {
            self.settings.motion.ease = ease;
            self.scene.apply_motion(&self.settings.motion);
        }
    }

    pub fn set_radius(&mut self, radius: f64) {
        if radius.is_finite() {
            self.settings.motion.radius = radius.floor();
            self.scene.set_radius(self.settings.motion.radius);
        }
    }

    /// Apply any subset of the options; resamples only when the gap changed.
    pub fn set(&mut self, options: &ImageOptions) -> Schedule {
        let changes = self.settings.apply(options);
        self.scene.set_radius(self.settings.motion.radius);
        if changes.motion {
            self.scene.apply_motion(&self.settings.motion);
        }
        if changes.resample {
            return self.rebuild();
        }
        Schedule::Nothing
    }

    // === Lifecycle ===

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Schedule {
        self.scene.pointer_move(x, y)
    }

    pub fn pointer_enter(&mut self) -> Schedule {
        self.scene.pointer_enter()
    }

    pub fn pointer_leave(&mut self) -> Schedule {
        self.scene.pointer_leave()
    }

    pub fn frame(&mut self) -> bool {
        self.scene.frame(&mut self.surface)
    }

    /// Poll after the pointer left. Offscreen surfaces are reset to rest.
    pub fn drain_check(&mut self, visible: bool) -> Drain {
        let drain = self.scene.drain_check(visible);
        if drain == Drain::Reset {
            log::debug("image effect offscreen, resampling");
            if let Err(e) = self.resample() {
                log::warn(&format!("resample failed: {e}"));
            }
        }
        drain
    }
}
