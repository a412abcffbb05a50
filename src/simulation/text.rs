use crate::core::{log, EffectError};
use crate::domain::particle::Particle;
use crate::domain::settings::{ParticleOptions, TextOptions, TextSettings};
use crate::surface::{apply_text_style, Surface};
use crate::systems::layout::{self, TextBlock};
use crate::systems::sampler;
use crate::systems::scheduler::{Drain, Schedule};

use super::Scene;

/// Layout box a text effect is created with.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBox {
    /// Widest the canvas may get; resizes never exceed it
    pub canvas_width: u32,
    pub canvas_max_height: Option<u32>,
    /// Extra height below the lines
    pub padding: Option<f64>,
}

impl TextBox {
    pub fn new(canvas_width: u32) -> Self {
        Self { canvas_width, canvas_max_height: None, padding: None }
    }

    fn padding_px(&self) -> f64 {
        self.padding.filter(|p| p.is_finite()).map_or(0.0, |p| p.abs().floor())
    }
}

/// Wrapped text rendered as particles.
pub struct TextEffect<S: Surface> {
    surface: S,
    text: String,
    text_box: TextBox,
    settings: TextSettings,
    block: TextBlock,
    scene: Scene,
}

impl<S: Surface> TextEffect<S> {
    /// Size the surface to the box, lay the text out and sample it.
    pub fn new(mut surface: S, text_box: TextBox, text: &str, settings: TextSettings) -> Self {
        let height = surface.height();
        surface.resize(text_box.canvas_width, height);

        let mut scene = Scene::new(settings.motion.radius);
        scene.set_trail(settings.trail_color.clone());

        let mut effect = Self {
            surface,
            text: text.to_string(),
            text_box,
            settings,
            block: TextBlock { lines: Vec::new(), line_height: 0.0, canvas_height: height },
            scene,
        };
        effect.rebuild();
        effect
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn settings(&self) -> &TextSettings {
        &self.settings
    }

    /// Lines from the last layout
    pub fn block(&self) -> &TextBlock {
        &self.block
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

    /// Horizontal centre lines are drawn around
    pub fn text_x(&self) -> f64 {
        self.surface.width() as f64 / 2.0
    }

    pub fn max_text_width(&self) -> f64 {
        self.settings.wrap_width(self.surface.width() as f64)
    }

    /// Wrap, size the surface, render the lines and sample them.
    pub fn wrap(&mut self) -> Result<(), EffectError> {
        // Style first so measurements use the right font
        apply_text_style(&mut self.surface, &self.settings.style);

        let surface = &self.surface;
        let block = layout::layout(
            &self.text,
            self.max_text_width(),
            self.settings.style.font_size,
            self.text_box.padding_px(),
            self.text_box.canvas_max_height,
            |s| surface.measure_text(s),
        );

        // Resizing drops the style, so set it again
        let width = self.surface.width();
        self.surface.resize(width, block.canvas_height);
        apply_text_style(&mut self.surface, &self.settings.style);

        let x = self.text_x();
        for (line, y) in block.line_positions() {
            self.surface.fill_text(line, x, y);
            self.surface.stroke_text(line, x, y);
        }
        self.block = block;

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
            self.settings.particle_size,
            &self.settings.motion,
        );
        self.scene.replace_particles(particles);
        self.scene.draw(&mut self.surface);
        Ok(())
    }

    fn rebuild(&mut self) -> Schedule {
        let schedule = self.scene.cancel();
        if let Err(e) = self.wrap() {
            log::warn(&format!("text resample failed: {e}"));
        }
        schedule
    }

    /// Follow the viewport width, never growing past the original width.
    pub fn resize(&mut self, viewport_width: u32) -> Schedule {
        let target = viewport_width.min(self.text_box.canvas_width);
        if target == self.surface.width() {
            return Schedule::Nothing;
        }
        let height = self.surface.height();
        self.surface.resize(target, height);
        self.rebuild()
    }

    // === Setters ===

    /// Apply any subset of the options and optionally new text.
    ///
    /// Anything that changes what is rendered resamples; ease and friction
    /// update live particles; radius and trail colour take effect next frame.
    pub fn set(&mut self, options: &TextOptions, text: Option<&str>) -> Schedule {
        let mut changes = self.settings.apply(options);
        self.scene.set_radius(self.settings.motion.radius);
        self.scene.set_trail(self.settings.trail_color.clone());

        if let Some(text) = text {
            self.text = text.to_string();
            changes.resample = true;
        }
        if changes.resample {
            return self.rebuild();
        }
        if changes.motion {
            self.scene.apply_motion(&self.settings.motion);
        }
        Schedule::Nothing
    }

    pub fn set_text(&mut self, text: &str) -> Schedule {
        self.set(&TextOptions::default(), Some(text))
    }

    pub fn set_gap(&mut self, size: f64) -> Schedule {
        self.set_particles(ParticleOptions { size: Some(size), ..Default::default() })
    }

    pub fn set_friction(&mut self, friction: f64) -> Schedule {
        self.set_particles(ParticleOptions { friction: Some(friction), ..Default::default() })
    }

    pub fn set_ease(&mut self, ease: f64) -> Schedule {
        self.set_particles(ParticleOptions { ease: Some(ease), ..Default::default() })
    }

    pub fn set_radius(&mut self, radius: f64) -> Schedule {
        self.set_particles(ParticleOptions { radius: Some(radius), ..Default::default() })
    }

    fn set_particles(&mut self, particles: ParticleOptions) -> Schedule {
        let options = TextOptions { particles: Some(particles), ..Default::default() };
        self.set(&options, None)
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

    /// Poll after the pointer left. Offscreen text is laid out again at rest.
    pub fn drain_check(&mut self, visible: bool) -> Drain {
        let drain = self.scene.drain_check(visible);
        if drain == Drain::Reset {
            log::debug("text effect offscreen, resampling");
            if let Err(e) = self.wrap() {
                log::warn(&format!("text resample failed: {e}"));
            }
        }
        drain
    }
}
