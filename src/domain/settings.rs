//! Effect configuration.
//!
//! Options arrive from the host as JSON. Every field is optional and read
//! leniently: a value of the wrong JSON type is dropped as if it were absent,
//! so a bad field never rejects the rest of the document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::core::EffectError;

pub const DEFAULT_IMAGE_GAP: u32 = 5;
pub const DEFAULT_IMAGE_FRICTION: f64 = 0.9;
pub const DEFAULT_TEXT_PARTICLE_SIZE: u32 = 3;
pub const DEFAULT_TEXT_FRICTION: f64 = 0.8;
pub const DEFAULT_EASE: f64 = 0.1;
pub const DEFAULT_RADIUS: f64 = 3000.0;

pub const DEFAULT_TEXT_COLOR: &str = "black";
pub const DEFAULT_FONT_FAMILY: &str = "serif";
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_STROKE_COLOR: &str = "rgba(0, 0, 0, 0)";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
pub const DEFAULT_TEXT_MAX_WIDTH: f64 = 1.0;

/// Trail colour value that switches the trail off
pub const TRAIL_NONE: &str = "none";

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Parameters every particle of one effect shares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub ease: f64,
    pub friction: f64,
    pub radius: f64,
}

/// What a settings update invalidated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    /// Particles must be resampled from the source
    pub resample: bool,
    /// Existing particles need new ease/friction
    pub motion: bool,
}

// === Image ===

/// Partial image options, as sent by the host.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ImageOptions {
    #[serde(rename = "particleSize", alias = "gap", default, deserialize_with = "lenient")]
    pub particle_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ease: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub friction: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub radius: Option<f64>,
}

impl ImageOptions {
    pub fn from_json(json: &str) -> Result<Self, EffectError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageSettings {
    /// Sampling stride and particle edge length
    pub gap: u32,
    pub motion: Motion,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            gap: DEFAULT_IMAGE_GAP,
            motion: Motion {
                ease: DEFAULT_EASE,
                friction: DEFAULT_IMAGE_FRICTION,
                radius: DEFAULT_RADIUS,
            },
        }
    }
}

impl ImageSettings {
    pub fn from_options(options: &ImageOptions) -> Self {
        let mut settings = Self::default();
        settings.apply(options);
        settings
    }

    pub fn apply(&mut self, options: &ImageOptions) -> Changes {
        let mut changes = Changes::default();
        if let Some(gap) = options.particle_size.and_then(valid_gap) {
            changes.resample |= gap != self.gap;
            self.gap = gap;
        }
        if let Some(ease) = finite(options.ease) {
            self.motion.ease = ease;
            changes.motion = true;
        }
        if let Some(friction) = finite(options.friction) {
            self.motion.friction = friction;
            changes.motion = true;
        }
        if let Some(radius) = finite(options.radius) {
            self.motion.radius = radius.floor();
        }
        changes
    }
}

/// Floors a requested gap; strides below one pixel are rejected.
pub fn valid_gap(value: f64) -> Option<u32> {
    let gap = value.floor();
    (gap.is_finite() && gap >= 1.0 && gap <= u32::MAX as f64).then_some(gap as u32)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// === Text ===

/// Partial particle options nested under `particles` in text options.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ParticleOptions {
    #[serde(default, deserialize_with = "lenient")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub radius: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ease: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub friction: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub trail_color: Option<String>,
}

/// Partial text options, as sent by the host.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TextOptions {
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub font_family: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub font_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub stroke_color: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stroke_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub letter_spacing: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub word_spacing: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub text_max_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub particles: Option<ParticleOptions>,
}

impl TextOptions {
    pub fn from_json(json: &str) -> Result<Self, EffectError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Everything the surface needs to render text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub color: String,
    pub font_family: String,
    pub font_size: f64,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub letter_spacing: Option<f64>,
    pub word_spacing: Option<f64>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_TEXT_COLOR.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            letter_spacing: None,
            word_spacing: None,
        }
    }
}

impl TextStyle {
    /// CSS font shorthand, e.g. `16px serif`
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_size, self.font_family)
    }

    /// Whole-pixel letter spacing to request from the surface, if any.
    pub fn letter_spacing_px(&self) -> Option<f64> {
        self.letter_spacing.map(spacing_px)
    }

    pub fn word_spacing_px(&self) -> Option<f64> {
        self.word_spacing.map(spacing_px)
    }
}

fn spacing_px(value: f64) -> f64 {
    if value > 0.0 { value.floor() } else { 0.0 }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextSettings {
    pub style: TextStyle,
    /// Wrap width: a fraction of the canvas width when |v| <= 1, else the full width
    pub text_max_width: f64,
    pub particle_size: u32,
    pub motion: Motion,
    pub trail_color: Option<String>,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            style: TextStyle::default(),
            text_max_width: DEFAULT_TEXT_MAX_WIDTH,
            particle_size: DEFAULT_TEXT_PARTICLE_SIZE,
            motion: Motion {
                ease: DEFAULT_EASE,
                friction: DEFAULT_TEXT_FRICTION,
                radius: DEFAULT_RADIUS,
            },
            trail_color: None,
        }
    }
}

impl TextSettings {
    /// Initial settings. Zero, empty and missing values all take the default.
    pub fn from_options(options: &TextOptions) -> Self {
        let mut settings = Self::default();
        let style = &mut settings.style;

        if let Some(color) = non_empty(&options.color) {
            style.color = color;
        }
        if let Some(family) = non_empty(&options.font_family) {
            style.font_family = family;
        }
        if let Some(size) = non_zero(options.font_size) {
            style.font_size = size;
        }
        if let Some(stroke) = non_empty(&options.stroke_color) {
            style.stroke_color = stroke;
        }
        if let Some(width) = non_zero(options.stroke_width) {
            style.stroke_width = width;
        }
        style.letter_spacing = non_zero(options.letter_spacing);
        style.word_spacing = non_zero(options.word_spacing);
        if let Some(max_width) = non_zero(options.text_max_width) {
            settings.text_max_width = max_width;
        }

        if let Some(particles) = &options.particles {
            if let Some(size) = particles.size.filter(|s| s.is_finite() && *s >= 1.0) {
                settings.particle_size = size.ceil() as u32;
            }
            if let Some(radius) = non_zero(particles.radius) {
                settings.motion.radius = radius;
            }
            if let Some(ease) = non_zero(particles.ease) {
                settings.motion.ease = ease;
            }
            if let Some(friction) = non_zero(particles.friction) {
                settings.motion.friction = friction;
            }
            settings.trail_color = trail(&particles.trail_color).flatten();
        }
        settings
    }

    /// Runtime update. Sizes are normalised to whole positive pixels.
    pub fn apply(&mut self, options: &TextOptions) -> Changes {
        let mut changes = Changes::default();
        let style = &mut self.style;

        if let Some(color) = &options.color {
            style.color = color.clone();
            changes.resample = true;
        }
        if let Some(family) = &options.font_family {
            style.font_family = family.clone();
            changes.resample = true;
        }
        if let Some(size) = finite(options.font_size) {
            style.font_size = size.abs().ceil();
            changes.resample = true;
        }
        if let Some(spacing) = finite(options.letter_spacing) {
            style.letter_spacing = Some(spacing.abs().ceil());
            changes.resample = true;
        }
        if let Some(stroke) = &options.stroke_color {
            style.stroke_color = stroke.clone();
            changes.resample = true;
        }
        if let Some(width) = finite(options.stroke_width) {
            style.stroke_width = width.abs().ceil();
            changes.resample = true;
        }
        if let Some(max_width) = finite(options.text_max_width) {
            self.text_max_width = max_width;
            changes.resample = true;
        }
        if let Some(spacing) = finite(options.word_spacing) {
            style.word_spacing = Some(spacing.abs().ceil());
            changes.resample = true;
        }

        if let Some(particles) = &options.particles {
            if let Some(size) = finite(particles.size) {
                self.particle_size = if size > 0.0 {
                    size.ceil() as u32
                } else {
                    DEFAULT_TEXT_PARTICLE_SIZE
                };
                changes.resample = true;
            }
            if let Some(ease) = finite(particles.ease) {
                self.motion.ease = ease;
                changes.motion = true;
            }
            if let Some(friction) = finite(particles.friction) {
                self.motion.friction = friction;
                changes.motion = true;
            }
            if let Some(radius) = finite(particles.radius) {
                self.motion.radius = radius;
            }
            if let Some(trail_color) = trail(&particles.trail_color) {
                self.trail_color = trail_color;
            }
        }
        changes
    }

    /// Wrap width for a canvas of the given width.
    pub fn wrap_width(&self, canvas_width: f64) -> f64 {
        let fraction = self.text_max_width.abs();
        if fraction > 1.0 { canvas_width } else { canvas_width * fraction }
    }
}

/// `Some(None)` clears the trail, `Some(Some(_))` sets it, `None` leaves it.
fn trail(value: &Option<String>) -> Option<Option<String>> {
    match value.as_deref() {
        None | Some("") => None,
        Some(TRAIL_NONE) => Some(None),
        Some(css) => Some(Some(css.to_string())),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v != 0.0)
}
