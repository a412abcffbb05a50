use thiserror::Error;

/// Failures reported by a drawing surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The host cannot do what was asked (e.g. canvas letter spacing).
    #[error("surface does not support {0}")]
    UnsupportedCapability(&'static str),

    /// Pixel read-back failed.
    #[error("failed to read pixels: {0}")]
    ReadPixels(String),

    /// No 2D context could be obtained from the canvas.
    #[error("2d context unavailable: {0}")]
    Context(String),
}

/// Failures surfaced while configuring or feeding an effect.
#[derive(Error, Debug)]
pub enum EffectError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Options document is not valid JSON (or not an object).
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// Source image has no pixels (broken or not loaded).
    #[error("image has no pixels ({width}x{height})")]
    InvalidImage { width: u32, height: u32 },
}
