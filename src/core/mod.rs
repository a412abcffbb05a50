//! Cross-cutting concerns shared by every layer.

pub mod error;
pub mod log;

pub use error::{EffectError, SurfaceError};
