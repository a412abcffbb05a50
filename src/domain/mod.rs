//! Domain types: what a particle is and how effects are configured.

pub mod color;
pub mod particle;
pub mod pointer;
pub mod settings;
