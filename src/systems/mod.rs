//! Systems operate on particle collections; effects only orchestrate them.

pub mod layout;
pub mod physics;
pub mod sampler;
pub mod scheduler;
