//! # Particle Simulation
//!
//! GPU side of the ping-pong simulation: floating-point state textures and the
//! full-screen pass that computes each particle's next state.

pub mod error;
pub mod simulation;
pub mod target;

pub use error::*;
pub use simulation::*;
pub use target::*;
