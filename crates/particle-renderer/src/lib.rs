//! # Particle Renderer
//!
//! Draws the particle state texture as camera-facing points.

pub mod camera;
pub mod renderer;
pub mod theme;

pub use camera::*;
pub use renderer::*;
pub use theme::*;
