//! # Particle Core
//!
//! GPU-independent model of the ping-pong particle simulation: grid addressing,
//! state seeding, the update/shading rules (CPU reference + WGSL), buffer
//! role management and pointer picking.

pub mod clock;
pub mod config;
pub mod constants;
pub mod driver;
pub mod grid;
pub mod picking;
pub mod ping_pong;
pub mod rules;
pub mod seed;
pub mod simulation;
pub mod software;
pub mod viewport;

pub use clock::*;
pub use config::*;
pub use constants::*;
pub use driver::*;
pub use grid::*;
pub use picking::*;
pub use ping_pong::*;
pub use rules::*;
pub use seed::*;
pub use simulation::*;
pub use software::*;
pub use viewport::*;
