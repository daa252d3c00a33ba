//! Fixed values shared by the CPU model and the GPU passes

/// Default side length of the particle grid (256² = 65,536 particles)
pub const DEFAULT_GRID_SIZE: u32 = 256;

// Seeded annulus
pub const SEED_RADIUS_MIN: f32 = 0.5;
pub const SEED_RADIUS_MAX: f32 = 1.0;
/// z and w channels of every seeded position texel
pub const SEED_FILL: f32 = 1.0;

// Per-particle info scalars, half-open range [min, max)
pub const INFO_SCALAR_MIN: f32 = 0.5;
pub const INFO_SCALAR_MAX: f32 = 1.5;

/// Side length of the invisible picking plane (world units)
pub const POINTER_PLANE_SIZE: f32 = 100.0;

/// Device pixel ratios above this are clamped
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Billboard size of a rendered particle, in logical pixels
pub const DEFAULT_POINT_SIZE: f32 = 2.0;
