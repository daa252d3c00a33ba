//! Simulation setup errors

use thiserror::Error;

/// Errors that can occur while allocating simulation resources.
///
/// All of these are fatal: the frame loop cannot start without its textures.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The grid does not fit in a single 2D texture on this device.
    #[error("Particle grid {size}x{size} exceeds the device texture limit of {limit}")]
    GridTooLarge { size: u32, limit: u32 },

    /// Texture creation was rejected, e.g. the state format is unsupported.
    #[error("Failed to allocate {label}: {source}")]
    TargetAllocation {
        label: String,
        #[source]
        source: wgpu::Error,
    },

    /// Upload data does not hold one texel per particle.
    #[error("Texture data for {label} has {actual} texels, grid needs {expected}")]
    DataSize {
        label: String,
        expected: usize,
        actual: usize,
    },
}
