//! Particle grid addressing
//!
//! The grid is an N×N array of texels used purely as addressable storage:
//! texel `(i, j)` lives at linear index `i + j * N` in both the state
//! textures and the render geometry.

use thiserror::Error;

/// One particle's RGBA32F state (x, y, z, w)
pub type Texel = [f32; 4];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("particle grid size must be at least 1")]
    Empty,

    #[error("particle grid size {0} overflows the particle count")]
    TooLarge(u32),
}

/// Square particle grid, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleGrid {
    size: u32,
}

impl ParticleGrid {
    pub fn new(size: u32) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::Empty);
        }
        if size.checked_mul(size).is_none() {
            return Err(GridError::TooLarge(size));
        }
        Ok(Self { size })
    }

    /// Side length N
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of particles, N²
    pub fn count(&self) -> u32 {
        self.size * self.size
    }

    pub fn texel_index(&self, i: u32, j: u32) -> usize {
        (i + j * self.size) as usize
    }

    /// Texture coordinate `(i/N, j/N)` identifying particle `(i, j)`
    pub fn texture_coordinate(&self, i: u32, j: u32) -> [f32; 2] {
        let n = self.size as f32;
        [i as f32 / n, j as f32 / n]
    }

    /// Per-instance attribute data for the point cloud, ordered by texel index.
    pub fn texture_coordinates(&self) -> Vec<[f32; 2]> {
        let mut uvs = vec![[0.0; 2]; self.count() as usize];
        for j in 0..self.size {
            for i in 0..self.size {
                uvs[self.texel_index(i, j)] = self.texture_coordinate(i, j);
            }
        }
        uvs
    }
}
