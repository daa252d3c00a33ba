//! Startup configuration

use crate::constants::{DEFAULT_GRID_SIZE, DEFAULT_POINT_SIZE};
use crate::grid::{GridError, ParticleGrid};

/// Environment variable overriding the grid side length
pub const GRID_SIZE_ENV: &str = "PARTICLES_GRID_SIZE";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExperienceConfig {
    /// Side length N of the particle grid; fixed for the process lifetime
    pub grid_size: u32,
    /// Billboard size in logical pixels
    pub point_size: f32,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            point_size: DEFAULT_POINT_SIZE,
        }
    }
}

impl ExperienceConfig {
    /// Defaults, with the grid size taken from `PARTICLES_GRID_SIZE` when it parses.
    pub fn from_env() -> Self {
        Self::default().with_grid_size_override(std::env::var(GRID_SIZE_ENV).ok().as_deref())
    }

    fn with_grid_size_override(mut self, value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return self;
        };

        match raw.trim().parse::<u32>() {
            Ok(size) if ParticleGrid::new(size).is_ok() => self.grid_size = size,
            _ => log::warn!(
                "Ignoring {}={:?}, keeping grid size {}",
                GRID_SIZE_ENV,
                raw,
                self.grid_size
            ),
        }
        self
    }

    pub fn grid(&self) -> Result<ParticleGrid, GridError> {
        ParticleGrid::new(self.grid_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let config = ExperienceConfig::default();
        assert_eq!(config.grid().unwrap().count(), 65_536);
    }

    #[test]
    fn test_grid_size_override() {
        let config = ExperienceConfig::default().with_grid_size_override(Some(" 128 "));
        assert_eq!(config.grid_size, 128);
    }

    #[test]
    fn test_invalid_override_keeps_default() {
        let config = ExperienceConfig::default().with_grid_size_override(Some("zero"));
        assert_eq!(config.grid_size, DEFAULT_GRID_SIZE);

        let config = ExperienceConfig::default().with_grid_size_override(Some("0"));
        assert_eq!(config.grid_size, DEFAULT_GRID_SIZE);
    }
}
