//! Display surface dimensions

use crate::constants::MAX_PIXEL_RATIO;
use glam::Vec2;

/// Logical size of the display surface plus the (clamped) device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: pixel_ratio.min(MAX_PIXEL_RATIO),
        }
    }

    /// From a window's physical size and scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = scale_factor.max(f64::EPSILON) as f32;
        Self::new(width as f32 / scale, height as f32 / scale, scale)
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Pixel size of the display render target.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round().max(1.0) as u32,
            (self.height * self.pixel_ratio).round().max(1.0) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_clamped() {
        let viewport = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.physical_size(), (1600, 1200));
    }

    #[test]
    fn test_from_physical() {
        let viewport = Viewport::from_physical(1920, 1080, 1.5);
        assert_eq!(viewport.size(), Vec2::new(1280.0, 720.0));
        assert_eq!(viewport.physical_size(), (1920, 1080));
        assert!((viewport.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_physical_size_never_zero() {
        assert_eq!(Viewport::new(0.0, 0.0, 1.0).physical_size(), (1, 1));
    }
}
