//! Catppuccin Mocha colours in linear space

use catppuccin::PALETTE;
use glam::Vec3;
use particle_core::PointerGlow;

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear(color: &catppuccin::Color) -> Vec3 {
    Vec3::new(
        srgb_to_linear(color.rgb.r),
        srgb_to_linear(color.rgb.g),
        srgb_to_linear(color.rgb.b),
    )
}

/// Mocha base, for the display clear
pub fn clear_color() -> wgpu::Color {
    let base = linear(&PALETTE.mocha.colors.base);
    wgpu::Color {
        r: base.x as f64,
        g: base.y as f64,
        b: base.z as f64,
        a: 1.0,
    }
}

/// Default glow with the highlight taken from Mocha peach.
pub fn themed_shading() -> PointerGlow {
    PointerGlow {
        highlight: linear(&PALETTE.mocha.colors.peach),
        ..Default::default()
    }
}
