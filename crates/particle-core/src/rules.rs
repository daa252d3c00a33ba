//! Per-particle update and shading rules
//!
//! Each rule is a pure function with two implementations that must agree: a CPU
//! reference used by the software evaluator and tests, and a WGSL snippet that
//! the GPU passes splice into their shader modules. The WGSL is generated from
//! the same struct fields, so tuning a rule changes both sides at once.

use glam::{Vec2, Vec3, Vec4};

/// Below this distance the pointer push has no defined direction and is skipped.
const MIN_POINTER_DISTANCE: f32 = 1e-5;

/// `(PrevState, Info, Time, Pointer) -> NextState`
pub trait SimulationRule {
    fn next_state(&self, previous: Vec4, info: Vec4, time: f32, pointer: Vec2) -> Vec4;

    /// WGSL defining `update_particle`:
    ///
    /// ```text
    /// fn update_particle(
    ///     previous: vec4<f32>, info: vec4<f32>, time: f32, pointer: vec2<f32>,
    /// ) -> vec4<f32>
    /// ```
    fn wgsl(&self) -> String;
}

/// `(State, Time, Pointer) -> Color`
pub trait ShadingRule {
    fn color(&self, state: Vec4, time: f32, pointer: Vec2) -> Vec4;

    /// WGSL defining
    /// `fn shade_particle(state: vec4<f32>, time: f32, pointer: vec2<f32>) -> vec4<f32>`
    fn wgsl(&self) -> String;
}

/// Hermite step, same definition as WGSL `smoothstep` for `edge0 < edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn wgsl_f32(value: f32) -> String {
    // Debug keeps a decimal point or exponent, so the literal stays a float.
    format!("{value:?}")
}

fn wgsl_vec3(value: Vec3) -> String {
    format!(
        "vec3<f32>({}, {}, {})",
        wgsl_f32(value.x),
        wgsl_f32(value.y),
        wgsl_f32(value.z)
    )
}

/// Orbit around the origin, relax toward a per-particle radius, get pushed
/// away from the pointer.
///
/// Info channels: `x` scales orbit speed and wobble phase, `y` is the rest radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitRule {
    /// Radians per frame at `info.x == 1`
    pub orbit_speed: f32,
    /// Fraction of the gap to the rest radius closed each frame
    pub relaxation: f32,
    pub pointer_radius: f32,
    pub pointer_strength: f32,
    /// Amplitude of the z oscillation
    pub wobble: f32,
}

impl Default for OrbitRule {
    fn default() -> Self {
        Self {
            orbit_speed: 0.01,
            relaxation: 0.02,
            pointer_radius: 0.3,
            pointer_strength: 0.05,
            wobble: 0.05,
        }
    }
}

impl SimulationRule for OrbitRule {
    fn next_state(&self, previous: Vec4, info: Vec4, time: f32, pointer: Vec2) -> Vec4 {
        let radius = Vec2::new(previous.x, previous.y).length();
        let angle = previous.y.atan2(previous.x) + self.orbit_speed * info.x;
        let radius = radius + (info.y - radius) * self.relaxation;

        let mut next = Vec2::new(angle.cos(), angle.sin()) * radius;

        let offset = next - pointer;
        let distance = offset.length();
        if distance > MIN_POINTER_DISTANCE {
            let falloff = 1.0 - smoothstep(0.0, self.pointer_radius, distance);
            next += offset / distance * self.pointer_strength * falloff;
        }

        let z = (time * info.x + angle * 3.0).sin() * self.wobble;
        Vec4::new(next.x, next.y, z, previous.w)
    }

    fn wgsl(&self) -> String {
        format!(
            "const ORBIT_SPEED: f32 = {};\n\
             const RELAXATION: f32 = {};\n\
             const POINTER_RADIUS: f32 = {};\n\
             const POINTER_STRENGTH: f32 = {};\n\
             const WOBBLE: f32 = {};\n\
             const MIN_POINTER_DISTANCE: f32 = {};\n\
             {}",
            wgsl_f32(self.orbit_speed),
            wgsl_f32(self.relaxation),
            wgsl_f32(self.pointer_radius),
            wgsl_f32(self.pointer_strength),
            wgsl_f32(self.wobble),
            wgsl_f32(MIN_POINTER_DISTANCE),
            include_str!("shaders/orbit_rule.wgsl"),
        )
    }
}

/// Colour blends toward a highlight near the pointer and pulses with time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerGlow {
    /// Linear RGB far from the pointer
    pub base: Vec3,
    /// Linear RGB at the pointer
    pub highlight: Vec3,
    pub glow_radius: f32,
    /// Radians per second
    pub pulse_speed: f32,
    pub base_alpha: f32,
    pub glow_alpha: f32,
}

impl Default for PointerGlow {
    fn default() -> Self {
        Self {
            // #6a40e9, linearized
            base: Vec3::new(0.1441, 0.0513, 0.8148),
            highlight: Vec3::new(1.0, 0.85, 0.6),
            glow_radius: 0.5,
            pulse_speed: 2.0,
            base_alpha: 0.35,
            glow_alpha: 0.9,
        }
    }
}

impl ShadingRule for PointerGlow {
    fn color(&self, state: Vec4, time: f32, pointer: Vec2) -> Vec4 {
        let position = Vec2::new(state.x, state.y);
        let glow = 1.0 - smoothstep(0.0, self.glow_radius, (position - pointer).length());
        let pulse = 0.5 + 0.5 * (time * self.pulse_speed + position.length() * 6.0).sin();

        let rgb = self.base.lerp(self.highlight, glow) * (0.75 + 0.25 * pulse);
        let alpha = self.base_alpha + (self.glow_alpha - self.base_alpha) * glow;
        rgb.extend(alpha)
    }

    fn wgsl(&self) -> String {
        format!(
            "const GLOW_BASE: vec3<f32> = {};\n\
             const GLOW_HIGHLIGHT: vec3<f32> = {};\n\
             const GLOW_RADIUS: f32 = {};\n\
             const PULSE_SPEED: f32 = {};\n\
             const BASE_ALPHA: f32 = {};\n\
             const GLOW_ALPHA: f32 = {};\n\
             {}",
            wgsl_vec3(self.base),
            wgsl_vec3(self.highlight),
            wgsl_f32(self.glow_radius),
            wgsl_f32(self.pulse_speed),
            wgsl_f32(self.base_alpha),
            wgsl_f32(self.glow_alpha),
            include_str!("shaders/pointer_glow.wgsl"),
        )
    }
}
