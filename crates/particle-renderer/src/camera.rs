//! Camera system for 3D visualization

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use particle_core::{FrameUniforms, Viewport};

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Logical width, logical height, pixel ratio, grid size
    pub resolution: [f32; 4],
    pub pointer: [f32; 2],
    pub time: f32,
    pub point_size: f32,
}

/// Orbit camera with damped rotation
pub struct Camera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Fraction of the pending rotation applied per update
    pub damping: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: 5.0,
            rotation: Quat::IDENTITY,
            target: Vec3::ZERO,
            aspect: width as f32 / height.max(1) as f32,
            fovy: 70.0_f32.to_radians(),
            znear: 0.01,
            zfar: 10000.0,
            damping: 0.05,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    /// Queue a rotation; it is eased in over the following `update` calls.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw_velocity += delta_x;
        self.pitch_velocity += delta_y;
    }

    /// Advance damping by one frame.
    pub fn update(&mut self) {
        let yaw = self.yaw_velocity * self.damping;
        let pitch = self.pitch_velocity * self.damping;

        let up = self.rotation * Vec3::Y;
        let yaw_rotation = Quat::from_axis_angle(up, yaw);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -pitch);

        self.rotation = (yaw_rotation * pitch_rotation * self.rotation).normalize();

        self.yaw_velocity *= 1.0 - self.damping;
        self.pitch_velocity *= 1.0 - self.damping;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(0.1, 1000.0);
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let position = self.position();
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-position);
        let view = rotation_matrix * translation_matrix;
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// NDC to world, for pointer rays.
    pub fn inverse_view_projection(&self) -> Mat4 {
        self.build_view_projection_matrix().inverse()
    }

    pub fn to_uniform(
        &self,
        viewport: &Viewport,
        grid_size: u32,
        frame: &FrameUniforms,
        point_size: f32,
    ) -> CameraUniform {
        CameraUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            resolution: [
                viewport.width,
                viewport.height,
                viewport.pixel_ratio,
                grid_size as f32,
            ],
            pointer: frame.pointer.to_array(),
            time: frame.time,
            point_size,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};
    use particle_core::Ray;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
    }

    #[test]
    fn test_default_position() {
        let camera = Camera::new(800, 600);
        assert!((camera.position() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(800, 600);
        let clip = camera.build_view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_center_ray_hits_origin() {
        let camera = Camera::new(800, 600);
        let ray = Ray::from_ndc(Vec2::ZERO, &camera.inverse_view_projection());
        let t = -ray.origin.z / ray.direction.z;
        assert!(ray.at(t).truncate().length() < 1e-3);
    }

    #[test]
    fn test_rotation_is_damped() {
        let mut camera = Camera::new(800, 600);
        camera.rotate(1.0, 0.0);
        camera.update();
        let first = camera.rotation.angle_between(Quat::IDENTITY);
        assert!((first - 0.05).abs() < 1e-4);

        for _ in 0..500 {
            camera.update();
        }
        // Geometric series: total yaw converges to the queued delta.
        let total = camera.rotation.angle_between(Quat::IDENTITY);
        assert!((total - 1.0).abs() < 1e-2);
        assert!((camera.position().length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::new(800, 600);
        camera.zoom(-100.0);
        assert_eq!(camera.distance, 0.1);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = Camera::new(800, 600);
        camera.resize(1000, 500);
        assert_eq!(camera.aspect, 2.0);
    }
}
