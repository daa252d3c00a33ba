//! Pointer picking
//!
//! The pointer is projected into the world by casting a ray from the camera
//! against an invisible plane at z = 0. A hit becomes the attractor read by the
//! simulation pass; a miss leaves the previous attractor in place.

use crate::constants::POINTER_PLANE_SIZE;
use glam::{Mat4, Vec2, Vec3};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Rays closer to parallel than this never hit the plane.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Viewport pixel coordinates to normalized device coordinates, y up.
pub fn normalize_pointer(client: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (client.x / viewport.x) * 2.0 - 1.0,
        -(client.y / viewport.y) * 2.0 + 1.0,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray from the camera through an NDC point. wgpu clip depth runs 0 (near) to 1 (far).
    pub fn from_ndc(ndc: Vec2, inverse_view_proj: &Mat4) -> Self {
        let near = inverse_view_proj.project_point3(ndc.extend(0.0));
        let far = inverse_view_proj.project_point3(ndc.extend(1.0));
        Self::new(near, far - near)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Finite square plane facing +Z. Only its front face is hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePlane {
    pub center: Vec3,
    pub size: f32,
}

impl Default for ReferencePlane {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: POINTER_PLANE_SIZE,
        }
    }
}

impl ReferencePlane {
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.direction.z;
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        // Single-sided: only rays travelling toward -Z see the front face.
        if denom > 0.0 {
            return None;
        }

        let t = (self.center.z - ray.origin.z) / denom;
        if t < 0.0 {
            return None;
        }

        let hit = ray.at(t);
        let half = self.size * 0.5;
        let local = hit - self.center;
        (local.x.abs() <= half && local.y.abs() <= half).then_some(hit)
    }
}

/// Last-write-wins attractor storage, safe to share with an input thread.
///
/// Both components are packed into one atomic so a reader never sees a torn update.
#[derive(Debug, Default)]
pub struct AttractorCell(AtomicU64);

impl AttractorCell {
    pub fn new(value: Vec2) -> Self {
        Self(AtomicU64::new(Self::pack(value)))
    }

    pub fn load(&self) -> Vec2 {
        Self::unpack(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, value: Vec2) {
        self.0.store(Self::pack(value), Ordering::Release);
    }

    /// Stores `value`, returning the previous attractor.
    pub fn swap(&self, value: Vec2) -> Vec2 {
        Self::unpack(self.0.swap(Self::pack(value), Ordering::AcqRel))
    }

    fn pack(value: Vec2) -> u64 {
        ((value.x.to_bits() as u64) << 32) | value.y.to_bits() as u64
    }

    fn unpack(bits: u64) -> Vec2 {
        Vec2::new(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
    }
}

pub struct PointerPicker {
    plane: ReferencePlane,
    pointer_ndc: Vec2,
    attractor: Arc<AttractorCell>,
}

impl Default for PointerPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerPicker {
    pub fn new() -> Self {
        Self {
            plane: ReferencePlane::default(),
            pointer_ndc: Vec2::ZERO,
            attractor: Arc::new(AttractorCell::new(Vec2::ZERO)),
        }
    }

    /// Handle a pointer move in viewport pixels. Returns the new attractor on a hit.
    pub fn on_pointer_move(
        &mut self,
        client: Vec2,
        viewport: Vec2,
        inverse_view_proj: &Mat4,
    ) -> Option<Vec2> {
        self.pointer_ndc = normalize_pointer(client, viewport);
        log::trace!("pointer ndc: {:?}", self.pointer_ndc);

        self.cast(&Ray::from_ndc(self.pointer_ndc, inverse_view_proj))
    }

    /// Intersect `ray` with the plane and publish the hit.
    pub fn cast(&mut self, ray: &Ray) -> Option<Vec2> {
        let Some(hit) = self.plane.intersect(ray) else {
            log::debug!("pointer ray missed the reference plane, keeping attractor");
            return None;
        };

        let attractor = Vec2::new(hit.x, hit.y);
        self.attractor.store(attractor);
        // The finite plane follows the pointer so it stays under the cursor.
        self.plane.center = Vec3::new(hit.x, hit.y, 0.0);
        Some(attractor)
    }

    pub fn attractor(&self) -> Vec2 {
        self.attractor.load()
    }

    /// Shared handle for hosts that deliver input on another thread.
    pub fn attractor_handle(&self) -> Arc<AttractorCell> {
        Arc::clone(&self.attractor)
    }

    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    pub fn plane(&self) -> &ReferencePlane {
        &self.plane
    }
}
