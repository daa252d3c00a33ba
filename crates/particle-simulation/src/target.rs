//! Particle state textures
//!
//! Every texture here is N×N at the particle-grid resolution, one RGBA32F
//! texel per particle. Float channels are required: positions leave [0, 1]
//! and must not be clamped or quantized. The grid resolution is independent
//! of the window, so these are never resized.

use crate::SimulationError;
use particle_core::{ParticleGrid, Texel};
use wgpu::util::DeviceExt;

pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Nearest-neighbour sampler for state lookups. RGBA32F is not filterable,
/// so this must be bound as `SamplerBindingType::NonFiltering`.
pub fn nearest_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Bind group layout entry for a state texture read through `nearest_sampler`.
pub fn state_texture_binding(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub struct StateTexture {
    // Owns the allocation behind `view`.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: u32,
}

impl StateTexture {
    /// Off-screen colour target for one half of the ping-pong pair.
    pub async fn render_target(
        device: &wgpu::Device,
        grid: &ParticleGrid,
        label: &str,
    ) -> Result<Self, SimulationError> {
        check_grid_fits(device, grid)?;

        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC;

        let texture = allocate(device, label, || {
            device.create_texture(&descriptor(grid, label, usage))
        })
        .await?;

        log::debug!("Allocated {} ({}x{} {:?})", label, grid.size(), grid.size(), STATE_FORMAT);
        Ok(Self::from_texture(texture, grid))
    }

    /// Read-only texture initialised from CPU texels (seed positions, particle info).
    pub async fn with_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        grid: &ParticleGrid,
        label: &str,
        texels: &[Texel],
    ) -> Result<Self, SimulationError> {
        check_grid_fits(device, grid)?;

        let expected = grid.count() as usize;
        if texels.len() != expected {
            return Err(SimulationError::DataSize {
                label: label.to_owned(),
                expected,
                actual: texels.len(),
            });
        }

        let usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        let texture = allocate(device, label, || {
            device.create_texture_with_data(
                queue,
                &descriptor(grid, label, usage),
                wgpu::util::TextureDataOrder::LayerMajor,
                bytemuck::cast_slice(texels),
            )
        })
        .await?;

        log::debug!("Uploaded {} ({} texels)", label, texels.len());
        Ok(Self::from_texture(texture, grid))
    }

    fn from_texture(texture: wgpu::Texture, grid: &ParticleGrid) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
            size: grid.size(),
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Side length in texels
    pub fn size(&self) -> u32 {
        self.size
    }
}

fn descriptor<'a>(
    grid: &ParticleGrid,
    label: &'a str,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureDescriptor<'a> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: grid.size(),
            height: grid.size(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: STATE_FORMAT,
        usage,
        view_formats: &[],
    }
}

/// Reject a grid whose textures the device cannot allocate. Call before
/// spending time on seeding; every constructor here checks again.
pub fn check_grid_fits(device: &wgpu::Device, grid: &ParticleGrid) -> Result<(), SimulationError> {
    grid_fits(grid, device.limits().max_texture_dimension_2d)
}

/// `grid` against a `max_texture_dimension_2d` limit.
pub fn grid_fits(grid: &ParticleGrid, limit: u32) -> Result<(), SimulationError> {
    if grid.size() > limit {
        return Err(SimulationError::GridTooLarge {
            size: grid.size(),
            limit,
        });
    }
    Ok(())
}

/// Run `create` inside validation and out-of-memory error scopes so a
/// rejected texture surfaces as an error instead of an uncaptured panic.
async fn allocate<R>(
    device: &wgpu::Device,
    label: &str,
    create: impl FnOnce() -> R,
) -> Result<R, SimulationError> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let resource = create();

    let validation = device.pop_error_scope().await;
    let out_of_memory = device.pop_error_scope().await;

    match validation.or(out_of_memory) {
        Some(source) => {
            log::error!("Allocation of {} failed: {}", label, source);
            Err(SimulationError::TargetAllocation {
                label: label.to_owned(),
                source,
            })
        }
        None => Ok(resource),
    }
}
