//! Ping-pong simulation pass
//!
//! Renders a full-screen quad into the write target while sampling the read
//! target, producing every particle's next state in one draw.

use crate::{nearest_sampler, state_texture_binding, STATE_FORMAT};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use particle_core::{FrameUniforms, ParticleGrid, SimulationRule};
use wgpu::util::DeviceExt;

/// Simulation uniforms (matches WGSL `SimulationUniform`)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SimulationUniform {
    pub view_proj: [[f32; 4]; 4],
    pub pointer: [f32; 2],
    pub time: f32,
    pub grid_size: f32,
}

impl SimulationUniform {
    pub fn new(grid: &ParticleGrid, uniforms: &FrameUniforms) -> Self {
        Self {
            view_proj: grid_camera().to_cols_array_2d(),
            pointer: uniforms.pointer.to_array(),
            time: uniforms.time,
            grid_size: grid.size() as f32,
        }
    }
}

/// Orthographic camera that frames the [-1, 1]² quad onto the whole target.
pub fn grid_camera() -> Mat4 {
    let projection = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO, Vec3::Y);
    projection * view
}

pub struct SimulationPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    grid: ParticleGrid,
}

impl SimulationPass {
    pub fn new<R: SimulationRule>(device: &wgpu::Device, grid: &ParticleGrid, rule: &R) -> Self {
        log::info!("Initializing SimulationPass ({} particles)...", grid.count());

        let source = format!("{}\n{}", rule.wgsl(), include_str!("shaders/simulation.wgsl"));
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Simulation Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Simulation Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SimulationUniform::new(
                grid,
                &FrameUniforms::default(),
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sampler = nearest_sampler(device, "Simulation Sampler");

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                state_texture_binding(1, wgpu::ShaderStages::FRAGMENT),
                state_texture_binding(2, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simulation Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Simulation Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: STATE_FORMAT,
                    // Float targets are not blendable; each fragment owns its texel.
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!("Simulation pipeline created");

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            sampler,
            grid: *grid,
        }
    }

    /// Compute the next state of every particle from `previous` into `target`.
    ///
    /// `previous` and `target` must be different textures.
    pub fn run(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        previous: &wgpu::TextureView,
        info: &wgpu::TextureView,
        target: &wgpu::TextureView,
        uniforms: &FrameUniforms,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[SimulationUniform::new(&self.grid, uniforms)]),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Simulation Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(previous),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(info),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Simulation Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Simulation Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..6, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    pub fn grid(&self) -> &ParticleGrid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    #[test]
    fn test_uniform_layout() {
        // mat4 + vec2 + two scalars, 16-byte aligned for WGSL
        assert_eq!(std::mem::size_of::<SimulationUniform>(), 80);
        assert_eq!(std::mem::size_of::<SimulationUniform>() % 16, 0);
    }

    #[test]
    fn test_grid_camera_covers_target() {
        let camera = grid_camera();
        for corner in [Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)] {
            let clip = camera * Vec4::new(corner.x, corner.y, 0.0, 1.0);
            assert!((clip.x - corner.x).abs() < 1e-5);
            assert!((clip.y - corner.y).abs() < 1e-5);
            assert!(clip.z >= 0.0 && clip.z <= 1.0);
        }
    }

    #[test]
    fn test_uniform_from_frame() {
        let grid = ParticleGrid::new(64).unwrap();
        let frame = FrameUniforms {
            time: 2.5,
            pointer: Vec2::new(0.25, -1.0),
        };
        let uniform = SimulationUniform::new(&grid, &frame);
        assert_eq!(uniform.grid_size, 64.0);
        assert_eq!(uniform.time, 2.5);
        assert_eq!(uniform.pointer, [0.25, -1.0]);
    }
}
