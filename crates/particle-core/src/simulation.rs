//! Simulation context
//!
//! Owns everything that persists across frames on the CPU side: the grid,
//! the frame driver (and through it the buffer pair), the pointer picker and
//! the display viewport. The GPU resources are supplied by the host through
//! the buffer type `T` and a `FramePasses` implementation.

use crate::clock::FrameClock;
use crate::driver::{FrameDriver, FramePasses, FrameUniforms, SimulationStep};
use crate::grid::ParticleGrid;
use crate::picking::PointerPicker;
use crate::ping_pong::PingPong;
use crate::viewport::Viewport;
use glam::{Mat4, Vec2};

pub struct Simulation<T, C> {
    grid: ParticleGrid,
    driver: FrameDriver<T, C>,
    picker: PointerPicker,
    viewport: Viewport,
}

impl<T, C: FrameClock> Simulation<T, C> {
    pub fn new(grid: ParticleGrid, buffers: PingPong<T>, clock: C, viewport: Viewport) -> Self {
        log::info!(
            "Simulation context: {}x{} grid ({} particles), viewport {}x{} @{}",
            grid.size(),
            grid.size(),
            grid.count(),
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );

        Self {
            grid,
            driver: FrameDriver::new(buffers, clock),
            picker: PointerPicker::new(),
            viewport,
        }
    }

    /// Write the seed state through the simulation into both buffers.
    pub fn prime<P: SimulationStep<T>>(&mut self, passes: &mut P, seed: &T) {
        self.driver.prime(passes, seed, self.picker.attractor());
    }

    /// Simulation half of a frame. The attractor is read exactly once here.
    pub fn step<P: SimulationStep<T>>(&mut self, passes: &mut P) -> FrameUniforms {
        self.driver.step(passes, self.picker.attractor())
    }

    pub fn render<P: FramePasses<T>>(&self, passes: &mut P, uniforms: &FrameUniforms) {
        self.driver.render(passes, uniforms);
    }

    pub fn tick<P: FramePasses<T>>(&mut self, passes: &mut P) -> FrameUniforms {
        self.driver.tick(passes, self.picker.attractor())
    }

    /// Pointer moved to `client` (logical pixels). Returns the new attractor on a hit.
    pub fn pointer_moved(&mut self, client: Vec2, inverse_view_proj: &Mat4) -> Option<Vec2> {
        self.picker
            .on_pointer_move(client, self.viewport.size(), inverse_view_proj)
    }

    /// Only the display side changes; the particle grid is fixed at startup.
    pub fn resize(&mut self, viewport: Viewport) -> Viewport {
        log::debug!(
            "Resize to {}x{} @{}",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );
        self.viewport = viewport;
        self.viewport
    }

    pub fn grid(&self) -> &ParticleGrid {
        &self.grid
    }

    pub fn particle_count(&self) -> u32 {
        self.grid.count()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn picker(&self) -> &PointerPicker {
        &self.picker
    }

    pub fn attractor(&self) -> Vec2 {
        self.picker.attractor()
    }

    pub fn time(&self) -> f32 {
        self.driver.time()
    }

    pub fn buffers(&self) -> &PingPong<T> {
        self.driver.buffers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedStepClock;
    use crate::rules::{OrbitRule, PointerGlow};
    use crate::seed::{seed_info, seed_positions};
    use crate::software::{SoftwarePasses, SoftwareTarget};
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn software_simulation(
        size: u32,
    ) -> (
        Simulation<SoftwareTarget, FixedStepClock>,
        SoftwarePasses<OrbitRule, PointerGlow>,
        SoftwareTarget,
    ) {
        let grid = ParticleGrid::new(size).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let seed = SoftwareTarget::from_texels(&grid, seed_positions(&grid, &mut rng));
        let info = seed_info(&grid, &mut rng);

        let simulation = Simulation::new(
            grid,
            PingPong::new(SoftwareTarget::new(&grid), SoftwareTarget::new(&grid)),
            FixedStepClock::new(0.016),
            Viewport::new(800.0, 600.0, 1.0),
        );
        let passes = SoftwarePasses::new(&grid, info, OrbitRule::default(), PointerGlow::default());
        (simulation, passes, seed)
    }

    #[test]
    fn test_particle_count_conserved() {
        for size in [1, 3, 16] {
            let (mut simulation, mut passes, seed) = software_simulation(size);
            simulation.prime(&mut passes, &seed);

            for _ in 0..20 {
                simulation.tick(&mut passes);
                assert_eq!(simulation.particle_count(), size * size);
                assert_eq!(passes.last_frame().len(), (size * size) as usize);
            }
        }
    }

    #[test]
    fn test_time_after_hundred_frames() {
        let (mut simulation, mut passes, seed) = software_simulation(4);
        simulation.prime(&mut passes, &seed);

        let mut uniforms = None;
        for _ in 0..100 {
            uniforms = Some(simulation.tick(&mut passes));
        }

        assert!((uniforms.unwrap().time - 1.6).abs() < 1e-4);
        assert!((simulation.time() - 1.6).abs() < 1e-4);
    }

    #[test]
    fn test_resize_leaves_grid_untouched() {
        let (mut simulation, mut passes, seed) = software_simulation(8);
        simulation.prime(&mut passes, &seed);

        let sizes = [(640.0, 480.0), (1920.0, 1080.0), (300.0, 900.0), (1.0, 1.0), (1280.0, 720.0)];
        for (width, height) in sizes {
            simulation.resize(Viewport::new(width, height, 1.5));
            simulation.tick(&mut passes);
        }

        for target in simulation.buffers().iter() {
            assert_eq!(target.size(), 8);
            assert_eq!(target.texels().len(), 64);
        }
        assert_eq!(simulation.viewport().size(), Vec2::new(1280.0, 720.0));
        assert_eq!(simulation.viewport().physical_size(), (1920, 1080));
    }

    #[test]
    fn test_pointer_feeds_next_frame() {
        let (mut simulation, mut passes, seed) = software_simulation(4);
        simulation.prime(&mut passes, &seed);

        let proj = Mat4::perspective_rh(70.0_f32.to_radians(), 800.0 / 600.0, 0.01, 10000.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let inverse = (proj * view).inverse();

        let hit = simulation
            .pointer_moved(Vec2::new(600.0, 150.0), &inverse)
            .unwrap();
        assert!(hit.x > 0.0 && hit.y > 0.0);

        let uniforms = simulation.tick(&mut passes);
        assert_eq!(uniforms.pointer, hit);
    }

    #[test]
    fn test_state_evolves_from_seed() {
        let (mut simulation, mut passes, seed) = software_simulation(4);
        simulation.prime(&mut passes, &seed);
        simulation.tick(&mut passes);

        assert_ne!(simulation.buffers().current().texels(), seed.texels());
        assert!(simulation
            .buffers()
            .current()
            .texels()
            .iter()
            .all(|t| t.iter().all(|c| c.is_finite())));
    }
}
