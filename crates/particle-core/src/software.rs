//! CPU evaluator for the simulation and render passes
//!
//! Runs the same rules as the GPU passes, one particle at a time, so the
//! frame driver can be exercised without a graphics device.

use crate::driver::{FramePasses, FrameUniforms, SimulationStep};
use crate::grid::{ParticleGrid, Texel};
use crate::rules::{ShadingRule, SimulationRule};
use glam::Vec4;

/// N×N RGBA32F state buffer in host memory
#[derive(Debug, Clone, PartialEq)]
pub struct SoftwareTarget {
    size: u32,
    texels: Vec<Texel>,
}

impl SoftwareTarget {
    pub fn new(grid: &ParticleGrid) -> Self {
        Self {
            size: grid.size(),
            texels: vec![[0.0; 4]; grid.count() as usize],
        }
    }

    /// Panics if `texels` does not hold exactly one texel per particle.
    pub fn from_texels(grid: &ParticleGrid, texels: Vec<Texel>) -> Self {
        assert_eq!(texels.len(), grid.count() as usize, "one texel per particle");
        Self {
            size: grid.size(),
            texels,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }
}

pub struct SoftwarePasses<R, S> {
    info: Vec<Texel>,
    rule: R,
    shading: S,
    frame: Vec<Vec4>,
}

impl<R: SimulationRule, S: ShadingRule> SoftwarePasses<R, S> {
    pub fn new(grid: &ParticleGrid, info: Vec<Texel>, rule: R, shading: S) -> Self {
        assert_eq!(info.len(), grid.count() as usize, "one info texel per particle");
        Self {
            info,
            rule,
            shading,
            frame: Vec::new(),
        }
    }

    /// Colours produced by the last render, one per particle.
    pub fn last_frame(&self) -> &[Vec4] {
        &self.frame
    }
}

impl<R: SimulationRule, S> SimulationStep<SoftwareTarget> for SoftwarePasses<R, S> {
    fn simulate(
        &mut self,
        previous: &SoftwareTarget,
        next: &mut SoftwareTarget,
        uniforms: &FrameUniforms,
    ) {
        for ((out, prev), info) in next
            .texels
            .iter_mut()
            .zip(&previous.texels)
            .zip(&self.info)
        {
            *out = self
                .rule
                .next_state(
                    Vec4::from_array(*prev),
                    Vec4::from_array(*info),
                    uniforms.time,
                    uniforms.pointer,
                )
                .to_array();
        }
    }
}

impl<R: SimulationRule, S: ShadingRule> FramePasses<SoftwareTarget> for SoftwarePasses<R, S> {
    fn render(&mut self, latest: &SoftwareTarget, uniforms: &FrameUniforms) {
        self.frame.clear();
        self.frame.extend(latest.texels.iter().map(|texel| {
            self.shading
                .color(Vec4::from_array(*texel), uniforms.time, uniforms.pointer)
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{OrbitRule, PointerGlow};
    use glam::Vec2;

    fn uniforms() -> FrameUniforms {
        FrameUniforms {
            time: 0.5,
            pointer: Vec2::new(10.0, 10.0),
        }
    }

    #[test]
    fn test_simulate_applies_rule_per_texel() {
        let grid = ParticleGrid::new(2).unwrap();
        let previous = SoftwareTarget::from_texels(
            &grid,
            vec![
                [0.5, 0.0, 1.0, 1.0],
                [0.0, 0.7, 1.0, 1.0],
                [-0.9, 0.0, 1.0, 1.0],
                [0.0, -0.6, 1.0, 1.0],
            ],
        );
        let info = vec![[1.0, 0.8, 1.0, 1.0]; 4];
        let mut passes = SoftwarePasses::new(
            &grid,
            info.clone(),
            OrbitRule::default(),
            PointerGlow::default(),
        );

        let mut next = SoftwareTarget::new(&grid);
        passes.simulate(&previous, &mut next, &uniforms());

        let rule = OrbitRule::default();
        for (i, texel) in next.texels().iter().enumerate() {
            let expected = rule.next_state(
                Vec4::from_array(previous.texels()[i]),
                Vec4::from_array(info[i]),
                0.5,
                Vec2::new(10.0, 10.0),
            );
            assert_eq!(*texel, expected.to_array());
        }
    }

    #[test]
    fn test_render_shades_every_particle() {
        let grid = ParticleGrid::new(3).unwrap();
        let mut passes = SoftwarePasses::new(
            &grid,
            vec![[1.0; 4]; 9],
            OrbitRule::default(),
            PointerGlow::default(),
        );

        passes.render(&SoftwareTarget::new(&grid), &uniforms());
        assert_eq!(passes.last_frame().len(), 9);
    }

    #[test]
    #[should_panic(expected = "one texel per particle")]
    fn test_wrong_texel_count_rejected() {
        let grid = ParticleGrid::new(2).unwrap();
        SoftwareTarget::from_texels(&grid, vec![[0.0; 4]; 3]);
    }
}
