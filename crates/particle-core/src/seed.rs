//! Initial particle state
//!
//! Both textures are generated once at startup, uploaded, and never regenerated.

use crate::constants::*;
use crate::grid::{ParticleGrid, Texel};
use rand::Rng;
use std::f32::consts::TAU;

/// Positions on a filled annulus: `(r·cosθ, r·sinθ, 1, 1)`
/// with θ ∈ [0, 2π) and r ∈ [0.5, 1].
pub fn seed_positions<R: Rng + ?Sized>(grid: &ParticleGrid, rng: &mut R) -> Vec<Texel> {
    let mut texels = vec![[0.0; 4]; grid.count() as usize];

    for j in 0..grid.size() {
        for i in 0..grid.size() {
            let theta = rng.random_range(0.0..TAU);
            let r = rng.random_range(SEED_RADIUS_MIN..=SEED_RADIUS_MAX);
            texels[grid.texel_index(i, j)] =
                [r * theta.cos(), r * theta.sin(), SEED_FILL, SEED_FILL];
        }
    }

    log::debug!("Seeded {} particle positions", texels.len());
    texels
}

/// Per-particle constants: two random speed/phase multipliers in [0.5, 1.5).
pub fn seed_info<R: Rng + ?Sized>(grid: &ParticleGrid, rng: &mut R) -> Vec<Texel> {
    let mut texels = vec![[0.0; 4]; grid.count() as usize];

    for texel in texels.iter_mut() {
        *texel = [
            rng.random_range(INFO_SCALAR_MIN..INFO_SCALAR_MAX),
            rng.random_range(INFO_SCALAR_MIN..INFO_SCALAR_MAX),
            SEED_FILL,
            SEED_FILL,
        ];
    }

    log::debug!("Seeded {} particle info texels", texels.len());
    texels
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_positions_lie_on_annulus() {
        let grid = ParticleGrid::new(64).unwrap();
        let texels = seed_positions(&grid, &mut StdRng::seed_from_u64(7));

        for [x, y, z, w] in texels {
            let r = (x * x + y * y).sqrt();
            assert!(r >= SEED_RADIUS_MIN - 1e-5, "radius {r} below annulus");
            assert!(r <= SEED_RADIUS_MAX + 1e-5, "radius {r} above annulus");
            assert_eq!(z, SEED_FILL);
            assert_eq!(w, SEED_FILL);
        }
    }

    #[test]
    fn test_info_scalars_in_range() {
        let grid = ParticleGrid::new(64).unwrap();
        let texels = seed_info(&grid, &mut StdRng::seed_from_u64(11));

        for [a, b, z, w] in texels {
            assert!((INFO_SCALAR_MIN..INFO_SCALAR_MAX).contains(&a));
            assert!((INFO_SCALAR_MIN..INFO_SCALAR_MAX).contains(&b));
            assert_eq!(z, SEED_FILL);
            assert_eq!(w, SEED_FILL);
        }
    }

    #[test]
    fn test_every_texel_written() {
        let grid = ParticleGrid::new(16).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        // A texel left at its zero default would have zero radius.
        for texel in seed_positions(&grid, &mut rng) {
            assert!(texel[0] != 0.0 || texel[1] != 0.0);
        }
        for texel in seed_info(&grid, &mut rng) {
            assert!(texel.iter().all(|&c| c != 0.0));
        }
    }

    #[test]
    fn test_reseeding_keeps_shape_not_values() {
        let grid = ParticleGrid::new(32).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let first = seed_positions(&grid, &mut rng);
        let second = seed_positions(&grid, &mut rng);

        assert_eq!(first.len(), (32 * 32) as usize);
        assert_eq!(first.len(), second.len());
        assert_ne!(first, second);
    }
}
