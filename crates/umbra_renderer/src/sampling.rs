//! Random number helpers shared by the camera, BSDF and render loop.

use rand::{Rng, RngCore};
use umbra_math::Vec3;

/// Uniform sample in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Cosine-weighted direction on the unit hemisphere around +Z.
///
/// `r1` picks the azimuth and `r2` the polar angle, with
/// `theta = acos(sqrt(1 - r2))`. The density is `cos(theta) / pi`, which
/// cancels the Lambertian BRDF and the cosine term exactly.
pub fn cosine_hemisphere(r1: f32, r2: f32) -> Vec3 {
    let phi = 2.0 * std::f32::consts::PI * r1;
    let sin_theta = r2.sqrt();
    let cos_theta = (1.0 - r2).max(0.0).sqrt();
    Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
}

/// 64-bit finalizer that scrambles nearby integers into unrelated seeds.
pub fn mix_bits(mut v: u64) -> u64 {
    v ^= v >> 31;
    v = v.wrapping_mul(0x7fb5d329728ea185);
    v ^= v >> 27;
    v = v.wrapping_mul(0x81dadef4bc2dd44d);
    v ^= v >> 33;
    v
}

/// Seed of the random stream owned by image row `row`.
///
/// Depends only on the base seed and the row, so a render is reproducible
/// whatever the number of workers.
pub fn row_seed(seed: u64, row: u32) -> u64 {
    mix_bits(seed ^ mix_bits(u64::from(row) + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let u = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_cosine_hemisphere_unit_upper() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let d = cosine_hemisphere(gen_f32(&mut rng), gen_f32(&mut rng));
            assert!((d.length() - 1.0).abs() < 1e-5);
            assert!(d.z >= 0.0);
        }

        // r2 = 0 is the pole
        assert!((cosine_hemisphere(0.3, 0.0) - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_cosine_hemisphere_mean_cosine() {
        // E[cos theta] under a cosine density is 2/3
        let mut rng = StdRng::seed_from_u64(2);
        let n = 20_000;
        let sum: f32 = (0..n)
            .map(|_| cosine_hemisphere(gen_f32(&mut rng), gen_f32(&mut rng)).z)
            .sum();
        assert!((sum / n as f32 - 2.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_row_seeds_differ() {
        assert_ne!(row_seed(0, 0), row_seed(0, 1));
        assert_ne!(row_seed(0, 3), row_seed(1, 3));
        assert_eq!(row_seed(9, 4), row_seed(9, 4));
    }
}
