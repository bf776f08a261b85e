//! Light-transport integrator.
//!
//! Estimates the radiance arriving along a ray by following one random
//! light path. The path is walked iteratively with a running throughput;
//! its length is capped by `max_depth` no matter what Russian roulette
//! decides.

use rand::RngCore;
use umbra_core::{Background, Color};
use umbra_math::{Interval, Ray};

use crate::bsdf;
use crate::hittable::Hittable;
use crate::sampling::gen_f32;
use crate::RenderConfig;

/// Minimum hit distance, keeps a bounced ray from hitting its own origin.
pub const SELF_INTERSECTION_EPSILON: f32 = 0.001;

/// One-sample radiance estimate along `ray`.
///
/// A ray that hits nothing returns the background radiance unchanged. At
/// each hit the surface adds `emission * color` scaled by the path
/// throughput, then the BSDF picks the next direction and the throughput
/// is multiplied by the surface color.
///
/// At most `config.max_depth` intersection queries are made per call.
pub fn radiance(
    ray: &Ray,
    world: &dyn Hittable,
    background: &Background,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    for bounce in 0..config.max_depth {
        let Some(hit) = world.hit(&ray, Interval::new(SELF_INTERSECTION_EPSILON, f32::INFINITY))
        else {
            radiance += throughput * background.radiance(ray.direction());
            break;
        };

        radiance += throughput * hit.color * hit.material.emission();

        // Depth budget spent: keep the local emission, stop the path
        if bounce + 1 == config.max_depth {
            break;
        }

        if bounce >= config.roulette_min_depth {
            if gen_f32(rng) >= config.roulette_continue {
                break;
            }
            if config.roulette_compensation {
                throughput /= config.roulette_continue;
            }
        }

        let sampled = bsdf::sample(hit.material, ray.direction(), hit.normal, rng);
        throughput *= hit.color;
        ray = Ray::new(hit.p, sampled.direction);
    }

    radiance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::{Hit, HittableList};
    use crate::Sphere;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use umbra_core::Material;
    use umbra_math::{Aabb, Vec3};

    /// Surface one unit ahead of every ray, counting the queries it answers.
    struct Enclosure {
        material: Material,
        queries: AtomicUsize,
    }

    impl Enclosure {
        fn new(material: Material) -> Self {
            Self {
                material,
                queries: AtomicUsize::new(0),
            }
        }

        fn queries(&self) -> usize {
            self.queries.load(Ordering::Relaxed)
        }
    }

    impl Hittable for Enclosure {
        fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
            self.queries.fetch_add(1, Ordering::Relaxed);
            if !ray_t.surrounds(1.0) {
                return None;
            }
            Some(Hit::new(ray, 1.0, -ray.direction(), &self.material, 0.0, 0.0))
        }

        fn bounding_box(&self) -> Aabb {
            Aabb::UNIVERSE
        }
    }

    fn glowing(albedo: f32) -> Material {
        Material::diffuse(Color::splat(albedo))
            .with_emission(Color::ONE)
            .unwrap()
    }

    fn no_roulette(max_depth: u32) -> RenderConfig {
        RenderConfig {
            max_depth,
            roulette_continue: 1.0,
            ..RenderConfig::default()
        }
    }

    fn mean_radiance(world: &dyn Hittable, config: &RenderConfig, samples: usize) -> f32 {
        let mut rng = StdRng::seed_from_u64(11);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let total: f32 = (0..samples)
            .map(|_| radiance(&ray, world, &Background::default(), config, &mut rng).x)
            .sum();
        total / samples as f32
    }

    #[test]
    fn test_miss_returns_background_exactly() {
        let world = HittableList::new();
        let background = Background::Gradient {
            horizon: Color::new(1.0, 0.9, 0.8),
            zenith: Color::new(0.2, 0.4, 1.0),
        };
        let mut rng = StdRng::seed_from_u64(1);

        for direction in [Vec3::X, Vec3::Y, Vec3::new(0.3, -0.8, 0.1)] {
            let ray = Ray::new(Vec3::ZERO, direction);
            for depth in [1, 2, 50] {
                let config = RenderConfig {
                    max_depth: depth,
                    ..RenderConfig::default()
                };
                let color = radiance(&ray, &world, &background, &config, &mut rng);
                assert_eq!(color, background.radiance(ray.direction()));
            }
        }
    }

    #[test]
    fn test_depth_cap_bounds_queries() {
        let world = Enclosure::new(Material::diffuse(Color::ONE));
        let mut rng = StdRng::seed_from_u64(2);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        // Every path survives roulette, so the cap alone ends it
        let config = no_roulette(7);
        radiance(&ray, &world, &Background::default(), &config, &mut rng);
        assert_eq!(world.queries(), 7);

        // With roulette the cap still holds for every sample
        let config = RenderConfig {
            max_depth: 9,
            ..RenderConfig::default()
        };
        for _ in 0..200 {
            let before = world.queries();
            radiance(&ray, &world, &Background::default(), &config, &mut rng);
            let used = world.queries() - before;
            assert!((6..=9).contains(&used), "used {used} queries");
        }
    }

    #[test]
    fn test_single_bounce_keeps_emission() {
        let world = Enclosure::new(glowing(0.5));
        let color = {
            let mut rng = StdRng::seed_from_u64(3);
            let ray = Ray::new(Vec3::ZERO, Vec3::X);
            radiance(&ray, &world, &Background::default(), &no_roulette(1), &mut rng)
        };
        assert_eq!(color, Color::splat(0.5));
    }

    #[test]
    fn test_emission_series_without_roulette() {
        // Each bounce adds albedo^(k+1) * emission
        let world = Enclosure::new(glowing(0.5));
        let mean = mean_radiance(&world, &no_roulette(3), 4);
        assert!((mean - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_roulette_compensation_is_unbiased() {
        let world = Enclosure::new(glowing(0.5));

        // Geometric series 0.5 + 0.25 + ... converges to 1
        let unbiased = mean_radiance(&world, &RenderConfig::default(), 20_000);
        assert!((unbiased - 1.0).abs() < 0.003, "unbiased mean {unbiased}");

        let biased = RenderConfig {
            roulette_compensation: false,
            ..RenderConfig::default()
        };
        let biased = mean_radiance(&world, &biased, 20_000);
        // Uncompensated survivors lose about 0.009 of the tail
        assert!(unbiased - biased > 0.005, "biased mean {biased}");
    }

    #[test]
    fn test_energy_not_amplified() {
        // Closed diffuse enclosure without emission in a bright world stays dark
        let world = Enclosure::new(Material::diffuse(Color::splat(0.9)));
        let mean = mean_radiance(&world, &RenderConfig::default(), 1000);
        assert_eq!(mean, 0.0);

        // An open diffuse sphere reflects at most its albedo times the sky
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(Material::diffuse(Color::splat(0.8))),
        )));
        let background = Background::Solid { color: Color::ONE };
        let mut rng = StdRng::seed_from_u64(4);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        for _ in 0..256 {
            let color = radiance(&ray, &world, &background, &RenderConfig::default(), &mut rng);
            assert!(color.max_element() <= 0.8 + 1e-6);
        }
    }

    #[test]
    fn test_mirror_sphere_reflects_background() {
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Material::mirror(Color::ONE)),
        )));
        let background = Background::Gradient {
            horizon: Color::new(1.0, 0.0, 0.0),
            zenith: Color::new(0.0, 0.0, 1.0),
        };
        let mut rng = StdRng::seed_from_u64(5);

        // Head-on: straight back along +Z
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let color = radiance(&ray, &world, &background, &RenderConfig::default(), &mut rng);
        assert_eq!(color, background.radiance(Vec3::Z));

        // Off-axis: compare against the analytic mirror direction
        let origin = Vec3::new(0.0, 0.5, 5.0);
        let ray = Ray::new(origin, -Vec3::Z);
        let p = Vec3::new(0.0, 0.5, 0.75f32.sqrt());
        let expected = bsdf::reflect(-Vec3::Z, p.normalize());
        let color = radiance(&ray, &world, &background, &RenderConfig::default(), &mut rng);
        assert!((color - background.radiance(expected)).length() < 1e-4);
    }
}
