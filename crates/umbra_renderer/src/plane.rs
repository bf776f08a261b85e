//! Infinite plane primitive.

use std::sync::Arc;

use crate::hittable::{Hit, Hittable};
use umbra_core::Material;
use umbra_math::{Aabb, Interval, Onb, Ray, Vec3};

/// The plane of points `p` with `dot(normal, p) == offset`.
///
/// Planes are unbounded, so they are kept out of the BVH.
pub struct Plane {
    basis: Onb,
    offset: f32,
    material: Arc<Material>,
}

impl Plane {
    pub fn new(normal: Vec3, offset: f32, material: Arc<Material>) -> Self {
        let length = normal.length();
        Self {
            basis: Onb::from_normal(normal / length),
            // Keep the same set of points after normalizing
            offset: offset / length,
            material,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.basis.normal
    }
}

impl Hittable for Plane {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        let normal = self.basis.normal;
        let denom = normal.dot(ray.direction());
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.offset - normal.dot(ray.origin())) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        // Planar texture coordinates, one texture tile per world unit
        let p = ray.at(t);
        let u = p.dot(self.basis.tangent);
        let v = p.dot(self.basis.bitangent);

        Some(Hit::new(ray, t, normal, &self.material, u, v))
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::Color;

    fn floor(offset: f32) -> Plane {
        Plane::new(
            Vec3::new(0.0, 2.0, 0.0),
            offset,
            Arc::new(Material::diffuse(Color::ONE)),
        )
    }

    #[test]
    fn test_plane_hit() {
        // Unnormalized normal: 2y = -2 is the plane y = -1
        let plane = floor(-2.0);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Y);

        let hit = plane.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!((hit.p - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
        assert_eq!(plane.normal(), Vec3::Y);
    }

    #[test]
    fn test_plane_parallel_ray_misses() {
        let plane = floor(-2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(plane.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_plane_behind_ray_misses() {
        let plane = floor(-2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(plane.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }
}
