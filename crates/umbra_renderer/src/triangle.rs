//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::hittable::{Hit, Hittable};
use umbra_core::Material;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// A triangle primitive.
#[derive(Debug)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Face normal from the winding order (unit length)
    normal: Vec3,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        let bbox = Aabb::from_point_cloud(&[v0, v1, v2]);

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    /// True when the vertices span no area.
    pub fn is_degenerate(v0: Vec3, v1: Vec3, v2: Vec3) -> bool {
        (v1 - v0).cross(v2 - v0).length_squared() < 1e-12
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(Hit::new(ray, t, self.normal, &self.material, u, v))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::Color;

    fn test_triangle() -> Triangle {
        // Triangle in XY plane at z=-1, wound counter-clockwise seen from the origin
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Arc::new(Material::diffuse(Color::new(0.5, 0.5, 0.5))),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = test_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.t - 1.0).abs() < 0.001);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = test_triangle();

        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());

        // Ray passing beside the triangle
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(Triangle::is_degenerate(Vec3::ZERO, Vec3::X, Vec3::X * 2.0));
        assert!(!Triangle::is_degenerate(Vec3::ZERO, Vec3::X, Vec3::Y));
    }
}
