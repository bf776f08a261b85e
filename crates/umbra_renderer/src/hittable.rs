//! Hittable trait and Hit record for ray-object intersection.

use umbra_core::{Color, Material};
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// Record of the nearest ray-object intersection.
///
/// Built fresh by every query and consumed by one integrator step.
#[derive(Clone, Copy)]
pub struct Hit<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Outward geometric normal (unit length), independent of the ray side
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Surface color, the material color or its texture at (u, v)
    pub color: Color,
}

impl<'a> Hit<'a> {
    /// Build a hit, resolving the surface color from the material.
    pub fn new(ray: &Ray, t: f32, normal: Vec3, material: &'a Material, u: f32, v: f32) -> Self {
        Self {
            t,
            p: ray.at(t),
            normal,
            material,
            color: material.color_at(u, v),
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with parameter strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// A list of hittable objects, tested one after another.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        let mut closest: Option<Hit<'_>> = None;

        for object in &self.objects {
            let interval = match &closest {
                Some(hit) => ray_t.with_max(hit.t),
                None => ray_t,
            };
            if let Some(hit) = object.hit(ray, interval) {
                closest = Some(hit);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
