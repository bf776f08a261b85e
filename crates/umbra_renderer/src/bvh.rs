//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over bounded primitives with median splits along the
//! longest centroid axis.

use crate::hittable::{Hit, Hittable};
use umbra_math::{Aabb, Interval, Ray};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf {
        objects: Vec<Box<dyn Hittable>>,
        bbox: Aabb,
    },
    /// Empty node (scene without bounded geometry).
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    pub fn new(objects: Vec<Box<dyn Hittable>>) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }
        Self::build(objects)
    }

    /// Recursive BVH construction.
    ///
    /// Sort objects by centroid on the longest centroid axis, split in half,
    /// recurse.
    fn build(mut objects: Vec<Box<dyn Hittable>>) -> Self {
        let n = objects.len();

        let bounds = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));

        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects,
                bbox: bounds,
            };
        }

        let centroids: Vec<_> = objects.iter().map(|o| o.bounding_box().centroid()).collect();
        let axis = Aabb::from_point_cloud(&centroids).longest_axis();

        objects.sort_unstable_by(|a, b| {
            let a_val = a.bounding_box().centroid()[axis];
            let b_val = b.bounding_box().centroid()[axis];
            a_val.total_cmp(&b_val)
        });

        let right_objects = objects.split_off(n / 2);
        let left = Self::build(objects);
        let right = Self::build(right_objects);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Depth of the tree, for build statistics.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty | BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let mut closest: Option<Hit<'_>> = None;
                for obj in objects {
                    let interval = closest.map_or(ray_t, |h| ray_t.with_max(h.t));
                    if let Some(hit) = obj.hit(ray, interval) {
                        closest = Some(hit);
                    }
                }
                closest
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_t = hit_left.map_or(ray_t, |h| ray_t.with_max(h.t));
                right.hit(ray, right_t).or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sphere;
    use std::sync::Arc;
    use umbra_core::{Color, Material};
    use umbra_math::Vec3;

    fn spheres(count: usize) -> Vec<Box<dyn Hittable>> {
        let material = Arc::new(Material::diffuse(Color::new(0.5, 0.5, 0.5)));
        (0..count)
            .map(|i| {
                Box::new(Sphere::new(
                    Vec3::new(i as f32, 0.0, -5.0),
                    0.4,
                    material.clone(),
                )) as Box<dyn Hittable>
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(vec![]);
        assert!(matches!(bvh, BvhNode::Empty));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::new(spheres(1));
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_some());
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let bvh = BvhNode::new(spheres(10));
        assert!(matches!(bvh, BvhNode::Branch { .. }));
        assert!(bvh.depth() > 1);

        // Ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        // Hit point should be near z = -4.6 (sphere at z=-5, radius 0.4)
        assert!((hit.p.z - (-4.6)).abs() < 0.01);
        assert!((hit.p.x - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_bvh_finds_nearest_along_axis() {
        // Ray along +X passes through every sphere; the first one is nearest
        let bvh = BvhNode::new(spheres(10));
        let ray = Ray::new(Vec3::new(-3.0, 0.0, -5.0), Vec3::X);

        let hit = bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.p.x - (-0.4)).abs() < 1e-4);
    }
}
