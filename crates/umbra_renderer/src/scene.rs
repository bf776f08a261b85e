//! Render-ready scene: camera, background and intersectable geometry.

use std::sync::Arc;

use umbra_core::{Background, Light, Material, ObjectDescription, SceneDescription, SceneError};

use crate::hittable::{Hittable, HittableList};
use crate::{load_obj, BvhNode, Camera, Plane, RenderResult, Sphere, Triangle};

/// Everything the render loop reads. Immutable once built and shared by
/// every worker.
pub struct Scene {
    pub camera: Camera,
    pub background: Background,
    /// Carried for completeness; paths only gather light from emissive
    /// surfaces and the background.
    pub lights: Vec<Light>,
    pub materials: Vec<Arc<Material>>,
    pub world: HittableList,
}

impl Scene {
    pub fn new(camera: Camera, background: Background, world: HittableList) -> Self {
        Self {
            camera,
            background,
            lights: Vec::new(),
            materials: Vec::new(),
            world,
        }
    }

    /// Build materials and geometry from a validated description.
    ///
    /// Bounded objects go into one BVH; planes are tested next to it.
    pub fn from_description(description: &SceneDescription) -> RenderResult<Self> {
        let materials = description.build_materials()?;

        let mut bounded: Vec<Box<dyn Hittable>> = Vec::new();
        let mut world = HittableList::new();

        for (index, object) in description.objects.iter().enumerate() {
            let material = materials
                .get(object.material())
                .cloned()
                .ok_or(SceneError::UnknownMaterial {
                    object: index,
                    material: object.material(),
                    count: materials.len(),
                })?;
            match object {
                ObjectDescription::Sphere { center, radius, .. } => {
                    bounded.push(Box::new(Sphere::new(*center, *radius, material)));
                }
                ObjectDescription::Plane { normal, offset, .. } => {
                    world.add(Box::new(Plane::new(*normal, *offset, material)));
                }
                ObjectDescription::Triangle { vertices, .. } => {
                    let [v0, v1, v2] = *vertices;
                    bounded.push(Box::new(Triangle::new(v0, v1, v2, material)));
                }
                ObjectDescription::Mesh {
                    path,
                    translate,
                    scale,
                    ..
                } => {
                    let path = description.resolve_path(path);
                    for triangle in load_obj(&path, *translate, *scale, material)? {
                        bounded.push(Box::new(triangle));
                    }
                }
            }
        }

        let primitives = bounded.len();
        let bvh = BvhNode::new(bounded);
        log::info!(
            "Built BVH over {} primitives (depth {}), {} unbounded objects",
            primitives,
            bvh.depth(),
            world.len()
        );
        world.add(Box::new(bvh));

        let emissive = materials.iter().filter(|m| m.is_emissive()).count();
        if emissive == 0 && description.background == Background::default() {
            log::warn!("Scene has no emissive materials and a black background, the image will be black");
        }

        Ok(Self {
            camera: Camera::from_description(&description.camera),
            background: description.background,
            lights: description.lights.clone(),
            materials,
            world,
        })
    }
}
