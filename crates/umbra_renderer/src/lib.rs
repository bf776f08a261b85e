//! Umbra Renderer - CPU path tracing
//!
//! An unbiased Monte Carlo path tracer:
//!
//! - **BSDF sampling** between diffuse, specular and refractive transport
//! - **Iterative integrator** with Russian roulette and a hard depth cap
//! - **Parallel render loop** over image rows with reproducible seeding
//!
//! Geometry (spheres, planes, triangles, OBJ meshes) is gathered into a
//! BVH and queried through the [`Hittable`] trait.

mod bvh;
mod camera;
mod error;
mod hittable;
mod image_buffer;
mod mesh;
mod plane;
mod renderer;
mod scene;
mod sphere;
mod triangle;

pub mod bsdf;
pub mod integrator;
pub mod sampling;

pub use bsdf::{BsdfSample, fresnel_r0, reflect, schlick_reflectance};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use hittable::{Hit, Hittable, HittableList};
pub use image_buffer::{color_to_rgb, encode_channel, ImageBuffer, GAMMA};
pub use integrator::radiance;
pub use mesh::load_obj;
pub use plane::Plane;
pub use renderer::{render, render_pixel, render_to_file, RenderConfig};
pub use scene::Scene;
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math and scene types
pub use umbra_core::{Background, Color, Material};
pub use umbra_math::{Aabb, Interval, Ray, Vec2, Vec3};
