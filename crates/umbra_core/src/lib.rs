//! Umbra Core - scene description and materials for the Umbra path tracer.
//!
//! This crate provides:
//!
//! - **Materials**: validated transport-mode weights (`ScatterWeights`) and
//!   surface parameters (`Material`)
//! - **Textures**: image-backed surface colors with a shared cache
//! - **Scene files**: JSON scene parsing and validation (`SceneDescription`)
//!
//! # Example
//!
//! ```ignore
//! use umbra_core::SceneDescription;
//!
//! let scene = SceneDescription::load("scenes/cornell.json")?;
//! let materials = scene.build_materials()?;
//! println!("{} materials, {} objects", materials.len(), scene.objects.len());
//! ```

pub mod material;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use material::{Color, Material, MaterialError, ScatterWeights, TransportMode};
pub use scene::{
    Background, CameraDescription, Light, MaterialDescription, ObjectDescription,
    RenderSettings, SceneDescription, SceneError, SceneResult,
};
pub use texture::{Texture, TextureCache, TextureError};
