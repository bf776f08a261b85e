//! Scene description types for Umbra.
//!
//! A scene file is JSON. It is parsed into a [`SceneDescription`], which is
//! checked as a whole before any rendering state is built: once a
//! description validates, the renderer can rely on every material index,
//! camera parameter and transport weight being sane.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use umbra_math::Vec3;

use crate::material::{Color, Material, MaterialError, ScatterWeights};
use crate::texture::{TextureCache, TextureError};

/// Errors that can occur while loading or validating a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid material {index}: {source}")]
    InvalidMaterial {
        index: usize,
        #[source]
        source: MaterialError,
    },

    #[error("Object {object} references material {material}, but the scene has {count} materials")]
    UnknownMaterial {
        object: usize,
        material: usize,
        count: usize,
    },

    #[error("Invalid object {object}: {reason}")]
    InvalidObject { object: usize, reason: String },

    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Pinhole camera parameters.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CameraDescription {
    pub look_from: Vec3,
    pub look_at: Vec3,
    #[serde(default = "default_vup")]
    pub vup: Vec3,
    /// Vertical field of view in degrees
    #[serde(default = "default_vfov")]
    pub vfov: f32,
    pub width: u32,
    pub height: u32,
}

fn default_vup() -> Vec3 {
    Vec3::Y
}

fn default_vfov() -> f32 {
    40.0
}

/// Radiance arriving along rays that leave the scene.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    /// The same radiance in every direction.
    Solid { color: Color },
    /// Vertical blend from `horizon` (looking down) to `zenith` (looking up).
    Gradient { horizon: Color, zenith: Color },
}

impl Background {
    /// Radiance seen along the unit direction `direction`.
    pub fn radiance(&self, direction: Vec3) -> Color {
        match *self {
            Background::Solid { color } => color,
            Background::Gradient { horizon, zenith } => {
                let a = 0.5 * (direction.y + 1.0);
                horizon * (1.0 - a) + zenith * a
            }
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid { color: Color::ZERO }
    }
}

/// A light source.
///
/// Lights are kept in the scene model for completeness; the integrator does
/// not sample them directly, so only emissive surfaces light the image.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Light {
    Point { position: Vec3, color: Color },
    Directional { direction: Vec3, color: Color },
}

/// Material parameters as written in the scene file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MaterialDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_color")]
    pub color: Color,
    #[serde(default)]
    pub emission: Color,
    /// Probability of diffuse reflection
    #[serde(default = "default_diffuse")]
    pub diffuse: f32,
    /// Probability of mirror reflection; refraction takes the rest
    #[serde(default)]
    pub specular: f32,
    #[serde(default = "default_refractive_index")]
    pub refractive_index: f32,
    /// Image file replacing `color`
    #[serde(default)]
    pub texture: Option<String>,
}

fn default_color() -> Color {
    Color::splat(0.8)
}

fn default_diffuse() -> f32 {
    1.0
}

fn default_refractive_index() -> f32 {
    1.5
}

impl MaterialDescription {
    /// Build the validated material, loading its texture through `textures`.
    ///
    /// `index` is the material's position in the scene, used for errors.
    pub fn build(&self, index: usize, textures: &mut TextureCache) -> SceneResult<Material> {
        let material = self
            .build_untextured()
            .map_err(|source| SceneError::InvalidMaterial { index, source })?;
        match &self.texture {
            Some(path) => Ok(material.with_texture(textures.load(path)?)),
            None => Ok(material),
        }
    }

    fn build_untextured(&self) -> Result<Material, MaterialError> {
        let weights = ScatterWeights::from_diffuse_specular(self.diffuse, self.specular)?;
        Ok(Material::new(self.color, weights, self.refractive_index)?
            .with_emission(self.emission)?
            .with_name(self.name.clone()))
    }
}

/// A geometric object referencing a material by index.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDescription {
    Sphere {
        center: Vec3,
        radius: f32,
        material: usize,
    },
    /// Infinite plane of points `p` with `dot(normal, p) == offset`.
    Plane {
        normal: Vec3,
        offset: f32,
        material: usize,
    },
    Triangle {
        vertices: [Vec3; 3],
        material: usize,
    },
    /// Wavefront OBJ file, scaled then translated.
    Mesh {
        path: String,
        material: usize,
        #[serde(default)]
        translate: Vec3,
        #[serde(default = "default_scale")]
        scale: f32,
    },
}

fn default_scale() -> f32 {
    1.0
}

impl ObjectDescription {
    pub fn material(&self) -> usize {
        match self {
            ObjectDescription::Sphere { material, .. }
            | ObjectDescription::Plane { material, .. }
            | ObjectDescription::Triangle { material, .. }
            | ObjectDescription::Mesh { material, .. } => *material,
        }
    }

    fn check_shape(&self) -> Result<(), String> {
        match self {
            ObjectDescription::Sphere { center, radius, .. } => {
                if !center.is_finite() || !(radius.is_finite() && *radius > 0.0) {
                    return Err(format!("sphere radius must be positive, got {radius}"));
                }
            }
            ObjectDescription::Plane { normal, offset, .. } => {
                if !offset.is_finite() || normal.length_squared() < 1e-12 {
                    return Err("plane normal must be non-zero".to_string());
                }
            }
            ObjectDescription::Triangle { vertices, .. } => {
                let [a, b, c] = *vertices;
                if (b - a).cross(c - a).length_squared() < 1e-12 {
                    return Err("triangle is degenerate".to_string());
                }
            }
            ObjectDescription::Mesh { scale, path, .. } => {
                if !(scale.is_finite() && *scale > 0.0) {
                    return Err(format!("mesh {path} scale must be positive, got {scale}"));
                }
            }
        }
        Ok(())
    }
}

/// Optional render overrides carried by the scene file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RenderSettings {
    pub samples_per_pixel: Option<u32>,
    pub max_depth: Option<u32>,
    pub roulette_min_depth: Option<u32>,
    pub roulette_continue: Option<f32>,
    pub roulette_compensation: Option<bool>,
}

/// A complete, parsed scene file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    pub camera: CameraDescription,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub lights: Vec<Light>,
    pub materials: Vec<MaterialDescription>,
    pub objects: Vec<ObjectDescription>,
    #[serde(default)]
    pub render: RenderSettings,

    /// Directory that relative texture and mesh paths resolve against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl SceneDescription {
    /// Parse and validate a scene from a JSON string.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let description: SceneDescription = serde_json::from_str(json)?;
        description.validate()?;
        Ok(description)
    }

    /// Load, parse and validate a scene file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut description = Self::from_json(&json)?;
        description.base_dir = path.parent().map(Path::to_path_buf);

        log::info!(
            "Loaded scene {}: {} materials, {} objects, {} lights",
            path.display(),
            description.materials.len(),
            description.objects.len(),
            description.lights.len()
        );

        Ok(description)
    }

    /// Check everything that can be checked without touching the disk.
    pub fn validate(&self) -> SceneResult<()> {
        self.validate_camera()?;

        for (index, material) in self.materials.iter().enumerate() {
            material
                .build_untextured()
                .map_err(|source| SceneError::InvalidMaterial { index, source })?;
        }

        for (object, description) in self.objects.iter().enumerate() {
            let material = description.material();
            if material >= self.materials.len() {
                return Err(SceneError::UnknownMaterial {
                    object,
                    material,
                    count: self.materials.len(),
                });
            }
            description
                .check_shape()
                .map_err(|reason| SceneError::InvalidObject { object, reason })?;
        }

        Ok(())
    }

    fn validate_camera(&self) -> SceneResult<()> {
        let camera = &self.camera;
        if camera.width == 0 || camera.height == 0 {
            return Err(SceneError::InvalidCamera(format!(
                "resolution {}x{} is empty",
                camera.width, camera.height
            )));
        }
        if !(camera.vfov > 0.0 && camera.vfov < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "vertical field of view {} is outside (0, 180)",
                camera.vfov
            )));
        }
        let forward = camera.look_at - camera.look_from;
        if forward.length_squared() < 1e-12 {
            return Err(SceneError::InvalidCamera(
                "look_from and look_at coincide".to_string(),
            ));
        }
        if forward.cross(camera.vup).length_squared() < 1e-12 {
            return Err(SceneError::InvalidCamera(
                "vup is parallel to the view direction".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a path from the scene file against the scene's directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Build every material, loading and sharing textures.
    pub fn build_materials(&self) -> SceneResult<Vec<Arc<Material>>> {
        let mut textures = match &self.base_dir {
            Some(dir) => TextureCache::with_base_dir(dir),
            None => TextureCache::new(),
        };

        let materials = self
            .materials
            .iter()
            .enumerate()
            .map(|(index, description)| description.build(index, &mut textures).map(Arc::new))
            .collect::<SceneResult<Vec<_>>>()?;

        if !textures.is_empty() {
            log::info!("Loaded {} textures", textures.len());
        }

        Ok(materials)
    }
}
