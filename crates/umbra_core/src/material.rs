//! Surface materials and their transport-mode weights.
//!
//! A material scatters light in one of three ways (diffuse, specular or
//! refractive), each picked with its own probability. The weights are
//! validated once here so the integrator can trust them.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use umbra_math::Vec3;

use crate::texture::Texture;

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Tolerance allowed on the sum of the transport weights.
const WEIGHT_EPSILON: f32 = 1e-4;

/// Errors raised when a material is built from invalid parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    #[error("{mode} weight {value} is outside [0, 1]")]
    WeightOutOfRange { mode: TransportMode, value: f32 },

    #[error("transport weights sum to {0}, expected 1")]
    WeightSum(f32),

    #[error("refractive index must be positive and finite, got {0}")]
    RefractiveIndex(f32),

    #[error("{field} must be finite and non-negative, got {value:?}")]
    InvalidColor { field: &'static str, value: Color },
}

/// How light leaves a surface after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Diffuse,
    Specular,
    Refractive,
}

impl TransportMode {
    pub const ALL: [TransportMode; 3] = [
        TransportMode::Diffuse,
        TransportMode::Specular,
        TransportMode::Refractive,
    ];
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportMode::Diffuse => "diffuse",
            TransportMode::Specular => "specular",
            TransportMode::Refractive => "refractive",
        };
        f.write_str(name)
    }
}

/// Selection probabilities for each transport mode.
///
/// Every weight lies in `[0, 1]` and the three sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterWeights {
    diffuse: f32,
    specular: f32,
    refractive: f32,
}

impl ScatterWeights {
    /// Pure Lambertian reflection.
    pub const DIFFUSE: ScatterWeights = ScatterWeights {
        diffuse: 1.0,
        specular: 0.0,
        refractive: 0.0,
    };

    /// Perfect mirror.
    pub const SPECULAR: ScatterWeights = ScatterWeights {
        diffuse: 0.0,
        specular: 1.0,
        refractive: 0.0,
    };

    /// Fresnel-weighted glass.
    pub const REFRACTIVE: ScatterWeights = ScatterWeights {
        diffuse: 0.0,
        specular: 0.0,
        refractive: 1.0,
    };

    /// Build weights from all three probabilities.
    pub fn new(diffuse: f32, specular: f32, refractive: f32) -> Result<Self, MaterialError> {
        for (mode, value) in [
            (TransportMode::Diffuse, diffuse),
            (TransportMode::Specular, specular),
            (TransportMode::Refractive, refractive),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MaterialError::WeightOutOfRange { mode, value });
            }
        }

        let sum = diffuse + specular + refractive;
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(MaterialError::WeightSum(sum));
        }

        Ok(Self {
            diffuse,
            specular,
            refractive,
        })
    }

    /// Build weights from the diffuse and specular probabilities; the
    /// refractive probability is whatever remains.
    pub fn from_diffuse_specular(diffuse: f32, specular: f32) -> Result<Self, MaterialError> {
        let refractive = 1.0 - diffuse - specular;
        // Absorb rounding so that e.g. 0.7 + 0.3 does not leave -1e-8 behind
        let refractive = if refractive.abs() <= WEIGHT_EPSILON {
            0.0
        } else {
            refractive
        };
        Self::new(diffuse, specular, refractive)
    }

    /// Probability of the given mode.
    pub fn probability(&self, mode: TransportMode) -> f32 {
        match mode {
            TransportMode::Diffuse => self.diffuse,
            TransportMode::Specular => self.specular,
            TransportMode::Refractive => self.refractive,
        }
    }

    /// Pick a mode from a uniform draw `u` in `[0, 1)`.
    pub fn choose(&self, u: f32) -> TransportMode {
        if u < self.diffuse {
            TransportMode::Diffuse
        } else if u < self.diffuse + self.specular {
            TransportMode::Specular
        } else {
            TransportMode::Refractive
        }
    }
}

impl Default for ScatterWeights {
    fn default() -> Self {
        Self::DIFFUSE
    }
}

/// A surface material.
#[derive(Clone)]
pub struct Material {
    /// Material name, for diagnostics
    pub name: String,
    color: Color,
    emission: Color,
    texture: Option<Arc<Texture>>,
    refractive_index: f32,
    weights: ScatterWeights,
}

impl Material {
    /// Create a material, validating every parameter.
    pub fn new(
        color: Color,
        weights: ScatterWeights,
        refractive_index: f32,
    ) -> Result<Self, MaterialError> {
        check_color("color", color)?;
        if !(refractive_index.is_finite() && refractive_index > 0.0) {
            return Err(MaterialError::RefractiveIndex(refractive_index));
        }

        Ok(Self {
            name: String::new(),
            color,
            emission: Color::ZERO,
            texture: None,
            refractive_index,
            weights,
        })
    }

    /// A purely diffuse material.
    pub fn diffuse(color: Color) -> Self {
        Self {
            name: String::new(),
            color,
            emission: Color::ZERO,
            texture: None,
            refractive_index: 1.0,
            weights: ScatterWeights::DIFFUSE,
        }
    }

    /// A perfect mirror tinted by `color`.
    pub fn mirror(color: Color) -> Self {
        Self {
            weights: ScatterWeights::SPECULAR,
            ..Self::diffuse(color)
        }
    }

    /// A dielectric with the given refractive index.
    pub fn glass(color: Color, refractive_index: f32) -> Result<Self, MaterialError> {
        Self::new(color, ScatterWeights::REFRACTIVE, refractive_index)
    }

    /// Set the emitted radiance.
    pub fn with_emission(mut self, emission: Color) -> Result<Self, MaterialError> {
        check_color("emission", emission)?;
        self.emission = emission;
        Ok(self)
    }

    /// Replace the constant color with a texture lookup.
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Set the diagnostic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Surface color at texture coordinates `(u, v)`.
    pub fn color_at(&self, u: f32, v: f32) -> Color {
        match &self.texture {
            Some(texture) => texture.sample(u, v),
            None => self.color,
        }
    }

    pub fn emission(&self) -> Color {
        self.emission
    }

    pub fn refractive_index(&self) -> f32 {
        self.refractive_index
    }

    pub fn weights(&self) -> &ScatterWeights {
        &self.weights
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.max_element() > 0.0
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("color", &self.color)
            .field("emission", &self.emission)
            .field("texture", &self.texture.as_ref().map(|t| t.path.as_str()))
            .field("refractive_index", &self.refractive_index)
            .field("weights", &self.weights)
            .finish()
    }
}

fn check_color(field: &'static str, value: Color) -> Result<(), MaterialError> {
    if value.is_finite() && value.min_element() >= 0.0 {
        Ok(())
    } else {
        Err(MaterialError::InvalidColor { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_choose_by_cumulative_probability() {
        let weights = ScatterWeights::new(0.5, 0.3, 0.2).unwrap();

        assert_eq!(weights.choose(0.0), TransportMode::Diffuse);
        assert_eq!(weights.choose(0.49), TransportMode::Diffuse);
        assert_eq!(weights.choose(0.5), TransportMode::Specular);
        assert_eq!(weights.choose(0.79), TransportMode::Specular);
        assert_eq!(weights.choose(0.8), TransportMode::Refractive);
        assert_eq!(weights.choose(0.999), TransportMode::Refractive);
    }

    #[test]
    fn test_pure_weights_never_pick_other_modes() {
        for i in 0..100 {
            let u = i as f32 / 100.0;
            assert_eq!(ScatterWeights::DIFFUSE.choose(u), TransportMode::Diffuse);
            assert_eq!(ScatterWeights::SPECULAR.choose(u), TransportMode::Specular);
            assert_eq!(ScatterWeights::REFRACTIVE.choose(u), TransportMode::Refractive);
        }
    }

    #[test]
    fn test_weights_reject_out_of_range() {
        let err = ScatterWeights::new(1.2, -0.2, 0.0).unwrap_err();
        assert_eq!(
            err,
            MaterialError::WeightOutOfRange {
                mode: TransportMode::Diffuse,
                value: 1.2
            }
        );
    }

    #[test]
    fn test_weights_reject_bad_sum() {
        assert!(matches!(
            ScatterWeights::new(0.5, 0.2, 0.2),
            Err(MaterialError::WeightSum(_))
        ));
    }

    #[test]
    fn test_weights_implied_refraction() {
        let weights = ScatterWeights::from_diffuse_specular(0.25, 0.25).unwrap();
        assert_eq!(weights.probability(TransportMode::Refractive), 0.5);

        let weights = ScatterWeights::from_diffuse_specular(0.7, 0.3).unwrap();
        assert_eq!(weights.probability(TransportMode::Refractive), 0.0);

        assert!(ScatterWeights::from_diffuse_specular(0.8, 0.4).is_err());
    }

    #[test]
    fn test_weights_sum_to_one() {
        let weights = ScatterWeights::from_diffuse_specular(0.1, 0.6).unwrap();
        let sum: f32 = TransportMode::ALL
            .iter()
            .map(|m| weights.probability(*m))
            .sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_material_rejects_bad_refractive_index() {
        let err = Material::glass(Color::ONE, 0.0).unwrap_err();
        assert_eq!(err, MaterialError::RefractiveIndex(0.0));
        assert!(Material::glass(Color::ONE, f32::NAN).is_err());
    }

    #[test]
    fn test_material_rejects_negative_emission() {
        let result = Material::diffuse(Color::ONE).with_emission(Color::new(-1.0, 0.0, 0.0));
        assert!(matches!(
            result,
            Err(MaterialError::InvalidColor { field: "emission", .. })
        ));
    }

    #[test]
    fn test_material_color_without_texture() {
        let material = Material::diffuse(Color::new(0.2, 0.4, 0.6));
        assert_eq!(material.color_at(0.3, 0.7), Color::new(0.2, 0.4, 0.6));
        assert!(!material.is_emissive());
    }

    #[test]
    fn test_material_color_from_texture() {
        let texture = Arc::new(Texture::solid_color(Color::new(1.0, 0.5, 0.0)));
        let material = Material::diffuse(Color::ONE).with_texture(texture);
        let color = material.color_at(0.5, 0.5);
        assert!((color - Color::new(1.0, 0.5, 0.0)).length() < 1e-6);
    }
}
