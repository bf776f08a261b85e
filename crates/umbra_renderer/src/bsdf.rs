//! BSDF sampling: picks a transport mode at a surface hit and draws the
//! outgoing direction for it.
//!
//! Every mode returns a unit direction. The color multiplier applied to the
//! continued path is the surface color alone: diffuse directions are drawn
//! with a cosine-weighted density, so no `1/pi` factor appears anywhere.

use rand::RngCore;
use umbra_core::{Material, TransportMode};
use umbra_math::{Onb, Vec3};

use crate::sampling::{cosine_hemisphere, gen_f32};

/// Outcome of one BSDF sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsdfSample {
    pub mode: TransportMode,
    /// Unit direction of the continued path
    pub direction: Vec3,
}

/// Sample a transport mode and outgoing direction.
///
/// `incoming` is the unit direction of the arriving ray and `normal` the
/// unit outward normal of the surface.
pub fn sample(
    material: &Material,
    incoming: Vec3,
    normal: Vec3,
    rng: &mut dyn RngCore,
) -> BsdfSample {
    let mode = material.weights().choose(gen_f32(rng));

    let direction = match mode {
        TransportMode::Diffuse => sample_diffuse(incoming, normal, rng),
        TransportMode::Specular => reflect(incoming, normal),
        TransportMode::Refractive => {
            sample_refractive(incoming, normal, material.refractive_index(), rng)
        }
    };

    BsdfSample { mode, direction }
}

/// Mirror `d` about `n`.
#[inline]
pub fn reflect(d: Vec3, n: Vec3) -> Vec3 {
    (d - 2.0 * d.dot(n) * n).normalize()
}

/// Reflectance at normal incidence for a boundary with relative index `ior`.
#[inline]
pub fn fresnel_r0(ior: f32) -> f32 {
    let r = (1.0 - ior) / (1.0 + ior);
    r * r
}

/// Schlick's approximation to the Fresnel reflectance.
#[inline]
pub fn schlick_reflectance(cosine: f32, r0: f32) -> f32 {
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

fn sample_diffuse(incoming: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    // Scatter back into the hemisphere the ray came from
    let facing = if incoming.dot(normal) > 0.0 {
        -normal
    } else {
        normal
    };

    let local = cosine_hemisphere(gen_f32(rng), gen_f32(rng));
    Onb::from_normal(facing).local_to_world(local).normalize()
}

fn sample_refractive(incoming: Vec3, normal: Vec3, ior: f32, rng: &mut dyn RngCore) -> Vec3 {
    let r0 = fresnel_r0(ior);

    // Leaving the medium: flip the normal and invert the index ratio
    let (n, eta) = if incoming.dot(normal) > 0.0 {
        (-normal, ior)
    } else {
        (normal, 1.0 / ior)
    };

    let cos1 = -n.dot(incoming);
    let cos2_sq = 1.0 - eta * eta * (1.0 - cos1 * cos1);
    let reflectance = schlick_reflectance(cos1, r0);

    if cos2_sq > 0.0 && gen_f32(rng) > reflectance {
        (eta * incoming + n * (eta * cos1 - cos2_sq.sqrt())).normalize()
    } else {
        // Total internal reflection, or the Fresnel draw chose reflection
        (incoming + n * (2.0 * cos1)).normalize()
    }
}
