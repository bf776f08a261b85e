use crate::Vec3;

/// An orthonormal basis `(tangent, bitangent, normal)` around a unit normal.
///
/// Used to carry hemisphere samples from local space, where the normal is
/// +Z, into world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Onb {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Onb {
    /// Build a basis from a unit normal.
    ///
    /// The bitangent is taken in the plane of the normal's two largest
    /// components so it never degenerates.
    pub fn from_normal(normal: Vec3) -> Self {
        let bitangent = if normal.x.abs() > normal.y.abs() {
            let inv_len = 1.0 / (normal.x * normal.x + normal.z * normal.z).sqrt();
            Vec3::new(normal.z * inv_len, 0.0, -normal.x * inv_len)
        } else {
            let inv_len = 1.0 / (normal.y * normal.y + normal.z * normal.z).sqrt();
            Vec3::new(0.0, normal.z * inv_len, -normal.y * inv_len)
        };
        let tangent = bitangent.cross(normal);

        Self {
            tangent,
            bitangent,
            normal,
        }
    }

    /// Transform a local-space vector into world space.
    #[inline]
    pub fn local_to_world(&self, v: Vec3) -> Vec3 {
        self.tangent * v.x + self.bitangent * v.y + self.normal * v.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(onb: &Onb) {
        assert!((onb.tangent.length() - 1.0).abs() < 1e-5);
        assert!((onb.bitangent.length() - 1.0).abs() < 1e-5);
        assert!(onb.tangent.dot(onb.bitangent).abs() < 1e-5);
        assert!(onb.tangent.dot(onb.normal).abs() < 1e-5);
        assert!(onb.bitangent.dot(onb.normal).abs() < 1e-5);
    }

    #[test]
    fn test_onb_is_orthonormal() {
        let normals = [
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            -Vec3::Z,
            Vec3::new(1.0, 1.0, 1.0).normalize(),
            Vec3::new(-0.3, 0.9, -0.1).normalize(),
        ];
        for n in normals {
            assert_orthonormal(&Onb::from_normal(n));
        }
    }

    #[test]
    fn test_local_z_maps_to_normal() {
        let n = Vec3::new(0.2, -0.5, 0.8).normalize();
        let onb = Onb::from_normal(n);
        assert!((onb.local_to_world(Vec3::Z) - n).length() < 1e-6);
    }
}
