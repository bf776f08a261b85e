// Re-export glam for convenience
pub use glam::*;

// Umbra math types
mod aabb;
mod interval;
mod onb;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vec3_component_product() {
        // Colors are multiplied channel by channel throughout the renderer
        let a = Vec3::new(0.5, 1.0, 2.0);
        let b = Vec3::new(2.0, 0.5, 0.25);
        assert_eq!(a * b, Vec3::new(1.0, 0.5, 0.5));
    }
}
