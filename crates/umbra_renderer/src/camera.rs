//! Pinhole camera for ray generation.

use umbra_core::CameraDescription;
use umbra_math::{Ray, Vec2, Vec3};

/// Camera mapping pixel coordinates to world-space rays.
///
/// Pixel `(0, 0)` is the top-left corner of the image; pixel centers sit at
/// half-integer coordinates.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32, // Vertical field of view in degrees

    // Cached values, refreshed by every builder method
    viewport_upper_left: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Camera {
    /// Create a new camera with default settings, looking down -Z.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            viewport_upper_left: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        };
        camera.initialize();
        camera
    }

    /// Build the camera described by a scene file.
    pub fn from_description(description: &CameraDescription) -> Self {
        Self::new()
            .with_resolution(description.width, description.height)
            .with_position(description.look_from, description.look_at, description.vup)
            .with_vfov(description.vfov)
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self.initialize();
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_vfov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.initialize();
        self
    }

    /// Recompute the image plane. The plane sits one unit in front of the eye.
    fn initialize(&mut self) {
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        // Viewport edges; v runs down the image
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;
        self.viewport_upper_left = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
    }

    /// Generate the ray through a (possibly fractional) pixel coordinate.
    pub fn generate_ray(&self, pixel: Vec2) -> Ray {
        let target =
            self.viewport_upper_left + pixel.x * self.pixel_delta_u + pixel.y * self.pixel_delta_v;
        Ray::new(self.look_from, target - self.look_from)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
