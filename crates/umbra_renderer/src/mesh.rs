//! Triangle meshes loaded from Wavefront OBJ files.

use std::path::Path;
use std::sync::Arc;

use crate::{RenderError, Triangle};
use umbra_core::Material;
use umbra_math::Vec3;

/// Load every model in an OBJ file as world-space triangles.
///
/// Vertices are scaled by `scale`, then moved by `translate`. Faces are
/// triangulated on load and degenerate triangles are dropped.
pub fn load_obj(
    path: &Path,
    translate: Vec3,
    scale: f32,
    material: Arc<Material>,
) -> Result<Vec<Triangle>, RenderError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )
    .map_err(|source| RenderError::Mesh {
        path: path.to_path_buf(),
        source,
    })?;

    let mut triangles = Vec::new();
    let mut skipped = 0usize;

    for model in &models {
        let mesh = &model.mesh;
        let vertex = |i: u32| {
            let i = i as usize * 3;
            Vec3::from_slice(&mesh.positions[i..i + 3]) * scale + translate
        };

        for face in mesh.indices.chunks_exact(3) {
            let (v0, v1, v2) = (vertex(face[0]), vertex(face[1]), vertex(face[2]));
            if Triangle::is_degenerate(v0, v1, v2) {
                skipped += 1;
                continue;
            }
            triangles.push(Triangle::new(v0, v1, v2, material.clone()));
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {} degenerate triangles in {}", skipped, path.display());
    }
    log::info!(
        "Loaded {} triangles from {} ({} models)",
        triangles.len(),
        path.display(),
        models.len()
    );

    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Hittable;
    use umbra_core::Color;
    use umbra_math::{Interval, Ray};

    const QUAD: &str = "\
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
v 0 0 0
f 1 2 3 4
f 1 5 3
";

    #[test]
    fn test_load_quad_triangulated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(&path, QUAD).unwrap();

        let material = Arc::new(Material::diffuse(Color::ONE));
        let triangles = load_obj(&path, Vec3::new(0.0, 0.0, -2.0), 2.0, material).unwrap();

        // The quad becomes two triangles; 1-5-3 is collinear and dropped
        assert_eq!(triangles.len(), 2);

        // Scaled to [-2, 2] and moved to z = -2
        let ray = Ray::new(Vec3::new(1.5, 1.0, 0.0), -Vec3::Z);
        let hit = triangles
            .iter()
            .find_map(|t| t.hit(&ray, Interval::new(0.001, f32::INFINITY)))
            .unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_load_missing_file() {
        let material = Arc::new(Material::diffuse(Color::ONE));
        let err = load_obj(Path::new("/nonexistent/mesh.obj"), Vec3::ZERO, 1.0, material)
            .unwrap_err();
        assert!(matches!(err, RenderError::Mesh { .. }));
    }
}
