//! Errors raised while building or rendering a scene.

use std::path::PathBuf;

use thiserror::Error;
use umbra_core::SceneError;

/// Errors that can occur before or after a render.
///
/// Nothing in the integrator itself fails; every variant is raised either
/// while the scene is being built or when the finished image is written.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Failed to load mesh {path}: {source}")]
    Mesh {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
