//! Parallel render loop.
//!
//! Rows are handed to a rayon pool one at a time. Each row owns a random
//! stream seeded from the base seed and its index, so the image depends
//! only on the scene and the configuration, never on scheduling.

use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use umbra_core::{Color, RenderSettings};
use umbra_math::Vec2;

use crate::integrator::radiance;
use crate::sampling::{gen_f32, row_seed};
use crate::{ImageBuffer, RenderError, RenderResult, Scene};

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Path samples averaged per pixel
    pub samples_per_pixel: u32,
    /// Hard cap on intersections per path
    pub max_depth: u32,
    /// Bounces before Russian roulette may end a path
    pub roulette_min_depth: u32,
    /// Probability that a path survives each roulette draw
    pub roulette_continue: f32,
    /// Divide surviving paths by `roulette_continue`
    pub roulette_compensation: bool,
    /// Base seed for the per-row random streams
    pub seed: u64,
    /// Worker count; rayon picks one per core when `None`
    pub threads: Option<usize>,
    pub show_progress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            max_depth: 50,
            roulette_min_depth: 5,
            roulette_continue: 0.6,
            roulette_compensation: true,
            seed: 0,
            threads: None,
            show_progress: true,
        }
    }
}

impl RenderConfig {
    /// Take any overrides present in a scene file's `render` block.
    pub fn apply_settings(&mut self, settings: &RenderSettings) {
        if let Some(spp) = settings.samples_per_pixel {
            self.samples_per_pixel = spp;
        }
        if let Some(depth) = settings.max_depth {
            self.max_depth = depth;
        }
        if let Some(depth) = settings.roulette_min_depth {
            self.roulette_min_depth = depth;
        }
        if let Some(p) = settings.roulette_continue {
            self.roulette_continue = p;
        }
        if let Some(compensate) = settings.roulette_compensation {
            self.roulette_compensation = compensate;
        }
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(RenderError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if !(self.roulette_continue > 0.0 && self.roulette_continue <= 1.0) {
            return Err(RenderError::InvalidConfig(format!(
                "roulette_continue {} is outside (0, 1]",
                self.roulette_continue
            )));
        }
        if self.threads == Some(0) {
            return Err(RenderError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Average `samples_per_pixel` path estimates through jittered positions
/// inside pixel `(x, y)`.
pub fn render_pixel(
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let jitter = Vec2::new(gen_f32(rng), gen_f32(rng));
        let ray = scene
            .camera
            .generate_ray(Vec2::new(x as f32, y as f32) + jitter);
        pixel_color += radiance(&ray, &scene.world, &scene.background, config, rng);
    }

    pixel_color / config.samples_per_pixel as f32
}

/// Render the scene to a buffer of linear colors.
pub fn render(scene: &Scene, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    config.validate()?;

    let width = scene.camera.image_width;
    let height = scene.camera.image_height;
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidConfig(format!(
            "resolution {width}x{height} is empty"
        )));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    log::info!(
        "Rendering {}x{} at {} spp, max depth {} on {} threads",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        pool.current_num_threads()
    );
    if !config.roulette_compensation {
        log::warn!("Russian roulette compensation disabled, the estimate is biased");
    }

    let progress = if config.show_progress {
        let bar = ProgressBar::new(u64::from(height));
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rows")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let start = Instant::now();
    let mut pixels = vec![Color::ZERO; width as usize * height as usize];

    pool.install(|| {
        pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .with_max_len(1)
            .for_each(|(y, row)| {
                let y = y as u32;
                let mut rng = StdRng::seed_from_u64(row_seed(config.seed, y));
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = render_pixel(scene, x as u32, y, config, &mut rng);
                }
                progress.inc(1);
            });
    });

    progress.finish_and_clear();
    log::info!("Rendered in {:.2?}", start.elapsed());

    Ok(ImageBuffer::from_pixels(width, height, pixels))
}

/// Render the scene and write the gamma-encoded image to `path`.
pub fn render_to_file(scene: &Scene, path: &Path, config: &RenderConfig) -> RenderResult<()> {
    let image = render(scene, config)?;
    image.save(path)
}
