use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use umbra_core::SceneDescription;
use umbra_renderer::{render_to_file, RenderConfig, Scene};

/// Render a JSON scene with the Umbra path tracer.
#[derive(Parser, Debug)]
#[command(name = "umbra", version)]
struct Args {
    /// Scene file to render
    scene: PathBuf,

    /// Output image; the format follows the extension (BMP by default)
    #[arg(short, long, default_value = "render.bmp")]
    output: PathBuf,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum path length
    #[arg(long)]
    max_depth: Option<u32>,

    /// Base seed for the random streams
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (one per core by default)
    #[arg(long)]
    threads: Option<usize>,

    /// Skip the Russian roulette compensation (biased, slightly darker)
    #[arg(long)]
    biased_roulette: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Args {
    /// Defaults, then the scene's render block, then the command line.
    fn render_config(&self, scene: &SceneDescription) -> RenderConfig {
        let mut config = RenderConfig::default();
        config.apply_settings(&scene.render);

        if let Some(spp) = self.spp {
            config.samples_per_pixel = spp;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.biased_roulette {
            config.roulette_compensation = false;
        }
        config.threads = self.threads;
        config.show_progress = !self.no_progress;
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let start = Instant::now();

    let description = SceneDescription::load(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    let config = args.render_config(&description);
    log::debug!("{:?}", config);

    let scene = Scene::from_description(&description).context("Failed to build scene")?;
    log::info!("Scene ready in {:.2?}", start.elapsed());

    render_to_file(&scene, &args.output, &config)
        .with_context(|| format!("Failed to render {}", args.output.display()))?;

    log::info!("Done in {:.2?}", start.elapsed());
    Ok(())
}
