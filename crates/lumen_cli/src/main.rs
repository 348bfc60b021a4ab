mod args;
mod scenes;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use lumen_core::ImageCache;
use lumen_renderer::{render_to_ppm, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use args::{Args, USAGE};
use scenes::SceneKind;

/// Layer the keys of a JSON config file over the scene preset.
fn merge_config(preset: &RenderConfig, overrides: Value) -> Result<RenderConfig> {
    let Value::Object(overrides) = overrides else {
        bail!("render config must be a JSON object");
    };

    let mut merged = serde_json::to_value(preset)?;
    if let Value::Object(fields) = &mut merged {
        fields.extend(overrides);
    }

    serde_json::from_value(merged).context("invalid render config")
}

fn load_config(scene: SceneKind, path: Option<&Path>) -> Result<RenderConfig> {
    let preset = scene.preset();
    let Some(path) = path else {
        return Ok(preset);
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    merge_config(&preset, value).with_context(|| format!("in {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }
    if args.list_scenes {
        for kind in SceneKind::ALL {
            println!("{}", kind);
        }
        return Ok(());
    }

    let mut config = load_config(args.scene, args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    log::info!(
        "Scene '{}': {}x{}, {} spp, depth {}",
        args.scene,
        config.image_width,
        config.image_height(),
        config.samples_per_pixel,
        config.max_depth
    );

    // Scene construction gets its own generator so a fixed seed also fixes
    // sphere placement, noise tables and the BVH.
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut images = ImageCache::with_base_dir(&args.assets);
    let build_start = Instant::now();
    let scene = args.scene.build(&config, &mut images, &mut rng)?;
    log::info!("Scene built in {:.2?}", build_start.elapsed());

    let render_start = Instant::now();
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = render_to_ppm(&scene.camera, &scene.world, &config, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
            out.flush()?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = render_to_ppm(&scene.camera, &scene.world, &config, BufWriter::new(stdout.lock()))
                .context("failed to write image to stdout")?;
            out.flush()?;
        }
    }
    log::info!("Done in {:.2?}", render_start.elapsed());

    Ok(())
}
