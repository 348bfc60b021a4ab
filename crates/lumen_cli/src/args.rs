//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use lumen_renderer::RenderConfig;

use crate::scenes::SceneKind;

pub const USAGE: &str = "\
Usage: lumen [OPTIONS]

Options:
  --scene NAME      Scene to render (default: cornell-smoke)
  --config FILE     JSON render settings applied over the scene's defaults
  --width N         Image width in pixels
  --spp N           Samples per pixel
  --depth N         Maximum bounce depth
  --seed N          Seed for a reproducible image
  --assets DIR      Directory searched for texture images (default: .)
  --output FILE     Write the PPM here instead of stdout
  --list-scenes     Print the available scene names
  -h, --help        Print this message";

/// Parsed command line. Options left unset fall back to the scene preset or
/// the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub scene: SceneKind,
    pub config: Option<PathBuf>,
    pub width: Option<u32>,
    pub samples_per_pixel: Option<u32>,
    pub max_depth: Option<u32>,
    pub seed: Option<u64>,
    pub assets: PathBuf,
    pub output: Option<PathBuf>,
    pub list_scenes: bool,
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            scene: SceneKind::CornellSmoke,
            config: None,
            width: None,
            samples_per_pixel: None,
            max_depth: None,
            seed: None,
            assets: PathBuf::from("."),
            output: None,
            list_scenes: false,
            help: false,
        }
    }
}

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            // Accept both `--flag value` and `--flag=value`.
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = || -> Result<String> {
                match &inline {
                    Some(v) => Ok(v.clone()),
                    None => args.next().ok_or_else(|| anyhow!("{} needs a value", flag)),
                }
            };

            match flag.as_str() {
                "--scene" => parsed.scene = value()?.parse()?,
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--width" => parsed.width = Some(parse_number(&flag, &value()?)?),
                "--spp" => parsed.samples_per_pixel = Some(parse_number(&flag, &value()?)?),
                "--depth" => parsed.max_depth = Some(parse_number(&flag, &value()?)?),
                "--seed" => parsed.seed = Some(parse_number(&flag, &value()?)?),
                "--assets" => parsed.assets = PathBuf::from(value()?),
                "--output" | "-o" => parsed.output = Some(PathBuf::from(value()?)),
                "--list-scenes" => parsed.list_scenes = true,
                "--help" | "-h" => parsed.help = true,
                other => bail!("unrecognized argument '{}'\n\n{}", other, USAGE),
            }
        }

        Ok(parsed)
    }

    /// Apply explicit command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(width) = self.width {
            config.image_width = width;
        }
        if let Some(spp) = self.samples_per_pixel {
            config.samples_per_pixel = spp;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}

fn parse_number<T>(flag: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value '{}' for {}", value, flag))
}
