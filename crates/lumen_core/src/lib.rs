//! Lumen Core - I/O at the edges of the renderer.
//!
//! This crate provides:
//!
//! - **Texture images**: decoding image files into RGB byte buffers, with a
//!   path-keyed cache so shared images are decoded once
//! - **Raster output**: a streaming writer for the plain-text `P3` PPM format
//!
//! # Example
//!
//! ```no_run
//! use lumen_core::{ImageCache, PpmWriter};
//!
//! let mut cache = ImageCache::with_base_dir("assets");
//! let earth = cache.load("earthmap.jpg")?;
//! println!("earth map is {}x{}", earth.width(), earth.height());
//!
//! let mut ppm = PpmWriter::new(std::io::stdout(), 1, 1)?;
//! ppm.write_row(&[[255, 128, 0]])?;
//! ppm.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod image_source;
pub mod ppm;

pub use image_source::{ImageCache, ImageError, ImageResult, TextureImage};
pub use ppm::{write_ppm, PpmWriter};
