//! Texture image loading and caching.
//!
//! Decodes image files into tightly packed 8-bit RGB buffers. Decoding is
//! the only fallible step; lookups into a loaded image never fail.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Bytes per pixel in a [`TextureImage`] buffer.
pub const BYTES_PER_PIXEL: usize = 3;

/// Errors that can occur while loading a texture image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image decoding error for {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image has no pixels: {0}")]
    EmptyImage(String),

    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type ImageResult<T> = Result<T, ImageError>;

/// A decoded image: row-major RGB triples, top row first.
#[derive(Clone, Debug)]
pub struct TextureImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
    /// Original file path (for diagnostics)
    path: String,
}

impl TextureImage {
    /// Wrap an existing RGB buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> ImageResult<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage("<raw>".to_string()));
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            path: "<raw>".to_string(),
        })
    }

    /// Decode an image file of any format the `image` crate understands.
    pub fn open(path: impl AsRef<Path>) -> ImageResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| ImageError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage(path.display().to_string()));
        }

        Ok(Self {
            width,
            height,
            data: rgb.into_raw(),
            path: path.to_string_lossy().to_string(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// RGB bytes at integer coordinates, clamped to the image edges.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let idx = (y * self.width as usize + x) * BYTES_PER_PIXEL;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Cache for loaded images, keyed by the path they were requested with.
///
/// Scenes that reuse one image for several textures decode it once.
#[derive(Default)]
pub struct ImageCache {
    images: HashMap<PathBuf, Arc<TextureImage>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache that resolves relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            images: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load an image, using the cache if it was loaded before.
    pub fn load(&mut self, path: impl AsRef<Path>) -> ImageResult<Arc<TextureImage>> {
        let key = path.as_ref().to_path_buf();
        if let Some(image) = self.images.get(&key) {
            return Ok(Arc::clone(image));
        }

        let image = Arc::new(TextureImage::open(self.resolve_path(&key))?);
        log::debug!(
            "Loaded texture image: {} ({}x{}, {:.1} KB)",
            image.path(),
            image.width,
            image.height,
            image.size_bytes() as f32 / 1024.0
        );
        self.images.insert(key, Arc::clone(&image));
        Ok(image)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
