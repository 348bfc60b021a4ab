//! Textures: functions from surface coordinates to color.

use std::path::Path;
use std::sync::Arc;

use lumen_core::{ImageCache, TextureImage};
use lumen_math::{Color, Vec3};
use rand::RngCore;

use crate::perlin::Perlin;

/// Trait for anything that can color a surface point.
pub trait Texture: Send + Sync {
    /// Color at texture coordinates (u, v) and world-space point `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A single constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Color::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// 3D checkerboard alternating between two sub-textures.
///
/// Parity is the sign of `sin(fx)·sin(fy)·sin(fz)` for frequency `f`, so the
/// pattern is solid and independent of the surface parameterization.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    frequency: f32,
}

impl CheckerTexture {
    pub const DEFAULT_FREQUENCY: f32 = 10.0;

    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            even,
            odd,
            frequency: Self::DEFAULT_FREQUENCY,
        }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let f = self.frequency;
        let sines = (f * p.x).sin() * (f * p.y).sin() * (f * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like procedural texture driven by Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    /// Octaves summed by the turbulence term.
    const TURBULENCE_DEPTH: u32 = 7;

    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turbulence(p, Self::TURBULENCE_DEPTH);
        Color::splat(0.5) * (1.0 + phase.sin())
    }
}

/// Texture sampled from a decoded image with nearest-pixel lookup.
///
/// An image that failed to load leaves the texture empty; it then renders as
/// [`ImageTexture::FALLBACK`] so the problem is visible but not fatal.
pub struct ImageTexture {
    image: Option<Arc<TextureImage>>,
}

impl ImageTexture {
    /// Solid cyan shown where image data is missing.
    pub const FALLBACK: Color = Color::new(0.0, 1.0, 1.0);

    pub fn new(image: Arc<TextureImage>) -> Self {
        Self { image: Some(image) }
    }

    /// A texture with no image data.
    pub fn missing() -> Self {
        Self { image: None }
    }

    /// Load through `cache`, degrading to the fallback color on failure.
    pub fn load(cache: &mut ImageCache, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match cache.load(path) {
            Ok(image) => Self::new(image),
            Err(err) => {
                log::warn!(
                    "Could not load texture image '{}', using fallback color: {}",
                    path.display(),
                    err
                );
                Self::missing()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(image) = &self.image else {
            return Self::FALLBACK;
        };

        // Clamp to [0,1] and flip v into image row order.
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        // Truncation maps u == 1.0 one past the edge; pixel() clamps it back.
        let i = (u * image.width() as f32) as u32;
        let j = (v * image.height() as f32) as u32;

        let [r, g, b] = image.pixel(i, j);
        Color::new(r as f32, g as f32, b as f32) / 255.0
    }
}
