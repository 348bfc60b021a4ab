//! Construction-time errors.
//!
//! Everything here is raised before rendering starts. Numerical edge cases
//! during rendering are handled in place and never surface as errors.

use thiserror::Error;

/// A primitive was built with parameters that describe no valid shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("sphere radius must be finite and non-zero, got {0}")]
    InvalidRadius(f32),

    #[error("rectangle bounds are empty: [{a0}, {a1}] x [{b0}, {b1}]")]
    EmptyRect { a0: f32, a1: f32, b0: f32, b1: f32 },

    #[error("box corners are not ordered: min {min:?} max {max:?}")]
    InvertedBox { min: [f32; 3], max: [f32; 3] },

    #[error("medium density must be finite and positive, got {0}")]
    InvalidDensity(f32),

    #[error("shutter interval is reversed: open {open} close {close}")]
    ReversedShutter { open: f32, close: f32 },
}

/// The bounding volume hierarchy could not be built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("cannot build a BVH over zero objects")]
    Empty,

    #[error("object {index} has no bounding box")]
    MissingBoundingBox { index: usize },
}

/// Render settings that cannot produce an image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("image width must be at least 1")]
    ZeroWidth,

    #[error("samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("aspect ratio must be finite and positive, got {0}")]
    InvalidAspectRatio(f32),
}

/// A render could not be started or its output could not be written.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}
