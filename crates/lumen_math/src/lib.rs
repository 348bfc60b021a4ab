//! Lumen math - value types shared by the path tracer.
//!
//! Vectors come straight from glam; rays, intervals and bounding boxes are
//! defined here so the renderer and I/O crates agree on one representation.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod axis;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use axis::Axis;
pub use interval::Interval;
pub use ray::Ray;

/// Linear RGB color. Components are nominally in [0, 1] but lights exceed 1.
pub type Color = Vec3;
