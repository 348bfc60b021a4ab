//! Lumen Renderer - CPU Monte Carlo path tracing
//!
//! Scene objects implement [`Hittable`] and are usually gathered under a
//! [`BvhNode`]. Surfaces carry a [`Material`], materials sample a
//! [`Texture`], and the [`renderer`] module turns a camera, a scene and a
//! [`RenderConfig`] into pixels.
//!
//! Every stochastic operation takes an explicit `&mut dyn RngCore`, so the
//! scene itself is immutable during a render and shared freely between
//! worker threads.

mod aarect;
mod bvh;
mod camera;
mod error;
mod hittable;
mod instance;
mod material;
mod medium;
pub mod perlin;
pub mod renderer;
pub mod sampling;
mod sphere;
pub mod texture;

pub use aarect::{AxisRect, Cuboid, Plane};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use error::{BuildError, ConfigError, GeometryError, RenderError};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{Rotate, Translate};
pub use material::{Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult};
pub use medium::ConstantMedium;
pub use renderer::{
    color_to_rgb8, ray_color, render, render_pixel, render_scanlines, render_to_ppm, Background,
    ImageBuffer, RenderConfig,
};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture};

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Axis, Color, Interval, Ray, Vec3};
