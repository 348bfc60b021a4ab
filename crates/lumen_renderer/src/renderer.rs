//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive radiance estimation with a bounce budget
//! - Gamma correction and 8-bit quantization
//! - Scanline-ordered output with pixels sampled in parallel

use std::io::Write;
use std::time::Instant;

use lumen_core::PpmWriter;
use lumen_math::{Color, Interval, Ray};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sampling::gen_f32;
use crate::{Camera, ConfigError, Hittable, RenderError};

/// Lower bound of every scene query, so scattered rays do not re-hit the
/// surface they leave.
pub const T_MIN: f32 = 0.001;

/// What a ray sees when it leaves the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Vertical white-to-blue gradient.
    #[default]
    Sky,
    /// A constant color; black for scenes lit only by emitters.
    Solid(Color),
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Sky => sky_gradient(ray),
            Background::Solid(color) => *color,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels; the height follows from the aspect ratio
    pub image_width: u32,
    pub aspect_ratio: f32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    pub background: Background,
    /// Fixes every pixel's random stream; `None` draws a fresh seed
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Background::Sky,
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Height in pixels, never less than one.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(ConfigError::InvalidAspectRatio(self.aspect_ratio));
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color. `depth` is the
/// remaining bounce budget; at zero no light is gathered.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::from_min(T_MIN), rng) else {
        return config.background.color(ray);
    };

    // Get emission from material (for lights)
    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, depth - 1, config, rng);
            emission + result.attenuation * scattered_color
        }
        // Absorbed or emitter: the path ends here
        None => emission,
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize_or_zero();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// `(x, y)` counts from the top-left corner. Returns the linear average of
/// `samples_per_pixel` samples; samples that came back NaN or infinite
/// contribute nothing.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let width = config.image_width;
    let height = config.image_height();
    // Viewport rows run bottom to top.
    let row = height.saturating_sub(y + 1);
    let s_span = width.saturating_sub(1).max(1) as f32;
    let t_span = height.saturating_sub(1).max(1) as f32;

    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let s = (x as f32 + gen_f32(rng)) / s_span;
        let t = (row as f32 + gen_f32(rng)) / t_span;
        let ray = camera.get_ray(s, t, rng);
        let sample = ray_color(&ray, world, config.max_depth, config, rng);
        if sample.is_finite() {
            pixel_color += sample;
        }
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Generator for one pixel, derived from the render seed and the pixel's
/// position so results do not depend on thread scheduling.
fn pixel_rng(seed: u64, x: u32, y: u32) -> SmallRng {
    let position = (u64::from(y) << 32) | u64::from(x);
    SmallRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ position)
}

/// Render the image one scanline at a time, top row first.
///
/// Pixels within a scanline are sampled in parallel, each with its own
/// generator. `on_row` receives each finished row of linear colors in scan
/// order; an error from it stops the render.
pub fn render_scanlines<E>(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    mut on_row: impl FnMut(u32, &[Color]) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<ConfigError>,
{
    config.validate()?;

    let width = config.image_width;
    let height = config.image_height();
    let seed = config.seed.unwrap_or_else(rand::random);

    log::info!(
        "Rendering {}x{}, {} spp, max depth {}",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth
    );
    log::debug!("Render seed: {}", seed);
    let start = Instant::now();

    let mut row = Vec::with_capacity(width as usize);
    for y in 0..height {
        log::debug!("Scanlines remaining: {}", height - y);

        (0..width)
            .into_par_iter()
            .map(|x| {
                let mut rng = pixel_rng(seed, x, y);
                render_pixel(camera, world, x, y, config, &mut rng)
            })
            .collect_into_vec(&mut row);

        on_row(y, &row)?;
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(())
}

/// Linear color image held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Gamma-corrected 8-bit pixels in row-major order.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|&c| color_to_rgb8(c)).collect()
    }
}

/// Render the entire scene to an image buffer.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> Result<ImageBuffer, ConfigError> {
    let mut image = ImageBuffer::new(config.image_width, config.image_height());

    render_scanlines(camera, world, config, |y, row| {
        let start = image.index(0, y);
        image.pixels[start..start + row.len()].copy_from_slice(row);
        Ok::<(), ConfigError>(())
    })?;

    Ok(image)
}

/// Render the scene and stream it to `out` as a `P3` PPM, one scanline at a
/// time. Returns the writer once the last row is flushed.
pub fn render_to_ppm<W: Write>(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    out: W,
) -> Result<W, RenderError> {
    config.validate()?;

    let mut ppm = PpmWriter::new(out, config.image_width, config.image_height())?;
    let mut quantized = Vec::with_capacity(config.image_width as usize);

    render_scanlines(camera, world, config, |_, row| {
        quantized.clear();
        quantized.extend(row.iter().map(|&c| color_to_rgb8(c)));
        ppm.write_row(&quantized)?;
        Ok::<(), RenderError>(())
    })?;

    Ok(ppm.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisRect, BvhNode, DiffuseLight, HittableList, Lambertian, Material, Sphere, Vec3};
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn gray_sphere_world() -> HittableList {
        let gray: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.5, 0.5, 0.5)));
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray).unwrap()));
        world
    }

    fn forward_camera(aspect: f32) -> Camera {
        let mut camera = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .with_aspect_ratio(aspect);
        camera.initialize();
        camera
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            image_width: 16,
            aspect_ratio: 1.0,
            samples_per_pixel: 4,
            max_depth: 5,
            background: Background::Sky,
            seed: Some(7),
        }
    }

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let up_color = sky_gradient(&up_ray);

        // Ray pointing down should be more white (more red)
        let down_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 0.0);
        let down_color = sky_gradient(&down_ray);

        assert!((up_color - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down_color - Color::ONE).length() < 1e-6);
        assert!(up_color.x < down_color.x);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert_eq!(linear_to_gamma(f32::NAN), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(100.0)), [255, 255, 255]);
        // sqrt(0.25) * 256 = 128
        assert_eq!(color_to_rgb8(Color::new(0.25, -3.0, f32::NAN)), [128, 0, 0]);
    }

    #[test]
    fn test_zero_depth_gathers_nothing() {
        let world = gray_sphere_world();
        let config = RenderConfig {
            max_depth: 0,
            ..small_config()
        };
        let mut rng = StdRng::seed_from_u64(1);

        for dir in [Vec3::new(0.0, 0.0, -1.0), Vec3::Y, Vec3::new(1.0, -0.3, 0.2)] {
            let ray = Ray::new(Vec3::ZERO, dir, 0.0);
            assert_eq!(ray_color(&ray, &world, 0, &config, &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_miss_returns_background() {
        let world = gray_sphere_world();
        let mut config = small_config();
        let mut rng = StdRng::seed_from_u64(2);
        let up = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);

        assert_eq!(ray_color(&up, &world, 5, &config, &mut rng), sky_gradient(&up));

        config.background = Background::Solid(Color::new(0.1, 0.2, 0.3));
        assert_eq!(ray_color(&up, &world, 5, &config, &mut rng), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_emitter_facing_camera_returns_emission() {
        let emit = Color::new(0.9, 0.5, 0.2);
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(emit));
        let mut world = HittableList::new();
        world.add(Arc::new(AxisRect::xy(-10.0, 10.0, -10.0, 10.0, -1.0, light).unwrap()));

        let camera = forward_camera(1.0);
        let config = RenderConfig {
            samples_per_pixel: 64,
            background: Background::Solid(Color::ZERO),
            ..small_config()
        };
        let mut rng = StdRng::seed_from_u64(3);

        for (x, y) in [(0, 0), (8, 8), (15, 3)] {
            let color = render_pixel(&camera, &world, x, y, &config, &mut rng);
            assert!((color - emit).length() < 1e-5, "pixel ({}, {}) = {:?}", x, y, color);
        }
    }

    #[test]
    fn test_one_bounce_diffuse_sphere_under_sky() {
        let world = gray_sphere_world();
        let camera = forward_camera(1.0);
        let config = RenderConfig {
            image_width: 9,
            samples_per_pixel: 1,
            max_depth: 2,
            ..small_config()
        };
        let mut rng = StdRng::seed_from_u64(4);

        // The center pixel sees the sphere, then one diffuse bounce into the sky.
        let center = render_pixel(&camera, &world, 4, 4, &config, &mut rng);
        let background = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0));
        for i in 0..3 {
            assert!(center[i] > 0.0, "{:?}", center);
            assert!(center[i] < background[i], "{:?} vs {:?}", center, background);
        }
    }

    #[test]
    fn test_single_depth_frame_lies_between_black_and_sky() {
        let world = gray_sphere_world();
        let empty = HittableList::new();
        let camera = forward_camera(1.0);
        let config = RenderConfig {
            samples_per_pixel: 1,
            max_depth: 1,
            ..small_config()
        };

        let image = render(&camera, &world, &config).unwrap();
        let sky = render(&camera, &empty, &config).unwrap();

        // Same seed, same camera rays: every pixel is either absorbed or sky.
        let mut absorbed = 0;
        for (pixel, background) in image.pixels.iter().zip(&sky.pixels) {
            if *pixel == Color::ZERO {
                absorbed += 1;
            } else {
                assert_eq!(pixel, background);
            }
        }
        assert!(absorbed > 0 && absorbed < image.pixels.len());

        let total = |img: &ImageBuffer| img.pixels.iter().copied().sum::<Color>();
        let (lit, open) = (total(&image), total(&sky));
        for i in 0..3 {
            assert!(lit[i] > 0.0 && lit[i] < open[i]);
        }
    }

    #[test]
    fn test_seeded_render_is_reproducible() {
        let mut rng = StdRng::seed_from_u64(5);
        let objects: Vec<Arc<dyn crate::Hittable>> = gray_sphere_world().into_objects();
        let world = BvhNode::new(objects, &mut rng).unwrap();
        let camera = forward_camera(1.0);
        let config = small_config();

        let a = render(&camera, &world, &config).unwrap();
        let b = render(&camera, &world, &config).unwrap();
        assert_eq!(a, b);

        let other = render(&camera, &world, &RenderConfig { seed: Some(8), ..config }).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_rows_arrive_in_scan_order() {
        let world = gray_sphere_world();
        let camera = forward_camera(2.0);
        let config = RenderConfig {
            image_width: 12,
            aspect_ratio: 2.0,
            samples_per_pixel: 1,
            ..small_config()
        };

        let mut seen = Vec::new();
        render_scanlines(&camera, &world, &config, |y, row| {
            assert_eq!(row.len(), 12);
            seen.push(y);
            Ok::<(), ConfigError>(())
        })
        .unwrap();

        assert_eq!(seen, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_top_row_looks_up() {
        let world = HittableList::new();
        let camera = forward_camera(1.0);
        let config = RenderConfig {
            samples_per_pixel: 8,
            ..small_config()
        };

        let image = render(&camera, &world, &config).unwrap();
        // The sky is bluer (less red) toward the top of the frame.
        assert!(image.get(8, 0).x < image.get(8, 15).x);
    }

    #[test]
    fn test_render_to_ppm() {
        let world = gray_sphere_world();
        let camera = forward_camera(2.0);
        let config = RenderConfig {
            image_width: 4,
            aspect_ratio: 2.0,
            samples_per_pixel: 2,
            ..small_config()
        };

        let out = render_to_ppm(&camera, &world, &config, Vec::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("4 2"));
        assert_eq!(lines.next(), Some("255"));
        assert_eq!(lines.clone().count(), 8);

        let image = render(&camera, &world, &config).unwrap();
        for (line, rgb) in lines.zip(image.to_rgb8()) {
            assert_eq!(line, format!("{} {} {}", rgb[0], rgb[1], rgb[2]));
        }
    }

    #[test]
    fn test_invalid_config_is_rejected_before_rendering() {
        let world = gray_sphere_world();
        let camera = forward_camera(1.0);

        let zero_spp = RenderConfig {
            samples_per_pixel: 0,
            ..small_config()
        };
        assert_eq!(render(&camera, &world, &zero_spp), Err(ConfigError::ZeroSamples));

        let bad_aspect = RenderConfig {
            aspect_ratio: -1.0,
            ..small_config()
        };
        assert!(matches!(
            render_to_ppm(&camera, &world, &bad_aspect, Vec::new()),
            Err(RenderError::Config(ConfigError::InvalidAspectRatio(_)))
        ));
    }

    #[test]
    fn test_config_defaults_and_height() {
        let config = RenderConfig::default();
        assert_eq!(config.image_width, 400);
        assert_eq!(config.image_height(), 225);
        assert!(config.validate().is_ok());

        let sliver = RenderConfig {
            image_width: 3,
            aspect_ratio: 10.0,
            ..RenderConfig::default()
        };
        assert_eq!(sliver.image_height(), 1);
    }

    #[test]
    fn test_config_from_json() {
        let config: RenderConfig = serde_json::from_str(
            r#"{ "image_width": 600, "aspect_ratio": 1.0, "background": { "solid": [0.0, 0.0, 0.0] }, "seed": 3 }"#,
        )
        .unwrap();

        assert_eq!(config.image_width, 600);
        assert_eq!(config.image_height(), 600);
        assert_eq!(config.samples_per_pixel, 100);
        assert_eq!(config.background, Background::Solid(Color::ZERO));
        assert_eq!(config.seed, Some(3));

        let sky: RenderConfig = serde_json::from_str(r#"{ "background": "sky" }"#).unwrap();
        assert_eq!(sky.background, Background::Sky);
    }

    #[test]
    fn test_pixel_index_does_not_wrap_past_u32() {
        let image = ImageBuffer {
            width: 70_000,
            height: 70_000,
            pixels: Vec::new(),
        };
        // 70_000 * 70_000 is past u32::MAX; the index must keep the high bits.
        assert_eq!(image.index(5, 69_999), 69_999 * 70_000 + 5);
        assert_eq!(image.index(0, 1), 70_000);
    }
}
