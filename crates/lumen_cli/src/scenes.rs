//! Demo scene catalogue.
//!
//! Each scene supplies its geometry, its camera placement and the render
//! settings it looks best with. The settings are only a starting point; the
//! config file and command-line flags override them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use lumen_core::ImageCache;
use lumen_renderer::sampling::{gen_f32, gen_range_f32, random_vec3};
use lumen_renderer::{
    AxisRect, Background, BvhNode, Camera, CheckerTexture, Color, ConstantMedium, Cuboid,
    Dielectric, DiffuseLight, Hittable, HittableList, ImageTexture, Lambertian, Material, Metal,
    MovingSphere, NoiseTexture, RenderConfig, Rotate, Sphere, Texture, Translate, Vec3,
};
use rand::RngCore;

/// Sky color used by the outdoor scenes.
const DAYLIGHT: Color = Color::new(0.70, 0.80, 1.00);

/// File name of the earth texture, resolved against the asset directory.
pub const EARTH_TEXTURE: &str = "earthmap.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Random,
    TwoSpheres,
    TwoPerlinSpheres,
    Earth,
    SimpleLight,
    Cornell,
    CornellSmoke,
}

impl SceneKind {
    pub const ALL: [SceneKind; 7] = [
        SceneKind::Random,
        SceneKind::TwoSpheres,
        SceneKind::TwoPerlinSpheres,
        SceneKind::Earth,
        SceneKind::SimpleLight,
        SceneKind::Cornell,
        SceneKind::CornellSmoke,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Random => "random",
            SceneKind::TwoSpheres => "two-spheres",
            SceneKind::TwoPerlinSpheres => "two-perlin-spheres",
            SceneKind::Earth => "earth",
            SceneKind::SimpleLight => "simple-light",
            SceneKind::Cornell => "cornell",
            SceneKind::CornellSmoke => "cornell-smoke",
        }
    }

    /// Preferred render settings for this scene.
    pub fn preset(self) -> RenderConfig {
        let outdoor = RenderConfig {
            image_width: 1000,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 500,
            max_depth: 50,
            background: Background::Solid(DAYLIGHT),
            seed: None,
        };
        let cornell = RenderConfig {
            image_width: 600,
            aspect_ratio: 1.0,
            samples_per_pixel: 200,
            ..outdoor.clone()
        };

        match self {
            SceneKind::Random | SceneKind::TwoSpheres | SceneKind::TwoPerlinSpheres | SceneKind::Earth => {
                outdoor
            }
            SceneKind::SimpleLight => RenderConfig {
                samples_per_pixel: 400,
                background: Background::Solid(Color::ZERO),
                ..outdoor
            },
            SceneKind::Cornell => RenderConfig {
                background: Background::Solid(Color::ZERO),
                ..cornell
            },
            SceneKind::CornellSmoke => cornell,
        }
    }

    fn view(self) -> View {
        let outdoor = View {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vfov: 20.0,
            aperture: 0.0,
        };
        let cornell = View {
            look_from: Vec3::new(278.0, 278.0, -800.0),
            look_at: Vec3::new(278.0, 278.0, 0.0),
            vfov: 40.0,
            ..outdoor
        };

        match self {
            SceneKind::Random => View {
                aperture: 0.1,
                ..outdoor
            },
            SceneKind::TwoSpheres | SceneKind::TwoPerlinSpheres | SceneKind::Earth => outdoor,
            SceneKind::SimpleLight => View {
                look_from: Vec3::new(26.0, 3.0, 6.0),
                look_at: Vec3::new(0.0, 2.0, 0.0),
                ..outdoor
            },
            SceneKind::Cornell | SceneKind::CornellSmoke => cornell,
        }
    }

    /// Build the scene's geometry and camera for the given settings.
    ///
    /// `rng` drives scene randomness (sphere placement, noise tables) and BVH
    /// construction; `images` resolves texture files.
    pub fn build(
        self,
        config: &RenderConfig,
        images: &mut ImageCache,
        rng: &mut dyn RngCore,
    ) -> Result<Scene> {
        let objects = match self {
            SceneKind::Random => random_spheres(rng)?,
            SceneKind::TwoSpheres => two_spheres()?,
            SceneKind::TwoPerlinSpheres => two_perlin_spheres(rng)?,
            SceneKind::Earth => earth(images)?,
            SceneKind::SimpleLight => simple_light(rng)?,
            SceneKind::Cornell => cornell_box(false)?,
            SceneKind::CornellSmoke => cornell_box(true)?,
        };

        log::info!("Scene '{}': {} top-level objects", self.name(), objects.len());

        let world = BvhNode::from_list(objects, rng)
            .with_context(|| format!("failed to build BVH for scene '{}'", self.name()))?;

        Ok(Scene {
            world,
            camera: self.view().camera(config.aspect_ratio),
        })
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        SceneKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = SceneKind::ALL.iter().map(|k| k.name()).collect();
                anyhow!("unknown scene '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// A built scene, ready to render.
pub struct Scene {
    pub world: BvhNode,
    pub camera: Camera,
}

/// Camera placement for a scene.
#[derive(Debug, Clone, Copy)]
struct View {
    look_from: Vec3,
    look_at: Vec3,
    vfov: f32,
    aperture: f32,
}

impl View {
    const FOCUS_DIST: f32 = 10.0;

    fn camera(self, aspect_ratio: f32) -> Camera {
        let mut camera = Camera::new()
            .with_position(self.look_from, self.look_at, Vec3::Y)
            .with_lens(self.vfov, self.aperture, Self::FOCUS_DIST)
            .with_aspect_ratio(aspect_ratio)
            .with_shutter(0.0, 1.0);
        camera.initialize();
        camera
    }
}

fn lambertian(albedo: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(albedo))
}

fn ground_checker() -> Arc<dyn Texture> {
    Arc::new(CheckerTexture::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ))
}

/// Many small spheres of random material around three large ones.
fn random_spheres(rng: &mut dyn RngCore) -> Result<HittableList> {
    let mut world = HittableList::new();

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(ground_checker()));
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)?));

    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat = gen_f32(rng);
            if choose_mat < 0.8 {
                // Diffuse, bouncing upward during the shutter
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                let center2 = center + Vec3::new(0.0, gen_range_f32(rng, 0.0, 0.5), 0.0);
                world.add(Arc::new(MovingSphere::new(
                    (center, 0.0),
                    (center2, 1.0),
                    0.2,
                    lambertian(albedo),
                )?));
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range_f32(rng, 0.0, 0.5);
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))?));
            } else {
                // Glass
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))?));
            }
        }
    }

    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )?));
    world.add(Arc::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    )?));
    world.add(Arc::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )?));

    Ok(world)
}

fn two_spheres() -> Result<HittableList> {
    let checker: Arc<dyn Material> = Arc::new(Lambertian::new(ground_checker()));

    let mut objects = HittableList::new();
    objects.add(Arc::new(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0, Arc::clone(&checker))?));
    objects.add(Arc::new(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0, checker)?));
    Ok(objects)
}

/// Ground and a sphere sharing one marble material.
fn marble_pair(rng: &mut dyn RngCore) -> Result<HittableList> {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(4.0, rng))));

    let mut objects = HittableList::new();
    objects.add(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::clone(&marble),
    )?));
    objects.add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble)?));
    Ok(objects)
}

fn two_perlin_spheres(rng: &mut dyn RngCore) -> Result<HittableList> {
    marble_pair(rng)
}

fn earth(images: &mut ImageCache) -> Result<HittableList> {
    let texture = ImageTexture::load(images, EARTH_TEXTURE);
    let surface: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(texture)));

    let mut objects = HittableList::new();
    objects.add(Arc::new(Sphere::new(Vec3::ZERO, 2.0, surface)?));
    Ok(objects)
}

fn simple_light(rng: &mut dyn RngCore) -> Result<HittableList> {
    let mut objects = marble_pair(rng)?;

    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(4.0)));
    objects.add(Arc::new(AxisRect::xy(3.0, 5.0, 1.0, 3.0, -2.0, Arc::clone(&light))?));
    objects.add(Arc::new(Sphere::new(Vec3::new(0.0, 7.0, 0.0), 2.0, light)?));
    Ok(objects)
}

/// Rotate a box about Y and move it into place.
fn placed_box(size: Vec3, degrees: f32, offset: Vec3, material: Arc<dyn Material>) -> Result<Arc<dyn Hittable>> {
    let cuboid: Arc<dyn Hittable> = Arc::new(Cuboid::new(Vec3::ZERO, size, material)?);
    let rotated: Arc<dyn Hittable> = Arc::new(Rotate::y(cuboid, degrees));
    Ok(Arc::new(Translate::new(rotated, offset)))
}

/// The Cornell box; with `smoke` the two blocks become black and white fog
/// under a larger, dimmer light.
fn cornell_box(smoke: bool) -> Result<HittableList> {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::new(0.73, 0.73, 0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));

    let mut objects = HittableList::new();
    objects.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)?));
    objects.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)?));

    if smoke {
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(7.0)));
        objects.add(Arc::new(AxisRect::xz(113.0, 443.0, 127.0, 432.0, 554.0, light)?));
    } else {
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(15.0)));
        objects.add(Arc::new(AxisRect::xz(213.0, 343.0, 227.0, 332.0, 554.0, light)?));
    }

    objects.add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, Arc::clone(&white))?));
    objects.add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, Arc::clone(&white))?));
    objects.add(Arc::new(AxisRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, Arc::clone(&white))?));

    let tall = placed_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        Arc::clone(&white),
    )?;
    let short = placed_box(
        Vec3::splat(165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white,
    )?;

    if smoke {
        objects.add(Arc::new(ConstantMedium::from_color(tall, 0.01, Color::ZERO)?));
        objects.add(Arc::new(ConstantMedium::from_color(short, 0.01, Color::ONE)?));
    } else {
        objects.add(tall);
        objects.add(short);
    }

    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_renderer::{Interval, Ray};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_names_round_trip() {
        for kind in SceneKind::ALL {
            assert_eq!(kind.name().parse::<SceneKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!("cornell_box".parse::<SceneKind>().is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        for kind in SceneKind::ALL {
            assert!(kind.preset().validate().is_ok(), "{}", kind);
        }
        assert_eq!(SceneKind::Cornell.preset().image_height(), 600);
        assert_eq!(SceneKind::Cornell.preset().background, Background::Solid(Color::ZERO));
        assert_eq!(SceneKind::Random.preset().image_height(), 562);
    }

    #[test]
    fn test_every_scene_builds() {
        let mut images = ImageCache::with_base_dir("/nonexistent/assets");
        for kind in SceneKind::ALL {
            let mut rng = StdRng::seed_from_u64(1);
            let scene = kind.build(&kind.preset(), &mut images, &mut rng).unwrap();
            assert!(scene.world.bounding_box().is_some(), "{}", kind);
        }
    }

    #[test]
    fn test_random_scene_population() {
        let mut rng = StdRng::seed_from_u64(2);
        let objects = random_spheres(&mut rng).unwrap();
        // ground + at most 22 x 22 small spheres + three large ones
        assert!(objects.len() > 400 && objects.len() <= 1 + 22 * 22 + 3);
    }

    #[test]
    fn test_cornell_camera_sees_back_wall() {
        let mut images = ImageCache::new();
        let mut rng = StdRng::seed_from_u64(3);
        let config = SceneKind::Cornell.preset();
        let scene = SceneKind::Cornell.build(&config, &mut images, &mut rng).unwrap();

        let ray = scene.camera.get_ray(0.5, 0.5, &mut rng);
        let rec = scene.world.hit(&ray, Interval::from_min(0.001), &mut rng).unwrap();
        // Straight ahead is the tall box's front or the back wall.
        assert!(rec.p.z > 0.0 && rec.p.z <= 555.0 + 1e-2);
        assert!((ray.origin() - Vec3::new(278.0, 278.0, -800.0)).length() < 1e-3);

        let up = Ray::new(Vec3::new(278.0, 278.0, 278.0), Vec3::Y, 0.0);
        let ceiling = scene.world.hit(&up, Interval::from_min(0.001), &mut rng).unwrap();
        // The light hangs just below the ceiling.
        assert!((ceiling.p.y - 554.0).abs() < 1e-2);
        assert!(ceiling.material.emitted(0.0, 0.0, ceiling.p).x > 1.0);
    }
}
