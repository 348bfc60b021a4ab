//! Constant-density participating media.

use std::sync::Arc;

use lumen_math::{Aabb, Color, Interval, Ray, Vec3};
use rand::RngCore;

use crate::material::Isotropic;
use crate::sampling::gen_f32;
use crate::texture::{SolidColor, Texture};
use crate::{GeometryError, HitRecord, Hittable};

/// Separation between the entry hit and the search for the exit hit.
const EXIT_EPSILON: f32 = 1e-4;

/// Fog or smoke filling the interior of a closed boundary.
///
/// A ray crossing the volume scatters at an exponentially distributed
/// distance; if that distance lies past the exit point the ray passes through.
/// The boundary must be convex for the entry/exit pairing to hold.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new(
        boundary: Arc<dyn Hittable>,
        density: f32,
        albedo: Arc<dyn Texture>,
    ) -> Result<Self, GeometryError> {
        if !(density.is_finite() && density > 0.0) {
            return Err(GeometryError::InvalidDensity(density));
        }

        Ok(Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::new(albedo),
        })
    }

    pub fn from_color(
        boundary: Arc<dyn Hittable>,
        density: f32,
        albedo: Color,
    ) -> Result<Self, GeometryError> {
        Self::new(boundary, density, Arc::new(SolidColor::new(albedo)))
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Entry and exit along the whole line, then clip to the query.
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + EXIT_EPSILON, f32::INFINITY), rng)?;

        let t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        let t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        // ln(0) gives an infinite distance, which correctly misses.
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            // arbitrary
            normal: Vec3::X,
            material: &self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }
}
