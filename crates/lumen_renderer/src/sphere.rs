//! Sphere primitives for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{GeometryError, HitRecord, Hittable, Material};

/// A sphere primitive.
///
/// A negative radius is accepted and turns the sphere inside out: the
/// outward normal `(p - center) / radius` flips, which is how hollow glass
/// shells are modelled.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Result<Self, GeometryError> {
        check_radius(radius)?;
        let rvec = Vec3::splat(radius.abs());
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Ok(Self {
            center,
            radius,
            material,
            bbox,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center, self.radius, &*self.material, ray, ray_t)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

/// A sphere whose center moves linearly between two keyframes.
///
/// The center is evaluated at each ray's own time, producing motion blur
/// when rays are spread across the camera shutter.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl MovingSphere {
    pub fn new(
        (center0, time0): (Vec3, f32),
        (center1, time1): (Vec3, f32),
        radius: f32,
        material: Arc<dyn Material>,
    ) -> Result<Self, GeometryError> {
        check_radius(radius)?;
        if time1 < time0 {
            return Err(GeometryError::ReversedShutter {
                open: time0,
                close: time1,
            });
        }

        let rvec = Vec3::splat(radius.abs());
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Ok(Self {
            center0,
            center1,
            time0,
            time1,
            radius,
            material,
            bbox: Aabb::surrounding(&box0, &box1),
        })
    }

    /// Center position at `time`. Constant when the keyframes share a time.
    pub fn center(&self, time: f32) -> Vec3 {
        let span = self.time1 - self.time0;
        if span == 0.0 {
            return self.center0;
        }
        self.center0 + ((time - self.time0) / span) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center(ray.time()), self.radius, &*self.material, ray, ray_t)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

fn check_radius(radius: f32) -> Result<(), GeometryError> {
    if radius.is_finite() && radius != 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidRadius(radius))
    }
}

/// Closed-form ray/sphere test shared by both sphere kinds.
fn hit_sphere<'a>(
    center: Vec3,
    radius: f32,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.contains(root) {
        root = (h + sqrtd) / a;
        if !ray_t.contains(root) {
            return None;
        }
    }

    let p = ray.at(root);
    let outward_normal = (p - center) / radius;
    let uv = sphere_uv((p - center) / radius.abs());
    Some(HitRecord::new(ray, root, outward_normal, material, uv))
}

/// UV coordinates for a point on the unit sphere centered at the origin.
///
/// u runs around the Y axis starting at -X, v runs from -Y to +Y.
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}
