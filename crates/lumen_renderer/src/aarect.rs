//! Axis-aligned rectangles and boxes built from them.

use std::sync::Arc;

use lumen_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{GeometryError, HitRecord, Hittable, HittableList, Material};

/// Orientation of an axis-aligned rectangle, named by the plane it lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// The two in-plane axes (u then v) and the fixed axis.
    pub fn axes(self) -> (Axis, Axis, Axis) {
        match self {
            Plane::XY => (Axis::X, Axis::Y, Axis::Z),
            Plane::XZ => (Axis::X, Axis::Z, Axis::Y),
            Plane::YZ => (Axis::Y, Axis::Z, Axis::X),
        }
    }

    /// World point with in-plane coordinates (a, b) at fixed coordinate k.
    fn point(self, a: f32, b: f32, k: f32) -> Vec3 {
        match self {
            Plane::XY => Vec3::new(a, b, k),
            Plane::XZ => Vec3::new(a, k, b),
            Plane::YZ => Vec3::new(k, a, b),
        }
    }
}

/// A rectangle lying in a plane of constant x, y or z.
///
/// (u, v) is the fractional position inside the rectangle along its two
/// in-plane axes. The outward normal points along the positive fixed axis.
pub struct AxisRect {
    plane: Plane,
    a: Interval,
    b: Interval,
    k: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl AxisRect {
    pub fn new(
        plane: Plane,
        (a0, a1): (f32, f32),
        (b0, b1): (f32, f32),
        k: f32,
        material: Arc<dyn Material>,
    ) -> Result<Self, GeometryError> {
        // The negated comparison also rejects NaN bounds.
        if !(a0 < a1 && b0 < b1) || !k.is_finite() {
            return Err(GeometryError::EmptyRect { a0, a1, b0, b1 });
        }

        // from_points pads the zero-thickness axis
        let bbox = Aabb::from_points(plane.point(a0, b0, k), plane.point(a1, b1, k));

        Ok(Self {
            plane,
            a: Interval::new(a0, a1),
            b: Interval::new(b0, b1),
            k,
            material,
            bbox,
        })
    }

    /// Rectangle `[x0, x1] x [y0, y1]` in the plane z = k.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Result<Self, GeometryError> {
        Self::new(Plane::XY, (x0, x1), (y0, y1), k, material)
    }

    /// Rectangle `[x0, x1] x [z0, z1]` in the plane y = k.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Result<Self, GeometryError> {
        Self::new(Plane::XZ, (x0, x1), (z0, z1), k, material)
    }

    /// Rectangle `[y0, y1] x [z0, z1]` in the plane x = k.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Result<Self, GeometryError> {
        Self::new(Plane::YZ, (y0, y1), (z0, z1), k, material)
    }
}

impl Hittable for AxisRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let (a_axis, b_axis, k_axis) = self.plane.axes();

        // A ray parallel to the plane gives an infinite or NaN t and fails here.
        let t = (self.k - k_axis.of(ray.origin())) / k_axis.of(ray.direction());
        if !ray_t.contains(t) {
            return None;
        }

        let a = a_axis.of(ray.origin()) + t * a_axis.of(ray.direction());
        let b = b_axis.of(ray.origin()) + t * b_axis.of(ray.direction());
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        let uv = ((a - self.a.min) / self.a.size(), (b - self.b.min) / self.b.size());
        Some(HitRecord::new(ray, t, k_axis.unit(), &*self.material, uv))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

/// Axis-aligned box made of six rectangles sharing one material.
pub struct Cuboid {
    sides: HittableList,
    bbox: Aabb,
}

impl Cuboid {
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Result<Self, GeometryError> {
        if !p0.cmplt(p1).all() {
            return Err(GeometryError::InvertedBox {
                min: p0.to_array(),
                max: p1.to_array(),
            });
        }

        let mut sides = HittableList::new();
        let m = || Arc::clone(&material);

        sides.add(Arc::new(AxisRect::xy(p0.x, p1.x, p0.y, p1.y, p1.z, m())?));
        sides.add(Arc::new(AxisRect::xy(p0.x, p1.x, p0.y, p1.y, p0.z, m())?));

        sides.add(Arc::new(AxisRect::xz(p0.x, p1.x, p0.z, p1.z, p1.y, m())?));
        sides.add(Arc::new(AxisRect::xz(p0.x, p1.x, p0.z, p1.z, p0.y, m())?));

        sides.add(Arc::new(AxisRect::yz(p0.y, p1.y, p0.z, p1.z, p1.x, m())?));
        sides.add(Arc::new(AxisRect::yz(p0.y, p1.y, p0.z, p1.z, p0.x, m())?));

        Ok(Self {
            sides,
            bbox: Aabb::from_points(p0, p1),
        })
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}
