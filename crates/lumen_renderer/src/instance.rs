//! Transform decorators: re-express a ray in a child's local frame, query
//! the child, and map the hit back to world space.

use std::sync::Arc;

use lumen_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{HitRecord, Hittable};

/// Moves a child object by a fixed offset.
pub struct Translate {
    object: Arc<dyn Hittable>,
    offset: Vec3,
    bbox: Option<Aabb>,
}

impl Translate {
    pub fn new(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        let bbox = object.bounding_box().map(|b| b.translate(offset));
        Self { object, offset, bbox }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let moved = ray.with_origin(ray.origin() - self.offset);
        let mut rec = self.object.hit(&moved, ray_t, rng)?;
        // Direction is unchanged, so normal and face orientation carry over.
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}

/// Rotation by a fixed angle about one coordinate axis.
#[derive(Debug, Clone, Copy)]
struct Rotation {
    /// Indices (p, q) of the rotated plane, ordered so that a positive angle
    /// turns p toward q (right-handed about the axis).
    p: usize,
    q: usize,
    sin: f32,
    cos: f32,
}

impl Rotation {
    fn new(axis: Axis, degrees: f32) -> Self {
        let (p, q) = match axis {
            Axis::X => (1, 2),
            Axis::Y => (2, 0),
            Axis::Z => (0, 1),
        };
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self { p, q, sin, cos }
    }

    fn apply(&self, v: Vec3, sin: f32) -> Vec3 {
        let (vp, vq) = (v[self.p], v[self.q]);
        let mut out = v;
        out[self.p] = self.cos * vp - sin * vq;
        out[self.q] = sin * vp + self.cos * vq;
        out
    }

    /// Child space to world space.
    fn to_world(&self, v: Vec3) -> Vec3 {
        self.apply(v, self.sin)
    }

    /// World space to child space.
    fn to_object(&self, v: Vec3) -> Vec3 {
        self.apply(v, -self.sin)
    }
}

/// Rotates a child object about a coordinate axis through the origin.
///
/// The bounding box is the envelope of the child's eight rotated corners,
/// computed once here. A child without bounds yields a rotation without
/// bounds.
pub struct Rotate {
    object: Arc<dyn Hittable>,
    rotation: Rotation,
    bbox: Option<Aabb>,
}

impl Rotate {
    pub fn new(object: Arc<dyn Hittable>, axis: Axis, degrees: f32) -> Self {
        let rotation = Rotation::new(axis, degrees);
        let bbox = object
            .bounding_box()
            .and_then(|b| Aabb::enclosing(b.corners().into_iter().map(|c| rotation.to_world(c))));

        Self {
            object,
            rotation,
            bbox,
        }
    }

    pub fn x(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(object, Axis::X, degrees)
    }

    pub fn y(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(object, Axis::Y, degrees)
    }

    pub fn z(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(object, Axis::Z, degrees)
    }
}

impl Hittable for Rotate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local = Ray::new(
            self.rotation.to_object(ray.origin()),
            self.rotation.to_object(ray.direction()),
            ray.time(),
        );

        let mut rec = self.object.hit(&local, ray_t, rng)?;
        // Rotation preserves dot products, so front_face still holds.
        rec.p = self.rotation.to_world(rec.p);
        rec.normal = self.rotation.to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Cuboid, HittableList, Lambertian, Material, Sphere};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    }

    #[test]
    fn test_translate_matches_shifted_query() {
        let mut rng = StdRng::seed_from_u64(17);
        let child: Arc<dyn Hittable> =
            Arc::new(Cuboid::new(Vec3::ZERO, Vec3::new(2.0, 3.0, 1.0), gray()).unwrap());
        let offset = Vec3::new(4.0, -1.0, 2.5);
        let translated = Translate::new(Arc::clone(&child), offset);
        let interval = Interval::from_min(0.001);

        let mut hits = 0;
        for _ in 0..500 {
            let origin = random_point(&mut rng, 10.0);
            let target = offset + random_point(&mut rng, 3.0);
            let ray = Ray::new(origin, target - origin, 0.0);
            let shifted = ray.with_origin(origin - offset);

            let direct = translated.hit(&ray, interval, &mut rng);
            let reference = child.hit(&shifted, interval, &mut rng);
            match (direct, reference) {
                (Some(a), Some(b)) => {
                    hits += 1;
                    assert_eq!(a.t, b.t);
                    assert_eq!(a.p, b.p + offset);
                    assert_eq!(a.normal, b.normal);
                    assert_eq!(a.front_face, b.front_face);
                }
                (None, None) => {}
                _ => panic!("translate disagreed with shifted query"),
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_translate_bbox() {
        let child: Arc<dyn Hittable> = Arc::new(Sphere::new(Vec3::ZERO, 1.0, gray()).unwrap());
        let translated = Translate::new(child, Vec3::new(10.0, 0.0, 0.0));
        let bbox = translated.bounding_box().unwrap();

        assert_eq!(bbox.min(), Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(bbox.max(), Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut rng = StdRng::seed_from_u64(23);
        for axis in Axis::ALL {
            let rotation = Rotation::new(axis, rng.gen_range(-180.0..180.0));
            for _ in 0..50 {
                let v = random_point(&mut rng, 100.0);
                let back = rotation.to_world(rotation.to_object(v));
                assert!((back - v).length() < 1e-3);
                // The rotation axis component is untouched.
                assert_eq!(axis.of(rotation.to_world(v)), axis.of(v));
            }
        }
    }

    #[test]
    fn test_rotation_is_right_handed() {
        let about_y = Rotation::new(Axis::Y, 90.0);
        assert!((about_y.to_world(Vec3::Z) - Vec3::X).length() < 1e-6);
        let about_z = Rotation::new(Axis::Z, 90.0);
        assert!((about_z.to_world(Vec3::X) - Vec3::Y).length() < 1e-6);
        let about_x = Rotation::new(Axis::X, 90.0);
        assert!((about_x.to_world(Vec3::Y) - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_rotate_y_moves_child() {
        let child: Arc<dyn Hittable> =
            Arc::new(Sphere::new(Vec3::new(2.0, 0.0, 0.0), 0.5, gray()).unwrap());
        // +90 degrees about Y carries +X to -Z.
        let rotated = Rotate::y(child, 90.0);
        let mut rng = StdRng::seed_from_u64(0);
        let interval = Interval::from_min(0.001);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = rotated.hit(&ray, interval, &mut rng).unwrap();
        assert!((rec.t - 1.5).abs() < 1e-4);
        assert!((rec.p - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-4);
        assert!((rec.normal - Vec3::Z).length() < 1e-4);
        assert!(rec.front_face);

        let old_spot = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        assert!(rotated.hit(&old_spot, interval, &mut rng).is_none());
    }

    #[test]
    fn test_rotate_bbox_envelopes_corners() {
        let child: Arc<dyn Hittable> =
            Arc::new(Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0), gray()).unwrap());
        let rotated = Rotate::z(child, 45.0);
        let bbox = rotated.bounding_box().unwrap();
        let half_diagonal = 2.0_f32.sqrt();

        assert!((bbox.x.max - half_diagonal).abs() < 1e-4);
        assert!((bbox.y.min + half_diagonal).abs() < 1e-4);
        assert!((bbox.z.max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_unbounded_child_has_no_bbox() {
        let child: Arc<dyn Hittable> = Arc::new(HittableList::new());
        assert!(Rotate::x(child, 30.0).bounding_box().is_none());
    }
}
