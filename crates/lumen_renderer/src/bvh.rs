//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over shared scene objects. Each build picks a random split
//! axis per node, orders the objects along it and halves the range, giving a
//! tree balanced by object count.

use std::sync::Arc;

use lumen_math::{Aabb, Axis, Interval, Ray};
use rand::{Rng, RngCore};

use crate::{BuildError, HitRecord, Hittable, HittableList};

/// An object paired with its bounding box, captured once before building.
struct Entry {
    object: Arc<dyn Hittable>,
    bbox: Aabb,
}

/// Interior node of the hierarchy.
///
/// A node built over a single object stores that object as both children.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over `objects`.
    ///
    /// `rng` chooses the split axis at every node, so a seeded generator
    /// gives a reproducible tree shape. Fails if `objects` is empty or any
    /// object cannot report a bounding box.
    pub fn new(objects: Vec<Arc<dyn Hittable>>, rng: &mut dyn RngCore) -> Result<Self, BuildError> {
        if objects.is_empty() {
            return Err(BuildError::Empty);
        }

        let count = objects.len();
        let mut entries = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| {
                let bbox = object
                    .bounding_box()
                    .ok_or(BuildError::MissingBoundingBox { index })?;
                Ok(Entry { object, bbox })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        let root = Self::build(&mut entries, rng);

        log::info!(
            "BVH: {} objects, depth ~{}",
            count,
            (count as f32).log2().ceil() as u32
        );

        Ok(root)
    }

    /// Build a BVH over the members of `list`.
    pub fn from_list(list: HittableList, rng: &mut dyn RngCore) -> Result<Self, BuildError> {
        Self::new(list.into_objects(), rng)
    }

    /// Recursive construction over a non-empty range.
    fn build(entries: &mut [Entry], rng: &mut dyn RngCore) -> Self {
        let axis = Axis::from_index(rng.gen_range(0..3));

        // Stable, so equal keys keep their input order.
        entries.sort_by(|a, b| {
            let a_min = a.bbox.axis_interval(axis).min;
            let b_min = b.bbox.axis_interval(axis).min;
            a_min.total_cmp(&b_min)
        });

        match entries.len() {
            1 => Self {
                left: Arc::clone(&entries[0].object),
                right: Arc::clone(&entries[0].object),
                bbox: entries[0].bbox,
            },
            2 => Self {
                left: Arc::clone(&entries[0].object),
                right: Arc::clone(&entries[1].object),
                bbox: Aabb::surrounding(&entries[0].bbox, &entries[1].bbox),
            },
            n => {
                let (lower, upper) = entries.split_at_mut(n / 2);
                let left = Self::build(lower, rng);
                let right = Self::build(upper, rng);
                let bbox = Aabb::surrounding(&left.bbox, &right.bbox);

                Self {
                    left: Arc::new(left),
                    right: Arc::new(right),
                    bbox,
                }
            }
        }
    }

    /// Whether both children are the same object.
    fn is_leaf(&self) -> bool {
        Arc::ptr_eq(&self.left, &self.right)
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t, rng);
        if self.is_leaf() {
            return hit_left;
        }

        // Only check right up to closest hit
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.right.hit(ray, ray_t.with_max(right_max), rng);

        hit_right.or(hit_left)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}
