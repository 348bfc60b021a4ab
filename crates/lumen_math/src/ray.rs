use crate::Vec3;

/// A ray in 3D space with origin, direction, and time.
///
/// A point on the ray is `origin + t * direction`. The direction is not
/// required to be normalized. `time` selects the instant inside the camera
/// shutter at which the ray was fired, which moving primitives use for
/// motion blur.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub time: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, time: f32) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Get the point along the ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same direction and time, different origin.
    #[inline]
    pub fn with_origin(&self, origin: Vec3) -> Ray {
        Ray::new(origin, self.direction, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_getters() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let direction = Vec3::new(4.0, 5.0, 6.0);
        let ray = Ray::new(origin, direction, 0.5);

        assert_eq!(ray.origin(), origin);
        assert_eq!(ray.direction(), direction);
        assert_eq!(ray.time(), 0.5);
    }

    #[test]
    fn test_with_origin_keeps_time() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.75);
        let moved = ray.with_origin(Vec3::ONE);

        assert_eq!(moved.origin, Vec3::ONE);
        assert_eq!(moved.direction, Vec3::Y);
        assert_eq!(moved.time, 0.75);
    }
}
