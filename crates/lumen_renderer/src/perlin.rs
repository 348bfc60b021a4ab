//! Perlin gradient noise.

use lumen_math::Vec3;
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::sampling::random_vec3;

const POINT_COUNT: usize = 256;

/// Lattice gradient noise with Hermite-smoothed trilinear interpolation.
///
/// The gradient table and permutations are drawn once from the generator
/// handed to [`Perlin::new`]; evaluation is deterministic afterwards.
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT)
            .map(|_| loop {
                if let Some(g) = random_vec3(rng, -1.0, 1.0).try_normalize() {
                    break g;
                }
            })
            .collect();

        Self {
            gradients,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Noise value at `p`, roughly in [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let floor = p.floor();
        let frac = p - floor;
        let (i, j, k) = (floor.x as i32, floor.y as i32, floor.z as i32);

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let idx = self.perm_x[lattice(i, di)]
                        ^ self.perm_y[lattice(j, dj)]
                        ^ self.perm_z[lattice(k, dk)];
                    *cell = self.gradients[idx];
                }
            }
        }

        interpolate(&c, frac)
    }

    /// Sum of `depth` octaves, each at double frequency and half weight.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

#[inline]
fn lattice(base: i32, offset: usize) -> usize {
    (base.wrapping_add(offset as i32) & (POINT_COUNT as i32 - 1)) as usize
}

fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
    perm.shuffle(rng);
    perm
}

fn interpolate(c: &[[[Vec3; 2]; 2]; 2], frac: Vec3) -> f32 {
    // Hermite cubic to round off the lattice
    let smooth = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight = frac - Vec3::new(fi, fj, fk);
                accum += (fi * smooth.x + (1.0 - fi) * (1.0 - smooth.x))
                    * (fj * smooth.y + (1.0 - fj) * (1.0 - smooth.y))
                    * (fk * smooth.z + (1.0 - fk) * (1.0 - smooth.z))
                    * gradient.dot(weight);
            }
        }
    }
    accum
}
