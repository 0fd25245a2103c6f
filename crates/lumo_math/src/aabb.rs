use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// The empty box uses `+inf`/`-inf` corners so that expanding it by anything
/// yields exactly that thing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            x: Interval::new(min.x, max.x),
            y: Interval::new(min.y, max.y),
            z: Interval::new(min.z, max.z),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Return to the empty state.
    pub fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    /// Grow the box to contain `p`.
    pub fn expand_by_point(&mut self, p: Vec3) {
        *self = Self::surrounding(self, &Self::from_points(p, p));
    }

    /// Grow the box to contain `other`.
    pub fn expand_by(&mut self, other: &Aabb) {
        *self = Self::surrounding(self, other);
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True when the box contains no point (e.g. fresh after `reset`).
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method. A zero direction component is handled
    /// explicitly: the ray is parallel to that slab pair and only hits if
    /// its origin already lies between them.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let origin = r.origin[axis];
            let dir = r.direction[axis];

            if dir == 0.0 {
                if !slab.contains(origin) {
                    return false;
                }
                continue;
            }

            let adinv = 1.0 / dir;
            let mut t0 = (slab.min - origin) * adinv;
            let mut t1 = (slab.max - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.is_empty() {
                return false;
            }
        }

        true
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vec3(rng: &mut StdRng, lo: f32, hi: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(lo..hi),
            rng.gen_range(lo..hi),
            rng.gen_range(lo..hi),
        )
    }

    fn random_box(rng: &mut StdRng) -> Aabb {
        Aabb::from_points(random_vec3(rng, -5.0, 5.0), random_vec3(rng, -5.0, 5.0))
    }

    fn contains_point(aabb: &Aabb, p: Vec3, tolerance: f32) -> bool {
        (0..3).all(|axis| {
            let slab = aabb.axis_interval(axis);
            p[axis] >= slab.min - tolerance && p[axis] <= slab.max + tolerance
        })
    }

    /// March along the ray and report whether any sample lands in the box.
    fn brute_force_hit(aabb: &Aabb, ray: &Ray, ray_t: Interval) -> bool {
        const STEPS: usize = 4096;
        (0..=STEPS).any(|i| {
            let t = ray_t.min + ray_t.size() * (i as f32 / STEPS as f32);
            contains_point(aabb, ray.at(t), -1e-3)
        })
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.x.min, 0.0);
        assert_eq!(surrounding.x.max, 10.0);
    }

    #[test]
    fn test_reset_then_expand_by_point_is_degenerate() {
        let p = Vec3::new(1.5, -2.0, 7.25);
        let mut aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        aabb.reset();
        assert!(aabb.is_empty());

        aabb.expand_by_point(p);
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min(), p);
        assert_eq!(aabb.max(), p);
    }

    #[test]
    fn test_expand_by_commutative_and_associative() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            let c = random_box(&mut rng);

            let mut ab = a;
            ab.expand_by(&b);
            let mut ba = b;
            ba.expand_by(&a);
            assert_eq!(ab, ba);

            let mut ab_c = ab;
            ab_c.expand_by(&c);
            let mut bc = b;
            bc.expand_by(&c);
            let mut a_bc = a;
            a_bc.expand_by(&bc);
            assert_eq!(ab_c, a_bc);

            // Idempotent, with EMPTY as identity
            let mut aa = a;
            aa.expand_by(&a);
            assert_eq!(aa, a);
            let mut empty = Aabb::EMPTY;
            empty.expand_by(&a);
            assert_eq!(empty, a);
        }
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Interval ends before the box
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_hit_axis_parallel_rays() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);

        // Origin on a slab boundary with zero direction on that axis
        let ray = Ray::new(Vec3::new(0.0, 0.5, -3.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 10.0)));

        let ray = Ray::new(Vec3::new(-0.5, 0.5, -3.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 10.0)));

        // Negative zero behaves like zero
        let ray = Ray::new(Vec3::new(0.5, 0.5, 3.0), Vec3::new(-0.0, -0.0, -1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 10.0)));
    }

    #[test]
    fn test_aabb_hit_flat_box() {
        // Zero-thickness box, as produced by an axis-aligned triangle
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 10.0)));
    }

    #[test]
    fn test_empty_box_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        assert!(!Aabb::EMPTY.hit(&ray, Interval::UNIVERSE));

        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(!Aabb::EMPTY.hit(&parallel, Interval::UNIVERSE));
    }

    #[test]
    fn test_hit_agrees_with_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..300 {
            let aabb = random_box(&mut rng);
            let origin = random_vec3(&mut rng, -10.0, 10.0);
            let mut direction = random_vec3(&mut rng, -1.0, 1.0);
            // Force some rays to be parallel to an axis
            if rng.gen_bool(0.3) {
                direction[rng.gen_range(0..3)] = 0.0;
            }
            let ray = Ray::new(origin, direction);
            let ray_t = Interval::new(0.0, 40.0);

            if brute_force_hit(&aabb, &ray, ray_t) {
                assert!(aabb.hit(&ray, ray_t), "missed box {:?} with {:?}", aabb, ray);
            }
        }
    }

    #[test]
    fn test_ray_toward_interior_point_hits_and_away_misses() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let aabb = random_box(&mut rng);
            let t = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            let inside = aabb.min() + (aabb.max() - aabb.min()) * t;
            let origin = random_vec3(&mut rng, 20.0, 30.0);

            // Aimed at an interior point, which is reached at t = 1
            let toward = Ray::between(origin, inside);
            assert!(aabb.hit(&toward, Interval::new(0.0, 2.0)));

            // Heading away from an interior point from outside can't hit a convex box
            let away = Ray::new(origin, origin - inside);
            assert!(!aabb.hit(&away, Interval::new(0.0, f32::INFINITY)));
        }
    }
}
