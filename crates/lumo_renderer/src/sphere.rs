//! Sphere primitive for ray tracing.

use crate::{BoundsCache, FaceGeoUV, HitRecord, Material, Surface};
use lumo_math::{Aabb, Interval, Ray, Vec2, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bounds: BoundsCache,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let mut sphere = Self {
            center,
            radius: radius.max(0.0),
            material,
            bounds: BoundsCache::dirty(),
        };
        sphere.bounding_box(false);
        sphere
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
        self.bounds.invalidate();
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
        self.bounds.invalidate();
    }

    /// Spherical texture coordinates for a point relative to the center.
    ///
    /// u is the azimuth around +Z starting at +X, v the polar angle from +Z.
    fn sphere_uv(local: Vec3) -> Vec2 {
        let r = local.length();
        if r == 0.0 {
            return Vec2::ZERO;
        }

        let mut phi = local.y.atan2(local.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let theta = (local.z / r).clamp(-1.0, 1.0).acos();

        Vec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Surface for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.bounds.get().hit(ray, ray_t) {
            return false;
        }

        let a = ray.direction.length_squared();
        if a == 0.0 {
            return false;
        }

        let oc = ray.origin - self.center;
        let b = 2.0 * ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Nearest root first, far root if the near one lies below tmin
        let mut t = (-b - sqrtd) / (2.0 * a);
        if t < ray_t.min {
            t = (-b + sqrtd) / (2.0 * a);
        }
        if !ray_t.contains(t) {
            return false;
        }

        rec.t = t;
        rec.p = ray.at(t);
        let local = rec.p - self.center;
        rec.set_face_normal(ray, local.normalize_or_zero());
        rec.surface = Some(self);
        rec.face_geo_uv = FaceGeoUV::new(-1, FaceGeoUV::NO_UV, Self::sphere_uv(local));

        true
    }

    fn bounding_box(&mut self, force_recompute: bool) -> Aabb {
        let (center, radius) = (self.center, self.radius);
        self.bounds.refresh(force_recompute, || {
            let rvec = Vec3::splat(radius);
            Aabb::from_points(center - rvec, center + rvec)
        })
    }

    fn bounds(&self) -> Aabb {
        self.bounds.get()
    }

    fn material(&self) -> Option<&Material> {
        Some(self.material.as_ref())
    }

    fn name(&self) -> &str {
        "Sphere"
    }
}
