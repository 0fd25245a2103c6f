//! Pinhole camera for primary ray generation.

use lumo_core::CameraDesc;
use lumo_math::{Ray, Vec2, Vec3};
use rand::{Rng, RngCore};

/// Pinhole camera looking down `view_dir` from `eye`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    center: Vec3,
    // Top-left corner of the viewport (not a pixel centre)
    viewport_origin: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Camera {
    /// Build the camera basis from a scene description.
    pub fn from_desc(desc: &CameraDesc) -> Self {
        let forward = desc.view_dir.normalize_or_zero();
        let w = -forward;

        // World up, unless we are looking straight along it
        let vup = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let u = vup.cross(w).normalize_or_zero();
        let v = w.cross(u);

        let viewport_u = desc.viewport_width * u;
        let viewport_v = -desc.viewport_height * v;

        let image_width = desc.image_width.max(1);
        let image_height = desc.image_height.max(1);

        Self {
            image_width,
            image_height,
            center: desc.eye,
            viewport_origin: desc.eye + desc.focal_length * forward - viewport_u / 2.0 - viewport_v / 2.0,
            pixel_delta_u: viewport_u / image_width as f32,
            pixel_delta_v: viewport_v / image_height as f32,
        }
    }

    /// Ray through pixel (i, j) at sub-pixel `offset` in `[0, 1)^2`.
    ///
    /// Row 0 is the top of the image. `Vec2::splat(0.5)` is the pixel centre.
    pub fn get_ray(&self, i: u32, j: u32, offset: Vec2) -> Ray {
        let pixel_sample = self.viewport_origin
            + (i as f32 + offset.x) * self.pixel_delta_u
            + (j as f32 + offset.y) * self.pixel_delta_v;

        Ray::new(self.center, pixel_sample - self.center)
    }

    /// Ray through a uniformly jittered point of pixel (i, j).
    pub fn get_jittered_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = Vec2::new(rng.gen::<f32>(), rng.gen::<f32>());
        self.get_ray(i, j, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn desc() -> CameraDesc {
        CameraDesc {
            eye: Vec3::new(0.0, 0.0, 5.0),
            view_dir: Vec3::new(0.0, 0.0, -1.0),
            focal_length: 1.0,
            viewport_width: 2.0,
            viewport_height: 1.0,
            image_width: 200,
            image_height: 100,
        }
    }

    #[test]
    fn test_center_ray() {
        let camera = Camera::from_desc(&desc());
        // Corner between the four central pixels
        let ray = camera.get_ray(100, 50, Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert!((ray.direction - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_corner_rays() {
        let camera = Camera::from_desc(&desc());

        // Top-left corner of the viewport: -x, +y
        let top_left = camera.get_ray(0, 0, Vec2::ZERO);
        assert!((top_left.direction - Vec3::new(-1.0, 0.5, -1.0)).length() < 1e-5);

        // Bottom-right corner: +x, -y
        let bottom_right = camera.get_ray(199, 99, Vec2::ONE);
        assert!((bottom_right.direction - Vec3::new(1.0, -0.5, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_looking_straight_down() {
        let camera = Camera::from_desc(&CameraDesc {
            view_dir: -Vec3::Y,
            ..desc()
        });
        let ray = camera.get_ray(100, 50, Vec2::ZERO);
        assert!((ray.direction.normalize() + Vec3::Y).length() < 1e-5);
        assert!(ray.direction.is_finite());
    }

    #[test]
    fn test_jittered_ray_stays_in_pixel() {
        let camera = Camera::from_desc(&desc());
        let mut rng = StdRng::seed_from_u64(3);
        let lo = camera.get_ray(10, 10, Vec2::ZERO).direction;
        let hi = camera.get_ray(10, 10, Vec2::ONE).direction;

        for _ in 0..50 {
            let d = camera.get_jittered_ray(10, 10, &mut rng).direction;
            assert!(d.x >= lo.x - 1e-6 && d.x <= hi.x + 1e-6);
            assert!(d.y <= lo.y + 1e-6 && d.y >= hi.y - 1e-6);
        }
    }
}
