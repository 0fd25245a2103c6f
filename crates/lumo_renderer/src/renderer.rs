//! Whitted-style ray tracing driver.
//!
//! Implements:
//! - Direct lighting from every light at the nearest hit
//! - Recursive mirror reflection and dielectric refraction up to a fixed depth
//! - Anti-aliasing via jittered multi-sampling
//! - Parallel bucket rendering with a per-pixel deterministic RNG
//! - Gamma correction and PNG output

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::material::{reflect, refract};
use crate::{Color, DielectricMaterial, HitRecord, Light, Material, Scene, Surface};
use lumo_math::{Interval, Ray, Vec2, EPSILON};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Requested shadow samples per area light
    pub shadow_samples: u32,
    /// Maximum number of mirror/refraction bounces
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Seed for the per-pixel random generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            shadow_samples: 1,
            max_depth: 5,
            background: Color::ZERO,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

/// Compute the color seen by a ray.
///
/// `depth` is the number of secondary bounces still allowed.
pub fn shade(
    ray: &Ray,
    world: &dyn Surface,
    lights: &[Light],
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut rec = HitRecord::default();
    if !world.hit(ray, Interval::new(EPSILON, f32::INFINITY), &mut rec) {
        return config.background;
    }

    let view_vec = (-ray.direction).normalize_or_zero();
    let mut color = Color::ZERO;
    for light in lights {
        color += light.illuminate(&rec, view_vec, world, rng);
    }

    if depth == 0 {
        return color;
    }

    match rec.material() {
        Some(Material::Phong(phong)) if phong.mirror() != Color::ZERO => {
            let direction = reflect(ray.direction.normalize_or_zero(), rec.normal);
            let reflected = shade(&Ray::new(rec.p, direction), world, lights, depth - 1, config, rng);
            color += phong.mirror() * reflected;
        }
        Some(Material::Dielectric(glass)) => {
            color += shade_dielectric(ray, &rec, glass, world, lights, depth, config, rng);
        }
        _ => {}
    }

    color
}

/// Reflected plus refracted light through a dielectric, weighted by Schlick.
#[allow(clippy::too_many_arguments)]
fn shade_dielectric(
    ray: &Ray,
    rec: &HitRecord,
    glass: &DielectricMaterial,
    world: &dyn Surface,
    lights: &[Light],
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let refraction_ratio = if rec.front_face {
        1.0 / glass.ior
    } else {
        glass.ior
    };
    let unit_direction = ray.direction.normalize_or_zero();

    let reflected_ray = Ray::new(rec.p, reflect(unit_direction, rec.normal));
    let reflected = shade(&reflected_ray, world, lights, depth - 1, config, rng);

    let Some(direction) = refract(unit_direction, rec.normal, refraction_ratio) else {
        // Total internal reflection
        return glass.attenuation * reflected;
    };

    let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
    let reflectance = DielectricMaterial::reflectance(cos_theta, refraction_ratio);
    let refracted = shade(&Ray::new(rec.p, direction), world, lights, depth - 1, config, rng);

    glass.attenuation * (reflectance * reflected + (1.0 - reflectance) * refracted)
}

/// Random generator for one pixel, independent of thread scheduling.
pub fn pixel_rng(config: &RenderConfig, image_width: u32, x: u32, y: u32) -> StdRng {
    let pixel_index = y as u64 * image_width as u64 + x as u64;
    StdRng::seed_from_u64(config.seed.wrapping_add(pixel_index))
}

/// Render a single pixel with multi-sampling.
///
/// One sample goes through the pixel centre; more samples are jittered.
pub fn render_pixel(scene: &Scene, x: u32, y: u32, config: &RenderConfig) -> Color {
    let Some(world) = scene.world() else {
        return config.background;
    };
    let camera = scene.camera();
    let mut rng = pixel_rng(config, camera.image_width, x, y);
    let samples = config.samples_per_pixel.max(1);

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples {
        let ray = if samples == 1 {
            camera.get_ray(x, y, Vec2::splat(0.5))
        } else {
            camera.get_jittered_ray(x, y, &mut rng)
        };
        pixel_color += shade(&ray, world, scene.lights(), config.max_depth, config, &mut rng);
    }

    pixel_color / samples as f32
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Linear-light image in row-major order.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y). Out-of-range coordinates read black.
    pub fn get(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::ZERO;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y). Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Convert to gamma-corrected RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgba(*c)).collect()
    }

    /// Write the image as an 8-bit PNG (format chosen from the extension).
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let img = image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(color_to_rgba(self.get(x, y)))
        });
        img.save(path)
    }
}

/// Render the scene with all buckets in parallel.
pub fn render(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let camera = scene.camera();
    let (width, height) = (camera.image_width, camera.image_height);
    let buckets = generate_buckets(width, height, config.bucket_size);
    let total = buckets.len();

    log::info!(
        "Rendering {}x{} in {} buckets on {} threads ({} spp, max depth {})",
        width,
        height,
        total,
        rayon::current_num_threads(),
        config.samples_per_pixel,
        config.max_depth
    );

    let start = Instant::now();
    let finished = AtomicUsize::new(0);
    let report_every = (total / 10).max(1);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let pixels = render_bucket(bucket, scene, config);
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            if done % report_every == 0 || done == total {
                log::info!("{}/{} buckets finished", done, total);
            }
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
