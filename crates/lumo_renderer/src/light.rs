//! Light sources and direct illumination.
//!
//! Every light answers one question: how much radiance does it contribute
//! at a hit point? Point and area lights cast shadow rays through the scene
//! to decide visibility.

use crate::{Color, HitRecord, PhongMaterial, SceneError, Surface};
use lumo_math::{Interval, Ray, Vec3, EPSILON, EPSILON_SQUARED};
use rand::{Rng, RngCore};

/// A light source.
pub enum Light {
    Ambient(AmbientLight),
    Point(PointLight),
    Area(AreaLight),
}

impl Light {
    /// Radiance this light contributes at `rec`, seen along `view_vec`.
    ///
    /// Zero if the point is in shadow or the surface has no Phong material.
    pub fn illuminate(
        &self,
        rec: &HitRecord,
        view_vec: Vec3,
        scene: &dyn Surface,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(material) = rec.material().and_then(|m| m.as_phong()) else {
            return Color::ZERO;
        };

        match self {
            Light::Ambient(light) => light.intensity * material.ambient(),
            Light::Point(light) => light.illuminate(rec, material, view_vec, scene),
            Light::Area(light) => light.illuminate(rec, material, view_vec, scene, rng),
        }
    }
}

/// True if anything in `scene` lies strictly between `from` and `to`.
fn occluded(scene: &dyn Surface, from: Vec3, to: Vec3) -> bool {
    let shadow_ray = Ray::between(from, to);
    let mut rec = HitRecord::default();
    scene.hit(&shadow_ray, Interval::new(EPSILON, 1.0), &mut rec)
}

/// Unoccluded contribution of a light sample at `position`, before the
/// emitter's own cosine and area terms.
///
/// Returns the material response scaled by `intensity * cos(theta) / d^2`,
/// and the unit direction from the hit point toward the sample.
fn light_sample(
    rec: &HitRecord,
    material: &PhongMaterial,
    view_vec: Vec3,
    position: Vec3,
    intensity: Color,
) -> (Color, Vec3) {
    let to_light = position - rec.p;
    let distance_squared = to_light.length_squared().max(EPSILON_SQUARED);
    let light_vec = to_light.normalize_or_zero();

    let cos_theta = rec.normal.dot(light_vec).max(0.0);
    let irradiance = intensity * cos_theta / distance_squared;

    (irradiance * material.evaluate(rec, light_vec, view_vec), light_vec)
}

/// Uniform light applied everywhere, without shadows.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub intensity: Color,
}

impl AmbientLight {
    pub fn new(intensity: Color) -> Self {
        Self { intensity }
    }
}

/// Point light with hard shadows.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }

    fn illuminate(&self, rec: &HitRecord, material: &PhongMaterial, view_vec: Vec3, scene: &dyn Surface) -> Color {
        if occluded(scene, rec.p, self.position) {
            return Color::ZERO;
        }
        light_sample(rec, material, view_vec, self.position, self.intensity).0
    }
}

/// Square emitter with soft shadows, estimated by stratified sampling.
#[derive(Debug, Clone, Copy)]
pub struct AreaLight {
    center: Vec3,
    normal: Vec3,
    u: Vec3,
    v: Vec3,
    len: f32,
    intensity: Color,
    shadow_samples: u32,
}

impl AreaLight {
    /// Square of side `len` centred at `center`, facing `normal`, with one
    /// edge along `u`. Starts with a single shadow sample.
    pub fn new(center: Vec3, normal: Vec3, u: Vec3, len: f32, intensity: Color) -> Self {
        let normal = normal.normalize_or_zero();
        let u = u.normalize_or_zero();
        let v = u.cross(normal).normalize_or_zero();
        Self {
            center,
            normal,
            u,
            v,
            len,
            intensity,
            shadow_samples: 1,
        }
    }

    /// Set the requested sample count. Zero is rejected.
    pub fn set_shadow_samples(&mut self, samples: u32) -> Result<(), SceneError> {
        if samples == 0 {
            return Err(SceneError::ZeroShadowSamples);
        }
        self.shadow_samples = samples;
        Ok(())
    }

    pub fn shadow_samples(&self) -> u32 {
        self.shadow_samples
    }

    /// Cells per side of the sampling grid: `round(sqrt(shadow_samples))`.
    pub fn grid_size(&self) -> u32 {
        (self.shadow_samples as f32).sqrt().round() as u32
    }

    pub fn area(&self) -> f32 {
        self.len * self.len
    }

    /// One jittered point per grid cell.
    pub fn sample_points(&self, rng: &mut dyn RngCore) -> Vec<Vec3> {
        let grid = self.grid_size();
        let cell = self.len / grid.max(1) as f32;
        let corner = self.center - self.len * (0.5 * self.u + 0.5 * self.v);

        let mut points = Vec::with_capacity((grid * grid) as usize);
        for i in 0..grid {
            for j in 0..grid {
                let du = (i as f32 + rng.gen::<f32>()) * cell;
                let dv = (j as f32 + rng.gen::<f32>()) * cell;
                points.push(corner + du * self.u + dv * self.v);
            }
        }
        points
    }

    fn illuminate(
        &self,
        rec: &HitRecord,
        material: &PhongMaterial,
        view_vec: Vec3,
        scene: &dyn Surface,
        rng: &mut dyn RngCore,
    ) -> Color {
        let points = self.sample_points(rng);
        if points.is_empty() {
            return Color::ZERO;
        }

        let mut sum = Color::ZERO;
        for point in &points {
            if occluded(scene, rec.p, *point) {
                continue;
            }
            let (contribution, light_vec) =
                light_sample(rec, material, view_vec, *point, self.intensity);
            let cos_alpha = self.normal.dot(-light_vec).max(0.0);
            sum += contribution * cos_alpha;
        }

        sum * self.area() / points.len() as f32
    }
}
