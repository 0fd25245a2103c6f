//! Surface materials: Blinn-Phong and dielectric.

use crate::{Color, HitRecord, Texture};
use lumo_math::Vec3;
use std::sync::Arc;

/// Diffuse colour reported for back-face hits.
pub const BACK_FACE_COLOR: Color = Color::new(1.0, 1.0, 0.0);

/// Shading response of a surface.
///
/// Lights only illuminate Phong surfaces; see [`Material::as_phong`].
pub enum Material {
    Phong(PhongMaterial),
    Dielectric(DielectricMaterial),
}

impl Material {
    /// The Phong parameters, if this material has them.
    pub fn as_phong(&self) -> Option<&PhongMaterial> {
        match self {
            Material::Phong(phong) => Some(phong),
            Material::Dielectric(_) => None,
        }
    }

    pub fn as_dielectric(&self) -> Option<&DielectricMaterial> {
        match self {
            Material::Dielectric(dielectric) => Some(dielectric),
            Material::Phong(_) => None,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Phong(PhongMaterial::default())
    }
}

/// Blinn-Phong material with a textured diffuse term.
pub struct PhongMaterial {
    ambient: Color,
    diffuse: Arc<Texture>,
    specular: Color,
    shininess: f32,
    mirror: Color,
}

impl PhongMaterial {
    pub fn new(ambient: Color, diffuse: Arc<Texture>, specular: Color, shininess: f32, mirror: Color) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess,
            mirror,
        }
    }

    /// Untextured material with ambient derived from the diffuse colour.
    pub fn from_color(diffuse: Color, specular: Color, shininess: f32, mirror: Color) -> Self {
        Self::new(
            diffuse.max(Color::splat(0.01)),
            Arc::new(Texture::solid(diffuse)),
            specular,
            shininess,
            mirror,
        )
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn diffuse(&self) -> &Texture {
        &self.diffuse
    }

    pub fn specular(&self) -> Color {
        self.specular
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn mirror(&self) -> Color {
        self.mirror
    }

    /// Blinn-Phong response for unit `light_vec` and `view_vec` pointing away
    /// from the surface. Ambient and mirror terms are left to the caller.
    pub fn evaluate(&self, rec: &HitRecord, light_vec: Vec3, view_vec: Vec3) -> Color {
        if !rec.front_face {
            return BACK_FACE_COLOR;
        }

        let half = (light_vec + view_vec).normalize_or_zero();
        let specular = self.specular * half.dot(rec.normal).max(0.0).powf(self.shininess);
        let diffuse = self.diffuse.value(rec.face_geo_uv.global_uv, rec.p);

        diffuse + specular
    }
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::from_color(Color::splat(0.5), Color::ZERO, 1.0, Color::ZERO)
    }
}

/// Clear refractive material, traced by the render driver.
#[derive(Debug, Clone, Copy)]
pub struct DielectricMaterial {
    /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub ior: f32,
    /// Per-channel transmission
    pub attenuation: Color,
}

impl DielectricMaterial {
    pub fn new(ior: f32, attenuation: Color) -> Self {
        Self { ior, attenuation }
    }

    /// Schlick's approximation for reflectance
    pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
        let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface, or `None` on total internal reflection.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Option<Vec3> {
    let cos_theta = (-uv).dot(n).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    if etai_over_etat * sin_theta > 1.0 {
        return None;
    }

    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    Some(r_out_perp + r_out_parallel)
}
