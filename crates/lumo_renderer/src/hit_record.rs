//! Per-intersection results: `HitRecord` and `FaceGeoUV`.

use crate::{Material, Surface};
use lumo_math::{Ray, Vec2, Vec3};

/// Face and texture coordinates at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeoUV {
    /// Topological face index, -1 for non-mesh primitives
    pub face_id: i32,
    /// Barycentric (u, v) within the face; (-1, -1) when not a triangle
    pub uv: Vec2,
    /// Texture coordinates; (-1, -1) when the surface has none
    pub global_uv: Vec2,
}

impl FaceGeoUV {
    /// Sentinel used for "no coordinates".
    pub const NO_UV: Vec2 = Vec2::new(-1.0, -1.0);

    pub fn new(face_id: i32, uv: Vec2, global_uv: Vec2) -> Self {
        Self {
            face_id,
            uv,
            global_uv,
        }
    }

    /// True if `global_uv` holds real texture coordinates.
    pub fn has_global_uv(&self) -> bool {
        self.global_uv != Self::NO_UV
    }
}

impl Default for FaceGeoUV {
    fn default() -> Self {
        Self::new(-1, Self::NO_UV, Self::NO_UV)
    }
}

/// Record of a ray-surface intersection.
///
/// Callers pass one record down the whole traversal; primitives overwrite
/// it only when they accept a hit inside the (shrinking) search interval.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Shading normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Surface that was hit. Borrowed: never outlives the surface itself.
    pub surface: Option<&'a dyn Surface>,
    /// Face id and coordinates at the hit
    pub face_geo_uv: FaceGeoUV,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            front_face: false,
            surface: None,
            face_geo_uv: FaceGeoUV::default(),
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// Material of the surface that was hit, if any.
    pub fn material(&self) -> Option<&'a Material> {
        self.surface.and_then(|surface| surface.material())
    }
}
