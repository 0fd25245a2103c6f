//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection. The
//! intersection and hit-filling helpers are shared with mesh faces.

use crate::{BoundsCache, FaceGeoUV, HitRecord, Material, Surface};
use lumo_math::{Aabb, Interval, Ray, Vec2, Vec3};
use std::sync::Arc;

/// Möller-Trumbore ray-triangle intersection.
///
/// Returns the ray parameter and the barycentric (u, v) of the hit, where
/// u weights the second vertex and v the third.
pub(crate) fn intersect_triangle(
    vertices: [Vec3; 3],
    ray: &Ray,
    ray_t: Interval,
) -> Option<(f32, Vec2)> {
    let [v0, v1, v2] = vertices;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-8 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if u < 0.0 {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if !ray_t.contains(t) {
        return None;
    }

    Some((t, Vec2::new(u, v)))
}

/// Per-vertex shading attributes of one triangle.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VertexAttributes {
    pub normals: Option<[Vec3; 3]>,
    pub uvs: Option<[Vec2; 3]>,
}

/// Blend three per-vertex values with barycentrics (u, v).
fn blend<T>(values: [T; 3], bary: Vec2) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T> + Copy,
{
    let w = 1.0 - bary.x - bary.y;
    values[0] * w + values[1] * bary.x + values[2] * bary.y
}

/// Fill `rec` for an accepted triangle hit.
pub(crate) fn record_triangle_hit<'a>(
    rec: &mut HitRecord<'a>,
    ray: &Ray,
    hit: (f32, Vec2),
    vertices: [Vec3; 3],
    attributes: VertexAttributes,
    face_id: i32,
    surface: &'a dyn Surface,
) {
    let (t, bary) = hit;
    let [v0, v1, v2] = vertices;

    let outward_normal = match attributes.normals {
        Some(normals) => blend(normals, bary).normalize_or_zero(),
        None => (v1 - v0).cross(v2 - v0).normalize_or_zero(),
    };
    let global_uv = attributes
        .uvs
        .map_or(FaceGeoUV::NO_UV, |uvs| blend(uvs, bary));

    rec.t = t;
    rec.p = ray.at(t);
    rec.set_face_normal(ray, outward_normal);
    rec.surface = Some(surface);
    rec.face_geo_uv = FaceGeoUV::new(face_id, bary, global_uv);
}

/// Bounding box of three points.
pub(crate) fn triangle_bounds(vertices: [Vec3; 3]) -> Aabb {
    let mut bbox = Aabb::from_points(vertices[0], vertices[1]);
    bbox.expand_by_point(vertices[2]);
    bbox
}

/// A standalone triangle primitive.
pub struct Triangle {
    vertices: [Vec3; 3],
    attributes: VertexAttributes,
    material: Arc<Material>,
    bounds: BoundsCache,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let mut triangle = Self {
            vertices: [v0, v1, v2],
            attributes: VertexAttributes::default(),
            material,
            bounds: BoundsCache::dirty(),
        };
        triangle.bounding_box(false);
        triangle
    }

    /// Use per-vertex normals for smooth shading.
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.attributes.normals = Some(normals);
        self
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.attributes.uvs = Some(uvs);
        self
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        self.vertices
    }

    pub fn set_vertices(&mut self, vertices: [Vec3; 3]) {
        self.vertices = vertices;
        self.bounds.invalidate();
    }
}

impl Surface for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.bounds.get().hit(ray, ray_t) {
            return false;
        }

        match intersect_triangle(self.vertices, ray, ray_t) {
            Some(hit) => {
                record_triangle_hit(rec, ray, hit, self.vertices, self.attributes, -1, self);
                true
            }
            None => false,
        }
    }

    fn bounding_box(&mut self, force_recompute: bool) -> Aabb {
        let vertices = self.vertices;
        self.bounds
            .refresh(force_recompute, || triangle_bounds(vertices))
    }

    fn bounds(&self) -> Aabb {
        self.bounds.get()
    }

    fn material(&self) -> Option<&Material> {
        Some(self.material.as_ref())
    }

    fn name(&self) -> &str {
        "Triangle"
    }
}
