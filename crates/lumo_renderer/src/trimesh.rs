//! Triangle meshes as ray-traceable surfaces.
//!
//! A `TriangleMesh` owns the shared geometry and, once `build_bvh` has run,
//! a BVH over one lightweight `MeshFace` proxy per triangle. Hits reported
//! by a proxy are re-attributed to the owning mesh so shading sees the
//! mesh material.

use crate::triangle::{intersect_triangle, record_triangle_hit, triangle_bounds, VertexAttributes};
use crate::{BoundsCache, BvhNode, HitRecord, Material, Surface};
use lumo_core::{Mesh, MeshResult};
use lumo_math::{Aabb, Interval, Ray, Vec3};
use std::path::Path;
use std::sync::Arc;

/// Gather the positions and shading attributes of one face.
fn face_data(mesh: &Mesh, face: usize) -> ([Vec3; 3], VertexAttributes) {
    let idx = mesh.face_vertices(face);
    let vertices = idx.map(|i| mesh.positions[i]);
    let attributes = VertexAttributes {
        normals: mesh.normals.as_ref().map(|n| idx.map(|i| n[i])),
        uvs: mesh.uvs.as_ref().map(|uv| idx.map(|i| uv[i])),
    };
    (vertices, attributes)
}

/// Hit test one face, filling `rec` on success.
fn hit_face<'a>(
    mesh: &Mesh,
    face: usize,
    ray: &Ray,
    ray_t: Interval,
    rec: &mut HitRecord<'a>,
    surface: &'a dyn Surface,
) -> bool {
    let (vertices, attributes) = face_data(mesh, face);
    match intersect_triangle(vertices, ray, ray_t) {
        Some(hit) => {
            record_triangle_hit(rec, ray, hit, vertices, attributes, face as i32, surface);
            true
        }
        None => false,
    }
}

/// One triangle of a mesh, referencing the shared geometry.
pub struct MeshFace {
    mesh: Arc<Mesh>,
    face: usize,
    bounds: BoundsCache,
}

impl MeshFace {
    pub fn new(mesh: Arc<Mesh>, face: usize) -> Self {
        let mut proxy = Self {
            mesh,
            face,
            bounds: BoundsCache::dirty(),
        };
        proxy.bounding_box(false);
        proxy
    }

    pub fn face(&self) -> usize {
        self.face
    }
}

impl Surface for MeshFace {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.bounds.get().hit(ray, ray_t) {
            return false;
        }
        hit_face(&self.mesh, self.face, ray, ray_t, rec, self)
    }

    fn bounding_box(&mut self, force_recompute: bool) -> Aabb {
        let (mesh, face) = (&self.mesh, self.face);
        self.bounds.refresh(force_recompute, || {
            triangle_bounds(face_data(mesh, face).0)
        })
    }

    fn bounds(&self) -> Aabb {
        self.bounds.get()
    }

    fn name(&self) -> &str {
        "MeshFace"
    }
}

/// A triangle mesh surface with an optional per-face BVH.
pub struct TriangleMesh {
    name: String,
    geometry: Arc<Mesh>,
    material: Arc<Material>,
    bvh: Option<BvhNode>,
    bounds: BoundsCache,
}

impl TriangleMesh {
    /// Wrap validated geometry. Missing normals are derived.
    ///
    /// No BVH is built; call [`TriangleMesh::build_bvh`] once loading is done.
    pub fn new(name: impl Into<String>, mut mesh: Mesh, material: Arc<Material>) -> MeshResult<Self> {
        mesh.validate()?;
        mesh.ensure_normals();

        let mut surface = Self {
            name: name.into(),
            geometry: Arc::new(mesh),
            material,
            bvh: None,
            bounds: BoundsCache::dirty(),
        };
        surface.bounding_box(false);
        Ok(surface)
    }

    /// Load an OBJ file and build its face BVH.
    pub fn load(path: impl AsRef<Path>, material: Arc<Material>) -> MeshResult<Self> {
        let path = path.as_ref();
        let mesh = Mesh::load_obj(path)?;
        let mut surface = Self::new(path.display().to_string(), mesh, material)?;
        surface.build_bvh();
        Ok(surface)
    }

    /// Build (or rebuild) the BVH over the mesh faces.
    pub fn build_bvh(&mut self) {
        let faces: Vec<Box<dyn Surface>> = (0..self.geometry.face_count())
            .map(|face| Box::new(MeshFace::new(Arc::clone(&self.geometry), face)) as Box<dyn Surface>)
            .collect();
        self.bvh = BvhNode::build(faces, &self.name);
    }

    pub fn has_bvh(&self) -> bool {
        self.bvh.is_some()
    }

    /// Edit the geometry.
    ///
    /// The edit is applied to a copy, which must still validate. Face and
    /// vertex normals are then rederived from the edited positions, the face
    /// BVH is dropped and the bounds are marked dirty. On error the mesh is
    /// left untouched.
    pub fn update_geometry(&mut self, edit: impl FnOnce(&mut Mesh)) -> MeshResult<()> {
        let mut mesh = Mesh::clone(&self.geometry);
        edit(&mut mesh);
        mesh.validate()?;
        mesh.recompute_normals();

        self.geometry = Arc::new(mesh);
        self.bvh = None;
        self.bounds.invalidate();
        Ok(())
    }
}

impl Surface for TriangleMesh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let hit_anything = match &self.bvh {
            Some(bvh) => bvh.hit(ray, ray_t, rec),
            None => {
                if !self.bounds.get().hit(ray, ray_t) {
                    return false;
                }
                let mut hit_anything = false;
                let mut closest_so_far = ray_t.max;
                for face in 0..self.geometry.face_count() {
                    if hit_face(&self.geometry, face, ray, ray_t.with_max(closest_so_far), rec, self) {
                        hit_anything = true;
                        closest_so_far = rec.t;
                    }
                }
                hit_anything
            }
        };

        if hit_anything {
            rec.surface = Some(self);
        }
        hit_anything
    }

    fn bounding_box(&mut self, force_recompute: bool) -> Aabb {
        let geometry = &self.geometry;
        self.bounds.refresh(force_recompute, || geometry.bounds())
    }

    fn bounds(&self) -> Aabb {
        self.bounds.get()
    }

    fn material(&self) -> Option<&Material> {
        Some(self.material.as_ref())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
