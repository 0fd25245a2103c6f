//! Indexed triangle mesh data.
//!
//! This module provides a renderer-agnostic mesh representation that can be
//! populated from OBJ files (or built in code) and handed to the ray tracer,
//! which wraps it in a `TriangleMesh` surface.

use std::path::{Path, PathBuf};

use lumo_math::{Aabb, Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur while loading or validating a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Mesh {0} contains no triangles")]
    Empty(String),

    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Mesh has {count} {attribute}, expected {expected}")]
    AttributeCount {
        attribute: &'static str,
        count: usize,
        expected: usize,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions, optional normals and texture
/// coordinates, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - derived by `ensure_normals` if missing)
    pub normals: Option<Vec<Vec3>>,

    /// Face normals (optional - one per triangle)
    pub face_normals: Option<Vec<Vec3>>,

    /// Texture coordinates (optional - one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        Self::new_with_uvs(positions, indices, normals, None)
    }

    /// Create a new mesh with texture coordinates.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> Self {
        Self {
            positions,
            normals,
            face_normals: None,
            uvs,
            indices,
        }
    }

    /// Load a mesh from a Wavefront OBJ file.
    ///
    /// All models in the file are merged into one mesh. Normals and texture
    /// coordinates are kept only if every model provides them per vertex.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| MeshError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();
        let mut has_normals = true;
        let mut has_uvs = true;

        for model in &models {
            let mesh = &model.mesh;
            let offset = positions.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            positions.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );

            has_normals &= mesh.normals.len() == vertex_count * 3;
            if has_normals {
                normals.extend(
                    mesh.normals
                        .chunks_exact(3)
                        .map(|n| Vec3::new(n[0], n[1], n[2])),
                );
            }

            has_uvs &= mesh.texcoords.len() == vertex_count * 2;
            if has_uvs {
                uvs.extend(mesh.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])));
            }

            indices.extend(mesh.indices.iter().map(|i| i + offset));
        }

        if indices.is_empty() {
            return Err(MeshError::Empty(path.display().to_string()));
        }

        let mesh = Self::new_with_uvs(
            positions,
            indices,
            has_normals.then_some(normals),
            has_uvs.then_some(uvs),
        );
        mesh.validate()?;

        log::info!(
            "Loaded mesh {} ({} vertices, {} faces, normals: {}, texture coordinates: {})",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.has_normals(),
            mesh.has_uvs()
        );

        Ok(mesh)
    }

    /// Axis-aligned bounding box of the vertex positions.
    pub fn bounds(&self) -> Aabb {
        self.positions.iter().fold(Aabb::empty(), |mut bounds, p| {
            bounds.expand_by_point(*p);
            bounds
        })
    }

    /// Check that every face references existing vertices and that the
    /// per-vertex texture coordinates and per-face normals line up.
    ///
    /// Mismatched vertex normals are not an error here; `ensure_normals`
    /// replaces them.
    pub fn validate(&self) -> MeshResult<()> {
        let vertex_count = self.positions.len();
        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count {
                return Err(MeshError::AttributeCount {
                    attribute: "texture coordinates",
                    count: uvs.len(),
                    expected: vertex_count,
                });
            }
        }
        if let Some(face_normals) = &self.face_normals {
            if face_normals.len() != self.face_count() {
                return Err(MeshError::AttributeCount {
                    attribute: "face normals",
                    count: face_normals.len(),
                    expected: self.face_count(),
                });
            }
        }

        for (face, chunk) in self.indices.chunks(3).enumerate() {
            if let Some(&index) = chunk.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Vertex indices of a face.
    pub fn face_vertices(&self, face: usize) -> [usize; 3] {
        let base = face * 3;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }

    /// Face normal: cross product of two edges, whose length is twice the
    /// triangle's area unless `normalize` is set.
    pub fn face_normal(&self, face: usize, normalize: bool) -> Vec3 {
        let [i0, i1, i2] = self.face_vertices(face);
        let p0 = self.positions[i0];
        let normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);
        if normalize {
            normal.normalize_or_zero()
        } else {
            normal
        }
    }

    /// Compute and store one normal per face.
    pub fn compute_face_normals(&mut self, normalize: bool) {
        let normals = (0..self.face_count())
            .map(|face| self.face_normal(face, normalize))
            .collect();
        self.face_normals = Some(normals);
    }

    /// Compute vertex normals as the average of incident face normals.
    ///
    /// Uses the stored face normals, computing area-weighted ones first if
    /// there are none. Vertices without usable faces get `+Y`.
    pub fn compute_vertex_normals(&mut self, normalize: bool) {
        if self.face_normals.is_none() {
            self.compute_face_normals(false);
        }
        let face_normals = self.face_normals.as_deref().unwrap_or_default();

        let mut sums = vec![Vec3::ZERO; self.positions.len()];
        let mut counts = vec![0u32; self.positions.len()];
        for (face, face_normal) in face_normals.iter().enumerate() {
            for vertex in self.face_vertices(face) {
                sums[vertex] += *face_normal;
                counts[vertex] += 1;
            }
        }

        let normals = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| {
                if count == 0 || sum.length_squared() == 0.0 {
                    return Vec3::Y; // Default up normal for degenerate cases
                }
                let average = sum / count as f32;
                if normalize {
                    average.normalize()
                } else {
                    average
                }
            })
            .collect();

        self.normals = Some(normals);
    }

    /// Recompute face and vertex normals from the current positions,
    /// replacing any stored ones.
    pub fn recompute_normals(&mut self) {
        self.compute_face_normals(false);
        self.compute_vertex_normals(true);
    }

    /// Derive whatever normals the source data lacked.
    /// Also recomputes vertex normals if their count doesn't match the vertex count.
    pub fn ensure_normals(&mut self) {
        if self.face_normals.is_none() {
            self.compute_face_normals(false);
        }

        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };
        if should_compute {
            log::debug!("Computing vertex normals for {} vertices", self.positions.len());
            self.compute_vertex_normals(true);
        }
    }

    /// Check if the mesh has vertex normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if the mesh has texture coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![0, 1, 2, 1, 3, 2], None)
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert!(!mesh.has_normals());
        assert!(!mesh.has_uvs());
        assert_eq!(mesh.face_vertices(1), [1, 3, 2]);
    }

    #[test]
    fn test_face_normal_area_weighted() {
        let mesh = quad();
        // Unit right triangle: |cross| = 2 * area = 1
        assert_eq!(mesh.face_normal(0, false), Vec3::new(0.0, 0.0, 1.0));

        let big = Mesh::new(
            vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)],
            vec![0, 1, 2],
            None,
        );
        assert_eq!(big.face_normal(0, false), Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(big.face_normal(0, true), Vec3::Z);
    }

    #[test]
    fn test_compute_vertex_normals_average() {
        // Two faces folded 90 degrees along the shared edge (v0-v1)
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let mut mesh = Mesh::new(positions, vec![0, 1, 2, 1, 0, 3], None);
        mesh.compute_face_normals(true);
        mesh.compute_vertex_normals(true);

        let normals = mesh.normals.as_ref().unwrap();
        let shared = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((normals[0] - shared).length() < 1e-5);
        assert!((normals[1] - shared).length() < 1e-5);
        assert!((normals[2] - Vec3::Z).length() < 1e-5);
        assert!((normals[3] - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_ensure_normals_keeps_existing() {
        let mut mesh = quad();
        mesh.normals = Some(vec![Vec3::X; 4]);
        mesh.ensure_normals();
        assert_eq!(mesh.normals.as_ref().unwrap()[0], Vec3::X);
        assert!(mesh.face_normals.is_some());
    }

    #[test]
    fn test_ensure_normals_replaces_mismatched() {
        let mut mesh = quad();
        mesh.normals = Some(vec![Vec3::X; 2]);
        mesh.ensure_normals();
        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.len(), 4);
        assert!((normals[0] - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_isolated_vertex_gets_default_normal() {
        let mut mesh = quad();
        mesh.positions.push(Vec3::new(5.0, 5.0, 5.0));
        mesh.ensure_normals();
        assert_eq!(mesh.normals.as_ref().unwrap()[4], Vec3::Y);
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2], None);

        let bounds = mesh.bounds();
        assert_eq!(bounds.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_validate_rejects_short_uvs() {
        let mesh = Mesh::new_with_uvs(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            None,
            Some(vec![Vec2::ZERO]),
        );
        let err = mesh.validate().unwrap_err();
        assert!(matches!(
            err,
            MeshError::AttributeCount { count: 1, expected: 3, .. }
        ));
    }

    #[test]
    fn test_validate_rejects_stale_face_normals() {
        let mut mesh = quad();
        mesh.face_normals = Some(vec![Vec3::Z]);
        assert!(matches!(
            mesh.validate().unwrap_err(),
            MeshError::AttributeCount { count: 1, expected: 2, .. }
        ));
    }

    #[test]
    fn test_recompute_normals_follows_positions() {
        let mut mesh = quad();
        mesh.ensure_normals();
        // Rotate the quad into the x=0 plane
        for p in &mut mesh.positions {
            *p = Vec3::new(0.0, p.y, -p.x);
        }
        mesh.recompute_normals();
        assert!((mesh.normals.as_ref().unwrap()[0] - Vec3::X).length() < 1e-5);
        assert!((mesh.face_normals.as_ref().unwrap()[1] - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_validate_index_out_of_range() {
        let mesh = Mesh::new(vec![Vec3::ZERO; 3], vec![0, 1, 7], None);
        let err = mesh.validate().unwrap_err();
        assert!(matches!(err, MeshError::IndexOutOfRange { face: 0, index: 7, .. }));
    }

    #[test]
    fn test_load_obj() {
        let _ = env_logger::builder().is_test(true).try_init();
        let path = std::env::temp_dir().join(format!("lumo_mesh_{}.obj", std::process::id()));
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             f 1/1 2/2 3/3 4/4\n",
        )
        .unwrap();

        let mesh = Mesh::load_obj(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2); // quad is triangulated
        assert!(mesh.has_uvs());
        assert!(!mesh.has_normals());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_obj_missing_file() {
        let err = Mesh::load_obj("/no/such/mesh.obj").unwrap_err();
        assert!(matches!(err, MeshError::Obj { .. }));
    }
}
