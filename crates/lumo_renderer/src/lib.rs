//! Lumo renderer - ray tracing core.
//!
//! This crate provides:
//!
//! - **Geometry**: spheres, triangles and triangle meshes behind the `Surface` trait
//! - **Acceleration**: a median-split `BvhNode` over any set of surfaces
//! - **Shading**: textures, Blinn-Phong and dielectric materials, ambient/point/area lights
//! - **Rendering**: a pinhole camera and a parallel bucket renderer
//!
//! # Example
//!
//! ```ignore
//! use lumo_core::parse_scene_file;
//! use lumo_renderer::{render, RenderConfig, Scene};
//!
//! let config = RenderConfig::default();
//! let scene = Scene::from_description(&parse_scene_file("scene.scn")?, &config)?;
//! render(&scene, &config).save("out.png")?;
//! ```

pub mod bucket;
pub mod bvh;
pub mod camera;
pub mod hit_record;
pub mod light;
pub mod material;
pub mod renderer;
pub mod scene;
pub mod sphere;
pub mod surface;
pub mod texture;
pub mod triangle;
pub mod trimesh;

// Re-export commonly used types
pub use bucket::{generate_buckets, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use hit_record::{FaceGeoUV, HitRecord};
pub use light::{AmbientLight, AreaLight, Light, PointLight};
pub use material::{DielectricMaterial, Material, PhongMaterial, BACK_FACE_COLOR};
pub use renderer::{render, render_pixel, shade, ImageBuffer, RenderConfig};
pub use scene::{Scene, SceneError, SceneResult};
pub use sphere::Sphere;
pub use surface::{BoundsCache, Surface, SurfaceList};
pub use texture::{ImageTexture, Texture, TextureKind};
pub use triangle::Triangle;
pub use trimesh::{MeshFace, TriangleMesh};

pub use lumo_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Color type alias (linear RGB)
pub type Color = Vec3;
