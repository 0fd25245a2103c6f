//! Scene description types.
//!
//! Plain data produced by the scene-file parser. The renderer turns a
//! `SceneDescription` into shared materials, surfaces and lights.

use std::path::PathBuf;

use lumo_math::Vec3;

/// Source of a Phong material's diffuse colour.
#[derive(Clone, Debug, PartialEq)]
pub enum DiffuseDesc {
    /// Constant colour
    Color(Vec3),
    /// Index into `SceneDescription::textures`
    Texture(usize),
}

/// Material definition.
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialDesc {
    Phong {
        ambient: Vec3,
        diffuse: DiffuseDesc,
        specular: Vec3,
        shininess: f32,
        mirror: Vec3,
    },
    Dielectric {
        ior: f32,
        attenuation: Vec3,
    },
}

/// Image texture definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTextureDesc {
    pub path: PathBuf,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Geometry definition. `material` indexes `SceneDescription::materials`.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceDesc {
    Sphere {
        center: Vec3,
        radius: f32,
        material: usize,
    },
    Triangle {
        vertices: [Vec3; 3],
        material: usize,
    },
    Mesh {
        path: PathBuf,
        material: usize,
    },
}

impl SurfaceDesc {
    pub fn material(&self) -> usize {
        match self {
            SurfaceDesc::Sphere { material, .. }
            | SurfaceDesc::Triangle { material, .. }
            | SurfaceDesc::Mesh { material, .. } => *material,
        }
    }
}

/// Light definition.
#[derive(Clone, Debug, PartialEq)]
pub enum LightDesc {
    Ambient {
        intensity: Vec3,
    },
    Point {
        position: Vec3,
        intensity: Vec3,
    },
    /// Square emitter of side `len` spanned by `u` and `u x normal`.
    Area {
        center: Vec3,
        normal: Vec3,
        u: Vec3,
        len: f32,
        intensity: Vec3,
    },
}

/// Pinhole camera definition.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraDesc {
    pub eye: Vec3,
    pub view_dir: Vec3,
    pub focal_length: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub image_width: u32,
    pub image_height: u32,
}

/// Everything a scene file describes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    pub surfaces: Vec<SurfaceDesc>,
    pub materials: Vec<MaterialDesc>,
    pub textures: Vec<ImageTextureDesc>,
    pub lights: Vec<LightDesc>,
    pub camera: CameraDesc,
}
