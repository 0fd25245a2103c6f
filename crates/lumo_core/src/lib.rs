//! Lumo Core - renderer-agnostic scene data.
//!
//! This crate provides:
//!
//! - **Mesh data**: `Mesh` with OBJ loading and normal derivation
//! - **Images**: `RgbGrid` and the 8-bit RGB decode service used by image textures
//! - **Scene description**: plain data produced by the scene-file parser
//!
//! # Example
//!
//! ```ignore
//! use lumo_core::parser::parse_scene_file;
//!
//! let desc = parse_scene_file("scenes/spheres.scn")?;
//! println!("Loaded {} surfaces, {} lights", desc.surfaces.len(), desc.lights.len());
//! ```

pub mod image;
pub mod mesh;
pub mod parser;
pub mod scene;

// Re-export commonly used types
pub use self::image::{decode_rgb8, DecodeError, RgbGrid};
pub use mesh::{Mesh, MeshError, MeshResult};
pub use parser::{parse_scene_file, parse_scene_str, ParseError};
pub use scene::{
    CameraDesc, DiffuseDesc, ImageTextureDesc, LightDesc, MaterialDesc, SceneDescription,
    SurfaceDesc,
};
