//! Scene file parser.
//!
//! Line-oriented text format, one command per line:
//!
//! - `s x y z r` sphere
//! - `t ax ay az bx by bz cx cy cz` triangle
//! - `w path` OBJ triangle mesh (relative to the scene file)
//! - `m dr dg db sr sg sb shininess ir ig ib` Phong material
//! - `n ti dr dg db sr sg sb shininess ir ig ib` Phong material with image texture `ti`
//! - `i ti flipx flipy path` image texture definition
//! - `d ior ar ag ab` dielectric material
//! - `c x y z vx vy vz focal vw vh pw ph` camera
//! - `l p x y z r g b` point light, `l a r g b` ambient light,
//!   `l s x y z nx ny nz ux uy uz len r g b` square area light
//!
//! Lines starting with `/` are comments; unknown commands are ignored.
//! Surfaces use the most recently defined material.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::SplitWhitespace;

use lumo_math::Vec3;
use thiserror::Error;

use crate::scene::*;

/// Errors that can occur during scene parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Line {0}: surface defined before any material")]
    MissingMaterial(usize),

    #[error("Line {line}: image texture id {id} is not defined")]
    UndefinedTexture { line: usize, id: i64 },

    #[error("Line {line}: image texture id {id} is already defined")]
    DuplicateTexture { line: usize, id: i64 },

    #[error("Scene must contain exactly one camera, found {0}")]
    CameraCount(usize),

    #[error("Scene may contain at most one ambient light, found {0}")]
    AmbientCount(usize),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a scene file. Relative paths inside it resolve against its directory.
pub fn parse_scene_file(path: impl AsRef<Path>) -> ParseResult<SceneDescription> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene_str(&content, base_dir)
}

/// Parse scene text, resolving relative paths against `base_dir`.
pub fn parse_scene_str(content: &str, base_dir: &Path) -> ParseResult<SceneDescription> {
    let mut parser = SceneParser::new(base_dir);
    for (i, line) in content.lines().enumerate() {
        parser.parse_line(i + 1, line)?;
    }
    parser.finish()
}

/// Parser state carried from line to line.
struct SceneParser {
    base_dir: PathBuf,
    surfaces: Vec<SurfaceDesc>,
    materials: Vec<MaterialDesc>,
    textures: Vec<ImageTextureDesc>,
    texture_ids: HashMap<i64, usize>,
    lights: Vec<LightDesc>,
    cameras: Vec<CameraDesc>,
    ambient_count: usize,
}

/// Tokens of one line, with the line number for error messages.
struct Tokens<'a> {
    line: usize,
    iter: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn word(&mut self, what: &str) -> ParseResult<&'a str> {
        self.iter
            .next()
            .ok_or_else(|| self.error(format!("missing {}", what)))
    }

    fn real(&mut self, what: &str) -> ParseResult<f32> {
        let word = self.word(what)?;
        word.parse::<f32>()
            .map_err(|_| self.error(format!("invalid number for {}: {}", what, word)))
    }

    fn integer(&mut self, what: &str) -> ParseResult<i64> {
        let word = self.word(what)?;
        word.parse::<i64>()
            .map_err(|_| self.error(format!("invalid integer for {}: {}", what, word)))
    }

    fn vec3(&mut self, what: &str) -> ParseResult<Vec3> {
        Ok(Vec3::new(self.real(what)?, self.real(what)?, self.real(what)?))
    }
}

impl SceneParser {
    fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            surfaces: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            texture_ids: HashMap::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            ambient_count: 0,
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn current_material(&self, line: usize) -> ParseResult<usize> {
        self.materials
            .len()
            .checked_sub(1)
            .ok_or(ParseError::MissingMaterial(line))
    }

    fn parse_line(&mut self, line: usize, text: &str) -> ParseResult<()> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('/') {
            return Ok(());
        }

        let mut tokens = Tokens {
            line,
            iter: text.split_whitespace(),
        };
        let command = tokens.word("command")?;

        match command {
            "s" => {
                let center = tokens.vec3("sphere center")?;
                let radius = tokens.real("sphere radius")?;
                let material = self.current_material(line)?;
                self.surfaces.push(SurfaceDesc::Sphere {
                    center,
                    radius,
                    material,
                });
            }
            "t" => {
                let vertices = [
                    tokens.vec3("triangle vertex")?,
                    tokens.vec3("triangle vertex")?,
                    tokens.vec3("triangle vertex")?,
                ];
                let material = self.current_material(line)?;
                self.surfaces.push(SurfaceDesc::Triangle { vertices, material });
            }
            "w" => {
                let path = self.resolve(tokens.word("mesh path")?);
                let material = self.current_material(line)?;
                self.surfaces.push(SurfaceDesc::Mesh { path, material });
            }
            "m" => {
                let diffuse = tokens.vec3("diffuse")?;
                let material = Self::phong(&mut tokens, diffuse, DiffuseDesc::Color(diffuse))?;
                self.materials.push(material);
            }
            "n" => {
                let id = tokens.integer("texture id")?;
                let diffuse = tokens.vec3("diffuse")?;
                let texture = *self
                    .texture_ids
                    .get(&id)
                    .ok_or(ParseError::UndefinedTexture { line, id })?;
                let material = Self::phong(&mut tokens, diffuse, DiffuseDesc::Texture(texture))?;
                self.materials.push(material);
            }
            "i" => {
                let id = tokens.integer("texture id")?;
                let flip_x = tokens.integer("flipx")? != 0;
                let flip_y = tokens.integer("flipy")? != 0;
                let path = self.resolve(tokens.word("texture path")?);
                if self.texture_ids.contains_key(&id) {
                    return Err(ParseError::DuplicateTexture { line, id });
                }
                self.texture_ids.insert(id, self.textures.len());
                self.textures.push(ImageTextureDesc {
                    path,
                    flip_x,
                    flip_y,
                });
            }
            "d" => {
                let ior = tokens.real("index of refraction")?;
                let attenuation = tokens.vec3("attenuation")?;
                self.materials
                    .push(MaterialDesc::Dielectric { ior, attenuation });
            }
            "c" => {
                let camera = Self::camera(&mut tokens)?;
                self.cameras.push(camera);
            }
            "l" => self.light(&mut tokens)?,
            _ => log::debug!("Line {}: ignoring unknown command '{}'", line, command),
        }

        Ok(())
    }

    /// Remaining fields of `m`/`n` after the diffuse colour.
    fn phong(tokens: &mut Tokens, diffuse: Vec3, source: DiffuseDesc) -> ParseResult<MaterialDesc> {
        let specular = tokens.vec3("specular")?;
        let shininess = tokens.real("shininess")?;
        let mirror = tokens.vec3("mirror")?;
        Ok(MaterialDesc::Phong {
            ambient: diffuse.max(Vec3::splat(0.01)),
            diffuse: source,
            specular,
            shininess,
            mirror,
        })
    }

    fn camera(tokens: &mut Tokens) -> ParseResult<CameraDesc> {
        let eye = tokens.vec3("camera position")?;
        let view_dir = tokens.vec3("view direction")?;
        let focal_length = tokens.real("focal length")?;
        let viewport_width = tokens.real("viewport width")?;
        let viewport_height = tokens.real("viewport height")?;
        let image_width = tokens.real("image width")?;
        let image_height = tokens.real("image height")?;

        if view_dir.length_squared() == 0.0 {
            return Err(tokens.error("camera view direction must be nonzero"));
        }
        let viewport_aspect = viewport_width / viewport_height;
        if !viewport_aspect.is_finite() || viewport_aspect <= 0.0 {
            return Err(tokens.error(format!(
                "camera has bad viewport aspect ratio: {}",
                viewport_aspect
            )));
        }
        if image_width < 1.0 || image_height < 1.0 {
            return Err(tokens.error("camera image size must be positive"));
        }
        let image_aspect = image_width / image_height;
        if (viewport_aspect - image_aspect).abs() > lumo_math::EPSILON {
            log::warn!(
                "Camera viewport aspect ({}) differs from image aspect ({}); \
                 pixels will not be square",
                viewport_aspect,
                image_aspect
            );
        }

        Ok(CameraDesc {
            eye,
            view_dir: view_dir.normalize(),
            focal_length,
            viewport_width,
            viewport_height,
            image_width: image_width as u32,
            image_height: image_height as u32,
        })
    }

    fn light(&mut self, tokens: &mut Tokens) -> ParseResult<()> {
        match tokens.word("light type")? {
            "p" => {
                let position = tokens.vec3("light position")?;
                let intensity = tokens.vec3("light intensity")?;
                self.lights.push(LightDesc::Point {
                    position,
                    intensity,
                });
            }
            "a" => {
                let intensity = tokens.vec3("ambient intensity")?;
                self.lights.push(LightDesc::Ambient { intensity });
                self.ambient_count += 1;
            }
            "s" => {
                let center = tokens.vec3("light center")?;
                let normal = tokens.vec3("light normal")?;
                let u = tokens.vec3("light u axis")?;
                let len = tokens.real("light size")?;
                let intensity = tokens.vec3("light intensity")?;
                self.lights.push(LightDesc::Area {
                    center,
                    normal,
                    u,
                    len,
                    intensity,
                });
            }
            other => log::debug!("Line {}: ignoring unknown light type '{}'", tokens.line, other),
        }
        Ok(())
    }

    fn finish(mut self) -> ParseResult<SceneDescription> {
        if self.cameras.len() != 1 {
            return Err(ParseError::CameraCount(self.cameras.len()));
        }
        if self.ambient_count > 1 {
            return Err(ParseError::AmbientCount(self.ambient_count));
        }
        if self.surfaces.is_empty() {
            log::warn!("Scene does not contain any surfaces");
        }

        log::info!(
            "Read {} surface(s), {} material(s), {} texture(s) and {} light(s)",
            self.surfaces.len(),
            self.materials.len(),
            self.textures.len(),
            self.lights.len()
        );

        let camera = self.cameras.remove(0);
        Ok(SceneDescription {
            surfaces: self.surfaces,
            materials: self.materials,
            textures: self.textures,
            lights: self.lights,
            camera,
        })
    }
}
