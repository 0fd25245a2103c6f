//! Scene assembly: from a parsed description to a renderable scene.

use crate::{
    AmbientLight, AreaLight, BvhNode, Camera, DielectricMaterial, Light, Material, PhongMaterial,
    PointLight, RenderConfig, Sphere, Surface, Texture, Triangle, TriangleMesh,
};
use lumo_core::{DiffuseDesc, LightDesc, MaterialDesc, MeshError, SceneDescription, SurfaceDesc};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Area lights need at least one shadow sample")]
    ZeroShadowSamples,

    #[error("Surface {surface} references undefined material {material}")]
    UndefinedMaterial { surface: usize, material: usize },

    #[error("Material {material} references undefined texture {texture}")]
    UndefinedTexture { material: usize, texture: usize },

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Everything the renderer needs: the accelerated world, lights and camera.
pub struct Scene {
    world: Option<BvhNode>,
    lights: Vec<Light>,
    camera: Camera,
}

impl Scene {
    /// Build the top-level BVH over `surfaces`.
    pub fn new(surfaces: Vec<Box<dyn Surface>>, lights: Vec<Light>, camera: Camera) -> Self {
        Self {
            world: BvhNode::build(surfaces, "Scene Objects"),
            lights,
            camera,
        }
    }

    /// Create materials, surfaces and lights from a description.
    ///
    /// Meshes are loaded here, and area lights take their sample count from
    /// `config.shadow_samples`.
    pub fn from_description(desc: &SceneDescription, config: &RenderConfig) -> SceneResult<Self> {
        let textures: Vec<Arc<Texture>> = desc
            .textures
            .iter()
            .map(|t| Arc::new(Texture::image(t.path.clone(), t.flip_x, t.flip_y)))
            .collect();

        let materials = desc
            .materials
            .iter()
            .enumerate()
            .map(|(index, material)| build_material(index, material, &textures))
            .collect::<SceneResult<Vec<_>>>()?;

        let mut surfaces: Vec<Box<dyn Surface>> = Vec::with_capacity(desc.surfaces.len());
        for (index, surface) in desc.surfaces.iter().enumerate() {
            let material = materials
                .get(surface.material())
                .cloned()
                .ok_or(SceneError::UndefinedMaterial {
                    surface: index,
                    material: surface.material(),
                })?;

            let surface: Box<dyn Surface> = match surface {
                SurfaceDesc::Sphere { center, radius, .. } => {
                    Box::new(Sphere::new(*center, *radius, material))
                }
                SurfaceDesc::Triangle { vertices, .. } => {
                    let [v0, v1, v2] = *vertices;
                    Box::new(Triangle::new(v0, v1, v2, material))
                }
                SurfaceDesc::Mesh { path, .. } => Box::new(TriangleMesh::load(path, material)?),
            };
            surfaces.push(surface);
        }

        let lights = desc
            .lights
            .iter()
            .map(|light| build_light(light, config))
            .collect::<SceneResult<Vec<_>>>()?;

        log::info!(
            "Scene assembled: {} surfaces, {} materials, {} textures, {} lights",
            surfaces.len(),
            materials.len(),
            textures.len(),
            lights.len()
        );

        Ok(Self::new(surfaces, lights, Camera::from_desc(&desc.camera)))
    }

    /// Root of the scene BVH; `None` when the scene has no surfaces.
    pub fn world(&self) -> Option<&dyn Surface> {
        self.world.as_ref().map(|world| world as &dyn Surface)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}

fn build_material(index: usize, desc: &MaterialDesc, textures: &[Arc<Texture>]) -> SceneResult<Arc<Material>> {
    let material = match desc {
        MaterialDesc::Phong {
            ambient,
            diffuse,
            specular,
            shininess,
            mirror,
        } => {
            let diffuse = match diffuse {
                DiffuseDesc::Color(color) => Arc::new(Texture::solid(*color)),
                DiffuseDesc::Texture(texture) => textures.get(*texture).cloned().ok_or(
                    SceneError::UndefinedTexture {
                        material: index,
                        texture: *texture,
                    },
                )?,
            };
            Material::Phong(PhongMaterial::new(*ambient, diffuse, *specular, *shininess, *mirror))
        }
        MaterialDesc::Dielectric { ior, attenuation } => {
            Material::Dielectric(DielectricMaterial::new(*ior, *attenuation))
        }
    };
    Ok(Arc::new(material))
}

fn build_light(desc: &LightDesc, config: &RenderConfig) -> SceneResult<Light> {
    let light = match *desc {
        LightDesc::Ambient { intensity } => Light::Ambient(AmbientLight::new(intensity)),
        LightDesc::Point {
            position,
            intensity,
        } => Light::Point(PointLight::new(position, intensity)),
        LightDesc::Area {
            center,
            normal,
            u,
            len,
            intensity,
        } => {
            let mut area = AreaLight::new(center, normal, u, len, intensity);
            area.set_shadow_samples(config.shadow_samples)?;
            Light::Area(area)
        }
    };
    Ok(light)
}
