//! End-to-end: scene text -> parse -> assemble -> shade and render.

use lumo_core::{parse_scene_file, ParseError};
use lumo_renderer::{
    render, shade, Color, HitRecord, Interval, Ray, RenderConfig, Scene, Surface, Vec2, Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

const SCENE: &str = "\
/ textured quad behind a red sphere
c 0 0 5  0 0 -1  1  2 2  16 16
l a 0.2 0.2 0.2
l p 0 3 3  10 10 10
l s 0 4 0  0 -1 0  1 0 0  1  2 2 2
i 1 0 0 checker.png
n 1  1 1 1  0 0 0  1  0 0 0
w quad.obj
m 0.8 0.1 0.1  0 0 0  1  0 0 0
s 0 0 0 0.5
";

const QUAD_OBJ: &str = "\
v -2 -2 -1
v 2 -2 -1
v 2 2 -1
v -2 2 -1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3
f 1/1 3/3 4/4
";

/// Write the scene, mesh and texture into a fresh directory.
fn write_fixture(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lumo_it_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("create fixture dir");

    fs::write(dir.join("scene.scn"), SCENE).expect("write scene");
    fs::write(dir.join("quad.obj"), QUAD_OBJ).expect("write obj");

    let checker = image::RgbImage::from_fn(2, 2, |x, y| match (x, y) {
        (0, 0) => image::Rgb([255, 0, 0]),
        (1, 0) => image::Rgb([0, 255, 0]),
        (0, 1) => image::Rgb([0, 0, 255]),
        _ => image::Rgb([255, 255, 255]),
    });
    checker.save(dir.join("checker.png")).expect("write texture");

    dir
}

fn load(dir: &Path, config: &RenderConfig) -> Scene {
    let _ = env_logger::builder().is_test(true).try_init();
    let desc = parse_scene_file(dir.join("scene.scn")).expect("scene parses");
    Scene::from_description(&desc, config).expect("scene assembles")
}

fn config() -> RenderConfig {
    RenderConfig {
        shadow_samples: 16,
        background: Color::new(0.0, 0.0, 0.25),
        bucket_size: 5,
        seed: 11,
        ..RenderConfig::default()
    }
}

#[test]
fn test_parse_and_assemble() {
    let dir = write_fixture("assemble");
    let scene = load(&dir, &config());

    assert_eq!(scene.lights().len(), 3);
    assert_eq!((scene.camera().image_width, scene.camera().image_height), (16, 16));

    let world = scene.world().expect("scene has surfaces");
    let bounds = world.bounds();
    assert_eq!(bounds.min(), Vec3::new(-2.0, -2.0, -1.0));
    assert_eq!(bounds.max(), Vec3::new(2.0, 2.0, 0.5));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_nearest_hit_and_mesh_attribution() {
    let dir = write_fixture("hits");
    let scene = load(&dir, &config());
    let world = scene.world().expect("scene has surfaces");
    let interval = Interval::new(1e-4, f32::INFINITY);

    // Centre ray: the sphere is in front of the quad
    let mut rec = HitRecord::default();
    assert!(world.hit(&Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z), interval, &mut rec));
    assert!((rec.t - 4.5).abs() < 1e-4);
    assert_eq!(rec.face_geo_uv.face_id, -1);
    assert_eq!(rec.surface.map(|s| s.name()), Some("Sphere"));

    // Off to the side: the quad, reported as the mesh with texture coordinates
    let mut rec = HitRecord::default();
    assert!(world.hit(&Ray::new(Vec3::new(1.5, 1.5, 5.0), -Vec3::Z), interval, &mut rec));
    assert!((rec.t - 6.0).abs() < 1e-4);
    assert!(rec.face_geo_uv.face_id >= 0);
    assert!(rec.surface.map_or(false, |s| s.name().ends_with("quad.obj")));
    assert!((rec.face_geo_uv.global_uv - Vec2::new(0.875, 0.875)).length() < 1e-4);
    assert!((rec.normal - Vec3::Z).length() < 1e-4);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_shading_layers_lights() {
    let dir = write_fixture("shade");
    let config = config();
    let scene = load(&dir, &config);
    let world = scene.world().expect("scene has surfaces");
    let ray = Ray::new(Vec3::new(1.5, 1.5, 5.0), -Vec3::Z);

    // Ambient only: textured material's ambient is white, so we get the ambient intensity
    let ambient = shade(&ray, world, &scene.lights()[..1], 0, &config, &mut StdRng::seed_from_u64(1));
    assert!((ambient - Color::splat(0.2)).length() < 1e-4);

    let lit = shade(&ray, world, scene.lights(), 0, &config, &mut StdRng::seed_from_u64(1));
    assert!(lit.x > ambient.x && lit.y > ambient.y && lit.z > ambient.z);

    // Misses see the background
    let miss = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
    assert_eq!(shade(&miss, world, scene.lights(), 0, &config, &mut StdRng::seed_from_u64(1)), config.background);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_render_writes_png() {
    let dir = write_fixture("render");
    let config = config();
    let scene = load(&dir, &config);

    let image = render(&scene, &config);
    assert_eq!((image.width, image.height), (16, 16));

    // Same seed, same picture
    let again = render(&scene, &config);
    assert_eq!(image.pixels, again.pixels);

    // Corners see past the quad into the background
    assert_eq!(image.get(0, 0), config.background);

    // The sphere in the middle is red-dominated
    let centre = image.get(8, 8);
    assert!(centre.x > centre.y && centre.x > centre.z);

    let output = dir.join("out.png");
    image.save(&output).expect("write png");
    let decoded = image::open(&output).expect("read back png").to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 16));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_missing_camera_is_reported() {
    let dir = std::env::temp_dir().join(format!("lumo_it_nocam_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create fixture dir");
    fs::write(dir.join("scene.scn"), "m 1 1 1 0 0 0 1 0 0 0\ns 0 0 0 1\n").expect("write scene");

    assert!(matches!(
        parse_scene_file(dir.join("scene.scn")),
        Err(ParseError::CameraCount(0))
    ));

    let _ = fs::remove_dir_all(dir);
}
