//! `lumo` - render a scene file to a PNG.

use anyhow::{Context, Result};
use clap::Parser;
use lumo_core::parse_scene_file;
use lumo_renderer::{render, RenderConfig, Scene};
use std::path::PathBuf;
use std::time::Instant;

/// Command line arguments. Log verbosity follows RUST_LOG (default: info).
#[derive(Debug, Parser)]
#[command(name = "lumo")]
#[command(about = "Offline ray tracer: renders a scene description to PNG")]
struct Args {
    /// Scene description to render
    #[arg(short, long)]
    scene: PathBuf,

    /// Output image (PNG)
    #[arg(short, long)]
    output: PathBuf,

    /// Samples per pixel
    #[arg(short = 'a', long = "samples", default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    samples_per_pixel: u32,

    /// Shadow samples per area light
    #[arg(short = 'd', long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    shadow_samples: u32,

    /// Random seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Maximum mirror/refraction bounces
    #[arg(long, default_value = "5")]
    max_depth: u32,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: self.samples_per_pixel,
            shadow_samples: self.shadow_samples,
            max_depth: self.max_depth,
            seed: self.seed,
            ..RenderConfig::default()
        }
    }
}

fn run(args: Args) -> Result<()> {
    let start = Instant::now();
    let config = args.render_config();

    let description = parse_scene_file(&args.scene)
        .with_context(|| format!("failed to parse scene {}", args.scene.display()))?;
    let scene = Scene::from_description(&description, &config)
        .with_context(|| format!("failed to build scene {}", args.scene.display()))?;
    log::info!("Scene ready in {:.2?}", start.elapsed());

    let image = render(&scene, &config);
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!(
        "Wrote {} ({}x{}) in {:.2?} total",
        args.output.display(),
        image.width,
        image.height,
        start.elapsed()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("lumo").chain(list.iter().copied()))
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_minimal() {
        let args = parse(&["-s", "scene.scn", "-o", "out.png"]).expect("valid");
        assert_eq!(args.scene, PathBuf::from("scene.scn"));
        assert_eq!(args.output, PathBuf::from("out.png"));
        assert_eq!(args.render_config(), RenderConfig::default());
    }

    #[test]
    fn test_parse_all_options() {
        let args = parse(&[
            "--scene", "a.scn", "--output", "b.png", "-a", "16", "-d", "25", "--seed", "7", "--max-depth", "2",
        ])
        .expect("valid");
        let config = args.render_config();
        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.shadow_samples, 25);
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_depth, 2);
    }

    #[test]
    fn test_errors() {
        assert!(parse(&["-o", "out.png"]).is_err());
        assert!(parse(&["-s", "a.scn"]).is_err());
        assert!(parse(&["-s", "a.scn", "-o", "b.png", "-a", "many"]).is_err());
        assert!(parse(&["-s", "a.scn", "-o", "b.png", "-a", "0"]).is_err());
        assert!(parse(&["-s", "a.scn", "-o", "b.png", "-d", "0"]).is_err());
        assert!(parse(&["-s", "a.scn", "-o", "b.png", "--bogus"]).is_err());
        assert!(parse(&["-s"]).is_err());
    }
}
