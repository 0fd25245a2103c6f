//! Textures: constant colours and lazily decoded images.
//!
//! Every texture applies a per-channel `gain` and `bias` to its base colour.

use crate::Color;
use lumo_core::{decode_rgb8, RgbGrid};
use lumo_math::{Vec2, Vec3};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// A texture: a base colour source plus gain and bias.
pub struct Texture {
    kind: TextureKind,
    gain: Color,
    bias: Color,
}

/// Base colour source of a texture.
pub enum TextureKind {
    Solid(Color),
    Image(ImageTexture),
}

impl Texture {
    /// Constant colour texture.
    pub fn solid(color: Color) -> Self {
        Self::from_kind(TextureKind::Solid(color))
    }

    /// Image texture, decoded on first use.
    pub fn image(path: impl Into<PathBuf>, flip_x: bool, flip_y: bool) -> Self {
        Self::from_kind(TextureKind::Image(ImageTexture::new(path, flip_x, flip_y)))
    }

    /// Image texture over already decoded pixels.
    pub fn from_grid(grid: RgbGrid) -> Self {
        Self::from_kind(TextureKind::Image(ImageTexture::from_grid(grid)))
    }

    fn from_kind(kind: TextureKind) -> Self {
        Self {
            kind,
            gain: Color::ONE,
            bias: Color::ZERO,
        }
    }

    pub fn with_gain(mut self, gain: Color) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_bias(mut self, bias: Color) -> Self {
        self.bias = bias;
        self
    }

    /// Colour at texture coordinates `uv` (point `p` is unused by current kinds).
    ///
    /// An image that cannot be sampled contributes only the bias.
    pub fn value(&self, uv: Vec2, _p: Vec3) -> Color {
        let base = match &self.kind {
            TextureKind::Solid(color) => Some(*color),
            TextureKind::Image(image) => image.sample(uv),
        };

        match base {
            Some(color) => color * self.gain + self.bias,
            None => self.bias,
        }
    }
}

struct ImageState {
    path: PathBuf,
    flip_x: bool,
    flip_y: bool,
    grid: Option<Arc<RgbGrid>>,
}

/// An image decoded into an RGB grid on first use.
///
/// Decoding happens under the write lock and the reload flag is rechecked
/// after taking it, so concurrent samplers decode at most once and never
/// read a partially loaded grid.
pub struct ImageTexture {
    state: RwLock<ImageState>,
    needs_reload: AtomicBool,
}

impl ImageTexture {
    pub fn new(path: impl Into<PathBuf>, flip_x: bool, flip_y: bool) -> Self {
        Self {
            state: RwLock::new(ImageState {
                path: path.into(),
                flip_x,
                flip_y,
                grid: None,
            }),
            needs_reload: AtomicBool::new(true),
        }
    }

    pub fn from_grid(grid: RgbGrid) -> Self {
        Self {
            state: RwLock::new(ImageState {
                path: PathBuf::new(),
                flip_x: false,
                flip_y: false,
                grid: Some(Arc::new(grid)),
            }),
            needs_reload: AtomicBool::new(false),
        }
    }

    /// Point the texture at a new file. The next sample decodes it.
    pub fn set_image_path(&self, path: impl Into<PathBuf>, flip_x: bool, flip_y: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.path = path.into();
        state.flip_x = flip_x;
        state.flip_y = flip_y;
        self.needs_reload.store(true, Ordering::Release);
    }

    pub fn path(&self) -> PathBuf {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .path
            .clone()
    }

    /// The decoded grid, decoding first if needed. `None` if decoding failed.
    pub fn grid(&self) -> Option<Arc<RgbGrid>> {
        if self.needs_reload.load(Ordering::Acquire) {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if self.needs_reload.load(Ordering::Acquire) {
                state.grid = Self::decode(&state.path, state.flip_x, state.flip_y);
                self.needs_reload.store(false, Ordering::Release);
            }
        }

        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .grid
            .clone()
    }

    fn decode(path: &Path, flip_x: bool, flip_y: bool) -> Option<Arc<RgbGrid>> {
        match decode_rgb8(path, flip_x, flip_y) {
            Ok(grid) => {
                if grid.width() < 2 || grid.height() < 2 {
                    log::warn!(
                        "Image {} is {}x{}; textures need at least 2x2 pixels",
                        path.display(),
                        grid.width(),
                        grid.height()
                    );
                }
                Some(Arc::new(grid))
            }
            Err(e) => {
                log::error!("Image texture disabled: {}", e);
                None
            }
        }
    }

    /// Bilinearly filtered colour at `uv`, with `uv` clamped to the unit square.
    pub fn sample(&self, uv: Vec2) -> Option<Color> {
        let grid = self.grid()?;
        let (width, height) = (grid.width(), grid.height());
        if width < 2 || height < 2 {
            return None;
        }

        let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
        let x = uv.x * (width - 1) as f32;
        let y = uv.y * (height - 1) as f32;

        let x0 = (x.floor() as u32).min(width - 1);
        let y0 = (y.floor() as u32).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);
        let y1 = (y0 + 1).min(height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let texel = |x, y| Vec3::from(grid.pixel(x, y).map(f32::from));
        let top = texel(x0, y0).lerp(texel(x1, y0), fx);
        let bottom = texel(x0, y1).lerp(texel(x1, y1), fx);

        Some(top.lerp(bottom, fy) / 255.0)
    }
}
