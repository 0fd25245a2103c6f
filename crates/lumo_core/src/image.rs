//! Decoded RGB images for image textures.
//!
//! Decoding is the only I/O the shading core performs. It produces an 8-bit
//! RGB grid or an explicit [`DecodeError`]; callers decide how to degrade.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while decoding a texture image.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("Unsupported bit depth in {path}: {bits} bits per channel (expected 8)")]
    UnsupportedDepth { path: PathBuf, bits: u16 },

    #[error("Unsupported number of channels in {path}: {channels}")]
    UnsupportedChannels { path: PathBuf, channels: u8 },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// A grid of 8-bit RGB samples in row-major order, row 0 first.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbGrid {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl RgbGrid {
    /// Create a grid from pixel data. Missing pixels are filled with black.
    pub fn new(width: u32, height: u32, mut pixels: Vec<[u8; 3]>) -> Self {
        pixels.resize((width * height) as usize, [0, 0, 0]);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get pixel at integer coordinates, clamped to the grid.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or([0, 0, 0])
    }

    /// Mirror the grid horizontally (`flip_x`) and/or vertically (`flip_y`).
    pub fn flipped(&self, flip_x: bool, flip_y: bool) -> Self {
        if !flip_x && !flip_y {
            return self.clone();
        }

        let (w, h) = (self.width, self.height);
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for y in 0..h {
            let src_y = if flip_y { h - 1 - y } else { y };
            for x in 0..w {
                let src_x = if flip_x { w - 1 - x } else { x };
                pixels.push(self.pixel(src_x, src_y));
            }
        }
        Self::new(w, h, pixels)
    }
}

/// Decode an image file into an 8-bit RGB grid.
///
/// Grayscale is expanded to RGB and alpha is dropped. Anything that is not
/// 8 bits per channel is rejected.
pub fn decode_rgb8(path: &Path, flip_x: bool, flip_y: bool) -> DecodeResult<RgbGrid> {
    let img = ::image::open(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let color = img.color();
    let channels = color.channel_count();
    let bits = color.bits_per_pixel() / channels as u16;
    if bits != 8 {
        return Err(DecodeError::UnsupportedDepth {
            path: path.to_path_buf(),
            bits,
        });
    }
    if !matches!(channels, 1 | 3 | 4) {
        return Err(DecodeError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels,
        });
    }

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels = rgb.pixels().map(|p| p.0).collect();

    log::info!(
        "Decoded image {} ({}x{}, {} channel(s))",
        path.display(),
        width,
        height,
        channels
    );

    Ok(RgbGrid::new(width, height, pixels).flipped(flip_x, flip_y))
}
