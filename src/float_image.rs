//! Floating-point image grid.
//!
//! The bloom math runs on f64 pixel data in [0, 1] (HDR values above 1.0
//! are allowed until tone mapping), stored as an `ndarray::Array3` of shape
//! rows × cols × channels. Images with an alpha plane keep it end to end;
//! the bloom never touches alpha, and RGB inputs are written back as RGB so
//! formats without alpha support stay valid.

use crate::error::{BloomError, Result};
use image::{ImageBuffer, Rgb, Rgba};
use ndarray::Array3;
use std::path::Path;

use crate::color::luminance;

/// A decoded image as an f64 grid, addressed by (row, col).
#[derive(Debug, Clone)]
pub struct FloatImage {
    data: Array3<f64>,
}

impl FloatImage {
    /// Create a black image with the given shape. `channels` must be 3 or 4.
    pub fn new(rows: usize, cols: usize, channels: usize) -> Result<Self> {
        if channels != 3 && channels != 4 {
            return Err(BloomError::InvalidParameter(format!(
                "Unsupported channel count: {} (expected 3 or 4)",
                channels
            )));
        }
        let mut data = Array3::zeros((rows, cols, channels));
        if channels == 4 {
            data.slice_mut(ndarray::s![.., .., 3]).fill(1.0);
        }
        Ok(Self { data })
    }

    /// Decode an image file into float pixel data.
    ///
    /// Inputs with an alpha plane decode to 4 channels, everything else to 3.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            BloomError::Decode(format!("Failed to load {}: {}", path.display(), e))
        })?;

        let data = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            Array3::from_shape_fn((height as usize, width as usize, 4), |(i, j, ch)| {
                rgba.get_pixel(j as u32, i as u32)[ch] as f64 / 255.0
            })
        } else {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            Array3::from_shape_fn((height as usize, width as usize, 3), |(i, j, ch)| {
                rgb.get_pixel(j as u32, i as u32)[ch] as f64 / 255.0
            })
        };

        Ok(Self { data })
    }

    /// Encode back to an image file, quantizing each component to 8 bits.
    ///
    /// Components are clamped to [0, 1] here as a safety net; tone mapping
    /// should already have brought the data into range.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let (rows, cols) = self.dims();
        let quantize = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

        if self.channels() == 4 {
            let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(
                cols as u32,
                rows as u32,
                |x, y| {
                    let (i, j) = (y as usize, x as usize);
                    Rgba([
                        quantize(self.data[[i, j, 0]]),
                        quantize(self.data[[i, j, 1]]),
                        quantize(self.data[[i, j, 2]]),
                        quantize(self.data[[i, j, 3]]),
                    ])
                },
            );
            img.save(path)?;
        } else {
            let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(
                cols as u32,
                rows as u32,
                |x, y| {
                    let (i, j) = (y as usize, x as usize);
                    Rgb([
                        quantize(self.data[[i, j, 0]]),
                        quantize(self.data[[i, j, 1]]),
                        quantize(self.data[[i, j, 2]]),
                    ])
                },
            );
            img.save(path)?;
        }
        Ok(())
    }

    /// (rows, cols)
    pub fn dims(&self) -> (usize, usize) {
        let shape = self.data.shape();
        (shape[0], shape[1])
    }

    pub fn rows(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn cols(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn channels(&self) -> usize {
        self.data.shape()[2]
    }

    /// RGB components at (row, col); alpha, if any, is skipped.
    pub fn rgb(&self, coord: (usize, usize)) -> [f64; 3] {
        let (i, j) = coord;
        [
            self.data[[i, j, 0]],
            self.data[[i, j, 1]],
            self.data[[i, j, 2]],
        ]
    }

    /// Overwrite the RGB components at (row, col); alpha untouched.
    pub fn set_rgb(&mut self, coord: (usize, usize), rgb: [f64; 3]) {
        let (i, j) = coord;
        self.data[[i, j, 0]] = rgb[0];
        self.data[[i, j, 1]] = rgb[1];
        self.data[[i, j, 2]] = rgb[2];
    }

    /// Add per-channel deltas onto the RGB components at (row, col).
    pub fn add_rgb(&mut self, coord: (usize, usize), delta: [f64; 3]) {
        let (i, j) = coord;
        self.data[[i, j, 0]] += delta[0];
        self.data[[i, j, 1]] += delta[1];
        self.data[[i, j, 2]] += delta[2];
    }

    /// Scan the whole image for its maximum relative luminance.
    pub fn max_luminance(&self) -> f64 {
        let (rows, cols) = self.dims();
        let mut max_lum = 0.0;
        for i in 0..rows {
            for j in 0..cols {
                let lum = luminance(self.rgb((i, j)));
                if lum > max_lum {
                    max_lum = lum;
                }
            }
        }
        max_lum
    }
}

/// Whether a signed (row, col) candidate lies inside an image of the given
/// (rows, cols) dimensions.
pub fn in_bounds(coord: (i64, i64), dims: (usize, usize)) -> bool {
    coord.0 >= 0 && (coord.0 as usize) < dims.0 && coord.1 >= 0 && (coord.1 as usize) < dims.1
}
