//! Owned `f32` image with the geometric operations used for augmentation.
//!
//! Pixel `(row, col)` has its center at `(x = col, y = row)`; the grasp
//! rectangles use the same convention, so a transform applied to both keeps
//! labels on their pixels.

use crate::error::{BoundsError, ImageError};
use crate::geometry::{rotate_point, scale_point};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Value used when a resampled pixel maps outside the source image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Fill with a fixed value.
    Constant(f32),
    /// Mirror the image about its edge, repeating the edge pixel.
    Symmetric,
}

impl Default for BorderMode {
    fn default() -> Self {
        BorderMode::Constant(0.0)
    }
}

/// Row-major image with interleaved channels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<f32>, // len = w*h*c
}

impl Image {
    pub fn zeros(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0.0; width * height * channels],
        }
    }

    /// Wrap an existing buffer, validating its length.
    pub fn from_raw(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, ImageError> {
        if channels == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        let Some(expected) = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
        else {
            return Err(ImageError::InvalidDimensions { width, height });
        };
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn from_rgb8(img: &::image::RgbImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            channels: 3,
            data: img.as_raw().iter().map(|&v| v as f32).collect(),
        }
    }

    /// Convert back to 8-bit RGB, rounding and clamping to `0..=255`.
    pub fn to_rgb8(&self) -> Result<::image::RgbImage, ImageError> {
        if self.channels != 3 {
            return Err(ImageError::ChannelMismatch {
                expected: 3,
                got: self.channels,
            });
        }
        let raw: Vec<u8> = self.data.iter().map(|&v| to_u8(v)).collect();
        ::image::RgbImage::from_raw(self.width as u32, self.height as u32, raw).ok_or(
            ImageError::InvalidDimensions {
                width: self.width,
                height: self.height,
            },
        )
    }

    /// `(height, width, channels)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    /// Pivot used by [`Image::zoom`]: `(width / 2, height / 2)` in integer pixels.
    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new((self.width / 2) as f64, (self.height / 2) as f64)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> f32 {
        self.data[(row * self.width + col) * self.channels + channel]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: f32) {
        self.data[(row * self.width + col) * self.channels + channel] = value;
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }

    /// Rotate the content by `angle` radians (counter-clockwise on screen)
    /// about `center`.
    pub fn rotate(&mut self, angle: f64, center: Point2<f64>, border: BorderMode) {
        if angle == 0.0 {
            return;
        }
        // Inverse map: output pixel -> source pixel.
        self.warp(border, |p| rotate_point(p, center, -angle));
    }

    /// Keep rows `top..bottom` and columns `left..right`.
    ///
    /// `top_left` and `bottom_right` are `(row, col)`; `bottom_right` is
    /// exclusive.
    pub fn crop(
        &mut self,
        top_left: (usize, usize),
        bottom_right: (usize, usize),
    ) -> Result<(), BoundsError> {
        let (top, left) = top_left;
        let (bottom, right) = bottom_right;
        if top >= bottom || left >= right || bottom > self.height || right > self.width {
            return Err(BoundsError {
                top,
                left,
                bottom,
                right,
                height: self.height,
                width: self.width,
            });
        }

        let out_w = right - left;
        let row_len = out_w * self.channels;
        let mut out = Vec::with_capacity((bottom - top) * row_len);
        for row in top..bottom {
            let start = (row * self.width + left) * self.channels;
            out.extend_from_slice(&self.data[start..start + row_len]);
        }
        self.data = out;
        self.width = out_w;
        self.height = bottom - top;
        Ok(())
    }

    /// Resample about [`Image::center`] so that output pixel `p` shows source
    /// point `center + (p - center) * factor`.
    ///
    /// `factor < 1` magnifies. This is the inverse of
    /// `GraspRectangles::zoom(factor, center)`.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not finite and strictly positive.
    pub fn zoom(&mut self, factor: f64, border: BorderMode) {
        assert!(
            factor.is_finite() && factor > 0.0,
            "zoom factor must be finite and > 0, got {factor}"
        );
        if factor == 1.0 {
            return;
        }
        let center = self.center();
        self.warp(border, |p| scale_point(p, center, factor));
    }

    /// Subtract the mean and clip to `[-1, 1]`.
    pub fn normalise(&mut self) {
        let mean = self.mean();
        for v in &mut self.data {
            *v = (*v - mean).clamp(-1.0, 1.0);
        }
    }

    /// Pixel data reordered as `(channels, height, width)`.
    pub fn to_channels_first(&self) -> Vec<f32> {
        let plane = self.width * self.height;
        let mut out = vec![0.0; self.data.len()];
        for (i, px) in self.data.chunks_exact(self.channels).enumerate() {
            for (c, &v) in px.iter().enumerate() {
                out[c * plane + i] = v;
            }
        }
        out
    }

    /// Like [`Image::to_channels_first`], rounded and clamped to `u8`.
    pub fn to_u8_channels_first(&self) -> Vec<u8> {
        self.to_channels_first().into_iter().map(to_u8).collect()
    }

    /// Bilinear sample of `channel` at a sub-pixel position.
    #[inline]
    pub fn sample_bilinear(&self, x: f64, y: f64, channel: usize, border: BorderMode) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = (x - x0) as f32;
        let fy = (y - y0) as f32;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let p00 = self.fetch(x0, y0, channel, border);
        let p10 = self.fetch(x0 + 1, y0, channel, border);
        let p01 = self.fetch(x0, y0 + 1, channel, border);
        let p11 = self.fetch(x0 + 1, y0 + 1, channel, border);

        let a = p00 + fx * (p10 - p00);
        let b = p01 + fx * (p11 - p01);
        a + fy * (b - a)
    }

    #[inline]
    fn fetch(&self, x: i64, y: i64, channel: usize, border: BorderMode) -> f32 {
        let w = self.width as i64;
        let h = self.height as i64;
        let (x, y) = if x < 0 || y < 0 || x >= w || y >= h {
            match border {
                BorderMode::Constant(v) => return v,
                BorderMode::Symmetric => (reflect(x, w), reflect(y, h)),
            }
        } else {
            (x, y)
        };
        self.get(y as usize, x as usize, channel)
    }

    // For each output pixel, map to the source via `src_of` and sample.
    fn warp<F>(&mut self, border: BorderMode, src_of: F)
    where
        F: Fn(Point2<f64>) -> Point2<f64>,
    {
        if self.data.is_empty() {
            return;
        }
        let mut out = vec![0.0f32; self.data.len()];
        for row in 0..self.height {
            for col in 0..self.width {
                let src = src_of(Point2::new(col as f64, row as f64));
                let base = (row * self.width + col) * self.channels;
                for c in 0..self.channels {
                    out[base + c] = self.sample_bilinear(src.x, src.y, c, border);
                }
            }
        }
        self.data = out;
    }
}

#[inline]
fn reflect(i: i64, n: i64) -> i64 {
    let period = 2 * n;
    let m = i.rem_euclid(period);
    if m >= n {
        period - 1 - m
    } else {
        m
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
