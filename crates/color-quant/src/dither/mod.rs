//! Error diffusion dithering.
//!
//! Pixels are visited row by row, left to right. Each one is nudged by the
//! error its already-decided neighbors pushed onto it, snapped to the nearest
//! palette color, and the difference between the nudged value and the chosen
//! color is handed on to the unvisited neighbors named by the [`Kernel`].
//!
//! The driver here is palette-agnostic: [`Palette::dither`](crate::Palette::dither)
//! supplies the nearest-color lookup.

mod kernel;
mod options;

pub use kernel::{
    DitherKernel, Kernel, UnknownKernel, ATKINSON, FLOYD_STEINBERG, JARVIS_JUDICE_NINKE,
    SIERRA_LITE,
};
pub use options::DitherOptions;

use crate::color::Rgb;
use crate::error::QuantError;

/// Sliding window of pending error, `max_dy + 1` rows deep.
///
/// Row 0 is the row being processed.
#[derive(Debug)]
pub(crate) struct ErrorBuffer {
    rows: Vec<Vec<[f32; 3]>>,
    width: usize,
}

impl ErrorBuffer {
    pub(crate) fn new(width: usize, depth: usize) -> Self {
        Self {
            rows: (0..depth).map(|_| vec![[0.0; 3]; width]).collect(),
            width,
        }
    }

    #[inline]
    pub(crate) fn get(&self, x: usize) -> [f32; 3] {
        self.rows[0][x]
    }

    /// Add error at column `x`, `dy` rows below the current one. Out of range is ignored.
    #[inline]
    pub(crate) fn add(&mut self, x: usize, dy: usize, error: [f32; 3]) {
        if x < self.width && dy < self.rows.len() {
            let cell = &mut self.rows[dy][x];
            for c in 0..3 {
                cell[c] += error[c];
            }
        }
    }

    /// Drop the current row and open a zeroed one at the bottom.
    pub(crate) fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill([0.0; 3]);
        }
    }
}

/// Validate a `width x height` raster over `len` pixels, returning the pixel count.
pub(crate) fn check_dimensions(width: usize, height: usize, len: usize) -> Result<usize, QuantError> {
    let invalid = QuantError::InvalidDimensions { width, height, len };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    match width.checked_mul(height) {
        Some(area) if area <= len => Ok(area),
        _ => Err(invalid),
    }
}

/// Dither `pixels` to indices into `colors`.
///
/// `nearest` must return the index in `colors` of the color closest to its
/// argument. Only the first `width * height` pixels are read; dimensions are
/// assumed already validated.
pub(crate) fn diffuse<F>(
    pixels: &[u32],
    width: usize,
    height: usize,
    colors: &[Rgb],
    options: &DitherOptions,
    mut nearest: F,
) -> Vec<u8>
where
    F: FnMut(Rgb) -> u8,
{
    let kernel = options.kernel.kernel();
    let scale = options.attenuation / kernel.divisor as f32;
    let weights: Vec<(i32, usize, f32)> = kernel
        .taps
        .iter()
        .map(|&(dx, dy, w)| (dx, dy, w as f32 * scale))
        .collect();

    let mut out = Vec::with_capacity(width * height);
    let mut errors = ErrorBuffer::new(width, kernel.max_dy + 1);

    for y in 0..height {
        let row = &pixels[y * width..(y + 1) * width];
        for (x, &pixel) in row.iter().enumerate() {
            let sample = Rgb::from_packed(pixel);
            let [er, eg, eb] = errors.get(x);
            let adjusted = Rgb::from_f32_clamped(
                sample.r as f32 + er,
                sample.g as f32 + eg,
                sample.b as f32 + eb,
            );

            let index = nearest(adjusted);
            out.push(index);

            let chosen = colors[index as usize];
            let residual = [
                adjusted.r as f32 - chosen.r as f32,
                adjusted.g as f32 - chosen.g as f32,
                adjusted.b as f32 - chosen.b as f32,
            ];
            if residual == [0.0; 3] {
                continue;
            }

            for &(dx, dy, w) in &weights {
                let nx = x as i64 + dx as i64;
                if nx < 0 || y + dy >= height {
                    continue;
                }
                errors.add(
                    nx as usize,
                    dy,
                    [residual[0] * w, residual[1] * w, residual[2] * w],
                );
            }
        }
        errors.advance_row();
    }

    out
}
