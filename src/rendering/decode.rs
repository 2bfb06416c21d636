//! PNG decoding into packed `0x00RRGGBB` pixels.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::AppError;

/// A decoded truecolor image, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)?;
        let image = Self::decode(BufReader::new(file))?;
        tracing::debug!(
            path = %path.display(),
            width = image.width,
            height = image.height,
            "Decoded PNG"
        );
        Ok(image)
    }

    /// Decode any PNG color type to 8-bit RGB. Alpha is discarded.
    pub fn decode<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let bytes = &buf[..info.buffer_size()];

        if info.bit_depth != png::BitDepth::Eight {
            return Err(AppError::UnsupportedImage(format!(
                "bit depth {:?} after expansion",
                info.bit_depth
            )));
        }

        let channels = match info.color_type {
            png::ColorType::Rgb => 3,
            png::ColorType::Rgba => 4,
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Indexed => {
                return Err(AppError::UnsupportedImage(
                    "indexed data was not expanded".to_string(),
                ))
            }
        };

        let width = info.width as usize;
        let height = info.height as usize;
        let pixels = bytes
            .chunks_exact(info.line_size)
            .take(height)
            .flat_map(|row| row[..width * channels].chunks_exact(channels))
            .map(|px| match channels {
                1 | 2 => u32::from(px[0]) * 0x010101,
                _ => u32::from(px[0]) << 16 | u32::from(px[1]) << 8 | u32::from(px[2]),
            })
            .collect();

        Ok(Self::new(width, height, pixels))
    }
}
