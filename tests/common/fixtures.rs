//! Synthetic images written as PNG files.

use std::path::{Path, PathBuf};

/// Colors used by [`write_blocks`], in block order.
pub const BLOCK_COLORS: [[u8; 3]; 4] = [[0, 0, 0], [255, 255, 255], [200, 30, 30], [30, 30, 200]];

/// Encode 8-bit RGB rows as a PNG file.
pub fn write_rgb_png(path: &Path, width: u32, height: u32, rgb: &[u8]) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(rgb).unwrap();
}

/// Horizontal red ramp over vertical green ramp, constant blue.
pub fn write_gradient(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            rgb.push((x * 255 / (width - 1)) as u8);
            rgb.push((y * 255 / (height - 1)) as u8);
            rgb.push(96);
        }
    }
    let path = dir.join(name);
    write_rgb_png(&path, width, height, &rgb);
    path
}

/// Four vertical stripes of [`BLOCK_COLORS`], `width` must be a multiple of 4.
pub fn write_blocks(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let stripe = width / 4;
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..height {
        for x in 0..width {
            rgb.extend_from_slice(&BLOCK_COLORS[(x / stripe) as usize]);
        }
    }
    let path = dir.join(name);
    write_rgb_png(&path, width, height, &rgb);
    path
}
