//! Indexed PNG encoding: the color table becomes the PLTE chunk.

use std::io::Cursor;

use color_quant::ColorTable;

use crate::error::AppError;

/// Smallest PNG bit depth able to address `colors` palette entries.
pub fn bits_for(colors: usize) -> u8 {
    match colors {
        0..=2 => 1,
        3..=4 => 2,
        5..=16 => 4,
        _ => 8,
    }
}

/// Encode palette indices as an indexed PNG.
pub fn encode_indexed(
    table: &ColorTable,
    indices: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, AppError> {
    if width == 0 || height == 0 || indices.len() != width * height {
        return Err(AppError::UnsupportedImage(format!(
            "{} indices do not fill a {width}x{height} image",
            indices.len()
        )));
    }
    let (png_width, png_height) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(AppError::UnsupportedImage(format!(
                "{width}x{height} exceeds PNG limits"
            )))
        }
    };

    let bits = bits_for(table.len());
    let bit_depth = match bits {
        1 => png::BitDepth::One,
        2 => png::BitDepth::Two,
        4 => png::BitDepth::Four,
        _ => png::BitDepth::Eight,
    };
    let packed = if bits == 8 {
        indices.to_vec()
    } else {
        pack_nbits(indices, width, bits)
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, png_width, png_height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Best);
        encoder.set_palette(table.to_rgb_bytes());
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&packed)?;
    }
    Ok(buf.into_inner())
}

/// Pack pixel values into N-bit PNG row data (1, 2, or 4 bits per pixel).
///
/// Each row starts on a byte boundary; the last byte of a row is zero-padded.
fn pack_nbits(indices: &[u8], width: usize, bits: u8) -> Vec<u8> {
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = width.div_ceil(pixels_per_byte);
    let height = indices.len() / width;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in indices.chunks(width) {
        let mut byte = 0u8;
        for (i, &idx) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (idx & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}
