//! Assertion helpers for tests.

use pretty_assertions::assert_eq;

/// Header info and palette of an indexed PNG.
pub struct IndexedPng {
    pub width: u32,
    pub height: u32,
    pub bit_depth: png::BitDepth,
    pub palette: Vec<[u8; 3]>,
}

/// Assert bytes are an indexed PNG and return its header info
pub fn assert_indexed_png(bytes: &[u8]) -> IndexedPng {
    assert!(
        bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );

    let reader = png::Decoder::new(bytes).read_info().unwrap();
    let info = reader.info();
    assert_eq!(
        info.color_type,
        png::ColorType::Indexed,
        "Expected an indexed PNG"
    );
    let palette = info
        .palette
        .as_ref()
        .expect("indexed PNG without PLTE")
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    IndexedPng {
        width: info.width,
        height: info.height,
        bit_depth: info.bit_depth,
        palette,
    }
}

/// Assert the PNG file at `path` is indexed with at most `max_colors` entries
pub fn assert_indexed_file(path: &std::path::Path, max_colors: usize) -> IndexedPng {
    let bytes = std::fs::read(path).unwrap();
    let png = assert_indexed_png(&bytes);
    assert!(
        png.palette.len() <= max_colors,
        "{} has {} palette entries, expected at most {max_colors}",
        path.display(),
        png.palette.len()
    );
    png
}
