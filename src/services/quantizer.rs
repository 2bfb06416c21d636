use std::path::{Path, PathBuf};
use std::time::Instant;

use color_quant::{ColorTable, Extractor, Palette, PaletteOptions};

use crate::error::AppError;
use crate::models::AppConfig;
use crate::rendering::{encode_indexed, RgbImage};

/// Table sizes produced by [`Quantizer::sweep`].
pub const SWEEP_SIZES: [usize; 7] = [4, 8, 16, 32, 64, 128, 256];

/// Palette indices plus the table they refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedImage {
    pub table: ColorTable,
    pub indices: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl QuantizedImage {
    pub fn to_png(&self) -> Result<Vec<u8>, AppError> {
        encode_indexed(&self.table, &self.indices, self.width, self.height)
    }

    pub fn write_png(&self, path: &Path) -> Result<(), AppError> {
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }

    /// Expand back to truecolor pixels.
    pub fn reconstruct(&self) -> Vec<u32> {
        self.table.reconstruct(&self.indices)
    }
}

/// Runs extraction and mapping with settings taken from [`AppConfig`].
pub struct Quantizer {
    config: AppConfig,
    options: PaletteOptions,
    forced: Vec<u32>,
}

impl Quantizer {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        config.validate()?;
        let options = config.palette_options()?;
        let forced = config.forced_packed()?;
        Ok(Self {
            config,
            options,
            forced,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build one table covering every image.
    pub fn extract_table(
        &self,
        images: &[RgbImage],
        table_length: usize,
    ) -> Result<ColorTable, AppError> {
        let mut extractor = Extractor::new();
        for image in images {
            extractor.add_image(&image.pixels)?;
        }
        self.table_from(&mut extractor, table_length)
    }

    fn table_from(
        &self,
        extractor: &mut Extractor,
        table_length: usize,
    ) -> Result<ColorTable, AppError> {
        let start = Instant::now();
        let table = extractor.get_color_table(table_length, &self.forced)?;
        tracing::info!(
            requested = table_length,
            colors = table.len(),
            distinct = extractor.distinct_colors(),
            pixels = extractor.pixel_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extracted color table"
        );
        Ok(table)
    }

    /// Map (or dither) an image onto an existing table.
    pub fn render(
        &self,
        image: &RgbImage,
        table: &ColorTable,
        dither: bool,
    ) -> Result<Vec<u8>, AppError> {
        let start = Instant::now();
        let palette = Palette::with_options(table, self.options)?;
        let indices = if dither {
            palette.dither(&image.pixels, image.width, image.height)?
        } else {
            palette.map(&image.pixels)?
        };
        tracing::debug!(
            width = image.width,
            height = image.height,
            colors = table.len(),
            dither,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered indices"
        );
        Ok(indices)
    }

    /// Extract a table from the image itself and map the image onto it.
    pub fn quantize(&self, image: &RgbImage) -> Result<QuantizedImage, AppError> {
        let table = self.extract_table(std::slice::from_ref(image), self.config.table_length)?;
        let indices = self.render(image, &table, self.config.dither)?;
        Ok(QuantizedImage {
            table,
            indices,
            width: image.width,
            height: image.height,
        })
    }

    /// Write mapped and dithered PNGs for every size in [`SWEEP_SIZES`].
    ///
    /// Files are named `{stem}-map-{n}.png` and `{stem}-dither-{n}.png`.
    /// Sizes smaller than the forced color count are skipped.
    pub fn sweep(
        &self,
        image: &RgbImage,
        stem: &str,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, AppError> {
        std::fs::create_dir_all(out_dir)?;
        let mut extractor = Extractor::new();
        let mut written = Vec::with_capacity(SWEEP_SIZES.len() * 2);

        for size in SWEEP_SIZES {
            if size < self.forced.len() {
                tracing::warn!(
                    size,
                    forced = self.forced.len(),
                    "Skipping table size below forced color count"
                );
                continue;
            }

            extractor.reset();
            extractor.add_image(&image.pixels)?;
            let table = self.table_from(&mut extractor, size)?;

            for (mode, dither) in [("map", false), ("dither", true)] {
                let quantized = QuantizedImage {
                    indices: self.render(image, &table, dither)?,
                    table: table.clone(),
                    width: image.width,
                    height: image.height,
                };
                let path = out_dir.join(format!("{stem}-{mode}-{size}.png"));
                quantized.write_png(&path)?;
                tracing::info!(path = %path.display(), colors = table.len(), "Wrote");
                written.push(path);
            }
        }

        Ok(written)
    }
}
