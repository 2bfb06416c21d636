#![allow(clippy::module_inception, clippy::needless_range_loop)]

//! color-quant: palette extraction, nearest-color mapping and dithering
//!
//! The crate turns truecolor pixels into a small indexed palette in three
//! steps:
//!
//! 1. An [`Extractor`] accumulates color frequencies over one or more images
//!    and selects a [`ColorTable`] of up to 256 colors, optionally forcing
//!    specific colors into it.
//! 2. A [`Palette`] wraps the table with a fast nearest-color search.
//! 3. [`Palette::map`] assigns every pixel its nearest entry, and
//!    [`Palette::dither`] does the same while diffusing quantization error.
//!
//! # Quick Start
//!
//! ```
//! use color_quant::{Extractor, Palette};
//!
//! let pixels: Vec<u32> = (0..64u32).map(|i| i * 0x040404).collect();
//!
//! let mut extractor = Extractor::new();
//! extractor.add_image(&pixels).unwrap();
//! let table = extractor.get_color_table(8, &[0x000000, 0xffffff]).unwrap();
//!
//! let palette = Palette::new(&table, true).unwrap();
//! let indices = palette.dither(&pixels, 8, 8).unwrap();
//! let rendered = table.reconstruct(&indices);
//! assert_eq!(rendered.len(), 64);
//! ```
//!
//! # Pixels
//!
//! Pixels are `u32` words laid out `0x??RRGGBB`. The high byte is ignored
//! on input and written as zero on output. [`Rgb`] is the typed view.
//!
//! # Distance
//!
//! Every comparison uses squared Euclidean distance in plain RGB. When two
//! table entries are equally close, the lower index wins, in every search
//! mode and with or without caching.

pub mod color;
pub mod dither;
pub mod error;
pub mod extract;
pub mod palette;
pub mod table;


pub use color::{parse_color_list, Rgb, RGB_MASK};
pub use dither::{DitherKernel, DitherOptions};
pub use error::{ParseColorError, QuantError};
pub use extract::{Extractor, ExtractorState};
pub use palette::{Palette, PaletteOptions, DEFAULT_CACHE_CAPACITY};
pub use table::{ColorTable, MAX_TABLE_LEN};
