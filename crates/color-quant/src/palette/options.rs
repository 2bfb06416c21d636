//! Palette construction options.

use super::cache::DEFAULT_CACHE_CAPACITY;
use crate::dither::DitherOptions;

/// How a [`Palette`](crate::Palette) searches, caches and dithers.
///
/// ```
/// use color_quant::{DitherKernel, DitherOptions, PaletteOptions};
///
/// let options = PaletteOptions::new()
///     .optimize(false)
///     .cache_capacity(0)
///     .dither(DitherOptions::new().kernel(DitherKernel::Atkinson));
/// assert!(!options.optimize);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteOptions {
    /// Build the grid accelerator (only used for tables of 8 or more colors).
    ///
    /// Default: `true`
    pub optimize: bool,

    /// Most colors remembered by the lookup cache; 0 disables caching.
    ///
    /// Default: 4096
    pub cache_capacity: usize,

    /// Used by [`Palette::dither`](crate::Palette::dither).
    pub dither: DitherOptions,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            dither: DitherOptions::default(),
        }
    }
}

impl PaletteOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    #[inline]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    #[inline]
    pub fn dither(mut self, dither: DitherOptions) -> Self {
        self.dither = dither;
        self
    }
}
