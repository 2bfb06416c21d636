//! [`Palette`]: nearest-color mapping and dithering against a color table.

use parking_lot::Mutex;

use super::cache::ColorCache;
use super::options::PaletteOptions;
use super::search::{linear_nearest, Grid};
use crate::color::{Rgb, RGB_MASK};
use crate::dither::{self, DitherOptions};
use crate::error::QuantError;
use crate::table::ColorTable;

/// Smallest table for which the grid beats a linear scan.
const MIN_GRID_COLORS: usize = 8;

#[derive(Debug)]
enum Search {
    Linear,
    Grid(Grid),
}

/// Everything a palette frees on release.
#[derive(Debug)]
struct Engine {
    search: Search,
    cache: Option<Mutex<ColorCache>>,
}

/// A color table prepared for fast nearest-color queries.
///
/// Distance is squared Euclidean over RGB; when several entries are equally
/// close the lowest index wins. The grid accelerator and the lookup cache
/// never change an answer, only how fast it arrives.
///
/// A palette is `Send + Sync`. Concurrent calls share the cache when they can
/// and fall back to uncached lookups when another call holds it.
///
/// # Example
///
/// ```
/// use color_quant::{ColorTable, Palette, Rgb};
///
/// let table = ColorTable::new(vec![Rgb::BLACK, Rgb::WHITE]).unwrap();
/// let palette = Palette::new(&table, true).unwrap();
///
/// assert_eq!(palette.map(&[0x101010, 0xf0f0f0]).unwrap(), vec![0, 1]);
/// assert_eq!(palette.dither(&[0x808080; 4], 2, 2).unwrap().len(), 4);
/// ```
#[derive(Debug)]
pub struct Palette {
    table: ColorTable,
    options: PaletteOptions,
    engine: Option<Engine>,
}

impl Palette {
    /// Build a palette with default options, choosing grid or linear search.
    ///
    /// # Errors
    ///
    /// [`QuantError::EmptyColorTable`] if `table` has no entries.
    pub fn new(table: &ColorTable, optimize: bool) -> Result<Self, QuantError> {
        Self::with_options(table, PaletteOptions::new().optimize(optimize))
    }

    pub fn with_options(table: &ColorTable, options: PaletteOptions) -> Result<Self, QuantError> {
        if table.is_empty() {
            return Err(QuantError::EmptyColorTable);
        }

        let search = if options.optimize && table.len() >= MIN_GRID_COLORS {
            Search::Grid(Grid::build(table.colors()))
        } else {
            Search::Linear
        };
        let cache = (options.cache_capacity > 0)
            .then(|| Mutex::new(ColorCache::new(options.cache_capacity)));

        tracing::debug!(
            colors = table.len(),
            grid = matches!(search, Search::Grid(_)),
            mean_candidates = match &search {
                Search::Grid(grid) => grid.mean_candidates(),
                Search::Linear => table.len() as f64,
            },
            cache_capacity = options.cache_capacity,
            "palette built"
        );

        Ok(Self {
            table: table.clone(),
            options,
            engine: Some(Engine { search, cache }),
        })
    }

    /// Build a palette straight from packed colors.
    ///
    /// # Errors
    ///
    /// - [`QuantError::EmptyColorTable`] for an empty slice
    /// - [`QuantError::TableTooLarge`] for more than 256 colors
    /// - [`QuantError::DuplicateColor`] if a color repeats
    pub fn from_packed(colors: &[u32], optimize: bool) -> Result<Self, QuantError> {
        if colors.is_empty() {
            return Err(QuantError::EmptyColorTable);
        }
        let table = ColorTable::from_packed(colors)?;
        Self::new(&table, optimize)
    }

    #[inline]
    pub fn color_table(&self) -> &ColorTable {
        &self.table
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always `false`: construction rejects empty tables.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    pub fn options(&self) -> &PaletteOptions {
        &self.options
    }

    /// Whether lookups go through the grid accelerator.
    pub fn is_optimized(&self) -> bool {
        matches!(
            self.engine,
            Some(Engine {
                search: Search::Grid(_),
                ..
            })
        )
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.engine.is_none()
    }

    /// Number of colors currently cached. 0 when caching is off, the cache
    /// is busy, or the palette is released.
    pub fn cache_len(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.cache.as_ref())
            .and_then(|c| c.try_lock().map(|cache| cache.len()))
            .unwrap_or(0)
    }

    fn engine(&self) -> Result<&Engine, QuantError> {
        self.engine.as_ref().ok_or(QuantError::UseAfterRelease)
    }

    /// Index of the entry nearest to one packed pixel.
    pub fn nearest(&self, pixel: u32) -> Result<u8, QuantError> {
        let engine = self.engine()?;
        let mut lookup = Lookup::new(engine, self.table.colors());
        Ok(lookup.find(pixel & RGB_MASK))
    }

    /// Map every pixel to the index of its nearest entry.
    ///
    /// Mapping is idempotent: reconstructing the output through the color
    /// table and mapping again gives the same indices.
    pub fn map(&self, pixels: &[u32]) -> Result<Vec<u8>, QuantError> {
        let mut out = vec![0u8; pixels.len()];
        self.map_into(pixels, &mut out)?;
        Ok(out)
    }

    /// [`map`](Self::map) into a caller-provided buffer.
    ///
    /// Writes `out[..pixels.len()]`; any tail is left untouched.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidDimensions`] if `out` is shorter than `pixels`.
    pub fn map_into(&self, pixels: &[u32], out: &mut [u8]) -> Result<(), QuantError> {
        let engine = self.engine()?;
        if out.len() < pixels.len() {
            return Err(QuantError::InvalidDimensions {
                width: pixels.len(),
                height: 1,
                len: out.len(),
            });
        }

        let mut lookup = Lookup::new(engine, self.table.colors());
        let mut last: Option<(u32, u8)> = None;
        for (slot, &pixel) in out.iter_mut().zip(pixels) {
            let color = pixel & RGB_MASK;
            let index = match last {
                Some((c, i)) if c == color => i,
                _ => lookup.find(color),
            };
            last = Some((color, index));
            *slot = index;
        }
        Ok(())
    }

    /// Dither a `width x height` raster with this palette's dither options.
    pub fn dither(&self, pixels: &[u32], width: usize, height: usize) -> Result<Vec<u8>, QuantError> {
        self.dither_with(pixels, width, height, &self.options.dither)
    }

    /// Dither with explicit options.
    ///
    /// Output has exactly `width * height` entries; extra input pixels are
    /// ignored.
    ///
    /// # Errors
    ///
    /// - [`QuantError::UseAfterRelease`] after [`release`](Self::release)
    /// - [`QuantError::InvalidDimensions`] if either dimension is zero or
    ///   `pixels` holds fewer than `width * height` entries
    pub fn dither_with(
        &self,
        pixels: &[u32],
        width: usize,
        height: usize,
        options: &DitherOptions,
    ) -> Result<Vec<u8>, QuantError> {
        let engine = self.engine()?;
        dither::check_dimensions(width, height, pixels.len())?;

        let colors = self.table.colors();
        let mut lookup = Lookup::new(engine, colors);
        Ok(dither::diffuse(pixels, width, height, colors, options, |c| {
            lookup.find(c.to_packed())
        }))
    }

    /// Free the search structures and cache. Idempotent.
    ///
    /// Every later query fails with [`QuantError::UseAfterRelease`]; the
    /// color table stays readable.
    pub fn release(&mut self) {
        if self.engine.take().is_some() {
            tracing::debug!(colors = self.table.len(), "palette released");
        }
    }
}

impl Drop for Palette {
    fn drop(&mut self) {
        self.release();
    }
}

/// One call's view of the search engine, holding the cache lock if it was free.
struct Lookup<'a> {
    search: &'a Search,
    colors: &'a [Rgb],
    cache: Option<parking_lot::MutexGuard<'a, ColorCache>>,
}

impl<'a> Lookup<'a> {
    fn new(engine: &'a Engine, colors: &'a [Rgb]) -> Self {
        Self {
            search: &engine.search,
            colors,
            cache: engine.cache.as_ref().and_then(|c| c.try_lock()),
        }
    }

    /// Nearest index for a masked color.
    #[inline]
    fn find(&mut self, color: u32) -> u8 {
        if let Some(cache) = self.cache.as_mut() {
            if let Some(index) = cache.get(color) {
                return index;
            }
        }

        let target = Rgb::from_packed(color);
        let index = match self.search {
            Search::Linear => linear_nearest(self.colors, target),
            Search::Grid(grid) => grid.nearest(self.colors, target),
        };

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(color, index);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rainbow() -> ColorTable {
        ColorTable::from_packed(&[
            0x000000, 0xffffff, 0xff0000, 0x00ff00, 0x0000ff, 0xffff00, 0x00ffff, 0xff00ff,
            0x808080, 0x804000,
        ])
        .unwrap()
    }

    fn gradient(n: u32) -> Vec<u32> {
        (0..n).map(|i| i.wrapping_mul(0x0001_0203) & RGB_MASK).collect()
    }

    #[test]
    fn test_palette_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Palette>();
    }

    #[test]
    fn test_empty_table_rejected() {
        let empty = ColorTable::default();
        assert_eq!(
            Palette::new(&empty, true).unwrap_err(),
            QuantError::EmptyColorTable
        );
        assert_eq!(
            Palette::from_packed(&[], false).unwrap_err(),
            QuantError::EmptyColorTable
        );
    }

    #[test]
    fn test_from_packed_validation() {
        let many: Vec<u32> = (0..300).collect();
        assert_eq!(
            Palette::from_packed(&many, true).unwrap_err(),
            QuantError::TableTooLarge { len: 300 }
        );
        assert_eq!(
            Palette::from_packed(&[1, 2, 1], true).unwrap_err(),
            QuantError::DuplicateColor { index: 2 }
        );
    }

    #[test]
    fn test_grid_only_for_larger_tables() {
        let small = ColorTable::from_packed(&[0, 0xffffff]).unwrap();
        assert!(!Palette::new(&small, true).unwrap().is_optimized());
        assert!(Palette::new(&rainbow(), true).unwrap().is_optimized());
        assert!(!Palette::new(&rainbow(), false).unwrap().is_optimized());
    }

    #[test]
    fn test_map_ignores_high_byte() {
        let palette = Palette::new(&rainbow(), true).unwrap();
        assert_eq!(
            palette.map(&[0xff_ff0000, 0x00_ff0000]).unwrap(),
            vec![2, 2]
        );
    }

    #[test]
    fn test_map_into_checks_length() {
        let palette = Palette::new(&rainbow(), true).unwrap();
        let mut short = [0u8; 1];
        assert_eq!(
            palette.map_into(&[0, 0], &mut short),
            Err(QuantError::InvalidDimensions {
                width: 2,
                height: 1,
                len: 1
            })
        );
        let mut long = [9u8; 3];
        palette.map_into(&[0xffffff, 0x0000ff], &mut long).unwrap();
        assert_eq!(long, [1, 4, 9]);
    }

    #[test]
    fn test_cache_does_not_change_answers() {
        let pixels = gradient(20_000);
        let cached = Palette::with_options(&rainbow(), PaletteOptions::new().cache_capacity(64)).unwrap();
        let uncached = Palette::with_options(&rainbow(), PaletteOptions::new().cache_capacity(0)).unwrap();
        assert_eq!(cached.map(&pixels).unwrap(), uncached.map(&pixels).unwrap());
        assert_eq!(cached.map(&pixels).unwrap(), uncached.map(&pixels).unwrap());
        assert!(cached.cache_len() <= 64);
        assert_eq!(cached.cache_len(), 64);
        assert_eq!(uncached.cache_len(), 0);
    }

    #[test]
    fn test_busy_cache_falls_back_to_uncached() {
        let palette = Palette::new(&rainbow(), true).unwrap();
        let expected = palette.map(&gradient(500)).unwrap();

        let engine = palette.engine.as_ref().unwrap();
        let _held = engine.cache.as_ref().unwrap().lock();
        assert_eq!(palette.map(&gradient(500)).unwrap(), expected);
        assert_eq!(palette.cache_len(), 0, "busy cache reports empty");
    }

    #[test]
    fn test_concurrent_maps_agree() {
        let palette = Palette::new(&rainbow(), true).unwrap();
        let pixels = gradient(50_000);
        let expected = palette.map(&pixels).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| palette.map(&pixels).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_release_is_idempotent_and_final() {
        let mut palette = Palette::new(&rainbow(), true).unwrap();
        palette.map(&[0x123456]).unwrap();
        palette.release();
        palette.release();

        assert!(palette.is_released());
        assert!(!palette.is_optimized());
        assert_eq!(palette.cache_len(), 0);
        assert_eq!(palette.map(&[0]), Err(QuantError::UseAfterRelease));
        assert_eq!(palette.nearest(0), Err(QuantError::UseAfterRelease));
        assert_eq!(
            palette.dither(&[0; 4], 2, 2),
            Err(QuantError::UseAfterRelease)
        );
        assert_eq!(palette.color_table().len(), 10, "table survives release");
    }

    #[test]
    fn test_release_checked_before_dimensions() {
        let mut palette = Palette::new(&rainbow(), false).unwrap();
        palette.release();
        assert_eq!(palette.dither(&[], 0, 0), Err(QuantError::UseAfterRelease));
    }

    #[test]
    fn test_dither_uses_palette_options() {
        let options = PaletteOptions::new().dither(DitherOptions::new().attenuation(0.0));
        let table = ColorTable::from_packed(&[0x000000, 0xffffff]).unwrap();
        let palette = Palette::with_options(&table, options).unwrap();
        assert_eq!(palette.dither(&[0x707070; 9], 3, 3).unwrap(), vec![0; 9]);
        assert_ne!(
            palette
                .dither_with(&[0x707070; 9], 3, 3, &DitherOptions::new())
                .unwrap(),
            vec![0; 9]
        );
    }

    #[test]
    fn test_dither_ignores_extra_pixels() {
        let palette = Palette::new(&rainbow(), true).unwrap();
        let out = palette.dither(&gradient(30), 5, 4).unwrap();
        assert_eq!(out.len(), 20);
    }
}
