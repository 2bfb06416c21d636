//! [`Extractor`]: accumulate pixel statistics, then derive a color table.

use std::collections::HashSet;
use std::time::Instant;

use super::accumulator::Accumulator;
use super::select::select;
use crate::color::Rgb;
use crate::error::QuantError;
use crate::table::{ColorTable, MAX_TABLE_LEN};

/// Lifecycle of an [`Extractor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorState {
    /// No pixels accumulated since construction or the last reset.
    Empty,
    /// At least one image has been added.
    Accumulating,
    /// A color table was produced; statistics are consumed.
    Finalized,
}

/// Builds a representative [`ColorTable`] from one or more images.
///
/// Statistics from every [`add_image`](Self::add_image) call are pooled, so a
/// single table can be shared by a batch of frames. Producing a table
/// consumes the statistics; call [`reset`](Self::reset) to start over.
///
/// # Example
///
/// ```
/// use color_quant::{Extractor, ExtractorState, Rgb};
///
/// let mut extractor = Extractor::new();
/// extractor.add_image(&[0xff0000, 0xff0000, 0x0000ff]).unwrap();
///
/// let table = extractor.get_color_table(4, &[0xffffff]).unwrap();
/// assert_eq!(table[0], Rgb::WHITE);
/// assert!(table.contains(Rgb::new(255, 0, 0)));
/// assert_eq!(extractor.state(), ExtractorState::Finalized);
/// ```
#[derive(Debug)]
pub struct Extractor {
    acc: Accumulator,
    state: ExtractorState,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
            state: ExtractorState::Empty,
        }
    }

    /// Discard all statistics and return to [`ExtractorState::Empty`].
    pub fn reset(&mut self) {
        self.acc.clear();
        self.state = ExtractorState::Empty;
    }

    /// Fold the pixels of one image into the statistics.
    ///
    /// Per-color counts saturate at `u32::MAX`. An empty slice is accepted
    /// and changes nothing.
    ///
    /// # Errors
    ///
    /// [`QuantError::ExtractorFinalized`] once a table has been produced.
    pub fn add_image(&mut self, pixels: &[u32]) -> Result<(), QuantError> {
        if self.state == ExtractorState::Finalized {
            return Err(QuantError::ExtractorFinalized);
        }
        if pixels.is_empty() {
            return Ok(());
        }
        self.acc.add(pixels);
        self.state = ExtractorState::Accumulating;
        Ok(())
    }

    /// [`add_image`](Self::add_image) for typed pixels.
    pub fn add_rgb(&mut self, pixels: &[Rgb]) -> Result<(), QuantError> {
        let packed: Vec<u32> = pixels.iter().map(|c| c.to_packed()).collect();
        self.add_image(&packed)
    }

    /// Derive a table of at most `table_length` colors.
    ///
    /// The distinct `forced_colors` come first, in the order given. The rest
    /// are chosen from the accumulated statistics; fewer than requested are
    /// returned when the images do not hold enough distinct colors.
    ///
    /// # Errors
    ///
    /// - [`QuantError::InvalidTableSize`] if `table_length < forced_colors.len()`
    /// - [`QuantError::TableTooLarge`] if `table_length > 256`
    /// - [`QuantError::ExtractorFinalized`] if a table was already produced
    /// - [`QuantError::EmptyColorTable`] if nothing was accumulated and no
    ///   colors are forced
    pub fn get_color_table(
        &mut self,
        table_length: usize,
        forced_colors: &[u32],
    ) -> Result<ColorTable, QuantError> {
        if table_length < forced_colors.len() {
            return Err(QuantError::InvalidTableSize {
                requested: table_length,
                forced: forced_colors.len(),
            });
        }
        if table_length > MAX_TABLE_LEN {
            return Err(QuantError::TableTooLarge { len: table_length });
        }
        if self.state == ExtractorState::Finalized {
            return Err(QuantError::ExtractorFinalized);
        }

        let mut taken = HashSet::with_capacity(forced_colors.len());
        let forced: Vec<Rgb> = forced_colors
            .iter()
            .map(|&c| Rgb::from_packed(c))
            .filter(|c| taken.insert(*c))
            .collect();

        if self.state == ExtractorState::Empty && forced.is_empty() {
            return Err(QuantError::EmptyColorTable);
        }
        if table_length == 0 {
            // Only reachable with no forced colors and some pixels.
            return Err(QuantError::EmptyColorTable);
        }

        let start = Instant::now();
        let selection = select(&mut self.acc, table_length, &forced);
        self.state = ExtractorState::Finalized;

        tracing::debug!(
            table_length,
            forced = forced.len(),
            seeds = selection.seeds,
            merged = selection.merged,
            colors = selection.colors.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "color table selected"
        );

        Ok(ColorTable::from_distinct(selection.colors))
    }

    /// [`get_color_table`](Self::get_color_table) with typed forced colors.
    pub fn get_color_table_rgb(
        &mut self,
        table_length: usize,
        forced_colors: &[Rgb],
    ) -> Result<ColorTable, QuantError> {
        let packed: Vec<u32> = forced_colors.iter().map(|c| c.to_packed()).collect();
        self.get_color_table(table_length, &packed)
    }

    #[inline]
    pub fn state(&self) -> ExtractorState {
        self.state
    }

    /// Pixels added since the last reset.
    #[inline]
    pub fn pixel_count(&self) -> u64 {
        self.acc.total()
    }

    /// Distinct colors seen since the last reset.
    #[inline]
    pub fn distinct_colors(&self) -> usize {
        self.acc.seen().len()
    }

    #[cfg(test)]
    pub(crate) fn accumulator_mut(&mut self) -> &mut Accumulator {
        &mut self.acc
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
