//! The ordered color table shared by extraction and palettes.

use std::collections::HashSet;
use std::ops::Index;
use std::str::FromStr;

use crate::color::Rgb;
use crate::error::QuantError;

/// Largest table an index byte can address.
pub const MAX_TABLE_LEN: usize = 256;

/// An ordered sequence of up to 256 distinct colors.
///
/// The position of a color is its palette index. Tables are immutable once
/// built: [`Extractor::get_color_table`](crate::Extractor::get_color_table)
/// produces them, [`Palette`](crate::Palette) consumes them by reference and
/// keeps its own copy.
///
/// # Example
///
/// ```
/// use color_quant::{ColorTable, Rgb};
///
/// let table = ColorTable::new(vec![Rgb::BLACK, Rgb::WHITE]).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table[1], Rgb::WHITE);
/// assert_eq!(table.reconstruct(&[1, 0]), vec![0xffffff, 0x000000]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorTable {
    colors: Vec<Rgb>,
}

impl ColorTable {
    /// Build a table, validating size and distinctness.
    ///
    /// # Errors
    ///
    /// - [`QuantError::TableTooLarge`] for more than 256 colors
    /// - [`QuantError::DuplicateColor`] naming the first repeated position
    pub fn new(colors: Vec<Rgb>) -> Result<Self, QuantError> {
        if colors.len() > MAX_TABLE_LEN {
            return Err(QuantError::TableTooLarge { len: colors.len() });
        }

        let mut seen = HashSet::with_capacity(colors.len());
        for (index, color) in colors.iter().enumerate() {
            if !seen.insert(*color) {
                return Err(QuantError::DuplicateColor { index });
            }
        }

        Ok(Self { colors })
    }

    /// Build a table from packed pixel words (high byte ignored).
    pub fn from_packed(colors: &[u32]) -> Result<Self, QuantError> {
        Self::new(colors.iter().map(|&c| Rgb::from_packed(c)).collect())
    }

    /// Build a table from hex strings such as `"#ff0000"` or `"#f00"`.
    pub fn from_hex(colors: &[&str]) -> Result<Self, QuantError> {
        let colors = colors
            .iter()
            .map(|s| Rgb::from_str(s))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Crate-internal constructor for tables whose invariants the caller
    /// already guarantees.
    pub(crate) fn from_distinct(colors: Vec<Rgb>) -> Self {
        debug_assert!(colors.len() <= MAX_TABLE_LEN);
        debug_assert_eq!(
            colors.iter().collect::<HashSet<_>>().len(),
            colors.len(),
            "table entries must be distinct"
        );
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.colors.iter().copied()
    }

    /// Entries as packed `0x00RRGGBB` words.
    pub fn to_packed(&self) -> Vec<u32> {
        self.colors.iter().map(|c| c.to_packed()).collect()
    }

    /// Position of `color` in the table, if present.
    pub fn index_of(&self, color: Rgb) -> Option<usize> {
        self.colors.iter().position(|&c| c == color)
    }

    #[inline]
    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    /// Turn an index buffer back into packed pixels: `table[indices[i]]`.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range for this table, which cannot happen
    /// for buffers produced by a [`Palette`](crate::Palette) built from it.
    pub fn reconstruct(&self, indices: &[u8]) -> Vec<u32> {
        indices
            .iter()
            .map(|&i| self.colors[i as usize].to_packed())
            .collect()
    }

    /// Flattened `[r, g, b, r, g, b, ...]` bytes, the layout of a PNG PLTE chunk.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.to_bytes()).collect()
    }
}

impl Index<usize> for ColorTable {
    type Output = Rgb;

    fn index(&self, index: usize) -> &Rgb {
        &self.colors[index]
    }
}

impl<'a> IntoIterator for &'a ColorTable {
    type Item = &'a Rgb;
    type IntoIter = std::slice::Iter<'a, Rgb>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

impl TryFrom<Vec<Rgb>> for ColorTable {
    type Error = QuantError;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}
