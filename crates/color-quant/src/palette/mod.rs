//! Palette: nearest-color search over a color table.
//!
//! - Linear scan for small tables or when acceleration is off
//! - A 16×16×16 candidate grid otherwise
//! - A bounded LRU cache in front of either

mod cache;
mod options;
mod palette;
mod search;

pub use cache::DEFAULT_CACHE_CAPACITY;
pub use options::PaletteOptions;
pub use palette::Palette;
