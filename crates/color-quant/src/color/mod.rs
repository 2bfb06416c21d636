//! Color types.
//!
//! The engine works on discrete 24-bit RGB samples. [`Rgb`] is the typed view
//! of a packed `0x??RRGGBB` pixel word.

mod rgb;

pub use rgb::{parse_color_list, Rgb, RGB_MASK};
