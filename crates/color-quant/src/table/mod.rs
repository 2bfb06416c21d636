//! Color table type.

mod color_table;

pub use color_table::{ColorTable, MAX_TABLE_LEN};
