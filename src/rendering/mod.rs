pub mod decode;
pub mod encode;

pub use decode::RgbImage;
pub use encode::{bits_for, encode_indexed};
