pub mod quantizer;

pub use quantizer::{QuantizedImage, Quantizer, SWEEP_SIZES};
