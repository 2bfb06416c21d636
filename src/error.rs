use color_quant::{ParseColorError, QuantError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Quantization error: {0}")]
    Quant(#[from] QuantError),

    #[error("Invalid color: {0}")]
    Color(#[from] ParseColorError),

    #[error("PNG decode error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("PNG encode error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
