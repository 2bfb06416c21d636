//! Palettize - palette extraction and quantization for PNG images
//!
//! Thin application layer over the `color-quant` engine.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
