//! Dithering configuration.

use super::kernel::DitherKernel;

/// Configuration for error diffusion.
///
/// # Defaults
///
/// - kernel: Floyd–Steinberg
/// - attenuation: 1.0 (all error propagated)
///
/// # Example
///
/// ```
/// use color_quant::{DitherKernel, DitherOptions};
///
/// let options = DitherOptions::new()
///     .kernel(DitherKernel::SierraLite)
///     .attenuation(0.75);
/// assert_eq!(options.attenuation, 0.75);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherOptions {
    pub kernel: DitherKernel,

    /// Factor applied to every propagated error term, clamped to `0.0..=1.0`.
    ///
    /// Values below 1.0 trade accuracy in smooth gradients for less
    /// speckle around hard edges. 0.0 degenerates to plain mapping.
    pub attenuation: f32,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            kernel: DitherKernel::FloydSteinberg,
            attenuation: 1.0,
        }
    }
}

impl DitherOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn kernel(mut self, kernel: DitherKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the error attenuation, clamped to `0.0..=1.0` (NaN becomes 1.0).
    #[inline]
    pub fn attenuation(mut self, attenuation: f32) -> Self {
        self.attenuation = if attenuation.is_nan() {
            1.0
        } else {
            attenuation.clamp(0.0, 1.0)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DitherOptions::new();
        assert_eq!(options.kernel, DitherKernel::FloydSteinberg);
        assert_eq!(options.attenuation, 1.0);
    }

    #[test]
    fn test_attenuation_clamped() {
        assert_eq!(DitherOptions::new().attenuation(1.5).attenuation, 1.0);
        assert_eq!(DitherOptions::new().attenuation(-0.1).attenuation, 0.0);
        assert_eq!(DitherOptions::new().attenuation(f32::NAN).attenuation, 1.0);
    }
}
