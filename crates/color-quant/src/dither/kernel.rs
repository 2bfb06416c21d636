//! Error diffusion kernels.

use std::fmt;
use std::str::FromStr;

/// Where quantization error goes after a pixel is decided.
///
/// Each tap is `(dx, dy, weight)`: the neighbor at `dx` columns to the right
/// and `dy` rows below receives `error * weight / divisor`. Taps only point
/// at pixels that have not been processed yet in a left-to-right,
/// top-to-bottom scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    pub taps: &'static [(i32, usize, u8)],
    pub divisor: u8,
    /// Deepest row reached; the error buffer keeps `max_dy + 1` rows.
    pub max_dy: usize,
}

impl Kernel {
    /// Sum of all weights over the divisor. 1.0 means no error is lost.
    pub fn propagation(&self) -> f32 {
        let sum: u32 = self.taps.iter().map(|&(_, _, w)| w as u32).sum();
        sum as f32 / self.divisor as f32
    }
}

/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    taps: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
    max_dy: 1,
};

/// Spreads 6/8 of the error; the rest is dropped.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub const ATKINSON: Kernel = Kernel {
    taps: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
    divisor: 8,
    max_dy: 2,
};

/// ```text
///        X   2
///    1   1
/// ```
pub const SIERRA_LITE: Kernel = Kernel {
    taps: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
    max_dy: 1,
};

/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1
/// ```
pub const JARVIS_JUDICE_NINKE: Kernel = Kernel {
    taps: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
    max_dy: 2,
};

/// Selectable diffusion kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DitherKernel {
    #[default]
    FloydSteinberg,
    Atkinson,
    SierraLite,
    JarvisJudiceNinke,
}

impl DitherKernel {
    pub const ALL: [DitherKernel; 4] = [
        DitherKernel::FloydSteinberg,
        DitherKernel::Atkinson,
        DitherKernel::SierraLite,
        DitherKernel::JarvisJudiceNinke,
    ];

    pub fn kernel(self) -> &'static Kernel {
        match self {
            DitherKernel::FloydSteinberg => &FLOYD_STEINBERG,
            DitherKernel::Atkinson => &ATKINSON,
            DitherKernel::SierraLite => &SIERRA_LITE,
            DitherKernel::JarvisJudiceNinke => &JARVIS_JUDICE_NINKE,
        }
    }

    /// Kebab-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            DitherKernel::FloydSteinberg => "floyd-steinberg",
            DitherKernel::Atkinson => "atkinson",
            DitherKernel::SierraLite => "sierra-lite",
            DitherKernel::JarvisJudiceNinke => "jarvis-judice-ninke",
        }
    }
}

impl fmt::Display for DitherKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a kernel name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dither kernel '{0}' (expected floyd-steinberg, atkinson, sierra-lite or jarvis-judice-ninke)")]
pub struct UnknownKernel(pub String);

impl FromStr for DitherKernel {
    type Err = UnknownKernel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        DitherKernel::ALL
            .into_iter()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| UnknownKernel(s.to_string()))
    }
}
