//! Nearest-color search: plain linear scan and a uniform-grid accelerator.
//!
//! Both return the lowest table index among the colors at minimum squared
//! distance, so switching between them never changes an answer.

use crate::color::Rgb;

/// Cells per channel in the acceleration grid.
const GRID_SIDE: usize = 16;
const CELL_WIDTH: i32 = (256 / GRID_SIDE) as i32;

/// Index of the nearest color in `colors`; ties go to the lowest index.
///
/// `colors` must not be empty.
#[inline]
pub(crate) fn linear_nearest(colors: &[Rgb], target: Rgb) -> u8 {
    let mut best = 0usize;
    let mut best_dist = u32::MAX;
    for (i, &c) in colors.iter().enumerate() {
        let d = target.distance_squared(c);
        if d < best_dist {
            best = i;
            best_dist = d;
            if d == 0 {
                break;
            }
        }
    }
    best as u8
}

/// A 16×16×16 partition of RGB space, each cell listing the only table
/// entries that can be nearest to a point inside it.
///
/// For a cell `C`, let `far(j)` be the largest distance from entry `j` to
/// any point of `C`, and `near(j)` the smallest. The nearest entry to any
/// `p ∈ C` is at most `min_j far(j)` away, so it must satisfy
/// `near(i) <= min_j far(j)`. Every entry passing that test is kept, in
/// ascending index order, which preserves the lowest-index tie-break.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    /// `offsets[cell]..offsets[cell + 1]` is the cell's slice of `candidates`.
    offsets: Vec<u32>,
    candidates: Vec<u8>,
}

impl Grid {
    pub(crate) fn build(colors: &[Rgb]) -> Self {
        let cells = GRID_SIDE * GRID_SIDE * GRID_SIDE;
        let mut offsets = Vec::with_capacity(cells + 1);
        let mut candidates = Vec::new();
        let mut near = vec![0u32; colors.len()];

        offsets.push(0);
        for cr in 0..GRID_SIDE {
            for cg in 0..GRID_SIDE {
                for cb in 0..GRID_SIDE {
                    let lo = [cr, cg, cb].map(|c| c as i32 * CELL_WIDTH);
                    let mut bound = u32::MAX;
                    for (i, &c) in colors.iter().enumerate() {
                        let (n, f) = box_distances(c, lo);
                        near[i] = n;
                        bound = bound.min(f);
                    }
                    candidates.extend(
                        near.iter()
                            .enumerate()
                            .filter(|&(_, &n)| n <= bound)
                            .map(|(i, _)| i as u8),
                    );
                    offsets.push(candidates.len() as u32);
                }
            }
        }

        Self {
            offsets,
            candidates,
        }
    }

    #[inline]
    fn cell_of(color: Rgb) -> usize {
        let side = GRID_SIDE;
        let shift = |c: u8| c as usize / CELL_WIDTH as usize;
        (shift(color.r) * side + shift(color.g)) * side + shift(color.b)
    }

    #[inline]
    pub(crate) fn cell_candidates(&self, color: Rgb) -> &[u8] {
        let cell = Self::cell_of(color);
        &self.candidates[self.offsets[cell] as usize..self.offsets[cell + 1] as usize]
    }

    /// Same answer as [`linear_nearest`] over the full table.
    #[inline]
    pub(crate) fn nearest(&self, colors: &[Rgb], target: Rgb) -> u8 {
        let mut best = 0u8;
        let mut best_dist = u32::MAX;
        for &i in self.cell_candidates(target) {
            let d = target.distance_squared(colors[i as usize]);
            if d < best_dist {
                best = i;
                best_dist = d;
                if d == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Average candidate list length, for diagnostics.
    pub(crate) fn mean_candidates(&self) -> f64 {
        self.candidates.len() as f64 / (self.offsets.len() - 1) as f64
    }
}

/// Smallest and largest squared distance from `color` to the cell whose
/// lower corner is `lo`.
#[inline]
fn box_distances(color: Rgb, lo: [i32; 3]) -> (u32, u32) {
    let mut near = 0u32;
    let mut far = 0u32;
    for (v, lo) in [color.r, color.g, color.b].into_iter().zip(lo) {
        let v = v as i32;
        let hi = lo + CELL_WIDTH - 1;
        let n = if v < lo {
            lo - v
        } else if v > hi {
            v - hi
        } else {
            0
        };
        let f = (v - lo).abs().max((hi - v).abs());
        near += (n * n) as u32;
        far += (f * f) as u32;
    }
    (near, far)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random colors (xorshift).
    fn scattered(n: usize, mut seed: u32) -> Vec<Rgb> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let c = Rgb::from_packed(seed);
            if !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_linear_tie_goes_to_lowest_index() {
        let colors = [Rgb::BLACK, Rgb::WHITE];
        assert_eq!(linear_nearest(&colors, Rgb::new(0x7f, 0x7f, 0x7f)), 0);
        assert_eq!(linear_nearest(&colors, Rgb::new(0x80, 0x80, 0x80)), 1);

        let equidistant = [Rgb::new(10, 0, 0), Rgb::new(0, 10, 0), Rgb::new(0, 0, 10)];
        assert_eq!(linear_nearest(&equidistant, Rgb::BLACK), 0);
    }

    #[test]
    fn test_box_distances() {
        // Cell [16, 31] on every axis
        assert_eq!(box_distances(Rgb::new(20, 20, 20), [16; 3]), (0, 3 * 11 * 11));
        assert_eq!(box_distances(Rgb::new(10, 16, 31), [16; 3]), (36, 21 * 21 + 15 * 15 + 15 * 15));
    }

    #[test]
    fn test_cell_of_corners() {
        assert_eq!(Grid::cell_of(Rgb::BLACK), 0);
        assert_eq!(Grid::cell_of(Rgb::WHITE), GRID_SIDE * GRID_SIDE * GRID_SIDE - 1);
        assert_eq!(Grid::cell_of(Rgb::new(0, 0, 16)), 1);
        assert_eq!(Grid::cell_of(Rgb::new(16, 0, 0)), GRID_SIDE * GRID_SIDE);
    }

    #[test]
    fn test_every_cell_has_candidates() {
        let colors = scattered(40, 0x9e3779b9);
        let grid = Grid::build(&colors);
        for w in grid.offsets.windows(2) {
            assert!(w[1] > w[0], "cell without candidates");
        }
        assert!(grid.mean_candidates() < colors.len() as f64);
    }

    #[test]
    fn test_grid_agrees_with_linear_scan() {
        let colors = scattered(64, 0x1234_5678);
        let grid = Grid::build(&colors);
        for probe in scattered(5000, 0xdead_beef) {
            assert_eq!(
                grid.nearest(&colors, probe),
                linear_nearest(&colors, probe),
                "probe {probe}"
            );
        }
    }

    #[test]
    fn test_grid_keeps_lowest_index_on_ties() {
        // Entries 0 and 3 are equidistant from every gray of the form (v, v, 128).
        let colors = [
            Rgb::new(128, 128, 100),
            Rgb::new(0, 0, 0),
            Rgb::new(255, 255, 255),
            Rgb::new(128, 128, 156),
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
            Rgb::new(255, 255, 0),
        ];
        let grid = Grid::build(&colors);
        for v in (100..=156).step_by(4) {
            let probe = Rgb::new(v, v, 128);
            assert_eq!(grid.nearest(&colors, probe), linear_nearest(&colors, probe));
        }
        assert_eq!(grid.nearest(&colors, Rgb::new(128, 128, 128)), 0);
    }
}
