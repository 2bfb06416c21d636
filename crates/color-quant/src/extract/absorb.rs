//! Neighborhood absorption: the Gaussian "shock" a chosen color sends through
//! the frequency table, and the schedule that widens it as the table fills.

use std::f64::consts::{E, PI};

use super::accumulator::{page_offset, Accumulator};
use super::queue::CountQueue;
use crate::color::Rgb;

/// Widest absorption radius, per channel.
pub(crate) const MAX_RADIUS: usize = 28;

/// Fixed-point scale of kernel weights.
const WEIGHT_ONE: f64 = 65535.0;

/// Cubic absorption kernel of side `2 * radius + 1`.
///
/// The weight of offset `(dr, dg, db)` is
/// `exp(-((dr/radius)² + (dg/radius)² + (db/radius)²) / spread)`, stored as a
/// 16-bit fraction. It is 1.0 at the center and falls off towards the faces.
#[derive(Debug, Clone)]
pub(crate) struct AbsorbKernel {
    radius: usize,
    spread: f64,
    weights: Vec<u16>,
}

impl AbsorbKernel {
    pub(crate) fn new(radius: usize, spread: f64) -> Self {
        let side = radius * 2 + 1;
        let axis: Vec<f64> = (0..side)
            .map(|i| {
                let v = (i as f64 - radius as f64) / radius as f64;
                -(v * v) / spread
            })
            .collect();

        let mut weights = Vec::with_capacity(side * side * side);
        for &r in &axis {
            for &g in &axis {
                for &b in &axis {
                    weights.push(((r + g + b).exp() * WEIGHT_ONE) as u16);
                }
            }
        }

        Self {
            radius,
            spread,
            weights,
        }
    }

    #[inline]
    pub(crate) fn radius(&self) -> usize {
        self.radius
    }

    /// True when rebuilding for `(radius, spread)` would give a visibly different kernel.
    pub(crate) fn differs_from(&self, radius: usize, spread: f64) -> bool {
        self.radius != radius || (self.spread - spread).abs() > 0.01
    }

    #[inline]
    fn weight(&self, dr: usize, dg: usize, db: usize) -> u64 {
        let side = self.radius * 2 + 1;
        self.weights[(dr * side + dg) * side + db] as u64
    }

    /// Lower every counter in the cube around `center` by `height * weight`.
    ///
    /// Counters never go below zero. Lowered colors that remain live are
    /// re-queued at their new count. Returns the total count removed.
    pub(crate) fn absorb(
        &self,
        acc: &mut Accumulator,
        queue: &mut CountQueue,
        center: Rgb,
        height: u32,
    ) -> u64 {
        let radius = self.radius as i32;
        let span = |c: u8| {
            let c = c as i32;
            ((c - radius).max(0), (c + radius).min(255))
        };
        let (r0, r1) = span(center.r);
        let (g0, g1) = span(center.g);
        let (b0, b1) = span(center.b);

        let mut absorbed = 0u64;
        for r in r0..=r1 {
            let Some(page) = acc.page_mut(r as u8) else {
                continue;
            };
            let kr = (r - center.r as i32 + radius) as usize;
            for g in g0..=g1 {
                let kg = (g - center.g as i32 + radius) as usize;
                for b in b0..=b1 {
                    let offset = page_offset(g as u8, b as u8);
                    let count = page[offset];
                    if count == 0 {
                        continue;
                    }
                    let kb = (b - center.b as i32 + radius) as usize;
                    let reduction = (height as u64 * self.weight(kr, kg, kb)) >> 16;
                    let remaining = (count as u64).saturating_sub(reduction) as u32;
                    if remaining == count {
                        continue;
                    }

                    absorbed += (count - remaining) as u64;
                    page[offset] = remaining;
                    if remaining > 0 {
                        let color = Rgb::new(r as u8, g as u8, b as u8).to_packed();
                        queue.push(remaining, color);
                    }
                }
            }
        }
        absorbed
    }
}

/// Narrowest radius allowed for a table with `free_slots` non-forced entries.
///
/// Small tables use wide kernels from the start so a handful of seeds spread
/// across the whole distribution; large tables start narrow.
pub(crate) fn min_radius(free_slots: usize) -> usize {
    let r = (MAX_RADIUS as f64 * (free_slots as f64 / -64.0).exp()) as usize;
    r.clamp(2, MAX_RADIUS - 1)
}

/// Spread used while forced colors absorb their neighborhoods.
pub(crate) const FORCED_SPREAD: f64 = 1.0 / PI;

/// Steers kernel width as seeds are chosen.
///
/// Progress `x` runs from 0 to 1. Each step advances it along a `tanh` curve
/// of the table position, sped up when the consumed share of pixel mass lags
/// behind the curve and slowed when it runs ahead. Radius and spread both
/// grow linearly with `x`.
#[derive(Debug, Clone)]
pub(crate) struct KernelSchedule {
    table_length: usize,
    min_radius: usize,
    progress: f64,
}

impl KernelSchedule {
    const STEEPNESS: f64 = 2.0;
    const OVERSHOOT: f64 = 1.08;
    const FEEDBACK: f64 = 8.0;

    pub(crate) fn new(table_length: usize, min_radius: usize) -> Self {
        Self {
            table_length,
            min_radius,
            progress: 0.0,
        }
    }

    /// Kernel parameters for the seed at table `position`, given the share
    /// of pixel mass consumed so far. Advances the schedule.
    pub(crate) fn next(&mut self, position: usize, consumed_share: f64) -> (usize, f64) {
        let x = self.progress;
        let radius = ((x * MAX_RADIUS as f64) as usize).clamp(self.min_radius, MAX_RADIUS);
        let spread = ((x * (PI - 1.0) + 1.0) / E).clamp(1.0 / E, PI / E);

        let len = self.table_length as f64;
        let a = position as f64 / len;
        let target = ((Self::STEEPNESS * a).tanh() * Self::OVERSHOOT).min(1.0);
        let mut dx = (Self::STEEPNESS * (a + 1.0 / len)).tanh() - (Self::STEEPNESS * a).tanh();
        let lag = (target - consumed_share) * (1.0 - a) + (target - x) * a;
        dx += dx * (Self::FEEDBACK * lag).tanh();
        self.progress = (x + dx).clamp(0.0, 1.0);

        (radius, spread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_center_is_full_weight() {
        let kernel = AbsorbKernel::new(4, 1.0);
        assert_eq!(kernel.weight(4, 4, 4), 65535);
    }

    #[test]
    fn test_kernel_is_symmetric_and_decreasing() {
        let kernel = AbsorbKernel::new(5, 0.5);
        assert_eq!(kernel.weight(0, 5, 5), kernel.weight(10, 5, 5));
        assert_eq!(kernel.weight(5, 2, 5), kernel.weight(5, 5, 2));
        assert!(kernel.weight(5, 5, 6) > kernel.weight(5, 5, 7));
        assert!(kernel.weight(5, 5, 7) > kernel.weight(5, 5, 10));
        assert!(kernel.weight(0, 0, 0) < kernel.weight(5, 5, 10));
    }

    #[test]
    fn test_absorb_reduces_neighbors_and_stays_in_cube() {
        let mut acc = Accumulator::new();
        let mut queue = CountQueue::new();
        let near = Rgb::new(101, 100, 100).to_packed();
        let far = Rgb::new(140, 100, 100).to_packed();
        acc.add(&vec![near; 50]);
        acc.add(&vec![far; 50]);

        let kernel = AbsorbKernel::new(4, 1.0);
        let absorbed = kernel.absorb(&mut acc, &mut queue, Rgb::new(100, 100, 100), 40);

        assert!(acc.count(near) < 50, "neighbor inside the cube is absorbed");
        assert_eq!(acc.count(far), 50, "color outside the cube is untouched");
        assert_eq!(absorbed, (50 - acc.count(near)) as u64);
        assert_eq!(queue.pop_live(&acc), Some((acc.count(near), near)));
        assert_eq!(queue.pop_live(&acc), None);
    }

    #[test]
    fn test_absorb_clips_at_channel_bounds() {
        let mut acc = Accumulator::new();
        let mut queue = CountQueue::new();
        acc.add(&[0x000000, 0x000001, 0xffffff]);
        let kernel = AbsorbKernel::new(3, 1.0);
        let absorbed = kernel.absorb(&mut acc, &mut queue, Rgb::BLACK, 10);
        assert_eq!(absorbed, 2);
        assert_eq!(acc.count(0xffffff), 1);
    }

    #[test]
    fn test_absorb_never_underflows() {
        let mut acc = Accumulator::new();
        let mut queue = CountQueue::new();
        acc.add(&[0x102030; 3]);
        let kernel = AbsorbKernel::new(2, 1.0);
        let absorbed = kernel.absorb(&mut acc, &mut queue, Rgb::new(0x10, 0x20, 0x30), u32::MAX);
        assert_eq!(absorbed, 3);
        assert_eq!(acc.count(0x102030), 0);
    }

    #[test]
    fn test_min_radius_shrinks_with_table_size() {
        assert_eq!(min_radius(0), MAX_RADIUS - 1);
        assert!(min_radius(16) > min_radius(64));
        assert_eq!(min_radius(256), 2);
    }

    #[test]
    fn test_schedule_widens_monotonically() {
        let mut schedule = KernelSchedule::new(32, min_radius(32));
        let mut last_radius = 0;
        let mut last_spread = 0.0;
        for position in 0..32 {
            let consumed = position as f64 / 32.0;
            let (radius, spread) = schedule.next(position, consumed);
            assert!(radius >= last_radius);
            assert!(spread >= last_spread);
            assert!((2..=MAX_RADIUS).contains(&radius));
            last_radius = radius;
            last_spread = spread;
        }
    }
}
