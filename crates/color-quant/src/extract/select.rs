//! Peak-absorption table selection.
//!
//! The frequency table is treated as a landscape over the RGB cube. The
//! highest remaining peak becomes a seed and flattens its surroundings with a
//! Gaussian kernel, so the next pick lands on a genuinely different color.
//! Forced colors flatten their surroundings up front. Once the table is full,
//! the significant colors that survived are folded into their nearest seed.

use std::collections::HashSet;

use super::absorb::{min_radius, AbsorbKernel, KernelSchedule, FORCED_SPREAD};
use super::accumulator::Accumulator;
use super::queue::CountQueue;
use crate::color::Rgb;

/// Colors seen this many times or fewer are ignored during refinement.
pub(crate) const SKIP_MIN_COUNT: u32 = 3;

/// A chosen seed and the count-weighted mean of everything merged into it.
#[derive(Debug, Clone)]
struct Cluster {
    sum: [f64; 3],
    weight: f64,
}

impl Cluster {
    fn new(color: Rgb, count: u32) -> Self {
        let w = count as f64;
        Self {
            sum: [color.r as f64 * w, color.g as f64 * w, color.b as f64 * w],
            weight: w,
        }
    }

    fn merge(&mut self, color: Rgb, count: u32) {
        let w = count as f64;
        self.sum[0] += color.r as f64 * w;
        self.sum[1] += color.g as f64 * w;
        self.sum[2] += color.b as f64 * w;
        self.weight += w;
    }

    fn centroid(&self) -> [f64; 3] {
        [
            self.sum[0] / self.weight,
            self.sum[1] / self.weight,
            self.sum[2] / self.weight,
        ]
    }

    fn distance_squared(&self, color: Rgb) -> f64 {
        let [r, g, b] = self.centroid();
        let dr = r - color.r as f64;
        let dg = g - color.g as f64;
        let db = b - color.b as f64;
        dr * dr + dg * dg + db * db
    }

    fn to_rgb(&self) -> Rgb {
        let [r, g, b] = self.centroid();
        Rgb::from_f32_clamped(r as f32, g as f32, b as f32)
    }
}

/// Outcome of one selection run.
#[derive(Debug)]
pub(crate) struct Selection {
    pub colors: Vec<Rgb>,
    pub seeds: usize,
    pub merged: usize,
}

/// Choose up to `table_length` colors, `forced` first.
///
/// `forced` must already be free of duplicates and no longer than
/// `table_length`. Consumes the counts in `acc`.
pub(crate) fn select(acc: &mut Accumulator, table_length: usize, forced: &[Rgb]) -> Selection {
    debug_assert!(forced.len() <= table_length);

    let mass: u64 = acc.seen().iter().map(|&c| acc.count(c) as u64).sum();
    let mass = mass.max(1) as f64;
    let height = acc.max_count();
    let free_slots = table_length - forced.len();
    let narrowest = min_radius(free_slots);

    let mut queue = CountQueue::from_accumulator(acc);
    let mut consumed = 0u64;

    if !forced.is_empty() && height > 0 {
        let kernel = AbsorbKernel::new(narrowest, FORCED_SPREAD);
        for &color in forced {
            let packed = color.to_packed();
            consumed += acc.count(packed) as u64;
            acc.set_count(packed, 0);
            consumed += kernel.absorb(acc, &mut queue, color, height);
        }
    }

    let mut clusters: Vec<Cluster> = Vec::with_capacity(free_slots);
    let mut schedule = KernelSchedule::new(free_slots, narrowest);
    let mut current: Option<AbsorbKernel> = None;

    while clusters.len() < free_slots {
        let Some((count, packed)) = queue.pop_live(acc) else {
            break;
        };
        let color = Rgb::from_packed(packed);
        acc.set_count(packed, 0);
        consumed += count as u64;

        let (radius, spread) = schedule.next(clusters.len(), consumed as f64 / mass);
        if current
            .as_ref()
            .is_some_and(|k| k.differs_from(radius, spread))
        {
            current = None;
        }
        let kernel = current.get_or_insert_with(|| AbsorbKernel::new(radius, spread));
        consumed += kernel.absorb(acc, &mut queue, color, count);

        clusters.push(Cluster::new(color, count));
    }

    let mut merged = 0;
    if !clusters.is_empty() {
        while let Some((count, packed)) = queue.pop_live(acc) {
            if count <= SKIP_MIN_COUNT {
                break;
            }
            acc.set_count(packed, 0);
            let color = Rgb::from_packed(packed);
            let nearest = nearest_cluster(&clusters, color);
            clusters[nearest].merge(color, count);
            merged += 1;
        }
    }

    let seeds = clusters.len();
    let mut taken: HashSet<Rgb> = forced.iter().copied().collect();
    let mut colors = forced.to_vec();
    for cluster in &clusters {
        let color = cluster.to_rgb();
        if taken.insert(color) {
            colors.push(color);
        }
    }

    Selection {
        colors,
        seeds,
        merged,
    }
}

/// Index of the cluster whose centroid is closest to `color`; ties go to the lower index.
fn nearest_cluster(clusters: &[Cluster], color: Rgb) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, cluster) in clusters.iter().enumerate() {
        let d = cluster.distance_squared(color);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}
