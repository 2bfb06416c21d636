//! Max-queue of colors by current count.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::accumulator::Accumulator;

/// Colors ordered by count, highest first, ties broken by the smaller packed value.
///
/// Counts only ever go down during selection, so instead of a decrease-key
/// operation every lowered count is pushed again and stale entries (whose
/// recorded count no longer matches the accumulator) are skipped on pop.
#[derive(Debug, Default)]
pub(crate) struct CountQueue {
    heap: BinaryHeap<(u32, Reverse<u32>)>,
}

impl CountQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue every color of `acc` with a non-zero count.
    pub(crate) fn from_accumulator(acc: &Accumulator) -> Self {
        let heap = acc
            .seen()
            .iter()
            .filter_map(|&color| {
                let count = acc.count(color);
                (count > 0).then_some((count, Reverse(color)))
            })
            .collect();
        Self { heap }
    }

    #[inline]
    pub(crate) fn push(&mut self, count: u32, color: u32) {
        self.heap.push((count, Reverse(color)));
    }

    /// Pop the highest live `(count, color)`.
    pub(crate) fn pop_live(&mut self, acc: &Accumulator) -> Option<(u32, u32)> {
        while let Some((count, Reverse(color))) = self.heap.pop() {
            if count > 0 && acc.count(color) == count {
                return Some((count, color));
            }
        }
        None
    }
}
