//! Per-color frequency counts for one accumulation session.

/// Colors sharing a red channel share one page of `256 * 256` counters.
const PAGE_LEN: usize = 1 << 16;

/// Frequency table over the full 24-bit color space.
///
/// Storage is paged by the red channel and pages are allocated on first
/// touch, so an image with few distinct reds costs a few hundred KiB rather
/// than the 64 MiB of a flat table. Counters saturate at `u32::MAX`.
#[derive(Debug)]
pub(crate) struct Accumulator {
    pages: Vec<Option<Box<[u32]>>>,
    /// Every color whose counter has been non-zero this session, in first-seen order.
    seen: Vec<u32>,
    /// Pixels added this session (saturating).
    total: u64,
}

impl Accumulator {
    pub(crate) fn new() -> Self {
        Self {
            pages: (0..256).map(|_| None).collect(),
            seen: Vec::new(),
            total: 0,
        }
    }

    /// Count every pixel of `pixels`, ignoring the high byte.
    pub(crate) fn add(&mut self, pixels: &[u32]) {
        for &pixel in pixels {
            let (page, offset) = split(pixel);
            let counters = self.pages[page]
                .get_or_insert_with(|| vec![0u32; PAGE_LEN].into_boxed_slice());
            let counter = &mut counters[offset];
            if *counter == 0 {
                self.seen.push(pixel & 0x00ff_ffff);
            }
            *counter = counter.saturating_add(1);
        }
        self.total = self.total.saturating_add(pixels.len() as u64);
    }

    #[inline]
    pub(crate) fn count(&self, color: u32) -> u32 {
        let (page, offset) = split(color);
        self.pages[page].as_ref().map_or(0, |p| p[offset])
    }

    #[inline]
    pub(crate) fn set_count(&mut self, color: u32, count: u32) {
        let (page, offset) = split(color);
        if let Some(p) = self.pages[page].as_mut() {
            p[offset] = count;
        }
    }

    /// The page holding colors with the given red channel, if allocated.
    #[inline]
    pub(crate) fn page_mut(&mut self, red: u8) -> Option<&mut [u32]> {
        self.pages[red as usize].as_deref_mut()
    }

    pub(crate) fn seen(&self) -> &[u32] {
        &self.seen
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Largest current count over all seen colors.
    pub(crate) fn max_count(&self) -> u32 {
        self.seen.iter().map(|&c| self.count(c)).max().unwrap_or(0)
    }

    /// Zero every counter and forget the session.
    ///
    /// Pages stay allocated so a reused extractor does not pay for them twice.
    /// Only counters listed in `seen` can be non-zero, so only those are touched.
    pub(crate) fn clear(&mut self) {
        for i in 0..self.seen.len() {
            let color = self.seen[i];
            self.set_count(color, 0);
        }
        self.seen.clear();
        self.total = 0;
    }
}

#[inline]
fn split(color: u32) -> (usize, usize) {
    (((color >> 16) & 0xff) as usize, (color & 0xffff) as usize)
}

/// Offset of `(g, b)` inside a page.
#[inline]
pub(crate) fn page_offset(g: u8, b: u8) -> usize {
    ((g as usize) << 8) | b as usize
}
