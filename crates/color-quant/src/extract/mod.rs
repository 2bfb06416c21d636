//! Color table extraction.
//!
//! An [`Extractor`] counts how often every 24-bit color occurs across the
//! images it is fed, then picks a small set of representative colors by
//! repeatedly taking the most frequent remaining color and suppressing its
//! neighborhood.

mod absorb;
mod accumulator;
mod extractor;
mod queue;
mod select;

pub use extractor::{Extractor, ExtractorState};
