//! The sort engine seam: one trait, one factory keyed by configuration

use crate::config::{Algorithm, SortConfig};
use crate::heap_sort::HeapSort;
use crate::quick_sort::QuickSort;

/// An in-place ascending sort over `i32` values
pub trait SortEngine {
    /// Human readable algorithm name, printed in full reports
    fn name(&self) -> &'static str;

    /// Sort `data` ascending. Only permutes; never changes the length.
    fn sort(&self, data: &mut [i32]);
}

/// Pick the engine a configuration asks for
pub fn engine_for(config: &SortConfig) -> Box<dyn SortEngine> {
    match config.algorithm {
        Algorithm::Heap if config.block_sort => Box::new(HeapSort::blocked()),
        Algorithm::Heap => Box::new(HeapSort::new()),
        Algorithm::Quick => Box::new(QuickSort::new()),
    }
}
