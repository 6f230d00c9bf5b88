//! Hybrid heap sort with an optional cache-blocked extraction phase

use crate::cache::{prefetch_read, INTS_PER_LINE};
use crate::engine::SortEngine;
use crate::small_sort::insertion_sort;

/// Heaps at or below this size are finished with insertion sort
pub const HEAP_THRESHOLD: usize = 16;

/// In-place heap sort over `i32` slices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapSort {
    blocked: bool,
}

impl HeapSort {
    pub fn new() -> Self {
        Self { blocked: false }
    }

    /// Extraction proceeds one destination cache line at a time
    pub fn blocked() -> Self {
        Self { blocked: true }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

impl SortEngine for HeapSort {
    fn name(&self) -> &'static str {
        if self.blocked {
            "Block HeapSort with cache-line extraction and insertion sort for small heaps"
        } else {
            "HeapSort with insertion sort for small heaps"
        }
    }

    fn sort(&self, v: &mut [i32]) {
        if v.len() <= HEAP_THRESHOLD {
            insertion_sort(v);
            return;
        }

        build_max_heap(v);
        if self.blocked {
            extract_blocked(v);
        } else {
            extract(v);
        }
    }
}

/// Floyd's bottom-up construction, linear in `v.len()`
fn build_max_heap(v: &mut [i32]) {
    for node in (0..v.len() / 2).rev() {
        sift_down(v, node);
    }
}

/// Restore `parent >= child` below `node`.
///
/// The value that moves is held in a register and written once at its final
/// position; children move up into the hole instead of being swapped.
#[inline]
fn sift_down(v: &mut [i32], mut node: usize) {
    let len = v.len();
    let value = v[node];

    loop {
        let left = 2 * node + 1;
        if left >= len {
            break;
        }
        // First grandchild; its siblings share the line.
        prefetch_read(v, 2 * left + 1);

        let right = left + 1;
        let child = if right < len && v[right] > v[left] {
            right
        } else {
            left
        };

        if v[child] <= value {
            break;
        }
        v[node] = v[child];
        node = child;
    }

    v[node] = value;
}

/// Pop maxima to the back until the heap is small enough for insertion sort.
/// The remaining heap holds exactly the smallest values, so the result matches
/// extracting all the way down.
fn extract(v: &mut [i32]) {
    let mut end = v.len();
    while end > HEAP_THRESHOLD {
        end -= 1;
        v.swap(0, end);
        sift_down(&mut v[..end], 0);
    }
    insertion_sort(&mut v[..end]);
}

/// Same pops as [`extract`], grouped so each group fills one destination cache
/// line. The first group takes the ragged tail so later groups start on a line
/// boundary of the aligned corpus.
fn extract_blocked(v: &mut [i32]) {
    let mut end = v.len();
    while end > HEAP_THRESHOLD {
        let ragged = end % INTS_PER_LINE;
        let line = if ragged == 0 { INTS_PER_LINE } else { ragged };
        let block = line.min(end - HEAP_THRESHOLD);

        prefetch_read(v, end - block);
        for _ in 0..block {
            end -= 1;
            v.swap(0, end);
            sift_down(&mut v[..end], 0);
        }
    }
    insertion_sort(&mut v[..end]);
}
