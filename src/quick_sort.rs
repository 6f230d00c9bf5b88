//! Quicksort with median-of-three pivots and bounded recursion depth

use crate::cache::{prefetch_read, INTS_PER_LINE};
use crate::engine::SortEngine;
use crate::small_sort::insertion_sort;
use std::mem;

/// Ranges shorter than this are insertion sorted
pub const QUICK_THRESHOLD: usize = 16;

/// In-place quicksort over `i32` slices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuickSort;

impl QuickSort {
    pub fn new() -> Self {
        Self
    }
}

impl SortEngine for QuickSort {
    fn name(&self) -> &'static str {
        "Optimized QuickSort with median-of-three pivot"
    }

    fn sort(&self, v: &mut [i32]) {
        quicksort(v, 0, depth_limit(v.len()));
    }
}

/// Upper bound on recursion depth: only the smaller side of a partition is
/// recursed into, and it holds at most half of the range.
pub fn depth_limit(len: usize) -> u32 {
    usize::BITS - len.leading_zeros()
}

/// Sort `v`, recursing into the smaller partition and looping on the larger.
/// Returns the deepest recursion level reached.
fn quicksort(mut v: &mut [i32], depth: u32, limit: u32) -> u32 {
    debug_assert!(depth <= limit, "recursion depth {depth} exceeds bound {limit}");
    let mut deepest = depth;

    while v.len() >= QUICK_THRESHOLD {
        let p = partition(v);

        let (left, right) = mem::take(&mut v).split_at_mut(p);
        let right = &mut right[1..];

        if left.len() < right.len() {
            deepest = deepest.max(quicksort(left, depth + 1, limit));
            v = right;
        } else {
            deepest = deepest.max(quicksort(right, depth + 1, limit));
            v = left;
        }
    }

    insertion_sort(v);
    deepest
}

/// Order `v[low] <= v[mid] <= v[high]` and return the median value
#[inline]
fn median_of_three(v: &mut [i32], low: usize, mid: usize, high: usize) -> i32 {
    if v[mid] < v[low] {
        v.swap(low, mid);
    }
    if v[high] < v[low] {
        v.swap(low, high);
    }
    if v[high] < v[mid] {
        v.swap(mid, high);
    }
    v[mid]
}

/// Lomuto partition around the median of first, middle and last.
///
/// Returns the pivot's final index `p`: `v[..p] <= v[p] <= v[p + 1..]`.
fn partition(v: &mut [i32]) -> usize {
    let high = v.len() - 1;
    let mid = high / 2;
    let pivot = median_of_three(v, 0, mid, high);

    // Park the pivot at the end; the old maximum moves into the scanned range.
    v.swap(mid, high);

    let mut store = 0;
    for j in 0..high {
        if j % INTS_PER_LINE == 0 {
            prefetch_read(v, j + 2 * INTS_PER_LINE);
        }
        if v[j] <= pivot {
            v.swap(store, j);
            store += 1;
        }
    }
    v.swap(store, high);
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{assert_sorts, patterns};

    #[test]
    fn test_median_of_three_orders_samples() {
        let mut data = vec![9, 0, 0, 1, 0, 0, 5];
        let median = median_of_three(&mut data, 0, 3, 6);
        assert_eq!(median, 5);
        assert_eq!((data[0], data[3], data[6]), (1, 5, 9));
    }

    #[test]
    fn test_partition_postcondition() {
        let mut data: Vec<i32> = (0..64).map(|i| (i * 29) % 64 - 32).collect();
        let p = partition(&mut data);
        let pivot = data[p];
        assert!(data[..p].iter().all(|&x| x <= pivot));
        assert!(data[p..].iter().all(|&x| x >= pivot));
    }

    #[test]
    fn test_end_to_end_example() {
        let mut data = vec![5, 3, 8, 1, 9, 2];
        QuickSort::new().sort(&mut data);
        assert_eq!(data, vec![1, 2, 3, 5, 8, 9]);
    }

    #[test]
    fn test_threshold_boundary() {
        for len in [15, 16, 17] {
            let descending: Vec<i32> = (0..len).rev().collect();
            let interleaved: Vec<i32> = (0..len).map(|i| if i % 2 == 0 { i } else { -i }).collect();
            assert_sorts(&QuickSort::new(), &descending);
            assert_sorts(&QuickSort::new(), &interleaved);
        }
    }

    #[test]
    fn test_patterns() {
        for data in patterns(0xc0ffee) {
            assert_sorts(&QuickSort::new(), &data);
        }
    }

    #[test]
    fn test_depth_stays_logarithmic() {
        let inputs: Vec<Vec<i32>> = vec![
            (0..10_000).collect(),
            (0..10_000).rev().collect(),
            (0..5_000).chain((0..5_000).rev()).collect(),
            vec![7; 2_000],
        ];
        for mut data in inputs {
            let limit = depth_limit(data.len());
            let deepest = quicksort(&mut data, 0, limit);
            assert!(deepest <= limit, "depth {deepest} > {limit}");
            assert!(data.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(depth_limit(0), 0);
        assert_eq!(depth_limit(1), 1);
        assert_eq!(depth_limit(16), 5);
        assert_eq!(depth_limit(1 << 20), 21);
    }
}
