//! Insertion sort used by both engines below their size thresholds

/// Stable in-place insertion sort.
///
/// Shifts larger elements right and drops the held value into the gap, so each
/// step is one store rather than a swap.
#[inline]
pub fn insertion_sort(v: &mut [i32]) {
    for i in 1..v.len() {
        let key = v[i];
        let mut j = i;
        while j > 0 && v[j - 1] > key {
            v[j] = v[j - 1];
            j -= 1;
        }
        v[j] = key;
    }
}
