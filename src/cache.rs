//! Cache-line geometry and prefetch hints shared by the sort engines

/// Size of one cache line in bytes on the targets we care about
pub const CACHE_LINE_SIZE: usize = 64;

/// Number of `i32` values that fit in one cache line
pub const INTS_PER_LINE: usize = CACHE_LINE_SIZE / std::mem::size_of::<i32>();

/// Hint the CPU that `data[index]` will be read soon.
///
/// Out-of-range indices are ignored, so callers can prefetch speculatively
/// near the end of a slice.
#[inline(always)]
pub fn prefetch_read(data: &[i32], index: usize) {
    if index >= data.len() {
        return;
    }

    #[cfg(target_arch = "x86_64")]
    // SAFETY: `index` is in bounds, so the pointer is valid; prefetch never faults
    // and does not affect program semantics.
    unsafe {
        std::arch::x86_64::_mm_prefetch(
            data.as_ptr().add(index) as *const i8,
            std::arch::x86_64::_MM_HINT_T0,
        );
    }

    #[cfg(not(target_arch = "x86_64"))]
    let _ = data;
}
