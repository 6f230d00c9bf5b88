//! Cache-line aligned integer storage for a single sort invocation

use crate::cache::INTS_PER_LINE;
use crate::error::{SortError, SortResult};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// One cache line worth of integers. The alignment is carried by the type so
/// the allocator hands out line-aligned memory for the whole buffer.
#[derive(Clone, Copy)]
#[repr(C, align(64))]
struct CacheLine([i32; INTS_PER_LINE]);

const EMPTY_LINE: CacheLine = CacheLine([0; INTS_PER_LINE]);

/// The integers read for one invocation.
///
/// Backed by whole cache lines; only the first `len` slots are visible. The
/// length is fixed once ingestion finishes, sorting only permutes in place.
#[derive(Clone)]
pub struct Corpus {
    lines: Vec<CacheLine>,
    len: usize,
}

impl Corpus {
    /// Empty corpus without any allocation
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            len: 0,
        }
    }

    /// Allocate room for exactly `capacity` integers (rounded up to whole lines)
    pub fn with_capacity(capacity: usize) -> SortResult<Self> {
        let mut lines = Vec::new();
        lines
            .try_reserve_exact(lines_for(capacity))
            .map_err(|_| SortError::allocation_failure(capacity))?;
        Ok(Self { lines, len: 0 })
    }

    /// Copy a slice into a freshly aligned buffer
    pub fn from_slice(values: &[i32]) -> SortResult<Self> {
        let mut corpus = Self::with_capacity(values.len())?;
        for &value in values {
            corpus.push(value)?;
        }
        Ok(corpus)
    }

    /// Append a value, doubling the backing storage when it is full
    pub fn push(&mut self, value: i32) -> SortResult<()> {
        let (line, slot) = (self.len / INTS_PER_LINE, self.len % INTS_PER_LINE);
        if line == self.lines.len() {
            if self.lines.len() == self.lines.capacity() {
                let grow_by = self.lines.capacity().max(1);
                self.lines
                    .try_reserve_exact(grow_by)
                    .map_err(|_| SortError::allocation_failure(self.len + 1))?;
            }
            self.lines.push(EMPTY_LINE);
        }
        self.lines[line].0[slot] = value;
        self.len += 1;
        Ok(())
    }

    /// Release capacity beyond the lines that hold values
    pub fn shrink_to_fit(&mut self) {
        self.lines.truncate(lines_for(self.len));
        self.lines.shrink_to_fit();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of integers that fit without reallocating
    pub fn capacity(&self) -> usize {
        self.lines.capacity() * INTS_PER_LINE
    }

    pub fn as_slice(&self) -> &[i32] {
        // SAFETY: `CacheLine` is `repr(C)` around `[i32; INTS_PER_LINE]` and its size
        // equals its alignment, so the lines form one contiguous run of initialized
        // i32s. `len` never exceeds `lines.len() * INTS_PER_LINE`. For an empty
        // vector the pointer is dangling but non-null and aligned, valid for len 0.
        unsafe { std::slice::from_raw_parts(self.lines.as_ptr() as *const i32, self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        // SAFETY: see `as_slice`; the mutable borrow of `self` makes the view unique.
        unsafe { std::slice::from_raw_parts_mut(self.lines.as_mut_ptr() as *mut i32, self.len) }
    }

    /// Whether the first element sits on a cache-line boundary
    pub fn is_line_aligned(&self) -> bool {
        self.lines.as_ptr() as usize % std::mem::align_of::<CacheLine>() == 0
    }

    /// Take an independent copy of the current contents for reporting
    pub fn snapshot(&self) -> SortResult<OriginalSnapshot> {
        let mut lines = Vec::new();
        lines
            .try_reserve_exact(self.lines.len())
            .map_err(|_| SortError::allocation_failure(self.len))?;
        lines.extend_from_slice(&self.lines);
        Ok(OriginalSnapshot(Corpus {
            lines,
            len: self.len,
        }))
    }
}

fn lines_for(count: usize) -> usize {
    (count + INTS_PER_LINE - 1) / INTS_PER_LINE
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Corpus {
    type Target = [i32];

    fn deref(&self) -> &[i32] {
        self.as_slice()
    }
}

impl DerefMut for Corpus {
    fn deref_mut(&mut self) -> &mut [i32] {
        self.as_mut_slice()
    }
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl PartialEq for Corpus {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Corpus {}

/// Read-only copy of the corpus as it was before sorting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalSnapshot(Corpus);

impl OriginalSnapshot {
    pub fn as_slice(&self) -> &[i32] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
