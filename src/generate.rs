//! Random corpus files for manual runs and benchmark trials

use crate::error::{SortContext, SortError, SortResult};
use itertools::Itertools;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Upper bound (exclusive) for values in size-series files
pub const SERIES_VALUE_RANGE: i32 = 1000;

/// `count` uniform integers in `min..=max`
pub fn generate_values<R: Rng>(
    count: usize,
    min: i32,
    max: i32,
    rng: &mut R,
) -> SortResult<Vec<i32>> {
    if count == 0 {
        return Err(SortError::invalid_argument("COUNT must be greater than 0"));
    }
    if min >= max {
        return Err(SortError::invalid_argument("MIN must be less than MAX"));
    }
    Ok((0..count).map(|_| rng.gen_range(min..=max)).collect())
}

/// djb2 over the text, used to give each generated file a content-derived name
pub fn content_hash(text: &str) -> u64 {
    text.bytes().fold(5381u64, |hash, byte| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(byte as u64)
    })
}

fn ensure_dir(dir: &Path) -> SortResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_output_context(&dir.display().to_string())?;
        info!(directory = %dir.display(), "created directory");
    }
    Ok(())
}

/// Write `values` space separated to `dir/randnum_<hash>.txt`
pub fn write_corpus(dir: &Path, values: &[i32]) -> SortResult<PathBuf> {
    ensure_dir(dir)?;
    let text = values.iter().join(" ");
    let path = dir.join(format!("randnum_{:x}.txt", content_hash(&text)));
    fs::write(&path, &text).with_output_context(&path.display().to_string())?;
    debug!(path = %path.display(), values = values.len(), "corpus written");
    Ok(path)
}

/// Sizes `min, min + step, ...` up to and including `max`
pub fn series_sizes(min: usize, max: usize, step: usize) -> SortResult<Vec<usize>> {
    if min == 0 || max == 0 || step == 0 {
        return Err(SortError::invalid_argument(
            "size range and step must be positive",
        ));
    }
    if min > max {
        return Err(SortError::invalid_argument(
            "minimum size must be less than or equal to maximum size",
        ));
    }
    Ok((min..=max).step_by(step).collect())
}

/// One `test_<size>.txt` per size, values in `0..SERIES_VALUE_RANGE`
pub fn generate_size_series<R: Rng>(
    dir: &Path,
    min: usize,
    max: usize,
    step: usize,
    rng: &mut R,
) -> SortResult<Vec<PathBuf>> {
    let sizes = series_sizes(min, max, step)?;
    ensure_dir(dir)?;

    let mut paths = Vec::with_capacity(sizes.len());
    for size in sizes {
        let values = generate_values(size, 0, SERIES_VALUE_RANGE - 1, rng)?;
        let path = dir.join(format!("test_{size}.txt"));
        fs::write(&path, values.iter().join(" "))
            .with_output_context(&path.display().to_string())?;
        debug!(path = %path.display(), size, "series file written");
        paths.push(path);
    }
    Ok(paths)
}
