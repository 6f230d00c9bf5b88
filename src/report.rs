//! Full-report rendering and atomic persistence

use crate::error::{SortContext, SortResult};
use crate::timing::ElapsedTime;
use itertools::Itertools;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Values per line in the array sections
pub const ITEMS_PER_LINE: usize = 20;

/// Everything the full report shows about one invocation
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub original: &'a [i32],
    pub sorted: &'a [i32],
    pub elapsed: ElapsedTime,
    pub algorithm: &'a str,
}

impl Report<'_> {
    /// Render the report text, newline terminated
    pub fn render(&self) -> String {
        format!(
            "Original array: {}\nSorted array: {}\nSorting algorithm performance: Sorted {} items in {}\nAlgorithm: {}\n",
            format_values(self.original),
            format_values(self.sorted),
            self.sorted.len(),
            self.elapsed.formatted(),
            self.algorithm,
        )
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }

    /// Write the report to `path` so that it either appears complete or not at all.
    ///
    /// Missing parent directories are created. The text goes to a temporary file
    /// in the same directory which is renamed over `path` once fully written.
    pub fn persist(&self, path: &Path) -> SortResult<()> {
        let name = path.display().to_string();
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !parent.exists() {
            fs::create_dir_all(&parent).with_output_context(&name)?;
            info!(directory = %parent.display(), "created output directory");
        }

        let mut staged = NamedTempFile::new_in(&parent).with_output_context(&name)?;
        self.write_to(&mut staged).with_output_context(&name)?;
        staged
            .persist(path)
            .map_err(|e| e.error)
            .with_output_context(&name)?;
        Ok(())
    }
}

/// Space separated values, wrapped after every [`ITEMS_PER_LINE`] items
pub fn format_values(values: &[i32]) -> String {
    values
        .chunks(ITEMS_PER_LINE)
        .map(|line| line.iter().join(" "))
        .join(" \n")
}
