//! Configuration management for sort invocations

use crate::error::{SortError, SortResult};
use crate::reader::ReadStrategy;
use crate::timing::{ClockSource, OutputMode};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default directory for reports when sorting a file without `-o`
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Which sort engine to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Hybrid heap sort (optionally cache-blocked)
    #[default]
    Heap,
    /// Median-of-three quicksort
    Quick,
}

/// Where the corpus comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A text file given with `-f`
    File(PathBuf),
    /// Integers given as positional arguments
    Values(Vec<String>),
}

impl Default for InputSource {
    fn default() -> Self {
        InputSource::Values(Vec::new())
    }
}

/// Main configuration structure for a sort invocation
#[derive(Debug, Clone, Default)]
pub struct SortConfig {
    /// Engine to run
    pub algorithm: Algorithm,
    /// Cache-blocked heap extraction (heap engine only)
    pub block_sort: bool,
    /// Corpus source
    pub input: InputSource,
    /// Explicit report destination (`-o`)
    pub output_file: Option<PathBuf>,
    /// Directory for default report paths; `output` when unset
    pub output_dir: Option<PathBuf>,
    /// Which of the three timing outputs to produce
    pub output_mode: OutputMode,
    /// Clock used around the sort call
    pub clock: ClockSource,
    /// Ingestion strategy for file input
    pub read_strategy: ReadStrategy,
}

impl SortConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_block_sort(mut self, block_sort: bool) -> Self {
        self.block_sort = block_sort;
        self
    }

    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = input;
        self
    }

    pub fn with_output_file(mut self, output_file: Option<PathBuf>) -> Self {
        self.output_file = output_file;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    pub fn with_clock(mut self, clock: ClockSource) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_read_strategy(mut self, read_strategy: ReadStrategy) -> Self {
        self.read_strategy = read_strategy;
        self
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> SortResult<()> {
        if self.block_sort && self.algorithm != Algorithm::Heap {
            return Err(SortError::conflicting_options(
                "--block-sort is only available with the heap algorithm",
            ));
        }

        match &self.input {
            InputSource::File(path) if path.as_os_str().is_empty() => {
                Err(SortError::invalid_argument("input file name is empty"))
            }
            InputSource::Values(values) if values.is_empty() => Err(
                SortError::invalid_argument("no integers given; pass values or -f <file>"),
            ),
            _ => Ok(()),
        }
    }

    /// Where the full report goes: `None` means the console.
    ///
    /// An explicit `-o` always wins. File input without `-o` lands in
    /// `<output_dir>/<basename of input>`.
    pub fn report_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.output_file {
            return Some(path.clone());
        }
        match &self.input {
            InputSource::File(input) => {
                let base = input.file_name().unwrap_or(input.as_os_str());
                Some(self.effective_output_dir().join(base))
            }
            InputSource::Values(_) => None,
        }
    }

    pub fn effective_output_dir(&self) -> &Path {
        self.output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR))
    }

    /// Check if reading from a file
    pub fn reading_from_file(&self) -> bool {
        matches!(self.input, InputSource::File(_))
    }
}

impl FromStr for Algorithm {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heap" | "heapsort" => Ok(Algorithm::Heap),
            "quick" | "quicksort" => Ok(Algorithm::Quick),
            _ => Err(SortError::invalid_argument(&format!("unknown algorithm: {s}"))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Heap => "heapsort",
            Algorithm::Quick => "quicksort",
        };
        write!(f, "{name}")
    }
}

/// Builder pattern for creating configurations
pub struct SortConfigBuilder {
    config: SortConfig,
}

impl SortConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self {
            config: SortConfig::default(),
        }
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    pub fn block_sort(mut self) -> Self {
        self.config.block_sort = true;
        self
    }

    pub fn input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input = InputSource::File(path.into());
        self
    }

    pub fn values(mut self, values: Vec<String>) -> Self {
        self.config.input = InputSource::Values(values);
        self
    }

    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_file = Some(path.into());
        self
    }

    /// Apply the two timing flags with their fixed priority
    pub fn timing_flags(mut self, bench_time: bool, time_only: bool) -> Self {
        self.config.output_mode = OutputMode::resolve(bench_time, time_only);
        self
    }

    pub fn cpu_clock(mut self) -> Self {
        self.config.clock = ClockSource::Cpu;
        self
    }

    pub fn streaming(mut self) -> Self {
        self.config.read_strategy = ReadStrategy::Streaming;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SortResult<SortConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SortConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Preset configurations for the common engine variants
pub mod presets {
    use super::*;

    /// Plain heap sort over a file
    pub fn heapsort(input: impl Into<PathBuf>) -> SortConfig {
        SortConfig::new().with_input(InputSource::File(input.into()))
    }

    /// Cache-blocked heap sort over a file
    pub fn block_heapsort(input: impl Into<PathBuf>) -> SortConfig {
        heapsort(input).with_block_sort(true)
    }

    /// Quicksort over a file
    pub fn quicksort(input: impl Into<PathBuf>) -> SortConfig {
        heapsort(input).with_algorithm(Algorithm::Quick)
    }

    /// Raw timing output for benchmark trials
    pub fn bench_trial(algorithm: Algorithm, input: impl Into<PathBuf>) -> SortConfig {
        SortConfig::new()
            .with_algorithm(algorithm)
            .with_input(InputSource::File(input.into()))
            .with_output_mode(OutputMode::Raw)
    }
}
