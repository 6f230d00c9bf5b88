//! Hybrid integer sorting with a reproducible timing protocol
//!
//! The crate reads a loosely delimited integer corpus into a cache-line
//! aligned buffer, sorts it in place with a hybrid heap sort (optionally
//! cache-blocked) or a median-of-three quicksort, and reports exactly one of
//! three timing outputs. The `gen_randf` and `benchmark` binaries build on the
//! same library to generate corpora and drive repeatable benchmark runs.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod error;
pub mod config;
pub mod logging;

// Corpus ingestion
pub mod cache;
pub mod corpus;
pub mod reader;

// Sort engines
pub mod engine;
pub mod heap_sort;
pub mod quick_sort;
pub mod small_sort;

// Timing, reports and tooling
pub mod timing;
pub mod report;
pub mod generate;
pub mod harness;

// Re-export commonly used types
pub use config::{Algorithm, InputSource, SortConfig, SortConfigBuilder};
pub use corpus::Corpus;
pub use engine::{engine_for, SortEngine};
pub use error::{SortError, SortResult};
pub use reader::{CorpusReader, ReadStrategy};
pub use timing::{ClockSource, ElapsedTime, OutputMode};

use report::Report;
use std::io::{self, Write};
use tracing::{debug, info};

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Run one sort invocation, writing its stdout output to the process stdout
pub fn sort(config: &SortConfig) -> SortResult<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    sort_to(config, &mut out)
}

/// Run one sort invocation, writing its stdout output to `out`.
///
/// Raw and formatted-only modes write a single timing line. The full report
/// goes to the report file when there is one (followed by a notice naming
/// it) and to `out` otherwise.
pub fn sort_to<W: Write>(config: &SortConfig, out: &mut W) -> SortResult<i32> {
    config.validate()?;
    let mut corpus = load(config)?;

    if config.output_mode != OutputMode::FullReport {
        let (_, elapsed) = sort_timed(config, &mut corpus);
        if let Some(line) = config.output_mode.timing_line(elapsed) {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        return Ok(EXIT_SUCCESS);
    }

    let original = corpus.snapshot()?;
    let (algorithm, elapsed) = sort_timed(config, &mut corpus);
    let report = Report {
        original: original.as_slice(),
        sorted: corpus.as_slice(),
        elapsed,
        algorithm,
    };

    match config.report_path() {
        Some(path) => {
            report.persist(&path)?;
            writeln!(out, "Writing sorted output to: {}", path.display())?;
            out.flush()?;
        }
        None => report.write_to(out)?,
    }
    Ok(EXIT_SUCCESS)
}

/// Read the corpus the configuration points at
pub fn load(config: &SortConfig) -> SortResult<Corpus> {
    let reader = CorpusReader::new(config.read_strategy);
    match &config.input {
        InputSource::File(path) => reader.read_path(path),
        InputSource::Values(values) => reader.read_values(values),
    }
}

fn sort_timed(config: &SortConfig, corpus: &mut Corpus) -> (&'static str, ElapsedTime) {
    let engine = engine_for(config);
    debug!(engine = engine.name(), values = corpus.len(), clock = ?config.clock, "sorting");

    let data = corpus.as_mut_slice();
    let elapsed = timing::measure(config.clock, || engine.sort(data));

    info!(engine = engine.name(), values = corpus.len(), elapsed = %elapsed, "sort finished");
    (engine.name(), elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn run(config: &SortConfig) -> SortResult<String> {
        let mut out = Vec::new();
        let code = sort_to(config, &mut out)?;
        assert_eq!(code, EXIT_SUCCESS);
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    fn values(items: &[&str]) -> InputSource {
        InputSource::Values(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_raw_mode_prints_one_line() -> SortResult<()> {
        let config = SortConfig::new()
            .with_input(values(&["3", "1", "2"]))
            .with_output_mode(OutputMode::Raw);
        let out = run(&config)?;
        let line = out.strip_suffix('\n').expect("newline terminated");
        assert!(!line.contains('\n'));
        ElapsedTime::parse_raw(line)?;
        Ok(())
    }

    #[test]
    fn test_formatted_only_mode() -> SortResult<()> {
        let config = SortConfig::new()
            .with_input(values(&["9", "-4"]))
            .with_algorithm(Algorithm::Quick)
            .with_output_mode(OutputMode::FormattedOnly);
        let out = run(&config)?;
        assert_eq!(out.lines().count(), 1);
        assert!(["ns", "μs", "ms", " s"].iter().any(|unit| out.trim_end().ends_with(unit)));
        Ok(())
    }

    #[test]
    fn test_console_report() -> SortResult<()> {
        let config = SortConfig::new().with_input(values(&["5", "3,8", "x", "1"]));
        let out = run(&config)?;
        assert!(out.starts_with("Original array: 5 3 8 1\nSorted array: 1 3 5 8\n"));
        assert!(out.contains("Sorted 4 items in "));
        assert!(out.ends_with("Algorithm: HeapSort with insertion sort for small heaps\n"));
        Ok(())
    }

    #[test]
    fn test_file_report_for_every_engine() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("nums.txt");
        fs::write(&input, "5 3 8 1 9 2")?;

        let configs = [
            config::presets::heapsort(&input),
            config::presets::block_heapsort(&input),
            config::presets::quicksort(&input),
        ];
        for (i, config) in configs.into_iter().enumerate() {
            let target = temp_dir.path().join(format!("report_{i}.txt"));
            let out = run(&config.with_output_file(Some(target.clone())))?;
            assert_eq!(out, format!("Writing sorted output to: {}\n", target.display()));

            let report = fs::read_to_string(&target)?;
            assert!(report.contains("Original array: 5 3 8 1 9 2\n"));
            assert!(report.contains("Sorted array: 1 2 3 5 8 9\n"));
        }
        Ok(())
    }

    #[test]
    fn test_default_report_path() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("data.txt");
        fs::write(&input, "2\n1\n")?;
        let output_dir = temp_dir.path().join("output");

        let config = config::presets::heapsort(&input).with_output_dir(Some(output_dir.clone()));
        run(&config)?;

        let report = fs::read_to_string(output_dir.join("data.txt"))?;
        assert!(report.contains("Sorted array: 1 2\n"));
        Ok(())
    }

    #[test]
    fn test_failures() {
        let missing = config::presets::heapsort(PathBuf::from("/nonexistent/nums.txt"));
        let err = sort_to(&missing, &mut io::sink()).unwrap_err();
        assert!(matches!(err, SortError::InputNotFound { .. }));
        assert_eq!(err.exit_code(), EXIT_FAILURE);

        let junk = SortConfig::new().with_input(values(&["abc", "+", "1.5"]));
        let err = sort_to(&junk, &mut io::sink()).unwrap_err();
        assert!(matches!(err, SortError::EmptyCorpus { .. }));

        let conflicting = SortConfig::new()
            .with_input(values(&["1"]))
            .with_algorithm(Algorithm::Quick)
            .with_block_sort(true);
        let err = sort_to(&conflicting, &mut io::sink()).unwrap_err();
        assert!(matches!(err, SortError::ConflictingOptions { .. }));
    }

    #[test]
    fn test_strategies_load_the_same_corpus() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("mixed.txt");
        fs::write(&input, "3, 1;2\r\n\t4 abc -5 +7 99999999999 8")?;

        let two_pass = load(&config::presets::heapsort(&input))?;
        let streaming = load(&config::presets::heapsort(&input).with_read_strategy(ReadStrategy::Streaming))?;
        assert_eq!(two_pass.as_slice(), &[3, 1, 2, 4, -5, 7, 8]);
        assert_eq!(two_pass, streaming);
        Ok(())
    }
}
