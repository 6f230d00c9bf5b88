//! Benchmark harness: run the sorter as a subprocess over a range of corpus
//! sizes and collect average raw timings into a CSV file.
//!
//! Each trial is an independent process invoked with `--bench-time`, so the
//! only thing the harness trusts is the single raw timing line on stdout.
//! Trials that fail to spawn, exit non-zero or print anything else are
//! retried up to [`BenchmarkPlan::max_attempts`] times.

use crate::config::{presets, Algorithm, InputSource, SortConfig};
use crate::error::{SortContext, SortError, SortResult};
use crate::generate::{generate_values, series_sizes, write_corpus};
use crate::timing::{ElapsedTime, OutputMode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Attempts per trial before the whole benchmark gives up
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Value range of generated benchmark corpora
pub const CORPUS_MIN: i32 = 1;
pub const CORPUS_MAX: i32 = 1000;

/// CSV header of the results file
pub const CSV_HEADER: [&str; 4] = ["Size", "Time (s)", "Time (ms)", "Formatted Time"];

/// Everything needed to benchmark one engine over a size range
#[derive(Debug, Clone)]
pub struct BenchmarkPlan {
    /// Sorter executable to spawn
    pub sorter: PathBuf,
    pub algorithm: Algorithm,
    pub block_sort: bool,
    pub min_size: usize,
    pub max_size: usize,
    pub step: usize,
    /// Trials averaged per size
    pub repeats: usize,
    pub max_attempts: u32,
    /// Where corpora are generated; a temporary directory when unset
    pub work_dir: Option<PathBuf>,
    pub results_dir: PathBuf,
    /// Seed for reproducible corpora
    pub seed: Option<u64>,
}

impl Default for BenchmarkPlan {
    fn default() -> Self {
        Self {
            sorter: PathBuf::from("intsort"),
            algorithm: Algorithm::Heap,
            block_sort: false,
            min_size: 1000,
            max_size: 100_000,
            step: 10_000,
            repeats: 3,
            max_attempts: DEFAULT_ATTEMPTS,
            work_dir: None,
            results_dir: PathBuf::from("benchmark_results"),
            seed: None,
        }
    }
}

impl BenchmarkPlan {
    pub fn validate(&self) -> SortResult<()> {
        if self.repeats == 0 {
            return Err(SortError::invalid_argument("repeats must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(SortError::invalid_argument("attempts must be positive"));
        }
        if self.block_sort && self.algorithm != Algorithm::Heap {
            return Err(SortError::conflicting_options(
                "--block-sort is only available with the heap algorithm",
            ));
        }
        series_sizes(self.min_size, self.max_size, self.step).map(|_| ())
    }

    pub fn sizes(&self) -> SortResult<Vec<usize>> {
        series_sizes(self.min_size, self.max_size, self.step)
    }

    /// Label used in the results file name, e.g. `heapsort` or `heapsort_block`
    pub fn label(&self) -> String {
        if self.block_sort {
            format!("{}_block", self.algorithm)
        } else {
            self.algorithm.to_string()
        }
    }

    /// `<results_dir>/<label>_benchmark_<min>_<max>.csv`
    pub fn results_path(&self) -> PathBuf {
        self.results_dir.join(format!(
            "{}_benchmark_{}_{}.csv",
            self.label(),
            self.min_size,
            self.max_size
        ))
    }

    /// Sorter configuration for one trial over `corpus`
    pub fn trial_config(&self, corpus: &Path) -> SortConfig {
        presets::bench_trial(self.algorithm, corpus).with_block_sort(self.block_sort)
    }
}

/// Average timing for one corpus size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkRow {
    pub size: usize,
    pub elapsed: ElapsedTime,
}

impl BenchmarkRow {
    fn record(&self) -> [String; 4] {
        let secs = self.elapsed.as_secs();
        [
            self.size.to_string(),
            format!("{secs:.6}"),
            format!("{:.6}", secs * 1e3),
            self.elapsed.formatted(),
        ]
    }
}

/// Command-line arguments that make the sorter run `config`
pub fn trial_args(config: &SortConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    match config.output_mode {
        OutputMode::Raw => args.push("--bench-time".into()),
        OutputMode::FormattedOnly => args.push("--time-only".into()),
        OutputMode::FullReport => {}
    }
    args.push("-a".into());
    args.push(config.algorithm.to_string().into());
    if config.block_sort {
        args.push("--block-sort".into());
    }
    match &config.input {
        InputSource::File(path) => {
            args.push("-f".into());
            args.push(path.clone().into_os_string());
        }
        InputSource::Values(values) => args.extend(values.iter().map(OsString::from)),
    }
    args
}

/// Runs a single timed trial over a corpus file
pub trait TrialRunner {
    fn run_trial(&mut self, config: &SortConfig) -> SortResult<ElapsedTime>;
}

/// Spawns the sorter executable for every trial
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    sorter: PathBuf,
}

impl SubprocessRunner {
    pub fn new(sorter: impl Into<PathBuf>) -> Self {
        Self {
            sorter: sorter.into(),
        }
    }
}

impl TrialRunner for SubprocessRunner {
    fn run_trial(&mut self, config: &SortConfig) -> SortResult<ElapsedTime> {
        let output = Command::new(&self.sorter)
            .args(trial_args(config))
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(SortError::sorter_failed(
                output.status,
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();
        match (lines.next(), lines.next()) {
            (Some(line), None) => ElapsedTime::parse_raw(line),
            _ => Err(SortError::malformed_timing(stdout.trim_end())),
        }
    }
}

/// Run one trial, retrying failures up to `max_attempts` times in total
pub fn run_with_retry<R: TrialRunner>(
    runner: &mut R,
    config: &SortConfig,
    size: usize,
    max_attempts: u32,
) -> SortResult<ElapsedTime> {
    let mut last_error = String::from("no attempts made");
    for attempt in 1..=max_attempts {
        match runner.run_trial(config) {
            Ok(elapsed) => {
                debug!(size, attempt, elapsed = %elapsed, "trial finished");
                return Ok(elapsed);
            }
            Err(e) => {
                warn!(size, attempt, max_attempts, error = %e, "trial failed");
                last_error = e.to_string();
            }
        }
    }
    Err(SortError::trial_failed(size, max_attempts, &last_error))
}

/// Benchmark every size of `plan` and return the per-size averages
pub fn run_benchmark<R: TrialRunner>(
    plan: &BenchmarkPlan,
    runner: &mut R,
) -> SortResult<Vec<BenchmarkRow>> {
    plan.validate()?;
    let sizes = plan.sizes()?;

    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Keep the temporary directory alive until every trial has run.
    let (_scratch, work_dir) = match &plan.work_dir {
        Some(dir) => (None, dir.clone()),
        None => {
            let scratch = TempDir::new()?;
            let dir = scratch.path().to_path_buf();
            (Some(scratch), dir)
        }
    };

    info!(
        algorithm = %plan.label(),
        sizes = sizes.len(),
        repeats = plan.repeats,
        "starting benchmark"
    );

    let mut rows = Vec::with_capacity(sizes.len());
    for size in sizes {
        let values = generate_values(size, CORPUS_MIN, CORPUS_MAX, &mut rng)?;
        let corpus = write_corpus(&work_dir, &values)?;
        let config = plan.trial_config(&corpus);

        let mut total = 0.0;
        for _ in 0..plan.repeats {
            total += run_with_retry(runner, &config, size, plan.max_attempts)?.as_secs();
        }
        let row = BenchmarkRow {
            size,
            elapsed: ElapsedTime::from_secs(total / plan.repeats as f64),
        };
        info!(size, average = %row.elapsed, "size benchmarked");
        rows.push(row);

        if let Err(e) = fs::remove_file(&corpus) {
            debug!(path = %corpus.display(), error = %e, "could not remove corpus");
        }
    }
    Ok(rows)
}

/// Write `rows` as CSV to `path`, creating its directory if needed
pub fn write_csv(rows: &[BenchmarkRow], path: &Path) -> SortResult<()> {
    let name = path.display().to_string();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_output_context(&name)?;
    }

    let file = File::create(path).with_output_context(&name)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer.flush().with_output_context(&name)?;
    info!(path = %name, rows = rows.len(), "results written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::CorpusReader;
    use std::collections::VecDeque;

    /// Replays scripted outcomes and counts calls
    struct ScriptedRunner {
        outcomes: VecDeque<SortResult<ElapsedTime>>,
        calls: usize,
    }

    impl ScriptedRunner {
        fn new(outcomes: Vec<SortResult<ElapsedTime>>) -> Self {
            Self {
                outcomes: outcomes.into(),
                calls: 0,
            }
        }
    }

    impl TrialRunner for ScriptedRunner {
        fn run_trial(&mut self, _config: &SortConfig) -> SortResult<ElapsedTime> {
            self.calls += 1;
            self.outcomes
                .pop_front()
                .unwrap_or_else(|| Ok(ElapsedTime::from_secs(0.001)))
        }
    }

    /// Sorts the corpus in-process and reports its length as the timing
    struct CountingRunner;

    impl TrialRunner for CountingRunner {
        fn run_trial(&mut self, config: &SortConfig) -> SortResult<ElapsedTime> {
            let InputSource::File(path) = &config.input else {
                return Err(SortError::invalid_argument("expected file input"));
            };
            let corpus = CorpusReader::default().read_path(path)?;
            Ok(ElapsedTime::from_secs(corpus.len() as f64))
        }
    }

    fn small_plan(dir: &Path) -> BenchmarkPlan {
        BenchmarkPlan {
            min_size: 10,
            max_size: 30,
            step: 10,
            repeats: 2,
            work_dir: Some(dir.join("corpora")),
            results_dir: dir.join("results"),
            seed: Some(7),
            ..BenchmarkPlan::default()
        }
    }

    #[test]
    fn test_retry_recovers() -> SortResult<()> {
        let mut runner = ScriptedRunner::new(vec![
            Err(SortError::malformed_timing("garbage")),
            Err(SortError::sorter_failed("exit status: 1", "boom")),
            Ok(ElapsedTime::from_secs(0.25)),
        ]);
        let config = presets::bench_trial(Algorithm::Heap, "x.txt");
        let elapsed = run_with_retry(&mut runner, &config, 100, 3)?;
        assert_eq!(elapsed.as_secs(), 0.25);
        assert_eq!(runner.calls, 3);
        Ok(())
    }

    #[test]
    fn test_retry_gives_up() {
        let mut runner = ScriptedRunner::new(
            (0..5).map(|_| Err(SortError::malformed_timing("nope"))).collect(),
        );
        let config = presets::bench_trial(Algorithm::Quick, "x.txt");
        let err = run_with_retry(&mut runner, &config, 42, 2).unwrap_err();
        assert!(matches!(err, SortError::TrialFailed { size: 42, attempts: 2, .. }));
        assert!(err.to_string().contains("nope"));
        assert_eq!(runner.calls, 2);
    }

    #[test]
    fn test_missing_sorter_is_retried() {
        let mut runner = SubprocessRunner::new("/nonexistent/intsort-sorter");
        let config = presets::bench_trial(Algorithm::Heap, "x.txt");
        let err = run_with_retry(&mut runner, &config, 1, 2).unwrap_err();
        assert!(matches!(err, SortError::TrialFailed { attempts: 2, .. }));
    }

    #[test]
    fn test_trial_args() {
        let plan = BenchmarkPlan {
            block_sort: true,
            ..BenchmarkPlan::default()
        };
        let args = trial_args(&plan.trial_config(Path::new("in/c.txt")));
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            ["--bench-time", "-a", "heapsort", "--block-sort", "-f", "in/c.txt"]
        );
    }

    #[test]
    fn test_plan_validation() {
        assert!(BenchmarkPlan::default().validate().is_ok());

        let bad = [
            BenchmarkPlan { repeats: 0, ..BenchmarkPlan::default() },
            BenchmarkPlan { max_attempts: 0, ..BenchmarkPlan::default() },
            BenchmarkPlan { min_size: 0, ..BenchmarkPlan::default() },
            BenchmarkPlan { min_size: 10, max_size: 5, ..BenchmarkPlan::default() },
            BenchmarkPlan {
                algorithm: Algorithm::Quick,
                block_sort: true,
                ..BenchmarkPlan::default()
            },
        ];
        for plan in bad {
            assert!(plan.validate().is_err(), "{plan:?}");
        }
    }

    #[test]
    fn test_results_path() {
        let plan = BenchmarkPlan {
            min_size: 1000,
            max_size: 5000,
            ..BenchmarkPlan::default()
        };
        assert_eq!(
            plan.results_path(),
            Path::new("benchmark_results").join("heapsort_benchmark_1000_5000.csv")
        );
        let blocked = BenchmarkPlan { block_sort: true, ..plan };
        assert!(blocked
            .results_path()
            .ends_with("heapsort_block_benchmark_1000_5000.csv"));
    }

    #[test]
    fn test_run_benchmark_averages_per_size() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let plan = small_plan(temp_dir.path());

        let rows = run_benchmark(&plan, &mut CountingRunner)?;
        let sizes: Vec<usize> = rows.iter().map(|r| r.size).collect();
        assert_eq!(sizes, vec![10, 20, 30]);
        for row in &rows {
            assert_eq!(row.elapsed.as_secs(), row.size as f64);
        }
        // Corpora are cleaned up after their trials.
        assert_eq!(fs::read_dir(temp_dir.path().join("corpora"))?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_run_benchmark_stops_on_exhausted_trial() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let plan = BenchmarkPlan {
            max_attempts: 1,
            ..small_plan(temp_dir.path())
        };
        let mut runner = ScriptedRunner::new(vec![
            Ok(ElapsedTime::from_secs(0.1)),
            Err(SortError::malformed_timing("")),
        ]);
        let err = run_benchmark(&plan, &mut runner).unwrap_err();
        assert!(matches!(err, SortError::TrialFailed { size: 10, .. }));
        Ok(())
    }

    #[test]
    fn test_write_csv() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("results").join("quicksort_benchmark_1_2.csv");
        let rows = [
            BenchmarkRow { size: 1, elapsed: ElapsedTime::from_secs(0.0005) },
            BenchmarkRow { size: 2, elapsed: ElapsedTime::from_secs(1.5) },
        ];

        write_csv(&rows, &path)?;

        let text = fs::read_to_string(&path)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Size,Time (s),Time (ms),Formatted Time");
        assert_eq!(lines[1], "1,0.000500,0.500000,500.00 μs");
        assert_eq!(lines[2], "2,1.500000,1500.000000,1.50 s");
        Ok(())
    }
}
