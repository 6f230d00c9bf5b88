//! Timing protocol: measure one sort call and render it for people or machines
//!
//! Exactly one of three outputs is produced per invocation. `--bench-time`
//! (raw seconds, nine decimals) beats `--time-only` (one human readable line),
//! which beats the default full report.

use crate::error::{SortError, SortResult};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::warn;

/// Which timing output an invocation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Seconds with exactly nine fractional digits, nothing else
    Raw,
    /// One human readable line such as `12.34 ms`
    FormattedOnly,
    /// Original and sorted arrays with timing and algorithm name
    #[default]
    FullReport,
}

impl OutputMode {
    /// Resolve the two CLI flags by priority: raw, then formatted-only, then full
    pub fn resolve(bench_time: bool, time_only: bool) -> Self {
        if bench_time {
            OutputMode::Raw
        } else if time_only {
            OutputMode::FormattedOnly
        } else {
            OutputMode::FullReport
        }
    }

    /// The single stdout line for the timing-only modes; `None` for full reports
    pub fn timing_line(&self, elapsed: ElapsedTime) -> Option<String> {
        match self {
            OutputMode::Raw => Some(elapsed.raw()),
            OutputMode::FormattedOnly => Some(elapsed.formatted()),
            OutputMode::FullReport => None,
        }
    }
}

/// Clock used to time the sort call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Monotonic wall clock
    #[default]
    Wall,
    /// CPU time consumed by this process
    Cpu,
}

impl FromStr for ClockSource {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wall" | "monotonic" => Ok(ClockSource::Wall),
            "cpu" | "process" => Ok(ClockSource::Cpu),
            _ => Err(SortError::invalid_argument(&format!("unknown clock: {s}"))),
        }
    }
}

/// Non-negative elapsed seconds around one sort call
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ElapsedTime(f64);

impl ElapsedTime {
    /// Negative, NaN and infinite inputs collapse to zero
    pub fn from_secs(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Self(secs)
        } else {
            Self(0.0)
        }
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self::from_secs(duration.as_secs_f64())
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Machine format: `^\d+\.\d{9}$`
    pub fn raw(&self) -> String {
        format!("{:.9}", self.0)
    }

    /// Human format with the unit picked by magnitude
    pub fn formatted(&self) -> String {
        let secs = self.0;
        if secs < 1e-6 {
            format!("{:.2} ns", secs * 1e9)
        } else if secs < 1e-3 {
            format!("{:.2} μs", secs * 1e6)
        } else if secs < 1.0 {
            format!("{:.2} ms", secs * 1e3)
        } else {
            format!("{:.2} s", secs)
        }
    }

    /// Parse a line produced by [`ElapsedTime::raw`], rejecting anything else
    pub fn parse_raw(line: &str) -> SortResult<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let well_formed = match line.split_once('.') {
            Some((whole, frac)) => {
                !whole.is_empty()
                    && whole.bytes().all(|b| b.is_ascii_digit())
                    && frac.len() == 9
                    && frac.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        };
        if !well_formed {
            return Err(SortError::malformed_timing(line));
        }
        line.parse::<f64>()
            .map(Self::from_secs)
            .map_err(|_| SortError::malformed_timing(line))
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// A started clock
#[derive(Debug, Clone, Copy)]
pub enum Stopwatch {
    Wall(Instant),
    Cpu(Duration),
}

impl Stopwatch {
    /// Start `clock`; falls back to the wall clock if CPU time is unavailable
    pub fn start(clock: ClockSource) -> Self {
        match clock {
            ClockSource::Wall => Stopwatch::Wall(Instant::now()),
            ClockSource::Cpu => match process_cpu_time() {
                Some(now) => Stopwatch::Cpu(now),
                None => {
                    warn!("process CPU clock unavailable, timing with the wall clock");
                    Stopwatch::Wall(Instant::now())
                }
            },
        }
    }

    pub fn elapsed(&self) -> ElapsedTime {
        match self {
            Stopwatch::Wall(start) => ElapsedTime::from_duration(start.elapsed()),
            Stopwatch::Cpu(start) => {
                let now = process_cpu_time().unwrap_or(*start);
                ElapsedTime::from_duration(now.saturating_sub(*start))
            }
        }
    }
}

/// Time exactly the work inside `f`
pub fn measure<F: FnOnce()>(clock: ClockSource, f: F) -> ElapsedTime {
    let stopwatch = Stopwatch::start(clock);
    f();
    stopwatch.elapsed()
}

#[cfg(unix)]
fn process_cpu_time() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return None;
    }
    Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

#[cfg(not(unix))]
fn process_cpu_time() -> Option<Duration> {
    None
}
