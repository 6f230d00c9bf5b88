//! Opt-in structured logging for the binaries
//!
//! Library code only emits `tracing` events. A binary decides whether anything
//! listens: it builds a subscriber from `-v` flags or `INTSORT_LOG` and runs its
//! work inside [`with_logging`], which installs the subscriber for that scope
//! only. Output goes to stderr so stdout stays reserved for sort results.

use crate::error::{SortError, SortResult};
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string
pub const LOG_ENV: &str = "INTSORT_LOG";

/// Filter for the given verbosity, or `None` when logging stays off.
///
/// A non-empty `env_spec` overrides the verbosity flags.
pub fn filter_for(env_spec: Option<&str>, verbose: u8, binary: &str) -> SortResult<Option<EnvFilter>> {
    if let Some(spec) = env_spec.map(str::trim).filter(|s| !s.is_empty()) {
        return EnvFilter::try_new(spec)
            .map(Some)
            .map_err(|e| SortError::invalid_argument(&format!("{LOG_ENV}: {e}")));
    }

    let level = match verbose {
        0 => return Ok(None),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    Ok(Some(EnvFilter::new(format!("intsort={level},{binary}={level}"))))
}

/// Build a stderr subscriber, or `None` when logging is not requested
pub fn dispatch(verbose: u8, binary: &str) -> SortResult<Option<Dispatch>> {
    let env_spec = std::env::var(LOG_ENV).ok();
    let Some(filter) = filter_for(env_spec.as_deref(), verbose, binary)? else {
        return Ok(None);
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    Ok(Some(Dispatch::new(subscriber)))
}

/// Run `f` with `dispatch` as the active subscriber, if there is one
pub fn with_logging<T>(dispatch: Option<&Dispatch>, f: impl FnOnce() -> T) -> T {
    match dispatch {
        Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
        None => f(),
    }
}
