//! Error handling for the sorter, generator and benchmark harness

use std::io;
use thiserror::Error;

/// Custom error type for corpus ingestion, sorting and reporting
#[derive(Error, Debug)]
pub enum SortError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Could not open input file '{file}'")]
    InputNotFound { file: String },

    #[error("No valid integers found in {source_name}")]
    EmptyCorpus { source_name: String },

    #[error("Memory allocation failed for {requested} integers")]
    AllocationFailure { requested: usize },

    #[error("Could not write output file '{file}': {reason}")]
    OutputNotWritable { file: String, reason: String },

    #[error("Conflicting options: {message}")]
    ConflictingOptions { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Trial for size {size} failed after {attempts} attempts: {last_error}")]
    TrialFailed {
        size: usize,
        attempts: u32,
        last_error: String,
    },

    #[error("Sorter exited with {status}: {stderr}")]
    SorterFailed { status: String, stderr: String },

    #[error("Malformed timing line: '{line}'")]
    MalformedTiming { line: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SortError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        // Every failure is fatal to the invocation; the harness only looks at zero/non-zero.
        crate::EXIT_FAILURE
    }

    /// Create an input not found error
    pub fn input_not_found(file: &str) -> Self {
        SortError::InputNotFound {
            file: file.to_string(),
        }
    }

    /// Create an empty corpus error
    pub fn empty_corpus(source_name: &str) -> Self {
        SortError::EmptyCorpus {
            source_name: source_name.to_string(),
        }
    }

    /// Create an allocation failure error
    pub fn allocation_failure(requested: usize) -> Self {
        SortError::AllocationFailure { requested }
    }

    /// Create an output not writable error
    pub fn output_not_writable(file: &str, reason: impl ToString) -> Self {
        SortError::OutputNotWritable {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a conflicting options error
    pub fn conflicting_options(message: &str) -> Self {
        SortError::ConflictingOptions {
            message: message.to_string(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: &str) -> Self {
        SortError::InvalidArgument {
            message: message.to_string(),
        }
    }

    pub fn trial_failed(size: usize, attempts: u32, last_error: &str) -> Self {
        SortError::TrialFailed {
            size,
            attempts,
            last_error: last_error.to_string(),
        }
    }

    pub fn sorter_failed(status: impl ToString, stderr: &str) -> Self {
        SortError::SorterFailed {
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        }
    }

    pub fn malformed_timing(line: &str) -> Self {
        SortError::MalformedTiming {
            line: line.to_string(),
        }
    }
}

/// Result type for sort operations
pub type SortResult<T> = Result<T, SortError>;

/// Context trait for turning raw I/O failures into domain errors
pub trait SortContext<T> {
    /// Failure while reading an input corpus
    fn with_file_context(self, filename: &str) -> SortResult<T>;

    /// Failure while producing a report or results file
    fn with_output_context(self, filename: &str) -> SortResult<T>;
}

impl<T> SortContext<T> for Result<T, io::Error> {
    fn with_file_context(self, filename: &str) -> SortResult<T> {
        self.map_err(|io_err| match io_err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                SortError::input_not_found(filename)
            }
            _ => SortError::Io(io::Error::new(
                io_err.kind(),
                format!("{}: {}", filename, io_err),
            )),
        })
    }

    fn with_output_context(self, filename: &str) -> SortResult<T> {
        self.map_err(|io_err| SortError::output_not_writable(filename, io_err))
    }
}

impl<T> SortContext<T> for SortResult<T> {
    fn with_file_context(self, filename: &str) -> SortResult<T> {
        self.map_err(|err| match err {
            SortError::Io(io_err) => match io_err.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    SortError::input_not_found(filename)
                }
                _ => SortError::Io(io::Error::new(
                    io_err.kind(),
                    format!("{}: {}", filename, io_err),
                )),
            },
            other => other,
        })
    }

    fn with_output_context(self, filename: &str) -> SortResult<T> {
        self.map_err(|err| match err {
            SortError::Io(io_err) => SortError::output_not_writable(filename, io_err),
            other => other,
        })
    }
}
