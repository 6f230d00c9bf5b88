//! Corpus ingestion: loosely delimited text in, aligned integers out
//!
//! Two strategies produce identical results. [`ReadStrategy::TwoPass`] maps the
//! file, counts valid tokens, allocates exactly once and fills.
//! [`ReadStrategy::Streaming`] reads in fixed chunks, grows the corpus by
//! doubling and trims the slack at the end. Tokens that are not integers are
//! dropped without error in both.

use crate::corpus::Corpus;
use crate::error::{SortContext, SortError, SortResult};
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Read buffer size for the streaming strategy
const STREAM_CHUNK: usize = 64 * 1024;

/// How a corpus file is ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Count, allocate exactly, fill
    #[default]
    TwoPass,
    /// One pass over a buffered stream with a growable buffer
    Streaming,
}

impl FromStr for ReadStrategy {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "two-pass" | "twopass" | "mmap" => Ok(ReadStrategy::TwoPass),
            "streaming" | "stream" => Ok(ReadStrategy::Streaming),
            _ => Err(SortError::invalid_argument(&format!(
                "unknown read strategy: {s}"
            ))),
        }
    }
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadStrategy::TwoPass => "two-pass",
            ReadStrategy::Streaming => "streaming",
        };
        write!(f, "{name}")
    }
}

/// Separators accepted between integers. Carriage return is included so CRLF
/// files read the same as LF files.
#[inline]
pub fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b',' | b';')
}

/// Parse one token as an optionally signed decimal `i32`.
///
/// Returns `None` for anything else: empty tokens, a bare sign, stray
/// characters, or values outside the `i32` range.
pub fn parse_token(bytes: &[u8]) -> Option<i32> {
    let (negative, digits) = match bytes.first()? {
        b'-' => (true, &bytes[1..]),
        b'+' => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    if digits.is_empty() {
        return None;
    }

    let mut result: i64 = 0;
    for &byte in digits {
        if !byte.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?;
        result = result.checked_add((byte - b'0') as i64)?;
    }

    if negative {
        result = -result;
    }

    i32::try_from(result).ok()
}

/// Non-empty delimiter-separated tokens of `data`
pub fn tokens(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(|&b| is_delimiter(b)).filter(|t| !t.is_empty())
}

/// Number of tokens in `data` that parse as integers
pub fn count_valid(data: &[u8]) -> usize {
    tokens(data).filter(|t| parse_token(t).is_some()).count()
}

/// Token bookkeeping reported through the logger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub tokens: usize,
    pub dropped: usize,
}

impl ReadStats {
    fn record(&mut self, accepted: bool) {
        self.tokens += 1;
        if !accepted {
            self.dropped += 1;
        }
    }
}

/// Integer corpus reader
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusReader {
    strategy: ReadStrategy,
}

impl CorpusReader {
    pub fn new(strategy: ReadStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ReadStrategy {
        self.strategy
    }

    /// Read every valid integer from the file at `path`
    pub fn read_path(&self, path: &Path) -> SortResult<Corpus> {
        let name = path.display().to_string();
        let file = File::open(path).with_file_context(&name)?;
        let metadata = file.metadata().with_file_context(&name)?;
        if metadata.is_dir() {
            return Err(SortError::input_not_found(&name));
        }

        match self.strategy {
            ReadStrategy::TwoPass => {
                // Zero-length files cannot be mapped on every platform.
                if metadata.len() == 0 {
                    return Err(SortError::empty_corpus(&name));
                }
                // SAFETY: the mapping is read-only and dropped before this function
                // returns; the corpus copies every value out of it.
                let mmap = unsafe { Mmap::map(&file) }.with_file_context(&name)?;
                self.read_bytes(&mmap, &name)
            }
            ReadStrategy::Streaming => self.read_stream(file, &name),
        }
    }

    /// Ingest in-memory text using the configured strategy
    pub fn read_text(&self, text: &str, source_name: &str) -> SortResult<Corpus> {
        match self.strategy {
            ReadStrategy::TwoPass => self.read_bytes(text.as_bytes(), source_name),
            ReadStrategy::Streaming => self.read_stream(text.as_bytes(), source_name),
        }
    }

    /// Integers given directly as command-line values
    pub fn read_values(&self, values: &[String]) -> SortResult<Corpus> {
        self.read_text(&values.join(" "), "command-line arguments")
    }

    /// Two-pass ingestion over a complete buffer
    pub fn read_bytes(&self, data: &[u8], source_name: &str) -> SortResult<Corpus> {
        let count = count_valid(data);
        if count == 0 {
            return Err(SortError::empty_corpus(source_name));
        }

        let mut corpus = Corpus::with_capacity(count)?;
        for value in tokens(data).filter_map(parse_token) {
            corpus.push(value)?;
        }

        debug!(
            source = source_name,
            strategy = %ReadStrategy::TwoPass,
            values = corpus.len(),
            "corpus ingested"
        );
        Ok(corpus)
    }

    /// Single-pass ingestion over any byte stream.
    ///
    /// A token cut by a chunk boundary is carried over and completed by the next
    /// chunk. Whatever is left at end of input is parsed once; if it is not an
    /// integer it is dropped like any other malformed token.
    pub fn read_stream<R: Read>(&self, reader: R, source_name: &str) -> SortResult<Corpus> {
        let mut reader = BufReader::with_capacity(STREAM_CHUNK, reader);
        let mut corpus = Corpus::new();
        let mut stats = ReadStats::default();
        let mut pending: Vec<u8> = Vec::new();

        loop {
            let chunk = reader.fill_buf().with_file_context(source_name)?;
            if chunk.is_empty() {
                break;
            }
            let consumed = chunk.len();

            let mut start = 0;
            for (i, &byte) in chunk.iter().enumerate() {
                if !is_delimiter(byte) {
                    continue;
                }
                if pending.is_empty() {
                    accept(&mut corpus, &mut stats, &chunk[start..i])?;
                } else {
                    pending.extend_from_slice(&chunk[start..i]);
                    accept(&mut corpus, &mut stats, &pending)?;
                    pending.clear();
                }
                start = i + 1;
            }
            pending.extend_from_slice(&chunk[start..]);

            reader.consume(consumed);
        }

        accept(&mut corpus, &mut stats, &pending)?;

        if corpus.is_empty() {
            return Err(SortError::empty_corpus(source_name));
        }
        corpus.shrink_to_fit();

        debug!(
            source = source_name,
            strategy = %ReadStrategy::Streaming,
            values = corpus.len(),
            tokens = stats.tokens,
            dropped = stats.dropped,
            "corpus ingested"
        );
        Ok(corpus)
    }
}

fn accept(corpus: &mut Corpus, stats: &mut ReadStats, token: &[u8]) -> SortResult<()> {
    if token.is_empty() {
        return Ok(());
    }
    match parse_token(token) {
        Some(value) => {
            stats.record(true);
            corpus.push(value)
        }
        None => {
            stats.record(false);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    /// Hands out the input a few bytes at a time to force tokens across chunk edges
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn both(text: &str) -> (Vec<i32>, Vec<i32>) {
        let two_pass = CorpusReader::new(ReadStrategy::TwoPass)
            .read_text(text, "test")
            .expect("two-pass read failed");
        let streaming = CorpusReader::new(ReadStrategy::Streaming)
            .read_text(text, "test")
            .expect("streaming read failed");
        (two_pass.to_vec(), streaming.to_vec())
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token(b"123"), Some(123));
        assert_eq!(parse_token(b"-456"), Some(-456));
        assert_eq!(parse_token(b"+789"), Some(789));
        assert_eq!(parse_token(b"0"), Some(0));
        assert_eq!(parse_token(b"007"), Some(7));
        assert_eq!(parse_token(b"-2147483648"), Some(i32::MIN));
        assert_eq!(parse_token(b"2147483647"), Some(i32::MAX));
        assert_eq!(parse_token(b"2147483648"), None);
        assert_eq!(parse_token(b"99999999999999999999999"), None);
        assert_eq!(parse_token(b""), None);
        assert_eq!(parse_token(b"+"), None);
        assert_eq!(parse_token(b"-"), None);
        assert_eq!(parse_token(b"12.34"), None);
        assert_eq!(parse_token(b"abc"), None);
        assert_eq!(parse_token(b"1-2"), None);
    }

    #[test]
    fn test_mixed_delimiters() {
        let (two_pass, streaming) = both("3, 1;2\n\t4");
        assert_eq!(two_pass, vec![3, 1, 2, 4]);
        assert_eq!(streaming, two_pass);
    }

    #[test]
    fn test_malformed_tokens_dropped() {
        let (two_pass, streaming) = both("3 abc -5 +7");
        assert_eq!(two_pass, vec![3, -5, 7]);
        assert_eq!(streaming, two_pass);
    }

    #[test]
    fn test_crlf_input() {
        let (two_pass, streaming) = both("10\r\n20\r\n-30\r\n");
        assert_eq!(two_pass, vec![10, 20, -30]);
        assert_eq!(streaming, two_pass);
    }

    #[test]
    fn test_empty_corpus() {
        for strategy in [ReadStrategy::TwoPass, ReadStrategy::Streaming] {
            let reader = CorpusReader::new(strategy);
            for text in ["", "  \n\t", "abc; x1 ,-"] {
                let err = reader.read_text(text, "blank").unwrap_err();
                assert!(matches!(err, SortError::EmptyCorpus { .. }), "{strategy}: {text:?}");
            }
        }
    }

    #[test]
    fn test_tokens_split_across_chunks() {
        let text = "12345 -678;9001,+42 junk 77 -1";
        let expected = vec![12345, -678, 9001, 42, 77, -1];
        let reader = CorpusReader::new(ReadStrategy::Streaming);
        for step in 1..8 {
            let corpus = reader
                .read_stream(Trickle { data: text.as_bytes(), step }, "trickle")
                .expect("streaming read failed");
            assert_eq!(corpus.to_vec(), expected, "step {step}");
        }
    }

    #[test]
    fn test_trailing_fragment_dropped() {
        let (two_pass, streaming) = both("1 2 3 4x");
        assert_eq!(two_pass, vec![1, 2, 3]);
        assert_eq!(streaming, two_pass);
    }

    #[test]
    fn test_streaming_trims_capacity() {
        let text = (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let corpus = CorpusReader::new(ReadStrategy::Streaming)
            .read_text(&text, "hundred")
            .expect("streaming read failed");
        assert_eq!(corpus.len(), 100);
        assert!(corpus.capacity() < 100 + crate::cache::INTS_PER_LINE);
    }

    #[test]
    fn test_read_path_both_strategies() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let input_file = temp_dir.path().join("input.txt");
        fs::write(&input_file, "5 3 8\n1, 9; 2\n")?;

        for strategy in [ReadStrategy::TwoPass, ReadStrategy::Streaming] {
            let corpus = CorpusReader::new(strategy).read_path(&input_file)?;
            assert_eq!(corpus.as_slice(), &[5, 3, 8, 1, 9, 2]);
            assert!(corpus.is_line_aligned());
        }
        Ok(())
    }

    #[test]
    fn test_missing_and_empty_files() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let missing = temp_dir.path().join("nope.txt");
        let empty = temp_dir.path().join("empty.txt");
        fs::write(&empty, "")?;

        for strategy in [ReadStrategy::TwoPass, ReadStrategy::Streaming] {
            let reader = CorpusReader::new(strategy);
            assert!(matches!(
                reader.read_path(&missing),
                Err(SortError::InputNotFound { .. })
            ));
            assert!(matches!(
                reader.read_path(&empty),
                Err(SortError::EmptyCorpus { .. })
            ));
            assert!(matches!(
                reader.read_path(temp_dir.path()),
                Err(SortError::InputNotFound { .. })
            ));
        }
        Ok(())
    }

    #[test]
    fn test_read_values() {
        let args = vec!["4".to_string(), "2,9".to_string(), "oops".to_string()];
        let corpus = CorpusReader::default().read_values(&args).expect("read failed");
        assert_eq!(corpus.as_slice(), &[4, 2, 9]);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("streaming".parse::<ReadStrategy>().ok(), Some(ReadStrategy::Streaming));
        assert_eq!("two-pass".parse::<ReadStrategy>().ok(), Some(ReadStrategy::TwoPass));
        assert!("bogus".parse::<ReadStrategy>().is_err());
    }
}
