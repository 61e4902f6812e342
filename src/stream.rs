//! Incremental streaming engine: chunked input to records and back.
//!
//! The engine has two halves, both parameterized by a format's boundary
//! rule, single-record codec, and framing strings from the codec registry:
//!
//! - [`Parser`] accumulates arbitrarily-chunked bytes, locates complete
//!   record spans with the format's boundary rule, decodes them, and queues
//!   the records behind a high-water mark.
//! - [`Formatter`] renders records into chunks, emits leading/trailing
//!   framing exactly once, and queues chunks behind the same kind of mark.
//!
//! Both sides expose a two-state flow-control flag ([`Parser::is_ready`] /
//! [`Formatter::is_ready`]): once the queue reaches the high-water mark the
//! source should pause until it drains. The parser's bound is hard — bytes
//! past the mark stay undecoded in the accumulation buffer, so at most
//! `high_water_mark + 1` decoded-but-undelivered records ever exist.
//!
//! A record decodes byte-identically no matter how the input was chunked;
//! partial tails are retained across pushes and only discarded (silently)
//! when input ends with an unterminated fragment. A span that fails
//! single-record decode occupies its stream position as an error: records
//! and errors come out of [`Parser::next_record`] in exactly the order
//! their spans appeared, and decoding continues past a bad span.
//!
//! # Examples
//!
//! ```
//! use marcio::stream::Parser;
//!
//! # fn main() -> marcio::Result<()> {
//! let mut record = marcio::Record::new();
//! record.append([marcio::Field::control("001", "42")]);
//! let wire = record.as_format("iso2709")?;
//!
//! let mut parser = Parser::new("iso2709")?;
//! for byte in &wire {
//!     parser.push(std::slice::from_ref(byte));
//! }
//! parser.finish();
//!
//! let decoded = parser.next_record()?.expect("one record");
//! assert_eq!(decoded.fields[0].value(), Some("42"));
//! assert!(parser.is_done());
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;

use crate::error::{MarcError, Result};
use crate::formats::{CodecRegistry, FormatFn, Framing, ParseFn, ScanFn};
use crate::record::Record;

/// Default queue high-water mark for parsers and formatters.
pub const DEFAULT_HIGH_WATER_MARK: usize = 1000;

/// Outcome of a boundary scan over buffered input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// A complete record occupies this byte range of the buffer; bytes
    /// before `end` are consumed once the span is decoded.
    Complete(Range<usize>),
    /// No complete record buffered yet. Bytes before `keep_from` can never
    /// belong to one and may be discarded; the retained tail begins there.
    Partial {
        /// First byte index worth keeping for the next scan.
        keep_from: usize,
    },
}

/// Incremental decoder: arbitrarily-chunked bytes in, records out.
#[derive(Debug)]
pub struct Parser {
    scan: ScanFn,
    parse: ParseFn,
    buf: Vec<u8>,
    queue: VecDeque<Result<Record>>,
    high_water_mark: usize,
    input_done: bool,
    records_parsed: usize,
}

impl Parser {
    /// Create a parser for a format selector with the default high-water
    /// mark.
    ///
    /// # Errors
    ///
    /// Returns an unknown-format error for unrecognized selectors and for
    /// write-only formats (`text`, `json`) that have no parser.
    pub fn new(format: &str) -> Result<Self> {
        Self::with_high_water_mark(format, DEFAULT_HIGH_WATER_MARK)
    }

    /// Create a parser with an explicit queue high-water mark.
    ///
    /// # Errors
    ///
    /// Same conditions as [`new`](Self::new).
    pub fn with_high_water_mark(format: &str, high_water_mark: usize) -> Result<Self> {
        let registry = CodecRegistry::new();
        let codec = registry.get(format)?;
        match (codec.scan, codec.parse) {
            (Some(scan), Some(parse)) => Ok(Parser {
                scan,
                parse,
                buf: Vec::new(),
                queue: VecDeque::new(),
                high_water_mark,
                input_done: false,
                records_parsed: 0,
            }),
            _ => Err(MarcError::UnknownFormat(format.to_string())),
        }
    }

    /// Feed one input chunk, decoding any records it completes.
    ///
    /// Chunks may split records anywhere; the undecoded tail is retained
    /// and the next chunk continues it. Decoding stops at the high-water
    /// mark, so excess bytes simply stay buffered until the queue drains.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        self.fill_queue();
    }

    /// Signal end of input.
    ///
    /// Any unterminated trailing fragment still buffered is silently
    /// discarded once the remaining complete records have been drained.
    pub fn finish(&mut self) {
        self.input_done = true;
    }

    /// Dequeue the next decoded record, decoding more buffered input as
    /// the queue drains.
    ///
    /// Returns `Ok(None)` when nothing is currently available; after
    /// [`finish`](Self::finish) that means the stream is exhausted.
    ///
    /// # Errors
    ///
    /// A span that failed single-record decode surfaces here, in its
    /// stream position. The bad span was already consumed: records before
    /// it were delivered first and records after it follow on subsequent
    /// calls.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if self.queue.is_empty() {
            self.fill_queue();
        }
        self.queue.pop_front().transpose()
    }

    /// Whether the parser can usefully accept more input right now.
    ///
    /// False once the record queue has reached the high-water mark; pushes
    /// are still accepted but only buffer bytes. Sources honoring this flag
    /// keep the parser's memory bounded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.queue.len() < self.high_water_mark
    }

    /// Whether input has ended and every decodable record was delivered.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.input_done
            && self.queue.is_empty()
            && matches!((self.scan)(&self.buf), Scan::Partial { .. })
    }

    /// Number of decoded-but-undelivered results.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Total records successfully decoded so far.
    #[must_use]
    pub fn records_parsed(&self) -> usize {
        self.records_parsed
    }

    /// Decode complete spans from the buffer until the queue passes the
    /// high-water mark or no complete span remains.
    fn fill_queue(&mut self) {
        while self.queue.len() <= self.high_water_mark {
            match (self.scan)(&self.buf) {
                Scan::Complete(span) => {
                    let end = span.end;
                    let decoded = (self.parse)(&self.buf[span]);
                    self.buf.drain(..end);
                    if decoded.is_ok() {
                        self.records_parsed += 1;
                    }
                    self.queue.push_back(decoded);
                }
                Scan::Partial { keep_from } => {
                    if self.input_done {
                        // Trailing partial input, silently discarded.
                        self.buf.clear();
                    } else if keep_from > 0 {
                        self.buf.drain(..keep_from);
                    }
                    break;
                }
            }
        }
    }
}

/// Incremental encoder: records in, framed output chunks out.
#[derive(Debug)]
pub struct Formatter {
    format: FormatFn,
    framing: Framing,
    queue: VecDeque<Vec<u8>>,
    high_water_mark: usize,
    records_formatted: usize,
    finished: bool,
}

impl Formatter {
    /// Create a formatter for a format selector with the default high-water
    /// mark.
    ///
    /// # Errors
    ///
    /// Returns an unknown-format error for unrecognized selectors.
    pub fn new(format: &str) -> Result<Self> {
        Self::with_high_water_mark(format, DEFAULT_HIGH_WATER_MARK)
    }

    /// Create a formatter with an explicit queue high-water mark.
    ///
    /// # Errors
    ///
    /// Same conditions as [`new`](Self::new).
    pub fn with_high_water_mark(format: &str, high_water_mark: usize) -> Result<Self> {
        let registry = CodecRegistry::new();
        let codec = registry.get(format)?;
        match codec.format {
            Some(render) => Ok(Formatter {
                format: render,
                framing: codec.framing,
                queue: VecDeque::new(),
                high_water_mark,
                records_formatted: 0,
                finished: false,
            }),
            None => Err(MarcError::UnknownFormat(format.to_string())),
        }
    }

    /// Render one record and queue its output chunk.
    ///
    /// The first record's chunk is preceded by the format's opening framing
    /// (collection wrapper, array bracket); later chunks by the separator.
    /// Writers should check [`is_ready`](Self::is_ready) between pushes to
    /// keep the chunk queue at or below `high_water_mark + 1`.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be rendered, or if the formatter is
    /// already finished.
    pub fn push(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::InvalidRecord(
                "formatter already finished".to_string(),
            ));
        }
        let lead = if self.records_formatted == 0 {
            self.framing.open
        } else {
            self.framing.separator
        };
        let rendered = (self.format)(record)?;
        let mut chunk = Vec::with_capacity(lead.len() + rendered.len() + self.framing.suffix.len());
        chunk.extend_from_slice(lead.as_bytes());
        chunk.extend_from_slice(&rendered);
        chunk.extend_from_slice(self.framing.suffix.as_bytes());
        self.queue.push_back(chunk);
        self.records_formatted += 1;
        Ok(())
    }

    /// Signal end of input, queueing the closing framing.
    ///
    /// With no records pushed, the opening framing is still emitted so the
    /// output is well-formed (an empty collection or array). Idempotent.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let mut tail = Vec::new();
        if self.records_formatted == 0 {
            tail.extend_from_slice(self.framing.open.as_bytes());
        }
        tail.extend_from_slice(self.framing.close.as_bytes());
        if !tail.is_empty() {
            self.queue.push_back(tail);
        }
    }

    /// Dequeue the next rendered chunk.
    pub fn next_chunk(&mut self) -> Option<Vec<u8>> {
        self.queue.pop_front()
    }

    /// Whether the formatter can accept more records without exceeding its
    /// queue bound.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.queue.len() < self.high_water_mark
    }

    /// Whether input has ended and every chunk (closing framing included)
    /// was drained.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.finished && self.queue.is_empty()
    }

    /// Total records rendered so far.
    #[must_use]
    pub fn records_formatted(&self) -> usize {
        self.records_formatted
    }
}

/// A pass-through stage that applies a caller-supplied mutation to each
/// record flowing through it.
///
/// # Examples
///
/// ```
/// use marcio::{Field, Record, stream::Transform};
///
/// let mut stage = Transform::new(|record: &mut Record| {
///     record.append([Field::control("005", "20260822120000.0")]);
/// });
///
/// let mut record = Record::new();
/// stage.apply(&mut record);
/// assert_eq!(record.fields.len(), 1);
/// ```
pub struct Transform<F>
where
    F: FnMut(&mut Record),
{
    op: F,
}

impl<F> Transform<F>
where
    F: FnMut(&mut Record),
{
    /// Wrap a mutation closure as a pipeline stage.
    pub fn new(op: F) -> Self {
        Transform { op }
    }

    /// Apply the mutation to one record.
    pub fn apply(&mut self, record: &mut Record) {
        (self.op)(record);
    }
}

impl<F> fmt::Debug for Transform<F>
where
    F: FnMut(&mut Record),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").finish_non_exhaustive()
    }
}
