//! Reading MARC records from byte sources.
//!
//! [`MarcReader`] wraps any [`std::io::Read`] source and a format's
//! streaming parser, yielding one decoded [`Record`] at a time. The format
//! must be one of the parseable selectors (`iso2709`, `marcxml`, `mij`).
//!
//! # Examples
//!
//! Reading records from a file:
//!
//! ```no_run
//! use marcio::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file, "iso2709")?;
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{record}");
//! }
//! # Ok::<(), marcio::MarcError>(())
//! ```
//!
//! Reading from a buffer:
//!
//! ```
//! use marcio::MarcReader;
//! use std::io::Cursor;
//!
//! let cursor = Cursor::new(Vec::new());
//! let mut reader = MarcReader::new(cursor, "marcxml")?;
//! assert!(reader.read_record()?.is_none());
//! # Ok::<(), marcio::MarcError>(())
//! ```

use std::io::{ErrorKind, Read};

use crate::error::Result;
use crate::record::Record;
use crate::stream::Parser;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Streaming reader decoding records from any [`Read`] source.
///
/// Chunks are pulled from the source on demand and fed through the
/// format's incremental parser, so arbitrarily large inputs are handled
/// without buffering more than one queue of records.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    source: R,
    parser: Parser,
    eof: bool,
}

impl<R: Read> MarcReader<R> {
    /// Create a reader for a parseable format selector.
    ///
    /// # Errors
    ///
    /// Returns an unknown-format error for unrecognized selectors and for
    /// the write-only `text` and `json` formats.
    pub fn new(source: R, format: &str) -> Result<Self> {
        Ok(MarcReader {
            source,
            parser: Parser::new(format)?,
            eof: false,
        })
    }

    /// Create a reader with an explicit parser queue high-water mark.
    ///
    /// # Errors
    ///
    /// Same conditions as [`new`](Self::new).
    pub fn with_high_water_mark(source: R, format: &str, high_water_mark: usize) -> Result<Self> {
        Ok(MarcReader {
            source,
            parser: Parser::with_high_water_mark(format, high_water_mark)?,
            eof: false,
        })
    }

    /// Read the next record.
    ///
    /// Returns `Ok(Some(record))` while records remain and `Ok(None)` at
    /// end of input. A malformed record returns its decode error; calling
    /// again continues with the record after it, so callers may either
    /// abort or skip and carry on.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures from the source and per-record decode
    /// failures.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.parser.next_record()? {
                return Ok(Some(record));
            }
            if self.eof {
                return Ok(None);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let n = match self.source.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                self.eof = true;
                self.parser.finish();
            } else {
                self.parser.push(&chunk[..n]);
            }
        }
    }

    /// Read every remaining record into a vector.
    ///
    /// For large inputs prefer [`read_record`](Self::read_record) or
    /// [`records`](Self::records) to avoid holding everything in memory.
    ///
    /// # Errors
    ///
    /// Stops at the first failing record; previously read records are
    /// discarded.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Iterate over records, yielding `Result<Record>` per item.
    pub fn records(&mut self) -> Records<'_, R> {
        Records { reader: self }
    }

    /// Number of records decoded so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.parser.records_parsed()
    }
}

/// Iterator over a reader's records.
///
/// Created by [`MarcReader::records`].
#[derive(Debug)]
pub struct Records<'a, R: Read> {
    reader: &'a mut MarcReader<R>,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}
