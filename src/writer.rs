//! Buffered record writing to any [`Write`] sink.
//!
//! [`MarcWriter`] wraps a byte sink and the streaming [`Formatter`] behind
//! it: each record is rendered with its framing and flushed through to the
//! sink as it arrives, so memory stays flat no matter how many records a
//! stream carries.
//!
//! # Important: Always Call `finish()`
//!
//! Formats with enclosing framing (the MARCXML collection wrapper, the
//! MARC-in-JSON array brackets) only emit their closing markup from
//! [`MarcWriter::finish`]. Dropping a writer without finishing leaves the
//! output truncated.
//!
//! # Examples
//!
//! ```
//! use marcio::{Field, MarcWriter, Record};
//!
//! let mut record = Record::new();
//! record.append([Field::control("001", "42")]);
//!
//! let mut writer = MarcWriter::new(Vec::new(), "marcxml")?;
//! writer.write_record(&record)?;
//! writer.finish()?;
//!
//! let xml = String::from_utf8(writer.into_inner()).unwrap();
//! assert!(xml.ends_with("</record></collection>"));
//! # Ok::<(), marcio::MarcError>(())
//! ```

use std::io::Write;

use crate::error::Result;
use crate::record::Record;
use crate::stream::Formatter;

/// Writes records to a byte sink in a selected serialization.
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    sink: W,
    formatter: Formatter,
}

impl<W: Write> MarcWriter<W> {
    /// Create a writer for a format selector.
    ///
    /// # Errors
    ///
    /// Returns an unknown-format error for unrecognized selectors.
    pub fn new(sink: W, format: &str) -> Result<Self> {
        Ok(MarcWriter {
            sink,
            formatter: Formatter::new(format)?,
        })
    }

    /// Write one record, framed for its position in the stream.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be rendered, if the writer is already
    /// finished, or on sink I/O failure.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.formatter.push(record)?;
        self.drain()
    }

    /// Write a batch of records in order, returning how many were written.
    ///
    /// # Errors
    ///
    /// Stops at the first record that fails, as for
    /// [`write_record`](Self::write_record).
    pub fn write_batch<'a, I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut written = 0;
        for record in records {
            self.write_record(record)?;
            written += 1;
        }
        Ok(written)
    }

    /// Emit the closing framing and flush the sink.
    ///
    /// With no records written this still produces well-formed empty
    /// output (an empty collection or array). Further `write_record`
    /// calls after this fail.
    ///
    /// # Errors
    ///
    /// Fails on sink I/O failure.
    pub fn finish(&mut self) -> Result<()> {
        self.formatter.finish();
        self.drain()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Total records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.formatter.records_formatted()
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(chunk) = self.formatter.next_chunk() {
            self.sink.write_all(&chunk)?;
        }
        Ok(())
    }
}
