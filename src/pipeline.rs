//! Producer-consumer record pipeline with backpressure, plus synchronous
//! stream conversion.
//!
//! [`RecordPipeline`] spawns a background thread that reads and decodes
//! records from a source, pushing results into a bounded channel. The
//! consumer drains the channel at its own pace; when it falls behind, the
//! full channel blocks the producer, so memory stays bounded by the channel
//! capacity plus the parser's high-water mark.
//!
//! [`convert`] and [`convert_with`] are the single-threaded counterparts:
//! read from one format, optionally rewrite each record, write to another.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use crate::error::{MarcError, Result};
use crate::reader::MarcReader;
use crate::record::Record;
use crate::stream::{Transform, DEFAULT_HIGH_WATER_MARK};
use crate::writer::MarcWriter;

/// Configuration for the producer-consumer pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Channel capacity (records)
    pub channel_capacity: usize,
    /// Parser queue high-water mark inside the producer
    pub high_water_mark: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1000,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }
}

/// Producer task: reads records from the source, sends results downstream.
///
/// Decode failures are forwarded in stream order and reading continues;
/// an I/O failure is forwarded and ends the task. A send failure means the
/// consumer hung up, which also ends the task.
fn producer_task<R: Read>(mut reader: MarcReader<R>, sender: &Sender<Result<Record>>) {
    loop {
        match reader.read_record() {
            Ok(Some(record)) => {
                if sender.send(Ok(record)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                let fatal = matches!(err, MarcError::IoError(_));
                if sender.send(Err(err)).is_err() || fatal {
                    break;
                }
            }
        }
    }
}

/// Consumer-facing pipeline handle.
#[derive(Debug)]
pub struct RecordPipeline {
    receiver: Receiver<Result<Record>>,
    /// Handle to the producer thread, kept for join semantics.
    _producer_handle: Option<thread::JoinHandle<()>>,
}

impl RecordPipeline {
    /// Spawn a pipeline reading `format` records from `source`.
    ///
    /// The producer thread starts immediately and fills the channel until
    /// it hits the capacity bound.
    ///
    /// # Errors
    ///
    /// Returns an unknown-format error for unrecognized or write-only
    /// format selectors, before any thread is spawned.
    pub fn new<R>(source: R, format: &str, config: &PipelineConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let reader = MarcReader::with_high_water_mark(source, format, config.high_water_mark)?;
        let (sender, receiver) = bounded(config.channel_capacity);

        let producer_handle = thread::spawn(move || producer_task(reader, &sender));

        Ok(RecordPipeline {
            receiver,
            _producer_handle: Some(producer_handle),
        })
    }

    /// Spawn a pipeline reading from a file on disk.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or the format selector is
    /// unrecognized.
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        format: &str,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file, format, config)
    }

    /// Get the next record, blocking until one is available.
    ///
    /// Returns `Ok(None)` once the producer has finished and the channel
    /// drained.
    ///
    /// # Errors
    ///
    /// A record that failed to decode surfaces here in its stream
    /// position; later records keep flowing on subsequent calls.
    pub fn next_record(&self) -> Result<Option<Record>> {
        match self.receiver.recv() {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None), // Channel closed = EOF
        }
    }

    /// Get the next record without blocking.
    ///
    /// Returns `Ok(None)` both when nothing is available right now and
    /// when the stream has ended; use [`next_record`](Self::next_record)
    /// to distinguish by blocking.
    ///
    /// # Errors
    ///
    /// Same per-record semantics as [`next_record`](Self::next_record).
    pub fn try_next(&self) -> Result<Option<Record>> {
        match self.receiver.try_recv() {
            Ok(result) => result.map(Some),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }
}

impl IntoIterator for RecordPipeline {
    type Item = Result<Record>;
    type IntoIter = crossbeam_channel::IntoIter<Result<Record>>;

    /// Yields results until EOF. Blocks when the producer is slow.
    fn into_iter(self) -> Self::IntoIter {
        self.receiver.into_iter()
    }
}

/// Convert every record from one serialization to another.
///
/// Reads `from`-format records out of `source` and writes them in `to`
/// format to `sink`, framing included, returning how many records were
/// converted. Stops at the first record that fails to decode or render.
///
/// # Errors
///
/// Fails on unknown format selectors, per-record decode or render
/// failures, and I/O failures on either side.
pub fn convert<R: Read, W: Write>(source: R, sink: W, from: &str, to: &str) -> Result<usize> {
    convert_with(source, sink, from, to, |_record| {})
}

/// Convert records between serializations, rewriting each along the way.
///
/// Like [`convert`], with `op` applied to every record after decoding and
/// before rendering.
///
/// # Errors
///
/// Same conditions as [`convert`].
pub fn convert_with<R, W, F>(source: R, sink: W, from: &str, to: &str, op: F) -> Result<usize>
where
    R: Read,
    W: Write,
    F: FnMut(&mut Record),
{
    let mut reader = MarcReader::new(source, from)?;
    let mut writer = MarcWriter::new(sink, to)?;
    let mut stage = Transform::new(op);

    while let Some(mut record) = reader.read_record()? {
        stage.apply(&mut record);
        writer.write_record(&record)?;
    }
    writer.finish()?;
    Ok(writer.records_written())
}
