#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marcio: MARC record I/O
//!
//! A Rust library for reading, writing, converting, and manipulating MARC
//! bibliographic records across the formats the library world actually
//! exchanges: ISO 2709 binary, MARCXML, MARC-in-JSON, a line-oriented text
//! rendering, and a compact JSON debug dump.
//!
//! ## Quick Start
//!
//! ### Reading MARC Records
//!
//! ```no_run
//! use marcio::MarcReader;
//! use std::fs::File;
//!
//! # fn main() -> marcio::Result<()> {
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file, "iso2709")?;
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Creating and Writing MARC Records
//!
//! ```
//! use marcio::{Field, MarcWriter, Record};
//!
//! # fn main() -> marcio::Result<()> {
//! let mut record = Record::new();
//! record.append([
//!     Field::control("001", "12345"),
//!     Field::data("245", "10")
//!         .subfield('a', "My life :")
//!         .subfield('b', "long story short"),
//! ]);
//!
//! let mut writer = MarcWriter::new(Vec::new(), "marcxml")?;
//! writer.write_record(&record)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Converting Between Formats
//!
//! ```no_run
//! use std::fs::File;
//!
//! # fn main() -> marcio::Result<()> {
//! let source = File::open("records.mrc")?;
//! let sink = File::create("records.xml")?;
//! let count = marcio::convert(source, sink, "iso2709", "marcxml")?;
//! println!("converted {count} records");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`] — Core record structures (`Record`, `Field`, `Subfield`)
//! - [`formats`] — Format selectors and the codec registry
//! - [`iso2709`] — ISO 2709 binary codec
//! - [`marcxml`] — MARCXML codec
//! - [`mij`] — MARC-in-JSON codec
//! - [`text`] — Line-oriented text rendering (write-only)
//! - [`json`] — Compact JSON debug rendering (write-only)
//! - [`stream`] — Incremental parser/formatter engine with backpressure
//! - [`reader`] — Reading records from any byte source
//! - [`writer`] — Writing records to any byte sink
//! - [`pipeline`] — Threaded record pipeline and stream conversion
//! - [`error`] — Error types and result type
//!
//! ## Format Support
//!
//! | Selector  | Parse | Format | Framing                  |
//! |-----------|-------|--------|--------------------------|
//! | `iso2709` | yes   | yes    | none (self-delimiting)   |
//! | `marcxml` | yes   | yes    | `<collection>` wrapper   |
//! | `mij`     | yes   | yes    | JSON array               |
//! | `text`    | no    | yes    | blank line separators    |
//! | `json`    | no    | yes    | JSON array               |

pub mod error;
pub mod formats;
pub mod iso2709;
pub mod json;
pub mod marcxml;
pub mod mij;
pub mod pipeline;
pub mod reader;
/// Core record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod stream;
pub mod text;
pub mod writer;

pub use error::{MarcError, Result};
pub use formats::{format, parse, CodecRegistry, Format};
pub use pipeline::{convert, convert_with, PipelineConfig, RecordPipeline};
pub use reader::{MarcReader, Records};
pub use record::{Field, Record, Subfield};
pub use stream::{Formatter, Parser, Scan, Transform};
pub use writer::MarcWriter;
