//! Codec registry: format selectors mapped to codec function tables.
//!
//! Every public entry point that takes a format name resolves it here.
//! Selectors are case-insensitive; the known set is `iso2709`, `marcxml`,
//! `mij`, `json`, and `text`. `json` and `text` are write-only renderers,
//! so their table entries carry no parse function and parser construction
//! for them fails with an unknown-format error.
//!
//! The registry is an explicit value constructed where it is needed and
//! passed to call sites; there is no global mutable state behind it.
//!
//! # Examples
//!
//! ```
//! use marcio::{Field, Record};
//! use marcio::formats::CodecRegistry;
//!
//! let registry = CodecRegistry::new();
//! let mut record = Record::new();
//! record.append([Field::control("001", "42")]);
//!
//! let wire = registry.format(&record, "iso2709").unwrap();
//! let back = registry.parse(&wire, "ISO2709").unwrap();
//! assert_eq!(back.fields, record.fields);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{MarcError, Result};
use crate::record::Record;
use crate::stream::Scan;
use crate::{iso2709, json, marcxml, mij, text};

/// Single-record decode function.
pub type ParseFn = fn(&[u8]) -> Result<Record>;
/// Single-record encode function.
pub type FormatFn = fn(&Record) -> Result<Vec<u8>>;
/// Boundary-scan function used by the streaming engine.
pub type ScanFn = fn(&[u8]) -> Scan;

/// A MARC serialization format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// ISO 2709 binary interchange format.
    Iso2709,
    /// Library of Congress MARCXML.
    Marcxml,
    /// MARC-in-JSON.
    Mij,
    /// Diagnostic JSON dump (write-only).
    Json,
    /// Human-readable text rendering (write-only).
    Text,
}

impl Format {
    /// Resolve a case-insensitive selector string.
    ///
    /// # Errors
    ///
    /// Returns an unknown-format error naming the selector.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "iso2709" => Ok(Format::Iso2709),
            "marcxml" => Ok(Format::Marcxml),
            "mij" => Ok(Format::Mij),
            "json" => Ok(Format::Json),
            "text" => Ok(Format::Text),
            _ => Err(MarcError::UnknownFormat(name.to_string())),
        }
    }

    /// Guess a format from a file extension, as used when converting
    /// between files.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mrc" | "marc" | "iso2709" => Some(Format::Iso2709),
            "xml" | "marcxml" => Some(Format::Marcxml),
            "mij" => Some(Format::Mij),
            "json" => Some(Format::Json),
            "txt" | "text" => Some(Format::Text),
            _ => None,
        }
    }

    /// The canonical selector string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Format::Iso2709 => "iso2709",
            Format::Marcxml => "marcxml",
            Format::Mij => "mij",
            Format::Json => "json",
            Format::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = MarcError;

    fn from_str(s: &str) -> Result<Self> {
        Format::from_name(s)
    }
}

/// Stream framing strings emitted around and between records.
#[derive(Debug, Clone, Copy)]
pub struct Framing {
    /// Emitted once before the first record.
    pub open: &'static str,
    /// Emitted between consecutive records.
    pub separator: &'static str,
    /// Emitted after each record.
    pub suffix: &'static str,
    /// Emitted once at end of output.
    pub close: &'static str,
}

/// One format's codec functions and framing.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    /// Which format this entry serves.
    pub format_id: Format,
    /// Single-record decoder, absent for write-only formats.
    pub parse: Option<ParseFn>,
    /// Single-record encoder.
    pub format: Option<FormatFn>,
    /// Streaming boundary rule, absent for write-only formats.
    pub scan: Option<ScanFn>,
    /// Multi-record stream framing.
    pub framing: Framing,
}

/// Lookup table from format selectors to codec entries.
///
/// Cheap to construct; build one where format dispatch is needed and pass
/// it along.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: [Codec; 5],
}

impl CodecRegistry {
    /// Build the registry of all supported formats.
    #[must_use]
    pub fn new() -> Self {
        const NO_FRAMING: Framing = Framing {
            open: "",
            separator: "",
            suffix: "",
            close: "",
        };

        CodecRegistry {
            codecs: [
                Codec {
                    format_id: Format::Iso2709,
                    parse: Some(iso2709::parse),
                    format: Some(format_iso2709),
                    scan: Some(iso2709::scan),
                    framing: NO_FRAMING,
                },
                Codec {
                    format_id: Format::Marcxml,
                    parse: Some(parse_marcxml),
                    format: Some(format_marcxml),
                    scan: Some(marcxml::scan),
                    framing: Framing {
                        open: marcxml::COLLECTION_OPEN,
                        separator: "",
                        suffix: "",
                        close: marcxml::COLLECTION_CLOSE,
                    },
                },
                Codec {
                    format_id: Format::Mij,
                    parse: Some(parse_mij),
                    format: Some(format_mij),
                    scan: Some(mij::scan),
                    framing: Framing {
                        open: "[",
                        separator: ",\n",
                        suffix: "",
                        close: "]",
                    },
                },
                Codec {
                    format_id: Format::Json,
                    parse: None,
                    format: Some(format_json),
                    scan: None,
                    framing: Framing {
                        open: "[",
                        separator: ",",
                        suffix: "",
                        close: "]",
                    },
                },
                Codec {
                    format_id: Format::Text,
                    parse: None,
                    format: Some(format_text),
                    scan: None,
                    framing: Framing {
                        open: "",
                        separator: "\n",
                        suffix: "\n",
                        close: "",
                    },
                },
            ],
        }
    }

    /// Look up the codec entry for a selector.
    ///
    /// # Errors
    ///
    /// Returns an unknown-format error for unrecognized selectors.
    pub fn get(&self, name: &str) -> Result<&Codec> {
        let format = Format::from_name(name)?;
        Ok(self.codec(format))
    }

    /// Look up the codec entry for an already-resolved format.
    #[must_use]
    pub fn codec(&self, format: Format) -> &Codec {
        let index = match format {
            Format::Iso2709 => 0,
            Format::Marcxml => 1,
            Format::Mij => 2,
            Format::Json => 3,
            Format::Text => 4,
        };
        &self.codecs[index]
    }

    /// Decode one record from raw bytes in the named format.
    ///
    /// # Errors
    ///
    /// Fails for unrecognized selectors, for write-only formats, and for
    /// malformed input.
    pub fn parse(&self, raw: &[u8], format: &str) -> Result<Record> {
        match self.get(format)?.parse {
            Some(parse) => parse(raw),
            None => Err(MarcError::UnknownFormat(format.to_string())),
        }
    }

    /// Encode one record to raw bytes in the named format.
    ///
    /// # Errors
    ///
    /// Fails for unrecognized selectors and when rendering fails.
    pub fn format(&self, record: &Record, format: &str) -> Result<Vec<u8>> {
        match self.get(format)?.format {
            Some(render) => render(record),
            None => Err(MarcError::UnknownFormat(format.to_string())),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one record from raw bytes in the named format.
///
/// # Errors
///
/// Fails for unrecognized selectors, for write-only formats, and for
/// malformed input.
pub fn parse(raw: &[u8], format: &str) -> Result<Record> {
    CodecRegistry::new().parse(raw, format)
}

/// Encode one record to raw bytes in the named format.
///
/// # Errors
///
/// Fails for unrecognized selectors and when rendering fails.
pub fn format(record: &Record, format: &str) -> Result<Vec<u8>> {
    CodecRegistry::new().format(record, format)
}

fn parse_marcxml(raw: &[u8]) -> Result<Record> {
    marcxml::parse(&String::from_utf8_lossy(raw))
}

fn parse_mij(raw: &[u8]) -> Result<Record> {
    mij::parse(&String::from_utf8_lossy(raw))
}

fn format_iso2709(record: &Record) -> Result<Vec<u8>> {
    Ok(iso2709::format(record).into_bytes())
}

fn format_marcxml(record: &Record) -> Result<Vec<u8>> {
    marcxml::format(record).map(String::into_bytes)
}

fn format_mij(record: &Record) -> Result<Vec<u8>> {
    mij::format(record).map(String::into_bytes)
}

fn format_json(record: &Record) -> Result<Vec<u8>> {
    json::format(record).map(String::into_bytes)
}

fn format_text(record: &Record) -> Result<Vec<u8>> {
    Ok(text::format(record).into_bytes())
}
