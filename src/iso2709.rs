//! ISO 2709 binary codec (`.mrc` / raw MARC transmission format).
//!
//! A wire record is a 24-character leader, a directory of 12-byte entries
//! (3-digit tag, 4-digit length, 5-digit start offset), a field terminator,
//! the field payloads (each terminated by `0x1E`), and a record terminator
//! (`0x1D`). Directory lengths count the payload plus its terminator, and
//! offsets are relative to the base address stored at leader positions
//! 12..17.
//!
//! [`format`] recomputes the record length and base address into the
//! leader; every other leader position is kept as the caller set it.
//!
//! # Examples
//!
//! ```
//! use marcio::{Field, Record};
//!
//! let mut record = Record::new();
//! record.append([
//!     Field::control("001", "   12345"),
//!     Field::data("245", "  ").subfield('a', "Streams :"),
//! ]);
//!
//! let wire = marcio::iso2709::format(&record);
//! let back = marcio::iso2709::parse(wire.as_bytes()).unwrap();
//! assert_eq!(back.fields, record.fields);
//! ```

use encoding_rs::Encoding;

use crate::error::{MarcError, Result};
use crate::record::{is_control_tag, Field, Record, Subfield};
use crate::stream::Scan;

/// Terminates a complete record.
pub const RECORD_TERMINATOR: u8 = 0x1D;
/// Terminates each field payload and the directory.
pub const FIELD_TERMINATOR: u8 = 0x1E;
/// Precedes each subfield code inside a data field payload.
pub const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Leader template substituted when a record's own leader is shorter than
/// 24 characters (fresh records carry an empty leader).
pub const DEFAULT_LEADER: &str = "01197nam  22002891  4500";

/// Leniency policy: subfield segments shorter than two characters (a bare
/// delimiter, or a code with no value) are dropped instead of failing the
/// record.
const SKIP_SHORT_SUBFIELD_SEGMENTS: bool = true;

const LEADER_LEN: usize = 24;
const DIRECTORY_ENTRY_LEN: usize = 12;

/// Decode one binary record, treating payload bytes as UTF-8.
///
/// Undecodable byte sequences become replacement characters rather than
/// errors.
///
/// # Errors
///
/// Fails when the record is shorter than a leader, the base address or a
/// directory entry is non-numeric, or a directory entry addresses bytes
/// outside the record.
pub fn parse(raw: &[u8]) -> Result<Record> {
    parse_with(raw, encoding_rs::UTF_8)
}

/// Decode one binary record whose payload bytes use the given encoding.
///
/// Useful for legacy catalogs transmitted in MARC-8 successors such as
/// Windows-1252 or ISO-8859-1. Decoding is lossy: undecodable sequences
/// become replacement characters.
///
/// # Errors
///
/// Same structural conditions as [`parse`].
pub fn parse_with(raw: &[u8], encoding: &'static Encoding) -> Result<Record> {
    if raw.len() <= LEADER_LEN {
        return Err(MarcError::InvalidRecord(format!(
            "record too short: {} bytes",
            raw.len()
        )));
    }

    let leader = decode_bytes(&raw[..LEADER_LEN], encoding);
    let base = ascii_number(&raw[12..17]).ok_or_else(|| {
        MarcError::InvalidRecord("leader base address is not numeric".to_string())
    })?;
    if base <= LEADER_LEN || base > raw.len() {
        return Err(MarcError::InvalidRecord(format!(
            "leader base address {base} out of range"
        )));
    }

    let directory_len = base - LEADER_LEN - 1;
    let field_count = directory_len / DIRECTORY_ENTRY_LEN;
    let mut fields = Vec::with_capacity(field_count);

    for i in 0..field_count {
        let entry = &raw[LEADER_LEN + i * DIRECTORY_ENTRY_LEN..LEADER_LEN + (i + 1) * DIRECTORY_ENTRY_LEN];
        let tag = String::from_utf8_lossy(&entry[..3]).into_owned();
        let stored_len = ascii_number(&entry[3..7]).ok_or_else(|| {
            MarcError::InvalidRecord(format!("directory length for tag {tag} is not numeric"))
        })?;
        let start = ascii_number(&entry[7..12]).ok_or_else(|| {
            MarcError::InvalidRecord(format!("directory offset for tag {tag} is not numeric"))
        })?;
        // Stored length counts the payload plus its field terminator.
        let payload_len = stored_len.checked_sub(1).ok_or_else(|| {
            MarcError::InvalidRecord(format!("zero-length directory entry for tag {tag}"))
        })?;

        let pos = base + start;
        let payload = raw.get(pos..pos + payload_len).ok_or_else(|| {
            MarcError::InvalidRecord(format!("field data for tag {tag} out of range"))
        })?;

        if is_control_tag(&tag) {
            fields.push(Field::Control {
                value: decode_bytes(payload, encoding),
                tag,
            });
        } else {
            fields.push(parse_data_field(tag, &decode_bytes(payload, encoding)));
        }
    }

    Ok(Record { leader, fields })
}

/// Encode one record to its binary transmission form.
///
/// Infallible: a leader shorter than 24 characters is replaced by
/// [`DEFAULT_LEADER`] before the length and base address are written in.
#[must_use]
pub fn format(record: &Record) -> String {
    let mut directory = String::with_capacity(record.fields.len() * DIRECTORY_ENTRY_LEN);
    let mut payloads = String::new();

    for field in &record.fields {
        let start = payloads.len();
        match field {
            Field::Control { tag, value } => {
                payloads.push_str(value);
                payloads.push('\u{1e}');
                push_directory_entry(&mut directory, tag, payloads.len() - start, start);
            }
            Field::Data {
                tag,
                indicator1,
                indicator2,
                subfields,
            } => {
                payloads.push(*indicator1);
                payloads.push(*indicator2);
                for Subfield { code, value } in subfields {
                    payloads.push('\u{1f}');
                    payloads.push(*code);
                    payloads.push_str(value);
                }
                payloads.push('\u{1e}');
                push_directory_entry(&mut directory, tag, payloads.len() - start, start);
            }
        }
    }

    let base = LEADER_LEN + directory.len() + 1;
    let total = base + payloads.len() + 1;

    let mut leader: Vec<char> = if record.leader.chars().count() < LEADER_LEN {
        DEFAULT_LEADER.chars().collect()
    } else {
        record.leader.chars().take(LEADER_LEN).collect()
    };
    write_padded(&mut leader, 0, 5, total);
    write_padded(&mut leader, 12, 5, base);

    let mut out = String::with_capacity(total);
    out.extend(leader);
    out.push_str(&directory);
    out.push('\u{1e}');
    out.push_str(&payloads);
    out.push('\u{1d}');
    out
}

/// Boundary rule: a record span ends at (and includes) the record
/// terminator.
pub(crate) fn scan(buf: &[u8]) -> Scan {
    match memchr::memchr(RECORD_TERMINATOR, buf) {
        Some(pos) => Scan::Complete(0..pos + 1),
        None => Scan::Partial { keep_from: 0 },
    }
}

fn parse_data_field(tag: String, payload: &str) -> Field {
    let mut chars = payload.chars();
    let indicator1 = chars.next().unwrap_or(' ');
    let indicator2 = chars.next().unwrap_or(' ');

    let mut subfields = smallvec::SmallVec::new();
    for segment in chars.as_str().split('\u{1f}').skip(1) {
        let mut segment_chars = segment.chars();
        match (segment_chars.next(), segment_chars.as_str()) {
            (Some(code), value) if !value.is_empty() || !SKIP_SHORT_SUBFIELD_SEGMENTS => {
                subfields.push(Subfield {
                    code,
                    value: value.to_string(),
                });
            }
            _ => {} // stray delimiter or bare code, dropped
        }
    }

    Field::Data {
        tag,
        indicator1,
        indicator2,
        subfields,
    }
}

fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Parse a run of ASCII digits as a decimal number.
fn ascii_number(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    let mut value = 0usize;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + usize::from(b - b'0');
    }
    Some(value)
}

fn push_directory_entry(directory: &mut String, tag: &str, len: usize, start: usize) {
    directory.push_str(&format!("{tag:0>3}{len:04}{start:05}"));
}

/// Overwrite `width` leader positions at `at` with a zero-padded number.
fn write_padded(leader: &mut [char], at: usize, width: usize, value: usize) {
    let digits = format!("{value:0width$}");
    for (slot, digit) in leader[at..at + width].iter_mut().zip(digits.chars()) {
        *slot = digit;
    }
}
