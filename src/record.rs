//! Core MARC record data model.
//!
//! This module provides the [`Record`] type together with its [`Field`] and
//! [`Subfield`] building blocks. A record is a plain value: a leader string
//! plus an ordered list of fields kept in non-decreasing tag order. Fields
//! come in two shapes, discriminated by their tag: control fields (tags
//! below `"010"`) hold a single opaque value, data fields hold two indicator
//! characters and an ordered list of subfields.
//!
//! # Examples
//!
//! ```
//! use marcio::{Field, Record};
//!
//! let mut record = Record::new();
//! record.leader = "00711nam  2200217   4500".to_string();
//! record.append([
//!     Field::control("001", "1234"),
//!     Field::data("245", "  ")
//!         .subfield('a', "My life :")
//!         .subfield('b', "long story short"),
//! ]);
//!
//! assert_eq!(record.fields.len(), 2);
//! assert!(record.fields[0].is_control());
//! ```

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::error::Result;

/// Returns true when a tag denotes a control field.
///
/// Tags are fixed-width zero-padded strings, so the lexicographic comparison
/// against `"010"` is also the numeric one.
pub(crate) fn is_control_tag(tag: &str) -> bool {
    tag < "010"
}

/// A single subfield of a data field: a one-character code and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    /// Subfield code (e.g. 'a', 'b').
    pub code: char,
    /// Subfield value.
    pub value: String,
}

/// A MARC field, either a control field or a data field.
///
/// The two shapes are an explicit tagged variant so codecs pattern-match on
/// the field kind instead of re-deriving it from the tag at every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Control field (tag below `"010"`): a tag and a single opaque value.
    Control {
        /// Three-character field tag (e.g. "001").
        tag: String,
        /// Field value, verbatim.
        value: String,
    },
    /// Data field: a tag, two indicator characters, and ordered subfields.
    Data {
        /// Three-character field tag (e.g. "245").
        tag: String,
        /// First indicator character.
        indicator1: char,
        /// Second indicator character.
        indicator2: char,
        /// Ordered subfields; most fields carry one to four.
        subfields: SmallVec<[Subfield; 4]>,
    },
}

impl Field {
    /// Create a control field.
    pub fn control(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Field::Control {
            tag: tag.into(),
            value: value.into(),
        }
    }

    /// Create a data field with no subfields yet.
    ///
    /// `indicators` supplies both indicator characters; missing characters
    /// default to space.
    ///
    /// # Examples
    ///
    /// ```
    /// use marcio::Field;
    ///
    /// let field = Field::data("245", "1 ")
    ///     .subfield('a', "The Great Gatsby");
    /// assert_eq!(field.tag(), "245");
    /// ```
    pub fn data(tag: impl Into<String>, indicators: &str) -> Self {
        let mut chars = indicators.chars();
        Field::Data {
            tag: tag.into(),
            indicator1: chars.next().unwrap_or(' '),
            indicator2: chars.next().unwrap_or(' '),
            subfields: SmallVec::new(),
        }
    }

    /// Add a subfield, returning the field for chained construction.
    #[must_use]
    pub fn subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.add_subfield(code, value);
        self
    }

    /// Add a subfield in place. Has no effect on control fields.
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        if let Field::Data { subfields, .. } = self {
            subfields.push(Subfield {
                code,
                value: value.into(),
            });
        }
    }

    /// The field's three-character tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Field::Control { tag, .. } | Field::Data { tag, .. } => tag,
        }
    }

    /// Whether this is a control field.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Field::Control { .. })
    }

    /// The control-field value, or `None` for data fields.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Field::Control { value, .. } => Some(value),
            Field::Data { .. } => None,
        }
    }

    /// The indicator pair, or `None` for control fields.
    #[must_use]
    pub fn indicators(&self) -> Option<(char, char)> {
        match self {
            Field::Control { .. } => None,
            Field::Data {
                indicator1,
                indicator2,
                ..
            } => Some((*indicator1, *indicator2)),
        }
    }

    /// First value for a subfield code, if any.
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields()
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// All subfields, in order. Empty for control fields.
    #[must_use]
    pub fn subfields(&self) -> &[Subfield] {
        match self {
            Field::Control { .. } => &[],
            Field::Data { subfields, .. } => subfields,
        }
    }
}

/// An in-memory MARC record: a leader plus tag-ordered fields.
///
/// Records are plain owned values with no shared mutable state; [`Clone`]
/// produces a fully independent deep copy. A freshly created record has an
/// empty leader and no fields; the binary encoder substitutes a default
/// leader template for anything shorter than 24 characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Leader string, nominally 24 characters.
    pub leader: String,
    /// Fields in non-decreasing tag order.
    pub fields: Vec<Field>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Record::default()
    }

    /// Insert a batch of fields, preserving tag order.
    ///
    /// The whole batch is inserted immediately before the first existing
    /// field whose tag is strictly greater than the batch's first tag, with
    /// the batch's relative order preserved; if there is no such field the
    /// batch lands at the end. Duplicate tags are legal and keep insertion
    /// order among themselves. Appending an empty batch is a no-op.
    ///
    /// Returns the record for chaining.
    ///
    /// # Examples
    ///
    /// ```
    /// use marcio::{Field, Record};
    ///
    /// let mut record = Record::new();
    /// record
    ///     .append([Field::data("245", "  ").subfield('a', "My title")])
    ///     .append([Field::control("001", "1234")]);
    ///
    /// let tags: Vec<&str> = record.fields.iter().map(|f| f.tag()).collect();
    /// assert_eq!(tags, ["001", "245"]);
    /// ```
    pub fn append<I>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = Field>,
    {
        let batch: Vec<Field> = fields.into_iter().collect();
        if batch.is_empty() {
            return self;
        }
        let insert_at = self
            .fields
            .iter()
            .position(|existing| existing.tag() > batch[0].tag())
            .unwrap_or(self.fields.len());
        self.fields.splice(insert_at..insert_at, batch);
        self
    }

    /// Fields whose tag matches a regular-expression pattern.
    ///
    /// The pattern is an unanchored search over the tag, so `"00."` matches
    /// `"001"` and `"24"` matches `"245"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn get(&self, pattern: &str) -> Result<Vec<&Field>> {
        let re = Regex::new(pattern)?;
        Ok(self
            .fields
            .iter()
            .filter(|field| re.is_match(field.tag()))
            .collect())
    }

    /// Mutable counterpart of [`get`](Self::get), for in-place edits.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn get_mut(&mut self, pattern: &str) -> Result<Vec<&mut Field>> {
        let re = Regex::new(pattern)?;
        Ok(self
            .fields
            .iter_mut()
            .filter(|field| re.is_match(field.tag()))
            .collect())
    }

    /// Remove all fields whose tag matches the pattern.
    ///
    /// Deleting is idempotent: once no tags match, further calls are no-ops.
    /// Returns the record for chaining.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn delete(&mut self, pattern: &str) -> Result<&mut Self> {
        let re = Regex::new(pattern)?;
        self.fields.retain(|field| !re.is_match(field.tag()));
        Ok(self)
    }

    /// Invoke a callback once per field whose tag matches the pattern.
    ///
    /// The callback sees each field read-only; mutation goes through
    /// [`get_mut`](Self::get_mut).
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn match_fields<F>(&self, pattern: &str, mut callback: F) -> Result<()>
    where
        F: FnMut(&Field),
    {
        for field in self.get(pattern)? {
            callback(field);
        }
        Ok(())
    }

    /// Iterate over fields with an exact tag.
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |field| field.tag() == tag)
    }

    /// The MARC-in-JSON object view of this record.
    ///
    /// Fields are a sequence of single-key objects (one per field) rather
    /// than a map keyed by tag, because repeated tags are legal and a plain
    /// map cannot represent them. Data-field bodies carry their keys in
    /// `subfields`, `ind1`, `ind2` order.
    #[must_use]
    pub fn mij(&self) -> Value {
        let mut root = Map::new();
        root.insert("leader".to_string(), Value::String(self.leader.clone()));

        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let mut entry = Map::new();
            match field {
                Field::Control { tag, value } => {
                    entry.insert(tag.clone(), Value::String(value.clone()));
                }
                Field::Data {
                    tag,
                    indicator1,
                    indicator2,
                    subfields,
                } => {
                    let rendered: Vec<Value> = subfields
                        .iter()
                        .map(|sf| {
                            let mut pair = Map::new();
                            pair.insert(sf.code.to_string(), Value::String(sf.value.clone()));
                            Value::Object(pair)
                        })
                        .collect();
                    let mut body = Map::new();
                    body.insert("subfields".to_string(), Value::Array(rendered));
                    body.insert("ind1".to_string(), Value::String(indicator1.to_string()));
                    body.insert("ind2".to_string(), Value::String(indicator2.to_string()));
                    entry.insert(tag.clone(), Value::Object(body));
                }
            }
            fields.push(Value::Object(entry));
        }
        root.insert("fields".to_string(), Value::Array(fields));
        Value::Object(root)
    }

    /// Render this record as wire bytes in the named format.
    ///
    /// Accepts the same case-insensitive selectors as the crate-level entry
    /// points: `iso2709`, `marcxml`, `mij`, `json`, `text`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown format selectors or if rendering fails.
    pub fn as_format(&self, format: &str) -> Result<Vec<u8>> {
        crate::formats::format(self, format)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::text::format(self))
    }
}
