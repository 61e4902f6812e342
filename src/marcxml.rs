//! MARCXML codec, as defined by the Library of Congress
//! (<https://www.loc.gov/standards/marcxml/>).
//!
//! A record is one `<record>` element with a `<leader>` text child,
//! `<controlfield tag="…">` elements for control fields, and
//! `<datafield tag="…" ind1="…" ind2="…">` elements holding
//! `<subfield code="…">` children for data fields. [`format`] emits a
//! single compact record element with no XML declaration and no namespace;
//! the `xmlns` declaration lives on the `<collection>` wrapper that the
//! streaming layer emits around a record sequence.
//!
//! For parsing, default-namespace (`<record xmlns="…">`), prefixed
//! (`<marc:record xmlns:marc="…">`), and namespace-free forms are all
//! accepted. Text content is entity-decoded on parse and entity-encoded on
//! format.
//!
//! # Examples
//!
//! ```
//! use marcio::{Field, Record};
//!
//! let mut record = Record::new();
//! record.leader = "00711nam  2200217   4500".to_string();
//! record.append([Field::data("245", "10").subfield('a', "Ada & Grace")]);
//!
//! let xml = marcio::marcxml::format(&record).unwrap();
//! assert!(xml.contains("<subfield code=\"a\">Ada &amp; Grace</subfield>"));
//!
//! let back = marcio::marcxml::parse(&xml).unwrap();
//! assert_eq!(back.fields, record.fields);
//! ```

use quick_xml::de::from_str as xml_from_str;
use quick_xml::escape::escape;
use quick_xml::se::to_string as xml_to_string;
use serde::{Deserialize, Serialize};

use crate::error::{MarcError, Result};
use crate::record::{Field, Record, Subfield};
use crate::stream::Scan;

/// Collection wrapper emitted around streamed record sequences.
pub(crate) const COLLECTION_OPEN: &str =
    "<collection xmlns=\"http://www.loc.gov/MARC21/slim\">";
pub(crate) const COLLECTION_CLOSE: &str = "</collection>";

/// Leniency policy: a data field with no subfields is dropped on format
/// rather than emitted as an empty `<datafield>` element. Parsing keeps
/// such fields, so the asymmetry is format-only.
const DROP_SUBFIELDLESS_DATA_FIELDS: bool = true;

const RECORD_START: &[u8] = b"<record";
const RECORD_END: &[u8] = b"</record>";

/// MARCXML record representation for serde.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "record")]
struct XmlRecord {
    #[serde(default)]
    leader: String,
    #[serde(default)]
    controlfield: Vec<XmlControlField>,
    #[serde(default)]
    datafield: Vec<XmlDataField>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "controlfield")]
struct XmlControlField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "$value", default)]
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "datafield")]
struct XmlDataField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "@ind1")]
    ind1: String,
    #[serde(rename = "@ind2")]
    ind2: String,
    #[serde(default)]
    subfield: Vec<XmlSubfield>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "subfield")]
struct XmlSubfield {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "$value", default)]
    value: String,
}

/// MARCXML collection wrapper for multi-record documents.
#[derive(Debug, Deserialize)]
#[serde(rename = "collection")]
struct XmlCollection {
    #[serde(default, rename = "record")]
    records: Vec<XmlRecord>,
}

/// Strip XML namespace prefixes and declarations from MARCXML input.
///
/// Handles both `marc:record` → `record` (prefixed namespace) and
/// `xmlns="..."` / `xmlns:marc="..."` (namespace declarations).
fn strip_marcxml_ns(xml: &str) -> String {
    use regex::Regex;

    let re_xmlns = Regex::new(r#"\s+xmlns(?::\w+)?="[^"]*""#).unwrap();
    let stripped = re_xmlns.replace_all(xml, "");

    let re_prefix = Regex::new(r"<(/?)(\w+):").unwrap();
    re_prefix.replace_all(&stripped, "<$1").to_string()
}

/// Render one record as a compact `<record>` element.
///
/// Fields are emitted in record order; data fields with no subfields are
/// dropped. Text content and the leader are entity-encoded.
///
/// # Errors
///
/// Fails if a field cannot be serialized to XML.
pub fn format(record: &Record) -> Result<String> {
    let mut xml = String::from("<record>");
    xml.push_str("<leader>");
    xml.push_str(&escape(&record.leader));
    xml.push_str("</leader>");

    for field in &record.fields {
        match field {
            Field::Control { tag, value } => {
                let element = XmlControlField {
                    tag: tag.clone(),
                    value: value.clone(),
                };
                xml.push_str(&xml_to_string(&element).map_err(|e| {
                    MarcError::ParseError(format!("Failed to serialize MARCXML: {e}"))
                })?);
            }
            Field::Data {
                tag,
                indicator1,
                indicator2,
                subfields,
            } => {
                if subfields.is_empty() && DROP_SUBFIELDLESS_DATA_FIELDS {
                    continue;
                }
                let element = XmlDataField {
                    tag: tag.clone(),
                    ind1: indicator1.to_string(),
                    ind2: indicator2.to_string(),
                    subfield: subfields
                        .iter()
                        .map(|s| XmlSubfield {
                            code: s.code.to_string(),
                            value: s.value.clone(),
                        })
                        .collect(),
                };
                xml.push_str(&xml_to_string(&element).map_err(|e| {
                    MarcError::ParseError(format!("Failed to serialize MARCXML: {e}"))
                })?);
            }
        }
    }

    xml.push_str("</record>");
    Ok(xml)
}

/// Parse one MARCXML `<record>` element.
///
/// Accepts default-namespace, prefixed-namespace, and namespace-free
/// forms. A record with no `<leader>` element is treated as malformed
/// markup and yields an empty record rather than an error, tolerating
/// partial or corrupt collections.
///
/// # Errors
///
/// Fails when the XML itself cannot be parsed.
pub fn parse(xml: &str) -> Result<Record> {
    let cleaned = strip_marcxml_ns(xml);
    if !cleaned.contains("<leader>") {
        return Ok(Record::new());
    }
    let decoded: XmlRecord = xml_from_str(&cleaned)
        .map_err(|e| MarcError::ParseError(format!("Failed to parse MARCXML: {e}")))?;
    record_from_xml(decoded)
}

/// Parse a MARCXML `<collection>` document into its records.
///
/// # Errors
///
/// Fails when the XML cannot be parsed or a subfield lacks its code
/// attribute.
pub fn parse_collection(xml: &str) -> Result<Vec<Record>> {
    let cleaned = strip_marcxml_ns(xml);
    let collection: XmlCollection = xml_from_str(&cleaned).map_err(|e| {
        MarcError::ParseError(format!("Failed to parse MARCXML collection: {e}"))
    })?;
    collection.records.into_iter().map(record_from_xml).collect()
}

/// Boundary rule: a record spans `<record` through `</record>`; bytes that
/// cannot open a start marker are discardable.
pub(crate) fn scan(buf: &[u8]) -> Scan {
    use memchr::memmem;

    match memmem::find(buf, RECORD_START) {
        Some(start) => match memmem::find(&buf[start..], RECORD_END) {
            Some(rel_end) => Scan::Complete(start..start + rel_end + RECORD_END.len()),
            None => Scan::Partial { keep_from: start },
        },
        // Keep a window that could still hold the head of a split start
        // marker.
        None => Scan::Partial {
            keep_from: buf.len().saturating_sub(RECORD_START.len() - 1),
        },
    }
}

fn record_from_xml(decoded: XmlRecord) -> Result<Record> {
    let mut fields = Vec::with_capacity(decoded.controlfield.len() + decoded.datafield.len());

    for cf in decoded.controlfield {
        fields.push(Field::Control {
            tag: cf.tag,
            value: cf.value,
        });
    }

    for df in decoded.datafield {
        let indicator1 = df.ind1.chars().next().unwrap_or(' ');
        let indicator2 = df.ind2.chars().next().unwrap_or(' ');
        let subfields = df
            .subfield
            .into_iter()
            .map(|sf| {
                let code = sf.code.chars().next().ok_or_else(|| {
                    MarcError::InvalidField("Missing subfield code".to_string())
                })?;
                Ok(Subfield {
                    code,
                    value: sf.value,
                })
            })
            .collect::<Result<_>>()?;

        fields.push(Field::Data {
            tag: df.tag,
            indicator1,
            indicator2,
            subfields,
        });
    }

    Ok(Record {
        leader: decoded.leader,
        fields,
    })
}
