//! MARC-in-JSON (MiJ) codec.
//!
//! A record is `{"leader": <string>, "fields": [ <field>, ... ]}` where
//! each field object has exactly one key, the tag. Control fields map the
//! tag directly to a string; data fields map it to
//! `{"subfields": [{<code>: <value>}, ...], "ind1": <char>, "ind2": <char>}`.
//! Multi-record streams are a top-level JSON array of such objects.
//!
//! # Examples
//!
//! ```
//! use marcio::{Field, Record};
//!
//! let mut record = Record::new();
//! record.leader = "00048cz   2200037n  4500".to_string();
//! record.append([Field::control("001", "12443")]);
//!
//! let json = marcio::mij::format(&record).unwrap();
//! assert!(json.contains("\"001\":\"12443\""));
//!
//! let back = marcio::mij::parse(&json).unwrap();
//! assert_eq!(back.fields, record.fields);
//! ```

use serde_json::Value;

use crate::error::{MarcError, Result};
use crate::record::{Field, Record, Subfield};
use crate::stream::Scan;

/// Render one record as a compact MiJ object.
///
/// # Errors
///
/// Fails only if JSON serialization itself fails.
pub fn format(record: &Record) -> Result<String> {
    Ok(serde_json::to_string(&record.mij())?)
}

/// Parse one MiJ object into a record.
///
/// A missing `leader` key yields an empty leader; a missing or non-array
/// `fields` key is an error, as is a field body that is neither a string
/// nor an object.
///
/// # Errors
///
/// Fails on malformed JSON or a field shape outside the MiJ schema.
pub fn parse(data: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(data)?;
    record_from_value(&value)
}

/// Boundary rule: a record spans one balanced top-level `{`…`}` pair,
/// tracked through JSON strings and escapes. Leading array framing and
/// separators are discardable.
pub(crate) fn scan(buf: &[u8]) -> Scan {
    let start = match memchr::memchr(b'{', buf) {
        Some(pos) => pos,
        None => return Scan::Partial { keep_from: buf.len() },
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &byte) in buf.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Scan::Complete(start..i + 1);
                    }
                }
                _ => {}
            }
        }
    }
    Scan::Partial { keep_from: start }
}

fn record_from_value(value: &Value) -> Result<Record> {
    let object = value.as_object().ok_or_else(|| {
        MarcError::ParseError("MiJ record is not a JSON object".to_string())
    })?;

    let leader = object
        .get("leader")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let entries = object
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| MarcError::ParseError("MiJ record has no fields array".to_string()))?;

    let mut fields = Vec::with_capacity(entries.len());
    for entry in entries {
        let field_object = entry.as_object().ok_or_else(|| {
            MarcError::ParseError("MiJ field entry is not an object".to_string())
        })?;
        for (tag, body) in field_object {
            fields.push(field_from_value(tag, body)?);
        }
    }

    Ok(Record { leader, fields })
}

fn field_from_value(tag: &str, body: &Value) -> Result<Field> {
    match body {
        Value::String(value) => Ok(Field::Control {
            tag: tag.to_string(),
            value: value.clone(),
        }),
        Value::Object(data) => {
            let indicator1 = indicator(data.get("ind1"));
            let indicator2 = indicator(data.get("ind2"));

            let mut subfields = smallvec::SmallVec::new();
            if let Some(list) = data.get("subfields").and_then(Value::as_array) {
                for subfield in list {
                    let pairs = subfield.as_object().ok_or_else(|| {
                        MarcError::ParseError(format!(
                            "MiJ subfield in field {tag} is not an object"
                        ))
                    })?;
                    for (code, value) in pairs {
                        subfields.push(Subfield {
                            code: code.chars().next().ok_or_else(|| {
                                MarcError::InvalidField("Missing subfield code".to_string())
                            })?,
                            value: value.as_str().unwrap_or_default().to_string(),
                        });
                    }
                }
            }

            Ok(Field::Data {
                tag: tag.to_string(),
                indicator1,
                indicator2,
                subfields,
            })
        }
        _ => Err(MarcError::ParseError(format!(
            "MiJ field {tag} is neither a string nor an object"
        ))),
    }
}

fn indicator(value: Option<&Value>) -> char {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_record() -> Record {
        let mut record = Record::new();
        record.leader = "00711nam  2200217   4500".to_string();
        record.append([
            Field::control("001", "1234"),
            Field::data("245", "  ")
                .subfield('a', "My life :")
                .subfield('b', "long story short"),
        ]);
        record
    }

    #[test]
    fn test_format_exact_shape() {
        assert_eq!(
            format(&spec_record()).unwrap(),
            "{\"leader\":\"00711nam  2200217   4500\",\
             \"fields\":[\
             {\"001\":\"1234\"},\
             {\"245\":{\"subfields\":[{\"a\":\"My life :\"},{\"b\":\"long story short\"}],\
             \"ind1\":\" \",\"ind2\":\" \"}}]}"
        );
    }

    #[test]
    fn test_roundtrip() {
        let record = spec_record();
        let back = parse(&format(&record).unwrap()).unwrap();
        assert_eq!(back.leader, record.leader);
        assert_eq!(back.fields, record.fields);
    }

    #[test]
    fn test_parse_field_shapes() {
        let data = r#"{
            "leader": "01234nam a2200289 a 4500",
            "fields": [
                {"001": "12443"},
                {"100": {"ind1": " ", "ind2": "1",
                         "subfields": [{"a": "Céline, Louis-Ferdinand"}, {"d": "1894-1961"}]}}
            ]
        }"#;

        let record = parse(data).unwrap();
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[0].value(), Some("12443"));
        assert_eq!(record.fields[1].indicators(), Some((' ', '1')));
        assert_eq!(
            record.fields[1].get_subfield('a'),
            Some("Céline, Louis-Ferdinand")
        );
    }

    #[test]
    fn test_parse_missing_leader_defaults_empty() {
        let record = parse(r#"{"fields": [{"001": "x"}]}"#).unwrap();
        assert_eq!(record.leader, "");
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn test_parse_missing_indicators_default_to_blank() {
        let record =
            parse(r#"{"leader": "", "fields": [{"245": {"subfields": [{"a": "t"}]}}]}"#).unwrap();
        assert_eq!(record.fields[0].indicators(), Some((' ', ' ')));
    }

    #[test]
    fn test_parse_rejects_missing_fields_array() {
        assert!(matches!(
            parse(r#"{"leader": "x"}"#),
            Err(MarcError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_field_body() {
        assert!(parse(r#"{"leader": "", "fields": [{"001": 42}]}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse("{\"leader\": "),
            Err(MarcError::JsonError(_))
        ));
    }

    #[test]
    fn test_scan_balances_braces() {
        let data = br#"[{"leader":"x","fields":[{"245":{"subfields":[{"a":"t"}],"ind1":" ","ind2":" "}}]},"#;
        match scan(data) {
            Scan::Complete(span) => {
                assert_eq!(span.start, 1);
                assert_eq!(data[span.end - 1], b'}');
                assert_eq!(span.end, data.len() - 1);
            }
            Scan::Partial { .. } => panic!("expected a complete span"),
        }
    }

    #[test]
    fn test_scan_record_ending_in_control_field() {
        // A record whose last field is a control field ends in `"}]}` not
        // `}}]}`; the balance scan must still find its true end.
        let one = format(&{
            let mut r = Record::new();
            r.append([Field::control("001", "x")]);
            r
        })
        .unwrap();
        let framed = String::from("[") + &one + ",\n";
        match scan(framed.as_bytes()) {
            Scan::Complete(span) => assert_eq!(&framed[span], one),
            Scan::Partial { .. } => panic!("expected a complete span"),
        }
    }

    #[test]
    fn test_scan_ignores_braces_inside_strings() {
        let data = br#"{"leader":"}\"{","fields":[{"001":"a}b"}]}tail"#;
        match scan(data) {
            Scan::Complete(span) => {
                assert_eq!(span, 0..data.len() - 4);
            }
            Scan::Partial { .. } => panic!("expected a complete span"),
        }
    }

    #[test]
    fn test_scan_partial_and_garbage_prefix() {
        assert_eq!(scan(b"[ \n"), Scan::Partial { keep_from: 3 });
        assert_eq!(
            scan(br#",{"leader":"x","fields":["#),
            Scan::Partial { keep_from: 1 }
        );
    }
}
