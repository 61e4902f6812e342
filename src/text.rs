//! Line-oriented text renderer for human inspection.
//!
//! Write-only: the first line is the leader, then one line per field. A
//! control field renders as `tag value`; a data field as
//! `tag i1i2 $a value $b value …`. There is no parser for this format.
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
//! assert_eq!(
//!     marcio::text::format(&record),
//!     "00048cz   2200037n  4500\n001 12443"
//! );
//! ```

use crate::record::{Field, Record, Subfield};

/// Render one record as readable lines, without a trailing newline.
#[must_use]
pub fn format(record: &Record) -> String {
    let mut lines = Vec::with_capacity(record.fields.len() + 1);
    lines.push(record.leader.clone());

    for field in &record.fields {
        match field {
            Field::Control { tag, value } => lines.push(format!("{tag} {value}")),
            Field::Data {
                tag,
                indicator1,
                indicator2,
                subfields,
            } => {
                let mut line = format!("{tag} {indicator1}{indicator2}");
                for Subfield { code, value } in subfields {
                    line.push_str(&format!(" ${code} {value}"));
                }
                lines.push(line);
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_leader_and_field_lines() {
        let mut record = Record::new();
        record.leader = "00711nam  2200217   4500".to_string();
        record.append([
            Field::control("001", "1234"),
            Field::data("245", "  ")
                .subfield('a', "My life :")
                .subfield('b', "long story short"),
        ]);

        assert_eq!(
            format(&record),
            "00711nam  2200217   4500\n\
             001 1234\n\
             245    $a My life : $b long story short"
        );
    }

    #[test]
    fn test_format_shows_indicators() {
        let mut record = Record::new();
        record.leader = "00000nam  2200000   4500".to_string();
        record.append([Field::data("100", "1 ").subfield('a', "Austen, Jane")]);

        assert_eq!(
            format(&record),
            "00000nam  2200000   4500\n100 1  $a Austen, Jane"
        );
    }

    #[test]
    fn test_format_empty_record_is_leader_only() {
        let mut record = Record::new();
        record.leader = "00000nam  2200000   4500".to_string();
        assert_eq!(format(&record), "00000nam  2200000   4500");
    }
}
