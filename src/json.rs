//! Diagnostic JSON renderer.
//!
//! Write-only: dumps the leader string and the raw field structure as
//! generic JSON, with each field flattened to an array
//! (`["001", "1234"]` for control fields,
//! `["245", "  ", "a", "My life :"]` for data fields). Useful for
//! eyeballing what a record actually holds; not round-trippable and not a
//! MARC interchange format — use [`mij`](crate::mij) for that.

use serde_json::{json, Value};

use crate::error::Result;
use crate::record::{Field, Record, Subfield};

/// Render one record as a generic JSON dump.
///
/// # Errors
///
/// Fails only if JSON serialization itself fails.
pub fn format(record: &Record) -> Result<String> {
    let fields: Vec<Value> = record.fields.iter().map(field_to_array).collect();
    let value = json!({
        "leader": record.leader,
        "fields": fields,
    });
    Ok(serde_json::to_string(&value)?)
}

fn field_to_array(field: &Field) -> Value {
    match field {
        Field::Control { tag, value } => json!([tag, value]),
        Field::Data {
            tag,
            indicator1,
            indicator2,
            subfields,
        } => {
            let mut parts = vec![
                Value::from(tag.as_str()),
                Value::from(format!("{indicator1}{indicator2}")),
            ];
            for Subfield { code, value } in subfields {
                parts.push(Value::from(code.to_string()));
                parts.push(Value::from(value.as_str()));
            }
            Value::Array(parts)
        }
    }
}
