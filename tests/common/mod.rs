//! Common test helpers shared across the integration suite.

use marcio::{Field, Record};

/// The worked reference record used throughout the format tests: one
/// control number and one title field with blank indicators.
#[allow(dead_code)]
pub fn reference_record() -> Record {
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

/// A batch of distinct records with sequential control numbers.
#[allow(dead_code)]
pub fn batch(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let mut record = Record::new();
            record.leader = "00711nam  2200217   4500".to_string();
            record.append([
                Field::control("001", &format!("id-{i}")),
                Field::data("245", "  ").subfield('a', &format!("Title {i}")),
            ]);
            record
        })
        .collect()
}

/// Concatenated ISO 2709 wire bytes for a batch.
#[allow(dead_code)]
pub fn iso_bytes(records: &[Record]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for record in records {
        bytes.extend_from_slice(
            &record
                .as_format("iso2709")
                .expect("reference records encode cleanly"),
        );
    }
    bytes
}
