//! Golden-output tests: every codec checked against the worked reference
//! record, byte for byte.

mod common;

use common::reference_record;
use marcio::{Field, MarcError, Record};

const REFERENCE_WIRE: &str = "00087nam  2200049   4500001000500000245003200005\x1e1234\x1e  \x1faMy life :\x1fblong story short\x1e\x1d";

#[test]
fn test_iso2709_reference_wire() {
    let wire = marcio::format(&reference_record(), "iso2709").expect("encodes");
    assert_eq!(wire.len(), 87);
    assert_eq!(wire, REFERENCE_WIRE.as_bytes());
}

#[test]
fn test_iso2709_substitutes_template_for_short_leader() {
    let mut record = reference_record();
    record.leader = String::new();

    let wire = marcio::format(&record, "iso2709").expect("encodes");
    assert_eq!(&wire[..24], b"00087nam  22000491  4500");
    // Same directory and payloads as the reference wire.
    assert_eq!(&wire[24..], &REFERENCE_WIRE.as_bytes()[24..]);
}

#[test]
fn test_iso2709_reference_wire_parses_back() {
    let record = marcio::parse(REFERENCE_WIRE.as_bytes(), "iso2709").expect("parses");

    assert_eq!(record.leader, "00087nam  2200049   4500");
    assert_eq!(record.fields.len(), 2);
    assert_eq!(record.fields[0].value(), Some("1234"));
    assert_eq!(record.fields[1].indicators(), Some((' ', ' ')));
    assert_eq!(record.fields[1].get_subfield('a'), Some("My life :"));
    assert_eq!(record.fields[1].get_subfield('b'), Some("long story short"));
}

#[test]
fn test_marcxml_reference_document() {
    let xml = marcio::format(&reference_record(), "marcxml").expect("encodes");
    assert_eq!(
        String::from_utf8(xml).expect("utf-8"),
        "<record><leader>00711nam  2200217   4500</leader>\
         <controlfield tag=\"001\">1234</controlfield>\
         <datafield tag=\"245\" ind1=\" \" ind2=\" \">\
         <subfield code=\"a\">My life :</subfield>\
         <subfield code=\"b\">long story short</subfield>\
         </datafield></record>"
    );
}

#[test]
fn test_mij_reference_document() {
    let mij = marcio::format(&reference_record(), "mij").expect("encodes");
    assert_eq!(
        String::from_utf8(mij).expect("utf-8"),
        "{\"leader\":\"00711nam  2200217   4500\",\"fields\":[\
         {\"001\":\"1234\"},\
         {\"245\":{\"subfields\":[{\"a\":\"My life :\"},{\"b\":\"long story short\"}],\
         \"ind1\":\" \",\"ind2\":\" \"}}]}"
    );
}

#[test]
fn test_text_reference_rendering() {
    let text = marcio::format(&reference_record(), "text").expect("encodes");
    assert_eq!(
        String::from_utf8(text).expect("utf-8"),
        "00711nam  2200217   4500\n001 1234\n245    $a My life : $b long story short"
    );
}

#[test]
fn test_json_debug_reference_rendering() {
    let json = marcio::format(&reference_record(), "json").expect("encodes");
    assert_eq!(
        String::from_utf8(json).expect("utf-8"),
        "{\"leader\":\"00711nam  2200217   4500\",\"fields\":[\
         [\"001\",\"1234\"],\
         [\"245\",\"  \",\"a\",\"My life :\",\"b\",\"long story short\"]]}"
    );
}

#[test]
fn test_marcxml_round_trip_preserves_record() {
    let original = reference_record();
    let xml = marcio::format(&original, "marcxml").expect("encodes");
    let decoded = marcio::parse(&xml, "marcxml").expect("parses");
    assert_eq!(decoded, original);
}

#[test]
fn test_mij_round_trip_preserves_record() {
    let original = reference_record();
    let mij = marcio::format(&original, "mij").expect("encodes");
    let decoded = marcio::parse(&mij, "mij").expect("parses");
    assert_eq!(decoded, original);
}

#[test]
fn test_iso2709_round_trip_preserves_fields() {
    let original = reference_record();
    let wire = marcio::format(&original, "iso2709").expect("encodes");
    let decoded = marcio::parse(&wire, "iso2709").expect("parses");

    // The leader's length digits are rewritten on encode; field content
    // survives unchanged.
    assert_eq!(decoded.fields, original.fields);
    assert_eq!(&decoded.leader[5..12], &original.leader[5..12]);
}

#[test]
fn test_iso2709_multibyte_values_round_trip() {
    let mut record = Record::new();
    record.append([
        Field::control("001", "utf8"),
        Field::data("245", "  ").subfield('a', "café au lait"),
    ]);

    let wire = marcio::format(&record, "iso2709").expect("encodes");
    let decoded = marcio::parse(&wire, "iso2709").expect("parses");
    assert_eq!(decoded.fields[1].get_subfield('a'), Some("café au lait"));
}

#[test]
fn test_selectors_are_case_insensitive() {
    let record = reference_record();
    for name in ["ISO2709", "MarcXML", "MIJ", "Text", "JSON"] {
        assert!(marcio::format(&record, name).is_ok(), "selector {name}");
    }
}

#[test]
fn test_unknown_format_error_message() {
    let err = marcio::format(&reference_record(), "tsv").expect_err("unknown");
    assert_eq!(err.to_string(), "Unknown MARC format: tsv");
}

#[test]
fn test_write_only_formats_reject_parsing() {
    for name in ["text", "json"] {
        assert!(matches!(
            marcio::parse(b"irrelevant", name),
            Err(MarcError::UnknownFormat(_))
        ));
    }
}
