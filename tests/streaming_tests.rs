//! End-to-end streaming tests: chunking independence, framing, flow
//! control, and the threaded pipeline.

mod common;

use common::{batch, iso_bytes};
use marcio::{
    convert, convert_with, Field, MarcReader, MarcWriter, Parser, PipelineConfig, Record,
    RecordPipeline,
};
use serde_json::Value;
use std::io::Cursor;

fn decode_all(wire: &[u8], format: &str, chunk_size: usize) -> Vec<Record> {
    let mut parser = Parser::new(format).expect("parseable format");
    let mut decoded = Vec::new();
    for piece in wire.chunks(chunk_size) {
        parser.push(piece);
        while let Some(record) = parser.next_record().expect("clean input") {
            decoded.push(record);
        }
    }
    parser.finish();
    while let Some(record) = parser.next_record().expect("clean input") {
        decoded.push(record);
    }
    decoded
}

#[test]
fn test_iso2709_chunk_size_never_changes_decoded_records() {
    let wire = iso_bytes(&batch(5));
    let whole = decode_all(&wire, "iso2709", wire.len());

    assert_eq!(whole.len(), 5);
    for chunk_size in [1, 2, 3, 7, 64, 1024] {
        assert_eq!(decode_all(&wire, "iso2709", chunk_size), whole);
    }
}

#[test]
fn test_marcxml_chunk_size_never_changes_decoded_records() {
    let mut writer = MarcWriter::new(Vec::new(), "marcxml").expect("known format");
    writer.write_batch(&batch(4)).expect("writes");
    writer.finish().expect("finishes");
    let doc = writer.into_inner();

    let whole = decode_all(&doc, "marcxml", doc.len());
    assert_eq!(whole.len(), 4);
    for chunk_size in [1, 5, 13, 100] {
        assert_eq!(decode_all(&doc, "marcxml", chunk_size), whole);
    }
}

#[test]
fn test_writer_reader_round_trip_per_format() {
    for format in ["iso2709", "marcxml", "mij"] {
        let mut writer = MarcWriter::new(Vec::new(), format).expect("known format");
        writer.write_batch(&batch(3)).expect("writes");
        writer.finish().expect("finishes");

        let bytes = writer.into_inner();
        let mut reader = MarcReader::new(Cursor::new(bytes), format).expect("known format");
        let records = reader.read_all().expect("reads back");

        assert_eq!(records.len(), 3, "format {format}");
        assert_eq!(records[2].fields[0].value(), Some("id-2"), "format {format}");
    }
}

#[test]
fn test_parser_queue_stays_bounded_while_draining() {
    let wire = iso_bytes(&batch(50));
    let mut parser = Parser::with_high_water_mark("iso2709", 2).expect("known format");
    parser.push(&wire);
    parser.finish();

    assert!(!parser.is_ready());
    let mut count = 0;
    loop {
        assert!(parser.queued() <= 3);
        match parser.next_record().expect("clean wire") {
            Some(_) => count += 1,
            None => break,
        }
    }
    assert_eq!(count, 50);
    assert!(parser.is_done());
}

#[test]
fn test_trailing_partial_input_is_discarded_at_eof() {
    let mut data = iso_bytes(&batch(2));
    data.extend_from_slice(b"00231nam");

    let mut reader = MarcReader::new(Cursor::new(data), "iso2709").expect("known format");
    assert_eq!(reader.read_all().expect("clean records").len(), 2);
}

#[test]
fn test_pipeline_reads_file_in_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("batch.mrc");
    {
        let file = std::fs::File::create(&path).expect("create file");
        let mut writer = MarcWriter::new(file, "iso2709").expect("known format");
        writer.write_batch(&batch(10)).expect("writes");
        writer.finish().expect("finishes");
    }

    let pipeline = RecordPipeline::from_path(&path, "iso2709", &PipelineConfig::default())
        .expect("pipeline spawns");
    let ids: Vec<String> = pipeline
        .into_iter()
        .map(|result| {
            result.expect("clean record").fields[0]
                .value()
                .expect("control number")
                .to_string()
        })
        .collect();

    let expected: Vec<String> = (0..10).map(|i| format!("id-{i}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_convert_produces_valid_mij_array() {
    let data = iso_bytes(&batch(3));
    let mut out = Vec::new();
    let count = convert(Cursor::new(data), &mut out, "iso2709", "mij").expect("converts");
    assert_eq!(count, 3);

    let value: Value = serde_json::from_slice(&out).expect("well-formed JSON");
    let array = value.as_array().expect("array framing");
    assert_eq!(array.len(), 3);
    assert!(array.iter().all(|record| record.get("fields").is_some()));
}

#[test]
fn test_convert_with_rewrites_every_record() {
    let data = iso_bytes(&batch(3));
    let mut out = Vec::new();
    let count = convert_with(Cursor::new(data), &mut out, "iso2709", "text", |record| {
        record.append([Field::control("003", "OSt")]);
    })
    .expect("converts");

    assert_eq!(count, 3);
    let text = String::from_utf8(out).expect("utf-8");
    assert_eq!(text.matches("003 OSt").count(), 3);
}

#[test]
fn test_convert_empty_input_still_frames_output() {
    let mut out = Vec::new();
    let count = convert(Cursor::new(Vec::new()), &mut out, "iso2709", "mij").expect("converts");
    assert_eq!(count, 0);
    assert_eq!(out, b"[]");

    let mut out = Vec::new();
    convert(Cursor::new(Vec::new()), &mut out, "iso2709", "marcxml").expect("converts");
    assert_eq!(
        String::from_utf8(out).expect("utf-8"),
        "<collection xmlns=\"http://www.loc.gov/MARC21/slim\"></collection>"
    );
}

#[test]
fn test_text_output_separates_records_with_blank_line() {
    let mut writer = MarcWriter::new(Vec::new(), "text").expect("known format");
    writer.write_batch(&batch(2)).expect("writes");
    writer.finish().expect("finishes");

    let text = String::from_utf8(writer.into_inner()).expect("utf-8");
    assert_eq!(text.matches("\n\n").count(), 1);
    assert!(text.ends_with("$a Title 1\n"));
}
