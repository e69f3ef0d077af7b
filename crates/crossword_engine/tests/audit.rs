use std::fs;

use crossword_engine::{ConversionAudit, ConversionRecord, TextSanitizer};
use tempfile::TempDir;

#[test]
fn flushing_nothing_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("encoding-conversions.log");
    let mut audit = ConversionAudit::new();

    assert!(!audit.flush(&log_path).unwrap());
    assert!(!log_path.exists());
}

#[test]
fn flush_writes_a_block_then_empties_the_accumulator() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("encoding-conversions.log");
    let mut audit = ConversionAudit::new();
    TextSanitizer::default().sanitize(Some("Party 🎉"), "notes Mini", &mut audit);
    assert_eq!(audit.len(), 1);

    assert!(audit.flush(&log_path).unwrap());
    assert!(audit.is_empty());
    let first = fs::read_to_string(&log_path).unwrap();
    assert!(first.starts_with("\n=== Conversion Log ["));
    assert!(first.contains("] ===\n"));
    assert!(first.contains("  [notes Mini] \"Party 🎉\" → \"Party :"));

    // Second flush has nothing new to say.
    assert!(!audit.flush(&log_path).unwrap());
    assert_eq!(fs::read_to_string(&log_path).unwrap(), first);
}

#[test]
fn repeated_flushes_append_separate_blocks() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("encoding-conversions.log");
    let mut audit = ConversionAudit::new();

    audit.record(ConversionRecord {
        original: "a\u{a0}".into(),
        sanitized: "a".into(),
        context: "clue 1".into(),
    });
    audit.flush(&log_path).unwrap();
    audit.record(ConversionRecord {
        original: "b\u{a0}".into(),
        sanitized: "b".into(),
        context: "clue 2".into(),
    });
    audit.flush(&log_path).unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    assert_eq!(content.matches("=== Conversion Log [").count(), 2);
    assert_eq!(content.matches("[clue 1]").count(), 1);
    assert_eq!(content.matches("[clue 2]").count(), 1);
    assert!(content.find("[clue 1]").unwrap() < content.find("[clue 2]").unwrap());
}

#[test]
fn failed_flush_keeps_records() {
    let temp = TempDir::new().unwrap();
    let missing_dir_log = temp.path().join("missing").join("encoding-conversions.log");
    let mut audit = ConversionAudit::new();
    audit.record(ConversionRecord {
        original: "x ".into(),
        sanitized: "x".into(),
        context: "notes".into(),
    });

    assert!(audit.flush(&missing_dir_log).is_err());
    assert_eq!(audit.len(), 1);
}
