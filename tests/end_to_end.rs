use commitlog::{Config, Log, ReadError, Record};
use tempfile::TempDir;

fn record(payload: &[u8]) -> Record {
    Record {
        offset: 0,
        timestamp: Vec::new(),
        payload: payload.to_vec(),
    }
}

#[test]
fn single_append_and_read() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), Config::default()).unwrap();

    let offset = log.write(record(br#"{"test": true}"#)).unwrap();
    assert_eq!(offset, 0);

    let got = log.read(0).unwrap();
    assert_eq!(got.offset, 0);
    assert_eq!(got.payload, br#"{"test": true}"#);
}

#[test]
fn produce_and_consume_three_records() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), Config::default()).unwrap();

    let payloads: Vec<&[u8]> = vec![b"alpha", b"beta", b"gamma"];
    let offsets: Vec<u64> = payloads
        .iter()
        .map(|p| log.write(record(p)).unwrap())
        .collect();
    assert_eq!(offsets, vec![0, 1, 2]);

    for (offset, payload) in offsets.iter().zip(payloads.iter()) {
        let got = log.read(*offset).unwrap();
        assert_eq!(got.offset, *offset);
        assert_eq!(&got.payload, payload);
    }
}

#[test]
fn out_of_range_read_on_empty_log() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), Config::default()).unwrap();
    match log.read(100) {
        Err(ReadError::OffsetOutOfRange { offset }) => assert_eq!(offset, 100),
        other => panic!("expected offset-out-of-range, got {other:?}"),
    }
}

fn rollover_config() -> Config {
    Config {
        max_store_bytes: 32,
        max_index_bytes: 1024,
        initial_offset: 0,
    }
}

#[test]
fn segment_rolls_over_when_store_cap_is_reached() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), rollover_config()).unwrap();

    // Each frame is 8 (length prefix) + 12 (record header) + 16 (payload) = 36 bytes,
    // already past the 32-byte store cap on its own, so every append maxes its segment.
    for _ in 0..3 {
        log.write(record(&[7u8; 16])).unwrap();
    }

    assert_eq!(log.read_lowest_offset(), 0);
    assert_eq!(log.read_highest_offset(), 2);
    for suffix in ["store", "index"] {
        assert!(dir.path().join(format!("0.{suffix}")).exists());
        assert!(dir.path().join(format!("2.{suffix}")).exists());
    }
}

#[test]
fn recovers_from_an_existing_directory() {
    let dir = TempDir::new().unwrap();
    {
        let log = Log::open(dir.path(), rollover_config()).unwrap();
        for _ in 0..3 {
            log.write(record(&[7u8; 16])).unwrap();
        }
        log.close().unwrap();
    }

    let log = Log::open(dir.path(), rollover_config()).unwrap();
    assert_eq!(log.read_lowest_offset(), 0);
    assert_eq!(log.read_highest_offset(), 2);
    for offset in 0..3 {
        assert_eq!(log.read(offset).unwrap().payload, vec![7u8; 16]);
    }
}

#[test]
fn truncate_lowest_removes_fully_covered_segments() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), rollover_config()).unwrap();
    for _ in 0..3 {
        log.write(record(&[7u8; 16])).unwrap();
    }

    log.truncate_lowest(1).unwrap();
    match log.read(0) {
        Err(ReadError::OffsetOutOfRange { offset }) => assert_eq!(offset, 0),
        other => panic!("expected offset-out-of-range, got {other:?}"),
    }
    assert!(log.read(2).is_ok());
}

#[test]
fn reset_produces_an_empty_log_in_the_same_directory() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), Config::default()).unwrap();
    log.write(record(b"gone")).unwrap();

    let log = log.reset().unwrap();
    assert_eq!(log.read_highest_offset(), 0);
    match log.read(0) {
        Err(ReadError::OffsetOutOfRange { .. }) => {}
        other => panic!("expected empty log after reset, got {other:?}"),
    }
}
