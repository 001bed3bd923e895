use commitlog::{Config, Log, Record};
use proptest::collection::vec as pvec;
use proptest::prelude::*;
use tempfile::TempDir;

fn arbitrary_payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    pvec(pvec(any::<u8>(), 0..64), 1..32)
}

proptest! {
    /// Invariants 1, 2 and 3 from the testable-properties section: offsets are
    /// contiguous from the log's base, every write round-trips through read,
    /// and the lowest/highest bounds track exactly what's retained.
    #[test]
    fn append_sequences_round_trip(payloads in arbitrary_payloads()) {
        let dir = TempDir::new().unwrap();
        let log = Log::open(dir.path(), Config::default()).unwrap();

        let mut offsets = Vec::with_capacity(payloads.len());
        for payload in &payloads {
            let record = Record {
                offset: 0,
                timestamp: Vec::new(),
                payload: payload.clone(),
            };
            offsets.push(log.write(record).unwrap());
        }

        let expected: Vec<u64> = (0..payloads.len() as u64).collect();
        prop_assert_eq!(&offsets, &expected);

        for (offset, payload) in offsets.iter().zip(payloads.iter()) {
            let got = log.read(*offset).unwrap();
            prop_assert_eq!(got.offset, *offset);
            prop_assert_eq!(&got.payload, payload);
        }

        prop_assert_eq!(log.read_lowest_offset(), 0);
        prop_assert_eq!(log.read_highest_offset(), payloads.len() as u64 - 1);
    }
}
