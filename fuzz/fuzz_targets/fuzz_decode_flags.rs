#![no_main]
use chargeguard::events::{EventCode, decode_flags};
use chargeguard::registers::{FIELDS, STATUS_FIELDS, decode_with, encode_with};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First six bytes are a flag snapshot
    if data.len() >= 6 {
        let mut flags = [0u8; 6];
        flags.copy_from_slice(&data[..6]);
        let events = decode_flags(&flags);
        assert!(!events.is_empty());
        if flags.iter().all(|b| *b == 0) {
            assert!(events.contains(EventCode::UnknownInterrupt));
        }
    }

    // Remaining bytes drive the codec in (index, value) triples
    for chunk in data.get(6..).unwrap_or_default().chunks_exact(3) {
        let register_value = u16::from_be_bytes([chunk[1], chunk[2]]);
        let idx = chunk[0] as usize;
        if let Some(d) = FIELDS.get(idx % FIELDS.len()) {
            let physical = decode_with(d, register_value);
            let encoded = encode_with(d, physical);
            assert_eq!(encoded.raw_bits, register_value & d.mask());
        }
        if let Some(d) = STATUS_FIELDS.get(idx % STATUS_FIELDS.len()) {
            let _ = decode_with(d, register_value);
        }
    }
});
