//! Fuzz target: `FrameParser::feed`
//!
//! Splits arbitrary bytes into chunks at fuzzer-chosen points and drives
//! them through the streaming field parser in both carry-over and legacy
//! mode.  The parser must never panic, never yield a non-finite value, and
//! never hold more than `MAX_PENDING_FIELD` bytes between reads.
//!
//! cargo fuzz run fuzz_frame_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use tiltdrive::config::ParserConfig;
use tiltdrive::telemetry::parser::{FrameParser, MAX_PENDING_FIELD};

fuzz_target!(|data: &[u8]| {
    let Some((&cut_seed, body)) = data.split_first() else {
        return;
    };

    for carry in [true, false] {
        let mut parser = FrameParser::new(ParserConfig {
            carry_partial_fields: carry,
            suppress_zero_readings: true,
        });

        let step = usize::from(cut_seed).max(1);
        for chunk in body.chunks(step) {
            for sample in parser.feed(chunk) {
                assert!(sample.value.is_finite());
                assert!(sample.value != 0.0, "zero readings are suppressed");
            }
            assert!(parser.pending_len() <= MAX_PENDING_FIELD);
            if !carry {
                assert_eq!(parser.pending_len(), 0);
            }
        }

        let stats = parser.stats();
        assert_eq!(stats.fields, stats.samples + stats.skipped + stats.zero_suppressed);
    }
});
