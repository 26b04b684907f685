#![no_main]

use arbitrary::Arbitrary;
use wpan_ahi::ahi::{completeness, Assembler, Completeness, Event, Message, ResponseToken};
use wpan_ahi::time::Instant;

use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    garbage: &'a [u8],
    token: ResponseToken,
    payload: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let mut assembler = Assembler::new();

    for byte in input.garbage {
        if let Some(message) = assembler.push(*byte) {
            assert_eq!(completeness(message.as_bytes()), Completeness::Valid);
            let _ = Event::parse(&message, true, Instant::default());
        }
    }

    // A valid message is always recovered once the garbage is flushed out.
    let mut message = Message::new(input.token);
    if message.push_bytes(input.payload).is_err() {
        return;
    }

    assembler.clear();
    let mut assembled = None;
    for byte in message.as_bytes() {
        assembled = assembler.push(*byte);
    }
    assert_eq!(assembled, Some(message));
});
