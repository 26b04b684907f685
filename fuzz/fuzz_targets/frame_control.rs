#![no_main]

use wpan_frame::{FrameControl, FrameControlRepr};

use libfuzzer_sys::fuzz_target;

fuzz_target!(|repr: FrameControlRepr| {
    let mut buffer = [0u8; 2];
    if repr.emit(&mut buffer).is_err() {
        return;
    }

    let fc = FrameControl::new(&buffer[..]).unwrap();
    assert_eq!(FrameControlRepr::parse(&fc).unwrap(), repr);
});
