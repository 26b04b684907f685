#![no_main]

use wpan_frame::{Frame, FrameWithFcs, MAX_FRAME_LEN};

use libfuzzer_sys::{fuzz_target, Corpus};

fuzz_target!(|data: &[u8]| -> Corpus {
    if data.len() > MAX_FRAME_LEN {
        return Corpus::Reject;
    }

    if let Ok(frame) = Frame::new(data) {
        let info = frame.info();
        assert!(info.mac_header_len <= info.payload.start);
        assert!(info.payload.end <= data.len());
        let _ = frame.header_information_elements().count();
        let _ = frame.payload_information_elements().count();
        let _ = format!("{frame}");
    }

    if let Ok(frame) = Frame::new_received(data) {
        assert!(frame.payload().len() <= data.len());
        let _ = frame.mic();
    }

    let _ = FrameWithFcs::new(data);

    Corpus::Keep
});
