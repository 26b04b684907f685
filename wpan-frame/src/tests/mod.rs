use crate::*;

macro_rules! check {
    ($($actual:expr => $expected:expr),* $(,)?) => {
        $(assert_eq!($actual, $expected, stringify!($actual));)*
    };
}

mod parsing;

/// Every prefix of a valid frame, shorter than `min_len`, must be rejected.
fn assert_truncations_rejected(frame: &[u8], min_len: usize) {
    for len in 0..min_len {
        assert!(
            Frame::new(&frame[..len]).is_err(),
            "frame of {len} octets accepted"
        );
        assert!(Frame::new_received(&frame[..len]).is_err());
    }
}

#[test]
fn frame_length_bounds() {
    assert!(Frame::new(&[][..]).is_err());
    assert!(Frame::new(&[0x02][..]).is_err());

    // A 2015 immediate ACK with a suppressed sequence number is 2 octets.
    let frame = Frame::new(&[0x02, 0x21][..]).unwrap();
    check!(
        frame.frame_control().frame_type => FrameType::Ack,
        frame.sequence_number() => None,
        frame.payload().is_empty() => true,
    );

    let mut frame = [0u8; MAX_FRAME_LEN + 1];
    frame[..3].copy_from_slice(&[0x01, 0x10, 0x01]);
    assert!(Frame::new(&frame[..]).is_err());
    assert!(Frame::new(&frame[..MAX_FRAME_LEN]).is_ok());
}

#[test]
fn unsupported_frame_types() {
    // Reserved, Multipurpose, Fragment, Extended.
    for frame_type in [0b100u8, 0b101, 0b110, 0b111] {
        let frame = [frame_type, 0x10, 0x01];
        assert!(Frame::new(&frame[..]).is_err());
    }
}

#[test]
fn reserved_addressing_mode() {
    // Data frame, destination addressing mode 0b01.
    assert!(Frame::new(&[0x01, 0x14, 0x01, 0x00, 0x00][..]).is_err());
}

#[test]
fn security_on_2003_frames() {
    assert!(Frame::new(&[0x09, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00][..]).is_err());
}

#[test]
fn display() {
    let frame = hex::decode("41d801cdabffffc7d9b514004b12002b000000").unwrap();
    let frame = Frame::new(&frame[..]).unwrap();
    assert_eq!(
        format!("{frame}"),
        "Data (Ieee802154_2006) seq 1 dst-pan abcd dst ff:ff src 00:12:4b:00:14:b5:d9:c7"
    );
}
