use super::*;

const DATA_REQUEST: [u8; 16] = [
    0x63, 0xd8, 0x10, 0xcd, 0xab, 0x00, 0x00, 0xc7, 0xd9, 0xb5, 0x14, 0x00, 0x4b, 0x12, 0x00,
    0x04,
];

#[test]
fn parse_data_request() {
    let frame = Frame::new(&DATA_REQUEST[..]).unwrap();

    check!(
        frame.frame_control().frame_type => FrameType::MacCommand,
        frame.frame_control().ack_request => true,
        frame.dst_address() => Address::Short([0x00, 0x00]),
        frame.command_id() => Some(0x04),
        frame.info().mac_header_len => 16,
        frame.header() => &DATA_REQUEST[..],
        frame.payload().is_empty() => true,
    );
}

#[test]
fn command_id_is_required() {
    assert_truncations_rejected(&DATA_REQUEST, DATA_REQUEST.len());
}

#[test]
fn command_id_after_payload_ies() {
    // 2015 command frame: HT1, an MLME payload IE, payload termination,
    // command id.
    let frame = [
        0x03, 0x2a, 0x01, 0xcd, 0xab, 0x34, 0x12, 0x00, 0x3f, 0x01, 0x88, 0x55, 0x00, 0xf8, 0x04,
    ];
    let frame = Frame::new(&frame[..]).unwrap();
    check!(
        frame.info().payload_ies_present => true,
        frame.info().mac_header_len => 9,
        frame.command_id() => Some(0x04),
        frame.payload() => &[0x01, 0x88, 0x55, 0x00, 0xf8, 0x04][..],
    );
}
