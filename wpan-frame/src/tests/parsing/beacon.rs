use super::*;

const ENHANCED_BEACON: [u8; 35] = [
    0x40, 0xeb, 0xcd, 0xab, 0xff, 0xff, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
    0x3f, 0x11, 0x88, 0x06, 0x1a, 0x0e, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x1c, 0x00, 0x01,
    0xc8, 0x00, 0x01, 0x1b, 0x00,
];

#[test]
fn parse_enhanced_beacon() {
    let frame = Frame::new(&ENHANCED_BEACON[..]).unwrap();

    check!(
        frame.frame_control().frame_type => FrameType::Beacon,
        frame.frame_control().pan_id_compression => true,
        frame.frame_control().sequence_number_suppression => true,
        frame.frame_control().information_elements_present => true,
        frame.frame_control().dst_addressing_mode => AddressingMode::Short,
        frame.frame_control().src_addressing_mode => AddressingMode::Extended,
        frame.sequence_number() => None,
        frame.dst_pan_id() => Some(0xabcd),
        frame.dst_address() => Address::BROADCAST,
        frame.src_pan_id() => None,
        frame.src_address() => Address::Extended([0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01]),
        frame.info().payload_ies_present => true,
        frame.info().mac_header_len => 16,
        frame.payload().len() => 19,
    );

    assert_eq!(frame.header_information_elements().count(), 0);

    let mut payloads = frame.payload_information_elements();
    let ie = payloads.next().unwrap();
    check!(
        ie.group_id() => PayloadGroupId::Mlme,
        ie.len() => 17,
        ie.content()[..2] => [0x06, 0x1a],
    );
    assert!(payloads.next().is_none());
}

#[test]
fn payload_ie_longer_than_frame() {
    let mut frame = ENHANCED_BEACON;
    // Announce 18 octets of MLME content, 17 are available.
    frame[16] = 0x12;
    assert!(Frame::new(&frame[..]).is_err());
}

#[test]
fn beacon_with_fcs() {
    let frame = [
        0x40, 0xeb, 0xcd, 0xab, 0xff, 0xff, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
        0x3f, 0x32, 0x88, 0x06, 0x1a, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x19, 0x1c, 0x01, 0x08,
        0x07, 0x80, 0x00, 0x48, 0x08, 0xfc, 0x03, 0x20, 0x03, 0xe8, 0x03, 0x98, 0x08, 0x90, 0x01,
        0xc0, 0x00, 0x60, 0x09, 0xa0, 0x10, 0x10, 0x27, 0x01, 0xc8, 0x00, 0x0a, 0x1b, 0x01, 0x00,
        0x11, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x07, 0x12, 0x16,
    ];
    let frame = FrameWithFcs::new(&frame[..]).unwrap();
    let frame = frame.frame().unwrap();

    let ie = frame.payload_information_elements().next().unwrap();
    check!(
        ie.group_id() => PayloadGroupId::Mlme,
        ie.len() => 50,
    );
}
