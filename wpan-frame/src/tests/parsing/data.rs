use super::*;

#[test]
fn parse_data_frame() {
    let frame = [
        0x41, 0xd8, 0x01, 0xcd, 0xab, 0xff, 0xff, 0xc7, 0xd9, 0xb5, 0x14, 0x00, 0x4b, 0x12, 0x00,
        0x2b, 0x00, 0x00, 0x00,
    ];
    let frame = Frame::new(&frame[..]).unwrap();

    check!(
        frame.frame_control().frame_type => FrameType::Data,
        frame.frame_control().pan_id_compression => true,
        frame.frame_control().frame_version => FrameVersion::Ieee802154_2006,
        frame.sequence_number() => Some(1),
        frame.dst_pan_id() => Some(0xabcd),
        frame.dst_address() => Address::BROADCAST,
        frame.src_pan_id() => None,
        frame.src_address() => Address::Extended([0x00, 0x12, 0x4b, 0x00, 0x14, 0xb5, 0xd9, 0xc7]),
        frame.frame_counter() => None,
        frame.key_id().is_empty() => true,
        frame.mic().is_empty() => true,
        frame.command_id() => None,
        frame.header().len() => 15,
        frame.payload() => &[0x2b, 0x00, 0x00, 0x00][..],
    );

    assert_truncations_rejected(&frame.as_bytes()[..], 15);
}

#[test]
fn ie_present_bit_ignored_before_2015() {
    // The same frame with the IE present bit set: the payload is not walked.
    let frame = [
        0x41, 0xda, 0x01, 0xcd, 0xab, 0xff, 0xff, 0xc7, 0xd9, 0xb5, 0x14, 0x00, 0x4b, 0x12, 0x00,
        0x2b, 0x00, 0x00, 0x00,
    ];
    let frame = Frame::new(&frame[..]).unwrap();
    assert_eq!(frame.header_information_elements().count(), 0);
    assert_eq!(frame.payload(), &[0x2b, 0x00, 0x00, 0x00]);
}

#[test]
fn parse_data_frame_with_header_ies() {
    let frame = [
        0x41, 0xaa, 0x01, 0xcd, 0xab, 0x34, 0x12, 0x78, 0x56, // MHR
        0x04, 0x0d, 0x10, 0x00, 0xc8, 0x00, // CSL
        0x80, 0x3f, // HT2
        0xde, 0xad,
    ];
    let frame = Frame::new(&frame[..]).unwrap();

    check!(
        frame.dst_pan_id() => Some(0xabcd),
        frame.src_pan_id() => None,
        frame.dst_address() => Address::Short([0x12, 0x34]),
        frame.src_address() => Address::Short([0x56, 0x78]),
        frame.info().payload_ies_present => false,
        frame.info().mac_header_len => 17,
        frame.payload() => &[0xde, 0xad][..],
    );

    let csl = Csl::new(frame.header_ie(HeaderElementId::Csl).unwrap()).unwrap();
    check!(
        csl.phase() => 0x10,
        csl.period() => 200,
        csl.rendezvous_time() => None,
    );
}

#[test]
fn frame_pending_bit() {
    let mut buffer = [0x01, 0x10, 0x01, 0xaa];
    FrameControl::new(&mut buffer[..]).unwrap().set_frame_pending(true);
    let frame = Frame::new(&buffer[..]).unwrap();
    assert!(frame.frame_control().frame_pending);
}
