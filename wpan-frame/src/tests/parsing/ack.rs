use super::*;

#[test]
fn parse_imm_ack() {
    let frame = [0x02, 0x10, 0x01];
    let frame = Frame::new(&frame[..]).unwrap();

    check!(
        frame.frame_control().frame_type => FrameType::Ack,
        frame.frame_control().security_enabled => false,
        frame.frame_control().frame_pending => false,
        frame.frame_control().ack_request => false,
        frame.frame_control().pan_id_compression => false,
        frame.frame_control().dst_addressing_mode => AddressingMode::Absent,
        frame.frame_control().frame_version => FrameVersion::Ieee802154_2006,
        frame.frame_control().src_addressing_mode => AddressingMode::Absent,
        frame.sequence_number() => Some(1),
        frame.dst_pan_id() => None,
        frame.dst_address() => Address::Absent,
        frame.header() => &[0x02, 0x10, 0x01][..],
        frame.payload().is_empty() => true,
    );
}

#[test]
fn parse_enhanced_ack() {
    let frame = [
        0x02, 0x2e, 0x37, 0xcd, 0xab, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x0f,
        0xe1, 0x8f,
    ];
    let frame = Frame::new(&frame[..]).unwrap();

    check!(
        frame.frame_control().frame_type => FrameType::Ack,
        frame.frame_control().information_elements_present => true,
        frame.frame_control().frame_version => FrameVersion::Ieee802154_2015,
        frame.sequence_number() => Some(55),
        frame.dst_pan_id() => Some(0xabcd),
        frame.dst_address() => Address::Extended([0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02]),
        frame.src_pan_id() => None,
        frame.src_address() => Address::Absent,
        frame.security() => None,
        frame.info().mac_header_len => 17,
        frame.payload().is_empty() => true,
    );

    let mut headers = frame.header_information_elements();
    let ie = headers.next().unwrap();
    check!(
        ie.element_id() => HeaderElementId::TimeCorrection,
        ie.len() => 2,
    );
    let tc = TimeCorrection::new(ie.content()).unwrap();
    check!(
        tc.time_correction_us() => -31,
        tc.nack() => true,
    );
    assert!(headers.next().is_none());

    assert_eq!(
        frame.header_ie(HeaderElementId::TimeCorrection),
        Some(&[0xe1, 0x8f][..])
    );
    assert_eq!(frame.header_ie(HeaderElementId::Csl), None);
}

#[test]
fn enhanced_ack_truncated() {
    let frame = [
        0x02, 0x2e, 0x37, 0xcd, 0xab, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x0f,
        0xe1, 0x8f,
    ];
    // Cutting the frame inside the addressing fields or inside the IE is
    // rejected. Cutting it right after the addressing fields is not: the
    // frame simply carries no IE.
    assert_truncations_rejected(&frame, 13);
    assert!(Frame::new(&frame[..13]).is_ok());
    for len in 14..frame.len() {
        assert!(Frame::new(&frame[..len]).is_err());
    }
}
