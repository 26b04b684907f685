use super::*;

/// Data frame, 2015, extended source and destination addresses, PAN ID
/// compression, ENC-MIC-32 with a 1-octet key index. No payload.
const SECURED_DATA: [u8; 29] = [
    0x49, 0xec, 0x05, // FCF, sequence number
    0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // destination
    0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11, // source
    0x0d, 0x78, 0x56, 0x34, 0x12, 0x02, // auxiliary security header
    0xa1, 0xa2, 0xa3, 0xa4, // MIC
];

#[test]
fn parse_minimal_secured_frame() {
    let frame = Frame::new(&SECURED_DATA[..]).unwrap();

    check!(
        frame.frame_control().frame_type => FrameType::Data,
        frame.frame_control().security_enabled => true,
        frame.frame_control().frame_version => FrameVersion::Ieee802154_2015,
        frame.dst_pan_id() => None,
        frame.src_pan_id() => None,
        frame.dst_address() => Address::Extended([0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]),
        frame.src_address() => Address::Extended([0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18]),
        frame.frame_counter() => Some(0x1234_5678),
        frame.key_id() => &[0x02][..],
        frame.key_index() => Some(0x02),
        frame.key_source().is_empty() => true,
        frame.mic() => &[0xa1, 0xa2, 0xa3, 0xa4][..],
        frame.info().mac_header_len => 25,
        frame.payload().is_empty() => true,
    );

    let security = frame.security().unwrap();
    check!(
        security.level => SecurityLevel::EncMic32,
        security.key_id_mode => KeyIdMode::Index,
        security.header_len() => 6,
        security.mic_len() => 4,
    );
}

#[test]
fn one_octet_short_is_malformed() {
    assert_eq!(Frame::new(&SECURED_DATA[..28]).err(), Some(Error));
    assert_truncations_rejected(&SECURED_DATA, SECURED_DATA.len());
}

#[test]
fn payload_sits_between_header_and_mic() {
    let mut buffer = [0u8; 32];
    buffer[..25].copy_from_slice(&SECURED_DATA[..25]);
    buffer[25..28].copy_from_slice(&[0xc1, 0xc2, 0xc3]);
    buffer[28..].copy_from_slice(&SECURED_DATA[25..]);

    let mut frame = Frame::new(&mut buffer[..]).unwrap();
    assert_eq!(frame.payload(), &[0xc1, 0xc2, 0xc3]);
    assert_eq!(frame.header(), &SECURED_DATA[..25]);

    frame.set_frame_counter(0xdead_beef).unwrap();
    assert_eq!(frame.frame_counter(), Some(0xdead_beef));

    let (header, payload, mic) = frame.split_mut();
    check!(
        header.len() => 25,
        payload.len() => 3,
        mic.len() => 4,
        header[20..24] => [0xef, 0xbe, 0xad, 0xde],
    );
}

#[test]
fn suppressed_frame_counter() {
    // The same frame with the frame counter suppression bit set.
    let mut buffer = [0u8; 25];
    buffer[..19].copy_from_slice(&SECURED_DATA[..19]);
    buffer[19..21].copy_from_slice(&[0x2d, 0x02]);
    buffer[21..].copy_from_slice(&SECURED_DATA[25..]);

    let mut frame = Frame::new(&mut buffer[..]).unwrap();
    check!(
        frame.frame_counter() => None,
        frame.key_index() => Some(0x02),
        frame.info().mac_header_len => 21,
    );
    assert!(frame.set_frame_counter(1).is_err());
}

#[test]
fn received_encrypted_payload_ies_are_opaque() {
    let frame = [
        0x49, 0xee, 0x05, // FCF (IE present), sequence number
        0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // destination
        0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11, // source
        0x0d, 0x78, 0x56, 0x34, 0x12, 0x02, // auxiliary security header
        0x00, 0x3f, // HT1
        0x12, 0x34, 0x56, // encrypted payload IEs
        0xa1, 0xa2, 0xa3, 0xa4, // MIC
    ];

    // As plaintext, the ciphertext does not decode as payload IEs.
    assert!(Frame::new(&frame[..]).is_err());

    let frame = Frame::new_received(&frame[..]).unwrap();
    check!(
        frame.info().payload_ies_present => true,
        frame.info().mac_header_len => 27,
        frame.payload() => &[0x12, 0x34, 0x56][..],
        frame.mic() => &[0xa1, 0xa2, 0xa3, 0xa4][..],
    );
    assert_eq!(frame.payload_information_elements().count(), 0);
}

#[test]
fn mic_only_payload_ies_are_walked_when_received() {
    let frame = [
        0x49, 0xee, 0x05, // FCF (IE present), sequence number
        0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // destination
        0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11, // source
        0x09, 0x78, 0x56, 0x34, 0x12, 0x02, // MIC-32, key index
        0x00, 0x3f, // HT1
        0x01, 0x88, 0x55, // MLME
        0xa1, 0xa2, 0xa3, 0xa4, // MIC
    ];
    let frame = Frame::new_received(&frame[..]).unwrap();
    assert_eq!(frame.payload_information_elements().count(), 1);
}

/// Data request command, 2006, short destination, extended source,
/// ENC-MIC-32 with a 1-octet key index.
const SECURED_DATA_REQUEST: [u8; 28] = [
    0x6b, 0xd8, 0x10, // FCF, sequence number
    0xcd, 0xab, 0x00, 0x00, // destination PAN ID and address
    0xc7, 0xd9, 0xb5, 0x14, 0x00, 0x4b, 0x12, 0x00, // source
    0x0d, 0x01, 0x00, 0x00, 0x00, 0x01, // auxiliary security header
    0x04, // command id
    0x5a, 0x5b, // encrypted payload
    0xb1, 0xb2, 0xb3, 0xb4, // MIC
];

#[test]
fn received_secured_command_keeps_command_id_open() {
    let frame = Frame::new_received(&SECURED_DATA_REQUEST[..]).unwrap();

    check!(
        frame.frame_control().frame_type => FrameType::MacCommand,
        frame.security().map(|s| s.level) => Some(SecurityLevel::EncMic32),
        frame.command_id() => Some(0x04),
        frame.info().mac_header_len => 22,
        frame.header() => &SECURED_DATA_REQUEST[..22],
        frame.payload() => &[0x5a, 0x5b][..],
        frame.mic() => &[0xb1, 0xb2, 0xb3, 0xb4][..],
    );

    // The command id may not be taken from the MIC.
    assert!(Frame::new_received(&SECURED_DATA_REQUEST[..25]).is_err());
}
