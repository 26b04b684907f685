use wpan_cat::{Error, FrameParser, MessageParser};

use strip_ansi_escapes::strip;

fn plain(output: String) -> String {
    String::from_utf8(strip(output)).unwrap()
}

const BROADCAST_DATA: &str = "Frame Control
  frame type: Data
  security: 0
  frame pending: 0
  ack request: 0
  pan id compression: 1
  sequence number suppression: 0
  information elements present: 0
  dst addressing mode: Short
  src addressing mode: Short
  frame version: 0 (Ieee802154_2003)
Sequence Number
  sequence number: 1
Addressing
  dst pan id: abcd
  dst addr: ff:ff (broadcast)
  src addr: 00:02
";

#[test]
fn broadcast_data() {
    let output = plain(FrameParser::parse_hex("418801cdabffff0200").unwrap());
    assert_eq!(output, BROADCAST_DATA);
}

#[test]
fn secured_data() {
    let input = "49ec2a010203040506070888776655443322110d0000000001deadbeef010200000000";
    let output = plain(FrameParser::parse_hex(input).unwrap());
    assert_eq!(
        output,
        "Frame Control
  frame type: Data
  security: 1
  frame pending: 0
  ack request: 0
  pan id compression: 1
  sequence number suppression: 0
  information elements present: 0
  dst addressing mode: Extended
  src addressing mode: Extended
  frame version: 2 (Ieee802154_2015)
Sequence Number
  sequence number: 42
Addressing
  dst addr: 08:07:06:05:04:03:02:01
  src addr: 11:22:33:44:55:66:77:88
Auxiliary Security Header
  security level: EncMic32
  key id mode: Index
  frame counter: 0
  key index: 1
Payload
  deadbeef0102
MIC
  00000000
"
    );
}

#[test]
fn invalid_input() {
    assert!(matches!(FrameParser::parse_hex("41x8"), Err(Error::Hex(_))));
    assert!(matches!(FrameParser::parse_hex("4188"), Err(Error::Frame)));
    assert!(matches!(
        MessageParser::parse_hex("0700000000000001", false),
        Err(Error::Message(wpan_ahi::Error::InvalidMessage))
    ));
}

fn indented(text: &str, by: usize) -> String {
    text.lines()
        .map(|line| format!("{}{line}\n", " ".repeat(by)))
        .collect()
}

#[test]
fn frame_received() {
    let input = concat!(
        "1c000000000100",
        "09418801cdabffff0200",
        "40420f0000000000",
        "c4c801",
    );
    let output = plain(MessageParser::parse_hex(input, false).unwrap());

    let expected = "Header
  msg len: 28
  rsp msg: 0x0000
  rsp event: 0x0100 (FrameReceived)
Event
  FrameReceived
    timestamp: 1000000
    rssi: -60 dBm
    lqi: 200
    frame pending: 1
    ack security: unsupported
    psdu: 9 bytes
"
    .to_string()
        + &indented(BROADCAST_DATA, 6);
    assert_eq!(output, expected);
}

#[test]
fn version_response() {
    let output = plain(MessageParser::parse_hex("0c0002000000000001000200", false).unwrap());
    assert_eq!(
        output,
        "Header
  msg len: 12
  rsp msg: 0x0002 (VersionGet)
  rsp event: 0x0000 (CommandComplete)
Response
  status: Success
  version: 2.1
"
    );
}

#[test]
fn failed_response() {
    let output = plain(MessageParser::parse_hex("0800130000000003", false).unwrap());
    assert_eq!(
        output,
        "Header
  msg len: 8
  rsp msg: 0x0013 (ChannelSet)
  rsp event: 0x0000 (CommandComplete)
Response
  status: Busy
"
    );
}

#[test]
fn transmit_command() {
    let input = concat!("14004300100100", "43000109", "418801cdabffff0200");
    let output = plain(MessageParser::parse_command_hex(input).unwrap());
    let expected = "Header
  msg len: 20
  rsp msg: 0x0043 (Transmit)
  rsp event: 0x0110 (TxDone)
Command
  opcode: Transmit (0x0043)
  cca: 1
  frame: 9 bytes
"
    .to_string()
        + &indented(BROADCAST_DATA, 4);
    assert_eq!(output, expected);
}
