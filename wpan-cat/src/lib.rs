use colored::*;
use wpan_ahi::ahi::{
    AckSecurity, Event, EventCode, FrameReceived, Message, Opcode, Reader, Status, TxDone,
};
use wpan_ahi::time::Instant;
use wpan_frame::{
    Csl, Frame, FrameType, FrameVersion, HeaderElementId, HeaderInformationElement,
    TimeCorrection,
};

/// Why an input could not be printed.
#[derive(Debug)]
pub enum Error {
    /// The input is not hexadecimal.
    Hex(hex::FromHexError),
    /// The input is not a valid IEEE 802.15.4 frame.
    Frame,
    /// The input is not a valid AHI message.
    Message(wpan_ahi::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Hex(err) => write!(f, "invalid hex input: {err}"),
            Error::Frame => write!(f, "malformed IEEE 802.15.4 frame"),
            Error::Message(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Self::Hex(err)
    }
}

impl From<wpan_frame::Error> for Error {
    fn from(_: wpan_frame::Error) -> Self {
        Self::Frame
    }
}

impl From<wpan_ahi::Error> for Error {
    fn from(err: wpan_ahi::Error) -> Self {
        Self::Message(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

struct Writer<'b> {
    buffer: &'b mut String,
    indent: usize,
}

impl<'b> Writer<'b> {
    fn new(buffer: &'b mut String) -> Self {
        Self { buffer, indent: 0 }
    }

    fn increase_indent(&mut self) {
        self.indent += 2;
    }

    fn decrease_indent(&mut self) {
        self.indent -= 2;
    }

    fn write(&mut self, s: String) {
        self.buffer.push_str(&" ".repeat(self.indent));
        self.buffer.push_str(&s);
    }

    fn writeln(&mut self, s: String) {
        self.write(s);
        self.buffer.push('\n');
    }

    fn title(&mut self, title: &str) {
        self.writeln(title.underline().bold().to_string());
    }

    fn field(&mut self, name: &str, value: impl std::fmt::Display) {
        self.writeln(format!("{}: {}", name.bold(), value));
    }
}

fn hex_line(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        "(empty)".to_string()
    } else {
        hex::encode(bytes)
    }
}

/// Pretty-printer for IEEE 802.15.4 frames, without FCS.
pub struct FrameParser {}

impl FrameParser {
    pub fn parse_hex(input: &str) -> Result<String> {
        let data = hex::decode(input)?;
        Self::parse(&data)
    }

    pub fn parse(input: &[u8]) -> Result<String> {
        let mut buffer = String::new();
        write_frame(&mut Writer::new(&mut buffer), input)?;
        Ok(buffer)
    }
}

fn write_frame(w: &mut Writer<'_>, input: &[u8]) -> Result<()> {
    // An encrypted payload is printed as is.
    let frame = Frame::new_received(input)?;
    let fc = frame.frame_control();

    // -----------------------------------------------------------------
    // Frame Control
    // -----------------------------------------------------------------
    w.title("Frame Control");
    w.increase_indent();
    w.field(
        "frame type",
        format!(
            "{}{:?}",
            if fc.frame_version == FrameVersion::Ieee802154_2015
                && matches!(fc.frame_type, FrameType::Beacon | FrameType::Ack)
            {
                "Enhanced "
            } else {
                ""
            },
            fc.frame_type
        )
        .bright_blue(),
    );
    w.field("security", fc.security_enabled as usize);
    w.field("frame pending", fc.frame_pending as usize);
    w.field("ack request", fc.ack_request as usize);
    w.field("pan id compression", fc.pan_id_compression as usize);
    w.field(
        "sequence number suppression",
        fc.sequence_number_suppression as usize,
    );
    w.field(
        "information elements present",
        fc.information_elements_present as usize,
    );
    w.field("dst addressing mode", format!("{:?}", fc.dst_addressing_mode));
    w.field("src addressing mode", format!("{:?}", fc.src_addressing_mode));
    w.field(
        "frame version",
        format!("{} ({:?})", fc.frame_version as usize, fc.frame_version),
    );
    w.decrease_indent();

    // -----------------------------------------------------------------
    // Sequence Number
    // -----------------------------------------------------------------
    if let Some(seq) = frame.sequence_number() {
        w.title("Sequence Number");
        w.increase_indent();
        w.field("sequence number", seq);
        w.decrease_indent();
    }

    // -----------------------------------------------------------------
    // Addressing
    // -----------------------------------------------------------------
    let (dst, src) = (frame.dst_address(), frame.src_address());
    if !dst.is_absent() || !src.is_absent() {
        w.title("Addressing");
        w.increase_indent();

        if let Some(pan_id) = frame.dst_pan_id() {
            w.field("dst pan id", format!("{pan_id:x}"));
        }
        if !dst.is_absent() {
            let broadcast = if dst.is_broadcast() { " (broadcast)" } else { "" };
            w.field("dst addr", format!("{dst}{broadcast}"));
        }
        if let Some(pan_id) = frame.src_pan_id() {
            w.field("src pan id", format!("{pan_id:x}"));
        }
        if !src.is_absent() {
            w.field("src addr", src);
        }
        w.decrease_indent();
    }

    // -----------------------------------------------------------------
    // Auxiliary Security Header
    // -----------------------------------------------------------------
    if let Some(params) = frame.security() {
        w.title("Auxiliary Security Header");
        w.increase_indent();
        w.field("security level", format!("{:?}", params.level));
        w.field("key id mode", format!("{:?}", params.key_id_mode));
        match frame.frame_counter() {
            Some(counter) => w.field("frame counter", counter),
            None => w.field("frame counter", "suppressed"),
        }
        if !frame.key_source().is_empty() {
            w.field("key source", hex::encode(frame.key_source()));
        }
        if let Some(index) = frame.key_index() {
            w.field("key index", index);
        }
        w.decrease_indent();
    }

    // -----------------------------------------------------------------
    // Information Elements
    // -----------------------------------------------------------------
    let headers: Vec<HeaderInformationElement<&[u8]>> =
        frame.header_information_elements().collect();
    let payloads: Vec<_> = frame.payload_information_elements().collect();
    if !headers.is_empty() || !payloads.is_empty() {
        w.title("Information Elements");
        w.increase_indent();

        if !headers.is_empty() {
            w.writeln(format!("{}", "Header Information Elements".italic()));
            w.increase_indent();
            for header in headers {
                write_header_ie(w, &header);
            }
            w.decrease_indent();
        }

        if !payloads.is_empty() {
            w.writeln(format!("{}", "Payload Information Elements".italic()));
            w.increase_indent();
            for payload in payloads {
                w.writeln(format!("{}", format!("{payload}").bold()));
            }
            w.decrease_indent();
        }

        w.decrease_indent();
    }

    // -----------------------------------------------------------------
    // Payload
    // -----------------------------------------------------------------
    if let Some(id) = frame.command_id() {
        w.title("Command");
        w.increase_indent();
        w.field("command id", format!("{id:#04x}"));
        w.decrease_indent();
    }

    if !frame.payload().is_empty() {
        w.title("Payload");
        w.increase_indent();
        w.writeln(hex::encode(frame.payload()));
        w.decrease_indent();
    }

    if !frame.mic().is_empty() {
        w.title("MIC");
        w.increase_indent();
        w.writeln(hex::encode(frame.mic()));
        w.decrease_indent();
    }

    Ok(())
}

fn write_header_ie(w: &mut Writer<'_>, header: &HeaderInformationElement<&[u8]>) {
    let id = header.element_id();
    w.writeln(format!("{}", format!("{id}").bold()));

    w.increase_indent();
    match id {
        HeaderElementId::HeaderTermination1 | HeaderElementId::HeaderTermination2 => {}
        HeaderElementId::Csl => match Csl::new(header.content()) {
            Ok(csl) => w.writeln(format!("{csl}")),
            Err(_) => w.writeln("invalid".to_string()),
        },
        HeaderElementId::TimeCorrection => match TimeCorrection::new(header.content()) {
            Ok(tc) => w.writeln(format!("{tc}")),
            Err(_) => w.writeln("invalid".to_string()),
        },
        _ => w.writeln(hex_line(header.content())),
    }
    w.decrease_indent();
}

/// Pretty-printer for AHI messages.
pub struct MessageParser {}

impl MessageParser {
    /// Print a command sent by the host.
    pub fn parse_command_hex(input: &str) -> Result<String> {
        let data = hex::decode(input)?;
        Self::parse_command(&data)
    }

    pub fn parse_command(input: &[u8]) -> Result<String> {
        let message = Message::parse(input)?;
        let mut buffer = String::new();
        let mut w = Writer::new(&mut buffer);

        write_header(&mut w, &message);

        let mut reader = message.reader();
        let opcode = Opcode::from(reader.u16()?);
        w.title("Command");
        w.increase_indent();
        w.field("opcode", format!("{:?} ({:#06x})", opcode, u16::from(opcode)));

        if opcode == Opcode::Transmit {
            let cca = reader.u8()?;
            let len = reader.u8()? as usize;
            let psdu = reader.bytes(len)?;
            w.field("cca", cca);
            w.field("frame", format!("{len} bytes"));
            w.increase_indent();
            write_frame(&mut w, psdu)?;
            w.decrease_indent();
        } else if !reader.is_empty() {
            w.field("parameters", hex::encode(reader.remaining()));
        }
        w.decrease_indent();

        Ok(buffer)
    }

    /// Print a message sent by the companion core: a response or an event.
    ///
    /// Secured ACK details are decoded when `ack_security` is set.
    pub fn parse_hex(input: &str, ack_security: bool) -> Result<String> {
        let data = hex::decode(input)?;
        Self::parse(&data, ack_security)
    }

    pub fn parse(input: &[u8], ack_security: bool) -> Result<String> {
        let message = Message::parse(input)?;
        let mut buffer = String::new();
        let mut w = Writer::new(&mut buffer);

        write_header(&mut w, &message);

        if message.rsp_msg() != 0 {
            write_response(&mut w, &message)?;
            return Ok(buffer);
        }

        w.title("Event");
        w.increase_indent();
        match Event::parse(&message, ack_security, Instant::default())? {
            Event::FrameReceived(frame) => write_frame_received(&mut w, &frame)?,
            Event::RxStarted => w.writeln("RxStarted".bold().to_string()),
            Event::RxStopped => w.writeln("RxStopped".bold().to_string()),
            Event::Reset(reason) => w.field("Reset", format!("{reason:?}")),
            Event::Error(error) => w.field("Error", format!("{error:?}")),
            Event::CounterOverflow => w.writeln("CounterOverflow".bold().to_string()),
            Event::Unsolicited(_) => {
                w.field("Unknown", hex_line(message.payload()));
            }
        }
        w.decrease_indent();

        Ok(buffer)
    }
}

fn write_header(w: &mut Writer<'_>, message: &Message) {
    w.title("Header");
    w.increase_indent();
    w.field("msg len", message.msg_len());
    let opcode = Opcode::from(message.rsp_msg());
    if message.rsp_msg() == 0 {
        w.field("rsp msg", "0x0000");
    } else {
        w.field("rsp msg", format!("{:#06x} ({:?})", message.rsp_msg(), opcode));
    }
    w.field(
        "rsp event",
        format!(
            "{:#06x} ({:?})",
            message.rsp_event(),
            EventCode::from(message.rsp_event())
        ),
    );
    w.decrease_indent();
}

fn write_response(w: &mut Writer<'_>, message: &Message) -> Result<()> {
    let mut reader = message.reader();
    let status = Status::from(reader.u8()?);

    w.title("Response");
    w.increase_indent();
    w.field(
        "status",
        if status.is_success() {
            format!("{status:?}").green()
        } else {
            format!("{status:?}").red()
        },
    );
    if status.is_success() {
        write_response_data(w, message, &mut reader)?;
    }
    w.decrease_indent();
    Ok(())
}

fn write_response_data(
    w: &mut Writer<'_>,
    message: &Message,
    reader: &mut Reader<'_>,
) -> Result<()> {
    match (
        Opcode::from(message.rsp_msg()),
        EventCode::from(message.rsp_event()),
    ) {
        (Opcode::VersionGet, EventCode::CommandComplete) => {
            let version = reader.u32()?;
            w.field("version", format!("{}.{}", version >> 16, version & 0xffff));
        }
        (_, EventCode::EdDone) => w.field("energy", format!("{} dBm", reader.i8()?)),
        (_, EventCode::TxDone) => {
            let done = TxDone::parse(reader)?;
            if done.ack.is_empty() {
                w.field("ack", "none");
            } else {
                w.field("ack", format!("{} bytes", done.ack.len()));
                w.increase_indent();
                write_frame(w, &done.ack)?;
                w.decrease_indent();
            }
        }
        _ if !reader.is_empty() => w.field("data", hex::encode(reader.remaining())),
        _ => {}
    }
    Ok(())
}

fn write_frame_received(w: &mut Writer<'_>, frame: &FrameReceived<'_>) -> Result<()> {
    w.writeln("FrameReceived".bold().to_string());
    w.increase_indent();
    w.field("timestamp", frame.timestamp);
    w.field("rssi", format!("{} dBm", frame.rssi));
    w.field("lqi", frame.lqi);
    w.field("frame pending", frame.frame_pending as usize);
    match frame.ack {
        AckSecurity::Unsupported => w.field("ack security", "unsupported"),
        AckSecurity::Unsecured => w.field("ack security", "unsecured"),
        AckSecurity::Secured {
            frame_counter,
            key_index,
        } => w.field(
            "ack security",
            format!("frame counter {frame_counter}, key index {key_index}"),
        ),
    }
    w.field("psdu", format!("{} bytes", frame.psdu.len()));
    w.increase_indent();
    write_frame(w, frame.psdu)?;
    w.decrease_indent();
    w.decrease_indent();
    Ok(())
}
