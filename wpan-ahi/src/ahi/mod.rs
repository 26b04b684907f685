//! The AHI protocol: byte messages exchanged with the companion core.
//!
//! Every message starts with a 7-octet header, little-endian:
//!
//! ```text
//! +---------+---------+-----------+----------+---------+
//! | msg_len | rsp_msg | rsp_event | reserved | payload |
//! |   u16   |   u16   |    u16    |    u8    |   ...   |
//! +---------+---------+-----------+----------+---------+
//! ```
//!
//! `msg_len` counts the whole message. A request carries in `rsp_msg` and
//! `rsp_event` the identifiers of the message that will complete it, and the
//! companion core echoes them in that message. Anything else it sends is an
//! [`Event`].

mod assembler;
pub use assembler::{Assembler, AssemblerStats};

mod commands;
pub use commands::{completion, CcaMode, Command, Opcode};

mod events;
pub use events::{
    AckSecurity, CoreError, Event, EventCode, FrameReceived, ResetReason, TxDone,
};

mod message;
pub use message::{completeness, Completeness, Message, Reader, ResponseToken, HEADER_LEN};

mod status;
pub use status::Status;
