//! Commands sent to the companion core.
//!
//! The payload of a command starts with its [`Opcode`], followed by the
//! parameters, little-endian. The companion core completes a command with a
//! message whose `rsp_msg` is the opcode and whose `rsp_event` is
//! [`EventCode::CommandComplete`], or the completion event of the command for
//! the operations that take a while ([`Command::Transmit`],
//! [`Command::EnergyDetect`]).

use wpan_frame::MAX_FRAME_LEN;

use super::events::EventCode;
use super::message::{Message, Reader, ResponseToken};
use super::status::Status;
use crate::security::KeyDescriptor;
use crate::{Error, Result};

macro_rules! opcodes {
    ($($(#[$meta:meta])* $name:ident = $value:literal,)*) => {
        /// Command opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum Opcode {
            $($(#[$meta])* $name,)*
            /// Any other opcode.
            Unknown(u16),
        }

        impl From<u16> for Opcode {
            fn from(value: u16) -> Self {
                match value {
                    $($value => Self::$name,)*
                    value => Self::Unknown(value),
                }
            }
        }

        impl From<Opcode> for u16 {
            fn from(value: Opcode) -> Self {
                match value {
                    $(Opcode::$name => $value,)*
                    Opcode::Unknown(value) => value,
                }
            }
        }
    };
}

opcodes! {
    /// Reset the companion core.
    Reset = 0x0001,
    /// Read the firmware version.
    VersionGet = 0x0002,
    /// Set the short address.
    ShortAddressSet = 0x0010,
    /// Set the extended address.
    ExtAddressSet = 0x0011,
    /// Set the PAN ID.
    PanIdSet = 0x0012,
    /// Set the channel.
    ChannelSet = 0x0013,
    /// Add a short address to the pending-bit table.
    PendingShortAdd = 0x0020,
    /// Remove a short address from the pending-bit table.
    PendingShortRemove = 0x0021,
    /// Add an extended address to the pending-bit table.
    PendingExtAdd = 0x0022,
    /// Remove an extended address from the pending-bit table.
    PendingExtRemove = 0x0023,
    /// Empty the pending-bit table.
    PendingClear = 0x0024,
    /// Enable or disable the automatic frame pending bit.
    AutoPendingSet = 0x0025,
    /// Set the CCA mode.
    CcaModeSet = 0x0030,
    /// Set the energy threshold of the CCA.
    CcaThresholdSet = 0x0031,
    /// Set the transmit power.
    TxPowerSet = 0x0032,
    /// Start receiving.
    RxStart = 0x0040,
    /// Stop receiving.
    RxStop = 0x0041,
    /// Measure the energy on the channel.
    EnergyDetect = 0x0042,
    /// Transmit a frame.
    Transmit = 0x0043,
    /// Configure the security keys.
    KeysSet = 0x0050,
    /// Remove every security key.
    KeysClear = 0x0051,
    /// Set the frame counter.
    FrameCounterSet = 0x0052,
    /// Set the frame counter, unless it would decrease.
    FrameCounterSetIfLarger = 0x0053,
    /// Set the header IEs injected into the enhanced ACKs sent to a peer.
    HeaderIeSet = 0x0060,
    /// Stop injecting header IEs into the enhanced ACKs sent to a peer.
    HeaderIePurge = 0x0061,
    /// Set the CSL period.
    CslPeriodSet = 0x0062,
    /// Schedule a receive slot.
    RxSlotSet = 0x0063,
}

/// Clear Channel Assessment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CcaMode {
    /// Energy above threshold.
    EnergyDetection = 1,
    /// Carrier sense only.
    CarrierSense = 2,
    /// Carrier sense and energy above threshold.
    CarrierSenseAndEnergy = 3,
    /// Carrier sense or energy above threshold.
    CarrierSenseOrEnergy = 4,
}

/// Size of a key descriptor in a [`Command::KeysSet`].
const KEY_DESCRIPTOR_LEN: usize = 1 + 9 + 16 + 4 + 1;

/// A command for the companion core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Reset the companion core.
    Reset,
    /// Read the firmware version.
    VersionGet,
    /// Set the short address.
    ShortAddressSet(u16),
    /// Set the extended address, in over-the-air order.
    ExtAddressSet([u8; 8]),
    /// Set the PAN ID.
    PanIdSet(u16),
    /// Set the channel.
    ChannelSet(u8),
    /// Add a short address to the pending-bit table.
    PendingShortAdd(u16),
    /// Remove a short address from the pending-bit table.
    PendingShortRemove(u16),
    /// Add an extended address to the pending-bit table.
    PendingExtAdd([u8; 8]),
    /// Remove an extended address from the pending-bit table.
    PendingExtRemove([u8; 8]),
    /// Empty the pending-bit table.
    PendingClear,
    /// Enable or disable the automatic frame pending bit.
    AutoPendingSet(bool),
    /// Set the CCA mode.
    CcaModeSet(CcaMode),
    /// Set the energy threshold of the CCA, in dBm.
    CcaThresholdSet(i8),
    /// Set the transmit power, in dBm.
    TxPowerSet(i8),
    /// Start receiving.
    RxStart,
    /// Stop receiving.
    RxStop,
    /// Measure the energy on the channel.
    EnergyDetect {
        /// Measurement duration.
        duration_us: u32,
    },
    /// Transmit a frame, without FCS.
    Transmit {
        /// The frame.
        frame: &'a [u8],
        /// Perform a CCA first.
        cca: bool,
    },
    /// Configure the security keys.
    KeysSet(&'a [KeyDescriptor]),
    /// Remove every security key.
    KeysClear,
    /// Set the frame counter.
    FrameCounterSet(u32),
    /// Set the frame counter, unless it would decrease.
    FrameCounterSetIfLarger(u32),
    /// Set the header IEs injected into the enhanced ACKs sent to a peer.
    HeaderIeSet {
        /// Short address of the peer.
        short_address: u16,
        /// Extended address of the peer, in over-the-air order.
        ext_address: [u8; 8],
        /// The serialized header IEs.
        ies: &'a [u8],
    },
    /// Stop injecting header IEs into the enhanced ACKs sent to a peer.
    HeaderIePurge {
        /// Short address of the peer.
        short_address: u16,
        /// Extended address of the peer, in over-the-air order.
        ext_address: [u8; 8],
    },
    /// Set the CSL period, in units of 10 symbols.
    CslPeriodSet(u16),
    /// Schedule a receive slot.
    RxSlotSet {
        /// Start of the slot, on the clock of the companion core.
        start_us: u32,
        /// Duration of the slot.
        duration_us: u32,
        /// Channel to listen on.
        channel: u8,
    },
}

impl Command<'_> {
    /// Return the opcode.
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Reset => Opcode::Reset,
            Command::VersionGet => Opcode::VersionGet,
            Command::ShortAddressSet(_) => Opcode::ShortAddressSet,
            Command::ExtAddressSet(_) => Opcode::ExtAddressSet,
            Command::PanIdSet(_) => Opcode::PanIdSet,
            Command::ChannelSet(_) => Opcode::ChannelSet,
            Command::PendingShortAdd(_) => Opcode::PendingShortAdd,
            Command::PendingShortRemove(_) => Opcode::PendingShortRemove,
            Command::PendingExtAdd(_) => Opcode::PendingExtAdd,
            Command::PendingExtRemove(_) => Opcode::PendingExtRemove,
            Command::PendingClear => Opcode::PendingClear,
            Command::AutoPendingSet(_) => Opcode::AutoPendingSet,
            Command::CcaModeSet(_) => Opcode::CcaModeSet,
            Command::CcaThresholdSet(_) => Opcode::CcaThresholdSet,
            Command::TxPowerSet(_) => Opcode::TxPowerSet,
            Command::RxStart => Opcode::RxStart,
            Command::RxStop => Opcode::RxStop,
            Command::EnergyDetect { .. } => Opcode::EnergyDetect,
            Command::Transmit { .. } => Opcode::Transmit,
            Command::KeysSet(_) => Opcode::KeysSet,
            Command::KeysClear => Opcode::KeysClear,
            Command::FrameCounterSet(_) => Opcode::FrameCounterSet,
            Command::FrameCounterSetIfLarger(_) => Opcode::FrameCounterSetIfLarger,
            Command::HeaderIeSet { .. } => Opcode::HeaderIeSet,
            Command::HeaderIePurge { .. } => Opcode::HeaderIePurge,
            Command::CslPeriodSet(_) => Opcode::CslPeriodSet,
            Command::RxSlotSet { .. } => Opcode::RxSlotSet,
        }
    }

    /// Return the token of the message completing this command.
    pub fn response(&self) -> ResponseToken {
        let event = match self {
            Command::Transmit { .. } => EventCode::TxDone,
            Command::EnergyDetect { .. } => EventCode::EdDone,
            _ => EventCode::CommandComplete,
        };
        ResponseToken::new(self.opcode().into(), event.into())
    }

    /// Write the command into `message`, replacing its previous content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if the parameters do not fit a
    /// message, or a frame is longer than a MAC frame can be.
    pub fn emit(&self, message: &mut Message) -> Result<()> {
        message.reset(self.response());
        message.push_u16(self.opcode().into())?;

        match *self {
            Command::Reset
            | Command::VersionGet
            | Command::PendingClear
            | Command::RxStart
            | Command::RxStop
            | Command::KeysClear => Ok(()),
            Command::ShortAddressSet(value)
            | Command::PanIdSet(value)
            | Command::PendingShortAdd(value)
            | Command::PendingShortRemove(value)
            | Command::CslPeriodSet(value) => message.push_u16(value),
            Command::ExtAddressSet(address)
            | Command::PendingExtAdd(address)
            | Command::PendingExtRemove(address) => message.push_bytes(&address),
            Command::ChannelSet(channel) => message.push_u8(channel),
            Command::AutoPendingSet(enabled) => message.push_u8(enabled as u8),
            Command::CcaModeSet(mode) => message.push_u8(mode as u8),
            Command::CcaThresholdSet(dbm) | Command::TxPowerSet(dbm) => message.push_u8(dbm as u8),
            Command::EnergyDetect { duration_us } => message.push_u32(duration_us),
            Command::Transmit { frame, cca } => {
                if frame.len() > MAX_FRAME_LEN {
                    return Err(Error::InvalidMessage);
                }
                message.push_u8(cca as u8)?;
                message.push_u8(frame.len() as u8)?;
                message.push_bytes(frame)
            }
            Command::KeysSet(keys) => {
                let count = u8::try_from(keys.len()).map_err(|_| Error::InvalidMessage)?;
                message.push_u8(count)?;
                for key in keys {
                    emit_key(key, message)?;
                }
                Ok(())
            }
            Command::FrameCounterSet(counter) | Command::FrameCounterSetIfLarger(counter) => {
                message.push_u32(counter)
            }
            Command::HeaderIeSet {
                short_address,
                ext_address,
                ies,
            } => {
                message.push_u16(short_address)?;
                message.push_bytes(&ext_address)?;
                let len = u8::try_from(ies.len()).map_err(|_| Error::InvalidMessage)?;
                message.push_u8(len)?;
                message.push_bytes(ies)
            }
            Command::HeaderIePurge {
                short_address,
                ext_address,
            } => {
                message.push_u16(short_address)?;
                message.push_bytes(&ext_address)
            }
            Command::RxSlotSet {
                start_us,
                duration_us,
                channel,
            } => {
                message.push_u32(start_us)?;
                message.push_u32(duration_us)?;
                message.push_u8(channel)
            }
        }
    }
}

fn emit_key(key: &KeyDescriptor, message: &mut Message) -> Result<()> {
    let mut raw = [0u8; KEY_DESCRIPTOR_LEN];
    raw[0] = key.key_id_mode as u8;
    raw[1..10].copy_from_slice(&key.key_id);
    raw[10..26].copy_from_slice(&key.key_value);
    raw[26..30].copy_from_slice(&key.frame_counter.to_le_bytes());
    raw[30] = key.frame_counter_per_key as u8;
    message.push_bytes(&raw)
}

/// Read the status of a completed command and return a reader over the rest
/// of the payload.
///
/// # Errors
///
/// [`Error::InvalidMessage`] for an empty payload, [`Error::Status`] for any
/// status but [`Status::Success`].
pub fn completion(message: &Message) -> Result<Reader<'_>> {
    let mut reader = message.reader();
    Status::from(reader.u8()?).into_result()?;
    Ok(reader)
}
