//! Information Elements readers and writers.

mod headers;
pub use headers::*;

mod payloads;
pub use payloads::*;

use crate::{Error, Result};

/// Maximum number of Header (or Payload) Information Elements recorded for
/// a single frame.
pub const MAX_INFORMATION_ELEMENTS: usize = 16;

/// A Header Information Element found while walking a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderIeEntry {
    /// Element ID.
    pub id: HeaderElementId,
    /// Offset of the descriptor, relative to the start of the frame.
    pub offset: usize,
    /// Content length.
    pub len: usize,
}

/// A Payload Information Element found while walking a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadIeEntry {
    /// Group ID.
    pub group_id: PayloadGroupId,
    /// Offset of the descriptor, relative to the start of the frame.
    pub offset: usize,
    /// Content length.
    pub len: usize,
}

/// Header Information Elements of a frame.
pub type HeaderIeTable = heapless::Vec<HeaderIeEntry, MAX_INFORMATION_ELEMENTS>;

/// Payload Information Elements of a frame.
pub type PayloadIeTable = heapless::Vec<PayloadIeEntry, MAX_INFORMATION_ELEMENTS>;

/// What follows the list of Header Information Elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderTermination {
    /// A Header Termination 1 IE: payload IEs follow.
    PayloadIes,
    /// A Header Termination 2 IE: the payload follows.
    Payload,
    /// The list ran up to the end of the frame.
    EndOfFrame,
}

/// Walk the Header Information Elements in `buffer[start..end]`.
///
/// Returns the offset of the first octet after the list (termination IE
/// included) and what follows it.
pub(crate) fn walk_header_ies(
    buffer: &[u8],
    start: usize,
    end: usize,
    table: &mut HeaderIeTable,
) -> Result<(usize, HeaderTermination)> {
    let mut offset = start;

    while offset < end {
        let ie = HeaderInformationElement::new(&buffer[offset..end])?;
        let id = ie.element_id();

        let termination = match id {
            HeaderElementId::HeaderTermination1 => Some(HeaderTermination::PayloadIes),
            HeaderElementId::HeaderTermination2 => Some(HeaderTermination::Payload),
            _ => None,
        };

        if let Some(termination) = termination {
            if !ie.is_empty() {
                return Err(Error);
            }
            return Ok((offset + 2, termination));
        }

        table
            .push(HeaderIeEntry {
                id,
                offset,
                len: ie.len(),
            })
            .map_err(|_| Error)?;

        offset += 2 + ie.len();
    }

    Ok((offset, HeaderTermination::EndOfFrame))
}

/// Walk the Payload Information Elements in `buffer[start..end]`.
///
/// Returns the offset of the first octet after the list, Payload
/// Termination IE included.
pub(crate) fn walk_payload_ies(
    buffer: &[u8],
    start: usize,
    end: usize,
    table: &mut PayloadIeTable,
) -> Result<usize> {
    let mut offset = start;

    while offset < end {
        let ie = PayloadInformationElement::new(&buffer[offset..end])?;
        let group_id = ie.group_id();

        if group_id == PayloadGroupId::PayloadTermination {
            if !ie.is_empty() {
                return Err(Error);
            }
            return Ok(offset + 2);
        }

        table
            .push(PayloadIeEntry {
                group_id,
                offset,
                len: ie.len(),
            })
            .map_err(|_| Error)?;

        offset += 2 + ie.len();
    }

    Ok(offset)
}
