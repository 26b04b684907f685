use crate::ahi::Status;

/// Errors reported by this crate.
///
/// Nothing here is fatal: every failure is reported to the immediate caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The frame is truncated, inconsistent, or holds a reserved value.
    MalformedFrame,
    /// No key matches the key identifier of the frame.
    KeyNotFound,
    /// The AES-CCM* primitive rejected the parameters, or the MIC did not
    /// verify.
    CryptoFailure,
    /// The companion core did not answer within the response timeout.
    TransportTimeout,
    /// The byte transport failed to send a request.
    Transport,
    /// A message could not be built or decoded.
    InvalidMessage,
    /// The companion core answered with a non-success status.
    Status(Status),
    /// The frame counter is exhausted.
    CounterOverflow,
    /// The new frame counter is lower than the current one.
    CounterDecrease,
    /// More keys than the key store can hold.
    KeyStoreFull,
    /// The companion core reset while a request was in flight.
    DeviceReset,
}

impl From<wpan_frame::Error> for Error {
    fn from(_: wpan_frame::Error) -> Self {
        Self::MalformedFrame
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedFrame => write!(f, "malformed frame"),
            Error::KeyNotFound => write!(f, "no matching security key"),
            Error::CryptoFailure => write!(f, "CCM* operation failed"),
            Error::TransportTimeout => write!(f, "no response from the companion core"),
            Error::Transport => write!(f, "transport failure"),
            Error::InvalidMessage => write!(f, "invalid AHI message"),
            Error::Status(status) => write!(f, "companion core answered {:?}", status),
            Error::CounterOverflow => write!(f, "frame counter exhausted"),
            Error::CounterDecrease => write!(f, "frame counter would decrease"),
            Error::KeyStoreFull => write!(f, "too many keys"),
            Error::DeviceReset => write!(f, "companion core reset"),
        }
    }
}

/// A type alias for `Result<T, wpan_ahi::Error>`.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(format!("{}", Error::KeyNotFound), "no matching security key");
        assert_eq!(
            format!("{}", Error::Status(Status::NoAck)),
            "companion core answered NoAck"
        );
        assert_eq!(Error::from(wpan_frame::Error), Error::MalformedFrame);
    }
}
