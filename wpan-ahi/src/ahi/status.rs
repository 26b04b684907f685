/// Status of a completed command, as reported by the companion core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// The command succeeded.
    Success,
    /// The command failed for an unspecified reason.
    Failure,
    /// A parameter is out of range.
    InvalidParameter,
    /// The radio is busy with another operation.
    Busy,
    /// No acknowledgment was received for a frame requesting one.
    NoAck,
    /// The channel was busy.
    ChannelAccessFailure,
    /// The firmware does not implement the command.
    Unsupported,
    /// Any other value.
    Unknown(u8),
}

impl Status {
    /// Returns `true` for [`Status::Success`].
    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }

    /// Turn a non-success status into an error.
    pub fn into_result(self) -> crate::Result<()> {
        match self {
            Status::Success => Ok(()),
            status => Err(crate::Error::Status(status)),
        }
    }
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Success,
            1 => Self::Failure,
            2 => Self::InvalidParameter,
            3 => Self::Busy,
            4 => Self::NoAck,
            5 => Self::ChannelAccessFailure,
            6 => Self::Unsupported,
            value => Self::Unknown(value),
        }
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        match value {
            Status::Success => 0,
            Status::Failure => 1,
            Status::InvalidParameter => 2,
            Status::Busy => 3,
            Status::NoAck => 4,
            Status::ChannelAccessFailure => 5,
            Status::Unsupported => 6,
            Status::Unknown(value) => value,
        }
    }
}
