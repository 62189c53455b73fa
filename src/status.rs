//! RMAP status codes carried in the status field of reply packets.
use num_enum::{IntoPrimitive, TryFromPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error and status codes according to ECSS-E-ST-50-52C. The value 8 is reserved and therefore
/// not part of the enumeration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusCode {
    /// Command executed successfully.
    Success = 0,
    GeneralError = 1,
    /// Unused RMAP packet type or command code.
    UnusedPacketTypeOrCommandCode = 2,
    InvalidKey = 3,
    InvalidDataCrc = 4,
    /// EOP marker detected before the end of the data.
    EarlyEop = 5,
    /// More than the expected amount of data was received.
    TooMuchData = 6,
    /// EEP marker detected immediately after the header CRC or during the data.
    Eep = 7,
    VerifyBufferOverrun = 9,
    CommandNotImplementedOrNotAuthorised = 10,
    RmwDataLengthError = 11,
    InvalidTargetLogicalAddr = 12,
}

impl StatusCode {
    #[inline]
    pub fn is_success(&self) -> bool {
        *self == StatusCode::Success
    }
}
