//! # SpaceWire RMAP packet codec
//!
//! This crate implements the packet format of the Remote Memory Access Protocol (RMAP) as
//! specified in [ECSS-E-ST-50-52C](https://ecss.nl/standard/ecss-e-st-50-52c-spacewire-remote-memory-access-protocol-5-february-2010/).
//! RMAP lets an initiator read and write memory on a remote SpaceWire target. It only deals with
//! in-memory byte buffers. Opening a link, framing packets with end-of-packet markers and
//! matching replies to their commands is left to the transport layer.
//!
//! Currently, this includes the following components:
//!
//!  - The RMAP CRC-8 in the [crc] module.
//!  - The packed instruction byte in the [instruction] module.
//!  - Command and reply packets in the [packet] module. Both can be decoded from and encoded to
//!    raw bytes.
//!  - The [reply::ReplyBuilder] which creates the reply for a received command.
//!
//! ## Features
//!
//! `spacewire-rmap` is suitable for `no_std` environments, but it requires an allocator
//! because packets own their path addresses and data.
//!
//! Default features:
//!
//!  - [`std`](https://doc.rust-lang.org/std/): Implements [std::error::Error] for all error types.
//!
//! Optional features:
//!
//!  - [`serde`](https://serde.rs/): Adds `serde` support for all packet and field types.
//!  - [`defmt`](https://defmt.ferrous-systems.com/): Adds `defmt::Format` support for field and
//!    error types.
//!
//! ## Example
//!
//! ```rust
//! use spacewire_rmap::packet::CommandPacket;
//! use spacewire_rmap::status::StatusCode;
//!
//! let raw = [
//!     0x20, 0x01, 0x6C, 0x56, 0x21, 0x60, 0x70, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04,
//!     0x4A, 0xDE, 0xAD, 0xBE, 0xEF, 0x48,
//! ];
//! let command = CommandPacket::from_bytes(&raw).expect("decoding command failed");
//! assert!(command.header_crc_valid());
//! assert_eq!(command.data, [0xDE, 0xAD, 0xBE, 0xEF]);
//!
//! let reply = command
//!     .reply_builder()
//!     .expect("not a command")
//!     .build_reply(StatusCode::Success)
//!     .expect("building reply failed");
//! assert_eq!(reply[0], 0x21);
//! ```
#![no_std]
#![cfg_attr(doc_cfg, feature(doc_cfg))]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

use core::fmt::{Display, Formatter};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod crc;
pub mod instruction;
pub mod packet;
pub mod reply;
pub mod status;

pub use crate::crc::calculate_crc;
pub use crate::packet::{CommandPacket, Packet, ReplyPacket};
pub use crate::reply::ReplyBuilder;
pub use crate::status::StatusCode;

/// Leading bytes with a value below this threshold are path addresses. The first byte at or
/// above it is the logical address of the destination.
pub const LOGICAL_ADDR_MIN: u8 = 0x20;
/// Protocol identifier of RMAP.
pub const RMAP_PROTOCOL_ID: u8 = 0x01;
/// Largest value of the 24 bit data length field.
pub const MAX_DATA_LEN: u32 = 0xFF_FFFF;
/// Header length of a command without path addresses, including the header CRC.
pub const COMMAND_HEADER_LEN: usize = 16;
/// Header length of a write reply without path addresses, including the header CRC.
pub const WRITE_REPLY_HEADER_LEN: usize = 8;
/// Header length of a read reply without path addresses, including the header CRC.
pub const READ_REPLY_HEADER_LEN: usize = 12;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteConversionError {
    /// The passed slice is too small. Returns the passed slice length and expected minimum size
    #[error("target slice with size {found} is too small, expected size of at least {expected}")]
    ToSliceTooSmall { found: usize, expected: usize },
    /// The provider buffer is too small. Returns the passed slice length and expected minimum size
    #[error("source slice with size {found} too small, expected at least {expected} bytes")]
    FromSliceTooSmall { found: usize, expected: usize },
}

/// Identifies a field of a command or reply packet in error reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketField {
    DestPathAddr,
    DestLogicalAddr,
    ProtocolId,
    Instruction,
    DestKey,
    SrcPathAddr,
    SrcLogicalAddr,
    TransactionId,
    ExtendedAddr,
    MemAddr,
    DataLen,
    HeaderCrc,
    Data,
    DataCrc,
    InitiatorLogicalAddr,
    Status,
    TargetLogicalAddr,
    Reserved,
    ReplyPathAddr,
}

impl Display for PacketField {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            PacketField::DestPathAddr => "destination path address",
            PacketField::DestLogicalAddr => "destination logical address",
            PacketField::ProtocolId => "protocol identifier",
            PacketField::Instruction => "instruction",
            PacketField::DestKey => "destination key",
            PacketField::SrcPathAddr => "source path address",
            PacketField::SrcLogicalAddr => "source logical address",
            PacketField::TransactionId => "transaction identifier",
            PacketField::ExtendedAddr => "extended address",
            PacketField::MemAddr => "memory address",
            PacketField::DataLen => "data length",
            PacketField::HeaderCrc => "header CRC",
            PacketField::Data => "data",
            PacketField::DataCrc => "data CRC",
            PacketField::InitiatorLogicalAddr => "initiator logical address",
            PacketField::Status => "status",
            PacketField::TargetLogicalAddr => "target logical address",
            PacketField::Reserved => "reserved",
            PacketField::ReplyPathAddr => "reply path address",
        };
        write!(f, "{name}")
    }
}

/// RMAP error enumeration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RmapError {
    /// The buffer ended before the field could be read completely. `found` is the number of
    /// remaining bytes, `expected` the width of the field.
    #[error("malformed packet: {field} needs {expected} bytes, only {found} left")]
    MalformedPacket {
        field: PacketField,
        found: usize,
        expected: usize,
    },
    /// A length field disagrees with the length of the sequence it describes.
    #[error("invalid packet state: {field} declares {declared} bytes, found {actual}")]
    InvalidPacketState {
        field: PacketField,
        declared: usize,
        actual: usize,
    },
    /// A path address byte at or above [LOGICAL_ADDR_MIN] or a logical address below it. Such
    /// a packet would be split at a different position when decoded.
    #[error("invalid packet state: {field} 0x{addr:02X} on the wrong side of 0x{min:02X}", min = LOGICAL_ADDR_MIN)]
    InvalidAddress { field: PacketField, addr: u8 },
    /// Status value which is not part of [StatusCode].
    #[error("invalid status code {0}")]
    InvalidStatus(u8),
    #[error("invalid protocol id {0}, expected {exp}", exp = RMAP_PROTOCOL_ID)]
    InvalidProtocolId(u8),
    /// Reserved packet type bits where a command or a reply was required.
    #[error("invalid packet type {0}")]
    InvalidPacketType(u8),
    /// Replies can only be built for command packets.
    #[error("packet is not a command")]
    NotACommand,
    #[error("byte conversion error: {0}")]
    ByteConversion(#[from] ByteConversionError),
}
