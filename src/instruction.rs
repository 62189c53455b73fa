//! The RMAP instruction field.
//!
//! The third byte after the path address prefix of every RMAP packet packs three fields:
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! | packet  |    command    | src   |
//! |  type   | W   V   A   I | len   |
//! ```
use num_enum::{IntoPrimitive, TryFromPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MAX_PACKET_TYPE: u8 = 0b11;
pub const MAX_COMMAND: u8 = 0b1111;
pub const MAX_SRC_ADDR_LEN: u8 = 0b11;

const PACKET_TYPE_SHIFT: u8 = 6;
const COMMAND_SHIFT: u8 = 2;

/// Packet type discriminator. The values 2 and 3 are reserved by the standard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketType {
    Reply = 0b00,
    Command = 0b01,
}

/// Classification of a valid RMAP command code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandCode {
    Read,
    ReadModifyWrite,
    Write,
}

/// The four command bits of the instruction field.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFlags(u8);

impl CommandFlags {
    pub const WRITE: u8 = 0b1000;
    pub const VERIFY: u8 = 0b0100;
    pub const ACKNOWLEDGE: u8 = 0b0010;
    pub const INCREMENT: u8 = 0b0001;

    pub const fn new(write: bool, verify: bool, acknowledge: bool, increment: bool) -> Self {
        Self(
            ((write as u8) << 3)
                | ((verify as u8) << 2)
                | ((acknowledge as u8) << 1)
                | increment as u8,
        )
    }

    /// Returns [None] if the value does not fit into the 4 bit command field.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        if raw > MAX_COMMAND {
            return None;
        }
        Some(Self(raw))
    }

    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_write(&self) -> bool {
        self.0 & Self::WRITE != 0
    }

    #[inline]
    pub const fn is_read(&self) -> bool {
        !self.is_write()
    }

    #[inline]
    pub const fn verify(&self) -> bool {
        self.0 & Self::VERIFY != 0
    }

    #[inline]
    pub const fn acknowledge(&self) -> bool {
        self.0 & Self::ACKNOWLEDGE != 0
    }

    #[inline]
    pub const fn increment(&self) -> bool {
        self.0 & Self::INCREMENT != 0
    }

    /// Classify the command bits. Returns [None] for the reserved codes 0b0000, 0b0001,
    /// 0b0100, 0b0101 and 0b0110.
    pub const fn code(&self) -> Option<CommandCode> {
        match self.0 {
            0b0010 | 0b0011 => Some(CommandCode::Read),
            0b0111 => Some(CommandCode::ReadModifyWrite),
            0b1000..=0b1111 => Some(CommandCode::Write),
            _ => None,
        }
    }

    /// Whether the command carries data and a data CRC in the standard layout. Only read
    /// commands do not. Reserved codes are treated like writes.
    #[inline]
    pub const fn has_data_field(&self) -> bool {
        !matches!(self.code(), Some(CommandCode::Read))
    }

    /// Whether the reply to this command carries data and a data CRC. Only replies to reads
    /// and read-modify-writes do. Reserved codes are treated like writes.
    #[inline]
    pub const fn reply_has_data_field(&self) -> bool {
        matches!(
            self.code(),
            Some(CommandCode::Read | CommandCode::ReadModifyWrite)
        )
    }
}

/// Instruction byte of an RMAP packet.
///
/// The packet type is kept as raw bits so that packets carrying a reserved packet type can
/// still be decoded and re-encoded without loss. Use [Self::packet_type] for the typed view.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instruction {
    packet_type: u8,
    command: CommandFlags,
    src_addr_len: u8,
}

impl Instruction {
    /// Returns [None] if any of the values exceeds the width of its bit field.
    pub fn new(packet_type: u8, command: u8, src_addr_len: u8) -> Option<Self> {
        if packet_type > MAX_PACKET_TYPE || src_addr_len > MAX_SRC_ADDR_LEN {
            return None;
        }
        Some(Self {
            packet_type,
            command: CommandFlags::from_raw(command)?,
            src_addr_len,
        })
    }

    /// Instruction of a command packet without a source path address.
    pub const fn command(command: CommandFlags) -> Self {
        Self {
            packet_type: PacketType::Command as u8,
            command,
            src_addr_len: 0,
        }
    }

    /// Instruction of a reply packet. Replies never carry a source address length.
    pub const fn reply(command: CommandFlags) -> Self {
        Self {
            packet_type: PacketType::Reply as u8,
            command,
            src_addr_len: 0,
        }
    }

    pub const fn from_raw(raw: u8) -> Self {
        Self {
            packet_type: (raw >> PACKET_TYPE_SHIFT) & MAX_PACKET_TYPE,
            command: CommandFlags((raw >> COMMAND_SHIFT) & MAX_COMMAND),
            src_addr_len: raw & MAX_SRC_ADDR_LEN,
        }
    }

    #[inline]
    pub const fn raw(&self) -> u8 {
        (self.packet_type << PACKET_TYPE_SHIFT)
            | (self.command.raw() << COMMAND_SHIFT)
            | self.src_addr_len
    }

    #[inline]
    pub const fn packet_type_raw(&self) -> u8 {
        self.packet_type
    }

    /// Typed packet type. Returns the raw bits as the error value for the reserved values.
    pub fn packet_type(&self) -> Result<PacketType, u8> {
        PacketType::try_from(self.packet_type).map_err(|_| self.packet_type)
    }

    #[inline]
    pub const fn command_flags(&self) -> CommandFlags {
        self.command
    }

    #[inline]
    pub const fn src_addr_len(&self) -> u8 {
        self.src_addr_len
    }

    pub fn set_packet_type(&mut self, packet_type: PacketType) {
        self.packet_type = packet_type as u8;
    }

    /// Set a new source address length. If the passed number is invalid, the length will not
    /// be set and false will be returned.
    pub fn set_src_addr_len(&mut self, src_addr_len: u8) -> bool {
        if src_addr_len > MAX_SRC_ADDR_LEN {
            return false;
        }
        self.src_addr_len = src_addr_len;
        true
    }
}

impl From<u8> for Instruction {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

impl From<Instruction> for u8 {
    fn from(instruction: Instruction) -> Self {
        instruction.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_type() {
        assert_eq!(PacketType::try_from(0b00).unwrap(), PacketType::Reply);
        assert_eq!(PacketType::try_from(0b01).unwrap(), PacketType::Command);
        assert!(PacketType::try_from(0b10).is_err());
        assert!(PacketType::try_from(0b11).is_err());
    }

    #[test]
    fn test_bitfield_packing_all_values() {
        for packet_type in 0..=MAX_PACKET_TYPE {
            for command in 0..=MAX_COMMAND {
                for src_addr_len in 0..=MAX_SRC_ADDR_LEN {
                    let instruction = Instruction::new(packet_type, command, src_addr_len)
                        .expect("creating instruction failed");
                    let decoded = Instruction::from_raw(instruction.raw());
                    assert_eq!(decoded.packet_type_raw(), packet_type);
                    assert_eq!(decoded.command_flags().raw(), command);
                    assert_eq!(decoded.src_addr_len(), src_addr_len);
                    assert_eq!(decoded, instruction);
                }
            }
        }
    }

    #[test]
    fn test_raw_byte_round_trip() {
        for raw in 0..=u8::MAX {
            assert_eq!(Instruction::from(raw).raw(), raw);
        }
    }

    #[test]
    fn test_write_command_byte() {
        let instruction = Instruction::from_raw(0x60);
        assert_eq!(instruction.packet_type(), Ok(PacketType::Command));
        let flags = instruction.command_flags();
        assert!(flags.is_write());
        assert!(!flags.verify());
        assert!(!flags.acknowledge());
        assert!(!flags.increment());
        assert_eq!(flags.code(), Some(CommandCode::Write));
        assert_eq!(instruction.src_addr_len(), 0);
    }

    #[test]
    fn test_reply_instruction() {
        let instruction = Instruction::reply(CommandFlags::new(true, false, false, false));
        assert_eq!(instruction.raw(), 0x20);
        assert_eq!(instruction.packet_type(), Ok(PacketType::Reply));
    }

    #[test]
    fn test_reserved_packet_type() {
        let instruction = Instruction::from_raw(0b1000_1100);
        assert_eq!(instruction.packet_type(), Err(0b10));
    }

    #[test]
    fn test_invalid_field_values() {
        assert!(Instruction::new(0b100, 0, 0).is_none());
        assert!(Instruction::new(0, 0b10000, 0).is_none());
        assert!(Instruction::new(0, 0, 0b100).is_none());
        assert_eq!(Instruction::command(CommandFlags::default()).raw(), 0x40);
        let mut instruction = Instruction::reply(CommandFlags::default());
        assert!(!instruction.set_src_addr_len(4));
        assert!(instruction.set_src_addr_len(3));
        assert_eq!(instruction.src_addr_len(), 3);
    }

    #[test]
    fn test_command_flags() {
        let flags = CommandFlags::new(true, true, true, true);
        assert_eq!(flags.raw(), 0b1111);
        assert!(CommandFlags::from_raw(0x10).is_none());
        assert_eq!(
            CommandFlags::from_raw(CommandFlags::ACKNOWLEDGE | CommandFlags::INCREMENT)
                .unwrap()
                .code(),
            Some(CommandCode::Read)
        );
        assert_eq!(
            CommandFlags::from_raw(0b0111).unwrap().code(),
            Some(CommandCode::ReadModifyWrite)
        );
        for reserved in [0b0000, 0b0001, 0b0100, 0b0101, 0b0110] {
            let flags = CommandFlags::from_raw(reserved).unwrap();
            assert!(flags.code().is_none());
            assert!(flags.has_data_field());
            assert!(!flags.reply_has_data_field());
        }
        let read = CommandFlags::from_raw(0b0011).unwrap();
        assert!(!read.has_data_field());
        assert!(read.reply_has_data_field());
        let rmw = CommandFlags::from_raw(0b0111).unwrap();
        assert!(rmw.has_data_field());
        assert!(rmw.reply_has_data_field());
        let write = CommandFlags::from_raw(0b1000).unwrap();
        assert!(write.has_data_field());
        assert!(!write.reply_has_data_field());
    }
}
