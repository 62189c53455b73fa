//! RMAP command and reply packets.
//!
//! Command packets have the following layout. Fields with a width in brackets are optional or
//! variable sized:
//!
//! ```text
//! [dest path] | dest LA | protocol ID | instruction | dest key | [src path] | src LA |
//! transaction ID (2) | extended addr | memory addr (4) | data length (3) | header CRC |
//! [data] | [data CRC]
//! ```
//!
//! [CommandPacket::from_bytes] and [CommandPacket::to_vec] read and write the data field and
//! the data CRC for every command code. ECSS-E-ST-50-52C omits both for read commands, where
//! the data length field holds the number of bytes to read. The `*_standard` variants use that
//! layout.
//!
//! Reply packets are shorter:
//!
//! ```text
//! [reply path] | initiator LA | protocol ID | instruction | status | target LA |
//! transaction ID (2) | [reserved | data length (3)] | header CRC | [data | data CRC]
//! ```
//!
//! Replies to writes end after the header CRC. Decoding never checks CRCs. Encoding never
//! calculates them. Use the `*_crc_valid` methods and `update_crcs` explicitly.
use crate::crc::CRC_RMAP;
use crate::instruction::{CommandFlags, Instruction, PacketType, MAX_SRC_ADDR_LEN};
use crate::reply::ReplyBuilder;
use crate::status::StatusCode;
use crate::{
    ByteConversionError, PacketField, RmapError, COMMAND_HEADER_LEN, LOGICAL_ADDR_MIN,
    MAX_DATA_LEN, READ_REPLY_HEADER_LEN, RMAP_PROTOCOL_ID, WRITE_REPLY_HEADER_LEN,
};
use alloc::vec::Vec;
use delegate::delegate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Read cursor over an immutable byte slice.
pub(crate) struct ReadCursor<'buf> {
    buf: &'buf [u8],
    offset: usize,
}

impl<'buf> ReadCursor<'buf> {
    pub(crate) fn new(buf: &'buf [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Consumes all leading bytes below [LOGICAL_ADDR_MIN]. The first byte at or above the
    /// threshold is left in place.
    pub(crate) fn read_path_prefix(&mut self) -> &'buf [u8] {
        let start = self.offset;
        while self
            .buf
            .get(self.offset)
            .is_some_and(|byte| *byte < LOGICAL_ADDR_MIN)
        {
            self.offset += 1;
        }
        &self.buf[start..self.offset]
    }

    pub(crate) fn read_slice(
        &mut self,
        len: usize,
        field: PacketField,
    ) -> Result<&'buf [u8], RmapError> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(RmapError::MalformedPacket {
                field,
                found: remaining,
                expected: len,
            });
        }
        let slice = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self, field: PacketField) -> Result<u8, RmapError> {
        Ok(self.read_slice(1, field)?[0])
    }

    pub(crate) fn read_u16(&mut self, field: PacketField) -> Result<u16, RmapError> {
        let raw = self.read_slice(2, field)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    pub(crate) fn read_u24(&mut self, field: PacketField) -> Result<u32, RmapError> {
        let raw = self.read_slice(3, field)?;
        Ok(u32::from_be_bytes([0, raw[0], raw[1], raw[2]]))
    }

    pub(crate) fn read_u32(&mut self, field: PacketField) -> Result<u32, RmapError> {
        let raw = self.read_slice(4, field)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}

/// Write cursor. The caller checks the buffer size before writing.
struct WriteCursor<'buf> {
    buf: &'buf mut [u8],
    offset: usize,
}

impl<'buf> WriteCursor<'buf> {
    fn new(buf: &'buf mut [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
    }
}

#[inline]
fn u24_be_bytes(value: u32) -> [u8; 3] {
    let raw = value.to_be_bytes();
    [raw[1], raw[2], raw[3]]
}

fn check_buf_len(buf: &[u8], expected: usize) -> Result<(), ByteConversionError> {
    if buf.len() < expected {
        return Err(ByteConversionError::ToSliceTooSmall {
            found: buf.len(),
            expected,
        });
    }
    Ok(())
}

fn check_data_len(declared: usize, actual: usize) -> Result<(), RmapError> {
    if declared > MAX_DATA_LEN as usize {
        return Err(RmapError::InvalidPacketState {
            field: PacketField::DataLen,
            declared,
            actual: MAX_DATA_LEN as usize,
        });
    }
    if declared != actual {
        return Err(RmapError::InvalidPacketState {
            field: PacketField::Data,
            declared,
            actual,
        });
    }
    Ok(())
}

fn check_addressing(
    path: &[u8],
    path_field: PacketField,
    logical_addr: u8,
    logical_addr_field: PacketField,
) -> Result<(), RmapError> {
    if let Some(addr) = path.iter().copied().find(|byte| *byte >= LOGICAL_ADDR_MIN) {
        return Err(RmapError::InvalidAddress {
            field: path_field,
            addr,
        });
    }
    if logical_addr < LOGICAL_ADDR_MIN {
        return Err(RmapError::InvalidAddress {
            field: logical_addr_field,
            addr: logical_addr,
        });
    }
    Ok(())
}

fn read_protocol_id(cursor: &mut ReadCursor) -> Result<(), RmapError> {
    let protocol_id = cursor.read_u8(PacketField::ProtocolId)?;
    if protocol_id != RMAP_PROTOCOL_ID {
        return Err(RmapError::InvalidProtocolId(protocol_id));
    }
    Ok(())
}

/// Placement of the data field in command packets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Layout {
    /// Every command ends with `data_len` data bytes and a data CRC.
    Uniform,
    /// Read commands end after the header CRC.
    Standard,
}

/// RMAP command packet.
///
/// The packet can be built field by field or decoded from raw bytes with [Self::from_bytes].
/// The length fields `instruction.src_addr_len()` and `data_len` are stored separately from the
/// sequences they describe so that a decoded packet is encoded back without modification.
/// [Self::write_to_bytes] rejects packets where they disagree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandPacket {
    pub dest_path_addr: Vec<u8>,
    pub dest_logical_addr: u8,
    pub instruction: Instruction,
    pub dest_key: u8,
    pub src_path_addr: Vec<u8>,
    pub src_logical_addr: u8,
    pub transaction_id: u16,
    pub extended_addr: u8,
    pub mem_addr: u32,
    /// 24 bit data length. For read commands in the standard layout, this is the number of
    /// bytes to read.
    pub data_len: u32,
    pub header_crc: u8,
    pub data: Vec<u8>,
    pub data_crc: u8,
}

impl CommandPacket {
    /// Create a command with logical addressing, an empty data field and stamped CRCs.
    pub fn new(
        command: CommandFlags,
        dest_logical_addr: u8,
        dest_key: u8,
        src_logical_addr: u8,
        transaction_id: u16,
    ) -> Self {
        let mut packet = Self {
            dest_logical_addr,
            instruction: Instruction::command(command),
            dest_key,
            src_logical_addr,
            transaction_id,
            ..Default::default()
        };
        packet.update_crcs();
        packet
    }

    /// Set the extended and the 32 bit memory address.
    pub fn with_address(mut self, extended_addr: u8, mem_addr: u32) -> Self {
        self.extended_addr = extended_addr;
        self.mem_addr = mem_addr;
        self.update_crcs();
        self
    }

    pub fn with_dest_path_addr(mut self, path: &[u8]) -> Self {
        self.dest_path_addr = path.to_vec();
        self
    }

    /// Set the source path address and the source address length field. The instruction field
    /// can only describe up to 3 bytes.
    pub fn with_src_path_addr(mut self, path: &[u8]) -> Result<Self, RmapError> {
        if path.len() > MAX_SRC_ADDR_LEN as usize {
            return Err(RmapError::InvalidPacketState {
                field: PacketField::SrcPathAddr,
                declared: MAX_SRC_ADDR_LEN as usize,
                actual: path.len(),
            });
        }
        self.instruction.set_src_addr_len(path.len() as u8);
        self.src_path_addr = path.to_vec();
        self.update_crcs();
        Ok(self)
    }

    /// Set the data of a write or read-modify-write command together with the data length.
    pub fn with_data(mut self, data: &[u8]) -> Result<Self, RmapError> {
        if data.len() > MAX_DATA_LEN as usize {
            return Err(RmapError::InvalidPacketState {
                field: PacketField::DataLen,
                declared: data.len(),
                actual: MAX_DATA_LEN as usize,
            });
        }
        self.data_len = data.len() as u32;
        self.data = data.to_vec();
        self.update_crcs();
        Ok(self)
    }

    /// Set the number of bytes requested by a read command and clear the data. The packet is
    /// meant for [Self::to_vec_standard]. The uniform layout expects `read_len` data bytes.
    pub fn with_read_len(mut self, read_len: u32) -> Result<Self, RmapError> {
        if read_len > MAX_DATA_LEN {
            return Err(RmapError::InvalidPacketState {
                field: PacketField::DataLen,
                declared: read_len as usize,
                actual: MAX_DATA_LEN as usize,
            });
        }
        self.data_len = read_len;
        self.data.clear();
        self.update_crcs();
        Ok(self)
    }

    delegate!(to self.instruction {
        pub fn packet_type(&self) -> Result<PacketType, u8>;
        pub fn command_flags(&self) -> CommandFlags;
        pub fn src_addr_len(&self) -> u8;
    });

    /// Whether the packet carries a data field in the standard layout.
    #[inline]
    pub fn has_data_field(&self) -> bool {
        self.command_flags().has_data_field()
    }

    fn carries_data(&self, layout: Layout) -> bool {
        layout == Layout::Uniform || self.has_data_field()
    }

    /// A reply is sent for every command with the acknowledge bit and for every read or
    /// read-modify-write.
    pub fn reply_expected(&self) -> bool {
        let flags = self.command_flags();
        flags.acknowledge() || flags.reply_has_data_field()
    }

    /// Parse a command packet from raw bytes. The data field and the data CRC are read for every
    /// command code. Bytes after the data CRC are ignored.
    ///
    /// The CRC fields are stored as received and are not validated.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, RmapError> {
        Self::parse(buf, Layout::Uniform)
    }

    /// Parse a command packet where read commands end after the header CRC.
    pub fn from_bytes_standard(buf: &[u8]) -> Result<Self, RmapError> {
        Self::parse(buf, Layout::Standard)
    }

    fn parse(buf: &[u8], layout: Layout) -> Result<Self, RmapError> {
        let mut cursor = ReadCursor::new(buf);
        let dest_path_addr = cursor.read_path_prefix().to_vec();
        let dest_logical_addr = cursor.read_u8(PacketField::DestLogicalAddr)?;
        read_protocol_id(&mut cursor)?;
        let instruction = Instruction::from_raw(cursor.read_u8(PacketField::Instruction)?);
        let dest_key = cursor.read_u8(PacketField::DestKey)?;
        let src_path_addr = cursor
            .read_slice(instruction.src_addr_len() as usize, PacketField::SrcPathAddr)?
            .to_vec();
        let src_logical_addr = cursor.read_u8(PacketField::SrcLogicalAddr)?;
        let transaction_id = cursor.read_u16(PacketField::TransactionId)?;
        let extended_addr = cursor.read_u8(PacketField::ExtendedAddr)?;
        let mem_addr = cursor.read_u32(PacketField::MemAddr)?;
        let data_len = cursor.read_u24(PacketField::DataLen)?;
        let header_crc = cursor.read_u8(PacketField::HeaderCrc)?;
        let mut data = Vec::new();
        let mut data_crc = 0;
        if layout == Layout::Uniform || instruction.command_flags().has_data_field() {
            data = cursor
                .read_slice(data_len as usize, PacketField::Data)?
                .to_vec();
            data_crc = cursor.read_u8(PacketField::DataCrc)?;
        }
        Ok(Self {
            dest_path_addr,
            dest_logical_addr,
            instruction,
            dest_key,
            src_path_addr,
            src_logical_addr,
            transaction_id,
            extended_addr,
            mem_addr,
            data_len,
            header_crc,
            data,
            data_crc,
        })
    }

    /// Length of the header including the header CRC, without the destination path address.
    pub fn len_header(&self) -> usize {
        COMMAND_HEADER_LEN + self.src_path_addr.len()
    }

    /// Length of the packet when written to bytes.
    pub fn len_packed(&self) -> usize {
        self.packed_len(Layout::Uniform)
    }

    /// Length of the packet when written with [Self::write_to_bytes_standard].
    pub fn len_packed_standard(&self) -> usize {
        self.packed_len(Layout::Standard)
    }

    fn packed_len(&self, layout: Layout) -> usize {
        let mut len = self.dest_path_addr.len() + self.len_header();
        if self.carries_data(layout) {
            len += self.data.len() + 1;
        }
        len
    }

    /// Checks that the length fields agree with the sequences they describe.
    pub fn validate_lengths(&self) -> Result<(), RmapError> {
        self.check_lengths(Layout::Uniform)
    }

    /// Checks that the destination path address only holds bytes below [LOGICAL_ADDR_MIN] and
    /// that the destination logical address is not below it.
    pub fn validate_addresses(&self) -> Result<(), RmapError> {
        check_addressing(
            &self.dest_path_addr,
            PacketField::DestPathAddr,
            self.dest_logical_addr,
            PacketField::DestLogicalAddr,
        )
    }

    fn check_lengths(&self, layout: Layout) -> Result<(), RmapError> {
        if self.src_path_addr.len() != self.src_addr_len() as usize {
            return Err(RmapError::InvalidPacketState {
                field: PacketField::SrcPathAddr,
                declared: self.src_addr_len() as usize,
                actual: self.src_path_addr.len(),
            });
        }
        if self.carries_data(layout) {
            return check_data_len(self.data_len as usize, self.data.len());
        }
        if self.data_len > MAX_DATA_LEN {
            return Err(RmapError::InvalidPacketState {
                field: PacketField::DataLen,
                declared: self.data_len as usize,
                actual: MAX_DATA_LEN as usize,
            });
        }
        if !self.data.is_empty() {
            return Err(RmapError::InvalidPacketState {
                field: PacketField::Data,
                declared: 0,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Feeds the CRC protected header bytes, from the destination logical address up to and
    /// including the data length, into the sink.
    fn emit_header(&self, mut sink: impl FnMut(&[u8])) {
        sink(&[
            self.dest_logical_addr,
            RMAP_PROTOCOL_ID,
            self.instruction.raw(),
            self.dest_key,
        ]);
        sink(&self.src_path_addr);
        sink(&[self.src_logical_addr]);
        sink(&self.transaction_id.to_be_bytes());
        sink(&[self.extended_addr]);
        sink(&self.mem_addr.to_be_bytes());
        sink(&u24_be_bytes(self.data_len));
    }

    pub fn calc_header_crc(&self) -> u8 {
        let mut digest = CRC_RMAP.digest();
        self.emit_header(|bytes| digest.update(bytes));
        digest.finalize()
    }

    pub fn calc_data_crc(&self) -> u8 {
        CRC_RMAP.checksum(&self.data)
    }

    pub fn header_crc_valid(&self) -> bool {
        self.header_crc == self.calc_header_crc()
    }

    /// A read command decoded in the standard layout has neither data nor a data CRC. Both are
    /// zero then, which is the CRC of no data.
    pub fn data_crc_valid(&self) -> bool {
        self.data_crc == self.calc_data_crc()
    }

    /// Calculate both CRCs and store them in the packet.
    pub fn update_crcs(&mut self) {
        self.header_crc = self.calc_header_crc();
        self.data_crc = self.calc_data_crc();
    }

    /// Write the packet to a raw buffer. The CRC fields are written as stored. Returns the
    /// written size on success.
    pub fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, RmapError> {
        self.write(buf, Layout::Uniform)
    }

    /// Write the packet to a raw buffer, omitting data and data CRC for read commands.
    pub fn write_to_bytes_standard(&self, buf: &mut [u8]) -> Result<usize, RmapError> {
        self.write(buf, Layout::Standard)
    }

    fn write(&self, buf: &mut [u8], layout: Layout) -> Result<usize, RmapError> {
        self.check_lengths(layout)?;
        self.validate_addresses()?;
        let len_packed = self.packed_len(layout);
        check_buf_len(buf, len_packed)?;
        let mut cursor = WriteCursor::new(buf);
        cursor.put(&self.dest_path_addr);
        self.emit_header(|bytes| cursor.put(bytes));
        cursor.put(&[self.header_crc]);
        if self.carries_data(layout) {
            cursor.put(&self.data);
            cursor.put(&[self.data_crc]);
        }
        Ok(len_packed)
    }

    /// Write the packet to a newly allocated vector.
    pub fn to_vec(&self) -> Result<Vec<u8>, RmapError> {
        let mut vec = alloc::vec![0; self.len_packed()];
        self.write_to_bytes(&mut vec)?;
        Ok(vec)
    }

    pub fn to_vec_standard(&self) -> Result<Vec<u8>, RmapError> {
        let mut vec = alloc::vec![0; self.len_packed_standard()];
        self.write_to_bytes_standard(&mut vec)?;
        Ok(vec)
    }

    /// Start building the reply to this command.
    pub fn reply_builder(&self) -> Result<ReplyBuilder<'_>, RmapError> {
        match self.packet_type() {
            Ok(PacketType::Command) => Ok(ReplyBuilder::new(self)),
            _ => Err(RmapError::NotACommand),
        }
    }
}

/// RMAP reply packet.
///
/// The command flags are copied from the command this packet replies to. They determine
/// whether the packet has a data field: replies to reads and read-modify-writes carry data,
/// replies to writes do not. The data length field is derived from the data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplyPacket {
    pub reply_path_addr: Vec<u8>,
    pub initiator_logical_addr: u8,
    pub command: CommandFlags,
    pub status: StatusCode,
    pub target_logical_addr: u8,
    pub transaction_id: u16,
    pub header_crc: u8,
    pub data: Vec<u8>,
    pub data_crc: u8,
}

impl ReplyPacket {
    #[inline]
    pub fn instruction(&self) -> Instruction {
        Instruction::reply(self.command)
    }

    #[inline]
    pub fn has_data_field(&self) -> bool {
        self.command.reply_has_data_field()
    }

    /// Parse a reply packet from raw bytes. Bytes after the last field are ignored.
    ///
    /// The reserved byte and the source address length bits of the instruction are not
    /// retained.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, RmapError> {
        let mut cursor = ReadCursor::new(buf);
        let reply_path_addr = cursor.read_path_prefix().to_vec();
        let initiator_logical_addr = cursor.read_u8(PacketField::InitiatorLogicalAddr)?;
        read_protocol_id(&mut cursor)?;
        let instruction = Instruction::from_raw(cursor.read_u8(PacketField::Instruction)?);
        match instruction.packet_type() {
            Ok(PacketType::Reply) => (),
            Ok(ptype) => return Err(RmapError::InvalidPacketType(ptype as u8)),
            Err(raw) => return Err(RmapError::InvalidPacketType(raw)),
        }
        let raw_status = cursor.read_u8(PacketField::Status)?;
        let status =
            StatusCode::try_from(raw_status).map_err(|_| RmapError::InvalidStatus(raw_status))?;
        let target_logical_addr = cursor.read_u8(PacketField::TargetLogicalAddr)?;
        let transaction_id = cursor.read_u16(PacketField::TransactionId)?;
        let command = instruction.command_flags();
        let mut data_len = 0;
        if command.reply_has_data_field() {
            cursor.read_u8(PacketField::Reserved)?;
            data_len = cursor.read_u24(PacketField::DataLen)?;
        }
        let header_crc = cursor.read_u8(PacketField::HeaderCrc)?;
        let mut data = Vec::new();
        let mut data_crc = 0;
        if command.reply_has_data_field() {
            data = cursor
                .read_slice(data_len as usize, PacketField::Data)?
                .to_vec();
            data_crc = cursor.read_u8(PacketField::DataCrc)?;
        }
        Ok(Self {
            reply_path_addr,
            initiator_logical_addr,
            command,
            status,
            target_logical_addr,
            transaction_id,
            header_crc,
            data,
            data_crc,
        })
    }

    /// Length of the header including the header CRC, without the reply path address.
    pub fn len_header(&self) -> usize {
        if self.has_data_field() {
            return READ_REPLY_HEADER_LEN;
        }
        WRITE_REPLY_HEADER_LEN
    }

    pub fn len_packed(&self) -> usize {
        let mut len = self.reply_path_addr.len() + self.len_header();
        if self.has_data_field() {
            len += self.data.len() + 1;
        }
        len
    }

    fn emit_header(&self, mut sink: impl FnMut(&[u8])) {
        sink(&[
            self.initiator_logical_addr,
            RMAP_PROTOCOL_ID,
            self.instruction().raw(),
            self.status.into(),
            self.target_logical_addr,
        ]);
        sink(&self.transaction_id.to_be_bytes());
        if self.has_data_field() {
            sink(&[0]);
            sink(&u24_be_bytes(self.data.len() as u32));
        }
    }

    pub fn calc_header_crc(&self) -> u8 {
        let mut digest = CRC_RMAP.digest();
        self.emit_header(|bytes| digest.update(bytes));
        digest.finalize()
    }

    pub fn calc_data_crc(&self) -> u8 {
        CRC_RMAP.checksum(&self.data)
    }

    pub fn header_crc_valid(&self) -> bool {
        self.header_crc == self.calc_header_crc()
    }

    /// Write replies have no data CRC, so this always returns true for them.
    pub fn data_crc_valid(&self) -> bool {
        !self.has_data_field() || self.data_crc == self.calc_data_crc()
    }

    pub fn update_crcs(&mut self) {
        self.header_crc = self.calc_header_crc();
        self.data_crc = self.calc_data_crc();
    }

    /// Checks that the data fits into the 24 bit data length field and that replies without a
    /// data field have no data.
    pub fn validate_lengths(&self) -> Result<(), RmapError> {
        if self.has_data_field() {
            return check_data_len(self.data.len(), self.data.len());
        }
        if !self.data.is_empty() {
            return Err(RmapError::InvalidPacketState {
                field: PacketField::Data,
                declared: 0,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Checks that the reply path address only holds bytes below [LOGICAL_ADDR_MIN] and that
    /// the initiator logical address is not below it.
    pub fn validate_addresses(&self) -> Result<(), RmapError> {
        check_addressing(
            &self.reply_path_addr,
            PacketField::ReplyPathAddr,
            self.initiator_logical_addr,
            PacketField::InitiatorLogicalAddr,
        )
    }

    /// Write the packet to a raw buffer. The CRC fields are written as stored. Returns the
    /// written size on success.
    pub fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, RmapError> {
        self.validate_lengths()?;
        self.validate_addresses()?;
        let len_packed = self.len_packed();
        check_buf_len(buf, len_packed)?;
        let mut cursor = WriteCursor::new(buf);
        cursor.put(&self.reply_path_addr);
        self.emit_header(|bytes| cursor.put(bytes));
        cursor.put(&[self.header_crc]);
        if self.has_data_field() {
            cursor.put(&self.data);
            cursor.put(&[self.data_crc]);
        }
        Ok(len_packed)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, RmapError> {
        let mut vec = alloc::vec![0; self.len_packed()];
        self.write_to_bytes(&mut vec)?;
        Ok(vec)
    }
}

/// Either a command or a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Packet {
    Command(CommandPacket),
    Reply(ReplyPacket),
}

impl Packet {
    /// Parse a command or a reply, depending on the packet type bits of the instruction field.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, RmapError> {
        let mut cursor = ReadCursor::new(buf);
        cursor.read_path_prefix();
        cursor.read_u8(PacketField::DestLogicalAddr)?;
        read_protocol_id(&mut cursor)?;
        let instruction = Instruction::from_raw(cursor.read_u8(PacketField::Instruction)?);
        match instruction.packet_type() {
            Ok(PacketType::Command) => CommandPacket::from_bytes(buf).map(Packet::Command),
            Ok(PacketType::Reply) => ReplyPacket::from_bytes(buf).map(Packet::Reply),
            Err(raw) => Err(RmapError::InvalidPacketType(raw)),
        }
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Command(_) => PacketType::Command,
            Packet::Reply(_) => PacketType::Reply,
        }
    }

    pub fn transaction_id(&self) -> u16 {
        match self {
            Packet::Command(command) => command.transaction_id,
            Packet::Reply(reply) => reply.transaction_id,
        }
    }

    pub fn len_packed(&self) -> usize {
        match self {
            Packet::Command(command) => command.len_packed(),
            Packet::Reply(reply) => reply.len_packed(),
        }
    }

    pub fn write_to_bytes(&self, buf: &mut [u8]) -> Result<usize, RmapError> {
        match self {
            Packet::Command(command) => command.write_to_bytes(buf),
            Packet::Reply(reply) => reply.write_to_bytes(buf),
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, RmapError> {
        match self {
            Packet::Command(command) => command.to_vec(),
            Packet::Reply(reply) => reply.to_vec(),
        }
    }
}

impl From<CommandPacket> for Packet {
    fn from(command: CommandPacket) -> Self {
        Packet::Command(command)
    }
}

impl From<ReplyPacket> for Packet {
    fn from(reply: ReplyPacket) -> Self {
        Packet::Reply(reply)
    }
}
