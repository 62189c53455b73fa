//! Building the reply for a received command.
//!
//! A [ReplyBuilder] borrows the command it replies to. Data for read replies is staged with
//! [ReplyBuilder::add_response_data] and the reply is created with [ReplyBuilder::build] or
//! encoded right away with [ReplyBuilder::build_reply]. The command itself is never modified,
//! so its data can not end up in the reply by accident.
use crate::packet::{CommandPacket, ReplyPacket};
use crate::status::StatusCode;
use crate::RmapError;
use alloc::vec::Vec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyBuilder<'cmd> {
    command: &'cmd CommandPacket,
    response_data: Vec<u8>,
}

impl<'cmd> ReplyBuilder<'cmd> {
    /// Use [CommandPacket::reply_builder] which checks the packet type.
    pub(crate) fn new(command: &'cmd CommandPacket) -> Self {
        Self {
            command,
            response_data: Vec::new(),
        }
    }

    pub fn command(&self) -> &'cmd CommandPacket {
        self.command
    }

    /// Stage the data returned by a read or read-modify-write reply. Replaces previously staged
    /// data.
    pub fn add_response_data(&mut self, data: &[u8]) {
        self.response_data.clear();
        self.response_data.extend_from_slice(data);
    }

    pub fn response_data(&self) -> &[u8] {
        &self.response_data
    }

    /// Create the reply packet with stamped CRCs.
    ///
    /// The command's source becomes the initiator the reply is addressed to, and the command's
    /// destination becomes the target. The source path address of the command is used as the
    /// reply path. Staged data is only attached to replies of reads and read-modify-writes
    /// which completed successfully.
    ///
    /// Fails with [RmapError::InvalidPacketState] if the attached data does not fit into the
    /// 24 bit data length and with [RmapError::InvalidAddress] if the reply path or the
    /// initiator address can not be encoded.
    pub fn build(&self, status: impl Into<u8>) -> Result<ReplyPacket, RmapError> {
        let raw_status = status.into();
        let status =
            StatusCode::try_from(raw_status).map_err(|_| RmapError::InvalidStatus(raw_status))?;
        let command = self.command.command_flags();
        let mut data = Vec::new();
        if command.reply_has_data_field() && status.is_success() {
            data.extend_from_slice(&self.response_data);
        }
        let mut reply = ReplyPacket {
            reply_path_addr: self.command.src_path_addr.clone(),
            initiator_logical_addr: self.command.src_logical_addr,
            command,
            status,
            target_logical_addr: self.command.dest_logical_addr,
            transaction_id: self.command.transaction_id,
            header_crc: 0,
            data,
            data_crc: 0,
        };
        reply.validate_lengths()?;
        reply.validate_addresses()?;
        reply.update_crcs();
        Ok(reply)
    }

    /// Create the reply and encode it.
    pub fn build_reply(&self, status: impl Into<u8>) -> Result<Vec<u8>, RmapError> {
        self.build(status)?.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{CommandFlags, PacketType};
    use crate::PacketField;

    const WRITE_COMMAND: [u8; 21] = [
        0x20, 0x01, 0x60, 0x56, 0x21, 0x60, 0x70, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04,
        0x00, 0xDE, 0xAD, 0xBE, 0xEF, 0x00,
    ];

    const STANDARD_READ_COMMAND: [u8; 16] = [
        0xFE, 0x01, 0x4C, 0x00, 0x67, 0x00, 0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10,
        0x04,
    ];

    #[test]
    fn test_write_reply_ignores_response_data() {
        let command = CommandPacket::from_bytes(&WRITE_COMMAND).unwrap();
        let mut builder = command.reply_builder().unwrap();
        builder.add_response_data(&[0xF0, 0x0D, 0xCA, 0xFE]);
        assert_eq!(builder.response_data(), [0xF0, 0x0D, 0xCA, 0xFE]);
        let reply = builder.build_reply(StatusCode::Success).unwrap();
        assert_eq!(reply, [0x21, 0x01, 0x20, 0x00, 0x20, 0x60, 0x70, 0xC6]);
        let reply = builder.build(StatusCode::Success).unwrap();
        assert!(reply.data.is_empty());
        assert_eq!(command.data, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_build_is_repeatable() {
        let command = CommandPacket::from_bytes(&WRITE_COMMAND).unwrap();
        let mut builder = command.reply_builder().unwrap();
        builder.add_response_data(&[0x01]);
        let first = builder.build_reply(StatusCode::Success).unwrap();
        let second = builder.build_reply(StatusCode::Success).unwrap();
        assert_eq!(first, second);
        assert_eq!(builder.response_data(), [0x01]);
        assert_eq!(builder.command(), &command);
    }

    #[test]
    fn test_read_reply_with_response_data() {
        let command = CommandPacket::from_bytes_standard(&STANDARD_READ_COMMAND).unwrap();
        let mut builder = command.reply_builder().unwrap();
        builder.add_response_data(&[0xAA, 0xBB]);
        builder.add_response_data(&[0xF0, 0x0D, 0xCA, 0xFE]);
        let reply = builder.build(StatusCode::Success).unwrap();
        assert_eq!(reply.data, [0xF0, 0x0D, 0xCA, 0xFE]);
        assert_eq!(reply.initiator_logical_addr, 0x67);
        assert_eq!(reply.target_logical_addr, 0xFE);
        assert_eq!(reply.transaction_id, 0x0001);
        assert_eq!(reply.instruction().packet_type(), Ok(PacketType::Reply));
        assert!(reply.header_crc_valid());
        assert!(reply.data_crc_valid());
        assert_eq!(
            builder.build_reply(StatusCode::Success).unwrap(),
            [
                0x67, 0x01, 0x0C, 0x00, 0xFE, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x76, 0xF0,
                0x0D, 0xCA, 0xFE, 0x8E
            ]
        );
        // The command is untouched.
        assert!(command.data.is_empty());
    }

    #[test]
    fn test_read_reply_without_response_data() {
        let command = CommandPacket::from_bytes_standard(&STANDARD_READ_COMMAND).unwrap();
        let builder = command.reply_builder().unwrap();
        let reply = builder.build(StatusCode::Success).unwrap();
        assert!(reply.data.is_empty());
        assert_eq!(reply.len_packed(), crate::READ_REPLY_HEADER_LEN + 1);
    }

    #[test]
    fn test_failed_read_reply_has_no_data() {
        let command = CommandPacket::from_bytes_standard(&STANDARD_READ_COMMAND).unwrap();
        let mut builder = command.reply_builder().unwrap();
        builder.add_response_data(&[0x01, 0x02]);
        let reply = builder.build_reply(StatusCode::InvalidKey).unwrap();
        assert_eq!(
            reply,
            [0x67, 0x01, 0x0C, 0x03, 0xFE, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0xB7, 0x00]
        );
    }

    #[test]
    fn test_invalid_status() {
        let command = CommandPacket::from_bytes(&WRITE_COMMAND).unwrap();
        let builder = command.reply_builder().unwrap();
        assert_eq!(builder.build_reply(8_u8).unwrap_err(), RmapError::InvalidStatus(8));
        assert_eq!(
            builder.build_reply(13_u8).unwrap_err(),
            RmapError::InvalidStatus(13)
        );
        assert_eq!(builder.build_reply(0_u8).unwrap().len(), 8);
    }

    #[test]
    fn test_reply_uses_src_path_as_reply_path() {
        let command = CommandPacket::new(
            CommandFlags::new(true, true, true, false),
            0xFE,
            0x20,
            0x40,
            0x1234,
        )
        .with_dest_path_addr(&[0x03, 0x05])
        .with_src_path_addr(&[0x01, 0x02])
        .unwrap()
        .with_address(0x00, 0x4000_0010)
        .with_data(&[0x11, 0x22, 0x33])
        .unwrap();
        let reply = command
            .reply_builder()
            .unwrap()
            .build_reply(StatusCode::Success)
            .unwrap();
        assert_eq!(reply, [0x01, 0x02, 0x40, 0x01, 0x38, 0x00, 0xFE, 0x12, 0x34, 0x67]);
    }

    #[test]
    fn test_reply_builder_needs_command() {
        let mut command = CommandPacket::from_bytes(&WRITE_COMMAND).unwrap();
        command.instruction.set_packet_type(PacketType::Reply);
        assert_eq!(command.reply_builder().unwrap_err(), RmapError::NotACommand);
    }

    #[test]
    fn test_reply_of_rmw_carries_data() {
        let flags = CommandFlags::from_raw(0b0111).unwrap();
        let command = CommandPacket::new(flags, 0xFE, 0, 0x67, 2)
            .with_address(0, 0x20)
            .with_data(&[0xAA, 0x0F])
            .unwrap();
        let mut builder = command.reply_builder().unwrap();
        builder.add_response_data(&[0x5A]);
        let reply = builder.build(StatusCode::Success).unwrap();
        assert!(reply.has_data_field());
        assert_eq!(reply.data, [0x5A]);
    }

    #[test]
    fn test_oversized_response_data() {
        let command = CommandPacket::from_bytes_standard(&STANDARD_READ_COMMAND).unwrap();
        let mut builder = command.reply_builder().unwrap();
        builder.add_response_data(&alloc::vec![0; crate::MAX_DATA_LEN as usize + 1]);
        assert!(matches!(
            builder.build(StatusCode::Success).unwrap_err(),
            RmapError::InvalidPacketState {
                field: PacketField::DataLen,
                ..
            }
        ));
        // The data is only attached on success.
        assert!(builder.build(StatusCode::GeneralError).is_ok());
        builder.add_response_data(&alloc::vec![0; crate::MAX_DATA_LEN as usize]);
        let reply = builder.build(StatusCode::Success).unwrap();
        assert_eq!(reply.data.len(), crate::MAX_DATA_LEN as usize);
    }

    #[test]
    fn test_reply_to_reserved_code_has_no_data() {
        let flags = CommandFlags::from_raw(0b0101).unwrap();
        let command = CommandPacket::new(flags, 0xFE, 0, 0x67, 3);
        let mut builder = command.reply_builder().unwrap();
        builder.add_response_data(&[0x01]);
        let reply = builder.build(StatusCode::Success).unwrap();
        assert!(!reply.has_data_field());
        assert!(reply.data.is_empty());
        assert_eq!(builder.build_reply(StatusCode::Success).unwrap().len(), 8);
    }

    #[test]
    fn test_reply_path_must_be_encodable() {
        let flags = CommandFlags::new(true, false, true, false);
        let command = CommandPacket::new(flags, 0xFE, 0, 0x67, 4)
            .with_src_path_addr(&[0x01, 0x40])
            .unwrap();
        assert_eq!(
            command
                .reply_builder()
                .unwrap()
                .build(StatusCode::Success)
                .unwrap_err(),
            RmapError::InvalidAddress {
                field: PacketField::ReplyPathAddr,
                addr: 0x40
            }
        );
    }
}
