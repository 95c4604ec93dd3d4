//! Command indices issued to the card and their response classes.

use crate::register::{
    Status, CMD_WAITRESP_LONG, CMD_WAITRESP_NONE, CMD_WAITRESP_SHORT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    GoIdleState = 0,
    SendCardIdNumber = 2,
    SendRelativeAddress = 3,
    SetBusWidth = 6,
    SelectOrDeselect = 7,
    SendIfCondition = 8,
    SendCardId = 10,
    StopTransmission = 12,
    SetBlockLen = 16,
    ReadSingleBlock = 17,
    ReadMultipleBlock = 18,
    SendOperationCondition = 41,
    ApplicationSpecific = 55,
}

/// What the status-poll loop should wait for and how to interpret the
/// response words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Empty,
    CardStatus,
    CardIdNumber,
    CardId,
    OpCond,
    RelativeAddress,
    IfCond,
}

impl Command {
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn response_kind(self) -> ResponseKind {
        match self {
            Command::SetBusWidth
            | Command::SelectOrDeselect
            | Command::StopTransmission
            | Command::SetBlockLen
            | Command::ReadSingleBlock
            | Command::ReadMultipleBlock
            | Command::ApplicationSpecific => ResponseKind::CardStatus,
            Command::SendCardIdNumber => ResponseKind::CardIdNumber,
            Command::SendCardId => ResponseKind::CardId,
            Command::SendOperationCondition => ResponseKind::OpCond,
            Command::SendRelativeAddress => ResponseKind::RelativeAddress,
            Command::SendIfCondition => ResponseKind::IfCond,
            Command::GoIdleState => ResponseKind::Empty,
        }
    }

    /// WAITRESP bits for the CMD register.
    pub(crate) fn native_response_bits(self) -> u32 {
        match self {
            Command::GoIdleState => CMD_WAITRESP_NONE,
            Command::SendCardIdNumber | Command::SendCardId => CMD_WAITRESP_LONG,
            _ => CMD_WAITRESP_SHORT,
        }
    }
}

impl ResponseKind {
    pub(crate) fn wait_mask(self) -> Status {
        match self {
            ResponseKind::Empty => Status::CMD_ERROR_MASK | Status::CMDSENT,
            _ => Status::CMD_ERROR_MASK | Status::CMDREND,
        }
    }

    /// R3 and the long identification responses carry no valid CRC, so a
    /// CRC failure is not an error for them.
    pub(crate) fn error_mask(self) -> Status {
        match self {
            ResponseKind::CardId | ResponseKind::OpCond => Status::CTIMEOUT,
            _ => Status::CMD_ERROR_MASK,
        }
    }
}
