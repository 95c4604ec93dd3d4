//! Framed byte link shared with the companion device.
//!
//! Both directions carry the same block format: a one-byte header followed
//! by 1..=64 payload bytes. The incoming side is a UART feeding
//! [`parser::RequestParser`]; the outgoing side is the strobed parallel
//! port behind [`transmitter::Transmitter`].

pub mod parser;
pub mod receiver;
pub mod transmitter;

use crate::command::Command;

/// Payload kind carried by one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Category {
    Data = 0x1,
    Command = 0x2,
}

/// One-byte block header: bits `[7:6]` are the category, bits `[5:0]`
/// store `length - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub category: Category,
    pub length: u8,
}

impl BlockHeader {
    pub const MAX_LENGTH: usize = 64;

    /// `length` must be in `1..=64`.
    pub fn new(category: Category, length: u8) -> Self {
        debug_assert!(length != 0, "invalid block header");
        debug_assert!(length as usize <= Self::MAX_LENGTH, "block is too large");
        Self { category, length }
    }

    pub fn serialize(self) -> u8 {
        (self.category as u8) << 6 | (self.length - 1)
    }

    /// Rejects any byte whose category bits decode to neither `Data` nor
    /// `Command`.
    pub fn deserialize(value: u8) -> Option<Self> {
        let category = match value >> 6 {
            0x1 => Category::Data,
            0x2 => Category::Command,
            _ => return None,
        };
        Some(Self {
            category,
            length: (value & 0x3F) + 1,
        })
    }
}

/// Outbound side of the link as the rest of the firmware sees it.
///
/// Implemented by [`transmitter::Transmitter`]; kept as a trait so the
/// streaming and command paths can be exercised against a recording fake.
pub trait DataLink {
    /// Queues `buffer` as consecutive `Data` blocks of at most 64 bytes.
    fn send_data(&self, buffer: &[u8]);
    /// Queues `commands` as `Command` blocks of at most 64 opcodes.
    fn send_commands(&self, commands: &[Command]);
    /// Free space left in the transmit queue, in bytes.
    fn remaining_queue_size(&self) -> usize;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_valid_header() {
        for category in [Category::Data, Category::Command] {
            for length in 1..=64u8 {
                let header = BlockHeader::new(category, length);
                let decoded = BlockHeader::deserialize(header.serialize());
                assert_eq!(decoded, Some(header));
            }
        }
    }

    #[test]
    fn rejects_bytes_with_invalid_category_bits() {
        assert_eq!(BlockHeader::deserialize(0x00), None);
        assert_eq!(BlockHeader::deserialize(0x3F), None);
        for value in 0xC0..=0xFFu8 {
            assert_eq!(BlockHeader::deserialize(value), None);
        }
    }

    #[test]
    fn known_encodings() {
        assert_eq!(BlockHeader::new(Category::Data, 64).serialize(), 0x7F);
        assert_eq!(BlockHeader::new(Category::Command, 1).serialize(), 0x80);
        assert_eq!(
            BlockHeader::deserialize(0xBF),
            Some(BlockHeader::new(Category::Command, 64))
        );
    }
}
