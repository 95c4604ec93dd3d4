//! Bit-exact views of the response words returned by the card.

use bitfield_struct::bitfield;
use core::fmt::{Display, Formatter};

/// R1 card status, as mirrored in RESP1.
#[bitfield(u32, order = Msb)]
pub struct CardStatus {
    pub out_of_range: bool,
    pub address_error: bool,
    pub block_len_error: bool,
    pub erase_seq_error: bool,
    pub erase_param: bool,
    pub wp_violation: bool,
    pub card_is_locked: bool,
    pub lock_unlock_failed: bool,
    pub command_crc_error: bool,
    pub illegal_command: bool,
    pub card_ecc_failed: bool,
    pub controller_error: bool,
    pub unknown_error: bool,
    #[bits(2)]
    reserved: u8,
    pub csd_overwrite: bool,
    pub wp_erase_skip: bool,
    pub card_ecc_disable: bool,
    pub erase_reset: bool,
    #[bits(4)]
    pub current_state: u8,
    pub ready_for_data: bool,
    reserved1: bool,
    pub fx_event: bool,
    pub app_cmd: bool,
    reserved2: bool,
    pub ake_seq_error: bool,
    #[bits(3)]
    reserved3: u8,
}

/// R3 operation conditions register.
#[bitfield(u32, order = Msb)]
pub struct OpCond {
    /// Initialization finished; the card reports busy while this is clear.
    pub powered_up: bool,
    pub high_capacity: bool,
    pub uhs2: bool,
    reserved: bool,
    pub over_2tb_support: bool,
    #[bits(2)]
    reserved1: u8,
    pub accepted_1_8v: bool,
    #[bits(9)]
    pub voltage: u16,
    #[bits(7)]
    reserved2: u8,
    pub low_voltage: bool,
    #[bits(7)]
    reserved3: u8,
}

impl OpCond {
    pub fn busy(&self) -> bool {
        !self.powered_up()
    }
}

/// R7 interface condition echo.
#[bitfield(u32, order = Msb)]
pub struct IfCond {
    #[bits(16)]
    reserved: u16,
    pub vhs: u8,
    pub pattern: u8,
}

/// R6 published relative card address.
#[bitfield(u32, order = Msb)]
pub struct RelativeAddress {
    #[bits(16)]
    pub address: u16,
    #[bits(16)]
    pub irq_data: u16,
}

/// Manufacturing date from the CID register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u8,
    pub month: u8,
}

/// Decoded 128-bit card identification register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardId {
    pub manufacturer_id: u8,
    pub oem_id: [u8; 2],
    pub product_name: [u8; 5],
    pub revision: u8,
    pub serial_number: u32,
    pub manufacturing_date: Timestamp,
}

impl CardId {
    /// Splits the four response words of a long response.
    pub fn parse(words: [u32; 4]) -> Self {
        let [r1, r2, r3, r4] = words;
        let r2_bytes = r2.to_le_bytes();
        Self {
            manufacturer_id: (r1 >> 24) as u8,
            oem_id: [(r1 >> 16) as u8, (r1 >> 8) as u8],
            product_name: [r1 as u8, r2_bytes[0], r2_bytes[1], r2_bytes[2], r2_bytes[3]],
            revision: (r3 >> 24) as u8,
            serial_number: (r3 & 0x00FF_FFFF) << 8 | r4 >> 24,
            manufacturing_date: Timestamp {
                year: (r4 >> 12) as u8,
                month: (r4 >> 8) as u8 & 0xF,
            },
        }
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "mid:{:#04x} oem:", self.manufacturer_id)?;
        for byte in self.oem_id {
            write!(f, "{}", byte as char)?;
        }
        write!(f, " pnm:")?;
        for byte in self.product_name {
            write!(f, "{}", byte as char)?;
        }
        write!(
            f,
            " rev:{}.{} psn:{} mdt:{}-{}",
            self.revision >> 4,
            self.revision & 0xF,
            self.serial_number,
            self.manufacturing_date.year as usize + 2000,
            self.manufacturing_date.month
        )
    }
}
