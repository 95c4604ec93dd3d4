//! SDIO peripheral register map and bit masks.
//!
//! Offsets are relative to the peripheral base so the bus trait can be
//! implemented over any mapping.

use bitflags::bitflags;

pub const POWER_REG: usize = 0x00;
pub const CLKCR_REG: usize = 0x04;
pub const ARG_REG: usize = 0x08;
pub const CMD_REG: usize = 0x0C;
pub const RESPCMD_REG: usize = 0x10;
pub const RESP1_REG: usize = 0x14;
pub const RESP2_REG: usize = 0x18;
pub const RESP3_REG: usize = 0x1C;
pub const RESP4_REG: usize = 0x20;
pub const DTIMER_REG: usize = 0x24;
pub const DLEN_REG: usize = 0x28;
pub const DCTRL_REG: usize = 0x2C;
pub const DCOUNT_REG: usize = 0x30;
pub const STA_REG: usize = 0x34;
pub const ICR_REG: usize = 0x38;
pub const MASK_REG: usize = 0x3C;
pub const FIFOCNT_REG: usize = 0x48;
pub const FIFO_REG: usize = 0x80;

bitflags! {
    /// STA register contents; the ICR clear bits share the same layout.
    pub struct Status: u32 {
        const CCRCFAIL = 1 << 0;
        const DCRCFAIL = 1 << 1;
        const CTIMEOUT = 1 << 2;
        const DTIMEOUT = 1 << 3;
        const TXUNDERR = 1 << 4;
        const RXOVERR = 1 << 5;
        const CMDREND = 1 << 6;
        const CMDSENT = 1 << 7;
        const DATAEND = 1 << 8;
        const STBITERR = 1 << 9;
        const DBCKEND = 1 << 10;
        const CMDACT = 1 << 11;
        const TXACT = 1 << 12;
        const RXACT = 1 << 13;
        const TXFIFOHE = 1 << 14;
        const RXFIFOHF = 1 << 15;
        const TXFIFOF = 1 << 16;
        const RXFIFOF = 1 << 17;
        const TXFIFOE = 1 << 18;
        const RXFIFOE = 1 << 19;
        const TXDAVL = 1 << 20;
        const RXDAVL = 1 << 21;
        const SDIOIT = 1 << 22;
        const CEATAEND = 1 << 23;
    }
}

// CMD register: command index in [5:0], response length in [7:6], CPSM
// enable in bit 10.
pub const CMD_INDEX_MASK: u32 = 0x3F;
pub const CMD_WAITRESP_SHORT: u32 = 1 << 6;
pub const CMD_WAITRESP_NONE: u32 = 1 << 7;
pub const CMD_WAITRESP_LONG: u32 = 3 << 6;
pub const CMD_CPSMEN: u32 = 1 << 10;

// CLKCR register.
pub const CLKCR_CLKDIV_MASK: u32 = 0xFF;
pub const CLKCR_CLKEN: u32 = 1 << 8;
pub const CLKCR_PWRSAV: u32 = 1 << 9;
pub const CLKCR_WIDBUS_4BIT: u32 = 1 << 11;
pub const CLKCR_HWFC_EN: u32 = 1 << 14;

// DCTRL register; DBLOCKSIZE[7:4] holds log2 of the block length.
pub const DCTRL_DTEN: u32 = 1 << 0;
pub const DCTRL_DTDIR_FROM_CARD: u32 = 1 << 1;
pub const DCTRL_DBLOCKSIZE_512: u32 = 0b1001 << 4;
pub const DCTRL_SDIOEN: u32 = 1 << 11;

// POWER register.
pub const POWER_ON: u32 = 0b11;

impl Status {
    pub const CMD_ERROR_MASK: Status =
        Status::from_bits_truncate(Status::CCRCFAIL.bits() | Status::CTIMEOUT.bits());
    pub const CMD_CLEAR_MASK: Status = Status::from_bits_truncate(
        Status::CCRCFAIL.bits()
            | Status::CTIMEOUT.bits()
            | Status::CMDREND.bits()
            | Status::CMDSENT.bits(),
    );
    pub const DATA_CLEAR_MASK: Status = Status::from_bits_truncate(
        Status::DCRCFAIL.bits()
            | Status::DTIMEOUT.bits()
            | Status::TXUNDERR.bits()
            | Status::RXOVERR.bits()
            | Status::DATAEND.bits()
            | Status::DBCKEND.bits(),
    );

    const IO_WAIT_BITS: u32 =
        Status::DCRCFAIL.bits() | Status::DTIMEOUT.bits() | Status::STBITERR.bits();

    pub const SINGLE_BLOCK_READ_WAIT_MASK: Status = Status::from_bits_truncate(
        Self::IO_WAIT_BITS | Status::DBCKEND.bits() | Status::RXOVERR.bits(),
    );
    pub const MULTI_BLOCK_READ_WAIT_MASK: Status = Status::from_bits_truncate(
        Self::IO_WAIT_BITS | Status::DATAEND.bits() | Status::RXOVERR.bits(),
    );
}
