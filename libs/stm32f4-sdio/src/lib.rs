//! SD card driver for the STM32F4 SDIO host peripheral.
//!
//! Hardware access goes through [`SdioBus`], so the identification state
//! machine and the block I/O path can run against a scripted bus in tests.
//! Card presence follows the card-detect line: [`Card::try_accept`] is the
//! single entry point for both insertion and removal edges.

#![cfg_attr(not(test), no_std)]

use core::fmt::{Display, Formatter};

use log::{debug, info, warn};

use crate::register::*;

pub use crate::cmd::{Command, ResponseKind};
pub use crate::response::{CardId, CardStatus, IfCond, OpCond, RelativeAddress, Timestamp};

mod cmd;
pub mod register;
mod response;

/// Register-level access to the SDIO peripheral plus the two board lines
/// the driver depends on: card-detect input and peripheral power.
pub trait SdioBus {
    fn read_reg(&self, offset: usize) -> u32;
    fn write_reg(&mut self, offset: usize, value: u32);
    /// Level of the card-detect switch.
    fn card_present(&self) -> bool;
    /// Powers the peripheral up or down (clock gate and POWER register).
    fn power(&mut self, on: bool);
}

/// Notified when a card finishes identification or goes away. Returning
/// `false` from an insertion vetoes the card.
pub trait CardAcceptor: Sync {
    fn accept(&self, card: Option<&CardId>) -> bool;
}

/// Outcome of a block transfer, in decreasing translation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    NotReady,
    CommandError,
    Timeout,
    CrcFail,
    RxOverrun,
    TxUnderrun,
    StartBitError,
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            TransferError::NotReady => write!(f, "card not ready"),
            TransferError::CommandError => write!(f, "command error"),
            TransferError::Timeout => write!(f, "data timeout"),
            TransferError::CrcFail => write!(f, "data crc failure"),
            TransferError::RxOverrun => write!(f, "rx fifo overrun"),
            TransferError::TxUnderrun => write!(f, "tx fifo underrun"),
            TransferError::StartBitError => write!(f, "start bit error"),
        }
    }
}

pub type Result<T> = core::result::Result<T, TransferError>;

pub const BLOCK_SIZE: usize = 512;

const SDIO_CLOCK: u32 = 48_000_000;
const INITIAL_CLOCK: u32 = 400_000;
const INITIAL_CLOCK_DIVIDER: u32 = SDIO_CLOCK / INITIAL_CLOCK;
const DEFAULT_CLOCK_DIVIDER: u32 = 0;
const INITIAL_CLOCK_CONFIGURATION: u32 =
    INITIAL_CLOCK_DIVIDER | CLKCR_PWRSAV | CLKCR_CLKEN | CLKCR_HWFC_EN;

const OPERATION_VOLTAGE: u8 = 0b0001;
const VOLTAGE_CHECK_PATTERN: u8 = 0b1010_1010;
const HOST_PROTOCOL_V2_TAG: u32 = (OPERATION_VOLTAGE as u32) << 8 | VOLTAGE_CHECK_PATTERN as u32;

// SDSC (v1) or SDHC (v2) support, 3.2-3.4V.
const HOST_VOLTAGE_WINDOW: u32 = 0x30_0000;
const HOST_PROTOCOL_V1_SPECS: u32 = HOST_VOLTAGE_WINDOW;
const HOST_PROTOCOL_V2_SPECS: u32 = HOST_VOLTAGE_WINDOW | 0x4000_0000;

const WIDE_BUS_MODE: u32 = 0b10;

const FIFO_LENGTH: usize = 16;
const FIFO_GRANULARITY: usize = 4;

// 1 ms of card clock cycles at the working divider.
const DATA_TIMEOUT_GRANULARITY: u32 = SDIO_CLOCK / (DEFAULT_CLOCK_DIVIDER + 2) / 1000;
const READ_TIMEOUT: u32 = DATA_TIMEOUT_GRANULARITY * 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    Unknown,
    PhysicalSpecV1,
    PhysicalSpecV2,
}

/// Identified card: published relative address plus decoded CID.
#[derive(Debug, Clone, Copy)]
pub struct DeviceInfo {
    pub address: u32,
    pub id: CardId,
}

/// The SD card slot. At most one card; `device` holds the identified state.
pub struct Card<B: SdioBus> {
    bus: B,
    device: Option<DeviceInfo>,
    acceptor: Option<&'static dyn CardAcceptor>,
}

impl<B: SdioBus> Card<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            device: None,
            acceptor: None,
        }
    }

    pub fn set_acceptor(&mut self, acceptor: &'static dyn CardAcceptor) {
        self.acceptor = Some(acceptor);
    }

    pub fn ready(&self) -> bool {
        self.device.is_some()
    }

    pub fn id(&self) -> Option<&CardId> {
        self.device.as_ref().map(|device| &device.id)
    }

    /// Re-evaluates the slot after a card-detect edge (either direction).
    pub fn try_accept(&mut self) {
        if !self.bus.card_present() {
            self.set_not_ready();
        } else if !self.ready() {
            self.try_get_ready();
        }
    }

    /// Reads `buffer.len() / 512` consecutive blocks starting at `lba`.
    pub fn read(&mut self, lba: u32, buffer: &mut [u8]) -> Result<()> {
        if !self.ready() {
            return Err(TransferError::NotReady);
        }
        debug_assert!(!buffer.is_empty() && buffer.len() % BLOCK_SIZE == 0);
        let block_count = buffer.len() / BLOCK_SIZE;

        let wait_mask = if block_count == 1 {
            self.command(Command::ReadSingleBlock, lba)
                .ok_or(TransferError::CommandError)?;
            Status::SINGLE_BLOCK_READ_WAIT_MASK
        } else {
            self.command(Command::ReadMultipleBlock, lba)
                .ok_or(TransferError::CommandError)?;
            Status::MULTI_BLOCK_READ_WAIT_MASK
        };

        self.drain_fifo(buffer, wait_mask);

        if block_count > 1 {
            self.command(Command::StopTransmission, 0)
                .ok_or(TransferError::CommandError)?;
        }

        translate_block_io_status(Status::from_bits_truncate(self.bus.read_reg(STA_REG)))
    }

    /// Block writes are not supported by this firmware.
    pub fn write(&mut self, _lba: u32, _buffer: &[u8]) -> Result<()> {
        if !self.ready() {
            return Err(TransferError::NotReady);
        }
        Err(TransferError::CommandError)
    }

    /// One register write to ARG and one to CMD, then a poll on STA until
    /// the wait mask for the command's response class is met. `None` when
    /// the error mask fires.
    pub fn command(&mut self, command: Command, arg: u32) -> Option<[u32; 4]> {
        let kind = command.response_kind();
        self.bus.write_reg(ICR_REG, Status::CMD_CLEAR_MASK.bits());
        self.bus.write_reg(ARG_REG, arg);
        self.bus.write_reg(
            CMD_REG,
            command.index() as u32 | command.native_response_bits() | CMD_CPSMEN,
        );

        let status = loop {
            let status = Status::from_bits_truncate(self.bus.read_reg(STA_REG));
            if status.intersects(kind.wait_mask()) {
                break status;
            }
        };
        if status.intersects(kind.error_mask()) {
            debug!("cmd{} failed, status {:?}", command.index(), status);
            return None;
        }
        Some([
            self.bus.read_reg(RESP1_REG),
            self.bus.read_reg(RESP2_REG),
            self.bus.read_reg(RESP3_REG),
            self.bus.read_reg(RESP4_REG),
        ])
    }

    fn set_not_ready(&mut self) {
        if self.device.take().is_some() {
            info!("card removed");
        }
        if let Some(acceptor) = self.acceptor {
            acceptor.accept(None);
        }
        self.bus.power(false);
    }

    fn try_get_ready(&mut self) {
        self.bus.power(true);
        self.bus.write_reg(CLKCR_REG, INITIAL_CLOCK_CONFIGURATION);
        match self.identify() {
            Some(device) => {
                let accepted = self
                    .acceptor
                    .map_or(true, |acceptor| acceptor.accept(Some(&device.id)));
                if accepted {
                    info!("card ready: {}", device.id);
                    self.device = Some(device);
                } else {
                    self.bus.power(false);
                }
            }
            None => {
                warn!("card identification failed");
                self.bus.power(false);
            }
        }
    }

    fn identify(&mut self) -> Option<DeviceInfo> {
        self.command(Command::GoIdleState, 0)?;

        if self.recognize_protocol() == Protocol::Unknown {
            return None;
        }

        self.command(Command::SendCardIdNumber, 0)?;

        let rca = RelativeAddress::from(self.command(Command::SendRelativeAddress, 0)?[0]);
        let address_for_selection = (rca.address() as u32) << 16;

        let id = CardId::parse(self.command(Command::SendCardId, address_for_selection)?);

        // Identification is done, enter high-speed mode.
        self.set_clock_divider(DEFAULT_CLOCK_DIVIDER as u8);

        self.command(Command::SelectOrDeselect, address_for_selection)?;

        if !self.setup_data_bus(address_for_selection) {
            return None;
        }

        Some(DeviceInfo {
            address: address_for_selection,
            id,
        })
    }

    fn recognize_protocol(&mut self) -> Protocol {
        match self.command(Command::SendIfCondition, HOST_PROTOCOL_V2_TAG) {
            // v1.0 or unusable card.
            None => {
                if self.initialize_device(HOST_PROTOCOL_V1_SPECS) {
                    Protocol::PhysicalSpecV1
                } else {
                    Protocol::Unknown
                }
            }
            Some(words) => {
                let echo = IfCond::from(words[0]);
                if echo.vhs() != OPERATION_VOLTAGE || echo.pattern() != VOLTAGE_CHECK_PATTERN {
                    Protocol::Unknown
                } else if self.initialize_device(HOST_PROTOCOL_V2_SPECS) {
                    Protocol::PhysicalSpecV2
                } else {
                    Protocol::Unknown
                }
            }
        }
    }

    /// ACMD41 loop: repeats until the operation-conditions register stops
    /// reporting busy. Any command failure aborts.
    fn initialize_device(&mut self, host_specs: u32) -> bool {
        loop {
            match self.command(Command::ApplicationSpecific, 0) {
                None => return false,
                Some(words) if !CardStatus::from(words[0]).app_cmd() => continue,
                Some(_) => {}
            }
            match self.command(Command::SendOperationCondition, host_specs) {
                None => return false,
                Some(words) => {
                    if !OpCond::from(words[0]).busy() {
                        return true;
                    }
                }
            }
        }
    }

    fn setup_data_bus(&mut self, address_for_selection: u32) -> bool {
        let Some(words) = self.command(Command::SetBlockLen, BLOCK_SIZE as u32) else {
            return false;
        };
        if CardStatus::from(words[0]).block_len_error() {
            return false;
        }
        if self
            .command(Command::ApplicationSpecific, address_for_selection)
            .is_none()
        {
            return false;
        }
        if self.command(Command::SetBusWidth, WIDE_BUS_MODE).is_none() {
            return false;
        }
        let clkcr = self.bus.read_reg(CLKCR_REG);
        self.bus.write_reg(CLKCR_REG, clkcr | CLKCR_WIDBUS_4BIT);
        true
    }

    fn set_clock_divider(&mut self, divider: u8) {
        let clkcr = self.bus.read_reg(CLKCR_REG) & !CLKCR_CLKDIV_MASK;
        self.bus.write_reg(CLKCR_REG, clkcr | divider as u32);
    }

    /// Programs the data path and copies FIFO words out until the wait
    /// mask fires, then drains the residue the controller still holds.
    fn drain_fifo(&mut self, buffer: &mut [u8], wait_mask: Status) {
        self.bus.write_reg(DTIMER_REG, READ_TIMEOUT);
        self.bus.write_reg(DLEN_REG, buffer.len() as u32);
        self.bus.write_reg(ICR_REG, Status::DATA_CLEAR_MASK.bits());
        self.bus.write_reg(
            DCTRL_REG,
            DCTRL_DTEN | DCTRL_DTDIR_FROM_CARD | DCTRL_DBLOCKSIZE_512 | DCTRL_SDIOEN,
        );

        let mut offset = 0;
        loop {
            let status = Status::from_bits_truncate(self.bus.read_reg(STA_REG));
            if status.contains(Status::RXFIFOF) {
                for _ in 0..FIFO_LENGTH {
                    self.pull_fifo_word(buffer, &mut offset);
                }
            }
            if status.intersects(wait_mask) {
                break;
            }
        }
        while Status::from_bits_truncate(self.bus.read_reg(STA_REG)).contains(Status::RXDAVL) {
            self.pull_fifo_word(buffer, &mut offset);
        }
    }

    fn pull_fifo_word(&mut self, buffer: &mut [u8], offset: &mut usize) {
        let word = self.bus.read_reg(FIFO_REG);
        if *offset + FIFO_GRANULARITY <= buffer.len() {
            buffer[*offset..*offset + FIFO_GRANULARITY].copy_from_slice(&word.to_le_bytes());
        }
        *offset += FIFO_GRANULARITY;
    }
}

fn translate_block_io_status(status: Status) -> Result<()> {
    if status.contains(Status::DTIMEOUT) {
        Err(TransferError::Timeout)
    } else if status.contains(Status::DCRCFAIL) {
        Err(TransferError::CrcFail)
    } else if status.contains(Status::RXOVERR) {
        Err(TransferError::RxOverrun)
    } else if status.contains(Status::TXUNDERR) {
        Err(TransferError::TxUnderrun)
    } else if status.contains(Status::STBITERR) {
        Err(TransferError::StartBitError)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::vec::Vec;

    /// One scripted command exchange: expected CMD index and argument,
    /// the STA value the poll loop should observe, and the response words.
    struct Exchange {
        index: u8,
        arg: u32,
        status: Status,
        response: [u32; 4],
    }

    impl Exchange {
        fn ok(index: u8, arg: u32, response: [u32; 4]) -> Self {
            Self {
                index,
                arg,
                status: Status::CMDREND,
                response,
            }
        }

        fn sent(index: u8, arg: u32) -> Self {
            Self {
                index,
                arg,
                status: Status::CMDSENT,
                response: [0; 4],
            }
        }

        fn error(index: u8, arg: u32, status: Status) -> Self {
            Self {
                index,
                arg,
                status,
                response: [0; 4],
            }
        }
    }

    struct ScriptedBus {
        present: bool,
        powered: Vec<bool>,
        script: VecDeque<Exchange>,
        current: Option<Exchange>,
        pending_arg: u32,
        fifo: VecDeque<u32>,
        data_phase: bool,
        data_error: Status,
    }

    impl ScriptedBus {
        fn with_script(present: bool, script: Vec<Exchange>) -> Self {
            Self {
                present,
                powered: Vec::new(),
                script: script.into(),
                current: None,
                pending_arg: 0,
                fifo: VecDeque::new(),
                data_phase: false,
                data_error: Status::empty(),
            }
        }
    }

    impl SdioBus for ScriptedBus {
        fn read_reg(&self, offset: usize) -> u32 {
            match offset {
                STA_REG => {
                    let mut status = self
                        .current
                        .as_ref()
                        .map_or(Status::empty(), |exchange| exchange.status);
                    if self.data_phase {
                        status |= Status::DATAEND | Status::DBCKEND | self.data_error;
                        if self.fifo.len() >= FIFO_LENGTH {
                            status |= Status::RXFIFOF;
                        }
                        if !self.fifo.is_empty() {
                            status |= Status::RXDAVL;
                        }
                    }
                    status.bits()
                }
                RESP1_REG => self.current.as_ref().unwrap().response[0],
                RESP2_REG => self.current.as_ref().unwrap().response[1],
                RESP3_REG => self.current.as_ref().unwrap().response[2],
                RESP4_REG => self.current.as_ref().unwrap().response[3],
                CLKCR_REG => 0,
                FIFO_REG => panic!("FIFO must be read through write-side state"),
                _ => 0,
            }
        }

        fn write_reg(&mut self, offset: usize, value: u32) {
            match offset {
                ARG_REG => self.pending_arg = value,
                CMD_REG => {
                    let exchange = self
                        .script
                        .pop_front()
                        .unwrap_or_else(|| panic!("unexpected command {}", value & 0x3F));
                    assert_eq!(value & CMD_INDEX_MASK, exchange.index as u32);
                    assert_eq!(self.pending_arg, exchange.arg);
                    assert_ne!(value & CMD_CPSMEN, 0);
                    self.current = Some(exchange);
                }
                DCTRL_REG => {
                    if value & DCTRL_DTEN != 0 {
                        self.data_phase = true;
                    }
                }
                _ => {}
            }
        }

        fn card_present(&self) -> bool {
            self.present
        }

        fn power(&mut self, on: bool) {
            self.powered.push(on);
            if !on {
                self.data_phase = false;
            }
        }
    }

    // ScriptedBus::read_reg cannot pop the FIFO through &self; route FIFO
    // reads through a thread-local-free interior queue instead.
    struct FifoBus(std::cell::RefCell<ScriptedBus>);

    impl SdioBus for FifoBus {
        fn read_reg(&self, offset: usize) -> u32 {
            if offset == FIFO_REG {
                return self.0.borrow_mut().fifo.pop_front().unwrap_or(0);
            }
            self.0.borrow().read_reg(offset)
        }

        fn write_reg(&mut self, offset: usize, value: u32) {
            self.0.borrow_mut().write_reg(offset, value)
        }

        fn card_present(&self) -> bool {
            self.0.borrow().card_present()
        }

        fn power(&mut self, on: bool) {
            self.0.borrow_mut().power(on)
        }
    }

    fn v2_identify_script(rca: u32) -> Vec<Exchange> {
        let address = rca << 16;
        vec![
            Exchange::sent(0, 0),
            Exchange::ok(8, HOST_PROTOCOL_V2_TAG, [0x0000_01AA, 0, 0, 0]),
            Exchange::ok(55, 0, [1 << 5, 0, 0, 0]),
            Exchange::ok(41, HOST_PROTOCOL_V2_SPECS, [0xC030_0000, 0, 0, 0]),
            Exchange::ok(2, 0, [0xDEAD_BEEF, 0, 0, 0]),
            Exchange::ok(3, 0, [address, 0, 0, 0]),
            Exchange::ok(
                10,
                address,
                [
                    0x0353_4453,
                    u32::from_le_bytes(*b"C16G"),
                    0x8001_2345,
                    0x6701_2700,
                ],
            ),
            Exchange::ok(7, address, [0, 0, 0, 0]),
            Exchange::ok(16, 512, [0, 0, 0, 0]),
            Exchange::ok(55, address, [1 << 5, 0, 0, 0]),
            Exchange::ok(6, WIDE_BUS_MODE, [0, 0, 0, 0]),
        ]
    }

    struct Recorder(Mutex<Vec<Option<CardId>>>);

    impl CardAcceptor for Recorder {
        fn accept(&self, card: Option<&CardId>) -> bool {
            self.0.lock().unwrap().push(card.copied());
            true
        }
    }

    #[test]
    fn identifies_a_v2_card_on_insertion() {
        let bus = ScriptedBus::with_script(true, v2_identify_script(0x1234));
        let mut card = Card::new(bus);
        card.try_accept();
        assert!(card.ready());
        assert_eq!(&card.id().unwrap().product_name, b"SC16G");
        assert_eq!(card.bus.powered, vec![true]);
        assert!(card.bus.script.is_empty());
    }

    #[test]
    fn falls_back_to_v1_when_if_cond_times_out() {
        let script = vec![
            Exchange::sent(0, 0),
            Exchange::error(8, HOST_PROTOCOL_V2_TAG, Status::CTIMEOUT),
            Exchange::ok(55, 0, [1 << 5, 0, 0, 0]),
            Exchange::ok(41, HOST_PROTOCOL_V1_SPECS, [0x8030_0000, 0, 0, 0]),
            Exchange::ok(2, 0, [0, 0, 0, 0]),
            Exchange::ok(3, 0, [0x0001_0000, 0, 0, 0]),
            Exchange::ok(10, 0x0001_0000, [0, 0, 0, 0]),
            Exchange::ok(7, 0x0001_0000, [0, 0, 0, 0]),
            Exchange::ok(16, 512, [0, 0, 0, 0]),
            Exchange::ok(55, 0x0001_0000, [1 << 5, 0, 0, 0]),
            Exchange::ok(6, WIDE_BUS_MODE, [0, 0, 0, 0]),
        ];
        let mut card = Card::new(ScriptedBus::with_script(true, script));
        card.try_accept();
        assert!(card.ready());
    }

    #[test]
    fn repeats_acmd41_while_the_card_reports_busy() {
        let mut script = vec![
            Exchange::sent(0, 0),
            Exchange::ok(8, HOST_PROTOCOL_V2_TAG, [0x0000_01AA, 0, 0, 0]),
            Exchange::ok(55, 0, [1 << 5, 0, 0, 0]),
            Exchange::ok(41, HOST_PROTOCOL_V2_SPECS, [0x0030_0000, 0, 0, 0]),
        ];
        script.extend(v2_identify_script(0x0001).into_iter().skip(2));
        let mut card = Card::new(ScriptedBus::with_script(true, script));
        card.try_accept();
        assert!(card.ready());
    }

    #[test]
    fn powers_down_when_identification_fails() {
        let script = vec![
            Exchange::sent(0, 0),
            Exchange::error(8, HOST_PROTOCOL_V2_TAG, Status::CTIMEOUT),
            Exchange::error(55, 0, Status::CTIMEOUT),
        ];
        let mut card = Card::new(ScriptedBus::with_script(true, script));
        card.try_accept();
        assert!(!card.ready());
        assert_eq!(card.bus.powered, vec![true, false]);
    }

    #[test]
    fn removal_notifies_the_acceptor_and_powers_down() {
        static RECORDER: Recorder = Recorder(Mutex::new(Vec::new()));
        let mut card = Card::new(ScriptedBus::with_script(false, vec![]));
        card.set_acceptor(&RECORDER);
        card.try_accept();
        assert!(!card.ready());
        assert_eq!(card.bus.powered, vec![false]);
        assert_eq!(RECORDER.0.lock().unwrap().as_slice(), &[None]);
    }

    #[test]
    fn single_block_read_drains_the_fifo_in_order() {
        let mut inner = ScriptedBus::with_script(true, v2_identify_script(0x0001));
        inner.script.push_back(Exchange::ok(17, 9, [0, 0, 0, 0]));
        inner.fifo = (0..128u32).collect();
        let mut card = Card::new(FifoBus(std::cell::RefCell::new(inner)));
        card.try_accept();
        assert!(card.ready());

        let mut buffer = [0u8; 512];
        card.read(9, &mut buffer).unwrap();
        for (word_idx, chunk) in buffer.chunks(4).enumerate() {
            assert_eq!(chunk, (word_idx as u32).to_le_bytes());
        }
    }

    #[test]
    fn multi_block_read_sends_stop_transmission() {
        let mut inner = ScriptedBus::with_script(true, v2_identify_script(0x0001));
        inner.script.push_back(Exchange::ok(18, 0, [0, 0, 0, 0]));
        inner.script.push_back(Exchange::ok(12, 0, [0, 0, 0, 0]));
        inner.fifo = (0..256u32).collect();
        let mut card = Card::new(FifoBus(std::cell::RefCell::new(inner)));
        card.try_accept();

        let mut buffer = [0u8; 1024];
        card.read(0, &mut buffer).unwrap();
        assert!(card.bus.0.borrow().script.is_empty());
    }

    #[test]
    fn data_errors_translate_in_priority_order() {
        let mut inner = ScriptedBus::with_script(true, v2_identify_script(0x0001));
        inner.script.push_back(Exchange::ok(17, 0, [0, 0, 0, 0]));
        inner.data_error = Status::DTIMEOUT | Status::DCRCFAIL;
        let mut card = Card::new(FifoBus(std::cell::RefCell::new(inner)));
        card.try_accept();

        let mut buffer = [0u8; 512];
        assert_eq!(card.read(0, &mut buffer), Err(TransferError::Timeout));
    }

    #[test]
    fn reads_require_an_identified_card() {
        let mut card = Card::new(ScriptedBus::with_script(false, vec![]));
        let mut buffer = [0u8; 512];
        assert_eq!(card.read(0, &mut buffer), Err(TransferError::NotReady));
    }

    #[test]
    fn writes_are_not_supported() {
        let mut card = Card::new(ScriptedBus::with_script(true, v2_identify_script(1)));
        card.try_accept();
        assert_eq!(card.write(0, &[0u8; 512]), Err(TransferError::CommandError));
    }

    #[test]
    fn translation_priority_matches_the_status_bits() {
        assert_eq!(
            translate_block_io_status(Status::DCRCFAIL | Status::RXOVERR),
            Err(TransferError::CrcFail)
        );
        assert_eq!(
            translate_block_io_status(Status::STBITERR),
            Err(TransferError::StartBitError)
        );
        assert_eq!(translate_block_io_status(Status::DBCKEND), Ok(()));
    }
}
