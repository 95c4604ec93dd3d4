//! Outgoing half of the link: a queued byte transmitter over an 8-bit
//! parallel port with RTS/CTS/OV flow control.
//!
//! Per byte: the driver latches the data lines, waits `pass_delay` on the
//! one-pulse timer, then raises RTS. The peer answers CTS (advance) or OV
//! (retry the same byte after `retry_delay`). `transfer` runs in the main
//! loop; `pass_next`, `retry` and `set_ready` run from interrupts. The
//! queue stays single-producer/single-consumer because interrupts consume
//! only while `active` is set, and the loop pops only while it is clear.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::board::{LinkPins, TransferTimer};
use crate::command::Command;
use crate::config::TX_QUEUE_DEPTH;
use crate::storage::Ring;
use crate::transceiver::{BlockHeader, Category, DataLink};

/// The outbound link singleton; interrupts reach it through the `on_*`
/// entry points below.
pub static TRANSMITTER: Transmitter<LinkPins, TransferTimer> =
    Transmitter::new(LinkPins, TransferTimer, DEFAULT_SETTINGS);

/// OV rising-edge interrupt entry point.
pub fn on_overwrite() {
    TRANSMITTER.port().retry();
}

/// CTS rising-edge interrupt entry point.
pub fn on_clear_to_send() {
    TRANSMITTER.port().pass_next();
}

/// One-pulse timer interrupt entry point.
pub fn on_ready_to_send() {
    TRANSMITTER.port().set_ready();
}

/// Output lines of the port: eight data lanes plus RTS.
pub trait PortPins {
    fn expose_data(&self, value: u8);
    fn set_rts(&self, ready: bool);
}

/// One-pulse timer used to pace RTS edges, microsecond resolution.
pub trait PulseTimer {
    fn arm_micros(&self, delay: u16);
}

#[derive(Debug, Clone, Copy)]
pub struct PortSettings {
    pub pass_delay_us: u16,
    pub retry_delay_us: u16,
}

pub const DEFAULT_SETTINGS: PortSettings = PortSettings {
    pass_delay_us: 100,
    retry_delay_us: u16::MAX,
};

/// Strobed byte pipe with its pending queue.
pub struct ParallelPort<P: PortPins, T: PulseTimer, const DEPTH: usize> {
    queue: Ring<u8, DEPTH>,
    settings: PortSettings,
    pins: P,
    timer: T,
    active: AtomicBool,
}

impl<P: PortPins, T: PulseTimer, const DEPTH: usize> ParallelPort<P, T, DEPTH> {
    pub const fn new(pins: P, timer: T, settings: PortSettings) -> Self {
        Self {
            queue: Ring::new(),
            settings,
            pins,
            timer,
            active: AtomicBool::new(false),
        }
    }

    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Queues `buffer` and kicks transmission. Spins when the queue is
    /// momentarily full; the interrupt chain drains it as the peer accepts
    /// bytes, so admission control belongs to the caller.
    pub fn transfer(&self, buffer: &[u8]) {
        while !self.queue.produce(buffer) {
            self.start_transmission();
            core::hint::spin_loop();
        }
        self.start_transmission();
    }

    /// CTS interrupt: the peer took the byte; advance or go idle.
    pub fn pass_next(&self) {
        self.pins.set_rts(false);
        match self.queue.pop() {
            Some(value) => self.start_transmission_unchecked(value),
            None => self.active.store(false, Ordering::Release),
        }
    }

    /// OV interrupt: the peer missed the byte; re-run the handshake for
    /// the value still latched on the data lines.
    pub fn retry(&self) {
        self.pins.set_rts(false);
        self.schedule_transaction(self.settings.retry_delay_us);
    }

    /// Pulse-timer interrupt: data lines have settled, mark them valid.
    pub fn set_ready(&self) {
        self.pins.set_rts(true);
    }

    fn start_transmission(&self) {
        if !self.active.load(Ordering::Acquire) {
            if let Some(value) = self.queue.pop() {
                self.active.store(true, Ordering::Release);
                self.start_transmission_unchecked(value);
            }
        }
    }

    fn start_transmission_unchecked(&self, value: u8) {
        self.pins.expose_data(value);
        self.schedule_transaction(self.settings.pass_delay_us);
    }

    fn schedule_transaction(&self, delay_us: u16) {
        if delay_us == 0 {
            self.pins.set_rts(true);
        } else {
            self.timer.arm_micros(delay_us);
        }
    }
}

/// Block-framing layer over the port: everything leaves the device as
/// `[header][payload]` runs of at most 64 bytes.
pub struct Transmitter<P: PortPins, T: PulseTimer> {
    port: ParallelPort<P, T, TX_QUEUE_DEPTH>,
}

impl<P: PortPins, T: PulseTimer> Transmitter<P, T> {
    pub const fn new(pins: P, timer: T, settings: PortSettings) -> Self {
        Self {
            port: ParallelPort::new(pins, timer, settings),
        }
    }

    pub fn port(&self) -> &ParallelPort<P, T, TX_QUEUE_DEPTH> {
        &self.port
    }

    fn send_chunk(&self, category: Category, chunk: &[u8]) {
        let header = BlockHeader::new(category, chunk.len() as u8);
        self.port.transfer(&[header.serialize()]);
        self.port.transfer(chunk);
    }
}

impl<P: PortPins, T: PulseTimer> DataLink for Transmitter<P, T> {
    fn send_data(&self, buffer: &[u8]) {
        for chunk in buffer.chunks(BlockHeader::MAX_LENGTH) {
            self.send_chunk(Category::Data, chunk);
        }
    }

    fn send_commands(&self, commands: &[Command]) {
        let mut serialized = [0u8; BlockHeader::MAX_LENGTH];
        for chunk in commands.chunks(BlockHeader::MAX_LENGTH) {
            for (slot, command) in serialized.iter_mut().zip(chunk) {
                *slot = command.serialize();
            }
            self.send_chunk(Category::Command, &serialized[..chunk.len()]);
        }
    }

    fn remaining_queue_size(&self) -> usize {
        TX_QUEUE_DEPTH - self.port.queue_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Default)]
    struct WireState {
        exposed: Vec<u8>,
        rts: bool,
        armed: Vec<u16>,
    }

    #[derive(Clone, Default)]
    struct FakePins(Rc<RefCell<WireState>>);

    impl PortPins for FakePins {
        fn expose_data(&self, value: u8) {
            self.0.borrow_mut().exposed.push(value);
        }

        fn set_rts(&self, ready: bool) {
            self.0.borrow_mut().rts = ready;
        }
    }

    #[derive(Clone, Default)]
    struct FakeTimer(Rc<RefCell<WireState>>);

    impl PulseTimer for FakeTimer {
        fn arm_micros(&self, delay: u16) {
            self.0.borrow_mut().armed.push(delay);
        }
    }

    fn transmitter() -> (Transmitter<FakePins, FakeTimer>, Rc<RefCell<WireState>>) {
        let state = Rc::new(RefCell::new(WireState::default()));
        let transmitter = Transmitter::new(
            FakePins(Rc::clone(&state)),
            FakeTimer(Rc::clone(&state)),
            DEFAULT_SETTINGS,
        );
        (transmitter, state)
    }

    /// Plays the peer: fires the timer and answers CTS until the port goes
    /// idle, collecting every byte that crossed the wire.
    fn drain_wire(transmitter: &Transmitter<FakePins, FakeTimer>) -> Vec<u8> {
        let port = transmitter.port();
        while port.active.load(Ordering::Relaxed) {
            port.set_ready();
            port.pass_next();
        }
        port.pins.0.borrow_mut().exposed.drain(..).collect()
    }

    #[test]
    fn data_bursts_are_framed_into_64_byte_blocks() {
        let (transmitter, _) = transmitter();
        let payload: Vec<u8> = (0..200u8).collect();
        transmitter.send_data(&payload);

        let wire = drain_wire(&transmitter);
        assert_eq!(wire.len(), 204);
        assert_eq!(wire[0], 0x7F);
        assert_eq!(&wire[1..65], &payload[..64]);
        assert_eq!(wire[65], 0x7F);
        assert_eq!(&wire[66..130], &payload[64..128]);
        assert_eq!(wire[130], 0x7F);
        assert_eq!(&wire[131..195], &payload[128..192]);
        assert_eq!(wire[195], 0x47);
        assert_eq!(&wire[196..], &payload[192..]);
    }

    #[test]
    fn commands_are_packed_under_a_command_header() {
        let (transmitter, _) = transmitter();
        transmitter.send_commands(&[Command::GreenLedOn, Command::BlueLedOff]);

        let wire = drain_wire(&transmitter);
        assert_eq!(wire, [0x81, 0x01, 0x08]);
    }

    #[test]
    fn overwrite_retries_the_same_byte() {
        let (transmitter, state) = transmitter();
        transmitter.send_data(&[0xAB]);
        let port = transmitter.port();

        // Timer fires, the peer NAKs, timer fires again, the peer accepts.
        port.set_ready();
        port.retry();
        assert_eq!(state.borrow().armed.last(), Some(&u16::MAX));
        assert!(!state.borrow().rts);
        port.set_ready();
        port.pass_next();
        port.set_ready();
        port.pass_next();

        // Header then payload, nothing skipped or duplicated.
        assert_eq!(state.borrow().exposed, [0x41, 0xAB]);
        assert!(!port.active.load(Ordering::Relaxed));
    }

    #[test]
    fn remaining_queue_size_shrinks_with_queued_bytes_and_recovers() {
        let (transmitter, _) = transmitter();
        assert_eq!(transmitter.remaining_queue_size(), TX_QUEUE_DEPTH);

        transmitter.send_data(&[0u8; 100]);
        // One byte is already latched on the wire, the rest are queued
        // behind the two block headers.
        assert_eq!(transmitter.remaining_queue_size(), TX_QUEUE_DEPTH - 101);

        let before = transmitter.remaining_queue_size();
        drain_wire(&transmitter);
        assert!(transmitter.remaining_queue_size() > before);
        assert_eq!(transmitter.remaining_queue_size(), TX_QUEUE_DEPTH);
    }

    #[test]
    fn pass_delay_paces_every_byte() {
        let (transmitter, state) = transmitter();
        transmitter.send_data(&[1, 2]);
        drain_wire(&transmitter);
        assert!(state
            .borrow()
            .armed
            .iter()
            .all(|&delay| delay == DEFAULT_SETTINGS.pass_delay_us));
    }
}
