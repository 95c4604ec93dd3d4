//! Byte-stream state machine behind the UART receive interrupt.
//!
//! Each byte is either a block header or payload of the block in flight.
//! Data payload goes to the pixel ring verbatim; command payload is decoded
//! and queued for the event loop. Protocol violations (bad header byte,
//! unknown opcode) are dropped and counted, never fatal.

use core::sync::atomic::{AtomicU32, Ordering};

use spin::Mutex;

use crate::command::Command;
use crate::config::{COMMAND_QUEUE_SIZE, PIXEL_QUEUE_SIZE};
use crate::storage::Ring;
use crate::transceiver::{BlockHeader, Category};

use super::receiver::ByteListener;

pub struct RequestParser {
    data: Ring<u8, PIXEL_QUEUE_SIZE>,
    commands: Ring<Command, COMMAND_QUEUE_SIZE>,
    // Touched only from the receive interrupt; the lock makes the shared
    // reference safe to hand to the receiver.
    pending: Mutex<Option<BlockHeader>>,
    protocol_errors: AtomicU32,
}

impl RequestParser {
    pub const fn new() -> Self {
        Self {
            data: Ring::new(),
            commands: Ring::new(),
            pending: Mutex::new(None),
            protocol_errors: AtomicU32::new(0),
        }
    }

    pub fn data(&self) -> &Ring<u8, PIXEL_QUEUE_SIZE> {
        &self.data
    }

    pub fn commands(&self) -> &Ring<Command, COMMAND_QUEUE_SIZE> {
        &self.commands
    }

    pub fn protocol_errors(&self) -> u32 {
        self.protocol_errors.load(Ordering::Relaxed)
    }

    fn dispatch(&self, category: Category, value: u8) {
        match category {
            Category::Data => {
                self.data.push(value);
            }
            Category::Command => match Command::deserialize(value) {
                Some(command) => {
                    self.commands.push(command);
                }
                None => self.note_protocol_error(),
            },
        }
    }

    fn note_protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }
}

impl ByteListener for RequestParser {
    fn process(&self, value: u8) {
        let mut pending = self.pending.lock();
        match pending.as_mut() {
            None => {
                *pending = BlockHeader::deserialize(value);
                if pending.is_none() {
                    self.note_protocol_error();
                }
            }
            Some(header) => {
                self.dispatch(header.category, value);
                header.length -= 1;
                if header.length == 0 {
                    *pending = None;
                }
            }
        }
    }
}
