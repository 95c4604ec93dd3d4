//! Command set shared with the companion device, plus the manager that
//! multiplexes joystick input into the outgoing link and executes received
//! commands.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::config::JOYSTICK_QUEUE_SIZE;
use crate::storage::Ring;
use crate::transceiver::DataLink;

/// Wire command opcodes. The toggle values are the on/off pairs combined;
/// the sender may use them but the viewer gives them no behavior of their
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Command {
    Empty = 0x00,
    GreenLedOn = 0x01,
    GreenLedOff = 0x02,
    GreenLedToggle = 0x03,
    BlueLedOn = 0x04,
    BlueLedOff = 0x08,
    BlueLedToggle = 0x0C,
    NextPicture = 0x80,
}

impl Command {
    pub fn serialize(self) -> u8 {
        self.into()
    }

    /// Unknown opcodes decode to `None` and are dropped by the parser.
    pub fn deserialize(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

/// Four-way joystick directions as reported by the edge interrupts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Center,
    Down,
    Up,
    Left,
    Right,
}

/// Joystick edges land in `pending` from interrupt context; the event loop
/// flushes them to the transmitter once per iteration, keeping the
/// transmitter state machine out of interrupt handlers.
pub struct CommandManager {
    pending: Ring<Command, JOYSTICK_QUEUE_SIZE>,
}

/// Process-wide manager instance; interrupts reach it through
/// [`on_joystick_button`].
pub static COMMAND_MANAGER: CommandManager = CommandManager::new();

impl CommandManager {
    pub const fn new() -> Self {
        Self {
            pending: Ring::new(),
        }
    }

    /// Interrupt side: translate a button edge to a command. Bursts beyond
    /// the queue depth are dropped.
    pub fn on_button(&self, button: Button) {
        let command = match button {
            Button::Up => Command::GreenLedOn,
            Button::Down => Command::GreenLedOff,
            Button::Right => Command::BlueLedOn,
            Button::Left => Command::BlueLedOff,
            Button::Center => return,
        };
        self.pending.push(command);
    }

    /// Loop side: forward everything the joystick produced since the last
    /// iteration as one command block.
    pub fn flush(&self, link: &impl DataLink) {
        let mut batch = [Command::Empty; JOYSTICK_QUEUE_SIZE];
        let mut count = 0;
        while count < batch.len() {
            match self.pending.pop() {
                Some(command) => {
                    batch[count] = command;
                    count += 1;
                }
                None => break,
            }
        }
        if count > 0 {
            link.send_commands(&batch[..count]);
        }
    }

    /// Runs one received command. `NextPicture` is the only command with a
    /// local body; LED commands are echoed back for the remote device to
    /// actuate.
    pub fn execute(&self, command: Command, link: &impl DataLink, on_next_picture: impl FnOnce()) {
        match command {
            Command::NextPicture => on_next_picture(),
            Command::Empty => {}
            _ => link.send_commands(&[command]),
        }
    }
}

/// Joystick edge interrupt entry point.
pub fn on_joystick_button(button: Button) {
    COMMAND_MANAGER.on_button(button);
}
