//! ST7789-class TFT controller on the external memory bus.
//!
//! The controller occupies two 16-bit bus words: commands go to the first,
//! data to the second. Everything else (bank timings, pin muxing) belongs
//! to the startup code; the driver only needs the four operations of
//! [`PanelBus`].

use num_enum::IntoPrimitive;

/// Command opcodes issued at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u16)]
pub enum Opcode {
    Nop = 0x00,
    SoftwareReset = 0x01, // SWRESET
    ReadId = 0x04,        // RDDID
    Sleep = 0x10,         // SLPIN
    WakeUp = 0x11,        // SLPOUT
    DisplayOff = 0x28,    // DISPOFF
    DisplayOn = 0x29,     // DISPON
    WriteMemory = 0x2C,   // RAMWR
    ColorMode = 0x3A,     // COLMOD
    RamControl = 0xB0,    // RAMCTRL
}

/// Memory-bus window of the controller plus the backlight switch.
pub trait PanelBus {
    fn write_command(&self, opcode: u16);
    fn write_data(&self, value: u16);
    fn read_data(&self) -> u16;
    fn backlight(&self, on: bool);
}

/// RDDID contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelId {
    pub manufacturer: u8,
    pub version: u8,
    pub module: u8,
}

pub struct Panel<B: PanelBus> {
    pub(crate) bus: B,
    id: PanelId,
}

impl<B: PanelBus> Panel<B> {
    pub fn new(bus: B) -> Self {
        let id = read_id(&bus);
        Self { bus, id }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn send_command(&self, opcode: Opcode) -> &Self {
        self.bus.write_command(opcode.into());
        self
    }

    pub fn write(&self, value: u16) -> &Self {
        self.bus.write_data(value);
        self
    }

    pub fn backlight(&self, on: bool) {
        self.bus.backlight(on);
    }
}

fn read_id<B: PanelBus>(bus: &B) -> PanelId {
    bus.write_command(Opcode::ReadId.into());
    // First word after RDDID is a dummy read.
    let _ = bus.read_data();
    PanelId {
        manufacturer: bus.read_data() as u8,
        version: bus.read_data() as u8,
        module: bus.read_data() as u8,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn construction_reads_the_panel_id_past_the_dummy_word() {
        let bus = RecordingBus::default();
        *bus.reads.borrow_mut() = vec![0xFFFF, 0x85, 0x85, 0x52];
        let panel = Panel::new(bus);
        assert_eq!(
            panel.id(),
            PanelId {
                manufacturer: 0x85,
                version: 0x85,
                module: 0x52
            }
        );
        assert_eq!(
            panel.bus.events.borrow()[0],
            BusEvent::Command(Opcode::ReadId.into())
        );
    }

    #[test]
    fn commands_and_data_reach_their_bus_words() {
        let panel = Panel::new(RecordingBus::default());
        panel.bus.events.borrow_mut().clear();
        panel.send_command(Opcode::ColorMode).write(0x06);
        assert_eq!(
            panel.bus.events.borrow().as_slice(),
            &[BusEvent::Command(0x3A), BusEvent::Data(0x06)]
        );
    }
}
