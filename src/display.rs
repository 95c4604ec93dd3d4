//! Display facade: brings the panel out of sleep into 18-bit mode and
//! exposes the three operations the viewer needs.

use lazy_static::lazy_static;
use log::info;

use crate::board::PanelPort;
use crate::drivers::lcd::{Opcode, Panel, PanelBus};
use crate::fs::bmp::Rgb666;

pub struct Display<B: PanelBus> {
    pub(crate) panel: Panel<B>,
}

lazy_static! {
    /// The panel is initialized on first use.
    pub static ref DISPLAY: Display<PanelPort> = Display::new(PanelPort);
}

impl<B: PanelBus> Display<B> {
    pub fn new(bus: B) -> Self {
        let panel = Panel::new(bus);
        info!("panel id {:?}", panel.id());
        panel.send_command(Opcode::WakeUp);
        // 18-bit data over the 16-bit bus, two transfers per pixel.
        panel
            .send_command(Opcode::RamControl)
            .write(0b0000_0000)
            .write(0b1111_0001)
            .send_command(Opcode::ColorMode)
            .write(0b0000_0110);
        Self { panel }
    }

    /// Backlight and panel output together.
    pub fn show(&self, on: bool) {
        self.panel.backlight(on);
        if on {
            self.panel.send_command(Opcode::DisplayOn);
        } else {
            self.panel.send_command(Opcode::DisplayOff);
        }
    }

    /// Opens a new frame: pixels drawn next land at the frame origin.
    pub fn refresh(&self) {
        self.panel.send_command(Opcode::WriteMemory);
    }

    pub fn draw(&self, pixel: Rgb666) {
        self.panel.write(pixel.red_green).write(pixel.blue);
    }
}
