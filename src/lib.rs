//! Firmware core of a networked picture viewer
//!
//! The device mounts a FAT volume on an SD card, shows 240x240 bitmaps on
//! an 18-bit TFT panel and exchanges framed blocks with a companion device
//! over a byte link. The main facilities are implemented as submodules:
//!
//! - [`storage`]: the lock-free rings between interrupts and the loop
//! - [`transceiver`]: block framing, the UART listener and the strobed
//!   parallel-port transmitter
//! - [`drivers`]: the SD card slot and the panel controller
//! - [`fs`]: the minimal file/directory interface over the card
//! - [`command`]: the command set and the joystick multiplexer
//! - [`viewer`]: the cooperative event loop
//!
//! The startup code (vector table, clocks, pin muxing, linker script) is
//! external; it calls [`run`] and links the `*_IRQHandler` symbols
//! exported by [`board`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod console;

pub mod board;
pub mod command;
pub mod config;
pub mod display;
pub mod drivers;
pub mod fs;
pub mod logging;
pub mod storage;
pub mod transceiver;
pub mod viewer;

use log::info;

use crate::fs::{CyclicDirectoryIterator, Volume};
use crate::transceiver::parser::RequestParser;
use crate::transceiver::receiver::{ListenerGuard, RECEIVER};
use crate::transceiver::transmitter::TRANSMITTER;

pub use crate::viewer::FatalError;

/// Firmware entry point, called by the startup code once the hardware is
/// configured. Returns only on a fatal condition; the startup code maps
/// the error to a non-zero exit.
pub fn run() -> FatalError {
    logging::init();

    // A card seated at power-up produces no detect edge; evaluate once.
    drivers::block::SD_CARD.lock().try_accept();

    let Some(drive) = fs::fat::LogicalDrive::mount() else {
        return FatalError::MountFailure;
    };
    let image_count = viewer::count_images(&drive);
    if image_count == 0 {
        return FatalError::NoImages;
    }
    info!("{} displayable images", image_count);
    let Some(root) = drive.open_root() else {
        return FatalError::MountFailure;
    };

    let parser = RequestParser::new();
    let _listener = ListenerGuard::new(&RECEIVER, &parser);

    viewer::Viewer::new(
        &drive,
        CyclicDirectoryIterator::new(root),
        &*display::DISPLAY,
        &TRANSMITTER,
        &command::COMMAND_MANAGER,
        &parser,
    )
    .run()
}
