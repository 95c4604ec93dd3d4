//! The event loop and the file-to-wire streaming that feeds it.
//!
//! Each iteration interleaves four activities under fixed timeslices:
//! flush joystick commands, drain received pixels onto the panel (or, when
//! idle, execute received commands), and push one image row into the
//! outgoing link. The loop never blocks; it terminates only on a fatal
//! condition.

use core::fmt::{self, Display, Formatter};

use log::{error, info};

use crate::command::CommandManager;
use crate::config::{
    COMMAND_TIMESLICE, IMAGE_EXTENSION, PIXEL_COUNT, PIXEL_HORIZONTAL, PIXEL_TIMESLICE,
    PIXEL_VERTICAL, ROW_BYTES,
};
use crate::display::Display as Screen;
use crate::drivers::lcd::PanelBus;
use crate::fs::bmp::{self, Rgb666};
use crate::fs::{CyclicDirectoryIterator, DirectoryEntry, DirectoryIterator, RandomRead, Volume};
use crate::storage::Ring;
use crate::transceiver::parser::RequestParser;
use crate::transceiver::{BlockHeader, DataLink};

/// Conditions the loop cannot continue from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalError {
    MountFailure,
    NoImages,
    DirectoryAdvanceExhausted,
    ImageIoError,
}

impl Display for FatalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::MountFailure => write!(f, "no filesystem on the medium"),
            FatalError::NoImages => write!(f, "no displayable images"),
            FatalError::DirectoryAdvanceExhausted => {
                write!(f, "no directory entry opens as an image")
            }
            FatalError::ImageIoError => write!(f, "image i/o failed"),
        }
    }
}

/// Display plus the frame-fill bookkeeping of the loop.
pub struct DisplayGuard<'a, B: PanelBus> {
    display: &'a Screen<B>,
    active: bool,
    pixels_filled: usize,
}

impl<'a, B: PanelBus> DisplayGuard<'a, B> {
    pub fn new(display: &'a Screen<B>) -> Self {
        Self {
            display,
            active: false,
            pixels_filled: 0,
        }
    }

    pub fn activate(&mut self) {
        if !self.active {
            self.display.show(true);
            self.active = true;
        }
    }

    pub fn refresh(&mut self) {
        self.display.refresh();
        self.pixels_filled = 0;
    }

    pub fn draw(&self, pixel: Rgb666) {
        self.display.draw(pixel);
    }

    pub fn note_pixel(&mut self) {
        self.pixels_filled += 1;
    }

    pub fn is_filled(&self) -> bool {
        self.pixels_filled == PIXEL_COUNT
    }
}

/// Reassembles one panel pixel from the data ring; payload bytes may
/// arrive split across loop iterations.
pub struct PixelPart {
    bytes: [u8; 4],
    filled: usize,
}

impl PixelPart {
    pub const fn new() -> Self {
        Self {
            bytes: [0; 4],
            filled: 0,
        }
    }

    /// Pulls bytes until the pixel is complete or the ring runs dry.
    pub fn update<const N: usize>(&mut self, ring: &Ring<u8, N>) -> bool {
        while self.filled < self.bytes.len() {
            match ring.pop() {
                Some(byte) => {
                    self.bytes[self.filled] = byte;
                    self.filled += 1;
                }
                None => return false,
            }
        }
        true
    }

    /// Takes the completed pixel and starts over.
    pub fn take(&mut self) -> Rgb666 {
        self.filled = 0;
        Rgb666 {
            red_green: u16::from_le_bytes([self.bytes[0], self.bytes[1]]),
            blue: u16::from_le_bytes([self.bytes[2], self.bytes[3]]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Completed,
    InProgress,
    IoError,
}

// Queue room needed before a cached row is handed over: the row itself
// plus one header byte per 64-byte block.
const ROW_QUEUE_COST: usize = ROW_BYTES + ROW_BYTES / BlockHeader::MAX_LENGTH
    + (ROW_BYTES % BlockHeader::MAX_LENGTH != 0) as usize;

/// Streams the active image to the link, one mirrored row per iteration.
pub struct ImageSender<F: RandomRead> {
    file: F,
    bitmap: bmp::Image,
    rows_sent: usize,
    row: Option<[u8; ROW_BYTES]>,
}

impl<F: RandomRead> ImageSender<F> {
    pub fn new(file: F, bitmap: bmp::Image) -> Self {
        Self {
            file,
            bitmap,
            rows_sent: 0,
            row: None,
        }
    }

    /// Alternates between loading a row and handing the cached one to the
    /// link, so one call never does both the file read and the enqueue.
    pub fn transmit(&mut self, link: &impl DataLink) -> SendStatus {
        if self.rows_sent == PIXEL_VERTICAL {
            return SendStatus::Completed;
        }

        if let Some(row) = &self.row {
            if link.remaining_queue_size() >= ROW_QUEUE_COST {
                link.send_data(row);
                self.rows_sent += 1;
                self.row = None;
            }
            return SendStatus::InProgress;
        }

        if self.rows_sent == 0 && !self.file.seek(self.bitmap.bitmap_offset()) {
            return SendStatus::IoError;
        }
        let mut row = [0u8; ROW_BYTES];
        match self.file.read(&mut row) {
            Some(count) if count == ROW_BYTES => {}
            _ => return SendStatus::IoError,
        }
        mirror_row(&mut row);
        self.row = Some(row);
        SendStatus::InProgress
    }
}

/// Swaps the pixel order of one stored row; rows leave the device
/// right-to-left while BMP stores them left-to-right.
fn mirror_row(row: &mut [u8; ROW_BYTES]) {
    let (mut left, mut right) = (0, ROW_BYTES - 3);
    while left < right {
        for lane in 0..3 {
            row.swap(left + lane, right + lane);
        }
        left += 3;
        right -= 3;
    }
}

/// Opens `entry` as a displayable image: `bmp` extension, well-formed
/// headers, exact panel geometry.
pub fn try_open_image<V: Volume>(
    volume: &V,
    entry: &DirectoryEntry,
) -> Option<ImageSender<V::File>> {
    if !entry
        .extension()
        .eq_ignore_ascii_case(IMAGE_EXTENSION.as_bytes())
    {
        return None;
    }
    let mut file = volume.open_file(entry)?;
    let bitmap = bmp::Image::from_file(&mut file)?;
    if bitmap.width() as usize != PIXEL_HORIZONTAL || bitmap.height() as usize != PIXEL_VERTICAL {
        return None;
    }
    Some(ImageSender::new(file, bitmap))
}

/// Number of displayable images in the root directory.
pub fn count_images<V: Volume>(volume: &V) -> usize {
    match volume.open_root() {
        Some(root) => DirectoryIterator::new(root)
            .filter(|entry| entry.is_regular_file() && try_open_image(volume, entry).is_some())
            .count(),
        None => 0,
    }
}

/// Advances the cyclic iterator to the next entry that opens as an image.
/// Gives up after one full pass over the directory (two observed rewinds),
/// so a directory where nothing opens terminates instead of spinning.
fn find_next_image<V: Volume>(
    volume: &V,
    directory: &mut CyclicDirectoryIterator<V::Dir>,
) -> Option<ImageSender<V::File>> {
    let rewind_limit = directory.rewinds() + 2;
    while let Some(entry) = directory.next() {
        if entry.is_regular_file() {
            if let Some(sender) = try_open_image(volume, &entry) {
                return Some(sender);
            }
        }
        if directory.rewinds() >= rewind_limit {
            break;
        }
    }
    None
}

/// The cooperative event loop over its four collaborators.
pub struct Viewer<'a, V: Volume, B: PanelBus, L: DataLink> {
    volume: &'a V,
    directory: CyclicDirectoryIterator<V::Dir>,
    display: DisplayGuard<'a, B>,
    link: &'a L,
    manager: &'a CommandManager,
    parser: &'a RequestParser,
    image: Option<ImageSender<V::File>>,
    pixel: PixelPart,
}

impl<'a, V: Volume, B: PanelBus, L: DataLink> Viewer<'a, V, B, L> {
    pub fn new(
        volume: &'a V,
        directory: CyclicDirectoryIterator<V::Dir>,
        display: &'a Screen<B>,
        link: &'a L,
        manager: &'a CommandManager,
        parser: &'a RequestParser,
    ) -> Self {
        let mut display = DisplayGuard::new(display);
        display.activate();
        Self {
            volume,
            directory,
            display,
            link,
            manager,
            parser,
            image: None,
            pixel: PixelPart::new(),
        }
    }

    /// One loop iteration.
    pub fn poll(&mut self) -> Result<(), FatalError> {
        self.manager.flush(self.link);

        if !self.display.is_filled() && self.image.is_some() {
            for _ in 0..PIXEL_TIMESLICE {
                if !self.pixel.update(self.parser.data()) {
                    break;
                }
                let pixel = self.pixel.take();
                self.display.draw(pixel);
                self.display.note_pixel();
            }
        } else {
            for _ in 0..COMMAND_TIMESLICE {
                let Some(command) = self.parser.commands().pop() else {
                    break;
                };
                let volume = self.volume;
                let directory = &mut self.directory;
                let display = &mut self.display;
                let image = &mut self.image;
                let mut exhausted = false;
                self.manager.execute(command, self.link, || {
                    match find_next_image(volume, directory) {
                        Some(sender) => {
                            display.refresh();
                            *image = Some(sender);
                        }
                        None => exhausted = true,
                    }
                });
                if exhausted {
                    error!("directory advance exhausted");
                    return Err(FatalError::DirectoryAdvanceExhausted);
                }
            }
        }

        if let Some(sender) = self.image.as_mut() {
            if sender.transmit(self.link) == SendStatus::IoError {
                error!("image streaming failed");
                return Err(FatalError::ImageIoError);
            }
        }
        Ok(())
    }

    /// Runs until a fatal condition; normal operation never returns.
    pub fn run(mut self) -> FatalError {
        info!("viewer loop started");
        loop {
            if let Err(error) = self.poll() {
                return error;
            }
        }
    }
}
