//! The minimal file interface implemented over `embedded-sdmmc`.
//!
//! One process-wide volume manager owns the open-object registry; the
//! facade types hold raw handles and close them on drop, so every exit
//! path releases its filesystem object.

use embedded_sdmmc::{
    Mode, RawDirectory, RawFile, RawVolume, TimeSource, Timestamp, VolumeIdx, VolumeManager,
};
use lazy_static::lazy_static;
use log::warn;
use spin::Mutex;

use crate::drivers::block::SdCard;

use super::{DirectoryEntry, DirectoryStream, RandomRead, Volume};

/// The unit has no clock; directory timestamps are pinned to the epoch.
pub struct FixedClock;

impl TimeSource for FixedClock {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

type Manager = VolumeManager<SdCard, FixedClock>;

lazy_static! {
    static ref VOLUME_MANAGER: Mutex<Manager> = Mutex::new(VolumeManager::new(SdCard, FixedClock));
}

/// Mounted FAT volume; unmounts on drop.
pub struct LogicalDrive {
    volume: Option<RawVolume>,
}

impl LogicalDrive {
    /// Mounts the primary volume. Always eager.
    pub fn mount() -> Option<Self> {
        match VOLUME_MANAGER.lock().open_raw_volume(VolumeIdx(0)) {
            Ok(volume) => Some(Self {
                volume: Some(volume),
            }),
            Err(error) => {
                warn!("mount failed: {:?}", error);
                None
            }
        }
    }
}

impl Drop for LogicalDrive {
    fn drop(&mut self) {
        if let Some(volume) = self.volume.take() {
            let _ = VOLUME_MANAGER.lock().close_volume(volume);
        }
    }
}

impl Volume for LogicalDrive {
    type File = File;
    type Dir = Directory;

    fn open_root(&self) -> Option<Directory> {
        let raw = VOLUME_MANAGER.lock().open_root_dir(self.volume?).ok()?;
        Some(Directory {
            raw: Some(raw),
            cursor: 0,
        })
    }

    fn open_file(&self, entry: &DirectoryEntry) -> Option<File> {
        let root = VOLUME_MANAGER.lock().open_root_dir(self.volume?).ok()?;
        let file = VOLUME_MANAGER
            .lock()
            .open_file_in_dir(root, entry.name().clone(), Mode::ReadOnly);
        let _ = VOLUME_MANAGER.lock().close_dir(root);
        Some(File {
            raw: Some(file.ok()?),
        })
    }
}

/// Open file handle, read-only. Closes itself on drop.
pub struct File {
    raw: Option<RawFile>,
}

impl RandomRead for File {
    fn read(&mut self, buffer: &mut [u8]) -> Option<usize> {
        VOLUME_MANAGER.lock().read(self.raw?, buffer).ok()
    }

    fn seek(&mut self, position: u32) -> bool {
        match self.raw {
            Some(raw) => VOLUME_MANAGER
                .lock()
                .file_seek_from_start(raw, position)
                .is_ok(),
            None => false,
        }
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            let _ = VOLUME_MANAGER.lock().close_file(raw);
        }
    }
}

/// Directory reader. `embedded-sdmmc` only offers whole-directory
/// iteration, so the stream keeps a cursor and re-walks the directory for
/// each entry; root directories on this unit are a handful of files.
pub struct Directory {
    raw: Option<RawDirectory>,
    cursor: u32,
}

impl DirectoryStream for Directory {
    fn next_entry(&mut self) -> Option<DirectoryEntry> {
        let raw = self.raw?;
        let target = self.cursor;
        let mut index = 0u32;
        let mut found = None;
        VOLUME_MANAGER
            .lock()
            .iterate_dir(raw, |entry| {
                if index == target {
                    found = Some(DirectoryEntry::new(
                        entry.name.clone(),
                        entry.attributes.is_directory(),
                    ));
                }
                index += 1;
            })
            .ok()?;
        if found.is_some() {
            self.cursor += 1;
        }
        found
    }

    fn rewind(&mut self) -> bool {
        let Some(raw) = self.raw else {
            return false;
        };
        // Probe the medium the way the original re-read the directory, so
        // a pulled card turns the rewind into the end state.
        if VOLUME_MANAGER.lock().iterate_dir(raw, |_| {}).is_err() {
            return false;
        }
        self.cursor = 0;
        true
    }
}

impl Drop for Directory {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            let _ = VOLUME_MANAGER.lock().close_dir(raw);
        }
    }
}
