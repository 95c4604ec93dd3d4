//! Minimal file and directory interface over the mounted card.
//!
//! The on-disk FAT layout is not this crate's business: the viewer consumes
//! the volume through the three small traits below, and `fat` implements
//! them over `embedded-sdmmc`. Keeping the seam here lets the directory and
//! streaming logic run against an in-memory volume in tests.

pub mod bmp;
pub mod fat;

pub use embedded_sdmmc::ShortFileName;

/// Sequential reads plus absolute seeks, as needed for BMP streaming.
pub trait RandomRead {
    /// Reads up to `buffer.len()` bytes; `None` on device error.
    fn read(&mut self, buffer: &mut [u8]) -> Option<usize>;
    /// Positions the next read at `position` bytes from the file start.
    fn seek(&mut self, position: u32) -> bool;
}

/// Forward-only directory reader with rewind.
pub trait DirectoryStream {
    fn next_entry(&mut self) -> Option<DirectoryEntry>;
    fn rewind(&mut self) -> bool;
}

/// A mounted logical drive able to open its root directory and files.
pub trait Volume {
    type File: RandomRead;
    type Dir: DirectoryStream;

    fn open_root(&self) -> Option<Self::Dir>;
    fn open_file(&self, entry: &DirectoryEntry) -> Option<Self::File>;
}

/// Directory entry view: 8.3 name plus the directory attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    name: ShortFileName,
    directory: bool,
}

impl DirectoryEntry {
    pub fn new(name: ShortFileName, directory: bool) -> Self {
        Self { name, directory }
    }

    pub fn name(&self) -> &ShortFileName {
        &self.name
    }

    pub fn extension(&self) -> &[u8] {
        self.name.extension()
    }

    pub fn is_directory(&self) -> bool {
        self.directory
    }

    pub fn is_regular_file(&self) -> bool {
        !self.directory
    }
}

/// Single pass over a directory.
pub struct DirectoryIterator<D: DirectoryStream> {
    stream: Option<D>,
}

impl<D: DirectoryStream> DirectoryIterator<D> {
    pub fn new(stream: D) -> Self {
        Self {
            stream: Some(stream),
        }
    }
}

impl<D: DirectoryStream> Iterator for DirectoryIterator<D> {
    type Item = DirectoryEntry;

    fn next(&mut self) -> Option<DirectoryEntry> {
        let entry = self.stream.as_mut()?.next_entry();
        if entry.is_none() {
            self.stream = None;
        }
        entry
    }
}

/// Endless pass over a directory: advancing past the last entry rewinds
/// and continues. Exhausts only when the directory is empty or the rewind
/// fails (for instance after card removal).
pub struct CyclicDirectoryIterator<D: DirectoryStream> {
    stream: Option<D>,
    rewinds: u32,
}

impl<D: DirectoryStream> CyclicDirectoryIterator<D> {
    pub fn new(stream: D) -> Self {
        Self {
            stream: Some(stream),
            rewinds: 0,
        }
    }

    /// Number of times the iterator has wrapped around so far. Callers use
    /// this to bound a full-directory search.
    pub fn rewinds(&self) -> u32 {
        self.rewinds
    }
}

impl<D: DirectoryStream> Iterator for CyclicDirectoryIterator<D> {
    type Item = DirectoryEntry;

    fn next(&mut self) -> Option<DirectoryEntry> {
        let stream = self.stream.as_mut()?;
        if let Some(entry) = stream.next_entry() {
            return Some(entry);
        }
        if !stream.rewind() {
            self.stream = None;
            return None;
        }
        self.rewinds += 1;
        let entry = stream.next_entry();
        if entry.is_none() {
            self.stream = None;
        }
        entry
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::vec::Vec;

    fn cyclic(volume: &RamVolume) -> CyclicDirectoryIterator<RamDirectory> {
        CyclicDirectoryIterator::new(volume.open_root().unwrap())
    }

    #[test]
    fn single_pass_iteration_ends_at_the_last_entry() {
        let volume = RamVolume::new(vec![("A.BMP", vec![]), ("B.BMP", vec![])]);
        let collected: Vec<_> = DirectoryIterator::new(volume.open_root().unwrap())
            .map(|entry| entry.name().clone())
            .collect();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn cyclic_iteration_wraps_past_the_last_entry() {
        let volume = RamVolume::new(vec![("A.BMP", vec![]), ("B.BMP", vec![])]);
        let mut iterator = cyclic(&volume);
        let seen: Vec<_> = (&mut iterator)
            .take(5)
            .map(|entry| entry.name().clone())
            .collect();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], seen[2]);
        assert_eq!(seen[1], seen[3]);
        assert_eq!(iterator.rewinds(), 2);
    }

    #[test]
    fn cyclic_iteration_over_an_empty_directory_ends() {
        let volume = RamVolume::new(vec![]);
        let mut iterator = cyclic(&volume);
        assert!(iterator.next().is_none());
        assert!(iterator.next().is_none());
    }

    #[test]
    fn cyclic_iteration_ends_when_the_rewind_fails() {
        let volume = RamVolume::new(vec![("A.BMP", vec![])]);
        *volume.rewind_ok.borrow_mut() = false;
        let mut iterator = cyclic(&volume);
        assert!(iterator.next().is_some());
        assert!(iterator.next().is_none());
    }

    #[test]
    fn extension_is_read_from_the_short_name() {
        let entry = entry("PIC1.BMP");
        assert!(entry.extension().eq_ignore_ascii_case(b"bmp"));
        assert!(entry.is_regular_file());
    }
}
