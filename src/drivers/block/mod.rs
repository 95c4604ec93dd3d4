//! SD card slot and its block-device view for the filesystem layer.

use embedded_sdmmc::{Block, BlockCount, BlockDevice, BlockIdx};
use lazy_static::lazy_static;
use log::info;
use spin::Mutex;
use stm32f4_sdio::{Card, CardAcceptor, CardId, TransferError};

use crate::board::SdioPort;

lazy_static! {
    /// The global card slot; interrupts reach it through [`on_card_detect`].
    pub static ref SD_CARD: Mutex<Card<SdioPort>> = {
        let mut card = Card::new(SdioPort);
        card.set_acceptor(&CARD_MONITOR);
        Mutex::new(card)
    };
}

static CARD_MONITOR: CardMonitor = CardMonitor;

struct CardMonitor;

impl CardAcceptor for CardMonitor {
    fn accept(&self, card: Option<&CardId>) -> bool {
        match card {
            Some(id) => info!("card accepted: {}", id),
            None => info!("card slot is empty"),
        }
        true
    }
}

/// Card-detect edge interrupt entry point, either direction.
///
/// A removal during an active transfer surfaces as an error on that
/// transfer; skipping the lock here avoids a single-core deadlock against
/// the loop holding it.
pub fn on_card_detect() {
    if let Some(mut card) = SD_CARD.try_lock() {
        card.try_accept();
    }
}

/// 512-byte block access for `embedded-sdmmc`.
pub struct SdCard;

impl BlockDevice for SdCard {
    type Error = TransferError;

    fn read(
        &self,
        blocks: &mut [Block],
        start: BlockIdx,
        _reason: &str,
    ) -> Result<(), TransferError> {
        let mut card = SD_CARD.lock();
        for (offset, block) in blocks.iter_mut().enumerate() {
            card.read(start.0 + offset as u32, &mut block.contents)?;
        }
        Ok(())
    }

    fn write(&self, blocks: &[Block], start: BlockIdx) -> Result<(), TransferError> {
        let mut card = SD_CARD.lock();
        for (offset, block) in blocks.iter().enumerate() {
            card.write(start.0 + offset as u32, &block.contents)?;
        }
        Ok(())
    }

    fn num_blocks(&self) -> Result<BlockCount, TransferError> {
        // Capacity is never queried from the card; the FAT geometry comes
        // from the BPB.
        Ok(BlockCount(u32::MAX))
    }
}
