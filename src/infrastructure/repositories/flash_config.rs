//! Config document stored in a dedicated flash region.
//!
//! Layout: magic header (u16 LE), document length (u16 LE), JSON document.
//! The rest of the region is left erased.

use alloc::vec;
use alloc::vec::Vec;

use embedded_storage::nor_flash::NorFlash;

use crate::domain::ports::{ConfigStorage, StorageError};

const MAGIC_HEADER: u16 = 0x5C0F;
const MAGIC_HEADER_SIZE: usize = MAGIC_HEADER.to_le_bytes().len();
const HEADER_SIZE: usize = MAGIC_HEADER_SIZE + 2;
const ERASED: u8 = 0xFF;

pub struct FlashConfigStorage<F: NorFlash> {
    flash: F,
    offset: u32,
    size: u32,
}

impl<F: NorFlash> FlashConfigStorage<F> {
    /// `offset` and `size` must be aligned to the erase size of `flash`
    pub fn new(flash: F, offset: u32, size: u32) -> Self {
        Self {
            flash,
            offset,
            size,
        }
    }

    fn capacity(&self) -> usize {
        (self.size as usize).saturating_sub(HEADER_SIZE).min(usize::from(u16::MAX))
    }
}

impl<F: NorFlash> ConfigStorage for FlashConfigStorage<F> {
    fn load(&mut self) -> Result<Vec<u8>, StorageError> {
        let mut region = vec![0u8; self.size as usize];
        self.flash
            .read(self.offset, &mut region)
            .map_err(|_| StorageError::DriverError)?;

        if region.len() < HEADER_SIZE {
            return Err(StorageError::InvalidData);
        }
        let magic = u16::from_le_bytes([region[0], region[1]]);
        if magic != MAGIC_HEADER {
            return Err(StorageError::InvalidMagicHeader);
        }
        let len = usize::from(u16::from_le_bytes([region[2], region[3]]));
        if len > self.capacity() {
            return Err(StorageError::InvalidData);
        }
        Ok(region[HEADER_SIZE..HEADER_SIZE + len].to_vec())
    }

    fn save(&mut self, document: &[u8]) -> Result<(), StorageError> {
        if document.len() > self.capacity() {
            return Err(StorageError::TooLarge);
        }
        let len = u16::try_from(document.len()).map_err(|_| StorageError::TooLarge)?;

        let used = HEADER_SIZE + document.len();
        let padded = used.div_ceil(F::WRITE_SIZE) * F::WRITE_SIZE;
        let mut data = vec![ERASED; padded];
        data[..MAGIC_HEADER_SIZE].copy_from_slice(&MAGIC_HEADER.to_le_bytes());
        data[MAGIC_HEADER_SIZE..HEADER_SIZE].copy_from_slice(&len.to_le_bytes());
        data[HEADER_SIZE..used].copy_from_slice(document);

        self.flash
            .erase(self.offset, self.offset + self.size)
            .map_err(|_| StorageError::DriverError)?;
        self.flash
            .write(self.offset, &data)
            .map_err(|_| StorageError::DriverError)
    }
}
