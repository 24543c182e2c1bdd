use alloc::vec::Vec;

/// Error type for the config storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    DriverError,
    InvalidMagicHeader,
    InvalidData,
    TooLarge,
}

/// Durable storage for the serialized config document.
///
/// Callers treat every error as "no persisted state"; nothing here is fatal.
pub trait ConfigStorage {
    /// Read the last saved document
    fn load(&mut self) -> Result<Vec<u8>, StorageError>;

    /// Replace the saved document
    fn save(&mut self, document: &[u8]) -> Result<(), StorageError>;
}
