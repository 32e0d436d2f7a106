//! Persistent macro storage trait and error types.

/// Error type for storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No macro has been stored yet.
    NotFound,
    /// The stored blob does not fit the buffer, or the blob does not fit the store.
    TooLarge,
    /// The backing medium failed.
    Io,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "no stored macro"),
            Self::TooLarge => write!(f, "macro too large"),
            Self::Io => write!(f, "storage i/o error"),
        }
    }
}

/// Holds the single persisted macro document.
///
/// The blob is stored verbatim as received; parsing happens on load.
/// Operations are blocking and only run on transfer completion and at boot.
pub trait MacroStore {
    /// Check whether a macro has been stored.
    fn exists(&mut self) -> bool;

    /// Read the stored document into `buf`, returning its length.
    fn load(&mut self, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the stored document.
    fn save(&mut self, document: &[u8]) -> Result<(), StorageError>;
}
