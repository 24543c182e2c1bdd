/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Read-only view of the files served over HTTP.
///
/// Paths are absolute, `/`-separated and already normalized.
pub trait FileSystem {
    /// Kind of the entry at `path`, `None` if nothing is there
    fn entry_kind(&self, path: &str) -> Option<EntryKind>;

    /// Contents of the file at `path`
    fn read(&self, path: &str) -> Option<&[u8]>;
}
