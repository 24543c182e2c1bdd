//! Web UI bundled into the firmware image

use crate::config::HTTP;
use crate::domain::ports::{EntryKind, FileSystem};

/// `(path, contents)` of a bundled file
pub type Asset = (&'static str, &'static [u8]);

const WEB_UI: [Asset; 3] = [
    ("/public/index.html", include_bytes!("../../public/index.html")),
    ("/public/app.js", include_bytes!("../../public/app.js")),
    ("/public/style.css", include_bytes!("../../public/style.css")),
];

/// Read-only file tree made of static byte slices.
///
/// Directories are implied by the file paths.
pub struct EmbeddedAssets {
    files: &'static [Asset],
}

impl EmbeddedAssets {
    pub const fn new(files: &'static [Asset]) -> Self {
        Self { files }
    }

    /// The bundled web UI under [`HTTP`]`.static_base_dir`
    pub const fn web_ui() -> Self {
        Self::new(&WEB_UI)
    }

    pub fn base_dir(&self) -> &'static str {
        HTTP.static_base_dir
    }
}

impl FileSystem for EmbeddedAssets {
    fn entry_kind(&self, path: &str) -> Option<EntryKind> {
        let dir = path.trim_end_matches('/');
        self.files.iter().find_map(|&(file, _)| {
            if file == path {
                return Some(EntryKind::File);
            }
            let rest = file.strip_prefix(dir)?;
            rest.starts_with('/').then_some(EntryKind::Directory)
        })
    }

    fn read(&self, path: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|&&(file, _)| file == path)
            .map(|&(_, contents)| contents)
    }
}
