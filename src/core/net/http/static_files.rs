//! Static file fallback confined to a base directory

use alloc::string::String;
use alloc::vec::Vec;

use log::debug;

use super::{HandlerResult, HttpMethod, Request, Response};
use crate::domain::ports::{EntryKind, FileSystem};

pub struct StaticFiles<'a, F: FileSystem + ?Sized> {
    files: &'a F,
    base_dir: &'static str,
    index_file: &'static str,
}

impl<'a, F: FileSystem + ?Sized> StaticFiles<'a, F> {
    pub fn new(files: &'a F, base_dir: &'static str, index_file: &'static str) -> Self {
        Self {
            files,
            base_dir: base_dir.trim_end_matches('/'),
            index_file,
        }
    }

    /// Map a request path onto a file under the base directory.
    ///
    /// `..` pops one segment; popping past the base directory rejects the
    /// whole path. Directories resolve to their index file. Returns `None`
    /// for anything that is not an existing file.
    pub fn resolve(&self, request_path: &str) -> Option<String> {
        let segments = normalize(request_path)?;
        let mut path = String::from(self.base_dir);
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }

        match self.files.entry_kind(&path)? {
            EntryKind::File => Some(path),
            EntryKind::Directory => {
                path.push('/');
                path.push_str(self.index_file);
                (self.files.entry_kind(&path)? == EntryKind::File).then_some(path)
            }
        }
    }

    /// Answer a request from the base directory: 405 for anything but
    /// `GET`, 404 when nothing resolves
    pub fn serve<'s>(
        &'s self,
        request: &Request<'_>,
        response: &mut Response<'s>,
    ) -> HandlerResult {
        if request.method() != HttpMethod::Get {
            response
                .header("Allow", "GET")
                .error(405, "Method Not Allowed");
            return Ok(());
        }
        match self.resolve(request.path()) {
            Some(path) => {
                debug!("http: serving {}", path);
                response.send_file(self.files, &path);
            }
            None => {
                response.error(404, "Not Found");
            }
        }
        Ok(())
    }
}

/// Resolve `.` and `..` segments, `None` if the path climbs above its root
fn normalize(path: &str) -> Option<Vec<&str>> {
    let mut stack = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            segment => stack.push(segment),
        }
    }
    Some(stack)
}
