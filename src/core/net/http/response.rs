use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use embedded_io_async::Write;
use serde::Serialize;

use super::headers::{ContentHeaders, ResponseHeaders, TargetWriter as _};
use super::{ContentType, HandlerError, HttpResult, StatusCode, io_error, reason_phrase};
use crate::domain::ports::FileSystem;

const STREAM_CHUNK_SIZE: usize = 1024;

/// Response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body<'a> {
    Empty,
    Text(String),
    Json(Vec<u8>),
    Bytes(&'a [u8]),
}

impl Body<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Empty => &[],
            Body::Text(text) => text.as_bytes(),
            Body::Json(json) => json,
            Body::Bytes(bytes) => bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Response under construction.
///
/// Without an explicit status the response is sent as 200 when it has a
/// body and 201 otherwise. The content type follows the body: JSON bodies
/// are `application/json`, everything else defaults to `text/html`.
#[derive(Debug)]
pub struct Response<'a> {
    status: Option<StatusCode>,
    content_type: Option<ContentType>,
    headers: Vec<(&'static str, String)>,
    body: Body<'a>,
}

impl Default for Response<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Response<'a> {
    pub fn new() -> Self {
        Self {
            status: None,
            content_type: None,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn status(&mut self, code: StatusCode) -> &mut Self {
        self.status = Some(code);
        self
    }

    /// Add an extra header. `Content-Type`, `Content-Length` and
    /// `Connection` are always derived from the response itself.
    pub fn header(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Text body, sent as `text/html` unless a content type is set
    pub fn send(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Body::Text(body.into());
        self
    }

    /// Serialize `value` as a JSON body
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, HandlerError> {
        let json = serde_json::to_vec(value).map_err(|_| HandlerError::Serialize)?;
        self.body = Body::Json(json);
        self.content_type = Some(ContentType::Json);
        Ok(self)
    }

    /// Borrowed binary body with an explicit content type
    pub fn bytes(&mut self, content_type: ContentType, bytes: &'a [u8]) -> &mut Self {
        self.body = Body::Bytes(bytes);
        self.content_type = Some(content_type);
        self
    }

    /// Serve the file at `path`, typed by its extension. A missing file
    /// becomes a 404.
    pub fn send_file<F: FileSystem + ?Sized>(&mut self, files: &'a F, path: &str) -> &mut Self {
        match files.read(path) {
            Some(contents) => self.bytes(ContentType::from_path(path), contents),
            None => self.error(404, "Not Found"),
        }
    }

    /// Minimal HTML error page, `message` is escaped
    pub fn error(&mut self, code: StatusCode, message: &str) -> &mut Self {
        let mut page = String::new();
        // Writing into a String cannot fail
        let _ = write!(
            page,
            "<html><body><h1>{} {}</h1><code>",
            code,
            reason_phrase(code),
        );
        push_escaped(&mut page, message);
        page.push_str("</code></body></html>");
        self.status = Some(code);
        self.content_type = Some(ContentType::Html);
        self.body = Body::Text(page);
        self
    }

    /// Status that will be sent
    pub fn status_code(&self) -> StatusCode {
        match self.status {
            Some(code) => code,
            None if self.body.is_empty() => 201,
            None => 200,
        }
    }

    /// Content type that will be sent
    pub fn content_type(&self) -> ContentType {
        match (self.content_type, &self.body) {
            (Some(content_type), _) => content_type,
            (None, Body::Json(_)) => ContentType::Json,
            (None, Body::Bytes(_)) => ContentType::OctetStream,
            (None, _) => ContentType::Html,
        }
    }

    pub fn body(&self) -> &Body<'a> {
        &self.body
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Write the status line, headers and body to `writer`
    pub async fn write_to<W: Write>(&self, writer: &mut W) -> HttpResult {
        let body = self.body_bytes();
        let headers = ResponseHeaders::new(
            self.status_code(),
            ContentHeaders::new(self.content_type(), body.len()),
            &self.headers,
        );
        let mut head = String::new();
        headers.write_to(&mut head)?;

        writer.write_all(head.as_bytes()).await.map_err(io_error)?;
        for chunk in body.chunks(STREAM_CHUNK_SIZE) {
            writer.write_all(chunk).await.map_err(io_error)?;
        }
        writer.flush().await.map_err(io_error)?;
        Ok(())
    }
}

/// Append `text` with the HTML special characters replaced by entities
fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            ch => out.push(ch),
        }
    }
}
