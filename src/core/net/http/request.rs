use serde_json::Value;

use super::{Error, HttpMethod, Params};

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// A parsed request borrowing from the connection buffer
#[derive(Debug)]
pub struct Request<'r> {
    method: HttpMethod,
    path: &'r str,
    query: Option<&'r str>,
    version: &'r str,
    headers: &'r str,
    body: &'r [u8],
    params: Params<'r>,
}

impl<'r> Request<'r> {
    /// Parse a complete request.
    ///
    /// The request line must look like `METHOD SP /path[?query] SP HTTP/x`.
    /// The body is everything after the first blank line, cut to
    /// `Content-Length` when the header is present.
    pub fn parse(raw: &'r [u8]) -> Result<Self, Error> {
        let (head, body) = match find_head_end(raw) {
            Some(end) => (&raw[..end - HEAD_TERMINATOR.len()], &raw[end..]),
            None => (raw, &[][..]),
        };
        let head = core::str::from_utf8(head).map_err(|_| Error::Parse)?;
        let (line, headers) = head.split_once("\r\n").unwrap_or((head, ""));
        let (method, target, version) = parse_request_line(line).ok_or(Error::Parse)?;
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        let mut request = Self {
            method,
            path,
            query,
            version,
            headers,
            body,
            params: Params::new(),
        };
        if let Some(length) = request.content_length() {
            request.body = &body[..length.min(body.len())];
        }
        Ok(request)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &'r str {
        self.path
    }

    /// Raw query string without the leading `?`
    pub fn query(&self) -> Option<&'r str> {
        self.query
    }

    pub fn version(&self) -> &'r str {
        self.version
    }

    pub fn body(&self) -> &'r [u8] {
        self.body
    }

    /// Value of the first header called `name`, case-insensitive
    pub fn header(&self, name: &str) -> Option<&'r str> {
        header_value(self.headers, name)
    }

    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.parse().ok()
    }

    /// `key=value` pairs of the query string.
    ///
    /// A pair without `=` yields an empty value. Values are not
    /// percent-decoded.
    pub fn query_params(&self) -> impl Iterator<Item = (&'r str, &'r str)> {
        self.query
            .unwrap_or("")
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }

    /// Body parsed as JSON, `None` if absent or malformed
    pub fn json(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(self.body).ok()
    }

    /// Route parameter captured by the matched pattern
    pub fn param(&self, name: &str) -> Option<&'r str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|&(_, value)| value)
    }

    pub(super) fn set_params(&mut self, params: Params<'r>) {
        self.params = params;
    }
}

/// Index just past the blank line ending the head
pub(super) fn find_head_end(raw: &[u8]) -> Option<usize> {
    raw.windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
        .map(|pos| pos + HEAD_TERMINATOR.len())
}

/// Value of a header in a block of `Name: value` lines
pub(super) fn header_value<'h>(headers: &'h str, name: &str) -> Option<&'h str> {
    headers.split("\r\n").find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// Split the request line into method, target and protocol version
fn parse_request_line(line: &str) -> Option<(HttpMethod, &str, &str)> {
    let mut parts = line.split(' ');
    let method = HttpMethod::parse(parts.next()?)?;
    let target = parts.next()?;
    let version = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if !target.starts_with('/') || target.contains(char::is_whitespace) {
        return None;
    }
    if !version.starts_with("HTTP/") {
        return None;
    }
    Some((method, target, version))
}
