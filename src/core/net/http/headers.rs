use core::fmt::Write;

pub type StatusCode = u16;

/// Reason phrase for the status line. Unknown codes get `"Unknown"`.
pub fn reason_phrase(code: StatusCode) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// HTTP Content Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Css,
    JavaScript,
    Json,
    Text,
    Svg,
    Png,
    Jpeg,
    Gif,
    Icon,
    OctetStream,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Css => "text/css",
            ContentType::JavaScript => "application/javascript",
            ContentType::Json => "application/json",
            ContentType::Text => "text/plain",
            ContentType::Svg => "image/svg+xml",
            ContentType::Png => "image/png",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Gif => "image/gif",
            ContentType::Icon => "image/x-icon",
            ContentType::OctetStream => "application/octet-stream",
        }
    }

    /// Content type for a file extension, case-insensitive.
    ///
    /// Unknown extensions are served as `application/octet-stream`.
    pub fn from_extension(extension: &str) -> Self {
        const TABLE: [(&str, ContentType); 12] = [
            ("html", ContentType::Html),
            ("htm", ContentType::Html),
            ("css", ContentType::Css),
            ("js", ContentType::JavaScript),
            ("json", ContentType::Json),
            ("txt", ContentType::Text),
            ("svg", ContentType::Svg),
            ("png", ContentType::Png),
            ("jpg", ContentType::Jpeg),
            ("jpeg", ContentType::Jpeg),
            ("gif", ContentType::Gif),
            ("ico", ContentType::Icon),
        ];
        TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(extension))
            .map_or(ContentType::OctetStream, |&(_, content_type)| content_type)
    }

    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((_, extension)) => Self::from_extension(extension),
            None => ContentType::OctetStream,
        }
    }

    /// Text types carry a `charset` parameter. JSON is UTF-8 by
    /// definition and goes out bare.
    fn is_text(self) -> bool {
        matches!(
            self,
            ContentType::Html
                | ContentType::Css
                | ContentType::JavaScript
                | ContentType::Text
                | ContentType::Svg
        )
    }
}

/// HTTP socket connection policy.
#[derive(Debug, Clone, Copy)]
pub(super) enum ConnectionPolicy {
    Close,
}

impl ConnectionPolicy {
    fn as_str(self) -> &'static str {
        match self {
            ConnectionPolicy::Close => "close",
        }
    }
}

pub(super) trait TargetWriter {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error>;
}

/// HTTP Content Headers.
pub(super) struct ContentHeaders {
    content_type: ContentType,
    content_length: usize,
}

impl ContentHeaders {
    pub(super) const fn new(content_type: ContentType, content_length: usize) -> Self {
        Self {
            content_type,
            content_length,
        }
    }
}

impl TargetWriter for ContentHeaders {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error> {
        write!(writer, "Content-Type: {}", self.content_type.as_str())?;
        if self.content_type.is_text() {
            write!(writer, "; charset=utf-8")?;
        }
        write!(writer, "\r\n")?;
        write!(writer, "Content-Length: {}\r\n", self.content_length)?;
        Ok(())
    }
}

/// Status line and headers of a response.
pub(super) struct ResponseHeaders<'h> {
    status: StatusCode,
    connection: ConnectionPolicy,
    content: ContentHeaders,
    extra: &'h [(&'static str, alloc::string::String)],
}

impl<'h> ResponseHeaders<'h> {
    pub(super) const fn new(
        status: StatusCode,
        content: ContentHeaders,
        extra: &'h [(&'static str, alloc::string::String)],
    ) -> Self {
        Self {
            status,
            connection: ConnectionPolicy::Close,
            content,
            extra,
        }
    }
}

impl TargetWriter for ResponseHeaders<'_> {
    /// Write the response headers to a writer.
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error> {
        let reason = reason_phrase(self.status);
        write!(writer, "HTTP/1.1 {} {}\r\n", self.status, reason)?;
        self.content.write_to(writer)?;
        for (name, value) in self.extra {
            write!(writer, "{}: {}\r\n", name, value)?;
        }
        write!(writer, "Connection: {}\r\n", self.connection.as_str())?;
        write!(writer, "\r\n")?;
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
    Connect,
}

impl HttpMethod {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "OPTIONS" => HttpMethod::Options,
            "HEAD" => HttpMethod::Head,
            "TRACE" => HttpMethod::Trace,
            "CONNECT" => HttpMethod::Connect,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}
