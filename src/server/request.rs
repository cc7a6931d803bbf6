use http::Method;
use std::fmt;
use std::io::{self, Read};
use tracing::{debug, warn};

/// Largest request head (request line plus headers) buffered before the
/// connection is acknowledged and closed.
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

const READ_CHUNK: usize = 4096;

/// Request data the listener needs for dispatch.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method; unrecognised verbs become extension methods
    pub method: Method,
    /// Request target exactly as sent, query string included
    pub target: String,
    /// Body decoded as UTF-8, invalid sequences replaced
    pub body: String,
}

/// Result of reading one request off a connection.
#[derive(Debug, PartialEq)]
pub enum ReadOutcome {
    /// A complete request. `keep_alive` is false when the connection must close
    /// after the acknowledgement.
    Request {
        request: ParsedRequest,
        keep_alive: bool,
    },
    /// The head was unreadable or too large; acknowledge and close
    Malformed,
    /// The peer closed the connection before a full head arrived
    Closed,
}

/// Why a request head was rejected.
#[derive(Debug)]
pub enum HeadError {
    Syntax(httparse::Error),
    /// The head ended before the request line was complete
    Incomplete,
    InvalidContentLength(String),
    /// Chunked and other transfer codings are not decoded
    UnsupportedTransferEncoding(String),
}

impl fmt::Display for HeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadError::Syntax(err) => write!(f, "invalid request head: {err}"),
            HeadError::Incomplete => write!(f, "incomplete request line"),
            HeadError::InvalidContentLength(value) => {
                write!(f, "invalid Content-Length '{value}'")
            }
            HeadError::UnsupportedTransferEncoding(value) => {
                write!(f, "unsupported Transfer-Encoding '{value}'")
            }
        }
    }
}

impl std::error::Error for HeadError {}

/// Method, target and framing taken from a request head.
#[derive(Debug, PartialEq)]
pub struct RequestHead {
    pub method: Method,
    pub target: String,
    pub content_length: usize,
    pub keep_alive: bool,
}

/// Parse a method token, falling back to `GET` for tokens `http` rejects.
pub fn parse_method(token: &str) -> Method {
    Method::from_bytes(token.as_bytes()).unwrap_or_else(|_| {
        warn!(method = %token, "invalid method token");
        Method::GET
    })
}

/// Decode a raw body into text.
pub fn decode_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Length of the head at the start of `buf`, blank line included, once it has
/// fully arrived.
fn head_len(buf: &[u8]) -> Option<usize> {
    buf.iter().enumerate().find_map(|(i, &b)| {
        if b != b'\n' {
            return None;
        }
        match buf.get(i + 1..) {
            Some([b'\n', ..]) => Some(i + 2),
            Some([b'\r', b'\n', ..]) => Some(i + 3),
            _ => None,
        }
    })
}

/// Parse a complete request head.
///
/// The header array is sized from the number of lines in the head, so any
/// number of headers is accepted as long as the head fits in
/// [`MAX_HEAD_BYTES`].
///
/// # Errors
///
/// Returns a [`HeadError`] for malformed syntax or framing the listener cannot
/// follow.
pub fn parse_head(head: &[u8]) -> Result<RequestHead, HeadError> {
    let lines = head.iter().filter(|&&b| b == b'\n').count();
    let mut headers = vec![httparse::EMPTY_HEADER; lines];
    let mut req = httparse::Request::new(&mut headers);
    if req.parse(head).map_err(HeadError::Syntax)?.is_partial() {
        return Err(HeadError::Incomplete);
    }
    let (Some(method), Some(target), Some(version)) = (req.method, req.path, req.version) else {
        return Err(HeadError::Incomplete);
    };

    let mut content_length = 0;
    let mut keep_alive = version >= 1;
    for header in req.headers.iter() {
        let value = String::from_utf8_lossy(header.value);
        let value = value.trim();
        if header.name.eq_ignore_ascii_case("content-length") {
            content_length = value
                .parse()
                .map_err(|_| HeadError::InvalidContentLength(value.to_string()))?;
        } else if header.name.eq_ignore_ascii_case("transfer-encoding")
            && !value.eq_ignore_ascii_case("identity")
        {
            return Err(HeadError::UnsupportedTransferEncoding(value.to_string()));
        } else if header.name.eq_ignore_ascii_case("connection") {
            if value.eq_ignore_ascii_case("close") {
                keep_alive = false;
            } else if value.eq_ignore_ascii_case("keep-alive") {
                keep_alive = true;
            }
        }
    }

    Ok(RequestHead {
        method: parse_method(method),
        target: target.to_string(),
        content_length,
        keep_alive,
    })
}

fn fill<R: Read>(stream: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    let mut chunk = [0u8; READ_CHUNK];
    let n = stream.read(&mut chunk)?;
    buf.extend_from_slice(&chunk[..n]);
    Ok(n)
}

/// Read one request from `stream`.
///
/// `buf` holds bytes already received on the connection; whatever follows the
/// returned request stays in it for the next call. The body is buffered in
/// full according to `Content-Length`.
///
/// # Errors
///
/// Returns an error if reading from the stream fails.
pub fn read_request<R: Read>(stream: &mut R, buf: &mut Vec<u8>) -> io::Result<ReadOutcome> {
    let head_end = loop {
        if let Some(end) = head_len(buf) {
            break end;
        }
        if buf.len() > MAX_HEAD_BYTES {
            warn!(head_bytes = buf.len(), "request head too large");
            return Ok(ReadOutcome::Malformed);
        }
        if fill(stream, buf)? == 0 {
            if !buf.is_empty() {
                debug!(buffered_bytes = buf.len(), "connection closed mid request head");
            }
            return Ok(ReadOutcome::Closed);
        }
    };

    let head = match parse_head(&buf[..head_end]) {
        Ok(head) => head,
        Err(err) => {
            warn!(error = %err, "rejecting request head");
            return Ok(ReadOutcome::Malformed);
        }
    };

    let mut keep_alive = head.keep_alive;
    let wanted = head_end + head.content_length;
    while buf.len() < wanted {
        if fill(stream, buf)? == 0 {
            warn!(
                method = %head.method,
                target = %head.target,
                expected_bytes = head.content_length,
                received_bytes = buf.len() - head_end,
                "connection closed before the body was complete"
            );
            keep_alive = false;
            break;
        }
    }

    let body_end = buf.len().min(wanted);
    let body = decode_body(&buf[head_end..body_end]);
    buf.drain(..body_end);

    debug!(
        method = %head.method,
        target = %head.target,
        body_size_bytes = body_end - head_end,
        "HTTP request parsed"
    );

    Ok(ReadOutcome::Request {
        request: ParsedRequest {
            method: head.method,
            target: head.target,
            body,
        },
        keep_alive,
    })
}
