//! Fallback backend speaking HTTP/1.1 over a plain TCP socket.
//!
//! Used when the primary backend is missing or fails. It has no TLS, so it
//! only takes `http://` requests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use super::backend::{TransportBackend, TransportError};
use super::{HttpResponse, PreparedRequest};

/// Upper bound on a single header or chunk-size line.
const MAX_LINE: usize = 16 * 1024;

/// Plain-socket HTTP/1.1 backend.
#[derive(Clone, Debug)]
pub struct StreamBackend {
    timeout: Duration,
}

impl StreamBackend {
    /// Create a backend using `timeout` for connecting and for each read.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn connect(&self, request: &PreparedRequest) -> Result<TcpStream, TransportError> {
        let addrs = request
            .url()
            .socket_addrs(|| Some(80))
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) if e.kind() == std::io::ErrorKind::TimedOut => TransportError::Timeout(self.timeout),
            Some(e) => TransportError::Connect(e.to_string()),
            None => TransportError::Connect("host resolved to no addresses".to_string()),
        })
    }
}

impl TransportBackend for StreamBackend {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn supports_tls(&self) -> bool {
        false
    }

    fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        let mut stream = self.connect(request)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        let head = request_head(request)?;
        stream
            .write_all(head.as_bytes())
            .and_then(|_| stream.write_all(request.body()))
            .and_then(|_| stream.flush())
            .map_err(|e| TransportError::from_io(e, self.timeout))?;

        let mut reader = BufReader::new(stream);
        read_response(&mut reader, self.timeout).map(|(status, body)| HttpResponse::new(status, body, self.name()))
    }
}

fn request_head(request: &PreparedRequest) -> Result<String, TransportError> {
    let url = request.url();
    let host = url
        .host_str()
        .ok_or_else(|| TransportError::Unsupported("URL has no host".to_string()))?;
    let target = &url[url::Position::BeforePath..url::Position::AfterQuery];

    let mut head = format!("{} {} HTTP/1.1\r\nHost: {}", request.method(), target, host);
    if let Some(port) = url.port() {
        head.push_str(&format!(":{}", port));
    }
    head.push_str("\r\n");
    for (name, value) in request.headers() {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    Ok(head)
}

fn read_line<R: BufRead>(reader: &mut R, timeout: Duration) -> Result<String, TransportError> {
    let mut line = Vec::new();
    reader
        .by_ref()
        .take(MAX_LINE as u64)
        .read_until(b'\n', &mut line)
        .map_err(|e| TransportError::from_io(e, timeout))?;
    if !line.ends_with(b"\n") {
        return Err(TransportError::Protocol("unterminated line".to_string()));
    }
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Read status, headers and body. Returns `(status, body)`.
fn read_response<R: BufRead>(reader: &mut R, timeout: Duration) -> Result<(u16, Vec<u8>), TransportError> {
    let status_line = read_line(reader, timeout)?;
    let mut parts = status_line.split_whitespace();
    let status = match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse::<u16>()
            .map_err(|_| TransportError::Protocol(format!("bad status line '{}'", status_line)))?,
        _ => {
            return Err(TransportError::Protocol(format!(
                "bad status line '{}'",
                status_line
            )))
        }
    };

    let mut content_length = None;
    let mut chunked = false;
    loop {
        let line = read_line(reader, timeout)?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().ok();
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            chunked = value.to_ascii_lowercase().contains("chunked");
        }
    }

    let mut body = Vec::new();
    if chunked {
        read_chunked(reader, &mut body, timeout)?;
    } else if let Some(len) = content_length {
        read_exact_len(reader, &mut body, len, timeout)?;
    } else {
        reader
            .read_to_end(&mut body)
            .map_err(|e| TransportError::from_io(e, timeout))?;
    }
    Ok((status, body))
}

fn read_chunked<R: BufRead>(reader: &mut R, body: &mut Vec<u8>, timeout: Duration) -> Result<(), TransportError> {
    loop {
        let line = read_line(reader, timeout)?;
        let size_hex = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| TransportError::Protocol(format!("bad chunk size '{}'", line)))?;
        if size == 0 {
            // trailers end with an empty line
            while !read_line(reader, timeout)?.is_empty() {}
            return Ok(());
        }
        if body.len().checked_add(size).is_none() {
            return Err(TransportError::Protocol(format!("chunk size '{}' too large", line)));
        }
        read_exact_len(reader, body, size, timeout)?;
        read_line(reader, timeout)?;
    }
}

/// Append exactly `len` bytes to `body`. Memory grows with the data that
/// actually arrives, never with the announced length.
fn read_exact_len<R: BufRead>(
    reader: &mut R,
    body: &mut Vec<u8>,
    len: usize,
    timeout: Duration,
) -> Result<(), TransportError> {
    let start = body.len();
    let read = reader
        .by_ref()
        .take(len as u64)
        .read_to_end(body)
        .map_err(|e| TransportError::from_io(e, timeout))?;
    if read < len {
        body.truncate(start);
        return Err(TransportError::Protocol(format!(
            "body truncated: expected {} bytes, got {}",
            len, read
        )));
    }
    Ok(())
}
