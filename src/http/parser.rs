use crate::http::request::ProxyRequest;

/// Upper bound on the request line plus discarded header lines.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Request line does not have exactly three tokens
    WrongTokenCount(usize),
    UnsupportedMethod(String),
    InvalidEncoding,
    TooLarge,
}

/// Parses a request line of the form `GET <absolute-url> <version>`.
///
/// Tokens are separated by any run of whitespace; a trailing CR/LF is ignored.
pub fn parse_request_line(line: &[u8]) -> Result<ProxyRequest, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.len() != 3 {
        return Err(ParseError::WrongTokenCount(parts.len()));
    }

    if !ProxyRequest::is_supported_method(parts[0]) {
        return Err(ParseError::UnsupportedMethod(parts[0].to_string()));
    }

    Ok(ProxyRequest {
        method: parts[0].to_string(),
        target_url: parts[1].to_string(),
        version: parts[2].to_string(),
    })
}

/// Finds the end of the next line in `buf`, returning the index just past its `\n`.
pub fn find_line_end(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|pos| pos + 1)
}

/// Returns `true` for the blank line that terminates the header block.
pub fn is_blank_line(line: &[u8]) -> bool {
    matches!(line, b"\r\n" | b"\n" | b"")
}
