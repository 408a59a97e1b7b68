/// HTTP status codes the proxy ever sends to a client.
///
/// - `Ok` (200): archived content relayed
/// - `MovedPermanently` (301) / `Found` (302): a genuine site redirect, relayed
/// - `BadRequest` (400): malformed request line or unsupported method
/// - `NotFound` (404): nothing archived for the URL
/// - `BadGateway` (502): the archive could not be reached or misbehaved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Found
    Found,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 502 Bad Gateway
    BadGateway,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use timewarp::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::BadGateway.as_u16(), 502);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::BadGateway => 502,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::BadGateway => "Bad Gateway",
        }
    }

    /// Maps an upstream redirect status onto the one we relay.
    pub fn from_redirect(code: u16) -> Option<Self> {
        match code {
            301 => Some(StatusCode::MovedPermanently),
            302 => Some(StatusCode::Found),
            _ => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, StatusCode::MovedPermanently | StatusCode::Found)
    }
}

/// A complete response ready to be serialized to a client.
///
/// Headers keep insertion order. The `Server` header is added by the writer.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for constructing responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body(b"hello".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header, replacing any existing one with the same name (case-insensitive).
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(existing) => existing.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Body-bearing responses get a `Content-Length` equal to the body's byte length.
    /// Redirects carry neither a body nor `Content-Length`.
    pub fn build(mut self) -> Response {
        if self.status.is_redirect() {
            self.body.clear();
            self.headers.retain(|(k, _)| {
                !k.eq_ignore_ascii_case("Content-Length") && !k.eq_ignore_ascii_case("Content-Type")
            });
        } else {
            let len = self.body.len().to_string();
            self = self.header("Content-Length", len);
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Looks up a header value by name (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Relays archived content as `200 OK`.
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .body(body.into())
            .build()
    }

    /// Relays a site redirect. `status` must be a redirect status.
    pub fn redirect(status: StatusCode, location: &str) -> Self {
        ResponseBuilder::new(status)
            .header("Location", location)
            .build()
    }

    pub fn bad_request() -> Self {
        html_page(
            StatusCode::BadRequest,
            "The proxy server cannot understand the request or does not support the request method.",
        )
    }

    /// The content for `url` is not in the archive.
    pub fn not_found(url: &str) -> Self {
        html_page(
            StatusCode::NotFound,
            &format!("The remote server could not find the content:<br>\n<b>{url}</b>"),
        )
    }

    pub fn bad_gateway(message: &str) -> Self {
        html_page(
            StatusCode::BadGateway,
            &format!(
                "The proxy server encountered a problem when fetching the content:<br>\n<b>{message}</b>"
            ),
        )
    }
}

fn html_page(status: StatusCode, text: &str) -> Response {
    let code = status.as_u16();
    let reason = status.reason_phrase();
    let html = format!(
        "<!DOCTYPE HTML PUBLIC \"-//IETF//DTD HTML 2.0//EN\">\n\
         <html><head>\n\
         <title>{code} {reason}</title>\n\
         </head><body>\n\
         <h1>{reason}</h1>\n\
         {text}\n\
         </body></html>\n"
    );

    ResponseBuilder::new(status)
        .header("Content-Type", "text/html")
        .body(html.into_bytes())
        .build()
}
