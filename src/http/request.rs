/// A proxy request taken from the client's request line.
///
/// Only the method and the absolute target URL matter to the proxy; header lines
/// are read and thrown away by the connection handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    /// Request method as sent by the client (always some casing of "GET")
    pub method: String,
    /// Absolute URL the client wants, e.g. "http://example.com/"
    pub target_url: String,
    /// Protocol version token, e.g. "HTTP/1.0"
    pub version: String,
}

impl ProxyRequest {
    /// Returns `true` for the only method the proxy serves.
    ///
    /// # Example
    ///
    /// ```
    /// # use timewarp::http::request::ProxyRequest;
    /// assert!(ProxyRequest::is_supported_method("get"));
    /// assert!(!ProxyRequest::is_supported_method("POST"));
    /// ```
    pub fn is_supported_method(method: &str) -> bool {
        method.eq_ignore_ascii_case("GET")
    }
}
