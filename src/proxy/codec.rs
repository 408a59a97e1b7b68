//! Conversion between original URLs and archive-qualified URLs.
//!
//! An archive-qualified URL looks like `<base>/<timestamp><flags>/<original>`, for
//! example `https://web.archive.org/web/19990412id_/http://example.com/`. Matching is
//! purely textual: the first occurrence of `<base>/` followed by a run of
//! `[0-9a-z_]` and a `/` marks the start of the original URL.

/// Flag appended to the timestamp so the archive returns the raw archived bytes.
pub const RAW_FLAG: &str = "id_";

#[derive(Debug, Clone)]
pub struct ArchiveCodec {
    /// Archive prefix without trailing slash
    base: String,
}

impl ArchiveCodec {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Builds `<base>/<timestamp>id_/<url>`.
    pub fn encode(&self, url: &str, timestamp: &str) -> String {
        format!("{}/{}{}/{}", self.base, timestamp, RAW_FLAG, url)
    }

    /// Strips the archive prefix from `url`.
    ///
    /// The remainder (up to the first newline) is returned trimmed of surrounding
    /// whitespace. A URL that carries no archive prefix is returned unchanged.
    pub fn decode(&self, url: &str) -> String {
        self.original_part(url)
            .map(|tail| tail.trim().to_string())
            .unwrap_or_else(|| url.to_string())
    }

    fn original_part<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = format!("{}/", self.base);

        for (start, _) in url.match_indices(prefix.as_str()) {
            let rest = &url[start + prefix.len()..];
            let flags_len = rest
                .bytes()
                .take_while(|b| b.is_ascii_digit() || b.is_ascii_lowercase() || *b == b'_')
                .count();

            if rest.as_bytes().get(flags_len) == Some(&b'/') {
                let tail = &rest[flags_len + 1..];
                let tail = tail.split('\n').next().unwrap_or(tail);
                return Some(tail);
            }
        }

        None
    }
}

/// Two decoded URLs name the same resource if they differ at most by one trailing slash.
pub fn is_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (shorter, longer) = if a.len() < b.len() { (a, b) } else { (b, a) };
    longer.len() == shorter.len() + 1
        && longer.starts_with(shorter)
        && longer.ends_with('/')
}
