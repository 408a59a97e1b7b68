//! Stub archive server shared by the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use timewarp::config::Config;
use timewarp::http::connection::Connection;
use timewarp::proxy::TimeTravelProxy;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A request as seen by the stub.
pub struct StubRequest {
    /// `http://127.0.0.1:<port>` of the stub itself
    pub base: String,
    /// Request target, e.g. `/web/19990412id_/http://example.com/`
    pub target: String,
}

impl StubRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        let (_, query) = self.target.split_once('?')?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

pub struct StubResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn ok(content_type: &str, body: &[u8]) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.to_vec(),
        }
    }

    pub fn json(body: &str) -> Self {
        Self::ok("application/json", body.as_bytes())
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self {
            status,
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

pub struct StubArchive {
    pub addr: SocketAddr,
    pub base: String,
}

impl StubArchive {
    pub async fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = format!("http://{}", addr);
        let handler = Arc::new(handler);

        let stub_base = base.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let handler = handler.clone();
                let base = stub_base.clone();

                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&buf).to_string();
                    let target = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/")
                        .to_string();

                    let response = (*handler)(&StubRequest { base, target });

                    let mut out = format!("HTTP/1.1 {} Stub\r\n", response.status);
                    for (k, v) in &response.headers {
                        out.push_str(&format!("{}: {}\r\n", k, v));
                    }
                    out.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
                    out.push_str("Connection: close\r\n\r\n");

                    let _ = socket.write_all(out.as_bytes()).await;
                    let _ = socket.write_all(&response.body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, base }
    }

    pub fn archive_base(&self) -> String {
        format!("{}/web", self.base)
    }

    pub fn availability_url(&self) -> String {
        format!("{}/wayback/available", self.base)
    }

    /// Archive-qualified URL on this stub.
    pub fn archived(&self, timestamp: &str, original: &str) -> String {
        format!("{}/{}/{}", self.archive_base(), timestamp, original)
    }

    pub fn config(&self, lookup_closest_snapshot: bool) -> Config {
        Config {
            archive_base: self.archive_base(),
            availability_url: self.availability_url(),
            lookup_closest_snapshot,
            max_redirects: 3,
            connect_timeout_secs: 5,
            request_timeout_secs: 5,
            client_timeout_secs: 5,
            ..Config::default()
        }
    }
}

/// Sends `raw` through a proxy connection over an in-memory stream and returns everything
/// the proxy wrote back.
pub async fn roundtrip(config: Config, raw: &[u8]) -> String {
    let proxy = Arc::new(TimeTravelProxy::new(config).unwrap());
    let (mut client, server) = tokio::io::duplex(64 * 1024);

    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, proxy);
        conn.run().await.unwrap();
    });

    client.write_all(raw).await.unwrap();
    client.shutdown().await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    task.await.unwrap();

    String::from_utf8_lossy(&out).to_string()
}

/// Splits a raw response into (head, body).
pub fn split_response(raw: &str) -> (&str, &str) {
    raw.split_once("\r\n\r\n").unwrap_or((raw, ""))
}
