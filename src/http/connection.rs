use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::parser::{
    MAX_HEAD_SIZE, ParseError, find_line_end, is_blank_line, parse_request_line,
};
use crate::http::request::ProxyRequest;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::proxy::TimeTravelProxy;

/// One client connection: a single request, a single response, then close.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    proxy: Arc<TimeTravelProxy>,
}

pub enum ConnectionState {
    Reading,
    Processing(ProxyRequest),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, proxy: Arc<TimeTravelProxy>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            proxy,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let client_timeout = self.proxy.config().client_timeout();

        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    let read = match timeout(client_timeout, self.read_request()).await {
                        Ok(read) => read?,
                        Err(_) => {
                            tracing::warn!("Timed out waiting for request");
                            self.state = ConnectionState::Closed;
                            continue;
                        }
                    };

                    self.state = match read {
                        Some(Ok(req)) => ConnectionState::Processing(req),
                        Some(Err(e)) => {
                            tracing::warn!(error = ?e, "Rejecting malformed request");
                            self.writing(&Response::bad_request())
                        }
                        // Client went away before sending a full request line
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    tracing::info!(url = %req.target_url, "Proxy request");
                    let response = self.proxy.respond(&req.target_url).await;
                    tracing::debug!(
                        url = %req.target_url,
                        status = response.status.as_u16(),
                        "Responding"
                    );
                    self.state = self.writing(&response);
                }

                ConnectionState::Writing(writer) => {
                    match timeout(client_timeout, writer.write_to_stream(&mut self.stream)).await {
                        Ok(Ok(())) => {
                            let _ = self.stream.shutdown().await;
                        }
                        Ok(Err(e)) => {
                            tracing::warn!(error = %e, "Failed to write response to client");
                        }
                        Err(_) => {
                            tracing::warn!("Timed out writing response to client");
                        }
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    fn writing(&self, response: &Response) -> ConnectionState {
        ConnectionState::Writing(ResponseWriter::new(
            response,
            &self.proxy.config().server_name,
        ))
    }

    /// Reads the request line and drains the header block that follows it.
    ///
    /// Returns `None` if the client closed the connection before a full request line.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Result<ProxyRequest, ParseError>>> {
        let line = loop {
            if let Some(end) = find_line_end(&self.buffer) {
                break self.buffer.split_to(end);
            }

            if self.buffer.len() > MAX_HEAD_SIZE {
                return Ok(Some(Err(ParseError::TooLarge)));
            }

            if self.fill_buffer().await? == 0 {
                return Ok(None);
            }
        };

        let parsed = parse_request_line(&line);

        if !self.drain_headers(line.len()).await? {
            return Ok(Some(Err(ParseError::TooLarge)));
        }

        Ok(Some(parsed))
    }

    /// Discards header lines up to the blank line or EOF.
    ///
    /// Returns `false` if the head grew past `MAX_HEAD_SIZE`.
    async fn drain_headers(&mut self, mut consumed: usize) -> anyhow::Result<bool> {
        loop {
            while let Some(end) = find_line_end(&self.buffer) {
                let line = self.buffer.split_to(end);
                consumed += end;
                if is_blank_line(&line) {
                    return Ok(true);
                }
            }

            if consumed + self.buffer.len() > MAX_HEAD_SIZE {
                return Ok(false);
            }

            if self.fill_buffer().await? == 0 {
                return Ok(true);
            }
        }
    }

    async fn fill_buffer(&mut self) -> anyhow::Result<usize> {
        self.buffer.reserve(1024);
        let n = self.stream.read_buf(&mut self.buffer).await?;
        Ok(n)
    }
}
