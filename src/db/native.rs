//! CQL native protocol backend.
//!
//! Provides `NativeBackend`, a single-connection client that implements the
//! `Backend` trait over TCP using protocol v4.

use super::frame::{self, FrameHeader, Response, HEADER_LEN};
use super::{Backend, Consistency, ResultSet};
use crate::error::{CqlError, QueryError, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

/// Stream id used for every request; requests never overlap.
const STREAM_ID: i16 = 0;

/// Native protocol client bound to one node.
#[derive(Debug)]
pub struct NativeBackend {
    addr: String,
    stream: Mutex<TcpStream>,
}

impl NativeBackend {
    /// Opens a connection to `addr` and completes the STARTUP handshake.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| CqlError::setup(format!("cannot connect to {addr}: {e}")))?;
        stream.set_nodelay(true)?;

        let backend = Self {
            addr: addr.to_string(),
            stream: Mutex::new(stream),
        };

        match backend.request(frame::encode_startup(STREAM_ID)).await? {
            Response::Ready => {
                debug!("Handshake with {} complete", addr);
                Ok(backend)
            }
            Response::Authenticate(authenticator) => Err(CqlError::setup(format!(
                "{addr} requires authentication ({authenticator}), which is not supported"
            ))),
            Response::Error { code, message } => Err(CqlError::setup(format!(
                "{addr} rejected startup: error {code}: {message}"
            ))),
            Response::Result(_) => Err(CqlError::protocol("unexpected RESULT during startup")),
        }
    }

    /// Sends one request and waits for its response.
    async fn request(&self, request: BytesMut) -> Result<Response> {
        let mut stream = self.stream.lock().await;
        stream.write_all(&request).await?;

        loop {
            let mut raw = [0u8; HEADER_LEN];
            stream.read_exact(&mut raw).await?;
            let header = FrameHeader::parse(&raw)?;

            let mut body = vec![0u8; header.length];
            stream.read_exact(&mut body).await?;

            if header.stream != STREAM_ID {
                debug!("Skipping frame for stream {}", header.stream);
                continue;
            }
            return frame::decode_response(&header, Bytes::from(body));
        }
    }
}

#[async_trait]
impl Backend for NativeBackend {
    async fn execute(
        &self,
        statement: &str,
        consistency: Consistency,
    ) -> std::result::Result<ResultSet, QueryError> {
        debug!("Executing on {} at {}: {}", self.addr, consistency, statement);

        match self
            .request(frame::encode_query(STREAM_ID, statement, consistency))
            .await?
        {
            Response::Result(result) => Ok(result),
            Response::Error { code, message } => Err(QueryError::server(code, message)),
            other => Err(QueryError::client(format!(
                "unexpected response to QUERY: {other:?}"
            ))),
        }
    }

    async fn close(&self) -> Result<()> {
        let mut stream = self.stream.lock().await;
        stream.shutdown().await?;
        Ok(())
    }
}
