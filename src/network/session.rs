//! Session Handler
//!
//! Serves one client connection: read bytes into a buffer, answer every
//! complete frame in it, repeat until the peer goes away.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use bytes::BytesMut;

use crate::engine::Engine;
use crate::error::{Result, SimError};
use crate::protocol::{decode_buffered, encode_response, MAX_FRAME_SIZE};

/// Size of a single socket read
const READ_BUFFER_SIZE: usize = 1024;

/// Handles a single client connection
pub struct Session {
    /// TCP stream (responses are written in one call per read)
    stream: TcpStream,

    /// Bytes of a frame whose header has arrived but whose payload has not
    pending: BytesMut,

    /// Shared request executor
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Session {
    /// Create a new session handler
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            pending: BytesMut::with_capacity(MAX_FRAME_SIZE),
            engine,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// A frame whose header has arrived waits for the rest of its payload.
    /// Bytes left over after a read that cannot form a header are dropped
    /// and the connection stays open.
    pub fn handle(&mut self) -> Result<()> {
        tracing::info!("Client connected from {}", self.peer_addr);
        let mut buffer = [0u8; READ_BUFFER_SIZE];

        loop {
            let n = match self.stream.read(&mut buffer) {
                Ok(0) => {
                    tracing::info!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} closed: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            };

            let replies = self.process(&buffer[..n]);
            if replies.is_empty() {
                continue;
            }

            if let Err(e) = self.stream.write_all(&replies).and_then(|_| self.stream.flush()) {
                if is_disconnect(e.kind()) {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e.into());
            }
        }
    }

    /// Append `chunk` to the pending bytes and answer every complete frame,
    /// returning the concatenated replies
    fn process(&mut self, chunk: &[u8]) -> Vec<u8> {
        self.pending.extend_from_slice(chunk);
        let mut replies = Vec::new();

        while !self.pending.is_empty() {
            let frame = match decode_buffered(&mut self.pending) {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::trace!(
                        "Waiting for rest of frame from {} ({} bytes buffered)",
                        self.peer_addr,
                        self.pending.len()
                    );
                    break;
                }
                Err(e) => {
                    tracing::debug!("Dropping fragment from {}: {}", self.peer_addr, e);
                    self.pending.clear();
                    break;
                }
            };

            match self.engine.handle(&frame) {
                Ok(response) => {
                    replies.extend_from_slice(&encode_response(&frame.header, &response));
                }
                Err(SimError::UnsupportedFunction(code)) => {
                    tracing::warn!(
                        "Ignoring unsupported function 0x{:02x} from {}",
                        code,
                        self.peer_addr
                    );
                }
                Err(e) => {
                    tracing::warn!("Ignoring request from {}: {}", self.peer_addr, e);
                }
            }
        }

        replies
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
    )
}
