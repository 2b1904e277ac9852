//! TCP Server
//!
//! Accepts connections and spawns one session thread per client.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::shutdown::ShutdownHandle;
use super::Session;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Modbus-TCP listener
pub struct Server {
    listener: TcpListener,
    engine: Arc<Engine>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bind the listen address from `config`
    ///
    /// Fails if the port is taken or needs privileges; callers treat this
    /// as fatal.
    pub fn bind(config: &Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            engine,
            shutdown: ShutdownHandle::new(),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle that stops the accept loop
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Accept clients until shutdown (blocking)
    ///
    /// No connection limit and no idle timeout. Sessions already running
    /// are left alone on shutdown.
    pub fn run(&self) -> Result<()> {
        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    let engine = Arc::clone(&self.engine);

                    let spawned = thread::Builder::new()
                        .name(format!("session-{}", peer))
                        .spawn(move || match Session::new(stream, engine) {
                            Ok(mut session) => {
                                if let Err(e) = session.handle() {
                                    tracing::debug!("Session {} ended: {}", peer, e);
                                }
                            }
                            Err(e) => tracing::warn!("Failed to set up session {}: {}", peer, e),
                        });

                    if let Err(e) = spawned {
                        tracing::warn!("Failed to spawn session thread for {}: {}", peer, e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    // e.g. EMFILE: back off instead of spinning
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Signal the server to stop accepting
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }
}
