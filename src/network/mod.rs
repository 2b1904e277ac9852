//! Network Module
//!
//! TCP server, per-connection sessions and a blocking client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per connection, no limit
//! - Requests executed through the shared Engine

mod server;
mod session;
mod client;

pub use server::Server;
pub use session::Session;
pub use client::Client;
