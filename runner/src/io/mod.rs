//! Side-effecting code: configuration file, oracle transport and client.

pub mod config;
pub mod oracle;
pub mod retry;
pub mod transport;
