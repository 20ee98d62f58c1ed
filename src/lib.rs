//! URL blacklist service.
//!
//! A Bloom filter backed by an exact member set answers membership queries
//! for a shared blacklist. Clients speak a line protocol over TCP:
//!
//! ```text
//! POST www.example.com      -> 201 Created
//! GET www.example.com       -> 200 OK, blank line, "true true"
//! DELETE www.example.com    -> 204 No Content
//! ```
//!
//! Every mutation is followed by a full snapshot of the filter to a four-line
//! text record, which is read back on startup.

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod server;
pub mod services;
pub mod session;
pub mod types;
pub mod validator;
