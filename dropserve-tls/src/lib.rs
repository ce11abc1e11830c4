//! Dropserve TLS Module
//!
//! Ephemeral HTTPS for local serving:
//! - In-memory self-signed certificate for `localhost`
//! - rustls server configuration and acceptor

pub mod acceptor;
pub mod self_signed;

pub use acceptor::build_acceptor;
pub use self_signed::{SelfSignedCredential, TlsError};
