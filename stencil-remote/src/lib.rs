//! # stencil-remote
//!
//! Authenticated transport to the template backend.
//!
//! [`RemoteClient`] is the seam the session runtime talks to; [`HttpRemote`]
//! is the production implementation over `ureq`. Calls are blocking and are
//! expected to run on a blocking pool.

pub mod client;
pub mod error;
pub mod http;

pub use client::RemoteClient;
pub use error::RemoteError;
pub use http::HttpRemote;
