//! Timewarp - Wayback Machine time travel proxy
//!
//! A forward HTTP proxy that answers every GET with the archived snapshot of the
//! requested URL from a fixed date, hiding the archive's own redirects and URLs.

pub mod config;
pub mod http;
pub mod proxy;
pub mod server;
