//! Client-facing side of the proxy.
//!
//! The proxy speaks a deliberately small HTTP/1.x dialect to its clients: one
//! `GET <absolute-url> <version>` request per connection, headers read and
//! discarded, one response, then close.
//!
//! - **`connection`**: per-connection state machine
//! - **`parser`**: request line parsing and line scanning helpers
//! - **`request`**: the parsed proxy request
//! - **`response`**: response representation with builder and canned pages
//! - **`writer`**: serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← request line + discarded headers
//!        └──────┬──────┘
//!               │ parsed (or rejected → Writing 400)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← lookup + archive fetch
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← send response
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
