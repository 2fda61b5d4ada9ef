//! Session-aware API client core for the catalog service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `SessionContext` layers the
//! session policy on top: it attaches the stored bearer token, executes each
//! call once through a `Transport`, and clears the token whenever the server
//! answers 401.
//!
//! # Design
//! - `ApiClient` is stateless: it holds only `base_url`, and the token is an
//!   explicit argument to every item `build_*` method.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Errors form a closed enum; `Unauthorized` is matched, never compared as
//!   text.
//! - The session store and transport are injected, so tests swap in fakes.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use context::SessionContext;
pub use error::{ApiError, Operation};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{AccessToken, Credentials, Item, ItemPayload, RegisteredUser};
