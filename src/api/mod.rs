// src/api/mod.rs
//! Notion API interaction: the ability to read databases and their records.
//!
//! Layers, bottom up: a `NotionTransport` executes requests, `RestClient`
//! resolves endpoints and validates statuses, `fetch_all` walks cursors, and
//! `NotionSession` caches schemas per credential.

pub mod client;
pub mod pagination;
pub mod parser;
pub mod responses;
pub mod rest;
mod session;
pub mod transport;

// Re-export the public interface
pub use client::{ApiResponse, ClientOptions, HttpTransportFactory, NotionHttpClient, ProxySettings};
pub use pagination::fetch_all;
pub use rest::RestClient;
pub use session::NotionSession;
pub use transport::{ApiRequest, NotionTransport, TransportFactory};
