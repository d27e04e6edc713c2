//! HTTP API: routing, request handlers, and SSE streaming

pub mod handlers;
pub mod server;
pub mod sse;
