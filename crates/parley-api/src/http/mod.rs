//! HTTP/REST API layer for Parley.
//!
//! Axum-based REST API with session-token authentication (bearer header or
//! cookie), envelope response format, and CORS support.

pub mod cookie;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
