//! Turnstile - HTTP Request Throttling Guard
//!
//! This crate implements an HTTP interceptor that counts requests per client
//! peer address and turns a client away for a fixed lockout period once it
//! exceeds its quota. Admitted requests pass to the downstream handler
//! untouched; rejected ones get a bare `429 Too Many Requests`.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
