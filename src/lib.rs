//! Shelf-life lookup library
//!
//! Product catalog, expiration date calculation, search caching and the HTTP
//! surface that ties them together. The binary in `main.rs` only parses
//! arguments and calls [`server::run`].

pub mod cache;
pub mod cli;
pub mod clock;
pub mod data;
pub mod error;
pub mod expiration;
pub mod routes;
pub mod server;
pub mod service;
