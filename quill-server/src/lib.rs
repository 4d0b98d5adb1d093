//! quill-server: JSON API over quill-core
//!
//! Token-authenticated HTTP endpoints for accounts, notes, and todo lists.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
