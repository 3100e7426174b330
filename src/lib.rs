// ABOUTME: Library root for saltrun - exposes the salt-api client for testing.
// ABOUTME: The main binary is in main.rs.

pub mod api;
pub mod config;
pub mod error;
pub mod output;
pub mod types;
