//! VoiceEase daemon library - exposes modules for testing.

pub mod accounts;
pub mod config;
pub mod error;
pub mod extract;
pub mod password;
pub mod requests;
pub mod routes;
pub mod seed;
pub mod server;
pub mod sessions;
pub mod store;
