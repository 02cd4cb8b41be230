//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Gemini: generation backend behind the content generation port
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod gemini;
pub mod http;
pub mod state;
