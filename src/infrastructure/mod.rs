//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., HttpClient) and hosts the MCP
//! transport adapter.

pub mod html;
pub mod http;
pub mod mcp;
pub mod tools;
