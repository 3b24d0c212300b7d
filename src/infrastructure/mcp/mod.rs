//! # MCP Module
//!
//! Model Context Protocol transport adapter.
//! Exposes the operation catalog as MCP tools and forwards calls to the dispatcher.

pub mod server;
