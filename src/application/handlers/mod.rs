//! # Operation Handlers
//!
//! One async function per operation, grouped by the resource they touch.
//! Each takes the shared [`ToolContext`] and validated [`Args`] and returns the success text.
//!
//! [`ToolContext`]: crate::application::dispatcher::ToolContext
//! [`Args`]: crate::application::args::Args

pub mod files;
pub mod process;
pub mod system;
pub mod web;
