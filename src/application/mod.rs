//! # Application Layer
//!
//! Contains the operation catalog, argument validation, dispatch and the handlers themselves.

pub mod args;
pub mod dispatcher;
pub mod handlers;
pub mod registry;
