//! # Tools Module
//!
//! Sandboxing primitives for the operations: the path guard, the supervised process runner,
//! and discovery of the external executables they launch.

pub mod discovery;
pub mod executor;
pub mod guard;
