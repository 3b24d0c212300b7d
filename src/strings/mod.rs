//! # Strings Module
//!
//! Centralizes user-facing strings.
//! Ensures consistency in messaging and easier updates.

pub mod messages;
