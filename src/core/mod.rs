//! Core infrastructure shared by every command
//!
//! Configuration, user-facing output, the host runtime descriptor and
//! version normalization.

pub mod config;
pub mod output;
pub mod runtime;
pub mod version;
