//! Go SDK version manager
//!
//! Downloads the release archive for a Go version, unpacks it into a
//! per-version directory and switches the active version with a symlink.
//!
//! # Layout
//!
//! ```text
//! <base>/sdks/go/1.16.8/...   extracted SDKs, wrapper directory stripped
//! <base>/sdks/go/1.17.1/...
//! <base>/sdks/go/current  ->  <base>/sdks/go/1.17.1
//! ```
//!
//! # Commands
//!
//! - `install <version>` - fetch `https://golang.org/dl/go<version>.<os>-<arch>.tar.gz`
//!   and unpack it
//! - `use <version>` - replace the `current` link
//! - `list` - print installed versions
//! - `current` - print the active version (`v1.17.1`)
//!
//! A leading `v` on any version argument is ignored.
//!
//! # Example
//!
//! ```no_run
//! use devctl_go::{Context, commands};
//!
//! let mut ctx = Context::from_env(None);
//! commands::install(&ctx, "1.17.1")?;
//! commands::use_version(&ctx, "1.17.1")?;
//! commands::current(&mut ctx)?;
//! # Ok::<(), devctl_go::Error>(())
//! ```

pub mod acquire;
pub mod commands;
pub mod core;
pub mod error;
pub mod extract;
pub mod fs;

pub use crate::core::config::Context;
pub use crate::core::output;
pub use error::{Error, Result};
