//! Subcommand implementations
//!
//! Each command takes the per-invocation [`Context`](crate::Context) and
//! writes its data (if any) to `ctx.out`.

mod current;
mod install;
mod list;
mod switch;

pub use current::current;
pub use install::install;
pub use list::list;
pub use switch::use_version;

use crate::error::{Error, Result};

/// Fail with a usage error unless exactly `expected` arguments were given.
pub fn validate_arg_count(subcommand: &str, args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(Error::Usage {
            subcommand: subcommand.to_string(),
            expected,
            provided: args.len(),
        });
    }
    Ok(())
}
