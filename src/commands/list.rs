use crate::Context;
use crate::error::{Error, Result};
use std::io::Write;

/// Print every installed version directory, one per line.
///
/// Names come out in the filesystem's own order. Non-directories (the
/// `current` link included) are left out.
pub fn list<W: Write>(ctx: &mut Context<W>) -> Result<Vec<String>> {
    let names: Vec<String> = ctx
        .fs
        .read_dir(&ctx.paths.sdk_root())?
        .into_iter()
        .filter(|entry| entry.is_dir)
        .map(|entry| entry.name)
        .collect();

    for name in &names {
        writeln!(ctx.out, "{}", name).map_err(Error::Output)?;
    }
    Ok(names)
}
