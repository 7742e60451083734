use crate::Context;
use crate::core::{output, version};
use crate::error::{Error, Result};
use std::io::Write;

/// Point `<base>/sdks/go/current` at `<base>/sdks/go/<version>`.
///
/// Whatever sits at `current` is removed first. The target is not checked,
/// so the new link may dangle.
pub fn use_version<W: Write>(ctx: &Context<W>, version: &str) -> Result<()> {
    let symlinks = ctx.fs.as_symlink().ok_or(Error::SymlinkUnsupported {
        backend: ctx.fs.name(),
    })?;
    let version = version::normalize(version)?;
    let target = ctx.paths.version_dir(&version);
    let current = ctx.paths.current_link();

    match ctx.fs.remove(&current) {
        Err(e) if !e.is_not_found() => return Err(e),
        _ => {}
    }
    symlinks.symlink(&target, &current)?;

    output::success(&format!("now using go {}", version));
    Ok(())
}
