use crate::Context;
use crate::core::version;
use crate::error::{Error, Result};
use std::io::Write;

/// Print the active version (`v1.17.1`) without a trailing newline.
pub fn current<W: Write>(ctx: &mut Context<W>) -> Result<String> {
    let symlinks = ctx.fs.as_symlink().ok_or(Error::SymlinkUnsupported {
        backend: ctx.fs.name(),
    })?;
    let link = symlinks.read_link(&ctx.paths.current_link())?;

    let dir = link
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| link.to_string_lossy().into_owned());
    let active = version::display(&dir);

    write!(ctx.out, "{}", active).map_err(Error::Output)?;
    ctx.out.flush().map_err(Error::Output)?;
    Ok(active)
}
