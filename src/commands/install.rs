use crate::Context;
use crate::acquire;
use crate::core::{output, version};
use crate::error::Result;
use crate::extract;
use std::io::Write;
use std::path::PathBuf;

/// Mode for the install directory before the umask applies.
const INSTALL_DIR_MODE: u32 = 0o777;

/// Download and unpack a Go SDK into `<base>/sdks/go/<version>`.
///
/// The install directory is created before the download starts, so a failed
/// download leaves it behind empty.
pub fn install<W: Write>(ctx: &Context<W>, version: &str) -> Result<PathBuf> {
    let version = version::normalize(version)?;
    let install_dir = ctx.paths.version_dir(&version);
    output::action(&format!("Installing go {}", version));

    ctx.fs.create_dir_all(&install_dir, INSTALL_DIR_MODE)?;

    let archive = acquire::fetch(&ctx.http, &ctx.runtime, &version)?;
    extract::unpack(
        &archive,
        &install_dir,
        extract::strip_first_segment,
        ctx.fs.as_ref(),
    )?;

    output::success(&format!(
        "go {} installed to {}",
        version,
        install_dir.display()
    ));
    Ok(install_dir)
}
