//! Archive unpacker
//!
//! Decompresses a gzip'd tar held in memory and recreates its directories and
//! regular files under a destination, passing every entry name through a
//! rename rule first. Entries are processed in archive order.
//!
//! A failure part way through leaves the entries written so far on disk;
//! there is no rollback. Damage detected before the first entry is a
//! [`Error::CorruptArchive`]; anything later is an [`Error::Extract`].

use crate::core::output;
use crate::error::{Error, Result};
use crate::fs::Filesystem;
use flate2::bufread::GzDecoder;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Mode for parent directories that the archive does not list itself.
const IMPLICIT_DIR_MODE: u32 = 0o755;

/// Rename rule that drops the archive's top-level wrapper directory.
///
/// `go/bin/go` becomes `bin/go`; the wrapper itself (`go/`) becomes the
/// empty path, i.e. the destination.
pub fn strip_first_segment(path: &Path) -> PathBuf {
    path.components().skip(1).collect()
}

/// Unpack a `.tar.gz` archive into `dest`.
///
/// Each entry lands at `dest / rename(entry path)`. Directories are created
/// with their recorded mode; regular files are created (or truncated) with
/// their recorded mode and filled with the entry's contents. Other entry
/// types are skipped with a warning.
pub fn unpack<F>(archive: &[u8], dest: &Path, rename: F, fs: &dyn Filesystem) -> Result<()>
where
    F: Fn(&Path) -> PathBuf,
{
    let decoder = GzDecoder::new(archive);
    if decoder.header().is_none() {
        return Err(Error::CorruptArchive("not a gzip stream".to_string()));
    }

    let mut tar = tar::Archive::new(decoder);
    let entries = tar
        .entries()
        .map_err(|e| Error::CorruptArchive(format!("tar read error: {}", e)))?;

    let mut seen = 0usize;
    let mut count = 0usize;
    for entry in entries {
        let mut entry = match entry {
            Ok(entry) => entry,
            Err(e) if seen == 0 => {
                return Err(Error::CorruptArchive(format!("tar entry error: {}", e)));
            }
            // Earlier entries are already on disk: the stream broke off mid-extraction
            Err(source) => {
                return Err(Error::Extract {
                    path: dest.to_path_buf(),
                    source: io::Error::new(
                        source.kind(),
                        format!("archive truncated or damaged after {} entries: {}", seen, source),
                    ),
                });
            }
        };
        seen += 1;
        let name = entry
            .path()
            .map_err(|e| Error::CorruptArchive(format!("tar path error: {}", e)))?
            .into_owned();

        let relative = rename(&name);
        if !is_contained(&relative) {
            return Err(Error::UnsafeEntryPath(name));
        }
        let target = dest.join(&relative);

        let header = entry.header();
        let entry_type = header.entry_type();
        let mode = header
            .mode()
            .map_err(|e| Error::CorruptArchive(format!("tar mode error: {}", e)))?;

        if entry_type.is_dir() {
            fs.create_dir_all(&target, mode).map_err(extraction)?;
        } else if entry_type.is_file() || entry_type.is_contiguous() {
            write_file(fs, &target, mode, &mut entry)?;
        } else {
            output::warning(&format!(
                "skipping unsupported archive entry {} ({:?})",
                name.display(),
                entry_type
            ));
            continue;
        }
        count += 1;
    }

    output::detail(&format!("extracted {} entries to {}", count, dest.display()));
    Ok(())
}

fn write_file(fs: &dyn Filesystem, target: &Path, mode: u32, content: &mut impl Read) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs.create_dir_all(parent, IMPLICIT_DIR_MODE)
            .map_err(extraction)?;
    }

    let mut file = fs.create_file(target, mode).map_err(extraction)?;
    // `file` drops at the end of this scope whether or not the copy succeeded
    io::copy(content, &mut file).map_err(|source| Error::Extract {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Relative, with no `..` and no root or prefix.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn extraction(err: Error) -> Error {
    match err {
        Error::Io { path, source } => Error::Extract { path, source },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MemFs, OsFs};
    use std::io::Write;

    enum Item<'a> {
        Dir(&'a str, u32),
        File(&'a str, &'a [u8], u32),
        Symlink(&'a str, &'a str),
    }

    fn tarball(items: &[Item<'_>]) -> Vec<u8> {
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for item in items {
            let mut header = tar::Header::new_gnu();
            match item {
                Item::Dir(path, mode) => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_size(0);
                    header.set_mode(*mode);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, path, std::io::empty())
                        .unwrap();
                }
                Item::File(path, content, mode) => {
                    header.set_size(content.len() as u64);
                    header.set_mode(*mode);
                    header.set_cksum();
                    builder.append_data(&mut header, path, *content).unwrap();
                }
                Item::Symlink(path, target) => {
                    header.set_entry_type(tar::EntryType::Symlink);
                    header.set_size(0);
                    header.set_mode(0o777);
                    header.set_link_name(target).unwrap();
                    header.set_cksum();
                    builder
                        .append_data(&mut header, path, std::io::empty())
                        .unwrap();
                }
            }
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    fn go_release(top: &str) -> Vec<u8> {
        let bin = format!("{top}/bin/");
        let go = format!("{top}/bin/go");
        let version = format!("{top}/VERSION");
        let root = format!("{top}/");
        tarball(&[
            Item::Dir(&root, 0o755),
            Item::File(&version, b"go1.17.1", 0o644),
            Item::Dir(&bin, 0o750),
            Item::File(&go, b"\x7fELF go binary", 0o755),
        ])
    }

    #[test]
    fn test_strip_first_segment() {
        assert_eq!(strip_first_segment(Path::new("go/bin/go")), PathBuf::from("bin/go"));
        assert_eq!(strip_first_segment(Path::new("go/")), PathBuf::new());
        assert_eq!(strip_first_segment(Path::new("go")), PathBuf::new());
        assert_eq!(
            strip_first_segment(Path::new("go/src/net/http/server.go")),
            PathBuf::from("src/net/http/server.go")
        );
    }

    #[test]
    fn test_unpack_flattens_top_level_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("1.17.1");
        std::fs::create_dir_all(&dest).unwrap();

        unpack(&go_release("go"), &dest, strip_first_segment, &OsFs::new()).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("VERSION")).unwrap(), "go1.17.1");
        assert_eq!(std::fs::read(dest.join("bin/go")).unwrap(), b"\x7fELF go binary");
        assert!(!dest.join("go").exists());
    }

    #[test]
    fn test_unpack_layout_independent_of_wrapper_name() {
        for top in ["go", "golang-1.16", "x"] {
            let fs = MemFs::new();
            let dest = Path::new("/sdks/go/1.16");
            unpack(&go_release(top), dest, strip_first_segment, &fs).unwrap();

            assert_eq!(fs.read(&dest.join("VERSION")).unwrap(), b"go1.17.1", "wrapper {top}");
            assert!(fs.read(&dest.join("bin/go")).is_some(), "wrapper {top}");
            assert!(!fs.is_dir(&dest.join(top)), "wrapper {top}");
        }
    }

    #[test]
    fn test_unpack_identity_rename_keeps_paths() {
        let fs = MemFs::new();
        let dest = Path::new("/out");
        unpack(&go_release("go"), dest, |p: &Path| p.to_path_buf(), &fs).unwrap();
        assert!(fs.read(Path::new("/out/go/bin/go")).is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_unpack_applies_recorded_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        unpack(&go_release("go"), dir.path(), strip_first_segment, &OsFs::new()).unwrap();

        let mode = std::fs::metadata(dir.path().join("bin/go"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_unpack_records_modes_on_backend() {
        let fs = MemFs::new();
        unpack(&go_release("go"), Path::new("/d"), strip_first_segment, &fs).unwrap();
        assert_eq!(fs.mode(Path::new("/d/bin/go")), Some(0o755));
        assert_eq!(fs.mode(Path::new("/d/VERSION")), Some(0o644));
    }

    #[test]
    fn test_unpack_applies_directory_mode_on_backend() {
        let fs = MemFs::new();
        unpack(&go_release("go"), Path::new("/d"), strip_first_segment, &fs).unwrap();
        assert_eq!(fs.mode(Path::new("/d/bin")), Some(0o750));
    }

    #[cfg(unix)]
    #[test]
    fn test_unpack_applies_directory_mode_on_disk() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        unpack(&go_release("go"), dir.path(), strip_first_segment, &OsFs::new()).unwrap();

        let mode = std::fs::metadata(dir.path().join("bin"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn test_unpack_creates_unlisted_parents() {
        let fs = MemFs::new();
        let archive = tarball(&[Item::File("go/pkg/tool/linux_amd64/vet", b"vet", 0o755)]);
        unpack(&archive, Path::new("/d"), strip_first_segment, &fs).unwrap();
        assert_eq!(fs.read(Path::new("/d/pkg/tool/linux_amd64/vet")).unwrap(), b"vet");
        assert!(fs.is_dir(Path::new("/d/pkg/tool")));
    }

    #[test]
    fn test_unpack_truncates_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("VERSION"), "a much longer previous version file").unwrap();

        unpack(&go_release("go"), dir.path(), strip_first_segment, &OsFs::new()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("VERSION")).unwrap(),
            "go1.17.1"
        );
    }

    #[test]
    fn test_unpack_later_entry_wins() {
        let fs = MemFs::new();
        let archive = tarball(&[
            Item::File("go/VERSION", b"first", 0o644),
            Item::File("go/VERSION", b"second", 0o644),
        ]);
        unpack(&archive, Path::new("/d"), strip_first_segment, &fs).unwrap();
        assert_eq!(fs.read(Path::new("/d/VERSION")).unwrap(), b"second");
    }

    #[test]
    fn test_unpack_rejects_non_gzip() {
        let fs = MemFs::new();
        let err = unpack(b"definitely not gzip", Path::new("/d"), strip_first_segment, &fs)
            .unwrap_err();
        assert!(matches!(err, Error::CorruptArchive(_)), "got {err:?}");
        assert!(!fs.is_dir(Path::new("/d")));
    }

    #[test]
    fn test_unpack_rejects_empty_input() {
        let err = unpack(b"", Path::new("/d"), strip_first_segment, &MemFs::new()).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive(_)));
    }

    #[test]
    fn test_unpack_empty_archive_is_ok() {
        let fs = MemFs::new();
        unpack(&tarball(&[]), Path::new("/d"), strip_first_segment, &fs).unwrap();
        assert!(fs.read_dir(Path::new("/")).unwrap().is_empty());
    }

    #[test]
    fn test_unpack_skips_symlinks() {
        let fs = MemFs::new();
        let archive = tarball(&[
            Item::Dir("go/bin/", 0o755),
            Item::Symlink("go/bin/gofmt-link", "gofmt"),
            Item::File("go/bin/gofmt", b"gofmt", 0o755),
        ]);
        unpack(&archive, Path::new("/d"), strip_first_segment, &fs).unwrap();
        assert!(fs.read(Path::new("/d/bin/gofmt")).is_some());
        assert!(fs.read(Path::new("/d/bin/gofmt-link")).is_none());
    }

    #[test]
    fn test_unpack_rejects_parent_traversal() {
        // tar::Builder refuses `..`, so write the raw header name by hand
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_old();
        let name = b"go/../../evil";
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(4);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, &b"pwnd"[..]).unwrap();
        let archive = builder.into_inner().unwrap().finish().unwrap();

        let fs = MemFs::new();
        let err = unpack(&archive, Path::new("/d/x"), strip_first_segment, &fs).unwrap_err();
        assert!(matches!(err, Error::UnsafeEntryPath(_)), "got {err:?}");
        assert!(fs.read(Path::new("/evil")).is_none());
    }

    #[test]
    fn test_unpack_failure_keeps_earlier_entries() {
        let fs = MemFs::new();
        fs.create_dir_all(Path::new("/d"), 0o755).unwrap();
        // A plain file where the archive wants the bin directory
        fs.create_file(Path::new("/d/bin"), 0o644)
            .unwrap()
            .write_all(b"in the way")
            .unwrap();

        let err = unpack(&go_release("go"), Path::new("/d"), strip_first_segment, &fs).unwrap_err();
        match err {
            Error::Extract { path, .. } => assert_eq!(path, PathBuf::from("/d/bin")),
            other => panic!("expected extraction error, got {other:?}"),
        }
        // VERSION precedes bin/ in the archive and stays behind
        assert_eq!(fs.read(Path::new("/d/VERSION")).unwrap(), b"go1.17.1");
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_unpack_interrupted_copy_leaves_partial_file() {
        let size = 200_000usize;
        let mut seed = 0x2545_f491u32;
        let content: Vec<u8> = (0..size)
            .map(|_| {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (seed >> 16) as u8
            })
            .collect();

        // Stored blocks keep the compressed offset close to the uncompressed one
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::none());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(size as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "go/bin/go", &content[..])
            .unwrap();
        let archive = builder.into_inner().unwrap().finish().unwrap();
        let cut = &archive[..archive.len() / 2];

        let fs = MemFs::new();
        let err = unpack(cut, Path::new("/d"), strip_first_segment, &fs).unwrap_err();
        match err {
            Error::Extract { path, .. } => assert_eq!(path, PathBuf::from("/d/bin/go")),
            other => panic!("expected extraction error, got {other:?}"),
        }

        let written = fs.read(Path::new("/d/bin/go")).unwrap();
        assert!(!written.is_empty());
        assert!(written.len() < size);
        assert_eq!(written[..], content[..written.len()]);
    }

    #[test]
    fn test_unpack_stream_ending_mid_header_is_extraction_error() {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in [("go/VERSION", &b"go1.17.1"[..]), ("go/README.md", &b"readme"[..])] {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content).unwrap();
        }
        let tar = builder.into_inner().unwrap();
        // First entry is one header block plus one data block; keep part of the second header
        let archive = gzip(&tar[..1024 + 100]);

        let fs = MemFs::new();
        let err = unpack(&archive, Path::new("/d"), strip_first_segment, &fs).unwrap_err();
        match err {
            Error::Extract { path, .. } => assert_eq!(path, PathBuf::from("/d")),
            other => panic!("expected extraction error, got {other:?}"),
        }
        assert_eq!(fs.read(Path::new("/d/VERSION")).unwrap(), b"go1.17.1");
        assert!(fs.read(Path::new("/d/README.md")).is_none());
    }

    #[test]
    fn test_unpack_damage_before_first_entry_is_corrupt_archive() {
        let archive = gzip(&[0x41u8; 100]);
        let err = unpack(&archive, Path::new("/d"), strip_first_segment, &MemFs::new())
            .unwrap_err();
        assert!(matches!(err, Error::CorruptArchive(_)), "got {err:?}");
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained(Path::new("bin/go")));
        assert!(is_contained(Path::new("")));
        assert!(!is_contained(Path::new("../evil")));
        assert!(!is_contained(Path::new("bin/../../evil")));
        assert!(!is_contained(Path::new("/etc/passwd")));
    }
}
