//! Byte-for-byte file copy

use crate::Config;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Overwrite `dest` with the full contents of `src`.
///
/// The destination is truncated (or created), filled from the source, synced
/// to disk when `config.fsync` is set, and finally stamped with the source's
/// modification time so later runs can recognise it as unchanged.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
///
/// # Example
/// ```no_run
/// use foldersync::executor::copy_file_contents;
/// use foldersync::{Config, FolderPair};
/// use std::path::Path;
///
/// let config = Config::new(FolderPair::single("/src", "/dst"));
/// let bytes = copy_file_contents(
///     Path::new("/src/a.txt"),
///     Path::new("/dst/a.txt"),
///     &config,
/// )?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn copy_file_contents(src: &Path, dest: &Path, config: &Config) -> io::Result<u64> {
    let mut src_file = File::open(src)?;
    let src_mtime = src_file.metadata()?.modified()?;
    let mut dest_file = File::create(dest)?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match src_file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dest_file.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    dest_file.flush()?;
    if config.fsync {
        dest_file.sync_all()?;
    }
    drop(dest_file);

    filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(src_mtime))?;

    Ok(total_bytes)
}

/// Whether two paths refer to the same underlying file (device + inode)
#[cfg(unix)]
pub fn is_same_file(_a: &Path, a_meta: &fs::Metadata, _b: &Path, b_meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;

    a_meta.dev() == b_meta.dev() && a_meta.ino() == b_meta.ino()
}

#[cfg(not(unix))]
pub fn is_same_file(a: &Path, _a_meta: &fs::Metadata, b: &Path, _b_meta: &fs::Metadata) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Same size and modification time
pub fn is_unchanged(src: &fs::Metadata, dest: &fs::Metadata) -> bool {
    if src.len() != dest.len() {
        return false;
    }
    match (src.modified(), dest.modified()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
