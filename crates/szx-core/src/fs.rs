//! Filesystem operations the extraction driver performs.
//!
//! [`HostFs`] is the real implementation on top of `std::fs`. The trait
//! exists so the driver can be pointed at another filesystem in tests.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

/// Buffered writer capacity for extracted files.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Bit marking that the high 16 attribute bits carry a Unix mode.
pub const FILE_ATTRIBUTE_UNIX_EXTENSION: u32 = 0x8000;

/// Windows read-only attribute bit.
pub const FILE_ATTRIBUTE_READONLY: u32 = 0x01;

/// Primitive filesystem operations used during extraction.
pub trait FileSystem {
    /// Handle of a file open for writing.
    type File: Write;

    /// Creates one directory. Must fail with `AlreadyExists` if it exists.
    fn create_dir(&mut self, path: &Path) -> io::Result<()>;

    /// Opens `path` for writing, truncating any existing file.
    fn create_file(&mut self, path: &Path) -> io::Result<Self::File>;

    /// Flushes and closes a file returned by [`create_file`](Self::create_file).
    fn close_file(&mut self, file: Self::File) -> io::Result<()>;

    /// Applies stored archive attributes to `path`.
    ///
    /// Hosts that cannot represent the attributes ignore them.
    fn set_attributes(&mut self, path: &Path, attributes: u32) -> io::Result<()>;
}

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFs;

impl FileSystem for HostFs {
    type File = BufWriter<File>;

    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        std::fs::create_dir(path)
    }

    fn create_file(&mut self, path: &Path) -> io::Result<Self::File> {
        let file = File::create(path)?;
        Ok(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file))
    }

    fn close_file(&mut self, file: Self::File) -> io::Result<()> {
        // into_inner flushes and reports the flush error instead of
        // dropping it.
        let file = file.into_inner().map_err(io::IntoInnerError::into_error)?;
        drop(file);
        Ok(())
    }

    #[cfg(unix)]
    fn set_attributes(&mut self, path: &Path, attributes: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        if attributes & FILE_ATTRIBUTE_UNIX_EXTENSION != 0 {
            let mode = (attributes >> 16) & 0o7777;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        } else if attributes & FILE_ATTRIBUTE_READONLY != 0 {
            let mut permissions = std::fs::metadata(path)?.permissions();
            permissions.set_readonly(true);
            std::fs::set_permissions(path, permissions)?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn set_attributes(&mut self, path: &Path, attributes: u32) -> io::Result<()> {
        // Only the read-only bit is reachable through std.
        if attributes & FILE_ATTRIBUTE_READONLY != 0 {
            let mut permissions = std::fs::metadata(path)?.permissions();
            permissions.set_readonly(true);
            std::fs::set_permissions(path, permissions)?;
        }
        Ok(())
    }
}

/// Creates `path` unless it already exists.
pub fn ensure_dir<F: FileSystem + ?Sized>(fs: &mut F, path: &Path) -> io::Result<()> {
    match fs.create_dir(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_idempotent() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = temp.path().join("a");
        let mut fs = HostFs;

        ensure_dir(&mut fs, &dir).unwrap();
        ensure_dir(&mut fs, &dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_ensure_dir_missing_parent_fails() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let mut fs = HostFs;

        let err = ensure_dir(&mut fs, &temp.path().join("missing/child")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_write_and_close() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("out.bin");
        let mut fs = HostFs;

        let mut file = fs.create_file(&path).unwrap();
        file.write_all(b"payload").unwrap();
        fs.close_file(file).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn test_create_file_truncates() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("out.bin");
        std::fs::write(&path, b"much longer previous content").unwrap();
        let mut fs = HostFs;

        let mut file = fs.create_file(&path).unwrap();
        file.write_all(b"new").unwrap();
        fs.close_file(file).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("script.sh");
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();
        let mut fs = HostFs;

        fs.set_attributes(&path, (0o750 << 16) | FILE_ATTRIBUTE_UNIX_EXTENSION)
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_plain_windows_attributes_leave_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("plain.txt");
        std::fs::write(&path, b"x").unwrap();
        let before = std::fs::metadata(&path).unwrap().permissions().mode();
        let mut fs = HostFs;

        fs.set_attributes(&path, 0x20).unwrap();

        let after = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(before, after);
    }
}
