//! Mapping of stored `/`-separated names onto the output directory.

use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::fs::FileSystem;
use crate::fs::ensure_dir;

/// Separator used by stored entry names, independent of the host.
pub const VIRTUAL_SEPARATOR: char = '/';

/// An entry name split into its segments.
///
/// Empty and `.` segments are dropped when parsing, so `a//./b` has the
/// segments `a` and `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> VirtualPath<'a> {
    /// Splits `name` on `/`.
    ///
    /// # Errors
    ///
    /// Returns `PathTraversal` if any segment is `..`.
    ///
    /// # Examples
    ///
    /// ```
    /// use szx_core::path::VirtualPath;
    ///
    /// let path = VirtualPath::parse("a/b/c.txt")?;
    /// assert_eq!(path.dirs(), ["a", "b"]);
    /// assert_eq!(path.leaf(), Some("c.txt"));
    /// # Ok::<(), szx_core::ExtractionError>(())
    /// ```
    pub fn parse(name: &'a str) -> Result<Self> {
        let mut segments = Vec::new();
        for segment in name.split(VIRTUAL_SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(ExtractionError::PathTraversal {
                        path: PathBuf::from(name),
                    });
                }
                s => segments.push(s),
            }
        }
        Ok(Self {
            raw: name,
            segments,
        })
    }

    /// The name as stored.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Directory segments, everything but the last segment.
    #[must_use]
    pub fn dirs(&self) -> &[&'a str] {
        match self.segments.split_last() {
            Some((_, dirs)) => dirs,
            None => &[],
        }
    }

    /// Last segment, if the path has any.
    #[must_use]
    pub fn leaf(&self) -> Option<&'a str> {
        self.segments.last().copied()
    }

    /// Resolves the destination of this path under `root`.
    ///
    /// With `full_paths`, each directory prefix is created (existing ones
    /// are fine) and all segments are joined with the host separator.
    /// Without it, only the leaf is used and nothing is created.
    ///
    /// # Errors
    ///
    /// Returns `Io` if a directory cannot be created and `InvalidArchive` if
    /// the path has no segments.
    pub fn resolve<F: FileSystem + ?Sized>(
        &self,
        root: &Path,
        full_paths: bool,
        fs: &mut F,
    ) -> Result<PathBuf> {
        let leaf = self
            .leaf()
            .ok_or_else(|| ExtractionError::InvalidArchive(format!("empty entry name {:?}", self.raw)))?;

        if !full_paths {
            return Ok(root.join(leaf));
        }

        let mut path = root.to_path_buf();
        for dir in self.dirs() {
            path.push(dir);
            ensure_dir(fs, &path)?;
        }
        path.push(leaf);
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fs::HostFs;
    use std::io;
    use tempfile::TempDir;

    /// Records directory creations without touching the disk.
    #[derive(Default)]
    struct RecordingFs {
        dirs: Vec<PathBuf>,
        fail_with: Option<io::ErrorKind>,
    }

    impl FileSystem for RecordingFs {
        type File = io::Sink;

        fn create_dir(&mut self, path: &Path) -> io::Result<()> {
            if let Some(kind) = self.fail_with {
                return Err(io::Error::from(kind));
            }
            self.dirs.push(path.to_path_buf());
            Ok(())
        }

        fn create_file(&mut self, _path: &Path) -> io::Result<Self::File> {
            Ok(io::sink())
        }

        fn close_file(&mut self, _file: Self::File) -> io::Result<()> {
            Ok(())
        }

        fn set_attributes(&mut self, _path: &Path, _attributes: u32) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_segments() {
        let path = VirtualPath::parse("a/b/c.txt").unwrap();
        assert_eq!(path.dirs(), ["a", "b"]);
        assert_eq!(path.leaf(), Some("c.txt"));
        assert_eq!(path.as_str(), "a/b/c.txt");
    }

    #[test]
    fn test_parse_skips_empty_and_dot() {
        let path = VirtualPath::parse("/a//./b/").unwrap();
        assert_eq!(path.dirs(), ["a"]);
        assert_eq!(path.leaf(), Some("b"));
    }

    #[test]
    fn test_parse_rejects_parent() {
        let err = VirtualPath::parse("a/../../etc/passwd").unwrap_err();
        assert!(matches!(err, ExtractionError::PathTraversal { .. }));
    }

    #[test]
    fn test_dotdot_inside_name_is_fine() {
        let path = VirtualPath::parse("a/..b/c..").unwrap();
        assert_eq!(path.dirs(), ["a", "..b"]);
    }

    #[test]
    fn test_flatten_creates_nothing() {
        let mut fs = RecordingFs::default();
        let path = VirtualPath::parse("a/b/c.txt").unwrap();

        let resolved = path.resolve(Path::new("/out"), false, &mut fs).unwrap();

        assert_eq!(resolved, Path::new("/out").join("c.txt"));
        assert!(fs.dirs.is_empty());
    }

    #[test]
    fn test_full_paths_create_prefixes_in_order() {
        let mut fs = RecordingFs::default();
        let path = VirtualPath::parse("a/b/c.txt").unwrap();

        let resolved = path.resolve(Path::new("/out"), true, &mut fs).unwrap();

        let root = Path::new("/out");
        assert_eq!(resolved, root.join("a").join("b").join("c.txt"));
        assert_eq!(fs.dirs, [root.join("a"), root.join("a").join("b")]);
    }

    #[test]
    fn test_already_exists_is_not_an_error() {
        let mut fs = RecordingFs {
            fail_with: Some(io::ErrorKind::AlreadyExists),
            ..RecordingFs::default()
        };
        let path = VirtualPath::parse("a/b.txt").unwrap();
        assert!(path.resolve(Path::new("/out"), true, &mut fs).is_ok());
    }

    #[test]
    fn test_other_create_failure_aborts() {
        let mut fs = RecordingFs {
            fail_with: Some(io::ErrorKind::PermissionDenied),
            ..RecordingFs::default()
        };
        let path = VirtualPath::parse("a/b.txt").unwrap();
        let err = path.resolve(Path::new("/out"), true, &mut fs).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut fs = RecordingFs::default();
        let path = VirtualPath::parse("//").unwrap();
        let err = path.resolve(Path::new("/out"), false, &mut fs).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidArchive(_)));
    }

    #[test]
    fn test_host_directories_created() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = VirtualPath::parse("x/y/z.bin").unwrap();

        let resolved = path.resolve(temp.path(), true, &mut HostFs).unwrap();

        assert!(temp.path().join("x").join("y").is_dir());
        assert!(!resolved.exists());
    }
}
