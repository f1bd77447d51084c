//! Resolution of `@include` directives.
//!
//! The parser does not know where included files live. A [`Reader`](crate::Reader)
//! hands every `@include "path"` to an [`IncludeProvider`], which returns the file's
//! bytes or fails.
//!
//! Any `Fn(&str) -> Result<Vec<u8>>` closure is a provider, which is handy for
//! in-memory fixtures:
//!
//! ```rust
//! use sii_unit::{Error, Reader};
//!
//! let reader = Reader::with_include_provider(|path: &str| match path {
//!     "/def/parts.sii" => Ok(b"part : p.0 {\n}".to_vec()),
//!     other => Err(Error::not_found(other)),
//! });
//!
//! let unit = reader.read_text(b"SiiNunit\n{\n@include \"/def/parts.sii\"\n}".as_slice())?;
//! assert!(unit.child("p.0").is_some());
//! # Ok::<(), sii_unit::Error>(())
//! ```

use crate::{Error, Result};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves include paths to readable content.
pub trait IncludeProvider {
    /// Opens the file named by an `@include` directive.
    ///
    /// Implementations should fail with [`Error::NotFound`] when the path cannot be
    /// resolved.
    fn include_file(&self, path: &str) -> Result<Box<dyn Read + '_>>;
}

impl<F> IncludeProvider for F
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    fn include_file(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self(path)?)))
    }
}

/// Includes files from a directory tree.
///
/// Paths starting with `/` are resolved against the root; all others against the
/// base directory, which defaults to the root.
///
/// # Examples
///
/// ```rust
/// use sii_unit::FsIncludeProvider;
/// use std::path::Path;
///
/// let provider = FsIncludeProvider::new("/game").with_base("def/vehicle");
///
/// assert_eq!(provider.resolve("/def/city.sii"), Path::new("/game/def/city.sii"));
/// assert_eq!(provider.resolve("truck.sii"), Path::new("/game/def/vehicle/truck.sii"));
/// ```
#[derive(Clone, Debug)]
pub struct FsIncludeProvider {
    root: PathBuf,
    base: Option<PathBuf>,
}

impl FsIncludeProvider {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsIncludeProvider {
            root: root.into(),
            base: None,
        }
    }

    /// Sets the directory, relative to the root, that relative paths start from.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        let base: PathBuf = base.into();
        let trimmed = base.strip_prefix("/").unwrap_or(&base).to_path_buf();
        self.base = Some(trimmed);
        self
    }

    /// Maps an include path to a location on disk.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        match path.strip_prefix('/') {
            Some(absolute) => self.root.join(absolute),
            None => match &self.base {
                Some(base) => self.root.join(base).join(path),
                None => self.root.join(path),
            },
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IncludeProvider for FsIncludeProvider {
    fn include_file(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let full = self.resolve(path);
        debug!(path, resolved = %full.display(), "including file");

        let file = File::open(&full).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(path),
            _ => Error::from(err),
        })?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_all(mut reader: Box<dyn Read + '_>) -> String {
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_resolve() {
        let provider = FsIncludeProvider::new("/root");
        assert_eq!(provider.resolve("/a/b.sii"), Path::new("/root/a/b.sii"));
        assert_eq!(provider.resolve("b.sii"), Path::new("/root/b.sii"));

        let provider = provider.with_base("/def/");
        assert_eq!(provider.resolve("/a/b.sii"), Path::new("/root/a/b.sii"));
        assert_eq!(provider.resolve("b.sii"), Path::new("/root/def/b.sii"));
    }

    #[test]
    fn test_include_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("def")).unwrap();
        fs::write(dir.path().join("def/parts.sii"), "part : p.0 {\n}\n").unwrap();

        let provider = FsIncludeProvider::new(dir.path()).with_base("def");
        assert_eq!(read_all(provider.include_file("parts.sii").unwrap()), "part : p.0 {\n}\n");
        assert_eq!(
            read_all(provider.include_file("/def/parts.sii").unwrap()),
            "part : p.0 {\n}\n"
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsIncludeProvider::new(dir.path());

        let result = provider.include_file("missing.sii");
        assert!(matches!(result, Err(Error::NotFound(ref path)) if path == "missing.sii"));
    }

    #[test]
    fn test_closure_provider() {
        let provider = |path: &str| -> Result<Vec<u8>> { Ok(path.as_bytes().to_vec()) };
        assert_eq!(read_all(provider.include_file("echo").unwrap()), "echo");
    }
}
