//! stage::materializer
//!
//! Writes fetched file content under a local root.

use std::path::{Component, Path, PathBuf};

use super::StageError;

/// Writes files at repository-relative paths under `root`.
///
/// Parent directories are created on demand and existing files are
/// overwritten. Writes are not atomic; a crash can leave a partial file,
/// which is acceptable because a failed run discards its staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materializer {
    root: PathBuf,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a repository-relative path to its location under the root.
    ///
    /// # Errors
    ///
    /// Returns `StageError::UnsafePath` for empty or absolute paths and for
    /// paths containing `..`.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StageError> {
        let mut resolved = self.root.clone();
        let mut depth = 0;

        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StageError::UnsafePath(relative.to_string()));
                }
            }
        }

        if depth == 0 {
            return Err(StageError::UnsafePath(relative.to_string()));
        }
        Ok(resolved)
    }

    /// Persist `content` at `relative`, returning the full path written.
    pub async fn write(&self, relative: &str, content: &[u8]) -> Result<PathBuf, StageError> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StageError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| StageError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_joins_segments() {
        let m = Materializer::new("/stage");
        assert_eq!(
            m.resolve("force-app/classes/Foo.cls").unwrap(),
            PathBuf::from("/stage/force-app/classes/Foo.cls")
        );
        assert_eq!(
            m.resolve("./a.txt").unwrap(),
            PathBuf::from("/stage/a.txt")
        );
    }

    #[test]
    fn resolve_rejects_escapes() {
        let m = Materializer::new("/stage");
        assert!(matches!(
            m.resolve("../etc/passwd"),
            Err(StageError::UnsafePath(_))
        ));
        assert!(matches!(
            m.resolve("a/../../b"),
            Err(StageError::UnsafePath(_))
        ));
        assert!(matches!(
            m.resolve("/etc/passwd"),
            Err(StageError::UnsafePath(_))
        ));
        assert!(matches!(m.resolve(""), Err(StageError::UnsafePath(_))));
    }

    #[tokio::test]
    async fn write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let m = Materializer::new(dir.path());

        let written = m.write("sub/deeper/c.txt", b"hello").await.unwrap();

        assert_eq!(written, dir.path().join("sub/deeper/c.txt"));
        assert_eq!(std::fs::read(&written).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let m = Materializer::new(dir.path());

        m.write("a.txt", b"first version").await.unwrap();
        m.write("a.txt", b"second").await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"second");
    }
}
