//! stage::sink
//!
//! The file sink that mirrors selected files to disk.

use async_trait::async_trait;

use super::Materializer;
use crate::core::types::Target;
use crate::remote::ContentSource;
use crate::walk::{FileSink, RemoteFile, WalkError};

/// Fetches each file's raw content and writes it at its repository path.
pub struct MirrorSink<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    materializer: Materializer,
}

impl<'a, S: ContentSource + ?Sized> MirrorSink<'a, S> {
    pub fn new(source: &'a S, materializer: Materializer) -> Self {
        Self {
            source,
            materializer,
        }
    }

    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }
}

#[async_trait]
impl<'a, S: ContentSource + ?Sized> FileSink for MirrorSink<'a, S> {
    async fn accept(&self, file: &RemoteFile) -> Result<(), WalkError> {
        // Validate before spending a request on a path that cannot be written.
        self.materializer.resolve(&file.path)?;

        let content = self
            .source
            .raw(&Target::Reference(file.download_url.clone()))
            .await?;
        self.materializer.write(&file.path, &content).await?;

        log::info!("{}", file.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::MockContentSource;
    use crate::remote::RemoteError;
    use tempfile::TempDir;

    fn remote_file(path: &str) -> RemoteFile {
        RemoteFile {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            download_url: format!("mock://raw/{}", path),
        }
    }

    #[tokio::test]
    async fn writes_fetched_content() {
        let source = MockContentSource::new();
        source.add_file("sub/b.txt", b"bee");
        let dir = TempDir::new().unwrap();
        let sink = MirrorSink::new(&source, Materializer::new(dir.path()));

        sink.accept(&remote_file("sub/b.txt")).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("sub/b.txt")).unwrap(), b"bee");
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let source = MockContentSource::new();
        let dir = TempDir::new().unwrap();
        let sink = MirrorSink::new(&source, Materializer::new(dir.path()));

        let result = sink.accept(&remote_file("missing.txt")).await;

        assert!(matches!(
            result,
            Err(WalkError::Remote(RemoteError::NotFound(_)))
        ));
        assert!(!dir.path().join("missing.txt").exists());
    }

    #[tokio::test]
    async fn unsafe_path_is_rejected_before_fetching() {
        let source = MockContentSource::new();
        let dir = TempDir::new().unwrap();
        let sink = MirrorSink::new(&source, Materializer::new(dir.path()));

        let result = sink.accept(&remote_file("../escape.txt")).await;

        assert!(matches!(result, Err(WalkError::Stage(_))));
        assert!(source.operations().is_empty());
    }
}
