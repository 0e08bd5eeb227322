use std::collections::HashSet;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::ports::{FileReader, FileStorage, PortError, PortResult, StartPoint};

/// Files under `<base_path>/<location>/<name>`, where `location` is one of the configured save
/// locations.
pub struct LocalFileStorage {
    base_path: PathBuf,
    locations: HashSet<String>,
}

impl LocalFileStorage {
    pub fn new(base_path: impl Into<PathBuf>, locations: impl IntoIterator<Item = String>) -> Self {
        Self {
            base_path: base_path.into(),
            locations: locations.into_iter().collect(),
        }
    }

    /// Creates every location directory up front so the first upload does not race on it.
    pub async fn prepare(&self) -> PortResult<()> {
        for location in &self.locations {
            fs::create_dir_all(self.base_path.join(location)).await?;
        }
        Ok(())
    }

    fn resolve(&self, location: &str, name: &str) -> PortResult<PathBuf> {
        let dir = self.location_dir(location)?;
        if !is_plain_file_name(name) {
            return Err(PortError::Argument(format!("invalid file name: {}", name)));
        }
        Ok(dir.join(name))
    }

    fn location_dir(&self, location: &str) -> PortResult<PathBuf> {
        if !self.locations.contains(location) {
            return Err(PortError::Argument(format!("unknown save location: {}", location)));
        }
        Ok(self.base_path.join(location))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

/// Writes until `buffer` is consumed or the writer accepts nothing more. Returns the bytes
/// written, which is short of `buffer.len()` only in the second case.
async fn write_fully<W: AsyncWrite + Unpin>(writer: &mut W, buffer: &[u8]) -> std::io::Result<usize> {
    let mut written = 0;
    while written < buffer.len() {
        match writer.write(&buffer[written..]).await? {
            0 => break,
            n => written += n,
        }
    }
    Ok(written)
}

fn map_io(err: std::io::Error, path: &Path) -> PortError {
    if err.kind() == ErrorKind::NotFound {
        PortError::NotFound(path.display().to_string())
    } else {
        PortError::Io(err)
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save_file(&self, location: &str, name: &str, buffer: &[u8], start: StartPoint) -> PortResult<usize> {
        let path = self.resolve(location, name)?;
        debug!(full_path = %path.display(), size = buffer.len(), ?start, "file_storage: write");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        match start {
            StartPoint::Beginning => options.write(true).truncate(true),
            StartPoint::End => options.append(true),
            StartPoint::Custom(_) => options.write(true),
        };

        let mut file = options.open(&path).await.map_err(|e| map_io(e, &path))?;
        if let StartPoint::Custom(offset) = start {
            file.seek(SeekFrom::Start(offset)).await?;
        }

        let written = write_fully(&mut file, buffer).await?;
        file.flush().await?;
        Ok(written)
    }

    async fn get_file(&self, location: &str, name: &str, start: StartPoint) -> PortResult<FileReader> {
        if start != StartPoint::Beginning {
            return Err(PortError::Unsupported(format!("reading from {:?} is not supported", start)));
        }

        let path = self.resolve(location, name)?;
        let file = fs::File::open(&path).await.map_err(|e| map_io(e, &path))?;
        Ok(Box::new(file))
    }

    async fn list_files(&self, location: &str) -> PortResult<Vec<String>> {
        let dir = self.location_dir(location)?;
        let mut entries = fs::read_dir(&dir).await.map_err(|e| map_io(e, &dir))?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete_file(&self, location: &str, name: &str) -> PortResult<()> {
        let path = self.resolve(location, name)?;
        fs::remove_file(&path).await.map_err(|e| {
            warn!(full_path = %path.display(), error = %e, "file_storage: remove_file failed");
            map_io(e, &path)
        })
    }

    fn full_path(&self, location: &str, name: &str) -> PathBuf {
        self.base_path.join(location).join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};
    use tokio::io::AsyncReadExt;

    fn storage(dir: &tempfile::TempDir) -> LocalFileStorage {
        LocalFileStorage::new(dir.path(), vec!["documents".to_string()])
    }

    async fn read_all(storage: &LocalFileStorage, name: &str) -> String {
        let mut reader = storage.get_file("documents", name, StartPoint::Beginning).await.unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).await.unwrap();
        content
    }

    #[tokio::test]
    async fn start_points_truncate_append_and_seek() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        assert_eq!(storage.save_file("documents", "a.txt", b"hello world", StartPoint::Beginning).await.unwrap(), 11);
        storage.save_file("documents", "a.txt", b"!", StartPoint::End).await.unwrap();
        assert_eq!(read_all(&storage, "a.txt").await, "hello world!");

        storage.save_file("documents", "a.txt", b"J", StartPoint::Custom(0)).await.unwrap();
        assert_eq!(read_all(&storage, "a.txt").await, "Jello world!");

        storage.save_file("documents", "a.txt", b"bye", StartPoint::Beginning).await.unwrap();
        assert_eq!(read_all(&storage, "a.txt").await, "bye");
    }

    /// Accepts at most `per_call` bytes per write, and nothing once `capacity` is reached.
    struct Trickle {
        data: Vec<u8>,
        per_call: usize,
        capacity: usize,
    }

    impl AsyncWrite for Trickle {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
            let this = self.get_mut();
            let room = this.capacity - this.data.len();
            let n = buf.len().min(this.per_call).min(room);
            this.data.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn partial_writes_continue_until_done() {
        let mut writer = Trickle { data: vec![], per_call: 3, capacity: usize::MAX };
        assert_eq!(write_fully(&mut writer, b"hello world").await.unwrap(), 11);
        assert_eq!(writer.data, b"hello world");

        let mut full = Trickle { data: vec![], per_call: 3, capacity: 5 };
        assert_eq!(write_fully(&mut full, b"hello world").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn reads_fail_fast_for_unsupported_start_points() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        storage.save_file("documents", "a.txt", b"x", StartPoint::Beginning).await.unwrap();

        assert!(matches!(storage.get_file("documents", "a.txt", StartPoint::End).await, Err(PortError::Unsupported(_))));
        assert!(matches!(storage.get_file("documents", "a.txt", StartPoint::Custom(1)).await, Err(PortError::Unsupported(_))));
    }

    #[tokio::test]
    async fn rejects_unknown_locations_and_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        assert!(matches!(storage.save_file("secrets", "a.txt", b"x", StartPoint::Beginning).await, Err(PortError::Argument(_))));
        assert!(matches!(storage.save_file("documents", "../a.txt", b"x", StartPoint::Beginning).await, Err(PortError::Argument(_))));
        assert!(matches!(storage.save_file("documents", "sub/a.txt", b"x", StartPoint::Beginning).await, Err(PortError::Argument(_))));
    }

    #[tokio::test]
    async fn lists_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        storage.prepare().await.unwrap();
        storage.save_file("documents", "b.md", b"x", StartPoint::Beginning).await.unwrap();
        storage.save_file("documents", "a.txt", b"x", StartPoint::Beginning).await.unwrap();

        assert_eq!(storage.list_files("documents").await.unwrap(), vec!["a.txt", "b.md"]);
        storage.delete_file("documents", "a.txt").await.unwrap();
        assert!(matches!(storage.delete_file("documents", "a.txt").await, Err(PortError::NotFound(_))));
        assert_eq!(storage.full_path("documents", "b.md"), dir.path().join("documents").join("b.md"));
    }
}
