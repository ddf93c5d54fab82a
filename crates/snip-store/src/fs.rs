//! Sharded filesystem snippet store.
//!
//! One file per snippet under a one-level fan-out keyed by the id's first two
//! characters: `{root}/{id[0..2]}/{id}`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use snip_types::{shard_prefix, Snippet};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::traits::SnippetStore;

/// Default root directory, relative to the working directory.
pub const DEFAULT_ROOT: &str = "./snippet";

/// Permission bits for the root and shard directories.
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Snippet store on local disk with one-level shard directories.
///
/// Durable across restarts, not safe to share between machines. Writes go to
/// a uniquely named temporary file in the shard directory and are renamed
/// into place, so a concurrent reader sees either the previous body or the new
/// one. No lock is held between calls; two concurrent puts to one id resolve
/// to whichever rename lands last.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIR_MODE);
        }
        builder.create(&root)?;
        debug!(root = %root.display(), "opened filesystem snippet store");
        Ok(Self { root })
    }

    /// Open a store at [`DEFAULT_ROOT`].
    pub fn open_default() -> StoreResult<Self> {
        Self::open(DEFAULT_ROOT)
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shard directory and file path for an id.
    fn locate(&self, id: &str) -> StoreResult<(PathBuf, PathBuf)> {
        let shard_dir = self.root.join(shard_prefix(id)?);
        let path = shard_dir.join(id);
        Ok((shard_dir, path))
    }

    /// Full file path for an id.
    pub fn snippet_path(&self, id: &str) -> StoreResult<PathBuf> {
        self.locate(id).map(|(_, path)| path)
    }
}

#[async_trait]
impl SnippetStore for FsStore {
    async fn put_snippet(&self, _ctx: &Context, id: &str, snippet: &Snippet) -> StoreResult<()> {
        let (shard_dir, path) = self.locate(id)?;

        // An existing shard directory is fine; any other failure shows up
        // again when the file is created.
        if let Err(e) = create_shard_dir(&shard_dir).await {
            warn!(id, dir = %shard_dir.display(), error = %e, "could not create shard directory");
        }

        let tmp = TempPath::new(&shard_dir);
        let file = match tokio::fs::File::create(tmp.path()).await {
            Ok(file) => file,
            Err(e) => {
                error!(id, path = %tmp.path().display(), error = %e, "create snippet file failed");
                return Err(StoreError::Io(e));
            }
        };

        let written = match write_body(file, &snippet.body).await {
            Ok(()) => tokio::fs::rename(tmp.path(), &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            error!(id, path = %path.display(), error = %e, "write snippet file failed");
            return Err(StoreError::Io(e));
        }
        tmp.keep();

        if let Err(e) = sync_dir(&shard_dir).await {
            error!(id, dir = %shard_dir.display(), error = %e, "sync shard directory failed");
            return Err(StoreError::Io(e));
        }

        debug!(id, path = %path.display(), size = snippet.len(), "stored snippet to file");
        Ok(())
    }

    async fn get_snippet(&self, _ctx: &Context, id: &str) -> StoreResult<Snippet> {
        let path = self.snippet_path(id)?;
        match tokio::fs::read(&path).await {
            Ok(body) => {
                debug!(id, size = body.len(), "read snippet from file");
                Ok(Snippet::new(body))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => {
                // Collapsed into the shared sentinel; the cause is only logged.
                warn!(id, path = %path.display(), error = %e, "read snippet file failed");
                Err(StoreError::NotFound)
            }
        }
    }

    fn backend(&self) -> &'static str {
        "fs"
    }
}

async fn create_shard_dir(dir: &Path) -> io::Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(dir).await
}

/// A temporary file in a shard directory, removed on drop unless it was
/// renamed into place. Covers puts whose future is dropped mid-write.
struct TempPath {
    path: PathBuf,
    armed: bool,
}

impl TempPath {
    /// Fixed-length name independent of the id, so any id the filesystem
    /// accepts as a file name can be written.
    fn new(shard_dir: &Path) -> Self {
        Self {
            path: shard_dir.join(format!(".tmp.{}", uuid::Uuid::now_v7().simple())),
            armed: true,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The file was renamed away; nothing left to clean up.
    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Flush a directory entry change (the rename) to disk.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Write the full body and flush it to disk. The handle is closed on return
/// whether or not the write succeeded.
async fn write_body(mut file: tokio::fs::File, body: &[u8]) -> io::Result<()> {
    file.write_all(body).await?;
    file.sync_all().await?;
    Ok(())
}
