//! File handles and the filesystem context that builds them
//!
//! Metadata operations never construct handles themselves; they hand the
//! raw reply to a [`CoreFileSystem`], which validates it and produces the
//! client-facing [`FileHandle`] (and may record it in whatever cache it
//! keeps).

use crate::protocol::{
    BlockInfo, CreateFileRes, DeleteFileRes, FileInfo, GetFileRes, RenameRes, RpcResponse,
};
use derive_more::{Display, From, Into};
use tierio_common::{ClientConfig, Error, Result};
use tracing::debug;

/// Naming service file descriptor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From, Into)]
pub struct FileId(u64);

/// What happened to the file in the call that produced the handle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HandleState {
    #[default]
    Live,
    Removed {
        recursive: bool,
    },
    Renamed {
        from: String,
    },
}

/// Client-facing view of a file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHandle {
    path: String,
    info: FileInfo,
    storage_affinity: i32,
    location_affinity: i32,
    first_block: Option<BlockInfo>,
    state: HandleState,
}

impl FileHandle {
    /// Build a handle for `path` from validated file metadata
    #[must_use]
    pub fn new(path: impl Into<String>, info: FileInfo) -> Self {
        Self {
            path: path.into(),
            info,
            storage_affinity: 0,
            location_affinity: 0,
            first_block: None,
            state: HandleState::Live,
        }
    }

    #[must_use]
    pub fn with_affinity(mut self, storage_affinity: i32, location_affinity: i32) -> Self {
        self.storage_affinity = storage_affinity;
        self.location_affinity = location_affinity;
        self
    }

    #[must_use]
    pub fn with_first_block(mut self, block: Option<BlockInfo>) -> Self {
        self.first_block = block;
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: HandleState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn id(&self) -> FileId {
        FileId(self.info.fd)
    }

    #[must_use]
    pub const fn info(&self) -> &FileInfo {
        &self.info
    }

    #[must_use]
    pub const fn storage_affinity(&self) -> i32 {
        self.storage_affinity
    }

    #[must_use]
    pub const fn location_affinity(&self) -> i32 {
        self.location_affinity
    }

    /// Location of the first block, if the reply carried one
    #[must_use]
    pub const fn first_block(&self) -> Option<&BlockInfo> {
        self.first_block.as_ref()
    }

    #[must_use]
    pub const fn state(&self) -> &HandleState {
        &self.state
    }
}

/// Filesystem context that owns handle construction for each call kind
pub trait CoreFileSystem: Send + Sync {
    /// Client settings, including the data-path timeout
    fn config(&self) -> &ClientConfig;

    fn on_create(
        &self,
        res: CreateFileRes,
        path: &str,
        storage_affinity: i32,
        location_affinity: i32,
    ) -> Result<FileHandle>;

    fn on_delete(&self, res: DeleteFileRes, path: &str, recursive: bool) -> Result<FileHandle>;

    fn on_lookup(&self, res: GetFileRes, path: &str) -> Result<FileHandle>;

    fn on_rename(&self, res: RenameRes, src: &str, dst: &str) -> Result<FileHandle>;
}

/// Stateless filesystem context: validates replies and builds handles
#[derive(Clone, Debug, Default)]
pub struct DefaultFileSystem {
    config: ClientConfig,
}

impl DefaultFileSystem {
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

fn checked_file<'a>(
    op: &'static str,
    res: &impl RpcResponse,
    file: &'a FileInfo,
    path: &str,
) -> Result<&'a FileInfo> {
    res.error().check(op)?;
    if !file.is_valid() {
        return Err(Error::translation(format!(
            "{op}: reply for {path} carries no file"
        )));
    }
    Ok(file)
}

impl CoreFileSystem for DefaultFileSystem {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn on_create(
        &self,
        res: CreateFileRes,
        path: &str,
        storage_affinity: i32,
        location_affinity: i32,
    ) -> Result<FileHandle> {
        let file = checked_file("create", &res, &res.file, path)?;
        debug!(path, fd = file.fd, "file created");
        Ok(FileHandle::new(path, file.clone())
            .with_affinity(storage_affinity, location_affinity)
            .with_first_block(res.block))
    }

    fn on_delete(&self, res: DeleteFileRes, path: &str, recursive: bool) -> Result<FileHandle> {
        let file = checked_file("delete", &res, &res.file, path)?;
        debug!(path, fd = file.fd, recursive, "file deleted");
        Ok(FileHandle::new(path, file.clone()).with_state(HandleState::Removed { recursive }))
    }

    fn on_lookup(&self, res: GetFileRes, path: &str) -> Result<FileHandle> {
        let file = checked_file("lookup", &res, &res.file, path)?;
        Ok(FileHandle::new(path, file.clone()).with_first_block(res.block))
    }

    fn on_rename(&self, res: RenameRes, src: &str, dst: &str) -> Result<FileHandle> {
        let file = checked_file("rename", &res, &res.dst_file, dst)?;
        debug!(src, dst, fd = file.fd, "file renamed");
        Ok(FileHandle::new(dst, file.clone()).with_state(HandleState::Renamed {
            from: src.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ErrorCode, FileKind};
    use tierio_common::DataNodeInfo;

    fn file(fd: u64) -> FileInfo {
        FileInfo {
            fd,
            capacity: 0,
            kind: FileKind::Data,
            token: 0,
        }
    }

    #[test]
    fn test_create_builds_handle() {
        let fs = DefaultFileSystem::default();
        let block = BlockInfo {
            datanode: DataNodeInfo::new(0, 1, 2, [10, 0, 0, 1], 50020),
            addr: 4096,
            length: 1024,
            lkey: 7,
        };
        let res = CreateFileRes {
            file: file(11),
            parent: file(1),
            block: Some(block.clone()),
            ..Default::default()
        };

        let handle = fs.on_create(res, "/a/b", 2, 3).unwrap();
        assert_eq!(handle.path(), "/a/b");
        assert_eq!(handle.id(), FileId::from(11));
        assert_eq!(handle.storage_affinity(), 2);
        assert_eq!(handle.location_affinity(), 3);
        assert_eq!(handle.first_block(), Some(&block));
        assert_eq!(handle.state(), &HandleState::Live);
    }

    #[test]
    fn test_error_code_rejected() {
        let fs = DefaultFileSystem::default();
        let res = CreateFileRes {
            error: ErrorCode::FILE_EXISTS,
            file: file(11),
            ..Default::default()
        };
        let err = fs.on_create(res, "/a", 0, 0).unwrap_err();
        assert_eq!(err.remote_code(), Some(ErrorCode::FILE_EXISTS.code()));
    }

    #[test]
    fn test_missing_file_rejected() {
        let fs = DefaultFileSystem::default();
        let err = fs.on_lookup(GetFileRes::default(), "/ghost").unwrap_err();
        assert!(matches!(err, Error::Translation(_)));
    }

    #[test]
    fn test_delete_and_rename_states() {
        let fs = DefaultFileSystem::default();
        let deleted = fs
            .on_delete(
                DeleteFileRes {
                    file: file(5),
                    ..Default::default()
                },
                "/dir",
                true,
            )
            .unwrap();
        assert_eq!(deleted.state(), &HandleState::Removed { recursive: true });

        let renamed = fs
            .on_rename(
                RenameRes {
                    src_file: file(6),
                    dst_file: file(6),
                    ..Default::default()
                },
                "/old",
                "/new",
            )
            .unwrap();
        assert_eq!(renamed.path(), "/new");
        assert_eq!(
            renamed.state(),
            &HandleState::Renamed {
                from: "/old".into()
            }
        );
    }
}
