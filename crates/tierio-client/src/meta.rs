//! Metadata calls against the naming service
//!
//! Each constructor captures what its translation needs (paths, flags,
//! affinities) and returns a [`MetadataOp`] over the transport's raw reply.
//! Handle construction is delegated to the [`CoreFileSystem`].

use crate::fs::{CoreFileSystem, FileHandle};
use crate::operation::MetadataOp;
use crate::protocol::{CreateFileRes, DeleteFileRes, GetFileRes, RenameRes, VoidRes};
use crate::reply::RawReply;
use std::sync::Arc;

pub type CreateFileFuture = MetadataOp<CreateFileRes, FileHandle>;
pub type DeleteFileFuture = MetadataOp<DeleteFileRes, FileHandle>;
pub type LookupFileFuture = MetadataOp<GetFileRes, FileHandle>;
pub type RenameFileFuture = MetadataOp<RenameRes, FileHandle>;
pub type SyncFileFuture = MetadataOp<VoidRes, ()>;

/// Create `path` with the given storage and location affinity
pub fn create_file(
    fs: &Arc<dyn CoreFileSystem>,
    path: impl Into<String>,
    storage_affinity: i32,
    location_affinity: i32,
    reply: Arc<dyn RawReply<CreateFileRes>>,
) -> CreateFileFuture {
    let fs = Arc::clone(fs);
    let path = path.into();
    MetadataOp::new("create", fs.config().clone(), reply, move |res| {
        fs.on_create(res, &path, storage_affinity, location_affinity)
    })
}

/// Delete `path`, descending into it if `recursive`
pub fn delete_file(
    fs: &Arc<dyn CoreFileSystem>,
    path: impl Into<String>,
    recursive: bool,
    reply: Arc<dyn RawReply<DeleteFileRes>>,
) -> DeleteFileFuture {
    let fs = Arc::clone(fs);
    let path = path.into();
    MetadataOp::new("delete", fs.config().clone(), reply, move |res| {
        fs.on_delete(res, &path, recursive)
    })
}

/// Resolve an existing `path`
pub fn lookup_file(
    fs: &Arc<dyn CoreFileSystem>,
    path: impl Into<String>,
    reply: Arc<dyn RawReply<GetFileRes>>,
) -> LookupFileFuture {
    let fs = Arc::clone(fs);
    let path = path.into();
    MetadataOp::new("lookup", fs.config().clone(), reply, move |res| {
        fs.on_lookup(res, &path)
    })
}

/// Move `src` to `dst`
pub fn rename_file(
    fs: &Arc<dyn CoreFileSystem>,
    src: impl Into<String>,
    dst: impl Into<String>,
    reply: Arc<dyn RawReply<RenameRes>>,
) -> RenameFileFuture {
    let fs = Arc::clone(fs);
    let (src, dst) = (src.into(), dst.into());
    MetadataOp::new("rename", fs.config().clone(), reply, move |res| {
        fs.on_rename(res, &src, &dst)
    })
}

/// Flush pending metadata; only the status code matters
pub fn sync_file(fs: &Arc<dyn CoreFileSystem>, reply: Arc<dyn RawReply<VoidRes>>) -> SyncFileFuture {
    MetadataOp::new("sync", fs.config().clone(), reply, |res: VoidRes| {
        res.error.check("sync")
    })
}
