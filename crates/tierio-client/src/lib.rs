//! tierio Client - Metadata path
//!
//! Every metadata call (create, delete, lookup, rename, sync) goes to the
//! naming service as a remote call. The transport hands back a raw reply
//! handle; this crate wraps it in a [`MetadataOp`] that turns the reply into
//! a [`FileHandle`] the first time anyone looks, exactly once.
//!
//! ```text
//! caller ──▶ meta::lookup_file(fs, path, reply) ──▶ LookupFileFuture
//!                                                      │ poll_done / await_result
//!                                                      ▼
//!                 RawReply::take ──▶ CoreFileSystem::on_lookup ──▶ FileHandle
//! ```

pub mod fs;
pub mod meta;
pub mod operation;
pub mod protocol;
pub mod reply;

// Re-exports
pub use fs::{CoreFileSystem, DefaultFileSystem, FileHandle, FileId, HandleState};
pub use meta::{
    CreateFileFuture, DeleteFileFuture, LookupFileFuture, RenameFileFuture, SyncFileFuture,
};
pub use operation::{MetaFuture, MetadataOp, NoOperation, OpStatus};
pub use protocol::{BlockInfo, ErrorCode, FileInfo, FileKind};
pub use reply::{RawReply, ReplySender, ReplySlot};
