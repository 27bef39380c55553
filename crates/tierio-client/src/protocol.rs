//! Naming service reply records
//!
//! These are the raw, untranslated replies a metadata call yields. Every
//! record carries a protocol [`ErrorCode`]; a record with a non-OK code is
//! structurally valid but must never be turned into a handle.

use derive_more::{From, Into};
use std::fmt;
use tierio_common::{DataNodeInfo, Error, Result};

/// Status code returned by the naming service
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, From, Into)]
pub struct ErrorCode(u16);

const MESSAGES: &[&str] = &[
    "no error",
    "unknown error",
    "protocol version mismatch",
    "invalid rpc command",
    "operation not implemented",
    "parent directory missing",
    "parent is not a directory",
    "file already exists",
    "file not found",
    "directory not empty",
    "no free blocks",
    "token mismatch",
    "capacity exceeded",
    "storage node not registered",
];

impl ErrorCode {
    pub const OK: Self = Self(0);
    pub const UNKNOWN: Self = Self(1);
    pub const PROTOCOL_MISMATCH: Self = Self(2);
    pub const INVALID_RPC_CMD: Self = Self(3);
    pub const NOT_IMPLEMENTED: Self = Self(4);
    pub const PARENT_MISSING: Self = Self(5);
    pub const PARENT_NOT_DIR: Self = Self(6);
    pub const FILE_EXISTS: Self = Self(7);
    pub const FILE_NOT_FOUND: Self = Self(8);
    pub const DIR_NOT_EMPTY: Self = Self(9);
    pub const NO_FREE_BLOCKS: Self = Self(10);
    pub const TOKEN_MISMATCH: Self = Self(11);
    pub const CAPACITY_EXCEEDED: Self = Self(12);
    pub const NODE_NOT_REGISTERED: Self = Self(13);

    /// Raw wire value
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == Self::OK.0
    }

    /// Human-readable meaning of the code
    #[must_use]
    pub fn message(self) -> &'static str {
        MESSAGES
            .get(usize::from(self.0))
            .copied()
            .unwrap_or("unknown error code")
    }

    /// Turn a non-OK code into a remote failure tagged with `op`
    pub fn check(self, op: &'static str) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::Remote {
                op,
                code: self.0,
                message: self.message().to_string(),
            })
        }
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({}: {})", self.0, self.message())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Any reply record that carries a status code
pub trait RpcResponse {
    fn error(&self) -> ErrorCode;
}

/// Kind of namespace entry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileKind {
    #[default]
    Data,
    Directory,
}

/// File metadata as sent by the naming service
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// File descriptor; 0 means "no file"
    pub fd: u64,
    pub capacity: u64,
    pub kind: FileKind,
    pub token: u64,
}

impl FileInfo {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.fd != 0
    }
}

/// Location of a single block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockInfo {
    /// Storage node holding the block
    pub datanode: DataNodeInfo,
    pub addr: u64,
    pub length: u32,
    pub lkey: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateFileRes {
    pub error: ErrorCode,
    pub file: FileInfo,
    pub parent: FileInfo,
    /// First block, when the service pre-allocated one
    pub block: Option<BlockInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteFileRes {
    pub error: ErrorCode,
    pub file: FileInfo,
    pub parent: FileInfo,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetFileRes {
    pub error: ErrorCode,
    pub file: FileInfo,
    pub block: Option<BlockInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenameRes {
    pub error: ErrorCode,
    pub src_parent: FileInfo,
    pub src_file: FileInfo,
    pub dst_parent: FileInfo,
    pub dst_file: FileInfo,
}

/// Reply with nothing but a status code
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoidRes {
    pub error: ErrorCode,
}

macro_rules! impl_rpc_response {
    ($($res:ty),*) => {
        $(impl RpcResponse for $res {
            fn error(&self) -> ErrorCode {
                self.error
            }
        })*
    };
}

impl_rpc_response!(CreateFileRes, DeleteFileRes, GetFileRes, RenameRes, VoidRes);
