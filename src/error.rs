use crate::storage::traits::StorageError;

/// 文件系统层的错误类型
///
/// 前置条件错误（目录不存在、目录已存在、文件不存在）与存储调用失败分开，
/// 调用方可以按种类分支处理。
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error(transparent)]
    Store(#[from] StorageError),

    /// 目录级操作中某个条目的对象操作失败，已完成的条目不会回滚
    #[error("Operation failed on '{path}': {source}")]
    EntryFailed {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("Folder not found: {path}")]
    FolderNotFound { path: String },

    #[error("Folder already exists: {path}")]
    FolderExists { path: String },

    /// 源目录与目标目录互相包含（或相同）
    #[error("Folder '{path}' and '{destination}' overlap")]
    OverlappingFolders { path: String, destination: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Root directory can not be {0}")]
    RootViolation(&'static str),

    #[error("Invalid expiry format: {0}")]
    InvalidExpiryFormat(String),

    #[error("Listing failed under '{prefix}': {reason}")]
    ListingFailed { prefix: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FsError {
    /// 是否为前置条件断言失败（尚未发生任何修改）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            FsError::FolderNotFound { .. }
                | FsError::FolderExists { .. }
                | FsError::FileNotFound { .. }
                | FsError::OverlappingFolders { .. }
                | FsError::RootViolation(_)
        )
    }

    /// 出错的路径（如果有）
    pub fn path(&self) -> Option<&str> {
        match self {
            FsError::EntryFailed { path, .. }
            | FsError::FolderNotFound { path }
            | FsError::FolderExists { path }
            | FsError::FileNotFound { path }
            | FsError::OverlappingFolders { path, .. } => Some(path),
            FsError::ListingFailed { prefix, .. } => Some(prefix),
            _ => None,
        }
    }
}
