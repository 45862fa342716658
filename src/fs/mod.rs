pub mod expiry;
pub mod folder;
pub mod lister;
pub mod path;
pub mod tree;
pub mod url;

pub use expiry::{Expiry, ExpirySpec};
pub use folder::FolderOperationExecutor;
pub use lister::{PaginatedLister, PAGE_SIZE};
pub use path::PathSpec;
pub use tree::{build_entries, DirectoryTree, Entry, EntryKind};
pub use url::{TemporaryUrlOptions, UrlResolver};
