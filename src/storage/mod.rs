pub mod cos;
pub mod cos_client;
pub mod traits;

pub use cos_client::CosClient;
pub use traits::{ByteStream, ListingPage, ObjectMetadata, ObjectStore, StorageError, Visibility};
