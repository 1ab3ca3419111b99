//! Result caching and cache keys.

mod key;
mod result_cache;

pub use key::{
    CacheKey, FileIdentity, FileMetadata, FileState, FsMetadataProvider, GridIdentity,
    MetadataProvider,
};
pub use result_cache::ResultCache;
