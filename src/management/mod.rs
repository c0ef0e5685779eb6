mod auth;
mod coordinator;
mod import;
pub mod liked;

pub use auth::TokenManager;
pub use coordinator::{BuildGuard, CacheStatus, CachingCoordinator, StartOutcome, ensure_cached};
pub use import::{
    ImportReport, PlaylistFailure, import_all_to_liked, import_to_liked, owned_playlist_ids,
};
pub use liked::{CacheEntry, CacheKey, CacheSummary, CachedTrack, LikedSongsCache};
