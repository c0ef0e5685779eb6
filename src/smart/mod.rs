//! Smart playlists: criteria stored in the playlist description and the
//! synchronization that keeps the playlist in line with them.
//!
//! - [`criteria`] - Encoding, embedding and decoding of the criteria token.
//! - [`sync`] - Matching against the liked-songs snapshot, batched additions,
//!   creation with description fallbacks and refreshes.

pub mod criteria;
pub mod sync;

pub use criteria::{AttributeRange, Criteria, CriteriaParams};
pub use sync::{
    ApplyOutcome, CreatedSmartPlaylist, NewSmartPlaylist, PlaylistRefreshResult, RefreshAllReport,
    RefreshReport, ScanReport, SmartPlaylist,
};
