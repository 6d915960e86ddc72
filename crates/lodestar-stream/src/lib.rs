//! Lodestar Stream - the list-watch session engine
//!
//! This crate provides:
//! - `SnapshotPager`: paginated initial listing with resource-version tracking
//! - `WatchFeed`: the live change subscription opened at the snapshot's version
//! - `WatchSession`: snapshot and live phases concatenated into one ordered,
//!   backpressured frame stream
//! - Frame encodings for the typed (wrapped) and generic (bare) wire variants

pub mod frame;
pub mod session;
pub mod snapshot;
pub mod watch;

// Re-export commonly used types
pub use frame::{Frame, FrameEncoding};
pub use session::{SessionConfig, WatchSession};
pub use snapshot::SnapshotPager;
pub use watch::WatchFeed;
