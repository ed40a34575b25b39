//! Motion module for leadscrew.
//!
//! Spindle tracking and the two control laws that produce carriage targets:
//! thread synchronization and jog/endstop feed.

mod feed;
mod spindle;
mod thread_sync;

pub use feed::{FeedCommand, FeedEngine, FeedOutput, FeedSession, JogMultiplier};
pub use spindle::{RpmSampler, SpindleState, SpindleTracker};
pub use thread_sync::{
    DisengageReason, SyncEvent, SyncOutput, ThreadSpec, ThreadSyncEngine, ThreadingSession,
    MAX_STARTS,
};

/// Carriage travel direction, also naming the endstop on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward negative steps.
    Left,
    /// Toward positive steps.
    Right,
}

impl Direction {
    /// The other direction.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}
