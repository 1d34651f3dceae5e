/// Services module - background work that outlives a single frame
///
/// The UI layer only enqueues requests and drains results; the work itself
/// runs on the service's own thread.

pub mod counter_sync;

// Re-export commonly used types
pub use counter_sync::{CounterSync, SyncOutcome, SyncSettings, SyncTrigger};
