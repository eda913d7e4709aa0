/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Quantex feed client crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod client;
pub mod correlator;
pub mod dispatch;
pub mod error;
pub mod sync;
pub mod topic;
pub mod types;
pub mod wire;

// Re-export the connection surface
pub use client::{FeedClient, FeedConfig};

// Re-export subscription management
pub use correlator::{BatchOutcome, SubscriptionCorrelator};

// Re-export the book synchronization seam
pub use sync::{BookStore, BookSynchronizer, SyncKey, SyncRegistry};

// Re-export errors
pub use error::{QuantexError, Result};

// Re-export all types
pub use types::*;
