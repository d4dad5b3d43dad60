//! Store-backed surfaces.
//!
//! # Data Flow
//! ```text
//! RuleManager / QuickAccess edit rules
//!     → store.set(redirectionRules)
//!     → change notification to every surface
//!     → Redirector recompiles its RuleTable
//!
//! Redirector handles a navigation
//!     → match → StatsRecorder.record → store.set(redirectionStats)
//!     → RuleManager / QuickAccess refresh their stats cache
//! ```
//!
//! # Design Decisions
//! - Each surface owns its caches; no process-wide mutable state
//! - Caches follow the store through one subscription per surface,
//!   dropped together with the surface
//! - Staleness between a write and its notification is tolerated

pub mod cache;
pub mod manager;
pub mod quick;
pub mod redirector;

pub use cache::SurfaceCache;
pub use manager::{ManageError, RuleManager};
pub use quick::{QuickAccess, Summary};
pub use redirector::Redirector;
