//! Redirect routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation URL
//!     → router.rs (exclusion check, ordered scan)
//!     → normalize.rs (strip scheme and www.)
//!     → matcher.rs (exact or path-prefix test per rule)
//!     → Return: Redirect or no match
//!
//! Rule Compilation (on every rule list change):
//!     Rule[]
//!     → Drop disabled rules, normalize sources once
//!     → Freeze as immutable RuleTable
//! ```
//!
//! # Design Decisions
//! - Tables are immutable; a rule change builds a new table
//! - No regex, plain string prefixes only
//! - First match wins in list order, no longest-prefix resolution
//! - Single pass: a replacement URL is never matched again

pub mod matcher;
pub mod normalize;
pub mod router;

pub use matcher::{MatchKind, SourceMatcher};
pub use normalize::{detect_scheme, has_scheme, normalize_url};
pub use router::{Redirect, RuleTable};
