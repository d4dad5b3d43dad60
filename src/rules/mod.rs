//! Redirection rules.
//!
//! # Data Flow
//! ```text
//! CLI / admin edits
//!     → validation.rs (input boundary URL check)
//!     → model.rs (ordered Rule list)
//!     → store (redirectionRules key)
//!
//! Import file (JSON array, or legacy source→destination object)
//!     → import.rs (parse, whole-list replace)
//! ```
//!
//! # Design Decisions
//! - List order is match priority; first match wins
//! - Stored rules keep their original URL text; normalization happens at match time
//! - Validation only at the input boundary, never at match time

pub mod import;
pub mod model;
pub mod validation;

pub use import::{export_rules, parse_import, ImportError};
pub use model::Rule;
pub use validation::validate_url;
