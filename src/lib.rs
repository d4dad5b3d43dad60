//! URL redirector library.
//!
//! Rewrites navigations according to ordered source-prefix → destination-prefix
//! rules kept in a shared key-value store, and counts how often each rule fires.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod rules;
pub mod stats;
pub mod store;
pub mod surfaces;

pub use config::RedirectorConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use rules::Rule;
pub use surfaces::{QuickAccess, Redirector, RuleManager};
