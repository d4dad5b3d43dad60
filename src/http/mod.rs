//! Redirect gateway subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (rebuild the navigated URL from Host + path)
//!     → Redirector (match, record stat)
//!     → response.rs (redirect or no-match)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::navigation_url;
pub use server::{AppState, GatewayServer};
