//! flashsess-core - Session store helpers with flash data
//!
//! This crate provides dotted-path access to a per-session value tree and
//! flash data that lives for exactly one more request:
//!
//! - **path**: Dotted path parsing (`user.groups`)
//! - **store**: get/set/has/pull/push/forget/put/clear over the tree
//! - **flash**: `flash.new` / `flash.old` bookkeeping, keep, reflash
//! - **session**: Per-request `Session` combining store and flash
//! - **backend**: Load/persist contract for the host's storage
//! - **lifecycle**: Request start/end hooks against a backend
//!
//! # Example
//!
//! ```rust
//! use flashsess_core::Session;
//!
//! let mut session = Session::default();
//! session.flash("notice", "Profile saved").unwrap();
//!
//! // next request
//! let mut session = Session::new(session.into_store());
//! session.on_request_start();
//! assert!(session.has("notice"));
//!
//! // and the one after
//! let mut session = Session::new(session.into_store());
//! session.on_request_start();
//! assert!(!session.has("notice"));
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod flash;
pub mod lifecycle;
pub mod path;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use backend::{MemoryBackend, SessionBackend};
pub use config::{ConfigValidationError, FlashConfig, SessionConfig};
pub use error::{Error, Result};
pub use flash::{FlashRegistry, FlashTransition};
pub use lifecycle::{RequestStart, SessionLifecycle};
pub use path::SessionPath;
pub use session::Session;
pub use store::{SessionStore, StoreValue};
