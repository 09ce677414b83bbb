//! Request lifecycle hooks.
//!
//! ```text
//! Request Start
//!   │
//!   ├─► Load the session tree from the backend
//!   │
//!   ├─► Age old flash data, rotate new into old
//!   │
//!   └─► Return the Session to application code
//!
//! Request End
//!   │
//!   └─► Persist the session tree
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::SessionBackend;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::flash::{FlashRegistry, FlashTransition};
use crate::session::Session;

/// Result of starting a request.
#[derive(Debug)]
pub struct RequestStart {
    /// The session, ready for application code.
    pub session: Session,
    /// What the request-start hook expired and carried.
    pub transition: FlashTransition,
}

/// Drives sessions through request boundaries against a backend.
pub struct SessionLifecycle<B: SessionBackend> {
    backend: Arc<B>,
    registry: FlashRegistry,
}

impl<B: SessionBackend> SessionLifecycle<B> {
    /// Create a lifecycle manager with the configured flash layout.
    pub fn new(backend: Arc<B>, config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            registry: FlashRegistry::new(&config.flash)?,
        })
    }

    /// Create with default configuration.
    pub fn with_defaults(backend: Arc<B>) -> Self {
        Self {
            backend,
            registry: FlashRegistry::default(),
        }
    }

    /// The backend sessions are loaded from and persisted to.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Called when a request starts.
    ///
    /// Loads the session and runs the flash hook exactly once, before any
    /// application code sees the session.
    pub fn on_request_start(&self, session_id: &str) -> Result<RequestStart> {
        let store = self.backend.load(session_id)?;
        let mut session = Session::with_registry(store, self.registry.clone());
        let transition = session.on_request_start();

        if !transition.is_empty() {
            info!(
                "Session {} request start: {} flash keys expired, {} carried",
                session_id,
                transition.expired.len(),
                transition.carried.len()
            );
        }

        Ok(RequestStart {
            session,
            transition,
        })
    }

    /// Called when a request ends. Persists the session.
    pub fn on_request_end(&self, session_id: &str, session: Session) -> Result<()> {
        self.backend.persist(session_id, session.store())?;
        debug!("Session {} request end", session_id);
        Ok(())
    }

    /// Run one request: start, hand the session to `f`, persist on success.
    ///
    /// If `f` fails, nothing is persisted, so the flash transition of this
    /// request is not recorded either.
    pub fn run<T, F>(&self, session_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let RequestStart { mut session, .. } = self.on_request_start(session_id)?;
        let output = f(&mut session)?;
        self.on_request_end(session_id, session)?;
        Ok(output)
    }

    /// Destroy a session in the backend.
    pub fn forget_session(&self, session_id: &str) -> Result<bool> {
        let existed = self.backend.destroy(session_id)?;
        if existed {
            info!("Destroyed session {}", session_id);
        }
        Ok(existed)
    }
}
