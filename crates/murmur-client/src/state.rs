//! Application state shared by all line commands.
//!
//! [`AppState`] holds the database, the session context handed to every
//! room session, the composer draft and the currently open room (if any).

use std::future::pending;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use murmur_shared::Clock;
use murmur_store::{Database, MessageStore};

use crate::clock::TokioClock;
use crate::composer::Composer;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::SessionEvent;
use crate::render::TerminalSurface;
use crate::session::{SessionContext, SessionHandle};

/// The open room: its session and the stream of events it produces.
pub struct ActiveRoom {
    pub handle: SessionHandle,
    pub events: mpsc::Receiver<SessionEvent>,
}

/// Central application state.
pub struct AppState {
    /// Room directory and raw log records.
    pub database: Arc<Mutex<Database>>,

    /// Store, directory, clock and configuration for room sessions.
    pub ctx: SessionContext,

    /// Draft of the next outbound message.
    pub composer: Composer,

    /// Viewport shared with the open session for scroll anchoring.
    pub surface: Arc<Mutex<TerminalSurface>>,

    /// `None` until a room is opened.
    pub active: Option<ActiveRoom>,
}

impl AppState {
    /// Open the configured database and build the state around it.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let database = match &config.db_path {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };
        Ok(Self::with_database(
            database,
            config,
            Arc::new(TokioClock::starting_now()),
        ))
    }

    pub fn with_database(database: Database, config: ClientConfig, clock: Arc<dyn Clock>) -> Self {
        let database = Arc::new(Mutex::new(database));
        let store = MessageStore::new(database.clone(), clock.clone()).with_seed_count(config.seed_count);

        let ctx = SessionContext {
            store: Arc::new(Mutex::new(store)),
            directory: database.clone(),
            clock,
            config: Arc::new(config),
        };

        Self {
            database,
            ctx,
            composer: Composer::new(),
            surface: Arc::new(Mutex::new(TerminalSurface::default())),
            active: None,
        }
    }

    pub fn active(&self) -> Result<&ActiveRoom> {
        self.active.as_ref().ok_or(ClientError::NoActiveRoom)
    }

    /// Next event of the open room; waits forever when no room is open.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        match self.active.as_mut() {
            Some(active) => active.events.recv().await,
            None => pending().await,
        }
    }

    /// Close the open room, if any, and reset the viewport.
    pub async fn close_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.close().await;
        }
        if let Ok(mut surface) = self.surface.lock() {
            *surface = TerminalSurface::default();
        }
    }
}
