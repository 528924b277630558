//! Room sessions.
//!
//! A [`RoomSession`] is the single actor that owns everything mutable about
//! an open room view: the [`WindowManager`], the [`ScrollAnchor`], the
//! [`ReplyScheduler`] and the two timers (older-page latency and reply
//! delay).  It runs as one tokio task and processes commands one at a time,
//! so no two mutations of the same window ever interleave.  The message log
//! itself stays in the shared [`MessageStore`].
//!
//! Layout-changing events are numbered.  The render layer echoes the number
//! of the last event it drew in `LayoutComplete`, which lets the session
//! measure the viewport for a prepend only once every earlier change is on
//! screen, and apply the scroll adjustment only to the pass that drew it.
//!
//! Closing the session (or dropping its [`SessionHandle`]) ends the task and
//! drops both timers with it: nothing is appended after teardown.

use std::future::pending;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};

use murmur_shared::{Clock, RoomId, Sender};
use murmur_store::{AppendOutcome, Message, MessageStore, Room, RoomDirectory};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{emit_event, SessionEvent};
use crate::reply::ReplyScheduler;
use crate::scroll::{ScrollAnchor, ScrollAdjustment, ScrollSurface};
use crate::window::{Extension, WindowManager};

pub type SharedStore = Arc<Mutex<MessageStore>>;
pub type SharedSurface = Arc<Mutex<dyn ScrollSurface + Send>>;

const COMMAND_BUFFER: usize = 64;

/// What every session needs from the application.
#[derive(Clone)]
pub struct SessionContext {
    pub store: SharedStore,
    pub directory: Arc<dyn RoomDirectory + Send + Sync>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<ClientConfig>,
}

/// Signals from the message viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSignal {
    /// The sentinel above the oldest rendered message changed visibility.
    TopSentinel { intersecting: bool },
}

#[derive(Debug)]
pub enum SessionCommand {
    Send(Message),
    Viewport(ViewportSignal),
    /// The render layer finished laying out every event up to `seq`.
    LayoutComplete { seq: u64 },
    Snapshot(oneshot::Sender<WindowSnapshot>),
    Close,
}

/// Point-in-time view of a session, for headers and status lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    pub room: Room,
    pub window: Vec<Message>,
    pub page_count: usize,
    pub total_pages: usize,
    pub total_len: usize,
    pub can_extend: bool,
    pub loading_older: bool,
    pub composing: bool,
}

pub struct RoomSession {
    room: Room,
    ctx: SessionContext,
    window: WindowManager,
    anchor: ScrollAnchor,
    replies: ReplyScheduler,
    surface: SharedSurface,
    events: mpsc::Sender<SessionEvent>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    extension_timer: Option<Pin<Box<Sleep>>>,
    reply_timer: Option<Pin<Box<Sleep>>>,
    /// Last layout sequence number handed out.
    layout_seq: u64,
    /// Last layout sequence number the render layer reported as drawn.
    drawn_seq: u64,
    /// The older page is due but earlier changes are not drawn yet.
    extension_ready: bool,
}

impl RoomSession {
    /// Open a room and start its session task.
    ///
    /// Fails with [`ClientError::RoomNotFound`] when the directory has no
    /// such room; in that case no log is loaded and no task is started.
    pub fn open(
        ctx: SessionContext,
        room_id: RoomId,
        surface: SharedSurface,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<SessionHandle> {
        let room = ctx
            .directory
            .room(room_id)
            .ok_or(ClientError::RoomNotFound(room_id))?;

        let mut window = WindowManager::new(ctx.config.page_size);
        window.initialize(lock_store(&ctx.store)?.load(room_id));

        let replies = ReplyScheduler::from_seed(ctx.config.reply_timing, ctx.config.rng_seed);
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);

        tracing::info!(
            room_id = %room.id,
            name = %room.name,
            messages = window.total_len(),
            "room session opened"
        );

        let session = RoomSession {
            room: room.clone(),
            ctx,
            window,
            anchor: ScrollAnchor::new(),
            replies,
            surface,
            events,
            cmd_rx,
            extension_timer: None,
            reply_timer: None,
            layout_seq: 0,
            drawn_seq: 0,
            extension_ready: false,
        };
        let task = tokio::spawn(session.run());

        Ok(SessionHandle { room, cmd_tx, task })
    }

    async fn run(mut self) {
        // first paint lands at the newest message
        let seq = self.next_layout_seq();
        self.anchor.pin_to_bottom(seq);
        self.emit(SessionEvent::Initialized {
            seq,
            room: self.room.clone(),
            window: self.window.window().to_vec(),
            total: self.window.total_len(),
            can_extend: self.window.can_extend(),
        })
        .await;

        loop {
            let result = tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(SessionCommand::Close) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
                () = fire(&mut self.extension_timer) => {
                    self.extension_timer = None;
                    self.on_older_page_due().await
                }
                () = fire(&mut self.reply_timer) => {
                    self.reply_timer = None;
                    self.deliver_reply().await
                }
            };

            if let Err(e) = result {
                tracing::error!(room_id = %self.room.id, error = %e, "session step failed");
                self.emit(SessionEvent::Notice { text: e.to_string() }).await;
            }
        }

        self.teardown();
    }

    async fn handle_command(&mut self, cmd: SessionCommand) -> Result<()> {
        match cmd {
            SessionCommand::Send(message) => self.handle_send(message).await,
            SessionCommand::Viewport(ViewportSignal::TopSentinel { intersecting }) => {
                self.handle_top_sentinel(intersecting).await
            }
            SessionCommand::LayoutComplete { seq } => self.handle_layout_complete(seq).await,
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
                Ok(())
            }
            SessionCommand::Close => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Messages and replies
    // ------------------------------------------------------------------

    async fn handle_send(&mut self, message: Message) -> Result<()> {
        let from_user = message.sender.is_user();
        let outcome = self.append(message)?;
        self.publish_append(outcome).await;

        if from_user {
            let now = self.ctx.clock.now_ms();
            if let Some(delay) = self.replies.on_user_message(now) {
                self.reply_timer = Some(Box::pin(sleep(delay)));
                self.emit(SessionEvent::Composing { active: true }).await;
            }
        }
        Ok(())
    }

    async fn deliver_reply(&mut self) -> Result<()> {
        let text = self.ctx.config.reply_text.clone();
        let now = self.ctx.clock.now_ms();
        let appended = Message::text(Sender::Synthetic, text, now)
            .map_err(ClientError::from)
            .and_then(|reply| self.append(reply));

        match appended {
            Ok(outcome) => {
                self.publish_append(outcome).await;
                self.replies.complete(self.ctx.clock.now_ms());
                self.emit(SessionEvent::Composing { active: false }).await;
                Ok(())
            }
            Err(e) => {
                self.replies.cancel();
                self.emit(SessionEvent::Composing { active: false }).await;
                Err(e)
            }
        }
    }

    fn append(&mut self, message: Message) -> Result<AppendOutcome> {
        let outcome = lock_store(&self.ctx.store)?.append(self.room.id, message);
        self.window.append_to_tail(outcome.message.clone());
        Ok(outcome)
    }

    async fn publish_append(&mut self, outcome: AppendOutcome) {
        let seq = self.next_layout_seq();
        // the user is reading history while an older page is on its way
        if !self.window.is_loading_older() {
            self.anchor.pin_to_bottom(seq);
        }

        if let Some(e) = &outcome.persist_error {
            self.emit(SessionEvent::Notice {
                text: format!("Message kept for this session but could not be saved: {e}"),
            })
            .await;
        }
        self.emit(SessionEvent::MessageAppended {
            seq,
            message: outcome.message,
            index: outcome.index,
        })
        .await;
    }

    // ------------------------------------------------------------------
    // Older pages
    // ------------------------------------------------------------------

    async fn handle_top_sentinel(&mut self, intersecting: bool) -> Result<()> {
        if !intersecting || !self.window.begin_extension() {
            return Ok(());
        }
        self.extension_timer = Some(Box::pin(sleep(self.ctx.config.older_page_delay)));
        self.emit(SessionEvent::LoadingOlder).await;
        Ok(())
    }

    async fn on_older_page_due(&mut self) -> Result<()> {
        if self.drawn_seq < self.layout_seq {
            tracing::debug!(
                room_id = %self.room.id,
                drawn = self.drawn_seq,
                issued = self.layout_seq,
                "older page due; waiting for render to catch up"
            );
            self.extension_ready = true;
            return Ok(());
        }
        self.finish_extension().await
    }

    async fn finish_extension(&mut self) -> Result<()> {
        let seq = self.layout_seq + 1;
        let extended = self.extend_now(seq);
        if extended.is_err() {
            self.window.cancel_extension();
            self.anchor.clear();
        }
        let Some(ext) = extended? else {
            return Ok(());
        };
        self.layout_seq = seq;

        tracing::debug!(
            room_id = %self.room.id,
            added = ext.added,
            page_count = ext.page_count,
            "window extended"
        );

        self.emit(SessionEvent::WindowExtended {
            seq,
            older: self.window.head(ext.added).to_vec(),
            page_count: ext.page_count,
            total_pages: self.window.total_pages(),
            can_extend: self.window.can_extend(),
        })
        .await;
        Ok(())
    }

    /// Capture the scroll extent, then grow the window.  `seq` numbers the
    /// event that will draw the prepended page.
    fn extend_now(&mut self, seq: u64) -> Result<Option<Extension>> {
        let store = lock_store(&self.ctx.store)?;
        let log = store.log(self.room.id).unwrap_or_default();

        {
            let surface = self
                .surface
                .lock()
                .map_err(|_| ClientError::LockPoisoned("scroll surface"))?;
            self.anchor.capture(&*surface, seq);
        }

        let extension = self.window.complete_extension(log);
        if extension.is_none() {
            self.anchor.clear();
        }
        Ok(extension)
    }

    async fn handle_layout_complete(&mut self, seq: u64) -> Result<()> {
        self.drawn_seq = self.drawn_seq.max(seq.min(self.layout_seq));
        let adjustment = {
            let mut surface = self
                .surface
                .lock()
                .map_err(|_| ClientError::LockPoisoned("scroll surface"))?;
            self.anchor.after_layout(&mut *surface, self.drawn_seq)
        };

        if adjustment != ScrollAdjustment::Unchanged {
            self.emit(SessionEvent::ScrollAdjusted { adjustment }).await;
        }

        if self.extension_ready && self.drawn_seq >= self.layout_seq {
            self.extension_ready = false;
            self.finish_extension().await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            room: self.room.clone(),
            window: self.window.window().to_vec(),
            page_count: self.window.page_count(),
            total_pages: self.window.total_pages(),
            total_len: self.window.total_len(),
            can_extend: self.window.can_extend(),
            loading_older: self.window.is_loading_older(),
            composing: self.replies.is_composing(),
        }
    }

    fn next_layout_seq(&mut self) -> u64 {
        self.layout_seq += 1;
        self.layout_seq
    }

    async fn emit(&self, event: SessionEvent) {
        emit_event(&self.events, event).await;
    }

    fn teardown(&mut self) {
        let dropped_reply = self.reply_timer.take().is_some();
        let dropped_extension = self.extension_timer.take().is_some() || self.extension_ready;
        self.replies.cancel();
        self.window.cancel_extension();
        self.extension_ready = false;

        tracing::info!(
            room_id = %self.room.id,
            dropped_reply,
            dropped_extension,
            "room session closed"
        );
    }
}

/// Resolve when the timer elapses; never resolve when there is none.
async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

fn lock_store(store: &SharedStore) -> Result<MutexGuard<'_, MessageStore>> {
    store
        .lock()
        .map_err(|_| ClientError::LockPoisoned("message store"))
}

/// Caller side of a running [`RoomSession`].
pub struct SessionHandle {
    room: Room,
    cmd_tx: mpsc::Sender<SessionCommand>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn send(&self, message: Message) -> Result<()> {
        self.command(SessionCommand::Send(message)).await
    }

    pub async fn viewport(&self, signal: ViewportSignal) -> Result<()> {
        self.command(SessionCommand::Viewport(signal)).await
    }

    /// Shorthand for an intersecting top sentinel.
    pub async fn approaching_top(&self) -> Result<()> {
        self.viewport(ViewportSignal::TopSentinel { intersecting: true })
            .await
    }

    /// Report that every event up to `seq` has been drawn.
    pub async fn layout_complete(&self, seq: u64) -> Result<()> {
        self.command(SessionCommand::LayoutComplete { seq }).await
    }

    pub async fn snapshot(&self) -> Result<WindowSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.command(SessionCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| ClientError::SessionClosed(self.room.id))
    }

    /// Stop the session and wait for its task to finish.
    pub async fn close(self) {
        let _ = self.cmd_tx.send(SessionCommand::Close).await;
        if let Err(e) = self.task.await {
            tracing::warn!(room_id = %self.room.id, error = %e, "session task ended abnormally");
        }
    }

    async fn command(&self, cmd: SessionCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| ClientError::SessionClosed(self.room.id))
    }
}
