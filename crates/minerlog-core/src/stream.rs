// ── Log stream connection manager ──
//
// Owns the connection, the reconnect timer, the line buffer and the
// operator's intent. All state changes happen through `&mut self`: transport
// events, timer expiry and operator commands are applied one at a time by
// whichever task drives the stream.

use std::future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};
use url::Url;

use minerlog_api::{Connection, Transport, TransportEvent, event_channel};

use crate::buffer::LineBuffer;
use crate::config::StreamConfig;
use crate::export::{LogExport, export_snapshot};
use crate::filter::{LineFilter, visible};
use crate::reconnect::{ReconnectPolicy, RetryDecision};
use crate::sanitize::{LogLine, sanitize};
use crate::status::ConnectionStatus;

const STOPPED_REASON: &str = "stopped";
const STREAM_ENDED_REASON: &str = "Connection closed";

// ── StreamEvent ──────────────────────────────────────────────────

/// Observable outcome of applying one transport event or timer expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    StatusChanged(ConnectionStatus),
    LineAppended(LogLine),
    RetryScheduled { attempt: u32, delay: Duration },
    RetriesExhausted { attempts: u32 },
}

// ── Owned per-epoch resources ────────────────────────────────────

/// The live connection of one epoch. Dropping it drops the event
/// receiver, so nothing the old connection sends can arrive afterwards.
struct ActiveConnection<C> {
    epoch: u64,
    connection: C,
    events: mpsc::Receiver<TransportEvent>,
}

#[derive(Debug, Clone, Copy)]
struct PendingRetry {
    epoch: u64,
    attempt: u32,
    deadline: Instant,
}

enum Wake {
    Transport {
        epoch: u64,
        event: Option<TransportEvent>,
    },
    RetryDue,
}

// ── LogStream ────────────────────────────────────────────────────

/// Real-time log stream client for one viewer.
///
/// Holds at most one live connection and at most one pending retry. The
/// line buffer survives reconnects; only [`restart`](Self::restart) clears
/// it.
pub struct LogStream<T: Transport> {
    transport: T,
    endpoint: Url,
    buffer: LineBuffer,
    policy: ReconnectPolicy,
    desired: bool,
    paused: bool,
    discarded: u64,
    epoch: u64,
    active: Option<ActiveConnection<T::Connection>>,
    retry: Option<PendingRetry>,
    status: watch::Sender<ConnectionStatus>,
    revision: watch::Sender<u64>,
}

impl<T: Transport> LogStream<T> {
    /// Create an idle stream. Nothing connects until [`start`](Self::start).
    pub fn new(transport: T, config: StreamConfig) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Idle);
        let (revision, _) = watch::channel(0);

        Self {
            transport,
            endpoint: config.endpoint,
            buffer: LineBuffer::new(config.buffer_capacity),
            policy: ReconnectPolicy::new(config.reconnect),
            desired: false,
            paused: false,
            discarded: 0,
            epoch: 0,
            active: None,
            retry: None,
            status,
            revision,
        }
    }

    // ── Operator commands ────────────────────────────────────────

    /// Connect and keep reconnecting on failure.
    ///
    /// No-op while a connection is in flight or open.
    pub fn start(&mut self) {
        self.desired = true;
        if self.status.borrow().is_active() {
            debug!(epoch = self.epoch, "start ignored, connection already active");
            return;
        }

        self.policy.reset();
        self.retry = None;
        self.open_connection(&mut Vec::new());
    }

    /// Disconnect and cancel any pending retry. The buffer is kept.
    pub fn stop(&mut self) {
        self.desired = false;
        self.retry = None;
        // Anything still tagged with the old epoch is now stale.
        self.epoch += 1;

        if let Some(mut active) = self.active.take() {
            active.connection.close();
            info!(epoch = active.epoch, "log stream stopped");
        }

        self.set_status(
            ConnectionStatus::Closed {
                reason: STOPPED_REASON.into(),
            },
            &mut Vec::new(),
        );
    }

    /// Start a fresh session: clear the buffer, then [`start`](Self::start).
    ///
    /// No-op while a connection is in flight or open.
    pub fn restart(&mut self) {
        if self.status.borrow().is_active() {
            self.desired = true;
            debug!("restart ignored, connection already active");
            return;
        }
        self.clear_buffer();
        self.start();
    }

    /// Drop incoming frames until [`resume`](Self::resume). The connection
    /// stays up; dropped frames are not replayed.
    pub fn pause(&mut self) {
        if !self.paused {
            debug!("log stream paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            debug!(discarded = self.discarded, "log stream resumed");
        }
        self.paused = false;
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Receive every status transition.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Receive a revision number that changes whenever the buffer does.
    pub fn subscribe_lines(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Buffered lines matching `filter`.
    pub fn visible<'a>(
        &'a self,
        filter: &'a LineFilter,
    ) -> impl Iterator<Item = &'a LogLine> + Clone + 'a {
        visible(&self.buffer, filter)
    }

    /// Export the full buffer, ignoring any filter.
    pub fn export(&self) -> LogExport {
        export_snapshot(&self.buffer)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the operator wants the stream connected.
    pub fn is_desired(&self) -> bool {
        self.desired
    }

    /// Reconnect attempts used in the current episode.
    pub fn attempts(&self) -> u32 {
        self.policy.attempts()
    }

    /// When the pending retry fires, if one is scheduled.
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry.map(|r| r.deadline)
    }

    /// Frames dropped because the stream was paused.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Current connection generation.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // ── Event delivery ───────────────────────────────────────────

    /// Wait for the next transport event or retry expiry and apply it.
    ///
    /// Waits forever when there is neither a connection nor a pending
    /// retry; drive it inside `tokio::select!` next to operator input.
    pub async fn next_events(&mut self) -> Vec<StreamEvent> {
        let retry_deadline = self.retry_deadline();

        let wake = tokio::select! {
            (epoch, event) = recv_active(&mut self.active) => Wake::Transport { epoch, event },
            () = sleep_until_opt(retry_deadline) => Wake::RetryDue,
        };

        let mut out = Vec::new();
        match wake {
            Wake::Transport { epoch, event } => self.apply_transport(epoch, event, &mut out),
            Wake::RetryDue => self.fire_retry(&mut out),
        }
        out
    }

    /// Apply everything that is already ready (queued transport events and
    /// elapsed retries) without waiting.
    pub fn pump(&mut self) -> Vec<StreamEvent> {
        let mut out = Vec::new();

        loop {
            if self.retry.is_some_and(|r| r.deadline <= Instant::now()) {
                self.fire_retry(&mut out);
                continue;
            }

            let Some(active) = self.active.as_mut() else {
                break;
            };
            let epoch = active.epoch;
            match active.events.try_recv() {
                Ok(event) => self.apply_transport(epoch, Some(event), &mut out),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.apply_transport(epoch, None, &mut out);
                }
            }
        }

        out
    }

    // ── Reactions ────────────────────────────────────────────────

    fn apply_transport(
        &mut self,
        epoch: u64,
        event: Option<TransportEvent>,
        out: &mut Vec<StreamEvent>,
    ) {
        if epoch != self.epoch {
            trace!(epoch, current = self.epoch, "ignoring stale transport event");
            return;
        }

        match event {
            Some(TransportEvent::Opened) => {
                self.policy.on_open();
                info!(epoch, endpoint = %self.endpoint, "log stream open");
                self.set_status(ConnectionStatus::Open, out);
            }
            Some(TransportEvent::Frame(frame)) => {
                if self.paused {
                    self.discarded += 1;
                    trace!(epoch, "frame discarded while paused");
                    return;
                }
                match sanitize(&frame) {
                    Some(line) => {
                        self.buffer.append(line.clone());
                        self.revision.send_modify(|r| *r += 1);
                        out.push(StreamEvent::LineAppended(line));
                    }
                    None => trace!(epoch, "frame empty after sanitizing"),
                }
            }
            Some(TransportEvent::Closed { code, reason }) => {
                self.active = None;
                info!(epoch, ?code, %reason, "log stream closed");
                self.set_status(ConnectionStatus::Closed { reason }, out);
                self.schedule_retry(out);
            }
            Some(TransportEvent::Failed { reason }) => {
                self.active = None;
                warn!(epoch, %reason, "log stream failed");
                self.set_status(ConnectionStatus::Error { reason }, out);
                self.schedule_retry(out);
            }
            None => {
                self.active = None;
                info!(epoch, "log stream ended without close");
                self.set_status(
                    ConnectionStatus::Closed {
                        reason: STREAM_ENDED_REASON.into(),
                    },
                    out,
                );
                self.schedule_retry(out);
            }
        }
    }

    fn schedule_retry(&mut self, out: &mut Vec<StreamEvent>) {
        if !self.desired {
            return;
        }

        match self.policy.on_disconnect() {
            RetryDecision::Retry { attempt, delay } => {
                info!(
                    attempt,
                    max_attempts = self.policy.config().max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "scheduling reconnect"
                );
                self.retry = Some(PendingRetry {
                    epoch: self.epoch,
                    attempt,
                    deadline: Instant::now() + delay,
                });
                out.push(StreamEvent::RetryScheduled { attempt, delay });
            }
            RetryDecision::GiveUp { attempts } => {
                warn!(attempts, "reconnection limit reached, giving up");
                out.push(StreamEvent::RetriesExhausted { attempts });
            }
        }
    }

    fn fire_retry(&mut self, out: &mut Vec<StreamEvent>) {
        let Some(retry) = self.retry.take() else {
            return;
        };

        if retry.epoch != self.epoch || !self.desired || self.active.is_some() {
            trace!(attempt = retry.attempt, "ignoring stale reconnect timer");
            return;
        }

        info!(attempt = retry.attempt, "reconnecting log stream");
        self.open_connection(out);
    }

    fn open_connection(&mut self, out: &mut Vec<StreamEvent>) {
        self.epoch += 1;
        let (sink, events) = event_channel();
        let connection = self.transport.open(&self.endpoint, sink);
        debug!(epoch = self.epoch, endpoint = %self.endpoint, "opening log stream");

        self.active = Some(ActiveConnection {
            epoch: self.epoch,
            connection,
            events,
        });
        self.set_status(ConnectionStatus::Connecting, out);
    }

    fn set_status(&mut self, status: ConnectionStatus, out: &mut Vec<StreamEvent>) {
        self.status.send_replace(status.clone());
        out.push(StreamEvent::StatusChanged(status));
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.revision.send_modify(|r| *r += 1);
    }
}

impl<T: Transport> Drop for LogStream<T> {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.connection.close();
        }
    }
}

// ── Wait helpers ─────────────────────────────────────────────────

async fn recv_active<C>(
    active: &mut Option<ActiveConnection<C>>,
) -> (u64, Option<TransportEvent>) {
    match active {
        Some(active) => (active.epoch, active.events.recv().await),
        None => future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}
