//! Idle watcher: one tokio task per open client.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::domain::idle::{ActivityKind, IdlePhase, IdlePolicy, IdleTracker};
use crate::domain::repository::SessionRepository;
use crate::domain::types::{ACTIVITY_TOUCH_INTERVAL_SECS, StaffSession};
use crate::error::EngineError;
use crate::usecase::session::SessionRegistry;

/// What the client should show or do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleSignal {
    Warning { remaining: Duration },
    RedirectToLogin,
}

/// Credentials held on the client device (cached PIN session, tokens).
pub trait CredentialCache: Send + Sync {
    fn clear(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    Idle,
    Manual,
    /// The session was taken over or ended from elsewhere.
    Displaced,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Manual => "manual",
            Self::Displaced => "displaced",
        })
    }
}

// ── SessionHandle ─────────────────────────────────────────────────────────────

/// A client's view of its session. Shared by the idle watcher and the
/// manual-logout path; whichever logs out first wins.
pub struct SessionHandle<S: SessionRepository> {
    registry: Arc<SessionRegistry<S>>,
    session: StaffSession,
    logged_out: AtomicBool,
    cache: Arc<dyn CredentialCache>,
    signals: mpsc::UnboundedSender<IdleSignal>,
}

impl<S: SessionRepository> SessionHandle<S> {
    pub fn new(
        registry: Arc<SessionRegistry<S>>,
        session: StaffSession,
        cache: Arc<dyn CredentialCache>,
        signals: mpsc::UnboundedSender<IdleSignal>,
    ) -> Self {
        Self {
            registry,
            session,
            logged_out: AtomicBool::new(false),
            cache,
            signals,
        }
    }

    pub fn session(&self) -> &StaffSession {
        &self.session
    }

    pub fn is_logged_out(&self) -> bool {
        self.logged_out.load(Ordering::Acquire)
    }

    /// Release the session, clear cached credentials and redirect to login.
    ///
    /// Returns `false` if an earlier call already did so. The cache is cleared
    /// and the redirect sent even when the release itself fails.
    pub async fn soft_logout(&self, reason: LogoutReason) -> Result<bool, EngineError> {
        if self.logged_out.swap(true, Ordering::AcqRel) {
            debug!(staff_id = %self.session.staff_id, %reason, "soft logout already done");
            return Ok(false);
        }

        let released = self
            .registry
            .release_device(
                self.session.shop_id,
                self.session.staff_id,
                self.session.device_id,
            )
            .await;
        self.cache.clear();
        // The client may already be gone.
        let _ = self.signals.send(IdleSignal::RedirectToLogin);

        info!(
            shop_id = %self.session.shop_id,
            staff_id = %self.session.staff_id,
            device_id = %self.session.device_id,
            %reason,
            "soft logout"
        );
        released.map(|_| true)
    }

    fn signal(&self, signal: IdleSignal) {
        let _ = self.signals.send(signal);
    }
}

// ── IdleWatcher ───────────────────────────────────────────────────────────────

/// Drives the idle policy for one client. Aborted on drop.
pub struct IdleWatcher {
    activity: mpsc::UnboundedSender<ActivityKind>,
    task: JoinHandle<()>,
}

impl IdleWatcher {
    pub fn spawn<S>(handle: Arc<SessionHandle<S>>, policy: IdlePolicy) -> Self
    where
        S: SessionRepository + 'static,
    {
        let (activity, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(watch(handle, policy, events));
        Self { activity, task }
    }

    /// Report client activity. Restarts both the warning and the logout timer.
    pub fn record(&self, kind: ActivityKind) {
        let _ = self.activity.send(kind);
    }

    /// Report a raw client event by name. Returns `false` for events that do
    /// not count as activity.
    pub fn record_event(&self, name: &str) -> bool {
        match ActivityKind::from_event_name(name) {
            Some(kind) => {
                self.record(kind);
                true
            }
            None => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stop(self) {}
}

impl Drop for IdleWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch<S: SessionRepository>(
    handle: Arc<SessionHandle<S>>,
    policy: IdlePolicy,
    mut events: mpsc::UnboundedReceiver<ActivityKind>,
) {
    let touch_interval = Duration::from_secs(ACTIVITY_TOUCH_INTERVAL_SECS);
    let mut tracker = IdleTracker::new(policy, Instant::now().into_std());
    let exempt = tracker.policy().is_exempt(handle.session().role);
    let mut last_touch: Option<Instant> = None;

    loop {
        if handle.is_logged_out() {
            break;
        }

        let now = Instant::now();
        let deadline = if exempt {
            None
        } else {
            if let Some(remaining) = tracker.take_warning(now.into_std()) {
                debug!(staff_id = %handle.session().staff_id, ?remaining, "idle warning");
                handle.signal(IdleSignal::Warning { remaining });
            }
            match tracker.phase(now.into_std()) {
                IdlePhase::Active { warn_in } => Some(now + warn_in),
                IdlePhase::Warning { remaining } => Some(now + remaining),
                IdlePhase::Expired => {
                    debug!(staff_id = %handle.session().staff_id, "idle timeout");
                    if let Err(e) = handle.soft_logout(LogoutReason::Idle).await {
                        warn!(error = %e, kind = e.kind(), "idle release failed");
                    }
                    break;
                }
            }
        };

        // Each pass arms a fresh sleep; the previous one is dropped with the
        // last select.
        tokio::select! {
            event = events.recv() => {
                let Some(kind) = event else { break };
                let at = Instant::now();
                tracker.record_activity(at.into_std());

                if last_touch.is_none_or(|t| at - t >= touch_interval) {
                    last_touch = Some(at);
                    let session = handle.session();
                    match handle
                        .registry
                        .record_activity(session.shop_id, session.staff_id, session.device_id)
                        .await
                    {
                        Ok(true) => debug!(staff_id = %session.staff_id, ?kind, "activity recorded"),
                        Ok(false) => {
                            if let Err(e) = handle.soft_logout(LogoutReason::Displaced).await {
                                warn!(error = %e, kind = e.kind(), "displaced release failed");
                            }
                            break;
                        }
                        Err(e) => warn!(error = %e, kind = e.kind(), "activity touch failed"),
                    }
                }
            }
            _ = sleep_until(deadline.unwrap_or(now)), if deadline.is_some() => {}
        }
    }
}
