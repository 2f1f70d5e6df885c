//! Idle-timeout policy. Pure; the async driver lives in `usecase::idle`.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use tillwise_domain::role::Role;

use crate::domain::types::{DEFAULT_IDLE_TIMEOUT_MINUTES, IDLE_WARNING_LEAD_SECS};

/// Input-event classes that count as activity. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 5] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyPress,
        Self::Scroll,
        Self::TouchStart,
    ];

    /// Map a client event name (`"mousedown"`, `"keydown"`, ...) onto a class.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "mousedown" | "pointerdown" | "click" => Some(Self::PointerDown),
            "mousemove" | "pointermove" => Some(Self::PointerMove),
            "keydown" | "keypress" => Some(Self::KeyPress),
            "scroll" | "wheel" => Some(Self::Scroll),
            "touchstart" => Some(Self::TouchStart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePhase {
    /// Still active; the warning is due in `warn_in`.
    Active { warn_in: Duration },
    /// Warning window; soft logout in `remaining`.
    Warning { remaining: Duration },
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlePolicy {
    pub timeout: Duration,
    pub warning_lead: Duration,
    /// Roles that never time out (e.g. kitchen staff on a shared terminal).
    pub exempt_roles: BTreeSet<Role>,
}

impl Default for IdlePolicy {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_IDLE_TIMEOUT_MINUTES)
    }
}

impl IdlePolicy {
    pub fn from_minutes(timeout_minutes: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_minutes * 60),
            warning_lead: Duration::from_secs(IDLE_WARNING_LEAD_SECS),
            exempt_roles: BTreeSet::new(),
        }
    }

    pub fn with_exempt_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.exempt_roles = roles.into_iter().collect();
        self
    }

    pub fn with_warning_lead(mut self, lead: Duration) -> Self {
        self.warning_lead = lead;
        self
    }

    pub fn is_exempt(&self, role: Role) -> bool {
        self.exempt_roles.contains(&role)
    }

    /// Idle time after which the warning fires.
    pub fn warning_after(&self) -> Duration {
        self.timeout.saturating_sub(self.warning_lead)
    }

    pub fn phase(&self, idle_for: Duration) -> IdlePhase {
        if idle_for >= self.timeout {
            IdlePhase::Expired
        } else if idle_for >= self.warning_after() {
            IdlePhase::Warning {
                remaining: self.timeout - idle_for,
            }
        } else {
            IdlePhase::Active {
                warn_in: self.warning_after() - idle_for,
            }
        }
    }
}

/// Idle state of one client: when it was last active and whether this
/// window's warning went out.
#[derive(Debug, Clone)]
pub struct IdleTracker {
    policy: IdlePolicy,
    last_activity: Instant,
    warned: bool,
}

impl IdleTracker {
    pub fn new(policy: IdlePolicy, now: Instant) -> Self {
        Self {
            policy,
            last_activity: now,
            warned: false,
        }
    }

    pub fn policy(&self) -> &IdlePolicy {
        &self.policy
    }

    /// Start a fresh window.
    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
        self.warned = false;
    }

    pub fn phase(&self, now: Instant) -> IdlePhase {
        self.policy
            .phase(now.saturating_duration_since(self.last_activity))
    }

    /// Remaining time if the warning is due and has not been taken this window.
    pub fn take_warning(&mut self, now: Instant) -> Option<Duration> {
        match self.phase(now) {
            IdlePhase::Warning { remaining } if !self.warned => {
                self.warned = true;
                Some(remaining)
            }
            _ => None,
        }
    }
}
