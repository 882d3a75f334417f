use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::domain::{CandidateId, StageId};

/// How long a toast stays visible.
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 3_000;
/// Longest toast lifetime accepted from configuration: one day.
pub const MAX_NOTIFICATION_TTL_MS: u64 = 86_400_000;

/// Board activity surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineEvent {
    CandidateMoved {
        candidate_id: CandidateId,
        candidate_name: String,
        stage_id: StageId,
        stage_name: String,
    },
    CandidateAdded {
        candidate_id: CandidateId,
        candidate_name: String,
        stage_name: String,
    },
    CandidateAssigned {
        candidate_id: CandidateId,
        candidate_name: String,
        recruiter: String,
    },
    CommentAdded {
        candidate_id: CandidateId,
        candidate_name: String,
        author: String,
    },
}

impl PipelineEvent {
    pub fn message(&self) -> String {
        match self {
            Self::CandidateMoved {
                candidate_name,
                stage_name,
                ..
            } => format!("{candidate_name} moved to {stage_name}"),
            Self::CandidateAdded {
                candidate_name,
                stage_name,
                ..
            } => format!("{candidate_name} added to {stage_name}"),
            Self::CandidateAssigned {
                candidate_name,
                recruiter,
                ..
            } => format!("{candidate_name} assigned to {recruiter}"),
            Self::CommentAdded { candidate_name, .. } => {
                format!("New comment on {candidate_name}")
            }
        }
    }

    pub fn candidate_id(&self) -> CandidateId {
        match self {
            Self::CandidateMoved { candidate_id, .. }
            | Self::CandidateAdded { candidate_id, .. }
            | Self::CandidateAssigned { candidate_id, .. }
            | Self::CommentAdded { candidate_id, .. } => *candidate_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub event: PipelineEvent,
    pub message: String,
    pub emitted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Handle returned by [`NotificationHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

pub type Listener = Box<dyn Fn(&Notification) + Send + Sync>;

/// Fire-and-forget queue of expiring notifications plus synchronous listeners.
///
/// Delivery is best effort and in arrival order; nothing is persisted.
pub struct NotificationHub {
    ttl: Duration,
    queue: VecDeque<Notification>,
    listeners: Vec<(Subscription, Listener)>,
    last_notification: u64,
    last_subscription: u64,
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("ttl", &self.ttl)
            .field("queued", &self.queue.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_NOTIFICATION_TTL_MS as i64))
    }
}

impl NotificationHub {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            queue: VecDeque::new(),
            listeners: Vec::new(),
            last_notification: 0,
            last_subscription: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Queue a notification and hand it to every listener. Expired entries are left for
    /// [`Self::prune`].
    pub fn emit(&mut self, event: PipelineEvent, now: DateTime<Utc>) -> Notification {
        self.last_notification += 1;
        let notification = Notification {
            id: self.last_notification,
            message: event.message(),
            event,
            emitted_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        for (_, listener) in &self.listeners {
            listener(&notification);
        }

        self.queue.push_back(notification.clone());
        notification
    }

    pub fn subscribe(&mut self, listener: Listener) -> Subscription {
        self.last_subscription += 1;
        let subscription = Subscription(self.last_subscription);
        self.listeners.push((subscription, listener));
        subscription
    }

    /// Returns `false` when the subscription was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.queue.iter().filter(|n| n.is_live(now)).collect()
    }

    /// Most recent live notification; the single toast slot of the board.
    pub fn latest(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.queue.iter().rev().find(|n| n.is_live(now))
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.id != id);
        self.queue.len() != before
    }

    /// Drop expired notifications, returning how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.queue.len();
        self.queue.retain(|n| n.is_live(now));
        before - self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
