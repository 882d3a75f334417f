//! Recruiting pipeline model: ordered stages, candidate records with stage timelines, the
//! transition engine moving candidates between stages, and expiring board notifications.

pub mod candidates;
pub mod clock;
pub mod domain;
pub mod notifications;
pub mod router;
pub mod seed;
pub mod service;
pub mod stages;
pub mod transition;
pub mod views;

#[cfg(test)]
mod tests;

pub use candidates::CandidateStore;
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    Candidate, CandidateFilter, CandidateId, CandidateUpdate, Comment, NewCandidate, Page,
    Paginated, PipelineError, Stage, StageId, StageType, TimelineEntry, TimelineStatus,
};
pub use notifications::{
    Listener, Notification, NotificationHub, PipelineEvent, Subscription,
    DEFAULT_NOTIFICATION_TTL_MS, MAX_NOTIFICATION_TTL_MS,
};
pub use router::{pipeline_router, shared, SharedPipeline};
pub use service::{PipelineOptions, PipelineService, StageRemoval};
pub use stages::StageRegistry;
pub use transition::{Transition, TransitionEngine, TransitionOutcome};
pub use views::{CandidateCard, PipelineBoard, PipelineSummary, StageColumn};
