//! Data models for the Pod Sync service

pub mod connection;
pub mod entities;
pub mod sync;

pub use connection::{ConnectRequest, PodConnection, PodProvider, PodStatus, SyncStatus};
pub use entities::{ReflectionRow, SkillProfileSnapshot, UserIdentity};
pub use sync::{
    EngagementSnapshot, JourneyProgress, JourneyProgressMap, PodData, PurgeResult, SyncRequest,
    SyncResult,
};
