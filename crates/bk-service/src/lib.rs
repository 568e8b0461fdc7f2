//! BK Service: validation, permit lifecycle, note visibility and
//! scoring for the student case-management core, plus the services that
//! orchestrate them over the `bk-core` repository traits.

pub mod config;
pub mod lifecycle;
pub mod scoring;
pub mod service;
pub mod validation;
pub mod visibility;

pub use config::CaseConfig;
pub use scoring::{AttentionEntry, AttentionPolicy, PointSummary, ViolationCountPolicy};
pub use service::{
    AchievementService, CategoryService, CounselingService, Dashboard, InsightService,
    PermitService, StudentProfile, ViolationService,
};
pub use visibility::CounselingNoteView;
