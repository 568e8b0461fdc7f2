//! Student profiles and the school dashboard.
//!
//! Both views are assembled from several independent reads. Apart from
//! resolving the student itself, every read is best effort: a failure is
//! logged and replaced with an empty or zero value.

use bk_core::error::BkResult;
use bk_core::models::achievement::Achievement;
use bk_core::models::caller::Caller;
use bk_core::models::permit::Permit;
use bk_core::models::violation::Violation;
use bk_core::repository::{
    AchievementRepository, CounselingNoteRepository, PermitRepository, RecordQuery,
    StudentDirectory, ViolationQuery, ViolationRepository,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::CaseConfig;
use crate::scoring::{AttentionEntry, AttentionPolicy, PointSummary, ViolationCountPolicy};
use crate::validation::resolve_student;
use crate::visibility::{CounselingNoteView, project_all};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub nis: String,
    pub nisn: String,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student: StudentSummary,
    pub violation_count: u64,
    pub achievement_count: u64,
    pub permit_count: u64,
    pub counseling_count: u64,
    pub points: PointSummary,
    pub recent_violations: Vec<Violation>,
    pub recent_achievements: Vec<Achievement>,
    pub recent_permits: Vec<Permit>,
    pub recent_counseling_notes: Vec<CounselingNoteView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_violations: u64,
    pub total_achievements: u64,
    pub total_permits: u64,
    pub open_permits: u64,
    pub total_counseling_notes: u64,
    pub recent_violations: Vec<Violation>,
    pub recent_achievements: Vec<Achievement>,
    pub attention_list: Vec<AttentionEntry>,
}

fn best_effort<T: Default>(what: &'static str, result: BkResult<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(read = what, error = %e, "Aggregate read failed; using empty result");
        T::default()
    })
}

fn newest<T>(mut items: Vec<T>, n: u64) -> Vec<T> {
    items.truncate(usize::try_from(n).unwrap_or(usize::MAX));
    items
}

pub struct InsightService<V, A, P, N, St>
where
    V: ViolationRepository,
    A: AchievementRepository,
    P: PermitRepository,
    N: CounselingNoteRepository,
    St: StudentDirectory,
{
    violations: V,
    achievements: A,
    permits: P,
    notes: N,
    students: St,
    policy: Box<dyn AttentionPolicy>,
    config: CaseConfig,
}

impl<V, A, P, N, St> InsightService<V, A, P, N, St>
where
    V: ViolationRepository,
    A: AchievementRepository,
    P: PermitRepository,
    N: CounselingNoteRepository,
    St: StudentDirectory,
{
    pub fn new(
        violations: V,
        achievements: A,
        permits: P,
        notes: N,
        students: St,
        config: CaseConfig,
    ) -> Self {
        Self {
            violations,
            achievements,
            permits,
            notes,
            students,
            policy: Box::new(ViolationCountPolicy),
            config,
        }
    }

    /// Replace the attention ranking.
    pub fn with_policy(mut self, policy: impl AttentionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub async fn student_profile(&self, caller: &Caller, student_id: Uuid) -> BkResult<StudentProfile> {
        let student = resolve_student(&self.students, caller, student_id).await?;
        let school_id = caller.school_id;

        let violations = best_effort(
            "student violations",
            self.violations.list_by_student(school_id, student_id).await,
        );
        let achievements = best_effort(
            "student achievements",
            self.achievements.list_by_student(school_id, student_id).await,
        );
        let permits = best_effort(
            "student permits",
            self.permits.list_by_student(school_id, student_id).await,
        );
        let notes = best_effort(
            "student counseling notes",
            self.notes.list_by_student(school_id, student_id).await,
        );
        let points = PointSummary {
            achievement_total: best_effort(
                "achievement points",
                self.achievements
                    .sum_points_by_student(school_id, student_id)
                    .await,
            ),
            violation_total: best_effort(
                "violation points",
                self.violations
                    .sum_points_by_student(school_id, student_id)
                    .await,
            ),
        };

        let recent = self.config.recent_items;
        Ok(StudentProfile {
            student: StudentSummary {
                id: student.id,
                name: student.name,
                nis: student.nis,
                nisn: student.nisn,
                class_name: student.class_name,
            },
            violation_count: violations.len() as u64,
            achievement_count: achievements.len() as u64,
            permit_count: permits.len() as u64,
            counseling_count: notes.len() as u64,
            points,
            recent_violations: newest(violations, recent),
            recent_achievements: newest(achievements, recent),
            recent_permits: newest(permits, recent),
            recent_counseling_notes: project_all(newest(notes, recent), caller.role),
        })
    }

    pub async fn dashboard(&self, caller: &Caller) -> BkResult<Dashboard> {
        let school_id = caller.school_id;
        let recent = self.config.recent();

        let recent_violations = best_effort(
            "recent violations",
            self.violations
                .list(school_id, ViolationQuery::default(), recent)
                .await
                .map(|r| r.items),
        );
        let recent_achievements = best_effort(
            "recent achievements",
            self.achievements
                .list(school_id, RecordQuery::default(), recent)
                .await
                .map(|r| r.items),
        );

        Ok(Dashboard {
            total_violations: best_effort("violation count", self.violations.count(school_id).await),
            total_achievements: best_effort(
                "achievement count",
                self.achievements.count(school_id).await,
            ),
            total_permits: best_effort("permit count", self.permits.count(school_id).await),
            open_permits: best_effort("open permit count", self.permits.count_open(school_id).await),
            total_counseling_notes: best_effort(
                "counseling note count",
                self.notes.count(school_id).await,
            ),
            recent_violations,
            recent_achievements,
            attention_list: best_effort(
                "attention list",
                self.attention_list(caller, self.config.attention_limit).await,
            ),
        })
    }

    /// Students needing follow-up, as ranked by the configured policy.
    pub async fn attention_list(&self, caller: &Caller, limit: usize) -> BkResult<Vec<AttentionEntry>> {
        let tallies = self.violations.tally_by_student(caller.school_id).await?;
        let ranked = self.policy.rank(tallies, limit);

        let mut entries = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let student = match self.students.find_student_by_id(candidate.student_id).await {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!(student_id = %candidate.student_id, error = %e, "Attention entry left unlabelled");
                    None
                }
            };
            entries.push(AttentionEntry {
                student_id: candidate.student_id,
                student_name: student.as_ref().map(|s| s.name.clone()),
                class_name: student.and_then(|s| s.class_name),
                violation_count: candidate.violation_count,
                reason: candidate.reason,
            });
        }
        Ok(entries)
    }
}
