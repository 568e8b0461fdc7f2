//! Integration tests for the student profile, the dashboard and the
//! attention list.

mod common;

use bk_core::models::achievement::CreateAchievement;
use bk_core::models::caller::StaffRole;
use bk_core::models::counseling::CreateCounselingNote;
use bk_core::models::permit::CreatePermit;
use bk_core::models::violation::CreateViolation;
use bk_core::repository::StudentTally;
use bk_core::ErrorKind;
use bk_service::scoring::{ATTENTION_REASON, AttentionCandidate};
use bk_service::{AttentionPolicy, CounselingNoteView};
use chrono::Utc;
use common::Fixture;
use uuid::Uuid;

async fn record_violations(fx: &Fixture, student_id: Uuid, levels: &[&str]) {
    let service = fx.violations();
    let caller = fx.counselor();
    for level in levels {
        service
            .create(
                &caller,
                CreateViolation {
                    student_id,
                    category: "Misconduct".into(),
                    level: (*level).into(),
                    description: "Noted by duty teacher".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
}

async fn record_achievements(fx: &Fixture, student_id: Uuid, points: &[i64]) {
    let service = fx.achievements();
    let caller = fx.counselor();
    for point in points {
        service
            .create(
                &caller,
                CreateAchievement {
                    student_id,
                    title: format!("Award worth {point}"),
                    point: *point,
                    description: None,
                },
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn net_score_scenario() {
    let fx = Fixture::new().await;
    record_achievements(&fx, fx.student, &[100, 25]).await;
    record_violations(&fx, fx.student, &["moderate", "severe"]).await;

    let profile = fx
        .insight()
        .student_profile(&fx.counselor(), fx.student)
        .await
        .unwrap();

    assert_eq!(profile.points.achievement_total, 125);
    assert_eq!(profile.points.violation_total, -45);
    assert_eq!(profile.points.net(), 80);
    assert_eq!(profile.violation_count, 2);
    assert_eq!(profile.achievement_count, 2);
    assert_eq!(profile.student.name, "Andi");
    assert_eq!(profile.student.class_name.as_deref(), Some("X-1"));
}

#[tokio::test]
async fn profile_keeps_five_newest_and_projects_notes() {
    let fx = Fixture::new().await;
    record_violations(&fx, fx.student, &["light"; 7]).await;

    let counselor = fx.counselor();
    fx.counseling()
        .create(
            &counselor,
            CreateCounselingNote {
                student_id: fx.student,
                internal_note: "Confidential detail".into(),
                parent_summary: None,
            },
        )
        .await
        .unwrap();
    fx.permits()
        .create(
            &counselor,
            CreatePermit {
                student_id: fx.student,
                reason: "Clinic".into(),
                exit_time: Some(Utc::now()),
                responsible_teacher_id: fx.teacher,
            },
        )
        .await
        .unwrap();

    let insight = fx.insight();
    let as_counselor = insight.student_profile(&counselor, fx.student).await.unwrap();
    assert_eq!(as_counselor.violation_count, 7);
    assert_eq!(as_counselor.recent_violations.len(), 5);
    assert!(
        as_counselor
            .recent_violations
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at)
    );
    assert_eq!(as_counselor.permit_count, 1);
    assert_eq!(as_counselor.counseling_count, 1);
    assert!(matches!(
        as_counselor.recent_counseling_notes[0],
        CounselingNoteView::Full(_)
    ));

    let as_parent = insight
        .student_profile(&fx.caller(StaffRole::Parent), fx.student)
        .await
        .unwrap();
    assert!(matches!(
        as_parent.recent_counseling_notes[0],
        CounselingNoteView::Restricted(_)
    ));
    let json = serde_json::to_string(&as_parent).unwrap();
    assert!(!json.contains("Confidential detail"));
    assert!(!json.contains("internal_note"));
}

#[tokio::test]
async fn profile_rejects_foreign_student() {
    let fx = Fixture::new().await;
    let err = fx
        .insight()
        .student_profile(&fx.counselor(), fx.foreign_student)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Tenancy);
}

#[tokio::test]
async fn attention_list_ranks_by_violation_count() {
    let fx = Fixture::new().await;
    let five = fx.student;
    let three = fx.classmate_free;
    let two = fx.add_student("Dimas").await;
    let _zero = fx.add_student("Eka").await;

    record_violations(&fx, five, &["light"; 5]).await;
    record_violations(&fx, three, &["light"; 3]).await;
    record_violations(&fx, two, &["light"; 2]).await;

    let insight = fx.insight();
    let list = insight.attention_list(&fx.counselor(), 10).await.unwrap();
    let ranked: Vec<(Uuid, u64)> = list.iter().map(|e| (e.student_id, e.violation_count)).collect();
    assert_eq!(ranked, vec![(five, 5), (three, 3)]);
    assert!(list.iter().all(|e| e.reason == ATTENTION_REASON));
    assert_eq!(list[0].student_name.as_deref(), Some("Andi"));
    assert_eq!(list[0].class_name.as_deref(), Some("X-1"));

    let top = insight.attention_list(&fx.counselor(), 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].student_id, five);
}

struct EveryoneWithAViolation;

impl AttentionPolicy for EveryoneWithAViolation {
    fn rank(&self, tallies: Vec<StudentTally>, limit: usize) -> Vec<AttentionCandidate> {
        tallies
            .into_iter()
            .take(limit)
            .map(|t| AttentionCandidate {
                student_id: t.student_id,
                violation_count: t.violation_count,
                reason: "any violation".into(),
            })
            .collect()
    }
}

#[tokio::test]
async fn attention_policy_is_replaceable() {
    let fx = Fixture::new().await;
    record_violations(&fx, fx.student, &["light"]).await;

    let list = fx
        .insight()
        .with_policy(EveryoneWithAViolation)
        .attention_list(&fx.counselor(), 10)
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].reason, "any violation");
}

#[tokio::test]
async fn dashboard_counts_and_recent_items() {
    let fx = Fixture::new().await;
    let counselor = fx.counselor();
    record_violations(&fx, fx.student, &["light"; 6]).await;
    record_achievements(&fx, fx.classmate_free, &[10, 20]).await;

    let permits = fx.permits();
    for _ in 0..2 {
        permits
            .create(
                &counselor,
                CreatePermit {
                    student_id: fx.student,
                    reason: "Dentist".into(),
                    exit_time: Some(Utc::now()),
                    responsible_teacher_id: fx.teacher,
                },
            )
            .await
            .unwrap();
    }
    let closed = permits
        .list_for_student(&counselor, fx.student)
        .await
        .unwrap()
        .remove(0);
    permits
        .record_return(
            &counselor,
            closed.id,
            bk_core::models::permit::RecordReturn {
                return_time: Some(Utc::now()),
            },
        )
        .await
        .unwrap();

    let dashboard = fx.insight().dashboard(&counselor).await.unwrap();
    assert_eq!(dashboard.total_violations, 6);
    assert_eq!(dashboard.total_achievements, 2);
    assert_eq!(dashboard.total_permits, 2);
    assert_eq!(dashboard.open_permits, 1);
    assert_eq!(dashboard.total_counseling_notes, 0);
    assert_eq!(dashboard.recent_violations.len(), 5);
    assert_eq!(dashboard.recent_achievements.len(), 2);
    assert_eq!(dashboard.attention_list.len(), 1);
    assert_eq!(dashboard.attention_list[0].violation_count, 6);

    let other = bk_core::models::caller::Caller::new(
        fx.other_school,
        Uuid::new_v4(),
        StaffRole::SchoolAdmin,
    );
    let empty = fx.insight().dashboard(&other).await.unwrap();
    assert_eq!(empty.total_violations, 0);
    assert!(empty.attention_list.is_empty());
}
