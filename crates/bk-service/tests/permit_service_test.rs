//! Integration tests for the exit permit lifecycle.

mod common;

use bk_core::models::caller::StaffRole;
use bk_core::models::permit::{CreatePermit, PermitFilter, PermitStatus, RecordReturn};
use bk_core::{BkError, ErrorKind};
use chrono::{Duration, Utc};
use common::Fixture;
use uuid::Uuid;

fn permit(fx: &Fixture, student_id: Uuid) -> CreatePermit {
    CreatePermit {
        student_id,
        reason: "Family emergency".into(),
        exit_time: Some(Utc::now() - Duration::hours(1)),
        responsible_teacher_id: fx.teacher,
    }
}

#[tokio::test]
async fn permit_returns_exactly_once() {
    let fx = Fixture::new().await;
    let caller = fx.caller(StaffRole::Teacher);
    let service = fx.permits();

    let created = service.create(&caller, permit(&fx, fx.student)).await.unwrap();
    assert_eq!(created.status(), PermitStatus::Open);

    let missing = service
        .record_return(&caller, created.id, RecordReturn { return_time: None })
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::MissingField);

    let returned = service
        .record_return(
            &caller,
            created.id,
            RecordReturn {
                return_time: Some(Utc::now()),
            },
        )
        .await
        .unwrap();
    assert_eq!(returned.status(), PermitStatus::Returned);

    // Whatever time is supplied, the second return conflicts.
    for at in [Utc::now(), Utc::now() + Duration::days(1), created.exit_time] {
        let err = service
            .record_return(
                &caller,
                created.id,
                RecordReturn {
                    return_time: Some(at),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    let err = service
        .record_return(
            &caller,
            Uuid::new_v4(),
            RecordReturn {
                return_time: Some(Utc::now()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn return_before_exit_is_accepted() {
    let fx = Fixture::new().await;
    let caller = fx.counselor();
    let service = fx.permits();

    let created = service.create(&caller, permit(&fx, fx.student)).await.unwrap();
    let returned = service
        .record_return(
            &caller,
            created.id,
            RecordReturn {
                return_time: Some(created.exit_time - Duration::minutes(30)),
            },
        )
        .await
        .unwrap();
    assert!(returned.has_returned());
}

#[tokio::test]
async fn create_checks_fields_then_tenancy() {
    let fx = Fixture::new().await;
    let caller = fx.counselor();
    let service = fx.permits();

    let no_exit = service
        .create(
            &caller,
            CreatePermit {
                exit_time: None,
                ..permit(&fx, fx.student)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(no_exit, BkError::MissingField { field: "exit_time" }));

    let no_reason = service
        .create(
            &caller,
            CreatePermit {
                reason: "\t".into(),
                ..permit(&fx, fx.foreign_student)
            },
        )
        .await
        .unwrap_err();
    assert_eq!(no_reason.kind(), ErrorKind::MissingField);

    let foreign_student = service
        .create(&caller, permit(&fx, fx.foreign_student))
        .await
        .unwrap_err();
    assert!(matches!(
        foreign_student,
        BkError::TenancyViolation { entity: "student" }
    ));

    for teacher in [fx.foreign_teacher, fx.platform_admin] {
        let err = service
            .create(
                &caller,
                CreatePermit {
                    responsible_teacher_id: teacher,
                    ..permit(&fx, fx.student)
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BkError::TenancyViolation { entity: "teacher" }));
    }

    let unknown_teacher = service
        .create(
            &caller,
            CreatePermit {
                responsible_teacher_id: Uuid::new_v4(),
                ..permit(&fx, fx.student)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(unknown_teacher, BkError::NotFound { ref entity, .. } if entity == "teacher"));
}

#[tokio::test]
async fn listing_filters_and_orders_by_exit_time() {
    let fx = Fixture::new().await;
    let caller = fx.counselor();
    let service = fx.permits();

    let early = service
        .create(
            &caller,
            CreatePermit {
                exit_time: Some(Utc::now() - Duration::hours(5)),
                ..permit(&fx, fx.student)
            },
        )
        .await
        .unwrap();
    let late = service
        .create(&caller, permit(&fx, fx.classmate_free))
        .await
        .unwrap();
    service
        .record_return(
            &caller,
            early.id,
            RecordReturn {
                return_time: Some(Utc::now()),
            },
        )
        .await
        .unwrap();

    let all = service.list(&caller, PermitFilter::default()).await.unwrap();
    let ids: Vec<Uuid> = all.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![late.id, early.id]);

    let open = service
        .list(
            &caller,
            PermitFilter {
                has_returned: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(open.total, 1);
    assert_eq!(open.items[0].id, late.id);

    let by_teacher = service
        .list(
            &caller,
            PermitFilter {
                responsible_teacher_id: Some(fx.foreign_teacher),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_teacher.total, 0);

    let for_student = service.list_for_student(&caller, fx.student).await.unwrap();
    assert_eq!(for_student.len(), 1);
}

#[tokio::test]
async fn receipt_and_attached_document() {
    let fx = Fixture::new().await;
    let caller = fx.counselor();
    let service = fx.permits();

    let created = service.create(&caller, permit(&fx, fx.student)).await.unwrap();
    let doc = service.document(&caller, created.id).await.unwrap();
    assert_eq!(doc.permit_id, created.id);
    assert_eq!(doc.student_name, "Andi");
    assert_eq!(doc.class_name, "X-1");
    assert_eq!(doc.school_name, "SMA Harapan");
    assert_eq!(doc.responsible_teacher, "Pak Budi");
    assert_eq!(doc.reason, "Family emergency");

    let attached = service
        .attach_document(&caller, created.id, "https://files.example/permit.pdf")
        .await
        .unwrap();
    assert_eq!(
        attached.document_url.as_deref(),
        Some("https://files.example/permit.pdf")
    );
    let err = service
        .attach_document(&caller, created.id, " ")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);

    service.delete(&caller, created.id).await.unwrap();
    assert_eq!(
        service.get(&caller, created.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
