//! Integration tests for violation category management.

mod common;

use bk_core::ErrorKind;
use bk_core::models::category::{CreateViolationCategory, UpdateViolationCategory};
use bk_core::models::violation::ViolationLevel;
use common::Fixture;

fn input(name: &str, point: i64) -> CreateViolationCategory {
    CreateViolationCategory {
        // Overwritten by the service.
        school_id: uuid::Uuid::nil(),
        name: name.into(),
        default_point: point,
        default_level: ViolationLevel::Moderate,
        description: "Custom".into(),
    }
}

#[tokio::test]
async fn seeding_twice_yields_default_count() {
    let fx = Fixture::new().await;
    let service = fx.categories();
    let caller = fx.counselor();

    let first = service.initialize_defaults(&caller).await.unwrap();
    assert_eq!(first.len(), 11);
    let second = service.initialize_defaults(&caller).await.unwrap();
    assert!(second.is_empty());

    let all = service.list(&caller, false).await.unwrap();
    assert_eq!(all.len(), 11);
    assert!(all.iter().all(|c| c.school_id == fx.school));
    assert!(all.iter().all(|c| c.default_point <= 0));
}

#[tokio::test]
async fn seeding_skips_school_with_own_categories() {
    let fx = Fixture::new().await;
    let service = fx.categories();
    let caller = fx.counselor();

    let own = service.create(&caller, input("Cheating", -20)).await.unwrap();
    service
        .update(
            &caller,
            own.id,
            UpdateViolationCategory {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let seeded = service.initialize_defaults(&caller).await.unwrap();
    assert!(seeded.is_empty());

    let all = service.list(&caller, false).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Cheating");
}

#[tokio::test]
async fn create_enforces_rules() {
    let fx = Fixture::new().await;
    let service = fx.categories();
    let caller = fx.counselor();

    let created = service.create(&caller, input("  Gadget use ", -10)).await.unwrap();
    assert_eq!(created.name, "Gadget use");
    assert_eq!(created.school_id, fx.school);
    assert!(created.is_active);

    let dup = service.create(&caller, input("GADGET USE", -5)).await.unwrap_err();
    assert_eq!(dup.kind(), ErrorKind::Conflict);

    let positive = service.create(&caller, input("Helpful", 5)).await.unwrap_err();
    assert_eq!(positive.kind(), ErrorKind::DomainRule);

    let blank = service.create(&caller, input("  ", -5)).await.unwrap_err();
    assert_eq!(blank.kind(), ErrorKind::MissingField);
}

#[tokio::test]
async fn update_and_delete() {
    let fx = Fixture::new().await;
    let service = fx.categories();
    let caller = fx.counselor();

    let a = service.create(&caller, input("Gadget use", -10)).await.unwrap();
    let b = service.create(&caller, input("Littering", -5)).await.unwrap();

    let clash = service
        .update(
            &caller,
            b.id,
            UpdateViolationCategory {
                name: Some("gadget USE".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(clash.kind(), ErrorKind::Conflict);

    // Renaming to its own name (different case) is fine.
    let renamed = service
        .update(
            &caller,
            a.id,
            UpdateViolationCategory {
                name: Some("Gadget Use".into()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Gadget Use");
    assert!(!renamed.is_active);
    assert_eq!(service.list(&caller, true).await.unwrap().len(), 1);

    let bad_point = service
        .update(
            &caller,
            a.id,
            UpdateViolationCategory {
                default_point: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(bad_point.kind(), ErrorKind::DomainRule);

    service.delete(&caller, b.id).await.unwrap();
    assert_eq!(
        service.get(&caller, b.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn other_school_cannot_see_categories() {
    let fx = Fixture::new().await;
    let service = fx.categories();
    let created = service
        .create(&fx.counselor(), input("Gadget use", -10))
        .await
        .unwrap();

    let outsider = bk_core::models::caller::Caller::new(
        fx.other_school,
        uuid::Uuid::new_v4(),
        bk_core::models::caller::StaffRole::Counselor,
    );
    assert!(service.list(&outsider, false).await.unwrap().is_empty());
    assert_eq!(
        service.get(&outsider, created.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
