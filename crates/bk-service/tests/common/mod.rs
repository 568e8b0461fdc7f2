//! Shared fixture: an in-memory database with two schools, a class,
//! students and staff already mirrored.

#![allow(dead_code)]

use bk_core::models::caller::{Caller, StaffRole};
use bk_core::models::roster::{SyncClass, SyncSchool, SyncStaff, SyncStudent};
use bk_db::repository::{
    SurrealAchievementRepository, SurrealCounselingNoteRepository, SurrealPermitRepository,
    SurrealRosterDirectory, SurrealViolationCategoryRepository, SurrealViolationRepository,
};
use bk_service::{
    AchievementService, CaseConfig, CategoryService, CounselingService, InsightService,
    PermitService, ViolationService,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

pub type Roster = SurrealRosterDirectory<Db>;

pub struct Fixture {
    pub db: Surreal<Db>,
    pub school: Uuid,
    pub other_school: Uuid,
    pub class: Uuid,
    /// Placed in `class`.
    pub student: Uuid,
    /// Same school, no class.
    pub classmate_free: Uuid,
    /// Belongs to `other_school`.
    pub foreign_student: Uuid,
    pub teacher: Uuid,
    pub foreign_teacher: Uuid,
    pub platform_admin: Uuid,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        bk_db::run_migrations(&db).await.unwrap();

        let fx = Self {
            db,
            school: Uuid::new_v4(),
            other_school: Uuid::new_v4(),
            class: Uuid::new_v4(),
            student: Uuid::new_v4(),
            classmate_free: Uuid::new_v4(),
            foreign_student: Uuid::new_v4(),
            teacher: Uuid::new_v4(),
            foreign_teacher: Uuid::new_v4(),
            platform_admin: Uuid::new_v4(),
        };

        let roster = fx.roster();
        for (id, name) in [(fx.school, "SMA Harapan"), (fx.other_school, "SMA Lain")] {
            roster
                .upsert_school(SyncSchool {
                    id,
                    name: name.into(),
                })
                .await
                .unwrap();
        }
        roster
            .upsert_class(SyncClass {
                id: fx.class,
                school_id: fx.school,
                name: "X-1".into(),
            })
            .await
            .unwrap();
        for (id, school_id, class_id, name) in [
            (fx.student, fx.school, Some(fx.class), "Andi"),
            (fx.classmate_free, fx.school, None, "Bela"),
            (fx.foreign_student, fx.other_school, None, "Citra"),
        ] {
            roster
                .upsert_student(SyncStudent {
                    id,
                    school_id,
                    class_id,
                    name: name.into(),
                    nis: "2024001".into(),
                    nisn: "0087654321".into(),
                })
                .await
                .unwrap();
        }
        for (id, school_id, name) in [
            (fx.teacher, Some(fx.school), "Pak Budi"),
            (fx.foreign_teacher, Some(fx.other_school), "Bu Dewi"),
            (fx.platform_admin, None, "Platform"),
        ] {
            roster
                .upsert_staff(SyncStaff {
                    id,
                    school_id,
                    username: name.to_lowercase().replace(' ', "."),
                    name: name.into(),
                })
                .await
                .unwrap();
        }

        fx
    }

    pub fn counselor(&self) -> Caller {
        Caller::new(self.school, Uuid::new_v4(), StaffRole::Counselor)
    }

    pub fn caller(&self, role: StaffRole) -> Caller {
        Caller::new(self.school, Uuid::new_v4(), role)
    }

    pub fn roster(&self) -> Roster {
        SurrealRosterDirectory::new(self.db.clone())
    }

    pub fn categories(&self) -> CategoryService<SurrealViolationCategoryRepository<Db>> {
        CategoryService::new(SurrealViolationCategoryRepository::new(self.db.clone()))
    }

    pub fn violations(
        &self,
    ) -> ViolationService<SurrealViolationRepository<Db>, SurrealViolationCategoryRepository<Db>, Roster>
    {
        ViolationService::new(
            SurrealViolationRepository::new(self.db.clone()),
            SurrealViolationCategoryRepository::new(self.db.clone()),
            self.roster(),
            CaseConfig::default(),
        )
    }

    pub fn achievements(&self) -> AchievementService<SurrealAchievementRepository<Db>, Roster> {
        AchievementService::new(
            SurrealAchievementRepository::new(self.db.clone()),
            self.roster(),
            CaseConfig::default(),
        )
    }

    pub fn permits(&self) -> PermitService<SurrealPermitRepository<Db>, Roster, Roster> {
        PermitService::new(
            SurrealPermitRepository::new(self.db.clone()),
            self.roster(),
            self.roster(),
            CaseConfig::default(),
        )
    }

    pub fn counseling(&self) -> CounselingService<SurrealCounselingNoteRepository<Db>, Roster> {
        CounselingService::new(
            SurrealCounselingNoteRepository::new(self.db.clone()),
            self.roster(),
            CaseConfig::default(),
        )
    }

    pub fn insight(
        &self,
    ) -> InsightService<
        SurrealViolationRepository<Db>,
        SurrealAchievementRepository<Db>,
        SurrealPermitRepository<Db>,
        SurrealCounselingNoteRepository<Db>,
        Roster,
    > {
        InsightService::new(
            SurrealViolationRepository::new(self.db.clone()),
            SurrealAchievementRepository::new(self.db.clone()),
            SurrealPermitRepository::new(self.db.clone()),
            SurrealCounselingNoteRepository::new(self.db.clone()),
            self.roster(),
            CaseConfig::default(),
        )
    }

    /// Register an extra student of `self.school` and return its id.
    pub async fn add_student(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.roster()
            .upsert_student(SyncStudent {
                id,
                school_id: self.school,
                class_id: None,
                name: name.into(),
                nis: "2024999".into(),
                nisn: "0000000000".into(),
            })
            .await
            .unwrap();
        id
    }
}
