//! Achievement recording and listing.

use bk_core::error::BkResult;
use bk_core::models::achievement::{
    Achievement, AchievementFilter, AchievementPoints, CreateAchievement, NewAchievement,
};
use bk_core::models::caller::Caller;
use bk_core::repository::{AchievementRepository, Page, StudentDirectory};
use tracing::debug;
use uuid::Uuid;

use super::record_scope;
use crate::config::CaseConfig;
use crate::validation::{achievement_point, optional_text, require_id, require_text, resolve_student};

pub struct AchievementService<A: AchievementRepository, St: StudentDirectory> {
    achievements: A,
    students: St,
    config: CaseConfig,
}

impl<A: AchievementRepository, St: StudentDirectory> AchievementService<A, St> {
    pub fn new(achievements: A, students: St, config: CaseConfig) -> Self {
        Self {
            achievements,
            students,
            config,
        }
    }

    pub async fn create(&self, caller: &Caller, input: CreateAchievement) -> BkResult<Achievement> {
        let student_id = require_id("student_id", input.student_id)?;
        let title = require_text("title", &input.title)?;
        let point = achievement_point(input.point)?;

        resolve_student(&self.students, caller, student_id).await?;

        let achievement = self
            .achievements
            .create(NewAchievement {
                school_id: caller.school_id,
                student_id,
                title,
                point,
                description: optional_text(input.description),
                created_by: caller.user_id,
            })
            .await?;

        debug!(achievement_id = %achievement.id, student_id = %student_id, point, "Recorded achievement");
        Ok(achievement)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> BkResult<Achievement> {
        self.achievements.get_by_id(caller.school_id, id).await
    }

    pub async fn list(&self, caller: &Caller, filter: AchievementFilter) -> BkResult<Page<Achievement>> {
        let request = self.config.page_request(filter.page, filter.page_size);
        let scope = record_scope(
            &self.students,
            caller,
            filter.student_id,
            filter.class_id,
            &filter.dates,
        )
        .await?;

        let result = self
            .achievements
            .list(caller.school_id, scope, request.pagination())
            .await?;
        Ok(Page::from_result(result, request.page, request.page_size))
    }

    pub async fn list_for_student(&self, caller: &Caller, student_id: Uuid) -> BkResult<Vec<Achievement>> {
        resolve_student(&self.students, caller, student_id).await?;
        self.achievements
            .list_by_student(caller.school_id, student_id)
            .await
    }

    pub async fn student_points(&self, caller: &Caller, student_id: Uuid) -> BkResult<AchievementPoints> {
        let student = resolve_student(&self.students, caller, student_id).await?;
        let total_points = self
            .achievements
            .sum_points_by_student(caller.school_id, student_id)
            .await?;
        Ok(AchievementPoints {
            student_id,
            student_name: student.name,
            total_points,
        })
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> BkResult<()> {
        self.achievements.delete(caller.school_id, id).await?;
        debug!(achievement_id = %id, "Deleted achievement");
        Ok(())
    }
}
