//! Violation recording and listing.

use bk_core::error::{BkError, BkResult};
use bk_core::models::caller::Caller;
use bk_core::models::category::ViolationCategory;
use bk_core::models::violation::{CreateViolation, NewViolation, Violation, ViolationFilter};
use bk_core::repository::{
    Page, StudentDirectory, ViolationCategoryRepository, ViolationQuery, ViolationRepository,
};
use tracing::debug;
use uuid::Uuid;

use super::record_scope;
use crate::config::CaseConfig;
use crate::validation::{
    optional_text, parse_level, require_id, require_text, resolve_student,
    resolve_violation_point,
};

pub struct ViolationService<V, C, St>
where
    V: ViolationRepository,
    C: ViolationCategoryRepository,
    St: StudentDirectory,
{
    violations: V,
    categories: C,
    students: St,
    config: CaseConfig,
}

impl<V, C, St> ViolationService<V, C, St>
where
    V: ViolationRepository,
    C: ViolationCategoryRepository,
    St: StudentDirectory,
{
    pub fn new(violations: V, categories: C, students: St, config: CaseConfig) -> Self {
        Self {
            violations,
            categories,
            students,
            config,
        }
    }

    pub async fn create(&self, caller: &Caller, input: CreateViolation) -> BkResult<Violation> {
        let student_id = require_id("student_id", input.student_id)?;
        let level = parse_level(&input.level)?;
        let description = require_text("description", &input.description)?;
        let category = match input.category_id {
            Some(id) => Some(self.lookup_category(caller, id).await?),
            None => None,
        };
        let category_name = match (optional_text(Some(input.category)), &category) {
            (Some(name), _) => name,
            (None, Some(c)) => c.name.clone(),
            (None, None) => return Err(BkError::missing("category")),
        };

        resolve_student(&self.students, caller, student_id).await?;

        let point = resolve_violation_point(input.point, category.as_ref(), level);
        let violation = self
            .violations
            .create(NewViolation {
                school_id: caller.school_id,
                student_id,
                category_id: category.map(|c| c.id),
                category: category_name,
                level,
                point,
                description,
                created_by: caller.user_id,
            })
            .await?;

        debug!(
            violation_id = %violation.id,
            student_id = %student_id,
            level = %level,
            point,
            "Recorded violation"
        );
        Ok(violation)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> BkResult<Violation> {
        self.violations.get_by_id(caller.school_id, id).await
    }

    pub async fn list(&self, caller: &Caller, filter: ViolationFilter) -> BkResult<Page<Violation>> {
        let request = self.config.page_request(filter.page, filter.page_size);
        let scope = record_scope(
            &self.students,
            caller,
            filter.student_id,
            filter.class_id,
            &filter.dates,
        )
        .await?;
        let query = ViolationQuery {
            scope,
            level: filter.level,
            category: optional_text(filter.category),
        };

        let result = self
            .violations
            .list(caller.school_id, query, request.pagination())
            .await?;
        Ok(Page::from_result(result, request.page, request.page_size))
    }

    /// All violations of one student, newest first.
    pub async fn list_for_student(&self, caller: &Caller, student_id: Uuid) -> BkResult<Vec<Violation>> {
        resolve_student(&self.students, caller, student_id).await?;
        self.violations
            .list_by_student(caller.school_id, student_id)
            .await
    }

    /// Sum of violation points for one student (zero or negative unless
    /// positive overrides were recorded).
    pub async fn student_points(&self, caller: &Caller, student_id: Uuid) -> BkResult<i64> {
        resolve_student(&self.students, caller, student_id).await?;
        self.violations
            .sum_points_by_student(caller.school_id, student_id)
            .await
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> BkResult<()> {
        self.violations.delete(caller.school_id, id).await?;
        debug!(violation_id = %id, "Deleted violation");
        Ok(())
    }

    async fn lookup_category(&self, caller: &Caller, id: Uuid) -> BkResult<ViolationCategory> {
        match self.categories.get_by_id(caller.school_id, id).await {
            Ok(category) => Ok(category),
            Err(BkError::NotFound { .. }) => Err(BkError::rule(format!(
                "unknown violation category: {id}"
            ))),
            Err(e) => Err(e),
        }
    }
}
